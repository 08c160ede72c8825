// ABOUTME: Grouped content resolution for the pptreport application
// ABOUTME: Pairs files from several capture-group regexes by their shared captured key

use crate::content::{literal_item, ContentSpec, ResolvedItem};
use crate::diagnostics::{Diagnostics, WarningKind};
use crate::errors::{ReportError, Result};
use crate::natural;
use crate::policy::MissingPolicy;
use crate::resolve;
use log::{debug, info};
use regex::Regex;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// One slide's worth of grouped content.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Group {
    pub key: String,
    /// One entry per input entry, in input order. Pattern entries hold the
    /// match for `key` or the missing-file outcome for it.
    pub slots: Vec<ResolvedItem>,
}

impl Group {
    /// The items that get a box on the slide.
    pub fn content(&self) -> Vec<ResolvedItem> {
        self.slots
            .iter()
            .filter(|item| item.occupies_box())
            .cloned()
            .collect()
    }
}

enum Entry {
    Plain(ResolvedItem),
    Pattern {
        raw: String,
        matches: BTreeMap<String, PathBuf>,
    },
}

/// Resolve a `grouped_content` directive into groups naturally sorted by key.
///
/// Every pattern entry must have exactly one capture group. A key found by
/// some patterns but not others gets the missing-file outcome in the other
/// slots. A group whose slot resolves to `skip-slide` is left out.
pub fn resolve_groups(
    entries: &[ContentSpec],
    policy: MissingPolicy,
    diagnostics: &mut Diagnostics,
) -> Result<Vec<Group>> {
    let mut resolved = Vec::with_capacity(entries.len());
    for spec in entries {
        resolved.push(resolve_entry(spec, diagnostics)?);
    }

    if !resolved.iter().any(|e| matches!(e, Entry::Pattern { .. })) {
        return Err(ReportError::config(
            "'grouped_content' must contain at least one regex pattern with a capture group",
        ));
    }

    let mut keys: Vec<String> = resolved
        .iter()
        .filter_map(|e| match e {
            Entry::Pattern { matches, .. } => Some(matches.keys().cloned()),
            Entry::Plain(_) => None,
        })
        .flatten()
        .collect();
    keys.sort_by(|a, b| natural::compare(a, b));
    keys.dedup();
    debug!("Found groups: {:?}", keys);

    let mut groups = Vec::with_capacity(keys.len());
    'groups: for key in keys {
        let mut slots = Vec::with_capacity(resolved.len());
        for entry in &resolved {
            let slot = match entry {
                Entry::Plain(item) => item.clone(),
                Entry::Pattern { raw, matches } => match matches.get(&key) {
                    Some(path) => ResolvedItem::path(path.clone(), raw.as_str()),
                    None => match missing_slot(raw, &key, policy, diagnostics) {
                        Err(ReportError::SlideSkipped { pattern }) => {
                            info!("Skipping group '{}': no match for '{}'", key, pattern);
                            continue 'groups;
                        }
                        other => other?,
                    },
                },
            };
            slots.push(slot);
        }
        groups.push(Group { key, slots });
    }

    Ok(groups)
}

fn resolve_entry(spec: &ContentSpec, diagnostics: &mut Diagnostics) -> Result<Entry> {
    let raw = match spec {
        ContentSpec::Pattern { raw, .. } => raw,
        literal => return Ok(Entry::Plain(literal_item(literal))),
    };

    let regex = match resolve::compile(raw) {
        Ok(regex) => regex,
        Err(err) => {
            diagnostics.warn(
                WarningKind::InvalidPattern,
                Some(raw),
                format!("Invalid regex '{}', using it as text: {}", raw, err),
            );
            return Ok(Entry::Plain(ResolvedItem::text(raw.as_str())));
        }
    };

    let groups = regex.captures_len() - 1;
    if groups != 1 {
        return Err(ReportError::config(format!(
            "Regex '{}' in 'grouped_content' must contain exactly one capture group, found {}",
            raw, groups
        )));
    }

    Ok(Entry::Pattern {
        raw: raw.clone(),
        matches: match_keys(raw, &regex, diagnostics),
    })
}

fn match_keys(raw: &str, regex: &Regex, diagnostics: &mut Diagnostics) -> BTreeMap<String, PathBuf> {
    let mut candidates = resolve::candidates(raw);
    candidates.sort_by(|a, b| natural::compare(a, b));

    let mut matches = BTreeMap::new();
    for candidate in candidates {
        let Some(key) = regex
            .captures(&candidate)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
        else {
            continue;
        };

        if let Some(first) = matches.get(&key) {
            diagnostics.warn(
                WarningKind::DuplicateKey,
                Some(raw),
                format!(
                    "Pattern '{}' matched key '{}' more than once; keeping {:?}, ignoring '{}'",
                    raw, key, first, candidate
                ),
            );
            continue;
        }
        matches.insert(key, PathBuf::from(candidate));
    }

    debug!("Pattern '{}' matched {} keys", raw, matches.len());
    matches
}

fn missing_slot(
    raw: &str,
    key: &str,
    policy: MissingPolicy,
    diagnostics: &mut Diagnostics,
) -> Result<ResolvedItem> {
    let item = policy.apply(raw)?;
    diagnostics.warn(
        WarningKind::NoMatch,
        Some(raw),
        format!(
            "No file for group '{}' in pattern '{}' (missing_file={})",
            key, raw, policy
        ),
    );
    Ok(item)
}
