// ABOUTME: Pattern resolution for the pptreport application
// ABOUTME: Expands glob and regex content patterns into naturally sorted file lists

use crate::content::{literal_item, ContentSpec, PatternKind, ResolvedItem};
use crate::diagnostics::{Diagnostics, WarningKind};
use crate::errors::Result;
use crate::natural;
use crate::policy::MissingPolicy;
use log::debug;
use regex::Regex;
use std::path::PathBuf;
use walkdir::WalkDir;

/// Characters that end the literal directory prefix of a pattern.
const META_CHARS: &[char] = &['*', '?', '[', ']', '(', ')', '{', '}', '+', '|', '^', '$', '\\'];

/// Resolve one content spec into zero or more items.
///
/// Patterns that match nothing are handed to `policy`. A `skip` outcome
/// produces no item at all, so the slide loses that layout slot.
pub fn resolve(
    spec: &ContentSpec,
    policy: MissingPolicy,
    diagnostics: &mut Diagnostics,
) -> Result<Vec<ResolvedItem>> {
    let (raw, kind) = match spec {
        ContentSpec::Pattern { raw, kind } => (raw.as_str(), *kind),
        literal => return Ok(vec![literal_item(literal)]),
    };

    let paths = match match_pattern(raw, kind) {
        Matched::Paths(paths) => paths,
        Matched::InvalidRegex(err) => {
            diagnostics.warn(
                WarningKind::InvalidPattern,
                Some(raw),
                format!("Invalid regex '{}', using it as text: {}", raw, err),
            );
            return Ok(vec![ResolvedItem::text(raw)]);
        }
    };

    if !paths.is_empty() {
        debug!("Pattern '{}' matched {} files", raw, paths.len());
        return Ok(paths
            .into_iter()
            .map(|path| ResolvedItem::path(path, raw))
            .collect());
    }

    let item = policy.apply(raw)?;
    if policy.warns() {
        diagnostics.warn(
            WarningKind::NoMatch,
            Some(raw),
            format!(
                "No files could be found for pattern '{}' (missing_file={})",
                raw, policy
            ),
        );
    }
    Ok(if item.occupies_box() { vec![item] } else { Vec::new() })
}

/// Resolve a list of specs in order, flattening the results.
pub fn resolve_all(
    specs: &[ContentSpec],
    policy: MissingPolicy,
    diagnostics: &mut Diagnostics,
) -> Result<Vec<ResolvedItem>> {
    let mut items = Vec::new();
    for spec in specs {
        items.extend(resolve(spec, policy, diagnostics)?);
    }
    Ok(items)
}

enum Matched {
    Paths(Vec<PathBuf>),
    InvalidRegex(regex::Error),
}

fn match_pattern(raw: &str, kind: PatternKind) -> Matched {
    if kind == PatternKind::Glob {
        let globbed = glob_files(raw);
        if !globbed.is_empty() {
            return Matched::Paths(globbed);
        }
        debug!("Glob '{}' matched nothing, retrying as regex", raw);
    }

    match compile(raw) {
        Ok(regex) => {
            let mut paths: Vec<PathBuf> = candidates(raw)
                .into_iter()
                .filter(|candidate| regex.is_match(candidate))
                .map(PathBuf::from)
                .collect();
            natural::sort_paths(&mut paths);
            Matched::Paths(paths)
        }
        // A pattern that was a valid glob but an invalid regex simply matched nothing.
        Err(_) if kind == PatternKind::Glob => Matched::Paths(Vec::new()),
        Err(err) => Matched::InvalidRegex(err),
    }
}

fn glob_files(raw: &str) -> Vec<PathBuf> {
    let entries = match glob::glob(raw) {
        Ok(entries) => entries,
        Err(e) => {
            debug!("'{}' is not a valid glob: {}", raw, e);
            return Vec::new();
        }
    };

    let mut paths: Vec<PathBuf> = entries.flatten().filter(|p| p.is_file()).collect();
    natural::sort_paths(&mut paths);
    paths
}

/// Compile a pattern so it must match a whole path.
pub(crate) fn compile(raw: &str) -> std::result::Result<Regex, regex::Error> {
    Regex::new(&format!("^(?:{})$", raw))
}

/// The directory to search for a pattern, and whether it was implied.
///
/// The root is the directory part of the pattern before its first
/// metacharacter. Without one the current directory is searched.
pub(crate) fn search_root(raw: &str) -> (PathBuf, bool) {
    let literal = match raw.find(META_CHARS) {
        Some(idx) => &raw[..idx],
        None => raw,
    };

    match literal.rfind('/') {
        Some(0) => (PathBuf::from("/"), false),
        Some(idx) => (PathBuf::from(&literal[..idx]), false),
        None => (PathBuf::from("."), true),
    }
}

/// Every file directly inside the pattern's search root, spelled the way the
/// pattern would spell it. Subdirectories are not searched, so a regex sees
/// the same files as the equivalent glob.
pub(crate) fn candidates(raw: &str) -> Vec<String> {
    let (root, implied) = search_root(raw);
    if !root.is_dir() {
        debug!("Search root {:?} for '{}' does not exist", root, raw);
        return Vec::new();
    }

    WalkDir::new(&root)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                debug!("Skipping unreadable entry under {:?}: {}", root, e);
                None
            }
        })
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| {
            let path = if implied {
                entry.path().strip_prefix(".").unwrap_or(entry.path())
            } else {
                entry.path()
            };
            path.to_string_lossy().into_owned()
        })
        .collect()
}
