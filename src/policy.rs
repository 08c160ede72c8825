// ABOUTME: Missing-file and empty-slide policies for the pptreport application
// ABOUTME: Decides what an unresolved pattern or an empty slide turns into

use crate::content::ResolvedItem;
use crate::errors::{ReportError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MissingPolicy {
    #[default]
    Raise,
    Text,
    Empty,
    Skip,
    SkipSlide,
}

impl MissingPolicy {
    /// Decide the fate of a pattern that matched zero files.
    ///
    /// `Skip` yields a [`ResolvedItem::Skipped`] marker that callers drop before
    /// layout; `SkipSlide` yields the [`ReportError::SlideSkipped`] signal.
    pub fn apply(&self, pattern: &str) -> Result<ResolvedItem> {
        match self {
            MissingPolicy::Raise => Err(ReportError::NotFound {
                pattern: pattern.to_string(),
            }),
            MissingPolicy::Text => Ok(ResolvedItem::text(pattern)),
            MissingPolicy::Empty => Ok(ResolvedItem::Empty {
                pattern: pattern.to_string(),
            }),
            MissingPolicy::Skip => Ok(ResolvedItem::Skipped {
                pattern: pattern.to_string(),
            }),
            MissingPolicy::SkipSlide => Err(ReportError::SlideSkipped {
                pattern: pattern.to_string(),
            }),
        }
    }

    /// `raise` aborts on its own, everything else recovers with a warning.
    pub fn warns(&self) -> bool {
        !matches!(self, MissingPolicy::Raise)
    }
}

impl FromStr for MissingPolicy {
    type Err = ReportError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "raise" => Ok(MissingPolicy::Raise),
            "text" => Ok(MissingPolicy::Text),
            "empty" => Ok(MissingPolicy::Empty),
            "skip" => Ok(MissingPolicy::Skip),
            "skip-slide" | "skip_slide" => Ok(MissingPolicy::SkipSlide),
            _ => Err(ReportError::config(format!(
                "Invalid value for 'missing_file': '{}'. Choose from: raise, text, empty, skip, skip-slide",
                s
            ))),
        }
    }
}

impl fmt::Display for MissingPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MissingPolicy::Raise => "raise",
            MissingPolicy::Text => "text",
            MissingPolicy::Empty => "empty",
            MissingPolicy::Skip => "skip",
            MissingPolicy::SkipSlide => "skip-slide",
        };
        f.write_str(name)
    }
}

/// What happens to a slide whose resolved content list is empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmptySlidePolicy {
    #[default]
    Keep,
    Skip,
}
