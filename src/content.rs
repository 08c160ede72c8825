// ABOUTME: Content model for the pptreport application
// ABOUTME: Classifies requested slide content and describes resolved items

use serde::Serialize;
use std::path::{Path, PathBuf};

/// Characters that make a string a glob pattern.
const GLOB_CHARS: &[char] = &['*', '?', '['];

/// Characters that only make sense in a regular expression. `.` is left out on
/// purpose: it appears in nearly every file name.
const REGEX_CHARS: &[char] = &['(', ')', '{', '}', '+', '|', '^', '$', '\\'];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternKind {
    Literal,
    Glob,
    Regex,
}

impl PatternKind {
    pub fn classify(raw: &str) -> Self {
        if raw.contains(GLOB_CHARS) {
            PatternKind::Glob
        } else if raw.contains(REGEX_CHARS) {
            PatternKind::Regex
        } else {
            PatternKind::Literal
        }
    }
}

/// One requested slide element before resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentSpec {
    Text(String),
    Pattern { raw: String, kind: PatternKind },
    Path(PathBuf),
}

impl ContentSpec {
    /// Classify a raw configuration string.
    ///
    /// Strings with glob or regex metacharacters become patterns, strings that
    /// name an existing file become paths, and everything else is text.
    /// Prose such as `"Did it work?"` or `"Results (n=3)"` is therefore a
    /// pattern; with `missing_file = text` it falls back to the same text.
    pub fn parse(raw: &str) -> Self {
        match PatternKind::classify(raw) {
            PatternKind::Literal if Path::new(raw).is_file() => ContentSpec::Path(PathBuf::from(raw)),
            PatternKind::Literal => ContentSpec::Text(raw.to_string()),
            kind => ContentSpec::Pattern {
                raw: raw.to_string(),
                kind,
            },
        }
    }

    pub fn text(value: impl Into<String>) -> Self {
        ContentSpec::Text(value.into())
    }

    /// The string the caller originally wrote, used in diagnostics.
    pub fn original(&self) -> String {
        match self {
            ContentSpec::Text(value) => value.clone(),
            ContentSpec::Pattern { raw, .. } => raw.clone(),
            ContentSpec::Path(path) => path.to_string_lossy().into_owned(),
        }
    }

    pub fn is_pattern(&self) -> bool {
        matches!(self, ContentSpec::Pattern { .. })
    }
}

/// Concrete outcome of resolving one content spec.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ResolvedItem {
    Path { path: PathBuf, pattern: String },
    Text { value: String },
    Empty { pattern: String },
    Skipped { pattern: String },
}

impl ResolvedItem {
    pub fn path(path: impl Into<PathBuf>, pattern: impl Into<String>) -> Self {
        ResolvedItem::Path {
            path: path.into(),
            pattern: pattern.into(),
        }
    }

    pub fn text(value: impl Into<String>) -> Self {
        ResolvedItem::Text {
            value: value.into(),
        }
    }

    /// Whether the item takes up a box in the layout.
    pub fn occupies_box(&self) -> bool {
        !matches!(self, ResolvedItem::Skipped { .. })
    }

    pub fn as_path(&self) -> Option<&Path> {
        match self {
            ResolvedItem::Path { path, .. } => Some(path),
            _ => None,
        }
    }
}

/// Items resolved from a spec that was a plain string or an existing file.
pub(crate) fn literal_item(spec: &ContentSpec) -> ResolvedItem {
    match spec {
        ContentSpec::Path(path) => ResolvedItem::path(path.clone(), spec.original()),
        other => ResolvedItem::text(other.original()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_patterns() {
        assert_eq!(PatternKind::classify("A text"), PatternKind::Literal);
        assert_eq!(PatternKind::classify("content/cat.jpg"), PatternKind::Literal);
        assert_eq!(PatternKind::classify("content/*.jpg"), PatternKind::Glob);
        assert_eq!(PatternKind::classify("img?.png"), PatternKind::Glob);
        assert_eq!(PatternKind::classify(r"a_(\w+)_blue.jpg"), PatternKind::Regex);
        assert_eq!(PatternKind::classify("content/(.*)_red.jpg"), PatternKind::Glob);
    }

    #[test]
    fn parse_detects_existing_files() {
        let dir = tempfile::TempDir::new().expect("Failed to create temp dir");
        let file = dir.path().join("note.txt");
        std::fs::write(&file, "hello").expect("Failed to write file");

        let spec = ContentSpec::parse(file.to_str().unwrap());
        assert_eq!(spec, ContentSpec::Path(file.clone()));

        let missing = dir.path().join("absent.txt");
        let spec = ContentSpec::parse(missing.to_str().unwrap());
        assert!(matches!(spec, ContentSpec::Text(_)));
    }

    #[test]
    fn skipped_items_take_no_box() {
        assert!(ResolvedItem::text("x").occupies_box());
        assert!(ResolvedItem::Empty { pattern: "p".into() }.occupies_box());
        assert!(!ResolvedItem::Skipped { pattern: "p".into() }.occupies_box());
    }
}
