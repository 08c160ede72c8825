// ABOUTME: Rendering seam for the pptreport application
// ABOUTME: Defines the renderer trait and the per-box styling handed to it

use crate::content::ResolvedItem;
use crate::errors::{ReportError, Result};
use crate::geometry::{Alignment, HAlign, Rect};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::str::FromStr;

/// File extensions placed as pictures. Other files are read as text.
const PICTURE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "bmp", "tif", "tiff"];

pub fn is_picture(path: &Path) -> bool {
    path.extension()
        .map(|ext| {
            let ext = ext.to_string_lossy().to_lowercase();
            PICTURE_EXTENSIONS.contains(&ext.as_str())
        })
        .unwrap_or(false)
}

/// How the file name caption above a picture is spelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FilenameDisplay {
    #[default]
    Off,
    Filename,
    FilenameExt,
    Filepath,
    FilepathExt,
    Path,
}

impl FilenameDisplay {
    pub fn from_flag(show: bool) -> Self {
        if show {
            FilenameDisplay::Filename
        } else {
            FilenameDisplay::Off
        }
    }

    pub fn label(&self, path: &Path) -> Option<String> {
        let text = match self {
            FilenameDisplay::Off => return None,
            FilenameDisplay::Filename => path.file_stem()?.to_string_lossy().into_owned(),
            FilenameDisplay::FilenameExt => path.file_name()?.to_string_lossy().into_owned(),
            FilenameDisplay::Filepath => path.with_extension("").to_string_lossy().into_owned(),
            FilenameDisplay::FilepathExt => path.to_string_lossy().into_owned(),
            FilenameDisplay::Path => path.parent()?.to_string_lossy().into_owned(),
        };
        Some(text)
    }
}

impl FromStr for FilenameDisplay {
    type Err = ReportError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "true" | "1" | "t" | "y" | "yes" | "filename" => Ok(FilenameDisplay::Filename),
            "false" | "0" | "f" | "n" | "no" => Ok(FilenameDisplay::Off),
            "filename_ext" => Ok(FilenameDisplay::FilenameExt),
            "filepath" => Ok(FilenameDisplay::Filepath),
            "filepath_ext" => Ok(FilenameDisplay::FilepathExt),
            "path" => Ok(FilenameDisplay::Path),
            _ => Err(ReportError::config(format!(
                "Invalid value for 'show_filename': '{}'. Choose from: true, false, filename, filename_ext, filepath, filepath_ext, path",
                s
            ))),
        }
    }
}

/// Caption alignment, for all boxes or per box.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptionAlignment {
    All(HAlign),
    PerBox(Vec<HAlign>),
}

impl CaptionAlignment {
    pub fn for_box(&self, index: usize) -> HAlign {
        match self {
            CaptionAlignment::All(align) => *align,
            CaptionAlignment::PerBox(list) => list.get(index).copied().unwrap_or_default(),
        }
    }
}

impl Default for CaptionAlignment {
    fn default() -> Self {
        CaptionAlignment::All(HAlign::Center)
    }
}

/// Styling that travels with every box of a slide.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BoxStyle {
    pub show_filename: FilenameDisplay,
    pub filename_alignment: CaptionAlignment,
    /// Fixed font size in points; `None` lets the renderer choose.
    pub fontsize: Option<f64>,
}

/// Speaker notes: each entry is either a path to a text file or literal text.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Notes(pub Vec<String>);

impl Notes {
    pub fn resolve(&self) -> Result<String> {
        let mut parts = Vec::with_capacity(self.0.len());
        for entry in &self.0 {
            let path = Path::new(entry);
            if path.is_file() {
                parts.push(fs::read_to_string(path)?);
            } else {
                parts.push(entry.clone());
            }
        }
        Ok(parts.join("\n"))
    }
}

/// A target document format. Every slide is bracketed by `begin_slide` and
/// `end_slide`; titles, boxes and filename captions arrive in between.
pub trait Renderer {
    fn begin_slide(&mut self, notes: Option<&str>) -> Result<()>;

    fn title(&mut self, rect: Rect, text: &str) -> Result<()>;

    /// Place `item` in `rect`. Content smaller than the box is positioned
    /// with `alignment`.
    fn place(
        &mut self,
        rect: Rect,
        item: &ResolvedItem,
        alignment: Alignment,
        fontsize: Option<f64>,
    ) -> Result<()>;

    fn label(&mut self, rect: Rect, text: &str, alignment: HAlign) -> Result<()>;

    fn end_slide(&mut self) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn picture_detection() {
        assert!(is_picture(Path::new("content/cat.JPG")));
        assert!(is_picture(Path::new("plots/fig1.png")));
        assert!(!is_picture(Path::new("content/fish_description.txt")));
        assert!(!is_picture(Path::new("README")));
    }

    #[test]
    fn filename_labels() {
        let path = Path::new("content/pictures/cat.jpg");
        assert_eq!(FilenameDisplay::Off.label(path), None);
        assert_eq!(FilenameDisplay::Filename.label(path).unwrap(), "cat");
        assert_eq!(FilenameDisplay::FilenameExt.label(path).unwrap(), "cat.jpg");
        assert_eq!(FilenameDisplay::Filepath.label(path).unwrap(), "content/pictures/cat");
        assert_eq!(FilenameDisplay::FilepathExt.label(path).unwrap(), "content/pictures/cat.jpg");
        assert_eq!(FilenameDisplay::Path.label(path).unwrap(), "content/pictures");
    }

    #[test]
    fn filename_display_parsing() {
        assert_eq!("True".parse::<FilenameDisplay>().unwrap(), FilenameDisplay::Filename);
        assert_eq!("no".parse::<FilenameDisplay>().unwrap(), FilenameDisplay::Off);
        assert_eq!("filepath_ext".parse::<FilenameDisplay>().unwrap(), FilenameDisplay::FilepathExt);
        assert!("invalid".parse::<FilenameDisplay>().is_err());
    }

    #[test]
    fn notes_read_files_and_text() {
        let dir = tempfile::TempDir::new().expect("Failed to create temp dir");
        let file = dir.path().join("notes.txt");
        fs::write(&file, "From a file").expect("Failed to write notes");

        let notes = Notes(vec!["A note".to_string(), file.to_string_lossy().into_owned()]);
        assert_eq!(notes.resolve().unwrap(), "A note\nFrom a file");
    }
}
