// ABOUTME: Configuration module for the pptreport application
// ABOUTME: Loads the JSON report description and merges slide, global and default parameters

use crate::content::ContentSpec;
use crate::errors::{ReportError, Result};
use crate::expand::{SlideSpec, Split};
use crate::geometry::{Alignment, AlignmentSpec, HAlign, Margins, SlideSize};
use crate::layout::{FillOrder, LayoutMode, LayoutSpec, NamedLayout};
use crate::pdf::PageSelector;
use crate::policy::{EmptySlidePolicy, MissingPolicy};
use crate::render::{BoxStyle, CaptionAlignment, FilenameDisplay, Notes};
use crate::report::{ReportSpec, DEFAULT_TITLE_HEIGHT};
use crate::utils;
use log::{debug, info};
use serde::Deserialize;
use std::fs;
use std::path::Path;

const DEFAULT_OUTER_MARGIN: f64 = 2.0;
const DEFAULT_INNER_MARGIN: f64 = 1.0;
const DEFAULT_N_COLUMNS: usize = 2;

/// A value given either once or as a list.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    One(T),
    Many(Vec<T>),
}

impl<T: Clone> OneOrMany<T> {
    fn to_vec(&self) -> Vec<T> {
        match self {
            OneOrMany::One(value) => vec![value.clone()],
            OneOrMany::Many(values) => values.clone(),
        }
    }
}

/// A number, also accepted as a numeric string.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Number {
    Value(f64),
    Text(String),
}

impl Number {
    fn get(&self, key: &str) -> Result<f64> {
        match self {
            Number::Value(value) => Ok(*value),
            Number::Text(text) => text.trim().parse().map_err(|_| {
                ReportError::config(format!(
                    "Invalid value for '{}': '{}'. Expected a number",
                    key, text
                ))
            }),
        }
    }
}

/// A boolean, a whole number or a string spelling one of them.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Flag {
    Bool(bool),
    Int(i64),
    Text(String),
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum LayoutValue {
    Name(String),
    Matrix(Vec<Vec<i64>>),
    Row(Vec<i64>),
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum SizeValue {
    Name(String),
    /// `[height, width]` in centimeters.
    Dimensions([f64; 2]),
}

/// Parameters of one slide as written in the configuration file. Every field
/// is optional; [`SlideConfig::merged`] fills the gaps from the globals.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SlideConfig {
    pub title: Option<String>,
    pub content: Option<OneOrMany<String>>,
    pub grouped_content: Option<OneOrMany<String>>,
    pub content_layout: Option<LayoutValue>,
    pub content_alignment: Option<OneOrMany<String>>,
    pub outer_margin: Option<Number>,
    pub inner_margin: Option<Number>,
    pub left_margin: Option<Number>,
    pub right_margin: Option<Number>,
    pub top_margin: Option<Number>,
    pub bottom_margin: Option<Number>,
    pub n_columns: Option<Number>,
    pub width_ratios: Option<Vec<f64>>,
    pub height_ratios: Option<Vec<f64>>,
    pub notes: Option<OneOrMany<String>>,
    pub split: Option<Flag>,
    pub show_filename: Option<Flag>,
    pub filename_alignment: Option<OneOrMany<String>>,
    pub fill_by: Option<String>,
    pub missing_file: Option<String>,
    pub empty_slide: Option<String>,
    pub pdf_pages: Option<OneOrMany<Flag>>,
    pub fontsize: Option<Number>,
}

/// The whole configuration file.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReportConfig {
    pub size: Option<SizeValue>,
    pub title_height: Option<Number>,
    #[serde(default)]
    pub global_parameters: SlideConfig,
    #[serde(default)]
    pub slides: Vec<SlideConfig>,
}

impl ReportConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        utils::validate_file_exists(path).map_err(|e| match e {
            ReportError::Io(_) => ReportError::config(format!(
                "Configuration file does not exist: {}",
                path.display()
            )),
            other => other,
        })?;
        info!("Reading configuration from {:?}", path);
        let text = fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Resolve every slide against the globals and the defaults.
    pub fn to_report(&self) -> Result<ReportSpec> {
        let size = match &self.size {
            None => SlideSize::default(),
            Some(SizeValue::Name(name)) => SlideSize::named(name)?,
            Some(SizeValue::Dimensions([height, width])) => {
                if *height <= 0.0 || *width <= 0.0 {
                    return Err(ReportError::config(format!(
                        "Invalid value for 'size': [{}, {}]. Both dimensions must be positive",
                        height, width
                    )));
                }
                SlideSize {
                    width: *width,
                    height: *height,
                }
            }
        };

        let title_height = match &self.title_height {
            Some(value) => non_negative(value.get("title_height")?, "title_height")?,
            None => DEFAULT_TITLE_HEIGHT,
        };

        let slides = self
            .slides
            .iter()
            .enumerate()
            .map(|(i, slide)| {
                slide
                    .merged(&self.global_parameters)
                    .to_slide_spec()
                    .map_err(|e| e.in_slide(i + 1))
            })
            .collect::<Result<Vec<_>>>()?;

        debug!("Configured {} slides on a {}x{} cm page", slides.len(), size.width, size.height);
        Ok(ReportSpec {
            size,
            title_height,
            slides,
        })
    }
}

impl SlideConfig {
    /// Fill unset parameters of this slide from `global`.
    pub fn merged(&self, global: &SlideConfig) -> SlideConfig {
        macro_rules! pick {
            ($slide:expr, $global:expr; $($field:ident),* $(,)?) => {
                SlideConfig {
                    $($field: $slide.$field.clone().or_else(|| $global.$field.clone()),)*
                }
            };
        }
        pick!(
            self, global;
            title,
            content,
            grouped_content,
            content_layout,
            content_alignment,
            outer_margin,
            inner_margin,
            left_margin,
            right_margin,
            top_margin,
            bottom_margin,
            n_columns,
            width_ratios,
            height_ratios,
            notes,
            split,
            show_filename,
            filename_alignment,
            fill_by,
            missing_file,
            empty_slide,
            pdf_pages,
            fontsize,
        )
    }

    pub fn to_slide_spec(&self) -> Result<SlideSpec> {
        let content: Vec<ContentSpec> = self
            .content
            .as_ref()
            .map(|c| c.to_vec().iter().map(|raw| ContentSpec::parse(raw)).collect())
            .unwrap_or_default();
        let grouped_content: Option<Vec<ContentSpec>> = self
            .grouped_content
            .as_ref()
            .map(|c| c.to_vec().iter().map(|raw| ContentSpec::parse(raw)).collect());

        Ok(SlideSpec {
            title: self.title.clone(),
            content,
            grouped_content,
            split: self.split()?,
            missing_file: match &self.missing_file {
                Some(name) => name.parse()?,
                None => MissingPolicy::default(),
            },
            empty_slide: self.empty_slide()?,
            pdf_pages: self.pdf_pages()?,
            layout: self.layout()?,
            style: self.style()?,
            notes: self.notes.as_ref().map(|n| Notes(n.to_vec())),
        })
    }

    fn layout(&self) -> Result<LayoutSpec> {
        let mode = match &self.content_layout {
            None => LayoutMode::default(),
            Some(LayoutValue::Name(name)) => LayoutMode::Named(match name.to_lowercase().as_str() {
                "grid" => NamedLayout::Grid,
                "vertical" => NamedLayout::Vertical,
                "horizontal" => NamedLayout::Horizontal,
                _ => {
                    return Err(ReportError::config(format!(
                        "Invalid value for 'content_layout': '{}'. Choose from: grid, vertical, horizontal or a matrix",
                        name
                    )))
                }
            }),
            Some(LayoutValue::Matrix(matrix)) => LayoutMode::Custom(matrix.clone()),
            Some(LayoutValue::Row(row)) => LayoutMode::Custom(vec![row.clone()]),
        };

        let n_columns = match &self.n_columns {
            None => DEFAULT_N_COLUMNS,
            Some(value) => {
                let n = value.get("n_columns")?;
                if n < 1.0 || n.fract() != 0.0 {
                    return Err(ReportError::config(format!(
                        "Invalid value for 'n_columns': {}. Expected a whole number of at least 1",
                        n
                    )));
                }
                n as usize
            }
        };

        let fill_by = match self.fill_by.as_deref().map(str::to_lowercase).as_deref() {
            None | Some("row") => FillOrder::Row,
            Some("column") => FillOrder::Column,
            Some(other) => {
                return Err(ReportError::config(format!(
                    "Invalid value for 'fill_by': '{}'. Choose from: row, column",
                    other
                )))
            }
        };

        let content_alignment = match &self.content_alignment {
            None => AlignmentSpec::default(),
            Some(OneOrMany::One(value)) => AlignmentSpec::All(value.parse()?),
            Some(OneOrMany::Many(values)) => AlignmentSpec::PerBox(
                values
                    .iter()
                    .map(|v| v.parse::<Alignment>())
                    .collect::<Result<Vec<_>>>()?,
            ),
        };

        Ok(LayoutSpec {
            mode,
            n_columns,
            width_ratios: self.width_ratios.clone(),
            height_ratios: self.height_ratios.clone(),
            margins: self.margins()?,
            fill_by,
            content_alignment,
        })
    }

    fn margins(&self) -> Result<Margins> {
        let read = |value: &Option<Number>, key: &str| -> Result<Option<f64>> {
            value
                .as_ref()
                .map(|v| v.get(key).and_then(|m| non_negative(m, key)))
                .transpose()
        };

        let outer = read(&self.outer_margin, "outer_margin")?.unwrap_or(DEFAULT_OUTER_MARGIN);
        let inner = read(&self.inner_margin, "inner_margin")?.unwrap_or(DEFAULT_INNER_MARGIN);
        Ok(Margins {
            left: read(&self.left_margin, "left_margin")?.unwrap_or(outer),
            right: read(&self.right_margin, "right_margin")?.unwrap_or(outer),
            top: read(&self.top_margin, "top_margin")?.unwrap_or(outer),
            bottom: read(&self.bottom_margin, "bottom_margin")?.unwrap_or(outer),
            inner,
        })
    }

    fn split(&self) -> Result<Split> {
        let invalid = |shown: String| {
            ReportError::config(format!(
                "Invalid value for 'split': {}. Use true, false or a positive number",
                shown
            ))
        };
        let count = |n: i64| -> Result<Split> {
            if n < 1 {
                return Err(invalid(n.to_string()));
            }
            Ok(Split::Chunks(n as usize))
        };

        match &self.split {
            None | Some(Flag::Bool(false)) => Ok(Split::Off),
            Some(Flag::Bool(true)) => Ok(Split::Each),
            Some(Flag::Int(n)) => count(*n),
            Some(Flag::Text(text)) => match parse_bool(text) {
                Some(true) => Ok(Split::Each),
                Some(false) => Ok(Split::Off),
                None => count(text.trim().parse().map_err(|_| invalid(format!("'{}'", text)))?),
            },
        }
    }

    fn empty_slide(&self) -> Result<EmptySlidePolicy> {
        match self.empty_slide.as_deref().map(str::to_lowercase).as_deref() {
            None | Some("keep") => Ok(EmptySlidePolicy::Keep),
            Some("skip") => Ok(EmptySlidePolicy::Skip),
            Some(other) => Err(ReportError::config(format!(
                "Invalid value for 'empty_slide': '{}'. Choose from: keep, skip",
                other
            ))),
        }
    }

    fn pdf_pages(&self) -> Result<PageSelector> {
        let page = |flag: &Flag| -> Result<Vec<usize>> {
            match flag {
                Flag::Int(n) if *n >= 1 => Ok(vec![*n as usize]),
                Flag::Text(text) => match text.parse::<PageSelector>()? {
                    PageSelector::Pages(pages) => Ok(pages),
                    PageSelector::All => Err(ReportError::config(
                        "Invalid value for 'pdf_pages': 'all' cannot be part of a list",
                    )),
                },
                other => Err(ReportError::config(format!(
                    "Invalid value for 'pdf_pages': {:?}. Page numbers start at 1",
                    other
                ))),
            }
        };

        match &self.pdf_pages {
            None => Ok(PageSelector::All),
            Some(OneOrMany::One(Flag::Text(text))) => text.parse(),
            Some(OneOrMany::One(flag)) => PageSelector::pages(page(flag)?),
            Some(OneOrMany::Many(flags)) => {
                let mut pages = Vec::new();
                for flag in flags {
                    pages.extend(page(flag)?);
                }
                PageSelector::pages(pages)
            }
        }
    }

    fn style(&self) -> Result<BoxStyle> {
        let show_filename = match &self.show_filename {
            None => FilenameDisplay::Off,
            Some(Flag::Bool(show)) => FilenameDisplay::from_flag(*show),
            Some(Flag::Int(n @ (0 | 1))) => FilenameDisplay::from_flag(*n == 1),
            Some(Flag::Int(n)) => {
                return Err(ReportError::config(format!(
                    "Invalid value for 'show_filename': {}",
                    n
                )))
            }
            Some(Flag::Text(text)) => text.parse()?,
        };

        let filename_alignment = match &self.filename_alignment {
            None => CaptionAlignment::default(),
            Some(OneOrMany::One(value)) => CaptionAlignment::All(value.parse()?),
            Some(OneOrMany::Many(values)) => CaptionAlignment::PerBox(
                values
                    .iter()
                    .map(|v| v.parse::<HAlign>())
                    .collect::<Result<Vec<_>>>()?,
            ),
        };

        let fontsize = match &self.fontsize {
            None => None,
            Some(value) => {
                let size = value.get("fontsize")?;
                if size <= 0.0 {
                    return Err(ReportError::config(format!(
                        "Invalid value for 'fontsize': {}. Expected a positive number",
                        size
                    )));
                }
                Some(size)
            }
        };

        Ok(BoxStyle {
            show_filename,
            filename_alignment,
            fontsize,
        })
    }
}

fn non_negative(value: f64, key: &str) -> Result<f64> {
    if value < 0.0 || !value.is_finite() {
        return Err(ReportError::config(format!(
            "Invalid value for '{}': {}. Expected a number of at least 0",
            key, value
        )));
    }
    Ok(value)
}

fn parse_bool(text: &str) -> Option<bool> {
    match text.trim().to_lowercase().as_str() {
        "true" | "t" | "y" | "yes" => Some(true),
        "false" | "f" | "n" | "no" => Some(false),
        _ => None,
    }
}
