// ABOUTME: Geometry calculation for the pptreport application
// ABOUTME: Converts planned cell grids into box rectangles in centimeters

use crate::errors::{ReportError, Result};
use crate::layout::{self, CellGrid, LayoutSpec};
use log::debug;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A rectangle in centimeters, origin at the slide's top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// The largest size with the given aspect ratio that fits in this box.
    pub fn fit(&self, natural_width: f64, natural_height: f64) -> (f64, f64) {
        if natural_width <= 0.0 || natural_height <= 0.0 || self.height <= 0.0 {
            return (self.width, self.height);
        }

        let natural_ratio = natural_width / natural_height;
        let box_ratio = self.width / self.height;
        if box_ratio < natural_ratio {
            // Width is the limiting side.
            (self.width, self.width / natural_ratio)
        } else {
            (self.height * natural_ratio, self.height)
        }
    }

    /// Place content of the given size inside this box.
    pub fn place(&self, width: f64, height: f64, alignment: Alignment) -> Rect {
        let x = match alignment.horizontal {
            HAlign::Left => self.x,
            HAlign::Center => self.x + (self.width - width) / 2.0,
            HAlign::Right => self.right() - width,
        };
        let y = match alignment.vertical {
            VAlign::Upper => self.y,
            VAlign::Center => self.y + (self.height - height) / 2.0,
            VAlign::Lower => self.bottom() - height,
        };
        Rect::new(x, y, width, height)
    }

    /// Split off a strip of `height` from the top of the box.
    pub fn split_top(&self, height: f64) -> (Rect, Rect) {
        let height = height.min(self.height);
        (
            Rect::new(self.x, self.y, self.width, height),
            Rect::new(self.x, self.y + height, self.width, self.height - height),
        )
    }
}

/// The box assigned to one content index.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Placement {
    pub index: usize,
    pub rect: Rect,
}

/// Slide dimensions in centimeters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SlideSize {
    pub width: f64,
    pub height: f64,
}

impl SlideSize {
    pub const STANDARD: SlideSize = SlideSize { width: 25.4, height: 19.05 };
    pub const WIDESCREEN: SlideSize = SlideSize { width: 33.867, height: 19.05 };
    pub const A4_PORTRAIT: SlideSize = SlideSize { width: 19.05, height: 27.517 };
    pub const A4_LANDSCAPE: SlideSize = SlideSize { width: 27.517, height: 19.05 };

    pub fn named(name: &str) -> Result<Self> {
        match name {
            "standard" => Ok(Self::STANDARD),
            "widescreen" => Ok(Self::WIDESCREEN),
            "a4-portrait" => Ok(Self::A4_PORTRAIT),
            "a4-landscape" => Ok(Self::A4_LANDSCAPE),
            _ => Err(ReportError::config(format!(
                "Invalid size '{}'. Choose from: 'standard', 'widescreen', 'a4-portrait', 'a4-landscape' or [height, width]",
                name
            ))),
        }
    }

    pub fn bounds(&self) -> Rect {
        Rect::new(0.0, 0.0, self.width, self.height)
    }
}

impl Default for SlideSize {
    fn default() -> Self {
        Self::STANDARD
    }
}

/// Slide margins in centimeters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Margins {
    pub left: f64,
    pub right: f64,
    pub top: f64,
    pub bottom: f64,
    pub inner: f64,
}

impl Margins {
    pub fn uniform(outer: f64, inner: f64) -> Self {
        Self {
            left: outer,
            right: outer,
            top: outer,
            bottom: outer,
            inner,
        }
    }
}

impl Default for Margins {
    fn default() -> Self {
        Self::uniform(2.0, 1.0)
    }
}

/// The slide region left for content once margins and an optional title
/// band are taken off.
pub fn content_area(slide: SlideSize, margins: &Margins, title_height: f64) -> Result<Rect> {
    let top = margins.top + title_height;
    let width = slide.width - margins.left - margins.right;
    let height = slide.height - top - margins.bottom;

    if width < 0.0 || height < 0.0 {
        return Err(ReportError::config(format!(
            "Margins leave no room for content on a {}x{} cm slide",
            slide.width, slide.height
        )));
    }

    Ok(Rect::new(margins.left, top, width, height))
}

/// Compute one box per content index of `grid`.
///
/// Spanning boxes absorb the inner margins between the tracks they cover.
pub fn compute(grid: &CellGrid, spec: &LayoutSpec, area: Rect) -> Result<Vec<Placement>> {
    if grid.is_empty() {
        return Ok(Vec::new());
    }

    layout::check_ratios("width_ratios", spec.width_ratios.as_deref(), grid.cols(), "columns")?;
    layout::check_ratios("height_ratios", spec.height_ratios.as_deref(), grid.rows(), "rows")?;

    let inner = spec.margins.inner;
    let widths = track_sizes(area.width, grid.cols(), inner, spec.width_ratios.as_deref(), "width")?;
    let heights = track_sizes(area.height, grid.rows(), inner, spec.height_ratios.as_deref(), "height")?;

    let placements: Vec<Placement> = grid
        .assignments()
        .into_iter()
        .map(|cell| {
            let x = area.x + offset(&widths, cell.cols.start, inner);
            let y = area.y + offset(&heights, cell.rows.start, inner);
            let width = span(&widths, cell.cols.clone(), inner);
            let height = span(&heights, cell.rows.clone(), inner);
            Placement {
                index: cell.index,
                rect: Rect::new(x, y, width, height),
            }
        })
        .collect();

    debug!(
        "Computed {} boxes on a {}x{} grid",
        placements.len(),
        grid.rows(),
        grid.cols()
    );
    Ok(placements)
}

/// Split `total` minus the gaps between `count` tracks by `ratios`.
pub fn track_sizes(
    total: f64,
    count: usize,
    inner: f64,
    ratios: Option<&[f64]>,
    what: &str,
) -> Result<Vec<f64>> {
    let available = total - count.saturating_sub(1) as f64 * inner;
    if available < 0.0 {
        return Err(ReportError::config(format!(
            "Inner margins leave no {} for {} tracks",
            what, count
        )));
    }

    if let Some(ratios) = ratios.filter(|r| r.len() != count) {
        return Err(ReportError::config(format!(
            "Got {} {} ratios for {} tracks",
            ratios.len(),
            what,
            count
        )));
    }

    Ok(match ratios {
        Some(ratios) => {
            let sum: f64 = ratios.iter().sum();
            ratios.iter().map(|r| available * r / sum).collect()
        }
        None => vec![available / count as f64; count],
    })
}

fn offset(sizes: &[f64], start: usize, inner: f64) -> f64 {
    sizes[..start].iter().sum::<f64>() + start as f64 * inner
}

fn span(sizes: &[f64], range: std::ops::Range<usize>, inner: f64) -> f64 {
    let gaps = range.len().saturating_sub(1) as f64 * inner;
    sizes[range].iter().sum::<f64>() + gaps
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum VAlign {
    Upper,
    #[default]
    Center,
    Lower,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HAlign {
    Left,
    #[default]
    Center,
    Right,
}

impl FromStr for HAlign {
    type Err = ReportError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "left" => Ok(HAlign::Left),
            "center" => Ok(HAlign::Center),
            "right" => Ok(HAlign::Right),
            _ => Err(ReportError::config(format!(
                "Invalid horizontal alignment '{}'. Valid alignments are: left, center, right",
                s
            ))),
        }
    }
}

impl fmt::Display for HAlign {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            HAlign::Left => "left",
            HAlign::Center => "center",
            HAlign::Right => "right",
        })
    }
}

/// Where content sits inside its box when it is smaller than the box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Alignment {
    pub vertical: VAlign,
    pub horizontal: HAlign,
}

impl FromStr for Alignment {
    type Err = ReportError;

    /// Accepts `left`, `right`, `center`, `upper`, `lower`, or
    /// `"<upper|center|lower> <left|center|right>"`.
    fn from_str(s: &str) -> Result<Self> {
        let invalid = || {
            ReportError::config(format!(
                "Invalid alignment '{}'. Use e.g. 'center', 'upper left' or 'lower right'",
                s
            ))
        };

        let words: Vec<String> = s.split_whitespace().map(str::to_lowercase).collect();
        let (vertical, horizontal) = match words.as_slice() {
            [one] => match one.as_str() {
                "upper" => ("upper", "center"),
                "lower" => ("lower", "center"),
                "left" | "right" | "center" => ("center", one.as_str()),
                _ => return Err(invalid()),
            },
            [v, h] => (v.as_str(), h.as_str()),
            _ => return Err(invalid()),
        };

        let vertical = match vertical {
            "upper" => VAlign::Upper,
            "center" => VAlign::Center,
            "lower" => VAlign::Lower,
            _ => return Err(invalid()),
        };
        let horizontal = horizontal.parse().map_err(|_| invalid())?;

        Ok(Alignment {
            vertical,
            horizontal,
        })
    }
}

impl TryFrom<String> for Alignment {
    type Error = ReportError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<Alignment> for String {
    fn from(alignment: Alignment) -> Self {
        alignment.to_string()
    }
}

impl fmt::Display for Alignment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let vertical = match self.vertical {
            VAlign::Upper => "upper",
            VAlign::Center => "center",
            VAlign::Lower => "lower",
        };
        write!(f, "{} {}", vertical, self.horizontal)
    }
}

/// One alignment for every box, or one per box.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AlignmentSpec {
    All(Alignment),
    PerBox(Vec<Alignment>),
}

impl AlignmentSpec {
    /// Boxes beyond a per-box list are centered.
    pub fn for_box(&self, index: usize) -> Alignment {
        match self {
            AlignmentSpec::All(alignment) => *alignment,
            AlignmentSpec::PerBox(list) => list.get(index).copied().unwrap_or_default(),
        }
    }
}

impl Default for AlignmentSpec {
    fn default() -> Self {
        AlignmentSpec::All(Alignment::default())
    }
}
