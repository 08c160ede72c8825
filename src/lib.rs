// ABOUTME: Library module for the pptreport program.
// ABOUTME: Resolves slide content, lays it out on a grid and renders the result to PPTX.

// Reexport modules
pub mod config;
pub mod content;
pub mod diagnostics;
pub mod errors;
pub mod expand;
pub mod geometry;
pub mod group;
pub mod layout;
pub mod natural;
pub mod pdf;
pub mod policy;
pub mod pptx;
pub mod render;
pub mod report;
pub mod resolve;
pub mod utils;

// Reexport common types and functions
pub use config::ReportConfig;
pub use content::{ContentSpec, PatternKind, ResolvedItem};
pub use diagnostics::{Diagnostics, Warning, WarningKind};
pub use errors::{ReportError, Result};
pub use expand::{expand, ResolvedSlide, SlideSpec, Split};
pub use geometry::{compute, content_area, Alignment, AlignmentSpec, Margins, Placement, Rect, SlideSize};
pub use group::{resolve_groups, Group};
pub use layout::{plan, CellGrid, FillOrder, LayoutMode, LayoutSpec, NamedLayout};
pub use pdf::{PageExtractor, PageSelector, PopplerExtractor};
pub use policy::{EmptySlidePolicy, MissingPolicy};
pub use pptx::{PptxConfig, PptxRenderer};
pub use render::{BoxStyle, FilenameDisplay, Notes, Renderer};
pub use report::{build, lay_out, Plan, ReportSpec};
pub use resolve::{resolve, resolve_all};

#[cfg(test)]
mod tests;
