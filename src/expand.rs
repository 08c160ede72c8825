// ABOUTME: Slide expansion for the pptreport application
// ABOUTME: Turns one slide directive into the resolved slides it produces via split and grouping

use crate::content::{ContentSpec, ResolvedItem};
use crate::diagnostics::Diagnostics;
use crate::errors::{ReportError, Result};
use crate::group;
use crate::layout::LayoutSpec;
use crate::pdf::{self, PageExtractor, PageSelector};
use crate::policy::{EmptySlidePolicy, MissingPolicy};
use crate::render::{BoxStyle, Notes};
use crate::resolve;
use log::{debug, info};

/// How resolved content is distributed over slides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Split {
    #[default]
    Off,
    /// One slide per item.
    Each,
    /// Slides of up to this many consecutive items.
    Chunks(usize),
}

/// One slide directive as given by the caller.
#[derive(Debug, Clone, Default)]
pub struct SlideSpec {
    pub title: Option<String>,
    pub content: Vec<ContentSpec>,
    pub grouped_content: Option<Vec<ContentSpec>>,
    pub split: Split,
    pub missing_file: MissingPolicy,
    pub empty_slide: EmptySlidePolicy,
    pub pdf_pages: PageSelector,
    pub layout: LayoutSpec,
    pub style: BoxStyle,
    pub notes: Option<Notes>,
}

/// A slide with its final content list, ready for layout.
#[derive(Debug, Clone)]
pub struct ResolvedSlide {
    pub title: Option<String>,
    pub items: Vec<ResolvedItem>,
    pub layout: LayoutSpec,
    pub style: BoxStyle,
    pub notes: Option<Notes>,
}

impl SlideSpec {
    fn validate(&self) -> Result<()> {
        if let Some(grouped) = &self.grouped_content {
            if !self.content.is_empty() {
                return Err(ReportError::config(
                    "Invalid input combination: both 'content' and 'grouped_content' were given",
                ));
            }
            if self.split != Split::Off {
                return Err(ReportError::config(
                    "Invalid input combination: 'split' cannot be used with 'grouped_content'",
                ));
            }
            if grouped.is_empty() {
                return Err(ReportError::config("'grouped_content' is empty"));
            }
        }

        match self.split {
            Split::Chunks(0) => Err(ReportError::config(
                "Invalid value for 'split': 0. Use true, false or a positive number",
            )),
            Split::Off => Ok(()),
            _ if self.content.is_empty() => Err(ReportError::config(
                "Invalid input combination: 'split' is given, but 'content' is empty",
            )),
            _ => Ok(()),
        }
    }

    fn slide(&self, title: Option<String>, items: Vec<ResolvedItem>) -> ResolvedSlide {
        ResolvedSlide {
            title,
            items,
            layout: self.layout.clone(),
            style: self.style.clone(),
            notes: self.notes.clone(),
        }
    }
}

/// Expand one directive into zero or more resolved slides, in order.
///
/// PDF paths are expanded into one item per selected page before splitting,
/// so every page counts as one item. A `skip-slide` outcome drops the slide
/// (for grouped content, only that group's slide).
pub fn expand(
    spec: &SlideSpec,
    pages: Option<&dyn PageExtractor>,
    diagnostics: &mut Diagnostics,
) -> Result<Vec<ResolvedSlide>> {
    spec.validate()?;

    let slides = match &spec.grouped_content {
        Some(grouped) => expand_groups(spec, grouped, pages, diagnostics)?,
        None => expand_content(spec, pages, diagnostics)?,
    };

    let before = slides.len();
    let slides: Vec<ResolvedSlide> = match spec.empty_slide {
        EmptySlidePolicy::Keep => slides,
        EmptySlidePolicy::Skip => slides.into_iter().filter(|s| !s.items.is_empty()).collect(),
    };
    if slides.len() < before {
        info!("Skipped {} empty slides", before - slides.len());
    }

    Ok(slides)
}

fn expand_content(
    spec: &SlideSpec,
    pages: Option<&dyn PageExtractor>,
    diagnostics: &mut Diagnostics,
) -> Result<Vec<ResolvedSlide>> {
    let items = match resolve::resolve_all(&spec.content, spec.missing_file, diagnostics) {
        Ok(items) => items,
        Err(ReportError::SlideSkipped { pattern }) => {
            info!("Skipping slide: no files found for '{}'", pattern);
            return Ok(Vec::new());
        }
        Err(e) => return Err(e),
    };
    let items = expand_pdfs(items, &spec.pdf_pages, pages)?;
    debug!("Resolved {} content items", items.len());

    let chunks: Vec<Vec<ResolvedItem>> = match spec.split {
        Split::Off => vec![items],
        _ if items.is_empty() => vec![Vec::new()],
        Split::Each => items.into_iter().map(|item| vec![item]).collect(),
        Split::Chunks(size) => items.chunks(size).map(<[ResolvedItem]>::to_vec).collect(),
    };

    Ok(chunks
        .into_iter()
        .map(|items| spec.slide(spec.title.clone(), items))
        .collect())
}

fn expand_groups(
    spec: &SlideSpec,
    grouped: &[ContentSpec],
    pages: Option<&dyn PageExtractor>,
    diagnostics: &mut Diagnostics,
) -> Result<Vec<ResolvedSlide>> {
    let groups = group::resolve_groups(grouped, spec.missing_file, diagnostics)?;

    let mut slides = Vec::with_capacity(groups.len());
    for group in groups {
        let content = group.content();
        let has_pdf = content
            .iter()
            .any(|item| item.as_path().map(pdf::is_pdf).unwrap_or(false));
        if has_pdf && pages.is_some() && !spec.pdf_pages.is_single() {
            return Err(ReportError::config(
                "Invalid value for 'pdf_pages': grouped content needs a single page number",
            ));
        }

        let items = expand_pdfs(content, &spec.pdf_pages, pages)?;
        let title = spec
            .title
            .clone()
            .unwrap_or_else(|| format!("Group: {}", group.key));
        slides.push(spec.slide(Some(title), items));
    }

    Ok(slides)
}

fn expand_pdfs(
    items: Vec<ResolvedItem>,
    selector: &PageSelector,
    pages: Option<&dyn PageExtractor>,
) -> Result<Vec<ResolvedItem>> {
    let Some(extractor) = pages else {
        return Ok(items);
    };

    let mut expanded = Vec::with_capacity(items.len());
    for item in items {
        match item {
            ResolvedItem::Path { path, pattern } if pdf::is_pdf(&path) => {
                for page in extractor.extract(&path, selector)? {
                    expanded.push(ResolvedItem::path(page, pattern.as_str()));
                }
            }
            other => expanded.push(other),
        }
    }
    Ok(expanded)
}
