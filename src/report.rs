// ABOUTME: Report pipeline for the pptreport application
// ABOUTME: Expands, plans and places every slide, then drives a renderer over the result

use crate::content::ResolvedItem;
use crate::diagnostics::{Diagnostics, Warning};
use crate::errors::Result;
use crate::expand::{self, ResolvedSlide, SlideSpec};
use crate::geometry::{self, Alignment, HAlign, Rect, SlideSize};
use crate::layout;
use crate::pdf::PageExtractor;
use crate::render::{self, Renderer};
use log::{debug, info};
use serde::Serialize;

/// Height of the title band in centimeters.
pub const DEFAULT_TITLE_HEIGHT: f64 = 3.5;

/// Smallest filename caption strip, in centimeters (290000 EMU).
const CAPTION_MIN_HEIGHT: f64 = 0.8056;

/// Share of a picture box taken by its caption.
const CAPTION_SHARE: f64 = 0.1;

/// Everything needed to lay out a report.
#[derive(Debug, Clone)]
pub struct ReportSpec {
    pub size: SlideSize,
    pub title_height: f64,
    pub slides: Vec<SlideSpec>,
}

impl Default for ReportSpec {
    fn default() -> Self {
        Self {
            size: SlideSize::default(),
            title_height: DEFAULT_TITLE_HEIGHT,
            slides: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Caption {
    pub rect: Rect,
    pub text: String,
    pub alignment: HAlign,
}

/// One content item with its final box.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlacedBox {
    pub index: usize,
    pub rect: Rect,
    pub item: ResolvedItem,
    pub alignment: Alignment,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub caption: Option<Caption>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TitleBox {
    pub rect: Rect,
    pub text: String,
}

/// A slide ready for rendering.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlacedSlide {
    /// 1-based position in the output document.
    pub number: usize,
    /// 1-based position of the directive that produced the slide.
    pub directive: usize,
    pub title: Option<TitleBox>,
    pub notes: Option<String>,
    pub fontsize: Option<f64>,
    pub boxes: Vec<PlacedBox>,
}

/// The full layout of a report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Plan {
    pub size: SlideSize,
    pub slides: Vec<PlacedSlide>,
    pub warnings: Vec<Warning>,
}

/// Lay out every directive in order.
///
/// Errors carry the number of the directive they came from. Warnings raised
/// along the way are recorded in `diagnostics` and copied into the plan.
pub fn lay_out(
    report: &ReportSpec,
    pages: Option<&dyn PageExtractor>,
    diagnostics: &mut Diagnostics,
) -> Result<Plan> {
    let first_warning = diagnostics.len();
    let mut slides = Vec::new();

    for (i, spec) in report.slides.iter().enumerate() {
        let directive = i + 1;
        debug!("Expanding slide directive {}", directive);
        let expanded = expand::expand(spec, pages, diagnostics).map_err(|e| e.in_slide(directive))?;

        for slide in expanded {
            let number = slides.len() + 1;
            let placed = place_slide(report, slide, number, directive, diagnostics)
                .map_err(|e| e.in_slide(directive))?;
            slides.push(placed);
        }
    }

    info!(
        "Laid out {} slides from {} directives",
        slides.len(),
        report.slides.len()
    );
    Ok(Plan {
        size: report.size,
        slides,
        warnings: diagnostics.warnings()[first_warning..].to_vec(),
    })
}

fn place_slide(
    report: &ReportSpec,
    slide: ResolvedSlide,
    number: usize,
    directive: usize,
    diagnostics: &mut Diagnostics,
) -> Result<PlacedSlide> {
    let margins = &slide.layout.margins;
    let title_height = if slide.title.is_some() {
        report.title_height
    } else {
        0.0
    };
    let area = geometry::content_area(report.size, margins, title_height)?;
    let title = slide.title.map(|text| TitleBox {
        rect: Rect::new(margins.left, margins.top, area.width, title_height),
        text,
    });

    let grid = layout::plan(slide.items.len(), &slide.layout, diagnostics)?;
    let placements = geometry::compute(&grid, &slide.layout, area)?;

    let mut boxes = Vec::with_capacity(placements.len());
    for placement in placements {
        let item = slide.items[placement.index].clone();
        let mut rect = placement.rect;

        let mut caption = None;
        if let Some(path) = item.as_path().filter(|p| render::is_picture(p)) {
            if let Some(text) = slide.style.show_filename.label(path) {
                let height = (rect.height * CAPTION_SHARE).max(CAPTION_MIN_HEIGHT);
                let (strip, rest) = rect.split_top(height);
                caption = Some(Caption {
                    rect: strip,
                    text,
                    alignment: slide.style.filename_alignment.for_box(placement.index),
                });
                rect = rest;
            }
        }

        boxes.push(PlacedBox {
            index: placement.index,
            rect,
            alignment: slide.layout.content_alignment.for_box(placement.index),
            item,
            caption,
        });
    }

    let notes = slide.notes.as_ref().map(|n| n.resolve()).transpose()?;

    Ok(PlacedSlide {
        number,
        directive,
        title,
        notes,
        fontsize: slide.style.fontsize,
        boxes,
    })
}

/// Hand a laid out report to a renderer, slide by slide.
pub fn render(plan: &Plan, renderer: &mut dyn Renderer) -> Result<()> {
    for slide in &plan.slides {
        render_slide(slide, renderer).map_err(|e| e.in_slide(slide.number))?;
    }
    info!("Rendered {} slides", plan.slides.len());
    Ok(())
}

fn render_slide(slide: &PlacedSlide, renderer: &mut dyn Renderer) -> Result<()> {
    renderer.begin_slide(slide.notes.as_deref())?;
    if let Some(title) = &slide.title {
        renderer.title(title.rect, &title.text)?;
    }
    for placed in &slide.boxes {
        if let Some(caption) = &placed.caption {
            renderer.label(caption.rect, &caption.text, caption.alignment)?;
        }
        renderer.place(placed.rect, &placed.item, placed.alignment, slide.fontsize)?;
    }
    renderer.end_slide()
}

/// Lay out and render in one go.
pub fn build(
    report: &ReportSpec,
    pages: Option<&dyn PageExtractor>,
    renderer: &mut dyn Renderer,
    diagnostics: &mut Diagnostics,
) -> Result<Plan> {
    let plan = lay_out(report, pages, diagnostics)?;
    render(&plan, renderer)?;
    Ok(plan)
}
