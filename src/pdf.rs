// ABOUTME: PDF page extraction for the pptreport application
// ABOUTME: Converts selected PDF pages into PNG images using poppler's command-line tools

use crate::errors::{ReportError, Result};
use log::{debug, info};
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::str::FromStr;

/// Which pages of a PDF to place on a slide. Page numbers start at 1.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PageSelector {
    #[default]
    All,
    Pages(Vec<usize>),
}

impl PageSelector {
    pub fn pages(pages: Vec<usize>) -> Result<Self> {
        if pages.is_empty() || pages.contains(&0) {
            return Err(ReportError::config(format!(
                "Invalid value for 'pdf_pages': {:?}. Page numbers start at 1",
                pages
            )));
        }
        Ok(PageSelector::Pages(pages))
    }

    /// Whether the selector always yields exactly one page.
    pub fn is_single(&self) -> bool {
        matches!(self, PageSelector::Pages(pages) if pages.len() == 1)
    }

    /// Resolve to concrete page numbers for a document with `page_count` pages.
    pub fn select(&self, page_count: usize) -> Result<Vec<usize>> {
        match self {
            PageSelector::All => Ok((1..=page_count).collect()),
            PageSelector::Pages(pages) => {
                if let Some(page) = pages.iter().find(|p| **p > page_count) {
                    return Err(ReportError::Pdf(format!(
                        "Page {} requested but the document only has {} pages",
                        page, page_count
                    )));
                }
                Ok(pages.clone())
            }
        }
    }
}

impl FromStr for PageSelector {
    type Err = ReportError;

    /// Accepts `all`, a single page number, or a comma separated list.
    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("all") {
            return Ok(PageSelector::All);
        }

        let pages = s
            .split(',')
            .map(|part| part.trim().parse::<usize>())
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|_| {
                ReportError::config(format!(
                    "Invalid value for 'pdf_pages': '{}'. Use 'all', a page number or a list of page numbers",
                    s
                ))
            })?;
        PageSelector::pages(pages)
    }
}

/// Turns PDF pages into image files the renderer can place.
pub trait PageExtractor {
    fn extract(&self, pdf: &Path, pages: &PageSelector) -> Result<Vec<PathBuf>>;
}

/// Extracts pages with `pdfinfo` and `pdftoppm`.
pub struct PopplerExtractor {
    pub output_dir: PathBuf,
    pub dpi: u32,
}

impl PopplerExtractor {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            dpi: 150,
        }
    }

    fn page_count(&self, pdf: &Path) -> Result<usize> {
        let output = Command::new("pdfinfo").arg(pdf).output().map_err(|e| {
            ReportError::Pdf(format!(
                "Failed to run 'pdfinfo' (is poppler installed?): {}",
                e
            ))
        })?;
        if !output.status.success() {
            return Err(ReportError::Pdf(format!(
                "pdfinfo failed for {:?}: {}",
                pdf,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        parse_page_count(&String::from_utf8_lossy(&output.stdout))
            .ok_or_else(|| ReportError::Pdf(format!("Could not read page count of {:?}", pdf)))
    }
}

impl PageExtractor for PopplerExtractor {
    fn extract(&self, pdf: &Path, pages: &PageSelector) -> Result<Vec<PathBuf>> {
        let pages = pages.select(self.page_count(pdf)?)?;
        fs::create_dir_all(&self.output_dir)?;

        let digest = source_digest(pdf, self.dpi)?;

        let mut images = Vec::with_capacity(pages.len());
        for page in pages {
            let name = page_image_name(pdf, &digest, page);
            let prefix = self.output_dir.join(&name);
            let image = self.output_dir.join(format!("{}.png", name));
            if image.exists() {
                debug!("Reusing {:?} for page {} of {:?}", image, page, pdf);
            } else {
                debug!("Converting page {} of {:?} to {:?}", page, pdf, image);
                let status = Command::new("pdftoppm")
                    .arg("-png")
                    .arg("-singlefile")
                    .arg("-r")
                    .arg(self.dpi.to_string())
                    .arg("-f")
                    .arg(page.to_string())
                    .arg("-l")
                    .arg(page.to_string())
                    .arg(pdf)
                    .arg(&prefix)
                    .status()
                    .map_err(|e| {
                        ReportError::Pdf(format!(
                            "Failed to run 'pdftoppm' (is poppler installed?): {}",
                            e
                        ))
                    })?;
                if !status.success() {
                    return Err(ReportError::Pdf(format!(
                        "pdftoppm failed on page {} of {:?}",
                        page, pdf
                    )));
                }
            }
            images.push(image);
        }

        info!("Extracted {} pages from {:?}", images.len(), pdf);
        Ok(images)
    }
}

pub fn is_pdf(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.eq_ignore_ascii_case("pdf"))
        .unwrap_or(false)
}

/// SHA-256 of the PDF's bytes and the rendering resolution, as hex.
///
/// Page images are named after it, so a changed PDF or a different PDF with
/// the same file name never reuses stale images.
fn source_digest(pdf: &Path, dpi: u32) -> Result<String> {
    let bytes = fs::read(pdf)?;
    let mut hasher = Sha256::new();
    hasher.update(&bytes);
    hasher.update(dpi.to_le_bytes());
    Ok(format!("{:x}", hasher.finalize()))
}

/// File name (without extension) of one converted page.
fn page_image_name(pdf: &Path, digest: &str, page: usize) -> String {
    let stem = pdf
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "page".to_string());
    format!("{}_{}_page{}", stem, &digest[..digest.len().min(16)], page)
}

fn parse_page_count(info: &str) -> Option<usize> {
    info.lines()
        .find_map(|line| line.strip_prefix("Pages:"))
        .and_then(|count| count.trim().parse().ok())
}
