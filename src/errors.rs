// ABOUTME: Error types for the pptreport application
// ABOUTME: Separates fatal configuration/not-found failures from the slide-skip control signal

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Failed to access file: {0}")]
    Io(#[from] std::io::Error),

    #[error("No files could be found for pattern: '{pattern}'")]
    NotFound { pattern: String },

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Slide {slide}: {source}")]
    InSlide {
        slide: usize,
        #[source]
        source: Box<ReportError>,
    },

    /// Raised by `missing_file = "skip-slide"`. The slide expander consumes it;
    /// it never reaches the caller of [`crate::expand::expand`].
    #[error("Slide skipped because pattern '{pattern}' matched no files")]
    SlideSkipped { pattern: String },

    #[error("Failed to parse configuration: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Image error: {0}")]
    Image(String),

    #[error("PPTX generation error: {0}")]
    Package(String),

    #[error("PDF conversion error: {0}")]
    Pdf(String),
}

impl ReportError {
    pub fn config(message: impl Into<String>) -> Self {
        ReportError::Configuration(message.into())
    }

    /// Attach the 1-based slide number to an error, unless it already has one.
    pub fn in_slide(self, slide: usize) -> Self {
        match self {
            ReportError::InSlide { .. } => self,
            other => ReportError::InSlide {
                slide,
                source: Box::new(other),
            },
        }
    }
}

// Implement conversion from zip errors
impl From<zip::result::ZipError> for ReportError {
    fn from(err: zip::result::ZipError) -> Self {
        ReportError::Package(format!("ZIP operation failed: {}", err))
    }
}

impl From<image::ImageError> for ReportError {
    fn from(err: image::ImageError) -> Self {
        ReportError::Image(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ReportError>;
