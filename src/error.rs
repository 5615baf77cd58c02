//! Error types for opening documents and rendering pages.

use crate::request::{CompressFormat, CropRect};

/// Result type alias for rendering operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Everything that can go wrong between opening a document and handing back
/// encoded page bytes.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Reading the document from disk failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The document could not be parsed as a PDF.
    #[error("failed to parse PDF: {0}")]
    Parse(String),

    /// The requested 1-based page number does not exist.
    #[error("page {number} not found (document has {count} pages)")]
    PageNotFound {
        /// Requested page number
        number: u32,
        /// Number of pages in the document
        count: usize,
    },

    /// The render parameters are inconsistent or out of range.
    #[error("invalid render request: {0}")]
    InvalidRequest(String),

    /// A background color string could not be parsed.
    #[error("invalid color '{0}': expected #RRGGBB or #AARRGGBB")]
    InvalidColor(String),

    /// The pixel canvas could not be allocated, or is larger than
    /// [`MAX_CANVAS_PIXELS`](crate::MAX_CANVAS_PIXELS).
    #[error("failed to allocate a {width}x{height} canvas")]
    CanvasAllocation {
        /// Canvas width in pixels
        width: u32,
        /// Canvas height in pixels
        height: u32,
    },

    /// The page could not be looked up for rasterizing.
    #[error("failed to rasterize page: {0}")]
    Rasterize(String),

    /// The finished canvas could not be encoded.
    #[error("{format} encoding failed: {reason}")]
    Encoding {
        /// Target format
        format: CompressFormat,
        /// Encoder message
        reason: String,
    },

    /// The crop rectangle is not fully inside the rendered canvas.
    #[error("crop rectangle {crop} does not fit the {width}x{height} canvas")]
    CropOutOfBounds {
        /// Requested crop
        crop: CropRect,
        /// Canvas width in pixels
        width: u32,
        /// Canvas height in pixels
        height: u32,
    },
}
