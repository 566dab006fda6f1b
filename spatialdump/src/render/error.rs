//! Error types for rasterization and PNG output.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while rendering or writing the raster.
#[derive(Debug, Error)]
pub enum RenderError {
    /// Canvas dimensions the raster backend cannot allocate.
    #[error("Invalid dimensions {width}×{height}")]
    InvalidDimensions { width: u32, height: u32 },

    /// The reference corners span no area on one axis.
    #[error("Degenerate view: {0}")]
    DegenerateView(String),

    /// A style value outside its valid range.
    #[error("Invalid style: {0}")]
    InvalidStyle(String),

    /// PNG encoding failed.
    #[error("PNG encoding failed: {0}")]
    Encode(#[from] image::ImageError),

    /// The output file could not be written.
    #[error("Failed to write '{}': {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}
