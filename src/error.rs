use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while cropping a single image.
///
/// Every variant is scoped to one file: the batch runner records it and moves
/// on to the next image.
#[derive(Debug, Error)]
pub enum CropError {
    /// The refined mask has no foreground pixel, so there is nothing to crop.
    #[error("refined mask contains no foreground pixels")]
    EmptyMask,

    /// The file extension is not in the configured allow-list.
    #[error("unsupported image format: {}", path.display())]
    UnsupportedFormat { path: PathBuf },

    /// The segmentation model failed or returned an unexpected shape.
    #[error("inference failed: {0}")]
    Inference(String),

    /// Input that cannot be processed (zero-sized image, mismatched mask, ...).
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl CropError {
    pub fn is_empty_mask(&self) -> bool {
        matches!(self, CropError::EmptyMask)
    }
}
