use crate::error::CropError;
use crate::models::ProbabilityMask;
use anyhow::Context;
use image::GrayImage;
use log::debug;
use rten::Model;
use rten_tensor::prelude::*;
use rten_tensor::{NdTensor, Tensor};
use std::path::Path;

/// Binary segmentation model that maps a square grayscale image to
/// per-pixel foreground probabilities of the same size.
///
/// Implementations must return probabilities already in [0, 1] (for example
/// after a sigmoid); the cropper thresholds the output directly.
pub trait SegmentationModel {
    fn predict(&self, input: &GrayImage) -> Result<ProbabilityMask, CropError>;
}

impl<F> SegmentationModel for F
where
    F: Fn(&GrayImage) -> Result<ProbabilityMask, CropError>,
{
    fn predict(&self, input: &GrayImage) -> Result<ProbabilityMask, CropError> {
        self(input)
    }
}

/// Segmentation model executed with the `rten` runtime.
pub struct RtenSegmentationModel {
    model: Model,
}

impl RtenSegmentationModel {
    /// Load an `.rten` model file.
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        anyhow::ensure!(path.is_file(), "model file not found: {}", path.display());
        let model = Model::load_file(path)
            .map_err(|e| anyhow::anyhow!("{e}"))
            .with_context(|| format!("failed to load segmentation model {}", path.display()))?;
        debug!("Loaded segmentation model {}", path.display());
        Ok(Self { model })
    }
}

impl SegmentationModel for RtenSegmentationModel {
    fn predict(&self, input: &GrayImage) -> Result<ProbabilityMask, CropError> {
        let (width, height) = input.dimensions();
        let (w, h) = (width as usize, height as usize);

        // Raw 0-255 intensities, shape [batch, channel, height, width].
        let data: Vec<f32> = input.pixels().map(|p| p[0] as f32).collect();
        let tensor = NdTensor::from_data([1, 1, h, w], data);

        let value = self
            .model
            .run_one(tensor.view().into(), None)
            .map_err(|e| CropError::Inference(e.to_string()))?;
        let output = Tensor::<f32>::try_from(value)
            .map_err(|e| CropError::Inference(format!("unexpected model output: {e}")))?;

        let shape = output.shape().to_vec();
        probabilities_from_output(&shape, output.to_vec(), width, height)
    }
}

/// Reshape a flat model output into a probability mask.
///
/// Accepts any shape whose last two dimensions are `height x width` and whose
/// leading dimensions are all 1 (`[1, 1, H, W]`, `[1, H, W]`, `[H, W]`).
pub fn probabilities_from_output(
    shape: &[usize],
    data: Vec<f32>,
    width: u32,
    height: u32,
) -> Result<ProbabilityMask, CropError> {
    let rank = shape.len();
    let matches = rank >= 2
        && shape[rank - 2] == height as usize
        && shape[rank - 1] == width as usize
        && shape[..rank - 2].iter().all(|&d| d == 1);
    if !matches {
        return Err(CropError::Inference(format!(
            "expected model output of size {height}x{width}, got shape {shape:?}"
        )));
    }

    ProbabilityMask::from_raw(width, height, data).ok_or_else(|| {
        CropError::Inference("model output buffer does not match its shape".to_string())
    })
}
