pub mod bbox;
pub mod components;
pub mod model;
pub mod padding;
pub mod preprocessing;
pub mod refine;
pub mod steps;

use crate::config::CropConfig;
use crate::error::CropError;
use crate::models::{BinaryMask, CropOutput};
use crate::output::{ArtifactWriter, SavedArtifacts};
use crate::pipeline::PipelineContext;
use image::{DynamicImage, ImageReader, Rgb, Rgb32FImage, RgbImage};
use log::debug;
use std::path::Path;

pub use bbox::extract_bounding_box;
pub use components::ComponentGroupFilter;
pub use model::{RtenSegmentationModel, SegmentationModel};
pub use padding::{SquarePadding, pad_to_square};
pub use refine::MaskRefiner;

/// Crops the retina out of a fundus photograph.
///
/// The model only ever sees a `target_size` square grayscale copy of the
/// input; its mask is refined, scaled back to the original resolution and used
/// to blank the background before cropping and squaring the result.
#[derive(Clone)]
pub struct RetinaCropper {
    config: CropConfig,
    refiner: MaskRefiner,
    target_size: u32,
}

impl RetinaCropper {
    pub fn new(config: CropConfig, target_size: u32) -> anyhow::Result<Self> {
        anyhow::ensure!(target_size > 0, "target size must be a positive integer");
        config.validate()?;
        let refiner = MaskRefiner::from_config(&config);
        Ok(Self {
            config,
            refiner,
            target_size,
        })
    }

    /// Use a custom refiner instead of the one derived from the config.
    pub fn with_refiner(mut self, refiner: MaskRefiner) -> Self {
        self.refiner = refiner;
        self
    }

    pub fn config(&self) -> &CropConfig {
        &self.config
    }

    pub fn target_size(&self) -> u32 {
        self.target_size
    }

    /// Run the whole mask-and-crop chain in memory.
    pub fn crop_image(
        &self,
        image: &DynamicImage,
        model: &dyn SegmentationModel,
        context: &PipelineContext,
    ) -> Result<CropOutput, CropError> {
        let (width, height) = (image.width(), image.height());
        if width == 0 || height == 0 {
            return Err(CropError::InvalidInput(format!(
                "image has zero size ({width}x{height})"
            )));
        }

        let input = preprocessing::model_input(image, self.target_size);
        let probabilities = model.predict(&input)?;
        if probabilities.dimensions() != (self.target_size, self.target_size) {
            return Err(CropError::Inference(format!(
                "model returned a {}x{} mask for a {}x{} input",
                probabilities.width(),
                probabilities.height(),
                self.target_size,
                self.target_size
            )));
        }

        let refined = self.refiner.refine(&probabilities, context)?;
        let mask = preprocessing::resize_mask(&refined, width, height);
        let bbox = extract_bounding_box(&mask)?;
        debug!(
            "{}: retina box x {}..={}, y {}..={}",
            context.source, bbox.x_min, bbox.x_max, bbox.y_min, bbox.y_max
        );

        let masked = apply_mask(&image.to_rgb8(), &mask)?;
        let cropped =
            image::imageops::crop_imm(&masked, bbox.x_min, bbox.y_min, bbox.width(), bbox.height())
                .to_image();
        let squared = pad_to_square(&cropped);
        let crop = DynamicImage::ImageRgb32F(squared).to_rgb8();

        Ok(CropOutput { crop, mask, bbox })
    }

    /// Decode `path`, crop it and persist both artifacts through `writer`.
    ///
    /// Nothing is written unless every earlier stage succeeded.
    pub fn process_file(
        &self,
        path: &Path,
        model: &dyn SegmentationModel,
        writer: &ArtifactWriter,
    ) -> Result<SavedArtifacts, CropError> {
        if !self.config.accepts(path) {
            return Err(CropError::UnsupportedFormat {
                path: path.to_path_buf(),
            });
        }
        let file_name = path.file_name().ok_or_else(|| {
            CropError::InvalidInput(format!("{} has no file name", path.display()))
        })?;

        let image = ImageReader::open(path)?.with_guessed_format()?.decode()?;
        let context = PipelineContext::for_source(file_name.to_string_lossy());
        let output = self.crop_image(&image, model, &context)?;
        writer.write_pair(file_name, &output.crop, &output.mask)
    }
}

/// Multiply an 8-bit RGB image (scaled to [0, 1]) by a {0, 255} mask.
pub fn apply_mask(image: &RgbImage, mask: &BinaryMask) -> Result<Rgb32FImage, CropError> {
    if image.dimensions() != mask.dimensions() {
        return Err(CropError::InvalidInput(format!(
            "mask is {}x{} but image is {}x{}",
            mask.width(),
            mask.height(),
            image.width(),
            image.height()
        )));
    }
    let (width, height) = image.dimensions();
    Ok(Rgb32FImage::from_fn(width, height, |x, y| {
        let weight = mask.get_pixel(x, y)[0] as f32 / 255.0;
        let pixel = image.get_pixel(x, y);
        Rgb(pixel.0.map(|channel| channel as f32 / 255.0 * weight))
    }))
}
