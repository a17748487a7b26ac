use crate::config::CropConfig;
use crate::error::CropError;
use crate::models::{BinaryMask, ProbabilityMask};
use crate::pipeline::{MaskPipeline, PipelineContext};
use crate::segmentation::components::ComponentGroupFilter;
use crate::segmentation::preprocessing;
use crate::segmentation::steps::{ComponentFilterStep, ErosionStep};
use std::sync::Arc;

/// Turns a probability mask into a clean {0, 255} binary mask.
///
/// Thresholding is followed by the clean-up pipeline: erosion, then removal of
/// small connected groups.
#[derive(Clone)]
pub struct MaskRefiner {
    threshold: f32,
    pipeline: MaskPipeline,
}

impl MaskRefiner {
    pub fn new(threshold: f32, erosion_size: u32, filter: ComponentGroupFilter) -> Self {
        let pipeline = MaskPipeline::new()
            .add_step(Arc::new(ErosionStep {
                kernel_size: erosion_size,
            }))
            .add_step(Arc::new(ComponentFilterStep { filter }));
        Self {
            threshold,
            pipeline,
        }
    }

    pub fn from_config(config: &CropConfig) -> Self {
        Self::new(
            config.threshold,
            config.erosion_size,
            ComponentGroupFilter::new(config.min_group_fraction, config.connectivity.into()),
        )
    }

    /// Replace the clean-up steps that run after thresholding.
    pub fn with_pipeline(mut self, pipeline: MaskPipeline) -> Self {
        self.pipeline = pipeline;
        self
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    pub fn pipeline(&self) -> &MaskPipeline {
        &self.pipeline
    }

    pub fn refine(
        &self,
        probabilities: &ProbabilityMask,
        context: &PipelineContext,
    ) -> Result<BinaryMask, CropError> {
        let binary = preprocessing::threshold_probabilities(probabilities, self.threshold);
        self.pipeline.run(binary, context)
    }
}

impl Default for MaskRefiner {
    fn default() -> Self {
        Self::from_config(&CropConfig::default())
    }
}
