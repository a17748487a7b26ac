use crate::error::CropError;
use crate::models::{BinaryMask, MASK_OFF};
use log::debug;
use std::sync::Arc;

/// Context available to all mask steps
#[derive(Clone, Debug, Default)]
pub struct PipelineContext {
    /// Name of the image being processed (used in log lines)
    pub source: String,
}

impl PipelineContext {
    pub fn for_source(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
        }
    }
}

/// Trait that all binary mask steps must implement
///
/// A step consumes one mask and returns a new mask of the same dimensions.
pub trait MaskStep: Send + Sync {
    fn process(&self, mask: BinaryMask, context: &PipelineContext) -> Result<BinaryMask, CropError>;

    /// Human-readable name for this step (used in log output)
    fn name(&self) -> &str;
}

/// Composable pipeline of mask clean-up steps
#[derive(Clone, Default)]
pub struct MaskPipeline {
    steps: Vec<Arc<dyn MaskStep>>,
}

impl MaskPipeline {
    /// Create a new empty pipeline
    pub fn new() -> Self {
        Self { steps: Vec::new() }
    }

    /// Add a processing step to the pipeline
    pub fn add_step(mut self, step: Arc<dyn MaskStep>) -> Self {
        self.steps.push(step);
        self
    }

    /// Helper method to add a step from a Box
    pub fn add_step_boxed(mut self, step: Box<dyn MaskStep>) -> Self {
        self.steps.push(Arc::from(step));
        self
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn step_names(&self) -> Vec<&str> {
        self.steps.iter().map(|step| step.name()).collect()
    }

    /// Run every step in order
    pub fn run(&self, mask: BinaryMask, context: &PipelineContext) -> Result<BinaryMask, CropError> {
        self.run_partial(mask, self.steps.len(), context)
    }

    /// Run only the first `num_steps` steps (useful for inspecting intermediate masks)
    pub fn run_partial(
        &self,
        mut mask: BinaryMask,
        num_steps: usize,
        context: &PipelineContext,
    ) -> Result<BinaryMask, CropError> {
        for step in self.steps.iter().take(num_steps) {
            let (width, height) = mask.dimensions();
            mask = step.process(mask, context)?;
            if mask.dimensions() != (width, height) {
                return Err(CropError::InvalidInput(format!(
                    "step '{}' changed mask size from {}x{} to {}x{}",
                    step.name(),
                    width,
                    height,
                    mask.width(),
                    mask.height()
                )));
            }
            debug!(
                "{}: {} -> {} foreground pixels",
                context.source,
                step.name(),
                foreground_count(&mask)
            );
        }
        Ok(mask)
    }
}

/// Number of non-background pixels in a binary mask
pub fn foreground_count(mask: &BinaryMask) -> usize {
    mask.pixels().filter(|p| p[0] != MASK_OFF).count()
}
