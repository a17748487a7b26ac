use crate::error::CropError;
use crate::models::BinaryMask;
use crate::pipeline::{MaskStep, PipelineContext};
use crate::segmentation::components::ComponentGroupFilter;
use crate::segmentation::preprocessing;

/// Morphological erosion with a square minimum filter
pub struct ErosionStep {
    pub kernel_size: u32,
}

impl MaskStep for ErosionStep {
    fn process(&self, mask: BinaryMask, _context: &PipelineContext) -> Result<BinaryMask, CropError> {
        Ok(preprocessing::erode_mask(&mask, self.kernel_size))
    }

    fn name(&self) -> &str {
        "Erosion"
    }
}

/// Drop connected groups below a share of the frame
pub struct ComponentFilterStep {
    pub filter: ComponentGroupFilter,
}

impl MaskStep for ComponentFilterStep {
    fn process(&self, mask: BinaryMask, _context: &PipelineContext) -> Result<BinaryMask, CropError> {
        Ok(self.filter.filter(&mask))
    }

    fn name(&self) -> &str {
        "Component Filtering"
    }
}
