mod fixtures;
pub use fixtures::*;

// Re-export commonly used types from retinacrop for tests
pub use retinacrop::{
    ArtifactWriter, BatchRunner, BinaryMask, BoundingBox, ComponentGroupFilter, CropConfig,
    CropError, MaskRefiner, PipelineContext, ProbabilityMask, RetinaCropper,
};
