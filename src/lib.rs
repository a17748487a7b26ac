pub mod batch;
pub mod config;
pub mod error;
pub mod models;
pub mod output;
pub mod pipeline;
pub mod segmentation;
pub mod training;

pub use batch::{BatchReport, BatchRunner, BatchSummary, FileFailure, ProcessedFile};
pub use config::{CropConfig, MaskConnectivity};
pub use error::CropError;
pub use models::{BinaryMask, BoundingBox, CropOutput, ProbabilityMask, Region};
pub use output::{ArtifactWriter, SavedArtifacts};
pub use pipeline::{MaskPipeline, MaskStep, PipelineContext};
pub use segmentation::{
    ComponentGroupFilter, MaskRefiner, RetinaCropper, RtenSegmentationModel, SegmentationModel,
    SquarePadding, extract_bounding_box, pad_to_square,
};
