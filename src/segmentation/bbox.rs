use crate::error::CropError;
use crate::models::{BinaryMask, BoundingBox, MASK_OFF};

/// Tight bounding box of every non-zero pixel of `mask`.
///
/// Fails with [`CropError::EmptyMask`] when the mask has no foreground.
pub fn extract_bounding_box(mask: &BinaryMask) -> Result<BoundingBox, CropError> {
    let mut bbox: Option<BoundingBox> = None;

    for (x, y, pixel) in mask.enumerate_pixels() {
        if pixel[0] == MASK_OFF {
            continue;
        }
        bbox = Some(match bbox {
            None => BoundingBox {
                x_min: x,
                x_max: x,
                y_min: y,
                y_max: y,
            },
            Some(b) => BoundingBox {
                x_min: b.x_min.min(x),
                x_max: b.x_max.max(x),
                y_min: b.y_min.min(y),
                y_max: b.y_max.max(y),
            },
        });
    }

    bbox.ok_or(CropError::EmptyMask)
}
