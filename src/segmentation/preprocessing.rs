use crate::models::{BinaryMask, MASK_OFF, MASK_ON, ProbabilityMask};
use image::imageops::FilterType;
use image::{DynamicImage, GrayImage, Luma};
use imageproc::distance_transform::Norm;
use imageproc::morphology::erode;

/// Convert image to grayscale
pub fn to_grayscale(img: &DynamicImage) -> GrayImage {
    img.to_luma8()
}

/// Grayscale copy of `img` resized to the square model resolution
pub fn model_input(img: &DynamicImage, target_size: u32) -> GrayImage {
    let gray = to_grayscale(img);
    image::imageops::resize(&gray, target_size, target_size, FilterType::CatmullRom)
}

/// Binarize a probability mask: strictly above `threshold` is foreground
///
/// A probability equal to the threshold (or NaN) stays background.
pub fn threshold_probabilities(probabilities: &ProbabilityMask, threshold: f32) -> BinaryMask {
    let (width, height) = probabilities.dimensions();
    GrayImage::from_fn(width, height, |x, y| {
        if probabilities.get_pixel(x, y)[0] > threshold {
            Luma([MASK_ON])
        } else {
            Luma([MASK_OFF])
        }
    })
}

/// Minimum filter with a square `kernel_size` window
///
/// Pixels outside the image never count as background, so foreground touching
/// the frame border is not eroded from that side.
pub fn erode_mask(mask: &BinaryMask, kernel_size: u32) -> BinaryMask {
    let radius = (kernel_size / 2).min(u8::MAX as u32) as u8;
    if radius == 0 {
        return mask.clone();
    }
    erode(mask, Norm::LInf, radius)
}

/// Resize a binary mask and snap the result back to {0, 255}
pub fn resize_mask(mask: &BinaryMask, width: u32, height: u32) -> BinaryMask {
    let resized = image::imageops::resize(mask, width, height, FilterType::Nearest);
    rebinarize(&resized)
}

/// Re-threshold an 8-bit mask at mid-range after interpolation
pub fn rebinarize(mask: &GrayImage) -> BinaryMask {
    let (width, height) = mask.dimensions();
    GrayImage::from_fn(width, height, |x, y| {
        if mask.get_pixel(x, y)[0] >= 128 {
            Luma([MASK_ON])
        } else {
            Luma([MASK_OFF])
        }
    })
}
