use image::{GrayImage, Luma, Rgb, RgbImage};
use retinacrop::{BinaryMask, CropError, ProbabilityMask};
use std::path::{Path, PathBuf};

/// Probability mask with a filled disk of `inside` on a field of `outside`.
pub fn disk_probabilities(
    size: u32,
    center: (f32, f32),
    radius: f32,
    inside: f32,
    outside: f32,
) -> ProbabilityMask {
    ProbabilityMask::from_fn(size, size, |x, y| {
        let dx = x as f32 - center.0;
        let dy = y as f32 - center.1;
        if (dx * dx + dy * dy).sqrt() <= radius {
            Luma([inside])
        } else {
            Luma([outside])
        }
    })
}

/// Binary mask with every pixel inside one of the `rects` (x, y, width, height) set to 255.
pub fn mask_with_rects(width: u32, height: u32, rects: &[(u32, u32, u32, u32)]) -> BinaryMask {
    GrayImage::from_fn(width, height, |x, y| {
        let on = rects
            .iter()
            .any(|&(rx, ry, rw, rh)| x >= rx && x < rx + rw && y >= ry && y < ry + rh);
        Luma([if on { 255 } else { 0 }])
    })
}

/// Synthetic fundus photograph: a warm bright disk on a black background.
pub fn fundus_image(width: u32, height: u32, radius: f32) -> RgbImage {
    let cx = width as f32 / 2.0;
    let cy = height as f32 / 2.0;
    RgbImage::from_fn(width, height, |x, y| {
        let dx = x as f32 + 0.5 - cx;
        let dy = y as f32 + 0.5 - cy;
        if (dx * dx + dy * dy).sqrt() <= radius {
            Rgb([200u8, 120u8, 60u8])
        } else {
            Rgb([0u8, 0u8, 0u8])
        }
    })
}

/// Save a synthetic fundus image into `dir` and return its path.
pub fn write_fundus(dir: &Path, name: &str, width: u32, height: u32, radius: f32) -> PathBuf {
    let path = dir.join(name);
    fundus_image(width, height, radius)
        .save(&path)
        .expect("Failed to save fundus fixture");
    path
}

/// Model stand-in that marks every pixel brighter than `cutoff` as retina.
pub fn brightness_model(cutoff: u8) -> impl Fn(&GrayImage) -> Result<ProbabilityMask, CropError> {
    move |input: &GrayImage| {
        Ok(ProbabilityMask::from_fn(input.width(), input.height(), |x, y| {
            if input.get_pixel(x, y)[0] > cutoff {
                Luma([0.9])
            } else {
                Luma([0.1])
            }
        }))
    }
}

/// Model stand-in that always answers with the same centred disk.
pub fn disk_model(radius: f32) -> impl Fn(&GrayImage) -> Result<ProbabilityMask, CropError> {
    move |input: &GrayImage| {
        let size = input.width();
        let center = size as f32 / 2.0;
        Ok(disk_probabilities(size, (center, center), radius, 0.9, 0.1))
    }
}

/// Model stand-in that never finds any retina.
pub fn blank_model() -> impl Fn(&GrayImage) -> Result<ProbabilityMask, CropError> {
    |input: &GrayImage| Ok(ProbabilityMask::from_pixel(input.width(), input.height(), Luma([0.1])))
}

/// Sorted file names directly inside `dir`.
pub fn list_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .expect("Failed to list directory")
        .map(|entry| entry.expect("Bad entry").file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

pub fn foreground(mask: &BinaryMask) -> usize {
    mask.pixels().filter(|p| p[0] != 0).count()
}
