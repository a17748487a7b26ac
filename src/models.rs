use image::{GrayImage, ImageBuffer, Luma, RgbImage};

/// Per-pixel foreground probability produced by the segmentation model.
pub type ProbabilityMask = ImageBuffer<Luma<f32>, Vec<f32>>;

/// Binary mask stored as 8-bit {0, 255}.
pub type BinaryMask = GrayImage;

/// Foreground value of a [`BinaryMask`].
pub const MASK_ON: u8 = 255;
/// Background value of a [`BinaryMask`].
pub const MASK_OFF: u8 = 0;

/// Tight, inclusive bounding box of the foreground pixels of a mask.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundingBox {
    pub x_min: u32,
    pub x_max: u32,
    pub y_min: u32,
    pub y_max: u32,
}

impl BoundingBox {
    pub fn width(&self) -> u32 {
        self.x_max - self.x_min + 1
    }

    pub fn height(&self) -> u32 {
        self.y_max - self.y_min + 1
    }

    pub fn area(&self) -> u32 {
        self.width() * self.height()
    }

    pub fn contains(&self, x: u32, y: u32) -> bool {
        (self.x_min..=self.x_max).contains(&x) && (self.y_min..=self.y_max).contains(&y)
    }
}

/// One labelled connected group of a mask.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Region {
    pub label: u32,
    pub pixel_count: u32,
}

impl Region {
    /// Share of the whole frame covered by this region.
    pub fn fraction_of(&self, total_pixels: u32) -> f32 {
        if total_pixels == 0 {
            return 0.0;
        }
        self.pixel_count as f32 / total_pixels as f32
    }
}

/// Result of cropping one fundus image, before anything touches the disk.
#[derive(Debug, Clone)]
pub struct CropOutput {
    /// Masked, cropped and square-padded RGB image.
    pub crop: RgbImage,
    /// Refined mask at the original image resolution, {0, 255}.
    pub mask: BinaryMask,
    /// Bounding box of the mask in original image coordinates.
    pub bbox: BoundingBox,
}
