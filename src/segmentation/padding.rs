use image::{ImageBuffer, Pixel};

/// Axis that receives zero borders when squaring an image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PadAxis {
    /// Already square.
    None,
    /// Columns are added left and right (image is taller than wide).
    Width,
    /// Rows are added top and bottom (image is wider than tall).
    Height,
}

/// How many zero rows/columns go on each side of the shorter axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SquarePadding {
    pub axis: PadAxis,
    /// Added before the content (top or left).
    pub leading: u32,
    /// Added after the content (bottom or right). Gets the extra pixel when the difference is odd.
    pub trailing: u32,
}

impl SquarePadding {
    pub fn for_dimensions(width: u32, height: u32) -> Self {
        let diff = width.abs_diff(height);
        let leading = diff / 2;
        let trailing = diff - leading;
        let axis = if height > width {
            PadAxis::Width
        } else if width > height {
            PadAxis::Height
        } else {
            PadAxis::None
        };
        Self {
            axis,
            leading,
            trailing,
        }
    }

    /// Offset of the original content inside the padded image, as (x, y).
    pub fn content_offset(&self) -> (u32, u32) {
        match self.axis {
            PadAxis::None => (0, 0),
            PadAxis::Width => (self.leading, 0),
            PadAxis::Height => (0, self.leading),
        }
    }
}

/// Pad `img` with zeros along its shorter axis so that height == width.
pub fn pad_to_square<P>(img: &ImageBuffer<P, Vec<P::Subpixel>>) -> ImageBuffer<P, Vec<P::Subpixel>>
where
    P: Pixel,
{
    let (width, height) = img.dimensions();
    let padding = SquarePadding::for_dimensions(width, height);
    if padding.axis == PadAxis::None {
        return img.clone();
    }

    let side = width.max(height);
    let mut canvas = ImageBuffer::<P, Vec<P::Subpixel>>::new(side, side);
    let (offset_x, offset_y) = padding.content_offset();
    image::imageops::replace(&mut canvas, img, offset_x.into(), offset_y.into());
    canvas
}
