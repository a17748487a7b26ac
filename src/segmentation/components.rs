use crate::models::{BinaryMask, MASK_OFF, MASK_ON, Region};
use image::{GrayImage, ImageBuffer, Luma};
use imageproc::region_labelling::{Connectivity, connected_components};
use log::debug;
use std::collections::{BTreeMap, BTreeSet};

/// Label image produced by connected-component analysis
pub type LabelImage = ImageBuffer<Luma<u32>, Vec<u32>>;

/// Label connected groups of a binary mask.
///
/// Returns the label image and one [`Region`] per distinct label in ascending
/// label order. Background pixels share a single label.
pub fn label_regions(mask: &BinaryMask, connectivity: Connectivity) -> (LabelImage, Vec<Region>) {
    let labeled = connected_components(mask, connectivity, Luma([MASK_OFF]));

    let mut counts: BTreeMap<u32, u32> = BTreeMap::new();
    for label in labeled.pixels() {
        *counts.entry(label[0]).or_insert(0) += 1;
    }

    let regions = counts
        .into_iter()
        .map(|(label, pixel_count)| Region { label, pixel_count })
        .collect();
    (labeled, regions)
}

/// Find the label that stands for the background of the source mask.
///
/// The labelling does not promise which value the background gets, so the
/// background is the first region (in ascending label order) whose size equals
/// the number of zero pixels in the source mask.
pub fn find_background_label(regions: &[Region], zero_count: u32) -> Option<u32> {
    regions
        .iter()
        .find(|region| region.pixel_count == zero_count)
        .map(|region| region.label)
}

/// Removes connected groups that cover too small a share of the frame.
#[derive(Debug, Clone, Copy)]
pub struct ComponentGroupFilter {
    /// Groups below this share of all pixels are folded into the background.
    pub min_group_fraction: f32,
    pub connectivity: Connectivity,
}

impl Default for ComponentGroupFilter {
    fn default() -> Self {
        Self {
            min_group_fraction: 0.30,
            connectivity: Connectivity::Four,
        }
    }
}

impl ComponentGroupFilter {
    pub fn new(min_group_fraction: f32, connectivity: Connectivity) -> Self {
        Self {
            min_group_fraction,
            connectivity,
        }
    }

    /// Keep only the dominant groups of `mask`, re-encoded as {0, 255}.
    ///
    /// A mask holding a single label (all background or all foreground) is
    /// returned unchanged.
    pub fn filter(&self, mask: &BinaryMask) -> BinaryMask {
        let (width, height) = mask.dimensions();
        let total = width * height;
        if total == 0 {
            return mask.clone();
        }

        let (labeled, regions) = label_regions(mask, self.connectivity);
        if regions.len() <= 1 {
            return mask.clone();
        }

        let zero_count = mask.pixels().filter(|p| p[0] == MASK_OFF).count() as u32;
        let Some(background) = find_background_label(&regions, zero_count) else {
            debug!("no region matches the {zero_count} background pixels; mask left as is");
            return mask.clone();
        };

        let dropped: BTreeSet<u32> = regions
            .iter()
            .filter(|region| {
                region.label != background && region.fraction_of(total) < self.min_group_fraction
            })
            .map(|region| region.label)
            .collect();

        debug!(
            "{} regions, background label {}, {} dropped below {:.0}%",
            regions.len(),
            background,
            dropped.len(),
            self.min_group_fraction * 100.0
        );

        GrayImage::from_fn(width, height, |x, y| {
            let label = labeled.get_pixel(x, y)[0];
            if label == background || dropped.contains(&label) {
                Luma([MASK_OFF])
            } else {
                Luma([MASK_ON])
            }
        })
    }
}
