//! Persistence of the cropped image and its mask.
//!
//! Both artifacts are encoded in memory, written to staging files next to
//! their destinations, and only then renamed into place. Any failure removes
//! whatever was staged, so a file either gets both artifacts or neither.

use crate::config::CropConfig;
use crate::error::CropError;
use crate::models::BinaryMask;
use anyhow::Context;
use image::{ImageFormat, RgbImage};
use log::{debug, warn};
use std::ffi::OsStr;
use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Locations of the two artifacts written for one source image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedArtifacts {
    pub image: PathBuf,
    pub mask: PathBuf,
}

/// Writes crop/mask pairs under `<root>/<images_dir>` and `<root>/<masks_dir>`.
#[derive(Debug, Clone)]
pub struct ArtifactWriter {
    images_dir: PathBuf,
    masks_dir: PathBuf,
}

impl ArtifactWriter {
    /// Create both output directories under `root`.
    pub fn create(root: &Path, config: &CropConfig) -> anyhow::Result<Self> {
        let images_dir = root.join(&config.images_dir);
        let masks_dir = root.join(&config.masks_dir);
        for dir in [&images_dir, &masks_dir] {
            fs::create_dir_all(dir)
                .with_context(|| format!("failed to create output directory {}", dir.display()))?;
        }
        Ok(Self {
            images_dir,
            masks_dir,
        })
    }

    pub fn images_dir(&self) -> &Path {
        &self.images_dir
    }

    pub fn masks_dir(&self) -> &Path {
        &self.masks_dir
    }

    /// Final paths for a source file name, as (image, mask).
    pub fn paths_for(&self, file_name: &OsStr) -> SavedArtifacts {
        SavedArtifacts {
            image: self.images_dir.join(file_name),
            mask: self.masks_dir.join(file_name),
        }
    }

    /// Persist `crop` and `mask` under `file_name`, all or nothing.
    ///
    /// The encoding format follows the file name's extension.
    pub fn write_pair(
        &self,
        file_name: &OsStr,
        crop: &RgbImage,
        mask: &BinaryMask,
    ) -> Result<SavedArtifacts, CropError> {
        let targets = self.paths_for(file_name);
        let format = ImageFormat::from_path(&targets.image)?;

        let mut image_bytes = Vec::new();
        crop.write_to(&mut Cursor::new(&mut image_bytes), format)?;
        let mut mask_bytes = Vec::new();
        mask.write_to(&mut Cursor::new(&mut mask_bytes), format)?;

        let staged_image = stage(&self.images_dir, file_name, &image_bytes)?;
        let staged_mask = match stage(&self.masks_dir, file_name, &mask_bytes) {
            Ok(path) => path,
            Err(err) => {
                discard(&staged_image);
                return Err(err.into());
            }
        };

        if let Err(err) = fs::rename(&staged_image, &targets.image) {
            discard(&staged_image);
            discard(&staged_mask);
            return Err(err.into());
        }
        if let Err(err) = fs::rename(&staged_mask, &targets.mask) {
            discard(&staged_mask);
            discard(&targets.image);
            return Err(err.into());
        }

        debug!(
            "Saved {} and {}",
            targets.image.display(),
            targets.mask.display()
        );
        Ok(targets)
    }
}

fn stage(dir: &Path, file_name: &OsStr, bytes: &[u8]) -> std::io::Result<PathBuf> {
    let staging = dir.join(format!(
        ".{}.{}.partial",
        file_name.to_string_lossy(),
        Uuid::new_v4().simple()
    ));
    if let Err(err) = fs::write(&staging, bytes) {
        discard(&staging);
        return Err(err);
    }
    Ok(staging)
}

fn discard(path: &Path) {
    if path.exists() {
        if let Err(err) = fs::remove_file(path) {
            warn!("Failed to remove {}: {err}", path.display());
        }
    }
}
