//! Tunable parameters for mask refinement and batch output layout.
//!
//! Defaults give the standard fundus cropping behaviour; a JSON file with any
//! subset of the fields can override them.

use anyhow::{Context, Result};
use imageproc::region_labelling::Connectivity;
use log::LevelFilter;
use serde::{Deserialize, Serialize};
use std::{fs, path::Path};

/// Pixel adjacency used when grouping mask pixels into connected regions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaskConnectivity {
    /// Edge neighbours only.
    #[default]
    Four,
    /// Edge and corner neighbours.
    Eight,
}

impl From<MaskConnectivity> for Connectivity {
    fn from(value: MaskConnectivity) -> Self {
        match value {
            MaskConnectivity::Four => Connectivity::Four,
            MaskConnectivity::Eight => Connectivity::Eight,
        }
    }
}

/// Settings shared by the cropper and the batch runner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CropConfig {
    /// Probabilities strictly above this value become foreground.
    pub threshold: f32,
    /// Side of the square minimum-filter kernel. Must be odd.
    pub erosion_size: u32,
    /// Connected groups smaller than this share of the frame are dropped.
    pub min_group_fraction: f32,
    pub connectivity: MaskConnectivity,
    /// Filename suffixes accepted by the batch runner (case-sensitive).
    pub extensions: Vec<String>,
    /// Subdirectory of the destination root that receives cropped images.
    pub images_dir: String,
    /// Subdirectory of the destination root that receives refined masks.
    pub masks_dir: String,
}

impl Default for CropConfig {
    fn default() -> Self {
        Self {
            threshold: 0.5,
            erosion_size: 3,
            min_group_fraction: 0.30,
            connectivity: MaskConnectivity::Four,
            extensions: ["jpeg", "jpg", "JPG", "png", "PNG", "bmp"]
                .iter()
                .map(|ext| ext.to_string())
                .collect(),
            images_dir: "Images".to_string(),
            masks_dir: "Masks".to_string(),
        }
    }
}

impl CropConfig {
    /// Load settings from a JSON file. Missing fields keep their defaults.
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read settings file {}", path.display()))?;
        let config: CropConfig = serde_json::from_str(&contents)
            .with_context(|| format!("failed to parse settings JSON at {}", path.display()))?;
        config
            .validate()
            .with_context(|| format!("invalid settings in {}", path.display()))?;
        Ok(config)
    }

    /// Serialize settings to disk in pretty-printed JSON, overwriting any existing file.
    pub fn save_to_path<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let payload =
            serde_json::to_string_pretty(self).context("failed to serialize settings JSON")?;
        fs::write(path, payload)
            .with_context(|| format!("failed to write settings file {}", path.display()))?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        anyhow::ensure!(
            self.threshold > 0.0 && self.threshold < 1.0,
            "threshold must lie in (0, 1), got {}",
            self.threshold
        );
        anyhow::ensure!(
            self.erosion_size % 2 == 1,
            "erosion_size must be a positive odd number, got {}",
            self.erosion_size
        );
        anyhow::ensure!(
            (0.0..=1.0).contains(&self.min_group_fraction),
            "min_group_fraction must lie in [0, 1], got {}",
            self.min_group_fraction
        );
        anyhow::ensure!(
            !self.extensions.is_empty(),
            "at least one accepted extension is required"
        );
        anyhow::ensure!(
            !self.images_dir.is_empty() && !self.masks_dir.is_empty() && self.images_dir != self.masks_dir,
            "images_dir and masks_dir must be distinct non-empty names"
        );
        Ok(())
    }

    /// Whether the file name ends with one of the accepted suffixes.
    pub fn accepts(&self, path: &Path) -> bool {
        path.file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| self.extensions.iter().any(|ext| name.ends_with(ext.as_str())))
    }
}

/// Initialize logging once for the CLI.
///
/// `RUST_LOG` takes precedence over `default_filter` when set.
pub fn init_logging(default_filter: LevelFilter) {
    // A second call (tests, embedding) keeps the existing logger.
    let _ = env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(default_filter.as_str()),
    )
    .try_init();
}
