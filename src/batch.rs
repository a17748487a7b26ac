use crate::error::CropError;
use crate::output::{ArtifactWriter, SavedArtifacts};
use crate::segmentation::{RetinaCropper, SegmentationModel};
use anyhow::{Context, Result};
use log::{info, warn};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

/// A source image whose crop and mask were both written.
#[derive(Debug, Clone)]
pub struct ProcessedFile {
    pub source: PathBuf,
    pub artifacts: SavedArtifacts,
}

/// A source image that failed somewhere in the pipeline.
#[derive(Debug)]
pub struct FileFailure {
    pub source: PathBuf,
    pub error: CropError,
}

/// Outcome of a batch run, one entry per file in the source directory.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub processed: Vec<ProcessedFile>,
    pub failed: Vec<FileFailure>,
    /// Files whose extension is not in the allow-list.
    pub skipped: Vec<PathBuf>,
}

impl BatchReport {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }

    pub fn failed_files(&self) -> Vec<&Path> {
        self.failed.iter().map(|f| f.source.as_path()).collect()
    }

    pub fn summary(&self) -> BatchSummary {
        BatchSummary {
            processed: self.processed.len(),
            skipped: self.skipped.len(),
            failed: self
                .failed
                .iter()
                .map(|f| FailureRecord {
                    file: file_label(&f.source),
                    error: f.error.to_string(),
                })
                .collect(),
        }
    }
}

/// Serializable digest of a [`BatchReport`].
#[derive(Debug, Clone, Serialize)]
pub struct BatchSummary {
    pub processed: usize,
    pub skipped: usize,
    pub failed: Vec<FailureRecord>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FailureRecord {
    pub file: String,
    pub error: String,
}

/// Applies a [`RetinaCropper`] to every accepted file of a directory.
///
/// Files are processed one at a time in name order. A failing file is logged
/// and recorded; it never stops the run.
pub struct BatchRunner {
    cropper: RetinaCropper,
    writer: ArtifactWriter,
}

impl BatchRunner {
    pub fn new(cropper: RetinaCropper, writer: ArtifactWriter) -> Self {
        Self { cropper, writer }
    }

    /// Create the output layout under `destination` and build a runner.
    pub fn with_destination(cropper: RetinaCropper, destination: &Path) -> Result<Self> {
        let writer = ArtifactWriter::create(destination, cropper.config())?;
        Ok(Self::new(cropper, writer))
    }

    pub fn writer(&self) -> &ArtifactWriter {
        &self.writer
    }

    /// Process `source_dir`. Only directory-level problems are returned as errors.
    pub fn run(&self, source_dir: &Path, model: &dyn SegmentationModel) -> Result<BatchReport> {
        let (accepted, skipped) = self.collect_files(source_dir)?;
        let mut report = BatchReport {
            skipped,
            ..Default::default()
        };

        let total = accepted.len();
        info!("Processing {} image(s) from {}", total, source_dir.display());

        for (i, path) in accepted.into_iter().enumerate() {
            info!("[{}/{}] {}", i + 1, total, file_label(&path));
            match self.cropper.process_file(&path, model, &self.writer) {
                Ok(artifacts) => report.processed.push(ProcessedFile {
                    source: path,
                    artifacts,
                }),
                Err(CropError::UnsupportedFormat { path }) => report.skipped.push(path),
                Err(error) => {
                    warn!("Failed to process {}: {error}", path.display());
                    report.failed.push(FileFailure {
                        source: path,
                        error,
                    });
                }
            }
        }

        info!(
            "Finished: {} cropped, {} failed, {} skipped",
            report.processed.len(),
            report.failed.len(),
            report.skipped.len()
        );
        Ok(report)
    }

    /// Regular files of `source_dir` in name order, split into (accepted, skipped).
    pub fn collect_files(&self, source_dir: &Path) -> Result<(Vec<PathBuf>, Vec<PathBuf>)> {
        anyhow::ensure!(
            source_dir.is_dir(),
            "source directory does not exist: {}",
            source_dir.display()
        );

        let mut files = Vec::new();
        let entries = fs::read_dir(source_dir)
            .with_context(|| format!("failed to read directory {}", source_dir.display()))?;
        for entry in entries {
            let path = entry
                .with_context(|| format!("failed to list {}", source_dir.display()))?
                .path();
            if path.is_file() {
                files.push(path);
            }
        }
        files.sort();

        let config = self.cropper.config();
        Ok(files.into_iter().partition(|path| config.accepts(path)))
    }
}

fn file_label(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
