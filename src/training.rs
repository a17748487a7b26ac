//! Training-loop bookkeeping for the segmentation model.
//!
//! The model, optimizer and data loading live behind [`TrainingSession`]; this
//! module owns the parts that decide what happens between epochs: loss
//! tracking, early stopping and when to write checkpoints.

use anyhow::Result;
use log::info;
use std::path::{Path, PathBuf};

/// Metrics of one finished epoch. Never mutated after creation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EpochResult {
    /// Zero-based epoch index.
    pub epoch: usize,
    pub train_loss: f64,
    pub train_accuracy: f64,
    pub learning_rate: f64,
}

/// Which snapshot to write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckpointKind {
    /// Whole model, overwritten on every improvement.
    Full,
    /// Weights only, overwritten on every improvement.
    Weights,
    /// Model state when the loop ends.
    Last,
}

impl CheckpointKind {
    pub fn file_name(self) -> &'static str {
        match self {
            CheckpointKind::Full => "model.pth",
            CheckpointKind::Weights => "weights.pth",
            CheckpointKind::Last => "model_last.pth",
        }
    }

    pub fn path_in(self, dir: &Path) -> PathBuf {
        dir.join(self.file_name())
    }
}

/// What the tracker concluded from one epoch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EpochDecision {
    /// Loss beat the previous best (`f64::INFINITY` before the first epoch).
    Improved { previous: f64 },
    /// Loss did not improve; `stale_epochs` counts consecutive misses.
    NotImproved { best: f64, stale_epochs: usize },
}

/// Best-loss and early-stop state, owned by whoever drives the loop.
#[derive(Debug, Clone)]
pub struct LossTracker {
    best_loss: f64,
    stale_epochs: usize,
    patience: usize,
}

impl LossTracker {
    /// `patience` consecutive epochs without improvement stop training.
    /// A patience of 0 disables early stopping.
    pub fn new(patience: usize) -> Self {
        Self {
            best_loss: f64::INFINITY,
            stale_epochs: 0,
            patience,
        }
    }

    pub fn best_loss(&self) -> f64 {
        self.best_loss
    }

    pub fn stale_epochs(&self) -> usize {
        self.stale_epochs
    }

    pub fn observe(&mut self, result: &EpochResult) -> EpochDecision {
        if result.train_loss < self.best_loss {
            let previous = self.best_loss;
            self.best_loss = result.train_loss;
            self.stale_epochs = 0;
            EpochDecision::Improved { previous }
        } else {
            self.stale_epochs += 1;
            EpochDecision::NotImproved {
                best: self.best_loss,
                stale_epochs: self.stale_epochs,
            }
        }
    }

    pub fn should_stop(&self) -> bool {
        self.patience > 0 && self.stale_epochs >= self.patience
    }
}

/// The model-specific half of training.
pub trait TrainingSession {
    /// Run one pass over the training data.
    fn train_epoch(&mut self, epoch: usize) -> Result<EpochResult>;

    /// Advance the learning-rate schedule after an epoch.
    fn step_scheduler(&mut self) {}

    fn save_checkpoint(&mut self, kind: CheckpointKind) -> Result<()>;
}

/// Everything the loop produced.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingSummary {
    pub epochs: Vec<EpochResult>,
    pub best_loss: f64,
    pub stopped_early: bool,
}

/// Train for up to `num_epochs`, checkpointing on every loss improvement.
///
/// The `Last` checkpoint is always written once the loop ends, early stop or not.
pub fn run_training<S: TrainingSession + ?Sized>(
    session: &mut S,
    num_epochs: usize,
    patience: usize,
) -> Result<TrainingSummary> {
    let mut tracker = LossTracker::new(patience);
    let mut epochs = Vec::with_capacity(num_epochs);
    let mut stopped_early = false;

    for epoch in 0..num_epochs {
        let result = session.train_epoch(epoch)?;
        session.step_scheduler();
        info!(
            "Epoch {}/{} loss {:.4} acc {:.4} lr {:.4e}",
            epoch + 1,
            num_epochs,
            result.train_loss,
            result.train_accuracy,
            result.learning_rate
        );

        match tracker.observe(&result) {
            EpochDecision::Improved { previous } => {
                info!(
                    "Loss improved from {previous:.4} to {:.4}; saving checkpoint",
                    result.train_loss
                );
                session.save_checkpoint(CheckpointKind::Full)?;
                session.save_checkpoint(CheckpointKind::Weights)?;
            }
            EpochDecision::NotImproved { best, stale_epochs } => {
                info!("Loss not improved: {best:.4}, stale {stale_epochs}/{patience}");
            }
        }
        epochs.push(result);

        if tracker.should_stop() {
            info!("Stopping early after {} epoch(s)", epoch + 1);
            stopped_early = true;
            break;
        }
    }

    session.save_checkpoint(CheckpointKind::Last)?;
    Ok(TrainingSummary {
        epochs,
        best_loss: tracker.best_loss(),
        stopped_early,
    })
}

/// Share of positions where `logit > 0` agrees with a non-zero target.
pub fn binary_accuracy(logits: &[f32], targets: &[f32]) -> Result<f64> {
    check_lengths(logits, targets)?;
    let hits = logits
        .iter()
        .zip(targets)
        .filter(|&(&logit, &target)| (logit > 0.0) == (target > 0.5))
        .count();
    Ok(hits as f64 / logits.len() as f64)
}

/// Mean binary cross-entropy on raw logits.
///
/// Uses `max(x, 0) - x * y + ln(1 + e^-|x|)`, which stays finite for large logits.
pub fn bce_with_logits(logits: &[f32], targets: &[f32]) -> Result<f64> {
    check_lengths(logits, targets)?;
    let sum: f64 = logits
        .iter()
        .zip(targets)
        .map(|(&x, &y)| {
            let (x, y) = (x as f64, y as f64);
            x.max(0.0) - x * y + (-x.abs()).exp().ln_1p()
        })
        .sum();
    Ok(sum / logits.len() as f64)
}

fn check_lengths(logits: &[f32], targets: &[f32]) -> Result<()> {
    anyhow::ensure!(
        logits.len() == targets.len(),
        "logits and targets differ in length ({} vs {})",
        logits.len(),
        targets.len()
    );
    anyhow::ensure!(!logits.is_empty(), "cannot score an empty batch");
    Ok(())
}
