//! Error types for model construction, training, and checkpointing
//!
//! All fallible operations in this crate return the crate-level [`Result`]
//! alias. Errors are unrecoverable by design: the caller gets enough context
//! (expected vs. found shapes, the offending path) to diagnose a failure
//! without re-running, and nothing is retried or silently coerced.

use std::path::PathBuf;

/// Shape disagreement for a single dense layer during parameter injection.
///
/// Collected into [`Error::ParameterShapeMismatch`] so that a failed
/// checkpoint load reports every mismatched layer at once rather than
/// stopping at the first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayerShapeMismatch {
    /// Layer name as recorded in the checkpoint (`hidden.0`, …, `output`)
    pub layer: String,
    /// Weight matrix dimensions of the live layer, `[in_features, out_features]`
    pub expected: [usize; 2],
    /// Weight matrix dimensions stored in the checkpoint record
    pub found: [usize; 2],
}

impl std::fmt::Display for LayerShapeMismatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}: expected {}x{}, found {}x{}",
            self.layer, self.expected[0], self.expected[1], self.found[0], self.found[1]
        )
    }
}

fn join_mismatches(mismatches: &[LayerShapeMismatch]) -> String {
    mismatches
        .iter()
        .map(|m| m.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}

/// Error type for the library.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A batch of inputs does not match the model's declared input size.
    #[error(
        "input shape mismatch: batch of {batch_size} samples with {features} features \
         per sample requires {expected} values, found {found}"
    )]
    InputShapeMismatch {
        batch_size: usize,
        features: usize,
        expected: usize,
        found: usize,
    },

    /// Checkpoint parameters disagree with the target model's layer shapes.
    ///
    /// Carries one entry per mismatched layer; injection never applies a
    /// partial checkpoint.
    #[error(
        "parameter shape mismatch in {} layer(s): {}",
        .0.len(),
        join_mismatches(.0)
    )]
    ParameterShapeMismatch(Vec<LayerShapeMismatch>),

    /// A checkpoint file could not be read or written.
    #[error("checkpoint I/O failure for {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A checkpoint file decoded to something other than a valid record.
    #[error("malformed checkpoint: {0}")]
    MalformedCheckpoint(String),

    /// A checkpoint was written by an incompatible format version.
    #[error("unsupported checkpoint version {found}, this build reads version {supported}")]
    UnsupportedVersion { found: u32, supported: u32 },

    /// An architecture descriptor failed validation.
    #[error("invalid architecture: {0}")]
    InvalidArchitecture(String),

    /// A training configuration failed validation.
    #[error("invalid training config: {0}")]
    InvalidConfig(String),

    /// A class label is outside the model's output range.
    #[error("label {label} out of range for {num_classes} classes")]
    LabelOutOfRange { label: usize, num_classes: usize },

    /// A training epoch or evaluation pass was driven over zero batches.
    #[error("empty dataset: at least one batch is required")]
    EmptyDataset,
}

/// Result alias used throughout the library.
pub type Result<T> = std::result::Result<T, Error>;
