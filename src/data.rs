//! Batch container at the data-source boundary
//!
//! The library does not load, shuffle, or batch datasets — an upstream data
//! source owns that policy and hands over ready-made batches. [`Batch`] is
//! the validated container for that exchange: flattened feature vectors plus
//! one integer label per sample.

use crate::error::{Error, Result};

/// One minibatch of flattened feature vectors and integer class labels.
///
/// Inputs are row-major: sample `i` occupies
/// `inputs[i * num_features .. (i + 1) * num_features]`.
#[derive(Debug, Clone)]
pub struct Batch {
    inputs: Vec<f32>,
    labels: Vec<usize>,
    num_features: usize,
}

impl Batch {
    /// Creates a batch after checking that the buffer sizes line up.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyDataset`] for a batch with no samples and
    /// [`Error::InputShapeMismatch`] if `inputs` does not hold exactly
    /// `labels.len() × num_features` values. Label range against the model's
    /// class count is checked later, where the class count is known.
    pub fn new(inputs: Vec<f32>, labels: Vec<usize>, num_features: usize) -> Result<Self> {
        if labels.is_empty() {
            return Err(Error::EmptyDataset);
        }
        let expected = labels.len() * num_features;
        if inputs.len() != expected {
            return Err(Error::InputShapeMismatch {
                batch_size: labels.len(),
                features: num_features,
                expected,
                found: inputs.len(),
            });
        }
        Ok(Self {
            inputs,
            labels,
            num_features,
        })
    }

    /// Number of samples in the batch.
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// True if the batch holds no samples (never, for a validated batch).
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Flattened row-major feature data.
    pub fn inputs(&self) -> &[f32] {
        &self.inputs
    }

    /// Integer class labels, one per sample.
    pub fn labels(&self) -> &[usize] {
        &self.labels
    }

    /// Features per sample.
    pub fn num_features(&self) -> usize {
        self.num_features
    }
}
