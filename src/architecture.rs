//! Architecture descriptor for the feed-forward network
//!
//! This module provides the immutable architecture descriptor that defines a
//! network: input size, the ordered hidden layer widths, output size, and the
//! dropout probability applied between hidden layers. The descriptor is
//! created once through a validating constructor, carried by the network for
//! its whole lifetime, and serialized verbatim into checkpoints — layer
//! shapes are never re-derived by introspecting live layers.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Immutable description of a feed-forward classifier.
///
/// The dense stack it describes is
/// `[input_size, hidden[0], ..., hidden[last], output_size]`, with ReLU and
/// dropout between hidden transitions and log-softmax on the output layer.
/// Consecutive layer dimensions are shape-compatible by construction: the
/// descriptor stores only the widths, and [`Architecture::layer_dims`]
/// expands them into `(in_features, out_features)` pairs.
///
/// # Example
///
/// A descriptor can also be loaded from a JSON file:
///
/// ```json
/// {
///   "input_size": 784,
///   "output_size": 10,
///   "hidden_layer_sizes": [512, 256, 128],
///   "drop_probability": 0.5
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Architecture {
    input_size: usize,
    output_size: usize,
    hidden_layer_sizes: Vec<usize>,
    drop_probability: f32,
}

impl Architecture {
    /// Creates a validated architecture descriptor.
    ///
    /// # Arguments
    ///
    /// * `input_size` - Number of input features per sample
    /// * `output_size` - Number of output classes
    /// * `hidden_layer_sizes` - Ordered widths of the hidden layers
    /// * `drop_probability` - Probability of dropping a hidden unit during
    ///   training (range [0.0, 1.0))
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArchitecture`] if any size is zero, the hidden
    /// stack is empty, or the drop probability is outside [0.0, 1.0).
    ///
    /// # Examples
    ///
    /// ```
    /// use mlp_classifier::architecture::Architecture;
    ///
    /// let arch = Architecture::new(784, 10, vec![128, 64], 0.2).unwrap();
    /// assert_eq!(arch.layer_dims(), vec![(784, 128), (128, 64), (64, 10)]);
    /// ```
    pub fn new(
        input_size: usize,
        output_size: usize,
        hidden_layer_sizes: Vec<usize>,
        drop_probability: f32,
    ) -> Result<Self> {
        let arch = Self {
            input_size,
            output_size,
            hidden_layer_sizes,
            drop_probability,
        };
        arch.validate()?;
        Ok(arch)
    }

    /// Checks the descriptor invariants.
    ///
    /// Deserialized descriptors bypass [`Architecture::new`], so consumers
    /// (network construction, checkpoint load) re-run this check.
    pub fn validate(&self) -> Result<()> {
        if self.input_size == 0 {
            return Err(Error::InvalidArchitecture(
                "input_size must be greater than 0".to_string(),
            ));
        }
        if self.output_size == 0 {
            return Err(Error::InvalidArchitecture(
                "output_size must be greater than 0".to_string(),
            ));
        }
        if self.hidden_layer_sizes.is_empty() {
            return Err(Error::InvalidArchitecture(
                "at least one hidden layer is required".to_string(),
            ));
        }
        if let Some(i) = self.hidden_layer_sizes.iter().position(|&s| s == 0) {
            return Err(Error::InvalidArchitecture(format!(
                "hidden layer {} has size 0",
                i
            )));
        }
        if !(0.0..1.0).contains(&self.drop_probability) {
            return Err(Error::InvalidArchitecture(format!(
                "drop_probability must be in range [0.0, 1.0), got {}",
                self.drop_probability
            )));
        }
        Ok(())
    }

    /// Number of input features per sample.
    pub fn input_size(&self) -> usize {
        self.input_size
    }

    /// Number of output classes.
    pub fn output_size(&self) -> usize {
        self.output_size
    }

    /// Ordered hidden layer widths.
    pub fn hidden_layer_sizes(&self) -> &[usize] {
        &self.hidden_layer_sizes
    }

    /// Dropout probability applied between hidden layers in training mode.
    pub fn drop_probability(&self) -> f32 {
        self.drop_probability
    }

    /// Expands the descriptor into `(in_features, out_features)` pairs for
    /// every dense layer, hidden stack first, output layer last.
    pub fn layer_dims(&self) -> Vec<(usize, usize)> {
        let mut dims = Vec::with_capacity(self.hidden_layer_sizes.len() + 1);
        let mut in_features = self.input_size;
        for &width in &self.hidden_layer_sizes {
            dims.push((in_features, width));
            in_features = width;
        }
        dims.push((in_features, self.output_size));
        dims
    }

    /// Canonical name of the dense layer at `index` in [`Self::layer_dims`]
    /// order: `hidden.0`, `hidden.1`, …, then `output`.
    pub fn layer_name(&self, index: usize) -> String {
        if index < self.hidden_layer_sizes.len() {
            format!("hidden.{}", index)
        } else {
            "output".to_string()
        }
    }
}

/// Loads an architecture descriptor from a JSON file.
///
/// Reads the file at `path`, deserializes its JSON contents, and validates
/// the result.
///
/// # Errors
///
/// Returns [`Error::Io`] if the file cannot be read, and
/// [`Error::InvalidArchitecture`] if the JSON is undecodable or the
/// descriptor fails validation.
pub fn load_architecture<P: AsRef<Path>>(path: P) -> Result<Architecture> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let arch: Architecture = serde_json::from_str(&contents)
        .map_err(|e| Error::InvalidArchitecture(e.to_string()))?;
    arch.validate()?;
    Ok(arch)
}
