//! Configuration structures for training
//!
//! This module provides the training configuration: optimizer selection and
//! hyperparameters, parsed from JSON and validated before use.

use crate::error::{Error, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Configuration for a training run.
///
/// Different optimizers use different optional fields:
///
/// - **sgd**: only `learning_rate`
/// - **adam**: optional `beta1` (default 0.9), `beta2` (default 0.999),
///   `epsilon` (default 1e-8)
///
/// # Example
///
/// ```json
/// {
///   "optimizer": "adam",
///   "learning_rate": 0.001,
///   "epochs": 5,
///   "beta1": 0.9,
///   "beta2": 0.999
/// }
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct TrainConfig {
    /// Optimizer type: "sgd" or "adam"
    pub optimizer: String,

    /// Step size for parameter updates
    pub learning_rate: f32,

    /// Number of passes over the training set
    pub epochs: usize,

    /// Exponential decay rate for Adam's first moment estimates (default 0.9)
    pub beta1: Option<f32>,

    /// Exponential decay rate for Adam's second moment estimates (default 0.999)
    pub beta2: Option<f32>,

    /// Numerical stability constant for Adam (default 1e-8)
    pub epsilon: Option<f32>,
}

impl TrainConfig {
    /// Convenience constructor for plain SGD.
    pub fn sgd(learning_rate: f32, epochs: usize) -> Self {
        Self {
            optimizer: "sgd".to_string(),
            learning_rate,
            epochs,
            beta1: None,
            beta2: None,
            epsilon: None,
        }
    }

    /// Convenience constructor for Adam with paper-default moments.
    pub fn adam(learning_rate: f32, epochs: usize) -> Self {
        Self {
            optimizer: "adam".to_string(),
            learning_rate,
            epochs,
            beta1: None,
            beta2: None,
            epsilon: None,
        }
    }
}

/// Loads a training configuration from a JSON file.
///
/// Reads the file at `path`, deserializes its JSON contents, and validates
/// the result.
///
/// # Errors
///
/// Returns [`Error::Io`] if the file cannot be read and
/// [`Error::InvalidConfig`] if the JSON is undecodable or the configuration
/// fails validation.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<TrainConfig> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let config: TrainConfig =
        serde_json::from_str(&contents).map_err(|e| Error::InvalidConfig(e.to_string()))?;
    validate_config(&config)?;
    Ok(config)
}

/// Checks the configuration invariants.
pub(crate) fn validate_config(config: &TrainConfig) -> Result<()> {
    let valid_optimizers = ["sgd", "adam"];
    if !valid_optimizers.contains(&config.optimizer.as_str()) {
        return Err(Error::InvalidConfig(format!(
            "invalid optimizer '{}', must be one of: {}",
            config.optimizer,
            valid_optimizers.join(", ")
        )));
    }

    if !(config.learning_rate > 0.0) || !config.learning_rate.is_finite() {
        return Err(Error::InvalidConfig(format!(
            "learning_rate must be positive and finite, got {}",
            config.learning_rate
        )));
    }

    if config.epochs == 0 {
        return Err(Error::InvalidConfig(
            "epochs must be greater than 0".to_string(),
        ));
    }

    for (name, value) in [("beta1", config.beta1), ("beta2", config.beta2)] {
        if let Some(beta) = value {
            if !(0.0..1.0).contains(&beta) {
                return Err(Error::InvalidConfig(format!(
                    "{} must be in range [0.0, 1.0), got {}",
                    name, beta
                )));
            }
        }
    }

    if let Some(epsilon) = config.epsilon {
        if epsilon <= 0.0 {
            return Err(Error::InvalidConfig(
                "epsilon must be positive".to_string(),
            ));
        }
    }

    Ok(())
}
