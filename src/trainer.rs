//! Minibatch training loop and held-out evaluation
//!
//! The trainer owns the network plus one optimizer instance per parameter
//! tensor and drives the epoch/batch cycle. Clearing stale gradients is part
//! of the atomic training step, not a separate call the caller could forget:
//! [`Trainer::train_step`] always clears, accumulates, and updates in that
//! order.

use crate::config::{validate_config, TrainConfig};
use crate::data::Batch;
use crate::error::{Error, Result};
use crate::layers::Mode;
use crate::loss::nll_loss_and_delta;
use crate::network::Network;
use crate::optimizers::{Adam, Optimizer, SGD};
use serde::Serialize;

/// Mean loss and top-1 accuracy over a held-out set.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Evaluation {
    /// Mean negative-log-likelihood loss per sample
    pub loss: f32,
    /// Fraction of samples whose argmax log-probability equals the label
    pub accuracy: f32,
}

/// Progress record emitted after each epoch.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EpochReport {
    /// 1-based epoch index
    pub epoch: usize,
    /// Mean training loss per sample across the epoch
    pub train_loss: f32,
    /// Mean held-out loss per sample
    pub test_loss: f32,
    /// Held-out top-1 accuracy in [0.0, 1.0]
    pub test_accuracy: f32,
}

/// Drives forward/backward/update cycles over batches.
///
/// Construction fixes the optimizer choice from a validated [`TrainConfig`];
/// one optimizer instance is created per parameter tensor so adaptive state
/// (Adam moments) stays aligned with its tensor across steps.
pub struct Trainer {
    network: Network,
    config: TrainConfig,
    optimizers: Vec<Box<dyn Optimizer>>,
}

impl Trainer {
    /// Creates a trainer for `network` configured by `config`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] if the configuration fails
    /// validation.
    pub fn new(network: Network, config: &TrainConfig) -> Result<Self> {
        validate_config(config)?;

        let optimizers = (0..network.parameter_tensor_count())
            .map(|_| build_optimizer(config))
            .collect();

        Ok(Self {
            network,
            config: config.clone(),
            optimizers,
        })
    }

    /// Read access to the wrapped network (for evaluation or checkpointing).
    pub fn network(&self) -> &Network {
        &self.network
    }

    /// Consumes the trainer, returning the trained network.
    pub fn into_network(self) -> Network {
        self.network
    }

    /// Replace the learning rate on every parameter tensor's optimizer.
    pub fn set_learning_rate(&mut self, lr: f32) {
        for optimizer in &mut self.optimizers {
            optimizer.set_learning_rate(lr);
        }
    }

    /// One atomic training step over a batch.
    ///
    /// Clears accumulated gradients, runs the forward pass in training mode,
    /// computes the mean negative-log-likelihood loss, backpropagates, and
    /// applies one optimizer update per parameter tensor. Returns the batch's
    /// mean loss.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InputShapeMismatch`] if the batch's feature count
    /// does not match the network input size, and [`Error::LabelOutOfRange`]
    /// for a label at or above the class count. Both are fatal; the step
    /// applies no partial update (the failure happens before any parameter
    /// changes).
    pub fn train_step(&mut self, batch: &Batch) -> Result<f32> {
        self.network.zero_gradients();
        let loss =
            self.network
                .accumulate_gradients(batch.inputs(), batch.labels(), batch.len())?;
        self.network.apply_updates(&mut self.optimizers);
        Ok(loss)
    }

    /// One pass over the training set; returns the mean loss per sample.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyDataset`] if `batches` is empty; batch-level
    /// errors propagate from [`Trainer::train_step`].
    pub fn train_epoch(&mut self, batches: &[Batch]) -> Result<f32> {
        if batches.is_empty() {
            return Err(Error::EmptyDataset);
        }

        let mut running_loss = 0.0f64;
        let mut samples = 0usize;
        for batch in batches {
            let loss = self.train_step(batch)?;
            running_loss += loss as f64 * batch.len() as f64;
            samples += batch.len();
        }

        Ok((running_loss / samples as f64) as f32)
    }

    /// Evaluates the network on a held-out set in evaluation mode (dropout
    /// disabled), computing mean loss and top-1 accuracy.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyDataset`] if `batches` is empty; shape and
    /// label errors propagate as in training.
    pub fn evaluate(&self, batches: &[Batch]) -> Result<Evaluation> {
        evaluate_network(&self.network, batches)
    }

    /// Runs `config.epochs` epochs of training with a held-out evaluation
    /// after each, returning one progress record per epoch.
    ///
    /// # Errors
    ///
    /// Propagates any error from [`Trainer::train_epoch`] or
    /// [`Trainer::evaluate`]; an error aborts the run and loses in-memory
    /// progress since the last explicit checkpoint save.
    pub fn fit(&mut self, train: &[Batch], test: &[Batch]) -> Result<Vec<EpochReport>> {
        let mut reports = Vec::with_capacity(self.config.epochs);

        for epoch in 1..=self.config.epochs {
            let train_loss = self.train_epoch(train)?;
            let eval = self.evaluate(test)?;

            let report = EpochReport {
                epoch,
                train_loss,
                test_loss: eval.loss,
                test_accuracy: eval.accuracy,
            };
            tracing::info!(
                epoch,
                train_loss,
                test_loss = eval.loss,
                test_accuracy = eval.accuracy,
                "epoch complete"
            );
            reports.push(report);
        }

        Ok(reports)
    }
}

/// Evaluates `network` over `batches` without a trainer.
///
/// Useful for checking a freshly loaded checkpoint before resuming training.
pub fn evaluate_network(network: &Network, batches: &[Batch]) -> Result<Evaluation> {
    if batches.is_empty() {
        return Err(Error::EmptyDataset);
    }

    let num_classes = network.architecture().output_size();
    let mut total_loss = 0.0f64;
    let mut correct = 0usize;
    let mut samples = 0usize;

    for batch in batches {
        let log_probs = network.forward(batch.inputs(), batch.len(), Mode::Eval)?;

        let mut delta = vec![0.0f32; batch.len() * num_classes];
        let loss = nll_loss_and_delta(
            &log_probs,
            batch.labels(),
            batch.len(),
            num_classes,
            &mut delta,
        )?;
        total_loss += loss as f64 * batch.len() as f64;

        for (row, &label) in log_probs.chunks_exact(num_classes).zip(batch.labels()) {
            if argmax(row) == label {
                correct += 1;
            }
        }
        samples += batch.len();
    }

    Ok(Evaluation {
        loss: (total_loss / samples as f64) as f32,
        accuracy: correct as f32 / samples as f32,
    })
}

fn argmax(row: &[f32]) -> usize {
    let mut best = 0usize;
    let mut best_value = row[0];
    for (i, &value) in row.iter().enumerate().skip(1) {
        if value > best_value {
            best_value = value;
            best = i;
        }
    }
    best
}

fn build_optimizer(config: &TrainConfig) -> Box<dyn Optimizer> {
    match config.optimizer.as_str() {
        "adam" => Box::new(Adam::new(
            config.learning_rate,
            config.beta1.unwrap_or(0.9),
            config.beta2.unwrap_or(0.999),
            config.epsilon.unwrap_or(1e-8),
        )),
        // validate_config admits only "sgd" and "adam"
        _ => Box::new(SGD::new(config.learning_rate)),
    }
}
