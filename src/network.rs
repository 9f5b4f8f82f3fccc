//! Feed-forward classifier network
//!
//! This module assembles dense, ReLU, and dropout layers into a classifier
//! according to an [`Architecture`] descriptor. The forward pass produces
//! log-probabilities; the backward pass is the fixed, hand-derived gradient
//! chain of this stack (dense ← ReLU ← dropout, log-softmax folded into the
//! loss), with gradients accumulated inside the dense layers.

use crate::architecture::Architecture;
use crate::error::{Error, Result};
use crate::layers::{DenseLayer, DropoutLayer, Mode};
use crate::loss::nll_loss_and_delta;
use crate::optimizers::Optimizer;
use crate::utils::{log_softmax_rows, relu_inplace, SimpleRng};

/// A configurable multi-layer perceptron producing log-probabilities.
///
/// The layer stack is `input → hidden[0] → … → hidden[last] → output`, with
/// ReLU and dropout after every hidden transition and log-softmax on the
/// output layer. The architecture descriptor is stored immutably alongside
/// the layers; checkpointing reads it back verbatim instead of inspecting
/// layer shapes.
#[derive(Debug)]
pub struct Network {
    architecture: Architecture,
    hidden: Vec<DenseLayer>,
    dropout: Vec<DropoutLayer>,
    output: DenseLayer,
}

/// Cached activations from one forward pass, consumed by the backward pass.
struct ForwardTrace {
    /// Post-ReLU activations per hidden layer (pre-dropout)
    relu: Vec<Vec<f32>>,
    /// Post-dropout activations per hidden layer (input to the next layer)
    dropped: Vec<Vec<f32>>,
    /// Log-softmax normalized output rows
    log_probs: Vec<f32>,
}

impl Network {
    /// Builds a network from a validated architecture descriptor.
    ///
    /// Dense layers are Xavier-initialized from `rng`; each dropout layer
    /// forks its own stream from `rng`, so the same seed reproduces both the
    /// initial parameters and the mask sequence.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArchitecture`] if the descriptor fails
    /// validation (relevant for descriptors that arrived via deserialization
    /// rather than [`Architecture::new`]).
    pub fn new(architecture: Architecture, rng: &mut SimpleRng) -> Result<Self> {
        architecture.validate()?;

        let dims = architecture.layer_dims();
        let (hidden_dims, output_dims) = dims.split_at(dims.len() - 1);

        let hidden: Vec<DenseLayer> = hidden_dims
            .iter()
            .map(|&(inputs, outputs)| DenseLayer::new(inputs, outputs, rng))
            .collect();
        let dropout: Vec<DropoutLayer> = hidden_dims
            .iter()
            .map(|&(_, outputs)| {
                DropoutLayer::new(outputs, architecture.drop_probability(), rng)
            })
            .collect();
        let output = DenseLayer::new(output_dims[0].0, output_dims[0].1, rng);

        Ok(Self {
            architecture,
            hidden,
            dropout,
            output,
        })
    }

    /// The immutable architecture descriptor this network was built from.
    pub fn architecture(&self) -> &Architecture {
        &self.architecture
    }

    /// Total number of trainable parameters across all dense layers.
    pub fn parameter_count(&self) -> usize {
        self.hidden
            .iter()
            .map(|l| l.parameter_count())
            .sum::<usize>()
            + self.output.parameter_count()
    }

    fn check_input_shape(&self, inputs: &[f32], batch_size: usize) -> Result<()> {
        let features = self.architecture.input_size();
        let expected = batch_size * features;
        if inputs.len() != expected {
            return Err(Error::InputShapeMismatch {
                batch_size,
                features,
                expected,
                found: inputs.len(),
            });
        }
        Ok(())
    }

    /// Forward pass over a batch of flattened feature vectors.
    ///
    /// Returns row-major log-probabilities (batch_size × output_size); for
    /// each row the exponentials sum to 1. In [`Mode::Train`] dropout masks
    /// are drawn; in [`Mode::Eval`] the pass is deterministic.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InputShapeMismatch`] if `inputs` does not hold
    /// exactly `batch_size × input_size` values.
    pub fn forward(&self, inputs: &[f32], batch_size: usize, mode: Mode) -> Result<Vec<f32>> {
        Ok(self.forward_trace(inputs, batch_size, mode)?.log_probs)
    }

    fn forward_trace(&self, inputs: &[f32], batch_size: usize, mode: Mode) -> Result<ForwardTrace> {
        self.check_input_shape(inputs, batch_size)?;

        let mut relu_acts: Vec<Vec<f32>> = Vec::with_capacity(self.hidden.len());
        let mut dropped_acts: Vec<Vec<f32>> = Vec::with_capacity(self.hidden.len());

        for i in 0..self.hidden.len() {
            let layer = &self.hidden[i];
            let width = layer.output_size();

            let mut activation = vec![0.0f32; batch_size * width];
            let layer_input: &[f32] = if i == 0 { inputs } else { &dropped_acts[i - 1] };
            layer.forward(layer_input, &mut activation, batch_size);
            relu_inplace(&mut activation);

            let mut dropped = vec![0.0f32; batch_size * width];
            self.dropout[i].forward(&activation, &mut dropped, batch_size, mode);

            relu_acts.push(activation);
            dropped_acts.push(dropped);
        }

        let out_size = self.output.output_size();
        let last_input: &[f32] = dropped_acts
            .last()
            .map(|v| v.as_slice())
            .unwrap_or(inputs);
        let mut log_probs = vec![0.0f32; batch_size * out_size];
        self.output.forward(last_input, &mut log_probs, batch_size);
        log_softmax_rows(&mut log_probs, batch_size, out_size);

        Ok(ForwardTrace {
            relu: relu_acts,
            dropped: dropped_acts,
            log_probs,
        })
    }

    /// Clear every dense layer's accumulated gradients.
    pub fn zero_gradients(&self) {
        for layer in &self.hidden {
            layer.zero_gradients();
        }
        self.output.zero_gradients();
    }

    /// One forward/backward pass in training mode, adding this batch's
    /// parameter gradients to the layers' accumulators.
    ///
    /// Does NOT clear previously accumulated gradients — `Trainer::train_step`
    /// wraps this with the mandatory clear and the optimizer update. Returns
    /// the batch's mean negative-log-likelihood loss.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InputShapeMismatch`] on a malformed batch and
    /// [`Error::LabelOutOfRange`] if a label is not below `output_size`.
    pub fn accumulate_gradients(
        &self,
        inputs: &[f32],
        labels: &[usize],
        batch_size: usize,
    ) -> Result<f32> {
        assert!(batch_size > 0, "batch_size must be greater than 0");
        let trace = self.forward_trace(inputs, batch_size, Mode::Train)?;

        let out_size = self.output.output_size();
        let mut delta = vec![0.0f32; batch_size * out_size];
        let loss = nll_loss_and_delta(&trace.log_probs, labels, batch_size, out_size, &mut delta)?;

        // Output layer consumes the loss delta directly.
        let last_width = self.output.input_size();
        let mut grad = vec![0.0f32; batch_size * last_width];
        let last_input = trace
            .dropped
            .last()
            .map(|v| v.as_slice())
            .unwrap_or(inputs);
        self.output.backward(last_input, &delta, &mut grad, batch_size);

        // Hidden stack in reverse: dropout mask, ReLU derivative, dense.
        for i in (0..self.hidden.len()).rev() {
            let layer = &self.hidden[i];
            let width = layer.output_size();

            let mut grad_act = vec![0.0f32; batch_size * width];
            self.dropout[i].backward(&grad, &mut grad_act, batch_size);

            for (g, &a) in grad_act.iter_mut().zip(&trace.relu[i]) {
                if a <= 0.0 {
                    *g = 0.0;
                }
            }

            let layer_input = if i == 0 {
                inputs
            } else {
                trace.dropped[i - 1].as_slice()
            };
            let mut grad_prev = vec![0.0f32; batch_size * layer.input_size()];
            layer.backward(layer_input, &grad_act, &mut grad_prev, batch_size);
            grad = grad_prev;
        }

        Ok(loss)
    }

    /// Visit every parameter tensor together with its accumulated gradient,
    /// in a fixed order: each hidden layer's weights then biases, followed by
    /// the output layer's.
    ///
    /// This is the seam between the model and the optimizer engine: the
    /// closure is expected to apply one update per tensor, and the order is
    /// stable so per-tensor optimizer state stays aligned across steps.
    pub fn visit_parameters(&mut self, mut f: impl FnMut(&mut [f32], &[f32])) {
        for layer in &mut self.hidden {
            layer.visit_parameters(&mut f);
        }
        self.output.visit_parameters(&mut f);
    }

    /// Apply one optimizer step per parameter tensor.
    ///
    /// `optimizers` must hold exactly [`Network::parameter_tensor_count`]
    /// entries; entry order matches [`Network::visit_parameters`].
    pub fn apply_updates(&mut self, optimizers: &mut [Box<dyn Optimizer>]) {
        assert_eq!(
            optimizers.len(),
            self.parameter_tensor_count(),
            "one optimizer per parameter tensor"
        );
        let mut index = 0;
        self.visit_parameters(|params, grads| {
            optimizers[index].update(params, grads);
            index += 1;
        });
    }

    /// Number of parameter tensors (two per dense layer).
    pub fn parameter_tensor_count(&self) -> usize {
        2 * (self.hidden.len() + 1)
    }

    /// Dense layers in checkpoint order: hidden stack first, then output.
    pub(crate) fn dense_layers(&self) -> impl Iterator<Item = &DenseLayer> {
        self.hidden.iter().chain(std::iter::once(&self.output))
    }

    /// Mutable variant of [`Network::dense_layers`], used for parameter
    /// injection at checkpoint load.
    pub(crate) fn dense_layers_mut(&mut self) -> impl Iterator<Item = &mut DenseLayer> {
        self.hidden.iter_mut().chain(std::iter::once(&mut self.output))
    }
}
