//! Dense (fully connected) layer implementation
//!
//! This module provides a DenseLayer that performs the transformation
//! `output = input × weights + biases` and accumulates parameter gradients
//! during the backward pass.

use crate::error::LayerShapeMismatch;
use crate::utils::SimpleRng;
use std::cell::RefCell;

/// Dense (fully connected) layer with weights, biases, and gradient buffers.
///
/// Performs the linear transformation `y = xW + b` where x is the input
/// (batch_size × input_size), W is the weight matrix (input_size ×
/// output_size, row-major), and b is the bias vector (output_size).
///
/// Gradients are accumulated internally by [`DenseLayer::backward`] and must
/// be cleared with [`DenseLayer::zero_gradients`] before starting a new
/// training step; the trainer owns that sequencing.
#[derive(Debug)]
pub struct DenseLayer {
    input_size: usize,
    output_size: usize,
    weights: Vec<f32>,
    biases: Vec<f32>,
    grad_weights: RefCell<Vec<f32>>,
    grad_biases: RefCell<Vec<f32>>,
}

impl DenseLayer {
    /// Create a new DenseLayer with Xavier initialization.
    ///
    /// Weights are sampled from the uniform distribution [-limit, limit]
    /// where `limit = sqrt(6 / (input_size + output_size))`. Biases start at
    /// zero, and gradient buffers start cleared.
    ///
    /// # Examples
    ///
    /// ```
    /// use mlp_classifier::layers::DenseLayer;
    /// use mlp_classifier::utils::SimpleRng;
    ///
    /// let mut rng = SimpleRng::new(42);
    /// let layer = DenseLayer::new(784, 512, &mut rng);
    /// assert_eq!(layer.input_size(), 784);
    /// assert_eq!(layer.output_size(), 512);
    /// ```
    pub fn new(input_size: usize, output_size: usize, rng: &mut SimpleRng) -> Self {
        // Xavier initialization: limit = sqrt(6 / (fan_in + fan_out))
        let mut weights = vec![0.0f32; input_size * output_size];
        let limit = (6.0f32 / (input_size + output_size) as f32).sqrt();

        for value in &mut weights {
            *value = rng.gen_range_f32(-limit, limit);
        }

        Self {
            input_size,
            output_size,
            weights,
            biases: vec![0.0f32; output_size],
            grad_weights: RefCell::new(vec![0.0f32; input_size * output_size]),
            grad_biases: RefCell::new(vec![0.0f32; output_size]),
        }
    }

    /// Forward propagation: `output = input × W + b`.
    ///
    /// # Arguments
    ///
    /// * `input` - Input data, row-major (batch_size × input_size)
    /// * `output` - Output buffer, row-major (batch_size × output_size)
    /// * `batch_size` - Number of samples in the batch
    ///
    /// # Panics
    ///
    /// Panics if the buffer lengths don't match the batch dimensions. Callers
    /// go through `Network::forward`, which validates batch shape and turns a
    /// mismatch into an error before reaching this point.
    pub fn forward(&self, input: &[f32], output: &mut [f32], batch_size: usize) {
        assert_eq!(input.len(), batch_size * self.input_size);
        assert_eq!(output.len(), batch_size * self.output_size);

        for (in_row, out_row) in input
            .chunks_exact(self.input_size)
            .zip(output.chunks_exact_mut(self.output_size))
        {
            out_row.copy_from_slice(&self.biases);
            for (&x, w_row) in in_row.iter().zip(self.weights.chunks_exact(self.output_size)) {
                if x == 0.0 {
                    continue;
                }
                for (out, &w) in out_row.iter_mut().zip(w_row) {
                    *out += x * w;
                }
            }
        }
    }

    /// Backward propagation through the layer.
    ///
    /// Accumulates weight and bias gradients internally and writes the
    /// gradient with respect to the layer input into `grad_input`:
    ///
    /// * `dW += xᵀ · grad_output`
    /// * `db += Σ_rows grad_output`
    /// * `grad_input = grad_output · Wᵀ`
    ///
    /// `input` must be the same data used in the corresponding forward pass.
    pub fn backward(
        &self,
        input: &[f32],
        grad_output: &[f32],
        grad_input: &mut [f32],
        batch_size: usize,
    ) {
        assert_eq!(input.len(), batch_size * self.input_size);
        assert_eq!(grad_output.len(), batch_size * self.output_size);
        assert_eq!(grad_input.len(), batch_size * self.input_size);

        let mut grad_weights = self.grad_weights.borrow_mut();
        let mut grad_biases = self.grad_biases.borrow_mut();

        for (in_row, (go_row, gi_row)) in input.chunks_exact(self.input_size).zip(
            grad_output
                .chunks_exact(self.output_size)
                .zip(grad_input.chunks_exact_mut(self.input_size)),
        ) {
            for (gb, &g) in grad_biases.iter_mut().zip(go_row) {
                *gb += g;
            }

            for ((&x, w_row), (gw_row, gi)) in in_row
                .iter()
                .zip(self.weights.chunks_exact(self.output_size))
                .zip(
                    grad_weights
                        .chunks_exact_mut(self.output_size)
                        .zip(gi_row.iter_mut()),
                )
            {
                let mut acc = 0.0f32;
                for ((&w, gw), &g) in w_row.iter().zip(gw_row.iter_mut()).zip(go_row) {
                    acc += g * w;
                    *gw += x * g;
                }
                *gi = acc;
            }
        }
    }

    /// Clear the accumulated weight and bias gradients.
    pub fn zero_gradients(&self) {
        for g in self.grad_weights.borrow_mut().iter_mut() {
            *g = 0.0;
        }
        for g in self.grad_biases.borrow_mut().iter_mut() {
            *g = 0.0;
        }
    }

    /// Get the input size of the layer.
    pub fn input_size(&self) -> usize {
        self.input_size
    }

    /// Get the output size of the layer.
    pub fn output_size(&self) -> usize {
        self.output_size
    }

    /// Get the number of trainable parameters.
    ///
    /// Returns input_size × output_size (weights) + output_size (biases).
    pub fn parameter_count(&self) -> usize {
        self.weights.len() + self.biases.len()
    }

    /// Read-only view of the weight matrix (row-major, input × output).
    pub fn weights(&self) -> &[f32] {
        &self.weights
    }

    /// Read-only view of the bias vector.
    pub fn biases(&self) -> &[f32] {
        &self.biases
    }

    /// Replace the layer parameters with checkpointed values.
    ///
    /// `found_dims` are the dimensions the checkpoint record declares for
    /// this layer. On any disagreement with the live layer the parameters are
    /// left untouched and the mismatch is returned for the caller to collect.
    pub(crate) fn set_parameters(
        &mut self,
        name: &str,
        found_dims: [usize; 2],
        weights: &[f32],
        biases: &[f32],
    ) -> std::result::Result<(), LayerShapeMismatch> {
        let expected = [self.input_size, self.output_size];
        if found_dims != expected
            || weights.len() != self.weights.len()
            || biases.len() != self.biases.len()
        {
            return Err(LayerShapeMismatch {
                layer: name.to_string(),
                expected,
                found: found_dims,
            });
        }
        self.weights.copy_from_slice(weights);
        self.biases.copy_from_slice(biases);
        Ok(())
    }

    /// Visit the parameter tensors of this layer together with their
    /// accumulated gradients, weights first, then biases.
    ///
    /// This is the seam the optimizer step goes through; the closure receives
    /// each `(parameters, gradients)` pair exactly once.
    pub(crate) fn visit_parameters(&mut self, mut f: impl FnMut(&mut [f32], &[f32])) {
        f(&mut self.weights, &self.grad_weights.borrow());
        f(&mut self.biases, &self.grad_biases.borrow());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layer_with_params(weights: &[f32], biases: &[f32], inputs: usize, outputs: usize) -> DenseLayer {
        let mut rng = SimpleRng::new(1);
        let mut layer = DenseLayer::new(inputs, outputs, &mut rng);
        layer
            .set_parameters("test", [inputs, outputs], weights, biases)
            .unwrap();
        layer
    }

    #[test]
    fn test_dense_layer_creation() {
        let mut rng = SimpleRng::new(42);
        let layer = DenseLayer::new(10, 5, &mut rng);

        assert_eq!(layer.input_size(), 10);
        assert_eq!(layer.output_size(), 5);
        assert_eq!(layer.weights().len(), 50); // 10 × 5
        assert_eq!(layer.biases().len(), 5);
        assert_eq!(layer.parameter_count(), 55);
    }

    #[test]
    fn test_xavier_initialization() {
        let mut rng = SimpleRng::new(42);
        let layer = DenseLayer::new(100, 50, &mut rng);

        let limit = (6.0f32 / 150.0).sqrt();
        for &weight in layer.weights() {
            assert!(
                weight >= -limit && weight <= limit,
                "weight {} outside Xavier range [{}, {}]",
                weight,
                -limit,
                limit
            );
        }
        for &bias in layer.biases() {
            assert_eq!(bias, 0.0);
        }
    }

    #[test]
    fn test_deterministic_initialization() {
        let mut rng1 = SimpleRng::new(42);
        let layer1 = DenseLayer::new(10, 5, &mut rng1);

        let mut rng2 = SimpleRng::new(42);
        let layer2 = DenseLayer::new(10, 5, &mut rng2);

        assert_eq!(layer1.weights(), layer2.weights());
        assert_eq!(layer1.biases(), layer2.biases());
    }

    #[test]
    fn test_forward_known_values() {
        // W = [[1, 2], [3, 4]] (row per input), b = [0.5, -0.5]
        let layer = layer_with_params(&[1.0, 2.0, 3.0, 4.0], &[0.5, -0.5], 2, 2);

        let input = [1.0, 1.0, 2.0, 0.0];
        let mut output = [0.0f32; 4];
        layer.forward(&input, &mut output, 2);

        // Row 0: [1*1 + 1*3 + 0.5, 1*2 + 1*4 - 0.5] = [4.5, 5.5]
        // Row 1: [2*1 + 0.5, 2*2 - 0.5] = [2.5, 3.5]
        assert_eq!(output, [4.5, 5.5, 2.5, 3.5]);
    }

    #[test]
    fn test_backward_gradients() {
        let layer = layer_with_params(&[1.0, 2.0, 3.0, 4.0], &[0.0, 0.0], 2, 2);

        let input = [1.0, 2.0];
        let grad_output = [1.0, -1.0];
        let mut grad_input = [0.0f32; 2];
        layer.backward(&input, &grad_output, &mut grad_input, 1);

        // grad_input = grad_output · Wᵀ: [1*1 + (-1)*2, 1*3 + (-1)*4] = [-1, -1]
        assert_eq!(grad_input, [-1.0, -1.0]);

        // dW = xᵀ · grad_output: [[1, -1], [2, -2]], db = [1, -1]
        assert_eq!(&*layer.grad_weights.borrow(), &[1.0, -1.0, 2.0, -2.0]);
        assert_eq!(&*layer.grad_biases.borrow(), &[1.0, -1.0]);
    }

    #[test]
    fn test_backward_accumulates_until_cleared() {
        let layer = layer_with_params(&[1.0, 2.0, 3.0, 4.0], &[0.0, 0.0], 2, 2);

        let input = [1.0, 2.0];
        let grad_output = [1.0, -1.0];
        let mut grad_input = [0.0f32; 2];

        layer.backward(&input, &grad_output, &mut grad_input, 1);
        layer.backward(&input, &grad_output, &mut grad_input, 1);
        assert_eq!(&*layer.grad_biases.borrow(), &[2.0, -2.0]);

        layer.zero_gradients();
        assert!(layer.grad_weights.borrow().iter().all(|&g| g == 0.0));
        assert!(layer.grad_biases.borrow().iter().all(|&g| g == 0.0));
    }

    #[test]
    fn test_set_parameters_rejects_mismatch() {
        let mut rng = SimpleRng::new(1);
        let mut layer = DenseLayer::new(4, 2, &mut rng);
        let before = layer.weights().to_vec();

        let err = layer
            .set_parameters("hidden.0", [3, 2], &vec![0.0; 6], &vec![0.0; 2])
            .unwrap_err();

        assert_eq!(err.layer, "hidden.0");
        assert_eq!(err.expected, [4, 2]);
        assert_eq!(err.found, [3, 2]);
        // Parameters untouched on failure.
        assert_eq!(layer.weights(), &before[..]);
    }
}
