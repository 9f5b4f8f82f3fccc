//! Dropout layer implementation for regularization
//!
//! This module provides a DropoutLayer that randomly zeroes a fraction of its
//! inputs in training mode and passes inputs through unchanged in evaluation
//! mode. The mode is supplied per forward call rather than held as layer
//! state, so a caller can never leave the layer stuck in the wrong mode.

use crate::layers::Mode;
use crate::utils::SimpleRng;
use std::cell::RefCell;

/// Dropout layer for regularization.
///
/// In [`Mode::Train`], each unit is dropped with probability
/// `drop_probability` and surviving units are scaled by
/// `1 / (1 - drop_probability)` to keep expected values unchanged (inverted
/// dropout). In [`Mode::Eval`], inputs pass through untouched.
///
/// The mask from the most recent training-mode forward pass is kept so the
/// backward pass can route gradients through exactly the units that survived.
#[derive(Debug)]
pub struct DropoutLayer {
    size: usize,
    drop_probability: f32,
    mask: RefCell<Vec<f32>>,
    rng: RefCell<SimpleRng>,
}

impl DropoutLayer {
    /// Creates a new dropout layer.
    ///
    /// # Arguments
    ///
    /// * `size` - Number of input/output features
    /// * `drop_probability` - Probability of dropping each unit, range [0.0, 1.0)
    /// * `rng` - Seeded generator; the layer forks its own stream from it
    ///
    /// # Panics
    ///
    /// Panics if `drop_probability` is outside [0.0, 1.0). The architecture
    /// descriptor validates the range before layers are built.
    pub fn new(size: usize, drop_probability: f32, rng: &mut SimpleRng) -> Self {
        assert!(
            (0.0..1.0).contains(&drop_probability),
            "drop_probability must be in range [0.0, 1.0)"
        );

        Self {
            size,
            drop_probability,
            mask: RefCell::new(Vec::new()),
            rng: RefCell::new(rng.fork()),
        }
    }

    /// Forward propagation through the dropout layer.
    ///
    /// In training mode a fresh mask is drawn and stored; in evaluation mode
    /// the input is copied through and the stored mask is left untouched.
    pub fn forward(&self, input: &[f32], output: &mut [f32], batch_size: usize, mode: Mode) {
        let total_size = batch_size * self.size;
        assert_eq!(input.len(), total_size);
        assert_eq!(output.len(), total_size);

        match mode {
            Mode::Eval => {
                output.copy_from_slice(input);
            }
            Mode::Train => {
                let mut mask = self.mask.borrow_mut();
                let mut rng = self.rng.borrow_mut();
                mask.resize(total_size, 0.0);

                let keep_scale = 1.0 / (1.0 - self.drop_probability);
                for ((m, out), &x) in mask.iter_mut().zip(output.iter_mut()).zip(input) {
                    *m = if rng.gen_bool(self.drop_probability) {
                        0.0
                    } else {
                        keep_scale
                    };
                    *out = x * *m;
                }
            }
        }
    }

    /// Backward propagation: applies the mask from the last training-mode
    /// forward pass to `grad_output`.
    ///
    /// # Panics
    ///
    /// Panics if no training-mode forward pass of the same batch size
    /// preceded this call; the trainer always pairs the two.
    pub fn backward(&self, grad_output: &[f32], grad_input: &mut [f32], batch_size: usize) {
        let total_size = batch_size * self.size;
        assert_eq!(grad_output.len(), total_size);
        assert_eq!(grad_input.len(), total_size);

        let mask = self.mask.borrow();
        assert_eq!(mask.len(), total_size, "backward without matching forward");

        for ((gi, &g), &m) in grad_input.iter_mut().zip(grad_output).zip(mask.iter()) {
            *gi = g * m;
        }
    }

    /// Probability of dropping each unit in training mode.
    pub fn drop_probability(&self) -> f32 {
        self.drop_probability
    }

    /// Number of input/output features (dropout doesn't change dimensions).
    pub fn size(&self) -> usize {
        self.size
    }
}
