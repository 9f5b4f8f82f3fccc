//! Adam (Adaptive Moment Estimation) optimizer implementation
//!
//! Adam combines momentum with per-parameter adaptive learning rates and
//! bias correction:
//!
//! ```text
//! m_t = β1 * m_{t-1} + (1 - β1) * g
//! v_t = β2 * v_{t-1} + (1 - β2) * g²
//! w  -= α * (m_t / (1 - β1^t)) / (sqrt(v_t / (1 - β2^t)) + ε)
//! ```
//!
//! Reference: Kingma & Ba (2014), "Adam: A Method for Stochastic
//! Optimization", arXiv:1412.6980.

use crate::optimizers::Optimizer;

/// Adam optimizer for a single parameter tensor.
///
/// Maintains first and second moment estimates per element, lazily sized on
/// the first update. One instance must stay bound to one tensor; the size is
/// pinned after the first call.
#[derive(Clone)]
pub struct Adam {
    learning_rate: f32,
    beta1: f32,
    beta2: f32,
    epsilon: f32,
    /// First moment estimates (momentum)
    m: Vec<f32>,
    /// Second moment estimates (adaptive learning rate)
    v: Vec<f32>,
    /// Time step counter for bias correction
    t: u32,
}

impl Adam {
    /// Creates a new Adam optimizer.
    ///
    /// The paper's defaults work well in practice: `learning_rate = 0.001`,
    /// `beta1 = 0.9`, `beta2 = 0.999`, `epsilon = 1e-8`.
    ///
    /// # Examples
    ///
    /// ```
    /// use mlp_classifier::optimizers::{Adam, Optimizer};
    ///
    /// let optimizer = Adam::new(0.001, 0.9, 0.999, 1e-8);
    /// assert_eq!(optimizer.learning_rate(), 0.001);
    /// ```
    pub fn new(learning_rate: f32, beta1: f32, beta2: f32, epsilon: f32) -> Self {
        Self {
            learning_rate,
            beta1,
            beta2,
            epsilon,
            m: Vec::new(),
            v: Vec::new(),
            t: 0,
        }
    }
}

impl Optimizer for Adam {
    fn update(&mut self, parameters: &mut [f32], gradients: &[f32]) {
        assert_eq!(
            parameters.len(),
            gradients.len(),
            "parameters and gradients must have the same length"
        );

        if self.m.is_empty() {
            self.m = vec![0.0; parameters.len()];
            self.v = vec![0.0; parameters.len()];
        }
        assert_eq!(
            self.m.len(),
            parameters.len(),
            "Adam instance bound to a tensor of different size"
        );

        self.t += 1;
        let bias_correction1 = 1.0 - self.beta1.powi(self.t as i32);
        let bias_correction2 = 1.0 - self.beta2.powi(self.t as i32);

        for (((param, &grad), m), v) in parameters
            .iter_mut()
            .zip(gradients)
            .zip(self.m.iter_mut())
            .zip(self.v.iter_mut())
        {
            *m = self.beta1 * *m + (1.0 - self.beta1) * grad;
            *v = self.beta2 * *v + (1.0 - self.beta2) * grad * grad;

            let m_hat = *m / bias_correction1;
            let v_hat = *v / bias_correction2;

            *param -= self.learning_rate * m_hat / (v_hat.sqrt() + self.epsilon);
        }
    }

    fn reset(&mut self) {
        self.m.clear();
        self.v.clear();
        self.t = 0;
    }

    fn learning_rate(&self) -> f32 {
        self.learning_rate
    }

    fn set_learning_rate(&mut self, lr: f32) {
        self.learning_rate = lr;
    }
}
