//! Optimizer abstractions for parameter updates
//!
//! Optimizers define how accumulated gradients turn into parameter changes.
//! The basic rule is `parameter -= learning_rate * gradient`; Adam layers
//! momentum and adaptive per-parameter rates on top of it.
//!
//! An optimizer instance carries state for exactly one parameter tensor.
//! The trainer builds one instance per tensor of the network (weights and
//! biases separately), so adaptive state never bleeds between tensors.

pub mod adam;
pub mod sgd;

pub use adam::Adam;
pub use sgd::SGD;

/// Core trait for parameter-update rules.
///
/// The trainer drives one instance per parameter tensor through
/// `Network::visit_parameters`; implementations may keep per-element state
/// (momentum, second moments) sized to that tensor.
pub trait Optimizer {
    /// Apply one update step to `parameters` in place.
    ///
    /// # Panics
    ///
    /// Implementations may panic if `parameters` and `gradients` have
    /// different lengths, or if the tensor size changes between calls.
    fn update(&mut self, parameters: &mut [f32], gradients: &[f32]);

    /// Clear accumulated optimizer state (momentum, moment estimates).
    ///
    /// A no-op for stateless rules like vanilla SGD.
    fn reset(&mut self);

    /// Base learning rate currently in effect.
    fn learning_rate(&self) -> f32;

    /// Replace the base learning rate (for schedules or decay).
    fn set_learning_rate(&mut self, lr: f32);
}
