//! Layer building blocks for the feed-forward network
//!
//! This module provides the dense and dropout layers the network is built
//! from, plus the per-call [`Mode`] that replaces any global training flag.

pub mod dense;
pub mod dropout;

pub use dense::DenseLayer;
pub use dropout::DropoutLayer;

/// Forward-pass mode, passed explicitly on every call.
///
/// Dropout is active only in [`Mode::Train`]; in [`Mode::Eval`] the network
/// is deterministic. There is no stored mode to toggle and forget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Training mode: dropout masks are drawn and applied.
    Train,
    /// Evaluation mode: dropout is the identity.
    Eval,
}
