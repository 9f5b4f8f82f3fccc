//! Negative-log-likelihood loss over log-probabilities
//!
//! The network's output is already log-softmax normalized, so the loss picks
//! the log-probability of the true class directly instead of taking the log
//! of a probability, which would underflow near 0.

use crate::error::{Error, Result};

/// Computes the mean negative-log-likelihood loss for a batch and writes the
/// gradient with respect to the pre-log-softmax logits into `delta`.
///
/// For log-softmax outputs the two chain-rule steps collapse into
/// `delta[r][c] = (exp(log_probs[r][c]) - 1{c == label_r}) / batch_size`,
/// which is the softmax probability minus the one-hot target, averaged over
/// the batch. The caller feeds `delta` straight into the output layer's
/// backward pass.
///
/// # Arguments
///
/// * `log_probs` - Row-major log-probabilities (batch_size × num_classes)
/// * `labels` - True class labels, one per row
/// * `batch_size` - Number of samples in the batch
/// * `num_classes` - Number of classes per sample
/// * `delta` - Gradient buffer, same shape as `log_probs`
///
/// # Errors
///
/// Returns [`Error::LabelOutOfRange`] if any label is `>= num_classes`.
///
/// # Examples
///
/// ```
/// use mlp_classifier::loss::nll_loss_and_delta;
///
/// // One sample, two classes, p = [0.9, 0.1]
/// let log_probs = [0.9f32.ln(), 0.1f32.ln()];
/// let mut delta = [0.0f32; 2];
/// let loss = nll_loss_and_delta(&log_probs, &[0], 1, 2, &mut delta).unwrap();
/// assert!((loss + 0.9f32.ln()).abs() < 1e-6);
/// assert!((delta[0] - (-0.1)).abs() < 1e-6);
/// assert!((delta[1] - 0.1).abs() < 1e-6);
/// ```
pub fn nll_loss_and_delta(
    log_probs: &[f32],
    labels: &[usize],
    batch_size: usize,
    num_classes: usize,
    delta: &mut [f32],
) -> Result<f32> {
    assert_eq!(log_probs.len(), batch_size * num_classes);
    assert_eq!(labels.len(), batch_size);
    assert_eq!(delta.len(), batch_size * num_classes);

    let inv_batch = 1.0f32 / batch_size as f32;
    let mut total_loss = 0.0f32;

    for ((row, delta_row), &label) in log_probs
        .chunks_exact(num_classes)
        .zip(delta.chunks_exact_mut(num_classes))
        .zip(labels)
    {
        if label >= num_classes {
            return Err(Error::LabelOutOfRange { label, num_classes });
        }

        total_loss -= row[label];

        for (j, (d, &lp)) in delta_row.iter_mut().zip(row).enumerate() {
            let mut v = lp.exp();
            if j == label {
                v -= 1.0;
            }
            *d = v * inv_batch;
        }
    }

    Ok(total_loss * inv_batch)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_loss_and_delta_two_samples() {
        // p = [[0.1, 0.2, 0.7], [0.3, 0.4, 0.3]], labels [2, 1]
        let probs = [0.1f32, 0.2, 0.7, 0.3, 0.4, 0.3];
        let log_probs: Vec<f32> = probs.iter().map(|p| p.ln()).collect();
        let mut delta = vec![0.0f32; 6];

        let loss = nll_loss_and_delta(&log_probs, &[2, 1], 2, 3, &mut delta).unwrap();

        let expected = -(0.7f32.ln() + 0.4f32.ln()) / 2.0;
        assert_relative_eq!(loss, expected, epsilon = 1e-6);

        // True-class entries carry probability minus one, averaged.
        assert_relative_eq!(delta[2], (0.7 - 1.0) / 2.0, epsilon = 1e-6);
        assert_relative_eq!(delta[4], (0.4 - 1.0) / 2.0, epsilon = 1e-6);
        assert_relative_eq!(delta[0], 0.1 / 2.0, epsilon = 1e-6);
    }

    #[test]
    fn test_delta_rows_sum_to_zero() {
        let probs = [0.25f32, 0.25, 0.5];
        let log_probs: Vec<f32> = probs.iter().map(|p| p.ln()).collect();
        let mut delta = vec![0.0f32; 3];

        nll_loss_and_delta(&log_probs, &[0], 1, 3, &mut delta).unwrap();

        let sum: f32 = delta.iter().sum();
        assert_relative_eq!(sum, 0.0, epsilon = 1e-6);
    }

    #[test]
    fn test_perfect_prediction_loss_near_zero() {
        let log_probs = [0.0f32, -30.0, -30.0]; // p ≈ [1, 0, 0]
        let mut delta = vec![0.0f32; 3];

        let loss = nll_loss_and_delta(&log_probs, &[0], 1, 3, &mut delta).unwrap();
        assert_relative_eq!(loss, 0.0, epsilon = 1e-6);
    }

    #[test]
    fn test_label_out_of_range() {
        let log_probs = [-1.0f32, -1.0, -1.0];
        let mut delta = vec![0.0f32; 3];

        let err = nll_loss_and_delta(&log_probs, &[3], 1, 3, &mut delta).unwrap_err();
        assert!(matches!(
            err,
            Error::LabelOutOfRange {
                label: 3,
                num_classes: 3
            }
        ));
    }
}
