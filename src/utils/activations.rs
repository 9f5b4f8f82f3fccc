//! Activation functions for the dense stack
//!
//! Provides the two activations the network uses:
//! - ReLU between hidden layers (f32, in-place)
//! - Log-softmax on the output layer (f32, row-wise)

/// ReLU activation function applied in-place.
///
/// Sets all negative values to 0.0, keeps positive values unchanged.
pub fn relu_inplace(data: &mut [f32]) {
    for value in data.iter_mut() {
        if *value < 0.0 {
            *value = 0.0;
        }
    }
}

/// Log-softmax applied row-wise.
///
/// Converts logits to log-probabilities for each row:
/// `log_softmax(x_i) = x_i - max(x) - ln(sum(exp(x - max(x))))`.
/// Working in log space keeps the negative-log-likelihood loss away from
/// floating-point underflow near probabilities of 0 and 1; the max
/// subtraction avoids overflow with large logits.
///
/// # Arguments
/// * `outputs` - Flat array containing row-major matrix data
/// * `rows` - Number of rows in the matrix
/// * `cols` - Number of columns in the matrix
pub fn log_softmax_rows(outputs: &mut [f32], rows: usize, cols: usize) {
    if cols == 0 {
        return;
    }
    assert_eq!(
        outputs.len(),
        rows * cols,
        "outputs length mismatch in log_softmax_rows"
    );

    for row in outputs.chunks_exact_mut(cols).take(rows) {
        let mut max_value = row[0];
        for &value in row.iter().skip(1) {
            if value > max_value {
                max_value = value;
            }
        }

        let mut sum = 0.0f32;
        for value in row.iter() {
            sum += (*value - max_value).exp();
        }
        let log_sum = sum.ln();

        for value in row.iter_mut() {
            *value = *value - max_value - log_sum;
        }
    }
}
