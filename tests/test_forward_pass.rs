// Tests for the forward pass: log-probability normalization, shape errors,
// and the per-call train/eval mode contract.

use mlp_classifier::architecture::Architecture;
use mlp_classifier::layers::Mode;
use mlp_classifier::network::Network;
use mlp_classifier::utils::SimpleRng;
use mlp_classifier::Error;

fn build(
    input: usize,
    output: usize,
    hidden: Vec<usize>,
    drop: f32,
    seed: u64,
) -> Network {
    let arch = Architecture::new(input, output, hidden, drop).unwrap();
    let mut rng = SimpleRng::new(seed);
    Network::new(arch, &mut rng).unwrap()
}

fn random_inputs(count: usize, rng: &mut SimpleRng) -> Vec<f32> {
    (0..count).map(|_| rng.gen_range_f32(-1.0, 1.0)).collect()
}

#[test]
fn test_rows_normalize_across_architectures() {
    let cases: Vec<(usize, usize, Vec<usize>)> = vec![
        (4, 2, vec![8]),
        (16, 5, vec![32, 16]),
        (784, 10, vec![128, 64]),
        (7, 3, vec![9, 9, 9]),
    ];

    let mut data_rng = SimpleRng::new(99);
    for (input, output, hidden) in cases {
        let network = build(input, output, hidden, 0.0, 42);
        let batch_size = 3;
        let inputs = random_inputs(batch_size * input, &mut data_rng);

        let log_probs = network.forward(&inputs, batch_size, Mode::Eval).unwrap();
        assert_eq!(log_probs.len(), batch_size * output);

        for row in log_probs.chunks_exact(output) {
            let sum: f32 = row.iter().map(|&x| x.exp()).sum();
            assert!(
                (sum - 1.0).abs() < 1e-5,
                "row exponentials sum to {} for input size {}",
                sum,
                input
            );
        }
    }
}

#[test]
fn test_feature_length_mismatch_is_fatal() {
    let network = build(10, 4, vec![6], 0.0, 42);

    // 9 features per sample instead of 10.
    let inputs = vec![0.5f32; 2 * 9];
    let err = network.forward(&inputs, 2, Mode::Eval).unwrap_err();

    match err {
        Error::InputShapeMismatch {
            batch_size,
            features,
            expected,
            found,
        } => {
            assert_eq!(batch_size, 2);
            assert_eq!(features, 10);
            assert_eq!(expected, 20);
            assert_eq!(found, 18);
        }
        other => panic!("expected InputShapeMismatch, got {:?}", other),
    }
}

#[test]
fn test_eval_mode_is_deterministic_with_dropout() {
    let network = build(12, 3, vec![32, 16], 0.5, 42);
    let mut data_rng = SimpleRng::new(7);
    let inputs = random_inputs(4 * 12, &mut data_rng);

    let first = network.forward(&inputs, 4, Mode::Eval).unwrap();
    let second = network.forward(&inputs, 4, Mode::Eval).unwrap();

    // Two evaluation-mode passes on the same input must be identical.
    assert_eq!(first, second);
}

#[test]
fn test_train_mode_masks_vary_with_dropout() {
    let network = build(12, 3, vec![64, 64], 0.5, 42);
    let mut data_rng = SimpleRng::new(7);
    let inputs = random_inputs(4 * 12, &mut data_rng);

    let first = network.forward(&inputs, 4, Mode::Train).unwrap();
    let second = network.forward(&inputs, 4, Mode::Train).unwrap();

    // Fresh masks are drawn per pass; identical outputs would mean dropout
    // never fired.
    assert_ne!(first, second);
}

#[test]
fn test_mode_does_not_leak_between_calls() {
    let network = build(12, 3, vec![32], 0.5, 42);
    let mut data_rng = SimpleRng::new(7);
    let inputs = random_inputs(12, &mut data_rng);

    let baseline = network.forward(&inputs, 1, Mode::Eval).unwrap();
    let _ = network.forward(&inputs, 1, Mode::Train).unwrap();
    let after_training_pass = network.forward(&inputs, 1, Mode::Eval).unwrap();

    // A training-mode call in between must not change evaluation behavior.
    assert_eq!(baseline, after_training_pass);
}

#[test]
fn test_single_hidden_layer_and_single_class_edge() {
    // Smallest valid shapes still normalize.
    let network = build(1, 1, vec![1], 0.0, 5);
    let log_probs = network.forward(&[0.3], 1, Mode::Eval).unwrap();
    assert_eq!(log_probs.len(), 1);
    assert!((log_probs[0].exp() - 1.0).abs() < 1e-6);
}
