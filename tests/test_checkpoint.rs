// Tests for checkpoint persistence: round trips, overwrite idempotence,
// exhaustive shape-mismatch reporting, and format guards.

use mlp_classifier::architecture::Architecture;
use mlp_classifier::checkpoint::{self, Checkpoint, FORMAT_VERSION};
use mlp_classifier::layers::Mode;
use mlp_classifier::network::Network;
use mlp_classifier::utils::SimpleRng;
use mlp_classifier::Error;
use tempfile::tempdir;

fn build(input: usize, output: usize, hidden: Vec<usize>, drop: f32, seed: u64) -> Network {
    let arch = Architecture::new(input, output, hidden, drop).unwrap();
    let mut rng = SimpleRng::new(seed);
    Network::new(arch, &mut rng).unwrap()
}

#[test]
fn test_round_trip_is_bit_identical() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("model.json");

    let network = build(20, 5, vec![16, 8], 0.3, 42);
    checkpoint::save(&network, &path).unwrap();
    let restored = checkpoint::load(&path).unwrap();

    // Architecture metadata matches exactly.
    assert_eq!(restored.architecture(), network.architecture());

    // Parameters survive bit-for-bit.
    let original = Checkpoint::from_network(&network);
    let reloaded = Checkpoint::from_network(&restored);
    for (a, b) in original.parameters.iter().zip(&reloaded.parameters) {
        assert_eq!(a.name, b.name);
        assert_eq!(a.weights, b.weights);
        assert_eq!(a.biases, b.biases);
    }

    // And so does evaluation-mode behavior.
    let inputs = vec![0.25f32; 2 * 20];
    assert_eq!(
        network.forward(&inputs, 2, Mode::Eval).unwrap(),
        restored.forward(&inputs, 2, Mode::Eval).unwrap()
    );
}

#[test]
fn test_save_twice_is_idempotent() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("model.json");

    let network = build(10, 3, vec![8], 0.0, 7);
    checkpoint::save(&network, &path).unwrap();
    let first_bytes = std::fs::read(&path).unwrap();

    // No training in between; the overwrite produces the same record.
    checkpoint::save(&network, &path).unwrap();
    let second_bytes = std::fs::read(&path).unwrap();
    assert_eq!(first_bytes, second_bytes);

    let restored = checkpoint::load(&path).unwrap();
    let inputs = vec![0.5f32; 10];
    assert_eq!(
        network.forward(&inputs, 1, Mode::Eval).unwrap(),
        restored.forward(&inputs, 1, Mode::Eval).unwrap()
    );
}

#[test]
fn test_save_overwrites_previous_checkpoint() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("model.json");

    let first = build(6, 2, vec![4], 0.0, 1);
    let second = build(6, 2, vec![4], 0.0, 2);

    checkpoint::save(&first, &path).unwrap();
    checkpoint::save(&second, &path).unwrap();

    let restored = checkpoint::load(&path).unwrap();
    let snapshot = Checkpoint::from_network(&restored);
    let expected = Checkpoint::from_network(&second);
    assert_eq!(snapshot.parameters[0].weights, expected.parameters[0].weights);
}

#[test]
fn test_shape_mismatch_enumerates_all_layers() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("model.json");

    // Save a 784 -> [512, 256, 128] -> 10 model...
    let saved = build(784, 10, vec![512, 256, 128], 0.0, 42);
    checkpoint::save(&saved, &path).unwrap();

    // ...then force reconstruction with different hidden sizes.
    let mut target = build(784, 10, vec![400, 200, 100], 0.0, 1);
    let record = Checkpoint::read(&path).unwrap();
    let err = record.apply_to(&mut target).unwrap_err();

    let Error::ParameterShapeMismatch(mismatches) = err else {
        panic!("expected ParameterShapeMismatch");
    };

    // All 4 dense layers disagree (3 hidden + output), and every one is
    // reported with its expected and found shapes.
    assert_eq!(mismatches.len(), 4);

    let by_layer: Vec<(&str, [usize; 2], [usize; 2])> = mismatches
        .iter()
        .map(|m| (m.layer.as_str(), m.expected, m.found))
        .collect();
    assert!(by_layer.contains(&("hidden.0", [784, 400], [784, 512])));
    assert!(by_layer.contains(&("hidden.1", [400, 200], [512, 256])));
    assert!(by_layer.contains(&("hidden.2", [200, 100], [256, 128])));
    assert!(by_layer.contains(&("output", [100, 10], [128, 10])));

    // Target parameters were left untouched.
    let untouched = Checkpoint::from_network(&target);
    let fresh = Checkpoint::from_network(&build(784, 10, vec![400, 200, 100], 0.0, 1));
    assert_eq!(untouched.parameters[0].weights, fresh.parameters[0].weights);
}

#[test]
fn test_missing_file_is_io_failure() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("does_not_exist.json");

    let err = checkpoint::load(&path).unwrap_err();
    match err {
        Error::Io { path: reported, .. } => assert_eq!(reported, path),
        other => panic!("expected Io, got {:?}", other),
    }
}

#[test]
fn test_unsupported_version_rejected() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("model.json");

    let network = build(6, 2, vec![4], 0.0, 3);
    checkpoint::save(&network, &path).unwrap();

    // Tamper with the version field only.
    let contents = std::fs::read_to_string(&path).unwrap();
    let mut value: serde_json::Value = serde_json::from_str(&contents).unwrap();
    value["version"] = serde_json::json!(FORMAT_VERSION + 1);
    std::fs::write(&path, serde_json::to_vec(&value).unwrap()).unwrap();

    let err = checkpoint::load(&path).unwrap_err();
    assert!(matches!(
        err,
        Error::UnsupportedVersion {
            found,
            supported: FORMAT_VERSION,
        } if found == FORMAT_VERSION + 1
    ));
}

#[test]
fn test_garbage_file_is_malformed() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("model.json");
    std::fs::write(&path, b"not a checkpoint").unwrap();

    let err = checkpoint::load(&path).unwrap_err();
    assert!(matches!(err, Error::MalformedCheckpoint(_)));
}

#[test]
fn test_internally_inconsistent_record_rejected() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("model.json");

    let network = build(6, 2, vec![4], 0.0, 3);
    checkpoint::save(&network, &path).unwrap();

    // Drop one weight from the first layer; declared dims no longer match.
    let contents = std::fs::read_to_string(&path).unwrap();
    let mut value: serde_json::Value = serde_json::from_str(&contents).unwrap();
    value["parameters"][0]["weights"]
        .as_array_mut()
        .unwrap()
        .pop();
    std::fs::write(&path, serde_json::to_vec(&value).unwrap()).unwrap();

    let err = checkpoint::load(&path).unwrap_err();
    assert!(matches!(err, Error::MalformedCheckpoint(_)));
}

#[test]
fn test_restored_model_can_keep_training() {
    use mlp_classifier::config::TrainConfig;
    use mlp_classifier::data::Batch;
    use mlp_classifier::trainer::Trainer;

    let dir = tempdir().unwrap();
    let path = dir.path().join("model.json");

    let network = build(4, 2, vec![6], 0.0, 9);
    checkpoint::save(&network, &path).unwrap();

    let restored = checkpoint::load(&path).unwrap();
    let mut trainer = Trainer::new(restored, &TrainConfig::sgd(0.1, 1)).unwrap();
    let batch = Batch::new(vec![0.2; 8], vec![0, 1], 4).unwrap();

    let first = trainer.train_step(&batch).unwrap();
    let mut last = first;
    for _ in 0..20 {
        last = trainer.train_step(&batch).unwrap();
    }
    assert!(last < first);
}
