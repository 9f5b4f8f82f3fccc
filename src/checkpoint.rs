//! Checkpoint save/restore for the classifier
//!
//! A checkpoint is a single versioned JSON record holding the architecture
//! descriptor plus every dense layer's parameters. Saving overwrites the
//! target file wholesale; loading reconstructs an identically-shaped network
//! from the embedded descriptor and injects the saved parameters by
//! position. Injection is all-or-nothing: on any shape disagreement the
//! error enumerates every mismatched layer and no parameter is written.

use crate::architecture::Architecture;
use crate::error::{Error, LayerShapeMismatch, Result};
use crate::network::Network;
use crate::utils::SimpleRng;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Checkpoint format version written by this build.
///
/// Bumped on any change to the record shape; [`Checkpoint::read`] rejects
/// other versions outright rather than guessing at migration.
pub const FORMAT_VERSION: u32 = 1;

/// Parameters of one dense layer as stored on disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayerRecord {
    /// Layer name in stack order: `hidden.0`, …, `output`
    pub name: String,
    /// Declared weight matrix rows (input features)
    pub in_features: usize,
    /// Declared weight matrix columns (output features)
    pub out_features: usize,
    /// Row-major weight matrix, `in_features × out_features` values
    pub weights: Vec<f32>,
    /// Bias vector, `out_features` values
    pub biases: Vec<f32>,
}

/// Serialized model reconstruction state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Checkpoint {
    /// Format version, checked strictly on read
    pub version: u32,
    /// Architecture descriptor carried verbatim from the live model
    pub architecture: Architecture,
    /// Per-layer parameters, hidden stack first, output layer last
    pub parameters: Vec<LayerRecord>,
}

impl Checkpoint {
    /// Snapshots a live network into a checkpoint record.
    ///
    /// The architecture comes from the network's immutable descriptor, never
    /// from inspecting layer objects.
    pub fn from_network(network: &Network) -> Self {
        let architecture = network.architecture().clone();
        let parameters = network
            .dense_layers()
            .enumerate()
            .map(|(i, layer)| LayerRecord {
                name: architecture.layer_name(i),
                in_features: layer.input_size(),
                out_features: layer.output_size(),
                weights: layer.weights().to_vec(),
                biases: layer.biases().to_vec(),
            })
            .collect();

        Self {
            version: FORMAT_VERSION,
            architecture,
            parameters,
        }
    }

    /// Writes the record to `path` as JSON, overwriting any existing file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] with the offending path if the write fails.
    pub fn write<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let encoded = serde_json::to_vec(self)
            .map_err(|e| Error::MalformedCheckpoint(e.to_string()))?;
        fs::write(path, encoded).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::info!(path = %path.display(), "saved checkpoint");
        Ok(())
    }

    /// Reads and validates a record from `path`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the file is missing or unreadable,
    /// [`Error::MalformedCheckpoint`] if it does not decode to an internally
    /// consistent record, and [`Error::UnsupportedVersion`] on format drift.
    pub fn read<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let checkpoint: Checkpoint = serde_json::from_str(&contents)
            .map_err(|e| Error::MalformedCheckpoint(e.to_string()))?;

        if checkpoint.version != FORMAT_VERSION {
            return Err(Error::UnsupportedVersion {
                found: checkpoint.version,
                supported: FORMAT_VERSION,
            });
        }
        checkpoint.validate()?;
        tracing::info!(path = %path.display(), "loaded checkpoint");
        Ok(checkpoint)
    }

    /// Checks that the record is internally consistent: the descriptor is
    /// valid, there is one layer record per dense layer it implies, and each
    /// record's stored vectors match its declared dimensions.
    fn validate(&self) -> Result<()> {
        self.architecture
            .validate()
            .map_err(|e| Error::MalformedCheckpoint(e.to_string()))?;

        let dims = self.architecture.layer_dims();
        if self.parameters.len() != dims.len() {
            return Err(Error::MalformedCheckpoint(format!(
                "architecture implies {} layers but {} parameter records are present",
                dims.len(),
                self.parameters.len()
            )));
        }

        for (record, &(in_features, out_features)) in self.parameters.iter().zip(&dims) {
            if record.in_features != in_features || record.out_features != out_features {
                return Err(Error::MalformedCheckpoint(format!(
                    "layer {} declares {}x{} but the architecture implies {}x{}",
                    record.name,
                    record.in_features,
                    record.out_features,
                    in_features,
                    out_features
                )));
            }
            if record.weights.len() != record.in_features * record.out_features {
                return Err(Error::MalformedCheckpoint(format!(
                    "layer {} stores {} weights for a {}x{} matrix",
                    record.name,
                    record.weights.len(),
                    record.in_features,
                    record.out_features
                )));
            }
            if record.biases.len() != record.out_features {
                return Err(Error::MalformedCheckpoint(format!(
                    "layer {} stores {} biases for {} outputs",
                    record.name,
                    record.biases.len(),
                    record.out_features
                )));
            }
        }

        Ok(())
    }

    /// Constructs a fresh network from the embedded descriptor and injects
    /// the saved parameters, returning a model ready for further training or
    /// inference.
    pub fn restore(&self) -> Result<Network> {
        // Initialization is immediately overwritten by injection, so the
        // seed only determines future dropout masks.
        let mut rng = SimpleRng::new(0);
        let mut network = Network::new(self.architecture.clone(), &mut rng)?;
        self.apply_to(&mut network)?;
        Ok(network)
    }

    /// Injects the saved parameters into an existing network by position.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ParameterShapeMismatch`] enumerating **every** layer
    /// whose stored shape disagrees with the live layer — including layers
    /// present on only one side when the stack depths differ (the absent
    /// side reports 0x0). No parameter is modified unless all layers match.
    pub fn apply_to(&self, network: &mut Network) -> Result<()> {
        let live_dims: Vec<[usize; 2]> = network
            .dense_layers()
            .map(|layer| [layer.input_size(), layer.output_size()])
            .collect();

        let mut mismatches = Vec::new();
        let count = live_dims.len().max(self.parameters.len());
        for i in 0..count {
            let expected = live_dims.get(i).copied().unwrap_or([0, 0]);
            let (name, found) = match self.parameters.get(i) {
                Some(record) => (
                    record.name.clone(),
                    [record.in_features, record.out_features],
                ),
                None => (network.architecture().layer_name(i), [0, 0]),
            };
            if expected != found {
                mismatches.push(LayerShapeMismatch {
                    layer: name,
                    expected,
                    found,
                });
            }
        }

        if !mismatches.is_empty() {
            return Err(Error::ParameterShapeMismatch(mismatches));
        }

        for (layer, record) in network.dense_layers_mut().zip(&self.parameters) {
            // Shapes were checked above; a failure here would be a logic bug.
            if let Err(mismatch) = layer.set_parameters(
                &record.name,
                [record.in_features, record.out_features],
                &record.weights,
                &record.biases,
            ) {
                return Err(Error::ParameterShapeMismatch(vec![mismatch]));
            }
        }

        Ok(())
    }
}

/// Snapshots `network` and writes it to `path`, overwriting any existing
/// file.
pub fn save<P: AsRef<Path>>(network: &Network, path: P) -> Result<()> {
    Checkpoint::from_network(network).write(path)
}

/// Reads the checkpoint at `path` and reconstructs its network.
pub fn load<P: AsRef<Path>>(path: P) -> Result<Network> {
    Checkpoint::read(path)?.restore()
}
