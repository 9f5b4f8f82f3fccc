//! Configurable feed-forward classifier with training and checkpointing
//!
//! This library provides a small offline stack for multi-layer perceptron
//! classification: model construction from an immutable architecture
//! descriptor, a minibatch training loop with held-out evaluation, and a
//! versioned checkpoint format for persisting and restoring full model
//! reconstruction state.
//!
//! # Modules
//!
//! - `architecture`: Immutable architecture descriptor and JSON loading
//! - `network`: The feed-forward model (dense / ReLU / dropout / log-softmax)
//! - `layers`: Dense and dropout layer implementations and the forward [`Mode`]
//! - `loss`: Negative-log-likelihood loss over log-probabilities
//! - `optimizers`: Optimizer trait and implementations (SGD, Adam)
//! - `trainer`: Training loop, evaluation, and per-epoch progress records
//! - `checkpoint`: Versioned save/restore of architecture + parameters
//! - `config`: Training configuration structures
//! - `data`: Batch container at the data-source boundary
//! - `utils`: Shared utilities (seeded RNG, activation functions)
//!
//! # Example
//!
//! ```
//! use mlp_classifier::architecture::Architecture;
//! use mlp_classifier::config::TrainConfig;
//! use mlp_classifier::data::Batch;
//! use mlp_classifier::network::Network;
//! use mlp_classifier::trainer::Trainer;
//! use mlp_classifier::utils::SimpleRng;
//!
//! let arch = Architecture::new(4, 2, vec![8], 0.0).unwrap();
//! let mut rng = SimpleRng::new(42);
//! let network = Network::new(arch, &mut rng).unwrap();
//!
//! let batch = Batch::new(vec![0.5; 8], vec![0, 1], 4).unwrap();
//! let mut trainer = Trainer::new(network, &TrainConfig::sgd(0.1, 1)).unwrap();
//! let loss = trainer.train_step(&batch).unwrap();
//! assert!(loss.is_finite());
//! ```

pub mod architecture;
pub mod checkpoint;
pub mod config;
pub mod data;
pub mod error;
pub mod layers;
pub mod loss;
pub mod network;
pub mod optimizers;
pub mod trainer;
pub mod utils;

pub use architecture::Architecture;
pub use checkpoint::Checkpoint;
pub use config::TrainConfig;
pub use data::Batch;
pub use error::{Error, Result};
pub use layers::Mode;
pub use network::Network;
pub use trainer::{EpochReport, Evaluation, Trainer};
