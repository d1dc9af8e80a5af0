//! pospace — Proof-of-Space prover and verifier
//!
//! This library implements a Proof-of-Space scheme over pebbling-hard
//! stacked Xi graphs. A prover dedicates disk space to the labels of a
//! deterministic DAG, commits to them with a Merkle root, and answers
//! random node challenges with labels, parent labels, and
//! authentication paths; a verifier recomputes every hash chain and
//! rejects on any mismatch.
//!
//! ## Main Components
//!
//! - [`geometry`]: the Xi/Butterfly index algebra — node counts, the
//!   closed-form parent oracle, and the heap-to-post-order file layout
//! - [`builder`]: iterative labeling of a whole graph in topological order
//! - [`store`]: the fixed-stride label store ([`FileStore`] on disk,
//!   [`MemoryStore`] for tests) behind the [`NodeStore`] trait
//! - [`prover`]: Merkle commitment, openings, and challenge answering
//! - [`verifier`]: challenge selection and answer verification
//! - [`quality`]: scalar mining score over a verified answer
//! - [`types`]: the `Commitment` and `Answer` wire forms
//!
//! ## Error Handling
//!
//! Fallible operations return `Result<T, PosError>`. IO failures during
//! building or initialization are fatal and leave the labeled file
//! invalid; verification failures are never errors, they surface as
//! `false` from the `verify*` functions.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::path::Path;
//!
//! use pospace::{quality, PosError, Prover, Verifier, DEFAULT_BETA};
//!
//! let pk = [0x01u8; 32];
//!
//! // 1. Label the graph (once) and commit to it
//! let mut prover = Prover::new(&pk, 10, Path::new("space.graph"))?;
//! let commitment = prover.init()?;
//!
//! // 2. Derive challenges from a fresh seed and answer them
//! let verifier = Verifier::new(&pk, 10, DEFAULT_BETA, commitment.commit)?;
//! let challenges = verifier.select_challenges(b"block seed");
//! let answer = prover.prove_space(&challenges)?;
//!
//! // 3. Verify and score
//! assert!(verifier.verify_space(&challenges, &answer));
//! let score = quality(&verifier, &challenges, &answer);
//! assert!(score > 0.0 && score <= 1.0);
//! # Ok::<(), PosError>(())
//! ```

pub mod builder;
pub mod config;
pub mod error;
pub mod geometry;
pub mod hashing;
pub mod prover;
pub mod quality;
pub mod store;
pub mod types;
pub mod utils;
pub mod verifier;

// Re-export commonly used types and functions for convenience
pub use builder::GraphBuilder;
pub use config::{DEFAULT_BETA, HASH_SIZE, INVALID_QUALITY};
pub use error::{PosError, Result};
pub use geometry::{get_parents, num_butterfly, num_xi, TreeGeometry};
pub use hashing::Hash;
pub use prover::Prover;
pub use quality::quality;
pub use store::{FileStore, LabeledGraph, MemoryStore, NodeStore};
pub use types::{Answer, Commitment};
pub use verifier::Verifier;
