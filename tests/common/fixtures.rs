//! Test fixtures and scenario setup.
//!
//! A `Scenario` is one committed in-memory graph with its matching
//! verifier, ready for challenge/answer exercises.

#![allow(dead_code)]

use pospace::{Answer, Commitment, MemoryStore, Prover, Verifier};

/// Default test identity prefix.
pub const TEST_PK: [u8; 1] = [0x01];

/// Seed used by the deterministic end-to-end scenarios.
pub const TEST_SEED: [u8; 32] = [0x02; 32];

/// A committed prover/verifier pair over an in-memory graph.
pub struct Scenario {
    pub pk: Vec<u8>,
    pub beta: usize,
    pub prover: Prover<MemoryStore>,
    pub verifier: Verifier,
    pub commitment: Commitment,
}

/// Builds, labels, and commits a graph with the default test identity.
pub fn setup(index: i64, beta: usize) -> Scenario {
    setup_with_pk(&TEST_PK, index, beta)
}

/// Installs the test tracing subscriber once; `RUST_LOG` controls
/// verbosity of build/init spans during test runs.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Builds, labels, and commits a graph for an arbitrary identity.
pub fn setup_with_pk(pk: &[u8], index: i64, beta: usize) -> Scenario {
    init_tracing();
    let mut prover = Prover::new_in_memory(pk, index).expect("in-memory build");
    let commitment = prover.init().expect("commitment");
    let verifier = Verifier::new(pk, index, beta, commitment.commit).expect("verifier");
    Scenario {
        pk: pk.to_vec(),
        beta,
        prover,
        verifier,
        commitment,
    }
}

impl Scenario {
    /// Draws a challenge batch from `seed` and answers it.
    pub fn challenge_and_answer(&mut self, seed: &[u8]) -> (Vec<i64>, Answer) {
        let challenges = self.verifier.select_challenges(seed);
        let answer = self
            .prover
            .prove_space(&challenges)
            .expect("prove_space on committed graph");
        (challenges, answer)
    }
}

/// Temp-dir path for tests that exercise the on-disk store.
pub fn temp_graph_path(name: &str) -> std::path::PathBuf {
    std::env::temp_dir().join(format!("pospace_test_{name}.graph"))
}
