//! The space verifier: challenge selection and answer checking.
//!
//! A verifier is purely computational. It holds the prover's claimed
//! identity and commitment root plus the graph parameters, expands
//! seeds into challenge batches, and recomputes label and Merkle
//! chains from an answer. Inconsistent inputs are never errors here;
//! every check failure surfaces as a plain `false`.

use tracing::debug;

use crate::error::Result;
use crate::geometry::{get_parents, TreeGeometry};
use crate::hashing::{self, Hash};
use crate::types::Answer;

/// Stateless Proof-of-Space verifier for one commitment.
pub struct Verifier {
    pk: Vec<u8>,
    beta: usize,
    root: Hash,
    geometry: TreeGeometry,
}

impl Verifier {
    pub fn new(pk: &[u8], index: i64, beta: usize, root: Hash) -> Result<Self> {
        hashing::validate_pk(pk)?;
        Ok(Self {
            pk: pk.to_vec(),
            beta,
            root,
            geometry: TreeGeometry::new(index)?,
        })
    }

    pub fn geometry(&self) -> &TreeGeometry {
        &self.geometry
    }

    /// Expands a seed into `beta * log2` node challenges.
    ///
    /// Each challenge is the little-endian u64 at the next 8-byte window
    /// of the SHAKE-256 stream, reduced modulo the node count. The
    /// oversampling by `log2` is part of the protocol and must stay
    /// bit-exact.
    pub fn select_challenges(&self, seed: &[u8]) -> Vec<i64> {
        let count = self.beta * self.geometry.log2 as usize;
        let raw = hashing::expand(seed, count * 8);
        let mut challenges = Vec::with_capacity(count);
        for window in raw.chunks_exact(8) {
            let mut bytes = [0u8; 8];
            bytes.copy_from_slice(window);
            let value = u64::from_le_bytes(bytes);
            challenges.push((value % self.geometry.size as u64) as i64);
        }
        challenges
    }

    /// Recomputes the Merkle path of one node against the committed
    /// root. The path must carry exactly `log2` siblings.
    pub fn verify(&self, node: i64, hash: &Hash, proof: &[Hash]) -> bool {
        let TreeGeometry { pow2, log2, .. } = self.geometry;
        if !(0..pow2).contains(&node) {
            return false;
        }
        if proof.len() != log2 as usize {
            return false;
        }

        let mut current = *hash;
        let mut step = 0;
        let mut i = node + pow2;
        while i > 1 {
            current = if i % 2 == 0 {
                hashing::merkle_node(&current, &proof[step])
            } else {
                hashing::merkle_node(&proof[step], &current)
            };
            step += 1;
            i /= 2;
        }
        current == self.root
    }

    /// Checks a full answer against a challenge batch.
    ///
    /// For every challenge: the claimed label must equal the hash of
    /// `pk`, the node's encoded heap id, and the claimed parent labels;
    /// the label must sit in the committed tree; and each claimed parent
    /// label must sit in the tree at its oracle-derived position. Any
    /// single failure rejects the whole answer.
    pub fn verify_space(&self, challenges: &[i64], answer: &Answer) -> bool {
        let TreeGeometry { index, size, pow2, .. } = self.geometry;

        if answer.size != size {
            debug!(got = answer.size, expected = size, "answer size mismatch");
            return false;
        }
        if answer.hashes.len() != challenges.len()
            || answer.parents.len() != challenges.len()
            || answer.proofs.len() != challenges.len()
            || answer.parent_proofs.len() != challenges.len()
        {
            debug!("answer arity does not match challenge batch");
            return false;
        }

        for (j, &challenge) in challenges.iter().enumerate() {
            if !(0..size).contains(&challenge) {
                debug!(challenge, "challenge out of range");
                return false;
            }

            let parent_ids = get_parents(challenge, index);
            if answer.parents[j].len() != parent_ids.len()
                || answer.parent_proofs[j].len() != parent_ids.len()
            {
                debug!(challenge, "claimed parent count mismatch");
                return false;
            }

            let expected =
                hashing::node_label(&self.pk, challenge + pow2, &answer.parents[j]);
            if expected != answer.hashes[j] {
                debug!(challenge, "label does not match claimed parents");
                return false;
            }

            if !self.verify(challenge, &answer.hashes[j], &answer.proofs[j]) {
                debug!(challenge, "challenged label fails merkle check");
                return false;
            }

            for (k, &parent) in parent_ids.iter().enumerate() {
                if !self.verify(parent, &answer.parents[j][k], &answer.parent_proofs[j][k]) {
                    debug!(challenge, parent, "parent label fails merkle check");
                    return false;
                }
            }
        }

        true
    }
}
