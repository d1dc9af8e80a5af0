//! The space prover: commitment generation and challenge opening.
//!
//! A prover owns one labeled-graph store. `init` lays the Merkle layers
//! over the already-labeled leaves and returns the commitment; `open`
//! and `prove_space` answer challenges from the committed store. The
//! Merkle pass is an iterative post-order walk, so at most O(log2)
//! hashes are in memory at a time regardless of graph size.

use std::collections::HashSet;
use std::path::Path;

use tracing::{debug, info_span};

use crate::builder::GraphBuilder;
use crate::config::HASH_SIZE;
use crate::error::{PosError, Result};
use crate::geometry::{get_parents, TreeGeometry};
use crate::hashing::{self, Hash};
use crate::store::{FileStore, LabeledGraph, MemoryStore, NodeStore};
use crate::types::{Answer, Commitment};

/// One frame of the iterative post-order Merkle walk.
enum Frame {
    Enter(i64),
    Combine(i64),
}

/// Proof-of-Space prover bound to one labeled graph.
pub struct Prover<S: NodeStore> {
    pk: Vec<u8>,
    graph: LabeledGraph<S>,
    /// Interior heap ids whose subtree holds no real leaf; never
    /// materialized, read back as 32 zero bytes
    empty: HashSet<i64>,
    commit: Option<Hash>,
}

impl Prover<FileStore> {
    /// Opens the labeled graph at `path`, building and labeling it first
    /// if the file does not exist yet.
    pub fn new(pk: &[u8], index: i64, path: &Path) -> Result<Self> {
        let geometry = TreeGeometry::new(index)?;
        if path.exists() {
            let store = FileStore::open(path, geometry.slots())?;
            Self::open_in(pk, index, store)
        } else {
            let store = FileStore::create(path, geometry.slots())?;
            let mut prover = Self::build_in(pk, index, store)?;
            prover.graph.store_mut().sync()?;
            Ok(prover)
        }
    }
}

impl Prover<MemoryStore> {
    /// Builds a fully in-memory prover; used by tests and tiny graphs.
    pub fn new_in_memory(pk: &[u8], index: i64) -> Result<Self> {
        let geometry = TreeGeometry::new(index)?;
        Self::build_in(pk, index, MemoryStore::new(geometry.slots()))
    }
}

impl<S: NodeStore> Prover<S> {
    /// Wraps an empty store and labels the whole graph into it.
    pub fn build_in(pk: &[u8], index: i64, store: S) -> Result<Self> {
        let mut prover = Self::open_in(pk, index, store)?;
        let pk = prover.pk.clone();
        GraphBuilder::new(&pk, &mut prover.graph).build()?;
        Ok(prover)
    }

    /// Wraps a store that already holds a labeled graph.
    pub fn open_in(pk: &[u8], index: i64, store: S) -> Result<Self> {
        hashing::validate_pk(pk)?;
        let geometry = TreeGeometry::new(index)?;
        let graph = LabeledGraph::new(store, geometry)?;
        Ok(Self {
            pk: pk.to_vec(),
            empty: geometry.empty_nodes(),
            graph,
            commit: None,
        })
    }

    pub fn geometry(&self) -> &TreeGeometry {
        self.graph.geometry()
    }

    /// Root of the Merkle tree once `init` or `pre_init` has run.
    pub fn commit(&self) -> Option<&Hash> {
        self.commit.as_ref()
    }

    /// Builds the Merkle layers over the labeled leaves and returns the
    /// commitment. Must run after the graph is labeled and before any
    /// opening; interior nodes are persisted into the same store.
    pub fn init(&mut self) -> Result<Commitment> {
        let TreeGeometry { size, pow2, .. } = *self.graph.geometry();
        let _span = info_span!("init_commitment", size).entered();

        let mut frames = vec![Frame::Enter(1)];
        let mut hashes: Vec<Hash> = Vec::new();

        while let Some(frame) = frames.pop() {
            match frame {
                Frame::Enter(m) => {
                    if m >= pow2 {
                        // leaf: absent nodes past the last real leaf stay zero
                        if m - pow2 >= size {
                            hashes.push([0u8; HASH_SIZE]);
                        } else {
                            hashes.push(self.graph.get_node(m - pow2)?);
                        }
                    } else if self.empty.contains(&m) {
                        hashes.push([0u8; HASH_SIZE]);
                    } else {
                        frames.push(Frame::Combine(m));
                        frames.push(Frame::Enter(2 * m + 1));
                        frames.push(Frame::Enter(2 * m));
                    }
                }
                Frame::Combine(m) => {
                    let right = hashes.pop().ok_or_else(|| {
                        PosError::MerkleTree(format!("missing right child under heap id {m}"))
                    })?;
                    let left = hashes.pop().ok_or_else(|| {
                        PosError::MerkleTree(format!("missing left child under heap id {m}"))
                    })?;
                    let hash = hashing::merkle_node(&left, &right);
                    self.graph.put_internal(m, &hash)?;
                    hashes.push(hash);
                }
            }
        }

        let root = hashes
            .pop()
            .ok_or_else(|| PosError::MerkleTree("post-order walk produced no root".to_string()))?;
        debug!(root = ?&root[..4], "commitment computed");
        self.commit = Some(root);
        Ok(Commitment {
            pk: self.pk.clone(),
            commit: root,
        })
    }

    /// Reads the commitment back from a store whose Merkle layers were
    /// already materialized, without recomputing anything.
    pub fn pre_init(&mut self) -> Result<Commitment> {
        let root = self.graph.get_heap(1)?;
        self.commit = Some(root);
        Ok(Commitment {
            pk: self.pk.clone(),
            commit: root,
        })
    }

    /// Opens one node: its label and the `log2` sibling labels of its
    /// leaf-to-root path. Nodes past the last real leaf open as 32 zero
    /// bytes, and absent or empty siblings contribute zero entries.
    pub fn open(&mut self, node: i64) -> Result<(Hash, Vec<Hash>)> {
        let TreeGeometry { size, pow2, log2, .. } = *self.graph.geometry();
        if !(0..pow2).contains(&node) {
            return Err(PosError::NodeOutOfRange { node, size });
        }

        let hash = if node < size {
            self.graph.get_node(node)?
        } else {
            [0u8; HASH_SIZE]
        };

        let mut proof = Vec::with_capacity(log2 as usize);
        let mut i = node + pow2;
        while i > 1 {
            let sibling = if i % 2 == 0 { i + 1 } else { i - 1 };
            if sibling >= pow2 + size || self.empty.contains(&sibling) {
                proof.push([0u8; HASH_SIZE]);
            } else {
                proof.push(self.graph.get_heap(sibling)?);
            }
            i /= 2;
        }
        debug_assert_eq!(proof.len(), log2 as usize);
        Ok((hash, proof))
    }

    /// Answers a challenge batch: for every challenged node, its opening
    /// plus the openings of all its DAG parents, in wiring order.
    pub fn prove_space(&mut self, challenges: &[i64]) -> Result<Answer> {
        let TreeGeometry { index, size, .. } = *self.graph.geometry();
        let _span = info_span!("prove_space", challenges = challenges.len()).entered();

        let mut hashes = Vec::with_capacity(challenges.len());
        let mut proofs = Vec::with_capacity(challenges.len());
        let mut parents = Vec::with_capacity(challenges.len());
        let mut parent_proofs = Vec::with_capacity(challenges.len());

        for &challenge in challenges {
            let (hash, proof) = self.open(challenge)?;
            hashes.push(hash);
            proofs.push(proof);

            let mut parent_hashes = Vec::new();
            let mut parent_paths = Vec::new();
            for parent in get_parents(challenge, index) {
                let (hash, proof) = self.open(parent)?;
                parent_hashes.push(hash);
                parent_paths.push(proof);
            }
            parents.push(parent_hashes);
            parent_proofs.push(parent_paths);
        }

        Ok(Answer {
            size,
            hashes,
            parents,
            proofs,
            parent_proofs,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labeled_prover(index: i64) -> Prover<MemoryStore> {
        Prover::new_in_memory(&[0x01], index).unwrap()
    }

    #[test]
    fn test_index_1_commitment_matches_hand_built_tree() {
        let mut prover = labeled_prover(1);
        let commitment = prover.init().unwrap();

        let l: Vec<Hash> = (0..4).map(|n| prover.graph.get_node(n).unwrap()).collect();
        let n2 = hashing::merkle_node(&l[0], &l[1]);
        let n3 = hashing::merkle_node(&l[2], &l[3]);
        let root = hashing::merkle_node(&n2, &n3);

        assert_eq!(commitment.commit, root);
        assert_eq!(commitment.pk, vec![0x01]);
        assert_eq!(prover.commit(), Some(&root));
    }

    #[test]
    fn test_pre_init_reads_back_same_commitment() {
        let mut prover = labeled_prover(2);
        let built = prover.init().unwrap();

        let mut reopened =
            Prover::open_in(&[0x01], 2, prover.graph.store().clone()).unwrap();
        let reread = reopened.pre_init().unwrap();
        assert_eq!(built, reread);
    }

    #[test]
    fn test_open_path_shape() {
        let mut prover = labeled_prover(2);
        prover.init().unwrap();

        for node in 0..prover.geometry().size {
            let (hash, proof) = prover.open(node).unwrap();
            assert_eq!(proof.len(), 5);
            assert_ne!(hash, [0u8; HASH_SIZE]);
        }
    }

    #[test]
    fn test_open_absent_node_is_zero_labeled() {
        let mut prover = labeled_prover(2);
        prover.init().unwrap();

        // nodes in [size, pow2) are padding leaves
        let (hash, proof) = prover.open(24).unwrap();
        assert_eq!(hash, [0u8; HASH_SIZE]);
        assert_eq!(proof.len(), 5);
        // its sibling 57 roots an unrealized subtree
        assert_eq!(proof[0], [0u8; HASH_SIZE]);

        assert!(prover.open(-1).is_err());
        assert!(prover.open(32).is_err());
    }

    #[test]
    fn test_empty_frontier_ancestors_are_materialized() {
        // for index 2 the unrealized subtrees are {57, 29, 15}; their
        // ancestors 28, 14, 7 hold hash chains over zero children
        let mut prover = labeled_prover(2);
        prover.init().unwrap();

        let zero = [0u8; HASH_SIZE];
        let h28 = hashing::merkle_node(&zero, &zero);
        let h14 = hashing::merkle_node(&h28, &zero);
        let h7 = hashing::merkle_node(&h14, &zero);
        assert_eq!(prover.graph.get_heap(28).unwrap(), h28);
        assert_eq!(prover.graph.get_heap(14).unwrap(), h14);
        assert_eq!(prover.graph.get_heap(7).unwrap(), h7);
        // the unrealized roots themselves stay zero on disk
        assert_eq!(prover.graph.get_heap(15).unwrap(), zero);
        assert_eq!(prover.graph.get_heap(29).unwrap(), zero);
    }

    #[test]
    fn test_prove_space_shapes_follow_parent_counts() {
        let mut prover = labeled_prover(2);
        prover.init().unwrap();

        let challenges = [0i64, 4, 8, 20];
        let answer = prover.prove_space(&challenges).unwrap();
        assert_eq!(answer.size, 24);
        assert_eq!(answer.hashes.len(), 4);
        // node 0 is a source, 4 and 20 have two parents, 8 has one
        assert_eq!(answer.parents[0].len(), 0);
        assert_eq!(answer.parents[1].len(), 2);
        assert_eq!(answer.parents[2].len(), 1);
        assert_eq!(answer.parents[3].len(), 2);
        for (j, proof) in answer.proofs.iter().enumerate() {
            assert_eq!(proof.len(), 5, "challenge {j}");
        }
    }
}
