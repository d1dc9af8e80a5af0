//! Wire types for commitments and proof-of-space answers.
//!
//! Hash preimages are bit-exact and schema-free; these envelope types
//! are what crosses the network, so they carry a magic number and a
//! format version in front of a pinned bincode body.

use bincode::Options;
use serde::{Deserialize, Serialize};

use crate::config::wire_format;
use crate::error::{PosError, Result};
use crate::hashing::Hash;

/// The prover's public commitment: its identity prefix and the Merkle
/// root over all graph labels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commitment {
    /// Public identity prefix baked into every label
    pub pk: Vec<u8>,
    /// Merkle root of the labeled graph
    pub commit: Hash,
}

/// A prover's response to a batch of challenges.
///
/// For challenge `j`: `hashes[j]` is the challenged node's label,
/// `proofs[j]` its authentication path, `parents[j]` the labels of its
/// DAG parents in wiring order, and `parent_proofs[j]` one
/// authentication path per parent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Answer {
    /// Number of nodes in the graph the answer was produced against
    pub size: i64,
    pub hashes: Vec<Hash>,
    pub parents: Vec<Vec<Hash>>,
    pub proofs: Vec<Vec<Hash>>,
    pub parent_proofs: Vec<Vec<Vec<Hash>>>,
}

/// Bincode options pinned so the wire format stays stable even if the
/// crate's defaults change.
fn wire_options() -> impl Options {
    bincode::DefaultOptions::new()
        .with_fixint_encoding()
        .with_little_endian()
        .reject_trailing_bytes()
}

fn frame(body: Vec<u8>) -> Vec<u8> {
    let mut out = Vec::with_capacity(wire_format::HEADER_SIZE + body.len());
    out.extend_from_slice(wire_format::MAGIC);
    out.extend_from_slice(&wire_format::VERSION.to_le_bytes());
    out.extend_from_slice(&(body.len() as u32).to_le_bytes());
    out.extend_from_slice(&body);
    out
}

fn unframe(bytes: &[u8]) -> Result<&[u8]> {
    if bytes.len() < wire_format::HEADER_SIZE {
        return Err(PosError::Serialization(
            "wire bytes too short for header".to_string(),
        ));
    }
    if &bytes[0..4] != wire_format::MAGIC {
        return Err(PosError::Serialization(
            "invalid magic bytes".to_string(),
        ));
    }
    let version = u16::from_le_bytes([bytes[4], bytes[5]]);
    if version != wire_format::VERSION {
        return Err(PosError::Serialization(format!(
            "unsupported wire format version: {version}"
        )));
    }
    let length = u32::from_le_bytes([bytes[6], bytes[7], bytes[8], bytes[9]]) as usize;
    let expected_len = wire_format::HEADER_SIZE + length;
    if bytes.len() < expected_len {
        return Err(PosError::Serialization("wire bytes truncated".to_string()));
    }
    if bytes.len() > expected_len {
        return Err(PosError::Serialization(
            "wire bytes contain trailing data".to_string(),
        ));
    }
    Ok(&bytes[wire_format::HEADER_SIZE..expected_len])
}

impl Commitment {
    /// Serializes this commitment for network transport.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let body = wire_options()
            .serialize(self)
            .map_err(|e| PosError::Serialization(format!("commitment encode failed: {e}")))?;
        Ok(frame(body))
    }

    /// Deserializes a commitment, validating magic and version first.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let body = unframe(bytes)?;
        wire_options()
            .deserialize(body)
            .map_err(|e| PosError::Serialization(format!("commitment decode failed: {e}")))
    }
}

impl Answer {
    /// Serializes this answer for network transport.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let body = wire_options()
            .serialize(self)
            .map_err(|e| PosError::Serialization(format!("answer encode failed: {e}")))?;
        Ok(frame(body))
    }

    /// Deserializes an answer, validating magic and version first.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let body = unframe(bytes)?;
        wire_options()
            .deserialize(body)
            .map_err(|e| PosError::Serialization(format!("answer decode failed: {e}")))
    }
}
