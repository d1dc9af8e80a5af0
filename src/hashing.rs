//! Hash primitives and preimage encoding.
//!
//! Every label in the graph is a SHA3-256 digest chained through parent
//! edges; challenge seeds are expanded with SHAKE-256. Node ids inside
//! hash preimages use a fixed 32-byte encoding so that commitments stay
//! bit-compatible across implementations.

use sha3::{
    digest::{ExtendableOutput, Update, XofReader},
    Digest, Sha3_256, Shake256,
};

use crate::config::{HASH_SIZE, MAX_PK_BYTES};
use crate::error::{PosError, Result};

/// A 32-byte SHA3-256 digest.
pub type Hash = [u8; HASH_SIZE];

/// SHA3-256 of `data`.
pub fn hash(data: &[u8]) -> Hash {
    let mut out = [0u8; HASH_SIZE];
    out.copy_from_slice(&Sha3_256::digest(data));
    out
}

/// Expands `seed` into `n` pseudorandom bytes with SHAKE-256.
pub fn expand(seed: &[u8], n: usize) -> Vec<u8> {
    let mut shake = Shake256::default();
    shake.update(seed);
    let mut out = vec![0u8; n];
    shake.finalize_xof().read(&mut out);
    out
}

/// Encodes a node id for use inside a hash preimage: a little-endian
/// zigzag varint written into the front of a zeroed 32-byte buffer.
///
/// The buffer is always consumed as the full 32 bytes when concatenated,
/// so trailing zeros are part of the preimage. Changing this layout
/// would invalidate every existing commitment.
pub fn encode_id(id: i64) -> [u8; HASH_SIZE] {
    let mut buf = [0u8; HASH_SIZE];
    let mut ux = ((id << 1) ^ (id >> 63)) as u64;
    let mut i = 0;
    while ux >= 0x80 {
        buf[i] = (ux as u8) | 0x80;
        ux >>= 7;
        i += 1;
    }
    buf[i] = ux as u8;
    buf
}

/// Computes the label preimage hash for a DAG node: `pk`, the encoded
/// heap id, then each parent label in wiring order.
pub fn node_label(pk: &[u8], heap_id: i64, parent_labels: &[Hash]) -> Hash {
    let mut hasher = Sha3_256::new();
    Digest::update(&mut hasher, pk);
    Digest::update(&mut hasher, encode_id(heap_id));
    for label in parent_labels {
        Digest::update(&mut hasher, label);
    }
    let mut out = [0u8; HASH_SIZE];
    out.copy_from_slice(&hasher.finalize());
    out
}

/// Hashes two child digests into their Merkle parent. Internal Merkle
/// nodes carry no `pk` prefix.
pub fn merkle_node(left: &Hash, right: &Hash) -> Hash {
    let mut hasher = Sha3_256::new();
    Digest::update(&mut hasher, left);
    Digest::update(&mut hasher, right);
    let mut out = [0u8; HASH_SIZE];
    out.copy_from_slice(&hasher.finalize());
    out
}

/// Checks a public identity prefix before it is baked into preimages.
pub(crate) fn validate_pk(pk: &[u8]) -> Result<()> {
    if pk.is_empty() || pk.len() > MAX_PK_BYTES {
        return Err(PosError::InvalidPkLength { len: pk.len() });
    }
    Ok(())
}

/// Concatenates a list of byte strings.
pub fn concat(parts: &[Hash]) -> Vec<u8> {
    let mut out = Vec::with_capacity(parts.len() * HASH_SIZE);
    for p in parts {
        out.extend_from_slice(p);
    }
    out
}
