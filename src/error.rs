//! Error types for the pospace library

/// Error types for the pospace library
#[derive(Debug, thiserror::Error)]
pub enum PosError {
    /// Graph family index out of the supported range
    #[error("invalid graph index: {index} (must be >= {min})", min = crate::config::MIN_INDEX)]
    InvalidIndex { index: i64 },

    /// Public key length outside the accepted bounds
    #[error("invalid public key length: {len} bytes (must be 1..={max})", max = crate::config::MAX_PK_BYTES)]
    InvalidPkLength { len: usize },

    /// Node id outside the graph
    #[error("node id out of range: {node} (graph has {size} nodes)")]
    NodeOutOfRange { node: i64, size: i64 },

    /// Labeled-graph file has the wrong length for its geometry
    #[error("labeled graph store has {got} slots, expected {expected}")]
    StoreGeometry { got: i64, expected: i64 },

    /// Slot index outside the store
    #[error("slot index out of bounds: {slot} (store has {slots} slots)")]
    SlotOutOfBounds { slot: i64, slots: i64 },

    /// Merkle tree construction failed
    #[error("merkle tree error: {0}")]
    MerkleTree(String),

    /// Serialization/deserialization failed
    #[error("serialization error: {0}")]
    Serialization(String),

    /// IO operation failed. Fatal for builds and initialization; the
    /// partially written file is invalid and must be deleted by the caller.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience Result type for pospace operations
pub type Result<T> = std::result::Result<T, PosError>;
