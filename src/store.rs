//! Fixed-stride label storage.
//!
//! One flat array of 32-byte slots holds every DAG label and interior
//! Merkle node, addressed by post-order position. The graph logic is
//! generic over the [`NodeStore`] capability set so tests can run
//! against memory while production runs against a file.
//!
//! Discipline: a single writer at a time, no readers while a writer is
//! active. The builder writes leaves, `Prover::init` writes interior
//! nodes, and everything afterwards only reads. Enforcement is the
//! caller's responsibility.

use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::Path;

use crate::config::HASH_SIZE;
use crate::error::{PosError, Result};
use crate::geometry::TreeGeometry;
use crate::hashing::Hash;

/// Random-access storage for 32-byte label slots.
pub trait NodeStore {
    /// Number of slots the store holds.
    fn slots(&self) -> i64;

    /// Reads slot `slot`. Short reads are fatal IO errors.
    fn get(&mut self, slot: i64) -> Result<Hash>;

    /// Writes slot `slot`. Short writes are fatal IO errors.
    fn put(&mut self, slot: i64, label: &Hash) -> Result<()>;
}

/// On-disk store: a file of exactly `slots * 32` bytes with no header,
/// magic, or footer. Callers must know the graph parameters out of band.
#[derive(Debug)]
pub struct FileStore {
    file: File,
    slots: i64,
}

impl FileStore {
    /// Creates a zero-filled store of `slots` slots, truncating any
    /// existing file at `path`.
    pub fn create(path: &Path, slots: i64) -> Result<Self> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)?;
        file.set_len(slots as u64 * HASH_SIZE as u64)?;
        Ok(Self { file, slots })
    }

    /// Opens an existing store read-write and checks its length against
    /// the expected slot count.
    pub fn open(path: &Path, slots: i64) -> Result<Self> {
        let file = OpenOptions::new().read(true).write(true).open(path)?;
        let len = file.metadata()?.len();
        if len != slots as u64 * HASH_SIZE as u64 {
            return Err(PosError::StoreGeometry {
                got: (len / HASH_SIZE as u64) as i64,
                expected: slots,
            });
        }
        Ok(Self { file, slots })
    }

    /// Flushes all written labels to disk.
    pub fn sync(&mut self) -> Result<()> {
        self.file.sync_all()?;
        Ok(())
    }

    fn seek_slot(&mut self, slot: i64) -> Result<()> {
        if !(0..self.slots).contains(&slot) {
            return Err(PosError::SlotOutOfBounds {
                slot,
                slots: self.slots,
            });
        }
        self.file
            .seek(SeekFrom::Start(slot as u64 * HASH_SIZE as u64))?;
        Ok(())
    }
}

impl NodeStore for FileStore {
    fn slots(&self) -> i64 {
        self.slots
    }

    fn get(&mut self, slot: i64) -> Result<Hash> {
        self.seek_slot(slot)?;
        let mut buf = [0u8; HASH_SIZE];
        self.file.read_exact(&mut buf)?;
        Ok(buf)
    }

    fn put(&mut self, slot: i64, label: &Hash) -> Result<()> {
        self.seek_slot(slot)?;
        self.file.write_all(label)?;
        Ok(())
    }
}

/// In-memory store for tests and small graphs.
#[derive(Debug, Clone)]
pub struct MemoryStore {
    data: Vec<u8>,
}

impl MemoryStore {
    pub fn new(slots: i64) -> Self {
        Self {
            data: vec![0u8; slots as usize * HASH_SIZE],
        }
    }

    /// Raw byte image of the store, in slot order.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }
}

impl NodeStore for MemoryStore {
    fn slots(&self) -> i64 {
        (self.data.len() / HASH_SIZE) as i64
    }

    fn get(&mut self, slot: i64) -> Result<Hash> {
        if !(0..self.slots()).contains(&slot) {
            return Err(PosError::SlotOutOfBounds {
                slot,
                slots: self.slots(),
            });
        }
        let mut buf = [0u8; HASH_SIZE];
        let at = slot as usize * HASH_SIZE;
        buf.copy_from_slice(&self.data[at..at + HASH_SIZE]);
        Ok(buf)
    }

    fn put(&mut self, slot: i64, label: &Hash) -> Result<()> {
        if !(0..self.slots()).contains(&slot) {
            return Err(PosError::SlotOutOfBounds {
                slot,
                slots: self.slots(),
            });
        }
        let at = slot as usize * HASH_SIZE;
        self.data[at..at + HASH_SIZE].copy_from_slice(label);
        Ok(())
    }
}

/// A labeled Xi graph bound to its Merkle geometry: translates node and
/// heap ids into post-order slots so callers never handle raw offsets.
#[derive(Debug)]
pub struct LabeledGraph<S: NodeStore> {
    store: S,
    geometry: TreeGeometry,
}

impl<S: NodeStore> LabeledGraph<S> {
    /// Binds a store to a geometry, rejecting stores of the wrong size.
    pub fn new(store: S, geometry: TreeGeometry) -> Result<Self> {
        if store.slots() != geometry.slots() {
            return Err(PosError::StoreGeometry {
                got: store.slots(),
                expected: geometry.slots(),
            });
        }
        Ok(Self { store, geometry })
    }

    pub fn geometry(&self) -> &TreeGeometry {
        &self.geometry
    }

    /// Label of DAG node `node`, stored at its Merkle leaf position.
    pub fn get_node(&mut self, node: i64) -> Result<Hash> {
        let slot = self.geometry.bfs_to_post(node + self.geometry.pow2);
        self.store.get(slot)
    }

    pub fn put_node(&mut self, node: i64, label: &Hash) -> Result<()> {
        let slot = self.geometry.bfs_to_post(node + self.geometry.pow2);
        self.store.put(slot, label)
    }

    /// Label at Merkle heap id `m`, leaf or interior.
    pub fn get_heap(&mut self, m: i64) -> Result<Hash> {
        let slot = self.geometry.bfs_to_post(m);
        self.store.get(slot)
    }

    /// Stores an interior Merkle node at heap id `m`.
    pub fn put_internal(&mut self, m: i64, label: &Hash) -> Result<()> {
        debug_assert!(m >= 1 && m < self.geometry.pow2);
        let slot = self.geometry.bfs_to_post(m);
        self.store.put(slot, label)
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn geometry() -> TreeGeometry {
        TreeGeometry::new(2).unwrap()
    }

    #[test]
    fn test_memory_store_roundtrip() {
        let mut store = MemoryStore::new(8);
        let label = [7u8; HASH_SIZE];
        store.put(3, &label).unwrap();
        assert_eq!(store.get(3).unwrap(), label);
        assert_eq!(store.get(2).unwrap(), [0u8; HASH_SIZE]);
        assert!(store.get(8).is_err());
        assert!(store.put(-1, &label).is_err());
    }

    #[test]
    fn test_file_store_create_and_reopen() {
        let path = std::env::temp_dir().join("pospace_store_roundtrip.graph");
        let label = [0xabu8; HASH_SIZE];
        {
            let mut store = FileStore::create(&path, 16).unwrap();
            store.put(5, &label).unwrap();
            store.sync().unwrap();
        }
        let mut reopened = FileStore::open(&path, 16).unwrap();
        assert_eq!(reopened.get(5).unwrap(), label);
        assert_eq!(reopened.get(0).unwrap(), [0u8; HASH_SIZE]);

        assert!(matches!(
            FileStore::open(&path, 32),
            Err(PosError::StoreGeometry { got: 16, .. })
        ));
        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_labeled_graph_rejects_wrong_size() {
        let geom = geometry();
        assert!(LabeledGraph::new(MemoryStore::new(4), geom).is_err());
        assert!(LabeledGraph::new(MemoryStore::new(geom.slots()), geom).is_ok());
    }

    #[test]
    fn test_node_addressing_uses_post_order_slots() {
        let geom = TreeGeometry::new(1).unwrap(); // pow2 = 4
        let mut graph = LabeledGraph::new(MemoryStore::new(geom.slots()), geom).unwrap();
        let label = [0x11u8; HASH_SIZE];
        graph.put_node(0, &label).unwrap();
        // node 0 is heap id 4, which post-order places at slot 1
        assert_eq!(graph.store_mut().get(1).unwrap(), label);
        assert_eq!(graph.get_node(0).unwrap(), label);
        assert_eq!(graph.get_heap(4).unwrap(), label);
    }
}
