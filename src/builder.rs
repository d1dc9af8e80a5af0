//! Iterative Xi-graph labeling.
//!
//! Fills all `num_xi(index)` labels in topological (id) order. The
//! recursive Xi structure is driven by an explicit work stack instead of
//! recursion so the call depth stays bounded for large indices, and the
//! deterministic emission order is identical to the recursive layout.
//!
//! Emission walks the six blocks of each Xi level in id order, so every
//! parent label is already on disk when a node is hashed; each node costs
//! O(1) amortized parent lookups instead of a full `get_parents` descent.

use tracing::{debug, info_span};

use crate::geometry::{num_butterfly, num_xi, TreeGeometry};
use crate::hashing;
use crate::store::{LabeledGraph, NodeStore};
use crate::Result;

/// Where a butterfly's level-0 row takes its parents from.
enum Level0 {
    /// No incoming edges (the outermost index-1 graph)
    Unfed,
    /// Columns `i` and `i + delta` of the enclosing source row
    Sources { base: i64, delta: i64 },
    /// Column `i` of a preceding sink row
    Row { base: i64 },
}

/// One block of pending emission work.
enum Task {
    Xi {
        k: i64,
        base: i64,
        /// Base of the row feeding this block's sources, if nested
        src_parent_base: Option<i64>,
    },
    Butterfly {
        k: i64,
        base: i64,
        level0: Level0,
    },
    SourceRow {
        base: i64,
        width: i64,
        parent_base: Option<i64>,
    },
    SinkRow {
        k: i64,
        base: i64,
    },
}

/// Labels a Xi graph into a store, once. Any IO failure aborts the
/// build; the partially written file is invalid and must be discarded
/// by the caller.
pub struct GraphBuilder<'a, S: NodeStore> {
    pk: &'a [u8],
    graph: &'a mut LabeledGraph<S>,
    next_id: i64,
}

impl<'a, S: NodeStore> GraphBuilder<'a, S> {
    pub fn new(pk: &'a [u8], graph: &'a mut LabeledGraph<S>) -> Self {
        Self {
            pk,
            graph,
            next_id: 0,
        }
    }

    /// Fills every label of the graph described by the bound geometry.
    pub fn build(mut self) -> Result<()> {
        let TreeGeometry { index, size, .. } = *self.graph.geometry();
        let _span = info_span!("build_graph", index, size).entered();

        let mut stack = vec![Task::Xi {
            k: index,
            base: 0,
            src_parent_base: None,
        }];

        while let Some(task) = stack.pop() {
            match task {
                Task::Xi {
                    k,
                    base,
                    src_parent_base,
                } => Self::expand_xi(&mut stack, k, base, src_parent_base),
                Task::Butterfly { k, base, level0 } => self.emit_butterfly(k, base, &level0)?,
                Task::SourceRow {
                    base,
                    width,
                    parent_base,
                } => self.emit_source_row(base, width, parent_base)?,
                Task::SinkRow { k, base } => self.emit_sink_row(k, base)?,
            }
        }

        debug_assert_eq!(self.next_id, size);
        debug!(nodes = self.next_id, "graph labeling complete");
        Ok(())
    }

    /// Pushes one Xi level's blocks onto the stack in reverse, so they
    /// pop in id order.
    fn expand_xi(stack: &mut Vec<Task>, k: i64, base: i64, src_parent_base: Option<i64>) {
        if k == 1 {
            stack.push(Task::Butterfly {
                k: 1,
                base,
                level0: match src_parent_base {
                    Some(pb) => Level0::Row { base: pb },
                    None => Level0::Unfed,
                },
            });
            return;
        }

        let delta = 1i64 << (k - 1);
        let sources = 1i64 << k;
        let nb = num_butterfly(k - 1);
        let nx = num_xi(k - 1);
        let first_butter = base + sources;
        let first_xi = first_butter + nb;
        let second_xi = first_xi + nx;
        let second_butter = second_xi + nx;

        let first_butter_sinks = first_butter + (2 * (k - 1) - 1) * delta;
        let first_xi_sinks = first_xi + nx - delta;
        let second_xi_sinks = second_xi + nx - delta;

        stack.push(Task::SinkRow { k, base });
        stack.push(Task::Butterfly {
            k: k - 1,
            base: second_butter,
            level0: Level0::Row {
                base: second_xi_sinks,
            },
        });
        stack.push(Task::Xi {
            k: k - 1,
            base: second_xi,
            src_parent_base: Some(first_xi_sinks),
        });
        stack.push(Task::Xi {
            k: k - 1,
            base: first_xi,
            src_parent_base: Some(first_butter_sinks),
        });
        stack.push(Task::Butterfly {
            k: k - 1,
            base: first_butter,
            level0: Level0::Sources { base, delta },
        });
        stack.push(Task::SourceRow {
            base,
            width: sources,
            parent_base: src_parent_base,
        });
    }

    fn emit_butterfly(&mut self, k: i64, base: i64, level0: &Level0) -> Result<()> {
        let width = 1i64 << k;
        for level in 0..2 * k {
            for col in 0..width {
                let id = base + level * width + col;
                if level == 0 {
                    match *level0 {
                        Level0::Unfed => self.emit(id, &[])?,
                        Level0::Sources { base, delta } => {
                            self.emit(id, &[base + col, base + col + delta])?
                        }
                        Level0::Row { base } => self.emit(id, &[base + col])?,
                    }
                } else {
                    let shift = if level <= k { k - level } else { level - k };
                    let prev = col ^ (1i64 << shift);
                    let row = base + (level - 1) * width;
                    self.emit(id, &[row + prev, row + col])?;
                }
            }
        }
        Ok(())
    }

    fn emit_source_row(&mut self, base: i64, width: i64, parent_base: Option<i64>) -> Result<()> {
        for i in 0..width {
            match parent_base {
                Some(pb) => self.emit(base + i, &[pb + i])?,
                None => self.emit(base + i, &[])?,
            }
        }
        Ok(())
    }

    fn emit_sink_row(&mut self, k: i64, base: i64) -> Result<()> {
        let delta = 1i64 << (k - 1);
        let sources = 1i64 << k;
        let nb = num_butterfly(k - 1);
        let nx = num_xi(k - 1);
        let second_butter = base + sources + nb + 2 * nx;
        let butter_sinks = second_butter + (2 * (k - 1) - 1) * delta;
        let sink_base = second_butter + nb;

        for i in 0..sources {
            self.emit(sink_base + i, &[butter_sinks + i % delta, base + i])?;
        }
        Ok(())
    }

    /// Hashes and persists one node from its already-labeled parents.
    fn emit(&mut self, id: i64, parents: &[i64]) -> Result<()> {
        debug_assert_eq!(id, self.next_id, "emission left id order");
        let mut parent_labels = Vec::with_capacity(parents.len());
        for &p in parents {
            debug_assert!(p < id);
            parent_labels.push(self.graph.get_node(p)?);
        }
        let heap_id = id + self.graph.geometry().pow2;
        let label = hashing::node_label(self.pk, heap_id, &parent_labels);
        self.graph.put_node(id, &label)?;
        self.next_id += 1;
        Ok(())
    }
}
