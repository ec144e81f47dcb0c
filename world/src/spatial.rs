//! Cell-bucketed agent membership used for neighbor queries.

use std::collections::HashMap;

use gridswarm_core::{AgentId, CellCoord};

/// Maps grid cells to the agents they currently own.
///
/// Buckets are kept sorted and empty buckets are dropped, so the map only
/// holds occupied cells and query results come back in ascending identifier
/// order.
#[derive(Clone, Debug, Default)]
pub struct SpatialIndex {
    buckets: HashMap<CellCoord, Vec<AgentId>>,
    len: usize,
}

impl SpatialIndex {
    /// Creates an empty index.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records that `agent` is located in `cell`.
    pub fn add_agent(&mut self, cell: CellCoord, agent: AgentId) {
        let bucket = self.buckets.entry(cell).or_default();
        if let Err(position) = bucket.binary_search(&agent) {
            bucket.insert(position, agent);
            self.len += 1;
        }
    }

    /// Removes `agent` from `cell`, returning whether it was present.
    pub fn remove_agent(&mut self, cell: CellCoord, agent: AgentId) -> bool {
        let Some(bucket) = self.buckets.get_mut(&cell) else {
            return false;
        };
        let Ok(position) = bucket.binary_search(&agent) else {
            return false;
        };
        let _ = bucket.remove(position);
        if bucket.is_empty() {
            let _ = self.buckets.remove(&cell);
        }
        self.len -= 1;
        true
    }

    /// Moves `agent` between cells. Staying in the same cell is a no-op.
    pub fn relocate(&mut self, from: CellCoord, to: CellCoord, agent: AgentId) {
        if from == to {
            return;
        }
        let _ = self.remove_agent(from, agent);
        self.add_agent(to, agent);
    }

    /// Agents located in `cell` itself.
    #[must_use]
    pub fn agents_in(&self, cell: CellCoord) -> &[AgentId] {
        self.buckets.get(&cell).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Agents in the 3×3 neighborhood centered on `cell`, inclusive.
    #[must_use]
    pub fn query_neighbors(&self, cell: CellCoord) -> Vec<AgentId> {
        self.query_within(cell, 1)
    }

    /// Agents in the `(2·reach + 1)²` block of cells centered on `cell`.
    #[must_use]
    pub fn query_within(&self, cell: CellCoord, reach: u32) -> Vec<AgentId> {
        let reach = i32::try_from(reach).unwrap_or(i32::MAX);
        let mut found = Vec::new();
        for dy in -reach..=reach {
            for dx in -reach..=reach {
                found.extend_from_slice(self.agents_in(cell.offset(dx, dy)));
            }
        }
        found.sort_unstable();
        found
    }

    /// Drops every entry.
    pub fn clear(&mut self) {
        self.buckets.clear();
        self.len = 0;
    }

    /// Number of indexed agents.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Reports whether no agent is indexed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of cells that currently own at least one agent.
    #[must_use]
    pub fn occupied_cells(&self) -> usize {
        self.buckets.len()
    }
}
