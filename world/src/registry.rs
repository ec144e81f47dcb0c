//! Authoritative agent state management utilities.

use std::collections::{BTreeMap, VecDeque};

use glam::Vec2;
use gridswarm_core::{AgentId, AgentSnapshot, CellCoord, OrderTicket};

/// State of a single agent stored inside the world.
#[derive(Clone, Debug)]
pub(crate) struct Agent {
    pub(crate) id: AgentId,
    pub(crate) position: Vec2,
    pub(crate) target: Vec2,
    pub(crate) path: VecDeque<Vec2>,
    pub(crate) selected: bool,
    pub(crate) cell: CellCoord,
    pub(crate) ticket: OrderTicket,
}

impl Agent {
    fn spawned(id: AgentId, position: Vec2, cell: CellCoord) -> Self {
        Self {
            id,
            position,
            target: position,
            path: VecDeque::new(),
            selected: false,
            cell,
            ticket: OrderTicket::default(),
        }
    }

    /// Accepts a new move order, dropping the current path until a new one arrives.
    pub(crate) fn accept_order(&mut self, destination: Vec2) -> OrderTicket {
        self.ticket = self.ticket.next();
        self.target = destination;
        self.path.clear();
        self.ticket
    }

    /// Replaces the whole path in one step. An empty path keeps the order's
    /// destination as the direct-movement target.
    pub(crate) fn install_path(&mut self, path: Vec<Vec2>) {
        self.path = path.into();
        if let Some(head) = self.path.front() {
            self.target = *head;
        }
    }

    /// Pops the head waypoint and retargets the agent onto the next one.
    pub(crate) fn consume_waypoint(&mut self) -> Option<Vec2> {
        let reached = self.path.pop_front()?;
        if let Some(next) = self.path.front() {
            self.target = *next;
        }
        Some(reached)
    }

    pub(crate) fn snapshot(&self) -> AgentSnapshot {
        AgentSnapshot {
            id: self.id,
            position: self.position,
            target: self.target,
            path: self.path.iter().copied().collect(),
            selected: self.selected,
            cell: self.cell,
            ticket: self.ticket,
        }
    }
}

/// Registry that stores agents and manages identifier allocation.
#[derive(Debug)]
pub(crate) struct AgentRegistry {
    entries: BTreeMap<AgentId, Agent>,
    next_agent_id: AgentId,
}

impl AgentRegistry {
    /// Creates an empty agent registry with a reset identifier counter.
    pub(crate) fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
            next_agent_id: AgentId::new(0),
        }
    }

    /// Identifier the next spawned agent will receive.
    pub(crate) fn next_agent_id(&self) -> AgentId {
        self.next_agent_id
    }

    /// Stores a new agent and returns its freshly allocated identifier.
    pub(crate) fn spawn(&mut self, position: Vec2, cell: CellCoord) -> AgentId {
        let id = self.next_agent_id;
        self.next_agent_id = id.next();
        let _ = self.entries.insert(id, Agent::spawned(id, position, cell));
        id
    }

    pub(crate) fn remove(&mut self, id: AgentId) -> Option<Agent> {
        self.entries.remove(&id)
    }

    pub(crate) fn get(&self, id: AgentId) -> Option<&Agent> {
        self.entries.get(&id)
    }

    pub(crate) fn get_mut(&mut self, id: AgentId) -> Option<&mut Agent> {
        self.entries.get_mut(&id)
    }

    /// Agents in ascending identifier order.
    pub(crate) fn iter(&self) -> impl Iterator<Item = &Agent> {
        self.entries.values()
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }
}
