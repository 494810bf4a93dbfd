use std::collections::{BTreeMap, BTreeSet, VecDeque};

use rxn_core::{EdgeId, ErrorInfo, NodeId, RxnError};
use serde::{Deserialize, Serialize};

pub(crate) fn topology_error(code: impl Into<String>, message: impl Into<String>) -> RxnError {
    RxnError::Topology(ErrorInfo::new(code, message))
}

/// Connectivity of a single edge. A missing originating node marks an
/// initial-state leg, a missing ending node a final-state leg.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Edge {
    /// Node the edge leaves from.
    pub originating_node: Option<NodeId>,
    /// Node the edge flows into.
    pub ending_node: Option<NodeId>,
}

impl Edge {
    /// Creates an edge between the given endpoints.
    pub fn new(originating_node: Option<NodeId>, ending_node: Option<NodeId>) -> Self {
        Self {
            originating_node,
            ending_node,
        }
    }

    /// Returns whether the edge is an initial-state leg.
    pub fn is_initial_state(&self) -> bool {
        self.originating_node.is_none() && self.ending_node.is_some()
    }

    /// Returns whether the edge is a final-state leg.
    pub fn is_final_state(&self) -> bool {
        self.ending_node.is_none() && self.originating_node.is_some()
    }

    /// Returns whether the edge connects two nodes.
    pub fn is_intermediate(&self) -> bool {
        self.originating_node.is_some() && self.ending_node.is_some()
    }
}

/// Immutable directed graph of interaction nodes and particle lines.
///
/// Every node has at least one ingoing and one outgoing edge, the graph is
/// connected and acyclic. Structural changes such as [`Topology::swap_edges`]
/// return a new topology.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "TopologyDraft")]
pub struct Topology {
    nodes: BTreeSet<NodeId>,
    edges: BTreeMap<EdgeId, Edge>,
}

impl Topology {
    /// Creates a topology from its nodes and edges after validating the
    /// structural invariants.
    pub fn new(nodes: BTreeSet<NodeId>, edges: BTreeMap<EdgeId, Edge>) -> Result<Self, RxnError> {
        let topology = Self { nodes, edges };
        topology.validate()?;
        Ok(topology)
    }

    fn validate(&self) -> Result<(), RxnError> {
        for (id, edge) in &self.edges {
            if edge.originating_node.is_none() && edge.ending_node.is_none() {
                return Err(
                    topology_error("dangling-edge", "edge is attached to no node")
                        .with_context("edge", id),
                );
            }
            for node in edge.originating_node.iter().chain(edge.ending_node.iter()) {
                if !self.nodes.contains(node) {
                    return Err(
                        topology_error("unknown-node", "edge references a missing node")
                            .with_context("edge", id)
                            .with_context("node", node),
                    );
                }
            }
        }
        for node in &self.nodes {
            if self.edges_ingoing_to(*node).is_empty() || self.edges_outgoing_from(*node).is_empty()
            {
                return Err(topology_error(
                    "node-degree",
                    "every node needs at least one ingoing and one outgoing edge",
                )
                .with_context("node", node));
            }
        }
        if self.node_order().len() != self.nodes.len() {
            return Err(topology_error("cyclic-topology", "topology contains a cycle"));
        }
        if !self.is_connected() {
            return Err(topology_error(
                "disconnected-topology",
                "topology splits into several components",
            ));
        }
        Ok(())
    }

    fn is_connected(&self) -> bool {
        let Some(start) = self.nodes.iter().next().copied() else {
            return true;
        };
        let mut seen = BTreeSet::from([start]);
        let mut queue = VecDeque::from([start]);
        while let Some(node) = queue.pop_front() {
            for edge in self.edges.values() {
                let neighbour = match (edge.originating_node, edge.ending_node) {
                    (Some(from), Some(to)) if from == node => to,
                    (Some(from), Some(to)) if to == node => from,
                    _ => continue,
                };
                if seen.insert(neighbour) {
                    queue.push_back(neighbour);
                }
            }
        }
        seen.len() == self.nodes.len()
    }

    /// Returns the node identifiers.
    pub fn nodes(&self) -> &BTreeSet<NodeId> {
        &self.nodes
    }

    /// Returns the edges keyed by identifier.
    pub fn edges(&self) -> &BTreeMap<EdgeId, Edge> {
        &self.edges
    }

    /// Looks up a single edge.
    pub fn edge(&self, id: EdgeId) -> Result<&Edge, RxnError> {
        self.edges.get(&id).ok_or_else(|| {
            topology_error("unknown-edge", "edge is not part of the topology").with_context("edge", id)
        })
    }

    /// Initial-state edge identifiers, ascending.
    pub fn initial_state_edge_ids(&self) -> Vec<EdgeId> {
        self.edge_ids_where(Edge::is_initial_state)
    }

    /// Final-state edge identifiers, ascending.
    pub fn final_state_edge_ids(&self) -> Vec<EdgeId> {
        self.edge_ids_where(Edge::is_final_state)
    }

    /// Intermediate edge identifiers, ascending.
    pub fn intermediate_edge_ids(&self) -> Vec<EdgeId> {
        self.edge_ids_where(Edge::is_intermediate)
    }

    fn edge_ids_where(&self, predicate: impl Fn(&Edge) -> bool) -> Vec<EdgeId> {
        self.edges
            .iter()
            .filter(|(_, edge)| predicate(edge))
            .map(|(id, _)| *id)
            .collect()
    }

    /// Edges flowing into the node, ascending.
    pub fn edges_ingoing_to(&self, node: NodeId) -> Vec<EdgeId> {
        self.edge_ids_where(|edge| edge.ending_node == Some(node))
    }

    /// Edges leaving the node, ascending.
    pub fn edges_outgoing_from(&self, node: NodeId) -> Vec<EdgeId> {
        self.edge_ids_where(|edge| edge.originating_node == Some(node))
    }

    /// Final-state edges reachable downstream from the node.
    pub fn originating_final_state_edges(&self, node: NodeId) -> Vec<EdgeId> {
        let mut found = BTreeSet::new();
        let mut queue = VecDeque::from([node]);
        let mut visited = BTreeSet::new();
        while let Some(current) = queue.pop_front() {
            if !visited.insert(current) {
                continue;
            }
            for edge_id in self.edges_outgoing_from(current) {
                match self.edges[&edge_id].ending_node {
                    Some(next) => queue.push_back(next),
                    None => {
                        found.insert(edge_id);
                    }
                }
            }
        }
        found.into_iter().collect()
    }

    /// Initial-state edges reachable upstream from the node.
    pub fn originating_initial_state_edges(&self, node: NodeId) -> Vec<EdgeId> {
        let mut found = BTreeSet::new();
        let mut queue = VecDeque::from([node]);
        let mut visited = BTreeSet::new();
        while let Some(current) = queue.pop_front() {
            if !visited.insert(current) {
                continue;
            }
            for edge_id in self.edges_ingoing_to(current) {
                match self.edges[&edge_id].originating_node {
                    Some(previous) => queue.push_back(previous),
                    None => {
                        found.insert(edge_id);
                    }
                }
            }
        }
        found.into_iter().collect()
    }

    /// Final-state edges below an edge: the edge itself when it is a final
    /// leg, otherwise those below its ending node.
    pub fn final_state_edges_below(&self, edge: EdgeId) -> Result<Vec<EdgeId>, RxnError> {
        Ok(match self.edge(edge)?.ending_node {
            Some(node) => self.originating_final_state_edges(node),
            None => vec![edge],
        })
    }

    /// Returns whether everything downstream of `edge` is fed by `edge`
    /// alone, i.e. no other line enters the region below it.
    pub fn is_closed_below(&self, edge: EdgeId) -> Result<bool, RxnError> {
        let Some(start) = self.edge(edge)?.ending_node else {
            return Ok(true);
        };
        let mut region_edges = BTreeSet::from([edge]);
        let mut region_nodes = BTreeSet::new();
        let mut queue = VecDeque::from([start]);
        while let Some(node) = queue.pop_front() {
            if !region_nodes.insert(node) {
                continue;
            }
            for outgoing in self.edges_outgoing_from(node) {
                region_edges.insert(outgoing);
                if let Some(next) = self.edges[&outgoing].ending_node {
                    queue.push_back(next);
                }
            }
        }
        Ok(region_nodes.iter().all(|node| {
            self.edges_ingoing_to(*node)
                .iter()
                .all(|ingoing| region_edges.contains(ingoing))
        }))
    }

    /// Nodes in topological order (initial state first). Ties are broken by
    /// node identifier so the order is stable.
    pub fn node_order(&self) -> Vec<NodeId> {
        let mut pending: BTreeMap<NodeId, usize> = self
            .nodes
            .iter()
            .map(|node| {
                let internal_inputs = self
                    .edges_ingoing_to(*node)
                    .iter()
                    .filter(|edge| self.edges[*edge].originating_node.is_some())
                    .count();
                (*node, internal_inputs)
            })
            .collect();
        let mut ready: BTreeSet<NodeId> = pending
            .iter()
            .filter(|(_, count)| **count == 0)
            .map(|(node, _)| *node)
            .collect();
        let mut order = Vec::with_capacity(self.nodes.len());
        while let Some(node) = ready.pop_first() {
            pending.remove(&node);
            order.push(node);
            for edge_id in self.edges_outgoing_from(node) {
                if let Some(next) = self.edges[&edge_id].ending_node {
                    if let Some(count) = pending.get_mut(&next) {
                        *count -= 1;
                        if *count == 0 {
                            ready.insert(next);
                        }
                    }
                }
            }
        }
        order
    }

    /// Returns a topology in which the two edges trade places.
    pub fn swap_edges(&self, first: EdgeId, second: EdgeId) -> Result<Topology, RxnError> {
        let first_edge = *self.edge(first)?;
        let second_edge = *self.edge(second)?;
        let mut edges = self.edges.clone();
        edges.insert(first, second_edge);
        edges.insert(second, first_edge);
        Ok(Topology {
            nodes: self.nodes.clone(),
            edges,
        })
    }

    /// Returns a topology whose edges are renamed through `mapping`
    /// (old id to new id). Unmapped edges keep their id.
    pub fn relabel_edges(&self, mapping: &BTreeMap<EdgeId, EdgeId>) -> Result<Topology, RxnError> {
        let mut edges = BTreeMap::new();
        for (id, edge) in &self.edges {
            let new_id = mapping.get(id).copied().unwrap_or(*id);
            if edges.insert(new_id, *edge).is_some() {
                return Err(
                    topology_error("duplicate-edge", "relabeling maps two edges onto one id")
                        .with_context("edge", new_id),
                );
            }
        }
        Ok(Topology {
            nodes: self.nodes.clone(),
            edges,
        })
    }
}

/// Mutable builder for a [`Topology`]. Structural mistakes are reported as
/// they happen; [`TopologyDraft::freeze`] checks the global invariants.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TopologyDraft {
    nodes: BTreeSet<NodeId>,
    edges: BTreeMap<EdgeId, Edge>,
}

impl TopologyDraft {
    /// Creates an empty draft.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a node.
    pub fn add_node(&mut self, node: NodeId) -> Result<(), RxnError> {
        if !self.nodes.insert(node) {
            return Err(topology_error("duplicate-node", "node id already present")
                .with_context("node", node));
        }
        Ok(())
    }

    /// Adds unattached edges.
    pub fn add_edges(&mut self, edges: &[EdgeId]) -> Result<(), RxnError> {
        for edge in edges {
            if self.edges.contains_key(edge) {
                return Err(topology_error("duplicate-edge", "edge id already present")
                    .with_context("edge", edge));
            }
        }
        for edge in edges {
            self.edges.insert(*edge, Edge::default());
        }
        Ok(())
    }

    /// Makes the edges flow into `node`.
    pub fn attach_edges_to_node_ingoing(
        &mut self,
        edges: &[EdgeId],
        node: NodeId,
    ) -> Result<(), RxnError> {
        self.attach(edges, node, |edge| &mut edge.ending_node)
    }

    /// Makes the edges leave from `node`.
    pub fn attach_edges_to_node_outgoing(
        &mut self,
        edges: &[EdgeId],
        node: NodeId,
    ) -> Result<(), RxnError> {
        self.attach(edges, node, |edge| &mut edge.originating_node)
    }

    fn attach(
        &mut self,
        edges: &[EdgeId],
        node: NodeId,
        slot: impl Fn(&mut Edge) -> &mut Option<NodeId>,
    ) -> Result<(), RxnError> {
        if !self.nodes.contains(&node) {
            return Err(topology_error("unknown-node", "node is not part of the draft")
                .with_context("node", node));
        }
        for id in edges {
            let edge = self.edges.get_mut(id).ok_or_else(|| {
                topology_error("unknown-edge", "edge is not part of the draft").with_context("edge", id)
            })?;
            if slot(edge).is_some() {
                return Err(
                    topology_error("edge-already-attached", "edge end is already connected")
                        .with_context("edge", id)
                        .with_context("node", node),
                );
            }
        }
        for id in edges {
            if let Some(edge) = self.edges.get_mut(id) {
                *slot(edge) = Some(node);
            }
        }
        Ok(())
    }

    /// Returns the smallest node id not yet in use.
    pub fn next_node_id(&self) -> NodeId {
        self.nodes
            .last()
            .map_or(NodeId::from_raw(0), |node| NodeId::from_raw(node.as_raw() + 1))
    }

    /// Returns the smallest edge id not yet in use.
    pub fn next_edge_id(&self) -> EdgeId {
        self.edges
            .keys()
            .last()
            .map_or(EdgeId::from_raw(0), |edge| EdgeId::from_raw(edge.as_raw() + 1))
    }

    /// Edges whose ending node is still open.
    pub fn open_edges(&self) -> Vec<EdgeId> {
        self.edges
            .iter()
            .filter(|(_, edge)| edge.ending_node.is_none())
            .map(|(id, _)| *id)
            .collect()
    }

    /// Validates the draft and turns it into an immutable topology.
    pub fn freeze(self) -> Result<Topology, RxnError> {
        Topology::new(self.nodes, self.edges)
    }
}

impl TryFrom<TopologyDraft> for Topology {
    type Error = RxnError;

    fn try_from(draft: TopologyDraft) -> Result<Self, Self::Error> {
        draft.freeze()
    }
}

impl From<&Topology> for TopologyDraft {
    fn from(topology: &Topology) -> Self {
        Self {
            nodes: topology.nodes.clone(),
            edges: topology.edges.clone(),
        }
    }
}
