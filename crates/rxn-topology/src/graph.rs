use std::collections::BTreeMap;
use std::sync::Arc;

use rxn_core::{EdgeId, HalfInteger, NodeId, Parity, QuantumNumberKind, RxnError, Spin, State};
use serde::{Deserialize, Serialize};

use crate::topology::{topology_error, Topology};

/// Quantum numbers attached to an interaction node.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InteractionProperties {
    /// Orbital angular momentum magnitude.
    #[serde(default)]
    pub l_magnitude: Option<HalfInteger>,
    /// Orbital angular momentum projection.
    #[serde(default)]
    pub l_projection: Option<HalfInteger>,
    /// Coupled spin magnitude.
    #[serde(default)]
    pub s_magnitude: Option<HalfInteger>,
    /// Coupled spin projection.
    #[serde(default)]
    pub s_projection: Option<HalfInteger>,
    /// Helicity parity prefactor.
    #[serde(default)]
    pub parity_prefactor: Option<Parity>,
}

impl InteractionProperties {
    /// Returns whether the node defines the quantum number.
    pub fn is_defined(&self, kind: QuantumNumberKind) -> bool {
        match kind {
            QuantumNumberKind::LMagnitude => self.l_magnitude.is_some(),
            QuantumNumberKind::LProjection => self.l_projection.is_some(),
            QuantumNumberKind::SMagnitude => self.s_magnitude.is_some(),
            QuantumNumberKind::SProjection => self.s_projection.is_some(),
            QuantumNumberKind::ParityPrefactor => self.parity_prefactor.is_some(),
            _ => false,
        }
    }

    /// Orbital angular momentum as a spin, when both parts are defined.
    pub fn l(&self) -> Option<Spin> {
        Spin::new(self.l_magnitude?, self.l_projection?).ok()
    }

    /// Coupled spin as a spin, when both parts are defined.
    pub fn s(&self) -> Option<Spin> {
        Spin::new(self.s_magnitude?, self.s_projection?).ok()
    }

    /// Returns a copy with the listed quantum numbers cleared.
    pub fn without(&self, kinds: &[QuantumNumberKind]) -> Self {
        let mut stripped = *self;
        for kind in kinds {
            match kind {
                QuantumNumberKind::LMagnitude => stripped.l_magnitude = None,
                QuantumNumberKind::LProjection => stripped.l_projection = None,
                QuantumNumberKind::SMagnitude => stripped.s_magnitude = None,
                QuantumNumberKind::SProjection => stripped.s_projection = None,
                QuantumNumberKind::ParityPrefactor => stripped.parity_prefactor = None,
                _ => {}
            }
        }
        stripped
    }
}

/// A topology with particle states on its edges and quantum numbers on its
/// nodes. The topology is shared; edits return new graphs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateTransitionGraph {
    topology: Arc<Topology>,
    edge_props: BTreeMap<EdgeId, State>,
    node_props: BTreeMap<NodeId, InteractionProperties>,
}

impl StateTransitionGraph {
    /// Creates a graph. Property keys must refer to edges and nodes of the
    /// topology.
    pub fn new(
        topology: Arc<Topology>,
        edge_props: BTreeMap<EdgeId, State>,
        node_props: BTreeMap<NodeId, InteractionProperties>,
    ) -> Result<Self, RxnError> {
        if let Some(edge) = edge_props
            .keys()
            .find(|edge| !topology.edges().contains_key(edge))
        {
            return Err(
                topology_error("unknown-edge", "edge property on an edge that does not exist")
                    .with_context("edge", edge),
            );
        }
        if let Some(node) = node_props
            .keys()
            .find(|node| !topology.nodes().contains(node))
        {
            return Err(
                topology_error("unknown-node", "node property on a node that does not exist")
                    .with_context("node", node),
            );
        }
        Ok(Self {
            topology,
            edge_props,
            node_props,
        })
    }

    /// Returns the underlying topology.
    pub fn topology(&self) -> &Topology {
        &self.topology
    }

    /// Returns the shared handle to the topology.
    pub fn topology_handle(&self) -> &Arc<Topology> {
        &self.topology
    }

    /// Returns all edge states.
    pub fn edge_props(&self) -> &BTreeMap<EdgeId, State> {
        &self.edge_props
    }

    /// Returns all node quantum numbers.
    pub fn node_props(&self) -> &BTreeMap<NodeId, InteractionProperties> {
        &self.node_props
    }

    /// State on a single edge.
    pub fn edge_state(&self, edge: EdgeId) -> Option<&State> {
        self.edge_props.get(&edge)
    }

    /// Quantum numbers on a single node.
    pub fn node_properties(&self, node: NodeId) -> Option<&InteractionProperties> {
        self.node_props.get(&node)
    }

    /// Returns whether every edge carries a state.
    pub fn is_complete(&self) -> bool {
        self.edge_props.len() == self.topology.edges().len()
    }

    /// Returns a graph in which the two edges trade both connectivity and
    /// states.
    pub fn swap_edges(&self, first: EdgeId, second: EdgeId) -> Result<Self, RxnError> {
        let topology = self.topology.swap_edges(first, second)?;
        let mut edge_props = self.edge_props.clone();
        let first_state = edge_props.remove(&first);
        let second_state = edge_props.remove(&second);
        if let Some(state) = first_state {
            edge_props.insert(second, state);
        }
        if let Some(state) = second_state {
            edge_props.insert(first, state);
        }
        Ok(Self {
            topology: Arc::new(topology),
            edge_props,
            node_props: self.node_props.clone(),
        })
    }

    /// Returns a copy with the listed node quantum numbers cleared.
    pub fn strip_node_quantum_numbers(&self, kinds: &[QuantumNumberKind]) -> Self {
        Self {
            topology: Arc::clone(&self.topology),
            edge_props: self.edge_props.clone(),
            node_props: self
                .node_props
                .iter()
                .map(|(node, props)| (*node, props.without(kinds)))
                .collect(),
        }
    }

    /// Compares two graphs while ignoring the listed quantum numbers.
    ///
    /// Ignoring [`QuantumNumberKind::SpinProjection`] compares edge states by
    /// particle only; node quantum numbers in the list are cleared on both
    /// sides before comparing.
    pub fn eq_ignoring(&self, other: &Self, ignore: &[QuantumNumberKind]) -> bool {
        if self.topology != other.topology {
            return false;
        }
        let ignore_projection = ignore.contains(&QuantumNumberKind::SpinProjection);
        let edges_match = self.edge_props.len() == other.edge_props.len()
            && self
                .edge_props
                .iter()
                .zip(other.edge_props.iter())
                .all(|((id, state), (other_id, other_state))| {
                    id == other_id
                        && if ignore_projection {
                            state.particle() == other_state.particle()
                        } else {
                            state == other_state
                        }
                });
        edges_match
            && self.node_props.len() == other.node_props.len()
            && self
                .node_props
                .iter()
                .zip(other.node_props.iter())
                .all(|((id, props), (other_id, other_props))| {
                    id == other_id && props.without(ignore) == other_props.without(ignore)
                })
    }
}
