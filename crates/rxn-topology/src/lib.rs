#![deny(missing_docs)]

//! Reaction topologies, the builders that enumerate them, and state
//! transition graphs that attach particle states to a topology.

mod builder;
mod canonical;
mod graph;
mod node;
mod topology;

pub use builder::{create_isobar_topologies, create_n_body_topology, SimpleTopologyBuilder};
pub use canonical::{are_isomorphic, canonical_form, canonical_hash, CanonicalTopology};
pub use graph::{InteractionProperties, StateTransitionGraph};
pub use node::InteractionNode;
pub use topology::{Edge, Topology, TopologyDraft};
