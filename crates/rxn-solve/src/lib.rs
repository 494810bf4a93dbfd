#![deny(missing_docs)]

//! Finds every allowed state transition graph for a reaction.
//!
//! The pipeline builds topologies, assigns the external states to their
//! boundary edges, and searches the intermediate lines for particle states
//! that pass the conservation rules of each node's interaction regime.
//! Branches are independent and run on a fixed-size rayon pool.

pub mod combinatorics;
pub mod config;
pub mod dispatch;
pub mod initialize;
pub mod manager;
pub mod nbody;
pub mod result;
pub mod settings;
pub mod solver;

pub use combinatorics::{
    group_graphs_same_initial_and_final, match_external_edges,
    perform_external_edge_identical_particle_combinatorics,
};
pub use config::{
    FinalStateGrouping, Formalism, ReactionSpec, SolverConfig, SolvingMode, StateDefinition,
    TopologyBuilding,
};
pub use dispatch::{BranchReport, DispatchOptions};
pub use manager::{generate_transitions, StateTransitionManager};
pub use nbody::{check_reaction_violations, NBodyCheckOptions};
pub use result::{ReactionOutcome, ReactionResult};
pub use settings::{InteractionSettings, InteractionType};
pub use solver::{Branch, BranchOutcome};
