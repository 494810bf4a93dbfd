#![deny(missing_docs)]

//! Conservation rules for reaction interaction nodes.
//!
//! Every rule is a pure function of the ingoing and outgoing edge states of
//! one node plus the node's own quantum numbers. Rules that need a quantum
//! number the inputs do not define report it instead of guessing.

mod additive;
pub mod coupling;
mod mass;
mod parity;
mod rule;
mod spin;

pub use rule::{
    AdditiveQuantumNumber, ConservationRule, MissingQuantumNumber, NodeInput, RuleOutcome,
    RuleParameters,
};
