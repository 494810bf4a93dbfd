//! Outcome of a reaction search.

use std::collections::BTreeSet;

use rxn_rules::{ConservationRule, MissingQuantumNumber};
use rxn_topology::StateTransitionGraph;
use serde::{Deserialize, Serialize};

use crate::combinatorics::group_graphs_same_initial_and_final;
use crate::config::Formalism;
use crate::dispatch::BranchReport;

/// Coarse classification of a search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReactionOutcome {
    /// At least one transition was found.
    Solved,
    /// Branches ran and every one of them died.
    Forbidden,
    /// No branch ran, because no regime was left for some node or the
    /// deadline passed first.
    NotAttempted,
}

/// Everything a search produced.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReactionResult {
    /// Allowed transitions.
    pub solutions: Vec<StateTransitionGraph>,
    /// One rule set per dead branch. Only filled when there are no solutions.
    pub violated_rules: BTreeSet<BTreeSet<ConservationRule>>,
    /// Rules skipped for lack of a quantum number.
    pub missing_quantum_numbers: BTreeSet<MissingQuantumNumber>,
    /// Branches that ran.
    pub attempted: usize,
    /// Branches left unstarted by the deadline.
    pub not_attempted: usize,
    /// Basis of the solutions.
    pub formalism: Formalism,
}

impl ReactionResult {
    /// An empty result for the formalism.
    pub fn new(formalism: Formalism) -> Self {
        Self {
            formalism,
            ..Self::default()
        }
    }

    /// Classifies the search.
    pub fn outcome(&self) -> ReactionOutcome {
        if !self.solutions.is_empty() {
            ReactionOutcome::Solved
        } else if self.attempted > 0 {
            ReactionOutcome::Forbidden
        } else {
            ReactionOutcome::NotAttempted
        }
    }

    /// Folds one branch report in.
    pub fn absorb(&mut self, report: BranchReport) {
        match report {
            BranchReport::NotAttempted => self.not_attempted += 1,
            BranchReport::Finished(outcome) => {
                self.attempted += 1;
                self.missing_quantum_numbers
                    .extend(outcome.missing_quantum_numbers);
                if outcome.solutions.is_empty() {
                    if !outcome.violated_rules.is_empty() {
                        self.violated_rules.insert(outcome.violated_rules);
                    }
                } else {
                    self.solutions.extend(outcome.solutions);
                }
            }
        }
    }

    /// Merges another result of the same reaction.
    pub fn merge(&mut self, other: ReactionResult) {
        self.solutions.extend(other.solutions);
        self.violated_rules.extend(other.violated_rules);
        self.missing_quantum_numbers
            .extend(other.missing_quantum_numbers);
        self.attempted += other.attempted;
        self.not_attempted += other.not_attempted;
        if !self.solutions.is_empty() {
            self.violated_rules.clear();
        }
    }

    /// Names of the particles on intermediate lines, over all solutions.
    pub fn intermediate_state_names(&self) -> BTreeSet<String> {
        self.solutions
            .iter()
            .flat_map(|graph| {
                graph
                    .topology()
                    .intermediate_edge_ids()
                    .into_iter()
                    .filter_map(|edge| graph.edge_state(edge).map(|s| s.name().to_string()))
                    .collect::<Vec<_>>()
            })
            .collect()
    }

    /// Solutions partitioned into coherent classes.
    pub fn coherent_groups(&self) -> Vec<Vec<StateTransitionGraph>> {
        group_graphs_same_initial_and_final(&self.solutions)
    }
}
