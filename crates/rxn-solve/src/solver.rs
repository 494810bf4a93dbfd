//! Backtracking search over the intermediate lines of one branch.
//!
//! A branch fixes the topology, the external states and the interaction
//! regime of every node. The search assigns intermediate edges one at a
//! time and evaluates a node as soon as all of its edges carry a state, so
//! that dead partial assignments are cut before their siblings are built.
//! Assignments live in a sparse overlay on top of the external states.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use itertools::Itertools;
use rxn_core::{EdgeId, ErrorInfo, NodeId, ParticleCollection, RxnError, Spin, State};
use rxn_rules::{
    AdditiveQuantumNumber, ConservationRule, MissingQuantumNumber, NodeInput, RuleOutcome,
    RuleParameters,
};
use rxn_topology::{InteractionProperties, StateTransitionGraph, Topology};
use serde::{Deserialize, Serialize};

use crate::settings::{InteractionSettings, InteractionType};

/// One unit of search work.
#[derive(Debug, Clone, PartialEq)]
pub struct Branch {
    /// Graph with the external edges assigned.
    pub graph: StateTransitionGraph,
    /// Regime of every node.
    pub node_regimes: BTreeMap<NodeId, InteractionType>,
}

impl Branch {
    /// Product of the node strengths.
    pub fn strength(&self, settings: &BTreeMap<InteractionType, InteractionSettings>) -> f64 {
        self.node_regimes
            .values()
            .map(|regime| settings.get(regime).map_or(0.0, |s| s.strength))
            .product()
    }
}

/// What a finished branch produced.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BranchOutcome {
    /// Complete graphs that pass every rule.
    pub solutions: Vec<StateTransitionGraph>,
    /// Rules that killed the branch; empty when it has solutions.
    pub violated_rules: BTreeSet<ConservationRule>,
    /// Rules skipped somewhere in the branch.
    pub missing_quantum_numbers: BTreeSet<MissingQuantumNumber>,
}

#[derive(Default)]
struct Ledger {
    failed: BTreeSet<ConservationRule>,
    passed: BTreeSet<ConservationRule>,
    missing: BTreeSet<MissingQuantumNumber>,
}

impl Ledger {
    /// Records the outcome and returns whether the rule did not fail.
    fn record(&mut self, rule: ConservationRule, outcome: RuleOutcome) -> bool {
        match outcome {
            RuleOutcome::Passed => {
                self.passed.insert(rule);
                true
            }
            RuleOutcome::Violated => {
                self.failed.insert(rule);
                false
            }
            RuleOutcome::Skipped(missing) => {
                self.missing.insert(missing);
                true
            }
        }
    }

    /// Rules that failed and never passed, or every failed rule when each
    /// of them passed somewhere.
    fn violated(&self) -> BTreeSet<ConservationRule> {
        let never_passed: BTreeSet<ConservationRule> =
            self.failed.difference(&self.passed).copied().collect();
        if never_passed.is_empty() {
            self.failed.clone()
        } else {
            never_passed
        }
    }
}

type NodeChoices = BTreeMap<NodeId, Vec<InteractionProperties>>;

/// Solves branches against a fixed candidate catalog and regime table.
#[derive(Debug, Clone)]
pub struct GraphSolver<'a> {
    settings: &'a BTreeMap<InteractionType, InteractionSettings>,
    candidates: &'a ParticleCollection,
    parameters: RuleParameters,
}

impl<'a> GraphSolver<'a> {
    /// Creates a solver. `candidates` is the catalog intermediate lines are
    /// drawn from.
    pub fn new(
        settings: &'a BTreeMap<InteractionType, InteractionSettings>,
        candidates: &'a ParticleCollection,
        parameters: RuleParameters,
    ) -> Self {
        Self {
            settings,
            candidates,
            parameters,
        }
    }

    fn settings_for(&self, regime: InteractionType) -> Result<&'a InteractionSettings, RxnError> {
        self.settings.get(&regime).ok_or_else(|| {
            RxnError::Config(
                ErrorInfo::new("missing-interaction-settings", "no settings for regime")
                    .with_context("regime", regime),
            )
        })
    }

    /// Runs the search for one branch to completion.
    pub fn solve(&self, branch: &Branch) -> Result<BranchOutcome, RxnError> {
        let topology = branch.graph.topology();
        let mut node_settings = BTreeMap::new();
        for node in topology.nodes() {
            let regime = branch.node_regimes.get(node).copied().ok_or_else(|| {
                RxnError::Config(
                    ErrorInfo::new("missing-node-regime", "node has no regime")
                        .with_context("node", node),
                )
            })?;
            node_settings.insert(*node, self.settings_for(regime)?);
        }

        let conserved: Vec<AdditiveQuantumNumber> = AdditiveQuantumNumber::ALL
            .into_iter()
            .filter(|number| {
                node_settings
                    .values()
                    .all(|settings| settings.enforces(ConservationRule::Additive(*number)))
            })
            .collect();

        let edge_order = intermediate_edge_order(topology);
        let mut edge_candidates = BTreeMap::new();
        for edge in &edge_order {
            let candidates =
                self.edge_candidates(topology, *edge, &branch.graph, &node_settings, &conserved)?;
            edge_candidates.insert(*edge, candidates);
        }

        let search = Search {
            topology,
            external: branch.graph.edge_props(),
            node_settings: &node_settings,
            node_domains: node_settings
                .iter()
                .map(|(node, settings)| (*node, settings.node_domain.combinations()))
                .collect(),
            completes_at: completion_schedule(
                topology,
                &edge_order,
                &branch.graph.edge_props().keys().copied().collect(),
            ),
            edge_order,
            edge_candidates,
            parameters: &self.parameters,
        };

        let mut ledger = Ledger::default();
        let mut found = Vec::new();
        let mut assigned = BTreeMap::new();
        let mut choices = NodeChoices::new();
        if search.complete_nodes(0, &assigned, &mut choices, &mut ledger) {
            search.descend(0, &mut assigned, &mut choices, &mut ledger, &mut found);
        }

        let mut solutions = Vec::new();
        for (assigned, choices) in found {
            let mut edge_props = branch.graph.edge_props().clone();
            edge_props.extend(assigned);
            for combination in choices
                .iter()
                .map(|(node, options)| options.iter().map(move |props| (*node, *props)))
                .multi_cartesian_product()
            {
                solutions.push(StateTransitionGraph::new(
                    branch.graph.topology_handle().clone(),
                    edge_props.clone(),
                    combination.into_iter().collect(),
                )?);
            }
        }

        let violated_rules = if solutions.is_empty() {
            ledger.violated()
        } else {
            BTreeSet::new()
        };
        tracing::debug!(
            solutions = solutions.len(),
            violated = violated_rules.len(),
            skipped = ledger.missing.len(),
            "branch finished"
        );
        Ok(BranchOutcome {
            solutions,
            violated_rules,
            missing_quantum_numbers: ledger.missing,
        })
    }

    /// Candidate states for an intermediate edge: catalog particles inside
    /// an adjacent node's edge domain, expanded over all projections. When
    /// nothing else feeds the region below the edge, additive numbers that
    /// every node conserves must match the final states below it.
    fn edge_candidates(
        &self,
        topology: &Topology,
        edge: EdgeId,
        graph: &StateTransitionGraph,
        node_settings: &BTreeMap<NodeId, &InteractionSettings>,
        conserved: &[AdditiveQuantumNumber],
    ) -> Result<Vec<State>, RxnError> {
        let line = topology.edge(edge)?;
        let domains: Vec<&InteractionSettings> = [line.originating_node, line.ending_node]
            .into_iter()
            .flatten()
            .filter_map(|node| node_settings.get(&node).copied())
            .collect();

        let targets: Vec<(AdditiveQuantumNumber, i32)> = if topology.is_closed_below(edge)? {
            let below = topology.final_state_edges_below(edge)?;
            conserved
                .iter()
                .map(|number| {
                    let total = below
                        .iter()
                        .filter_map(|id| graph.edge_state(*id))
                        .map(|state| number.value_of(state))
                        .sum();
                    (*number, total)
                })
                .collect()
        } else {
            Vec::new()
        };

        let mut states = Vec::new();
        for particle in self.candidates.iter() {
            if !domains
                .iter()
                .any(|settings| settings.edge_domain.admits(particle))
            {
                continue;
            }
            if !targets
                .iter()
                .all(|(number, total)| number.value_for(particle) == *total)
            {
                continue;
            }
            for projection in Spin::projections(particle.spin) {
                states.push(State::new(Arc::clone(particle), projection)?);
            }
        }
        tracing::debug!(edge = %edge, candidates = states.len(), "intermediate candidates");
        Ok(states)
    }
}

/// Intermediate edges, bottom of the tree first.
fn intermediate_edge_order(topology: &Topology) -> Vec<EdgeId> {
    let mut order = Vec::new();
    for node in topology.node_order().into_iter().rev() {
        let incident = topology
            .edges_ingoing_to(node)
            .into_iter()
            .chain(topology.edges_outgoing_from(node));
        for edge in incident {
            let is_intermediate = topology
                .edges()
                .get(&edge)
                .map_or(false, |line| line.is_intermediate());
            if is_intermediate && !order.contains(&edge) {
                order.push(edge);
            }
        }
    }
    order
}

/// `schedule[0]` holds the nodes that are complete before any intermediate
/// edge is assigned; `schedule[i + 1]` those completed by `edge_order[i]`.
fn completion_schedule(
    topology: &Topology,
    edge_order: &[EdgeId],
    external: &BTreeSet<EdgeId>,
) -> Vec<Vec<NodeId>> {
    let incident = |node: NodeId| -> Vec<EdgeId> {
        topology
            .edges_ingoing_to(node)
            .into_iter()
            .chain(topology.edges_outgoing_from(node))
            .collect()
    };
    let mut known = external.clone();
    let mut done: BTreeSet<NodeId> = BTreeSet::new();
    let mut schedule = Vec::with_capacity(edge_order.len() + 1);
    let newly_complete = |known: &BTreeSet<EdgeId>, done: &mut BTreeSet<NodeId>| {
        let nodes: Vec<NodeId> = topology
            .nodes()
            .iter()
            .copied()
            .filter(|node| !done.contains(node))
            .filter(|node| incident(*node).iter().all(|edge| known.contains(edge)))
            .collect();
        done.extend(nodes.iter().copied());
        nodes
    };
    schedule.push(newly_complete(&known, &mut done));
    for edge in edge_order {
        known.insert(*edge);
        schedule.push(newly_complete(&known, &mut done));
    }
    schedule
}

struct Search<'s> {
    topology: &'s Topology,
    external: &'s BTreeMap<EdgeId, State>,
    node_settings: &'s BTreeMap<NodeId, &'s InteractionSettings>,
    node_domains: BTreeMap<NodeId, Vec<InteractionProperties>>,
    completes_at: Vec<Vec<NodeId>>,
    edge_order: Vec<EdgeId>,
    edge_candidates: BTreeMap<EdgeId, Vec<State>>,
    parameters: &'s RuleParameters,
}

type Found = Vec<(BTreeMap<EdgeId, State>, NodeChoices)>;

impl Search<'_> {
    fn descend(
        &self,
        depth: usize,
        assigned: &mut BTreeMap<EdgeId, State>,
        choices: &mut NodeChoices,
        ledger: &mut Ledger,
        found: &mut Found,
    ) {
        let Some(edge) = self.edge_order.get(depth).copied() else {
            found.push((assigned.clone(), choices.clone()));
            return;
        };
        let Some(candidates) = self.edge_candidates.get(&edge) else {
            return;
        };
        for candidate in candidates {
            assigned.insert(edge, candidate.clone());
            if self.complete_nodes(depth + 1, assigned, choices, ledger) {
                self.descend(depth + 1, assigned, choices, ledger, found);
            }
            if let Some(nodes) = self.completes_at.get(depth + 1) {
                for node in nodes {
                    choices.remove(node);
                }
            }
            assigned.remove(&edge);
        }
    }

    /// Evaluates the nodes completed at `step`, storing the node quantum
    /// numbers that pass. Returns false as soon as one node has none.
    fn complete_nodes(
        &self,
        step: usize,
        assigned: &BTreeMap<EdgeId, State>,
        choices: &mut NodeChoices,
        ledger: &mut Ledger,
    ) -> bool {
        let Some(nodes) = self.completes_at.get(step) else {
            return true;
        };
        for node in nodes {
            match self.evaluate_node(*node, assigned, ledger) {
                Some(passing) => {
                    choices.insert(*node, passing);
                }
                None => return false,
            }
        }
        true
    }

    fn state_on<'b>(
        &'b self,
        edge: &EdgeId,
        assigned: &'b BTreeMap<EdgeId, State>,
    ) -> Option<&'b State> {
        assigned.get(edge).or_else(|| self.external.get(edge))
    }

    fn evaluate_node(
        &self,
        node: NodeId,
        assigned: &BTreeMap<EdgeId, State>,
        ledger: &mut Ledger,
    ) -> Option<Vec<InteractionProperties>> {
        let settings = self.node_settings.get(&node)?;
        let ingoing: Vec<&State> = self
            .topology
            .edges_ingoing_to(node)
            .iter()
            .map(|edge| self.state_on(edge, assigned))
            .collect::<Option<_>>()?;
        let outgoing: Vec<&State> = self
            .topology
            .edges_outgoing_from(node)
            .iter()
            .map(|edge| self.state_on(edge, assigned))
            .collect::<Option<_>>()?;

        let (node_rules, edge_rules): (Vec<ConservationRule>, Vec<ConservationRule>) = settings
            .conservation_rules
            .iter()
            .partition(|rule| rule.reads_interaction_properties());

        let undefined = InteractionProperties::default();
        let input = NodeInput {
            ingoing: &ingoing,
            outgoing: &outgoing,
            interaction: &undefined,
        };
        let mut edges_pass = true;
        for rule in &edge_rules {
            edges_pass &= ledger.record(*rule, rule.check(&input, self.parameters));
        }
        if !edges_pass {
            return None;
        }

        let domain = self.node_domains.get(&node)?;
        let mut passing = Vec::new();
        for props in domain {
            let input = NodeInput {
                ingoing: &ingoing,
                outgoing: &outgoing,
                interaction: props,
            };
            let mut all_pass = true;
            for rule in &node_rules {
                all_pass &= ledger.record(*rule, rule.check(&input, self.parameters));
            }
            if all_pass {
                passing.push(*props);
            }
        }
        if passing.is_empty() {
            None
        } else {
            Some(passing)
        }
    }
}

#[cfg(test)]
mod tests {
    use rxn_topology::create_isobar_topologies;

    use super::*;

    #[test]
    fn every_intermediate_edge_is_ordered_once() {
        for topology in create_isobar_topologies(1, 5).unwrap() {
            let order = intermediate_edge_order(&topology);
            let unique: BTreeSet<EdgeId> = order.iter().copied().collect();
            assert_eq!(order.len(), unique.len());
            assert_eq!(order.len(), topology.intermediate_edge_ids().len());
        }
    }

    #[test]
    fn nodes_complete_when_their_last_edge_is_assigned() {
        let topology = create_isobar_topologies(1, 3).unwrap().remove(0);
        let order = intermediate_edge_order(&topology);
        assert_eq!(order, vec![EdgeId::from_raw(4)]);
        let external: BTreeSet<EdgeId> = (0..4).map(EdgeId::from_raw).collect();
        let schedule = completion_schedule(&topology, &order, &external);
        assert_eq!(
            schedule,
            vec![vec![], vec![NodeId::from_raw(0), NodeId::from_raw(1)]]
        );
    }

    #[test]
    fn violations_prefer_rules_that_never_passed() {
        let mut ledger = Ledger::default();
        ledger.record(ConservationRule::ParityConservation, RuleOutcome::Violated);
        ledger.record(ConservationRule::ParityConservation, RuleOutcome::Passed);
        ledger.record(ConservationRule::CParityConservation, RuleOutcome::Violated);
        assert_eq!(
            ledger.violated(),
            BTreeSet::from([ConservationRule::CParityConservation])
        );

        let mut ledger = Ledger::default();
        ledger.record(ConservationRule::ParityConservation, RuleOutcome::Violated);
        ledger.record(ConservationRule::ParityConservation, RuleOutcome::Passed);
        assert_eq!(
            ledger.violated(),
            BTreeSet::from([ConservationRule::ParityConservation])
        );
    }
}
