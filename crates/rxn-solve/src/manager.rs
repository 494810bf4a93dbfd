//! Top-level reaction search: topologies, branches, dispatch and post-processing.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use itertools::Itertools;
use rxn_core::{NodeId, Particle, ParticleCollection, QuantumNumberKind, RxnError};
use rxn_topology::{
    create_isobar_topologies, create_n_body_topology, StateTransitionGraph, Topology,
};

use crate::combinatorics::match_external_edges;
use crate::config::{Formalism, ReactionSpec, SolverConfig, SolvingMode, TopologyBuilding};
use crate::dispatch::{dispatch_branches, DispatchOptions};
use crate::initialize::{initialize_graphs, resolve_states, ExternalState};
use crate::result::ReactionResult;
use crate::settings::{
    create_interaction_settings, determine_node_regimes, InteractionSettings, InteractionType,
};
use crate::solver::{Branch, GraphSolver};

/// Node quantum numbers that carry no information in the formalism.
fn ignored_node_quantum_numbers(formalism: Formalism) -> &'static [QuantumNumberKind] {
    match formalism {
        Formalism::Helicity => &[
            QuantumNumberKind::LMagnitude,
            QuantumNumberKind::LProjection,
            QuantumNumberKind::SMagnitude,
            QuantumNumberKind::SProjection,
        ],
        Formalism::CanonicalHelicity => &[],
    }
}

/// Drives a reaction from topology building to post-processed solutions.
#[derive(Debug, Clone)]
pub struct StateTransitionManager<'a> {
    reaction: ReactionSpec,
    config: SolverConfig,
    candidates: ParticleCollection,
    initial_state: Vec<ExternalState>,
    final_state: Vec<ExternalState>,
    settings: BTreeMap<InteractionType, InteractionSettings>,
    catalog: &'a ParticleCollection,
}

impl<'a> StateTransitionManager<'a> {
    /// Validates the configuration and resolves the external states.
    pub fn new(
        catalog: &'a ParticleCollection,
        reaction: ReactionSpec,
        config: SolverConfig,
    ) -> Result<Self, RxnError> {
        config.validate()?;
        let initial_state = resolve_states(&reaction.initial_state, catalog)?;
        let final_state = resolve_states(&reaction.final_state, catalog)?;
        let candidates = catalog.with_names_containing(&reaction.allowed_intermediate_particles);
        let settings = create_interaction_settings(&config);
        Ok(Self {
            reaction,
            config,
            candidates,
            initial_state,
            final_state,
            settings,
            catalog,
        })
    }

    /// Catalog the external states were resolved against.
    pub fn catalog(&self) -> &'a ParticleCollection {
        self.catalog
    }

    /// Regime table used by the solver.
    pub fn interaction_settings(&self) -> &BTreeMap<InteractionType, InteractionSettings> {
        &self.settings
    }

    /// Regime table, for callers that tune rules or domains before solving.
    pub fn interaction_settings_mut(
        &mut self,
    ) -> &mut BTreeMap<InteractionType, InteractionSettings> {
        &mut self.settings
    }

    /// Topologies for the configured building strategy.
    pub fn build_topologies(&self) -> Result<Vec<Topology>, RxnError> {
        let initial = self.initial_state.len();
        let outgoing = self.final_state.len();
        let topologies = match self.config.topology_building {
            TopologyBuilding::Isobar => create_isobar_topologies(initial, outgoing)?,
            TopologyBuilding::NBody => vec![create_n_body_topology(initial, outgoing)?],
        };
        if topologies.is_empty() {
            tracing::warn!(initial, outgoing, "no topology connects the requested legs");
        } else {
            tracing::info!(count = topologies.len(), "built topologies");
        }
        Ok(topologies)
    }

    fn node_regime_options(
        &self,
        graph: &StateTransitionGraph,
    ) -> BTreeMap<NodeId, Vec<InteractionType>> {
        let topology = graph.topology();
        topology
            .nodes()
            .iter()
            .map(|node| {
                let adjacent: Vec<&Particle> = topology
                    .edges_ingoing_to(*node)
                    .into_iter()
                    .chain(topology.edges_outgoing_from(*node))
                    .filter_map(|edge| graph.edge_state(edge))
                    .map(|state| state.particle())
                    .collect();
                (
                    *node,
                    determine_node_regimes(&self.reaction.allowed_interaction_types, &adjacent),
                )
            })
            .collect()
    }

    /// Initializes the external states on every topology and expands each
    /// graph over the regimes its nodes admit. A graph with a node that
    /// admits no regime yields no branch.
    pub fn create_branches(&self, topologies: &[Topology]) -> Result<Vec<Branch>, RxnError> {
        let mut branches = Vec::new();
        for topology in topologies {
            let topology = Arc::new(topology.clone());
            let graphs = initialize_graphs(
                &topology,
                &self.initial_state,
                &self.final_state,
                &self.reaction.final_state_groupings,
            )?;
            for graph in graphs {
                let options = self.node_regime_options(&graph);
                if options.values().any(Vec::is_empty) {
                    continue;
                }
                let nodes: Vec<NodeId> = options.keys().copied().collect();
                for regimes in options.into_values().multi_cartesian_product() {
                    branches.push(Branch {
                        graph: graph.clone(),
                        node_regimes: nodes.iter().copied().zip(regimes).collect(),
                    });
                }
            }
        }
        Ok(branches)
    }

    /// Buckets branches by strength, strongest first.
    fn strength_groups(&self, branches: Vec<Branch>) -> Vec<(f64, Vec<Branch>)> {
        let mut weighted: Vec<(f64, Branch)> = branches
            .into_iter()
            .map(|branch| (branch.strength(&self.settings), branch))
            .collect();
        weighted.sort_by(|(left, _), (right, _)| right.total_cmp(left));
        let mut groups: Vec<(f64, Vec<Branch>)> = Vec::new();
        for (strength, branch) in weighted {
            match groups.last_mut() {
                Some((current, members)) if current.total_cmp(&strength).is_eq() => {
                    members.push(branch)
                }
                _ => groups.push((strength, vec![branch])),
            }
        }
        groups
    }

    /// Runs the full search.
    ///
    /// Strength groups are solved strongest first. In fast mode the search
    /// stops after the first group that produced a solution. Solutions are
    /// stripped of the node quantum numbers the formalism ignores,
    /// deduplicated and aligned on their external edge ids.
    pub fn find_solutions(&self) -> Result<ReactionResult, RxnError> {
        let topologies = self.build_topologies()?;
        let branches = self.create_branches(&topologies)?;
        let mut result = ReactionResult::new(self.config.formalism);
        if branches.is_empty() {
            tracing::info!("no branch admits an interaction regime");
            return Ok(result);
        }

        let solver = GraphSolver::new(
            &self.settings,
            &self.candidates,
            self.config.rule_parameters(),
        );
        let options = DispatchOptions {
            number_of_threads: self.config.number_of_threads,
            deadline: self
                .config
                .timeout_ms
                .map(|ms| Instant::now() + Duration::from_millis(ms)),
        };

        let pool = options.build_pool()?;
        for (strength, group) in self.strength_groups(branches) {
            tracing::info!(strength, branches = group.len(), "solving strength group");
            for report in dispatch_branches(&pool, &solver, &group, &options)? {
                result.absorb(report);
            }
            if self.config.solving_mode == SolvingMode::Fast && !result.solutions.is_empty() {
                break;
            }
        }

        for missing in &result.missing_quantum_numbers {
            tracing::debug!(
                rule = %missing.rule,
                quantum_number = %missing.quantum_number,
                "rule skipped"
            );
        }

        let ignored = ignored_node_quantum_numbers(self.config.formalism);
        let mut unique: Vec<StateTransitionGraph> = Vec::new();
        for graph in result.solutions.drain(..) {
            let stripped = graph.strip_node_quantum_numbers(ignored);
            if !unique
                .iter()
                .any(|known| known.eq_ignoring(&stripped, ignored))
            {
                unique.push(stripped);
            }
        }
        result.solutions = match_external_edges(&unique)?;
        if !result.solutions.is_empty() {
            result.violated_rules.clear();
        }
        tracing::info!(
            solutions = result.solutions.len(),
            outcome = ?result.outcome(),
            "finished reaction search"
        );
        Ok(result)
    }
}

/// Builds a manager and runs the search in one call.
pub fn generate_transitions(
    catalog: &ParticleCollection,
    reaction: ReactionSpec,
    config: SolverConfig,
) -> Result<ReactionResult, RxnError> {
    StateTransitionManager::new(catalog, reaction, config)?.find_solutions()
}
