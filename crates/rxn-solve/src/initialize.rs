//! Assignment of the external states to the boundary edges of a topology.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use itertools::Itertools;
use rxn_core::{
    EdgeId, ErrorInfo, HalfInteger, Particle, ParticleCollection, RxnError, Spin, State,
};
use rxn_topology::{StateTransitionGraph, Topology};

use crate::config::{FinalStateGrouping, StateDefinition};

fn initialization_error(code: &str, message: impl Into<String>) -> RxnError {
    RxnError::Initialization(ErrorInfo::new(code, message))
}

/// An external leg resolved against the catalog.
#[derive(Debug, Clone, PartialEq)]
pub struct ExternalState {
    /// The particle.
    pub particle: Arc<Particle>,
    /// Projections to enumerate, validated against the particle spin.
    pub projections: Vec<HalfInteger>,
}

/// Looks the legs up and fixes their projection lists. Without an explicit
/// list every allowed projection is used, which drops zero for massless
/// particles.
pub fn resolve_states(
    definitions: &[StateDefinition],
    catalog: &ParticleCollection,
) -> Result<Vec<ExternalState>, RxnError> {
    definitions
        .iter()
        .map(|definition| {
            let particle = Arc::clone(catalog.get(&definition.name)?);
            let projections = match &definition.spin_projections {
                None => particle.allowed_projections(),
                Some(projections) if projections.is_empty() => {
                    return Err(initialization_error(
                        "empty-spin-projections",
                        "an explicit projection list must not be empty",
                    )
                    .with_context("particle", &definition.name));
                }
                Some(projections) => {
                    for projection in projections {
                        Spin::new(particle.spin, *projection)
                            .map_err(|err| err.with_context("particle", &definition.name))?;
                    }
                    projections.iter().copied().unique().collect()
                }
            };
            Ok(ExternalState {
                particle,
                projections,
            })
        })
        .collect()
}

type NodeSignature = (Vec<String>, Vec<String>);

/// Per node, the sorted names that reach it from the initial and from the
/// final side; sorted over nodes.
fn assignment_signature(
    topology: &Topology,
    names: &BTreeMap<EdgeId, &str>,
) -> Vec<NodeSignature> {
    let sorted_names = |edges: Vec<EdgeId>| -> Vec<String> {
        let mut collected: Vec<String> = edges
            .iter()
            .filter_map(|edge| names.get(edge).map(|name| name.to_string()))
            .collect();
        collected.sort();
        collected
    };
    let mut signature: Vec<NodeSignature> = topology
        .nodes()
        .iter()
        .map(|node| {
            (
                sorted_names(topology.originating_initial_state_edges(*node)),
                sorted_names(topology.originating_final_state_edges(*node)),
            )
        })
        .collect();
    signature.sort();
    signature
}

fn satisfies_groupings(signature: &[NodeSignature], groupings: &[FinalStateGrouping]) -> bool {
    if groupings.is_empty() {
        return true;
    }
    groupings.iter().any(|grouping| {
        grouping
            .sorted_groups()
            .iter()
            .all(|group| signature.iter().any(|(_, below)| below == group))
    })
}

fn permuted_assignments(
    edges: &[EdgeId],
    states: &[ExternalState],
) -> Vec<Vec<(EdgeId, ExternalState)>> {
    (0..states.len())
        .permutations(states.len())
        .map(|order| {
            edges
                .iter()
                .copied()
                .zip(order.into_iter().map(|idx| states[idx].clone()))
                .collect()
        })
        .collect()
}

/// Enumerates the inequivalent ways to put the external states on the
/// boundary of `topology`, expanded over their projections. Intermediate
/// edges stay unassigned.
pub fn initialize_graphs(
    topology: &Arc<Topology>,
    initial_state: &[ExternalState],
    final_state: &[ExternalState],
    groupings: &[FinalStateGrouping],
) -> Result<Vec<StateTransitionGraph>, RxnError> {
    let initial_edges = topology.initial_state_edge_ids();
    let final_edges = topology.final_state_edge_ids();
    if initial_edges.len() != initial_state.len() || final_edges.len() != final_state.len() {
        return Err(initialization_error(
            "boundary-size-mismatch",
            "the number of external states does not match the topology boundary",
        )
        .with_context("initial_edges", initial_edges.len())
        .with_context("initial_states", initial_state.len())
        .with_context("final_edges", final_edges.len())
        .with_context("final_states", final_state.len()));
    }

    let mut seen: BTreeSet<Vec<NodeSignature>> = BTreeSet::new();
    let mut assignments: Vec<BTreeMap<EdgeId, ExternalState>> = Vec::new();
    for initial in permuted_assignments(&initial_edges, initial_state) {
        for outgoing in permuted_assignments(&final_edges, final_state) {
            let assignment: BTreeMap<EdgeId, ExternalState> =
                initial.iter().chain(outgoing.iter()).cloned().collect();
            let names: BTreeMap<EdgeId, &str> = assignment
                .iter()
                .map(|(edge, state)| (*edge, state.particle.name.as_str()))
                .collect();
            let signature = assignment_signature(topology, &names);
            if !satisfies_groupings(&signature, groupings) || !seen.insert(signature) {
                continue;
            }
            assignments.push(assignment);
        }
    }

    let mut graphs = Vec::new();
    for assignment in &assignments {
        let per_edge: Vec<Vec<(EdgeId, State)>> = assignment
            .iter()
            .map(|(edge, external)| {
                external
                    .projections
                    .iter()
                    .map(|projection| {
                        State::new(Arc::clone(&external.particle), *projection)
                            .map(|state| (*edge, state))
                    })
                    .collect::<Result<Vec<_>, _>>()
            })
            .collect::<Result<_, _>>()?;
        for combination in per_edge.into_iter().multi_cartesian_product() {
            graphs.push(StateTransitionGraph::new(
                Arc::clone(topology),
                combination.into_iter().collect(),
                BTreeMap::new(),
            )?);
        }
    }
    tracing::debug!(
        assignments = assignments.len(),
        graphs = graphs.len(),
        "initialized external states"
    );
    Ok(graphs)
}
