//! Quick verdict on a reaction collapsed onto a single vertex.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use itertools::Itertools;
use rxn_core::{EdgeId, ErrorInfo, HalfInteger, NodeId, ParticleCollection, RxnError, State};
use rxn_rules::{
    AdditiveQuantumNumber, ConservationRule, NodeInput, RuleOutcome, RuleParameters,
};
use rxn_topology::{create_n_body_topology, InteractionProperties, StateTransitionGraph};
use serde::{Deserialize, Serialize};

use crate::config::ReactionSpec;
use crate::initialize::{initialize_graphs, resolve_states, ExternalState};

/// Rules whose verdict depends on projections and on the vertex L and S.
const SPIN_DEPENDENT_RULES: [ConservationRule; 6] = [
    ConservationRule::CParityConservation,
    ConservationRule::IdenticalParticleSymmetrization,
    ConservationRule::IsospinConservation,
    ConservationRule::ParityConservation,
    ConservationRule::SpinMagnitudeConservation,
    ConservationRule::GParityConservation,
];

/// Bounds of the vertex quantum number scan.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NBodyCheckOptions {
    /// Largest orbital angular momentum tried.
    #[serde(default = "default_max_angular_momentum")]
    pub max_angular_momentum: u32,
    /// Largest coupled spin tried, in half steps from zero.
    #[serde(default = "default_max_spin_magnitude")]
    pub max_spin_magnitude: HalfInteger,
    /// Width multiplier of the mass rule.
    #[serde(default = "default_mass_width_factor")]
    pub mass_width_factor: f64,
}

fn default_max_angular_momentum() -> u32 {
    1
}

fn default_max_spin_magnitude() -> HalfInteger {
    HalfInteger::integer(2)
}

fn default_mass_width_factor() -> f64 {
    3.0
}

impl Default for NBodyCheckOptions {
    fn default() -> Self {
        Self {
            max_angular_momentum: default_max_angular_momentum(),
            max_spin_magnitude: default_max_spin_magnitude(),
            mass_width_factor: default_mass_width_factor(),
        }
    }
}

fn check_gell_mann_nishijima(states: &[&ExternalState]) -> Result<(), RxnError> {
    let interaction = InteractionProperties::default();
    let parameters = RuleParameters::default();
    for external in states {
        let Some(projection) = external.projections.first() else {
            continue;
        };
        let state = State::new(Arc::clone(&external.particle), *projection)?;
        let ingoing = [&state];
        let input = NodeInput {
            ingoing: &ingoing,
            outgoing: &[],
            interaction: &interaction,
        };
        if ConservationRule::GellMannNishijima.check(&input, &parameters) == RuleOutcome::Violated
        {
            return Err(RxnError::Initialization(
                ErrorInfo::new(
                    "gell-mann-nishijima-violation",
                    "external particle violates Q = I3 + Y/2",
                )
                .with_context("particle", &external.particle.name)
                .with_hint("check the isospin and flavour numbers in the catalog"),
            ));
        }
    }
    Ok(())
}

fn vertex_combinations(options: &NBodyCheckOptions) -> Vec<InteractionProperties> {
    let l_max = HalfInteger::integer(options.max_angular_momentum as i32);
    HalfInteger::ZERO
        .up_to(l_max)
        .cartesian_product(
            HalfInteger::ZERO
                .up_to_in_halves(options.max_spin_magnitude)
                .collect::<Vec<_>>(),
        )
        .map(|(l, s)| InteractionProperties {
            l_magnitude: Some(l),
            l_projection: Some(HalfInteger::ZERO),
            s_magnitude: Some(s),
            s_projection: Some(HalfInteger::ZERO),
            parity_prefactor: None,
        })
        .collect()
}

/// Evaluates the reaction as one n-body vertex and returns the rules that
/// forbid it.
///
/// Additive rules, and the mass rule for a single initial particle, are
/// checked once. The spin dependent rules are tried for every projection
/// assignment and every vertex L and S within `options`; such a rule is
/// reported only if it fails for all of them. A skipped rule is never a
/// failure.
pub fn check_reaction_violations(
    catalog: &ParticleCollection,
    reaction: &ReactionSpec,
    options: &NBodyCheckOptions,
) -> Result<BTreeSet<ConservationRule>, RxnError> {
    let initial = resolve_states(&reaction.initial_state, catalog)?;
    let final_state = resolve_states(&reaction.final_state, catalog)?;
    let topology = Arc::new(create_n_body_topology(initial.len(), final_state.len())?);
    let externals: Vec<&ExternalState> = initial.iter().chain(final_state.iter()).collect();
    check_gell_mann_nishijima(&externals)?;

    let graphs = initialize_graphs(&topology, &initial, &final_state, &[])?;
    let node = NodeId::from_raw(0);
    let ingoing_edges = topology.edges_ingoing_to(node);
    let outgoing_edges = topology.edges_outgoing_from(node);
    let side = |graph: &StateTransitionGraph, edges: &[EdgeId]| -> Vec<State> {
        edges
            .iter()
            .filter_map(|edge| graph.edge_state(*edge).cloned())
            .collect()
    };
    let assignments: Vec<(Vec<State>, Vec<State>)> = graphs
        .iter()
        .map(|graph| (side(graph, &ingoing_edges), side(graph, &outgoing_edges)))
        .collect();

    let parameters = RuleParameters {
        mass_width_factor: options.mass_width_factor,
    };
    let mut violated = BTreeSet::new();
    let Some((first_initial, first_final)) = assignments.first() else {
        return Ok(violated);
    };

    let mut once: Vec<ConservationRule> = AdditiveQuantumNumber::ALL
        .iter()
        .map(|number| ConservationRule::Additive(*number))
        .collect();
    if initial.len() == 1 {
        once.push(ConservationRule::MassConservation);
    }
    let empty = InteractionProperties::default();
    let ingoing: Vec<&State> = first_initial.iter().collect();
    let outgoing: Vec<&State> = first_final.iter().collect();
    let input = NodeInput {
        ingoing: &ingoing,
        outgoing: &outgoing,
        interaction: &empty,
    };
    for rule in once {
        if rule.check(&input, &parameters) == RuleOutcome::Violated {
            violated.insert(rule);
        }
    }

    let vertices = vertex_combinations(options);
    let mut survived: BTreeMap<ConservationRule, bool> = SPIN_DEPENDENT_RULES
        .iter()
        .map(|rule| (*rule, false))
        .collect();
    for (initial_assignment, final_assignment) in &assignments {
        let ingoing: Vec<&State> = initial_assignment.iter().collect();
        let outgoing: Vec<&State> = final_assignment.iter().collect();
        for vertex in &vertices {
            let input = NodeInput {
                ingoing: &ingoing,
                outgoing: &outgoing,
                interaction: vertex,
            };
            for (rule, passed) in survived.iter_mut().filter(|(_, passed)| !**passed) {
                if rule.check(&input, &parameters) != RuleOutcome::Violated {
                    *passed = true;
                }
            }
        }
        if survived.values().all(|passed| *passed) {
            break;
        }
    }
    violated.extend(
        survived
            .into_iter()
            .filter(|(_, passed)| !passed)
            .map(|(rule, _)| rule),
    );
    tracing::debug!(
        violated = violated.len(),
        "checked reaction as a single vertex"
    );
    Ok(violated)
}
