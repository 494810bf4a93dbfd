mod common;

use std::collections::BTreeMap;
use std::sync::Arc;

use rxn_core::{EdgeId, HalfInteger, NodeId, ParticleCollection, RxnError, State};
use rxn_solve::combinatorics::perform_combinatorics_on_set;
use rxn_solve::{
    group_graphs_same_initial_and_final, match_external_edges,
    perform_external_edge_identical_particle_combinatorics,
};
use rxn_topology::{create_isobar_topologies, StateTransitionGraph, Topology};

use common::pdg_catalog;

fn edge(raw: u32) -> EdgeId {
    EdgeId::from_raw(raw)
}

fn sequential_three_body() -> Result<Arc<Topology>, RxnError> {
    Ok(Arc::new(create_isobar_topologies(1, 3)?.remove(0)))
}

/// Builds a graph on the 1 -> 3 isobar topology: edge 1 leaves the top
/// node, edges 2 and 3 the bottom one, edge 4 joins them.
fn graph(
    catalog: &ParticleCollection,
    topology: &Arc<Topology>,
    legs: [(&str, f64); 5],
) -> Result<StateTransitionGraph, RxnError> {
    let mut edge_props = BTreeMap::new();
    for (raw, (name, projection)) in legs.into_iter().enumerate() {
        let state = State::new(
            Arc::clone(catalog.get(name)?),
            HalfInteger::try_from_f64(projection)?,
        )?;
        edge_props.insert(edge(raw as u32), state);
    }
    StateTransitionGraph::new(Arc::clone(topology), edge_props, BTreeMap::new())
}

fn names(graph: &StateTransitionGraph) -> Vec<String> {
    graph
        .edge_props()
        .values()
        .map(|state| state.name().to_string())
        .collect()
}

fn radiative_omega(
    catalog: &ParticleCollection,
    topology: &Arc<Topology>,
) -> Result<StateTransitionGraph, RxnError> {
    graph(
        catalog,
        topology,
        [
            ("J/psi(1S)", 1.0),
            ("pi0", 0.0),
            ("pi0", 0.0),
            ("gamma", 1.0),
            ("omega(782)", 1.0),
        ],
    )
}

#[test]
fn identical_pions_on_different_vertices_are_permuted() -> Result<(), RxnError> {
    let catalog = pdg_catalog()?;
    let topology = sequential_three_body()?;
    let original = radiative_omega(&catalog, &topology)?;
    let permuted = perform_external_edge_identical_particle_combinatorics(&original)?;
    assert_eq!(permuted.len(), 2);
    assert_eq!(permuted[0], original);
    let swapped = permuted[1].topology();
    let top = NodeId::from_raw(0);
    let bottom = NodeId::from_raw(1);
    assert_eq!(swapped.edge(edge(1))?.originating_node, Some(bottom));
    assert_eq!(swapped.edge(edge(2))?.originating_node, Some(top));
    assert_eq!(names(&permuted[1]), names(&original));
    Ok(())
}

#[test]
fn pions_on_the_same_vertex_need_no_permutation() -> Result<(), RxnError> {
    let catalog = pdg_catalog()?;
    let topology = sequential_three_body()?;
    let original = graph(
        &catalog,
        &topology,
        [
            ("J/psi(1S)", 1.0),
            ("gamma", 1.0),
            ("pi0", 0.0),
            ("pi0", 0.0),
            ("f0(980)", 0.0),
        ],
    )?;
    let permuted = perform_external_edge_identical_particle_combinatorics(&original)?;
    assert_eq!(permuted, vec![original]);
    Ok(())
}

#[test]
fn combinatorics_on_a_set_is_idempotent() -> Result<(), RxnError> {
    let catalog = pdg_catalog()?;
    let topology = sequential_three_body()?;
    let once = perform_combinatorics_on_set(&[radiative_omega(&catalog, &topology)?])?;
    let twice = perform_combinatorics_on_set(&once)?;
    assert_eq!(once.len(), twice.len());
    assert!(twice.iter().all(|graph| once.contains(graph)));
    Ok(())
}

#[test]
fn groups_follow_external_projections() -> Result<(), RxnError> {
    let catalog = pdg_catalog()?;
    let topology = sequential_three_body()?;
    let up = radiative_omega(&catalog, &topology)?;
    let up_other_omega = graph(
        &catalog,
        &topology,
        [
            ("J/psi(1S)", 1.0),
            ("pi0", 0.0),
            ("pi0", 0.0),
            ("gamma", 1.0),
            ("omega(782)", 0.0),
        ],
    )?;
    let down = graph(
        &catalog,
        &topology,
        [
            ("J/psi(1S)", 1.0),
            ("pi0", 0.0),
            ("pi0", 0.0),
            ("gamma", -1.0),
            ("omega(782)", 1.0),
        ],
    )?;
    let groups = group_graphs_same_initial_and_final(&[
        up.clone(),
        down.clone(),
        up_other_omega.clone(),
    ]);
    assert_eq!(groups, vec![vec![up, up_other_omega], vec![down]]);
    Ok(())
}

#[test]
fn external_edges_are_aligned_to_the_first_graph() -> Result<(), RxnError> {
    let catalog = pdg_catalog()?;
    let topology = sequential_three_body()?;
    let reference = radiative_omega(&catalog, &topology)?;
    let shuffled = reference.swap_edges(edge(1), edge(3))?;
    assert_eq!(shuffled.edge_state(edge(1)).map(State::name), Some("gamma"));

    let aligned = match_external_edges(&[reference.clone(), shuffled])?;
    assert_eq!(aligned.len(), 2);
    assert_eq!(aligned[0], reference);
    assert_eq!(names(&aligned[1]), names(&reference));
    assert_eq!(
        aligned[1].topology().edge(edge(3))?.originating_node,
        Some(NodeId::from_raw(1))
    );
    Ok(())
}

#[test]
fn unmatched_particles_are_reported() -> Result<(), RxnError> {
    let catalog = pdg_catalog()?;
    let topology = sequential_three_body()?;
    let reference = radiative_omega(&catalog, &topology)?;
    let other = graph(
        &catalog,
        &topology,
        [
            ("J/psi(1S)", 1.0),
            ("pi0", 0.0),
            ("pi0", 0.0),
            ("eta", 0.0),
            ("omega(782)", 1.0),
        ],
    )?;
    let err = match_external_edges(&[reference, other]).unwrap_err();
    assert!(matches!(err, RxnError::GraphMismatch(_)));
    assert_eq!(err.code(), "unmatched-external-edge");
    Ok(())
}

#[test]
fn grouping_reconstructs_disjoint_classes_in_any_order() -> Result<(), RxnError> {
    use itertools::Itertools;

    let catalog = pdg_catalog()?;
    let topology = sequential_three_body()?;
    let photon = |helicity: f64, omega: f64| {
        graph(
            &catalog,
            &topology,
            [
                ("J/psi(1S)", 1.0),
                ("pi0", 0.0),
                ("pi0", 0.0),
                ("gamma", helicity),
                ("omega(782)", omega),
            ],
        )
    };
    let first_class = vec![photon(1.0, 1.0)?, photon(1.0, 0.0)?];
    let second_class = vec![photon(-1.0, -1.0)?, photon(-1.0, 0.0)?];
    let all: Vec<StateTransitionGraph> =
        first_class.iter().chain(&second_class).cloned().collect();

    for order in all.iter().permutations(all.len()) {
        let shuffled: Vec<StateTransitionGraph> = order.into_iter().cloned().collect();
        let groups = group_graphs_same_initial_and_final(&shuffled);
        assert_eq!(groups.len(), 2);
        for group in groups {
            let expected = if first_class.contains(&group[0]) {
                &first_class
            } else {
                &second_class
            };
            assert_eq!(group.len(), expected.len());
            assert!(group.iter().all(|member| expected.contains(member)));
        }
    }
    Ok(())
}
