use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use proptest::prelude::*;
use rxn_core::{EdgeId, HalfInteger, NodeId, Particle, QuantumNumberKind, RxnError, State};
use rxn_topology::{
    canonical_hash, create_isobar_topologies, Edge, InteractionProperties, StateTransitionGraph,
    Topology, TopologyDraft,
};

fn node(raw: u32) -> NodeId {
    NodeId::from_raw(raw)
}

fn edge(raw: u32) -> EdgeId {
    EdgeId::from_raw(raw)
}

fn expect_code(result: Result<(), RxnError>, code: &str) {
    match result {
        Err(RxnError::Topology(info)) => assert_eq!(info.code, code),
        other => panic!("expected {code}, got {other:?}"),
    }
}

#[test]
fn draft_reports_structural_mistakes() -> Result<(), RxnError> {
    let mut draft = TopologyDraft::new();
    draft.add_node(node(0))?;
    expect_code(draft.add_node(node(0)), "duplicate-node");
    draft.add_edges(&[edge(0), edge(1)])?;
    expect_code(draft.add_edges(&[edge(2), edge(1)]), "duplicate-edge");
    expect_code(
        draft.attach_edges_to_node_ingoing(&[edge(0)], node(7)),
        "unknown-node",
    );
    expect_code(
        draft.attach_edges_to_node_ingoing(&[edge(9)], node(0)),
        "unknown-edge",
    );
    draft.attach_edges_to_node_ingoing(&[edge(0)], node(0))?;
    expect_code(
        draft.attach_edges_to_node_ingoing(&[edge(0)], node(0)),
        "edge-already-attached",
    );
    draft.attach_edges_to_node_outgoing(&[edge(1)], node(0))?;
    let topology = draft.freeze()?;
    assert_eq!(topology.initial_state_edge_ids(), vec![edge(0)]);
    assert_eq!(topology.final_state_edge_ids(), vec![edge(1)]);
    Ok(())
}

#[test]
fn topology_validation_rejects_bad_shapes() {
    let only_outgoing = Topology::new(
        BTreeSet::from([node(0), node(1)]),
        BTreeMap::from([
            (edge(0), Edge::new(Some(node(0)), None)),
            (edge(1), Edge::new(None, Some(node(1)))),
        ]),
    );
    expect_code(only_outgoing.map(|_| ()), "node-degree");

    let dangling = Topology::new(BTreeSet::new(), BTreeMap::from([(edge(0), Edge::default())]));
    expect_code(dangling.map(|_| ()), "dangling-edge");

    let missing = Topology::new(
        BTreeSet::from([node(0)]),
        BTreeMap::from([
            (edge(0), Edge::new(None, Some(node(0)))),
            (edge(1), Edge::new(Some(node(0)), Some(node(3)))),
        ]),
    );
    expect_code(missing.map(|_| ()), "unknown-node");

    let split = Topology::new(
        BTreeSet::from([node(0), node(1)]),
        BTreeMap::from([
            (edge(0), Edge::new(None, Some(node(0)))),
            (edge(1), Edge::new(Some(node(0)), None)),
            (edge(2), Edge::new(None, Some(node(1)))),
            (edge(3), Edge::new(Some(node(1)), None)),
        ]),
    );
    expect_code(split.map(|_| ()), "disconnected-topology");
}

#[test]
fn deserialized_topologies_are_validated() -> Result<(), RxnError> {
    let topology = create_isobar_topologies(1, 3)?.remove(0);
    let encoded = serde_json::to_string(&topology).unwrap();
    let decoded: Topology = serde_json::from_str(&encoded).unwrap();
    assert_eq!(decoded, topology);

    let without_outgoing = r#"{
        "nodes": [0, 1],
        "edges": {
            "0": {"originating_node": 0, "ending_node": null},
            "1": {"originating_node": null, "ending_node": 1}
        }
    }"#;
    let err = serde_json::from_str::<Topology>(without_outgoing).unwrap_err();
    assert!(err.to_string().contains("node-degree"));

    let cyclic = r#"{
        "nodes": [0, 1],
        "edges": {
            "0": {"originating_node": null, "ending_node": 0},
            "1": {"originating_node": 0, "ending_node": 1},
            "2": {"originating_node": 1, "ending_node": 0},
            "3": {"originating_node": 1, "ending_node": null}
        }
    }"#;
    let err = serde_json::from_str::<Topology>(cyclic).unwrap_err();
    assert!(err.to_string().contains("cyclic-topology"));
    Ok(())
}

#[test]
fn swapping_edges_exchanges_connectivity() -> Result<(), RxnError> {
    let topology = create_isobar_topologies(1, 3)?.remove(0);
    let swapped = topology.swap_edges(edge(1), edge(2))?;
    assert_eq!(swapped.edge(edge(1))?.originating_node, Some(node(1)));
    assert_eq!(swapped.edge(edge(2))?.originating_node, Some(node(0)));
    assert_eq!(canonical_hash(&topology), canonical_hash(&swapped));
    assert_ne!(topology, swapped);
    Ok(())
}

#[test]
fn relabeling_rejects_collisions() -> Result<(), RxnError> {
    let topology = create_isobar_topologies(1, 2)?.remove(0);
    let collision = BTreeMap::from([(edge(0), edge(1))]);
    expect_code(topology.relabel_edges(&collision).map(|_| ()), "duplicate-edge");
    let shifted = BTreeMap::from([(edge(0), edge(10))]);
    let relabelled = topology.relabel_edges(&shifted)?;
    assert_eq!(relabelled.initial_state_edge_ids(), vec![edge(10)]);
    Ok(())
}

#[test]
fn closed_regions_below_edges() -> Result<(), RxnError> {
    let chain = create_isobar_topologies(1, 3)?.remove(0);
    assert!(chain.is_closed_below(edge(4))?);
    assert_eq!(chain.final_state_edges_below(edge(4))?, vec![edge(2), edge(3)]);
    assert_eq!(chain.final_state_edges_below(edge(1))?, vec![edge(1)]);

    let scattering = create_isobar_topologies(2, 2)?.remove(0);
    assert!(!scattering.is_closed_below(edge(0))?);
    Ok(())
}

fn pion_graph(topology: Arc<Topology>, projection: i32) -> Result<StateTransitionGraph, RxnError> {
    let pion = Arc::new(Particle::new("pi0", 111, 0.135, HalfInteger::ZERO));
    let rho = Arc::new(Particle::new("rho(770)0", 113, 0.775, HalfInteger::ONE));
    let mut edge_props = BTreeMap::new();
    edge_props.insert(edge(0), State::new(rho, HalfInteger::integer(projection))?);
    edge_props.insert(edge(1), State::new(Arc::clone(&pion), HalfInteger::ZERO)?);
    edge_props.insert(edge(2), State::new(pion, HalfInteger::ZERO)?);
    let props = InteractionProperties {
        l_magnitude: Some(HalfInteger::ONE),
        s_magnitude: Some(HalfInteger::ZERO),
        ..InteractionProperties::default()
    };
    StateTransitionGraph::new(topology, edge_props, BTreeMap::from([(node(0), props)]))
}

#[test]
fn graph_equality_respects_ignore_list() -> Result<(), RxnError> {
    let topology = Arc::new(create_isobar_topologies(1, 2)?.remove(0));
    let up = pion_graph(Arc::clone(&topology), 1)?;
    let down = pion_graph(Arc::clone(&topology), -1)?;
    assert_ne!(up, down);
    assert!(up.eq_ignoring(&down, &[QuantumNumberKind::SpinProjection]));
    assert!(!up.eq_ignoring(&down, &[QuantumNumberKind::LMagnitude]));

    let stripped = up.strip_node_quantum_numbers(&[QuantumNumberKind::LMagnitude]);
    assert!(!stripped.eq_ignoring(&up, &[]));
    assert!(stripped.eq_ignoring(&up, &[QuantumNumberKind::LMagnitude]));
    Ok(())
}

#[test]
fn graph_rejects_properties_outside_topology() -> Result<(), RxnError> {
    let topology = Arc::new(create_isobar_topologies(1, 2)?.remove(0));
    let props = BTreeMap::from([(node(4), InteractionProperties::default())]);
    let result = StateTransitionGraph::new(topology, BTreeMap::new(), props);
    expect_code(result.map(|_| ()), "unknown-node");
    Ok(())
}

#[test]
fn graph_swap_moves_states_with_edges() -> Result<(), RxnError> {
    let topology = Arc::new(create_isobar_topologies(1, 2)?.remove(0));
    let graph = pion_graph(topology, 0)?;
    let swapped = graph.swap_edges(edge(0), edge(1))?;
    assert_eq!(swapped.edge_state(edge(1)).map(State::name), Some("rho(770)0"));
    assert_eq!(swapped.topology().edge(edge(1))?.ending_node, Some(node(0)));
    assert_eq!(swapped.swap_edges(edge(0), edge(1))?, graph);
    Ok(())
}

proptest! {
    #[test]
    fn canonical_hash_ignores_edge_labels(offset in 10u32..1000, pick in 0usize..2) {
        let topology = create_isobar_topologies(1, 4).unwrap().remove(pick);
        let mapping: BTreeMap<EdgeId, EdgeId> = topology
            .edges()
            .keys()
            .rev()
            .enumerate()
            .map(|(idx, id)| (*id, EdgeId::from_raw(offset + idx as u32)))
            .collect();
        let relabelled = topology.relabel_edges(&mapping).unwrap();
        prop_assert_eq!(canonical_hash(&topology), canonical_hash(&relabelled));
    }
}
