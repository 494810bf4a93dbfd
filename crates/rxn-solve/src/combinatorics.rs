//! Symmetrization and alignment of solved graphs.

use std::collections::{BTreeMap, BTreeSet};

use itertools::Itertools;
use rxn_core::{EdgeId, ErrorInfo, HalfInteger, NodeId, RxnError};
use rxn_topology::StateTransitionGraph;

fn mismatch_error(code: &str, message: impl Into<String>) -> RxnError {
    RxnError::GraphMismatch(ErrorInfo::new(code, message))
}

/// Rewrites `graph` so that edge `key` afterwards carries what edge
/// `mapping[key]` carried before. The mapping must be a permutation; each
/// cycle is applied as the ordered swaps `(a1, a2), (a2, a3), ...`.
fn apply_edge_mapping(
    graph: &StateTransitionGraph,
    mapping: &BTreeMap<EdgeId, EdgeId>,
) -> Result<StateTransitionGraph, RxnError> {
    let mut result = graph.clone();
    let mut visited: BTreeSet<EdgeId> = BTreeSet::new();
    for start in mapping.keys() {
        if visited.contains(start) {
            continue;
        }
        let mut current = *start;
        loop {
            visited.insert(current);
            let next = mapping.get(&current).copied().ok_or_else(|| {
                mismatch_error("incomplete-edge-mapping", "edge mapping is not a permutation")
                    .with_context("edge", current)
            })?;
            if next == *start {
                break;
            }
            if visited.contains(&next) {
                return Err(mismatch_error(
                    "incomplete-edge-mapping",
                    "edge mapping is not a permutation",
                )
                .with_context("edge", next));
            }
            result = result.swap_edges(current, next)?;
            current = next;
        }
    }
    Ok(result)
}

fn edge_node(graph: &StateTransitionGraph, edge: EdgeId, incoming: bool) -> Option<NodeId> {
    let line = graph.topology().edges().get(&edge)?;
    if incoming {
        line.ending_node
    } else {
        line.originating_node
    }
}

/// Distinct re-attachments of one group of identical edges, as mappings.
fn group_mappings(
    graph: &StateTransitionGraph,
    group: &[EdgeId],
    incoming: bool,
) -> Vec<BTreeMap<EdgeId, EdgeId>> {
    let mut seen: BTreeSet<Vec<(EdgeId, Option<NodeId>)>> = BTreeSet::new();
    let mut mappings = Vec::new();
    for permutation in group.iter().copied().permutations(group.len()) {
        let mut attachment: Vec<(EdgeId, Option<NodeId>)> = group
            .iter()
            .zip(&permutation)
            .map(|(key, source)| (*key, edge_node(graph, *source, incoming)))
            .collect();
        attachment.sort();
        if seen.insert(attachment) {
            mappings.push(group.iter().copied().zip(permutation).collect());
        }
    }
    mappings
}

fn permute_identical_edges(
    graph: &StateTransitionGraph,
    edges: &[EdgeId],
    incoming: bool,
) -> Result<Vec<StateTransitionGraph>, RxnError> {
    let mut groups: BTreeMap<(String, HalfInteger), Vec<EdgeId>> = BTreeMap::new();
    for edge in edges {
        if let Some(state) = graph.edge_state(*edge) {
            groups.entry(state.label()).or_default().push(*edge);
        }
    }
    let per_group: Vec<Vec<BTreeMap<EdgeId, EdgeId>>> = groups
        .values()
        .filter(|group| group.len() > 1)
        .map(|group| group_mappings(graph, group, incoming))
        .collect();
    if per_group.is_empty() {
        return Ok(vec![graph.clone()]);
    }
    per_group
        .into_iter()
        .multi_cartesian_product()
        .map(|choice| {
            let mapping: BTreeMap<EdgeId, EdgeId> = choice.into_iter().flatten().collect();
            apply_edge_mapping(graph, &mapping)
        })
        .collect()
}

/// Every inequivalent way of attaching identical external particles to
/// the vertices of `graph`. Final-state groups are permuted first, then
/// initial-state groups. Two permutations are equivalent when they attach
/// the same edge ids to the same nodes.
pub fn perform_external_edge_identical_particle_combinatorics(
    graph: &StateTransitionGraph,
) -> Result<Vec<StateTransitionGraph>, RxnError> {
    let topology = graph.topology();
    let final_edges = topology.final_state_edge_ids();
    let initial_edges = topology.initial_state_edge_ids();
    let mut graphs = Vec::new();
    for permuted in permute_identical_edges(graph, &final_edges, false)? {
        for both in permute_identical_edges(&permuted, &initial_edges, true)? {
            if !graphs.contains(&both) {
                graphs.push(both);
            }
        }
    }
    Ok(graphs)
}

/// Applies the identical-particle combinatorics to a whole set and removes
/// duplicates, so applying it twice changes nothing.
pub fn perform_combinatorics_on_set(
    graphs: &[StateTransitionGraph],
) -> Result<Vec<StateTransitionGraph>, RxnError> {
    let mut result: Vec<StateTransitionGraph> = Vec::new();
    for graph in graphs {
        for permuted in perform_external_edge_identical_particle_combinatorics(graph)? {
            if !result.contains(&permuted) {
                result.push(permuted);
            }
        }
    }
    Ok(result)
}

type ExternalKey = (Vec<(String, HalfInteger)>, Vec<(String, HalfInteger)>);

fn external_key(graph: &StateTransitionGraph) -> ExternalKey {
    let labels = |edges: Vec<EdgeId>| -> Vec<(String, HalfInteger)> {
        edges
            .into_iter()
            .filter_map(|edge| graph.edge_state(edge).map(|state| state.label()))
            .sorted()
            .collect()
    };
    let topology = graph.topology();
    (
        labels(topology.final_state_edge_ids()),
        labels(topology.initial_state_edge_ids()),
    )
}

/// Partitions graphs by the sorted `(name, projection)` labels of their
/// final and initial edges. Graphs in one class add coherently. Classes
/// appear in the order of their first member.
pub fn group_graphs_same_initial_and_final(
    graphs: &[StateTransitionGraph],
) -> Vec<Vec<StateTransitionGraph>> {
    let mut index: BTreeMap<ExternalKey, usize> = BTreeMap::new();
    let mut groups: Vec<Vec<StateTransitionGraph>> = Vec::new();
    for graph in graphs {
        let key = external_key(graph);
        match index.get(&key) {
            Some(position) => groups[*position].push(graph.clone()),
            None => {
                index.insert(key, groups.len());
                groups.push(vec![graph.clone()]);
            }
        }
    }
    groups
}

fn match_edges(
    reference: &StateTransitionGraph,
    graph: &StateTransitionGraph,
    reference_edges: &[EdgeId],
    edges: &[EdgeId],
) -> Result<BTreeMap<EdgeId, EdgeId>, RxnError> {
    let name_of = |graph: &StateTransitionGraph, edge: EdgeId| -> Option<String> {
        graph.edge_state(edge).map(|state| state.name().to_string())
    };
    if reference_edges.len() != edges.len() {
        return Err(mismatch_error(
            "unmatched-external-edge",
            "graphs have different numbers of external edges",
        )
        .with_context("reference", reference_edges.len())
        .with_context("graph", edges.len()));
    }
    let mut unmatched: Vec<EdgeId> = edges.to_vec();
    let mut mapping = BTreeMap::new();
    for reference_edge in reference_edges {
        let name = name_of(reference, *reference_edge);
        let preferred = unmatched
            .iter()
            .position(|edge| edge == reference_edge && name_of(graph, *edge) == name);
        let position = preferred
            .or_else(|| {
                unmatched
                    .iter()
                    .position(|edge| name_of(graph, *edge) == name)
            })
            .ok_or_else(|| {
                mismatch_error(
                    "unmatched-external-edge",
                    "no external edge carries the reference particle",
                )
                .with_context("edge", reference_edge)
                .with_context("particle", name.clone().unwrap_or_default())
            })?;
        mapping.insert(*reference_edge, unmatched.remove(position));
    }
    if mapping.keys().collect::<BTreeSet<_>>() != mapping.values().collect::<BTreeSet<_>>() {
        return Err(mismatch_error(
            "unmatched-external-edge",
            "external edge ids differ between the graphs",
        ));
    }
    Ok(mapping)
}

/// Renumbers the external edges of every graph so that each external edge
/// id carries the same particle as in the first graph. Final edges are
/// aligned before initial edges.
pub fn match_external_edges(
    graphs: &[StateTransitionGraph],
) -> Result<Vec<StateTransitionGraph>, RxnError> {
    let Some((reference, rest)) = graphs.split_first() else {
        return Ok(Vec::new());
    };
    let reference_topology = reference.topology();
    let reference_final = reference_topology.final_state_edge_ids();
    let reference_initial = reference_topology.initial_state_edge_ids();

    let mut aligned = Vec::with_capacity(graphs.len());
    aligned.push(reference.clone());
    for graph in rest {
        let mapping = match_edges(
            reference,
            graph,
            &reference_final,
            &graph.topology().final_state_edge_ids(),
        )?;
        let graph = apply_edge_mapping(graph, &mapping)?;
        let mapping = match_edges(
            reference,
            &graph,
            &reference_initial,
            &graph.topology().initial_state_edge_ids(),
        )?;
        aligned.push(apply_edge_mapping(&graph, &mapping)?);
    }
    Ok(aligned)
}
