use std::collections::{BTreeMap, BTreeSet};

use itertools::Itertools;
use rxn_core::{EdgeId, NodeId, RxnError};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::topology::{Edge, Topology};

type EncodedEdge = (Option<u32>, Option<u32>);

/// Label-free representation of a topology. Two topologies are isomorphic
/// exactly when their canonical forms are equal.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CanonicalTopology {
    node_count: u32,
    edges: Vec<EncodedEdge>,
}

impl CanonicalTopology {
    /// Number of interaction nodes.
    pub fn node_count(&self) -> usize {
        self.node_count as usize
    }

    /// Edges as `(originating, ending)` canonical node positions, sorted.
    pub fn edges(&self) -> &[EncodedEdge] {
        &self.edges
    }

    /// Materializes the canonical representative.
    ///
    /// Nodes are numbered in topological order. Edges are numbered initial
    /// legs first, then final legs, then intermediate lines.
    pub fn to_topology(&self) -> Result<Topology, RxnError> {
        let positional = Topology::new(
            (0..self.node_count).map(NodeId::from_raw).collect(),
            self.edges
                .iter()
                .enumerate()
                .map(|(idx, (from, to))| {
                    (
                        EdgeId::from_raw(idx as u32),
                        Edge::new(from.map(NodeId::from_raw), to.map(NodeId::from_raw)),
                    )
                })
                .collect(),
        )?;
        let renumber: BTreeMap<NodeId, NodeId> = positional
            .node_order()
            .into_iter()
            .enumerate()
            .map(|(idx, node)| (node, NodeId::from_raw(idx as u32)))
            .collect();
        let mut relabelled: Vec<Edge> = positional
            .edges()
            .values()
            .map(|edge| {
                Edge::new(
                    edge.originating_node.and_then(|node| renumber.get(&node).copied()),
                    edge.ending_node.and_then(|node| renumber.get(&node).copied()),
                )
            })
            .collect();
        relabelled.sort_by_key(|edge| {
            let class = if edge.is_initial_state() {
                0
            } else if edge.is_final_state() {
                1
            } else {
                2
            };
            (class, edge.originating_node, edge.ending_node)
        });
        Topology::new(
            renumber.values().copied().collect(),
            relabelled
                .into_iter()
                .enumerate()
                .map(|(idx, edge)| (EdgeId::from_raw(idx as u32), edge))
                .collect(),
        )
    }
}

/// Computes the canonical form of a topology.
///
/// Nodes are first partitioned by iterated colour refinement; the lexically
/// smallest edge encoding over all orderings that respect the partition is
/// the canonical form.
pub fn canonical_form(topology: &Topology) -> CanonicalTopology {
    let nodes: Vec<NodeId> = topology.nodes().iter().copied().collect();
    let index: BTreeMap<NodeId, usize> = nodes
        .iter()
        .enumerate()
        .map(|(idx, node)| (*node, idx))
        .collect();
    let colours = refine_colours(topology, &nodes, &index);

    let mut classes: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
    for (idx, colour) in colours.iter().enumerate() {
        classes.entry(*colour).or_default().push(idx);
    }

    let encode = |position: &[u32]| -> Vec<EncodedEdge> {
        let mut encoded: Vec<EncodedEdge> = topology
            .edges()
            .values()
            .map(|edge| {
                (
                    edge.originating_node.map(|node| position[index[&node]]),
                    edge.ending_node.map(|node| position[index[&node]]),
                )
            })
            .collect();
        encoded.sort();
        encoded
    };

    let mut best: Option<Vec<EncodedEdge>> = None;
    if nodes.is_empty() {
        best = Some(encode(&[]));
    } else {
        let class_orderings: Vec<Vec<Vec<usize>>> = classes
            .values()
            .map(|members| members.iter().copied().permutations(members.len()).collect())
            .collect();
        for choice in class_orderings
            .iter()
            .map(|orderings| orderings.iter())
            .multi_cartesian_product()
        {
            let mut position = vec![0u32; nodes.len()];
            for (pos, node_idx) in choice.into_iter().flatten().enumerate() {
                position[*node_idx] = pos as u32;
            }
            let encoded = encode(&position);
            if best.as_ref().map_or(true, |current| encoded < *current) {
                best = Some(encoded);
            }
        }
    }

    CanonicalTopology {
        node_count: nodes.len() as u32,
        edges: best.unwrap_or_default(),
    }
}

fn refine_colours(
    topology: &Topology,
    nodes: &[NodeId],
    index: &BTreeMap<NodeId, usize>,
) -> Vec<usize> {
    let initial: Vec<(usize, usize, usize, usize)> = nodes
        .iter()
        .map(|node| {
            let ingoing = topology.edges_ingoing_to(*node);
            let outgoing = topology.edges_outgoing_from(*node);
            let external_in = ingoing
                .iter()
                .filter(|edge| topology.edges()[*edge].is_initial_state())
                .count();
            let external_out = outgoing
                .iter()
                .filter(|edge| topology.edges()[*edge].is_final_state())
                .count();
            (
                external_in,
                ingoing.len() - external_in,
                external_out,
                outgoing.len() - external_out,
            )
        })
        .collect();
    let mut colours = rank(&initial);

    loop {
        let class_count = colours.iter().collect::<BTreeSet<_>>().len();
        let signatures: Vec<(usize, Vec<(u8, usize)>)> = nodes
            .iter()
            .enumerate()
            .map(|(idx, node)| {
                let mut neighbours = Vec::new();
                for edge in topology.edges().values() {
                    match (edge.originating_node, edge.ending_node) {
                        (Some(from), Some(to)) if to == *node => {
                            neighbours.push((0u8, colours[index[&from]]));
                        }
                        (Some(from), Some(to)) if from == *node => {
                            neighbours.push((1u8, colours[index[&to]]));
                        }
                        _ => {}
                    }
                }
                neighbours.sort_unstable();
                (colours[idx], neighbours)
            })
            .collect();
        let refined = rank(&signatures);
        let refined_count = refined.iter().collect::<BTreeSet<_>>().len();
        colours = refined;
        if refined_count == class_count {
            return colours;
        }
    }
}

fn rank<T: Ord + Clone>(signatures: &[T]) -> Vec<usize> {
    let distinct: Vec<T> = signatures
        .iter()
        .cloned()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    signatures
        .iter()
        .map(|signature| distinct.binary_search(signature).unwrap_or_default())
        .collect()
}

/// Returns whether two topologies are isomorphic.
pub fn are_isomorphic(first: &Topology, second: &Topology) -> bool {
    first.nodes().len() == second.nodes().len()
        && first.edges().len() == second.edges().len()
        && canonical_form(first) == canonical_form(second)
}

/// Computes a stable SHA-256 fingerprint of the topology's canonical form.
pub fn canonical_hash(topology: &Topology) -> String {
    let form = canonical_form(topology);
    let mut hasher = Sha256::new();
    hasher.update(u64::from(form.node_count).to_le_bytes());
    hasher.update((form.edges.len() as u64).to_le_bytes());
    for (from, to) in &form.edges {
        hasher.update(from.map_or(u64::MAX, u64::from).to_le_bytes());
        hasher.update(to.map_or(u64::MAX, u64::from).to_le_bytes());
    }
    format!("{:x}", hasher.finalize())
}
