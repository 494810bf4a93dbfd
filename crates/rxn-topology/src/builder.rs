use std::collections::{BTreeMap, BTreeSet};

use itertools::Itertools;
use rxn_core::{EdgeId, NodeId, RxnError};

use crate::canonical::{canonical_form, CanonicalTopology};
use crate::node::InteractionNode;
use crate::topology::{topology_error, Topology, TopologyDraft};

fn check_leg_counts(number_of_initial: usize, number_of_final: usize) -> Result<(), RxnError> {
    if number_of_initial == 0 || number_of_final == 0 {
        return Err(topology_error(
            "invalid-topology-request",
            "a topology needs at least one initial and one final leg",
        )
        .with_context("initial", number_of_initial)
        .with_context("final", number_of_final));
    }
    Ok(())
}

/// Grows topologies node by node from a set of vertex templates and keeps
/// one representative per isomorphism class.
#[derive(Debug, Clone)]
pub struct SimpleTopologyBuilder {
    templates: Vec<InteractionNode>,
}

impl SimpleTopologyBuilder {
    /// Creates a builder. Every template must produce more lines than it
    /// consumes, otherwise growth would not terminate.
    pub fn new(templates: Vec<InteractionNode>) -> Result<Self, RxnError> {
        if templates.is_empty() {
            return Err(topology_error(
                "invalid-topology-request",
                "at least one interaction node template is required",
            ));
        }
        if let Some(template) = templates
            .iter()
            .find(|template| template.outgoing() <= template.ingoing())
        {
            return Err(topology_error(
                "invalid-topology-request",
                "interaction node templates must have more outgoing than ingoing lines",
            )
            .with_context("ingoing", template.ingoing())
            .with_context("outgoing", template.outgoing()));
        }
        Ok(Self { templates })
    }

    /// Builds every inequivalent topology connecting the requested legs.
    ///
    /// Several initial legs are first merged into a single line by one
    /// `n_initial → 1` vertex, which then decays through the templates.
    pub fn build(
        &self,
        number_of_initial: usize,
        number_of_final: usize,
    ) -> Result<Vec<Topology>, RxnError> {
        check_leg_counts(number_of_initial, number_of_final)?;

        let mut seed = TopologyDraft::new();
        let initial: Vec<EdgeId> = (0..number_of_initial as u32).map(EdgeId::from_raw).collect();
        seed.add_edges(&initial)?;
        if number_of_initial > 1 {
            let merge = seed.next_node_id();
            seed.add_node(merge)?;
            seed.attach_edges_to_node_ingoing(&initial, merge)?;
            let merged = seed.next_edge_id();
            seed.add_edges(&[merged])?;
            seed.attach_edges_to_node_outgoing(&[merged], merge)?;
        }

        let mut complete: BTreeSet<CanonicalTopology> = BTreeSet::new();
        let mut frontier: BTreeMap<CanonicalTopology, TopologyDraft> = BTreeMap::new();
        if number_of_initial > 1 {
            let topology = seed.freeze()?;
            frontier.insert(canonical_form(&topology), TopologyDraft::from(&topology));
        } else {
            for grown in self.grow(&seed)? {
                frontier.insert(canonical_form(&grown), TopologyDraft::from(&grown));
            }
        }

        while !frontier.is_empty() {
            let mut next = BTreeMap::new();
            for (form, draft) in frontier {
                let open = draft.open_edges().len();
                if open == number_of_final {
                    complete.insert(form);
                    continue;
                }
                if open > number_of_final {
                    continue;
                }
                for grown in self.grow(&draft)? {
                    next.entry(canonical_form(&grown))
                        .or_insert_with(|| TopologyDraft::from(&grown));
                }
            }
            frontier = next;
        }

        if complete.is_empty() {
            tracing::warn!(
                initial_legs = number_of_initial,
                final_legs = number_of_final,
                "no topology connects the requested legs"
            );
        }
        let topologies = complete
            .iter()
            .map(CanonicalTopology::to_topology)
            .collect::<Result<Vec<_>, _>>()?;
        tracing::debug!(count = topologies.len(), "built topologies");
        Ok(topologies)
    }

    /// Attaches one more vertex to the open ends of `draft`, in every way
    /// the templates allow.
    fn grow(&self, draft: &TopologyDraft) -> Result<Vec<Topology>, RxnError> {
        let open = draft.open_edges();
        let mut grown = Vec::new();
        for template in &self.templates {
            for ingoing in open.iter().copied().combinations(template.ingoing()) {
                let mut extended = draft.clone();
                let node = extended.next_node_id();
                extended.add_node(node)?;
                extended.attach_edges_to_node_ingoing(&ingoing, node)?;
                let first = extended.next_edge_id().as_raw();
                let outgoing: Vec<EdgeId> = (first..first + template.outgoing() as u32)
                    .map(EdgeId::from_raw)
                    .collect();
                extended.add_edges(&outgoing)?;
                extended.attach_edges_to_node_outgoing(&outgoing, node)?;
                grown.push(extended.freeze()?);
            }
        }
        Ok(grown)
    }
}

/// Builds all inequivalent isobar (sequential 1 → 2) topologies.
pub fn create_isobar_topologies(
    number_of_initial: usize,
    number_of_final: usize,
) -> Result<Vec<Topology>, RxnError> {
    SimpleTopologyBuilder::new(vec![InteractionNode::binary_decay()])?
        .build(number_of_initial, number_of_final)
}

/// Builds the single-vertex topology with all legs attached to one node.
pub fn create_n_body_topology(
    number_of_initial: usize,
    number_of_final: usize,
) -> Result<Topology, RxnError> {
    check_leg_counts(number_of_initial, number_of_final)?;
    let node = NodeId::from_raw(0);
    let mut draft = TopologyDraft::new();
    draft.add_node(node)?;
    let initial: Vec<EdgeId> = (0..number_of_initial as u32).map(EdgeId::from_raw).collect();
    let last = (number_of_initial + number_of_final) as u32;
    let outgoing: Vec<EdgeId> = (number_of_initial as u32..last)
        .map(EdgeId::from_raw)
        .collect();
    draft.add_edges(&initial)?;
    draft.add_edges(&outgoing)?;
    draft.attach_edges_to_node_ingoing(&initial, node)?;
    draft.attach_edges_to_node_outgoing(&outgoing, node)?;
    draft.freeze()
}
