use rxn_core::RxnError;
use serde::{Deserialize, Serialize};

use crate::topology::topology_error;

/// Vertex template used while building topologies: how many lines enter and
/// leave an interaction node of this kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct InteractionNode {
    ingoing: usize,
    outgoing: usize,
}

impl InteractionNode {
    /// Creates a template; both degrees must be positive.
    pub fn new(ingoing: usize, outgoing: usize) -> Result<Self, RxnError> {
        if ingoing == 0 || outgoing == 0 {
            return Err(topology_error(
                "invalid-topology-request",
                "interaction node degrees must be positive",
            )
            .with_context("ingoing", ingoing)
            .with_context("outgoing", outgoing));
        }
        Ok(Self { ingoing, outgoing })
    }

    /// The 1 → 2 vertex of the isobar model.
    pub fn binary_decay() -> Self {
        Self {
            ingoing: 1,
            outgoing: 2,
        }
    }

    /// Number of ingoing lines.
    pub fn ingoing(&self) -> usize {
        self.ingoing
    }

    /// Number of outgoing lines.
    pub fn outgoing(&self) -> usize {
        self.outgoing
    }
}
