//! Typed names for every quantum number the engine reads.

use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};

use crate::particle::State;

/// A quantum number carried either by an edge state or by an interaction node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuantumNumberKind {
    /// PDG identifier.
    Pid,
    /// Rest mass.
    Mass,
    /// Decay width.
    Width,
    /// Electric charge.
    Charge,
    /// Spin magnitude.
    SpinMagnitude,
    /// Spin projection.
    SpinProjection,
    /// Isospin magnitude.
    IsospinMagnitude,
    /// Third isospin component.
    IsospinProjection,
    /// Intrinsic parity.
    Parity,
    /// C-parity.
    CParity,
    /// G-parity.
    GParity,
    /// Strangeness.
    Strangeness,
    /// Charm.
    Charmness,
    /// Bottomness.
    Bottomness,
    /// Topness.
    Topness,
    /// Baryon number.
    BaryonNumber,
    /// Electron lepton number.
    ElectronLeptonNumber,
    /// Muon lepton number.
    MuonLeptonNumber,
    /// Tau lepton number.
    TauLeptonNumber,
    /// Orbital angular momentum magnitude at a node.
    LMagnitude,
    /// Orbital angular momentum projection at a node.
    LProjection,
    /// Coupled spin magnitude at a node.
    SMagnitude,
    /// Coupled spin projection at a node.
    SProjection,
    /// Helicity parity prefactor at a node.
    ParityPrefactor,
}

impl QuantumNumberKind {
    /// Returns whether the quantum number lives on interaction nodes.
    pub fn is_node_quantum_number(self) -> bool {
        matches!(
            self,
            QuantumNumberKind::LMagnitude
                | QuantumNumberKind::LProjection
                | QuantumNumberKind::SMagnitude
                | QuantumNumberKind::SProjection
                | QuantumNumberKind::ParityPrefactor
        )
    }

    /// Returns whether an edge state defines this quantum number. Node
    /// quantum numbers are never defined on edges.
    pub fn is_defined_on(self, state: &State) -> bool {
        let particle = state.particle();
        match self {
            QuantumNumberKind::Width => particle.width.is_some(),
            QuantumNumberKind::IsospinMagnitude | QuantumNumberKind::IsospinProjection => {
                particle.isospin.is_some()
            }
            QuantumNumberKind::Parity => particle.parity.is_some(),
            QuantumNumberKind::CParity => particle.c_parity.is_some(),
            QuantumNumberKind::GParity => particle.g_parity.is_some(),
            kind => !kind.is_node_quantum_number(),
        }
    }

    /// Returns the snake case name of the quantum number.
    pub fn name(self) -> &'static str {
        match self {
            QuantumNumberKind::Pid => "pid",
            QuantumNumberKind::Mass => "mass",
            QuantumNumberKind::Width => "width",
            QuantumNumberKind::Charge => "charge",
            QuantumNumberKind::SpinMagnitude => "spin_magnitude",
            QuantumNumberKind::SpinProjection => "spin_projection",
            QuantumNumberKind::IsospinMagnitude => "isospin_magnitude",
            QuantumNumberKind::IsospinProjection => "isospin_projection",
            QuantumNumberKind::Parity => "parity",
            QuantumNumberKind::CParity => "c_parity",
            QuantumNumberKind::GParity => "g_parity",
            QuantumNumberKind::Strangeness => "strangeness",
            QuantumNumberKind::Charmness => "charmness",
            QuantumNumberKind::Bottomness => "bottomness",
            QuantumNumberKind::Topness => "topness",
            QuantumNumberKind::BaryonNumber => "baryon_number",
            QuantumNumberKind::ElectronLeptonNumber => "electron_lepton_number",
            QuantumNumberKind::MuonLeptonNumber => "muon_lepton_number",
            QuantumNumberKind::TauLeptonNumber => "tau_lepton_number",
            QuantumNumberKind::LMagnitude => "l_magnitude",
            QuantumNumberKind::LProjection => "l_projection",
            QuantumNumberKind::SMagnitude => "s_magnitude",
            QuantumNumberKind::SProjection => "s_projection",
            QuantumNumberKind::ParityPrefactor => "parity_prefactor",
        }
    }
}

impl Display for QuantumNumberKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
