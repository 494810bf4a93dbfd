//! Interaction regimes: which rules a node obeys and which quantum numbers
//! the search may put on its edges and on the node itself.

use std::collections::BTreeMap;
use std::fmt::{self, Display};

use itertools::Itertools;
use rxn_core::{HalfInteger, Parity, Particle};
use rxn_rules::{AdditiveQuantumNumber, ConservationRule};
use rxn_topology::InteractionProperties;
use serde::{Deserialize, Serialize};

use crate::config::{Formalism, SolverConfig};

/// A fundamental interaction a node can proceed through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InteractionType {
    /// Strong interaction.
    Strong,
    /// Electromagnetic interaction.
    Electromagnetic,
    /// Weak interaction.
    Weak,
}

impl InteractionType {
    /// Relative strength used to order branches.
    pub fn strength(self) -> f64 {
        match self {
            InteractionType::Strong => 60.0,
            InteractionType::Electromagnetic => 1.0,
            InteractionType::Weak => 1e-4,
        }
    }
}

impl Display for InteractionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InteractionType::Strong => f.write_str("strong"),
            InteractionType::Electromagnetic => f.write_str("electromagnetic"),
            InteractionType::Weak => f.write_str("weak"),
        }
    }
}

/// Inclusive integer range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bounds {
    /// Smallest admitted value.
    pub min: i32,
    /// Largest admitted value.
    pub max: i32,
}

impl Bounds {
    /// `-limit..=limit`.
    pub const fn symmetric(limit: i32) -> Self {
        Self {
            min: -limit,
            max: limit,
        }
    }

    /// Returns whether the value lies inside.
    pub fn contains(&self, value: i32) -> bool {
        (self.min..=self.max).contains(&value)
    }
}

/// Quantum-number ranges an intermediate particle must fall into.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeDomain {
    /// Electric charge.
    pub charge: Bounds,
    /// Baryon number.
    pub baryon_number: Bounds,
    /// Each of the three lepton numbers.
    pub lepton_number: Bounds,
    /// Strangeness.
    pub strangeness: Bounds,
    /// Charm.
    pub charmness: Bounds,
    /// Bottomness.
    pub bottomness: Bounds,
    /// Largest spin magnitude.
    pub max_spin: HalfInteger,
    /// Largest isospin magnitude.
    pub max_isospin: HalfInteger,
}

impl Default for EdgeDomain {
    fn default() -> Self {
        Self {
            charge: Bounds::symmetric(2),
            baryon_number: Bounds::symmetric(1),
            lepton_number: Bounds::symmetric(1),
            strangeness: Bounds::symmetric(3),
            charmness: Bounds::symmetric(1),
            bottomness: Bounds::symmetric(1),
            max_spin: HalfInteger::integer(4),
            max_isospin: HalfInteger::from_doubled(3),
        }
    }
}

impl EdgeDomain {
    /// Returns whether the particle may occupy an intermediate line.
    pub fn admits(&self, particle: &Particle) -> bool {
        self.charge.contains(particle.charge)
            && self.baryon_number.contains(particle.baryon_number)
            && self.lepton_number.contains(particle.electron_lepton_number)
            && self.lepton_number.contains(particle.muon_lepton_number)
            && self.lepton_number.contains(particle.tau_lepton_number)
            && self.strangeness.contains(particle.strangeness)
            && self.charmness.contains(particle.charmness)
            && self.bottomness.contains(particle.bottomness)
            && particle.spin <= self.max_spin
            && particle
                .isospin
                .map_or(true, |isospin| isospin.magnitude() <= self.max_isospin)
    }
}

/// Values the search tries for the node quantum numbers. An empty list
/// leaves the quantum number undefined.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeDomain {
    /// Orbital angular momentum magnitudes.
    pub l_magnitudes: Vec<HalfInteger>,
    /// Orbital angular momentum projections.
    pub l_projections: Vec<HalfInteger>,
    /// Coupled spin magnitudes.
    pub s_magnitudes: Vec<HalfInteger>,
    /// Coupled spin projections.
    pub s_projections: Vec<HalfInteger>,
    /// Helicity parity prefactors.
    pub parity_prefactors: Vec<Parity>,
}

fn optional_values<T: Copy>(values: &[T]) -> Vec<Option<T>> {
    if values.is_empty() {
        vec![None]
    } else {
        values.iter().copied().map(Some).collect()
    }
}

impl NodeDomain {
    /// Every node assignment in the domain, in a fixed order.
    pub fn combinations(&self) -> Vec<InteractionProperties> {
        let l_magnitudes = optional_values(&self.l_magnitudes);
        let l_projections = optional_values(&self.l_projections);
        let s_magnitudes = optional_values(&self.s_magnitudes);
        let s_projections = optional_values(&self.s_projections);
        let prefactors = optional_values(&self.parity_prefactors);
        l_magnitudes
            .iter()
            .cartesian_product(l_projections.iter())
            .cartesian_product(s_magnitudes.iter())
            .cartesian_product(s_projections.iter())
            .cartesian_product(prefactors.iter())
            .map(
                |((((l_magnitude, l_projection), s_magnitude), s_projection), prefactor)| {
                    InteractionProperties {
                        l_magnitude: *l_magnitude,
                        l_projection: *l_projection,
                        s_magnitude: *s_magnitude,
                        s_projection: *s_projection,
                        parity_prefactor: *prefactor,
                    }
                },
            )
            .collect()
    }
}

/// Everything a node needs to know about its regime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InteractionSettings {
    /// The regime.
    pub interaction_type: InteractionType,
    /// Strength factor contributed to a branch.
    pub strength: f64,
    /// Rules every node in this regime must pass.
    pub conservation_rules: Vec<ConservationRule>,
    /// Admissible intermediate particles.
    pub edge_domain: EdgeDomain,
    /// Node quantum numbers to try.
    pub node_domain: NodeDomain,
}

impl InteractionSettings {
    /// Returns whether the regime enforces the rule.
    pub fn enforces(&self, rule: ConservationRule) -> bool {
        self.conservation_rules.contains(&rule)
    }
}

fn formalism_rules(formalism: Formalism) -> Vec<ConservationRule> {
    match formalism {
        Formalism::Helicity => vec![
            ConservationRule::SpinMagnitudeConservation,
            ConservationRule::HelicityConservation,
        ],
        Formalism::CanonicalHelicity => vec![
            ConservationRule::SpinMagnitudeConservation,
            ConservationRule::ClebschGordanHelicityToCanonical,
            ConservationRule::HelicityConservation,
        ],
    }
}

fn node_domain(config: &SolverConfig, with_prefactor: bool) -> NodeDomain {
    let l_max = HalfInteger::integer(config.max_angular_momentum as i32);
    NodeDomain {
        l_magnitudes: HalfInteger::ZERO.up_to(l_max).collect(),
        l_projections: match config.formalism {
            Formalism::Helicity => Vec::new(),
            Formalism::CanonicalHelicity => vec![HalfInteger::ZERO],
        },
        s_magnitudes: HalfInteger::ZERO
            .up_to_in_halves(config.max_spin_magnitude)
            .collect(),
        s_projections: Vec::new(),
        parity_prefactors: if with_prefactor {
            vec![Parity::Minus, Parity::Plus]
        } else {
            Vec::new()
        },
    }
}

/// Builds the three regimes for a configuration. Each regime includes the
/// rules of the weaker ones.
pub fn create_interaction_settings(
    config: &SolverConfig,
) -> BTreeMap<InteractionType, InteractionSettings> {
    let mut weak_rules = formalism_rules(config.formalism);
    weak_rules.extend([
        ConservationRule::Additive(AdditiveQuantumNumber::Charge),
        ConservationRule::Additive(AdditiveQuantumNumber::ElectronLeptonNumber),
        ConservationRule::Additive(AdditiveQuantumNumber::MuonLeptonNumber),
        ConservationRule::Additive(AdditiveQuantumNumber::TauLeptonNumber),
        ConservationRule::Additive(AdditiveQuantumNumber::BaryonNumber),
        ConservationRule::IdenticalParticleSymmetrization,
        ConservationRule::GellMannNishijima,
    ]);
    if config.use_mass_conservation {
        weak_rules.push(ConservationRule::MassConservation);
    }

    let helicity_parity = config.formalism == Formalism::Helicity;
    let mut em_rules = weak_rules.clone();
    em_rules.extend([
        ConservationRule::Additive(AdditiveQuantumNumber::Charmness),
        ConservationRule::Additive(AdditiveQuantumNumber::Strangeness),
        ConservationRule::Additive(AdditiveQuantumNumber::Bottomness),
        ConservationRule::ParityConservation,
        ConservationRule::CParityConservation,
    ]);
    if helicity_parity {
        em_rules.push(ConservationRule::ParityConservationHelicity);
    }

    let mut strong_rules = em_rules.clone();
    strong_rules.extend([
        ConservationRule::IsospinConservation,
        ConservationRule::GParityConservation,
    ]);

    [
        (InteractionType::Weak, weak_rules, false),
        (InteractionType::Electromagnetic, em_rules, helicity_parity),
        (InteractionType::Strong, strong_rules, helicity_parity),
    ]
    .into_iter()
    .map(|(interaction_type, conservation_rules, with_prefactor)| {
        (
            interaction_type,
            InteractionSettings {
                interaction_type,
                strength: interaction_type.strength(),
                conservation_rules,
                edge_domain: EdgeDomain::default(),
                node_domain: node_domain(config, with_prefactor),
            },
        )
    })
    .collect()
}

/// Narrows the caller's regimes for a node from the external particles
/// attached to it: photons and charged leptons rule out the strong
/// interaction and neutrinos leave only the weak one.
pub fn determine_node_regimes(
    allowed: &[InteractionType],
    adjacent_external: &[&Particle],
) -> Vec<InteractionType> {
    let has_neutrino = adjacent_external.iter().any(|p| p.is_neutrino());
    let excludes_strong = adjacent_external
        .iter()
        .any(|p| p.is_photon() || (p.is_lepton() && p.charge != 0));
    allowed
        .iter()
        .copied()
        .unique()
        .filter(|regime| match regime {
            InteractionType::Weak => true,
            InteractionType::Electromagnetic => !has_neutrino,
            InteractionType::Strong => !has_neutrino && !excludes_strong,
        })
        .collect()
}
