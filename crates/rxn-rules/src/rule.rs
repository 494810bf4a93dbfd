use std::fmt::{self, Display};

use rxn_core::{Particle, QuantumNumberKind, State};
use rxn_topology::InteractionProperties;
use serde::{Deserialize, Serialize};

use crate::{additive, mass, parity, spin};

/// Integer quantum numbers that add up across a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdditiveQuantumNumber {
    /// Electric charge.
    Charge,
    /// Baryon number.
    BaryonNumber,
    /// Electron lepton number.
    ElectronLeptonNumber,
    /// Muon lepton number.
    MuonLeptonNumber,
    /// Tau lepton number.
    TauLeptonNumber,
    /// Strangeness.
    Strangeness,
    /// Charm.
    Charmness,
    /// Bottomness.
    Bottomness,
}

impl AdditiveQuantumNumber {
    /// Every additive quantum number.
    pub const ALL: [AdditiveQuantumNumber; 8] = [
        AdditiveQuantumNumber::Charge,
        AdditiveQuantumNumber::BaryonNumber,
        AdditiveQuantumNumber::ElectronLeptonNumber,
        AdditiveQuantumNumber::MuonLeptonNumber,
        AdditiveQuantumNumber::TauLeptonNumber,
        AdditiveQuantumNumber::Strangeness,
        AdditiveQuantumNumber::Charmness,
        AdditiveQuantumNumber::Bottomness,
    ];

    /// Reads the value from an edge state.
    pub fn value_of(self, state: &State) -> i32 {
        self.value_for(state.particle())
    }

    /// Reads the value from a particle.
    pub fn value_for(self, particle: &Particle) -> i32 {
        match self {
            AdditiveQuantumNumber::Charge => particle.charge,
            AdditiveQuantumNumber::BaryonNumber => particle.baryon_number,
            AdditiveQuantumNumber::ElectronLeptonNumber => particle.electron_lepton_number,
            AdditiveQuantumNumber::MuonLeptonNumber => particle.muon_lepton_number,
            AdditiveQuantumNumber::TauLeptonNumber => particle.tau_lepton_number,
            AdditiveQuantumNumber::Strangeness => particle.strangeness,
            AdditiveQuantumNumber::Charmness => particle.charmness,
            AdditiveQuantumNumber::Bottomness => particle.bottomness,
        }
    }

    /// The matching [`QuantumNumberKind`].
    pub fn kind(self) -> QuantumNumberKind {
        match self {
            AdditiveQuantumNumber::Charge => QuantumNumberKind::Charge,
            AdditiveQuantumNumber::BaryonNumber => QuantumNumberKind::BaryonNumber,
            AdditiveQuantumNumber::ElectronLeptonNumber => QuantumNumberKind::ElectronLeptonNumber,
            AdditiveQuantumNumber::MuonLeptonNumber => QuantumNumberKind::MuonLeptonNumber,
            AdditiveQuantumNumber::TauLeptonNumber => QuantumNumberKind::TauLeptonNumber,
            AdditiveQuantumNumber::Strangeness => QuantumNumberKind::Strangeness,
            AdditiveQuantumNumber::Charmness => QuantumNumberKind::Charmness,
            AdditiveQuantumNumber::Bottomness => QuantumNumberKind::Bottomness,
        }
    }
}

/// Identity of a conservation rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConservationRule {
    /// Sum of an additive quantum number is conserved.
    Additive(AdditiveQuantumNumber),
    /// `P_in == P_out * (-1)^L` at two-body vertices.
    ParityConservation,
    /// Parity relation between helicity amplitudes of a 1 → 2 decay.
    ParityConservationHelicity,
    /// C-parity, derived for particle/antiparticle pairs when undefined.
    CParityConservation,
    /// G-parity, derived for particle/antiparticle pairs when undefined.
    GParityConservation,
    /// Identical outgoing particles constrain the parent parity.
    IdenticalParticleSymmetrization,
    /// Isospin coupling and third-component conservation.
    IsospinConservation,
    /// Spin coupling with projections through L and S.
    SpinConservation,
    /// Spin coupling with magnitudes only.
    SpinMagnitudeConservation,
    /// Helicity to canonical basis Clebsch–Gordan selection rules.
    ClebschGordanHelicityToCanonical,
    /// Helicity difference bounded by the parent spin.
    HelicityConservation,
    /// `Q = I3 + Y/2` for every hadron on the node.
    GellMannNishijima,
    /// Outgoing rest mass must fit below the parent within `k` widths.
    MassConservation,
}

use QuantumNumberKind as Q;

impl ConservationRule {
    /// Stable snake case name of the rule.
    pub fn name(&self) -> &'static str {
        match self {
            ConservationRule::Additive(number) => match number {
                AdditiveQuantumNumber::Charge => "charge_conservation",
                AdditiveQuantumNumber::BaryonNumber => "baryon_number_conservation",
                AdditiveQuantumNumber::ElectronLeptonNumber => {
                    "electron_lepton_number_conservation"
                }
                AdditiveQuantumNumber::MuonLeptonNumber => "muon_lepton_number_conservation",
                AdditiveQuantumNumber::TauLeptonNumber => "tau_lepton_number_conservation",
                AdditiveQuantumNumber::Strangeness => "strangeness_conservation",
                AdditiveQuantumNumber::Charmness => "charm_conservation",
                AdditiveQuantumNumber::Bottomness => "bottomness_conservation",
            },
            ConservationRule::ParityConservation => "parity_conservation",
            ConservationRule::ParityConservationHelicity => "parity_conservation_helicity",
            ConservationRule::CParityConservation => "c_parity_conservation",
            ConservationRule::GParityConservation => "g_parity_conservation",
            ConservationRule::IdenticalParticleSymmetrization => {
                "identical_particle_symmetrization"
            }
            ConservationRule::IsospinConservation => "isospin_conservation",
            ConservationRule::SpinConservation => "spin_conservation",
            ConservationRule::SpinMagnitudeConservation => "spin_magnitude_conservation",
            ConservationRule::ClebschGordanHelicityToCanonical => {
                "clebsch_gordan_helicity_to_canonical"
            }
            ConservationRule::HelicityConservation => "helicity_conservation",
            ConservationRule::GellMannNishijima => "gellmann_nishijima",
            ConservationRule::MassConservation => "mass_conservation",
        }
    }

    /// Quantum numbers the rule cannot do without. Optional inputs (for
    /// example an undefined C-parity that the rule derives itself) are not
    /// listed.
    pub fn required_quantum_numbers(&self) -> &'static [QuantumNumberKind] {
        match self {
            ConservationRule::Additive(AdditiveQuantumNumber::Charge) => &[Q::Charge],
            ConservationRule::Additive(AdditiveQuantumNumber::BaryonNumber) => &[Q::BaryonNumber],
            ConservationRule::Additive(AdditiveQuantumNumber::ElectronLeptonNumber) => {
                &[Q::ElectronLeptonNumber]
            }
            ConservationRule::Additive(AdditiveQuantumNumber::MuonLeptonNumber) => {
                &[Q::MuonLeptonNumber]
            }
            ConservationRule::Additive(AdditiveQuantumNumber::TauLeptonNumber) => {
                &[Q::TauLeptonNumber]
            }
            ConservationRule::Additive(AdditiveQuantumNumber::Strangeness) => &[Q::Strangeness],
            ConservationRule::Additive(AdditiveQuantumNumber::Charmness) => &[Q::Charmness],
            ConservationRule::Additive(AdditiveQuantumNumber::Bottomness) => &[Q::Bottomness],
            ConservationRule::ParityConservation => &[Q::Parity, Q::LMagnitude],
            ConservationRule::ParityConservationHelicity => {
                &[Q::Parity, Q::SpinMagnitude, Q::SpinProjection, Q::ParityPrefactor]
            }
            ConservationRule::CParityConservation => {
                &[Q::Pid, Q::SpinMagnitude, Q::LMagnitude, Q::SMagnitude]
            }
            ConservationRule::GParityConservation => &[
                Q::Pid,
                Q::SpinMagnitude,
                Q::IsospinMagnitude,
                Q::LMagnitude,
                Q::SMagnitude,
            ],
            ConservationRule::IdenticalParticleSymmetrization => {
                &[Q::Pid, Q::SpinMagnitude, Q::SpinProjection, Q::Parity]
            }
            ConservationRule::IsospinConservation => {
                &[Q::IsospinMagnitude, Q::IsospinProjection]
            }
            ConservationRule::SpinConservation => &[
                Q::SpinMagnitude,
                Q::SpinProjection,
                Q::LMagnitude,
                Q::LProjection,
                Q::SMagnitude,
                Q::SProjection,
            ],
            ConservationRule::SpinMagnitudeConservation => {
                &[Q::SpinMagnitude, Q::LMagnitude, Q::SMagnitude]
            }
            ConservationRule::ClebschGordanHelicityToCanonical => &[
                Q::SpinMagnitude,
                Q::SpinProjection,
                Q::LMagnitude,
                Q::LProjection,
                Q::SMagnitude,
            ],
            ConservationRule::HelicityConservation => &[Q::SpinMagnitude, Q::SpinProjection],
            ConservationRule::GellMannNishijima => &[Q::Charge],
            ConservationRule::MassConservation => &[Q::Mass],
        }
    }

    /// Returns whether the outcome can depend on the node quantum numbers.
    pub fn reads_interaction_properties(&self) -> bool {
        self.required_quantum_numbers()
            .iter()
            .any(|kind| kind.is_node_quantum_number())
    }

    fn first_missing_quantum_number(&self, input: &NodeInput<'_>) -> Option<QuantumNumberKind> {
        self.required_quantum_numbers()
            .iter()
            .copied()
            .find(|kind| {
                if kind.is_node_quantum_number() {
                    !input.interaction.is_defined(*kind)
                } else {
                    !input.states().all(|state| kind.is_defined_on(state))
                }
            })
    }

    /// Evaluates the rule, reporting the first missing quantum number as
    /// the error.
    pub fn evaluate(
        &self,
        input: &NodeInput<'_>,
        parameters: &RuleParameters,
    ) -> Result<bool, QuantumNumberKind> {
        if let Some(missing) = self.first_missing_quantum_number(input) {
            return Err(missing);
        }
        match self {
            ConservationRule::Additive(number) => Ok(additive::is_conserved(*number, input)),
            ConservationRule::ParityConservation => parity::parity_conservation(input),
            ConservationRule::ParityConservationHelicity => parity::helicity_parity(input),
            ConservationRule::CParityConservation => parity::c_parity_conservation(input),
            ConservationRule::GParityConservation => parity::g_parity_conservation(input),
            ConservationRule::IdenticalParticleSymmetrization => {
                parity::identical_particle_symmetrization(input)
            }
            ConservationRule::IsospinConservation => spin::isospin_conservation(input),
            ConservationRule::SpinConservation => spin::spin_conservation(input),
            ConservationRule::SpinMagnitudeConservation => {
                spin::spin_magnitude_conservation(input)
            }
            ConservationRule::ClebschGordanHelicityToCanonical => {
                spin::clebsch_gordan_helicity_to_canonical(input)
            }
            ConservationRule::HelicityConservation => Ok(spin::helicity_conservation(input)),
            ConservationRule::GellMannNishijima => Ok(additive::gell_mann_nishijima(input)),
            ConservationRule::MassConservation => {
                Ok(mass::mass_conservation(input, parameters.mass_width_factor))
            }
        }
    }

    /// Evaluates the rule and folds a missing quantum number into the
    /// outcome.
    pub fn check(&self, input: &NodeInput<'_>, parameters: &RuleParameters) -> RuleOutcome {
        match self.evaluate(input, parameters) {
            Ok(true) => RuleOutcome::Passed,
            Ok(false) => RuleOutcome::Violated,
            Err(quantum_number) => RuleOutcome::Skipped(MissingQuantumNumber {
                rule: *self,
                quantum_number,
            }),
        }
    }
}

impl Display for ConservationRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Caller supplied tuning of the rules.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RuleParameters {
    /// Number of widths by which an outgoing mass sum may exceed the parent.
    #[serde(default = "default_mass_width_factor")]
    pub mass_width_factor: f64,
}

fn default_mass_width_factor() -> f64 {
    3.0
}

impl Default for RuleParameters {
    fn default() -> Self {
        Self {
            mass_width_factor: default_mass_width_factor(),
        }
    }
}

/// The states and node quantum numbers one rule evaluation sees.
#[derive(Debug, Clone, Copy)]
pub struct NodeInput<'a> {
    /// States on the edges entering the node.
    pub ingoing: &'a [&'a State],
    /// States on the edges leaving the node.
    pub outgoing: &'a [&'a State],
    /// Quantum numbers of the node itself.
    pub interaction: &'a InteractionProperties,
}

impl<'a> NodeInput<'a> {
    /// Iterates over ingoing then outgoing states.
    pub fn states(&self) -> impl Iterator<Item = &'a State> + '_ {
        self.ingoing.iter().chain(self.outgoing.iter()).copied()
    }

    /// Returns whether the node is a single two-body decay.
    pub(crate) fn is_one_to_two(&self) -> bool {
        self.ingoing.len() == 1 && self.outgoing.len() == 2
    }

    /// Returns whether the node couples one line to two, in either direction.
    pub(crate) fn is_two_body(&self) -> bool {
        self.is_one_to_two() || (self.ingoing.len() == 2 && self.outgoing.len() == 1)
    }
}

/// A rule that could not run because a quantum number it needs is undefined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MissingQuantumNumber {
    /// The skipped rule.
    pub rule: ConservationRule,
    /// The quantum number that was missing.
    pub quantum_number: QuantumNumberKind,
}

impl Display for MissingQuantumNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} skipped: {} undefined", self.rule, self.quantum_number)
    }
}

/// Outcome of running one rule on one node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleOutcome {
    /// The rule holds.
    Passed,
    /// The rule is broken.
    Violated,
    /// The rule did not run.
    Skipped(MissingQuantumNumber),
}
