//! Solver configuration and the caller's reaction request.

use rxn_core::{ErrorInfo, HalfInteger, RxnError};
use rxn_rules::RuleParameters;
use serde::{Deserialize, Serialize};

use crate::settings::InteractionType;

fn config_error(code: &str, message: impl Into<String>) -> RxnError {
    RxnError::Config(ErrorInfo::new(code, message))
}

/// Amplitude basis the solutions are produced for.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "kebab-case")]
pub enum Formalism {
    /// Helicity basis; orbital and coupled spin are not part of a solution.
    #[default]
    Helicity,
    /// Helicity amplitudes expanded in the canonical (L, S) basis.
    CanonicalHelicity,
}

/// Which topologies the search runs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum TopologyBuilding {
    /// Sequential two-body decays.
    #[default]
    Isobar,
    /// A single vertex joining all legs.
    NBody,
}

/// How far the search goes through the interaction-strength groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum SolvingMode {
    /// Stop after the strongest group that has any solution.
    #[default]
    Fast,
    /// Solve every group and merge the solutions.
    Full,
}

/// Tuning knobs of one search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolverConfig {
    /// Amplitude basis.
    #[serde(default)]
    pub formalism: Formalism,
    /// Topology family.
    #[serde(default)]
    pub topology_building: TopologyBuilding,
    /// Strength-group traversal.
    #[serde(default)]
    pub solving_mode: SolvingMode,
    /// Size of the worker pool.
    #[serde(default = "default_threads")]
    pub number_of_threads: usize,
    /// Wall-clock budget for dispatching branches, in milliseconds.
    #[serde(default)]
    pub timeout_ms: Option<u64>,
    /// Number of widths the mass rule tolerates.
    #[serde(default = "default_mass_width_factor")]
    pub mass_width_factor: f64,
    /// Whether the mass rule is part of every regime.
    #[serde(default = "default_true")]
    pub use_mass_conservation: bool,
    /// Largest orbital angular momentum tried at a node.
    #[serde(default = "default_max_angular_momentum")]
    pub max_angular_momentum: u32,
    /// Largest coupled spin magnitude tried at a node.
    #[serde(default = "default_max_spin_magnitude")]
    pub max_spin_magnitude: HalfInteger,
}

fn default_threads() -> usize {
    1
}

fn default_mass_width_factor() -> f64 {
    RuleParameters::default().mass_width_factor
}

fn default_true() -> bool {
    true
}

fn default_max_angular_momentum() -> u32 {
    2
}

fn default_max_spin_magnitude() -> HalfInteger {
    HalfInteger::integer(2)
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            formalism: Formalism::default(),
            topology_building: TopologyBuilding::default(),
            solving_mode: SolvingMode::default(),
            number_of_threads: default_threads(),
            timeout_ms: None,
            mass_width_factor: default_mass_width_factor(),
            use_mass_conservation: true,
            max_angular_momentum: default_max_angular_momentum(),
            max_spin_magnitude: default_max_spin_magnitude(),
        }
    }
}

impl SolverConfig {
    /// Parses and validates a YAML document.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, RxnError> {
        let config: SolverConfig = serde_yaml::from_str(yaml)
            .map_err(|err| config_error("yaml-deserialize", err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Serializes the configuration to YAML.
    pub fn to_yaml_string(&self) -> Result<String, RxnError> {
        serde_yaml::to_string(self)
            .map_err(|err| RxnError::Serde(ErrorInfo::new("yaml-serialize", err.to_string())))
    }

    /// Checks the numeric fields.
    pub fn validate(&self) -> Result<(), RxnError> {
        if self.number_of_threads == 0 {
            return Err(config_error(
                "invalid-thread-count",
                "the worker pool needs at least one thread",
            ));
        }
        if !self.mass_width_factor.is_finite() || self.mass_width_factor < 0.0 {
            return Err(config_error(
                "invalid-mass-width-factor",
                "the mass width factor must be a finite non-negative number",
            )
            .with_context("mass_width_factor", self.mass_width_factor));
        }
        if self.max_spin_magnitude.is_negative() {
            return Err(config_error(
                "invalid-spin-bound",
                "the coupled spin bound must not be negative",
            )
            .with_context("max_spin_magnitude", self.max_spin_magnitude));
        }
        Ok(())
    }

    /// Rule tuning derived from this configuration.
    pub fn rule_parameters(&self) -> RuleParameters {
        RuleParameters {
            mass_width_factor: self.mass_width_factor,
        }
    }
}

/// One external leg: a particle name and optionally the projections to try.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateDefinition {
    /// Catalog name of the particle.
    pub name: String,
    /// Spin projections to enumerate; all allowed ones when absent.
    #[serde(default)]
    pub spin_projections: Option<Vec<HalfInteger>>,
}

impl StateDefinition {
    /// A leg that tries every allowed projection.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            spin_projections: None,
        }
    }

    /// A leg restricted to the given projections.
    pub fn with_projections(
        name: impl Into<String>,
        projections: &[f64],
    ) -> Result<Self, RxnError> {
        let spin_projections = projections
            .iter()
            .map(|value| HalfInteger::try_from_f64(*value))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            name: name.into(),
            spin_projections: Some(spin_projections),
        })
    }
}

impl From<&str> for StateDefinition {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

/// Final-state particles that must decay from a common vertex, one list per
/// vertex. A grouping is satisfied when every list is matched by some node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FinalStateGrouping(pub Vec<Vec<String>>);

impl FinalStateGrouping {
    /// Builds a grouping from name lists.
    pub fn new<G, S>(groups: impl IntoIterator<Item = G>) -> Self
    where
        G: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(
            groups
                .into_iter()
                .map(|group| group.into_iter().map(Into::into).collect())
                .collect(),
        )
    }

    /// Groups with their names sorted, for order-insensitive comparison.
    pub fn sorted_groups(&self) -> Vec<Vec<String>> {
        self.0
            .iter()
            .map(|group| {
                let mut sorted = group.clone();
                sorted.sort();
                sorted
            })
            .collect()
    }
}

/// The reaction to solve.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReactionSpec {
    /// Initial-state legs, in edge order.
    pub initial_state: Vec<StateDefinition>,
    /// Final-state legs, in edge order.
    pub final_state: Vec<StateDefinition>,
    /// Alternative groupings of the final state; empty allows every one.
    #[serde(default)]
    pub final_state_groupings: Vec<FinalStateGrouping>,
    /// Name fragments selecting intermediate candidates; empty selects the
    /// whole catalog.
    #[serde(default)]
    pub allowed_intermediate_particles: Vec<String>,
    /// Interaction regimes the nodes may use, in order of preference.
    #[serde(default = "default_interaction_types")]
    pub allowed_interaction_types: Vec<InteractionType>,
}

fn default_interaction_types() -> Vec<InteractionType> {
    vec![
        InteractionType::Strong,
        InteractionType::Electromagnetic,
        InteractionType::Weak,
    ]
}

impl ReactionSpec {
    /// A reaction between the named particles with every regime allowed.
    pub fn new<I, F>(initial_state: I, final_state: F) -> Self
    where
        I: IntoIterator,
        I::Item: Into<StateDefinition>,
        F: IntoIterator,
        F::Item: Into<StateDefinition>,
    {
        Self {
            initial_state: initial_state.into_iter().map(Into::into).collect(),
            final_state: final_state.into_iter().map(Into::into).collect(),
            final_state_groupings: Vec::new(),
            allowed_intermediate_particles: Vec::new(),
            allowed_interaction_types: default_interaction_types(),
        }
    }

    /// Adds an accepted final-state grouping.
    pub fn with_grouping(mut self, grouping: FinalStateGrouping) -> Self {
        self.final_state_groupings.push(grouping);
        self
    }

    /// Restricts intermediate candidates by name fragment.
    pub fn with_intermediate_particles<S: Into<String>>(
        mut self,
        fragments: impl IntoIterator<Item = S>,
    ) -> Self {
        self.allowed_intermediate_particles = fragments.into_iter().map(Into::into).collect();
        self
    }

    /// Replaces the allowed interaction regimes.
    pub fn with_interaction_types(mut self, types: &[InteractionType]) -> Self {
        self.allowed_interaction_types = types.to_vec();
        self
    }

    /// Parses a YAML document.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, RxnError> {
        serde_yaml::from_str(yaml).map_err(|err| config_error("yaml-deserialize", err.to_string()))
    }
}
