//! Particle definitions, the read-only particle catalog and edge states.

use std::collections::BTreeMap;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::errors::{ErrorInfo, RxnError};
use crate::quantum::{HalfInteger, Parity, Spin};

/// PDG code of the photon.
pub const PHOTON_PID: i64 = 22;

/// Immutable particle definition.
///
/// Two particles are equal when their name and PID agree; the remaining
/// fields are data carried along with that identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Particle {
    /// Unique name used to look the particle up in a catalog.
    pub name: String,
    /// PDG Monte Carlo identifier.
    pub pid: i64,
    /// Rest mass in GeV.
    pub mass: f64,
    /// Decay width in GeV, if known.
    #[serde(default)]
    pub width: Option<f64>,
    /// Electric charge in units of the elementary charge.
    #[serde(default)]
    pub charge: i32,
    /// Spin magnitude.
    pub spin: HalfInteger,
    /// Isospin with its third component, if defined.
    #[serde(default)]
    pub isospin: Option<Spin>,
    /// Intrinsic parity.
    #[serde(default)]
    pub parity: Option<Parity>,
    /// Charge-conjugation parity.
    #[serde(default)]
    pub c_parity: Option<Parity>,
    /// G-parity.
    #[serde(default)]
    pub g_parity: Option<Parity>,
    /// Strangeness.
    #[serde(default)]
    pub strangeness: i32,
    /// Charm.
    #[serde(default)]
    pub charmness: i32,
    /// Bottomness.
    #[serde(default)]
    pub bottomness: i32,
    /// Topness.
    #[serde(default)]
    pub topness: i32,
    /// Baryon number.
    #[serde(default)]
    pub baryon_number: i32,
    /// Electron lepton number.
    #[serde(default)]
    pub electron_lepton_number: i32,
    /// Muon lepton number.
    #[serde(default)]
    pub muon_lepton_number: i32,
    /// Tau lepton number.
    #[serde(default)]
    pub tau_lepton_number: i32,
}

impl Particle {
    /// Creates a particle with the given identity, mass and spin. All other
    /// quantum numbers start at zero or undefined.
    pub fn new(name: impl Into<String>, pid: i64, mass: f64, spin: HalfInteger) -> Self {
        Self {
            name: name.into(),
            pid,
            mass,
            width: None,
            charge: 0,
            spin,
            isospin: None,
            parity: None,
            c_parity: None,
            g_parity: None,
            strangeness: 0,
            charmness: 0,
            bottomness: 0,
            topness: 0,
            baryon_number: 0,
            electron_lepton_number: 0,
            muon_lepton_number: 0,
            tau_lepton_number: 0,
        }
    }

    /// Sets the decay width.
    pub fn with_width(mut self, width: f64) -> Self {
        self.width = Some(width);
        self
    }

    /// Sets the electric charge.
    pub fn with_charge(mut self, charge: i32) -> Self {
        self.charge = charge;
        self
    }

    /// Sets the isospin.
    pub fn with_isospin(mut self, isospin: Spin) -> Self {
        self.isospin = Some(isospin);
        self
    }

    /// Sets the intrinsic parity.
    pub fn with_parity(mut self, parity: Parity) -> Self {
        self.parity = Some(parity);
        self
    }

    /// Sets the C-parity.
    pub fn with_c_parity(mut self, c_parity: Parity) -> Self {
        self.c_parity = Some(c_parity);
        self
    }

    /// Sets the G-parity.
    pub fn with_g_parity(mut self, g_parity: Parity) -> Self {
        self.g_parity = Some(g_parity);
        self
    }

    /// Sets strangeness, charm, bottomness and topness at once.
    pub fn with_flavour(
        mut self,
        strangeness: i32,
        charmness: i32,
        bottomness: i32,
        topness: i32,
    ) -> Self {
        self.strangeness = strangeness;
        self.charmness = charmness;
        self.bottomness = bottomness;
        self.topness = topness;
        self
    }

    /// Sets the baryon number.
    pub fn with_baryon_number(mut self, baryon_number: i32) -> Self {
        self.baryon_number = baryon_number;
        self
    }

    /// Sets the electron, muon and tau lepton numbers.
    pub fn with_lepton_numbers(mut self, electron: i32, muon: i32, tau: i32) -> Self {
        self.electron_lepton_number = electron;
        self.muon_lepton_number = muon;
        self.tau_lepton_number = tau;
        self
    }

    /// Returns whether any lepton number is non-zero.
    pub fn is_lepton(&self) -> bool {
        self.electron_lepton_number != 0
            || self.muon_lepton_number != 0
            || self.tau_lepton_number != 0
    }

    /// Returns whether the particle is a neutral lepton.
    pub fn is_neutrino(&self) -> bool {
        self.is_lepton() && self.charge == 0
    }

    /// Returns whether the particle is the photon.
    pub fn is_photon(&self) -> bool {
        self.pid == PHOTON_PID
    }

    /// Returns whether the spin magnitude is a whole number.
    pub fn is_boson(&self) -> bool {
        self.spin.is_integer()
    }

    /// Returns whether the particle has zero rest mass.
    pub fn is_massless(&self) -> bool {
        self.mass == 0.0
    }

    /// Hypercharge as used in the Gell-Mann–Nishijima relation.
    pub fn hypercharge(&self) -> i32 {
        self.strangeness + self.charmness + self.bottomness + self.topness + self.baryon_number
    }

    /// Spin projections a free particle of this kind may carry. Massless
    /// particles have no longitudinal (zero) projection.
    pub fn allowed_projections(&self) -> Vec<HalfInteger> {
        let mut projections = Spin::projections(self.spin);
        if self.is_massless() {
            projections.retain(|projection| *projection != HalfInteger::ZERO);
        }
        projections
    }
}

impl PartialEq for Particle {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.pid == other.pid
    }
}

impl Eq for Particle {}

impl Hash for Particle {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
        self.pid.hash(state);
    }
}

/// A particle occupying an edge with a concrete spin projection.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct State {
    particle: Arc<Particle>,
    spin: Spin,
}

impl State {
    /// Creates a state, validating the projection against the particle spin.
    pub fn new(particle: Arc<Particle>, spin_projection: HalfInteger) -> Result<Self, RxnError> {
        let spin = Spin::new(particle.spin, spin_projection)
            .map_err(|err| err.with_context("particle", &particle.name))?;
        Ok(Self { particle, spin })
    }

    /// Returns the particle.
    pub fn particle(&self) -> &Particle {
        &self.particle
    }

    /// Returns the shared handle to the particle.
    pub fn particle_handle(&self) -> &Arc<Particle> {
        &self.particle
    }

    /// Returns the particle name.
    pub fn name(&self) -> &str {
        &self.particle.name
    }

    /// Returns the spin projection carried on the edge.
    pub fn spin_projection(&self) -> HalfInteger {
        self.spin.projection()
    }

    /// Returns the particle spin with the edge's projection.
    pub fn spin(&self) -> Spin {
        self.spin
    }

    /// Returns the `(name, projection)` label used for grouping and sorting.
    pub fn label(&self) -> (String, HalfInteger) {
        (self.particle.name.clone(), self.spin.projection())
    }
}

/// Read-only, name-keyed particle catalog supplied by the caller.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ParticleCollection {
    particles: BTreeMap<String, Arc<Particle>>,
}

impl ParticleCollection {
    /// Creates an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a particle, rejecting duplicate names.
    pub fn insert(&mut self, particle: Particle) -> Result<(), RxnError> {
        if self.particles.contains_key(&particle.name) {
            return Err(RxnError::Catalog(
                ErrorInfo::new("duplicate-particle", "particle name already present")
                    .with_context("name", &particle.name),
            ));
        }
        self.particles.insert(particle.name.clone(), Arc::new(particle));
        Ok(())
    }

    /// Looks a particle up by name.
    pub fn get(&self, name: &str) -> Result<&Arc<Particle>, RxnError> {
        self.particles.get(name).ok_or_else(|| {
            RxnError::Catalog(
                ErrorInfo::new("unknown-particle", "particle is not in the catalog")
                    .with_context("name", name)
                    .with_hint("check the spelling against the catalog names"),
            )
        })
    }

    /// Returns the particle with the given PDG code, if any.
    pub fn find_by_pid(&self, pid: i64) -> Option<&Arc<Particle>> {
        self.particles.values().find(|particle| particle.pid == pid)
    }

    /// Returns the subset of particles satisfying `predicate`.
    pub fn filter<F>(&self, predicate: F) -> ParticleCollection
    where
        F: Fn(&Particle) -> bool,
    {
        let particles = self
            .particles
            .iter()
            .filter(|(_, particle)| predicate(particle))
            .map(|(name, particle)| (name.clone(), Arc::clone(particle)))
            .collect();
        ParticleCollection { particles }
    }

    /// Returns the particles whose name contains any of the given fragments.
    /// An empty fragment list selects the whole catalog.
    pub fn with_names_containing<S: AsRef<str>>(&self, fragments: &[S]) -> ParticleCollection {
        if fragments.is_empty() {
            return self.clone();
        }
        self.filter(|particle| {
            fragments
                .iter()
                .any(|fragment| particle.name.contains(fragment.as_ref()))
        })
    }

    /// Iterates over the particles in name order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<Particle>> {
        self.particles.values()
    }

    /// Returns the particle names in order.
    pub fn names(&self) -> Vec<&str> {
        self.particles.keys().map(String::as_str).collect()
    }

    /// Returns the number of particles.
    pub fn len(&self) -> usize {
        self.particles.len()
    }

    /// Returns whether the catalog is empty.
    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    /// Builds a catalog from `particles`, rejecting duplicate names the
    /// same way [`ParticleCollection::insert`] does.
    pub fn try_from_iter<I>(particles: I) -> Result<Self, RxnError>
    where
        I: IntoIterator<Item = Particle>,
    {
        let mut catalog = Self::new();
        for particle in particles {
            catalog.insert(particle)?;
        }
        Ok(catalog)
    }
}
