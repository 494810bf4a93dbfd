mod common;

use std::collections::BTreeSet;

use rxn_core::{HalfInteger, Particle, RxnError};
use rxn_rules::{AdditiveQuantumNumber, ConservationRule};
use rxn_solve::{check_reaction_violations, NBodyCheckOptions, ReactionSpec};

use common::pdg_catalog;

fn violations(
    initial: &[&str],
    outgoing: &[&str],
) -> Result<BTreeSet<ConservationRule>, RxnError> {
    let catalog = pdg_catalog()?;
    let reaction = ReactionSpec::new(initial.iter().copied(), outgoing.iter().copied());
    check_reaction_violations(&catalog, &reaction, &NBodyCheckOptions::default())
}

fn rules<const N: usize>(rules: [ConservationRule; N]) -> BTreeSet<ConservationRule> {
    rules.into_iter().collect()
}

#[test]
fn proton_antiproton_to_charged_pions_breaks_charge_and_isospin() -> Result<(), RxnError> {
    assert_eq!(
        violations(&["p", "p~"], &["pi+", "pi0"])?,
        rules([
            ConservationRule::Additive(AdditiveQuantumNumber::Charge),
            ConservationRule::IsospinConservation,
        ])
    );
    Ok(())
}

#[test]
fn eta_to_two_photons_is_allowed() -> Result<(), RxnError> {
    assert!(violations(&["eta"], &["gamma", "gamma"])?.is_empty());
    Ok(())
}

#[test]
fn sigma_to_lambda_pion_is_below_threshold() -> Result<(), RxnError> {
    assert_eq!(
        violations(&["Sigma0"], &["Lambda", "pi0"])?,
        rules([ConservationRule::MassConservation])
    );
    Ok(())
}

#[test]
fn rho_to_neutral_pions() -> Result<(), RxnError> {
    assert_eq!(
        violations(&["rho(770)0"], &["pi0", "pi0"])?,
        rules([
            ConservationRule::IsospinConservation,
            ConservationRule::CParityConservation,
            ConservationRule::IdenticalParticleSymmetrization,
        ])
    );
    Ok(())
}

#[test]
fn c_odd_to_photon_pair_and_c_even_to_three_photons() -> Result<(), RxnError> {
    assert_eq!(
        violations(&["rho(770)0"], &["gamma", "gamma"])?,
        rules([ConservationRule::CParityConservation])
    );
    assert_eq!(
        violations(&["pi0"], &["gamma", "gamma", "gamma"])?,
        rules([ConservationRule::CParityConservation])
    );
    Ok(())
}

#[test]
fn muon_decay_without_muon_neutrino() -> Result<(), RxnError> {
    assert_eq!(
        violations(&["mu-"], &["e-", "nu(e)~"])?,
        rules([
            ConservationRule::Additive(AdditiveQuantumNumber::MuonLeptonNumber),
            ConservationRule::SpinMagnitudeConservation,
        ])
    );
    Ok(())
}

#[test]
fn charmonium_to_rho_pair() -> Result<(), RxnError> {
    assert_eq!(
        violations(&["J/psi(1S)"], &["rho(770)0", "rho(770)0"])?,
        rules([
            ConservationRule::CParityConservation,
            ConservationRule::GParityConservation,
        ])
    );
    Ok(())
}

#[test]
fn inverse_beta_decay_is_allowed() -> Result<(), RxnError> {
    assert!(violations(&["nu(e)~", "p"], &["n", "e+"])?.is_empty());
    Ok(())
}

#[test]
fn charmonium_to_c_even_isoscalar_and_pion() -> Result<(), RxnError> {
    let expected = rules([
        ConservationRule::CParityConservation,
        ConservationRule::IsospinConservation,
    ]);
    assert_eq!(violations(&["J/psi(1S)"], &["pi0", "f0(980)"])?, expected);
    assert_eq!(violations(&["J/psi(1S)"], &["pi0", "eta"])?, expected);
    Ok(())
}

#[test]
fn charge_exchange_with_wrong_final_charges() -> Result<(), RxnError> {
    let charge_and_isospin = rules([
        ConservationRule::Additive(AdditiveQuantumNumber::Charge),
        ConservationRule::IsospinConservation,
    ]);
    assert_eq!(violations(&["pi+", "n"], &["pi-", "p"])?, charge_and_isospin);
    assert_eq!(
        violations(&["Sigma+", "n"], &["Sigma-", "p"])?,
        charge_and_isospin
    );
    Ok(())
}

#[test]
fn allowed_production_and_electromagnetic_decays() -> Result<(), RxnError> {
    let allowed: [(&[&str], &[&str]); 7] = [
        (&["p", "p"], &["p", "p", "p", "p~"]),
        (&["pi0"], &["e+", "e-", "gamma"]),
        (&["pi0"], &["e+", "e-"]),
        (&["Sigma0"], &["Lambda", "gamma"]),
        (&["rho(770)0"], &["gamma", "gamma", "gamma"]),
        (&["f0(980)"], &["pi+", "pi-"]),
        (&["n", "n~"], &["pi+", "pi-", "pi0"]),
    ];
    for (initial, outgoing) in allowed {
        let found = violations(initial, outgoing)?;
        assert!(found.is_empty(), "{initial:?} -> {outgoing:?}: {found:?}");
    }
    Ok(())
}

#[test]
fn weak_strangeness_changing_decays() -> Result<(), RxnError> {
    let strangeness_and_isospin = rules([
        ConservationRule::Additive(AdditiveQuantumNumber::Strangeness),
        ConservationRule::IsospinConservation,
    ]);
    let weak: [(&[&str], &[&str]); 5] = [
        (&["Sigma-"], &["n", "pi-"]),
        (&["K-"], &["pi-", "pi0"]),
        (&["Xi-"], &["Lambda", "pi-"]),
        (&["Xi0"], &["p", "pi-"]),
        (&["K~0"], &["pi+", "pi-", "pi0"]),
    ];
    for (initial, outgoing) in weak {
        assert_eq!(
            violations(initial, outgoing)?,
            strangeness_and_isospin,
            "{initial:?} -> {outgoing:?}"
        );
    }
    Ok(())
}

#[test]
fn associated_strangeness_production_needs_a_kaon_and_hyperon_pair() -> Result<(), RxnError> {
    assert_eq!(
        violations(&["pi-", "p"], &["Lambda", "K~0"])?,
        rules([
            ConservationRule::Additive(AdditiveQuantumNumber::Strangeness),
            ConservationRule::IsospinConservation,
        ])
    );
    Ok(())
}

#[test]
fn catalog_entries_breaking_gell_mann_nishijima_are_rejected() -> Result<(), RxnError> {
    let mut catalog = pdg_catalog()?;
    catalog.insert(Particle::new("X+", 9_999_001, 1.0, HalfInteger::ZERO).with_charge(1))?;
    let reaction = ReactionSpec::new(["X+"], ["pi+", "pi0"]);
    let err = check_reaction_violations(&catalog, &reaction, &NBodyCheckOptions::default())
        .unwrap_err();
    assert!(matches!(err, RxnError::Initialization(_)));
    assert_eq!(err.code(), "gell-mann-nishijima-violation");
    Ok(())
}

#[test]
fn unknown_particles_are_catalog_errors() -> Result<(), RxnError> {
    let err = violations(&["psi(9999)"], &["pi0", "pi0"]).unwrap_err();
    assert!(matches!(err, RxnError::Catalog(_)));
    Ok(())
}
