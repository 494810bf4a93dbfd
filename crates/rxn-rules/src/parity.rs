use rxn_core::{HalfInteger, Parity, QuantumNumberKind, State};

use crate::rule::NodeInput;

type Outcome = Result<bool, QuantumNumberKind>;

fn intrinsic_product(states: &[&State]) -> Result<Parity, QuantumNumberKind> {
    states
        .iter()
        .map(|state| state.particle().parity.ok_or(QuantumNumberKind::Parity))
        .collect::<Result<Vec<_>, _>>()
        .map(Parity::product)
}

/// Splits a two-body node into its single line and its pair.
fn single_and_pair<'a>(input: &NodeInput<'a>) -> Option<(&'a State, [&'a State; 2])> {
    match (input.ingoing, input.outgoing) {
        ([single], [first, second]) | ([first, second], [single]) => {
            Some((*single, [*first, *second]))
        }
        _ => None,
    }
}

fn is_particle_antiparticle(pair: &[&State]) -> bool {
    matches!(pair, [first, second] if first.particle().pid == -second.particle().pid)
}

pub(crate) fn parity_conservation(input: &NodeInput<'_>) -> Outcome {
    let Some((single, pair)) = single_and_pair(input) else {
        return Ok(true);
    };
    let l = input
        .interaction
        .l_magnitude
        .ok_or(QuantumNumberKind::LMagnitude)?;
    let single_parity = intrinsic_product(&[single])?;
    let pair_parity = intrinsic_product(&pair)?;
    Ok(match Parity::from_exponent(l) {
        Some(orbital) => single_parity == pair_parity * orbital,
        None => false,
    })
}

/// Relates the helicity amplitude `A(λ1, λ2)` to `A(-λ1, -λ2)` through the
/// node's parity prefactor.
pub(crate) fn helicity_parity(input: &NodeInput<'_>) -> Outcome {
    let ([parent], [first, second]) = (input.ingoing, input.outgoing) else {
        return Ok(true);
    };
    let expected = input
        .interaction
        .parity_prefactor
        .ok_or(QuantumNumberKind::ParityPrefactor)?;
    let intrinsic = intrinsic_product(&[*parent, *first, *second])?;
    let exponent = first.spin().magnitude() + second.spin().magnitude()
        - parent.spin().magnitude();
    let Some(sign) = Parity::from_exponent(exponent) else {
        return Ok(false);
    };
    let prefactor = intrinsic * sign;
    if first.spin_projection() == HalfInteger::ZERO
        && second.spin_projection() == HalfInteger::ZERO
        && prefactor == Parity::Minus
    {
        return Ok(false);
    }
    Ok(prefactor == expected)
}

/// C-parity of a pair that is its own charge conjugate: `(-1)^L` for bosons
/// and `(-1)^(L+S)` for fermions.
fn pair_conjugation_parity(
    pair: &[&State],
    input: &NodeInput<'_>,
) -> Result<Option<Parity>, QuantumNumberKind> {
    if !is_particle_antiparticle(pair) {
        return Ok(None);
    }
    let l = input
        .interaction
        .l_magnitude
        .ok_or(QuantumNumberKind::LMagnitude)?;
    if pair[0].particle().is_boson() {
        return Ok(Parity::from_exponent(l));
    }
    let s = input
        .interaction
        .s_magnitude
        .ok_or(QuantumNumberKind::SMagnitude)?;
    Ok(Parity::from_exponent(l + s))
}

fn side_c_parity(
    states: &[&State],
    input: &NodeInput<'_>,
) -> Result<Option<Parity>, QuantumNumberKind> {
    let defined: Option<Vec<Parity>> = states.iter().map(|s| s.particle().c_parity).collect();
    match defined {
        Some(parities) => Ok(Some(Parity::product(parities))),
        None => pair_conjugation_parity(states, input),
    }
}

pub(crate) fn c_parity_conservation(input: &NodeInput<'_>) -> Outcome {
    let ingoing = side_c_parity(input.ingoing, input)?;
    let outgoing = side_c_parity(input.outgoing, input)?;
    Ok(match (ingoing, outgoing) {
        (Some(ingoing), Some(outgoing)) => ingoing == outgoing,
        _ => true,
    })
}

pub(crate) fn g_parity_conservation(input: &NodeInput<'_>) -> Outcome {
    let all_defined = |states: &[&State]| -> Option<Vec<Parity>> {
        states.iter().map(|s| s.particle().g_parity).collect()
    };
    if let (Some(ingoing), Some(outgoing)) =
        (all_defined(input.ingoing), all_defined(input.outgoing))
    {
        return Ok(Parity::product(ingoing) == Parity::product(outgoing));
    }

    let Some((single, pair)) = single_and_pair(input) else {
        return Ok(true);
    };
    if !is_particle_antiparticle(&pair) {
        return Ok(true);
    }
    let Some(expected) = single.particle().g_parity else {
        return Ok(true);
    };
    let isospin = single
        .particle()
        .isospin
        .ok_or(QuantumNumberKind::IsospinMagnitude)?
        .magnitude();
    if !isospin.is_integer() {
        return Ok(true);
    }
    let l = input
        .interaction
        .l_magnitude
        .ok_or(QuantumNumberKind::LMagnitude)?;
    let exponent = if pair[0].particle().is_boson() {
        l + isospin
    } else {
        let s = input
            .interaction
            .s_magnitude
            .ok_or(QuantumNumberKind::SMagnitude)?;
        l + s + isospin
    };
    Ok(Parity::from_exponent(exponent).map_or(true, |derived| derived == expected))
}

/// Two or more outgoing particles in the same state force the ingoing
/// parity: even for bosons, odd for fermions.
pub(crate) fn identical_particle_symmetrization(input: &NodeInput<'_>) -> Outcome {
    let [first, rest @ ..] = input.outgoing else {
        return Ok(true);
    };
    if rest.is_empty()
        || !rest.iter().all(|other| {
            other.particle().pid == first.particle().pid
                && other.spin_projection() == first.spin_projection()
        })
    {
        return Ok(true);
    }
    let parity = intrinsic_product(input.ingoing)?;
    let required = if first.particle().is_boson() {
        Parity::Plus
    } else {
        Parity::Minus
    };
    Ok(parity == required)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use rxn_core::{Particle, Spin};
    use rxn_topology::InteractionProperties;

    use super::*;

    fn state(particle: Particle, projection: f64) -> State {
        State::new(
            Arc::new(particle),
            HalfInteger::try_from_f64(projection).unwrap(),
        )
        .unwrap()
    }

    fn pion(name: &str, pid: i64, charge: i32) -> Particle {
        Particle::new(name, pid, 0.13957, HalfInteger::ZERO)
            .with_charge(charge)
            .with_parity(Parity::Minus)
            .with_isospin(Spin::from_f64(1.0, f64::from(charge)).unwrap())
            .with_g_parity(Parity::Minus)
    }

    #[test]
    fn charged_pion_pair_derives_c_parity_from_l() {
        let rho = state(
            Particle::new("rho0", 113, 0.775, HalfInteger::ONE)
                .with_parity(Parity::Minus)
                .with_c_parity(Parity::Minus),
            0.0,
        );
        let plus = state(pion("pi+", 211, 1), 0.0);
        let minus = state(pion("pi-", -211, -1), 0.0);
        let ingoing = [&rho];
        let outgoing = [&plus, &minus];
        for (l, expected) in [(1, true), (2, false)] {
            let interaction = InteractionProperties {
                l_magnitude: Some(HalfInteger::integer(l)),
                s_magnitude: Some(HalfInteger::ZERO),
                ..InteractionProperties::default()
            };
            let input = NodeInput {
                ingoing: &ingoing,
                outgoing: &outgoing,
                interaction: &interaction,
            };
            assert_eq!(c_parity_conservation(&input), Ok(expected));
        }
    }

    #[test]
    fn identical_fermions_need_odd_parent() {
        let parent = state(
            Particle::new("X", 9_000_001, 3.0, HalfInteger::ZERO).with_parity(Parity::Plus),
            0.0,
        );
        let neutron = Particle::new("n", 2112, 0.9396, HalfInteger::HALF)
            .with_parity(Parity::Plus)
            .with_baryon_number(1);
        let first = state(neutron.clone(), 0.5);
        let second = state(neutron, 0.5);
        let ingoing = [&parent];
        let outgoing = [&first, &second];
        let interaction = InteractionProperties::default();
        let input = NodeInput {
            ingoing: &ingoing,
            outgoing: &outgoing,
            interaction: &interaction,
        };
        assert_eq!(identical_particle_symmetrization(&input), Ok(false));
    }

    #[test]
    fn parity_needs_orbital_momentum() {
        let eta = state(
            Particle::new("eta", 221, 0.5479, HalfInteger::ZERO).with_parity(Parity::Minus),
            0.0,
        );
        let plus = state(pion("pi+", 211, 1), 0.0);
        let minus = state(pion("pi-", -211, -1), 0.0);
        let ingoing = [&eta];
        let outgoing = [&plus, &minus];
        let interaction = InteractionProperties::default();
        let input = NodeInput {
            ingoing: &ingoing,
            outgoing: &outgoing,
            interaction: &interaction,
        };
        assert_eq!(
            parity_conservation(&input),
            Err(QuantumNumberKind::LMagnitude)
        );
    }
}
