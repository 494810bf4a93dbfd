use std::collections::BTreeSet;

use rxn_core::{HalfInteger, QuantumNumberKind, Spin, State};

use crate::coupling::{is_clebsch_gordan_zero, total_magnitudes, total_spins};
use crate::rule::NodeInput;

type Outcome = Result<bool, QuantumNumberKind>;

fn isospins(states: &[&State]) -> Result<Vec<Spin>, QuantumNumberKind> {
    states
        .iter()
        .map(|state| {
            state
                .particle()
                .isospin
                .ok_or(QuantumNumberKind::IsospinMagnitude)
        })
        .collect()
}

fn spins(states: &[&State]) -> Vec<Spin> {
    states.iter().map(|state| state.spin()).collect()
}

fn magnitudes(states: &[&State]) -> Vec<HalfInteger> {
    states.iter().map(|state| state.spin().magnitude()).collect()
}

/// Whether two sides agree on being whole or half-integer in total.
fn same_statistics(input: &NodeInput<'_>) -> bool {
    let ingoing: HalfInteger = magnitudes(input.ingoing).into_iter().sum();
    let outgoing: HalfInteger = magnitudes(input.outgoing).into_iter().sum();
    ingoing.is_integer() == outgoing.is_integer()
}

fn intersects<T: Ord>(first: &BTreeSet<T>, second: &BTreeSet<T>) -> bool {
    first.intersection(second).next().is_some()
}

pub(crate) fn isospin_conservation(input: &NodeInput<'_>) -> Outcome {
    let ingoing = isospins(input.ingoing)?;
    let outgoing = isospins(input.outgoing)?;
    let projection_in: HalfInteger = ingoing.iter().map(Spin::projection).sum();
    let projection_out: HalfInteger = outgoing.iter().map(Spin::projection).sum();
    if projection_in != projection_out {
        return Ok(false);
    }
    Ok(intersects(
        &total_spins(&ingoing, None),
        &total_spins(&outgoing, None),
    ))
}

pub(crate) fn spin_conservation(input: &NodeInput<'_>) -> Outcome {
    if !input.is_two_body() {
        return Ok(same_statistics(input));
    }
    let props = input.interaction;
    let l = Spin::new(
        props.l_magnitude.ok_or(QuantumNumberKind::LMagnitude)?,
        props.l_projection.ok_or(QuantumNumberKind::LProjection)?,
    );
    let s = Spin::new(
        props.s_magnitude.ok_or(QuantumNumberKind::SMagnitude)?,
        props.s_projection.ok_or(QuantumNumberKind::SProjection)?,
    );
    let (Ok(l), Ok(s)) = (l, s) else {
        return Ok(false);
    };
    let (ingoing, outgoing) = if input.ingoing.len() == 2 {
        (
            total_spins(&spins(input.ingoing), Some((l, s))),
            total_spins(&spins(input.outgoing), None),
        )
    } else {
        (
            total_spins(&spins(input.ingoing), None),
            total_spins(&spins(input.outgoing), Some((l, s))),
        )
    };
    Ok(intersects(&ingoing, &outgoing))
}

pub(crate) fn spin_magnitude_conservation(input: &NodeInput<'_>) -> Outcome {
    if !input.is_two_body() {
        return Ok(same_statistics(input));
    }
    let props = input.interaction;
    let l = props.l_magnitude.ok_or(QuantumNumberKind::LMagnitude)?;
    let s = props.s_magnitude.ok_or(QuantumNumberKind::SMagnitude)?;
    let (ingoing, outgoing) = if input.ingoing.len() == 2 {
        (
            total_magnitudes(&magnitudes(input.ingoing), Some((l, s))),
            total_magnitudes(&magnitudes(input.outgoing), None),
        )
    } else {
        (
            total_magnitudes(&magnitudes(input.ingoing), None),
            total_magnitudes(&magnitudes(input.outgoing), Some((l, s))),
        )
    };
    Ok(intersects(&ingoing, &outgoing))
}

/// Selection rules of the helicity to canonical transformation
/// `<L 0; S λ | J λ> <s1 λ1; s2 -λ2 | S λ>` with `λ = λ1 - λ2`.
pub(crate) fn clebsch_gordan_helicity_to_canonical(input: &NodeInput<'_>) -> Outcome {
    let ([parent], [first, second]) = (input.ingoing, input.outgoing) else {
        return Ok(true);
    };
    let props = input.interaction;
    let l_magnitude = props.l_magnitude.ok_or(QuantumNumberKind::LMagnitude)?;
    let l_projection = props.l_projection.ok_or(QuantumNumberKind::LProjection)?;
    let s_magnitude = props.s_magnitude.ok_or(QuantumNumberKind::SMagnitude)?;

    let helicity = first.spin_projection() - second.spin_projection();
    let parent_magnitude = parent.spin().magnitude();
    if s_magnitude < helicity.abs() || parent_magnitude < helicity.abs() {
        return Ok(false);
    }
    let spins = (
        Spin::new(second.spin().magnitude(), -second.spin_projection()),
        Spin::new(s_magnitude, helicity),
        Spin::new(l_magnitude, l_projection),
        Spin::new(parent_magnitude, helicity),
    );
    let (Ok(mirrored), Ok(coupled), Ok(orbital), Ok(total)) = spins else {
        return Ok(false);
    };
    Ok(!is_clebsch_gordan_zero(first.spin(), mirrored, coupled)
        && !is_clebsch_gordan_zero(orbital, coupled, total))
}

pub(crate) fn helicity_conservation(input: &NodeInput<'_>) -> bool {
    match (input.ingoing, input.outgoing) {
        ([parent], [first, second]) => {
            parent.spin().magnitude() >= (first.spin_projection() - second.spin_projection()).abs()
        }
        _ => true,
    }
}
