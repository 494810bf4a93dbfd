//! Angular momentum coupling without numeric Clebsch–Gordan coefficients.
//!
//! Only the closed-form zero conditions are used, which is enough to prune
//! couplings that can never occur.

use std::collections::BTreeSet;

use rxn_core::{HalfInteger, Spin};

fn is_odd_integer(value: HalfInteger) -> bool {
    value.is_integer() && (value.doubled() / 2) % 2 != 0
}

/// Returns whether `<j1 m1; j2 m2 | J M>` vanishes.
///
/// Besides projection and triangle selection, the symmetry relations
/// `<j m; j m | J M>` and `<j1 0; j2 0 | J 0>` for odd `J - j1 - j2`, as well
/// as the two swapped-projection relations, are recognised.
pub fn is_clebsch_gordan_zero(first: Spin, second: Spin, coupled: Spin) -> bool {
    let (j1, m1) = (first.magnitude(), first.projection());
    let (j2, m2) = (second.magnitude(), second.projection());
    let (j, m) = (coupled.magnitude(), coupled.projection());

    if m1 + m2 != m {
        return true;
    }
    if j < (j1 - j2).abs() || j > j1 + j2 || !(j1 + j2 - j).is_integer() {
        return true;
    }
    if ((j1 == j2 && m1 == m2) || (m1 == HalfInteger::ZERO && m2 == HalfInteger::ZERO))
        && is_odd_integer(j - j1 - j2)
    {
        return true;
    }
    if j1 == j && m1 == -m && is_odd_integer(j2 - j1 - j) {
        return true;
    }
    j2 == j && m2 == -m && is_odd_integer(j1 - j2 - j)
}

/// All coupled states `|S, m1 + m2>` reachable from two spins with a
/// non-vanishing coefficient.
pub fn spin_couplings(first: Spin, second: Spin) -> BTreeSet<Spin> {
    let projection = first.projection() + second.projection();
    let lowest = (first.magnitude() - second.magnitude()).abs();
    let highest = first.magnitude() + second.magnitude();
    lowest
        .up_to(highest)
        .filter(|magnitude| *magnitude >= projection.abs())
        .filter_map(|magnitude| Spin::new(magnitude, projection).ok())
        .filter(|coupled| !is_clebsch_gordan_zero(first, second, *coupled))
        .collect()
}

/// Total spins a set of spins can couple to.
///
/// With `orbital = Some((l, s))` the spins must first couple to `s`, which
/// is then coupled with `l`; if `s` is unreachable the result is empty.
pub fn total_spins(spins: &[Spin], orbital: Option<(Spin, Spin)>) -> BTreeSet<Spin> {
    let Some((last, rest)) = spins.split_last() else {
        return BTreeSet::new();
    };
    let mut coupled: BTreeSet<Spin> = BTreeSet::from([*last]);
    for spin in rest.iter().rev() {
        coupled = coupled
            .iter()
            .flat_map(|partial| spin_couplings(*spin, *partial))
            .collect();
    }
    match orbital {
        None => coupled,
        Some((l, s)) if coupled.contains(&s) => spin_couplings(s, l),
        Some(_) => BTreeSet::new(),
    }
}

/// Magnitudes `|a - b| ..= a + b` in whole steps.
pub fn magnitude_couplings(first: HalfInteger, second: HalfInteger) -> BTreeSet<HalfInteger> {
    (first - second).abs().up_to(first + second).collect()
}

/// Magnitude-only counterpart of [`total_spins`].
pub fn total_magnitudes(
    magnitudes: &[HalfInteger],
    orbital: Option<(HalfInteger, HalfInteger)>,
) -> BTreeSet<HalfInteger> {
    let Some((last, rest)) = magnitudes.split_last() else {
        return BTreeSet::new();
    };
    let mut coupled: BTreeSet<HalfInteger> = BTreeSet::from([*last]);
    for magnitude in rest.iter().rev() {
        coupled = coupled
            .iter()
            .flat_map(|partial| magnitude_couplings(*magnitude, *partial))
            .collect();
    }
    match orbital {
        None => coupled,
        Some((l, s)) if coupled.contains(&s) => magnitude_couplings(s, l),
        Some(_) => BTreeSet::new(),
    }
}
