use crate::rule::{AdditiveQuantumNumber, NodeInput};

pub(crate) fn is_conserved(number: AdditiveQuantumNumber, input: &NodeInput<'_>) -> bool {
    let ingoing: i32 = input.ingoing.iter().map(|s| number.value_of(s)).sum();
    let outgoing: i32 = input.outgoing.iter().map(|s| number.value_of(s)).sum();
    ingoing == outgoing
}

/// `2Q = 2 I3 + Y` for every state that is not a lepton. States without
/// isospin count as `I3 = 0`.
pub(crate) fn gell_mann_nishijima(input: &NodeInput<'_>) -> bool {
    input.states().all(|state| {
        let particle = state.particle();
        if particle.is_lepton() {
            return true;
        }
        let doubled_i3 = particle
            .isospin
            .map_or(0, |isospin| isospin.projection().doubled());
        2 * particle.charge == doubled_i3 + particle.hypercharge()
    })
}
