use crate::rule::NodeInput;

/// Decays only: the outgoing mass sum, lowered by `width_factor` widths,
/// must stay below the parent mass raised by the same number of widths.
pub(crate) fn mass_conservation(input: &NodeInput<'_>, width_factor: f64) -> bool {
    let [parent] = input.ingoing else {
        return true;
    };
    let parent = parent.particle();
    let upper = parent.mass + width_factor * parent.width.unwrap_or(0.0);
    let (mass, width) = input.outgoing.iter().fold((0.0, 0.0), |(mass, width), state| {
        let particle = state.particle();
        (mass + particle.mass, width + particle.width.unwrap_or(0.0))
    });
    mass - width_factor * width < upper
}
