#![allow(dead_code)]

use rxn_core::{HalfInteger, Parity, Particle, ParticleCollection, RxnError, Spin};

const PLUS: Parity = Parity::Plus;
const MINUS: Parity = Parity::Minus;

fn isospin(magnitude: f64, projection: f64) -> Result<Spin, RxnError> {
    Spin::from_f64(magnitude, projection)
}

fn meson(
    name: &str,
    pid: i64,
    mass: f64,
    spin: i32,
    (magnitude, projection): (f64, f64),
    parity: Parity,
) -> Result<Particle, RxnError> {
    Ok(Particle::new(name, pid, mass, HalfInteger::integer(spin))
        .with_isospin(isospin(magnitude, projection)?)
        .with_parity(parity))
}

fn neutral_isoscalar(
    name: &str,
    pid: i64,
    mass: f64,
    width: f64,
    spin: i32,
    [parity, c_parity, g_parity]: [Parity; 3],
) -> Result<Particle, RxnError> {
    Ok(meson(name, pid, mass, spin, (0.0, 0.0), parity)?
        .with_width(width)
        .with_c_parity(c_parity)
        .with_g_parity(g_parity))
}

/// Strange baryon with positive parity.
fn hyperon(
    name: &str,
    pid: i64,
    mass: f64,
    width: f64,
    charge: i32,
    (magnitude, projection): (f64, f64),
    strangeness: i32,
) -> Result<Particle, RxnError> {
    Ok(Particle::new(name, pid, mass, HalfInteger::HALF)
        .with_width(width)
        .with_charge(charge)
        .with_isospin(isospin(magnitude, projection)?)
        .with_parity(PLUS)
        .with_flavour(strangeness, 0, 0, 0)
        .with_baryon_number(1))
}

fn lepton(name: &str, pid: i64, mass: f64, charge: i32, numbers: (i32, i32, i32)) -> Particle {
    let particle = Particle::new(name, pid, mass, HalfInteger::HALF)
        .with_charge(charge)
        .with_lepton_numbers(numbers.0, numbers.1, numbers.2);
    match charge {
        0 => particle,
        c if c < 0 => particle.with_parity(PLUS),
        _ => particle.with_parity(MINUS),
    }
}

/// Masses and widths in GeV, quantum numbers as listed by the PDG.
pub fn pdg_catalog() -> Result<ParticleCollection, RxnError> {
    let half = HalfInteger::HALF;
    let particles = vec![
        Particle::new("gamma", 22, 0.0, HalfInteger::ONE)
            .with_parity(MINUS)
            .with_c_parity(MINUS),
        meson("pi0", 111, 0.1349768, 0, (1.0, 0.0), MINUS)?
            .with_width(7.73e-9)
            .with_c_parity(PLUS)
            .with_g_parity(MINUS),
        meson("pi+", 211, 0.13957039, 0, (1.0, 1.0), MINUS)?
            .with_width(2.5284e-17)
            .with_charge(1)
            .with_g_parity(MINUS),
        meson("pi-", -211, 0.13957039, 0, (1.0, -1.0), MINUS)?
            .with_width(2.5284e-17)
            .with_charge(-1)
            .with_g_parity(MINUS),
        neutral_isoscalar("eta", 221, 0.547862, 1.31e-6, 0, [MINUS, PLUS, PLUS])?,
        meson("rho(770)0", 113, 0.77526, 1, (1.0, 0.0), MINUS)?
            .with_width(0.1491)
            .with_c_parity(MINUS)
            .with_g_parity(PLUS),
        neutral_isoscalar("omega(782)", 223, 0.78266, 0.00868, 1, [MINUS, MINUS, MINUS])?,
        neutral_isoscalar("f0(980)", 9010221, 0.99, 0.06, 0, [PLUS, PLUS, PLUS])?,
        neutral_isoscalar("f0(1500)", 9030221, 1.506, 0.112, 0, [PLUS, PLUS, PLUS])?,
        neutral_isoscalar("f2(1270)", 225, 1.2755, 0.1867, 2, [PLUS, PLUS, PLUS])?,
        neutral_isoscalar("J/psi(1S)", 443, 3.0969, 9.29e-5, 1, [MINUS, MINUS, MINUS])?,
        Particle::new("p", 2212, 0.93827208816, half)
            .with_charge(1)
            .with_isospin(isospin(0.5, 0.5)?)
            .with_parity(PLUS)
            .with_baryon_number(1),
        Particle::new("p~", -2212, 0.93827208816, half)
            .with_charge(-1)
            .with_isospin(isospin(0.5, -0.5)?)
            .with_parity(MINUS)
            .with_baryon_number(-1),
        Particle::new("n", 2112, 0.93956542052, half)
            .with_width(7.485e-28)
            .with_isospin(isospin(0.5, -0.5)?)
            .with_parity(PLUS)
            .with_baryon_number(1),
        Particle::new("n~", -2112, 0.93956542052, half)
            .with_width(7.485e-28)
            .with_isospin(isospin(0.5, 0.5)?)
            .with_parity(MINUS)
            .with_baryon_number(-1),
        meson("K-", -321, 0.493677, 0, (0.5, -0.5), MINUS)?
            .with_width(5.317e-17)
            .with_charge(-1)
            .with_flavour(-1, 0, 0, 0),
        meson("K~0", -311, 0.497611, 0, (0.5, 0.5), MINUS)?.with_flavour(-1, 0, 0, 0),
        hyperon("Sigma+", 3222, 1.18937, 8.209e-15, 1, (1.0, 1.0), -1)?,
        hyperon("Sigma-", 3112, 1.197449, 4.45e-15, -1, (1.0, -1.0), -1)?,
        hyperon("Xi0", 3322, 1.31486, 2.27e-15, 0, (0.5, 0.5), -2)?,
        hyperon("Xi-", 3312, 1.32171, 4.02e-15, -1, (0.5, -0.5), -2)?,
        Particle::new("Sigma0", 3212, 1.192642, half)
            .with_width(8.9e-6)
            .with_isospin(isospin(1.0, 0.0)?)
            .with_parity(PLUS)
            .with_flavour(-1, 0, 0, 0)
            .with_baryon_number(1),
        Particle::new("Lambda", 3122, 1.115683, half)
            .with_width(2.501e-15)
            .with_isospin(isospin(0.0, 0.0)?)
            .with_parity(PLUS)
            .with_flavour(-1, 0, 0, 0)
            .with_baryon_number(1),
        lepton("e-", 11, 0.00051099895, -1, (1, 0, 0)),
        lepton("e+", -11, 0.00051099895, 1, (-1, 0, 0)),
        lepton("mu-", 13, 0.1056583755, -1, (0, 1, 0)).with_width(2.9959837e-19),
        lepton("nu(e)", 12, 0.0, 0, (1, 0, 0)),
        lepton("nu(e)~", -12, 0.0, 0, (-1, 0, 0)),
    ];
    ParticleCollection::try_from_iter(particles)
}
