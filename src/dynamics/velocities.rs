use crate::engine::BOLTZMANN;
use rand::Rng;
use rand_distr::StandardNormal;

/// Draws velocities from the Maxwell-Boltzmann distribution at `temperature`
/// (K), removes center-of-mass drift and rescales the result so that its
/// kinetic temperature over `3N − 3` degrees of freedom is exactly
/// `temperature`.
pub fn maxwell_boltzmann_velocities<R: Rng + ?Sized>(
    masses: &[f64],
    temperature: f64,
    rng: &mut R,
) -> Vec<[f64; 3]> {
    let kt = BOLTZMANN * temperature;
    let mut velocities: Vec<[f64; 3]> = masses
        .iter()
        .map(|&m| {
            let sigma = (kt / m).sqrt();
            let mut v = [0.0; 3];
            for component in &mut v {
                let z: f64 = rng.sample(StandardNormal);
                *component = sigma * z;
            }
            v
        })
        .collect();

    remove_com_velocity(&mut velocities, masses);

    let dof = (3 * masses.len()).saturating_sub(3);
    let current = kinetic_temperature(&velocities, masses, dof);
    if current > 0.0 {
        scale(&mut velocities, (temperature / current).sqrt());
    }
    velocities
}

/// Subtracts the mass-weighted mean velocity from every atom.
pub fn remove_com_velocity(velocities: &mut [[f64; 3]], masses: &[f64]) {
    let total_mass: f64 = masses.iter().sum();
    if total_mass <= 0.0 {
        return;
    }
    let mut momentum = [0.0; 3];
    for (v, m) in velocities.iter().zip(masses) {
        for d in 0..3 {
            momentum[d] += m * v[d];
        }
    }
    for v in velocities.iter_mut() {
        for d in 0..3 {
            v[d] -= momentum[d] / total_mass;
        }
    }
}

pub(crate) fn kinetic_temperature(velocities: &[[f64; 3]], masses: &[f64], dof: usize) -> f64 {
    if dof == 0 {
        return 0.0;
    }
    let twice_ke: f64 = velocities
        .iter()
        .zip(masses)
        .map(|(v, m)| m * (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]))
        .sum();
    twice_ke / (dof as f64 * BOLTZMANN)
}

pub(crate) fn scale(velocities: &mut [[f64; 3]], factor: f64) {
    for v in velocities.iter_mut() {
        for component in v.iter_mut() {
            *component *= factor;
        }
    }
}
