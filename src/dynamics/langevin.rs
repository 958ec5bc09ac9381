use super::velocities::remove_com_velocity;
use crate::engine::{BOLTZMANN, Error, ForceModel};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::StandardNormal;

/// Langevin dynamics with the "middle" splitting (velocity kick, half drift,
/// Ornstein-Uhlenbeck thermalization, half drift).
#[derive(Debug, Clone)]
pub struct LangevinMiddleIntegrator {
    /// Bath temperature in K.
    pub temperature: f64,
    /// Friction coefficient in 1/ps.
    pub friction: f64,
    /// Time step in ps.
    pub step_size: f64,
    seed: Option<u64>,
    rng: StdRng,
}

impl LangevinMiddleIntegrator {
    pub fn new(temperature: f64, friction: f64, step_size: f64) -> Self {
        Self {
            temperature,
            friction,
            step_size,
            seed: None,
            rng: StdRng::from_entropy(),
        }
    }

    /// Makes the random stream reproducible.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.set_seed(seed);
        self
    }

    pub fn set_seed(&mut self, seed: u64) {
        self.seed = Some(seed);
        self.rng = StdRng::seed_from_u64(seed);
    }

    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    pub(crate) fn rng_mut(&mut self) -> &mut StdRng {
        &mut self.rng
    }

    /// Advances the system by one step.
    ///
    /// On entry `forces` must hold the forces at `positions`; on return it
    /// holds the forces at the new positions and the new potential energy is
    /// returned.
    pub fn step(
        &mut self,
        model: &ForceModel,
        positions: &mut [[f64; 3]],
        velocities: &mut [[f64; 3]],
        forces: &mut [[f64; 3]],
    ) -> Result<f64, Error> {
        let dt = self.step_size;
        let half_dt = 0.5 * dt;
        let inv_masses = model.inverse_masses();
        let constraints = model.constraints();

        for ((v, f), inv_m) in velocities.iter_mut().zip(forces.iter()).zip(inv_masses) {
            for d in 0..3 {
                v[d] += dt * f[d] * inv_m;
            }
        }
        constraints.apply_velocities(positions, velocities, inv_masses)?;

        let mut trial: Vec<[f64; 3]> = positions
            .iter()
            .zip(velocities.iter())
            .map(|(x, v)| [x[0] + half_dt * v[0], x[1] + half_dt * v[1], x[2] + half_dt * v[2]])
            .collect();
        let midpoint = trial.clone();

        let a = (-self.friction * dt).exp();
        let kt = BOLTZMANN * self.temperature;
        for (v, inv_m) in velocities.iter_mut().zip(inv_masses) {
            let noise = (kt * (1.0 - a * a) * inv_m).sqrt();
            for component in v.iter_mut() {
                let xi: f64 = self.rng.sample(StandardNormal);
                *component = a * *component + noise * xi;
            }
        }

        for (x, v) in trial.iter_mut().zip(velocities.iter()) {
            for d in 0..3 {
                x[d] += half_dt * v[d];
            }
        }

        if !constraints.is_empty() {
            constraints.apply_positions(positions, &mut trial, inv_masses)?;
            // Velocities follow the constrained second half-drift.
            for ((v, x), mid) in velocities.iter_mut().zip(&trial).zip(&midpoint) {
                for d in 0..3 {
                    v[d] = (x[d] - mid[d]) / half_dt;
                }
            }
        }

        positions.copy_from_slice(&trial);
        if model.config().remove_cm_motion {
            remove_com_velocity(velocities, model.masses());
        }

        model.compute(positions, forces)
    }
}
