use super::config::NonbondedMethod;
use super::{Force, add_force, vec3};
use crate::model::pbc::minimum_image;
use crate::model::topology::{CombiningRule, LjParticle, NonbondedException, NonbondedParams};
use nalgebra::Vector3;
use std::collections::HashSet;

/// Coulomb constant `1/(4πε₀)` in kJ·nm/(mol·e²).
pub const COULOMB: f64 = 138.935458;

/// Solvent dielectric used by reaction-field electrostatics.
pub const REACTION_FIELD_DIELECTRIC: f64 = 78.3;

/// Pairs closer than this (nm) have collapsed onto each other.
const MIN_DISTANCE: f64 = 1e-10;

pub struct NonbondedForce {
    charges: Vec<f64>,
    particles: Vec<LjParticle>,
    combining_rule: CombiningRule,
    /// Pairs skipped by the all-pairs loop: exclusions plus exception pairs.
    skipped: HashSet<(usize, usize)>,
    exceptions: Vec<NonbondedException>,
    method: NonbondedMethod,
    cutoff: f64,
    box_vectors: Option<[[f64; 3]; 3]>,
    krf: f64,
    crf: f64,
}

impl NonbondedForce {
    pub fn new(
        charges: Vec<f64>,
        params: &NonbondedParams,
        method: NonbondedMethod,
        cutoff: f64,
        box_vectors: Option<[[f64; 3]; 3]>,
    ) -> Self {
        let mut skipped: HashSet<(usize, usize)> = params.exclusions.iter().copied().collect();
        skipped.extend(params.exceptions.iter().map(|e| ordered(e.i, e.j)));

        let eps = REACTION_FIELD_DIELECTRIC;
        let (krf, crf) = if method.uses_cutoff() {
            (
                (eps - 1.0) / (2.0 * eps + 1.0) / cutoff.powi(3),
                3.0 * eps / (2.0 * eps + 1.0) / cutoff,
            )
        } else {
            (0.0, 0.0)
        };

        Self {
            charges,
            particles: params.particles.clone(),
            combining_rule: params.combining_rule,
            skipped,
            exceptions: params.exceptions.clone(),
            method,
            cutoff,
            box_vectors,
            krf,
            crf,
        }
    }

    fn displacement(&self, from: &[f64; 3], to: &[f64; 3]) -> Vector3<f64> {
        let delta = [to[0] - from[0], to[1] - from[1], to[2] - from[2]];
        match (&self.box_vectors, self.method.is_periodic()) {
            (Some(box_vectors), true) => vec3(&minimum_image(delta, box_vectors)),
            _ => vec3(&delta),
        }
    }

    /// Energy and `dE/dr / r` of one regular pair at distance `r`.
    fn pair(&self, qq: f64, sigma: f64, epsilon: f64, r: f64) -> (f64, f64) {
        let mut energy = 0.0;
        let mut de_dr = 0.0;

        if epsilon != 0.0 {
            let (lj, dlj) = lennard_jones(sigma, epsilon, r);
            energy += lj;
            de_dr += dlj;
        }

        if qq != 0.0 {
            let prefactor = COULOMB * qq;
            if self.method.uses_cutoff() {
                energy += prefactor * (1.0 / r + self.krf * r * r - self.crf);
                de_dr += prefactor * (-1.0 / (r * r) + 2.0 * self.krf * r);
            } else {
                energy += prefactor / r;
                de_dr += -prefactor / (r * r);
            }
        }

        (energy, de_dr / r)
    }
}

impl Force for NonbondedForce {
    fn name(&self) -> &'static str {
        "NonbondedForce"
    }

    fn compute(&self, positions: &[[f64; 3]], forces: &mut [[f64; 3]]) -> f64 {
        let n = positions.len();
        let cutoff_sq = self.cutoff * self.cutoff;
        let mut energy = 0.0;

        for i in 0..n {
            for j in (i + 1)..n {
                if self.skipped.contains(&(i, j)) {
                    continue;
                }
                let delta = self.displacement(&positions[i], &positions[j]);
                let r_sq = delta.norm_squared();
                if self.method.uses_cutoff() && r_sq >= cutoff_sq {
                    continue;
                }
                let r = r_sq.sqrt();
                if r < MIN_DISTANCE {
                    return f64::INFINITY;
                }

                let (sigma, epsilon) =
                    self.combining_rule
                        .combine(self.particles[i], self.particles[j]);
                let qq = self.charges[i] * self.charges[j];
                let (e, de_dr_over_r) = self.pair(qq, sigma, epsilon, r);
                energy += e;

                let f_j = delta * (-de_dr_over_r);
                add_force(forces, j, &f_j);
                add_force(forces, i, &(-f_j));
            }
        }

        // Scaled 1-4 pairs: plain Coulomb and LJ, never cut off.
        for exception in &self.exceptions {
            let delta = vec3(&positions[exception.j]) - vec3(&positions[exception.i]);
            let r = delta.norm();
            if r < MIN_DISTANCE {
                return f64::INFINITY;
            }

            let mut e = exception.charge_product * COULOMB / r;
            let mut de_dr = -e / r;
            if exception.epsilon != 0.0 {
                let (lj, dlj) = lennard_jones(exception.sigma, exception.epsilon, r);
                e += lj;
                de_dr += dlj;
            }
            energy += e;

            let f_j = delta * (-de_dr / r);
            add_force(forces, exception.j, &f_j);
            add_force(forces, exception.i, &(-f_j));
        }

        energy
    }
}

/// `4ε[(σ/r)¹² − (σ/r)⁶]` and its radial derivative.
fn lennard_jones(sigma: f64, epsilon: f64, r: f64) -> (f64, f64) {
    let s6 = (sigma / r).powi(6);
    let s12 = s6 * s6;
    let energy = 4.0 * epsilon * (s12 - s6);
    let de_dr = 24.0 * epsilon * (s6 - 2.0 * s12) / r;
    (energy, de_dr)
}

#[inline]
fn ordered(a: usize, b: usize) -> (usize, usize) {
    if a < b { (a, b) } else { (b, a) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::tests::assert_forces_match_gradient;
    use approx::assert_relative_eq;

    fn params(particles: Vec<LjParticle>) -> NonbondedParams {
        NonbondedParams {
            particles,
            exclusions: Vec::new(),
            exceptions: Vec::new(),
            combining_rule: CombiningRule::Geometric,
        }
    }

    fn argon() -> LjParticle {
        LjParticle {
            sigma: 0.34,
            epsilon: 0.996,
        }
    }

    #[test]
    fn lj_minimum_at_two_to_the_sixth_sigma() {
        let force = NonbondedForce::new(
            vec![0.0, 0.0],
            &params(vec![argon(), argon()]),
            NonbondedMethod::NoCutoff,
            1.0,
            None,
        );
        let r_min = 2f64.powf(1.0 / 6.0) * 0.34;
        let positions = [[0.0, 0.0, 0.0], [r_min, 0.0, 0.0]];
        let mut forces = vec![[0.0; 3]; 2];
        let energy = force.compute(&positions, &mut forces);

        assert_relative_eq!(energy, -0.996, epsilon = 1e-9);
        assert_relative_eq!(forces[0][0], 0.0, epsilon = 1e-9);
    }

    #[test]
    fn coulomb_between_unit_charges() {
        let neutral = LjParticle {
            sigma: 0.1,
            epsilon: 0.0,
        };
        let force = NonbondedForce::new(
            vec![1.0, -1.0],
            &params(vec![neutral, neutral]),
            NonbondedMethod::NoCutoff,
            1.0,
            None,
        );
        let positions = [[0.0, 0.0, 0.0], [0.5, 0.0, 0.0]];
        let mut forces = vec![[0.0; 3]; 2];
        let energy = force.compute(&positions, &mut forces);

        assert_relative_eq!(energy, -COULOMB / 0.5, epsilon = 1e-9);
        // Opposite charges attract.
        assert!(forces[0][0] > 0.0);
        assert!(forces[1][0] < 0.0);
    }

    #[test]
    fn reaction_field_energy_vanishes_at_cutoff() {
        let neutral = LjParticle {
            sigma: 0.1,
            epsilon: 0.0,
        };
        let force = NonbondedForce::new(
            vec![1.0, 1.0],
            &params(vec![neutral, neutral]),
            NonbondedMethod::CutoffNonPeriodic,
            1.0,
            None,
        );
        let mut forces = vec![[0.0; 3]; 2];
        let near_cutoff = force.compute(&[[0.0; 3], [0.999_999, 0.0, 0.0]], &mut forces);
        assert_relative_eq!(near_cutoff, 0.0, epsilon = 1e-3);

        let mut forces = vec![[0.0; 3]; 2];
        let beyond = force.compute(&[[0.0; 3], [1.2, 0.0, 0.0]], &mut forces);
        assert_eq!(beyond, 0.0);
        assert_eq!(forces[0], [0.0; 3]);
    }

    #[test]
    fn periodic_pairs_use_minimum_image() {
        let box_vectors = [[3.0, 0.0, 0.0], [0.0, 3.0, 0.0], [0.0, 0.0, 3.0]];
        let force = NonbondedForce::new(
            vec![0.0, 0.0],
            &params(vec![argon(), argon()]),
            NonbondedMethod::CutoffPeriodic,
            1.0,
            Some(box_vectors),
        );
        let mut wrapped = vec![[0.0; 3]; 2];
        let e_wrapped = force.compute(&[[0.1, 0.0, 0.0], [2.7, 0.0, 0.0]], &mut wrapped);
        let mut direct = vec![[0.0; 3]; 2];
        let e_direct = force.compute(&[[0.1, 0.0, 0.0], [-0.3, 0.0, 0.0]], &mut direct);

        assert_relative_eq!(e_wrapped, e_direct, epsilon = 1e-12);
        assert_relative_eq!(wrapped[0][0], direct[0][0], epsilon = 1e-9);
    }

    #[test]
    fn exclusions_and_exceptions_replace_regular_pairs() {
        let mut nb = params(vec![argon(), argon(), argon()]);
        nb.exclusions = vec![(0, 1)];
        nb.exceptions = vec![NonbondedException {
            i: 0,
            j: 2,
            charge_product: 0.0,
            sigma: 0.34,
            epsilon: 0.498,
        }];
        let force = NonbondedForce::new(
            vec![0.0; 3],
            &nb,
            NonbondedMethod::NoCutoff,
            1.0,
            None,
        );

        let r_min = 2f64.powf(1.0 / 6.0) * 0.34;
        // Atom 1 sits far from 2 so only the scaled 0-2 pair contributes.
        let positions = [[0.0, 0.0, 0.0], [0.0, 0.1, 0.0], [r_min, 0.0, 0.0]];
        let mut forces = vec![[0.0; 3]; 3];
        let energy = force.compute(&positions, &mut forces);

        let mut expected_12 = vec![[0.0; 3]; 3];
        let regular = NonbondedForce::new(
            vec![0.0; 2],
            &params(vec![argon(), argon()]),
            NonbondedMethod::NoCutoff,
            1.0,
            None,
        );
        let e_12 = regular.compute(&[positions[1], positions[2]], &mut expected_12);

        assert_relative_eq!(energy, -0.498 + e_12, epsilon = 1e-9);
    }

    #[test]
    fn forces_match_gradient() {
        let mut nb = params(vec![
            argon(),
            LjParticle {
                sigma: 0.3,
                epsilon: 0.5,
            },
            argon(),
        ]);
        nb.exceptions = vec![NonbondedException {
            i: 0,
            j: 2,
            charge_product: -0.05,
            sigma: 0.32,
            epsilon: 0.2,
        }];
        let force = NonbondedForce::new(
            vec![0.3, -0.2, 0.1],
            &nb,
            NonbondedMethod::CutoffNonPeriodic,
            1.2,
            None,
        );
        let positions = vec![[0.0, 0.0, 0.0], [0.37, 0.05, -0.02], [0.1, 0.42, 0.1]];
        assert_forces_match_gradient(&force, &positions);
    }
}
