use super::config::Constraints;
use super::error::Error;
use super::vec3;
use crate::model::topology::ParameterizedSystem;
use log::debug;
use std::collections::HashMap;

pub const MAX_ITERATIONS: usize = 1000;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DistanceConstraint {
    pub i: usize,
    pub j: usize,
    /// nm
    pub length: f64,
}

/// Holonomic bond-length constraints, solved with SHAKE for positions and a
/// RATTLE projection for velocities.
#[derive(Debug, Clone, Default)]
pub struct ConstraintSet {
    constraints: Vec<DistanceConstraint>,
    tolerance: f64,
}

impl ConstraintSet {
    pub fn new(constraints: Vec<DistanceConstraint>, tolerance: f64) -> Self {
        Self {
            constraints,
            tolerance,
        }
    }

    /// Builds the constraints selected by `mode`, taking each length from the
    /// bond's equilibrium length.
    pub fn from_system(system: &ParameterizedSystem, mode: Constraints, tolerance: f64) -> Self {
        let lengths: HashMap<(usize, usize), f64> = system
            .potentials
            .bonds
            .iter()
            .map(|b| ((b.i.min(b.j), b.i.max(b.j)), b.length))
            .collect();

        let atoms = &system.system.atoms;
        let constraints = system
            .system
            .bonds
            .iter()
            .filter(|bond| match mode {
                Constraints::None => false,
                Constraints::HBonds => {
                    atoms[bond.i].element.is_hydrogen() || atoms[bond.j].element.is_hydrogen()
                }
                Constraints::AllBonds => true,
            })
            .filter_map(|bond| {
                lengths.get(&(bond.i, bond.j)).map(|&length| DistanceConstraint {
                    i: bond.i,
                    j: bond.j,
                    length,
                })
            })
            .collect();

        Self::new(constraints, tolerance)
    }

    pub fn len(&self) -> usize {
        self.constraints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.constraints.is_empty()
    }

    pub fn constraints(&self) -> &[DistanceConstraint] {
        &self.constraints
    }

    /// Returns `true` if the pair is held at fixed length.
    pub fn contains(&self, i: usize, j: usize) -> bool {
        let (a, b) = (i.min(j), i.max(j));
        self.constraints.iter().any(|c| c.i == a && c.j == b)
    }

    /// Moves `positions` onto the constraint surface with SHAKE, correcting
    /// along the bond directions of `reference`.
    ///
    /// Returns the number of iterations used.
    pub fn apply_positions(
        &self,
        reference: &[[f64; 3]],
        positions: &mut [[f64; 3]],
        inv_masses: &[f64],
    ) -> Result<usize, Error> {
        if self.constraints.is_empty() {
            return Ok(0);
        }

        for iteration in 0..MAX_ITERATIONS {
            let mut converged = true;
            for c in &self.constraints {
                let r = vec3(&positions[c.i]) - vec3(&positions[c.j]);
                let target = c.length * c.length;
                let diff = target - r.norm_squared();
                if diff.abs() <= 2.0 * self.tolerance * target {
                    continue;
                }
                converged = false;

                let r_ref = vec3(&reference[c.i]) - vec3(&reference[c.j]);
                let w = inv_masses[c.i] + inv_masses[c.j];
                let denom = 2.0 * w * r_ref.dot(&r);
                if denom.abs() < f64::EPSILON {
                    return Err(Error::ConstraintFailure { iterations: iteration });
                }
                let g = diff / denom;
                for d in 0..3 {
                    positions[c.i][d] += g * inv_masses[c.i] * r_ref[d];
                    positions[c.j][d] -= g * inv_masses[c.j] * r_ref[d];
                }
            }
            if converged {
                if iteration > 0 {
                    debug!("SHAKE converged in {} iterations", iteration);
                }
                return Ok(iteration);
            }
        }

        Err(Error::ConstraintFailure {
            iterations: MAX_ITERATIONS,
        })
    }

    /// Removes velocity components along constrained bonds.
    pub fn apply_velocities(
        &self,
        positions: &[[f64; 3]],
        velocities: &mut [[f64; 3]],
        inv_masses: &[f64],
    ) -> Result<usize, Error> {
        if self.constraints.is_empty() {
            return Ok(0);
        }

        for iteration in 0..MAX_ITERATIONS {
            let mut converged = true;
            for c in &self.constraints {
                let r = vec3(&positions[c.i]) - vec3(&positions[c.j]);
                let dv = vec3(&velocities[c.i]) - vec3(&velocities[c.j]);
                let r_sq = r.norm_squared();
                let rv = r.dot(&dv);
                if rv.abs() <= self.tolerance * r_sq {
                    continue;
                }
                converged = false;

                let k = rv / (r_sq * (inv_masses[c.i] + inv_masses[c.j]));
                for d in 0..3 {
                    velocities[c.i][d] -= k * inv_masses[c.i] * r[d];
                    velocities[c.j][d] += k * inv_masses[c.j] * r[d];
                }
            }
            if converged {
                return Ok(iteration);
            }
        }

        Err(Error::ConstraintFailure {
            iterations: MAX_ITERATIONS,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn distance(a: &[f64; 3], b: &[f64; 3]) -> f64 {
        (vec3(a) - vec3(b)).norm()
    }

    fn water_constraints() -> ConstraintSet {
        ConstraintSet::new(
            vec![
                DistanceConstraint {
                    i: 0,
                    j: 1,
                    length: 0.09572,
                },
                DistanceConstraint {
                    i: 0,
                    j: 2,
                    length: 0.09572,
                },
            ],
            1e-8,
        )
    }

    #[test]
    fn shake_restores_bond_lengths() {
        let constraints = water_constraints();
        let inv_masses = [1.0 / 15.999, 1.0 / 1.008, 1.0 / 1.008];
        let reference = [[0.0, 0.0, 0.0], [0.09572, 0.0, 0.0], [-0.024, 0.0927, 0.0]];
        let mut positions = [[0.001, 0.0, 0.0], [0.1, 0.002, 0.0], [-0.026, 0.095, 0.001]];

        constraints
            .apply_positions(&reference, &mut positions, &inv_masses)
            .unwrap();

        assert_relative_eq!(distance(&positions[0], &positions[1]), 0.09572, epsilon = 1e-8);
        assert_relative_eq!(distance(&positions[0], &positions[2]), 0.09572, epsilon = 1e-8);
    }

    #[test]
    fn rattle_removes_bond_stretching_velocity() {
        let constraints = water_constraints();
        let inv_masses = [1.0 / 15.999, 1.0 / 1.008, 1.0 / 1.008];
        let positions = [[0.0, 0.0, 0.0], [0.09572, 0.0, 0.0], [0.0, 0.09572, 0.0]];
        let mut velocities = [[0.0, 0.0, 0.0], [1.0, 0.5, 0.0], [0.0, -2.0, 0.3]];

        constraints
            .apply_velocities(&positions, &mut velocities, &inv_masses)
            .unwrap();

        for (i, j) in [(0, 1), (0, 2)] {
            let r = vec3(&positions[i]) - vec3(&positions[j]);
            let dv = vec3(&velocities[i]) - vec3(&velocities[j]);
            assert!(r.dot(&dv).abs() < 1e-6);
        }
        // The perpendicular component survives.
        assert_relative_eq!(velocities[1][1], 0.5, epsilon = 1e-6);
    }

    #[test]
    fn contains_is_order_independent() {
        let constraints = water_constraints();
        assert!(constraints.contains(1, 0));
        assert!(!constraints.contains(1, 2));
        assert_eq!(constraints.len(), 2);
    }

    #[test]
    fn empty_set_is_a_no_op() {
        let constraints = ConstraintSet::default();
        let mut positions = [[0.0; 3]; 2];
        assert_eq!(
            constraints
                .apply_positions(&[[0.0; 3]; 2], &mut positions, &[1.0, 1.0])
                .unwrap(),
            0
        );
    }
}
