use super::{Force, add_force, vec3};
use crate::model::topology::{HarmonicAngle, HarmonicBond, PeriodicTorsion};

/// Below this norm a bond vector or plane normal is treated as degenerate and
/// contributes energy but no force.
const DEGENERATE: f64 = 1e-12;

pub struct HarmonicBondForce {
    bonds: Vec<HarmonicBond>,
}

impl HarmonicBondForce {
    pub fn new(bonds: Vec<HarmonicBond>) -> Self {
        Self { bonds }
    }
}

impl Force for HarmonicBondForce {
    fn name(&self) -> &'static str {
        "HarmonicBondForce"
    }

    fn compute(&self, positions: &[[f64; 3]], forces: &mut [[f64; 3]]) -> f64 {
        let mut energy = 0.0;
        for bond in &self.bonds {
            let delta = vec3(&positions[bond.j]) - vec3(&positions[bond.i]);
            let r = delta.norm();
            let dr = r - bond.length;
            energy += 0.5 * bond.k * dr * dr;

            if r > DEGENERATE {
                // Force on j points back toward i when stretched.
                let f_j = delta * (-bond.k * dr / r);
                add_force(forces, bond.j, &f_j);
                add_force(forces, bond.i, &(-f_j));
            }
        }
        energy
    }
}

pub struct HarmonicAngleForce {
    angles: Vec<HarmonicAngle>,
}

impl HarmonicAngleForce {
    pub fn new(angles: Vec<HarmonicAngle>) -> Self {
        Self { angles }
    }
}

impl Force for HarmonicAngleForce {
    fn name(&self) -> &'static str {
        "HarmonicAngleForce"
    }

    fn compute(&self, positions: &[[f64; 3]], forces: &mut [[f64; 3]]) -> f64 {
        let mut energy = 0.0;
        for angle in &self.angles {
            let vertex = vec3(&positions[angle.j]);
            let u = vec3(&positions[angle.i]) - vertex;
            let v = vec3(&positions[angle.k]) - vertex;
            let (nu, nv) = (u.norm(), v.norm());
            if nu < DEGENERATE || nv < DEGENERATE {
                continue;
            }

            let cos_theta = (u.dot(&v) / (nu * nv)).clamp(-1.0, 1.0);
            let theta = cos_theta.acos();
            let d_theta = theta - angle.angle;
            energy += 0.5 * angle.k_force * d_theta * d_theta;

            let normal = u.cross(&v);
            let nn = normal.norm();
            if nn < DEGENERATE {
                continue;
            }
            let de_dtheta = angle.k_force * d_theta;
            let f_i = u.cross(&normal) * (-de_dtheta / (nu * nu * nn));
            let f_k = normal.cross(&v) * (-de_dtheta / (nv * nv * nn));
            add_force(forces, angle.i, &f_i);
            add_force(forces, angle.k, &f_k);
            add_force(forces, angle.j, &(-(f_i + f_k)));
        }
        energy
    }
}

pub struct PeriodicTorsionForce {
    torsions: Vec<PeriodicTorsion>,
}

impl PeriodicTorsionForce {
    pub fn new(torsions: Vec<PeriodicTorsion>) -> Self {
        Self { torsions }
    }
}

impl Force for PeriodicTorsionForce {
    fn name(&self) -> &'static str {
        "PeriodicTorsionForce"
    }

    fn compute(&self, positions: &[[f64; 3]], forces: &mut [[f64; 3]]) -> f64 {
        let mut energy = 0.0;
        for torsion in &self.torsions {
            let b1 = vec3(&positions[torsion.j]) - vec3(&positions[torsion.i]);
            let b2 = vec3(&positions[torsion.k]) - vec3(&positions[torsion.j]);
            let b3 = vec3(&positions[torsion.l]) - vec3(&positions[torsion.k]);

            let m = b1.cross(&b2);
            let n = b2.cross(&b3);
            let nb2 = b2.norm();
            let (mm, nn) = (m.norm_squared(), n.norm_squared());

            let phi = (nb2 * b1.dot(&n)).atan2(m.dot(&n));
            let periodicity = f64::from(torsion.periodicity);
            let arg = periodicity * phi - torsion.phase;
            energy += torsion.k_force * (1.0 + arg.cos());

            if mm < DEGENERATE || nn < DEGENERATE || nb2 < DEGENERATE {
                continue;
            }

            let de_dphi = -torsion.k_force * periodicity * arg.sin();
            let g_i = m * (-nb2 / mm);
            let g_l = n * (nb2 / nn);
            let b2_sq = nb2 * nb2;
            let s1 = b1.dot(&b2) / b2_sq;
            let s3 = b3.dot(&b2) / b2_sq;
            let g_j = g_i * (-s1 - 1.0) + g_l * s3;
            let g_k = g_l * (-s3 - 1.0) + g_i * s1;

            add_force(forces, torsion.i, &(g_i * -de_dphi));
            add_force(forces, torsion.j, &(g_j * -de_dphi));
            add_force(forces, torsion.k, &(g_k * -de_dphi));
            add_force(forces, torsion.l, &(g_l * -de_dphi));
        }
        energy
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::tests::assert_forces_match_gradient;
    use approx::assert_relative_eq;
    use std::f64::consts::PI;

    fn zeros(n: usize) -> Vec<[f64; 3]> {
        vec![[0.0; 3]; n]
    }

    #[test]
    fn bond_energy_and_force() {
        let force = HarmonicBondForce::new(vec![HarmonicBond {
            i: 0,
            j: 1,
            length: 0.1,
            k: 1000.0,
        }]);
        let positions = [[0.0, 0.0, 0.0], [0.12, 0.0, 0.0]];
        let mut forces = zeros(2);
        let energy = force.compute(&positions, &mut forces);

        assert_relative_eq!(energy, 0.5 * 1000.0 * 0.02 * 0.02, epsilon = 1e-12);
        assert_relative_eq!(forces[1][0], -20.0, epsilon = 1e-9);
        assert_relative_eq!(forces[0][0], 20.0, epsilon = 1e-9);
    }

    #[test]
    fn angle_energy_at_right_angle() {
        let force = HarmonicAngleForce::new(vec![HarmonicAngle {
            i: 0,
            j: 1,
            k: 2,
            angle: PI / 3.0,
            k_force: 100.0,
        }]);
        let positions = [[0.1, 0.0, 0.0], [0.0, 0.0, 0.0], [0.0, 0.1, 0.0]];
        let mut forces = zeros(3);
        let energy = force.compute(&positions, &mut forces);
        let d = PI / 2.0 - PI / 3.0;
        assert_relative_eq!(energy, 0.5 * 100.0 * d * d, epsilon = 1e-12);
        // Closing the angle pulls i toward k.
        assert!(forces[0][1] > 0.0);
        assert!(forces[2][0] > 0.0);
    }

    #[test]
    fn angle_forces_match_gradient() {
        let force = HarmonicAngleForce::new(vec![HarmonicAngle {
            i: 0,
            j: 1,
            k: 2,
            angle: 1.9,
            k_force: 350.0,
        }]);
        let positions = vec![[0.11, 0.02, -0.01], [0.0, 0.0, 0.0], [-0.03, 0.1, 0.04]];
        assert_forces_match_gradient(&force, &positions);
    }

    #[test]
    fn torsion_energy_follows_dihedral() {
        let force = PeriodicTorsionForce::new(vec![PeriodicTorsion {
            i: 0,
            j: 1,
            k: 2,
            l: 3,
            periodicity: 1,
            phase: 0.0,
            k_force: 2.0,
        }]);
        // Trans: phi = pi, cos term cancels.
        let trans = [[0.0, 0.1, 0.0], [0.0, 0.0, 0.0], [0.15, 0.0, 0.0], [0.15, -0.1, 0.0]];
        let mut forces = zeros(4);
        assert_relative_eq!(force.compute(&trans, &mut forces), 0.0, epsilon = 1e-12);

        // Cis: phi = 0, maximum.
        let cis = [[0.0, 0.1, 0.0], [0.0, 0.0, 0.0], [0.15, 0.0, 0.0], [0.15, 0.1, 0.0]];
        let mut forces = zeros(4);
        assert_relative_eq!(force.compute(&cis, &mut forces), 4.0, epsilon = 1e-12);
    }

    #[test]
    fn torsion_forces_match_gradient() {
        let force = PeriodicTorsionForce::new(vec![
            PeriodicTorsion {
                i: 0,
                j: 1,
                k: 2,
                l: 3,
                periodicity: 3,
                phase: 0.0,
                k_force: 0.6276,
            },
            PeriodicTorsion {
                i: 0,
                j: 1,
                k: 2,
                l: 3,
                periodicity: 2,
                phase: PI,
                k_force: -0.33,
            },
        ]);
        let positions = vec![
            [0.02, 0.14, 0.03],
            [0.0, 0.0, 0.0],
            [0.153, 0.0, 0.0],
            [0.19, -0.07, 0.12],
        ];
        assert_forces_match_gradient(&force, &positions);
    }

    #[test]
    fn forces_sum_to_zero() {
        let force = PeriodicTorsionForce::new(vec![PeriodicTorsion {
            i: 0,
            j: 1,
            k: 2,
            l: 3,
            periodicity: 1,
            phase: 0.3,
            k_force: 3.6,
        }]);
        let positions = [
            [0.02, 0.14, 0.03],
            [0.0, 0.0, 0.0],
            [0.153, 0.0, 0.0],
            [0.19, -0.07, 0.12],
        ];
        let mut forces = zeros(4);
        force.compute(&positions, &mut forces);
        for d in 0..3 {
            let total: f64 = forces.iter().map(|f| f[d]).sum();
            assert_relative_eq!(total, 0.0, epsilon = 1e-9);
        }
    }
}
