use crate::engine::{Error, ForceModel};
use log::{debug, info};

/// Largest displacement of the first trial move, in nm.
const INITIAL_STEP: f64 = 0.01;
/// Below this step length no further progress is possible.
const MIN_STEP: f64 = 1e-12;
const GROW: f64 = 1.2;
const SHRINK: f64 = 0.2;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MinimizeOptions {
    /// Convergence threshold on the largest per-atom force, in kJ/mol/nm.
    pub tolerance: f64,
    /// Maximum number of trial moves; 0 runs until converged.
    pub max_iterations: usize,
}

impl Default for MinimizeOptions {
    fn default() -> Self {
        Self {
            tolerance: 10.0,
            max_iterations: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MinimizationReport {
    pub initial_energy: f64,
    pub final_energy: f64,
    pub iterations: usize,
    pub converged: bool,
    /// Largest per-atom force norm at the final positions, in kJ/mol/nm.
    pub max_force: f64,
}

/// Steepest-descent energy minimization with an adaptive step length.
///
/// Each trial moves every atom along its force, scaled so that the atom with
/// the largest force moves by the current step length. Accepted moves grow
/// the step, rejected moves shrink it. Constraints are enforced after every
/// trial, and force components along constrained bonds are ignored when
/// testing for convergence.
pub fn minimize(
    model: &ForceModel,
    positions: &mut [[f64; 3]],
    options: &MinimizeOptions,
) -> Result<MinimizationReport, Error> {
    let constraints = model.constraints();
    let inv_masses = model.inverse_masses();
    let unit_weights = vec![1.0; positions.len()];

    let reference = positions.to_vec();
    constraints.apply_positions(&reference, positions, inv_masses)?;

    let mut forces = vec![[0.0; 3]; positions.len()];
    let mut energy = model.compute(positions, &mut forces)?;
    constraints.apply_velocities(positions, &mut forces, &unit_weights)?;
    let initial_energy = energy;

    let mut step = INITIAL_STEP;
    let mut iterations = 0;
    let mut max_force = max_force_norm(&forces);
    let mut trial = positions.to_vec();
    let mut trial_forces = forces.clone();

    while max_force > options.tolerance
        && (options.max_iterations == 0 || iterations < options.max_iterations)
        && step > MIN_STEP
    {
        iterations += 1;

        let scale = step / max_force;
        for ((t, x), f) in trial.iter_mut().zip(positions.iter()).zip(&forces) {
            for d in 0..3 {
                t[d] = x[d] + scale * f[d];
            }
        }
        constraints.apply_positions(positions, &mut trial, inv_masses)?;

        let trial_energy = match model.compute(&trial, &mut trial_forces) {
            Ok(e) => e,
            Err(Error::NonFiniteEnergy { term }) => {
                debug!("trial move {} produced non-finite {} energy", iterations, term);
                f64::INFINITY
            }
            Err(e) => return Err(e),
        };

        if trial_energy < energy {
            positions.copy_from_slice(&trial);
            std::mem::swap(&mut forces, &mut trial_forces);
            constraints.apply_velocities(positions, &mut forces, &unit_weights)?;
            energy = trial_energy;
            max_force = max_force_norm(&forces);
            step *= GROW;
        } else {
            step *= SHRINK;
        }
    }

    let converged = max_force <= options.tolerance;
    info!(
        "minimization {} after {} iterations: {:.4} -> {:.4} kJ/mol (max force {:.3} kJ/mol/nm)",
        if converged { "converged" } else { "stopped" },
        iterations,
        initial_energy,
        energy,
        max_force
    );

    Ok(MinimizationReport {
        initial_energy,
        final_energy: energy,
        iterations,
        converged,
        max_force,
    })
}

fn max_force_norm(forces: &[[f64; 3]]) -> f64 {
    forces
        .iter()
        .map(|f| (f[0] * f[0] + f[1] * f[1] + f[2] * f[2]).sqrt())
        .fold(0.0, f64::max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{Constraints, EngineConfig};
    use crate::model::{
        atom::Atom,
        system::{Bond, System},
        topology::{
            AtomParam, CombiningRule, HarmonicAngle, HarmonicBond, LjParticle, NonbondedParams,
            ParameterizedSystem, Potentials,
        },
        types::Element,
    };
    use approx::assert_relative_eq;

    /// A bent triatomic with harmonic bonds and an angle term.
    fn distorted_water() -> ParameterizedSystem {
        let mut system = System::new();
        system.atoms.push(Atom::new(Element::O, [0.0, 0.0, 0.0]));
        system.atoms.push(Atom::new(Element::H, [0.12, 0.01, 0.0]));
        system.atoms.push(Atom::new(Element::H, [-0.01, 0.08, 0.02]));
        system.bonds.push(Bond::new(0, 1));
        system.bonds.push(Bond::new(0, 2));

        let bond = |j| HarmonicBond {
            i: 0,
            j,
            length: 0.09572,
            k: 462750.4,
        };
        ParameterizedSystem {
            system,
            atom_types: vec!["OW".into(), "HW".into()],
            atom_properties: vec![
                AtomParam {
                    charge: 0.0,
                    mass: 15.999,
                    type_index: 0,
                },
                AtomParam {
                    charge: 0.0,
                    mass: 1.008,
                    type_index: 1,
                },
                AtomParam {
                    charge: 0.0,
                    mass: 1.008,
                    type_index: 1,
                },
            ],
            potentials: Potentials {
                bonds: vec![bond(1), bond(2)],
                angles: vec![HarmonicAngle {
                    i: 1,
                    j: 0,
                    k: 2,
                    angle: 104.52f64.to_radians(),
                    k_force: 836.8,
                }],
                torsions: Vec::new(),
            },
            nonbonded: NonbondedParams {
                particles: vec![
                    LjParticle {
                        sigma: 0.3,
                        epsilon: 0.0,
                    };
                    3
                ],
                exclusions: vec![(0, 1), (0, 2), (1, 2)],
                exceptions: Vec::new(),
                combining_rule: CombiningRule::Geometric,
            },
        }
    }

    fn distance(a: &[f64; 3], b: &[f64; 3]) -> f64 {
        (0..3).map(|d| (a[d] - b[d]).powi(2)).sum::<f64>().sqrt()
    }

    #[test]
    fn relaxes_to_equilibrium_geometry() {
        let system = distorted_water();
        let model = ForceModel::new(&system, &EngineConfig::default()).unwrap();
        let mut positions = system.system.positions();
        let options = MinimizeOptions {
            tolerance: 1.0,
            max_iterations: 0,
        };

        let report = minimize(&model, &mut positions, &options).unwrap();

        assert!(report.converged);
        assert!(report.max_force <= 1.0);
        assert!(report.final_energy < report.initial_energy);
        assert_relative_eq!(distance(&positions[0], &positions[1]), 0.09572, epsilon = 1e-4);
        assert_relative_eq!(distance(&positions[0], &positions[2]), 0.09572, epsilon = 1e-4);
    }

    #[test]
    fn stops_at_iteration_limit() {
        let system = distorted_water();
        let model = ForceModel::new(&system, &EngineConfig::default()).unwrap();
        let mut positions = system.system.positions();
        let options = MinimizeOptions {
            tolerance: 1e-6,
            max_iterations: 3,
        };

        let report = minimize(&model, &mut positions, &options).unwrap();
        assert_eq!(report.iterations, 3);
        assert!(!report.converged);
    }

    #[test]
    fn constrained_minimization_keeps_bond_lengths() {
        let system = distorted_water();
        let config = EngineConfig {
            constraints: Constraints::HBonds,
            constraint_tolerance: 1e-8,
            ..EngineConfig::default()
        };
        let model = ForceModel::new(&system, &config).unwrap();
        let mut positions = system.system.positions();

        let report = minimize(&model, &mut positions, &MinimizeOptions::default()).unwrap();

        assert!(report.converged);
        assert_relative_eq!(distance(&positions[0], &positions[1]), 0.09572, max_relative = 1e-6);
        assert_relative_eq!(distance(&positions[0], &positions[2]), 0.09572, max_relative = 1e-6);
    }

    #[test]
    fn converged_input_takes_no_steps() {
        let system = distorted_water();
        let model = ForceModel::new(&system, &EngineConfig::default()).unwrap();
        let mut positions = system.system.positions();
        let options = MinimizeOptions {
            tolerance: f64::MAX,
            max_iterations: 0,
        };
        let report = minimize(&model, &mut positions, &options).unwrap();
        assert_eq!(report.iterations, 0);
        assert!(report.converged);
        assert_eq!(report.initial_energy, report.final_energy);
    }
}
