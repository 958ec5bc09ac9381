//! Potential energy, forces, and constraints of a parameterized system.
//!
//! A [`ForceModel`] owns one [`Force`] per interaction family (bonds, angles,
//! torsions, nonbonded) plus the [`ConstraintSet`] selected by the
//! [`EngineConfig`]. Positions are in nm, energies in kJ/mol and forces in
//! kJ/mol/nm.

mod bonded;
mod config;
mod constraints;
mod error;
mod nonbonded;

pub use bonded::{HarmonicAngleForce, HarmonicBondForce, PeriodicTorsionForce};
pub use config::{Constraints, EngineConfig, NonbondedMethod};
pub use constraints::{ConstraintSet, DistanceConstraint};
pub use error::Error;
pub use nonbonded::{COULOMB, NonbondedForce, REACTION_FIELD_DIELECTRIC};

use crate::model::pbc::min_box_extent;
use crate::model::topology::ParameterizedSystem;
use log::{debug, info};
use nalgebra::Vector3;

/// Molar Boltzmann constant in kJ/(mol·K).
pub const BOLTZMANN: f64 = 0.008314462618;

/// One additive term of the potential energy.
pub trait Force: Send + Sync {
    fn name(&self) -> &'static str;

    /// Adds this term's forces into `forces` and returns its energy.
    fn compute(&self, positions: &[[f64; 3]], forces: &mut [[f64; 3]]) -> f64;
}

#[inline]
pub(crate) fn vec3(p: &[f64; 3]) -> Vector3<f64> {
    Vector3::new(p[0], p[1], p[2])
}

#[inline]
pub(crate) fn add_force(forces: &mut [[f64; 3]], atom: usize, f: &Vector3<f64>) {
    forces[atom][0] += f.x;
    forces[atom][1] += f.y;
    forces[atom][2] += f.z;
}

pub struct ForceModel {
    forces: Vec<Box<dyn Force>>,
    masses: Vec<f64>,
    inv_masses: Vec<f64>,
    constraints: ConstraintSet,
    config: EngineConfig,
    box_vectors: Option<[[f64; 3]; 3]>,
}

impl ForceModel {
    pub fn new(system: &ParameterizedSystem, config: &EngineConfig) -> Result<Self, Error> {
        let n_atoms = system.system.atom_count();
        if system.atom_properties.len() != n_atoms {
            return Err(Error::AtomCountMismatch {
                expected: n_atoms,
                found: system.atom_properties.len(),
            });
        }

        let masses = system.masses();
        if let Some((atom, &mass)) = masses.iter().enumerate().find(|(_, m)| **m <= 0.0) {
            return Err(Error::InvalidMass { atom, mass });
        }

        let box_vectors = system.system.box_vectors;
        let method = config.nonbonded_method;
        if method.uses_cutoff() && config.cutoff <= 0.0 {
            return Err(Error::invalid_config(format!(
                "cutoff must be positive, got {}",
                config.cutoff
            )));
        }
        if method.is_periodic() {
            let box_vectors = box_vectors.as_ref().ok_or(Error::MissingBox(method.name()))?;
            let limit = 0.5 * min_box_extent(box_vectors);
            if config.cutoff > limit {
                return Err(Error::CutoffTooLarge {
                    cutoff: config.cutoff,
                    limit,
                });
            }
        }
        if config.constraint_tolerance <= 0.0 {
            return Err(Error::invalid_config("constraint tolerance must be positive"));
        }

        let constraints =
            ConstraintSet::from_system(system, config.constraints, config.constraint_tolerance);

        // Constrained bonds carry no harmonic term.
        let bonds = system
            .potentials
            .bonds
            .iter()
            .filter(|b| !constraints.contains(b.i, b.j))
            .cloned()
            .collect();

        let forces: Vec<Box<dyn Force>> = vec![
            Box::new(HarmonicBondForce::new(bonds)),
            Box::new(HarmonicAngleForce::new(system.potentials.angles.clone())),
            Box::new(PeriodicTorsionForce::new(system.potentials.torsions.clone())),
            Box::new(NonbondedForce::new(
                system.charges(),
                &system.nonbonded,
                method,
                config.cutoff,
                box_vectors,
            )),
        ];

        let model = Self {
            forces,
            inv_masses: masses.iter().map(|m| 1.0 / m).collect(),
            masses,
            constraints,
            config: config.clone(),
            box_vectors,
        };

        info!(
            "built force model: {} atoms, {} nonbonded, {} constraints, {} degrees of freedom",
            n_atoms,
            method,
            model.constraints.len(),
            model.degrees_of_freedom()
        );
        debug!(
            "force terms: {:?}",
            model.forces.iter().map(|f| f.name()).collect::<Vec<_>>()
        );

        Ok(model)
    }

    pub fn n_atoms(&self) -> usize {
        self.masses.len()
    }

    pub fn masses(&self) -> &[f64] {
        &self.masses
    }

    pub fn inverse_masses(&self) -> &[f64] {
        &self.inv_masses
    }

    pub fn constraints(&self) -> &ConstraintSet {
        &self.constraints
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn box_vectors(&self) -> Option<&[[f64; 3]; 3]> {
        self.box_vectors.as_ref()
    }

    /// `3N − constraints − 3` when center-of-mass motion is removed.
    pub fn degrees_of_freedom(&self) -> usize {
        let removed = self.constraints.len() + if self.config.remove_cm_motion { 3 } else { 0 };
        (3 * self.n_atoms()).saturating_sub(removed)
    }

    fn check_len(&self, found: usize) -> Result<(), Error> {
        if found != self.n_atoms() {
            return Err(Error::AtomCountMismatch {
                expected: self.n_atoms(),
                found,
            });
        }
        Ok(())
    }

    /// Total potential energy. `forces` is overwritten.
    pub fn compute(&self, positions: &[[f64; 3]], forces: &mut [[f64; 3]]) -> Result<f64, Error> {
        self.check_len(positions.len())?;
        self.check_len(forces.len())?;
        forces.iter_mut().for_each(|f| *f = [0.0; 3]);

        let mut total = 0.0;
        for force in &self.forces {
            let energy = force.compute(positions, forces);
            if !energy.is_finite() {
                return Err(Error::NonFiniteEnergy { term: force.name() });
            }
            total += energy;
        }
        Ok(total)
    }

    pub fn potential_energy(&self, positions: &[[f64; 3]]) -> Result<f64, Error> {
        let mut forces = vec![[0.0; 3]; positions.len()];
        self.compute(positions, &mut forces)
    }

    /// Energy of each force term, in evaluation order.
    ///
    /// Fails on the first term whose energy is not finite.
    pub fn energy_breakdown(&self, positions: &[[f64; 3]]) -> Result<Vec<(&'static str, f64)>, Error> {
        self.check_len(positions.len())?;
        let mut scratch = vec![[0.0; 3]; positions.len()];
        self.forces
            .iter()
            .map(|force| {
                let energy = force.compute(positions, &mut scratch);
                if energy.is_finite() {
                    Ok((force.name(), energy))
                } else {
                    Err(Error::NonFiniteEnergy { term: force.name() })
                }
            })
            .collect()
    }

    /// `½ Σ m v²` in kJ/mol.
    pub fn kinetic_energy(&self, velocities: &[[f64; 3]]) -> f64 {
        velocities
            .iter()
            .zip(&self.masses)
            .map(|(v, m)| 0.5 * m * (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]))
            .sum()
    }

    /// Instantaneous temperature in K.
    pub fn temperature(&self, velocities: &[[f64; 3]]) -> f64 {
        let dof = self.degrees_of_freedom();
        if dof == 0 {
            return 0.0;
        }
        2.0 * self.kinetic_energy(velocities) / (dof as f64 * BOLTZMANN)
    }
}
