//! Drives a [`ForceModel`] with an integrator and hands snapshots to
//! [`Reporter`]s.
//!
//! A [`Simulation`] owns the force model, the integrator and the dynamic state
//! (positions, velocities, forces, step counter and elapsed time). Reporters
//! are borrowed per call to [`Simulation::step`], so one run can report to
//! stdout while the next writes a trajectory.

mod error;
mod reporters;

pub use error::Error;
pub use reporters::{Column, DcdReporter, Reporter, StateDataReporter};

use crate::dynamics::{
    LangevinMiddleIntegrator, MinimizationReport, MinimizeOptions, maxwell_boltzmann_velocities,
    minimize, scale_velocities,
};
use crate::engine::{self, ForceModel};
use log::info;

/// A read-only view of the dynamic state after a step.
#[derive(Debug, Clone, Copy)]
pub struct State<'a> {
    pub step: u64,
    /// Elapsed simulated time in ps.
    pub time: f64,
    pub positions: &'a [[f64; 3]],
    pub velocities: &'a [[f64; 3]],
    pub box_vectors: Option<&'a [[f64; 3]; 3]>,
    pub potential_energy: f64,
    pub kinetic_energy: f64,
    pub temperature: f64,
}

impl State<'_> {
    pub fn total_energy(&self) -> f64 {
        self.potential_energy + self.kinetic_energy
    }
}

pub struct Simulation {
    model: ForceModel,
    integrator: LangevinMiddleIntegrator,
    positions: Vec<[f64; 3]>,
    velocities: Vec<[f64; 3]>,
    forces: Vec<[f64; 3]>,
    potential_energy: f64,
    step: u64,
    time: f64,
}

impl Simulation {
    /// Starts at rest, at step 0.
    pub fn new(
        model: ForceModel,
        integrator: LangevinMiddleIntegrator,
        positions: Vec<[f64; 3]>,
    ) -> Result<Self, Error> {
        let n = positions.len();
        let mut forces = vec![[0.0; 3]; n];
        let potential_energy = model.compute(&positions, &mut forces)?;
        Ok(Self {
            model,
            integrator,
            positions,
            velocities: vec![[0.0; 3]; n],
            forces,
            potential_energy,
            step: 0,
            time: 0.0,
        })
    }

    pub fn model(&self) -> &ForceModel {
        &self.model
    }

    pub fn integrator(&self) -> &LangevinMiddleIntegrator {
        &self.integrator
    }

    pub fn integrator_mut(&mut self) -> &mut LangevinMiddleIntegrator {
        &mut self.integrator
    }

    pub fn positions(&self) -> &[[f64; 3]] {
        &self.positions
    }

    pub fn velocities(&self) -> &[[f64; 3]] {
        &self.velocities
    }

    pub fn current_step(&self) -> u64 {
        self.step
    }

    pub fn time(&self) -> f64 {
        self.time
    }

    pub fn potential_energy(&self) -> f64 {
        self.potential_energy
    }

    pub fn state(&self) -> State<'_> {
        State {
            step: self.step,
            time: self.time,
            positions: &self.positions,
            velocities: &self.velocities,
            box_vectors: self.model.box_vectors(),
            potential_energy: self.potential_energy,
            kinetic_energy: self.model.kinetic_energy(&self.velocities),
            temperature: self.model.temperature(&self.velocities),
        }
    }

    pub fn set_positions(&mut self, positions: Vec<[f64; 3]>) -> Result<(), Error> {
        let mut forces = vec![[0.0; 3]; positions.len()];
        self.potential_energy = self.model.compute(&positions, &mut forces)?;
        self.positions = positions;
        self.forces = forces;
        Ok(())
    }

    pub fn set_velocities(&mut self, velocities: Vec<[f64; 3]>) -> Result<(), Error> {
        if velocities.len() != self.positions.len() {
            return Err(engine::Error::AtomCountMismatch {
                expected: self.positions.len(),
                found: velocities.len(),
            }
            .into());
        }
        self.velocities = velocities;
        Ok(())
    }

    /// Draws Maxwell-Boltzmann velocities from the integrator's random stream,
    /// projects out constrained components and rescales to exactly
    /// `temperature`.
    pub fn set_velocities_to_temperature(&mut self, temperature: f64) -> Result<(), Error> {
        let mut velocities =
            maxwell_boltzmann_velocities(self.model.masses(), temperature, self.integrator.rng_mut());

        let constraints = self.model.constraints();
        if !constraints.is_empty() {
            constraints.apply_velocities(
                &self.positions,
                &mut velocities,
                self.model.inverse_masses(),
            )?;
        }
        // The sampler counts 3N − 3 degrees of freedom; the model may count
        // fewer (constraints) or more (center of mass kept).
        let current = self.model.temperature(&velocities);
        if current > 0.0 {
            scale_velocities(&mut velocities, (temperature / current).sqrt());
        }

        self.velocities = velocities;
        Ok(())
    }

    /// Minimizes the potential energy in place. Velocities are kept.
    pub fn minimize(&mut self, options: &MinimizeOptions) -> Result<MinimizationReport, Error> {
        let report = minimize(&self.model, &mut self.positions, options)?;
        self.potential_energy = self.model.compute(&self.positions, &mut self.forces)?;
        Ok(report)
    }

    /// Integrates `steps` steps, reporting after every step that is a
    /// multiple of a reporter's interval.
    pub fn step(&mut self, steps: u64, reporters: &mut [&mut dyn Reporter]) -> Result<(), Error> {
        info!(
            "running {} steps from step {} (dt = {} ps, T = {} K)",
            steps, self.step, self.integrator.step_size, self.integrator.temperature
        );

        for _ in 0..steps {
            self.potential_energy = self.integrator.step(
                &self.model,
                &mut self.positions,
                &mut self.velocities,
                &mut self.forces,
            )?;
            self.step += 1;
            self.time += self.integrator.step_size;

            for reporter in reporters.iter_mut() {
                let interval = reporter.interval();
                if interval > 0 && self.step % interval == 0 {
                    reporter.report(&self.state())?;
                }
            }
        }

        info!(
            "reached step {} ({:.3} ps), potential energy {:.4} kJ/mol",
            self.step, self.time, self.potential_energy
        );
        Ok(())
    }
}
