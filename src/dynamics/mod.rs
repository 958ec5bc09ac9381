//! Propagation of a [`ForceModel`](crate::engine::ForceModel) in time.
//!
//! - [`LangevinMiddleIntegrator`] – stochastic dynamics at constant temperature.
//! - [`maxwell_boltzmann_velocities`] – initial velocities at a given temperature.
//! - [`minimize`] – steepest-descent energy minimization.

mod langevin;
mod minimize;
mod velocities;

pub use langevin::LangevinMiddleIntegrator;
pub use minimize::{MinimizationReport, MinimizeOptions, minimize};
pub use velocities::{maxwell_boltzmann_velocities, remove_com_velocity};

pub(crate) use velocities::scale as scale_velocities;
