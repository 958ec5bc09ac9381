//! Post-hoc trajectory analysis.
//!
//! - [`Trajectory`] – DCD frames paired with a topology, stamped with time.
//! - [`select`] and [`find_atoms_by_name`] – atom selection.
//! - [`compute_distances`], [`compute_angles`], [`compute_dihedrals`] –
//!   per-frame geometry, with minimum-image wrapping for periodic frames.
//! - [`Histogram`] and [`Summary`] – distributions of the measured values.

mod error;
mod geometry;
mod histogram;
mod selection;
mod trajectory;

pub use error::Error;
pub use geometry::{angle, compute_angles, compute_dihedrals, compute_distances, dihedral, distance};
pub use histogram::{Histogram, Summary};
pub use selection::{find_atoms_by_name, select};
pub use trajectory::{Frame, Trajectory};
