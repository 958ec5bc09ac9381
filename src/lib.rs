//! A pure Rust molecular dynamics workflow: load a structure, assign a force
//! field, minimize, equilibrate and run Langevin dynamics while recording a DCD
//! trajectory, then measure distances and dihedrals over the trajectory.
//!
//! # Features
//!
//! - **Structure and trajectory I/O** — PDB reading/writing and the CHARMM/OpenMM
//!   DCD binary trajectory format
//! - **Force field assignment** — residue templates and type/class-based bonded
//!   parameter lookup from TOML files, with a built-in OPLS-AA butane and TIP3P
//!   water parameter set
//! - **Energy model** — harmonic bonds and angles, periodic torsions,
//!   Lennard-Jones and Coulomb (or reaction-field) nonbonded terms, SHAKE/RATTLE
//!   bond constraints
//! - **Dynamics** — steepest-descent minimization and the Langevin "middle"
//!   integrator, with state-data and trajectory reporters
//! - **Analysis** — atom selection, distances, angles, dihedrals, histograms
//!
//! # Quick Start
//!
//! ```
//! use mdflow::dynamics::{LangevinMiddleIntegrator, MinimizeOptions};
//! use mdflow::engine::{Constraints, EngineConfig, ForceModel};
//! use mdflow::forcefield::{ParameterizeConfig, parameterize};
//! use mdflow::simulation::{Simulation, StateDataReporter};
//!
//! let pdb = "\
//! ATOM      1  O   HOH W   1       0.000   0.000   0.000  1.00  0.00           O\n\
//! ATOM      2  H1  HOH W   1       0.957   0.000   0.000  1.00  0.00           H\n\
//! ATOM      3  H2  HOH W   1      -0.240   0.927   0.000  1.00  0.00           H\n\
//! END\n";
//!
//! // Structure and built-in TIP3P parameters
//! let system = mdflow::io::read_pdb(pdb.as_bytes())?;
//! let parameterized = parameterize(&system, &ParameterizeConfig::default())?;
//! assert_eq!(parameterized.potentials.bonds.len(), 2);
//! assert_eq!(parameterized.potentials.angles.len(), 1);
//!
//! // Energy model with rigid O-H bonds
//! let config = EngineConfig {
//!     constraints: Constraints::HBonds,
//!     ..EngineConfig::default()
//! };
//! let model = ForceModel::new(&parameterized, &config)?;
//! assert_eq!(model.degrees_of_freedom(), 9 - 2 - 3);
//!
//! // Minimize, thermalize, integrate
//! let integrator = LangevinMiddleIntegrator::new(300.0, 1.0, 0.002).with_seed(42);
//! let mut simulation = Simulation::new(model, integrator, system.positions())?;
//! let report = simulation.minimize(&MinimizeOptions::default())?;
//! assert!(report.converged);
//!
//! simulation.set_velocities_to_temperature(300.0)?;
//! let mut log = StateDataReporter::new(Vec::new(), 25);
//! simulation.step(100, &mut [&mut log])?;
//! assert_eq!(simulation.current_step(), 100);
//! assert_eq!(String::from_utf8(log.into_inner())?.lines().count(), 1 + 4);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! # Module Organization
//!
//! - [`io`] — PDB structures and DCD trajectories
//! - [`forcefield`] — Parameter files and [`parameterize`](forcefield::parameterize)
//! - [`engine`] — [`ForceModel`](engine::ForceModel): energies, forces, constraints
//! - [`dynamics`] — Integrator, initial velocities, minimizer
//! - [`simulation`] — [`Simulation`](simulation::Simulation) driver and reporters
//! - [`protocol`] — TOML description of a complete minimize/equilibrate/produce run
//! - [`analysis`] — Trajectory loading, selections, geometry, histograms
//!
//! # Data Types
//!
//! ## Structures
//!
//! - [`System`] — Atoms, bonds, optional periodic box and residue metadata
//! - [`Atom`] — Element and Cartesian coordinates (nm)
//! - [`Bond`] — Index pair, stored with `i <= j`
//! - [`Element`] — Chemical element
//! - [`ResidueMetadata`] / [`AtomResidueInfo`] — Atom names, residues, chains
//!
//! ## Parameterized Topology
//!
//! - [`ParameterizedSystem`] — System plus force-field terms
//! - [`AtomParam`] — Per-atom charge, mass and type index
//! - [`Potentials`] — [`HarmonicBond`], [`HarmonicAngle`], [`PeriodicTorsion`]
//! - [`NonbondedParams`] — [`LjParticle`]s, exclusions and scaled 1-4
//!   [`NonbondedException`]s

mod model;

pub mod analysis;
pub mod dynamics;
pub mod engine;
pub mod forcefield;
pub mod io;
pub mod protocol;
pub mod simulation;

pub use model::atom::Atom;
pub use model::system::{Bond, System};
pub use model::types::{Element, ParseElementError};

pub use model::metadata::{AtomResidueInfo, Record, ResidueMetadata, ResidueSpan};

pub use model::topology::{
    AtomParam, CombiningRule, HarmonicAngle, HarmonicBond, LjParticle, NonbondedException,
    NonbondedParams, ParameterizedSystem, PeriodicTorsion, Potentials,
};

pub use model::pbc::minimum_image;
