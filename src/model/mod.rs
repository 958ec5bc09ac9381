//! Core data structures representing molecular systems and their force field topologies.
//!
//! - [`atom`] – Minimal atom representation with element and Cartesian coordinates.
//! - [`types`] – Chemical elements.
//! - [`system`] – Molecular systems with atoms, bonds, and optional box vectors.
//! - [`metadata`] – Residue context (atom names, residue names, chain IDs).
//! - [`pbc`] – Minimum image convention for periodic boxes.
//! - [`topology`] – Force field output: charges, masses, bonded terms, and nonbonded data.
//!
//! Raw geometry ([`System`]) stays separate from the parameterized topology
//! ([`ParameterizedSystem`]); the [`crate::forcefield`] pipeline turns one into the
//! other and the [`crate::engine`] consumes the result.
//!
//! All lengths are in nanometers.
//!
//! [`System`]: system::System
//! [`ParameterizedSystem`]: topology::ParameterizedSystem

pub mod atom;
pub mod metadata;
pub mod pbc;
pub mod system;
pub mod topology;
pub mod types;
