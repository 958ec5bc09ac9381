//! Force field assignment: residue templates, bonded parameter lookup, and
//! nonbonded pair lists.
//!
//! [`parameterize`] matches every residue of a [`System`] to a template from a
//! TOML parameter file (or the built-in OPLS-AA butane / TIP3P water set),
//! enumerates angles and torsions from the bond graph, and produces a
//! [`ParameterizedSystem`] ready for the [`engine`](crate::engine).

mod config;
mod error;
mod intermediate;
mod paramgen;
mod params;
mod templates;

pub use config::ParameterizeConfig;
pub use error::Error;
pub use params::{
    AngleParams, AtomTypeParams, BondParams, ForceFieldParams, GlobalParams, ResidueTemplate,
    TemplateAtom, TorsionParams, TorsionTerm, load_parameters,
};

use crate::model::system::System;
use crate::model::topology::ParameterizedSystem;
use log::info;

pub fn parameterize(
    system: &System,
    config: &ParameterizeConfig,
) -> Result<ParameterizedSystem, Error> {
    let ff_params = params::load_parameters(config.params.as_deref())?;

    let mut intermediate = intermediate::IntermediateSystem::from_system(system)?;

    templates::assign_from_templates(&mut intermediate, system, &ff_params)?;

    intermediate.enumerate_interactions();

    let parameterized = paramgen::generate_parameters(system, &intermediate, &ff_params)?;

    info!(
        "parameterized {} atoms: {} bonds, {} angles, {} torsion terms, {} exclusions, {} 1-4 exceptions",
        parameterized.system.atom_count(),
        parameterized.potentials.bonds.len(),
        parameterized.potentials.angles.len(),
        parameterized.potentials.torsions.len(),
        parameterized.nonbonded.exclusions.len(),
        parameterized.nonbonded.exceptions.len(),
    );

    Ok(parameterized)
}
