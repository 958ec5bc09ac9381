//! The simulation protocol: which structure and force field to load and how to
//! minimize, equilibrate and run production.
//!
//! A protocol is read from TOML. Every field has a default, so an empty file
//! is a valid protocol:
//!
//! ```toml
//! [system]
//! structure = "butane.pdb"
//! constraints = "h-bonds"
//!
//! [integrator]
//! temperature = 300.0
//! seed = 2024
//!
//! [production]
//! steps = 50000
//! trajectory = "butane.dcd"
//! ```
//!
//! Relative paths in a protocol loaded with [`Protocol::load`] are resolved
//! against the directory of the protocol file.

mod error;

pub use error::Error;

use crate::dynamics::{LangevinMiddleIntegrator, MinimizeOptions};
use crate::engine::{Constraints, EngineConfig, NonbondedMethod};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Protocol {
    pub system: SystemSection,
    pub integrator: IntegratorSection,
    pub minimize: MinimizeSection,
    pub equilibration: EquilibrationSection,
    pub production: ProductionSection,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SystemSection {
    /// PDB file to simulate.
    pub structure: Option<PathBuf>,
    /// Force-field parameter file; the built-in parameters when absent.
    pub forcefield: Option<PathBuf>,
    pub nonbonded_method: NonbondedMethod,
    /// nm
    pub cutoff: f64,
    pub constraints: Constraints,
    pub constraint_tolerance: f64,
    pub remove_cm_motion: bool,
}

impl Default for SystemSection {
    fn default() -> Self {
        Self {
            structure: None,
            forcefield: None,
            nonbonded_method: NonbondedMethod::NoCutoff,
            cutoff: 1.0,
            constraints: Constraints::HBonds,
            constraint_tolerance: 1e-5,
            remove_cm_motion: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct IntegratorSection {
    /// K
    pub temperature: f64,
    /// 1/ps
    pub friction: f64,
    /// ps
    pub step_size: f64,
    pub seed: Option<u64>,
}

impl Default for IntegratorSection {
    fn default() -> Self {
        Self {
            temperature: 300.0,
            friction: 1.0,
            step_size: 0.002,
            seed: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MinimizeSection {
    /// kJ/mol/nm
    pub tolerance: f64,
    pub max_iterations: usize,
}

impl Default for MinimizeSection {
    fn default() -> Self {
        let options = MinimizeOptions::default();
        Self {
            tolerance: options.tolerance,
            max_iterations: options.max_iterations,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EquilibrationSection {
    pub steps: u64,
    pub report_interval: u64,
}

impl Default for EquilibrationSection {
    fn default() -> Self {
        Self {
            steps: 10_000,
            report_interval: 1000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProductionSection {
    pub steps: u64,
    pub report_interval: u64,
    pub trajectory_interval: u64,
    pub trajectory: PathBuf,
    /// State data CSV, written in addition to the console report.
    pub log: Option<PathBuf>,
    /// PDB with the positions after the last production step.
    pub final_structure: Option<PathBuf>,
}

impl Default for ProductionSection {
    fn default() -> Self {
        Self {
            steps: 100_000,
            report_interval: 1000,
            trajectory_interval: 100,
            trajectory: PathBuf::from("trajectory.dcd"),
            log: None,
            final_structure: None,
        }
    }
}

impl Protocol {
    /// Reads a protocol file and resolves its relative paths against the
    /// file's directory.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| Error::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let mut protocol = Self::from_toml_str(&text)?;
        if let Some(base) = path.parent() {
            protocol.resolve_paths(base);
        }
        Ok(protocol)
    }

    pub fn from_toml_str(text: &str) -> Result<Self, Error> {
        Ok(toml::from_str(text)?)
    }

    /// Prefixes every relative path with `base`.
    pub fn resolve_paths(&mut self, base: &Path) {
        let paths = [
            self.system.structure.as_mut(),
            self.system.forcefield.as_mut(),
            Some(&mut self.production.trajectory),
            self.production.log.as_mut(),
            self.production.final_structure.as_mut(),
        ];
        for path in paths.into_iter().flatten() {
            if path.is_relative() {
                *path = base.join(&*path);
            }
        }
    }

    pub fn validate(&self) -> Result<(), Error> {
        positive("integrator.temperature", self.integrator.temperature)?;
        positive("integrator.friction", self.integrator.friction)?;
        positive("integrator.step_size", self.integrator.step_size)?;
        positive("system.constraint_tolerance", self.system.constraint_tolerance)?;
        positive("minimize.tolerance", self.minimize.tolerance)?;
        if self.system.nonbonded_method.uses_cutoff() {
            positive("system.cutoff", self.system.cutoff)?;
        }
        nonzero("equilibration.report_interval", self.equilibration.report_interval)?;
        nonzero("production.report_interval", self.production.report_interval)?;
        nonzero("production.trajectory_interval", self.production.trajectory_interval)?;
        Ok(())
    }

    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            nonbonded_method: self.system.nonbonded_method,
            cutoff: self.system.cutoff,
            constraints: self.system.constraints,
            constraint_tolerance: self.system.constraint_tolerance,
            remove_cm_motion: self.system.remove_cm_motion,
        }
    }

    pub fn integrator(&self) -> LangevinMiddleIntegrator {
        let section = &self.integrator;
        let integrator =
            LangevinMiddleIntegrator::new(section.temperature, section.friction, section.step_size);
        match section.seed {
            Some(seed) => integrator.with_seed(seed),
            None => integrator,
        }
    }

    pub fn minimize_options(&self) -> MinimizeOptions {
        MinimizeOptions {
            tolerance: self.minimize.tolerance,
            max_iterations: self.minimize.max_iterations,
        }
    }
}

fn positive(field: &'static str, value: f64) -> Result<(), Error> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(Error::invalid(field, format!("must be positive, got {}", value)))
    }
}

fn nonzero(field: &'static str, value: u64) -> Result<(), Error> {
    if value == 0 {
        Err(Error::invalid(field, "must be at least 1"))
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_protocol_uses_defaults() {
        let protocol = Protocol::from_toml_str("").unwrap();
        assert_eq!(protocol, Protocol::default());
        assert_eq!(protocol.integrator.temperature, 300.0);
        assert_eq!(protocol.equilibration.steps, 10_000);
        assert_eq!(protocol.production.trajectory_interval, 100);
        assert_eq!(protocol.minimize.max_iterations, 0);
        assert!(protocol.validate().is_ok());
    }

    #[test]
    fn parses_all_sections() {
        let protocol = Protocol::from_toml_str(
            r#"
            [system]
            structure = "butane.pdb"
            nonbonded_method = "cutoff-non-periodic"
            cutoff = 0.9
            constraints = "all-bonds"

            [integrator]
            temperature = 310.0
            friction = 2.0
            step_size = 0.001
            seed = 7

            [minimize]
            tolerance = 5.0
            max_iterations = 500

            [equilibration]
            steps = 200

            [production]
            steps = 1000
            trajectory = "out.dcd"
            log = "out.csv"
            "#,
        )
        .unwrap();

        let engine = protocol.engine_config();
        assert_eq!(engine.nonbonded_method, NonbondedMethod::CutoffNonPeriodic);
        assert_eq!(engine.constraints, Constraints::AllBonds);
        assert_eq!(engine.cutoff, 0.9);

        let integrator = protocol.integrator();
        assert_eq!(integrator.temperature, 310.0);
        assert_eq!(integrator.seed(), Some(7));
        assert_eq!(protocol.minimize_options().max_iterations, 500);
        assert_eq!(protocol.equilibration.report_interval, 1000);
        assert_eq!(protocol.production.log, Some(PathBuf::from("out.csv")));
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let err = Protocol::from_toml_str("[integrator]\ntemprature = 300.0\n").unwrap_err();
        assert!(matches!(err, Error::Parse(_)));
    }

    #[test]
    fn validation_names_the_field() {
        let mut protocol = Protocol::default();
        protocol.integrator.step_size = 0.0;
        assert!(matches!(
            protocol.validate(),
            Err(Error::Invalid {
                field: "integrator.step_size",
                ..
            })
        ));

        let mut protocol = Protocol::default();
        protocol.production.trajectory_interval = 0;
        assert!(matches!(
            protocol.validate(),
            Err(Error::Invalid {
                field: "production.trajectory_interval",
                ..
            })
        ));

        let mut protocol = Protocol::default();
        protocol.integrator.friction = -1.0;
        assert!(protocol.validate().is_err());
    }

    #[test]
    fn relative_paths_follow_the_protocol_file() {
        let mut protocol = Protocol::from_toml_str(
            "[system]\nstructure = \"butane.pdb\"\n[production]\ntrajectory = \"/tmp/abs.dcd\"\n",
        )
        .unwrap();
        protocol.resolve_paths(Path::new("runs/demo"));

        assert_eq!(
            protocol.system.structure,
            Some(PathBuf::from("runs/demo/butane.pdb"))
        );
        assert_eq!(protocol.production.trajectory, PathBuf::from("/tmp/abs.dcd"));
        assert_eq!(protocol.system.forcefield, None);
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let err = Protocol::load("definitely/not/here.toml").unwrap_err();
        assert!(matches!(err, Error::Read { .. }));
    }
}
