use anyhow::{Context, Result};

use mdflow::protocol::Protocol;

use crate::cli::SimulateArgs;

/// Loads the protocol file (or defaults) and applies command-line overrides.
pub fn build_protocol(args: &SimulateArgs) -> Result<Protocol> {
    let mut protocol = match &args.config {
        Some(path) => Protocol::load(path)
            .with_context(|| format!("Failed to load protocol: {}", path.display()))?,
        None => Protocol::default(),
    };

    apply_overrides(&mut protocol, args);
    protocol.validate().context("Invalid simulation protocol")?;

    Ok(protocol)
}

fn apply_overrides(protocol: &mut Protocol, args: &SimulateArgs) {
    if let Some(path) = &args.structure {
        protocol.system.structure = Some(path.clone());
    }
    if let Some(path) = &args.forcefield {
        protocol.system.forcefield = Some(path.clone());
    }

    let run = &args.run;
    if let Some(steps) = run.steps {
        protocol.production.steps = steps;
    }
    if let Some(steps) = run.equil_steps {
        protocol.equilibration.steps = steps;
    }
    if let Some(temperature) = run.temperature {
        protocol.integrator.temperature = temperature;
    }
    if run.seed.is_some() {
        protocol.integrator.seed = run.seed;
    }

    let output = &args.output;
    if let Some(path) = &output.trajectory {
        protocol.production.trajectory = path.clone();
    }
    if output.log.is_some() {
        protocol.production.log = output.log.clone();
    }
    if output.final_structure.is_some() {
        protocol.production.final_structure = output.final_structure.clone();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Cli, Command};
    use clap::Parser;
    use std::path::PathBuf;

    fn simulate_args(argv: &[&str]) -> SimulateArgs {
        let cli = Cli::parse_from(std::iter::once("mdflow").chain(argv.iter().copied()));
        match cli.command {
            Command::Simulate(args) => args,
            _ => panic!("expected the simulate command"),
        }
    }

    #[test]
    fn flags_override_defaults() {
        let args = simulate_args(&[
            "simulate",
            "-s",
            "butane.pdb",
            "--steps",
            "500",
            "--equil-steps",
            "50",
            "--temperature",
            "310",
            "--seed",
            "7",
            "-t",
            "out.dcd",
        ]);
        let protocol = build_protocol(&args).unwrap();

        assert_eq!(protocol.system.structure, Some(PathBuf::from("butane.pdb")));
        assert_eq!(protocol.production.steps, 500);
        assert_eq!(protocol.equilibration.steps, 50);
        assert_eq!(protocol.integrator.temperature, 310.0);
        assert_eq!(protocol.integrator.seed, Some(7));
        assert_eq!(protocol.production.trajectory, PathBuf::from("out.dcd"));
        assert_eq!(protocol.production.log, None);
    }

    #[test]
    fn absent_flags_keep_protocol_values() {
        let args = simulate_args(&["simulate"]);
        let protocol = build_protocol(&args).unwrap();
        assert_eq!(protocol, Protocol::default());
    }

    #[test]
    fn overrides_are_validated() {
        let args = simulate_args(&["simulate", "--temperature", "0"]);
        assert!(build_protocol(&args).is_err());
    }
}
