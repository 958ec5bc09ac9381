use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "mdflow",
    about = "Molecular dynamics workflow: minimize, equilibrate, produce, analyze",
    version,
    author,
    before_help = crate::display::banner_for_help(),
    propagate_version = true
)]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug; RUST_LOG overrides)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run minimization, equilibration and production from a structure
    #[command(visible_alias = "s")]
    Simulate(SimulateArgs),

    /// Measure distances, angles and dihedrals over a DCD trajectory
    #[command(visible_alias = "a")]
    Analyze(AnalyzeArgs),

    /// Summarize a structure and its force field assignment
    #[command(visible_alias = "i")]
    Inspect(InspectArgs),
}

impl Command {
    pub fn quiet(&self) -> bool {
        match self {
            Command::Simulate(args) => args.quiet,
            Command::Analyze(args) => args.quiet,
            Command::Inspect(args) => args.quiet,
        }
    }
}

#[derive(Args)]
pub struct SimulateArgs {
    /// Protocol file (TOML); every field has a default
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Input structure (PDB), overrides [system].structure
    #[arg(short, long, value_name = "FILE")]
    pub structure: Option<PathBuf>,

    /// Force field parameter file (TOML), overrides [system].forcefield
    #[arg(short, long, value_name = "FILE")]
    pub forcefield: Option<PathBuf>,

    /// Suppress progress output (for scripting)
    #[arg(short, long)]
    pub quiet: bool,

    #[command(flatten)]
    pub run: RunOptions,

    #[command(flatten)]
    pub output: SimulationOutputOptions,
}

/// Dynamics options that override the protocol file.
#[derive(Args)]
#[command(next_help_heading = "Dynamics")]
pub struct RunOptions {
    /// Production steps
    #[arg(long, value_name = "N")]
    pub steps: Option<u64>,

    /// Equilibration steps
    #[arg(long = "equil-steps", value_name = "N")]
    pub equil_steps: Option<u64>,

    /// Target temperature (K)
    #[arg(long, value_name = "K")]
    pub temperature: Option<f64>,

    /// Random seed for velocities and Langevin noise
    #[arg(long, value_name = "SEED")]
    pub seed: Option<u64>,
}

#[derive(Args)]
#[command(next_help_heading = "Output")]
pub struct SimulationOutputOptions {
    /// Production trajectory (DCD)
    #[arg(short, long, value_name = "FILE")]
    pub trajectory: Option<PathBuf>,

    /// Production state data log (CSV)
    #[arg(long, value_name = "FILE")]
    pub log: Option<PathBuf>,

    /// Final coordinates (PDB)
    #[arg(long = "final-structure", value_name = "FILE")]
    pub final_structure: Option<PathBuf>,
}

#[derive(Args)]
pub struct AnalyzeArgs {
    /// Topology structure (PDB) matching the trajectory's atoms
    #[arg(short = 'p', long, value_name = "FILE")]
    pub topology: PathBuf,

    /// Trajectory (DCD)
    #[arg(short, long, value_name = "FILE")]
    pub trajectory: PathBuf,

    /// Suppress progress output (for scripting)
    #[arg(short, long)]
    pub quiet: bool,

    #[command(flatten)]
    pub measure: MeasureOptions,

    /// Per-frame values (CSV)
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,
}

/// Atom names may be qualified as RESNAME:NAME or RESID:NAME.
#[derive(Args)]
#[command(next_help_heading = "Measurements")]
pub struct MeasureOptions {
    /// Distance between two atoms (A,B), repeatable
    #[arg(long = "distance", value_name = "A,B", action = ArgAction::Append)]
    pub distances: Vec<String>,

    /// Angle at the middle atom (A,B,C), repeatable
    #[arg(long = "angle", value_name = "A,B,C", action = ArgAction::Append)]
    pub angles: Vec<String>,

    /// Dihedral angle (A,B,C,D), repeatable
    #[arg(long = "dihedral", value_name = "A,B,C,D", action = ArgAction::Append)]
    pub dihedrals: Vec<String>,

    /// Histogram bins
    #[arg(long, value_name = "N", default_value = "36")]
    pub bins: usize,

    /// Report angles in degrees instead of radians
    #[arg(long)]
    pub degrees: bool,
}

#[derive(Args)]
pub struct InspectArgs {
    /// Input structure (PDB)
    #[arg(short, long, value_name = "FILE")]
    pub structure: PathBuf,

    /// Force field parameter file (TOML); built-in parameters if omitted
    #[arg(short, long, value_name = "FILE")]
    pub forcefield: Option<PathBuf>,

    /// List atoms matching a selection (e.g. "resname BUT and element C")
    #[arg(long, value_name = "QUERY")]
    pub select: Option<String>,

    /// Suppress progress output (for scripting)
    #[arg(short, long)]
    pub quiet: bool,
}

pub fn parse() -> Cli {
    Cli::parse()
}
