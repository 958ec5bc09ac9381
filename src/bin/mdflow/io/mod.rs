mod infer;

pub use infer::{structure as infer_structure_format, trajectory as infer_trajectory_format};

use std::fs::File;
use std::io::{self, BufReader, BufWriter, IsTerminal};
use std::path::Path;

use anyhow::{Context, Result, bail};

use mdflow::System;
use mdflow::io::Format;

/// Returns `true` if stderr is a terminal (interactive).
pub fn stderr_is_tty() -> bool {
    io::stderr().is_terminal()
}

pub fn open_input(path: &Path) -> Result<BufReader<File>> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open input file: {}", path.display()))?;
    Ok(BufReader::new(file))
}

pub fn create_output(path: &Path) -> Result<BufWriter<File>> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create output file: {}", path.display()))?;
    Ok(BufWriter::new(file))
}

/// Reads a PDB structure, rejecting files whose extension names another
/// format.
pub fn read_structure(path: &Path) -> Result<System> {
    match infer_structure_format(path) {
        Some(Format::Pdb) | None => {}
        Some(other) => bail!(
            "'{}' looks like a {} file; a PDB structure is required",
            path.display(),
            other
        ),
    }

    let reader = open_input(path)?;
    mdflow::io::read_pdb(reader)
        .with_context(|| format!("Failed to read structure: {}", path.display()))
}

pub fn write_structure(path: &Path, system: &System) -> Result<()> {
    let writer = create_output(path)?;
    mdflow::io::write_pdb(writer, system)
        .with_context(|| format!("Failed to write structure: {}", path.display()))
}
