//! File I/O for molecular structures and trajectories.
//!
//! - PDB structures via [`read_pdb`] and [`write_pdb`]
//! - DCD binary trajectories via [`DcdWriter`] and [`DcdReader`]
//!
//! Coordinates cross this boundary in nanometers; both formats store Ångströms
//! on disk and the conversion happens here.

use std::fmt;
use std::io::{BufRead, Write};

pub mod error;
pub mod util;

mod dcd;
mod pdb;

pub use dcd::{DcdFrame, DcdHeader, DcdReader, DcdWriter, DcdWriterOptions};
pub use error::Error;

use crate::model::system::System;

pub(crate) const ANGSTROM_PER_NM: f64 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Pdb,
    Dcd,
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Format::Pdb => write!(f, "PDB"),
            Format::Dcd => write!(f, "DCD"),
        }
    }
}

/// Reads the first model of a PDB file.
///
/// ATOM/HETATM records become atoms (with residue metadata), CONECT records
/// become bonds, and a CRYST1 record becomes the periodic box.
pub fn read_pdb<R: BufRead>(reader: R) -> Result<System, Error> {
    pdb::reader::read(reader)
}

/// Writes a system as PDB, including CONECT records for every bond.
pub fn write_pdb<W: Write>(writer: W, system: &System) -> Result<(), Error> {
    pdb::writer::write(writer, system)
}
