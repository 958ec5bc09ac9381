//! CHARMM/OpenMM-flavoured DCD trajectories (little-endian, 32-bit markers).
//!
//! Layout:
//!
//! ```text
//! [84] "CORD" nframes first_step interval last_step 0 0 0 0 0 dt unitcell 0*8 24 [84]
//! [164] ntitle=2 title[80] title[80] [164]
//! [4] natoms [4]
//! per frame:
//!   [48] a cos(gamma) b cos(beta) cos(alpha) c [48]      (f64, only with unitcell)
//!   [4n] x... [4n]  [4n] y... [4n]  [4n] z... [4n]        (f32, Ångström)
//! ```

mod reader;
mod writer;

pub use reader::DcdReader;
pub use writer::{DcdWriter, DcdWriterOptions};

const MAGIC: &[u8; 4] = b"CORD";
const HEADER_RECORD_LEN: u32 = 84;
const TITLE_LEN: usize = 80;
const CELL_RECORD_LEN: u32 = 48;
const CHARMM_VERSION: i32 = 24;

/// File offsets of the header fields rewritten after every frame.
const NFRAMES_OFFSET: u64 = 8;
const LAST_STEP_OFFSET: u64 = 20;

/// Trajectory-level information stored in the DCD header.
#[derive(Debug, Clone, PartialEq)]
pub struct DcdHeader {
    pub n_atoms: usize,
    /// Frame count recorded in the header. Readers of a file whose writer
    /// never finished should trust the frames actually present instead.
    pub n_frames: usize,
    pub first_step: i64,
    pub interval: i64,
    /// Integration time step in picoseconds.
    pub dt: f64,
    pub has_unit_cell: bool,
    pub titles: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DcdFrame {
    /// Positions in nanometers.
    pub positions: Vec<[f64; 3]>,
    /// Box vectors in nanometers, present when the file carries a unit cell.
    pub box_vectors: Option<[[f64; 3]; 3]>,
}
