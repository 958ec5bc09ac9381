use super::Error;
use crate::io::DcdReader;
use crate::model::system::System;
use log::info;
use std::io::Read;

const PREALLOCATED_FRAMES: usize = 1024;

#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    /// nm
    pub positions: Vec<[f64; 3]>,
    /// ps
    pub time: f64,
    pub box_vectors: Option<[[f64; 3]; 3]>,
}

/// Coordinate frames paired with the topology they belong to.
#[derive(Debug, Clone)]
pub struct Trajectory {
    pub topology: System,
    pub frames: Vec<Frame>,
}

impl Trajectory {
    /// Reads every frame of a DCD file. Frame `i` is stamped with time
    /// `(first_step + i·interval)·dt`.
    pub fn load<R: Read>(mut reader: DcdReader<R>, topology: System) -> Result<Self, Error> {
        let header = reader.header().clone();
        if header.n_atoms != topology.atom_count() {
            return Err(Error::AtomCountMismatch {
                expected: topology.atom_count(),
                found: header.n_atoms,
            });
        }

        // The header count is only a hint; a damaged file may claim any number.
        let mut frames = Vec::with_capacity(header.n_frames.min(PREALLOCATED_FRAMES));
        while let Some(frame) = reader.read_frame()? {
            let step = header.first_step + frames.len() as i64 * header.interval;
            frames.push(Frame {
                positions: frame.positions,
                time: step as f64 * header.dt,
                box_vectors: frame.box_vectors,
            });
        }

        info!(
            "loaded {} frames of {} atoms ({:.3} ps per frame)",
            frames.len(),
            header.n_atoms,
            header.interval as f64 * header.dt
        );
        Ok(Self { topology, frames })
    }

    pub fn n_frames(&self) -> usize {
        self.frames.len()
    }

    pub fn n_atoms(&self) -> usize {
        self.topology.atom_count()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn times(&self) -> Vec<f64> {
        self.frames.iter().map(|f| f.time).collect()
    }

    pub(crate) fn check_indices(&self, indices: &[usize]) -> Result<(), Error> {
        let n_atoms = self.n_atoms();
        match indices.iter().find(|&&i| i >= n_atoms) {
            Some(&index) => Err(Error::AtomIndexOutOfRange { index, n_atoms }),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::{DcdWriter, DcdWriterOptions};
    use crate::model::{atom::Atom, types::Element};
    use approx::assert_relative_eq;
    use std::io::Cursor;

    fn topology(n: usize) -> System {
        let mut system = System::new();
        for i in 0..n {
            system
                .atoms
                .push(Atom::new(Element::C, [i as f64 * 0.15, 0.0, 0.0]));
        }
        system
    }

    fn dcd(n_atoms: usize, n_frames: usize) -> Vec<u8> {
        let options = DcdWriterOptions {
            first_step: 100,
            interval: 50,
            dt: 0.002,
            ..DcdWriterOptions::default()
        };
        let mut writer = DcdWriter::new(Cursor::new(Vec::new()), n_atoms, options).unwrap();
        for f in 0..n_frames {
            let positions: Vec<[f64; 3]> = (0..n_atoms)
                .map(|i| [i as f64 * 0.15, f as f64 * 0.01, 0.0])
                .collect();
            writer.write_frame(&positions, None).unwrap();
        }
        writer.finish().unwrap().into_inner()
    }

    #[test]
    fn frames_are_timestamped_from_header() {
        let bytes = dcd(3, 4);
        let reader = DcdReader::new(Cursor::new(bytes)).unwrap();
        let trajectory = Trajectory::load(reader, topology(3)).unwrap();

        assert_eq!(trajectory.n_frames(), 4);
        let times = trajectory.times();
        assert_relative_eq!(times[0], 0.2, epsilon = 1e-12);
        assert_relative_eq!(times[3], 0.5, epsilon = 1e-12);
        assert_relative_eq!(trajectory.frames[2].positions[1][1], 0.02, epsilon = 1e-6);
    }

    #[test]
    fn inflated_frame_count_reads_actual_frames() {
        let mut bytes = dcd(3, 2);
        bytes[8..12].copy_from_slice(&i32::MAX.to_le_bytes());
        let reader = DcdReader::new(Cursor::new(bytes)).unwrap();
        assert_eq!(reader.header().n_frames, i32::MAX as usize);

        let trajectory = Trajectory::load(reader, topology(3)).unwrap();
        assert_eq!(trajectory.n_frames(), 2);
    }

    #[test]
    fn atom_count_must_match_topology() {
        let bytes = dcd(3, 1);
        let reader = DcdReader::new(Cursor::new(bytes)).unwrap();
        assert!(matches!(
            Trajectory::load(reader, topology(4)),
            Err(Error::AtomCountMismatch {
                expected: 4,
                found: 3
            })
        ));
    }

    #[test]
    fn index_check() {
        let bytes = dcd(2, 1);
        let reader = DcdReader::new(Cursor::new(bytes)).unwrap();
        let trajectory = Trajectory::load(reader, topology(2)).unwrap();
        assert!(trajectory.check_indices(&[0, 1]).is_ok());
        assert!(matches!(
            trajectory.check_indices(&[0, 2]),
            Err(Error::AtomIndexOutOfRange { index: 2, n_atoms: 2 })
        ));
    }
}
