use super::{CELL_RECORD_LEN, DcdFrame, DcdHeader, HEADER_RECORD_LEN, MAGIC, TITLE_LEN};
use crate::io::{ANGSTROM_PER_NM, Format, error::Error, util};
use log::debug;
use std::io::{ErrorKind, Read};

/// Sequential DCD reader. Frames are pulled with [`DcdReader::read_frame`] or
/// by iterating.
pub struct DcdReader<R: Read> {
    inner: R,
    header: DcdHeader,
    offset: u64,
}

impl<R: Read> DcdReader<R> {
    pub fn new(inner: R) -> Result<Self, Error> {
        let mut reader = Self {
            inner,
            header: DcdHeader {
                n_atoms: 0,
                n_frames: 0,
                first_step: 0,
                interval: 1,
                dt: 0.0,
                has_unit_cell: false,
                titles: Vec::new(),
            },
            offset: 0,
        };
        reader.header = reader.read_header()?;
        debug!(
            "opened DCD trajectory: {} atoms, {} frames declared",
            reader.header.n_atoms, reader.header.n_frames
        );
        Ok(reader)
    }

    pub fn header(&self) -> &DcdHeader {
        &self.header
    }

    /// Reads the next frame, or `None` at a clean end of file.
    pub fn read_frame(&mut self) -> Result<Option<DcdFrame>, Error> {
        let box_vectors = if self.header.has_unit_cell {
            let Some(len) = self.read_marker_or_eof()? else {
                return Ok(None);
            };
            self.expect_len(len, CELL_RECORD_LEN, "unit cell")?;
            let mut cell = [0f64; 6];
            for value in &mut cell {
                *value = f64::from_le_bytes(self.read_array()?);
            }
            self.read_closing_marker(len)?;
            Some(cell_to_box(cell))
        } else {
            None
        };

        let n = self.header.n_atoms;
        let mut positions = vec![[0.0; 3]; n];
        for axis in 0..3 {
            let len = if axis == 0 && box_vectors.is_none() {
                match self.read_marker_or_eof()? {
                    Some(len) => len,
                    None => return Ok(None),
                }
            } else {
                self.read_marker()?
            };
            self.expect_len(len, (4 * n) as u32, "coordinate block")?;
            for position in positions.iter_mut() {
                let value = f32::from_le_bytes(self.read_array()?);
                position[axis] = f64::from(value) / ANGSTROM_PER_NM;
            }
            self.read_closing_marker(len)?;
        }

        Ok(Some(DcdFrame {
            positions,
            box_vectors,
        }))
    }

    fn read_header(&mut self) -> Result<DcdHeader, Error> {
        let first = self.read_marker()?;
        if first != HEADER_RECORD_LEN {
            if u32::from_be_bytes(first.to_le_bytes()) == HEADER_RECORD_LEN {
                return Err(self.corrupt("big-endian DCD files are not supported"));
            }
            return Err(self.corrupt(format!(
                "expected header record of {} bytes, found marker {}",
                HEADER_RECORD_LEN, first
            )));
        }

        let record: [u8; HEADER_RECORD_LEN as usize] = self.read_array()?;
        if &record[0..4] != MAGIC {
            return Err(self.corrupt("missing CORD magic"));
        }
        self.read_closing_marker(first)?;

        let int_at = |offset: usize| {
            i32::from_le_bytes([
                record[offset],
                record[offset + 1],
                record[offset + 2],
                record[offset + 3],
            ])
        };
        let n_frames = int_at(4).max(0) as usize;
        let first_step = i64::from(int_at(8));
        let interval = i64::from(int_at(12));
        let dt = widen_decimal(f32::from_le_bytes([
            record[40], record[41], record[42], record[43],
        ]));
        let has_unit_cell = int_at(44) != 0;

        let title_len = self.read_marker()?;
        let ntitle = i32::from_le_bytes(self.read_array()?).max(0) as usize;
        if title_len as usize != 4 + ntitle * TITLE_LEN {
            return Err(self.corrupt(format!(
                "title record of {} bytes does not hold {} titles",
                title_len, ntitle
            )));
        }
        let mut titles = Vec::with_capacity(ntitle);
        for _ in 0..ntitle {
            let raw: [u8; TITLE_LEN] = self.read_array()?;
            titles.push(String::from_utf8_lossy(&raw).trim_end().to_string());
        }
        self.read_closing_marker(title_len)?;

        let atoms_len = self.read_marker()?;
        self.expect_len(atoms_len, 4, "atom count")?;
        let n_atoms = i32::from_le_bytes(self.read_array()?);
        self.read_closing_marker(atoms_len)?;
        if n_atoms < 0 {
            return Err(self.corrupt(format!("negative atom count {}", n_atoms)));
        }

        Ok(DcdHeader {
            n_atoms: n_atoms as usize,
            n_frames,
            first_step,
            interval,
            dt,
            has_unit_cell,
            titles,
        })
    }

    fn corrupt(&self, details: impl Into<String>) -> Error {
        Error::corrupt(Format::Dcd, self.offset, details)
    }

    fn expect_len(&self, found: u32, expected: u32, what: &str) -> Result<(), Error> {
        if found != expected {
            return Err(self.corrupt(format!(
                "{} record is {} bytes, expected {}",
                what, found, expected
            )));
        }
        Ok(())
    }

    fn read_array<const N: usize>(&mut self) -> Result<[u8; N], Error> {
        let mut buffer = [0u8; N];
        match self.inner.read_exact(&mut buffer) {
            Ok(()) => {
                self.offset += N as u64;
                Ok(buffer)
            }
            Err(e) if e.kind() == ErrorKind::UnexpectedEof => {
                Err(self.corrupt("unexpected end of file"))
            }
            Err(e) => Err(e.into()),
        }
    }

    fn read_marker(&mut self) -> Result<u32, Error> {
        Ok(u32::from_le_bytes(self.read_array()?))
    }

    fn read_closing_marker(&mut self, opening: u32) -> Result<(), Error> {
        let closing = self.read_marker()?;
        if closing != opening {
            return Err(self.corrupt(format!(
                "record marker mismatch: opened with {}, closed with {}",
                opening, closing
            )));
        }
        Ok(())
    }

    /// Reads a record marker, returning `None` if the stream ends before any
    /// byte of it.
    fn read_marker_or_eof(&mut self) -> Result<Option<u32>, Error> {
        let mut buffer = [0u8; 4];
        let mut filled = 0;
        while filled < buffer.len() {
            match self.inner.read(&mut buffer[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
        self.offset += filled as u64;
        match filled {
            0 => Ok(None),
            4 => Ok(Some(u32::from_le_bytes(buffer))),
            _ => Err(self.corrupt("truncated record marker")),
        }
    }
}

/// Widens a stored `f32` to the `f64` with the same shortest decimal form,
/// so a time step written as 0.002 reads back as exactly 0.002.
fn widen_decimal(value: f32) -> f64 {
    value
        .to_string()
        .parse()
        .unwrap_or_else(|_| f64::from(value))
}

impl<R: Read> Iterator for DcdReader<R> {
    type Item = Result<DcdFrame, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        self.read_frame().transpose()
    }
}

/// Converts `(a, cos γ, b, cos β, cos α, c)` in Å into box vectors in nm.
///
/// Older writers stored angles in degrees rather than cosines; any value
/// outside `[-1, 1]` is taken as degrees.
fn cell_to_box(cell: [f64; 6]) -> [[f64; 3]; 3] {
    let to_degrees = |v: f64| {
        if v.abs() > 1.0 {
            v
        } else {
            v.acos().to_degrees()
        }
    };
    let lengths = [cell[0], cell[2], cell[5]].map(|l| l / ANGSTROM_PER_NM);
    let angles = [to_degrees(cell[4]), to_degrees(cell[3]), to_degrees(cell[1])];
    util::box_vectors_from_cell(lengths, angles)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn time_step_reads_back_as_written() {
        assert_eq!(widen_decimal(0.002_f32), 0.002);
        assert_eq!(widen_decimal(0.5_f32), 0.5);
        assert_eq!(widen_decimal(0.0_f32), 0.0);
    }

    #[test]
    fn cell_accepts_cosines_and_degrees() {
        let from_cosines = cell_to_box([30.0, 0.0, 30.0, 0.0, 0.0, 30.0]);
        let from_degrees = cell_to_box([30.0, 90.0, 30.0, 90.0, 90.0, 30.0]);
        for i in 0..3 {
            for j in 0..3 {
                assert_relative_eq!(from_cosines[i][j], from_degrees[i][j], epsilon = 1e-9);
            }
        }
        assert_relative_eq!(from_cosines[0][0], 3.0);
    }

    #[test]
    fn triclinic_cell_keeps_angles() {
        let cos_60 = 60f64.to_radians().cos();
        let box_vectors = cell_to_box([20.0, cos_60, 20.0, 0.0, 0.0, 20.0]);
        let (_, angles) = util::cell_from_box_vectors(&box_vectors);
        assert_relative_eq!(angles[2], 60.0, epsilon = 1e-9);
        assert_relative_eq!(angles[0], 90.0, epsilon = 1e-9);
    }
}
