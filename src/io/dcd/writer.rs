use super::{
    CELL_RECORD_LEN, CHARMM_VERSION, HEADER_RECORD_LEN, LAST_STEP_OFFSET, MAGIC, NFRAMES_OFFSET,
    TITLE_LEN,
};
use crate::io::{ANGSTROM_PER_NM, error::Error, util};
use log::debug;
use std::io::{Seek, SeekFrom, Write};

#[derive(Debug, Clone, PartialEq)]
pub struct DcdWriterOptions {
    /// Step number of the first frame.
    pub first_step: i64,
    /// Steps between consecutive frames.
    pub interval: i64,
    /// Integration time step in picoseconds.
    pub dt: f64,
    /// Whether every frame carries a unit-cell record.
    pub unit_cell: bool,
    pub title: String,
}

impl Default for DcdWriterOptions {
    fn default() -> Self {
        Self {
            first_step: 0,
            interval: 1,
            dt: 0.002,
            unit_cell: false,
            title: "Created by mdflow".to_string(),
        }
    }
}

/// Streams frames into a DCD file, keeping the header counts current so the
/// file stays readable if the run stops early.
pub struct DcdWriter<W: Write + Seek> {
    inner: W,
    n_atoms: usize,
    options: DcdWriterOptions,
    frames_written: usize,
}

impl<W: Write + Seek> DcdWriter<W> {
    pub fn new(mut inner: W, n_atoms: usize, options: DcdWriterOptions) -> Result<Self, Error> {
        write_header(&mut inner, n_atoms, &options)?;
        debug!(
            "opened DCD trajectory: {} atoms, interval {}, unit cell = {}",
            n_atoms, options.interval, options.unit_cell
        );
        Ok(Self {
            inner,
            n_atoms,
            options,
            frames_written: 0,
        })
    }

    pub fn n_atoms(&self) -> usize {
        self.n_atoms
    }

    pub fn frames_written(&self) -> usize {
        self.frames_written
    }

    /// Appends one frame. Positions and box vectors are in nanometers.
    pub fn write_frame(
        &mut self,
        positions: &[[f64; 3]],
        box_vectors: Option<&[[f64; 3]; 3]>,
    ) -> Result<(), Error> {
        if positions.len() != self.n_atoms {
            return Err(Error::FrameSize {
                expected: self.n_atoms,
                found: positions.len(),
            });
        }

        if self.options.unit_cell {
            let box_vectors = box_vectors.ok_or(Error::MissingUnitCell)?;
            let (lengths, angles) = util::cell_from_box_vectors(box_vectors);
            let [a, b, c] = lengths.map(|l| l * ANGSTROM_PER_NM);
            let [alpha, beta, gamma] = angles.map(|deg| deg.to_radians().cos());

            write_marker(&mut self.inner, CELL_RECORD_LEN)?;
            for value in [a, gamma, b, beta, alpha, c] {
                self.inner.write_all(&value.to_le_bytes())?;
            }
            write_marker(&mut self.inner, CELL_RECORD_LEN)?;
        }

        let block_len = (4 * self.n_atoms) as u32;
        for axis in 0..3 {
            write_marker(&mut self.inner, block_len)?;
            for position in positions {
                let value = (position[axis] * ANGSTROM_PER_NM) as f32;
                self.inner.write_all(&value.to_le_bytes())?;
            }
            write_marker(&mut self.inner, block_len)?;
        }

        self.frames_written += 1;
        self.update_header()
    }

    fn update_header(&mut self) -> Result<(), Error> {
        let last_step =
            self.options.first_step + (self.frames_written as i64 - 1) * self.options.interval;

        self.inner.seek(SeekFrom::Start(NFRAMES_OFFSET))?;
        self.inner
            .write_all(&(self.frames_written as i32).to_le_bytes())?;
        self.inner.seek(SeekFrom::Start(LAST_STEP_OFFSET))?;
        self.inner.write_all(&(last_step as i32).to_le_bytes())?;
        self.inner.seek(SeekFrom::End(0))?;
        Ok(())
    }

    /// Flushes and returns the underlying writer.
    pub fn finish(mut self) -> Result<W, Error> {
        self.inner.flush()?;
        debug!("closed DCD trajectory after {} frames", self.frames_written);
        Ok(self.inner)
    }
}

fn write_marker<W: Write>(writer: &mut W, len: u32) -> Result<(), Error> {
    writer.write_all(&len.to_le_bytes())?;
    Ok(())
}

fn write_header<W: Write>(
    writer: &mut W,
    n_atoms: usize,
    options: &DcdWriterOptions,
) -> Result<(), Error> {
    let mut record = Vec::with_capacity(HEADER_RECORD_LEN as usize);
    record.extend_from_slice(MAGIC);
    for value in [
        0,
        options.first_step as i32,
        options.interval as i32,
        options.first_step as i32,
        0,
        0,
        0,
        0,
        0,
    ] {
        record.extend_from_slice(&value.to_le_bytes());
    }
    record.extend_from_slice(&(options.dt as f32).to_le_bytes());
    record.extend_from_slice(&i32::from(options.unit_cell).to_le_bytes());
    for _ in 0..8 {
        record.extend_from_slice(&0i32.to_le_bytes());
    }
    record.extend_from_slice(&CHARMM_VERSION.to_le_bytes());

    write_marker(writer, HEADER_RECORD_LEN)?;
    writer.write_all(&record)?;
    write_marker(writer, HEADER_RECORD_LEN)?;

    let titles = [options.title.as_str(), "REMARKS written by mdflow"];
    let title_record_len = (4 + TITLE_LEN * titles.len()) as u32;
    write_marker(writer, title_record_len)?;
    writer.write_all(&(titles.len() as i32).to_le_bytes())?;
    for title in titles {
        writer.write_all(&pad_title(title))?;
    }
    write_marker(writer, title_record_len)?;

    write_marker(writer, 4)?;
    writer.write_all(&(n_atoms as i32).to_le_bytes())?;
    write_marker(writer, 4)?;
    Ok(())
}

fn pad_title(title: &str) -> [u8; TITLE_LEN] {
    let mut buffer = [b' '; TITLE_LEN];
    let bytes = title.as_bytes();
    let len = bytes.len().min(TITLE_LEN);
    buffer[..len].copy_from_slice(&bytes[..len]);
    buffer
}
