use super::{Error, Simulation, State};
use crate::io::{DcdWriter, DcdWriterOptions};
use std::io::{Seek, Write};
use std::time::Instant;

/// Receives snapshots of a running [`Simulation`].
pub trait Reporter {
    /// Steps between reports; a reporter fires after every step that is a
    /// multiple of this value.
    fn interval(&self) -> u64;

    fn report(&mut self, state: &State<'_>) -> Result<(), Error>;
}

/// A quantity written by [`StateDataReporter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    Step,
    Time,
    PotentialEnergy,
    KineticEnergy,
    TotalEnergy,
    Temperature,
    Speed,
}

impl Column {
    pub const ALL: [Column; 7] = [
        Column::Step,
        Column::Time,
        Column::PotentialEnergy,
        Column::KineticEnergy,
        Column::TotalEnergy,
        Column::Temperature,
        Column::Speed,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Column::Step => "Step",
            Column::Time => "Time (ps)",
            Column::PotentialEnergy => "Potential Energy (kJ/mole)",
            Column::KineticEnergy => "Kinetic Energy (kJ/mole)",
            Column::TotalEnergy => "Total Energy (kJ/mole)",
            Column::Temperature => "Temperature (K)",
            Column::Speed => "Speed (ns/day)",
        }
    }
}

/// Writes scalar diagnostics as delimited text, one row per report.
///
/// The first report is preceded by a header line of quoted column labels
/// prefixed with `#`.
pub struct StateDataReporter<W: Write> {
    writer: W,
    interval: u64,
    columns: Vec<Column>,
    separator: String,
    header_written: bool,
    last_report: Option<(Instant, f64)>,
}

impl<W: Write> StateDataReporter<W> {
    /// Reports step, potential energy and temperature, comma separated.
    pub fn new(writer: W, interval: u64) -> Self {
        Self {
            writer,
            interval,
            columns: vec![Column::Step, Column::PotentialEnergy, Column::Temperature],
            separator: ",".to_string(),
            header_written: false,
            last_report: None,
        }
    }

    pub fn with_columns(mut self, columns: &[Column]) -> Self {
        self.columns = columns.to_vec();
        self
    }

    pub fn with_separator(mut self, separator: impl Into<String>) -> Self {
        self.separator = separator.into();
        self
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    fn write_header(&mut self) -> std::io::Result<()> {
        let labels: Vec<String> = self
            .columns
            .iter()
            .map(|c| format!("\"{}\"", c.label()))
            .collect();
        writeln!(self.writer, "#{}", labels.join(&self.separator))
    }

    fn speed(&mut self, time: f64) -> String {
        let now = Instant::now();
        let previous = self.last_report.replace((now, time));
        match previous {
            Some((then, previous_time)) => {
                let elapsed = now.duration_since(then).as_secs_f64();
                if elapsed > 0.0 {
                    // ps per second to ns per day.
                    format!("{:.3}", (time - previous_time) / elapsed * 86.4)
                } else {
                    "--".to_string()
                }
            }
            None => "--".to_string(),
        }
    }
}

impl<W: Write> Reporter for StateDataReporter<W> {
    fn interval(&self) -> u64 {
        self.interval
    }

    fn report(&mut self, state: &State<'_>) -> Result<(), Error> {
        if !self.header_written {
            self.write_header().map_err(Error::Report)?;
            self.header_written = true;
        }

        let columns = self.columns.clone();
        let fields: Vec<String> = columns
            .iter()
            .map(|column| match column {
                Column::Step => state.step.to_string(),
                Column::Time => format!("{:.4}", state.time),
                Column::PotentialEnergy => format!("{:.6}", state.potential_energy),
                Column::KineticEnergy => format!("{:.6}", state.kinetic_energy),
                Column::TotalEnergy => format!("{:.6}", state.total_energy()),
                Column::Temperature => format!("{:.4}", state.temperature),
                Column::Speed => self.speed(state.time),
            })
            .collect();

        writeln!(self.writer, "{}", fields.join(&self.separator)).map_err(Error::Report)?;
        self.writer.flush().map_err(Error::Report)
    }
}

/// Appends a DCD frame on every report.
pub struct DcdReporter<W: Write + Seek> {
    writer: DcdWriter<W>,
    interval: u64,
}

impl<W: Write + Seek> DcdReporter<W> {
    /// Opens a trajectory whose first frame is the next multiple of
    /// `interval` after the simulation's current step. Frames carry a unit
    /// cell when the system is periodic.
    pub fn new(inner: W, interval: u64, simulation: &Simulation) -> Result<Self, Error> {
        let interval = interval.max(1);
        let first_step = (simulation.current_step() / interval + 1) * interval;
        let options = DcdWriterOptions {
            first_step: first_step as i64,
            interval: interval as i64,
            dt: simulation.integrator().step_size,
            unit_cell: simulation.model().box_vectors().is_some(),
            ..DcdWriterOptions::default()
        };
        let writer = DcdWriter::new(inner, simulation.model().n_atoms(), options)
            .map_err(Error::Trajectory)?;
        Ok(Self { writer, interval })
    }

    pub fn frames_written(&self) -> usize {
        self.writer.frames_written()
    }

    /// Returns the underlying writer, positioned at the end of the file.
    pub fn finish(self) -> Result<W, Error> {
        self.writer.finish().map_err(Error::Trajectory)
    }
}

impl<W: Write + Seek> Reporter for DcdReporter<W> {
    fn interval(&self) -> u64 {
        self.interval
    }

    fn report(&mut self, state: &State<'_>) -> Result<(), Error> {
        self.writer
            .write_frame(state.positions, state.box_vectors)
            .map_err(Error::Trajectory)
    }
}
