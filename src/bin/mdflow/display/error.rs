use std::io::{self, Write};

use anyhow::Error;

use crate::util::text::wrap;

#[rustfmt::skip]
pub fn print_error(err: &Error) {
    let mut stderr = io::stderr().lock();

    let _ = writeln!(stderr);
    let _ = writeln!(stderr, "   ╔══════════════════════════════════════════════════════════════╗");
    let _ = writeln!(stderr, "   ║  ✗ Error                                                     ║");
    let _ = writeln!(stderr, "   ╟──────────────────────────────────────────────────────────────╢");

    for line in wrap(&err.to_string(), 59) {
        let _ = writeln!(stderr, "   ║  {:<59} ║", line);
    }

    for cause in err.chain().skip(1) {
        let _ = writeln!(stderr, "   ╟──────────────────────────────────────────────────────────────╢");
        let _ = writeln!(stderr, "   ║  Caused by:                                                  ║");
        for line in wrap(&cause.to_string(), 57) {
            let _ = writeln!(stderr, "   ║    {:<57} ║", line);
        }
    }

    let hints = HintCollector::collect(err);
    if !hints.is_empty() {
        let _ = writeln!(stderr, "   ╟──────────────────────────────────────────────────────────────╢");
        let _ = writeln!(stderr, "   ║  Hints:                                                      ║");
        for hint in hints {
            let wrapped = wrap(&hint, 55);
            if let Some((first, rest)) = wrapped.split_first() {
                let _ = writeln!(stderr, "   ║    • {:<55} ║", first);
                for line in rest {
                    let _ = writeln!(stderr, "   ║      {:<55} ║", line);
                }
            }
        }
    }

    let _ = writeln!(stderr, "   ╚══════════════════════════════════════════════════════════════╝");
    let _ = writeln!(stderr);
}

#[derive(Default)]
struct HintCollector {
    hints: Vec<String>,
    has_typed_hints: bool,
}

impl HintCollector {
    fn collect(err: &Error) -> Vec<String> {
        let mut collector = Self::default();

        collector.collect_io_hints(err);
        collector.collect_forcefield_hints(err);
        collector.collect_engine_hints(err);
        collector.collect_simulation_hints(err);
        collector.collect_protocol_hints(err);
        collector.collect_analysis_hints(err);

        if !collector.has_typed_hints {
            collector.collect_fallback_hints(err);
        }

        collector.hints
    }

    fn add(&mut self, hint: impl Into<String>) {
        self.hints.push(hint.into());
    }

    fn mark_typed(&mut self) {
        self.has_typed_hints = true;
    }

    fn collect_io_hints(&mut self, err: &Error) {
        if let Some(io_err) = err.downcast_ref::<mdflow::io::Error>() {
            self.mark_typed();
            self.add_file_format_hints(io_err);
        }
    }

    fn add_file_format_hints(&mut self, io_err: &mdflow::io::Error) {
        use mdflow::io::{Error as IoError, Format};

        match io_err {
            IoError::Io { source } => self.collect_std_io_hints(source),

            IoError::Parse { format, line, .. } => {
                self.add(format!(
                    "Parser encountered an issue near line {} in {} format",
                    line, format
                ));
                self.add("Inspect the file around that line for malformed entries");
                if *format == Format::Pdb {
                    self.add("PDB: Check ATOM/HETATM column alignment (x, y, z in columns 31-54)");
                    self.add("PDB: CONECT records must reference existing atom serials");
                }
            }

            IoError::Corrupt { format, offset, .. } => {
                self.add(format!("The {} file is damaged near byte {}", format, offset));
                self.add("The file may be truncated, big-endian, or not a DCD trajectory");
                self.add("A run interrupted mid-frame leaves a partial final frame");
            }

            IoError::MissingMetadata(format) => {
                self.add(format!(
                    "Writing {} requires atom and residue names",
                    format
                ));
                self.add("Start from a PDB structure so residue metadata is available");
            }

            IoError::FrameSize { expected, found } => {
                self.add(format!(
                    "Trajectory was opened for {} atoms, frame has {}",
                    expected, found
                ));
            }

            IoError::MissingUnitCell => {
                self.add("The trajectory header declares a periodic box");
                self.add("Every frame must then carry box vectors");
            }
        }
    }

    fn collect_std_io_hints(&mut self, source: &std::io::Error) {
        use std::io::ErrorKind;

        match source.kind() {
            ErrorKind::NotFound => {
                self.add("File or directory not found");
                self.add("Check the path spelling and ensure the file exists");
            }

            ErrorKind::PermissionDenied => {
                self.add("Permission denied accessing the file");
                self.add("Check file permissions with `ls -la`");
            }

            ErrorKind::UnexpectedEof => {
                self.add("Unexpected end of file encountered");
                self.add("The file may be truncated or incomplete");
            }

            ErrorKind::WriteZero | ErrorKind::StorageFull => {
                self.add("Failed to write data (disk full?)");
                self.add("Check available disk space");
            }

            ErrorKind::BrokenPipe => {
                self.add("Output consumer terminated early");
                self.add("This may occur when piping to commands like `head`");
            }

            _ => {
                self.add("I/O operation failed");
                self.add("Check file path, permissions, and disk space");
            }
        }
    }

    fn collect_forcefield_hints(&mut self, err: &Error) {
        use mdflow::forcefield::Error as FfError;

        let Some(ff_err) = err.downcast_ref::<FfError>() else {
            return;
        };

        self.mark_typed();

        match ff_err {
            FfError::ParameterParse(_) => {
                self.add("Force field parameter file has invalid TOML syntax");
                self.add("Check for missing quotes, brackets, or unknown keys");
            }

            FfError::EmptySystem => {
                self.add("Input structure contains no atoms");
                self.add("Verify the file has ATOM or HETATM records");
            }

            FfError::MissingMetadata => {
                self.add("Templates are matched by residue and atom names");
                self.add("Use a PDB file with residue names and atom names");
            }

            FfError::UnknownResidue { residue, .. } => {
                self.add(format!("Add a [[residues]] template named '{}'", residue));
                self.add("Pass the extended parameter file with -f/--forcefield");
                self.add("The built-in parameters cover butane (BUT) and TIP3P water (HOH)");
            }

            FfError::TemplateMismatch { residue, .. } => {
                self.add(format!(
                    "Atom names in residue '{}' must match its template exactly",
                    residue
                ));
                self.add("Check for missing hydrogens or renamed atoms");
            }

            FfError::MissingParameter { kind, types } => {
                self.add(format!("No {} entry covers types {}", kind, types));
                self.add("Add the entry (by type or class) to your parameter file");
            }

            FfError::UnknownAtomType(name) => {
                self.add(format!("Define atom type [atom_types.{}] in the parameter file", name));
            }

            FfError::InvalidBond { i, j, .. } => {
                self.add(format!("Check the CONECT records for atoms {} and {}", i + 1, j + 1));
            }
        }
    }

    fn collect_engine_hints(&mut self, err: &Error) {
        if let Some(engine_err) = err.downcast_ref::<mdflow::engine::Error>() {
            self.mark_typed();
            self.add_engine_hints(engine_err);
        }
    }

    fn add_engine_hints(&mut self, engine_err: &mdflow::engine::Error) {
        use mdflow::engine::Error as EngineError;

        match engine_err {
            EngineError::InvalidConfig(_) => {
                self.add("Review the [system] section of the protocol");
            }

            EngineError::MissingBox(method) => {
                self.add(format!(
                    "{} needs a CRYST1 record in the structure",
                    method
                ));
                self.add("Or set nonbonded_method = \"no-cutoff\" or \"cutoff-non-periodic\"");
            }

            EngineError::CutoffTooLarge { limit, .. } => {
                self.add(format!("Lower the cutoff to at most {:.3} nm", limit));
                self.add("Or enlarge the periodic box");
            }

            EngineError::InvalidMass { atom, .. } => {
                self.add(format!("Check the mass of atom {}'s type", atom + 1));
            }

            EngineError::AtomCountMismatch { .. } => {
                self.add("Coordinates and topology describe different systems");
            }

            EngineError::ConstraintFailure { .. } => {
                self.add("Bond constraints could not be satisfied");
                self.add("Minimize first, or reduce the step size");
            }

            EngineError::NonFiniteEnergy { term } => {
                self.add(format!("The {} term blew up", term));
                self.add("Overlapping atoms: minimize before running dynamics");
                self.add("Reduce integrator.step_size (0.001-0.002 ps is typical)");
                self.add("Use constraints = \"h-bonds\" with steps above 1 fs");
            }
        }
    }

    fn collect_simulation_hints(&mut self, err: &Error) {
        use mdflow::simulation::Error as SimError;

        let Some(sim_err) = err.downcast_ref::<SimError>() else {
            return;
        };

        self.mark_typed();

        match sim_err {
            SimError::Engine(engine_err) => self.add_engine_hints(engine_err),
            SimError::Trajectory(io_err) => self.add_file_format_hints(io_err),
            SimError::Report(source) => self.collect_std_io_hints(source),
        }
    }

    fn collect_protocol_hints(&mut self, err: &Error) {
        use mdflow::protocol::Error as ProtocolError;

        let Some(protocol_err) = err.downcast_ref::<ProtocolError>() else {
            return;
        };

        self.mark_typed();

        match protocol_err {
            ProtocolError::Read { source, .. } => self.collect_std_io_hints(source),

            ProtocolError::Parse(_) => {
                self.add("Protocol file has invalid TOML or an unknown key");
                self.add("Sections: [system], [integrator], [minimize], [equilibration], [production]");
            }

            ProtocolError::Invalid { field, .. } => {
                self.add(format!("Fix '{}' in the protocol or its command-line flag", field));
            }
        }
    }

    fn collect_analysis_hints(&mut self, err: &Error) {
        use mdflow::analysis::Error as AnalysisError;

        let Some(analysis_err) = err.downcast_ref::<AnalysisError>() else {
            return;
        };

        self.mark_typed();

        match analysis_err {
            AnalysisError::Trajectory(io_err) => self.add_file_format_hints(io_err),

            AnalysisError::AtomCountMismatch { .. } => {
                self.add("The topology must be the structure the trajectory was run from");
            }

            AnalysisError::AtomIndexOutOfRange { .. } => {
                self.add("Atom indices are zero-based");
            }

            AnalysisError::Selection { .. } => {
                self.add("Keywords: all, name, resname, resid, chain, index, element");
                self.add("Combine terms with and/or, negate with not");
            }

            AnalysisError::UnknownAtomName(_) => {
                self.add("Atom names are case-sensitive (e.g. C1, H11)");
                self.add("Run `mdflow inspect --select all` to list atoms");
            }

            AnalysisError::AmbiguousAtomName { .. } => {
                self.add("Qualify the name with its residue, e.g. BUT:C1 or 2:O");
            }

            AnalysisError::InvalidHistogram(_) => {
                self.add("Use --bins with a positive number");
            }
        }
    }

    fn collect_fallback_hints(&mut self, err: &Error) {
        let msg = error_chain_text(err);

        if msg.contains("no such file") || msg.contains("not found") {
            self.add("Check that the file path is correct");
            self.add("Relative paths in a protocol are resolved from the protocol's directory");
            return;
        }

        if msg.contains("permission denied") {
            self.add("Check file permissions with `ls -la`");
            return;
        }

        if msg.contains("no structure") {
            self.add("Pass -s/--structure or set [system].structure in the protocol");
        }
    }
}

fn error_chain_text(err: &Error) -> String {
    err.chain()
        .map(|cause| cause.to_string())
        .collect::<Vec<_>>()
        .join("\n")
        .to_lowercase()
}
