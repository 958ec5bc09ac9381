use std::f64::consts::PI;
use std::io::{self, Write};

use anyhow::{Context, Result, bail};

use mdflow::analysis::{
    Histogram, Summary, Trajectory, compute_angles, compute_dihedrals, compute_distances,
    find_atoms_by_name,
};
use mdflow::io::{DcdReader, Format};

use crate::cli::{AnalyzeArgs, MeasureOptions};
use crate::display::{
    Context as DisplayContext, print_histogram, print_measurement_summary,
};
use crate::io::{create_output, infer_trajectory_format, open_input, read_structure};
use crate::util::text::split_names;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Kind {
    Distance,
    Angle,
    Dihedral,
}

impl Kind {
    fn arity(self) -> usize {
        match self {
            Kind::Distance => 2,
            Kind::Angle => 3,
            Kind::Dihedral => 4,
        }
    }

    fn symbol(self) -> &'static str {
        match self {
            Kind::Distance => "d",
            Kind::Angle => "θ",
            Kind::Dihedral => "φ",
        }
    }

    fn flag(self) -> &'static str {
        match self {
            Kind::Distance => "--distance",
            Kind::Angle => "--angle",
            Kind::Dihedral => "--dihedral",
        }
    }
}

/// One measured series across all frames.
struct Measurement {
    label: String,
    kind: Kind,
    values: Vec<f64>,
}

pub fn run_analyze(args: AnalyzeArgs, ctx: DisplayContext) -> Result<()> {
    let requests = parse_requests(&args.measure)?;
    if requests.is_empty() {
        bail!("Nothing to measure: pass at least one --distance, --angle or --dihedral");
    }
    if infer_trajectory_format(&args.trajectory) == Some(Format::Pdb) {
        bail!(
            "'{}' is a structure; pass the DCD trajectory with -t and the PDB with -p",
            args.trajectory.display()
        );
    }

    let total_stages = if args.output.is_some() { 4 } else { 3 };
    let mut progress = ctx.progress(total_stages, "Analysis complete");

    progress.stage("Reading topology");
    let topology = read_structure(&args.topology)?;
    progress.complete_stage(
        "Reading topology",
        &[format!("{} atoms", topology.atom_count()).as_str()],
    );

    progress.stage("Loading trajectory");
    let reader = DcdReader::new(open_input(&args.trajectory)?)
        .with_context(|| format!("Failed to open trajectory: {}", args.trajectory.display()))?;
    let trajectory = Trajectory::load(reader, topology)
        .with_context(|| format!("Failed to load trajectory: {}", args.trajectory.display()))?;
    let span = match trajectory.times().as_slice() {
        [first, .., last] => format!("{:.3}–{:.3} ps", first, last),
        [only] => format!("{:.3} ps", only),
        [] => "empty".to_string(),
    };
    progress.complete_stage(
        "Loading trajectory",
        &[format!("{} frames, {}", trajectory.n_frames(), span).as_str()],
    );

    progress.stage("Measuring");
    let measurements = measure(&trajectory, &requests, args.measure.degrees)?;
    let measure_details: Vec<String> = measurements.iter().map(|m| m.label.clone()).collect();
    let measure_details_ref: Vec<&str> = measure_details.iter().map(|s| s.as_str()).collect();
    progress.complete_stage("Measuring", &measure_details_ref);

    if let Some(path) = &args.output {
        progress.stage("Writing per-frame values");
        let mut out = create_output(path)?;
        write_csv(&mut out, &trajectory.times(), &measurements, args.measure.degrees)
            .and_then(|()| out.flush())
            .with_context(|| format!("Failed to write {}", path.display()))?;
        progress.complete_stage(
            "Writing per-frame values",
            &[path.display().to_string().as_str()],
        );
    }

    progress.finish();

    report(&measurements, &args.measure)
}

/// Parses every `--distance`/`--angle`/`--dihedral` flag, in that order.
fn parse_requests(opts: &MeasureOptions) -> Result<Vec<(Kind, Vec<String>)>> {
    let groups = [
        (Kind::Distance, &opts.distances),
        (Kind::Angle, &opts.angles),
        (Kind::Dihedral, &opts.dihedrals),
    ];

    let mut requests = Vec::new();
    for (kind, specs) in groups {
        for spec in specs {
            let names: Vec<String> = split_names(spec).into_iter().map(String::from).collect();
            if names.len() != kind.arity() {
                bail!(
                    "{} expects {} comma-separated atom names, got '{}'",
                    kind.flag(),
                    kind.arity(),
                    spec
                );
            }
            requests.push((kind, names));
        }
    }
    Ok(requests)
}

fn measure(
    trajectory: &Trajectory,
    requests: &[(Kind, Vec<String>)],
    degrees: bool,
) -> Result<Vec<Measurement>> {
    requests
        .iter()
        .map(|(kind, names)| -> Result<Measurement> {
            let name_refs: Vec<&str> = names.iter().map(String::as_str).collect();
            let idx = find_atoms_by_name(&trajectory.topology, &name_refs)?;

            let per_frame = match kind {
                Kind::Distance => compute_distances(trajectory, &[(idx[0], idx[1])])?,
                Kind::Angle => compute_angles(trajectory, &[[idx[0], idx[1], idx[2]]])?,
                Kind::Dihedral => {
                    compute_dihedrals(trajectory, &[[idx[0], idx[1], idx[2], idx[3]]])?
                }
            };

            let values = per_frame
                .into_iter()
                .map(|row| row[0])
                .map(|v| {
                    if degrees && *kind != Kind::Distance {
                        v.to_degrees()
                    } else {
                        v
                    }
                })
                .collect();

            Ok(Measurement {
                label: format!("{}({})", kind.symbol(), names.join("-")),
                kind: *kind,
                values,
            })
        })
        .collect()
}

fn unit(kind: Kind, degrees: bool) -> &'static str {
    match (kind, degrees) {
        (Kind::Distance, _) => "nm",
        (_, true) => "deg",
        (_, false) => "rad",
    }
}

/// Fixed ranges for angular quantities so histograms from different runs
/// line up; distances use the data range.
fn histogram_range(kind: Kind, degrees: bool) -> Option<(f64, f64)> {
    let half_turn = if degrees { 180.0 } else { PI };
    match kind {
        Kind::Distance => None,
        Kind::Angle => Some((0.0, half_turn)),
        Kind::Dihedral => Some((-half_turn, half_turn)),
    }
}

fn report(measurements: &[Measurement], opts: &MeasureOptions) -> Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();

    let rows: Vec<(String, &str, Summary)> = measurements
        .iter()
        .filter_map(|m| {
            Summary::of(&m.values).map(|s| (m.label.clone(), unit(m.kind, opts.degrees), s))
        })
        .collect();
    if rows.is_empty() {
        writeln!(out, "Trajectory has no frames; nothing to summarize.")?;
        return Ok(());
    }
    print_measurement_summary(&mut out, &rows);
    writeln!(out)?;

    for m in measurements {
        let histogram = Histogram::new(&m.values, opts.bins, histogram_range(m.kind, opts.degrees))?;
        print_histogram(&mut out, &m.label, unit(m.kind, opts.degrees), &histogram);
    }

    out.flush()?;
    Ok(())
}

fn write_csv(
    out: &mut impl Write,
    times: &[f64],
    measurements: &[Measurement],
    degrees: bool,
) -> io::Result<()> {
    write!(out, "frame,time_ps")?;
    for m in measurements {
        write!(out, ",{}_{}", m.label, unit(m.kind, degrees))?;
    }
    writeln!(out)?;

    for (frame, time) in times.iter().enumerate() {
        write!(out, "{},{}", frame, time)?;
        for m in measurements {
            write!(out, ",{}", m.values[frame])?;
        }
        writeln!(out)?;
    }
    Ok(())
}
