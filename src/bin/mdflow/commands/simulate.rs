use std::io::{self, Write};

use anyhow::{Context, Result, anyhow};

use mdflow::engine::ForceModel;
use mdflow::forcefield::parameterize;
use mdflow::protocol::Protocol;
use mdflow::simulation::{Column, DcdReporter, Reporter, Simulation, StateDataReporter};

use crate::cli::SimulateArgs;
use crate::config::{build_forcefield_config, build_protocol};
use crate::display::{
    Context as DisplayContext, Progress, print_minimization, print_parameters,
    print_structure_info,
};
use crate::io::{create_output, read_structure, write_structure};

const TOTAL_STAGES: u8 = 6;

/// Rows reported to stdout during both dynamics stages.
const CONSOLE_COLUMNS: [Column; 6] = [
    Column::Step,
    Column::Time,
    Column::PotentialEnergy,
    Column::KineticEnergy,
    Column::Temperature,
    Column::Speed,
];

pub fn run_simulate(args: SimulateArgs, ctx: DisplayContext) -> Result<()> {
    let protocol = build_protocol(&args)?;
    let structure_path = protocol.system.structure.clone().ok_or_else(|| {
        anyhow!("No structure specified: pass -s/--structure or set [system].structure")
    })?;

    let mut progress = ctx.progress(TOTAL_STAGES, "Simulation complete");

    progress.stage("Reading structure");
    let system = read_structure(&structure_path)?;
    let read_details = [
        format!("Parse {}", structure_path.display()),
        format!("{} atoms, {} bonds", system.atom_count(), system.bond_count()),
    ];
    progress.complete_stage("Reading structure", &as_strs(&read_details));

    if ctx.show_tables() {
        print_structure_info(&system);
    }

    progress.stage("Assigning force field");
    let ff_config = build_forcefield_config(protocol.system.forcefield.as_deref())?;
    let parameterized = parameterize(&system, &ff_config).context("Force field assignment failed")?;
    let ff_details = [
        match &protocol.system.forcefield {
            Some(path) => format!("Parameters from {}", path.display()),
            None => "Built-in parameters (OPLS-AA butane, TIP3P water)".to_string(),
        },
        format!("Net charge {:+.4} e", parameterized.total_charge()),
    ];
    progress.complete_stage("Assigning force field", &as_strs(&ff_details));

    if ctx.show_tables() {
        print_parameters(&parameterized);
    }

    progress.stage("Building energy model");
    let model = ForceModel::new(&parameterized, &protocol.engine_config())
        .context("Failed to build the energy model")?;
    let model_details = build_model_details(&protocol, &model);
    let mut simulation = Simulation::new(model, protocol.integrator(), system.positions())?;
    progress.complete_stage("Building energy model", &as_strs(&model_details));

    progress.stage("Minimizing energy");
    let report = simulation
        .minimize(&protocol.minimize_options())
        .context("Energy minimization failed")?;
    let min_details = [format!(
        "{:.2} → {:.2} kJ/mol in {} iterations",
        report.initial_energy, report.final_energy, report.iterations
    )];
    progress.complete_stage("Minimizing energy", &as_strs(&min_details));

    if ctx.show_tables() {
        print_minimization(&report);
    }
    if !report.converged {
        log::warn!(
            "minimization stopped before reaching the force tolerance (max force {:.3} kJ/mol/nm)",
            report.max_force
        );
    }

    let temperature = protocol.integrator.temperature;
    simulation
        .set_velocities_to_temperature(temperature)
        .context("Failed to assign initial velocities")?;

    let mut console = StateDataReporter::new(io::stdout(), protocol.equilibration.report_interval)
        .with_columns(&CONSOLE_COLUMNS);

    let equil_steps = protocol.equilibration.steps;
    progress.run("Equilibrating", equil_steps);
    run_stage(&mut simulation, equil_steps, &mut [&mut console], &mut progress)
        .context("Equilibration failed")?;
    let equil_details = [format!(
        "{} steps at {} K, T = {:.1} K",
        equil_steps,
        temperature,
        simulation.state().temperature
    )];
    progress.complete_stage("Equilibrating", &as_strs(&equil_details));

    let production = &protocol.production;
    let prod_steps = production.steps;
    progress.run("Running production", prod_steps);

    let mut console = StateDataReporter::new(io::stdout(), production.report_interval)
        .with_columns(&CONSOLE_COLUMNS);
    let trajectory = create_output(&production.trajectory)?;
    let mut dcd = DcdReporter::new(trajectory, production.trajectory_interval, &simulation)
        .with_context(|| {
            format!(
                "Failed to start trajectory: {}",
                production.trajectory.display()
            )
        })?;
    let mut log_file = match &production.log {
        Some(path) => Some(
            StateDataReporter::new(create_output(path)?, production.report_interval)
                .with_columns(&Column::ALL),
        ),
        None => None,
    };

    {
        let mut reporters: Vec<&mut dyn Reporter> = Vec::with_capacity(3);
        reporters.push(&mut console);
        reporters.push(&mut dcd);
        if let Some(log_file) = log_file.as_mut() {
            reporters.push(log_file);
        }
        run_stage(&mut simulation, prod_steps, &mut reporters, &mut progress)
            .context("Production run failed")?;
    }

    let frames = dcd.frames_written();
    dcd.finish()?
        .flush()
        .context("Failed to flush trajectory")?;
    if let Some(log_file) = log_file {
        log_file
            .into_inner()
            .flush()
            .context("Failed to flush state data log")?;
    }

    let mut prod_details = vec![
        format!("{} steps, {:.3} ps simulated", prod_steps, simulation.time()),
        format!(
            "{} frames → {}",
            frames,
            production.trajectory.display()
        ),
    ];
    if let Some(path) = &production.log {
        prod_details.push(format!("State data → {}", path.display()));
    }
    if let Some(path) = &production.final_structure {
        write_structure(path, &system.with_positions(simulation.positions()))?;
        prod_details.push(format!("Final structure → {}", path.display()));
    }
    progress.complete_stage("Running production", &as_strs(&prod_details));

    progress.finish();

    Ok(())
}

/// Integrates in slices so the progress bar advances during long runs.
fn run_stage(
    simulation: &mut Simulation,
    steps: u64,
    reporters: &mut [&mut dyn Reporter],
    progress: &mut Progress,
) -> Result<()> {
    let slice = (steps / 100).max(1);
    let mut done = 0;
    while done < steps {
        let n = slice.min(steps - done);
        simulation.step(n, reporters)?;
        progress.advance(n);
        done += n;
    }
    Ok(())
}

fn build_model_details(protocol: &Protocol, model: &ForceModel) -> Vec<String> {
    let config = model.config();
    let mut details = vec![format!(
        "Nonbonded: {}{}",
        config.nonbonded_method,
        if config.nonbonded_method.uses_cutoff() {
            format!(" ({} nm cutoff)", config.cutoff)
        } else {
            String::new()
        }
    )];
    details.push(format!(
        "Constraints: {} ({} bonds)",
        config.constraints,
        model.constraints().len()
    ));
    details.push(format!("{} degrees of freedom", model.degrees_of_freedom()));
    details.push(format!(
        "Langevin: T = {} K, γ = {} ps⁻¹, dt = {} ps",
        protocol.integrator.temperature, protocol.integrator.friction, protocol.integrator.step_size
    ));
    details
}

fn as_strs(items: &[String]) -> Vec<&str> {
    items.iter().map(String::as_str).collect()
}
