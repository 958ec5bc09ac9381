use std::io::{self, Write};

use anyhow::{Context, Result};

use mdflow::System;
use mdflow::analysis::select;
use mdflow::forcefield::parameterize;

use crate::cli::InspectArgs;
use crate::config::build_forcefield_config;
use crate::display::{
    Context as DisplayContext, print_atom_types, print_parameters,
    print_residue_breakdown, print_structure_info,
};
use crate::io::read_structure;

pub fn run_inspect(args: InspectArgs, ctx: DisplayContext) -> Result<()> {
    let mut progress = ctx.progress(2, "Inspection complete");

    progress.stage("Reading structure");
    let system = read_structure(&args.structure)?;
    progress.complete_stage(
        "Reading structure",
        &[format!("{} atoms, {} bonds", system.atom_count(), system.bond_count()).as_str()],
    );

    progress.stage("Assigning force field");
    let ff_config = build_forcefield_config(args.forcefield.as_deref())?;
    let parameterized = parameterize(&system, &ff_config).context("Force field assignment failed")?;
    progress.complete_stage(
        "Assigning force field",
        &[format!("{} atom types", parameterized.atom_types.len()).as_str()],
    );

    progress.finish();

    print_structure_info(&system);
    print_residue_breakdown(&system);
    print_atom_types(&parameterized);
    print_parameters(&parameterized);

    if let Some(query) = &args.select {
        let indices = select(&system, query)?;
        let stdout = io::stdout();
        let mut out = stdout.lock();
        write_selection(&mut out, &system, &indices)?;
        out.flush()?;
    }

    Ok(())
}

/// One line per selected atom: index, name, residue, element and position.
fn write_selection(out: &mut impl Write, system: &System, indices: &[usize]) -> io::Result<()> {
    writeln!(out, "index\tname\tresidue\telement\tx_nm\ty_nm\tz_nm")?;
    for &i in indices {
        let atom = &system.atoms[i];
        let (name, residue) = match system.metadata.as_ref().and_then(|m| m.atom_info.get(i)) {
            Some(info) => (
                info.atom_name.clone(),
                format!("{}{}:{}", info.residue_name, info.residue_id, info.chain_id),
            ),
            None => ("-".to_string(), "-".to_string()),
        };
        let [x, y, z] = atom.position;
        writeln!(
            out,
            "{}\t{}\t{}\t{}\t{:.4}\t{:.4}\t{:.4}",
            i, name, residue, atom.element, x, y, z
        )?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use mdflow::{Atom, AtomResidueInfo, Element, ResidueMetadata};

    #[test]
    fn selection_listing() {
        let mut system = System::new();
        let mut metadata = ResidueMetadata::new();
        for (name, position) in [("C1", [0.1, 0.0, 0.0]), ("C2", [0.25, 0.0, 0.0])] {
            system.atoms.push(Atom::new(Element::C, position));
            metadata
                .atom_info
                .push(AtomResidueInfo::new(name, "BUT", 1, 'A'));
        }
        system.metadata = Some(metadata);

        let mut out = Vec::new();
        write_selection(&mut out, &system, &[1]).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert_eq!(
            text.lines().nth(1),
            Some("1\tC2\tBUT1:A\tC\t0.2500\t0.0000\t0.0000")
        );
    }
}
