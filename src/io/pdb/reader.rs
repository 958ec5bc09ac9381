use crate::io::{ANGSTROM_PER_NM, Format, error::Error, util};
use crate::model::{
    atom::Atom,
    metadata::{AtomResidueInfo, Record, ResidueMetadata},
    system::System,
    types::Element,
};
use log::debug;
use std::collections::HashMap;
use std::io::BufRead;

/// Cell lengths at or below this (Å) are placeholders written by tools that
/// have no box, not a real unit cell.
const PLACEHOLDER_CELL_LENGTH: f64 = 1.0 + 1e-6;

pub fn read<R: BufRead>(reader: R) -> Result<System, Error> {
    let mut atoms = Vec::new();
    let mut metadata = ResidueMetadata::new();
    let mut serial_to_index: HashMap<i64, usize> = HashMap::new();
    let mut conect: Vec<(usize, i64, Vec<i64>)> = Vec::new();
    let mut box_vectors = None;

    for (idx, line) in reader.lines().enumerate() {
        let line_no = idx + 1;
        let line = line?;
        let record = field(&line, 0, 6);

        match record {
            "ATOM" | "HETATM" => {
                let Some((atom, info)) = parse_atom_line(&line, line_no)? else {
                    continue;
                };
                let serial = field(&line, 6, 11)
                    .parse::<i64>()
                    .unwrap_or(atoms.len() as i64 + 1);
                serial_to_index.insert(serial, atoms.len());
                atoms.push(atom);
                metadata.atom_info.push(info);
            }
            "CRYST1" => {
                box_vectors = parse_cryst1(&line, line_no)?;
            }
            "CONECT" => {
                let (origin, partners) = parse_conect(&line, line_no)?;
                conect.push((line_no, origin, partners));
            }
            "ENDMDL" | "END" => break,
            _ => {}
        }
    }

    let mut system = System {
        atoms,
        bonds: Vec::new(),
        box_vectors,
        metadata: Some(metadata),
    };

    for (line_no, origin, partners) in conect {
        let i = *serial_to_index.get(&origin).ok_or_else(|| {
            Error::parse(
                Format::Pdb,
                line_no,
                format!("CONECT references unknown atom serial {}", origin),
            )
        })?;
        for partner in partners {
            let j = *serial_to_index.get(&partner).ok_or_else(|| {
                Error::parse(
                    Format::Pdb,
                    line_no,
                    format!("CONECT references unknown atom serial {}", partner),
                )
            })?;
            if i != j {
                system.add_bond(i, j);
            }
        }
    }

    debug!(
        "read PDB: {} atoms, {} bonds, periodic = {}",
        system.atom_count(),
        system.bond_count(),
        system.is_periodic()
    );

    Ok(system)
}

/// Returns the trimmed substring at `[start, end)`, tolerating short lines.
fn field(line: &str, start: usize, end: usize) -> &str {
    let end = end.min(line.len());
    if start >= end {
        return "";
    }
    line.get(start..end).unwrap_or("").trim()
}

fn parse_coord(line: &str, start: usize, line_no: usize, axis: &str) -> Result<f64, Error> {
    let raw = field(line, start, start + 8);
    raw.parse::<f64>()
        .map(|v| v / ANGSTROM_PER_NM)
        .map_err(|_| {
            Error::parse(
                Format::Pdb,
                line_no,
                format!("invalid {} coordinate '{}'", axis, raw),
            )
        })
}

fn parse_atom_line(
    line: &str,
    line_no: usize,
) -> Result<Option<(Atom, AtomResidueInfo)>, Error> {
    let alt_loc = field(line, 16, 17);
    if !alt_loc.is_empty() && alt_loc != "A" {
        return Ok(None);
    }

    let atom_name = field(line, 12, 16);
    let residue_name = {
        let base = field(line, 17, 20);
        let fourth = field(line, 20, 21);
        if fourth.is_empty() {
            base.to_string()
        } else {
            format!("{}{}", base, fourth)
        }
    };
    let chain_id = field(line, 21, 22).chars().next().unwrap_or(' ');
    let residue_id = field(line, 22, 26).parse::<i32>().unwrap_or(0);
    let insertion_code = field(line, 26, 27).chars().next().unwrap_or(' ');

    let position = [
        parse_coord(line, 30, line_no, "x")?,
        parse_coord(line, 38, line_no, "y")?,
        parse_coord(line, 46, line_no, "z")?,
    ];

    let element_field = field(line, 76, 78);
    let element = if element_field.is_empty() {
        None
    } else {
        element_field.parse::<Element>().ok()
    }
    .or_else(|| util::guess_element(atom_name, &residue_name))
    .ok_or_else(|| {
        Error::parse(
            Format::Pdb,
            line_no,
            format!("unable to infer element for atom '{}'", atom_name),
        )
    })?;

    let record = if field(line, 0, 6) == "HETATM" {
        Record::Hetatm
    } else {
        Record::Atom
    };

    let info = AtomResidueInfo::new(atom_name, residue_name, residue_id, chain_id)
        .with_insertion_code(insertion_code)
        .with_record(record);

    Ok(Some((Atom::new(element, position), info)))
}

fn parse_cryst1(line: &str, line_no: usize) -> Result<Option<[[f64; 3]; 3]>, Error> {
    let parse = |start: usize, end: usize, what: &str| -> Result<f64, Error> {
        let raw = field(line, start, end);
        raw.parse::<f64>().map_err(|_| {
            Error::parse(
                Format::Pdb,
                line_no,
                format!("invalid CRYST1 {} '{}'", what, raw),
            )
        })
    };

    let lengths = [
        parse(6, 15, "a")?,
        parse(15, 24, "b")?,
        parse(24, 33, "c")?,
    ];
    let angles = [
        parse(33, 40, "alpha")?,
        parse(40, 47, "beta")?,
        parse(47, 54, "gamma")?,
    ];

    if lengths.iter().all(|&l| l <= PLACEHOLDER_CELL_LENGTH) {
        return Ok(None);
    }

    let lengths_nm = lengths.map(|l| l / ANGSTROM_PER_NM);
    Ok(Some(util::box_vectors_from_cell(lengths_nm, angles)))
}

fn parse_conect(line: &str, line_no: usize) -> Result<(i64, Vec<i64>), Error> {
    let origin = field(line, 6, 11).parse::<i64>().map_err(|_| {
        Error::parse(Format::Pdb, line_no, "invalid atom serial in CONECT record")
    })?;

    let mut partners = Vec::with_capacity(4);
    for start in [11, 16, 21, 26] {
        let raw = field(line, start, start + 5);
        if raw.is_empty() {
            continue;
        }
        let serial = raw.parse::<i64>().map_err(|_| {
            Error::parse(
                Format::Pdb,
                line_no,
                format!("invalid bonded serial '{}' in CONECT record", raw),
            )
        })?;
        partners.push(serial);
    }

    Ok((origin, partners))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::io::Cursor;

    const WATER: &str = "\
CRYST1   30.000   30.000   30.000  90.00  90.00  90.00 P 1           1
HETATM    1  O   HOH W   1       0.000   0.000   0.000  1.00  0.00           O
HETATM    2  H1  HOH W   1       0.957   0.000   0.000  1.00  0.00           H
HETATM    3  H2  HOH W   1      -0.240   0.927   0.000  1.00  0.00           H
CONECT    1    2    3
CONECT    2    1
END
";

    #[test]
    fn reads_atoms_bonds_and_box() {
        let system = read(Cursor::new(WATER)).expect("read water");

        assert_eq!(system.atom_count(), 3);
        assert_eq!(system.bond_count(), 2);
        assert_eq!(system.atoms[0].element, Element::O);
        assert_relative_eq!(system.atoms[1].position[0], 0.0957, epsilon = 1e-12);

        let box_vectors = system.box_vectors.expect("box");
        assert_relative_eq!(box_vectors[0][0], 3.0, epsilon = 1e-12);
        assert_relative_eq!(box_vectors[2][2], 3.0, epsilon = 1e-9);

        let metadata = system.metadata.as_ref().expect("metadata");
        assert_eq!(metadata.atom_info[1].atom_name, "H1");
        assert_eq!(metadata.atom_info[1].residue_name, "HOH");
        assert_eq!(metadata.atom_info[1].chain_id, 'W');
        assert_eq!(metadata.atom_info[1].record, Record::Hetatm);
    }

    #[test]
    fn infers_element_from_atom_name_when_columns_blank() {
        let pdb = "ATOM      1  C1  BUT A   1       1.000   2.000   3.000\n";
        let system = read(Cursor::new(pdb)).expect("read");
        assert_eq!(system.atoms[0].element, Element::C);
        assert_relative_eq!(system.atoms[0].position[2], 0.3, epsilon = 1e-12);
    }

    #[test]
    fn placeholder_cryst1_is_ignored() {
        let pdb = "CRYST1    1.000    1.000    1.000  90.00  90.00  90.00 P 1           1\n";
        let system = read(Cursor::new(pdb)).expect("read");
        assert!(!system.is_periodic());
    }

    #[test]
    fn stops_at_first_model() {
        let pdb = "\
MODEL        1
ATOM      1  C1  BUT A   1       0.000   0.000   0.000  1.00  0.00           C
ENDMDL
MODEL        2
ATOM      1  C1  BUT A   1       5.000   0.000   0.000  1.00  0.00           C
ENDMDL
";
        let system = read(Cursor::new(pdb)).expect("read");
        assert_eq!(system.atom_count(), 1);
        assert_relative_eq!(system.atoms[0].position[0], 0.0);
    }

    #[test]
    fn skips_secondary_alternate_locations() {
        let pdb = "\
ATOM      1  C1 ABUT A   1       0.000   0.000   0.000  0.50  0.00           C
ATOM      2  C1 BBUT A   1       0.100   0.000   0.000  0.50  0.00           C
";
        let system = read(Cursor::new(pdb)).expect("read");
        assert_eq!(system.atom_count(), 1);
    }

    #[test]
    fn malformed_coordinate_reports_line() {
        let pdb = "\
REMARK test
ATOM      1  C1  BUT A   1       x.xxx   0.000   0.000  1.00  0.00           C
";
        let err = read(Cursor::new(pdb)).expect_err("bad coordinate");
        match err {
            Error::Parse { format, line, .. } => {
                assert_eq!(format, Format::Pdb);
                assert_eq!(line, 2);
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn conect_to_unknown_serial_is_an_error() {
        let pdb = "\
ATOM      1  C1  BUT A   1       0.000   0.000   0.000  1.00  0.00           C
CONECT    1   99
";
        assert!(matches!(
            read(Cursor::new(pdb)),
            Err(Error::Parse { line: 2, .. })
        ));
    }

    #[test]
    fn truncated_atom_record_is_an_error() {
        assert!(matches!(
            read(Cursor::new("ATOM")),
            Err(Error::Parse { line: 1, .. })
        ));
    }

    #[test]
    fn empty_input_yields_empty_system() {
        let system = read(Cursor::new("")).expect("empty input");
        assert_eq!(system.atom_count(), 0);
        assert!(system.has_metadata());
    }
}
