use crate::io::{ANGSTROM_PER_NM, error::Error, util};
use crate::model::{
    metadata::{AtomResidueInfo, Record},
    system::System,
};
use std::io::Write;

/// Maximum number of bonded partners per CONECT line.
const CONECT_PER_LINE: usize = 4;

pub fn write<W: Write>(mut writer: W, system: &System) -> Result<(), Error> {
    let metadata = system
        .metadata
        .as_ref()
        .ok_or(Error::MissingMetadata("PDB"))?;

    if let Some(box_vectors) = &system.box_vectors {
        let (lengths, angles) = util::cell_from_box_vectors(box_vectors);
        writeln!(
            writer,
            "CRYST1{:9.3}{:9.3}{:9.3}{:7.2}{:7.2}{:7.2} P 1           1",
            lengths[0] * ANGSTROM_PER_NM,
            lengths[1] * ANGSTROM_PER_NM,
            lengths[2] * ANGSTROM_PER_NM,
            angles[0],
            angles[1],
            angles[2],
        )?;
    }

    let mut serial = 0usize;
    let mut serials = Vec::with_capacity(system.atom_count());
    let mut previous: Option<&AtomResidueInfo> = None;

    for (atom, info) in system.atoms.iter().zip(&metadata.atom_info) {
        if let Some(prev) = previous {
            if prev.chain_id != info.chain_id {
                serial += 1;
                write_ter(&mut writer, serial, prev)?;
            }
        }

        serial += 1;
        serials.push(serial);

        let record = match info.record {
            Record::Atom => "ATOM  ",
            Record::Hetatm => "HETATM",
        };
        let symbol = atom.element.symbol();
        let [x, y, z] = atom.position.map(|v| v * ANGSTROM_PER_NM);

        writeln!(
            writer,
            "{}{:>5} {:<4} {:<4}{}{:>4}{}   {:8.3}{:8.3}{:8.3}{:6.2}{:6.2}          {:>2}",
            record,
            serial % 100_000,
            format_atom_name(&info.atom_name, symbol),
            truncate(&info.residue_name, 4),
            info.chain_id,
            info.residue_id % 10_000,
            info.insertion_code,
            x,
            y,
            z,
            1.0,
            0.0,
            symbol.to_uppercase(),
        )?;

        previous = Some(info);
    }

    if let Some(prev) = previous {
        serial += 1;
        write_ter(&mut writer, serial, prev)?;
    }

    write_conect(&mut writer, system, &serials)?;
    writeln!(writer, "END")?;
    Ok(())
}

/// Aligns an atom name the way PDB files expect: names shorter than four
/// characters with a one-letter element start in column 14.
fn format_atom_name(name: &str, symbol: &str) -> String {
    if name.len() < 4 && symbol.len() == 1 {
        format!(" {}", name)
    } else {
        truncate(name, 4).to_string()
    }
}

fn truncate(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

fn write_ter<W: Write>(writer: &mut W, serial: usize, last: &AtomResidueInfo) -> Result<(), Error> {
    writeln!(
        writer,
        "TER   {:>5}      {:<4}{}{:>4}{}",
        serial % 100_000,
        truncate(&last.residue_name, 4),
        last.chain_id,
        last.residue_id % 10_000,
        last.insertion_code,
    )?;
    Ok(())
}

fn write_conect<W: Write>(writer: &mut W, system: &System, serials: &[usize]) -> Result<(), Error> {
    let mut partners: Vec<Vec<usize>> = vec![Vec::new(); system.atom_count()];
    for bond in &system.bonds {
        partners[bond.i].push(serials[bond.j]);
        partners[bond.j].push(serials[bond.i]);
    }

    for (idx, list) in partners.iter_mut().enumerate() {
        if list.is_empty() {
            continue;
        }
        list.sort_unstable();
        for chunk in list.chunks(CONECT_PER_LINE) {
            write!(writer, "CONECT{:>5}", serials[idx] % 100_000)?;
            for partner in chunk {
                write!(writer, "{:>5}", partner % 100_000)?;
            }
            writeln!(writer)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::read_pdb;
    use crate::model::{
        atom::Atom,
        metadata::{AtomResidueInfo, ResidueMetadata},
        types::Element,
    };
    use approx::assert_relative_eq;
    use std::io::Cursor;

    fn water() -> System {
        let mut system = System {
            atoms: vec![
                Atom::new(Element::O, [0.0, 0.0, 0.0]),
                Atom::new(Element::H, [0.0957, 0.0, 0.0]),
                Atom::new(Element::H, [-0.024, 0.0927, 0.0]),
            ],
            bonds: Vec::new(),
            box_vectors: Some([[2.5, 0.0, 0.0], [0.0, 2.5, 0.0], [0.0, 0.0, 2.5]]),
            metadata: Some(ResidueMetadata {
                atom_info: ["O", "H1", "H2"]
                    .iter()
                    .map(|name| {
                        AtomResidueInfo::new(*name, "HOH", 1, 'W').with_record(Record::Hetatm)
                    })
                    .collect(),
            }),
        };
        system.add_bond(0, 1);
        system.add_bond(0, 2);
        system
    }

    fn write_to_string(system: &System) -> String {
        let mut buffer = Vec::new();
        write(&mut buffer, system).expect("write PDB");
        String::from_utf8(buffer).expect("utf8")
    }

    #[test]
    fn writes_fixed_column_records() {
        let text = write_to_string(&water());
        let lines: Vec<&str> = text.lines().collect();

        assert!(lines[0].starts_with("CRYST1   25.000   25.000   25.000  90.00  90.00  90.00"));
        let atom = lines[1];
        assert!(atom.starts_with("HETATM    1  O   HOH W   1"));
        assert_eq!(&atom[30..38], "   0.000");
        assert_eq!(&atom[76..78], " O");
        assert_eq!(&lines[2][12..16], " H1 ");
        assert_eq!(&lines[2][30..38], "   0.957");
        assert!(lines[4].starts_with("TER"));
        assert_eq!(lines[5], "CONECT    1    2    3");
        assert_eq!(*lines.last().unwrap(), "END");
    }

    #[test]
    fn output_reads_back_to_the_same_system() {
        let original = water();
        let text = write_to_string(&original);
        let parsed = read_pdb(Cursor::new(text)).expect("read back");

        assert_eq!(parsed.atom_count(), original.atom_count());
        assert_eq!(parsed.bonds, original.bonds);
        for (a, b) in original.atoms.iter().zip(&parsed.atoms) {
            assert_eq!(a.element, b.element);
            for k in 0..3 {
                assert_relative_eq!(a.position[k], b.position[k], epsilon = 1e-4);
            }
        }
        let box_vectors = parsed.box_vectors.expect("box");
        assert_relative_eq!(box_vectors[1][1], 2.5, epsilon = 1e-6);
    }

    #[test]
    fn ter_is_emitted_on_chain_change() {
        let mut system = water();
        if let Some(metadata) = system.metadata.as_mut() {
            metadata.atom_info[2].chain_id = 'X';
        }
        let text = write_to_string(&system);
        assert_eq!(text.lines().filter(|l| l.starts_with("TER")).count(), 2);
    }

    #[test]
    fn long_conect_lists_wrap() {
        let mut system = System {
            atoms: (0..6)
                .map(|i| Atom::new(Element::C, [i as f64 * 0.15, 0.0, 0.0]))
                .collect(),
            bonds: Vec::new(),
            box_vectors: None,
            metadata: Some(ResidueMetadata {
                atom_info: (0..6)
                    .map(|i| AtomResidueInfo::new(format!("C{}", i + 1), "LIG", 1, 'A'))
                    .collect(),
            }),
        };
        for j in 1..6 {
            system.add_bond(0, j);
        }
        let text = write_to_string(&system);
        let first_atom_lines: Vec<&str> = text
            .lines()
            .filter(|l| l.starts_with("CONECT    1"))
            .collect();
        assert_eq!(first_atom_lines.len(), 2);
        assert_eq!(first_atom_lines[1], "CONECT    1    6");
    }

    #[test]
    fn missing_metadata_is_rejected() {
        let mut system = water();
        system.metadata = None;
        let err = write(Vec::new(), &system).expect_err("metadata required");
        assert!(matches!(err, Error::MissingMetadata("PDB")));
    }
}
