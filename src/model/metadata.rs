//! Per-atom residue annotations carried alongside a [`System`](super::system::System).
//!
//! Residue templates in the force field are matched through these records, and
//! trajectory analysis selects atoms by their names.

use std::ops::Range;

/// PDB record kind an atom was read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Record {
    #[default]
    Atom,
    Hetatm,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AtomResidueInfo {
    pub atom_name: String,
    pub residue_name: String,
    pub residue_id: i32,
    pub chain_id: char,
    pub insertion_code: char,
    pub record: Record,
}

impl AtomResidueInfo {
    pub fn new(
        atom_name: impl Into<String>,
        residue_name: impl Into<String>,
        residue_id: i32,
        chain_id: char,
    ) -> Self {
        Self {
            atom_name: atom_name.into(),
            residue_name: residue_name.into(),
            residue_id,
            chain_id,
            insertion_code: ' ',
            record: Record::Atom,
        }
    }

    pub fn with_insertion_code(mut self, code: char) -> Self {
        self.insertion_code = code;
        self
    }

    pub fn with_record(mut self, record: Record) -> Self {
        self.record = record;
        self
    }

    /// Returns `true` if both records belong to the same residue instance.
    #[inline]
    pub fn same_residue(&self, other: &AtomResidueInfo) -> bool {
        self.chain_id == other.chain_id
            && self.residue_id == other.residue_id
            && self.insertion_code == other.insertion_code
            && self.residue_name == other.residue_name
    }
}

/// A contiguous run of atoms belonging to one residue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResidueSpan {
    pub name: String,
    pub residue_id: i32,
    pub chain_id: char,
    pub atoms: Range<usize>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResidueMetadata {
    pub atom_info: Vec<AtomResidueInfo>,
}

impl ResidueMetadata {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            atom_info: Vec::with_capacity(capacity),
        }
    }

    /// Groups consecutive atoms into residues.
    pub fn residues(&self) -> Vec<ResidueSpan> {
        let mut spans: Vec<ResidueSpan> = Vec::new();
        let mut start = 0;

        for idx in 1..=self.atom_info.len() {
            let boundary = idx == self.atom_info.len()
                || !self.atom_info[idx].same_residue(&self.atom_info[start]);
            if boundary {
                let info = &self.atom_info[start];
                spans.push(ResidueSpan {
                    name: info.residue_name.clone(),
                    residue_id: info.residue_id,
                    chain_id: info.chain_id,
                    atoms: start..idx,
                });
                start = idx;
            }
        }

        spans
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info(name: &str, res: &str, id: i32, chain: char) -> AtomResidueInfo {
        AtomResidueInfo::new(name, res, id, chain)
    }

    #[test]
    fn atom_residue_info_defaults() {
        let info = AtomResidueInfo::new("C1", "BUT", 1, 'A');
        assert_eq!(info.insertion_code, ' ');
        assert_eq!(info.record, Record::Atom);

        let het = info.clone().with_record(Record::Hetatm).with_insertion_code('B');
        assert_eq!(het.record, Record::Hetatm);
        assert_eq!(het.insertion_code, 'B');
    }

    #[test]
    fn residues_groups_contiguous_atoms() {
        let metadata = ResidueMetadata {
            atom_info: vec![
                info("O", "HOH", 1, 'W'),
                info("H1", "HOH", 1, 'W'),
                info("H2", "HOH", 1, 'W'),
                info("O", "HOH", 2, 'W'),
                info("H1", "HOH", 2, 'W'),
            ],
        };

        let residues = metadata.residues();
        assert_eq!(residues.len(), 2);
        assert_eq!(residues[0].atoms, 0..3);
        assert_eq!(residues[1].atoms, 3..5);
        assert_eq!(residues[1].residue_id, 2);
    }

    #[test]
    fn residues_split_on_chain_change() {
        let metadata = ResidueMetadata {
            atom_info: vec![info("C1", "BUT", 1, 'A'), info("C1", "BUT", 1, 'B')],
        };
        assert_eq!(metadata.residues().len(), 2);
    }

    #[test]
    fn residues_of_empty_metadata() {
        assert!(ResidueMetadata::new().residues().is_empty());
    }
}
