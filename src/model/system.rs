use super::atom::Atom;
use super::metadata::ResidueMetadata;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Bond {
    pub i: usize,
    pub j: usize,
}

impl Bond {
    pub fn new(idx1: usize, idx2: usize) -> Self {
        if idx1 <= idx2 {
            Self { i: idx1, j: idx2 }
        } else {
            Self { i: idx2, j: idx1 }
        }
    }

    /// Returns the partner of `atom` in this bond, if `atom` participates.
    #[inline]
    pub fn partner(&self, atom: usize) -> Option<usize> {
        if self.i == atom {
            Some(self.j)
        } else if self.j == atom {
            Some(self.i)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct System {
    pub atoms: Vec<Atom>,
    pub bonds: Vec<Bond>,
    /// Periodic box vectors in nanometers, one row per vector.
    pub box_vectors: Option<[[f64; 3]; 3]>,
    pub metadata: Option<ResidueMetadata>,
}

impl System {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn atom_count(&self) -> usize {
        self.atoms.len()
    }

    #[inline]
    pub fn bond_count(&self) -> usize {
        self.bonds.len()
    }

    #[inline]
    pub fn is_periodic(&self) -> bool {
        self.box_vectors.is_some()
    }

    #[inline]
    pub fn has_metadata(&self) -> bool {
        self.metadata.is_some()
    }

    /// Adds a bond unless the same pair is already bonded.
    ///
    /// Returns `true` if the bond was inserted.
    pub fn add_bond(&mut self, i: usize, j: usize) -> bool {
        let bond = Bond::new(i, j);
        if self.bonds.contains(&bond) {
            return false;
        }
        self.bonds.push(bond);
        true
    }

    pub fn positions(&self) -> Vec<[f64; 3]> {
        self.atoms.iter().map(|a| a.position).collect()
    }

    /// A copy of this system with coordinates replaced, e.g. by the final
    /// frame of a run. Topology, box and metadata are kept.
    ///
    /// Extra positions are ignored; atoms without a position keep their own.
    pub fn with_positions(&self, positions: &[[f64; 3]]) -> Self {
        let atoms = self
            .atoms
            .iter()
            .enumerate()
            .map(|(i, atom)| match positions.get(i) {
                Some(p) => atom.moved_to(*p),
                None => atom.clone(),
            })
            .collect();
        Self {
            atoms,
            bonds: self.bonds.clone(),
            box_vectors: self.box_vectors,
            metadata: self.metadata.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::types::Element;

    #[test]
    fn bond_normalizes_index_order() {
        let bond = Bond::new(5, 2);
        assert_eq!(bond.i, 2);
        assert_eq!(bond.j, 5);
        assert_eq!(bond, Bond::new(2, 5));
    }

    #[test]
    fn bond_partner_lookup() {
        let bond = Bond::new(1, 4);
        assert_eq!(bond.partner(1), Some(4));
        assert_eq!(bond.partner(4), Some(1));
        assert_eq!(bond.partner(2), None);
    }

    #[test]
    fn add_bond_skips_duplicates() {
        let mut system = System::new();
        system.atoms.push(Atom::new(Element::C, [0.0, 0.0, 0.0]));
        system.atoms.push(Atom::new(Element::C, [0.15, 0.0, 0.0]));

        assert!(system.add_bond(0, 1));
        assert!(!system.add_bond(1, 0));
        assert_eq!(system.bond_count(), 1);
    }

    #[test]
    fn empty_system_defaults() {
        let system = System::new();
        assert_eq!(system.atom_count(), 0);
        assert!(!system.is_periodic());
        assert!(!system.has_metadata());
    }

    #[test]
    fn with_positions_keeps_topology() {
        let mut system = System::new();
        system.atoms.push(Atom::new(Element::O, [0.0, 0.0, 0.0]));
        system.atoms.push(Atom::new(Element::H, [0.1, 0.0, 0.0]));
        system.add_bond(0, 1);
        system.box_vectors = Some([[2.0, 0.0, 0.0], [0.0, 2.0, 0.0], [0.0, 0.0, 2.0]]);

        let moved = system.with_positions(&[[1.0, 1.0, 1.0]]);
        assert_eq!(moved.atoms[0].position, [1.0, 1.0, 1.0]);
        assert_eq!(moved.atoms[1].position, [0.1, 0.0, 0.0]);
        assert_eq!(moved.atoms[1].element, Element::H);
        assert_eq!(moved.bonds, system.bonds);
        assert_eq!(moved.box_vectors, system.box_vectors);
    }
}
