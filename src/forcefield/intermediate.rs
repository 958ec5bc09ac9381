//! Intermediate representation for the parameterization pipeline.
//!
//! [`IntermediateSystem`] holds atoms with their assigned types and charges,
//! the bond graph, and the angles, torsions and nonbonded pair lists
//! enumerated from it. Nothing here is part of the public API.

use super::error::Error;
use crate::model::system::{Bond, System};
use crate::model::types::Element;
use std::collections::BTreeSet;

#[derive(Debug, Clone)]
pub struct IntermediateAtom {
    pub element: Element,
    /// Force field atom type, empty until a template assigns it.
    pub atom_type: String,
    pub charge: f64,
    pub mass: f64,
    pub neighbors: Vec<usize>,
}

impl IntermediateAtom {
    pub fn new(element: Element) -> Self {
        Self {
            element,
            atom_type: String::new(),
            charge: 0.0,
            mass: element.atomic_mass(),
            neighbors: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntermediateAngle {
    pub i: usize,
    /// Vertex atom.
    pub j: usize,
    pub k: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntermediateTorsion {
    pub i: usize,
    pub j: usize,
    pub k: usize,
    pub l: usize,
}

#[derive(Debug, Clone)]
pub struct IntermediateSystem {
    pub atoms: Vec<IntermediateAtom>,
    pub bonds: Vec<Bond>,
    pub angles: Vec<IntermediateAngle>,
    pub torsions: Vec<IntermediateTorsion>,
    /// 1-2 and 1-3 pairs, `i < j`.
    pub exclusions: Vec<(usize, usize)>,
    /// 1-4 pairs that are not also 1-2 or 1-3 pairs, `i < j`.
    pub pairs_14: Vec<(usize, usize)>,
}

impl IntermediateSystem {
    /// Copies atoms and bonds out of `system` and builds neighbor lists.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptySystem`] if the system has no atoms, or
    /// [`Error::InvalidBond`] if a bond is out of bounds or bonds an atom to
    /// itself.
    pub fn from_system(system: &System) -> Result<Self, Error> {
        if system.atoms.is_empty() {
            return Err(Error::EmptySystem);
        }

        let mut intermediate = Self {
            atoms: system
                .atoms
                .iter()
                .map(|a| IntermediateAtom::new(a.element))
                .collect(),
            bonds: Vec::with_capacity(system.bonds.len()),
            angles: Vec::new(),
            torsions: Vec::new(),
            exclusions: Vec::new(),
            pairs_14: Vec::new(),
        };

        for bond in &system.bonds {
            intermediate.add_bond(bond.i, bond.j)?;
        }

        Ok(intermediate)
    }

    /// Adds a bond unless it is already present.
    pub fn add_bond(&mut self, i: usize, j: usize) -> Result<bool, Error> {
        let n_atoms = self.atoms.len();
        if i >= n_atoms || j >= n_atoms {
            return Err(Error::invalid_bond(
                i,
                j,
                format!("atom index out of bounds (n_atoms = {})", n_atoms),
            ));
        }
        if i == j {
            return Err(Error::invalid_bond(i, j, "atom bonded to itself"));
        }

        let bond = Bond::new(i, j);
        if self.bonds.contains(&bond) {
            return Ok(false);
        }
        self.bonds.push(bond);
        self.atoms[i].neighbors.push(j);
        self.atoms[j].neighbors.push(i);
        Ok(true)
    }

    /// Enumerates angles, proper torsions, exclusions and 1-4 pairs from the
    /// bond graph.
    pub fn enumerate_interactions(&mut self) {
        for atom in &mut self.atoms {
            atom.neighbors.sort_unstable();
        }
        self.bonds.sort_unstable();

        self.angles.clear();
        for (j, atom) in self.atoms.iter().enumerate() {
            let neighbors = &atom.neighbors;
            for (a, &i) in neighbors.iter().enumerate() {
                for &k in &neighbors[a + 1..] {
                    self.angles.push(IntermediateAngle { i, j, k });
                }
            }
        }

        self.torsions.clear();
        for bond in &self.bonds {
            let (j, k) = (bond.i, bond.j);
            for &i in &self.atoms[j].neighbors {
                if i == k {
                    continue;
                }
                for &l in &self.atoms[k].neighbors {
                    if l == j || l == i {
                        continue;
                    }
                    self.torsions.push(IntermediateTorsion { i, j, k, l });
                }
            }
        }

        let ordered = |a: usize, b: usize| if a < b { (a, b) } else { (b, a) };

        let mut exclusions: BTreeSet<(usize, usize)> =
            self.bonds.iter().map(|b| (b.i, b.j)).collect();
        exclusions.extend(self.angles.iter().map(|a| ordered(a.i, a.k)));

        let pairs_14: BTreeSet<(usize, usize)> = self
            .torsions
            .iter()
            .map(|t| ordered(t.i, t.l))
            .filter(|pair| !exclusions.contains(pair))
            .collect();

        self.exclusions = exclusions.into_iter().collect();
        self.pairs_14 = pairs_14.into_iter().collect();
    }
}
