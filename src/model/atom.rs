use super::types::Element;

/// A particle of the simulated system.
///
/// Only the element and the coordinates live here. Names, residues and
/// chains are kept in [`super::metadata::ResidueMetadata`], and mass and
/// charge come from force field assignment.
#[derive(Debug, Clone, PartialEq)]
pub struct Atom {
    pub element: Element,
    /// Cartesian coordinates in nanometers.
    pub position: [f64; 3],
}

impl Atom {
    pub fn new(element: Element, position: [f64; 3]) -> Self {
        Self { element, position }
    }

    /// The same atom placed at `position`.
    pub fn moved_to(&self, position: [f64; 3]) -> Self {
        Self {
            element: self.element,
            position,
        }
    }

    /// Straight-line distance in nanometers, without periodic wrapping.
    pub fn distance_to(&self, other: &Atom) -> f64 {
        self.position
            .iter()
            .zip(&other.position)
            .map(|(a, b)| (a - b) * (a - b))
            .sum::<f64>()
            .sqrt()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn moved_atom_keeps_element() {
        let oxygen = Atom::new(Element::O, [0.0, 0.0, 0.0]);
        let moved = oxygen.moved_to([0.1, 0.2, 0.3]);
        assert_eq!(moved.element, Element::O);
        assert_eq!(moved.position, [0.1, 0.2, 0.3]);
    }

    #[test]
    fn distance_is_euclidean() {
        let a = Atom::new(Element::C, [0.0, 0.0, 0.0]);
        let b = Atom::new(Element::C, [0.3, 0.4, 0.0]);
        assert!((a.distance_to(&b) - 0.5).abs() < 1e-12);
        assert_eq!(b.distance_to(&b), 0.0);
    }
}
