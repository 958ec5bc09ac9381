use crate::model::types::Element;

/// Infers an element from a PDB atom name when the element columns are blank.
///
/// Leading digits (`1HB`) are skipped. Two-letter symbols are only tried when
/// the atom name equals the residue name, which is how monatomic ions are
/// written (`NA`/`NA`, `CL`/`CL`); otherwise `CA` would read as calcium.
pub fn guess_element(atom_name: &str, residue_name: &str) -> Option<Element> {
    let letters: String = atom_name
        .trim()
        .chars()
        .skip_while(|c| c.is_ascii_digit())
        .take_while(|c| c.is_ascii_alphabetic())
        .collect();

    if letters.is_empty() {
        return None;
    }

    if atom_name.trim().eq_ignore_ascii_case(residue_name.trim()) && letters.len() >= 2 {
        if let Ok(element) = letters[..2].parse::<Element>() {
            return Some(element);
        }
    }

    letters[..1].parse::<Element>().ok()
}

/// Converts cell lengths and angles (degrees) into box vectors.
///
/// The first vector lies along x and the second in the xy plane.
pub fn box_vectors_from_cell(
    lengths: [f64; 3],
    angles_deg: [f64; 3],
) -> [[f64; 3]; 3] {
    let [a, b, c] = lengths;
    let [alpha, beta, gamma] = angles_deg.map(f64::to_radians);

    let (cos_a, cos_b, cos_g) = (alpha.cos(), beta.cos(), gamma.cos());
    let sin_g = gamma.sin();

    let bx = b * cos_g;
    let by = b * sin_g;
    let cx = c * cos_b;
    let cy = c * (cos_a - cos_b * cos_g) / sin_g;
    let cz = (c * c - cx * cx - cy * cy).max(0.0).sqrt();

    [[a, 0.0, 0.0], [bx, by, 0.0], [cx, cy, cz]]
}

/// Inverse of [`box_vectors_from_cell`]: returns `(lengths, angles in degrees)`.
pub fn cell_from_box_vectors(box_vectors: &[[f64; 3]; 3]) -> ([f64; 3], [f64; 3]) {
    let [a, b, c] = box_vectors;
    let len = |v: &[f64; 3]| dot(v, v).sqrt();
    let (la, lb, lc) = (len(a), len(b), len(c));

    let angle = |u: &[f64; 3], v: &[f64; 3], lu: f64, lv: f64| {
        (dot(u, v) / (lu * lv)).clamp(-1.0, 1.0).acos().to_degrees()
    };

    (
        [la, lb, lc],
        [angle(b, c, lb, lc), angle(a, c, la, lc), angle(a, b, la, lb)],
    )
}

#[inline]
fn dot(u: &[f64; 3], v: &[f64; 3]) -> f64 {
    u[0] * v[0] + u[1] * v[1] + u[2] * v[2]
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn guesses_single_letter_elements() {
        assert_eq!(guess_element("C1", "BUT"), Some(Element::C));
        assert_eq!(guess_element("H11", "BUT"), Some(Element::H));
        assert_eq!(guess_element("1HB", "ALA"), Some(Element::H));
        assert_eq!(guess_element("CA", "ALA"), Some(Element::C));
    }

    #[test]
    fn guesses_ions_by_residue_name() {
        assert_eq!(guess_element("NA", "NA"), Some(Element::Na));
        assert_eq!(guess_element("CL", "CL"), Some(Element::Cl));
    }

    #[test]
    fn rejects_names_without_letters() {
        assert_eq!(guess_element("123", "XXX"), None);
        assert_eq!(guess_element("", "XXX"), None);
    }

    #[test]
    fn orthorhombic_cell_round_trip() {
        let vectors = box_vectors_from_cell([3.0, 4.0, 5.0], [90.0, 90.0, 90.0]);
        assert_relative_eq!(vectors[0][0], 3.0);
        assert_relative_eq!(vectors[1][1], 4.0, epsilon = 1e-12);
        assert_relative_eq!(vectors[2][2], 5.0, epsilon = 1e-12);
        assert_relative_eq!(vectors[1][0], 0.0, epsilon = 1e-12);

        let (lengths, angles) = cell_from_box_vectors(&vectors);
        assert_relative_eq!(lengths[2], 5.0, epsilon = 1e-12);
        assert_relative_eq!(angles[0], 90.0, epsilon = 1e-9);
    }

    #[test]
    fn triclinic_cell_round_trip() {
        let vectors = box_vectors_from_cell([3.0, 3.0, 3.0], [60.0, 60.0, 90.0]);
        let (lengths, angles) = cell_from_box_vectors(&vectors);
        for l in lengths {
            assert_relative_eq!(l, 3.0, epsilon = 1e-9);
        }
        assert_relative_eq!(angles[0], 60.0, epsilon = 1e-9);
        assert_relative_eq!(angles[1], 60.0, epsilon = 1e-9);
        assert_relative_eq!(angles[2], 90.0, epsilon = 1e-9);
    }
}
