//! Periodic boundary helpers shared by the engine and trajectory analysis.

/// Applies the minimum image convention to a displacement in a (possibly
/// triclinic) box given in reduced form: `a` along x, `b` in the xy plane.
pub fn minimum_image(mut delta: [f64; 3], box_vectors: &[[f64; 3]; 3]) -> [f64; 3] {
    for axis in (0..3).rev() {
        let vector = &box_vectors[axis];
        let shift = (delta[axis] / vector[axis]).round();
        if shift != 0.0 {
            for d in 0..3 {
                delta[d] -= shift * vector[d];
            }
        }
    }
    delta
}

/// Length of the shortest box diagonal component; cutoffs must stay below
/// half of it.
pub fn min_box_extent(box_vectors: &[[f64; 3]; 3]) -> f64 {
    box_vectors[0][0]
        .min(box_vectors[1][1])
        .min(box_vectors[2][2])
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const CUBE: [[f64; 3]; 3] = [[2.0, 0.0, 0.0], [0.0, 2.0, 0.0], [0.0, 0.0, 2.0]];

    #[test]
    fn wraps_into_nearest_image() {
        let delta = minimum_image([1.9, -1.2, 0.4], &CUBE);
        assert_relative_eq!(delta[0], -0.1, epsilon = 1e-12);
        assert_relative_eq!(delta[1], 0.8, epsilon = 1e-12);
        assert_relative_eq!(delta[2], 0.4, epsilon = 1e-12);
    }

    #[test]
    fn triclinic_shift_uses_full_vector() {
        let tric = [[2.0, 0.0, 0.0], [1.0, 2.0, 0.0], [0.0, 0.0, 2.0]];
        let delta = minimum_image([1.0, 1.9, 0.0], &tric);
        assert_relative_eq!(delta[0], 0.0, epsilon = 1e-12);
        assert_relative_eq!(delta[1], -0.1, epsilon = 1e-12);
    }

    #[test]
    fn shortest_extent() {
        let tric = [[3.0, 0.0, 0.0], [1.0, 2.5, 0.0], [0.0, 0.0, 4.0]];
        assert_relative_eq!(min_box_extent(&tric), 2.5);
    }
}
