use super::{Error, Trajectory};
use crate::model::pbc::minimum_image;
use nalgebra::Vector3;
use std::f64::consts::PI;

type BoxVectors = [[f64; 3]; 3];

/// Vector from `from` to `to`, wrapped to the nearest image when a box is
/// given.
fn displacement(from: &[f64; 3], to: &[f64; 3], box_vectors: Option<&BoxVectors>) -> Vector3<f64> {
    let delta = [to[0] - from[0], to[1] - from[1], to[2] - from[2]];
    let delta = match box_vectors {
        Some(b) => minimum_image(delta, b),
        None => delta,
    };
    Vector3::new(delta[0], delta[1], delta[2])
}

pub fn distance(a: &[f64; 3], b: &[f64; 3], box_vectors: Option<&BoxVectors>) -> f64 {
    displacement(a, b, box_vectors).norm()
}

/// Angle a-b-c at vertex `b`, in radians within [0, π].
pub fn angle(a: &[f64; 3], b: &[f64; 3], c: &[f64; 3], box_vectors: Option<&BoxVectors>) -> f64 {
    let u = displacement(b, a, box_vectors);
    let v = displacement(b, c, box_vectors);
    u.angle(&v)
}

/// Dihedral a-b-c-d in radians within (−π, π], following the IUPAC sign
/// convention: 0 for cis, π for trans, positive for clockwise rotation of the
/// far bond when viewed along b→c.
pub fn dihedral(
    a: &[f64; 3],
    b: &[f64; 3],
    c: &[f64; 3],
    d: &[f64; 3],
    box_vectors: Option<&BoxVectors>,
) -> f64 {
    let b1 = displacement(a, b, box_vectors);
    let b2 = displacement(b, c, box_vectors);
    let b3 = displacement(c, d, box_vectors);

    let n1 = b1.cross(&b2);
    let n2 = b2.cross(&b3);
    let phi = (b2.norm() * b1.dot(&n2)).atan2(n1.dot(&n2));
    if phi <= -PI { phi + 2.0 * PI } else { phi }
}

/// Per-frame distances, shaped `[frame][pair]`, in nm.
pub fn compute_distances(
    trajectory: &Trajectory,
    pairs: &[(usize, usize)],
) -> Result<Vec<Vec<f64>>, Error> {
    let flat: Vec<usize> = pairs.iter().flat_map(|&(i, j)| [i, j]).collect();
    trajectory.check_indices(&flat)?;

    Ok(trajectory
        .frames
        .iter()
        .map(|frame| {
            let p = &frame.positions;
            let b = frame.box_vectors.as_ref();
            pairs.iter().map(|&(i, j)| distance(&p[i], &p[j], b)).collect()
        })
        .collect())
}

/// Per-frame angles, shaped `[frame][triple]`, in radians.
pub fn compute_angles(
    trajectory: &Trajectory,
    triples: &[[usize; 3]],
) -> Result<Vec<Vec<f64>>, Error> {
    let flat: Vec<usize> = triples.iter().flatten().copied().collect();
    trajectory.check_indices(&flat)?;

    Ok(trajectory
        .frames
        .iter()
        .map(|frame| {
            let p = &frame.positions;
            let b = frame.box_vectors.as_ref();
            triples
                .iter()
                .map(|&[i, j, k]| angle(&p[i], &p[j], &p[k], b))
                .collect()
        })
        .collect())
}

/// Per-frame dihedrals, shaped `[frame][quadruple]`, in radians.
pub fn compute_dihedrals(
    trajectory: &Trajectory,
    quadruples: &[[usize; 4]],
) -> Result<Vec<Vec<f64>>, Error> {
    let flat: Vec<usize> = quadruples.iter().flatten().copied().collect();
    trajectory.check_indices(&flat)?;

    Ok(trajectory
        .frames
        .iter()
        .map(|frame| {
            let p = &frame.positions;
            let b = frame.box_vectors.as_ref();
            quadruples
                .iter()
                .map(|&[i, j, k, l]| dihedral(&p[i], &p[j], &p[k], &p[l], b))
                .collect()
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::Frame;
    use crate::model::{atom::Atom, system::System, types::Element};
    use approx::assert_relative_eq;
    use std::f64::consts::FRAC_PI_2;

    fn butane_skeleton(phi: f64) -> Vec<[f64; 3]> {
        [
            [0.0, 0.15, 0.0],
            [0.0, 0.0, 0.0],
            [0.15, 0.0, 0.0],
            [0.15, 0.15 * phi.cos(), 0.15 * phi.sin()],
        ]
        .to_vec()
    }

    #[test]
    fn dihedral_sign_convention() {
        let cis = butane_skeleton(0.0);
        assert_relative_eq!(dihedral(&cis[0], &cis[1], &cis[2], &cis[3], None), 0.0, epsilon = 1e-12);

        let trans = butane_skeleton(PI);
        assert_relative_eq!(dihedral(&trans[0], &trans[1], &trans[2], &trans[3], None), PI, epsilon = 1e-12);

        let gauche = butane_skeleton(FRAC_PI_2);
        let g = dihedral(&gauche[0], &gauche[1], &gauche[2], &gauche[3], None);
        assert_relative_eq!(g.abs(), FRAC_PI_2, epsilon = 1e-12);

        let mirror = butane_skeleton(-FRAC_PI_2);
        let m = dihedral(&mirror[0], &mirror[1], &mirror[2], &mirror[3], None);
        assert_relative_eq!(m, -g, epsilon = 1e-12);
    }

    #[test]
    fn exact_trans_is_positive_pi() {
        let p = [[0.0, 1.0, 0.0], [0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [1.0, -1.0, 0.0]];
        assert_eq!(dihedral(&p[0], &p[1], &p[2], &p[3], None), PI);
    }

    #[test]
    fn right_angle() {
        let a = [0.1, 0.0, 0.0];
        let b = [0.0, 0.0, 0.0];
        let c = [0.0, 0.2, 0.0];
        assert_relative_eq!(angle(&a, &b, &c, None), FRAC_PI_2, epsilon = 1e-12);
    }

    #[test]
    fn periodic_distance_uses_nearest_image() {
        let cube = [[2.0, 0.0, 0.0], [0.0, 2.0, 0.0], [0.0, 0.0, 2.0]];
        let a = [0.1, 0.0, 0.0];
        let b = [1.9, 0.0, 0.0];
        assert_relative_eq!(distance(&a, &b, None), 1.8, epsilon = 1e-12);
        assert_relative_eq!(distance(&a, &b, Some(&cube)), 0.2, epsilon = 1e-12);
    }

    #[test]
    fn trajectory_measurements() {
        let mut topology = System::new();
        for _ in 0..4 {
            topology.atoms.push(Atom::new(Element::C, [0.0; 3]));
        }
        let frames = [0.0, FRAC_PI_2, PI]
            .iter()
            .enumerate()
            .map(|(i, &phi)| Frame {
                positions: butane_skeleton(phi),
                time: i as f64,
                box_vectors: None,
            })
            .collect();
        let trajectory = Trajectory { topology, frames };

        let distances = compute_distances(&trajectory, &[(1, 2), (0, 3)]).unwrap();
        assert_eq!(distances.len(), 3);
        assert_relative_eq!(distances[0][0], 0.15, epsilon = 1e-12);
        assert_relative_eq!(distances[0][1], 0.15, epsilon = 1e-12);
        assert_relative_eq!(distances[2][1], (0.15f64.powi(2) + 0.3f64.powi(2)).sqrt(), epsilon = 1e-12);

        let angles = compute_angles(&trajectory, &[[0, 1, 2]]).unwrap();
        assert_relative_eq!(angles[1][0], FRAC_PI_2, epsilon = 1e-12);

        let dihedrals = compute_dihedrals(&trajectory, &[[0, 1, 2, 3]]).unwrap();
        assert_relative_eq!(dihedrals[0][0], 0.0, epsilon = 1e-12);
        assert_relative_eq!(dihedrals[2][0], PI, epsilon = 1e-12);

        assert!(matches!(
            compute_dihedrals(&trajectory, &[[0, 1, 2, 4]]),
            Err(Error::AtomIndexOutOfRange { index: 4, .. })
        ));
    }
}
