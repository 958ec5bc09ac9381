use super::error::Error;
use super::intermediate::IntermediateSystem;
use super::params::ForceFieldParams;
use crate::model::system::System;
use crate::model::topology::{
    AtomParam, HarmonicAngle, HarmonicBond, LjParticle, NonbondedException, NonbondedParams,
    ParameterizedSystem, PeriodicTorsion, Potentials,
};
use log::debug;
use std::collections::{BTreeSet, HashMap};

fn collect_atom_types(intermediate: &IntermediateSystem) -> (Vec<String>, HashMap<String, usize>) {
    let types_set: BTreeSet<&str> = intermediate
        .atoms
        .iter()
        .map(|atom| atom.atom_type.as_str())
        .collect();

    let atom_types: Vec<String> = types_set.into_iter().map(str::to_string).collect();
    let type_indices = atom_types
        .iter()
        .enumerate()
        .map(|(idx, t)| (t.clone(), idx))
        .collect();

    (atom_types, type_indices)
}

fn generate_atom_properties(
    intermediate: &IntermediateSystem,
    type_indices: &HashMap<String, usize>,
) -> Result<Vec<AtomParam>, Error> {
    intermediate
        .atoms
        .iter()
        .map(|atom| {
            let type_index = *type_indices
                .get(&atom.atom_type)
                .ok_or_else(|| Error::UnknownAtomType(atom.atom_type.clone()))?;
            Ok(AtomParam {
                charge: atom.charge,
                mass: atom.mass,
                type_index,
            })
        })
        .collect()
}

fn generate_bonds(
    intermediate: &IntermediateSystem,
    params: &ForceFieldParams,
) -> Result<Vec<HarmonicBond>, Error> {
    intermediate
        .bonds
        .iter()
        .map(|bond| {
            let type_i = intermediate.atoms[bond.i].atom_type.as_str();
            let type_j = intermediate.atoms[bond.j].atom_type.as_str();
            let entry = params
                .find_bond(type_i, type_j)
                .ok_or_else(|| Error::missing_parameter("bond", &[type_i, type_j]))?;
            Ok(HarmonicBond {
                i: bond.i,
                j: bond.j,
                length: entry.length,
                k: entry.k,
            })
        })
        .collect()
}

fn generate_angles(
    intermediate: &IntermediateSystem,
    params: &ForceFieldParams,
) -> Result<Vec<HarmonicAngle>, Error> {
    intermediate
        .angles
        .iter()
        .map(|angle| {
            let types = [angle.i, angle.j, angle.k]
                .map(|idx| intermediate.atoms[idx].atom_type.as_str());
            let entry = params
                .find_angle(types[0], types[1], types[2])
                .ok_or_else(|| Error::missing_parameter("angle", &types))?;
            Ok(HarmonicAngle {
                i: angle.i,
                j: angle.j,
                k: angle.k,
                angle: entry.angle.to_radians(),
                k_force: entry.k,
            })
        })
        .collect()
}

fn generate_torsions(intermediate: &IntermediateSystem, params: &ForceFieldParams) -> Vec<PeriodicTorsion> {
    let mut torsions = Vec::new();
    let mut skipped = 0usize;

    for torsion in &intermediate.torsions {
        let types = [torsion.i, torsion.j, torsion.k, torsion.l]
            .map(|idx| intermediate.atoms[idx].atom_type.as_str());
        let Some(entry) = params.find_torsion(types) else {
            skipped += 1;
            continue;
        };
        for term in &entry.terms {
            torsions.push(PeriodicTorsion {
                i: torsion.i,
                j: torsion.j,
                k: torsion.k,
                l: torsion.l,
                periodicity: term.periodicity,
                phase: term.phase.to_radians(),
                k_force: term.k,
            });
        }
    }

    if skipped > 0 {
        debug!("{} torsions have no matching parameters and were skipped", skipped);
    }
    torsions
}

fn generate_nonbonded(
    intermediate: &IntermediateSystem,
    params: &ForceFieldParams,
) -> Result<NonbondedParams, Error> {
    let particles = intermediate
        .atoms
        .iter()
        .map(|atom| {
            let type_params = params.atom_type(&atom.atom_type)?;
            Ok(LjParticle {
                sigma: type_params.sigma,
                epsilon: type_params.epsilon,
            })
        })
        .collect::<Result<Vec<_>, Error>>()?;

    let rule = params.global.combining_rule;
    let exceptions = intermediate
        .pairs_14
        .iter()
        .map(|&(i, j)| {
            let (sigma, epsilon) = rule.combine(particles[i], particles[j]);
            NonbondedException {
                i,
                j,
                charge_product: intermediate.atoms[i].charge
                    * intermediate.atoms[j].charge
                    * params.global.coulomb14scale,
                sigma,
                epsilon: epsilon * params.global.lj14scale,
            }
        })
        .collect();

    Ok(NonbondedParams {
        particles,
        exclusions: intermediate.exclusions.clone(),
        exceptions,
        combining_rule: rule,
    })
}

pub fn generate_parameters(
    system: &System,
    intermediate: &IntermediateSystem,
    params: &ForceFieldParams,
) -> Result<ParameterizedSystem, Error> {
    let (atom_types, type_indices) = collect_atom_types(intermediate);
    let atom_properties = generate_atom_properties(intermediate, &type_indices)?;

    let potentials = Potentials {
        bonds: generate_bonds(intermediate, params)?,
        angles: generate_angles(intermediate, params)?,
        torsions: generate_torsions(intermediate, params),
    };
    let nonbonded = generate_nonbonded(intermediate, params)?;

    let mut system = system.clone();
    system.bonds = intermediate.bonds.clone();

    Ok(ParameterizedSystem {
        system,
        atom_types,
        atom_properties,
        potentials,
        nonbonded,
    })
}
