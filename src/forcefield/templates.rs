use super::error::Error;
use super::intermediate::IntermediateSystem;
use super::params::ForceFieldParams;
use crate::model::system::System;
use log::debug;
use std::collections::HashMap;

/// Matches every residue of `system` to a template and copies the template's
/// types, charges and masses onto the intermediate atoms. Template bonds the
/// structure lacks are added.
pub fn assign_from_templates(
    intermediate: &mut IntermediateSystem,
    system: &System,
    params: &ForceFieldParams,
) -> Result<(), Error> {
    let metadata = system.metadata.as_ref().ok_or(Error::MissingMetadata)?;
    if metadata.atom_info.len() != system.atom_count() {
        return Err(Error::MissingMetadata);
    }

    let mut added_bonds = 0;
    for residue in metadata.residues() {
        let template = params
            .template(&residue.name)
            .ok_or_else(|| Error::UnknownResidue {
                residue: residue.name.clone(),
                residue_id: residue.residue_id,
            })?;
        let mismatch = |detail: String| {
            Error::template_mismatch(&residue.name, residue.residue_id, detail)
        };

        let mut by_name: HashMap<&str, usize> = HashMap::with_capacity(residue.atoms.len());
        for idx in residue.atoms.clone() {
            let name = metadata.atom_info[idx].atom_name.as_str();
            if by_name.insert(name, idx).is_some() {
                return Err(mismatch(format!("duplicate atom name '{}'", name)));
            }
        }

        for name in by_name.keys() {
            if !template.atoms.iter().any(|a| a.name == *name) {
                return Err(mismatch(format!("atom '{}' is not in the template", name)));
            }
        }

        for template_atom in &template.atoms {
            let idx = *by_name
                .get(template_atom.name.as_str())
                .ok_or_else(|| mismatch(format!("missing atom '{}'", template_atom.name)))?;
            let type_params = params.atom_type(&template_atom.atom_type)?;

            let atom = &mut intermediate.atoms[idx];
            if atom.element != type_params.element {
                return Err(mismatch(format!(
                    "atom '{}' is {} but type '{}' expects {}",
                    template_atom.name, atom.element, template_atom.atom_type, type_params.element
                )));
            }
            atom.atom_type = template_atom.atom_type.clone();
            atom.charge = template_atom.charge;
            atom.mass = type_params.mass();
        }

        for [a, b] in &template.bonds {
            let lookup = |name: &String| {
                by_name.get(name.as_str()).copied().ok_or_else(|| {
                    mismatch(format!("template bond references unknown atom '{}'", name))
                })
            };
            if intermediate.add_bond(lookup(a)?, lookup(b)?)? {
                added_bonds += 1;
            }
        }

        debug!(
            "matched residue {} {} ({} atoms) to template",
            residue.name,
            residue.residue_id,
            residue.atoms.len()
        );
    }

    if added_bonds > 0 {
        debug!("added {} bonds from residue templates", added_bonds);
    }
    Ok(())
}
