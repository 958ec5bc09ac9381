use super::error::Error;
use crate::model::topology::CombiningRule;
use crate::model::types::Element;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::OnceLock;

const DEFAULT_PARAMS_TOML: &str = include_str!("../../resources/default.forcefield.toml");

static DEFAULT_PARAMS: OnceLock<ForceFieldParams> = OnceLock::new();

/// Matches any atom type in a torsion pattern.
pub const WILDCARD: &str = "X";

#[derive(Debug, Clone, Deserialize)]
pub struct ForceFieldParams {
    #[serde(default)]
    pub global: GlobalParams,
    #[serde(default)]
    pub atom_types: HashMap<String, AtomTypeParams>,
    #[serde(default)]
    pub residues: Vec<ResidueTemplate>,
    #[serde(default)]
    pub bonds: Vec<BondParams>,
    #[serde(default)]
    pub angles: Vec<AngleParams>,
    #[serde(default)]
    pub torsions: Vec<TorsionParams>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GlobalParams {
    #[serde(default = "default_14_scale")]
    pub coulomb14scale: f64,
    #[serde(default = "default_14_scale")]
    pub lj14scale: f64,
    #[serde(default)]
    pub combining_rule: CombiningRule,
}

fn default_14_scale() -> f64 {
    0.5
}

impl Default for GlobalParams {
    fn default() -> Self {
        Self {
            coulomb14scale: default_14_scale(),
            lj14scale: default_14_scale(),
            combining_rule: CombiningRule::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AtomTypeParams {
    pub element: Element,
    /// Overrides the standard atomic weight of `element`.
    pub mass: Option<f64>,
    /// Lennard-Jones σ in nm.
    pub sigma: f64,
    /// Lennard-Jones ε in kJ/mol.
    pub epsilon: f64,
    /// Shared name bonded patterns may match instead of the type name.
    pub class: Option<String>,
}

impl AtomTypeParams {
    pub fn mass(&self) -> f64 {
        self.mass.unwrap_or_else(|| self.element.atomic_mass())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResidueTemplate {
    pub name: String,
    pub atoms: Vec<TemplateAtom>,
    #[serde(default)]
    pub bonds: Vec<[String; 2]>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TemplateAtom {
    pub name: String,
    #[serde(rename = "type")]
    pub atom_type: String,
    pub charge: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BondParams {
    pub types: [String; 2],
    /// nm
    pub length: f64,
    /// kJ/mol/nm²
    pub k: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AngleParams {
    pub types: [String; 3],
    /// Degrees.
    pub angle: f64,
    /// kJ/mol/rad²
    pub k: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TorsionParams {
    pub types: [String; 4],
    pub terms: Vec<TorsionTerm>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct TorsionTerm {
    pub periodicity: u32,
    /// Degrees.
    pub phase: f64,
    /// kJ/mol
    pub k: f64,
}

pub fn load_parameters(custom_toml: Option<&str>) -> Result<ForceFieldParams, Error> {
    let params = match custom_toml {
        Some(toml) => toml::from_str::<ForceFieldParams>(toml)?,
        None => get_default_parameters().clone(),
    };
    params.check_references()?;
    Ok(params)
}

pub fn get_default_parameters() -> &'static ForceFieldParams {
    DEFAULT_PARAMS.get_or_init(|| {
        toml::from_str(DEFAULT_PARAMS_TOML)
            .expect("Failed to parse embedded default parameters. This is a library bug.")
    })
}

impl ForceFieldParams {
    pub fn atom_type(&self, name: &str) -> Result<&AtomTypeParams, Error> {
        self.atom_types
            .get(name)
            .ok_or_else(|| Error::UnknownAtomType(name.to_string()))
    }

    pub fn template(&self, residue_name: &str) -> Option<&ResidueTemplate> {
        self.residues.iter().find(|t| t.name == residue_name)
    }

    /// Every template atom must name a defined type.
    fn check_references(&self) -> Result<(), Error> {
        for template in &self.residues {
            for atom in &template.atoms {
                self.atom_type(&atom.atom_type)?;
            }
        }
        Ok(())
    }

    /// A pattern matches a type by type name or by class.
    fn matches(&self, pattern: &str, type_name: &str) -> bool {
        pattern == type_name
            || self
                .atom_types
                .get(type_name)
                .and_then(|t| t.class.as_deref())
                .is_some_and(|class| class == pattern)
    }

    fn matches_all(&self, patterns: &[String], types: &[&str]) -> bool {
        patterns
            .iter()
            .zip(types)
            .all(|(pattern, ty)| self.matches(pattern, ty))
    }

    fn matches_either_direction(&self, patterns: &[String], types: &[&str]) -> bool {
        let reversed: Vec<&str> = types.iter().rev().copied().collect();
        self.matches_all(patterns, types) || self.matches_all(patterns, &reversed)
    }

    /// First bond entry matching `a-b` in either direction.
    pub fn find_bond(&self, a: &str, b: &str) -> Option<&BondParams> {
        self.bonds
            .iter()
            .find(|p| self.matches_either_direction(&p.types, &[a, b]))
    }

    /// First angle entry matching `a-b-c` (vertex `b`) in either direction.
    pub fn find_angle(&self, a: &str, b: &str, c: &str) -> Option<&AngleParams> {
        self.angles
            .iter()
            .find(|p| self.matches_either_direction(&p.types, &[a, b, c]))
    }

    /// The torsion entry with the fewest wildcards that matches `a-b-c-d` in
    /// either direction. Ties go to the entry listed first.
    pub fn find_torsion(&self, types: [&str; 4]) -> Option<&TorsionParams> {
        let mut best: Option<(&TorsionParams, usize)> = None;
        for params in &self.torsions {
            let specificity = params.types.iter().filter(|t| *t != WILDCARD).count();
            let matched = self.torsion_matches(&params.types, &types)
                || self.torsion_matches(&params.types, &[types[3], types[2], types[1], types[0]]);
            if matched && best.is_none_or(|(_, s)| specificity > s) {
                best = Some((params, specificity));
            }
        }
        best.map(|(params, _)| params)
    }

    fn torsion_matches(&self, patterns: &[String; 4], types: &[&str; 4]) -> bool {
        patterns
            .iter()
            .zip(types)
            .all(|(pattern, ty)| pattern == WILDCARD || self.matches(pattern, ty))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn default_parameters_load() {
        let params = get_default_parameters();
        assert_eq!(params.global.combining_rule, CombiningRule::Geometric);
        assert_relative_eq!(params.global.coulomb14scale, 0.5);
        assert!(params.template("BUT").is_some());
        assert!(params.template("HOH").is_some());
        assert_eq!(params.atom_type("OW").unwrap().element, Element::O);
    }

    #[test]
    fn bonded_lookups_use_classes_and_are_symmetric() {
        let params = get_default_parameters();
        let bond = params.find_bond("HC", "CT2").expect("CT-HC bond");
        assert_relative_eq!(bond.length, 0.1090);

        let angle = params.find_angle("HC", "CT3", "CT2").expect("HC-CT-CT angle");
        assert_relative_eq!(angle.angle, 110.7);

        assert!(params.find_angle("CT2", "HC", "CT2").is_none());
    }

    #[test]
    fn torsion_prefers_most_specific_match() {
        let toml = r#"
            [atom_types.A]
            element = "C"
            sigma = 0.3
            epsilon = 0.1

            [[torsions]]
            types = ["X", "A", "A", "X"]
            terms = [{ periodicity = 3, phase = 0.0, k = 1.0 }]

            [[torsions]]
            types = ["A", "A", "A", "A"]
            terms = [{ periodicity = 1, phase = 0.0, k = 2.0 }]
        "#;
        let params = load_parameters(Some(toml)).unwrap();
        let torsion = params.find_torsion(["A", "A", "A", "A"]).unwrap();
        assert_eq!(torsion.terms[0].periodicity, 1);
    }

    #[test]
    fn wildcard_torsion_matches_reversed_order() {
        let params = get_default_parameters();
        let torsion = params
            .find_torsion(["HC", "CT3", "CT2", "CT2"])
            .expect("X-CT-CT-HC");
        assert_eq!(torsion.terms.len(), 1);
        assert_eq!(torsion.terms[0].periodicity, 3);

        let backbone = params
            .find_torsion(["CT3", "CT2", "CT2", "CT3"])
            .expect("CT-CT-CT-CT");
        assert_eq!(backbone.terms.len(), 3);
    }

    #[test]
    fn custom_parameters_with_defaults_for_global() {
        let toml = r#"
            [atom_types.Ar]
            element = "Ar"
            sigma = 0.34
            epsilon = 0.996
        "#;
        let params = load_parameters(Some(toml)).unwrap();
        assert_relative_eq!(params.global.lj14scale, 0.5);
        assert_relative_eq!(params.atom_type("Ar").unwrap().mass(), 39.948);
    }

    #[test]
    fn template_with_undefined_type_is_rejected() {
        let toml = r#"
            [[residues]]
            name = "LIG"
            atoms = [{ name = "C1", type = "MISSING", charge = 0.0 }]
        "#;
        assert!(matches!(
            load_parameters(Some(toml)),
            Err(Error::UnknownAtomType(t)) if t == "MISSING"
        ));
    }

    #[test]
    fn malformed_toml_is_a_parse_error() {
        assert!(matches!(
            load_parameters(Some("[global\n")),
            Err(Error::ParameterParse(_))
        ));
    }

    #[test]
    fn unknown_element_is_a_parse_error() {
        let toml = r#"
            [atom_types.Q]
            element = "Qq"
            sigma = 0.3
            epsilon = 0.1
        "#;
        assert!(matches!(
            load_parameters(Some(toml)),
            Err(Error::ParameterParse(_))
        ));
    }
}
