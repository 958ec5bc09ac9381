use super::system::System;
use serde::Deserialize;

#[derive(Debug, Clone, PartialEq)]
pub struct AtomParam {
    /// Partial charge in elementary charge units.
    pub charge: f64,
    /// Mass in amu.
    pub mass: f64,
    pub type_index: usize,
}

/// `E = ½ k (r − r₀)²`
#[derive(Debug, Clone, PartialEq)]
pub struct HarmonicBond {
    pub i: usize,
    pub j: usize,
    /// Equilibrium length in nm.
    pub length: f64,
    /// Force constant in kJ/mol/nm².
    pub k: f64,
}

/// `E = ½ k (θ − θ₀)²`
#[derive(Debug, Clone, PartialEq)]
pub struct HarmonicAngle {
    pub i: usize,
    /// Vertex atom.
    pub j: usize,
    pub k: usize,
    /// Equilibrium angle in radians.
    pub angle: f64,
    /// Force constant in kJ/mol/rad².
    pub k_force: f64,
}

/// `E = k (1 + cos(nφ − φ₀))`
#[derive(Debug, Clone, PartialEq)]
pub struct PeriodicTorsion {
    pub i: usize,
    pub j: usize,
    pub k: usize,
    pub l: usize,
    pub periodicity: u32,
    /// Phase offset in radians.
    pub phase: f64,
    /// Barrier amplitude in kJ/mol.
    pub k_force: f64,
}

#[derive(Debug, Clone, Default)]
pub struct Potentials {
    pub bonds: Vec<HarmonicBond>,
    pub angles: Vec<HarmonicAngle>,
    pub torsions: Vec<PeriodicTorsion>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LjParticle {
    /// nm
    pub sigma: f64,
    /// kJ/mol
    pub epsilon: f64,
}

/// How Lennard-Jones parameters of unlike atoms are combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CombiningRule {
    /// `σ = √(σᵢσⱼ)`, `ε = √(εᵢεⱼ)` (OPLS).
    #[default]
    Geometric,
    /// `σ = (σᵢ + σⱼ)/2`, `ε = √(εᵢεⱼ)` (AMBER, CHARMM).
    LorentzBerthelot,
}

impl CombiningRule {
    /// Returns the combined `(sigma, epsilon)` of two particles.
    #[inline]
    pub fn combine(&self, a: LjParticle, b: LjParticle) -> (f64, f64) {
        let epsilon = (a.epsilon * b.epsilon).sqrt();
        let sigma = match self {
            CombiningRule::Geometric => (a.sigma * b.sigma).sqrt(),
            CombiningRule::LorentzBerthelot => 0.5 * (a.sigma + b.sigma),
        };
        (sigma, epsilon)
    }
}

/// A pair whose nonbonded interaction replaces the default one (scaled 1-4 pairs).
#[derive(Debug, Clone, PartialEq)]
pub struct NonbondedException {
    pub i: usize,
    pub j: usize,
    pub charge_product: f64,
    pub sigma: f64,
    pub epsilon: f64,
}

#[derive(Debug, Clone, Default)]
pub struct NonbondedParams {
    /// One entry per atom, in atom order.
    pub particles: Vec<LjParticle>,
    /// Pairs with no nonbonded interaction at all, stored with `i < j`.
    pub exclusions: Vec<(usize, usize)>,
    pub exceptions: Vec<NonbondedException>,
    pub combining_rule: CombiningRule,
}

/// A system with every atom typed and every interaction parameterized.
#[derive(Debug, Clone)]
pub struct ParameterizedSystem {
    pub system: System,
    pub atom_types: Vec<String>,
    pub atom_properties: Vec<AtomParam>,
    pub potentials: Potentials,
    pub nonbonded: NonbondedParams,
}

impl ParameterizedSystem {
    pub fn masses(&self) -> Vec<f64> {
        self.atom_properties.iter().map(|p| p.mass).collect()
    }

    pub fn charges(&self) -> Vec<f64> {
        self.atom_properties.iter().map(|p| p.charge).collect()
    }

    pub fn total_charge(&self) -> f64 {
        self.atom_properties.iter().map(|p| p.charge).sum()
    }

    pub fn atom_type_of(&self, atom: usize) -> Option<&str> {
        self.atom_properties
            .get(atom)
            .and_then(|p| self.atom_types.get(p.type_index))
            .map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn combining_rules() {
        let a = LjParticle {
            sigma: 0.3,
            epsilon: 0.4,
        };
        let b = LjParticle {
            sigma: 0.5,
            epsilon: 0.9,
        };

        let (sigma, epsilon) = CombiningRule::Geometric.combine(a, b);
        assert_relative_eq!(sigma, 0.15f64.sqrt());
        assert_relative_eq!(epsilon, 0.6, epsilon = 1e-12);

        let (sigma, _) = CombiningRule::LorentzBerthelot.combine(a, b);
        assert_relative_eq!(sigma, 0.4);
    }
}
