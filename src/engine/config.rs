use serde::Deserialize;
use std::fmt;

/// How pairwise nonbonded interactions are evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NonbondedMethod {
    /// Every pair interacts, no periodicity.
    #[default]
    NoCutoff,
    /// Reaction-field electrostatics and truncated LJ, no periodicity.
    CutoffNonPeriodic,
    /// As [`CutoffNonPeriodic`](NonbondedMethod::CutoffNonPeriodic) with
    /// minimum-image distances.
    CutoffPeriodic,
}

impl NonbondedMethod {
    pub fn uses_cutoff(&self) -> bool {
        !matches!(self, NonbondedMethod::NoCutoff)
    }

    pub fn is_periodic(&self) -> bool {
        matches!(self, NonbondedMethod::CutoffPeriodic)
    }

    pub fn name(&self) -> &'static str {
        match self {
            NonbondedMethod::NoCutoff => "NoCutoff",
            NonbondedMethod::CutoffNonPeriodic => "CutoffNonPeriodic",
            NonbondedMethod::CutoffPeriodic => "CutoffPeriodic",
        }
    }
}

impl fmt::Display for NonbondedMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Which bond lengths are held fixed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Constraints {
    #[default]
    None,
    /// Bonds involving a hydrogen atom.
    HBonds,
    AllBonds,
}

impl fmt::Display for Constraints {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Constraints::None => write!(f, "None"),
            Constraints::HBonds => write!(f, "HBonds"),
            Constraints::AllBonds => write!(f, "AllBonds"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    pub nonbonded_method: NonbondedMethod,
    /// Nonbonded cutoff in nm. Ignored by [`NonbondedMethod::NoCutoff`].
    pub cutoff: f64,
    pub constraints: Constraints,
    /// Relative tolerance on constrained bond lengths.
    pub constraint_tolerance: f64,
    /// Remove center-of-mass motion during dynamics; also removes three
    /// degrees of freedom from the temperature estimate.
    pub remove_cm_motion: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            nonbonded_method: NonbondedMethod::NoCutoff,
            cutoff: 1.0,
            constraints: Constraints::None,
            constraint_tolerance: 1e-5,
            remove_cm_motion: true,
        }
    }
}
