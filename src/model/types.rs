use serde::Deserialize;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid or unsupported element symbol: '{0}'")]
pub struct ParseElementError(String);

/// Chemical elements encountered in biomolecular and small-molecule MD.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
#[serde(try_from = "String")]
#[repr(u8)]
pub enum Element {
    H = 1,
    He = 2,
    Li = 3,
    B = 5,
    C = 6,
    N = 7,
    O = 8,
    F = 9,
    Ne = 10,
    Na = 11,
    Mg = 12,
    Si = 14,
    P = 15,
    S = 16,
    Cl = 17,
    Ar = 18,
    K = 19,
    Ca = 20,
    Mn = 25,
    Fe = 26,
    Cu = 29,
    Zn = 30,
    Se = 34,
    Br = 35,
    I = 53,
}

impl Element {
    /// Standard atomic weight in amu.
    pub fn atomic_mass(&self) -> f64 {
        match self {
            Element::H => 1.008,
            Element::He => 4.0026,
            Element::Li => 6.94,
            Element::B => 10.81,
            Element::C => 12.011,
            Element::N => 14.007,
            Element::O => 15.999,
            Element::F => 18.998,
            Element::Ne => 20.18,
            Element::Na => 22.99,
            Element::Mg => 24.305,
            Element::Si => 28.085,
            Element::P => 30.974,
            Element::S => 32.06,
            Element::Cl => 35.45,
            Element::Ar => 39.948,
            Element::K => 39.098,
            Element::Ca => 40.078,
            Element::Mn => 54.938,
            Element::Fe => 55.845,
            Element::Cu => 63.546,
            Element::Zn => 65.38,
            Element::Se => 78.971,
            Element::Br => 79.904,
            Element::I => 126.9,
        }
    }

    #[inline]
    pub fn atomic_number(&self) -> u8 {
        *self as u8
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Element::H => "H",
            Element::He => "He",
            Element::Li => "Li",
            Element::B => "B",
            Element::C => "C",
            Element::N => "N",
            Element::O => "O",
            Element::F => "F",
            Element::Ne => "Ne",
            Element::Na => "Na",
            Element::Mg => "Mg",
            Element::Si => "Si",
            Element::P => "P",
            Element::S => "S",
            Element::Cl => "Cl",
            Element::Ar => "Ar",
            Element::K => "K",
            Element::Ca => "Ca",
            Element::Mn => "Mn",
            Element::Fe => "Fe",
            Element::Cu => "Cu",
            Element::Zn => "Zn",
            Element::Se => "Se",
            Element::Br => "Br",
            Element::I => "I",
        }
    }

    #[inline]
    pub fn is_hydrogen(&self) -> bool {
        matches!(self, Element::H)
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl FromStr for Element {
    type Err = ParseElementError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let mut chars = trimmed.chars();
        let normalized: String = match chars.next() {
            Some(first) => first
                .to_uppercase()
                .chain(chars.flat_map(|c| c.to_lowercase()))
                .collect(),
            None => return Err(ParseElementError(s.to_string())),
        };

        let element = match normalized.as_str() {
            "H" | "D" => Element::H,
            "He" => Element::He,
            "Li" => Element::Li,
            "B" => Element::B,
            "C" => Element::C,
            "N" => Element::N,
            "O" => Element::O,
            "F" => Element::F,
            "Ne" => Element::Ne,
            "Na" => Element::Na,
            "Mg" => Element::Mg,
            "Si" => Element::Si,
            "P" => Element::P,
            "S" => Element::S,
            "Cl" => Element::Cl,
            "Ar" => Element::Ar,
            "K" => Element::K,
            "Ca" => Element::Ca,
            "Mn" => Element::Mn,
            "Fe" => Element::Fe,
            "Cu" => Element::Cu,
            "Zn" => Element::Zn,
            "Se" => Element::Se,
            "Br" => Element::Br,
            "I" => Element::I,
            _ => return Err(ParseElementError(s.to_string())),
        };
        Ok(element)
    }
}

impl TryFrom<String> for Element {
    type Error = ParseElementError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn element_from_str_is_case_insensitive() {
        assert_eq!("C".parse::<Element>().unwrap(), Element::C);
        assert_eq!("cl".parse::<Element>().unwrap(), Element::Cl);
        assert_eq!("ZN".parse::<Element>().unwrap(), Element::Zn);
        assert_eq!(" o ".parse::<Element>().unwrap(), Element::O);
    }

    #[test]
    fn deuterium_maps_to_hydrogen() {
        assert_eq!("D".parse::<Element>().unwrap(), Element::H);
    }

    #[test]
    fn element_from_str_rejects_unknown() {
        assert!("Xx".parse::<Element>().is_err());
        assert!("".parse::<Element>().is_err());
    }

    #[test]
    fn symbol_display_and_atomic_number() {
        assert_eq!(Element::Na.symbol(), "Na");
        assert_eq!(format!("{}", Element::Br), "Br");
        assert_eq!(Element::O.atomic_number(), 8);
        assert_eq!(Element::I.atomic_number(), 53);
    }

    #[test]
    fn atomic_mass_values() {
        assert!((Element::H.atomic_mass() - 1.008).abs() < 1e-9);
        assert!((Element::C.atomic_mass() - 12.011).abs() < 1e-9);
        assert!((Element::O.atomic_mass() - 15.999).abs() < 1e-9);
    }

    #[test]
    fn symbol_round_trips_through_parse() {
        for element in [Element::H, Element::C, Element::Cl, Element::Fe, Element::Se] {
            assert_eq!(element.symbol().parse::<Element>().unwrap(), element);
        }
    }
}
