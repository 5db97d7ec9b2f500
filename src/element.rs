//! Chemical elements and their van der Waals radii.
//!
//! Radii are the equilibrium values of [Batsanov
//! (2001)](https://doi.org/10.1023/A:1011625728803), in Ångström. They are
//! only used to infer connectivity for structures without explicit bonds and
//! to weight the edges of a ligand's topology graph.

use std::{fmt::Display, str::FromStr};

/// Thrown by [`Element::from_str`] if the string does not represent a valid
/// chemical element.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ParseElementError;

macro_rules! periodic_table {
    ( $(($element:ident, $name:literal, $radius:expr),)* ) => {
        #[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
        /// Represents a chemical element.
        pub enum Element {
            $( $element, )*
        }

        impl Element {
            /// Return this element's van der Waals radius, if tabulated.
            pub fn vdw_radius(&self) -> Option<f64> {
                match &self {
                    $( Element::$element => $radius, )*
                }
            }
        }

        impl Display for Element {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                match &self {
                    $( Element::$element => write!(f, "{}", $name), )*
                }
            }
        }

        impl FromStr for Element {
            type Err = ParseElementError;
            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $( $name => Ok(Element::$element), )*
                    _ => Err(ParseElementError),
                }
            }
        }
    };
}

periodic_table!(
    (Hydrogen, "H", Some(1.2)),
    (Helium, "He", Some(1.4)),
    (Lithium, "Li", Some(2.2)),
    (Beryllium, "Be", Some(1.9)),
    (Boron, "B", Some(1.8)),
    (Carbon, "C", Some(1.7)),
    (Nitrogen, "N", Some(1.6)),
    (Oxygen, "O", Some(1.55)),
    (Fluorine, "F", Some(1.5)),
    (Neon, "Ne", Some(1.5)),
    (Sodium, "Na", Some(2.4)),
    (Magnesium, "Mg", Some(2.2)),
    (Aluminum, "Al", Some(2.1)),
    (Silicon, "Si", Some(2.1)),
    (Phosphorus, "P", Some(1.95)),
    (Sulfur, "S", Some(1.8)),
    (Chlorine, "Cl", Some(1.8)),
    (Argon, "Ar", Some(1.9)),
    (Potassium, "K", Some(2.8)),
    (Calcium, "Ca", Some(2.4)),
    (Scandium, "Sc", Some(2.3)),
    (Titanium, "Ti", Some(2.15)),
    (Vanadium, "V", Some(2.05)),
    (Chromium, "Cr", Some(2.05)),
    (Manganese, "Mn", Some(2.05)),
    (Iron, "Fe", Some(2.05)),
    (Cobalt, "Co", Some(2.0)),
    (Nickel, "Ni", Some(2.0)),
    (Copper, "Cu", Some(2.0)),
    (Zinc, "Zn", Some(2.1)),
    (Gallium, "Ga", Some(2.1)),
    (Germanium, "Ge", Some(2.1)),
    (Arsenic, "As", Some(2.05)),
    (Selenium, "Se", Some(1.9)),
    (Bromine, "Br", Some(1.9)),
    (Krypton, "Kr", Some(2.0)),
    (Rubidium, "Rb", Some(2.9)),
    (Strontium, "Sr", Some(2.55)),
    (Yttrium, "Y", Some(2.4)),
    (Zirconium, "Zr", Some(2.3)),
    (Niobium, "Nb", Some(2.15)),
    (Molybdenum, "Mo", Some(2.1)),
    (Technetium, "Tc", Some(2.05)),
    (Ruthenium, "Ru", Some(2.05)),
    (Rhodium, "Rh", Some(2.0)),
    (Palladium, "Pd", Some(2.05)),
    (Silver, "Ag", Some(2.1)),
    (Cadmium, "Cd", Some(2.2)),
    (Indium, "In", Some(2.2)),
    (Tin, "Sn", Some(2.25)),
    (Antimony, "Sb", Some(2.2)),
    (Tellurium, "Te", Some(2.1)),
    (Iodine, "I", Some(2.1)),
    (Xenon, "Xe", Some(2.2)),
    (Cesium, "Cs", Some(3.0)),
    (Barium, "Ba", Some(2.7)),
    (Lanthanum, "La", Some(2.5)),
    (Cerium, "Ce", Some(2.35)),
    (Praseodymium, "Pr", Some(2.39)),
    (Neodymium, "Nd", Some(2.29)),
    (Promethium, "Pm", Some(2.36)),
    (Samarium, "Sm", Some(2.29)),
    (Europium, "Eu", Some(2.33)),
    (Gadolinium, "Gd", Some(2.37)),
    (Terbium, "Tb", Some(2.21)),
    (Dysprosium, "Dy", Some(2.29)),
    (Holmium, "Ho", Some(2.16)),
    (Erbium, "Er", Some(2.35)),
    (Thulium, "Tm", Some(2.27)),
    (Ytterbium, "Yb", Some(2.42)),
    (Lutetium, "Lu", Some(2.21)),
    (Hafnium, "Hf", Some(2.25)),
    (Tantalum, "Ta", Some(2.2)),
    (Wolfram, "W", Some(2.1)),
    (Rhenium, "Re", Some(2.05)),
    (Osmium, "Os", Some(2.0)),
    (Iridium, "Ir", Some(2.0)),
    (Platinum, "Pt", Some(2.05)),
    (Gold, "Au", Some(2.1)),
    (Mercury, "Hg", Some(2.05)),
    (Thallium, "Tl", Some(2.2)),
    (Lead, "Pb", Some(2.3)),
    (Bismuth, "Bi", Some(2.3)),
    (Polonium, "Po", Some(2.29)),
    (Astatine, "At", Some(2.36)),
    (Radon, "Rn", Some(2.43)),
    (Francium, "Fr", Some(2.56)),
    (Radium, "Ra", Some(2.43)),
    (Actinium, "Ac", Some(2.6)),
    (Thorium, "Th", Some(2.4)),
    (Protactinium, "Pa", Some(2.43)),
    (Uranium, "U", Some(2.3)),
    (Neptunium, "Np", Some(2.21)),
    (Plutonium, "Pu", Some(2.56)),
    (Americium, "Am", Some(2.56)),
    (Curium, "Cm", Some(2.56)),
    (Berkelium, "Bk", Some(2.56)),
    (Californium, "Cf", Some(2.56)),
    (Einsteinium, "Es", Some(2.56)),
    (Fermium, "Fm", Some(2.56)),
    (Mendelevium, "Md", None),
    (Nobelium, "No", None),
    (Lawrencium, "Lr", None),
    (Rutherfordium, "Rf", None),
    (Dubnium, "Db", None),
    (Seaborgium, "Sg", None),
    (Bohrium, "Bh", None),
    (Hassium, "Hs", None),
    (Meitnerium, "Mt", None),
    (Darmstadtium, "Ds", None),
    (Roentgenium, "Rg", None),
    (Copernicium, "Cn", None),
    (Nihonium, "Nh", None),
    (Flerovium, "Fl", None),
    (Moscovium, "Mc", None),
    (Livermorium, "Lv", None),
    (Tennessine, "Ts", None),
    (Oganesson, "Og", None),
);

impl Element {
    /// Parse an element symbol regardless of case, e.g. `"CL"` or `"cl"`.
    pub fn from_symbol(symbol: &str) -> Result<Self, ParseElementError> {
        let symbol = symbol.trim();
        let mut chars = symbol.chars();
        let Some(first) = chars.next() else {
            return Err(ParseElementError);
        };
        let normalized: String = first
            .to_uppercase()
            .chain(chars.flat_map(|c| c.to_lowercase()))
            .collect();
        normalized.parse()
    }
}

/// Van der Waals radius for an atom's simple type; unknown types get zero.
pub fn vdw_radius_of(simple_type: &str) -> f64 {
    Element::from_symbol(simple_type)
        .ok()
        .and_then(|e| e.vdw_radius())
        .unwrap_or(0.0)
}
