use serde::{Deserialize, Serialize};

/// Structured Cartesian geometry (`arc_xyz`).
///
/// Symbols, isotopes (mass numbers) and coordinates are parallel arrays; coordinates
/// are in Angstroms.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ArcXyz {
    pub symbols: Vec<String>,
    pub isotopes: Vec<u32>,
    pub coords: Vec<[f64; 3]>,
}

impl ArcXyz {
    pub fn atom_count(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_consistent(&self) -> bool {
        self.symbols.len() == self.isotopes.len() && self.symbols.len() == self.coords.len()
    }
}

/// Mass number of the most abundant isotope of elements hydrogen through radon
/// (`D` for deuterium). Elements without a stable isotope map to their
/// longest-lived one.
pub fn most_common_isotope(symbol: &str) -> Option<u32> {
    let isotope = match symbol {
        "H" => 1,
        "D" => 2,
        "He" => 4,
        "Li" => 7,
        "Be" => 9,
        "B" => 11,
        "C" => 12,
        "N" => 14,
        "O" => 16,
        "F" => 19,
        "Ne" => 20,
        "Na" => 23,
        "Mg" => 24,
        "Al" => 27,
        "Si" => 28,
        "P" => 31,
        "S" => 32,
        "Cl" => 35,
        "Ar" => 40,
        "K" => 39,
        "Ca" => 40,
        "Sc" => 45,
        "Ti" => 48,
        "V" => 51,
        "Cr" => 52,
        "Mn" => 55,
        "Fe" => 56,
        "Co" => 59,
        "Ni" => 58,
        "Cu" => 63,
        "Zn" => 64,
        "Ga" => 69,
        "Ge" => 74,
        "As" => 75,
        "Se" => 80,
        "Br" => 79,
        "Kr" => 84,
        "Rb" => 85,
        "Sr" => 88,
        "Y" => 89,
        "Zr" => 90,
        "Nb" => 93,
        "Mo" => 98,
        "Tc" => 98,
        "Ru" => 102,
        "Rh" => 103,
        "Pd" => 106,
        "Ag" => 107,
        "Cd" => 114,
        "In" => 115,
        "Sn" => 120,
        "Sb" => 121,
        "Te" => 130,
        "I" => 127,
        "Xe" => 132,
        "Cs" => 133,
        "Ba" => 138,
        "La" => 139,
        "Ce" => 140,
        "Pr" => 141,
        "Nd" => 142,
        "Pm" => 145,
        "Sm" => 152,
        "Eu" => 153,
        "Gd" => 158,
        "Tb" => 159,
        "Dy" => 164,
        "Ho" => 165,
        "Er" => 166,
        "Tm" => 169,
        "Yb" => 174,
        "Lu" => 175,
        "Hf" => 180,
        "Ta" => 181,
        "W" => 184,
        "Re" => 187,
        "Os" => 192,
        "Ir" => 193,
        "Pt" => 195,
        "Au" => 197,
        "Hg" => 202,
        "Tl" => 205,
        "Pb" => 208,
        "Bi" => 209,
        "Po" => 209,
        "At" => 210,
        "Rn" => 222,
        _ => return None,
    };
    Some(isotope)
}
