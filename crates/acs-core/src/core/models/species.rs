use super::geometry::ArcXyz;
use crate::core::serde_helpers::present;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;

/// A rotatable dihedral, identified by four 1-based atom indices.
///
/// Serialized as a plain array, e.g. `[1, 2, 3, 4]`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Torsion(pub [u32; 4]);

impl Torsion {
    pub fn atoms(&self) -> [u32; 4] {
        self.0
    }

    /// Atom indices are 1-based; a zero index always signals a 0-based producer.
    pub fn is_one_based(&self) -> bool {
        self.0.iter().all(|&index| index >= 1)
    }
}

impl fmt::Display for Torsion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d] = self.0;
        write!(f, "{}-{}-{}-{}", a, b, c, d)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Invalid torsion '{0}'. Expected four 1-based atom indices such as '1-2-3-4'.")]
pub struct ParseTorsionError(pub String);

impl FromStr for Torsion {
    type Err = ParseTorsionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let indices = s
            .trim()
            .split('-')
            .map(|part| part.trim().parse::<u32>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|_| ParseTorsionError(s.to_string()))?;
        let atoms: [u32; 4] = indices
            .try_into()
            .map_err(|_| ParseTorsionError(s.to_string()))?;
        let torsion = Torsion(atoms);
        if !torsion.is_one_based() {
            return Err(ParseTorsionError(s.to_string()));
        }
        Ok(torsion)
    }
}

/// Every coordinate representation known for a species.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CoordBundle {
    /// File the coordinates were read from (xyz, gjf, log, out, ...).
    #[serde(deserialize_with = "present")]
    pub file: Option<PathBuf>,
    /// Plain xyz body: atom symbol and coordinates only, no charge, multiplicity or count.
    #[serde(deserialize_with = "present")]
    pub xyz_str: Option<String>,
    #[serde(deserialize_with = "present")]
    pub arc_xyz: Option<ArcXyz>,
    #[serde(deserialize_with = "present")]
    pub zmat: Option<String>,
    /// Structured Z-matrix produced by the geometry back end; stored verbatim.
    #[serde(deserialize_with = "present")]
    pub arc_zmat: Option<serde_json::Value>,
    #[serde(deserialize_with = "present")]
    pub gaussian_std_zmat: Option<String>,
    /// Connectivity deduced by the geometry back end; stored verbatim.
    #[serde(deserialize_with = "present")]
    pub connectivity: Option<serde_json::Value>,
}

/// The molecule or reaction transition state a job samples conformers for.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Species {
    #[serde(deserialize_with = "present")]
    pub name: Option<String>,
    #[serde(deserialize_with = "present")]
    pub smiles: Option<String>,
    #[serde(deserialize_with = "present")]
    pub is_ts: Option<bool>,
    #[serde(deserialize_with = "present")]
    pub multiplicity: Option<u32>,
    #[serde(deserialize_with = "present")]
    pub charge: Option<i32>,
    /// All 1D rotatable dihedrals, e.g. `[[1, 2, 3, 4], [7, 8, 9, 10]]`.
    #[serde(rename = "1d_torsions", deserialize_with = "present")]
    pub torsions: Option<Vec<Torsion>>,
    pub coord: CoordBundle,
}

impl Species {
    /// Transition states are validated by a saddle-point check rather than isomorphism.
    pub fn is_transition_state(&self) -> bool {
        self.is_ts == Some(true)
    }

    /// Whether `torsion` is one of the declared rotors. An unset torsion list
    /// declares nothing, so nothing is contained in it.
    pub fn declares_torsion(&self, torsion: &Torsion) -> bool {
        self.torsions
            .as_ref()
            .is_some_and(|torsions| torsions.contains(torsion))
    }

    /// The name used when deriving conformer hash ids.
    pub fn label(&self) -> &str {
        self.name.as_deref().unwrap_or("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod torsion_tests {
        use super::*;

        #[test]
        fn parses_dash_separated_indices() {
            assert_eq!("1-2-3-4".parse::<Torsion>(), Ok(Torsion([1, 2, 3, 4])));
            assert_eq!(" 7 - 8 - 9 - 10 ".parse::<Torsion>(), Ok(Torsion([7, 8, 9, 10])));
        }

        #[test]
        fn rejects_wrong_arity_and_zero_indices() {
            assert!("1-2-3".parse::<Torsion>().is_err());
            assert!("1-2-3-4-5".parse::<Torsion>().is_err());
            assert!("0-1-2-3".parse::<Torsion>().is_err());
            assert!("a-b-c-d".parse::<Torsion>().is_err());
        }

        #[test]
        fn display_round_trips_through_from_str() {
            let torsion = Torsion([11, 2, 35, 4]);
            assert_eq!(torsion.to_string().parse::<Torsion>(), Ok(torsion));
        }
    }

    mod species_tests {
        use super::*;

        #[test]
        fn default_species_serializes_every_key_as_null() {
            let value = serde_json::to_value(Species::default()).unwrap();
            let object = value.as_object().unwrap();
            for key in ["name", "smiles", "is_ts", "multiplicity", "charge", "1d_torsions"] {
                assert!(object[key].is_null(), "{key} should be null");
            }
            let coord = object["coord"].as_object().unwrap();
            assert_eq!(coord.len(), 7);
            assert!(coord.values().all(|v| v.is_null()));
        }

        #[test]
        fn missing_key_is_rejected_but_null_is_accepted() {
            let mut value = serde_json::to_value(Species::default()).unwrap();
            assert!(serde_json::from_value::<Species>(value.clone()).is_ok());

            value.as_object_mut().unwrap().remove("smiles");
            let err = serde_json::from_value::<Species>(value).unwrap_err();
            assert!(err.to_string().contains("smiles"));
        }

        #[test]
        fn declares_torsion_checks_the_declared_list() {
            let mut species = Species::default();
            assert!(!species.declares_torsion(&Torsion([1, 2, 3, 4])));
            species.torsions = Some(vec![Torsion([1, 2, 3, 4])]);
            assert!(species.declares_torsion(&Torsion([1, 2, 3, 4])));
            assert!(!species.declares_torsion(&Torsion([4, 3, 2, 1])));
        }
    }
}
