use super::geometry::ArcXyz;
use super::ledger::{EnergyLedger, FilePathLedger};
use super::species::Torsion;
use crate::core::serde_helpers::present;
use serde::{Deserialize, Serialize};

/// One perturbed dihedral of a screening conformer: the torsion, the angle it was
/// set to (degrees) and the number of increments from the reference angle.
///
/// Persisted as `[[1, 2, 3, 4], 45.0, 0]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "(Torsion, f64, i32)", into = "(Torsion, f64, i32)")]
pub struct ScreeningDihedral {
    pub torsion: Torsion,
    pub angle: f64,
    pub step: i32,
}

impl From<(Torsion, f64, i32)> for ScreeningDihedral {
    fn from((torsion, angle, step): (Torsion, f64, i32)) -> Self {
        Self {
            torsion,
            angle,
            step,
        }
    }
}

impl From<ScreeningDihedral> for (Torsion, f64, i32) {
    fn from(d: ScreeningDihedral) -> Self {
        (d.torsion, d.angle, d.step)
    }
}

/// A dihedral as it was set before optimization. Persisted as `[[1, 2, 3, 4], 45.0]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "(Torsion, f64)", into = "(Torsion, f64)")]
pub struct Dihedral {
    pub torsion: Torsion,
    pub angle: f64,
}

impl From<(Torsion, f64)> for Dihedral {
    fn from((torsion, angle): (Torsion, f64)) -> Self {
        Self { torsion, angle }
    }
}

impl From<Dihedral> for (Torsion, f64) {
    fn from(d: Dihedral) -> Self {
        (d.torsion, d.angle)
    }
}

impl From<ScreeningDihedral> for Dihedral {
    fn from(d: ScreeningDihedral) -> Self {
        Self {
            torsion: d.torsion,
            angle: d.angle,
        }
    }
}

/// A conformer generated for the initial single-point screening.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScreeningConformer {
    /// Number of dihedrals perturbed to produce this geometry.
    #[serde(deserialize_with = "present")]
    pub rotor_dimension: Option<usize>,
    #[serde(deserialize_with = "present")]
    pub dihedral: Option<Vec<ScreeningDihedral>>,
    #[serde(deserialize_with = "present")]
    pub xyz_str: Option<String>,
    #[serde(deserialize_with = "present")]
    pub arc_xyz: Option<ArcXyz>,
    #[serde(deserialize_with = "present")]
    pub is_colliding: Option<bool>,
    #[serde(deserialize_with = "present")]
    pub is_crashing: Option<bool>,
    #[serde(deserialize_with = "present")]
    pub initial_screening_sp_energy: Option<f64>,
}

impl ScreeningConformer {
    /// A generated conformer with its perturbation and geometry filled in.
    pub fn generated(dihedral: Vec<ScreeningDihedral>, xyz_str: Option<String>) -> Self {
        Self {
            rotor_dimension: Some(dihedral.len()),
            dihedral: Some(dihedral),
            xyz_str,
            ..Default::default()
        }
    }

    pub fn dihedrals(&self) -> &[ScreeningDihedral] {
        self.dihedral.as_deref().unwrap_or(&[])
    }

    pub fn torsions(&self) -> impl Iterator<Item = &Torsion> {
        self.dihedrals().iter().map(|d| &d.torsion)
    }

    /// Torsions actually rotated away from the reference geometry (non-zero step).
    pub fn perturbed_torsions(&self) -> impl Iterator<Item = &Torsion> {
        self.dihedrals()
            .iter()
            .filter(|d| d.step != 0)
            .map(|d| &d.torsion)
    }

    /// The `(torsion, step)` pairs identifying this conformer's perturbation, sorted.
    pub fn perturbation(&self) -> Vec<(Torsion, i32)> {
        let mut pairs: Vec<(Torsion, i32)> =
            self.dihedrals().iter().map(|d| (d.torsion, d.step)).collect();
        pairs.sort();
        pairs
    }
}

/// A conformer carried into the optimization phase.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PostScreeningConformer {
    #[serde(deserialize_with = "present")]
    pub rotor_dimension: Option<usize>,
    #[serde(deserialize_with = "present")]
    pub dihedral_before_opt: Option<Vec<Dihedral>>,
    #[serde(deserialize_with = "present")]
    pub is_colliding: Option<bool>,
    #[serde(deserialize_with = "present")]
    pub is_crashing: Option<bool>,
    /// Post-optimization graph matches the species (wells only).
    #[serde(deserialize_with = "present")]
    pub is_isomorphic: Option<bool>,
    /// Post-optimization structure is a first-order saddle point (transition states only).
    #[serde(deserialize_with = "present")]
    pub is_valid_ts: Option<bool>,
    #[serde(deserialize_with = "present")]
    pub frequencies: Option<Vec<f64>>,
    #[serde(deserialize_with = "present")]
    pub negative_frequencies: Option<Vec<f64>>,
    #[serde(deserialize_with = "present")]
    pub xyz_str_before_opt: Option<String>,
    #[serde(deserialize_with = "present")]
    pub arc_xyz_before_opt: Option<ArcXyz>,
    #[serde(deserialize_with = "present")]
    pub xyz_str_after_opt: Option<String>,
    #[serde(deserialize_with = "present")]
    pub arc_xyz_after_opt: Option<ArcXyz>,
    pub energy: EnergyLedger,
    pub file_path: FilePathLedger,
}

impl PostScreeningConformer {
    pub fn dihedrals(&self) -> &[Dihedral] {
        self.dihedral_before_opt.as_deref().unwrap_or(&[])
    }

    pub fn torsions(&self) -> impl Iterator<Item = &Torsion> {
        self.dihedrals().iter().map(|d| &d.torsion)
    }
}

impl From<&ScreeningConformer> for PostScreeningConformer {
    /// Carries the pre-optimization geometry, perturbation and screening energy over;
    /// every optimization-phase field starts unset.
    fn from(screened: &ScreeningConformer) -> Self {
        let mut conformer = Self {
            rotor_dimension: screened.rotor_dimension,
            dihedral_before_opt: screened
                .dihedral
                .as_ref()
                .map(|dihedrals| dihedrals.iter().copied().map(Dihedral::from).collect()),
            xyz_str_before_opt: screened.xyz_str.clone(),
            arc_xyz_before_opt: screened.arc_xyz.clone(),
            ..Default::default()
        };
        conformer.energy.initial_screening_sp = screened.initial_screening_sp_energy;
        conformer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn screening_dihedral_is_persisted_as_a_triple() {
        let d = ScreeningDihedral {
            torsion: Torsion([1, 2, 3, 4]),
            angle: 45.0,
            step: 0,
        };
        assert_eq!(serde_json::to_value(d).unwrap(), json!([[1, 2, 3, 4], 45.0, 0]));
        let back: ScreeningDihedral =
            serde_json::from_value(json!([[7, 8, 9, 10], 120.0, 5])).unwrap();
        assert_eq!(back.torsion, Torsion([7, 8, 9, 10]));
        assert_eq!(back.step, 5);
    }

    #[test]
    fn dihedral_before_opt_is_persisted_as_a_pair() {
        let d = Dihedral {
            torsion: Torsion([1, 2, 3, 4]),
            angle: -60.0,
        };
        assert_eq!(serde_json::to_value(d).unwrap(), json!([[1, 2, 3, 4], -60.0]));
    }

    #[test]
    fn generated_sets_rotor_dimension_from_the_perturbation() {
        let conformer = ScreeningConformer::generated(
            vec![
                ScreeningDihedral {
                    torsion: Torsion([1, 2, 3, 4]),
                    angle: 45.0,
                    step: 0,
                },
                ScreeningDihedral {
                    torsion: Torsion([7, 8, 9, 10]),
                    angle: 120.0,
                    step: 5,
                },
            ],
            None,
        );
        assert_eq!(conformer.rotor_dimension, Some(2));
        assert_eq!(conformer.torsions().count(), 2);
        assert_eq!(conformer.is_colliding, None);
    }

    #[test]
    fn post_screening_conformer_inherits_screening_data() {
        let mut screened = ScreeningConformer::generated(
            vec![ScreeningDihedral {
                torsion: Torsion([1, 2, 3, 4]),
                angle: 45.0,
                step: 3,
            }],
            Some("C 0.0 0.0 0.0".to_string()),
        );
        screened.initial_screening_sp_energy = Some(-154.0);

        let post = PostScreeningConformer::from(&screened);
        assert_eq!(post.rotor_dimension, Some(1));
        assert_eq!(post.dihedrals()[0].angle, 45.0);
        assert_eq!(post.xyz_str_before_opt.as_deref(), Some("C 0.0 0.0 0.0"));
        assert_eq!(post.energy.initial_screening_sp, Some(-154.0));
        assert_eq!(post.energy.end_of_opt, None);
        assert_eq!(post.is_crashing, None);
    }

    #[test]
    fn default_post_screening_conformer_has_every_documented_key() {
        let value = serde_json::to_value(PostScreeningConformer::default()).unwrap();
        let object = value.as_object().unwrap();
        for key in [
            "rotor_dimension",
            "dihedral_before_opt",
            "is_colliding",
            "is_crashing",
            "is_isomorphic",
            "is_valid_ts",
            "frequencies",
            "negative_frequencies",
            "xyz_str_before_opt",
            "arc_xyz_before_opt",
            "xyz_str_after_opt",
            "arc_xyz_after_opt",
            "energy",
            "file_path",
        ] {
            assert!(object.contains_key(key), "missing {key}");
        }
        assert_eq!(object.len(), 14);
        assert!(object["file_path"]["input"].is_object());
        assert!(object["file_path"]["output"].is_object());
    }
}
