//! Whole-record invariant checks.
//!
//! The lifecycle operations keep records consistent as long as every change goes
//! through them. Records also arrive from disk and from other tools, so the same
//! invariants are checked here on a complete record, reporting every violation
//! instead of stopping at the first.

use super::lifecycle::POST_OPT_SINGLE_POINTS;
use crate::core::models::conformer::{PostScreeningConformer, ScreeningConformer};
use crate::core::models::geometry::ArcXyz;
use crate::core::models::ids::HashId;
use crate::core::models::job::{
    JobRecord, OutcomeBuckets, PostScreeningJob, PostScreeningOutcome, ScreeningJob,
    ScreeningOutcome,
};
use crate::core::models::ledger::Stage;
use crate::core::models::species::{Species, Torsion};
use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum Violation {
    #[error("Conformer '{0}' is not in any outcome set")]
    Unplaced(HashId),
    #[error("Outcome set '{bucket}' references unknown conformer '{id}'")]
    Dangling { id: HashId, bucket: String },
    #[error("Conformer '{id}' appears in several outcome sets: {}", .buckets.join(", "))]
    MultiplePlacements { id: HashId, buckets: Vec<String> },
    #[error("Conformer '{id}' is listed twice in '{bucket}'")]
    RepeatedInBucket { id: HashId, bucket: String },
    #[error("Conformer '{id}' in '{bucket}' does not have '{flag}' set")]
    FlagMismatch {
        id: HashId,
        bucket: String,
        flag: &'static str,
    },
    #[error("Conformer '{id}' collided or crashed but has an energy for '{stage}'")]
    EnergyAfterFailure { id: HashId, stage: Stage },
    #[error("Conformer '{id}' has '{stage}' recorded while an earlier stage is missing")]
    EnergyGap { id: HashId, stage: Stage },
    #[error("Conformer '{id}' has an energy for '{stage}', which this job does not run")]
    StageNotEnabled { id: HashId, stage: Stage },
    #[error("Solvation is disabled but '{field}' is set{}", describe_id(.id))]
    SolvationWhileDisabled {
        id: Option<HashId>,
        field: &'static str,
    },
    #[error("Conformer '{id}' has sp_include_solv_correction inconsistent with its SP and correction")]
    SolvationSumMismatch { id: HashId },
    #[error("Non-finite value in '{field}' of conformer '{id}'")]
    NonFinite { id: HashId, field: &'static str },
    #[error("Conformer '{id}' declares rotor dimension {declared} but has {found} dihedrals")]
    RotorDimensionMismatch {
        id: HashId,
        declared: usize,
        found: usize,
    },
    #[error("Torsion {torsion} is not 1-based{}", describe_id(.id))]
    ZeroBasedTorsion { id: Option<HashId>, torsion: Torsion },
    #[error("Conformer '{id}' uses torsion {torsion}, which the species does not declare")]
    UndeclaredTorsion { id: HashId, torsion: Torsion },
    #[error("Conformer '{id}' perturbs torsion {torsion}, outside this file's dihedral subset")]
    OutsidePartition { id: HashId, torsion: Torsion },
    #[error("Geometry '{field}' of conformer '{id}' has mismatched array lengths")]
    InconsistentGeometry { id: HashId, field: &'static str },
    #[error("Conformer '{id}' is valid but {reason}")]
    UnjustifiedValid { id: HashId, reason: &'static str },
    #[error("Conformer '{id}' is invalid but {reason}")]
    UnjustifiedInvalid { id: HashId, reason: &'static str },
    #[error("Conformer '{id}' failed or is unfinished but is marked {flag}")]
    UnearnedVerdict { id: HashId, flag: &'static str },
}

fn describe_id(id: &Option<HashId>) -> String {
    match id {
        Some(id) => format!(" (conformer '{}')", id),
        None => String::new(),
    }
}

/// A record that failed validation, with every violation found.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{} invariant violation(s); first: {}", .0.len(), .0.first().map(ToString::to_string).unwrap_or_default())]
pub struct ValidationError(pub Vec<Violation>);

pub trait Validate {
    /// Every invariant violation in the record, in a stable order.
    fn violations(&self) -> Vec<Violation>;

    fn ensure_valid(&self) -> Result<(), ValidationError> {
        let violations = self.violations();
        if violations.is_empty() {
            Ok(())
        } else {
            Err(ValidationError(violations))
        }
    }
}

/// Outcome-set bookkeeping shared by both job kinds: every conformer in exactly one
/// set, every id in a set naming a conformer.
fn check_outcome_sets<J, C>(job: &J, conformers: &BTreeMap<HashId, C>) -> Vec<Violation>
where
    J: OutcomeBuckets,
{
    let mut violations = Vec::new();
    let mut placements: BTreeMap<&HashId, Vec<String>> = BTreeMap::new();

    for &outcome in J::OUTCOMES {
        let Some(ids) = job.bucket(outcome) else {
            continue;
        };
        let bucket = outcome.to_string();
        let mut seen = BTreeSet::new();
        for id in ids {
            if !seen.insert(id) {
                violations.push(Violation::RepeatedInBucket {
                    id: id.clone(),
                    bucket: bucket.clone(),
                });
                continue;
            }
            if !conformers.contains_key(id) {
                violations.push(Violation::Dangling {
                    id: id.clone(),
                    bucket: bucket.clone(),
                });
            }
            placements.entry(id).or_default().push(bucket.clone());
        }
    }

    for (id, buckets) in &placements {
        if buckets.len() > 1 {
            violations.push(Violation::MultiplePlacements {
                id: (*id).clone(),
                buckets: buckets.clone(),
            });
        }
    }
    for id in conformers.keys() {
        if !placements.contains_key(id) {
            violations.push(Violation::Unplaced(id.clone()));
        }
    }
    violations
}

fn check_torsions<'a>(
    id: &HashId,
    torsions: impl Iterator<Item = &'a Torsion>,
    species: &Species,
    violations: &mut Vec<Violation>,
) {
    for torsion in torsions {
        if !torsion.is_one_based() {
            violations.push(Violation::ZeroBasedTorsion {
                id: Some(id.clone()),
                torsion: *torsion,
            });
        }
        if species.torsions.is_some() && !species.declares_torsion(torsion) {
            violations.push(Violation::UndeclaredTorsion {
                id: id.clone(),
                torsion: *torsion,
            });
        }
    }
}

fn check_geometry(
    id: &HashId,
    field: &'static str,
    geometry: Option<&ArcXyz>,
    violations: &mut Vec<Violation>,
) {
    let Some(geometry) = geometry else {
        return;
    };
    if !geometry.is_consistent() {
        violations.push(Violation::InconsistentGeometry {
            id: id.clone(),
            field,
        });
    }
    if geometry.coords.iter().flatten().any(|c| !c.is_finite()) {
        violations.push(Violation::NonFinite {
            id: id.clone(),
            field,
        });
    }
}

fn check_rotor_dimension(
    id: &HashId,
    declared: Option<usize>,
    found: usize,
    violations: &mut Vec<Violation>,
) {
    if let Some(declared) = declared {
        if declared != found {
            violations.push(Violation::RotorDimensionMismatch {
                id: id.clone(),
                declared,
                found,
            });
        }
    }
}

fn check_species(species: &Species, violations: &mut Vec<Violation>) {
    for torsion in species.torsions.iter().flatten() {
        if !torsion.is_one_based() {
            violations.push(Violation::ZeroBasedTorsion {
                id: None,
                torsion: *torsion,
            });
        }
    }
}

impl ScreeningJob {
    fn conformer_violations(&self, id: &HashId, conformer: &ScreeningConformer) -> Vec<Violation> {
        let mut violations = Vec::new();
        check_rotor_dimension(
            id,
            conformer.rotor_dimension,
            conformer.dihedrals().len(),
            &mut violations,
        );
        check_torsions(id, conformer.torsions(), &self.species, &mut violations);
        if let Some(subset) = &self.dihedrals_considered_in_this_file {
            for torsion in conformer.perturbed_torsions() {
                if !subset.contains(torsion) {
                    violations.push(Violation::OutsidePartition {
                        id: id.clone(),
                        torsion: *torsion,
                    });
                }
            }
        }
        check_geometry(id, "arc_xyz", conformer.arc_xyz.as_ref(), &mut violations);
        if conformer.dihedrals().iter().any(|d| !d.angle.is_finite()) {
            violations.push(Violation::NonFinite {
                id: id.clone(),
                field: "dihedral",
            });
        }
        if conformer
            .initial_screening_sp_energy
            .is_some_and(|e| !e.is_finite())
        {
            violations.push(Violation::NonFinite {
                id: id.clone(),
                field: "initial_screening_sp_energy",
            });
        }

        match self.outcome_of(id) {
            Some(ScreeningOutcome::Colliding) => {
                if conformer.is_colliding != Some(true) {
                    violations.push(Violation::FlagMismatch {
                        id: id.clone(),
                        bucket: ScreeningOutcome::Colliding.to_string(),
                        flag: "is_colliding",
                    });
                }
                if conformer.initial_screening_sp_energy.is_some() {
                    violations.push(Violation::EnergyAfterFailure {
                        id: id.clone(),
                        stage: Stage::InitialScreeningSp,
                    });
                }
            }
            Some(ScreeningOutcome::Crashing) => {
                if conformer.is_crashing != Some(true) {
                    violations.push(Violation::FlagMismatch {
                        id: id.clone(),
                        bucket: ScreeningOutcome::Crashing.to_string(),
                        flag: "is_crashing",
                    });
                }
                if conformer.initial_screening_sp_energy.is_some() {
                    violations.push(Violation::EnergyAfterFailure {
                        id: id.clone(),
                        stage: Stage::InitialScreeningSp,
                    });
                }
            }
            _ => {}
        }
        violations
    }
}

impl Validate for ScreeningJob {
    fn violations(&self) -> Vec<Violation> {
        let mut violations = check_outcome_sets(self, &self.conformers);
        check_species(&self.species, &mut violations);
        if !self.solvation_enabled() {
            for (stage, _) in self.level_of_theory.solvation_entries() {
                violations.push(Violation::SolvationWhileDisabled {
                    id: None,
                    field: stage.file_key(),
                });
            }
        }
        for (id, conformer) in &self.conformers {
            violations.extend(self.conformer_violations(id, conformer));
        }
        violations
    }
}

impl PostScreeningJob {
    fn conformer_violations(
        &self,
        id: &HashId,
        conformer: &PostScreeningConformer,
        enabled: &[Stage],
    ) -> Vec<Violation> {
        let mut violations = Vec::new();
        check_rotor_dimension(
            id,
            conformer.rotor_dimension,
            conformer.dihedrals().len(),
            &mut violations,
        );
        check_torsions(id, conformer.torsions(), &self.species, &mut violations);
        check_geometry(
            id,
            "arc_xyz_before_opt",
            conformer.arc_xyz_before_opt.as_ref(),
            &mut violations,
        );
        check_geometry(
            id,
            "arc_xyz_after_opt",
            conformer.arc_xyz_after_opt.as_ref(),
            &mut violations,
        );

        let energy = &conformer.energy;
        for (stage, value) in energy.recorded() {
            if !value.is_finite() {
                violations.push(Violation::NonFinite {
                    id: id.clone(),
                    field: stage.energy_key(),
                });
            }
        }

        // Recorded post-screening energies must form a prefix of the enabled stages.
        let mut gap = false;
        for &stage in enabled {
            match energy.get(stage) {
                None => gap = true,
                Some(_) if gap => violations.push(Violation::EnergyGap {
                    id: id.clone(),
                    stage,
                }),
                Some(_) => {}
            }
        }
        for stage in Stage::ALL {
            let derived = stage == Stage::SpIncludeSolvCorrection;
            let allowed = stage == Stage::InitialScreeningSp
                || enabled.contains(&stage)
                || (derived && enabled.contains(&Stage::SolvCorrection));
            if allowed || energy.get(stage).is_none() {
                continue;
            }
            if stage.is_solvation() && !self.solvation_enabled() {
                violations.push(Violation::SolvationWhileDisabled {
                    id: Some(id.clone()),
                    field: stage.energy_key(),
                });
            } else {
                violations.push(Violation::StageNotEnabled {
                    id: id.clone(),
                    stage,
                });
            }
        }
        if !self.solvation_enabled() {
            for stage in [
                Stage::SolvSpGas,
                Stage::SolvSpLiq,
                Stage::SolvCorrection,
                Stage::SpIncludeSolvCorrection,
            ] {
                let files = &conformer.file_path;
                if files.input.get(stage).is_some() || files.output.get(stage).is_some() {
                    violations.push(Violation::SolvationWhileDisabled {
                        id: Some(id.clone()),
                        field: stage.file_key(),
                    });
                }
            }
        }
        if let (Some(correction), Some(total)) =
            (energy.solv_correction, energy.sp_include_solv_correction)
        {
            let consistent = energy
                .best_gas_phase()
                .is_some_and(|gas| (gas + correction - total).abs() < 1e-8);
            if !consistent {
                violations.push(Violation::SolvationSumMismatch { id: id.clone() });
            }
        }

        let outcome = self.outcome_of(id);
        match outcome {
            Some(PostScreeningOutcome::CollidingAfterOpt) => {
                if conformer.is_colliding != Some(true) {
                    violations.push(Violation::FlagMismatch {
                        id: id.clone(),
                        bucket: PostScreeningOutcome::CollidingAfterOpt.to_string(),
                        flag: "is_colliding",
                    });
                }
                for stage in POST_OPT_SINGLE_POINTS {
                    if energy.get(stage).is_some() {
                        violations.push(Violation::EnergyAfterFailure {
                            id: id.clone(),
                            stage,
                        });
                    }
                }
            }
            Some(PostScreeningOutcome::CrashingInOpt) if conformer.is_crashing != Some(true) => {
                violations.push(Violation::FlagMismatch {
                    id: id.clone(),
                    bucket: PostScreeningOutcome::CrashingInOpt.to_string(),
                    flag: "is_crashing",
                });
            }
            Some(PostScreeningOutcome::Valid) => {
                if enabled.iter().any(|&stage| energy.get(stage).is_none()) {
                    violations.push(Violation::UnjustifiedValid {
                        id: id.clone(),
                        reason: "required stages have no energy",
                    });
                }
                if self.species.is_transition_state() {
                    let negatives = conformer.negative_frequencies.as_ref().map(Vec::len);
                    if conformer.is_valid_ts != Some(true) || negatives != Some(1) {
                        violations.push(Violation::UnjustifiedValid {
                            id: id.clone(),
                            reason: "it is not a first-order saddle point",
                        });
                    }
                } else if conformer.is_isomorphic != Some(true) {
                    violations.push(Violation::UnjustifiedValid {
                        id: id.clone(),
                        reason: "it is not marked isomorphic",
                    });
                }
            }
            Some(PostScreeningOutcome::Invalid) if self.species.is_transition_state() => {
                let negatives = conformer.negative_frequencies.as_ref().map(Vec::len);
                if negatives == Some(1) {
                    violations.push(Violation::UnjustifiedInvalid {
                        id: id.clone(),
                        reason: "it is a first-order saddle point",
                    });
                }
            }
            _ => {}
        }
        if outcome != Some(PostScreeningOutcome::Valid) {
            if conformer.is_valid_ts == Some(true) {
                violations.push(Violation::UnearnedVerdict {
                    id: id.clone(),
                    flag: "is_valid_ts",
                });
            }
            let failed = matches!(
                outcome,
                Some(PostScreeningOutcome::CollidingAfterOpt | PostScreeningOutcome::CrashingInOpt)
            );
            if failed && conformer.is_isomorphic == Some(true) {
                violations.push(Violation::UnearnedVerdict {
                    id: id.clone(),
                    flag: "is_isomorphic",
                });
            }
        }
        violations
    }
}

impl Validate for PostScreeningJob {
    fn violations(&self) -> Vec<Violation> {
        let mut violations = check_outcome_sets(self, &self.conformers);
        check_species(&self.species, &mut violations);
        if !self.solvation_enabled() {
            for (stage, _) in self.level_of_theory.solvation_entries() {
                violations.push(Violation::SolvationWhileDisabled {
                    id: None,
                    field: stage.file_key(),
                });
            }
        }
        let enabled = self.enabled_stages();
        for (id, conformer) in &self.conformers {
            violations.extend(self.conformer_violations(id, conformer, &enabled));
        }
        violations
    }
}

impl Validate for JobRecord {
    fn violations(&self) -> Vec<Violation> {
        match self {
            JobRecord::Screening(job) => job.violations(),
            JobRecord::PostScreening(job) => job.violations(),
        }
    }
}
