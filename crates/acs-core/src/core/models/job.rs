use super::conformer::{PostScreeningConformer, ScreeningConformer};
use super::ids::HashId;
use super::species::{Species, Torsion};
use super::theory::LevelOfTheory;
use crate::core::serde_helpers::{post_screening_flag, present, screening_flag};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;

/// Which phase of the pipeline a record belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordVariant {
    InitialScreening,
    PostScreening,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error(
    "Unknown record variant '{0}'. Expected 'initial-screening' or 'post-screening'."
)]
pub struct UnknownVariantError(pub String);

impl FromStr for RecordVariant {
    type Err = UnknownVariantError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('_', "-").as_str() {
            "initial-screening" | "initial-sp-screening" | "screening" => {
                Ok(RecordVariant::InitialScreening)
            }
            "post-screening" | "after-initial-sp-screening" => Ok(RecordVariant::PostScreening),
            _ => Err(UnknownVariantError(s.to_string())),
        }
    }
}

impl fmt::Display for RecordVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RecordVariant::InitialScreening => "initial-screening",
            RecordVariant::PostScreening => "post-screening",
        })
    }
}

/// Access to the outcome sets (hash-id buckets) of a job record.
///
/// Each conformer sits in exactly one bucket; moving it between buckets is the only
/// way its fate changes.
pub trait OutcomeBuckets {
    type Outcome: Copy + Eq + fmt::Debug + fmt::Display + 'static;

    /// Buckets in record order.
    const OUTCOMES: &'static [Self::Outcome];

    fn bucket(&self, outcome: Self::Outcome) -> Option<&[HashId]>;

    fn bucket_slot(&mut self, outcome: Self::Outcome) -> &mut Option<Vec<HashId>>;

    fn outcome_of(&self, id: &HashId) -> Option<Self::Outcome> {
        Self::OUTCOMES
            .iter()
            .copied()
            .find(|&outcome| self.bucket(outcome).is_some_and(|ids| ids.contains(id)))
    }

    /// Moves `id` into `outcome`, removing it from every other bucket.
    fn place(&mut self, id: &HashId, outcome: Self::Outcome) {
        for &other in Self::OUTCOMES {
            if let Some(ids) = self.bucket_slot(other) {
                ids.retain(|existing| existing != id);
            }
        }
        self.bucket_slot(outcome)
            .get_or_insert_with(Vec::new)
            .push(id.clone());
    }
}

/// Outcome sets of an initial-screening job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScreeningOutcome {
    ToScreen,
    Colliding,
    Crashing,
}

impl fmt::Display for ScreeningOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ScreeningOutcome::ToScreen => "conformer_to_screen_hash_ids",
            ScreeningOutcome::Colliding => "colliding_conformer_hash_ids",
            ScreeningOutcome::Crashing => "crashing_conformer_hash_ids",
        })
    }
}

/// Outcome sets of a post-screening job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PostScreeningOutcome {
    ToOpt,
    CollidingAfterOpt,
    CrashingInOpt,
    ToCalcSpAfterOpt,
    ToCalcSolv,
    Valid,
    Invalid,
}

impl fmt::Display for PostScreeningOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PostScreeningOutcome::ToOpt => "conformer_to_opt_hash_ids",
            PostScreeningOutcome::CollidingAfterOpt => "colliding_conformer_after_opt_hash_ids",
            PostScreeningOutcome::CrashingInOpt => "crashing_conformer_in_opt_hash_ids",
            PostScreeningOutcome::ToCalcSpAfterOpt => "conformer_to_calc_sp_after_opt_hash_ids",
            PostScreeningOutcome::ToCalcSolv => "conformer_to_calc_solv_hash_ids",
            PostScreeningOutcome::Valid => "valid_conformer_hash_ids",
            PostScreeningOutcome::Invalid => "invalid_conformer_hash_ids",
        })
    }
}

/// Job record of an initial single-point screening run (or one partition of it).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScreeningJob {
    #[serde(deserialize_with = "present")]
    pub project: Option<String>,
    #[serde(deserialize_with = "screening_flag")]
    is_initial_sp_screening: bool,
    #[serde(deserialize_with = "present")]
    pub conformer_to_screen_hash_ids: Option<Vec<HashId>>,
    #[serde(deserialize_with = "present")]
    pub colliding_conformer_hash_ids: Option<Vec<HashId>>,
    #[serde(deserialize_with = "present")]
    pub crashing_conformer_hash_ids: Option<Vec<HashId>>,
    /// Absolute path where the project records are saved.
    #[serde(deserialize_with = "present")]
    pub project_folder_path: Option<PathBuf>,
    #[serde(deserialize_with = "present")]
    pub calc_solvation_sp_correction: Option<bool>,
    /// Subset of the species' torsions covered by this file, for parallel splitting.
    #[serde(deserialize_with = "present")]
    pub dihedrals_considered_in_this_file: Option<Vec<Torsion>>,
    #[serde(deserialize_with = "present")]
    pub n_point_each_torsion: Option<u32>,
    #[serde(deserialize_with = "present")]
    pub comment: Option<String>,
    /// Memory request for the screening calculations, in MB.
    #[serde(deserialize_with = "present")]
    pub memory: Option<u64>,
    pub level_of_theory: LevelOfTheory,
    pub species: Species,
    pub conformers: BTreeMap<HashId, ScreeningConformer>,
}

impl ScreeningJob {
    pub fn new() -> Self {
        Self {
            project: None,
            is_initial_sp_screening: true,
            conformer_to_screen_hash_ids: None,
            colliding_conformer_hash_ids: None,
            crashing_conformer_hash_ids: None,
            project_folder_path: None,
            calc_solvation_sp_correction: None,
            dihedrals_considered_in_this_file: None,
            n_point_each_torsion: None,
            comment: None,
            memory: None,
            level_of_theory: LevelOfTheory::default(),
            species: Species::default(),
            conformers: BTreeMap::new(),
        }
    }

    pub fn is_initial_sp_screening(&self) -> bool {
        self.is_initial_sp_screening
    }

    pub fn solvation_enabled(&self) -> bool {
        self.calc_solvation_sp_correction == Some(true)
    }

    /// Same job context (project, species, level of theory, partition settings) with
    /// no conformers and unset outcome sets.
    pub fn empty_like(&self) -> Self {
        Self {
            project: self.project.clone(),
            project_folder_path: self.project_folder_path.clone(),
            calc_solvation_sp_correction: self.calc_solvation_sp_correction,
            dihedrals_considered_in_this_file: self.dihedrals_considered_in_this_file.clone(),
            n_point_each_torsion: self.n_point_each_torsion,
            comment: self.comment.clone(),
            memory: self.memory,
            level_of_theory: self.level_of_theory.clone(),
            species: self.species.clone(),
            ..Self::new()
        }
    }
}

impl Default for ScreeningJob {
    fn default() -> Self {
        Self::new()
    }
}

impl OutcomeBuckets for ScreeningJob {
    type Outcome = ScreeningOutcome;

    const OUTCOMES: &'static [ScreeningOutcome] = &[
        ScreeningOutcome::ToScreen,
        ScreeningOutcome::Colliding,
        ScreeningOutcome::Crashing,
    ];

    fn bucket(&self, outcome: ScreeningOutcome) -> Option<&[HashId]> {
        match outcome {
            ScreeningOutcome::ToScreen => self.conformer_to_screen_hash_ids.as_deref(),
            ScreeningOutcome::Colliding => self.colliding_conformer_hash_ids.as_deref(),
            ScreeningOutcome::Crashing => self.crashing_conformer_hash_ids.as_deref(),
        }
    }

    fn bucket_slot(&mut self, outcome: ScreeningOutcome) -> &mut Option<Vec<HashId>> {
        match outcome {
            ScreeningOutcome::ToScreen => &mut self.conformer_to_screen_hash_ids,
            ScreeningOutcome::Colliding => &mut self.colliding_conformer_hash_ids,
            ScreeningOutcome::Crashing => &mut self.crashing_conformer_hash_ids,
        }
    }
}

/// Job record of the optimization phase that follows screening.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PostScreeningJob {
    #[serde(deserialize_with = "present")]
    pub project: Option<String>,
    #[serde(deserialize_with = "post_screening_flag")]
    is_initial_sp_screening: bool,
    #[serde(deserialize_with = "present")]
    pub conformer_to_opt_hash_ids: Option<Vec<HashId>>,
    #[serde(deserialize_with = "present")]
    pub colliding_conformer_after_opt_hash_ids: Option<Vec<HashId>>,
    #[serde(deserialize_with = "present")]
    pub crashing_conformer_in_opt_hash_ids: Option<Vec<HashId>>,
    #[serde(deserialize_with = "present")]
    pub conformer_to_calc_sp_after_opt_hash_ids: Option<Vec<HashId>>,
    #[serde(deserialize_with = "present")]
    pub conformer_to_calc_solv_hash_ids: Option<Vec<HashId>>,
    /// Wells: isomorphic to the species. Transition states: first-order saddle point.
    #[serde(deserialize_with = "present")]
    pub valid_conformer_hash_ids: Option<Vec<HashId>>,
    /// Optimized and fully computed, but neither isomorphic nor a valid saddle point.
    #[serde(deserialize_with = "present")]
    pub invalid_conformer_hash_ids: Option<Vec<HashId>>,
    #[serde(deserialize_with = "present")]
    pub project_folder_path: Option<PathBuf>,
    #[serde(deserialize_with = "present")]
    pub calc_solvation_sp_correction: Option<bool>,
    #[serde(deserialize_with = "present")]
    pub comment: Option<String>,
    pub level_of_theory: LevelOfTheory,
    pub species: Species,
    pub conformers: BTreeMap<HashId, PostScreeningConformer>,
}

impl PostScreeningJob {
    pub fn new() -> Self {
        Self {
            project: None,
            is_initial_sp_screening: false,
            conformer_to_opt_hash_ids: None,
            colliding_conformer_after_opt_hash_ids: None,
            crashing_conformer_in_opt_hash_ids: None,
            conformer_to_calc_sp_after_opt_hash_ids: None,
            conformer_to_calc_solv_hash_ids: None,
            valid_conformer_hash_ids: None,
            invalid_conformer_hash_ids: None,
            project_folder_path: None,
            calc_solvation_sp_correction: None,
            comment: None,
            level_of_theory: LevelOfTheory::default(),
            species: Species::default(),
            conformers: BTreeMap::new(),
        }
    }

    pub fn is_initial_sp_screening(&self) -> bool {
        self.is_initial_sp_screening
    }

    pub fn solvation_enabled(&self) -> bool {
        self.calc_solvation_sp_correction == Some(true)
    }
}

impl Default for PostScreeningJob {
    fn default() -> Self {
        Self::new()
    }
}

impl OutcomeBuckets for PostScreeningJob {
    type Outcome = PostScreeningOutcome;

    const OUTCOMES: &'static [PostScreeningOutcome] = &[
        PostScreeningOutcome::ToOpt,
        PostScreeningOutcome::CollidingAfterOpt,
        PostScreeningOutcome::CrashingInOpt,
        PostScreeningOutcome::ToCalcSpAfterOpt,
        PostScreeningOutcome::ToCalcSolv,
        PostScreeningOutcome::Valid,
        PostScreeningOutcome::Invalid,
    ];

    fn bucket(&self, outcome: PostScreeningOutcome) -> Option<&[HashId]> {
        match outcome {
            PostScreeningOutcome::ToOpt => self.conformer_to_opt_hash_ids.as_deref(),
            PostScreeningOutcome::CollidingAfterOpt => {
                self.colliding_conformer_after_opt_hash_ids.as_deref()
            }
            PostScreeningOutcome::CrashingInOpt => {
                self.crashing_conformer_in_opt_hash_ids.as_deref()
            }
            PostScreeningOutcome::ToCalcSpAfterOpt => {
                self.conformer_to_calc_sp_after_opt_hash_ids.as_deref()
            }
            PostScreeningOutcome::ToCalcSolv => self.conformer_to_calc_solv_hash_ids.as_deref(),
            PostScreeningOutcome::Valid => self.valid_conformer_hash_ids.as_deref(),
            PostScreeningOutcome::Invalid => self.invalid_conformer_hash_ids.as_deref(),
        }
    }

    fn bucket_slot(&mut self, outcome: PostScreeningOutcome) -> &mut Option<Vec<HashId>> {
        match outcome {
            PostScreeningOutcome::ToOpt => &mut self.conformer_to_opt_hash_ids,
            PostScreeningOutcome::CollidingAfterOpt => {
                &mut self.colliding_conformer_after_opt_hash_ids
            }
            PostScreeningOutcome::CrashingInOpt => &mut self.crashing_conformer_in_opt_hash_ids,
            PostScreeningOutcome::ToCalcSpAfterOpt => {
                &mut self.conformer_to_calc_sp_after_opt_hash_ids
            }
            PostScreeningOutcome::ToCalcSolv => &mut self.conformer_to_calc_solv_hash_ids,
            PostScreeningOutcome::Valid => &mut self.valid_conformer_hash_ids,
            PostScreeningOutcome::Invalid => &mut self.invalid_conformer_hash_ids,
        }
    }
}

/// A job record of either phase, as read from disk.
///
/// Deserialization dispatches on `is_initial_sp_screening`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum JobRecord {
    Screening(ScreeningJob),
    PostScreening(PostScreeningJob),
}

impl JobRecord {
    pub fn variant(&self) -> RecordVariant {
        match self {
            JobRecord::Screening(_) => RecordVariant::InitialScreening,
            JobRecord::PostScreening(_) => RecordVariant::PostScreening,
        }
    }

    pub fn project(&self) -> Option<&str> {
        match self {
            JobRecord::Screening(job) => job.project.as_deref(),
            JobRecord::PostScreening(job) => job.project.as_deref(),
        }
    }

    pub fn species(&self) -> &Species {
        match self {
            JobRecord::Screening(job) => &job.species,
            JobRecord::PostScreening(job) => &job.species,
        }
    }

    pub fn conformer_count(&self) -> usize {
        match self {
            JobRecord::Screening(job) => job.conformers.len(),
            JobRecord::PostScreening(job) => job.conformers.len(),
        }
    }

    /// `(bucket name, size)` for every outcome set, unset buckets reported as `None`.
    pub fn bucket_sizes(&self) -> Vec<(String, Option<usize>)> {
        fn sizes<J: OutcomeBuckets>(job: &J) -> Vec<(String, Option<usize>)> {
            J::OUTCOMES
                .iter()
                .map(|&outcome| (outcome.to_string(), job.bucket(outcome).map(<[HashId]>::len)))
                .collect()
        }
        match self {
            JobRecord::Screening(job) => sizes(job),
            JobRecord::PostScreening(job) => sizes(job),
        }
    }
}

impl From<ScreeningJob> for JobRecord {
    fn from(job: ScreeningJob) -> Self {
        JobRecord::Screening(job)
    }
}

impl From<PostScreeningJob> for JobRecord {
    fn from(job: PostScreeningJob) -> Self {
        JobRecord::PostScreening(job)
    }
}

impl<'de> Deserialize<'de> for JobRecord {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = serde_json::Value::deserialize(deserializer)?;
        match value.get("is_initial_sp_screening") {
            Some(serde_json::Value::Bool(true)) => ScreeningJob::deserialize(value)
                .map(JobRecord::Screening)
                .map_err(D::Error::custom),
            Some(serde_json::Value::Bool(false)) => PostScreeningJob::deserialize(value)
                .map(JobRecord::PostScreening)
                .map_err(D::Error::custom),
            Some(other) => Err(D::Error::custom(format!(
                "`is_initial_sp_screening` must be a boolean, found {}",
                other
            ))),
            None => Err(D::Error::missing_field("is_initial_sp_screening")),
        }
    }
}

/// A conformer record of either phase.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ConformerRecord {
    Screening(ScreeningConformer),
    PostScreening(PostScreeningConformer),
}

/// Creates a job record with every documented field present and unset.
pub fn new_job_record(variant: RecordVariant) -> JobRecord {
    match variant {
        RecordVariant::InitialScreening => JobRecord::Screening(ScreeningJob::new()),
        RecordVariant::PostScreening => JobRecord::PostScreening(PostScreeningJob::new()),
    }
}

/// Creates a conformer record with every documented field present and unset.
pub fn new_conformer_record(variant: RecordVariant) -> ConformerRecord {
    match variant {
        RecordVariant::InitialScreening => {
            ConformerRecord::Screening(ScreeningConformer::default())
        }
        RecordVariant::PostScreening => {
            ConformerRecord::PostScreening(PostScreeningConformer::default())
        }
    }
}
