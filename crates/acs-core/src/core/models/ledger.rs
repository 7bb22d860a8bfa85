use crate::core::serde_helpers::present;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// A computation stage of the pipeline, in execution order.
///
/// The energy ledger and the file-path ledger are keyed by the same stages but use
/// slightly different key names for the optimization stages (`end_of_opt` versus
/// `opt`); [`Stage::energy_key`] and [`Stage::file_key`] give both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Stage {
    InitialScreeningSp,
    Opt,
    FineOpt,
    SpAfterOpt,
    SolvSpGas,
    SolvSpLiq,
    SolvCorrection,
    SpIncludeSolvCorrection,
}

impl Stage {
    pub const ALL: [Stage; 8] = [
        Stage::InitialScreeningSp,
        Stage::Opt,
        Stage::FineOpt,
        Stage::SpAfterOpt,
        Stage::SolvSpGas,
        Stage::SolvSpLiq,
        Stage::SolvCorrection,
        Stage::SpIncludeSolvCorrection,
    ];

    pub fn energy_key(self) -> &'static str {
        match self {
            Stage::InitialScreeningSp => "initial_screening_sp",
            Stage::Opt => "end_of_opt",
            Stage::FineOpt => "end_of_fine_opt",
            Stage::SpAfterOpt => "sp_after_opt",
            Stage::SolvSpGas => "solv_sp_gas",
            Stage::SolvSpLiq => "solv_sp_liq",
            Stage::SolvCorrection => "solv_correction",
            Stage::SpIncludeSolvCorrection => "sp_include_solv_correction",
        }
    }

    pub fn file_key(self) -> &'static str {
        match self {
            Stage::Opt => "opt",
            Stage::FineOpt => "fine_opt",
            other => other.energy_key(),
        }
    }

    pub fn is_solvation(self) -> bool {
        matches!(
            self,
            Stage::SolvSpGas
                | Stage::SolvSpLiq
                | Stage::SolvCorrection
                | Stage::SpIncludeSolvCorrection
        )
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.file_key())
    }
}

/// Energies (Hartree) reached at each stage.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EnergyLedger {
    #[serde(deserialize_with = "present")]
    pub initial_screening_sp: Option<f64>,
    #[serde(deserialize_with = "present")]
    pub end_of_opt: Option<f64>,
    #[serde(deserialize_with = "present")]
    pub end_of_fine_opt: Option<f64>,
    #[serde(deserialize_with = "present")]
    pub sp_after_opt: Option<f64>,
    #[serde(deserialize_with = "present")]
    pub solv_sp_gas: Option<f64>,
    #[serde(deserialize_with = "present")]
    pub solv_sp_liq: Option<f64>,
    #[serde(deserialize_with = "present")]
    pub solv_correction: Option<f64>,
    #[serde(deserialize_with = "present")]
    pub sp_include_solv_correction: Option<f64>,
}

impl EnergyLedger {
    pub fn get(&self, stage: Stage) -> Option<f64> {
        match stage {
            Stage::InitialScreeningSp => self.initial_screening_sp,
            Stage::Opt => self.end_of_opt,
            Stage::FineOpt => self.end_of_fine_opt,
            Stage::SpAfterOpt => self.sp_after_opt,
            Stage::SolvSpGas => self.solv_sp_gas,
            Stage::SolvSpLiq => self.solv_sp_liq,
            Stage::SolvCorrection => self.solv_correction,
            Stage::SpIncludeSolvCorrection => self.sp_include_solv_correction,
        }
    }

    pub fn set(&mut self, stage: Stage, energy: Option<f64>) {
        let slot = match stage {
            Stage::InitialScreeningSp => &mut self.initial_screening_sp,
            Stage::Opt => &mut self.end_of_opt,
            Stage::FineOpt => &mut self.end_of_fine_opt,
            Stage::SpAfterOpt => &mut self.sp_after_opt,
            Stage::SolvSpGas => &mut self.solv_sp_gas,
            Stage::SolvSpLiq => &mut self.solv_sp_liq,
            Stage::SolvCorrection => &mut self.solv_correction,
            Stage::SpIncludeSolvCorrection => &mut self.sp_include_solv_correction,
        };
        *slot = energy;
    }

    /// Stages with an energy, in pipeline order.
    pub fn recorded(&self) -> impl Iterator<Item = (Stage, f64)> + '_ {
        Stage::ALL
            .into_iter()
            .filter_map(|stage| self.get(stage).map(|energy| (stage, energy)))
    }

    /// The best gas-phase single point available: the high-level SP if computed,
    /// otherwise the last optimization energy.
    pub fn best_gas_phase(&self) -> Option<f64> {
        self.sp_after_opt
            .or(self.end_of_fine_opt)
            .or(self.end_of_opt)
    }
}

/// Paths for one side (input or output) of the file-path ledger.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StagePaths {
    #[serde(deserialize_with = "present")]
    pub initial_screening_sp: Option<PathBuf>,
    #[serde(deserialize_with = "present")]
    pub opt: Option<PathBuf>,
    #[serde(deserialize_with = "present")]
    pub fine_opt: Option<PathBuf>,
    #[serde(deserialize_with = "present")]
    pub sp_after_opt: Option<PathBuf>,
    #[serde(deserialize_with = "present")]
    pub solv_sp_gas: Option<PathBuf>,
    #[serde(deserialize_with = "present")]
    pub solv_sp_liq: Option<PathBuf>,
    #[serde(deserialize_with = "present")]
    pub solv_correction: Option<PathBuf>,
    #[serde(deserialize_with = "present")]
    pub sp_include_solv_correction: Option<PathBuf>,
}

impl StagePaths {
    pub fn get(&self, stage: Stage) -> Option<&Path> {
        match stage {
            Stage::InitialScreeningSp => self.initial_screening_sp.as_deref(),
            Stage::Opt => self.opt.as_deref(),
            Stage::FineOpt => self.fine_opt.as_deref(),
            Stage::SpAfterOpt => self.sp_after_opt.as_deref(),
            Stage::SolvSpGas => self.solv_sp_gas.as_deref(),
            Stage::SolvSpLiq => self.solv_sp_liq.as_deref(),
            Stage::SolvCorrection => self.solv_correction.as_deref(),
            Stage::SpIncludeSolvCorrection => self.sp_include_solv_correction.as_deref(),
        }
    }

    pub fn set(&mut self, stage: Stage, path: Option<PathBuf>) {
        let slot = match stage {
            Stage::InitialScreeningSp => &mut self.initial_screening_sp,
            Stage::Opt => &mut self.opt,
            Stage::FineOpt => &mut self.fine_opt,
            Stage::SpAfterOpt => &mut self.sp_after_opt,
            Stage::SolvSpGas => &mut self.solv_sp_gas,
            Stage::SolvSpLiq => &mut self.solv_sp_liq,
            Stage::SolvCorrection => &mut self.solv_correction,
            Stage::SpIncludeSolvCorrection => &mut self.sp_include_solv_correction,
        };
        *slot = path;
    }
}

/// Provenance of every computed value: the input and output file of each stage.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FilePathLedger {
    pub input: StagePaths,
    pub output: StagePaths,
}

/// Input/output files of one stage, as handed back by the calculation back end.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StageFiles {
    pub input: Option<PathBuf>,
    pub output: Option<PathBuf>,
}

impl FilePathLedger {
    pub fn record(&mut self, stage: Stage, files: StageFiles) {
        self.input.set(stage, files.input);
        self.output.set(stage, files.output);
    }

    pub fn has_any(&self, stage: Stage) -> bool {
        self.input.get(stage).is_some() || self.output.get(stage).is_some()
    }
}
