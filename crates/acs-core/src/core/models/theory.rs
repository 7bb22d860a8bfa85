use super::ledger::Stage;
use crate::core::serde_helpers::present;
use serde::{Deserialize, Serialize};

/// Method/basis used at each pipeline stage. An unset stage is skipped for the job.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LevelOfTheory {
    #[serde(deserialize_with = "present")]
    pub initial_screening_sp: Option<String>,
    #[serde(deserialize_with = "present")]
    pub opt: Option<String>,
    #[serde(deserialize_with = "present")]
    pub fine_opt: Option<String>,
    #[serde(deserialize_with = "present")]
    pub sp_after_opt: Option<String>,
    #[serde(deserialize_with = "present")]
    pub solv_sp_gas: Option<String>,
    #[serde(deserialize_with = "present")]
    pub solv_sp_liq: Option<String>,
    /// Either a liquid-minus-gas scheme (PCM, SMD) or a direct correction (COSMO-RS).
    #[serde(deserialize_with = "present")]
    pub solv_correction: Option<String>,
}

impl LevelOfTheory {
    /// The level of theory driving `stage`. The combined SP-plus-correction entry is
    /// derived, never computed, so it has none.
    pub fn for_stage(&self, stage: Stage) -> Option<&str> {
        match stage {
            Stage::InitialScreeningSp => self.initial_screening_sp.as_deref(),
            Stage::Opt => self.opt.as_deref(),
            Stage::FineOpt => self.fine_opt.as_deref(),
            Stage::SpAfterOpt => self.sp_after_opt.as_deref(),
            Stage::SolvSpGas => self.solv_sp_gas.as_deref(),
            Stage::SolvSpLiq => self.solv_sp_liq.as_deref(),
            Stage::SolvCorrection => self.solv_correction.as_deref(),
            Stage::SpIncludeSolvCorrection => None,
        }
    }

    pub fn set_for_stage(&mut self, stage: Stage, method: Option<String>) {
        let slot = match stage {
            Stage::InitialScreeningSp => &mut self.initial_screening_sp,
            Stage::Opt => &mut self.opt,
            Stage::FineOpt => &mut self.fine_opt,
            Stage::SpAfterOpt => &mut self.sp_after_opt,
            Stage::SolvSpGas => &mut self.solv_sp_gas,
            Stage::SolvSpLiq => &mut self.solv_sp_liq,
            Stage::SolvCorrection => &mut self.solv_correction,
            Stage::SpIncludeSolvCorrection => return,
        };
        *slot = method;
    }

    /// Solvation stages that carry a level of theory.
    pub fn solvation_entries(&self) -> impl Iterator<Item = (Stage, &str)> {
        [Stage::SolvSpGas, Stage::SolvSpLiq, Stage::SolvCorrection]
            .into_iter()
            .filter_map(|stage| self.for_stage(stage).map(|method| (stage, method)))
    }
}
