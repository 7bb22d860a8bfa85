//! Guarded state transitions on job records.
//!
//! Every operation here checks the conformer's current state against the state
//! machine before touching the record, then updates the conformer's flags and
//! energies and moves its hash id between outcome sets in one step. A failed
//! operation leaves the record unchanged.

use super::classify::{IsomorphismVerdict, Prerequisite, classify_outcome, negative_frequencies};
use super::error::EngineError;
use super::selection::Candidate;
use super::state::ConformerState;
use crate::core::io::xyz::{parse_xyz_str, to_xyz_str};
use crate::core::models::conformer::{PostScreeningConformer, ScreeningConformer};
use crate::core::models::ids::HashId;
use crate::core::models::job::{
    OutcomeBuckets, PostScreeningJob, PostScreeningOutcome, ScreeningJob, ScreeningOutcome,
};
use crate::core::models::ledger::{Stage, StageFiles};
use tracing::debug;

/// Energies computed on the optimized structure; a conformer with any of these
/// recorded can no longer be reclassified as colliding.
pub(crate) const POST_OPT_SINGLE_POINTS: [Stage; 5] = [
    Stage::SpAfterOpt,
    Stage::SolvSpGas,
    Stage::SolvSpLiq,
    Stage::SolvCorrection,
    Stage::SpIncludeSolvCorrection,
];

fn check_transition(
    id: &HashId,
    from: ConformerState,
    to: ConformerState,
) -> Result<(), EngineError> {
    if from.is_terminal() {
        return Err(EngineError::Terminal {
            id: id.clone(),
            state: from,
        });
    }
    if !from.can_transition_to(to) {
        return Err(EngineError::IllegalTransition {
            id: id.clone(),
            from,
            to,
        });
    }
    Ok(())
}

fn ensure_finite(id: &HashId, field: &'static str, value: f64) -> Result<(), EngineError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(EngineError::NonFinite {
            id: id.clone(),
            field,
        })
    }
}

impl ScreeningJob {
    fn conformer(&self, id: &HashId) -> Result<&ScreeningConformer, EngineError> {
        self.conformers
            .get(id)
            .ok_or_else(|| EngineError::UnknownConformer(id.clone()))
    }

    fn conformer_mut(&mut self, id: &HashId) -> Result<&mut ScreeningConformer, EngineError> {
        self.conformers
            .get_mut(id)
            .ok_or_else(|| EngineError::UnknownConformer(id.clone()))
    }

    /// Derives the state of `id` from its outcome set and screening energy.
    pub fn state_of(&self, id: &HashId) -> Result<ConformerState, EngineError> {
        let conformer = self.conformer(id)?;
        match self.outcome_of(id) {
            Some(ScreeningOutcome::ToScreen) => {
                Ok(if conformer.initial_screening_sp_energy.is_some() {
                    ConformerState::Screened
                } else {
                    ConformerState::Generated
                })
            }
            Some(ScreeningOutcome::Colliding) => Ok(ConformerState::Colliding),
            Some(ScreeningOutcome::Crashing) => Ok(ConformerState::Crashing),
            None => Err(EngineError::Unplaced(id.clone())),
        }
    }

    /// Adds a freshly generated conformer and returns its hash id.
    ///
    /// The id is derived from the species name and the conformer's `(torsion, step)`
    /// perturbation. `rotor_dimension` defaults to the number of dihedral entries, and
    /// `arc_xyz` is filled from `xyz_str` when only the text form is given.
    pub fn add_generated(&mut self, mut conformer: ScreeningConformer) -> Result<HashId, EngineError> {
        if self.species.torsions.is_some() {
            if let Some(torsion) = conformer
                .torsions()
                .find(|t| !self.species.declares_torsion(t))
            {
                return Err(EngineError::UndeclaredTorsion { torsion: *torsion });
            }
        }

        let id = HashId::from_perturbation(
            self.species.label(),
            conformer.dihedrals().iter().map(|d| (&d.torsion, d.step)),
        );
        if self.conformers.contains_key(&id) {
            return Err(EngineError::DuplicateConformer(id));
        }
        for dihedral in conformer.dihedrals() {
            ensure_finite(&id, "dihedral", dihedral.angle)?;
        }

        if conformer.rotor_dimension.is_none() {
            conformer.rotor_dimension = Some(conformer.dihedrals().len());
        }
        if conformer.arc_xyz.is_none() {
            if let Some(text) = &conformer.xyz_str {
                let arc = parse_xyz_str(text).map_err(|source| EngineError::Geometry {
                    id: id.clone(),
                    source,
                })?;
                conformer.arc_xyz = Some(arc);
            }
        }

        debug!("Generated conformer '{}'", id);
        self.conformers.insert(id.clone(), conformer);
        self.place(&id, ScreeningOutcome::ToScreen);
        Ok(id)
    }

    /// `Generated → Screened`.
    pub fn record_screening_energy(&mut self, id: &HashId, energy: f64) -> Result<(), EngineError> {
        check_transition(id, self.state_of(id)?, ConformerState::Screened)?;
        ensure_finite(id, "initial_screening_sp_energy", energy)?;

        let conformer = self.conformer_mut(id)?;
        conformer.initial_screening_sp_energy = Some(energy);
        conformer.is_colliding = Some(false);
        conformer.is_crashing = Some(false);
        Ok(())
    }

    /// `Generated → Colliding`: the perturbed geometry failed the collision check.
    pub fn mark_colliding(&mut self, id: &HashId) -> Result<(), EngineError> {
        check_transition(id, self.state_of(id)?, ConformerState::Colliding)?;
        self.conformer_mut(id)?.is_colliding = Some(true);
        self.place(id, ScreeningOutcome::Colliding);
        debug!("Conformer '{}' collides", id);
        Ok(())
    }

    /// `Generated → Crashing`: the screening calculation failed. A conformer that
    /// already has its screening energy cannot crash in this job.
    pub fn mark_crashing(&mut self, id: &HashId) -> Result<(), EngineError> {
        let from = self.state_of(id)?;
        check_transition(id, from, ConformerState::Crashing)?;
        if from != ConformerState::Generated {
            return Err(EngineError::IllegalTransition {
                id: id.clone(),
                from,
                to: ConformerState::Crashing,
            });
        }
        self.conformer_mut(id)?.is_crashing = Some(true);
        self.place(id, ScreeningOutcome::Crashing);
        debug!("Conformer '{}' crashed during screening", id);
        Ok(())
    }

    /// Screened conformers with their screening energies, in outcome-set order.
    pub fn screened_candidates(&self) -> Vec<Candidate> {
        self.bucket(ScreeningOutcome::ToScreen)
            .unwrap_or_default()
            .iter()
            .filter_map(|id| {
                let energy = self.conformers.get(id)?.initial_screening_sp_energy?;
                Some(Candidate {
                    id: id.clone(),
                    energy,
                })
            })
            .collect()
    }
}

impl PostScreeningJob {
    fn conformer(&self, id: &HashId) -> Result<&PostScreeningConformer, EngineError> {
        self.conformers
            .get(id)
            .ok_or_else(|| EngineError::UnknownConformer(id.clone()))
    }

    fn conformer_mut(&mut self, id: &HashId) -> Result<&mut PostScreeningConformer, EngineError> {
        self.conformers
            .get_mut(id)
            .ok_or_else(|| EngineError::UnknownConformer(id.clone()))
    }

    /// Stages every conformer of this job goes through, in recording order.
    ///
    /// Optimization always runs. Fine optimization, the post-optimization single point
    /// and the two solvation single points run when their level of theory is set; the
    /// solvation stages and the correction only when solvation is enabled.
    pub fn enabled_stages(&self) -> Vec<Stage> {
        let lot = &self.level_of_theory;
        let mut stages = vec![Stage::Opt];
        if lot.fine_opt.is_some() {
            stages.push(Stage::FineOpt);
        }
        if lot.sp_after_opt.is_some() {
            stages.push(Stage::SpAfterOpt);
        }
        if self.solvation_enabled() {
            if lot.solv_sp_gas.is_some() {
                stages.push(Stage::SolvSpGas);
            }
            if lot.solv_sp_liq.is_some() {
                stages.push(Stage::SolvSpLiq);
            }
            stages.push(Stage::SolvCorrection);
        }
        stages
    }

    fn optimization_finished(&self, conformer: &PostScreeningConformer) -> bool {
        conformer.energy.end_of_opt.is_some()
            && (self.level_of_theory.fine_opt.is_none() || conformer.energy.end_of_fine_opt.is_some())
    }

    /// The next stage `id` must record, or `None` once every enabled stage has an energy.
    pub fn pending_stage(&self, id: &HashId) -> Result<Option<Stage>, EngineError> {
        let conformer = self.conformer(id)?;
        Ok(self
            .enabled_stages()
            .into_iter()
            .find(|&stage| conformer.energy.get(stage).is_none()))
    }

    /// Derives the state of `id` from its outcome set, energies and the species kind.
    pub fn state_of(&self, id: &HashId) -> Result<ConformerState, EngineError> {
        let conformer = self.conformer(id)?;
        match self.outcome_of(id) {
            Some(
                PostScreeningOutcome::ToOpt
                | PostScreeningOutcome::ToCalcSpAfterOpt
                | PostScreeningOutcome::ToCalcSolv,
            ) => Ok(if self.optimization_finished(conformer) {
                ConformerState::Optimized
            } else {
                ConformerState::SelectedForOptimization
            }),
            Some(PostScreeningOutcome::CollidingAfterOpt) => Ok(ConformerState::Colliding),
            Some(PostScreeningOutcome::CrashingInOpt) => Ok(ConformerState::Crashing),
            Some(PostScreeningOutcome::Valid) => Ok(if self.species.is_transition_state() {
                ConformerState::TsValid
            } else {
                ConformerState::IsomorphicValid
            }),
            Some(PostScreeningOutcome::Invalid) => Ok(ConformerState::Invalid),
            None => Err(EngineError::Unplaced(id.clone())),
        }
    }

    /// `Screened → SelectedForOptimization`: copies conformer `id` out of the screening
    /// job and queues it for optimization here.
    pub fn select_for_optimization(
        &mut self,
        source: &ScreeningJob,
        id: &HashId,
    ) -> Result<(), EngineError> {
        check_transition(
            id,
            source.state_of(id)?,
            ConformerState::SelectedForOptimization,
        )?;
        if self.conformers.contains_key(id) {
            return Err(EngineError::DuplicateConformer(id.clone()));
        }
        let conformer = PostScreeningConformer::from(source.conformer(id)?);
        self.conformers.insert(id.clone(), conformer);
        self.place(id, PostScreeningOutcome::ToOpt);
        Ok(())
    }

    /// Records the energy and files of the next pending stage of `id`.
    ///
    /// Stages must be recorded in [`enabled_stages`](Self::enabled_stages) order, so the
    /// recorded energies always form a prefix of that list. Recording the solvation
    /// correction also fills `sp_include_solv_correction` from the best gas-phase
    /// single point. Once optimization is finished the conformer moves to the outcome
    /// set of its next pending calculation.
    pub fn record_stage(
        &mut self,
        id: &HashId,
        stage: Stage,
        energy: f64,
        files: StageFiles,
    ) -> Result<ConformerState, EngineError> {
        let state = self.state_of(id)?;
        if state.is_terminal() {
            return Err(EngineError::Terminal {
                id: id.clone(),
                state,
            });
        }
        if !self.enabled_stages().contains(&stage) {
            return Err(EngineError::StageNotEnabled {
                id: id.clone(),
                stage,
            });
        }
        let expected = self.pending_stage(id)?;
        if expected != Some(stage) {
            return Err(EngineError::StageOutOfOrder {
                id: id.clone(),
                stage,
                expected,
            });
        }
        ensure_finite(id, stage.energy_key(), energy)?;

        let conformer = self.conformer_mut(id)?;
        conformer.energy.set(stage, Some(energy));
        conformer.file_path.record(stage, files);
        if stage == Stage::SolvCorrection {
            conformer.energy.sp_include_solv_correction =
                conformer.energy.best_gas_phase().map(|gas| gas + energy);
        }

        let state = self.state_of(id)?;
        if state == ConformerState::Optimized {
            match self.pending_stage(id)? {
                Some(Stage::SpAfterOpt) => self.place(id, PostScreeningOutcome::ToCalcSpAfterOpt),
                Some(next) if next.is_solvation() => {
                    self.place(id, PostScreeningOutcome::ToCalcSolv)
                }
                _ => {}
            }
        }
        debug!("Conformer '{}' recorded {} = {}", id, stage.energy_key(), energy);
        Ok(state)
    }

    /// Liquid-phase minus gas-phase solvation single point of `id`.
    pub fn solvation_correction_from_sps(&self, id: &HashId) -> Result<f64, EngineError> {
        let energy = &self.conformer(id)?.energy;
        let missing = |stage| EngineError::MissingEnergy {
            id: id.clone(),
            stage,
        };
        let gas = energy.solv_sp_gas.ok_or_else(|| missing(Stage::SolvSpGas))?;
        let liq = energy.solv_sp_liq.ok_or_else(|| missing(Stage::SolvSpLiq))?;
        Ok(liq - gas)
    }

    /// Records the solvation correction derived from the two solvation single points.
    pub fn record_derived_solvation_correction(
        &mut self,
        id: &HashId,
        files: StageFiles,
    ) -> Result<ConformerState, EngineError> {
        let correction = self.solvation_correction_from_sps(id)?;
        self.record_stage(id, Stage::SolvCorrection, correction, files)
    }

    /// Stores the vibrational frequencies (cm⁻¹) of the optimized structure.
    pub fn record_frequencies(&mut self, id: &HashId, frequencies: Vec<f64>) -> Result<(), EngineError> {
        let state = self.state_of(id)?;
        if state.is_terminal() {
            return Err(EngineError::Terminal {
                id: id.clone(),
                state,
            });
        }
        if frequencies.iter().any(|f| !f.is_finite()) {
            return Err(EngineError::NonFinite {
                id: id.clone(),
                field: "frequencies",
            });
        }
        let conformer = self.conformer_mut(id)?;
        conformer.negative_frequencies = Some(negative_frequencies(&frequencies));
        conformer.frequencies = Some(frequencies);
        Ok(())
    }

    /// Stores the optimized geometry in both text and structured form. The text is
    /// stored headerless, whatever header the input carried.
    pub fn record_geometry_after_opt(&mut self, id: &HashId, xyz_str: String) -> Result<(), EngineError> {
        let state = self.state_of(id)?;
        if state.is_terminal() {
            return Err(EngineError::Terminal {
                id: id.clone(),
                state,
            });
        }
        let arc = parse_xyz_str(&xyz_str).map_err(|source| EngineError::Geometry {
            id: id.clone(),
            source,
        })?;
        let text = to_xyz_str(&arc).map_err(|source| EngineError::Geometry {
            id: id.clone(),
            source,
        })?;
        let conformer = self.conformer_mut(id)?;
        conformer.arc_xyz_after_opt = Some(arc);
        conformer.xyz_str_after_opt = Some(text);
        Ok(())
    }

    /// `Optimized → Colliding`: the optimized structure collides. Only allowed before
    /// any post-optimization single point or solvation correction was recorded.
    pub fn mark_colliding(&mut self, id: &HashId) -> Result<(), EngineError> {
        let from = self.state_of(id)?;
        check_transition(id, from, ConformerState::Colliding)?;
        let energy = &self.conformer(id)?.energy;
        if POST_OPT_SINGLE_POINTS
            .iter()
            .any(|&stage| energy.get(stage).is_some())
        {
            return Err(EngineError::IllegalTransition {
                id: id.clone(),
                from,
                to: ConformerState::Colliding,
            });
        }
        self.conformer_mut(id)?.is_colliding = Some(true);
        self.place(id, PostScreeningOutcome::CollidingAfterOpt);
        debug!("Conformer '{}' collides after optimization", id);
        Ok(())
    }

    /// `* → Crashing`: a calculation failed. Energies recorded before the crash and
    /// the optimized geometry are kept.
    pub fn mark_crashing(&mut self, id: &HashId) -> Result<(), EngineError> {
        check_transition(id, self.state_of(id)?, ConformerState::Crashing)?;
        self.conformer_mut(id)?.is_crashing = Some(true);
        self.place(id, PostScreeningOutcome::CrashingInOpt);
        debug!("Conformer '{}' crashed after screening", id);
        Ok(())
    }

    /// `Optimized → IsomorphicValid | TsValid | Invalid`.
    ///
    /// Requires every enabled stage to have an energy. Transition states are judged by
    /// their recorded negative frequencies, other species by `verdict`.
    pub fn classify(
        &mut self,
        id: &HashId,
        verdict: IsomorphismVerdict,
    ) -> Result<ConformerState, EngineError> {
        let from = self.state_of(id)?;
        if from.is_terminal() {
            return Err(EngineError::Terminal {
                id: id.clone(),
                state: from,
            });
        }
        let prerequisite = |missing| EngineError::MissingPrerequisite {
            id: id.clone(),
            missing,
        };
        if from != ConformerState::Optimized {
            return Err(prerequisite(Prerequisite::Optimization));
        }
        if self.pending_stage(id)?.is_some() {
            return Err(prerequisite(Prerequisite::DownstreamEnergies));
        }

        let is_ts = self.species.is_transition_state();
        let outcome = classify_outcome(
            is_ts,
            verdict,
            self.conformer(id)?.negative_frequencies.as_deref(),
        )
        .map_err(prerequisite)?;

        let conformer = self.conformer_mut(id)?;
        if let Some(flag) = verdict.as_flag() {
            conformer.is_isomorphic = Some(flag);
        }
        if is_ts {
            conformer.is_valid_ts = Some(outcome == ConformerState::TsValid);
        }
        let bucket = if outcome.is_valid() {
            PostScreeningOutcome::Valid
        } else {
            PostScreeningOutcome::Invalid
        };
        self.place(id, bucket);
        debug!("Conformer '{}' classified as {}", id, outcome);
        Ok(outcome)
    }
}
