use super::error::WorkflowError;
use crate::core::models::conformer::ScreeningConformer;
use crate::core::models::job::{OutcomeBuckets, ScreeningJob};
use crate::core::models::species::Torsion;
use tracing::{debug, info, instrument, warn};

fn fits_subset(conformer: &ScreeningConformer, subset: &[Torsion]) -> bool {
    conformer
        .perturbed_torsions()
        .all(|torsion| subset.contains(torsion))
}

/// Splits a screening job into one partition per dihedral subset.
///
/// Each partition keeps the job context, records its subset in
/// `dihedrals_considered_in_this_file`, and holds the conformers whose perturbed
/// torsions all lie inside the subset. A conformer fitting several subsets goes to
/// the first; one fitting none is left out and logged. Outcome sets are restricted
/// to each partition's conformers, and sets unset in the source stay unset.
#[instrument(skip_all, name = "split_screening_job", fields(subsets = subsets.len()))]
pub fn split_screening_job(
    job: &ScreeningJob,
    subsets: &[Vec<Torsion>],
) -> Result<Vec<ScreeningJob>, WorkflowError> {
    for (index, subset) in subsets.iter().enumerate() {
        if subset.is_empty() {
            return Err(WorkflowError::EmptySubset { index });
        }
        if job.species.torsions.is_some() {
            if let Some(torsion) = subset.iter().find(|t| !job.species.declares_torsion(t)) {
                return Err(WorkflowError::UndeclaredTorsion {
                    index,
                    torsion: *torsion,
                });
            }
        }
    }

    let mut parts: Vec<ScreeningJob> = subsets
        .iter()
        .map(|subset| {
            let mut part = job.empty_like();
            part.dihedrals_considered_in_this_file = Some(subset.clone());
            part
        })
        .collect();

    let mut left_out = 0;
    for (id, conformer) in &job.conformers {
        match subsets
            .iter()
            .position(|subset| fits_subset(conformer, subset))
        {
            Some(index) => {
                parts[index]
                    .conformers
                    .insert(id.clone(), conformer.clone());
            }
            None => {
                debug!("Conformer '{}' fits no dihedral subset", id);
                left_out += 1;
            }
        }
    }
    if left_out > 0 {
        warn!(
            "{} conformers perturb torsions outside every subset and were left out",
            left_out
        );
    }

    for part in &mut parts {
        for &outcome in ScreeningJob::OUTCOMES {
            if let Some(ids) = job.bucket(outcome) {
                let kept = ids
                    .iter()
                    .filter(|id| part.conformers.contains_key(*id))
                    .cloned()
                    .collect();
                *part.bucket_slot(outcome) = Some(kept);
            }
        }
    }

    info!(
        "Split {} conformers into {} partitions",
        job.conformers.len() - left_out,
        parts.len()
    );
    Ok(parts)
}

/// Merges screening partitions back into one job.
///
/// The merged job takes its context from the first partition. A hash id present in
/// several partitions is kept once (first occurrence) when every copy describes the
/// same perturbation; otherwise the merge fails with
/// [`WorkflowError::HashIdConflict`].
#[instrument(skip_all, name = "merge_partitions", fields(partitions = parts.len()))]
pub fn merge_partitions(parts: &[ScreeningJob]) -> Result<ScreeningJob, WorkflowError> {
    let (first, rest) = parts.split_first().ok_or(WorkflowError::NoPartitions)?;
    for part in rest {
        if part.species.name != first.species.name {
            return Err(WorkflowError::IncompatiblePartitions(format!(
                "species '{}' and '{}'",
                first.species.label(),
                part.species.label()
            )));
        }
        if part.calc_solvation_sp_correction != first.calc_solvation_sp_correction {
            return Err(WorkflowError::IncompatiblePartitions(
                "solvation settings differ".to_string(),
            ));
        }
    }

    let mut merged = first.empty_like();
    merged.dihedrals_considered_in_this_file = if parts
        .iter()
        .all(|part| part.dihedrals_considered_in_this_file.is_some())
    {
        let mut union: Vec<Torsion> = Vec::new();
        for torsion in parts
            .iter()
            .flat_map(|part| part.dihedrals_considered_in_this_file.iter().flatten())
        {
            if !union.contains(torsion) {
                union.push(*torsion);
            }
        }
        Some(union)
    } else {
        None
    };
    for &outcome in ScreeningJob::OUTCOMES {
        if parts.iter().any(|part| part.bucket(outcome).is_some()) {
            *merged.bucket_slot(outcome) = Some(Vec::new());
        }
    }

    let mut duplicates = 0;
    for part in parts {
        for (id, conformer) in &part.conformers {
            if let Some(existing) = merged.conformers.get(id) {
                if existing.perturbation() != conformer.perturbation() {
                    return Err(WorkflowError::HashIdConflict(id.clone()));
                }
                duplicates += 1;
                continue;
            }
            merged.conformers.insert(id.clone(), conformer.clone());
            if let Some(outcome) = part.outcome_of(id) {
                merged
                    .bucket_slot(outcome)
                    .get_or_insert_with(Vec::new)
                    .push(id.clone());
            }
        }
    }

    if duplicates > 0 {
        debug!("Dropped {} duplicate conformers while merging", duplicates);
    }
    info!(
        "Merged {} partitions into {} conformers",
        parts.len(),
        merged.conformers.len()
    );
    Ok(merged)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::conformer::ScreeningDihedral;
    use crate::core::models::ids::HashId;
    use crate::core::models::job::ScreeningOutcome;
    use crate::engine::validation::Validate;
    use std::collections::BTreeSet;

    const T1: Torsion = Torsion([1, 2, 3, 4]);
    const T2: Torsion = Torsion([7, 8, 9, 10]);

    fn perturb(steps: &[(Torsion, i32)]) -> ScreeningConformer {
        ScreeningConformer::generated(
            steps
                .iter()
                .map(|&(torsion, step)| ScreeningDihedral {
                    torsion,
                    angle: 60.0 * step as f64,
                    step,
                })
                .collect(),
            None,
        )
    }

    /// Conformers perturbing only T1 (steps 1..=3), only T2 (steps 1..=2), and one
    /// perturbing both.
    fn sampled_job() -> (ScreeningJob, HashId) {
        let mut job = ScreeningJob::new();
        job.project = Some("butane".into());
        job.species.name = Some("butane".into());
        job.species.torsions = Some(vec![T1, T2]);
        for step in 1..=3 {
            job.add_generated(perturb(&[(T1, step), (T2, 0)])).unwrap();
        }
        for step in 1..=2 {
            let id = job.add_generated(perturb(&[(T1, 0), (T2, step)])).unwrap();
            job.record_screening_energy(&id, -158.0 - step as f64 * 0.001)
                .unwrap();
        }
        let both = job.add_generated(perturb(&[(T1, 1), (T2, 1)])).unwrap();
        (job, both)
    }

    fn ids(job: &ScreeningJob) -> BTreeSet<HashId> {
        job.conformers.keys().cloned().collect()
    }

    mod split_tests {
        use super::*;

        #[test]
        fn partitions_hold_disjoint_conformers_of_their_subset() {
            let (job, both) = sampled_job();
            let parts = split_screening_job(&job, &[vec![T1], vec![T2]]).unwrap();

            assert_eq!(parts.len(), 2);
            assert_eq!(parts[0].conformers.len(), 3);
            assert_eq!(parts[1].conformers.len(), 2);
            assert!(ids(&parts[0]).is_disjoint(&ids(&parts[1])));
            assert!(!ids(&parts[0]).contains(&both) && !ids(&parts[1]).contains(&both));

            assert_eq!(parts[0].dihedrals_considered_in_this_file, Some(vec![T1]));
            assert_eq!(parts[1].project.as_deref(), Some("butane"));
            for part in &parts {
                assert_eq!(part.violations(), vec![]);
            }
        }

        #[test]
        fn outcome_sets_are_restricted_to_each_partition() {
            let (job, _) = sampled_job();
            let parts = split_screening_job(&job, &[vec![T1], vec![T2]]).unwrap();
            let to_screen = parts[1].bucket(ScreeningOutcome::ToScreen).unwrap();
            assert_eq!(to_screen.len(), 2);
            assert_eq!(parts[1].screened_candidates().len(), 2);
            assert_eq!(parts[0].colliding_conformer_hash_ids, None);
        }

        #[test]
        fn overlapping_subsets_assign_each_conformer_once() {
            let (job, both) = sampled_job();
            let parts = split_screening_job(&job, &[vec![T1, T2], vec![T2]]).unwrap();
            assert_eq!(parts[0].conformers.len(), 6);
            assert!(ids(&parts[0]).contains(&both));
            assert!(parts[1].conformers.is_empty());
        }

        #[test]
        fn invalid_subsets_are_rejected() {
            let (job, _) = sampled_job();
            assert_eq!(
                split_screening_job(&job, &[vec![T1], vec![]]),
                Err(WorkflowError::EmptySubset { index: 1 })
            );
            let stray = Torsion([3, 4, 5, 6]);
            assert_eq!(
                split_screening_job(&job, &[vec![stray]]),
                Err(WorkflowError::UndeclaredTorsion {
                    index: 0,
                    torsion: stray
                })
            );
        }
    }

    mod merge_tests {
        use super::*;

        #[test]
        fn merge_restores_the_split_conformers() {
            let (mut job, both) = sampled_job();
            job.conformers.remove(&both);
            job.conformer_to_screen_hash_ids
                .as_mut()
                .unwrap()
                .retain(|id| id != &both);

            let parts = split_screening_job(&job, &[vec![T1], vec![T2]]).unwrap();
            let merged = merge_partitions(&parts).unwrap();

            assert_eq!(merged.conformers, job.conformers);
            let as_set = |job: &ScreeningJob| -> BTreeSet<HashId> {
                job.bucket(ScreeningOutcome::ToScreen)
                    .unwrap()
                    .iter()
                    .cloned()
                    .collect()
            };
            assert_eq!(as_set(&merged), as_set(&job));
            assert_eq!(merged.dihedrals_considered_in_this_file, Some(vec![T1, T2]));
            assert_eq!(merged.violations(), vec![]);
        }

        #[test]
        fn identical_duplicates_are_kept_once() {
            let (job, _) = sampled_job();
            let parts = vec![job.clone(), job.clone()];
            let merged = merge_partitions(&parts).unwrap();
            assert_eq!(merged.conformers.len(), job.conformers.len());
            assert_eq!(merged.violations(), vec![]);
        }

        #[test]
        fn conflicting_ids_fail_the_merge() {
            let (job, _) = sampled_job();
            let mut other = job.empty_like();
            let id = job.conformers.keys().next().unwrap().clone();
            other
                .conformers
                .insert(id.clone(), perturb(&[(T1, 5), (T2, 5)]));
            other.place(&id, ScreeningOutcome::ToScreen);

            assert_eq!(
                merge_partitions(&[job, other]),
                Err(WorkflowError::HashIdConflict(id))
            );
        }

        #[test]
        fn merging_nothing_or_mixed_species_fails() {
            assert_eq!(merge_partitions(&[]), Err(WorkflowError::NoPartitions));

            let (job, _) = sampled_job();
            let mut other = job.empty_like();
            other.species.name = Some("pentane".into());
            assert!(matches!(
                merge_partitions(&[job, other]),
                Err(WorkflowError::IncompatiblePartitions(_))
            ));
        }
    }
}
