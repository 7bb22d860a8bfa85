use crate::cli::InspectArgs;
use crate::error::Result;
use acs::core::io::record::load_job;
use acs::core::models::ids::HashId;
use acs::core::models::job::JobRecord;
use acs::engine::error::EngineError;
use acs::engine::state::ConformerState;
use std::collections::BTreeMap;
use std::io::{self, Write};

pub fn run(args: InspectArgs) -> Result<()> {
    let record = load_job(&args.record)?;
    summarize(&mut io::stdout().lock(), &record)?;
    Ok(())
}

/// Conformer counts per lifecycle state; conformers the record cannot place are
/// counted as `unplaced`.
fn state_counts(record: &JobRecord) -> BTreeMap<String, usize> {
    fn label(state: std::result::Result<ConformerState, EngineError>) -> String {
        match state {
            Ok(state) => state.to_string(),
            Err(_) => "unplaced".to_string(),
        }
    }

    let mut counts = BTreeMap::new();
    let states: Vec<String> = match record {
        JobRecord::Screening(job) => job
            .conformers
            .keys()
            .map(|id: &HashId| label(job.state_of(id)))
            .collect(),
        JobRecord::PostScreening(job) => job
            .conformers
            .keys()
            .map(|id: &HashId| label(job.state_of(id)))
            .collect(),
    };
    for state in states {
        *counts.entry(state).or_insert(0) += 1;
    }
    counts
}

fn summarize(out: &mut impl Write, record: &JobRecord) -> io::Result<()> {
    let species = record.species();
    writeln!(out, "Variant:     {}", record.variant())?;
    writeln!(out, "Project:     {}", record.project().unwrap_or("-"))?;
    writeln!(
        out,
        "Species:     {}{}",
        species.name.as_deref().unwrap_or("-"),
        if species.is_transition_state() { " (TS)" } else { "" }
    )?;
    writeln!(out, "Conformers:  {}", record.conformer_count())?;

    writeln!(out, "Outcome sets:")?;
    for (bucket, size) in record.bucket_sizes() {
        match size {
            Some(size) => writeln!(out, "  {:<44}{:>6}", bucket, size)?,
            None => writeln!(out, "  {:<44}{:>6}", bucket, "unset")?,
        }
    }

    let counts = state_counts(record);
    if !counts.is_empty() {
        writeln!(out, "States:")?;
        for (state, count) in counts {
            writeln!(out, "  {:<44}{:>6}", state, count)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use acs::core::models::conformer::{ScreeningConformer, ScreeningDihedral};
    use acs::core::models::job::ScreeningJob;
    use acs::core::models::species::Torsion;

    struct ClosedPipe;

    impl Write for ClosedPipe {
        fn write(&mut self, _: &[u8]) -> io::Result<usize> {
            Err(io::Error::from(io::ErrorKind::BrokenPipe))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn summary_of(record: &JobRecord) -> String {
        let mut out = Vec::new();
        summarize(&mut out, record).unwrap();
        String::from_utf8(out).unwrap()
    }

    fn screening_record() -> JobRecord {
        let torsion = Torsion([1, 2, 3, 4]);
        let mut job = ScreeningJob::new();
        job.project = Some("hexanol".into());
        job.species.name = Some("hexanol".into());
        job.species.torsions = Some(vec![torsion]);
        for step in 1..=3 {
            let id = job
                .add_generated(ScreeningConformer::generated(
                    vec![ScreeningDihedral {
                        torsion,
                        angle: 120.0 * step as f64,
                        step,
                    }],
                    None,
                ))
                .unwrap();
            if step == 3 {
                job.mark_colliding(&id).unwrap();
            }
        }
        job.into()
    }

    #[test]
    fn summary_lists_every_outcome_set() {
        let summary = summary_of(&screening_record());
        assert!(summary.contains("Variant:     initial-screening"));
        assert!(summary.contains("Project:     hexanol"));
        assert!(summary.contains("Conformers:  3"));
        assert!(summary.contains("conformer_to_screen_hash_ids"));
        assert!(summary.contains("colliding_conformer_hash_ids"));
        assert!(summary.contains("crashing_conformer_hash_ids"));
    }

    #[test]
    fn unset_outcome_sets_are_reported_as_unset() {
        let record: JobRecord = ScreeningJob::new().into();
        let summary = summary_of(&record);
        assert!(summary.contains("unset"));
        assert!(!summary.contains("States:"));
    }

    #[test]
    fn write_failures_are_reported() {
        let err = summarize(&mut ClosedPipe, &screening_record()).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);
    }

    #[test]
    fn states_are_counted_per_conformer() {
        let counts = state_counts(&screening_record());
        assert_eq!(counts.values().sum::<usize>(), 3);
        assert_eq!(counts.get(&ConformerState::Colliding.to_string()), Some(&1));
        assert_eq!(counts.get(&ConformerState::Generated.to_string()), Some(&2));
    }
}
