use super::parent_dir;
use crate::cli::SplitArgs;
use crate::error::{CliError, Result};
use crate::utils::parser;
use acs::core::io::record::{load_screening_job, save_job};
use acs::workflows::partition::split_screening_job;
use std::path::{Path, PathBuf};
use tracing::info;

pub fn run(args: SplitArgs) -> Result<()> {
    let subsets = args
        .subsets
        .iter()
        .map(|s| parser::parse_subset(s))
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| CliError::Argument(e.to_string()))?;

    info!("Loading screening record from {:?}", &args.record);
    let job = load_screening_job(&args.record)?;
    let parts = split_screening_job(&job, &subsets)?;

    let output_dir = args
        .output_dir
        .clone()
        .unwrap_or_else(|| parent_dir(&args.record));
    std::fs::create_dir_all(&output_dir)?;

    for (index, part) in parts.into_iter().enumerate() {
        let path = partition_path(&args.record, &output_dir, index);
        let count = part.conformers.len();
        save_job(&part.into(), &path)?;
        println!(
            "Partition {} ({}): {} conformers -> {}",
            index + 1,
            args.subsets[index],
            count,
            path.display()
        );
    }
    Ok(())
}

/// `<dir>/<record stem>.part<NN>.json`, numbered from 1.
fn partition_path(record: &Path, output_dir: &Path, index: usize) -> PathBuf {
    let stem = record
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "record".to_string());
    output_dir.join(format!("{}.part{:02}.json", stem, index + 1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use acs::core::io::record::load_screening_job;
    use acs::core::models::conformer::{ScreeningConformer, ScreeningDihedral};
    use acs::core::models::job::ScreeningJob;
    use acs::core::models::species::Torsion;
    use tempfile::tempdir;

    const T1: Torsion = Torsion([1, 2, 3, 4]);
    const T2: Torsion = Torsion([7, 8, 9, 10]);

    fn write_record(dir: &Path) -> PathBuf {
        let mut job = ScreeningJob::new();
        job.species.name = Some("butane".into());
        job.species.torsions = Some(vec![T1, T2]);
        for (torsion, steps) in [(T1, 3), (T2, 2)] {
            for step in 1..=steps {
                job.add_generated(ScreeningConformer::generated(
                    vec![ScreeningDihedral {
                        torsion,
                        angle: 60.0 * step as f64,
                        step,
                    }],
                    None,
                ))
                .unwrap();
            }
        }
        let path = dir.join("butane.json");
        save_job(&job.into(), &path).unwrap();
        path
    }

    #[test]
    fn writes_one_partition_file_per_subset() {
        let dir = tempdir().unwrap();
        let record = write_record(dir.path());
        run(SplitArgs {
            record,
            subsets: vec!["1-2-3-4".into(), "7-8-9-10".into()],
            output_dir: None,
        })
        .unwrap();

        let first = load_screening_job(&dir.path().join("butane.part01.json")).unwrap();
        let second = load_screening_job(&dir.path().join("butane.part02.json")).unwrap();
        assert_eq!(first.conformers.len(), 3);
        assert_eq!(second.conformers.len(), 2);
        assert_eq!(second.dihedrals_considered_in_this_file, Some(vec![T2]));
    }

    #[test]
    fn malformed_subset_is_an_argument_error() {
        let dir = tempdir().unwrap();
        let record = write_record(dir.path());
        let result = run(SplitArgs {
            record,
            subsets: vec!["1-2-3".into()],
            output_dir: None,
        });
        assert!(matches!(result, Err(CliError::Argument(_))));
    }

    #[test]
    fn undeclared_torsion_is_a_workflow_error() {
        let dir = tempdir().unwrap();
        let record = write_record(dir.path());
        let result = run(SplitArgs {
            record,
            subsets: vec!["2-3-4-5".into()],
            output_dir: Some(dir.path().join("parts")),
        });
        assert!(matches!(result, Err(CliError::Workflow(_))));
    }

    #[test]
    fn partition_files_are_numbered_from_one() {
        assert_eq!(
            partition_path(Path::new("runs/hexanol.rev0003.json"), Path::new("out"), 0),
            PathBuf::from("out/hexanol.rev0003.part01.json")
        );
    }
}
