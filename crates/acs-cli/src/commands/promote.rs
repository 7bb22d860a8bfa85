use super::{absolute, parent_dir};
use crate::cli::PromoteArgs;
use crate::config::AppConfig;
use crate::error::{CliError, Result};
use acs::core::io::record::load_screening_job;
use acs::core::io::revisions::RevisionStore;
use acs::engine::config::PromotionConfigBuilder;
use acs::engine::selection::Selection;
use acs::engine::validation::Validate;
use acs::workflows::promote::promote_partitions;
use tracing::info;

pub fn run(args: PromoteArgs, config: &AppConfig) -> Result<()> {
    let selection = match args.keep_lowest.or(config.keep_lowest) {
        Some(0) => {
            return Err(CliError::Argument(
                "--keep-lowest must be at least 1".to_string(),
            ));
        }
        Some(count) => Selection::LowestEnergies { count },
        None => Selection::All,
    };

    let parts = args
        .partitions
        .iter()
        .map(|path| {
            info!("Loading screening partition from {:?}", path);
            load_screening_job(path)
        })
        .collect::<std::result::Result<Vec<_>, _>>()?;

    let mut builder = PromotionConfigBuilder::new().selection(selection);
    if let Some(folder) = args.folder.as_deref().or(config.project_folder.as_deref()) {
        builder = builder.project_folder_path(absolute(folder)?);
    }
    if let Some(comment) = &args.comment {
        builder = builder.comment(comment.clone());
    }
    let promotion = builder.build()?;

    let post = promote_partitions(&parts, &promotion)?;
    post.ensure_valid()?;

    let folder = match &post.project_folder_path {
        Some(folder) => folder.clone(),
        None => parent_dir(&args.partitions[0]),
    };
    let selected = post.conformers.len();
    let store = RevisionStore::new(folder, &config.record_stem);
    let number = store.append(&post.into())?;
    println!(
        "Promoted {} conformers from {} partition(s) -> {}",
        selected,
        args.partitions.len(),
        store.revision_path(number).display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use acs::core::io::record::{load_post_screening_job, save_job};
    use acs::core::models::conformer::{ScreeningConformer, ScreeningDihedral};
    use acs::core::models::job::ScreeningJob;
    use acs::core::models::species::Torsion;
    use std::path::{Path, PathBuf};
    use tempfile::tempdir;

    fn config() -> AppConfig {
        AppConfig {
            project_folder: None,
            record_stem: "hexanol".to_string(),
            job_name: "conf".to_string(),
            keep_lowest: None,
        }
    }

    fn write_partition(dir: &Path, torsion: Torsion, file: &str) -> PathBuf {
        let mut job = ScreeningJob::new();
        job.species.name = Some("hexanol".into());
        job.species.torsions = Some(vec![Torsion([1, 2, 3, 4]), Torsion([7, 8, 9, 10])]);
        job.dihedrals_considered_in_this_file = Some(vec![torsion]);
        for step in 1..=3 {
            let id = job
                .add_generated(ScreeningConformer::generated(
                    vec![ScreeningDihedral {
                        torsion,
                        angle: 90.0 * step as f64,
                        step,
                    }],
                    None,
                ))
                .unwrap();
            job.record_screening_energy(&id, -310.0 + 0.01 * step as f64)
                .unwrap();
        }
        let path = dir.join(file);
        save_job(&job.into(), &path).unwrap();
        path
    }

    #[test]
    fn merges_partitions_into_a_post_screening_revision() {
        let dir = tempdir().unwrap();
        let partitions = vec![
            write_partition(dir.path(), Torsion([1, 2, 3, 4]), "p1.json"),
            write_partition(dir.path(), Torsion([7, 8, 9, 10]), "p2.json"),
        ];
        run(
            PromoteArgs {
                partitions,
                keep_lowest: None,
                folder: None,
                comment: Some("round 2".into()),
            },
            &config(),
        )
        .unwrap();

        let post = load_post_screening_job(&dir.path().join("hexanol.rev0001.json")).unwrap();
        assert_eq!(post.conformers.len(), 6);
        assert_eq!(post.comment.as_deref(), Some("round 2"));
    }

    #[test]
    fn keep_lowest_from_config_limits_the_selection() {
        let dir = tempdir().unwrap();
        let partitions = vec![write_partition(dir.path(), Torsion([1, 2, 3, 4]), "p1.json")];
        let mut config = config();
        config.keep_lowest = Some(2);
        config.project_folder = Some(dir.path().join("post"));

        run(
            PromoteArgs {
                partitions,
                keep_lowest: None,
                folder: None,
                comment: None,
            },
            &config,
        )
        .unwrap();

        let post =
            load_post_screening_job(&dir.path().join("post/hexanol.rev0001.json")).unwrap();
        assert_eq!(post.conformers.len(), 2);
        assert_eq!(post.project_folder_path, Some(dir.path().join("post")));
    }

    #[test]
    fn zero_keep_lowest_is_rejected() {
        let dir = tempdir().unwrap();
        let partitions = vec![write_partition(dir.path(), Torsion([1, 2, 3, 4]), "p1.json")];
        let result = run(
            PromoteArgs {
                partitions,
                keep_lowest: Some(0),
                folder: None,
                comment: None,
            },
            &config(),
        );
        assert!(matches!(result, Err(CliError::Argument(_))));
    }
}
