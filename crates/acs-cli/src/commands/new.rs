use super::absolute;
use crate::cli::NewArgs;
use crate::config::AppConfig;
use crate::config::species::SpeciesFile;
use crate::error::{CliError, Result};
use acs::core::io::revisions::RevisionStore;
use acs::core::models::job::{JobRecord, new_job_record};
use acs::core::models::species::Species;
use acs::engine::validation::Validate;
use std::path::{Path, PathBuf};
use tracing::info;

pub fn run(args: NewArgs, config: &AppConfig) -> Result<()> {
    let folder = match args.folder.as_deref().or(config.project_folder.as_deref()) {
        Some(folder) => absolute(folder)?,
        None => std::env::current_dir()?,
    };

    let species = match &args.species {
        Some(path) => Some(SpeciesFile::from_file(path)?.into_species(path)?),
        None => None,
    };

    let record = build_record(&args, &folder, species);
    record.ensure_valid()?;

    let store = RevisionStore::new(&folder, &config.record_stem);
    if !store.revisions()?.is_empty() {
        return Err(CliError::Argument(format!(
            "'{}' already holds revisions of '{}'; refusing to start a new record there",
            folder.display(),
            config.record_stem
        )));
    }

    let number = store.append(&record)?;
    let path = store.revision_path(number);
    info!(
        "Created {} record for project '{}'",
        record.variant(),
        args.project
    );
    println!("Created {} record: {}", record.variant(), path.display());
    Ok(())
}

fn build_record(args: &NewArgs, folder: &Path, species: Option<Species>) -> JobRecord {
    let mut record = new_job_record(args.variant);
    let project = Some(args.project.clone());
    let folder: Option<PathBuf> = Some(folder.to_path_buf());
    let solvation = Some(args.solvation);
    match &mut record {
        JobRecord::Screening(job) => {
            job.project = project;
            job.project_folder_path = folder;
            job.calc_solvation_sp_correction = solvation;
            if let Some(species) = species {
                job.species = species;
            }
        }
        JobRecord::PostScreening(job) => {
            job.project = project;
            job.project_folder_path = folder;
            job.calc_solvation_sp_correction = solvation;
            if let Some(species) = species {
                job.species = species;
            }
        }
    }
    record
}

#[cfg(test)]
mod tests {
    use super::*;
    use acs::core::io::record::load_job;
    use acs::core::models::job::RecordVariant;
    use tempfile::tempdir;

    fn config() -> AppConfig {
        AppConfig {
            project_folder: None,
            record_stem: "conformers".to_string(),
            job_name: "conf".to_string(),
            keep_lowest: None,
        }
    }

    fn args(variant: RecordVariant, folder: &Path) -> NewArgs {
        NewArgs {
            variant,
            project: "hexanol".to_string(),
            species: None,
            solvation: true,
            folder: Some(folder.to_path_buf()),
        }
    }

    #[test]
    fn writes_first_revision_with_project_context() {
        let dir = tempdir().unwrap();
        run(args(RecordVariant::InitialScreening, dir.path()), &config()).unwrap();

        let record = load_job(&dir.path().join("conformers.rev0001.json")).unwrap();
        assert_eq!(record.variant(), RecordVariant::InitialScreening);
        assert_eq!(record.project(), Some("hexanol"));
        match record {
            JobRecord::Screening(job) => {
                assert_eq!(job.project_folder_path, Some(dir.path().to_path_buf()));
                assert_eq!(job.calc_solvation_sp_correction, Some(true));
                assert_eq!(job.conformer_to_screen_hash_ids, None);
            }
            other => panic!("Expected a screening record, got {:?}", other),
        }
    }

    #[test]
    fn refuses_to_restart_an_existing_record() {
        let dir = tempdir().unwrap();
        run(args(RecordVariant::PostScreening, dir.path()), &config()).unwrap();
        let again = run(args(RecordVariant::PostScreening, dir.path()), &config());
        assert!(matches!(again, Err(CliError::Argument(_))));
        assert!(!dir.path().join("conformers.rev0002.json").exists());
    }

    #[test]
    fn species_file_fills_the_species_block() {
        let dir = tempdir().unwrap();
        let species_path = dir.path().join("butane.toml");
        std::fs::write(
            &species_path,
            "name = \"butane\"\nmultiplicity = 1\ncharge = 0\ntorsions = [\"1-2-3-4\"]\n",
        )
        .unwrap();

        let mut new_args = args(RecordVariant::InitialScreening, &dir.path().join("run"));
        new_args.species = Some(species_path);
        run(new_args, &config()).unwrap();

        let record = load_job(&dir.path().join("run/conformers.rev0001.json")).unwrap();
        assert_eq!(record.species().name.as_deref(), Some("butane"));
        assert_eq!(record.species().multiplicity, Some(1));
    }
}
