use crate::cli::ScriptArgs;
use crate::config::AppConfig;
use crate::error::Result;
use acs::core::template::slurm;
use tracing::info;

pub fn run(args: ScriptArgs, config: &AppConfig) -> Result<()> {
    let name = args.name.as_deref().unwrap_or(&config.job_name);
    let script = slurm::render(name, args.last_job_num)?;

    match &args.output {
        Some(path) => {
            std::fs::write(path, &script)?;
            info!(
                "Wrote submission script for tasks 0..={} to {:?}",
                args.last_job_num, path
            );
            println!("Submission script written to {}", path.display());
        }
        None => print!("{}", script),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CliError;
    use acs::core::template::slurm::TemplateError;
    use tempfile::tempdir;

    fn config() -> AppConfig {
        AppConfig {
            project_folder: None,
            record_stem: "conformers".to_string(),
            job_name: "conf".to_string(),
            keep_lowest: None,
        }
    }

    #[test]
    fn writes_rendered_script_with_configured_name() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("submit.sh");
        run(
            ScriptArgs {
                name: None,
                last_job_num: 11,
                output: Some(path.clone()),
            },
            &config(),
        )
        .unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, slurm::render("conf", 11).unwrap());
    }

    #[test]
    fn negative_job_number_is_rejected() {
        let result = run(
            ScriptArgs {
                name: Some("hexanol".into()),
                last_job_num: -1,
                output: None,
            },
            &config(),
        );
        assert!(matches!(
            result,
            Err(CliError::Template(TemplateError::NegativeJobNumber(-1)))
        ));
    }
}
