use super::defaults::DefaultsConfig;
use super::file::FileConfig;
use super::models::AppConfig;
use crate::error::{CliError, Result};
use crate::utils::parser;
use directories::ProjectDirs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// `acs/config.toml` in the platform configuration directory.
pub fn default_config_path() -> Option<PathBuf> {
    ProjectDirs::from("", "", "acs").map(|dirs| dirs.config_dir().join("config.toml"))
}

/// The explicit `--config` path, else the default file when it exists.
pub fn resolve_config_path(explicit: Option<&Path>) -> Option<PathBuf> {
    match explicit {
        Some(path) => Some(path.to_path_buf()),
        None => default_config_path().filter(|path| path.is_file()),
    }
}

pub fn build_config(config_path: Option<&Path>, set_values: &[String]) -> Result<AppConfig> {
    let defaults = DefaultsConfig::default();

    let file_config = if let Some(path) = config_path {
        FileConfig::from_file(path)?
    } else {
        FileConfig::default()
    };

    let mut file_config = apply_set_values(file_config, set_values)?;

    let project = file_config.project.take().unwrap_or_default();
    let submission = file_config.submission.take().unwrap_or_default();
    let selection = file_config.selection.take().unwrap_or_default();

    let record_stem = project.record_stem.unwrap_or(defaults.record_stem);
    if record_stem.is_empty() || record_stem.contains(['/', '\\']) {
        return Err(CliError::Config(format!(
            "`project.record-stem` must be a plain file name, got '{}'",
            record_stem
        )));
    }
    if selection.keep_lowest == Some(0) {
        return Err(CliError::Config(
            "`selection.keep-lowest` must be at least 1".to_string(),
        ));
    }

    let config = AppConfig {
        project_folder: project.folder,
        record_stem,
        job_name: submission.job_name.unwrap_or(defaults.job_name),
        keep_lowest: selection.keep_lowest,
    };
    debug!("Resolved configuration: {:?}", config);
    Ok(config)
}

fn apply_set_values(mut config: FileConfig, set_values: &[String]) -> Result<FileConfig> {
    if set_values.is_empty() {
        return Ok(config);
    }
    for kv_pair in set_values {
        let (key, value_str) =
            parser::parse_key_value(kv_pair).map_err(|e| CliError::Config(e.to_string()))?;

        match key {
            "project.folder" => {
                config.project.get_or_insert_with(Default::default).folder =
                    Some(PathBuf::from(value_str));
            }
            "project.record-stem" => {
                config
                    .project
                    .get_or_insert_with(Default::default)
                    .record_stem = Some(value_str.to_string());
            }
            "submission.job-name" => {
                config
                    .submission
                    .get_or_insert_with(Default::default)
                    .job_name = Some(value_str.to_string());
            }
            "selection.keep-lowest" => {
                config
                    .selection
                    .get_or_insert_with(Default::default)
                    .keep_lowest = Some(value_str.parse().map_err(|_| {
                    CliError::Config(format!("Invalid integer value for {}: {}", key, value_str))
                })?);
            }
            _ => {
                return Err(CliError::Config(format!(
                    "Unsupported configuration key for --set: '{}'",
                    key
                )));
            }
        }
    }
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::{TempDir, tempdir};

    fn write_config_file(dir: &TempDir, content: &str) -> PathBuf {
        let path = dir.path().join("config.toml");
        fs::write(&path, content).unwrap();
        path
    }

    fn set(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn defaults_apply_without_file_or_overrides() {
        let config = build_config(None, &[]).unwrap();
        assert_eq!(
            config,
            AppConfig {
                project_folder: None,
                record_stem: "conformers".to_string(),
                job_name: "conf".to_string(),
                keep_lowest: None,
            }
        );
    }

    #[test]
    fn file_values_replace_defaults() {
        let dir = tempdir().unwrap();
        let path = write_config_file(
            &dir,
            r#"
            [project]
            folder = "/scratch/hexanol"

            [submission]
            job-name = "hex"
            "#,
        );
        let config = build_config(Some(&path), &[]).unwrap();
        assert_eq!(config.project_folder, Some(PathBuf::from("/scratch/hexanol")));
        assert_eq!(config.job_name, "hex");
        assert_eq!(config.record_stem, "conformers");
    }

    #[test]
    fn set_values_override_file_values() {
        let dir = tempdir().unwrap();
        let path = write_config_file(
            &dir,
            r#"
            [project]
            record-stem = "hexanol"

            [selection]
            keep-lowest = 10
            "#,
        );
        let config = build_config(
            Some(&path),
            &set(&["selection.keep-lowest=3", "project.folder=/data/run"]),
        )
        .unwrap();
        assert_eq!(config.keep_lowest, Some(3));
        assert_eq!(config.project_folder, Some(PathBuf::from("/data/run")));
        assert_eq!(config.record_stem, "hexanol");
    }

    #[test]
    fn invalid_set_values_are_config_errors() {
        for bad in [
            "selection.keep-lowest=many",
            "cluster.partition=gpu",
            "no-equals-sign",
            "selection.keep-lowest=0",
            "project.record-stem=a/b",
        ] {
            assert!(
                matches!(build_config(None, &set(&[bad])), Err(CliError::Config(_))),
                "expected '{}' to be rejected",
                bad
            );
        }
    }

    #[test]
    fn explicit_config_path_wins_over_default_location() {
        let explicit = PathBuf::from("/tmp/acs-explicit.toml");
        assert_eq!(resolve_config_path(Some(&explicit)), Some(explicit));
    }

    #[test]
    fn missing_explicit_file_is_an_io_error() {
        let dir = tempdir().unwrap();
        let result = build_config(Some(&dir.path().join("absent.toml")), &[]);
        assert!(matches!(result, Err(CliError::Io(_))));
    }
}
