use std::path::PathBuf;

/// Settings shared by every command after file, `--set` and default layering.
/// Command-line flags of the individual commands take precedence over these.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub project_folder: Option<PathBuf>,
    pub record_stem: String,
    pub job_name: String,
    /// `None` promotes every screened conformer.
    pub keep_lowest: Option<usize>,
}
