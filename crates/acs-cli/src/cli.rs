use acs::core::models::job::RecordVariant;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    version,
    about = "ACS CLI - Create, inspect, validate and advance the job records of an automated conformer sampling run.",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output except for errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Path to a TOML configuration file.
    /// Defaults to `acs/config.toml` in the platform configuration directory, if present.
    #[arg(short, long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Override a configuration value (e.g., -S submission.job-name=hexanol).
    /// Can be specified multiple times.
    #[arg(short = 'S', long = "set", value_name = "KEY=VALUE", global = true)]
    pub set_values: Vec<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Write the first revision of a fresh job record.
    New(NewArgs),
    /// Print the outcome-set counts of a job record.
    Inspect(InspectArgs),
    /// Check a job record against its invariants.
    Validate(ValidateArgs),
    /// Split an initial-screening record into dihedral partitions.
    Split(SplitArgs),
    /// Merge screening partitions and write the post-screening record.
    Promote(PromoteArgs),
    /// Render the job-array submission script.
    Script(ScriptArgs),
}

/// Arguments for the `new` subcommand.
#[derive(Args, Debug)]
pub struct NewArgs {
    /// Record variant: 'initial-screening' or 'post-screening'.
    #[arg(long, value_name = "VARIANT")]
    pub variant: RecordVariant,

    /// Project name stored in the record.
    #[arg(short, long, value_name = "NAME")]
    pub project: String,

    /// Species description in TOML format.
    #[arg(long, value_name = "PATH")]
    pub species: Option<PathBuf>,

    /// Enable the solvation single-point correction.
    #[arg(long)]
    pub solvation: bool,

    /// Project folder receiving the record revisions. Overrides `project.folder`.
    #[arg(short, long, value_name = "DIR")]
    pub folder: Option<PathBuf>,
}

/// Arguments for the `inspect` subcommand.
#[derive(Args, Debug)]
pub struct InspectArgs {
    /// Path to a job record (JSON).
    #[arg(value_name = "RECORD")]
    pub record: PathBuf,
}

/// Arguments for the `validate` subcommand.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Path to a job record (JSON).
    #[arg(value_name = "RECORD")]
    pub record: PathBuf,
}

/// Arguments for the `split` subcommand.
#[derive(Args, Debug)]
pub struct SplitArgs {
    /// Path to an initial-screening job record (JSON).
    #[arg(value_name = "RECORD")]
    pub record: PathBuf,

    /// Dihedral subset of one partition, as comma-separated torsions (e.g., 1-2-3-4,7-8-9-10).
    /// Repeat once per partition.
    #[arg(long = "subset", required = true, value_name = "TORSIONS")]
    pub subsets: Vec<String>,

    /// Directory for the partition files. Defaults to the record's directory.
    #[arg(short, long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,
}

/// Arguments for the `promote` subcommand.
#[derive(Args, Debug)]
pub struct PromoteArgs {
    /// Screening partition records (JSON) to merge.
    #[arg(value_name = "PARTITION", required = true)]
    pub partitions: Vec<PathBuf>,

    /// Keep only the N lowest-energy screened conformers. Overrides `selection.keep-lowest`.
    #[arg(short = 'k', long, value_name = "N")]
    pub keep_lowest: Option<usize>,

    /// Project folder receiving the post-screening revisions. Overrides `project.folder`.
    #[arg(short, long, value_name = "DIR")]
    pub folder: Option<PathBuf>,

    /// Replace the comment carried over from the screening record.
    #[arg(long, value_name = "TEXT")]
    pub comment: Option<String>,
}

/// Arguments for the `script` subcommand.
#[derive(Args, Debug)]
pub struct ScriptArgs {
    /// Job name suffix (the job is named `opt<NAME>`). Overrides `submission.job-name`.
    #[arg(short, long, value_name = "NAME")]
    pub name: Option<String>,

    /// Index of the last array task; tasks run from 0 to this number.
    #[arg(short, long, value_name = "NUM", allow_negative_numbers = true)]
    pub last_job_num: i64,

    /// Write the script here instead of standard output.
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,
}
