use crate::cli::ValidateArgs;
use crate::error::Result;
use acs::core::io::record::load_job;
use acs::engine::validation::{Validate, ValidationError};
use tracing::warn;

pub fn run(args: ValidateArgs) -> Result<()> {
    let record = load_job(&args.record)?;
    let violations = record.violations();
    if violations.is_empty() {
        println!(
            "{}: valid {} record ({} conformers)",
            args.record.display(),
            record.variant(),
            record.conformer_count()
        );
        return Ok(());
    }

    warn!(
        "{} violation(s) in '{}'",
        violations.len(),
        args.record.display()
    );
    println!("{}:", args.record.display());
    for violation in &violations {
        println!("  - {}", violation);
    }
    Err(ValidationError(violations).into())
}
