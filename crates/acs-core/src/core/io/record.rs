use crate::core::io::traits::RecordFile;
use crate::core::models::job::{
    JobRecord, PostScreeningJob, RecordVariant, ScreeningJob, UnknownVariantError,
};
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum RecordError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Malformed record: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    UnknownVariant(#[from] UnknownVariantError),
    #[error("Expected a {expected} record but found a {found} record")]
    VariantMismatch {
        expected: RecordVariant,
        found: RecordVariant,
    },
    #[error("Failed to read record file '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: Box<RecordError>,
    },
    #[error("Failed to write record file '{path}': {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: Box<RecordError>,
    },
}

/// JSON job-record file: one pretty-printed object per file.
pub struct JobRecordFile;

impl RecordFile for JobRecordFile {
    type Record = JobRecord;
    type Error = RecordError;

    fn read_from(reader: &mut impl BufRead) -> Result<JobRecord, RecordError> {
        Ok(serde_json::from_reader(reader)?)
    }

    fn write_to(record: &JobRecord, writer: &mut impl Write) -> Result<(), RecordError> {
        serde_json::to_writer_pretty(&mut *writer, record)?;
        writer.write_all(b"\n")?;
        Ok(())
    }
}

/// Reads a job record of either variant, attaching the path to any failure.
pub fn load_job(path: &Path) -> Result<JobRecord, RecordError> {
    let record = JobRecordFile::read_from_path(path).map_err(|e| RecordError::Read {
        path: path.to_path_buf(),
        source: Box::new(e),
    })?;
    debug!(
        "Loaded {} record with {} conformers from '{}'",
        record.variant(),
        record.conformer_count(),
        path.display()
    );
    Ok(record)
}

/// Writes a job record, replacing `path` if it exists.
pub fn save_job(record: &JobRecord, path: &Path) -> Result<(), RecordError> {
    JobRecordFile::write_to_path(record, path).map_err(|e| RecordError::Write {
        path: path.to_path_buf(),
        source: Box::new(e),
    })
}

/// Reads a record that must be an initial-screening job.
pub fn load_screening_job(path: &Path) -> Result<ScreeningJob, RecordError> {
    match load_job(path)? {
        JobRecord::Screening(job) => Ok(job),
        JobRecord::PostScreening(_) => Err(RecordError::VariantMismatch {
            expected: RecordVariant::InitialScreening,
            found: RecordVariant::PostScreening,
        }),
    }
}

/// Reads a record that must be a post-screening job.
pub fn load_post_screening_job(path: &Path) -> Result<PostScreeningJob, RecordError> {
    match load_job(path)? {
        JobRecord::PostScreening(job) => Ok(job),
        JobRecord::Screening(_) => Err(RecordError::VariantMismatch {
            expected: RecordVariant::PostScreening,
            found: RecordVariant::InitialScreening,
        }),
    }
}
