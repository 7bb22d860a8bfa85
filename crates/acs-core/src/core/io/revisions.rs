use crate::core::io::record::{JobRecordFile, RecordError, load_job};
use crate::core::io::traits::RecordFile;
use crate::core::models::job::JobRecord;
use std::fs;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

/// A loaded revision together with its number and location.
#[derive(Debug, Clone, PartialEq)]
pub struct Revision {
    pub number: u32,
    pub path: PathBuf,
    pub record: JobRecord,
}

/// Append-only series of job-record snapshots in a project folder.
///
/// Revision `n` of stem `conformers` lives at `conformers.rev000n.json`. Snapshots are
/// written to a temporary file in the same folder and then linked into place without
/// clobbering, so a revision file is either complete or absent, and an existing
/// revision is never replaced.
#[derive(Debug, Clone)]
pub struct RevisionStore {
    folder: PathBuf,
    stem: String,
}

impl RevisionStore {
    pub fn new(folder: impl Into<PathBuf>, stem: impl Into<String>) -> Self {
        Self {
            folder: folder.into(),
            stem: stem.into(),
        }
    }

    pub fn folder(&self) -> &Path {
        &self.folder
    }

    pub fn revision_path(&self, number: u32) -> PathBuf {
        self.folder
            .join(format!("{}.rev{:04}.json", self.stem, number))
    }

    fn parse_revision_number(&self, file_name: &str) -> Option<u32> {
        file_name
            .strip_prefix(&self.stem)?
            .strip_prefix(".rev")?
            .strip_suffix(".json")?
            .parse()
            .ok()
    }

    /// Existing revision numbers in ascending order. A missing folder has none.
    pub fn revisions(&self) -> Result<Vec<u32>, RecordError> {
        let entries = match fs::read_dir(&self.folder) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut numbers = Vec::new();
        for entry in entries {
            let entry = entry?;
            if let Some(number) = entry
                .file_name()
                .to_str()
                .and_then(|name| self.parse_revision_number(name))
            {
                numbers.push(number);
            }
        }
        numbers.sort_unstable();
        Ok(numbers)
    }

    /// Persists `record` as the next free revision and returns its number.
    pub fn append(&self, record: &JobRecord) -> Result<u32, RecordError> {
        fs::create_dir_all(&self.folder)?;

        let mut temp = NamedTempFile::new_in(&self.folder)?;
        {
            let mut writer = BufWriter::new(temp.as_file_mut());
            JobRecordFile::write_to(record, &mut writer)?;
            writer.flush()?;
        }
        temp.as_file().sync_all()?;

        let mut number = self.revisions()?.last().map_or(1, |last| last + 1);
        loop {
            let path = self.revision_path(number);
            match temp.persist_noclobber(&path) {
                Ok(_) => {
                    info!("Wrote revision {} to '{}'", number, path.display());
                    return Ok(number);
                }
                Err(e) if e.error.kind() == io::ErrorKind::AlreadyExists => {
                    debug!("Revision {} appeared concurrently, trying the next", number);
                    temp = e.file;
                    number += 1;
                }
                Err(e) => return Err(e.error.into()),
            }
        }
    }

    pub fn load(&self, number: u32) -> Result<Revision, RecordError> {
        let path = self.revision_path(number);
        let record = load_job(&path)?;
        Ok(Revision {
            number,
            path,
            record,
        })
    }

    /// Loads the newest revision that parses, skipping truncated or corrupt files.
    ///
    /// Returns `Ok(None)` when the folder holds no readable revision.
    pub fn load_latest(&self) -> Result<Option<Revision>, RecordError> {
        for number in self.revisions()?.into_iter().rev() {
            match self.load(number) {
                Ok(revision) => return Ok(Some(revision)),
                Err(e) => warn!("Skipping unreadable revision {}: {}", number, e),
            }
        }
        Ok(None)
    }
}
