//! # Core Module
//!
//! Record types and the I/O around them.
//!
//! - **Records** ([`models`]) - Species, level of theory, energy and file-path ledgers,
//!   conformer and job records for both pipeline phases
//! - **Persistence** ([`io`]) - JSON record files, append-only revision store, xyz text
//! - **Submission** ([`template`]) - Fixed job-array script rendering

pub mod io;
pub mod models;
pub(crate) mod serde_helpers;
pub mod template;
