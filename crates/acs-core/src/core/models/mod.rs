//! # Core Models Module
//!
//! The persisted record schema of the conformer sampling pipeline.
//!
//! Every nested structure of a record (species, coordinate bundle, level of theory,
//! energy ledger, file-path ledger) is a named struct with a fixed field set. Fields
//! that a stage has not produced yet hold `None`, which is written as `null`; a key
//! is never omitted.
//!
//! ## Key Components
//!
//! - [`ids`] - Conformer hash identifiers
//! - [`species`] - The molecule or transition state under study and its torsions
//! - [`geometry`] - The structured (`arc_xyz`) geometry representation
//! - [`theory`] - Per-stage level-of-theory descriptor
//! - [`ledger`] - Pipeline stages with their energy and file-path ledgers
//! - [`conformer`] - Screening and post-screening conformer records
//! - [`job`] - Screening and post-screening job records and the record factory
//!
//! ## Usage
//!
//! ```ignore
//! use acs::core::models::job::{new_job_record, RecordVariant, JobRecord};
//!
//! let JobRecord::Screening(mut job) = new_job_record(RecordVariant::InitialScreening) else {
//!     unreachable!()
//! };
//! job.project = Some("ethanol".to_string());
//! ```

pub mod conformer;
pub mod geometry;
pub mod ids;
pub mod job;
pub mod ledger;
pub mod species;
pub mod theory;
