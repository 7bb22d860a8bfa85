//! # Workflows Module
//!
//! Multi-record procedures over job records, the entry points used by drivers and
//! the command-line tool.
//!
//! ## Overview
//!
//! A screening job is usually too large to run as one batch. It is split by dihedral
//! subsets into partition files that are screened independently, merged back once
//! every partition is done, and the screened survivors are promoted into a
//! post-screening job for optimization.
//!
//! ## Architecture
//!
//! - **Partitioning** ([`partition`]) - Splitting a screening job by dihedral subsets and merging the parts
//! - **Promotion** ([`promote`]) - Selecting screened conformers into a post-screening job
//! - **Error Handling** ([`error`]) - Workflow-level errors

pub mod error;
pub mod partition;
pub mod promote;
