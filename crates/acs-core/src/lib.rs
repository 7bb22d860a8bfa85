//! # ACS Core Library
//!
//! Typed state records for automated conformer sampling (ACS): the job and conformer
//! schemas persisted between the stages of a screening → optimization → single-point
//! → solvation pipeline, together with the rules that keep those records consistent.
//!
//! ## Architectural Philosophy
//!
//! The library follows a strict three-layer architecture:
//!
//! - **[`core`]: The Foundation.** Stateless record types (`ScreeningJob`,
//!   `PostScreeningJob` and their conformers), JSON persistence with append-only
//!   revisions, xyz geometry conversion and the batch-submission template.
//!
//! - **[`engine`]: The Logic Core.** The conformer classification state machine,
//!   guarded stage bookkeeping on job records, and invariant validation.
//!
//! - **[`workflows`]: The Public API.** Multi-record procedures: splitting a screening
//!   job into dihedral partitions, merging partitions back, and promoting screening
//!   survivors into a post-screening job.
//!
//! Quantum-chemistry execution, collision detection, graph isomorphism and the batch
//! scheduler are external collaborators; their verdicts enter the records as data.

pub mod core;
pub mod engine;
pub mod workflows;
