//! # Engine Module
//!
//! The rules that move conformers through the sampling pipeline and keep job records
//! consistent while they do.
//!
//! ## Overview
//!
//! A conformer's fate is tracked twice in a record: by the outcome set its hash id
//! sits in, and by the flags and energies on the conformer itself. The engine owns
//! every mutation of either, so the two never disagree. External tools (quantum
//! chemistry, collision detection, isomorphism checks) report their results as
//! plain values; the engine only decides what those values mean for the record.
//!
//! ## Architecture
//!
//! - **State Machine** ([`state`]) - Conformer states and the legal transitions between them
//! - **Lifecycle** ([`lifecycle`]) - Guarded operations on job records that perform transitions
//! - **Classification** ([`classify`]) - Final verdict from isomorphism and frequency data
//! - **Selection** ([`selection`]) - Policies choosing which screened conformers get optimized
//! - **Validation** ([`validation`]) - Whole-record invariant checks
//! - **Configuration** ([`config`]) - Parameters for promoting a screening job
//! - **Error Handling** ([`error`]) - Engine-specific error types

pub mod classify;
pub mod config;
pub mod error;
pub mod lifecycle;
pub mod selection;
pub mod state;
pub mod validation;
