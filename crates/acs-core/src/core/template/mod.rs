//! Batch-submission script rendering.
//!
//! The pipeline submits each calculation stage as a SLURM job array in which task
//! `i` runs the Gaussian input named `<i>_*.gjf` in the submission directory.

pub mod slurm;
