//! Provides persistence for job records and geometry text.
//!
//! Records are stored as pretty-printed JSON documents whose shape mirrors the record
//! structs field for field. A project folder keeps an append-only series of numbered
//! revisions so earlier pipeline states are never overwritten. The xyz module converts
//! between the plain `xyz_str` text and the structured `arc_xyz` form.

pub mod record;
pub mod revisions;
pub mod traits;
pub mod xyz;
