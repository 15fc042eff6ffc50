//! Domain model for templates, parsed notes, reports and statistics.
//!
//! # Responsibility
//! - Define canonical data structures shared by every pipeline stage.
//! - Keep configuration (templates) separate from per-call values.
//!
//! # Invariants
//! - Templates are read-only once built.
//! - Parsed notes and reports are owned by a single call.

pub mod note;
pub mod report;
pub mod stats;
pub mod template;
