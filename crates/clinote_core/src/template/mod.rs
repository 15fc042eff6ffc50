//! Template registry and definitions.
//!
//! # Responsibility
//! - Provide the built-in clinical templates (SOAP, H&P, discharge summary).
//! - Resolve template names or inline definitions to section schemas.
//!
//! # Invariants
//! - `DEFAULT_TEMPLATE_ID` never changes within a process lifetime.
//! - Schema semantics are versioned by `TEMPLATE_SCHEMA_VERSION`.

pub mod builtin;
pub mod definition;
pub mod registry;

/// Version of the template schema contract (fields and matching rules).
pub const TEMPLATE_SCHEMA_VERSION: u32 = 1;
