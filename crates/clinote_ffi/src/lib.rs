//! Flutter-facing bindings for clinote.

pub mod api;
