//! Flutter-facing bindings for the contact book core.

pub mod api;
