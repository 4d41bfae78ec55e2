//! Core use-case services.
//!
//! # Responsibility
//! - Own the in-memory collections and route every mutation through
//!   persistence.
//! - Keep FFI/CLI layers decoupled from storage details.

pub mod contact_store;
