//! Shared types, adapter traits, and error types for pbxadmin.
//!
//! This crate holds everything the settings engine and the storage adapters
//! have in common, so adapter crates don't depend on the engine itself.

pub mod error;
pub mod extension_directory;
pub mod mem_store;
pub mod prelude;
pub mod settings_store;

// vim: ts=4
