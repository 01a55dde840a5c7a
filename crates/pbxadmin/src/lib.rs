//! pbxadmin serves the PBX settings registry over HTTP.
//!
//! # Features
//!
//! - Typed settings grouped by category (general, extensions, security,
//!   voicemail, provisioning, backup)
//! - Batch updates with per-key validation errors and atomic persistence
//! - Reset to defaults
//! - Extension range usage derived from the range settings
//! - JSON file or SQLite storage

#![forbid(unsafe_code)]

pub mod app;
pub mod config;
pub mod prelude;
pub mod routes;

pub use crate::app::AppBuilder;
pub use crate::config::{Config, StoreKind};
pub use pbxadmin_core::{App, AppState};

// vim: ts=4
