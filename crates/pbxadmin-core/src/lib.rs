//! Settings registry engine for pbxadmin.
//!
//! Holds the immutable schema of known settings, resolves effective values
//! against the injected [`SettingsStore`](pbxadmin_types::settings_store::SettingsStore),
//! validates and applies batch updates, and exposes the HTTP handlers the
//! application crate mounts.

#![deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![forbid(unsafe_code)]

pub mod app;
pub mod core_settings;
pub mod prelude;
pub mod settings;

pub use app::{App, AppBuilderOpts, AppState, VERSION};

pub fn register_settings(
	registry: &mut settings::SettingsRegistry,
) -> pbxadmin_types::error::ClResult<()> {
	core_settings::register_settings(registry)
}

// vim: ts=4
