//! App state type

use std::sync::Arc;
use std::time::Duration;

use pbxadmin_types::extension_directory::ExtensionDirectory;

use crate::settings::service::SettingsService;
use crate::settings::types::FrozenSettingsRegistry;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub struct AppState {
	pub opts: AppBuilderOpts,

	// Settings subsystem
	pub settings: Arc<SettingsService>,
	pub settings_registry: Arc<FrozenSettingsRegistry>,

	pub extension_directory: Arc<dyn ExtensionDirectory>,
}

pub type App = Arc<AppState>;

#[derive(Debug, Clone)]
pub struct AppBuilderOpts {
	pub listen: Box<str>,
	/// Upper bound for a single settings store call
	pub store_timeout: Duration,
}

impl Default for AppBuilderOpts {
	fn default() -> Self {
		Self { listen: "127.0.0.1:8080".into(), store_timeout: Duration::from_secs(5) }
	}
}

// vim: ts=4
