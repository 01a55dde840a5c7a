//! App builder - constructs and runs the pbxadmin application

use std::sync::Arc;
use std::time::Duration;

use pbxadmin_core::settings::SettingsRegistry;
use pbxadmin_core::settings::service::SettingsService;
use pbxadmin_types::extension_directory::{ExtensionDirectory, StaticExtensionDirectory};
use pbxadmin_types::settings_store::SettingsStore;
use pbxadmin_settings_adapter_fs::{ExtensionDirectoryFs, SettingsAdapterFs};
use pbxadmin_settings_adapter_sqlite::SettingsAdapterSqlite;

use crate::config::{Config, StoreKind};
use crate::prelude::*;
use crate::routes;

pub use pbxadmin_core::app::{App, AppBuilderOpts, AppState, VERSION};

type RegisterFn = Box<dyn FnOnce(&mut SettingsRegistry) -> ClResult<()> + Send>;

/// Install the global tracing subscriber. Later calls are no-ops.
pub fn init_tracing() {
	let _ = tracing_subscriber::fmt()
		.with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
		.with_target(false)
		.try_init();
}

pub struct AppBuilder {
	opts: AppBuilderOpts,
	settings_store: Option<Arc<dyn SettingsStore>>,
	extension_directory: Option<Arc<dyn ExtensionDirectory>>,
	extra_settings: Vec<RegisterFn>,
}

impl AppBuilder {
	pub fn new() -> Self {
		init_tracing();
		AppBuilder {
			opts: AppBuilderOpts::default(),
			settings_store: None,
			extension_directory: None,
			extra_settings: Vec::new(),
		}
	}

	/// Builder with the adapters selected by `config`
	pub async fn from_config(config: &Config) -> ClResult<Self> {
		let mut builder = Self::new();
		builder.listen(config.listen.clone()).store_timeout(config.store_timeout);

		let path = config.settings_path();
		info!("Using {:?} settings store at {:?}", config.store, path);
		let store: Arc<dyn SettingsStore> = match config.store {
			StoreKind::Fs => Arc::new(SettingsAdapterFs::new(path).await?),
			StoreKind::Sqlite => Arc::new(SettingsAdapterSqlite::new(path).await?),
		};
		builder.settings_store(store);

		if let Some(file) = &config.extensions_file {
			info!("Reading used extensions from {:?}", file);
			builder.extension_directory(Arc::new(ExtensionDirectoryFs::new(file.clone())));
		}

		Ok(builder)
	}

	// Opts
	pub fn listen(&mut self, listen: impl Into<Box<str>>) -> &mut Self {
		self.opts.listen = listen.into();
		self
	}
	pub fn store_timeout(&mut self, timeout: Duration) -> &mut Self {
		self.opts.store_timeout = timeout;
		self
	}

	// Adapters
	pub fn settings_store(&mut self, store: Arc<dyn SettingsStore>) -> &mut Self {
		self.settings_store = Some(store);
		self
	}
	pub fn extension_directory(&mut self, directory: Arc<dyn ExtensionDirectory>) -> &mut Self {
		self.extension_directory = Some(directory);
		self
	}

	/// Register settings on top of the built-in schema
	pub fn register_settings<F>(&mut self, f: F) -> &mut Self
	where
		F: FnOnce(&mut SettingsRegistry) -> ClResult<()> + Send + 'static,
	{
		self.extra_settings.push(Box::new(f));
		self
	}

	pub fn build(self) -> ClResult<App> {
		let Some(settings_store) = self.settings_store else {
			error!("FATAL: No settings store configured");
			return Err(Error::Internal("No settings store configured".to_string()));
		};
		let extension_directory = self.extension_directory.unwrap_or_else(|| {
			warn!("No extension directory configured, extension usage will report none used");
			Arc::new(StaticExtensionDirectory::default())
		});

		// Initialize settings registry and service
		let mut settings_registry = SettingsRegistry::new();
		pbxadmin_core::register_settings(&mut settings_registry)?;
		for register in self.extra_settings {
			register(&mut settings_registry)?;
		}
		let settings_registry = Arc::new(settings_registry.freeze());
		let settings = Arc::new(SettingsService::new(
			settings_registry.clone(),
			settings_store,
			self.opts.store_timeout,
		));

		Ok(Arc::new(AppState { opts: self.opts, settings, settings_registry, extension_directory }))
	}

	pub async fn run(self) -> ClResult<()> {
		info!("pbxadmin V{}", VERSION);

		let app = self.build()?;
		// Fail early on an unreadable store instead of on the first request
		let categories = app.settings.get_all_by_category().await?;
		info!(
			"Loaded {} settings in {} categories",
			app.settings_registry.len(),
			categories.len()
		);

		let listener = tokio::net::TcpListener::bind(&*app.opts.listen).await.inspect_err(|err| {
			error!("FATAL: Cannot listen on {}: {}", app.opts.listen, err);
		})?;
		info!("Listening on {}", app.opts.listen);

		axum::serve(listener, routes::init(app))
			.with_graceful_shutdown(shutdown_signal())
			.await?;

		info!("Shutting down");
		Ok(())
	}
}

impl Default for AppBuilder {
	fn default() -> Self {
		Self::new()
	}
}

async fn shutdown_signal() {
	if let Err(err) = tokio::signal::ctrl_c().await {
		warn!("Cannot listen for shutdown signal: {}", err);
		std::future::pending::<()>().await;
	}
}

// vim: ts=4
