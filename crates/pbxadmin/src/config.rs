//! Runtime configuration from environment variables

use std::path::PathBuf;
use std::time::Duration;

use crate::prelude::*;

pub const ENV_LISTEN: &str = "PBXADMIN_LISTEN";
pub const ENV_DATA_DIR: &str = "PBXADMIN_DATA_DIR";
pub const ENV_STORE: &str = "PBXADMIN_STORE";
pub const ENV_EXTENSIONS_FILE: &str = "PBXADMIN_EXTENSIONS_FILE";
pub const ENV_STORE_TIMEOUT_MS: &str = "PBXADMIN_STORE_TIMEOUT_MS";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreKind {
	/// JSON document in `<data_dir>/settings.json`
	Fs,
	/// SQLite database in `<data_dir>/settings.db`
	Sqlite,
}

impl std::str::FromStr for StoreKind {
	type Err = Error;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.trim().to_ascii_lowercase().as_str() {
			"fs" | "file" | "json" => Ok(StoreKind::Fs),
			"sqlite" => Ok(StoreKind::Sqlite),
			other => Err(Error::ConfigError(format!("unknown store kind '{}'", other))),
		}
	}
}

#[derive(Debug, Clone)]
pub struct Config {
	pub listen: Box<str>,
	pub data_dir: PathBuf,
	pub store: StoreKind,
	/// JSON file listing the extensions in use
	pub extensions_file: Option<PathBuf>,
	pub store_timeout: Duration,
}

impl Default for Config {
	fn default() -> Self {
		Self {
			listen: "127.0.0.1:8080".into(),
			data_dir: PathBuf::from("./data"),
			store: StoreKind::Fs,
			extensions_file: None,
			store_timeout: Duration::from_secs(5),
		}
	}
}

impl Config {
	pub fn from_env() -> ClResult<Self> {
		Self::from_lookup(|name| std::env::var(name).ok())
	}

	/// Build a config from an arbitrary variable source. Unset or empty
	/// variables keep their defaults.
	pub fn from_lookup<F>(lookup: F) -> ClResult<Self>
	where
		F: Fn(&str) -> Option<String>,
	{
		let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
		let mut config = Config::default();

		if let Some(listen) = get(ENV_LISTEN) {
			config.listen = listen.into();
		}
		if let Some(dir) = get(ENV_DATA_DIR) {
			config.data_dir = PathBuf::from(dir);
		}
		if let Some(store) = get(ENV_STORE) {
			config.store = store.parse()?;
		}
		config.extensions_file = get(ENV_EXTENSIONS_FILE).map(PathBuf::from);
		if let Some(ms) = get(ENV_STORE_TIMEOUT_MS) {
			let ms: u64 = ms.trim().parse().map_err(|_| {
				Error::ConfigError(format!("{} must be a number of milliseconds", ENV_STORE_TIMEOUT_MS))
			})?;
			if ms == 0 {
				return Err(Error::ConfigError(format!("{} must be positive", ENV_STORE_TIMEOUT_MS)));
			}
			config.store_timeout = Duration::from_millis(ms);
		}

		Ok(config)
	}

	pub fn settings_path(&self) -> PathBuf {
		match self.store {
			StoreKind::Fs => self.data_dir.join("settings.json"),
			StoreKind::Sqlite => self.data_dir.join("settings.db"),
		}
	}
}


// vim: ts=4
