//! Settings service with caching, validation, and atomic persistence

use parking_lot::RwLock;
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, OwnedMutexGuard};

use pbxadmin_types::extension_directory::ExtensionDirectory;
use pbxadmin_types::settings_store::{SettingsStore, StoredSetting, StoredSettings};

use crate::prelude::*;

use super::types::{
	CategorizedSettings, FrozenSettingsRegistry, SettingDefinition, SettingError, SettingValue,
	SettingView, UpdateOutcome,
};
use super::usage::{ExtensionRangeUsage, compute_extension_range_usage};

pub const RANGE_START_KEY: &str = "range_start";
pub const RANGE_END_KEY: &str = "range_end";

/// Last committed settings document
///
/// Only replaced while the writer lock is held, so a slow load can't
/// overwrite a newer commit.
#[derive(Default)]
pub struct SettingsCache {
	current: RwLock<Option<Arc<StoredSettings>>>,
}

impl SettingsCache {
	pub fn get(&self) -> Option<Arc<StoredSettings>> {
		self.current.read().clone()
	}

	fn put(&self, settings: Arc<StoredSettings>) {
		*self.current.write() = Some(settings);
	}

	pub fn clear(&self) {
		*self.current.write() = None;
	}
}

/// Settings service - main interface for reading and changing settings
pub struct SettingsService {
	registry: Arc<FrozenSettingsRegistry>,
	store: Arc<dyn SettingsStore>,
	cache: Arc<SettingsCache>,
	write_lock: Arc<Mutex<()>>,
	store_timeout: Duration,
}

impl SettingsService {
	pub fn new(
		registry: Arc<FrozenSettingsRegistry>,
		store: Arc<dyn SettingsStore>,
		store_timeout: Duration,
	) -> Self {
		Self {
			registry,
			store,
			cache: Arc::new(SettingsCache::default()),
			write_lock: Arc::new(Mutex::new(())),
			store_timeout,
		}
	}

	/// Get reference to registry (for listing all settings)
	pub fn registry(&self) -> &Arc<FrozenSettingsRegistry> {
		&self.registry
	}

	/// Drop the cached document so the next read goes to the store
	pub fn invalidate_cache(&self) {
		self.cache.clear();
	}

	fn storage_error(op: &str, err: Error) -> Error {
		match err {
			Error::StorageUnavailable(msg) => Error::StorageUnavailable(msg),
			err => {
				warn!("Settings store {} failed: {}", op, err);
				Error::StorageUnavailable(err.to_string())
			}
		}
	}

	async fn with_timeout<T>(
		&self,
		op: &str,
		fut: impl Future<Output = ClResult<T>>,
	) -> ClResult<T> {
		match tokio::time::timeout(self.store_timeout, fut).await {
			Ok(res) => res.map_err(|err| Self::storage_error(op, err)),
			Err(_) => {
				warn!("Settings store {} timed out after {:?}", op, self.store_timeout);
				Err(Error::StorageUnavailable(format!("settings store {} timed out", op)))
			}
		}
	}

	/// Writer lock. A save that outlived its caller still holds it.
	async fn lock_writer(&self) -> ClResult<OwnedMutexGuard<()>> {
		let lock = Arc::clone(&self.write_lock).lock_owned();
		tokio::time::timeout(self.store_timeout, lock).await.map_err(|_| {
			warn!("Settings store still busy after {:?}", self.store_timeout);
			Error::StorageUnavailable("settings store busy".into())
		})
	}

	/// Current document. Caller must hold the writer lock.
	async fn current_locked(&self) -> ClResult<Arc<StoredSettings>> {
		if let Some(settings) = self.cache.get() {
			return Ok(settings);
		}
		let loaded = Arc::new(self.with_timeout("load", self.store.load()).await?);
		self.cache.put(loaded.clone());
		Ok(loaded)
	}

	async fn snapshot(&self) -> ClResult<Arc<StoredSettings>> {
		if let Some(settings) = self.cache.get() {
			debug!("Settings cache hit");
			return Ok(settings);
		}
		let _guard = self.lock_writer().await?;
		self.current_locked().await
	}

	/// Save `settings` and make it the cached document
	///
	/// The save runs in its own task that owns the writer lock, so giving up
	/// after `store_timeout` doesn't cancel it. If it completes later the cache
	/// follows the store, and the next writer waits for it.
	async fn commit(&self, guard: OwnedMutexGuard<()>, settings: StoredSettings) -> ClResult<()> {
		let store = Arc::clone(&self.store);
		let cache = Arc::clone(&self.cache);
		let task = tokio::spawn(async move {
			let _guard = guard;
			let res = store.save_atomic(&settings).await;
			if res.is_ok() {
				cache.put(Arc::new(settings));
			}
			res
		});

		match tokio::time::timeout(self.store_timeout, task).await {
			Ok(Ok(res)) => res.map_err(|err| Self::storage_error("save", err)),
			Ok(Err(err)) => {
				error!("Settings save task failed: {}", err);
				Err(Error::StorageUnavailable("settings store save aborted".into()))
			}
			Err(_) => {
				warn!(
					"Settings store save timed out after {:?}, outcome unknown until it finishes",
					self.store_timeout
				);
				Err(Error::StorageUnavailable("settings store save timed out".into()))
			}
		}
	}

	fn effective(def: &SettingDefinition, stored: &StoredSettings) -> SettingValue {
		match stored.get(&def.key) {
			Some(entry) => def.decode_stored(&entry.value).unwrap_or_else(|| {
				warn!(
					"Ignoring persisted value for '{}' that doesn't match its schema: {}",
					def.key, entry.value
				);
				def.default.clone()
			}),
			None => def.default.clone(),
		}
	}

	/// All known settings grouped by category, with their effective values
	pub async fn get_all_by_category(&self) -> ClResult<CategorizedSettings> {
		let stored = self.snapshot().await?;
		let mut categories = CategorizedSettings::new();
		for def in self.registry.list() {
			let value = Self::effective(def, &stored);
			categories
				.entry(def.category.clone())
				.or_default()
				.insert(def.key.clone(), def.view(value));
		}
		Ok(categories)
	}

	/// Single setting with metadata
	pub async fn view(&self, key: &str) -> ClResult<(&SettingDefinition, SettingView)> {
		let def = self.registry.get(key).ok_or(Error::NotFound)?;
		let stored = self.snapshot().await?;
		Ok((def, def.view(Self::effective(def, &stored))))
	}

	/// Validate and apply a batch of untyped values
	///
	/// Invalid keys are reported per key and skipped. The valid rest is stored
	/// in one atomic write. Only a storage failure fails the call, and then
	/// nothing is applied. A save that timed out may still complete, in which
	/// case reads pick it up once it has.
	pub async fn update<I, K>(&self, changes: I) -> ClResult<UpdateOutcome>
	where
		I: IntoIterator<Item = (K, serde_json::Value)>,
		K: Into<String>,
	{
		let mut outcome = UpdateOutcome::default();
		let mut accepted: BTreeMap<String, SettingValue> = BTreeMap::new();

		for (key, raw) in changes {
			let key: String = key.into();
			let Some(def) = self.registry.get(&key) else {
				debug!("Rejecting unknown setting '{}'", key);
				outcome.errors.insert(key, SettingError::UnknownKey);
				continue;
			};
			match def.coerce(&raw) {
				Ok(value) => {
					outcome.errors.remove(&key);
					accepted.insert(key, value);
				}
				Err(err) => {
					debug!("Rejecting value for '{}': {}", key, err);
					accepted.remove(&key);
					outcome.errors.insert(key, err);
				}
			}
		}

		if accepted.is_empty() {
			return Ok(outcome);
		}

		let guard = self.lock_writer().await?;
		let mut next = (*self.current_locked().await?).clone();
		for (key, value) in &accepted {
			next.insert(key.clone(), StoredSetting::new(value.to_json()));
		}
		self.commit(guard, next).await?;

		outcome.applied = accepted.into_keys().collect();
		info!(
			"Settings updated: {} applied, {} rejected",
			outcome.applied.len(),
			outcome.errors.len()
		);
		Ok(outcome)
	}

	/// Replace every persisted value with its default
	pub async fn reset_to_defaults(&self) -> ClResult<()> {
		let defaults: StoredSettings = self
			.registry
			.list()
			.map(|def| (def.key.clone(), StoredSetting::new(def.default.to_json())))
			.collect();

		let guard = self.lock_writer().await?;
		self.commit(guard, defaults).await?;

		info!("Settings reset to defaults ({} keys)", self.registry.len());
		Ok(())
	}

	/// Usage of the configured extension range given the used identifiers
	pub async fn compute_extension_range_usage(
		&self,
		used: &HashSet<String>,
	) -> ClResult<ExtensionRangeUsage> {
		let start = self.get_int(RANGE_START_KEY).await?;
		let end = self.get_int(RANGE_END_KEY).await?;
		let usage = compute_extension_range_usage(start, end, used.iter().map(String::as_str));
		if usage.warning.is_some() {
			warn!("Extension range {}..{} is empty", start, end);
		}
		Ok(usage)
	}

	/// Same as `compute_extension_range_usage`, asking `directory` for the used set
	pub async fn extension_range_usage(
		&self,
		directory: &dyn ExtensionDirectory,
	) -> ClResult<ExtensionRangeUsage> {
		let used = directory.used_extensions().await?;
		self.compute_extension_range_usage(&used).await
	}

	/// Effective value of a single setting
	pub async fn get(&self, key: &str) -> ClResult<SettingValue> {
		let def = self.registry.get(key).ok_or(Error::NotFound)?;
		let stored = self.snapshot().await?;
		Ok(Self::effective(def, &stored))
	}

	/// Type-safe getters
	pub async fn get_bool(&self, key: &str) -> ClResult<bool> {
		let value = self.get(key).await?;
		value.as_bool().ok_or_else(|| {
			Error::ValidationError(format!(
				"Setting '{}' is not a boolean, got {}",
				key,
				value.type_name()
			))
		})
	}

	pub async fn get_int(&self, key: &str) -> ClResult<i64> {
		let value = self.get(key).await?;
		value.as_int().ok_or_else(|| {
			Error::ValidationError(format!(
				"Setting '{}' is not an integer, got {}",
				key,
				value.type_name()
			))
		})
	}

	/// String or enum setting
	pub async fn get_string(&self, key: &str) -> ClResult<String> {
		let value = self.get(key).await?;
		value.as_str().map(str::to_owned).ok_or_else(|| {
			Error::ValidationError(format!(
				"Setting '{}' is not a string, got {}",
				key,
				value.type_name()
			))
		})
	}
}

// vim: ts=4
