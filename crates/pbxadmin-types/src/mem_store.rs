//! In-memory settings store
//!
//! Keeps the document behind a lock and swaps it whole on save. Used by tests
//! and by deployments that don't need persistence.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::prelude::*;
use crate::settings_store::{SettingsStore, StoredSettings};

#[derive(Debug, Default)]
pub struct MemorySettingsStore {
	data: RwLock<StoredSettings>,
	saves: AtomicUsize,
}

impl MemorySettingsStore {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_settings(settings: StoredSettings) -> Self {
		Self { data: RwLock::new(settings), saves: AtomicUsize::new(0) }
	}

	/// Copy of the current document
	pub fn snapshot(&self) -> StoredSettings {
		self.data.read().clone()
	}

	/// Number of successful `save_atomic` calls
	pub fn save_count(&self) -> usize {
		self.saves.load(Ordering::SeqCst)
	}
}

#[async_trait]
impl SettingsStore for MemorySettingsStore {
	async fn load(&self) -> ClResult<StoredSettings> {
		Ok(self.data.read().clone())
	}

	async fn save_atomic(&self, settings: &StoredSettings) -> ClResult<()> {
		*self.data.write() = settings.clone();
		self.saves.fetch_add(1, Ordering::SeqCst);
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::settings_store::StoredSetting;

	#[tokio::test]
	async fn test_save_replaces_whole_document() {
		let mut initial = StoredSettings::new();
		initial.insert("a".into(), StoredSetting::new(serde_json::json!(1)));
		initial.insert("b".into(), StoredSetting::new(serde_json::json!(2)));
		let store = MemorySettingsStore::with_settings(initial);

		let mut next = StoredSettings::new();
		next.insert("c".into(), StoredSetting::new(serde_json::json!(true)));
		store.save_atomic(&next).await.unwrap();

		let loaded = store.load().await.unwrap();
		assert_eq!(loaded, next);
		assert_eq!(store.save_count(), 1);
	}
}

// vim: ts=4
