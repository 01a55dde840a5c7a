//! Adapter trait for the durable settings document
//!
//! The store knows nothing about the schema. It persists one document keyed
//! by setting key, each entry holding the raw JSON value.

use std::collections::BTreeMap;
use std::fmt::Debug;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::prelude::*;

/// A single persisted entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredSetting {
	pub value: serde_json::Value,
}

impl StoredSetting {
	pub fn new(value: serde_json::Value) -> Self {
		Self { value }
	}
}

/// The whole persisted document, ordered by key
pub type StoredSettings = BTreeMap<String, StoredSetting>;

#[async_trait]
pub trait SettingsStore: Debug + Send + Sync {
	/// Loads the full document. A store that was never written returns an empty map.
	async fn load(&self) -> ClResult<StoredSettings>;

	/// Replaces the full document. Either the new document is stored completely
	/// or the previous one stays in place.
	async fn save_atomic(&self, settings: &StoredSettings) -> ClResult<()>;
}

// vim: ts=4
