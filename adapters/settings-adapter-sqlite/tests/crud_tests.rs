//! SQLite settings store tests
//!
//! Tests load/save round trips and whole-document replacement

use std::sync::Arc;

use pbxadmin::settings_store::{SettingsStore, StoredSetting, StoredSettings};
use pbxadmin_settings_adapter_sqlite::SettingsAdapterSqlite;
use serde_json::json;
use tempfile::TempDir;

async fn create_test_adapter() -> (SettingsAdapterSqlite, TempDir) {
	let temp_dir = TempDir::new().expect("Failed to create temp directory");
	let adapter = SettingsAdapterSqlite::new(temp_dir.path().join("settings.db"))
		.await
		.expect("Failed to create adapter");
	(adapter, temp_dir)
}

fn doc(entries: &[(&str, serde_json::Value)]) -> StoredSettings {
	entries.iter().map(|(k, v)| ((*k).to_string(), StoredSetting::new(v.clone()))).collect()
}

#[tokio::test]
async fn test_new_database_is_empty() {
	let (adapter, _temp) = create_test_adapter().await;

	let loaded = adapter.load().await.expect("Failed to load");
	assert!(loaded.is_empty());
}

#[tokio::test]
async fn test_save_and_load() {
	let (adapter, _temp) = create_test_adapter().await;
	let settings = doc(&[
		("language", json!("de")),
		("max_login_attempts", json!(7)),
		("voicemail_enabled", json!(false)),
	]);

	adapter.save_atomic(&settings).await.expect("Failed to save");

	let loaded = adapter.load().await.expect("Failed to load");
	assert_eq!(loaded, settings);
}

#[tokio::test]
async fn test_save_replaces_all_rows() {
	let (adapter, _temp) = create_test_adapter().await;
	adapter
		.save_atomic(&doc(&[("a", json!(1)), ("b", json!(2))]))
		.await
		.expect("Failed to save first document");
	adapter.save_atomic(&doc(&[("b", json!(3))])).await.expect("Failed to save second document");

	let loaded = adapter.load().await.expect("Failed to load");
	assert_eq!(loaded, doc(&[("b", json!(3))]));
}

#[tokio::test]
async fn test_save_empty_document() {
	let (adapter, _temp) = create_test_adapter().await;
	adapter.save_atomic(&doc(&[("a", json!(1))])).await.expect("Failed to save");
	adapter.save_atomic(&StoredSettings::new()).await.expect("Failed to save empty document");

	assert!(adapter.load().await.expect("Failed to load").is_empty());
}

#[tokio::test]
async fn test_reopen_keeps_data() {
	let temp_dir = TempDir::new().expect("Failed to create temp directory");
	let path = temp_dir.path().join("db").join("settings.db");
	let settings = doc(&[("timezone", json!("Europe/Budapest"))]);

	{
		let adapter = SettingsAdapterSqlite::new(&path).await.expect("Failed to create adapter");
		adapter.save_atomic(&settings).await.expect("Failed to save");
	}

	let adapter = SettingsAdapterSqlite::new(&path).await.expect("Failed to reopen adapter");
	assert_eq!(adapter.load().await.expect("Failed to load"), settings);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_saves_are_not_interleaved() {
	let (adapter, _temp) = create_test_adapter().await;
	let adapter = Arc::new(adapter);

	let mut handles = vec![];
	for writer in 0..5 {
		let adapter = Arc::clone(&adapter);
		handles.push(tokio::spawn(async move {
			let settings: StoredSettings =
				(0..10).map(|i| (format!("key_{}", i), StoredSetting::new(json!(writer)))).collect();
			// SQLite may report the database as busy under contention
			let _ = adapter.save_atomic(&settings).await;
		}));
	}
	for handle in handles {
		handle.await.expect("Task panicked");
	}

	let loaded = adapter.load().await.expect("Failed to load");
	if let Some(first) = loaded.values().next() {
		assert_eq!(loaded.len(), 10);
		assert!(loaded.values().all(|s| s.value == first.value), "rows mix writers");
	}
}

// vim: ts=4
