//! Settings store concurrency tests
//!
//! Concurrent saves must leave one complete document, never a mix

use std::sync::Arc;
use std::time::Duration;

use pbxadmin_settings_adapter_fs::SettingsAdapterFs;
use pbxadmin::settings_store::{SettingsStore, StoredSetting, StoredSettings};
use serde_json::json;
use tempfile::TempDir;

fn doc(writer: usize) -> StoredSettings {
	(0..20)
		.map(|i| (format!("key_{}", i), StoredSetting::new(json!(writer))))
		.collect()
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_saves_are_not_interleaved() {
	let temp_dir = TempDir::new().expect("Failed to create temp directory");
	let adapter = Arc::new(
		SettingsAdapterFs::new(temp_dir.path().join("settings.json"))
			.await
			.expect("Failed to create adapter"),
	);

	let mut handles = vec![];
	for writer in 0..8 {
		let adapter = Arc::clone(&adapter);
		handles.push(tokio::spawn(async move {
			adapter.save_atomic(&doc(writer)).await.expect("Failed to save");
		}));
	}
	for handle in handles {
		handle.await.expect("Task panicked");
	}

	let loaded = adapter.load().await.expect("Failed to load");
	assert_eq!(loaded.len(), 20);
	let first = loaded.values().next().map(|s| s.value.clone()).expect("Empty document");
	assert!(loaded.values().all(|s| s.value == first), "document mixes writers: {:?}", loaded);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_reads_during_writes_see_whole_documents() {
	let temp_dir = TempDir::new().expect("Failed to create temp directory");
	let adapter = Arc::new(
		SettingsAdapterFs::new(temp_dir.path().join("settings.json"))
			.await
			.expect("Failed to create adapter"),
	);
	adapter.save_atomic(&doc(0)).await.expect("Failed to save initial document");

	let writer = {
		let adapter = Arc::clone(&adapter);
		tokio::spawn(async move {
			for i in 1..20 {
				adapter.save_atomic(&doc(i)).await.expect("Failed to save");
			}
		})
	};

	for _ in 0..50 {
		let loaded = adapter.load().await.expect("Read saw a partial document");
		assert_eq!(loaded.len(), 20);
	}
	writer.await.expect("Writer panicked");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_cancelled_save_does_not_overtake_later_save() {
	let temp_dir = TempDir::new().expect("Failed to create temp directory");
	let adapter = SettingsAdapterFs::new(temp_dir.path().join("settings.json"))
		.await
		.expect("Failed to create adapter");

	for round in 0..20 {
		// Give up on the first save right away, the write itself keeps going
		let _ = tokio::time::timeout(Duration::ZERO, adapter.save_atomic(&doc(1))).await;
		adapter.save_atomic(&doc(2)).await.expect("Failed to save");

		tokio::time::sleep(Duration::from_millis(20)).await;
		let loaded = adapter.load().await.expect("Failed to load");
		assert_eq!(loaded, doc(2), "round {}: an abandoned save landed last", round);
	}

	let leftovers: Vec<_> = std::fs::read_dir(temp_dir.path())
		.expect("Failed to list directory")
		.filter_map(Result::ok)
		.filter(|entry| entry.file_name().to_string_lossy().contains(".tmp-"))
		.collect();
	assert!(leftovers.is_empty(), "temporary files left behind: {:?}", leftovers);
}

// vim: ts=4
