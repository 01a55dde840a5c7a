//! Extension directory tests

use pbxadmin_settings_adapter_fs::ExtensionDirectoryFs;
use pbxadmin::error::Error;
use pbxadmin::extension_directory::ExtensionDirectory;
use tempfile::TempDir;

#[tokio::test]
async fn test_missing_file_means_nothing_used() {
	let temp_dir = TempDir::new().expect("Failed to create temp directory");
	let directory = ExtensionDirectoryFs::new(temp_dir.path().join("extensions.json"));

	let used = directory.used_extensions().await.expect("Failed to read extensions");
	assert!(used.is_empty());
}

#[tokio::test]
async fn test_reads_records() {
	let temp_dir = TempDir::new().expect("Failed to create temp directory");
	let path = temp_dir.path().join("extensions.json");
	std::fs::write(
		&path,
		r#"[{"extension": "2001", "name": "Reception"}, {"extension": 2002}, "2003"]"#,
	)
	.expect("Failed to write extensions");

	let directory = ExtensionDirectoryFs::new(&path);
	let used = directory.used_extensions().await.expect("Failed to read extensions");
	assert_eq!(used.len(), 3);
	assert!(used.contains("2002"));
}

#[tokio::test]
async fn test_rereads_on_every_call() {
	let temp_dir = TempDir::new().expect("Failed to create temp directory");
	let path = temp_dir.path().join("extensions.json");
	std::fs::write(&path, "[2001]").expect("Failed to write extensions");
	let directory = ExtensionDirectoryFs::new(&path);
	assert_eq!(directory.used_extensions().await.expect("Failed to read").len(), 1);

	std::fs::write(&path, "[2001, 2002]").expect("Failed to write extensions");
	assert_eq!(directory.used_extensions().await.expect("Failed to read").len(), 2);
}

#[tokio::test]
async fn test_invalid_file() {
	let temp_dir = TempDir::new().expect("Failed to create temp directory");
	let path = temp_dir.path().join("extensions.json");
	std::fs::write(&path, "42").expect("Failed to write extensions");

	let directory = ExtensionDirectoryFs::new(&path);
	assert!(matches!(directory.used_extensions().await, Err(Error::StorageUnavailable(_))));
}

// vim: ts=4
