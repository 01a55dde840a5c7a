//! JSON file settings store
//!
//! The whole document lives in one file. Saves go to a temporary file in the
//! same directory which is synced and then renamed over the original, so a
//! reader sees either the old or the new document.
//!
//! A save runs in its own task that holds the write lock until the rename is
//! done. Dropping the `save_atomic` future doesn't abort a write half way or
//! let a later save overtake it.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::{
	fs::{File, create_dir_all, read, remove_file, rename},
	io::AsyncWriteExt,
	sync::Mutex,
};

use pbxadmin::{
	prelude::*,
	settings_store::{SettingsStore, StoredSettings},
};

mod extensions;

pub use extensions::ExtensionDirectoryFs;

fn storage_err(op: &str, path: &Path, err: impl std::fmt::Display) -> Error {
	warn!("FS: {} {:?}: {}", op, path, err);
	Error::StorageUnavailable(format!("cannot {} {}: {}", op, path.display(), err))
}

/// Temporary file next to `path`, so the final rename stays on one filesystem
fn tmp_file_path(path: &Path) -> PathBuf {
	let name = path.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default();
	path.with_file_name(format!(".{}.tmp-{}", name, uuid::Uuid::new_v4().simple()))
}

#[derive(Debug)]
pub struct SettingsAdapterFs {
	path: Box<Path>,
	write_lock: Arc<Mutex<()>>,
}

impl SettingsAdapterFs {
	/// Store backed by the JSON file at `path`. The parent directory is created
	/// if needed, the file itself on first save.
	pub async fn new(path: impl Into<PathBuf>) -> ClResult<Self> {
		let path: PathBuf = path.into();
		if let Some(dir) = path.parent()
			&& !dir.as_os_str().is_empty()
		{
			create_dir_all(dir).await.map_err(|err| storage_err("create", dir, err))?;
		}
		Ok(Self { path: path.into_boxed_path(), write_lock: Arc::new(Mutex::new(())) })
	}

	pub fn path(&self) -> &Path {
		&self.path
	}
}

async fn write_tmp(path: &Path, tmp_path: &Path, data: &[u8]) -> std::io::Result<()> {
	let mut file = File::create(tmp_path).await?;
	file.write_all(data).await?;
	file.sync_all().await?;
	rename(tmp_path, path).await?;

	sync_parent_dir(path).await
}

async fn replace_file(path: &Path, data: &[u8]) -> ClResult<()> {
	let tmp_path = tmp_file_path(path);
	if let Err(err) = write_tmp(path, &tmp_path, data).await {
		if let Err(rm_err) = remove_file(&tmp_path).await
			&& rm_err.kind() != std::io::ErrorKind::NotFound
		{
			warn!("FS: cannot remove {:?}: {}", tmp_path, rm_err);
		}
		return Err(storage_err("write", path, err));
	}
	Ok(())
}

/// Persist a rename by syncing the containing directory
#[cfg(unix)]
async fn sync_parent_dir(path: &Path) -> std::io::Result<()> {
	match path.parent() {
		Some(dir) if !dir.as_os_str().is_empty() => File::open(dir).await?.sync_all().await,
		_ => Ok(()),
	}
}

#[cfg(not(unix))]
async fn sync_parent_dir(_path: &Path) -> std::io::Result<()> {
	Ok(())
}

#[async_trait]
impl SettingsStore for SettingsAdapterFs {
	async fn load(&self) -> ClResult<StoredSettings> {
		let data = match read(&self.path).await {
			Ok(data) => data,
			Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
				debug!("FS: {:?} does not exist yet, starting empty", self.path);
				return Ok(StoredSettings::new());
			}
			Err(err) => return Err(storage_err("read", &self.path, err)),
		};
		if data.iter().all(u8::is_ascii_whitespace) {
			return Ok(StoredSettings::new());
		}
		serde_json::from_slice(&data).map_err(|err| storage_err("parse", &self.path, err))
	}

	async fn save_atomic(&self, settings: &StoredSettings) -> ClResult<()> {
		let data = serde_json::to_vec_pretty(settings)
			.map_err(|err| storage_err("serialize", &self.path, err))?;

		// Taken before spawning, so saves land in the order they were called
		let guard = Arc::clone(&self.write_lock).lock_owned().await;
		let path = self.path.to_path_buf();
		let count = settings.len();
		let task = tokio::spawn(async move {
			let _guard = guard;
			let res = replace_file(&path, &data).await;
			if res.is_ok() {
				info!("FS: saved {} settings to {:?}", count, path);
			}
			res
		});

		task.await.map_err(|err| storage_err("write", &self.path, err))?
	}
}


// vim: ts=4
