//! SQLite settings store
//!
//! One row per setting, the value stored as JSON text. A save replaces all
//! rows inside a single transaction.

use std::path::Path;

use async_trait::async_trait;
use sqlx::{
	Row,
	sqlite::{self, SqlitePool},
};

use pbxadmin::{
	prelude::*,
	settings_store::{SettingsStore, StoredSetting, StoredSettings},
};

mod schema;

fn inspect(err: &sqlx::Error) {
	warn!("DB: {:#?}", err);
}

fn db_err(err: &sqlx::Error) -> Error {
	Error::StorageUnavailable(format!("settings database: {}", err))
}

#[derive(Debug)]
pub struct SettingsAdapterSqlite {
	db: SqlitePool,
}

impl SettingsAdapterSqlite {
	pub async fn new(path: impl AsRef<Path>) -> ClResult<Self> {
		if let Some(dir) = path.as_ref().parent()
			&& !dir.as_os_str().is_empty()
		{
			tokio::fs::create_dir_all(dir).await?;
		}

		let opts = sqlite::SqliteConnectOptions::new()
			.filename(path.as_ref())
			.create_if_missing(true)
			.journal_mode(sqlite::SqliteJournalMode::Wal);
		let db = sqlite::SqlitePoolOptions::new()
			.max_connections(5)
			.connect_with(opts)
			.await
			.inspect_err(inspect)
			.map_err(|err| db_err(&err))?;

		schema::init_db(&db).await.inspect_err(inspect).map_err(|err| db_err(&err))?;

		Ok(Self { db })
	}
}

#[async_trait]
impl SettingsStore for SettingsAdapterSqlite {
	async fn load(&self) -> ClResult<StoredSettings> {
		let rows = sqlx::query("SELECT name, value FROM settings")
			.fetch_all(&self.db)
			.await
			.inspect_err(inspect)
			.map_err(|err| db_err(&err))?;

		let mut settings = StoredSettings::new();
		for row in rows {
			let name: String = row.try_get("name").map_err(|err| db_err(&err))?;
			let value: Option<String> = row.try_get("value").map_err(|err| db_err(&err))?;
			match value.as_deref().map(serde_json::from_str::<serde_json::Value>) {
				Some(Ok(value)) => {
					settings.insert(name, StoredSetting::new(value));
				}
				Some(Err(err)) => warn!("DB: skipping setting '{}' with invalid JSON: {}", name, err),
				None => debug!("DB: skipping setting '{}' without value", name),
			}
		}

		Ok(settings)
	}

	async fn save_atomic(&self, settings: &StoredSettings) -> ClResult<()> {
		let mut tx = self.db.begin().await.inspect_err(inspect).map_err(|err| db_err(&err))?;

		sqlx::query("DELETE FROM settings")
			.execute(&mut *tx)
			.await
			.inspect_err(inspect)
			.map_err(|err| db_err(&err))?;

		for (name, setting) in settings {
			sqlx::query("INSERT INTO settings (name, value) VALUES (?, ?)")
				.bind(name)
				.bind(setting.value.to_string())
				.execute(&mut *tx)
				.await
				.inspect_err(inspect)
				.map_err(|err| db_err(&err))?;
		}

		// Dropping an uncommitted transaction rolls it back
		tx.commit().await.inspect_err(inspect).map_err(|err| db_err(&err))?;

		info!("DB: saved {} settings", settings.len());
		Ok(())
	}
}

// vim: ts=4
