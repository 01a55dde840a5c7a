//! Settings management handlers

use axum::{
	Json,
	extract::{Path, State, rejection::JsonRejection},
	http::StatusCode,
	response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::prelude::*;
use crate::settings::types::{CategorizedSettings, SettingError, SettingView};
use crate::settings::usage::ExtensionRangeUsage;

/// Response for GET /settings
#[derive(Serialize)]
pub struct ListSettingsResponse {
	pub success: bool,
	pub categories: CategorizedSettings,
}

/// Response for a single setting with metadata
#[derive(Serialize)]
pub struct SettingResponse {
	pub key: String,
	pub category: String,
	#[serde(flatten)]
	pub view: SettingView,
}

#[derive(Serialize)]
pub struct UpdateSettingsResponse {
	pub success: bool,
	pub applied: BTreeSet<String>,
	pub errors: BTreeMap<String, SettingError>,
}

#[derive(Serialize)]
pub struct ResetSettingsResponse {
	pub success: bool,
	pub message: &'static str,
}

/// One submitted value, either `{value, type}` or the bare value
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum SettingInput {
	Typed {
		value: serde_json::Value,
		/// Informational only, the registry's declared type wins
		#[serde(rename = "type", default)]
		declared_type: Option<serde_json::Value>,
	},
	Bare(serde_json::Value),
}

impl SettingInput {
	fn into_value(self, key: &str) -> serde_json::Value {
		match self {
			SettingInput::Typed { value, declared_type } => {
				if let Some(t) = declared_type {
					debug!("Setting '{}' submitted with client type '{}'", key, t);
				}
				value
			}
			SettingInput::Bare(value) => value,
		}
	}
}

/// Body of POST /settings
#[derive(Debug, Deserialize)]
#[serde(tag = "action", rename_all = "lowercase")]
pub enum SettingsAction {
	Update { settings: BTreeMap<String, SettingInput> },
	Reset { confirm: Option<serde_json::Value> },
}

/// GET /settings - All settings grouped by category
pub async fn list_settings(
	State(app): State<App>,
) -> ClResult<(StatusCode, Json<ListSettingsResponse>)> {
	let categories = app.settings.get_all_by_category().await?;
	Ok((StatusCode::OK, Json(ListSettingsResponse { success: true, categories })))
}

/// GET /settings/{key} - Get a specific setting with metadata
pub async fn get_setting(
	State(app): State<App>,
	Path(key): Path<String>,
) -> ClResult<(StatusCode, Json<SettingResponse>)> {
	let (def, view) = app.settings.view(&key).await?;
	let response = SettingResponse { key: def.key.clone(), category: def.category.clone(), view };
	Ok((StatusCode::OK, Json(response)))
}

/// POST /settings - Update settings or reset them to defaults
///
/// Validation failures are reported per key with 200, only storage failures
/// fail the request.
pub async fn post_settings(
	State(app): State<App>,
	payload: Result<Json<SettingsAction>, JsonRejection>,
) -> ClResult<Response> {
	let Json(action) = payload.map_err(|err| {
		debug!("Rejecting settings request body: {}", err);
		Error::ValidationError(err.body_text())
	})?;
	match action {
		SettingsAction::Update { settings } => {
			let changes = settings.into_iter().map(|(key, input)| {
				let value = input.into_value(&key);
				(key, value)
			});
			let outcome = app.settings.update(changes).await?;
			if !outcome.is_complete() {
				info!("Settings update rejected keys: {:?}", outcome.errors.keys());
			}
			let response = UpdateSettingsResponse {
				success: outcome.is_complete(),
				applied: outcome.applied,
				errors: outcome.errors,
			};
			Ok((StatusCode::OK, Json(response)).into_response())
		}
		SettingsAction::Reset { confirm } => {
			if confirm.as_ref().and_then(serde_json::Value::as_str) != Some("yes") {
				warn!("Settings reset requested without confirmation");
				return Err(Error::ValidationError("reset requires confirm=\"yes\"".into()));
			}
			app.settings.reset_to_defaults().await?;
			let response =
				ResetSettingsResponse { success: true, message: "Settings reset to defaults" };
			Ok((StatusCode::OK, Json(response)).into_response())
		}
	}
}

/// GET /settings/extension-usage - Usage of the configured extension range
pub async fn get_extension_usage(
	State(app): State<App>,
) -> ClResult<(StatusCode, Json<ExtensionRangeUsage>)> {
	let usage = app.settings.extension_range_usage(app.extension_directory.as_ref()).await?;
	Ok((StatusCode::OK, Json(usage)))
}

// vim: ts=4
