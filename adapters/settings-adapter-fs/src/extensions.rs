//! Extension directory backed by a JSON file
//!
//! Accepts the shapes the flat-file extension databases come in:
//! - an array of numbers or strings: `[2001, "2002"]`
//! - an array of records with an `extension` (or `number`) field
//! - an object keyed by extension number: `{"2001": {...}}`
//!
//! The file is read on every call, a missing file means no extension is used.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde_json::Value;

use pbxadmin::{extension_directory::ExtensionDirectory, prelude::*};

fn extension_id(value: &Value) -> Option<String> {
	match value {
		Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
		Value::Number(n) => Some(n.to_string()),
		Value::Object(record) => {
			record.get("extension").or_else(|| record.get("number")).and_then(extension_id)
		}
		_ => None,
	}
}

pub(crate) fn parse_extensions(doc: &Value) -> Option<HashSet<String>> {
	match doc {
		Value::Array(items) => Some(items.iter().filter_map(extension_id).collect()),
		Value::Object(map) => Some(map.keys().map(|k| k.trim().to_string()).collect()),
		_ => None,
	}
}

#[derive(Debug)]
pub struct ExtensionDirectoryFs {
	path: Box<Path>,
}

impl ExtensionDirectoryFs {
	pub fn new(path: impl Into<PathBuf>) -> Self {
		Self { path: path.into().into_boxed_path() }
	}
}

#[async_trait]
impl ExtensionDirectory for ExtensionDirectoryFs {
	async fn used_extensions(&self) -> ClResult<HashSet<String>> {
		let data = match tokio::fs::read(&self.path).await {
			Ok(data) => data,
			Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
				debug!("FS: extension list {:?} not found", self.path);
				return Ok(HashSet::new());
			}
			Err(err) => {
				warn!("FS: read {:?}: {}", self.path, err);
				return Err(Error::StorageUnavailable(format!(
					"cannot read extension list {}: {}",
					self.path.display(),
					err
				)));
			}
		};

		let doc: Value = serde_json::from_slice(&data).map_err(|err| {
			warn!("FS: parse {:?}: {}", self.path, err);
			Error::StorageUnavailable(format!("invalid extension list {}", self.path.display()))
		})?;
		parse_extensions(&doc).ok_or_else(|| {
			Error::StorageUnavailable(format!(
				"extension list {} must be an array or an object",
				self.path.display()
			))
		})
	}
}

#[cfg(test)]
mod test {
	use super::*;
	use serde_json::json;

	#[test]
	fn test_parse_shapes() {
		let ids = parse_extensions(&json!([2001, "2002", { "extension": "2003" }, { "number": 2004 }, null]))
			.unwrap_or_default();
		let mut ids: Vec<_> = ids.into_iter().collect();
		ids.sort();
		assert_eq!(ids, vec!["2001", "2002", "2003", "2004"]);

		let ids = parse_extensions(&json!({ "2001": { "name": "Front desk" }, "2002": {} }))
			.unwrap_or_default();
		assert_eq!(ids.len(), 2);
		assert!(ids.contains("2001"));

		assert!(parse_extensions(&json!("2001")).is_none());
	}
}

// vim: ts=4
