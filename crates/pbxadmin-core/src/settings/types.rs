//! Settings types and definitions
//!
//! Core types for the settings registry: the value union, declared types,
//! constraints, per-key errors, definitions and the registry itself.

use serde::{Serialize, Serializer, ser::SerializeStruct};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt::{self, Debug};

use crate::prelude::*;

use super::coerce;

/// Type alias for setting validator function
///
/// Returns a human-readable reason on failure, reported as a constraint violation.
pub type SettingValidator = Box<dyn Fn(&SettingValue) -> Result<(), String> + Send + Sync>;

/// Declared type of a setting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SettingType {
	Boolean,
	Integer,
	String,
	Enum,
}

impl SettingType {
	pub fn as_str(&self) -> &'static str {
		match self {
			SettingType::Boolean => "boolean",
			SettingType::Integer => "integer",
			SettingType::String => "string",
			SettingType::Enum => "enum",
		}
	}
}

impl fmt::Display for SettingType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// Setting value types
///
/// Serialized without a tag, the declared type travels next to the value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum SettingValue {
	Bool(bool),
	Int(i64),
	String(String),
	Enum(String),
}

impl SettingValue {
	pub fn setting_type(&self) -> SettingType {
		match self {
			SettingValue::Bool(_) => SettingType::Boolean,
			SettingValue::Int(_) => SettingType::Integer,
			SettingValue::String(_) => SettingType::String,
			SettingValue::Enum(_) => SettingType::Enum,
		}
	}

	/// Get the type name for error messages
	pub fn type_name(&self) -> &'static str {
		self.setting_type().as_str()
	}

	pub fn to_json(&self) -> serde_json::Value {
		match self {
			SettingValue::Bool(b) => serde_json::Value::Bool(*b),
			SettingValue::Int(i) => serde_json::Value::from(*i),
			SettingValue::String(s) | SettingValue::Enum(s) => serde_json::Value::String(s.clone()),
		}
	}

	pub fn as_bool(&self) -> Option<bool> {
		match self {
			SettingValue::Bool(b) => Some(*b),
			_ => None,
		}
	}

	pub fn as_int(&self) -> Option<i64> {
		match self {
			SettingValue::Int(i) => Some(*i),
			_ => None,
		}
	}

	/// String contents of a string or enum value
	pub fn as_str(&self) -> Option<&str> {
		match self {
			SettingValue::String(s) | SettingValue::Enum(s) => Some(s),
			_ => None,
		}
	}
}

/// Declarative bounds, checked after coercion
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Constraints {
	#[serde(skip_serializing_if = "Option::is_none")]
	pub min: Option<i64>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub max: Option<i64>,
	/// Allowed values of an enum setting
	#[serde(skip_serializing_if = "Option::is_none")]
	pub options: Option<Vec<String>>,
	/// Maximum length of a string setting, in characters
	#[serde(skip_serializing_if = "Option::is_none")]
	pub max_len: Option<usize>,
}

impl Constraints {
	pub fn check(&self, value: &SettingValue) -> Result<(), String> {
		match value {
			SettingValue::Int(i) => {
				if let Some(min) = self.min
					&& *i < min
				{
					return Err(format!("{} is below the minimum of {}", i, min));
				}
				if let Some(max) = self.max
					&& *i > max
				{
					return Err(format!("{} is above the maximum of {}", i, max));
				}
			}
			SettingValue::Enum(s) => {
				if let Some(options) = &self.options
					&& !options.iter().any(|o| o == s)
				{
					return Err(format!("'{}' is not one of: {}", s, options.join(", ")));
				}
			}
			SettingValue::String(s) => {
				if let Some(max_len) = self.max_len
					&& s.chars().count() > max_len
				{
					return Err(format!("longer than {} characters", max_len));
				}
			}
			SettingValue::Bool(_) => {}
		}
		Ok(())
	}
}

/// Per-key rejection reason of an update
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SettingError {
	#[error("unknown setting")]
	UnknownKey,
	#[error("expected {expected}, got {got}")]
	TypeMismatch { expected: SettingType, got: &'static str },
	#[error("{0}")]
	ConstraintViolation(String),
}

impl SettingError {
	pub fn code(&self) -> &'static str {
		match self {
			SettingError::UnknownKey => "unknown_key",
			SettingError::TypeMismatch { .. } => "type_mismatch",
			SettingError::ConstraintViolation(_) => "constraint_violation",
		}
	}
}

impl Serialize for SettingError {
	fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		let mut st = serializer.serialize_struct("SettingError", 2)?;
		st.serialize_field("code", self.code())?;
		st.serialize_field("message", &self.to_string())?;
		st.end()
	}
}

/// Setting definition - defines metadata for each setting
pub struct SettingDefinition {
	/// Unique key (e.g., "range_start")
	pub key: String,

	/// Grouping label (e.g., "extensions")
	pub category: String,

	/// Human-readable description
	pub description: String,

	pub setting_type: SettingType,

	/// Value used when nothing valid is persisted, and after a reset
	pub default: SettingValue,

	pub constraints: Constraints,

	/// Optional validation function
	pub validator: Option<SettingValidator>,
}

impl Debug for SettingDefinition {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("SettingDefinition")
			.field("key", &self.key)
			.field("category", &self.category)
			.field("description", &self.description)
			.field("setting_type", &self.setting_type)
			.field("default", &self.default)
			.field("constraints", &self.constraints)
			.field("validator", &self.validator.is_some())
			.finish()
	}
}

impl SettingDefinition {
	/// Create a builder for constructing a SettingDefinition
	pub fn builder(key: impl Into<String>) -> SettingDefinitionBuilder {
		SettingDefinitionBuilder::new(key)
	}

	/// Check an already typed value against the declared type and constraints
	pub fn validate(&self, value: &SettingValue) -> Result<(), SettingError> {
		if value.setting_type() != self.setting_type {
			return Err(SettingError::TypeMismatch {
				expected: self.setting_type,
				got: value.type_name(),
			});
		}
		self.constraints.check(value).map_err(SettingError::ConstraintViolation)?;
		if let Some(validator) = &self.validator {
			validator(value).map_err(SettingError::ConstraintViolation)?;
		}
		Ok(())
	}

	/// Coerce an untyped input (e.g. a form field) and validate it
	pub fn coerce(&self, raw: &serde_json::Value) -> Result<SettingValue, SettingError> {
		let value = coerce::coerce(self.setting_type, raw)?;
		self.validate(&value)?;
		Ok(value)
	}

	/// Decode a persisted value. Returns `None` if it doesn't satisfy the schema.
	pub fn decode_stored(&self, raw: &serde_json::Value) -> Option<SettingValue> {
		let value = coerce::decode_stored(self.setting_type, raw)?;
		self.validate(&value).ok()?;
		Some(value)
	}

	pub fn view(&self, value: SettingValue) -> SettingView {
		SettingView {
			value,
			setting_type: self.setting_type,
			description: self.description.clone(),
			default: self.default.clone(),
			constraints: self.constraints.clone(),
		}
	}
}

/// Builder for SettingDefinition with fluent API
pub struct SettingDefinitionBuilder {
	key: String,
	category: Option<String>,
	description: Option<String>,
	default: Option<SettingValue>,
	constraints: Constraints,
	validator: Option<SettingValidator>,
}

impl SettingDefinitionBuilder {
	pub fn new(key: impl Into<String>) -> Self {
		Self {
			key: key.into(),
			category: None,
			description: None,
			default: None,
			constraints: Constraints::default(),
			validator: None,
		}
	}

	/// Set the category (required)
	pub fn category(mut self, category: impl Into<String>) -> Self {
		self.category = Some(category.into());
		self
	}

	pub fn description(mut self, description: impl Into<String>) -> Self {
		self.description = Some(description.into());
		self
	}

	/// Set the default value (required). Its variant determines the setting type.
	pub fn default(mut self, value: SettingValue) -> Self {
		self.default = Some(value);
		self
	}

	pub fn min(mut self, min: i64) -> Self {
		self.constraints.min = Some(min);
		self
	}

	pub fn max(mut self, max: i64) -> Self {
		self.constraints.max = Some(max);
		self
	}

	/// Allowed values of an enum setting
	pub fn options<I, S>(mut self, options: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.constraints.options = Some(options.into_iter().map(Into::into).collect());
		self
	}

	pub fn max_len(mut self, max_len: usize) -> Self {
		self.constraints.max_len = Some(max_len);
		self
	}

	/// Set a validation function
	pub fn validator<F>(mut self, f: F) -> Self
	where
		F: Fn(&SettingValue) -> Result<(), String> + Send + Sync + 'static,
	{
		self.validator = Some(Box::new(f));
		self
	}

	/// Build the SettingDefinition
	pub fn build(self) -> ClResult<SettingDefinition> {
		let key = self.key;
		let config_err = |msg: &str| Error::ConfigError(format!("Setting '{}': {}", key, msg));

		let category = self.category.ok_or_else(|| config_err("category is required"))?;
		let default = self.default.ok_or_else(|| config_err("default value is required"))?;
		let setting_type = default.setting_type();
		let c = &self.constraints;

		if (c.min.is_some() || c.max.is_some()) && setting_type != SettingType::Integer {
			return Err(config_err("min/max only apply to integer settings"));
		}
		if let (Some(min), Some(max)) = (c.min, c.max)
			&& min > max
		{
			return Err(config_err("min is greater than max"));
		}
		match (&c.options, setting_type) {
			(Some(options), SettingType::Enum) if options.is_empty() => {
				return Err(config_err("enum settings need at least one option"));
			}
			(None, SettingType::Enum) => {
				return Err(config_err("enum settings need options"));
			}
			(Some(_), t) if t != SettingType::Enum => {
				return Err(config_err("options only apply to enum settings"));
			}
			_ => {}
		}
		if c.max_len.is_some() && setting_type != SettingType::String {
			return Err(config_err("max_len only applies to string settings"));
		}

		let def = SettingDefinition {
			key: key.clone(),
			category,
			description: self.description.unwrap_or_default(),
			setting_type,
			default,
			constraints: self.constraints,
			validator: self.validator,
		};
		def.validate(&def.default)
			.map_err(|e| config_err(&format!("default value is invalid: {}", e)))?;

		Ok(def)
	}
}

/// Effective value of a setting together with its metadata
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingView {
	pub value: SettingValue,
	#[serde(rename = "type")]
	pub setting_type: SettingType,
	pub description: String,
	pub default: SettingValue,
	#[serde(flatten)]
	pub constraints: Constraints,
}

/// category -> key -> view
pub type CategorizedSettings = BTreeMap<String, BTreeMap<String, SettingView>>;

/// Result of a batch update that reached a decision
///
/// Storage failures are not represented here, they fail the whole call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UpdateOutcome {
	pub applied: BTreeSet<String>,
	pub errors: BTreeMap<String, SettingError>,
}

impl UpdateOutcome {
	/// True if every submitted key was applied
	pub fn is_complete(&self) -> bool {
		self.errors.is_empty()
	}
}

/// Mutable registry used during app initialization
pub struct SettingsRegistry {
	definitions: BTreeMap<String, SettingDefinition>,
}

impl SettingsRegistry {
	pub fn new() -> Self {
		Self { definitions: BTreeMap::new() }
	}

	/// Register a new setting definition
	pub fn register(&mut self, def: SettingDefinition) -> ClResult<()> {
		if self.definitions.contains_key(&def.key) {
			return Err(Error::ConfigError(format!("Setting '{}' is already registered", def.key)));
		}

		debug!("Registering setting: {} ({})", def.key, def.category);
		self.definitions.insert(def.key.clone(), def);
		Ok(())
	}

	/// Freeze the registry (make it immutable)
	pub fn freeze(self) -> FrozenSettingsRegistry {
		info!("Freezing settings registry with {} definitions", self.definitions.len());
		FrozenSettingsRegistry { definitions: self.definitions }
	}

	/// Get number of registered settings
	pub fn len(&self) -> usize {
		self.definitions.len()
	}

	/// Check if registry is empty
	pub fn is_empty(&self) -> bool {
		self.definitions.is_empty()
	}
}

impl Default for SettingsRegistry {
	fn default() -> Self {
		Self::new()
	}
}

/// Immutable registry stored in AppState
pub struct FrozenSettingsRegistry {
	definitions: BTreeMap<String, SettingDefinition>,
}

impl FrozenSettingsRegistry {
	pub fn get(&self, key: &str) -> Option<&SettingDefinition> {
		self.definitions.get(key)
	}

	/// List all registered settings in key order
	pub fn list(&self) -> impl Iterator<Item = &SettingDefinition> {
		self.definitions.values()
	}

	pub fn list_by_category<'a>(
		&'a self,
		category: &'a str,
	) -> impl Iterator<Item = &'a SettingDefinition> + 'a {
		self.definitions.values().filter(move |def| def.category == category)
	}

	pub fn categories(&self) -> BTreeSet<&str> {
		self.definitions.values().map(|def| def.category.as_str()).collect()
	}

	pub fn len(&self) -> usize {
		self.definitions.len()
	}

	pub fn is_empty(&self) -> bool {
		self.definitions.is_empty()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use serde_json::json;

	fn int_def(min: i64, max: i64) -> SettingDefinition {
		SettingDefinition::builder("max_login_attempts")
			.category("security")
			.description("Failed logins before lockout")
			.default(SettingValue::Int(3))
			.min(min)
			.max(max)
			.build()
			.unwrap()
	}

	#[test]
	fn test_builder_requires_category_and_default() {
		let err = SettingDefinition::builder("x").default(SettingValue::Bool(true)).build();
		assert!(matches!(err, Err(Error::ConfigError(_))));

		let err = SettingDefinition::builder("x").category("general").build();
		assert!(matches!(err, Err(Error::ConfigError(_))));
	}

	#[test]
	fn test_builder_rejects_bad_constraints() {
		let inverted = SettingDefinition::builder("x")
			.category("general")
			.default(SettingValue::Int(3))
			.min(5)
			.max(1)
			.build();
		assert!(inverted.is_err());

		let bounds_on_bool = SettingDefinition::builder("x")
			.category("general")
			.default(SettingValue::Bool(false))
			.min(0)
			.build();
		assert!(bounds_on_bool.is_err());

		let enum_without_options = SettingDefinition::builder("x")
			.category("general")
			.default(SettingValue::Enum("a".into()))
			.build();
		assert!(enum_without_options.is_err());

		let default_out_of_range = SettingDefinition::builder("x")
			.category("general")
			.default(SettingValue::Int(10))
			.max(5)
			.build();
		assert!(default_out_of_range.is_err());

		let default_not_an_option = SettingDefinition::builder("x")
			.category("general")
			.default(SettingValue::Enum("c".into()))
			.options(["a", "b"])
			.build();
		assert!(default_not_an_option.is_err());
	}

	#[test]
	fn test_numeric_bounds() {
		let def = int_def(1, 5);
		assert!(matches!(
			def.coerce(&json!(0)),
			Err(SettingError::ConstraintViolation(_))
		));
		assert!(matches!(
			def.coerce(&json!(6)),
			Err(SettingError::ConstraintViolation(_))
		));
		assert_eq!(def.coerce(&json!(3)), Ok(SettingValue::Int(3)));
		assert_eq!(def.coerce(&json!("5")), Ok(SettingValue::Int(5)));
	}

	#[test]
	fn test_enum_membership() {
		let def = SettingDefinition::builder("language")
			.category("general")
			.default(SettingValue::Enum("en".into()))
			.options(["en", "es"])
			.build()
			.unwrap();
		assert_eq!(def.coerce(&json!("es")), Ok(SettingValue::Enum("es".into())));
		assert!(matches!(
			def.coerce(&json!("fr")),
			Err(SettingError::ConstraintViolation(_))
		));
	}

	#[test]
	fn test_custom_validator() {
		let def = SettingDefinition::builder("provisioning_server")
			.category("provisioning")
			.default(SettingValue::String(String::new()))
			.validator(|v| match v.as_str() {
				Some(s) if s.contains(' ') => Err("must not contain spaces".into()),
				_ => Ok(()),
			})
			.build()
			.unwrap();
		assert!(def.coerce(&json!("pbx.example.com")).is_ok());
		assert_eq!(
			def.coerce(&json!("pbx example")),
			Err(SettingError::ConstraintViolation("must not contain spaces".into()))
		);
	}

	#[test]
	fn test_decode_stored_rejects_out_of_range() {
		let def = int_def(1, 5);
		assert_eq!(def.decode_stored(&json!(4)), Some(SettingValue::Int(4)));
		assert_eq!(def.decode_stored(&json!(9)), None);
		assert_eq!(def.decode_stored(&json!("4")), None);
	}

	#[test]
	fn test_duplicate_registration() {
		let mut registry = SettingsRegistry::new();
		registry.register(int_def(1, 5)).unwrap();
		assert!(registry.register(int_def(1, 5)).is_err());
		assert_eq!(registry.len(), 1);
	}

	#[test]
	fn test_error_serialization() {
		let err = SettingError::TypeMismatch { expected: SettingType::Boolean, got: "string" };
		assert_eq!(
			serde_json::to_value(&err).unwrap(),
			json!({ "code": "type_mismatch", "message": "expected boolean, got string" })
		);
	}

	#[test]
	fn test_view_serialization() {
		let def = int_def(1, 5);
		let view = def.view(SettingValue::Int(4));
		assert_eq!(
			serde_json::to_value(&view).unwrap(),
			json!({
				"value": 4,
				"type": "integer",
				"description": "Failed logins before lockout",
				"default": 3,
				"min": 1,
				"max": 5,
			})
		);
	}
}

// vim: ts=4
