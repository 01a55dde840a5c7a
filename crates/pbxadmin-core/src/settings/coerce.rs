//! Conversion of untyped input into typed setting values
//!
//! Two entry points with different strictness: `coerce` accepts what a web
//! form sends (strings for everything), `decode_stored` only accepts the JSON
//! shape the registry itself writes.

use serde_json::Value;

use super::types::{SettingError, SettingType, SettingValue};

/// JSON kind name used in type mismatch messages
pub fn json_kind(raw: &Value) -> &'static str {
	match raw {
		Value::Null => "null",
		Value::Bool(_) => "boolean",
		Value::Number(n) if n.is_i64() || n.is_u64() => "integer",
		Value::Number(_) => "number",
		Value::String(_) => "string",
		Value::Array(_) => "array",
		Value::Object(_) => "object",
	}
}

fn parse_bool(s: &str) -> Option<bool> {
	match s.trim().to_ascii_lowercase().as_str() {
		"true" | "1" | "yes" | "on" => Some(true),
		"false" | "0" | "no" | "off" => Some(false),
		_ => None,
	}
}

#[allow(clippy::cast_possible_truncation, clippy::float_cmp)]
fn number_to_i64(n: &serde_json::Number) -> Option<i64> {
	if let Some(i) = n.as_i64() {
		return Some(i);
	}
	let f = n.as_f64()?;
	// i64::MAX as f64 rounds up to 2^63, hence the strict upper bound
	if f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64 {
		Some(f as i64)
	} else {
		None
	}
}

pub fn coerce(ty: SettingType, raw: &Value) -> Result<SettingValue, SettingError> {
	let mismatch = || SettingError::TypeMismatch { expected: ty, got: json_kind(raw) };

	match ty {
		SettingType::Boolean => match raw {
			Value::Bool(b) => Ok(SettingValue::Bool(*b)),
			Value::Number(n) => match n.as_i64() {
				Some(0) => Ok(SettingValue::Bool(false)),
				Some(1) => Ok(SettingValue::Bool(true)),
				_ => Err(mismatch()),
			},
			Value::String(s) => parse_bool(s).map(SettingValue::Bool).ok_or_else(mismatch),
			_ => Err(mismatch()),
		},
		SettingType::Integer => match raw {
			Value::Number(n) => number_to_i64(n).map(SettingValue::Int).ok_or_else(mismatch),
			Value::String(s) => s.trim().parse::<i64>().map(SettingValue::Int).map_err(|_| mismatch()),
			_ => Err(mismatch()),
		},
		SettingType::String => match raw {
			Value::String(s) => Ok(SettingValue::String(s.clone())),
			Value::Number(n) => Ok(SettingValue::String(n.to_string())),
			_ => Err(mismatch()),
		},
		SettingType::Enum => match raw {
			Value::String(s) => Ok(SettingValue::Enum(s.clone())),
			Value::Number(n) => Ok(SettingValue::Enum(n.to_string())),
			_ => Err(mismatch()),
		},
	}
}

pub fn decode_stored(ty: SettingType, raw: &Value) -> Option<SettingValue> {
	match (ty, raw) {
		(SettingType::Boolean, Value::Bool(b)) => Some(SettingValue::Bool(*b)),
		(SettingType::Integer, Value::Number(n)) => n.as_i64().map(SettingValue::Int),
		(SettingType::String, Value::String(s)) => Some(SettingValue::String(s.clone())),
		(SettingType::Enum, Value::String(s)) => Some(SettingValue::Enum(s.clone())),
		_ => None,
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use serde_json::json;

	#[test]
	fn test_boolean_inputs() {
		for (raw, expected) in [
			(json!(true), true),
			(json!(false), false),
			(json!("on"), true),
			(json!("OFF"), false),
			(json!(" yes "), true),
			(json!("0"), false),
			(json!(1), true),
		] {
			assert_eq!(coerce(SettingType::Boolean, &raw), Ok(SettingValue::Bool(expected)));
		}

		for raw in [json!("not-a-bool"), json!(2), json!(null), json!(""), json!([true])] {
			assert!(matches!(
				coerce(SettingType::Boolean, &raw),
				Err(SettingError::TypeMismatch { expected: SettingType::Boolean, .. })
			));
		}
	}

	#[test]
	fn test_integer_inputs() {
		assert_eq!(coerce(SettingType::Integer, &json!(42)), Ok(SettingValue::Int(42)));
		assert_eq!(coerce(SettingType::Integer, &json!(" -7 ")), Ok(SettingValue::Int(-7)));
		assert_eq!(coerce(SettingType::Integer, &json!(3.0)), Ok(SettingValue::Int(3)));

		assert_eq!(
			coerce(SettingType::Integer, &json!("abc")),
			Err(SettingError::TypeMismatch { expected: SettingType::Integer, got: "string" })
		);
		assert_eq!(
			coerce(SettingType::Integer, &json!(3.5)),
			Err(SettingError::TypeMismatch { expected: SettingType::Integer, got: "number" })
		);
		assert!(coerce(SettingType::Integer, &json!(true)).is_err());
	}

	#[test]
	fn test_string_and_enum_inputs() {
		assert_eq!(
			coerce(SettingType::String, &json!("FlexPBX")),
			Ok(SettingValue::String("FlexPBX".into()))
		);
		assert_eq!(coerce(SettingType::String, &json!(5060)), Ok(SettingValue::String("5060".into())));
		assert!(coerce(SettingType::String, &json!(false)).is_err());
		assert!(coerce(SettingType::String, &json!(null)).is_err());

		assert_eq!(coerce(SettingType::Enum, &json!("daily")), Ok(SettingValue::Enum("daily".into())));
		assert!(coerce(SettingType::Enum, &json!({ "v": 1 })).is_err());
	}

	#[test]
	fn test_decode_stored_is_strict() {
		assert_eq!(decode_stored(SettingType::Boolean, &json!(true)), Some(SettingValue::Bool(true)));
		assert_eq!(decode_stored(SettingType::Boolean, &json!("true")), None);
		assert_eq!(decode_stored(SettingType::Integer, &json!(2000)), Some(SettingValue::Int(2000)));
		assert_eq!(decode_stored(SettingType::Integer, &json!("2000")), None);
		assert_eq!(decode_stored(SettingType::String, &json!(1)), None);
	}
}

// vim: ts=4
