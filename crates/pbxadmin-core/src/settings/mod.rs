//! Settings subsystem: typed schema, validation, and grouped persistence
//!
//! # Architecture
//!
//! - **Types** (`types.rs`): values, definitions, constraints and the registry
//! - **Coerce** (`coerce.rs`): untyped input to typed values
//! - **Service** (`service.rs`): SettingsService with caching and atomic writes
//! - **Usage** (`usage.rs`): extension range usage, derived from settings
//! - **Handler** (`handler.rs`): HTTP API endpoints
//!
//! # Schema vs Values
//!
//! The schema (category, type, default, constraints) lives in code and is
//! frozen at startup. The store only holds values, so a reset always has a
//! well-defined target.

pub mod coerce;
pub mod handler;
pub mod service;
pub mod types;
pub mod usage;

pub use types::{
	CategorizedSettings, Constraints, FrozenSettingsRegistry, SettingDefinition,
	SettingDefinitionBuilder, SettingError, SettingType, SettingValue, SettingView,
	SettingsRegistry, UpdateOutcome,
};
pub use usage::{ExtensionRangeUsage, UsageWarning};

// vim: ts=4
