//! Built-in PBX settings registration
//!
//! Registers the settings the admin pages work with: general system
//! options, the extension range, security, voicemail, phone provisioning and
//! backups.

use crate::prelude::*;
use crate::settings::{SettingDefinition, SettingValue, SettingsRegistry};

fn no_whitespace(value: &SettingValue) -> Result<(), String> {
	match value.as_str() {
		Some(s) if s.chars().any(char::is_whitespace) => Err("must not contain whitespace".into()),
		_ => Ok(()),
	}
}

fn register_general(registry: &mut SettingsRegistry) -> ClResult<()> {
	registry.register(
		SettingDefinition::builder("system_name")
			.category("general")
			.description("Name shown in the admin header and outgoing notifications")
			.default(SettingValue::String("FlexPBX".into()))
			.max_len(64)
			.build()?,
	)?;

	registry.register(
		SettingDefinition::builder("timezone")
			.category("general")
			.description("Timezone used for call records and schedules")
			.default(SettingValue::String("UTC".into()))
			.max_len(64)
			.validator(no_whitespace)
			.build()?,
	)?;

	registry.register(
		SettingDefinition::builder("language")
			.category("general")
			.description("Default prompt language")
			.default(SettingValue::Enum("en".into()))
			.options(["en", "es", "fr", "de"])
			.build()?,
	)?;

	Ok(())
}

fn register_extensions(registry: &mut SettingsRegistry) -> ClResult<()> {
	registry.register(
		SettingDefinition::builder("range_start")
			.category("extensions")
			.description("First extension number handed out to new users")
			.default(SettingValue::Int(2000))
			.min(100)
			.max(99_999)
			.build()?,
	)?;

	registry.register(
		SettingDefinition::builder("range_end")
			.category("extensions")
			.description("Last extension number handed out to new users")
			.default(SettingValue::Int(2099))
			.min(100)
			.max(99_999)
			.build()?,
	)?;

	registry.register(
		SettingDefinition::builder("default_context")
			.category("extensions")
			.description("Dialplan context assigned to new extensions")
			.default(SettingValue::String("from-internal".into()))
			.max_len(80)
			.validator(no_whitespace)
			.build()?,
	)?;

	registry.register(
		SettingDefinition::builder("auto_provision")
			.category("extensions")
			.description("Provision a phone config when an extension is created")
			.default(SettingValue::Bool(true))
			.build()?,
	)?;

	Ok(())
}

fn register_security(registry: &mut SettingsRegistry) -> ClResult<()> {
	registry.register(
		SettingDefinition::builder("require_2fa")
			.category("security")
			.description("Require two-factor authentication for admin logins")
			.default(SettingValue::Bool(false))
			.build()?,
	)?;

	registry.register(
		SettingDefinition::builder("max_login_attempts")
			.category("security")
			.description("Failed logins before an account is locked")
			.default(SettingValue::Int(5))
			.min(1)
			.max(20)
			.build()?,
	)?;

	registry.register(
		SettingDefinition::builder("session_timeout")
			.category("security")
			.description("Admin session idle timeout in minutes")
			.default(SettingValue::Int(30))
			.min(5)
			.max(1440)
			.build()?,
	)?;

	registry.register(
		SettingDefinition::builder("password_min_length")
			.category("security")
			.description("Minimum length of SIP and admin passwords")
			.default(SettingValue::Int(8))
			.min(6)
			.max(64)
			.build()?,
	)?;

	Ok(())
}

fn register_voicemail(registry: &mut SettingsRegistry) -> ClResult<()> {
	registry.register(
		SettingDefinition::builder("voicemail_enabled")
			.category("voicemail")
			.description("Create a mailbox for new extensions")
			.default(SettingValue::Bool(true))
			.build()?,
	)?;

	registry.register(
		SettingDefinition::builder("max_message_length")
			.category("voicemail")
			.description("Maximum message length in seconds")
			.default(SettingValue::Int(180))
			.min(10)
			.max(600)
			.build()?,
	)?;

	registry.register(
		SettingDefinition::builder("email_notifications")
			.category("voicemail")
			.description("Email the mailbox owner when a message arrives")
			.default(SettingValue::Bool(true))
			.build()?,
	)?;

	registry.register(
		SettingDefinition::builder("attach_audio")
			.category("voicemail")
			.description("Attach the recording to notification emails")
			.default(SettingValue::Bool(false))
			.build()?,
	)?;

	Ok(())
}

fn register_provisioning(registry: &mut SettingsRegistry) -> ClResult<()> {
	registry.register(
		SettingDefinition::builder("provisioning_protocol")
			.category("provisioning")
			.description("Protocol phones use to fetch their configuration")
			.default(SettingValue::Enum("https".into()))
			.options(["http", "https", "tftp"])
			.build()?,
	)?;

	registry.register(
		SettingDefinition::builder("provisioning_server")
			.category("provisioning")
			.description("Host name phones fetch their configuration from")
			.default(SettingValue::String(String::new()))
			.max_len(253)
			.validator(no_whitespace)
			.build()?,
	)?;

	registry.register(
		SettingDefinition::builder("sip_port")
			.category("provisioning")
			.description("SIP port written into phone configurations")
			.default(SettingValue::Int(5060))
			.min(1)
			.max(65_535)
			.build()?,
	)?;

	Ok(())
}

fn register_backup(registry: &mut SettingsRegistry) -> ClResult<()> {
	registry.register(
		SettingDefinition::builder("backup_enabled")
			.category("backup")
			.description("Run scheduled configuration backups")
			.default(SettingValue::Bool(true))
			.build()?,
	)?;

	registry.register(
		SettingDefinition::builder("backup_frequency")
			.category("backup")
			.description("How often scheduled backups run")
			.default(SettingValue::Enum("daily".into()))
			.options(["daily", "weekly", "monthly"])
			.build()?,
	)?;

	registry.register(
		SettingDefinition::builder("backup_retention")
			.category("backup")
			.description("Days to keep old backups")
			.default(SettingValue::Int(30))
			.min(1)
			.max(365)
			.build()?,
	)?;

	Ok(())
}

/// Register all built-in settings
pub fn register_settings(registry: &mut SettingsRegistry) -> ClResult<()> {
	register_general(registry)?;
	register_extensions(registry)?;
	register_security(registry)?;
	register_voicemail(registry)?;
	register_provisioning(registry)?;
	register_backup(registry)?;
	Ok(())
}


// vim: ts=4
