//! Extension range usage, derived from the range settings
//!
//! Never persisted. Recomputed on every request from `range_start`,
//! `range_end` and the set of extensions reported as used.

use serde::Serialize;
use std::collections::HashSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum UsageWarning {
	/// `range_end` is below `range_start`
	InvalidRange,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtensionRangeUsage {
	pub start: i64,
	pub end: i64,
	pub total: i64,
	pub used: i64,
	pub available: i64,
	pub percentage_used: i64,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub warning: Option<UsageWarning>,
}

/// Compute usage of `[start, end]`
///
/// Identifiers that aren't integers are ignored, duplicates like "2001" and
/// " 2001" count once.
pub fn compute_extension_range_usage<'a, I>(start: i64, end: i64, used: I) -> ExtensionRangeUsage
where
	I: IntoIterator<Item = &'a str>,
{
	let total = i128::from(end) - i128::from(start) + 1;
	if total <= 0 {
		return ExtensionRangeUsage {
			start,
			end,
			total: 0,
			used: 0,
			available: 0,
			percentage_used: 0,
			warning: Some(UsageWarning::InvalidRange),
		};
	}

	let in_range: HashSet<i64> = used
		.into_iter()
		.filter_map(|id| id.trim().parse::<i64>().ok())
		.filter(|n| (start..=end).contains(n))
		.collect();
	let used = in_range.len() as i128;

	// round half up: (100 * used / total) + 0.5
	let percentage = (200 * used + total) / (2 * total);

	ExtensionRangeUsage {
		start,
		end,
		total: i64::try_from(total).unwrap_or(i64::MAX),
		used: i64::try_from(used).unwrap_or(i64::MAX),
		available: i64::try_from(total - used).unwrap_or(i64::MAX),
		percentage_used: i64::try_from(percentage).unwrap_or(100),
		warning: None,
	}
}


// vim: ts=4
