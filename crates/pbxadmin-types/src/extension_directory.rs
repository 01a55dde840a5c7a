//! Source of the extension numbers currently in use
//!
//! The registry only knows the configured range. Which numbers are taken is
//! answered by whatever keeps the extensions list.

use std::collections::HashSet;
use std::fmt::Debug;

use async_trait::async_trait;

use crate::prelude::*;

#[async_trait]
pub trait ExtensionDirectory: Debug + Send + Sync {
	async fn used_extensions(&self) -> ClResult<HashSet<String>>;
}

/// Fixed set of extensions, used when no directory is configured
#[derive(Debug, Default, Clone)]
pub struct StaticExtensionDirectory {
	used: HashSet<String>,
}

impl StaticExtensionDirectory {
	pub fn new<I, S>(used: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		Self { used: used.into_iter().map(Into::into).collect() }
	}
}

#[async_trait]
impl ExtensionDirectory for StaticExtensionDirectory {
	async fn used_extensions(&self) -> ClResult<HashSet<String>> {
		Ok(self.used.clone())
	}
}

// vim: ts=4
