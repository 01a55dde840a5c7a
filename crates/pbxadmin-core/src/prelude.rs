pub use crate::app::App;
pub use pbxadmin_types::error::{ClResult, Error};

pub use tracing::{debug, debug_span, error, error_span, info, info_span, warn, warn_span};

// vim: ts=4
