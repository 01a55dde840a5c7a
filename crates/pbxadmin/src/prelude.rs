pub use pbxadmin_core::prelude::*;

// vim: ts=4
