use axum::{Router, routing::get};
use tower_http::trace::TraceLayer;

use pbxadmin_core::App;
use pbxadmin_core::settings::handler;

fn init_api(app: App) -> Router {
	Router::new()
		.route("/api/settings", get(handler::list_settings).post(handler::post_settings))
		.route("/api/settings/extension-usage", get(handler::get_extension_usage))
		.route("/api/settings/{key}", get(handler::get_setting))
		.with_state(app)
}

pub fn init(app: App) -> Router {
	Router::new()
		.route("/health", get(|| async { "ok" }))
		.merge(init_api(app))
		.layer(TraceLayer::new_for_http())
}

// vim: ts=4
