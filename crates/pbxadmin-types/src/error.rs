//! Error type shared by the registry, the adapters and the HTTP layer

use axum::{
	Json,
	http::StatusCode,
	response::{IntoResponse, Response},
};

pub type ClResult<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("not found")]
	NotFound,
	#[error("validation error: {0}")]
	ValidationError(String),
	#[error("configuration error: {0}")]
	ConfigError(String),
	/// The backing store could not be read or written. Safe to retry.
	#[error("storage unavailable: {0}")]
	StorageUnavailable(String),
	#[error("internal error: {0}")]
	Internal(String),

	// externals
	#[error("io error: {0}")]
	Io(#[from] std::io::Error),
}

impl Error {
	pub fn status_code(&self) -> StatusCode {
		match self {
			Error::NotFound => StatusCode::NOT_FOUND,
			Error::ValidationError(_) => StatusCode::BAD_REQUEST,
			Error::StorageUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
			Error::ConfigError(_) | Error::Internal(_) | Error::Io(_) => {
				StatusCode::INTERNAL_SERVER_ERROR
			}
		}
	}
}

#[derive(serde::Serialize)]
struct ErrorBody {
	success: bool,
	error: String,
}

impl IntoResponse for Error {
	fn into_response(self) -> Response {
		let status = self.status_code();
		if status.is_server_error() {
			tracing::warn!("request failed: {}", self);
		}
		(status, Json(ErrorBody { success: false, error: self.to_string() })).into_response()
	}
}


// vim: ts=4
