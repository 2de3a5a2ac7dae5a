use axum::body::Body;
use axum::http::{Response, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use playout_dispatch::{AddressingError, IdentityError};
use serde::Serialize;

pub const DIRECT_PLAYOUT_POST_ONLY: &str =
	"Sorry, this endpoint only available as POST REQUEST with parameters, see the example text or see controlRundownItemByID -endpoint for basic play/stop controls.";

/// Feed proxy failures.
#[derive(thiserror::Error, Debug)]
pub enum UpstreamFetchError {
	#[error("missing required query parameter `url`")]
	MissingUrl,

	#[error("{0}")]
	Request(#[from] reqwest::Error),
}

#[derive(thiserror::Error, Debug)]
pub enum RelayError {
	#[error("{0}")]
	Addressing(#[from] AddressingError),

	#[error("Error in /api/v1/controlRundownItemByID: {0}")]
	ItemControl(AddressingError),

	#[error("ID not changed")]
	Identity(#[from] IdentityError),

	#[error("{0}")]
	Upstream(#[from] UpstreamFetchError),

	#[error("{0}")]
	PostOnly(&'static str),

	#[error("Provided data is not serializable to JSON: {0}")]
	NonSerializableData(#[from] serde_json::Error),

	#[error("Request timeout")]
	RequestTimeout,

	#[error("Service temporarily overloaded")]
	ServiceOverloaded,

	#[error("Unexpected Tower Service error: {0}")]
	TowerError(#[from] tower::BoxError),
}

impl RelayError {
	pub const fn status_code(&self) -> StatusCode {
		match self {
			Self::Addressing(_) => StatusCode::BAD_REQUEST,
			Self::ItemControl(_) => StatusCode::INTERNAL_SERVER_ERROR,
			Self::Identity(_) => StatusCode::CONFLICT,
			Self::Upstream(_) => StatusCode::INTERNAL_SERVER_ERROR,
			Self::PostOnly(_) => StatusCode::NOT_FOUND,
			Self::NonSerializableData(_) => StatusCode::INTERNAL_SERVER_ERROR,
			Self::RequestTimeout => StatusCode::REQUEST_TIMEOUT,
			Self::ServiceOverloaded => StatusCode::SERVICE_UNAVAILABLE,
			Self::TowerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
		}
	}
}

#[derive(Serialize)]
struct UpstreamErrorBody {
	#[serde(rename = "type")]
	kind: &'static str,
	message: String,
}

impl IntoResponse for RelayError {
	fn into_response(self) -> Response<Body> {
		match self {
			Self::Identity(ref e) => {
				tracing::warn!(error = %e, kind = e.kind(), "Item ID change failed");
				(self.status_code(), self.to_string()).into_response()
			}
			Self::Upstream(ref e) => {
				tracing::warn!(error = %e, "Feed proxy request failed");
				let body = UpstreamErrorBody {
					kind: "error",
					message: e.to_string(),
				};
				(self.status_code(), Json(body)).into_response()
			}
			Self::ItemControl(_) => {
				tracing::error!("{}", self);
				(self.status_code(), self.to_string()).into_response()
			}
			_ => (self.status_code(), self.to_string()).into_response(),
		}
	}
}
