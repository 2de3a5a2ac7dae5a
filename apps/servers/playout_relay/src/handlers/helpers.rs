use crate::error::{RelayError, UpstreamFetchError};
use crate::metrics::record_rename;
use crate::proxy::{FeedFormat, FeedProxy};
use crate::AppState;
use axum::extract::{Query, State};
use axum::http::header::CONTENT_TYPE;
use axum::response::IntoResponse;
use playout_dispatch::RenameRequest;
use serde::Deserialize;
use tracing::instrument;

#[derive(Debug, Deserialize)]
pub struct FeedQuery {
	pub url: Option<String>,
	pub format: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ChangeItemIdQuery {
	pub rundownfile: Option<String>,
	#[serde(rename = "ID")]
	pub id: Option<String>,
	#[serde(rename = "newID")]
	pub new_id: Option<String>,
}

impl From<ChangeItemIdQuery> for RenameRequest {
	fn from(query: ChangeItemIdQuery) -> Self {
		Self {
			document: query.rundownfile.unwrap_or_default(),
			old_id: query.id.unwrap_or_default(),
			new_id: query.new_id.unwrap_or_default(),
		}
	}
}

#[axum::debug_handler(state = crate::AppState)]
#[instrument(name = "feed_proxy", skip_all, fields(url = ?query.url, format = ?query.format))]
pub async fn feed_proxy(State(proxy): State<FeedProxy>, Query(query): Query<FeedQuery>) -> Result<impl IntoResponse, RelayError> {
	let url = query.url.filter(|u| !u.is_empty()).ok_or(UpstreamFetchError::MissingUrl)?;
	let format = FeedFormat::from_query(query.format.as_deref());

	let body = proxy.fetch(&url).await?;
	Ok(([(CONTENT_TYPE, format.content_type())], body))
}

#[axum::debug_handler]
#[instrument(name = "change_item_id", skip_all, fields(rundownfile = ?query.rundownfile, id = ?query.id, new_id = ?query.new_id))]
pub async fn change_item_id(State(state): State<AppState>, Query(query): Query<ChangeItemIdQuery>) -> Result<String, RelayError> {
	let request = RenameRequest::from(query);

	match state.dispatch.identity.rename(&request).await {
		Ok(outcome) => {
			record_rename("ok");
			Ok(format!("ID changed to {}", outcome.new_id))
		}
		Err(e) => {
			record_rename(e.kind());
			Err(e.into())
		}
	}
}
