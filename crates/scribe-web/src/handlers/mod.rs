pub mod accounts;
pub mod admin;
pub mod follow;
pub mod posts;

use axum::{
  http::{StatusCode, header},
  response::{IntoResponse, Response},
};
use scribe_core::model::PostId;

use crate::error::Error;

/// A `302 Found` redirect.
pub fn found(location: &str) -> Response {
  (StatusCode::FOUND, [(header::LOCATION, location.to_owned())]).into_response()
}

/// Percent-encode one path segment.
pub(crate) fn encode_segment(segment: &str) -> String {
  url::form_urlencoded::byte_serialize(segment.as_bytes())
    .collect::<String>()
    .replace('+', "%20")
}

pub(crate) fn profile_url(username: &str) -> String {
  format!("/profile/{}/", encode_segment(username))
}

pub(crate) fn detail_url(id: PostId) -> String { format!("/posts/{id}/") }

/// Post ids come from the path as text; anything that is not an id is simply
/// a page that does not exist.
pub(crate) fn parse_id(raw: &str) -> Result<PostId, Error> {
  raw.parse().map_err(|_| Error::NotFound)
}

/// Fallback for every unmatched path.
pub async fn not_found() -> Response { Error::NotFound.into_response() }
