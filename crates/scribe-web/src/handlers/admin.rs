//! Operator actions.
//!
//! The page cache is never invalidated by writes, so clearing it is an
//! explicit step taken by a configured admin.

use axum::{
  extract::State,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use scribe_core::store::BlogStore;

use crate::{AppState, auth::SignedIn, error::Error};

/// `POST /admin/cache/clear/`: empty the whole page cache.
///
/// Only usernames listed under `admins` may do this; to everyone else the
/// route does not exist.
pub async fn clear_cache<S>(
  State(state): State<AppState<S>>,
  SignedIn(user): SignedIn,
) -> Result<Response, Error>
where
  S: BlogStore + Clone + Send + Sync + 'static,
{
  if !state.config.is_admin(&user.username) {
    return Err(Error::NotFound);
  }
  state.cache.clear();
  Ok(StatusCode::NO_CONTENT.into_response())
}
