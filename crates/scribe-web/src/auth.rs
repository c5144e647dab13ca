//! Request authentication: who is asking, and the login redirect for pages
//! that need someone to be asking.
//!
//! Credentials travel as HTTP Basic and are checked against the user's argon2
//! hash. Missing or wrong credentials make the request anonymous; they never
//! produce a 401 on their own.

use argon2::{
  Argon2, PasswordHash, PasswordHasher, PasswordVerifier, password_hash::SaltString,
};
use axum::{
  extract::FromRequestParts,
  http::{HeaderMap, Uri, header, request::Parts},
  response::{IntoResponse, Response},
};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as B64;
use rand_core::OsRng;
use scribe_core::{model::User, store::BlogStore};

use crate::{AppState, error::Error, handlers::found};

/// Where anonymous visitors of protected pages are sent.
pub const LOGIN_URL: &str = "/auth/login/";

/// The requesting user, if the request carried valid credentials.
pub struct Viewer(pub Option<User>);

impl Viewer {
  pub fn id(&self) -> Option<i64> { self.0.as_ref().map(|u| u.id) }
}

/// A request from a signed-in user. Anonymous requests are answered with a
/// redirect to [`LOGIN_URL`] carrying the original path in `next`.
pub struct SignedIn(pub User);

/// Pull `(username, password)` out of an `Authorization: Basic` header.
pub fn basic_credentials(headers: &HeaderMap) -> Option<(String, String)> {
  let encoded = headers
    .get(header::AUTHORIZATION)?
    .to_str()
    .ok()?
    .strip_prefix("Basic ")?;
  let decoded = B64.decode(encoded).ok()?;
  let creds = String::from_utf8(decoded).ok()?;
  let (username, password) = creds.split_once(':')?;
  Some((username.to_owned(), password.to_owned()))
}

/// Produce an argon2 PHC string for `password`.
pub fn hash_password(password: &str) -> Result<String, Error> {
  let salt = SaltString::generate(&mut OsRng);
  Argon2::default()
    .hash_password(password.as_bytes(), &salt)
    .map(|h| h.to_string())
    .map_err(|e| Error::PasswordHash(e.to_string()))
}

pub fn verify_password(password: &str, phc: &str) -> bool {
  let Ok(parsed) = PasswordHash::new(phc) else {
    return false;
  };
  Argon2::default()
    .verify_password(password.as_bytes(), &parsed)
    .is_ok()
}

/// `302` to the login page with `next` set to the path (and query) of `uri`.
pub fn login_redirect(uri: &Uri) -> Response {
  let next = uri.path_and_query().map_or(uri.path(), |pq| pq.as_str());
  let query = url::form_urlencoded::Serializer::new(String::new())
    .append_pair("next", next)
    .finish();
  found(&format!("{LOGIN_URL}?{query}"))
}

impl<S> FromRequestParts<AppState<S>> for Viewer
where
  S: BlogStore + Clone + Send + Sync + 'static,
{
  type Rejection = Error;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S>,
  ) -> Result<Self, Self::Rejection> {
    let Some((username, password)) = basic_credentials(&parts.headers) else {
      return Ok(Viewer(None));
    };

    let user = state
      .store
      .get_user_by_username(&username)
      .await
      .map_err(Error::store)?
      .filter(|u| verify_password(&password, &u.password_hash));

    if user.is_none() {
      tracing::debug!(%username, "credentials rejected; treating request as anonymous");
    }
    Ok(Viewer(user))
  }
}

impl<S> FromRequestParts<AppState<S>> for SignedIn
where
  S: BlogStore + Clone + Send + Sync + 'static,
{
  type Rejection = Response;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S>,
  ) -> Result<Self, Self::Rejection> {
    match Viewer::from_request_parts(parts, state).await {
      Ok(Viewer(Some(user))) => Ok(SignedIn(user)),
      Ok(Viewer(None)) => Err(login_redirect(&parts.uri)),
      Err(e) => Err(e.into_response()),
    }
  }
}
