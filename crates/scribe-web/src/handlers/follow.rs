//! Subscriptions between users.
//!
//! Following and unfollowing always end on the author's profile, whatever the
//! outcome: a self-follow or a repeated follow changes nothing and is not
//! reported as an error.

use axum::{
  extract::{Path, Query, State},
  response::Response,
};
use scribe_core::{
  feed,
  follow::{self, FollowOutcome},
  model::User,
  store::{BlogStore, PostFilter},
};

use crate::{
  AppState,
  auth::SignedIn,
  error::Error,
  handlers::{found, posts::PageParams, profile_url},
  pages::{FollowPage, render},
};

async fn load_author<S: BlogStore>(store: &S, username: &str) -> Result<User, Error> {
  store
    .get_user_by_username(username)
    .await
    .map_err(Error::store)?
    .ok_or(Error::NotFound)
}

/// `GET /follow/`: posts by everyone the viewer follows.
pub async fn follow_index<S>(
  State(state): State<AppState<S>>,
  SignedIn(user): SignedIn,
  Query(params): Query<PageParams>,
) -> Result<Response, Error>
where
  S: BlogStore + Clone + Send + Sync + 'static,
{
  let page = feed::load_page(
    &*state.store,
    PostFilter::FollowedBy(user.id),
    params.page.as_deref(),
    state.paginator(),
  )
  .await
  .map_err(Error::store)?;
  Ok(render(FollowPage { page }))
}

/// `GET /profile/{username}/follow/`
pub async fn profile_follow<S>(
  State(state): State<AppState<S>>,
  SignedIn(user): SignedIn,
  Path(username): Path<String>,
) -> Result<Response, Error>
where
  S: BlogStore + Clone + Send + Sync + 'static,
{
  let author = load_author(&*state.store, &username).await?;

  match follow::follow(&*state.store, user.id, author.id)
    .await
    .map_err(Error::store)?
  {
    FollowOutcome::Created(_) => {
      tracing::info!(user = %user.username, author = %author.username, "followed");
    }
    FollowOutcome::AlreadyFollowing => {}
    FollowOutcome::SelfFollow => {
      tracing::debug!(user = %user.username, "ignoring self-follow");
    }
  }

  Ok(found(&profile_url(&author.username)))
}

/// `GET /profile/{username}/unfollow/`
pub async fn profile_unfollow<S>(
  State(state): State<AppState<S>>,
  SignedIn(user): SignedIn,
  Path(username): Path<String>,
) -> Result<Response, Error>
where
  S: BlogStore + Clone + Send + Sync + 'static,
{
  let author = load_author(&*state.store, &username).await?;

  if follow::unfollow(&*state.store, user.id, author.id)
    .await
    .map_err(Error::store)?
  {
    tracing::info!(user = %user.username, author = %author.username, "unfollowed");
  }

  Ok(found(&profile_url(&author.username)))
}
