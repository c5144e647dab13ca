//! The follow registry: the rules around creating and removing follow edges.
//!
//! The store enforces uniqueness of `(user, author)`; this module adds the
//! self-follow guard and decides what a duplicate follow means.

use crate::{
  model::{Follow, UserId},
  store::{BlogStore, StoreError},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FollowOutcome {
  Created(Follow),
  /// The edge already existed; nothing was written.
  AlreadyFollowing,
  /// `user == author`; nothing was written.
  SelfFollow,
}

/// Make `user` follow `author`.
///
/// A duplicate edge is reported by the store as a constraint violation and
/// surfaces here as [`FollowOutcome::AlreadyFollowing`], so following twice is
/// idempotent.
pub async fn follow<S: BlogStore>(
  store: &S,
  user: UserId,
  author: UserId,
) -> Result<FollowOutcome, S::Error> {
  if user == author {
    return Ok(FollowOutcome::SelfFollow);
  }
  match store.add_follow(user, author).await {
    Ok(edge) => Ok(FollowOutcome::Created(edge)),
    Err(e) if e.is_constraint_violation() => {
      tracing::debug!(user, author, "follow edge already exists");
      Ok(FollowOutcome::AlreadyFollowing)
    }
    Err(e) => Err(e),
  }
}

/// Remove the edge `user -> author` if it exists. Absence is not an error.
pub async fn unfollow<S: BlogStore>(
  store: &S,
  user: UserId,
  author: UserId,
) -> Result<bool, S::Error> {
  store.remove_follow(user, author).await
}

/// Whether `viewer` follows `author`. Anonymous viewers never follow anyone
/// and the store is not consulted for them.
pub async fn is_following<S: BlogStore>(
  store: &S,
  viewer: Option<UserId>,
  author: UserId,
) -> Result<bool, S::Error> {
  match viewer {
    Some(user) => store.is_following(user, author).await,
    None => Ok(false),
  }
}
