//! The `BlogStore` trait and supporting query types.
//!
//! The trait is implemented by storage backends (e.g. `scribe-store-sqlite`).
//! The web layer depends on this abstraction, not on any concrete backend.

use std::future::Future;

use crate::model::{
  Comment, CommentView, Follow, Group, GroupId, NewComment, NewGroup, NewPost,
  NewUser, Post, PostChanges, PostId, PostView, User, UserId,
};

// ─── Query types ─────────────────────────────────────────────────────────────

/// Which posts a feed contains. Every feed is ordered newest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostFilter {
  /// Every post (the home feed).
  All,
  /// Posts published into one group.
  Group(GroupId),
  /// Posts written by one author.
  Author(UserId),
  /// Posts whose author is followed by the given user.
  FollowedBy(UserId),
}

/// A contiguous slice of an ordered result set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
  pub offset: u64,
  pub limit:  u64,
}

/// Errors a backend can report, with enough structure for callers to tell a
/// uniqueness rejection apart from an I/O failure.
pub trait StoreError: std::error::Error + Send + Sync + 'static {
  fn is_constraint_violation(&self) -> bool;
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over a Scribe storage backend.
///
/// Each write is a single atomic statement. Cascade rules (deleting a user
/// removes their posts, comments and follow edges; deleting a group detaches
/// its posts) are the backend's responsibility.
pub trait BlogStore: Send + Sync {
  type Error: StoreError;

  // ── Users ─────────────────────────────────────────────────────────────

  /// Fails with a constraint violation if the username is taken.
  fn create_user(
    &self,
    input: NewUser,
  ) -> impl Future<Output = Result<User, Self::Error>> + Send + '_;

  fn get_user(
    &self,
    id: UserId,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + '_;

  fn get_user_by_username<'a>(
    &'a self,
    username: &'a str,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + 'a;

  /// Delete a user and, transitively, everything they own.
  /// Returns `false` if no such user existed.
  fn delete_user(
    &self,
    id: UserId,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  // ── Groups ────────────────────────────────────────────────────────────

  /// Fails with a constraint violation if the slug is taken.
  fn create_group(
    &self,
    input: NewGroup,
  ) -> impl Future<Output = Result<Group, Self::Error>> + Send + '_;

  fn get_group_by_slug<'a>(
    &'a self,
    slug: &'a str,
  ) -> impl Future<Output = Result<Option<Group>, Self::Error>> + Send + 'a;

  /// All groups ordered by title.
  fn list_groups(
    &self,
  ) -> impl Future<Output = Result<Vec<Group>, Self::Error>> + Send + '_;

  /// Delete a group. Its posts survive with no group.
  fn delete_group(
    &self,
    id: GroupId,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  // ── Posts ─────────────────────────────────────────────────────────────

  /// Persist a new post. `pub_date` is set by the store.
  fn create_post(
    &self,
    input: NewPost,
  ) -> impl Future<Output = Result<Post, Self::Error>> + Send + '_;

  fn get_post(
    &self,
    id: PostId,
  ) -> impl Future<Output = Result<Option<PostView>, Self::Error>> + Send + '_;

  /// Replace the editable fields of a post. Returns `None` if it does not exist.
  fn update_post(
    &self,
    id: PostId,
    changes: PostChanges,
  ) -> impl Future<Output = Result<Option<Post>, Self::Error>> + Send + '_;

  /// Delete a post and its comments. Returns `false` if it did not exist.
  fn delete_post(
    &self,
    id: PostId,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// Posts matching `filter`, newest first, with author and group attached.
  /// `window: None` returns the whole sequence.
  fn list_posts(
    &self,
    filter: PostFilter,
    window: Option<Window>,
  ) -> impl Future<Output = Result<Vec<PostView>, Self::Error>> + Send + '_;

  fn count_posts(
    &self,
    filter: PostFilter,
  ) -> impl Future<Output = Result<u64, Self::Error>> + Send + '_;

  // ── Comments ──────────────────────────────────────────────────────────

  fn add_comment(
    &self,
    input: NewComment,
  ) -> impl Future<Output = Result<Comment, Self::Error>> + Send + '_;

  /// Comments on a post, oldest first, with their authors attached.
  fn list_comments(
    &self,
    post_id: PostId,
  ) -> impl Future<Output = Result<Vec<CommentView>, Self::Error>> + Send + '_;

  // ── Follow edges ──────────────────────────────────────────────────────

  /// Insert the edge `user -> author`. A second insert of the same pair fails
  /// with a constraint violation. No self-follow check happens here.
  fn add_follow(
    &self,
    user: UserId,
    author: UserId,
  ) -> impl Future<Output = Result<Follow, Self::Error>> + Send + '_;

  /// Remove the edge if present. Returns whether a row was deleted.
  fn remove_follow(
    &self,
    user: UserId,
    author: UserId,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  fn is_following(
    &self,
    user: UserId,
    author: UserId,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;
}
