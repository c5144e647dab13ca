//! Domain records: users, groups, posts, comments and follow edges.
//!
//! Identifiers are the integer row ids assigned by the store. Timestamps are
//! assigned by the store at insertion and never change afterwards.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub type UserId = i64;
pub type GroupId = i64;
pub type PostId = i64;
pub type CommentId = i64;

/// Number of characters of a post's text used as its display string.
pub const POST_DISPLAY_CHARS: usize = 15;

// ─── Users ───────────────────────────────────────────────────────────────────

/// A registered account. The password hash is opaque to everything except
/// the credential check in the web layer and is never serialised.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
  pub id:            UserId,
  pub username:      String,
  #[serde(skip_serializing, default)]
  pub password_hash: String,
  pub created_at:    DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewUser {
  pub username:      String,
  pub password_hash: String,
}

// ─── Groups ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
  pub id:          GroupId,
  pub title:       String,
  pub slug:        String,
  pub description: String,
}

impl std::fmt::Display for Group {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(&self.title)
  }
}

#[derive(Debug, Clone)]
pub struct NewGroup {
  pub title:       String,
  pub slug:        String,
  pub description: String,
}

// ─── Posts ───────────────────────────────────────────────────────────────────

/// A post row as stored. `author_id` and `pub_date` are fixed at creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
  pub id:        PostId,
  pub text:      String,
  pub pub_date:  DateTime<Utc>,
  pub group_id:  Option<GroupId>,
  pub author_id: UserId,
  pub image:     Option<String>,
}

/// The author fields attached to a post or comment when it is read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorRef {
  pub id:       UserId,
  pub username: String,
}

/// The group fields attached to a post when it is read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupRef {
  pub id:    GroupId,
  pub title: String,
  pub slug:  String,
}

/// A post with its author and group eagerly joined, as shown in feeds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostView {
  pub id:       PostId,
  pub text:     String,
  pub pub_date: DateTime<Utc>,
  pub author:   AuthorRef,
  pub group:    Option<GroupRef>,
  pub image:    Option<String>,
}

impl PostView {
  pub fn is_authored_by(&self, user: UserId) -> bool { self.author.id == user }
}

impl std::fmt::Display for PostView {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    let short: String = self.text.chars().take(POST_DISPLAY_CHARS).collect();
    f.write_str(&short)
  }
}

/// Input for [`BlogStore::create_post`](crate::store::BlogStore::create_post).
/// There is no way to pass a timestamp; the store assigns it.
#[derive(Debug, Clone)]
pub struct NewPost {
  pub author_id: UserId,
  pub text:      String,
  pub group_id:  Option<GroupId>,
  pub image:     Option<String>,
}

/// The editable fields of a post. Author and publication date are not here.
#[derive(Debug, Clone)]
pub struct PostChanges {
  pub text:     String,
  pub group_id: Option<GroupId>,
  pub image:    Option<String>,
}

// ─── Comments ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
  pub id:        CommentId,
  pub post_id:   PostId,
  pub author_id: UserId,
  pub text:      String,
  pub pub_date:  DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentView {
  pub id:       CommentId,
  pub post_id:  PostId,
  pub author:   AuthorRef,
  pub text:     String,
  pub pub_date: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewComment {
  pub post_id:   PostId,
  pub author_id: UserId,
  pub text:      String,
}

// ─── Follows ─────────────────────────────────────────────────────────────────

/// A directed edge: `user_id` receives `author_id`'s posts in their feed.
/// At most one edge exists per ordered pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Follow {
  pub id:        i64,
  pub user_id:   UserId,
  pub author_id: UserId,
}
