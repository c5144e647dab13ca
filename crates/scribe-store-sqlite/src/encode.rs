//! Encoding and decoding helpers between Rust domain types and the plain
//! column values stored in SQLite.
//!
//! Timestamps are stored as fixed-width RFC 3339 strings in UTC with
//! microsecond precision, so ordering by the text column is chronological.

use chrono::{DateTime, SecondsFormat, Utc};
use scribe_core::model::{
  AuthorRef, CommentView, Group, GroupRef, Post, PostView, User,
};

use crate::{Error, Result};

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

/// The current time truncated to what [`encode_dt`] preserves, so values
/// returned from a write compare equal to the same row read back later.
pub fn now() -> DateTime<Utc> {
  let now = Utc::now();
  DateTime::from_timestamp_micros(now.timestamp_micros()).unwrap_or(now)
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw values read from a `users` row.
pub struct RawUser {
  pub id:            i64,
  pub username:      String,
  pub password_hash: String,
  pub created_at:    String,
}

impl RawUser {
  pub const COLUMNS: &'static str = "id, username, password_hash, created_at";

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:            row.get(0)?,
      username:      row.get(1)?,
      password_hash: row.get(2)?,
      created_at:    row.get(3)?,
    })
  }

  pub fn into_user(self) -> Result<User> {
    Ok(User {
      id:            self.id,
      username:      self.username,
      password_hash: self.password_hash,
      created_at:    decode_dt(&self.created_at)?,
    })
  }
}

pub const GROUP_COLUMNS: &str = "id, title, slug, description";

pub fn group_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Group> {
  Ok(Group {
    id:          row.get(0)?,
    title:       row.get(1)?,
    slug:        row.get(2)?,
    description: row.get(3)?,
  })
}

/// Raw values read from a `posts` row.
pub struct RawPost {
  pub id:        i64,
  pub text:      String,
  pub pub_date:  String,
  pub group_id:  Option<i64>,
  pub author_id: i64,
  pub image:     Option<String>,
}

impl RawPost {
  pub const COLUMNS: &'static str = "id, text, pub_date, group_id, author_id, image";

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:        row.get(0)?,
      text:      row.get(1)?,
      pub_date:  row.get(2)?,
      group_id:  row.get(3)?,
      author_id: row.get(4)?,
      image:     row.get(5)?,
    })
  }

  pub fn into_post(self) -> Result<Post> {
    Ok(Post {
      id:        self.id,
      text:      self.text,
      pub_date:  decode_dt(&self.pub_date)?,
      group_id:  self.group_id,
      author_id: self.author_id,
      image:     self.image,
    })
  }
}

/// Raw values read from `posts` joined with its author and optional group.
pub struct RawPostView {
  pub id:          i64,
  pub text:        String,
  pub pub_date:    String,
  pub image:       Option<String>,
  pub author_id:   i64,
  pub username:    String,
  pub group_id:    Option<i64>,
  pub group_title: Option<String>,
  pub group_slug:  Option<String>,
}

impl RawPostView {
  /// Select list matching [`RawPostView::from_row`]; expects the aliases
  /// `p` (posts), `u` (users) and `g` (blog_groups).
  pub const COLUMNS: &'static str =
    "p.id, p.text, p.pub_date, p.image, u.id, u.username, g.id, g.title, g.slug";

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:          row.get(0)?,
      text:        row.get(1)?,
      pub_date:    row.get(2)?,
      image:       row.get(3)?,
      author_id:   row.get(4)?,
      username:    row.get(5)?,
      group_id:    row.get(6)?,
      group_title: row.get(7)?,
      group_slug:  row.get(8)?,
    })
  }

  pub fn into_view(self) -> Result<PostView> {
    let group = match (self.group_id, self.group_title, self.group_slug) {
      (Some(id), Some(title), Some(slug)) => Some(GroupRef { id, title, slug }),
      _ => None,
    };
    Ok(PostView {
      id: self.id,
      text: self.text,
      pub_date: decode_dt(&self.pub_date)?,
      author: AuthorRef { id: self.author_id, username: self.username },
      group,
      image: self.image,
    })
  }
}

/// Raw values read from `comments` joined with its author.
pub struct RawCommentView {
  pub id:        i64,
  pub post_id:   i64,
  pub author_id: i64,
  pub username:  String,
  pub text:      String,
  pub pub_date:  String,
}

impl RawCommentView {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:        row.get(0)?,
      post_id:   row.get(1)?,
      author_id: row.get(2)?,
      username:  row.get(3)?,
      text:      row.get(4)?,
      pub_date:  row.get(5)?,
    })
  }

  pub fn into_view(self) -> Result<CommentView> {
    Ok(CommentView {
      id:       self.id,
      post_id:  self.post_id,
      author:   AuthorRef { id: self.author_id, username: self.username },
      text:     self.text,
      pub_date: decode_dt(&self.pub_date)?,
    })
  }
}
