//! [`SqliteStore`]: the SQLite implementation of [`BlogStore`].

use std::path::Path;

use rusqlite::OptionalExtension as _;
use scribe_core::{
  model::{
    Comment, CommentView, Follow, Group, GroupId, NewComment, NewGroup, NewPost,
    NewUser, Post, PostChanges, PostId, PostView, User, UserId,
  },
  store::{BlogStore, PostFilter, Window},
};

use crate::{
  encode::{
    GROUP_COLUMNS, RawCommentView, RawPost, RawPostView, RawUser, encode_dt,
    group_from_row, now,
  },
  schema::SCHEMA,
  Error, Result,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Scribe store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

/// `WHERE` clause and its bound values for a feed filter. Expects the posts
/// table to be aliased as `p`.
fn filter_clause(filter: PostFilter) -> (&'static str, Vec<i64>) {
  match filter {
    PostFilter::All => ("", vec![]),
    PostFilter::Group(id) => ("WHERE p.group_id = ?", vec![id]),
    PostFilter::Author(id) => ("WHERE p.author_id = ?", vec![id]),
    PostFilter::FollowedBy(id) => (
      "WHERE p.author_id IN (SELECT f.author_id FROM follows f WHERE f.user_id = ?)",
      vec![id],
    ),
  }
}

fn to_sql_int(n: u64) -> i64 { i64::try_from(n).unwrap_or(i64::MAX) }

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, mainly for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    tracing::debug!("schema initialised");
    Ok(())
  }

  async fn get_raw_post(&self, id: PostId) -> Result<Option<Post>> {
    let raw: Option<RawPost> = self
      .conn
      .call(move |conn| {
        let sql = format!("SELECT {} FROM posts WHERE id = ?1", RawPost::COLUMNS);
        Ok(conn.query_row(&sql, [id], RawPost::from_row).optional()?)
      })
      .await?;
    raw.map(RawPost::into_post).transpose()
  }

  async fn get_user_where(&self, column: &'static str, value: rusqlite::types::Value) -> Result<Option<User>> {
    let raw: Option<RawUser> = self
      .conn
      .call(move |conn| {
        let sql = format!("SELECT {} FROM users WHERE {column} = ?1", RawUser::COLUMNS);
        Ok(conn.query_row(&sql, [value], RawUser::from_row).optional()?)
      })
      .await?;
    raw.map(RawUser::into_user).transpose()
  }

  async fn get_group_where(&self, column: &'static str, value: rusqlite::types::Value) -> Result<Option<Group>> {
    Ok(
      self
        .conn
        .call(move |conn| {
          let sql = format!("SELECT {GROUP_COLUMNS} FROM blog_groups WHERE {column} = ?1");
          Ok(conn.query_row(&sql, [value], group_from_row).optional()?)
        })
        .await?,
    )
  }

  /// Run a `DELETE` and report whether any row went away.
  async fn delete_by_id(&self, table: &'static str, id: i64) -> Result<bool> {
    let removed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(&format!("DELETE FROM {table} WHERE id = ?1"), [id])?)
      })
      .await?;
    Ok(removed > 0)
  }
}

// ─── BlogStore impl ──────────────────────────────────────────────────────────

impl BlogStore for SqliteStore {
  type Error = Error;

  // ── Users ─────────────────────────────────────────────────────────────────

  async fn create_user(&self, input: NewUser) -> Result<User> {
    let created_at = now();
    let username = input.username.clone();
    let hash = input.password_hash.clone();
    let at_str = encode_dt(created_at);

    let id = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO users (username, password_hash, created_at) VALUES (?1, ?2, ?3)",
          rusqlite::params![username, hash, at_str],
        )?;
        Ok(conn.last_insert_rowid())
      })
      .await
      .map_err(|e| Error::from_insert(e, "username already taken"))?;

    Ok(User {
      id,
      username: input.username,
      password_hash: input.password_hash,
      created_at,
    })
  }

  async fn get_user(&self, id: UserId) -> Result<Option<User>> {
    self.get_user_where("id", id.into()).await
  }

  async fn get_user_by_username(&self, username: &str) -> Result<Option<User>> {
    self.get_user_where("username", username.to_owned().into()).await
  }

  async fn delete_user(&self, id: UserId) -> Result<bool> {
    self.delete_by_id("users", id).await
  }

  // ── Groups ────────────────────────────────────────────────────────────────

  async fn create_group(&self, input: NewGroup) -> Result<Group> {
    let NewGroup { title, slug, description } = input.clone();

    let id = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO blog_groups (title, slug, description) VALUES (?1, ?2, ?3)",
          rusqlite::params![title, slug, description],
        )?;
        Ok(conn.last_insert_rowid())
      })
      .await
      .map_err(|e| Error::from_insert(e, "group slug already taken"))?;

    Ok(Group {
      id,
      title: input.title,
      slug: input.slug,
      description: input.description,
    })
  }

  async fn get_group_by_slug(&self, slug: &str) -> Result<Option<Group>> {
    self.get_group_where("slug", slug.to_owned().into()).await
  }

  async fn list_groups(&self) -> Result<Vec<Group>> {
    Ok(
      self
        .conn
        .call(|conn| {
          let mut stmt = conn.prepare(&format!(
            "SELECT {GROUP_COLUMNS} FROM blog_groups ORDER BY title, id"
          ))?;
          let rows = stmt
            .query_map([], group_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
          Ok(rows)
        })
        .await?,
    )
  }

  async fn delete_group(&self, id: GroupId) -> Result<bool> {
    self.delete_by_id("blog_groups", id).await
  }

  // ── Posts ─────────────────────────────────────────────────────────────────

  async fn create_post(&self, input: NewPost) -> Result<Post> {
    let pub_date = now();
    let at_str = encode_dt(pub_date);
    let NewPost { author_id, text, group_id, image } = input.clone();

    let id = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO posts (text, pub_date, group_id, author_id, image)
           VALUES (?1, ?2, ?3, ?4, ?5)",
          rusqlite::params![text, at_str, group_id, author_id, image],
        )?;
        Ok(conn.last_insert_rowid())
      })
      .await?;

    Ok(Post {
      id,
      text: input.text,
      pub_date,
      group_id: input.group_id,
      author_id: input.author_id,
      image: input.image,
    })
  }

  async fn get_post(&self, id: PostId) -> Result<Option<PostView>> {
    let raw: Option<RawPostView> = self
      .conn
      .call(move |conn| {
        let sql = format!(
          "SELECT {}
           FROM posts p
           JOIN users u            ON u.id = p.author_id
           LEFT JOIN blog_groups g ON g.id = p.group_id
           WHERE p.id = ?1",
          RawPostView::COLUMNS,
        );
        Ok(conn.query_row(&sql, [id], RawPostView::from_row).optional()?)
      })
      .await?;

    raw.map(RawPostView::into_view).transpose()
  }

  async fn update_post(&self, id: PostId, changes: PostChanges) -> Result<Option<Post>> {
    let PostChanges { text, group_id, image } = changes;

    let updated = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE posts SET text = ?1, group_id = ?2, image = ?3 WHERE id = ?4",
          rusqlite::params![text, group_id, image, id],
        )?)
      })
      .await?;

    if updated == 0 {
      return Ok(None);
    }
    self.get_raw_post(id).await
  }

  async fn delete_post(&self, id: PostId) -> Result<bool> {
    self.delete_by_id("posts", id).await
  }

  async fn list_posts(
    &self,
    filter: PostFilter,
    window: Option<Window>,
  ) -> Result<Vec<PostView>> {
    let (where_clause, mut params) = filter_clause(filter);
    match window {
      Some(w) => params.extend([to_sql_int(w.limit), to_sql_int(w.offset)]),
      // A negative LIMIT means "no limit" to SQLite.
      None => params.extend([-1, 0]),
    }

    let raws: Vec<RawPostView> = self
      .conn
      .call(move |conn| {
        let sql = format!(
          "SELECT {}
           FROM posts p
           JOIN users u            ON u.id = p.author_id
           LEFT JOIN blog_groups g ON g.id = p.group_id
           {where_clause}
           ORDER BY p.pub_date DESC, p.id DESC
           LIMIT ? OFFSET ?",
          RawPostView::COLUMNS,
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params_from_iter(params), RawPostView::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawPostView::into_view).collect()
  }

  async fn count_posts(&self, filter: PostFilter) -> Result<u64> {
    let (where_clause, params) = filter_clause(filter);

    let count: i64 = self
      .conn
      .call(move |conn| {
        let sql = format!("SELECT COUNT(*) FROM posts p {where_clause}");
        Ok(conn.query_row(&sql, rusqlite::params_from_iter(params), |r| r.get(0))?)
      })
      .await?;

    Ok(u64::try_from(count).unwrap_or(0))
  }

  // ── Comments ──────────────────────────────────────────────────────────────

  async fn add_comment(&self, input: NewComment) -> Result<Comment> {
    let pub_date = now();
    let at_str = encode_dt(pub_date);
    let NewComment { post_id, author_id, text } = input.clone();

    let id = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO comments (post_id, author_id, text, pub_date) VALUES (?1, ?2, ?3, ?4)",
          rusqlite::params![post_id, author_id, text, at_str],
        )?;
        Ok(conn.last_insert_rowid())
      })
      .await?;

    Ok(Comment {
      id,
      post_id: input.post_id,
      author_id: input.author_id,
      text: input.text,
      pub_date,
    })
  }

  async fn list_comments(&self, post_id: PostId) -> Result<Vec<CommentView>> {
    let raws: Vec<RawCommentView> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT c.id, c.post_id, u.id, u.username, c.text, c.pub_date
           FROM comments c
           JOIN users u ON u.id = c.author_id
           WHERE c.post_id = ?1
           ORDER BY c.pub_date, c.id",
        )?;
        let rows = stmt
          .query_map([post_id], RawCommentView::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawCommentView::into_view).collect()
  }

  // ── Follow edges ──────────────────────────────────────────────────────────

  async fn add_follow(&self, user: UserId, author: UserId) -> Result<Follow> {
    let id = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO follows (user_id, author_id) VALUES (?1, ?2)",
          [user, author],
        )?;
        Ok(conn.last_insert_rowid())
      })
      .await
      .map_err(|e| Error::from_insert(e, "follow edge already exists"))?;

    Ok(Follow { id, user_id: user, author_id: author })
  }

  async fn remove_follow(&self, user: UserId, author: UserId) -> Result<bool> {
    let removed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM follows WHERE user_id = ?1 AND author_id = ?2",
          [user, author],
        )?)
      })
      .await?;
    Ok(removed > 0)
  }

  async fn is_following(&self, user: UserId, author: UserId) -> Result<bool> {
    Ok(
      self
        .conn
        .call(move |conn| {
          Ok(
            conn
              .query_row(
                "SELECT 1 FROM follows WHERE user_id = ?1 AND author_id = ?2",
                [user, author],
                |_| Ok(true),
              )
              .optional()?
              .unwrap_or(false),
          )
        })
        .await?,
    )
  }
}
