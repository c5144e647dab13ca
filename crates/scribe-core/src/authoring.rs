//! Creating, editing and deleting posts and comments on behalf of a user.
//!
//! Ownership failures are outcomes, not errors: a non-author who tries to
//! change a post gets [`EditOutcome::NotOwner`] and the caller decides how to
//! present it.

use crate::{
  form::{CommentForm, FormErrors, PostForm},
  model::{Comment, Group, NewComment, NewPost, Post, PostChanges, PostView, UserId},
  store::BlogStore,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreateOutcome<T> {
  Created(T),
  Invalid(FormErrors),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditOutcome {
  Saved(Post),
  NotOwner,
  Invalid(FormErrors),
  /// The post disappeared between lookup and write.
  Gone,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
  Deleted,
  NotOwner,
}

fn group_lookup(groups: &[Group]) -> impl Fn(i64) -> bool + '_ {
  move |id| groups.iter().any(|g| g.id == id)
}

/// Publish a post with `author` as its author.
pub async fn create_post<S: BlogStore>(
  store: &S,
  author: UserId,
  form: &PostForm,
  groups: &[Group],
) -> Result<CreateOutcome<Post>, S::Error> {
  let clean = match form.clean(group_lookup(groups)) {
    Ok(clean) => clean,
    Err(errors) => return Ok(CreateOutcome::Invalid(errors)),
  };
  let post = store
    .create_post(NewPost {
      author_id: author,
      text:      clean.text,
      group_id:  clean.group_id,
      image:     clean.image,
    })
    .await?;
  tracing::info!(post_id = post.id, author, "post created");
  Ok(CreateOutcome::Created(post))
}

/// Apply an edit. Ownership is checked before the form is looked at.
pub async fn edit_post<S: BlogStore>(
  store: &S,
  editor: UserId,
  post: &PostView,
  form: &PostForm,
  groups: &[Group],
) -> Result<EditOutcome, S::Error> {
  if !post.is_authored_by(editor) {
    return Ok(EditOutcome::NotOwner);
  }
  let clean = match form.clean(group_lookup(groups)) {
    Ok(clean) => clean,
    Err(errors) => return Ok(EditOutcome::Invalid(errors)),
  };
  let changes = PostChanges {
    text:     clean.text,
    group_id: clean.group_id,
    image:    clean.image.or_else(|| post.image.clone()),
  };
  Ok(match store.update_post(post.id, changes).await? {
    Some(saved) => EditOutcome::Saved(saved),
    None => EditOutcome::Gone,
  })
}

pub async fn delete_post<S: BlogStore>(
  store: &S,
  requester: UserId,
  post: &PostView,
) -> Result<DeleteOutcome, S::Error> {
  if !post.is_authored_by(requester) {
    return Ok(DeleteOutcome::NotOwner);
  }
  store.delete_post(post.id).await?;
  tracing::info!(post_id = post.id, "post deleted");
  Ok(DeleteOutcome::Deleted)
}

/// Attach a comment by `author` to `post`.
pub async fn add_comment<S: BlogStore>(
  store: &S,
  author: UserId,
  post: &PostView,
  form: &CommentForm,
) -> Result<CreateOutcome<Comment>, S::Error> {
  let text = match form.clean() {
    Ok(text) => text,
    Err(errors) => return Ok(CreateOutcome::Invalid(errors)),
  };
  let comment = store
    .add_comment(NewComment { post_id: post.id, author_id: author, text })
    .await?;
  Ok(CreateOutcome::Created(comment))
}
