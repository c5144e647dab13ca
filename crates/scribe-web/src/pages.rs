//! Page documents: the serialised context each view renders.
//!
//! Every page is a JSON object whose fields mirror what a template would
//! receive. Feeds always carry a `page` object with the pagination position
//! and the page's `items`.

use axum::{
  Json,
  response::{IntoResponse, Response},
};
use scribe_core::{
  form::{CommentForm, FormErrors, PostForm},
  model::{CommentView, Group, PostView, User},
  paginate::Page,
};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct IndexPage {
  pub page: Page<PostView>,
}

#[derive(Debug, Serialize)]
pub struct GroupPage {
  pub group: Group,
  pub page:  Page<PostView>,
}

#[derive(Debug, Serialize)]
pub struct ProfilePage {
  pub author:     User,
  pub following:  bool,
  pub post_count: u64,
  pub page:       Page<PostView>,
}

#[derive(Debug, Serialize)]
pub struct FollowPage {
  pub page: Page<PostView>,
}

#[derive(Debug, Serialize)]
pub struct PostDetailPage {
  pub post:        PostView,
  pub comments:    Vec<CommentView>,
  pub form:        CommentForm,
  pub form_errors: FormErrors,
}

#[derive(Debug, Serialize)]
pub struct PostFormPage {
  pub is_edit:     bool,
  pub post_id:     Option<i64>,
  pub form:        PostForm,
  pub form_errors: FormErrors,
  /// The choices offered for the `group` field.
  pub groups:      Vec<Group>,
}

#[derive(Debug, Serialize)]
pub struct SignupPage {
  pub username:    String,
  pub form_errors: FormErrors,
}

/// Render a page document as a `200 OK` JSON response.
pub fn render<T: Serialize>(page: T) -> Response { Json(page).into_response() }
