//! Feed, detail and authoring pages for posts.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/` | Home feed; wrapped by the page cache |
//! | `GET`  | `/group/{slug}/` | 404 if the group does not exist |
//! | `GET`  | `/profile/{username}/` | 404 if the user does not exist |
//! | `GET`  | `/posts/{id}/` | Post, comments and an empty comment form |
//! | `GET`/`POST` | `/posts/{id}/edit/` | Author only; others are sent to the detail page |
//! | `POST` | `/posts/{id}/delete/` | Author only |
//! | `GET`/`POST` | `/create/` | Signed-in users |
//! | `POST` | `/posts/{id}/comment/` | Signed-in users |

use axum::{
  Form,
  extract::{Path, Query, State},
  response::Response,
};
use scribe_core::{
  authoring::{self, CreateOutcome, DeleteOutcome, EditOutcome},
  feed,
  follow,
  form::{CommentForm, FormErrors, PostForm},
  model::{PostView, UserId},
  store::{BlogStore, PostFilter},
};
use serde::Deserialize;

use crate::{
  AppState,
  auth::{SignedIn, Viewer},
  error::Error,
  handlers::{detail_url, found, parse_id, profile_url},
  pages::{GroupPage, IndexPage, PostDetailPage, PostFormPage, ProfilePage, render},
};

#[derive(Debug, Default, Deserialize)]
pub struct PageParams {
  /// Raw `?page=` value; resolved leniently by the paginator.
  pub page: Option<String>,
}

async fn load_post<S: BlogStore>(store: &S, raw_id: &str) -> Result<PostView, Error> {
  let id = parse_id(raw_id)?;
  store
    .get_post(id)
    .await
    .map_err(Error::store)?
    .ok_or(Error::NotFound)
}

// ─── Feeds ────────────────────────────────────────────────────────────────────

/// `GET /`
pub async fn index<S>(
  State(state): State<AppState<S>>,
  Query(params): Query<PageParams>,
) -> Result<Response, Error>
where
  S: BlogStore + Clone + Send + Sync + 'static,
{
  let page = feed::load_page(&*state.store, PostFilter::All, params.page.as_deref(), state.paginator())
    .await
    .map_err(Error::store)?;
  Ok(render(IndexPage { page }))
}

/// `GET /group/{slug}/`
pub async fn group_posts<S>(
  State(state): State<AppState<S>>,
  Path(slug): Path<String>,
  Query(params): Query<PageParams>,
) -> Result<Response, Error>
where
  S: BlogStore + Clone + Send + Sync + 'static,
{
  let group = state
    .store
    .get_group_by_slug(&slug)
    .await
    .map_err(Error::store)?
    .ok_or(Error::NotFound)?;

  let page = feed::load_page(
    &*state.store,
    PostFilter::Group(group.id),
    params.page.as_deref(),
    state.paginator(),
  )
  .await
  .map_err(Error::store)?;

  Ok(render(GroupPage { group, page }))
}

/// `GET /profile/{username}/`
pub async fn profile<S>(
  State(state): State<AppState<S>>,
  Path(username): Path<String>,
  Query(params): Query<PageParams>,
  viewer: Viewer,
) -> Result<Response, Error>
where
  S: BlogStore + Clone + Send + Sync + 'static,
{
  let author = state
    .store
    .get_user_by_username(&username)
    .await
    .map_err(Error::store)?
    .ok_or(Error::NotFound)?;

  let page = feed::load_page(
    &*state.store,
    PostFilter::Author(author.id),
    params.page.as_deref(),
    state.paginator(),
  )
  .await
  .map_err(Error::store)?;

  let following = follow::is_following(&*state.store, viewer.id(), author.id)
    .await
    .map_err(Error::store)?;

  Ok(render(ProfilePage { post_count: page.info.total, author, following, page }))
}

// ─── Detail and comments ─────────────────────────────────────────────────────

async fn render_detail<S: BlogStore>(
  store: &S,
  post: PostView,
  form: CommentForm,
  form_errors: FormErrors,
) -> Result<Response, Error> {
  let comments = store.list_comments(post.id).await.map_err(Error::store)?;
  Ok(render(PostDetailPage { post, comments, form, form_errors }))
}

/// `GET /posts/{id}/`
pub async fn post_detail<S>(
  State(state): State<AppState<S>>,
  Path(id): Path<String>,
) -> Result<Response, Error>
where
  S: BlogStore + Clone + Send + Sync + 'static,
{
  let post = load_post(&*state.store, &id).await?;
  render_detail(&*state.store, post, CommentForm::default(), FormErrors::default()).await
}

/// `POST /posts/{id}/comment/`
pub async fn add_comment<S>(
  State(state): State<AppState<S>>,
  SignedIn(user): SignedIn,
  Path(id): Path<String>,
  Form(form): Form<CommentForm>,
) -> Result<Response, Error>
where
  S: BlogStore + Clone + Send + Sync + 'static,
{
  let post = load_post(&*state.store, &id).await?;

  match authoring::add_comment(&*state.store, user.id, &post, &form)
    .await
    .map_err(Error::store)?
  {
    CreateOutcome::Created(comment) => {
      tracing::info!(comment_id = comment.id, post_id = post.id, "comment added");
      Ok(found(&detail_url(post.id)))
    }
    CreateOutcome::Invalid(errors) => render_detail(&*state.store, post, form, errors).await,
  }
}

// ─── Create / edit / delete ──────────────────────────────────────────────────

async fn render_post_form<S: BlogStore>(
  store: &S,
  post_id: Option<i64>,
  form: PostForm,
  form_errors: FormErrors,
) -> Result<Response, Error> {
  let groups = store.list_groups().await.map_err(Error::store)?;
  Ok(render(PostFormPage {
    is_edit: post_id.is_some(),
    post_id,
    form,
    form_errors,
    groups,
  }))
}

/// `GET /create/`
pub async fn create_form<S>(
  State(state): State<AppState<S>>,
  SignedIn(_user): SignedIn,
) -> Result<Response, Error>
where
  S: BlogStore + Clone + Send + Sync + 'static,
{
  render_post_form(&*state.store, None, PostForm::default(), FormErrors::default()).await
}

/// `POST /create/`
pub async fn create_submit<S>(
  State(state): State<AppState<S>>,
  SignedIn(user): SignedIn,
  Form(form): Form<PostForm>,
) -> Result<Response, Error>
where
  S: BlogStore + Clone + Send + Sync + 'static,
{
  let groups = state.store.list_groups().await.map_err(Error::store)?;

  match authoring::create_post(&*state.store, user.id, &form, &groups)
    .await
    .map_err(Error::store)?
  {
    CreateOutcome::Created(_) => Ok(found(&profile_url(&user.username))),
    CreateOutcome::Invalid(errors) => render_post_form(&*state.store, None, form, errors).await,
  }
}

fn not_owner(post: &PostView, user: UserId) -> Response {
  tracing::debug!(post_id = post.id, user, "not the author; redirecting to detail");
  found(&detail_url(post.id))
}

/// `GET /posts/{id}/edit/`
pub async fn edit_form<S>(
  State(state): State<AppState<S>>,
  SignedIn(user): SignedIn,
  Path(id): Path<String>,
) -> Result<Response, Error>
where
  S: BlogStore + Clone + Send + Sync + 'static,
{
  let post = load_post(&*state.store, &id).await?;
  if !post.is_authored_by(user.id) {
    return Ok(not_owner(&post, user.id));
  }

  let form = PostForm {
    text:  Some(post.text.clone()),
    group: post.group.as_ref().map(|g| g.id.to_string()),
    image: post.image.clone(),
  };
  render_post_form(&*state.store, Some(post.id), form, FormErrors::default()).await
}

/// `POST /posts/{id}/edit/`
pub async fn edit_submit<S>(
  State(state): State<AppState<S>>,
  SignedIn(user): SignedIn,
  Path(id): Path<String>,
  Form(form): Form<PostForm>,
) -> Result<Response, Error>
where
  S: BlogStore + Clone + Send + Sync + 'static,
{
  let post = load_post(&*state.store, &id).await?;
  let groups = state.store.list_groups().await.map_err(Error::store)?;

  match authoring::edit_post(&*state.store, user.id, &post, &form, &groups)
    .await
    .map_err(Error::store)?
  {
    EditOutcome::Saved(saved) => {
      tracing::info!(post_id = saved.id, "post edited");
      Ok(found(&detail_url(saved.id)))
    }
    EditOutcome::NotOwner => Ok(not_owner(&post, user.id)),
    EditOutcome::Invalid(errors) => {
      render_post_form(&*state.store, Some(post.id), form, errors).await
    }
    EditOutcome::Gone => Err(Error::NotFound),
  }
}

/// `POST /posts/{id}/delete/`
pub async fn delete<S>(
  State(state): State<AppState<S>>,
  SignedIn(user): SignedIn,
  Path(id): Path<String>,
) -> Result<Response, Error>
where
  S: BlogStore + Clone + Send + Sync + 'static,
{
  let post = load_post(&*state.store, &id).await?;
  match authoring::delete_post(&*state.store, user.id, &post)
    .await
    .map_err(Error::store)?
  {
    DeleteOutcome::Deleted => Ok(found("/")),
    DeleteOutcome::NotOwner => Ok(not_owner(&post, user.id)),
  }
}
