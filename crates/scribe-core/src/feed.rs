//! Paginated feeds over [`BlogStore::list_posts`].

use crate::{
  model::{PostView, UserId},
  paginate::{Page, Paginator},
  store::{BlogStore, PostFilter},
};

/// Load one page of the feed selected by `filter`.
///
/// Counts the whole feed first so the requested page can be clamped, then
/// loads only that page's window.
pub async fn load_page<S: BlogStore>(
  store: &S,
  filter: PostFilter,
  requested: Option<&str>,
  paginator: Paginator,
) -> Result<Page<PostView>, S::Error> {
  let total = store.count_posts(filter).await?;
  let info = paginator.page(total, requested);
  let items = store.list_posts(filter, Some(info.window())).await?;
  Ok(Page { info, items })
}

/// Every post, newest first.
pub async fn list_posts<S: BlogStore>(store: &S) -> Result<Vec<PostView>, S::Error> {
  store.list_posts(PostFilter::All, None).await
}

/// Posts by authors `viewer` follows, newest first.
pub async fn list_followed_posts<S: BlogStore>(
  store: &S,
  viewer: UserId,
) -> Result<Vec<PostView>, S::Error> {
  store.list_posts(PostFilter::FollowedBy(viewer), None).await
}
