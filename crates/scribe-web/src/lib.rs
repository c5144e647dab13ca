//! HTTP layer for Scribe.
//!
//! Exposes an axum [`Router`] serving the blog's pages as JSON documents,
//! backed by any [`BlogStore`]. The home feed is served through the
//! whole-page [`PageCache`](cache::PageCache).

pub mod auth;
pub mod cache;
pub mod error;
pub mod handlers;
pub mod pages;

pub use error::Error;

use std::{path::PathBuf, sync::Arc};

use axum::{
  Router,
  middleware,
  routing::{get, post},
};
use scribe_core::{
  paginate::{FEED_PAGE_SIZE, Paginator},
  store::BlogStore,
};
use serde::Deserialize;
use tower_http::trace::TraceLayer;

use cache::{CacheConfig, PageCache};
use handlers::{accounts, admin, follow, posts};

// ─── Configuration ────────────────────────────────────────────────────────────

fn default_host() -> String { "127.0.0.1".to_string() }
fn default_port() -> u16 { 8000 }
fn default_store_path() -> PathBuf { PathBuf::from("scribe.db") }
fn default_page_size() -> u64 { FEED_PAGE_SIZE }

/// Runtime server configuration, deserialised from `config.toml` and
/// `SCRIBE_*` environment variables.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:       String,
  #[serde(default = "default_port")]
  pub port:       u16,
  #[serde(default = "default_store_path")]
  pub store_path: PathBuf,
  /// Posts per feed page.
  #[serde(default = "default_page_size")]
  pub page_size:  u64,
  #[serde(default)]
  pub cache:      CacheConfig,
  /// Usernames allowed to clear the page cache.
  #[serde(default)]
  pub admins:     Vec<String>,
}

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      host:       default_host(),
      port:       default_port(),
      store_path: default_store_path(),
      page_size:  default_page_size(),
      cache:      CacheConfig::default(),
      admins:     Vec::new(),
    }
  }
}

impl ServerConfig {
  pub fn is_admin(&self, username: &str) -> bool {
    self.admins.iter().any(|a| a == username)
  }
}

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
#[derive(Clone)]
pub struct AppState<S: BlogStore> {
  pub store:  Arc<S>,
  pub config: Arc<ServerConfig>,
  pub cache:  Arc<PageCache>,
}

impl<S: BlogStore> AppState<S> {
  /// State with an empty page cache built from `config.cache`.
  pub fn new(store: S, config: ServerConfig) -> Self {
    let cache = PageCache::new(&config.cache);
    Self {
      store:  Arc::new(store),
      config: Arc::new(config),
      cache:  Arc::new(cache),
    }
  }

  pub fn paginator(&self) -> Paginator { Paginator::new(self.config.page_size) }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the axum [`Router`] for the site.
pub fn router<S>(state: AppState<S>) -> Router
where
  S: BlogStore + Clone + Send + Sync + 'static,
{
  let page_cache = middleware::from_fn_with_state(state.cache.clone(), cache::page_cache_layer);

  Router::new()
    .route("/",                             get(posts::index::<S>).layer(page_cache))
    .route("/group/{slug}/",                get(posts::group_posts::<S>))
    .route("/profile/{username}/",          get(posts::profile::<S>))
    .route("/profile/{username}/follow/",   get(follow::profile_follow::<S>))
    .route("/profile/{username}/unfollow/", get(follow::profile_unfollow::<S>))
    .route("/posts/{id}/",                  get(posts::post_detail::<S>))
    .route("/posts/{id}/edit/",             get(posts::edit_form::<S>).post(posts::edit_submit::<S>))
    .route("/posts/{id}/delete/",           post(posts::delete::<S>))
    .route("/posts/{id}/comment/",          post(posts::add_comment::<S>))
    .route("/create/",                      get(posts::create_form::<S>).post(posts::create_submit::<S>))
    .route("/follow/",                      get(follow::follow_index::<S>))
    .route("/auth/signup/",                 post(accounts::signup::<S>))
    .route("/admin/cache/clear/",           post(admin::clear_cache::<S>))
    .fallback(handlers::not_found)
    .layer(TraceLayer::new_for_http())
    .with_state(state)
}

// ─── Integration tests ────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use argon2::{Algorithm, Argon2, Params, PasswordHasher, Version, password_hash::SaltString};
  use axum::{
    body::Body,
    http::{Request, StatusCode, header},
    response::Response,
  };
  use base64::Engine as _;
  use base64::engine::general_purpose::STANDARD as B64;
  use rand_core::OsRng;
  use scribe_core::{
    form::REQUIRED,
    model::{NewGroup, NewPost, NewUser, Post, User},
  };
  use scribe_store_sqlite::SqliteStore;
  use serde_json::Value;
  use tower::ServiceExt as _;

  use super::*;

  const PASSWORD: &str = "pw";

  async fn make_state() -> AppState<SqliteStore> {
    make_state_with(ServerConfig { admins: vec!["admin".to_string()], ..ServerConfig::default() }).await
  }

  async fn make_state_with(config: ServerConfig) -> AppState<SqliteStore> {
    let store = SqliteStore::open_in_memory().await.unwrap();
    AppState::new(store, config)
  }

  /// Minimum-cost argon2 so that per-request verification stays fast.
  fn cheap_hash(password: &str) -> String {
    let params = Params::new(8, 1, 1, None).unwrap();
    let salt = SaltString::generate(&mut OsRng);
    Argon2::new(Algorithm::Argon2id, Version::V0x13, params)
      .hash_password(password.as_bytes(), &salt)
      .unwrap()
      .to_string()
  }

  async fn add_user(state: &AppState<SqliteStore>, username: &str) -> User {
    state
      .store
      .create_user(NewUser { username: username.to_string(), password_hash: cheap_hash(PASSWORD) })
      .await
      .unwrap()
  }

  async fn add_post(state: &AppState<SqliteStore>, author: &User, text: &str) -> Post {
    state
      .store
      .create_post(NewPost { author_id: author.id, text: text.to_string(), group_id: None, image: None })
      .await
      .unwrap()
  }

  async fn send(
    state:  &AppState<SqliteStore>,
    method: &str,
    uri:    &str,
    user:   Option<&str>,
    form:   Option<&str>,
  ) -> Response {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(user) = user {
      let creds = B64.encode(format!("{user}:{PASSWORD}"));
      builder = builder.header(header::AUTHORIZATION, format!("Basic {creds}"));
    }
    let body = match form {
      Some(form) => {
        builder = builder.header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
        Body::from(form.to_string())
      }
      None => Body::empty(),
    };
    router(state.clone()).oneshot(builder.body(body).unwrap()).await.unwrap()
  }

  async fn fetch(state: &AppState<SqliteStore>, uri: &str, user: Option<&str>) -> Response {
    send(state, "GET", uri, user, None).await
  }

  async fn body_bytes(resp: Response) -> bytes::Bytes {
    axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap()
  }

  async fn json(resp: Response) -> Value {
    assert_eq!(resp.status(), StatusCode::OK);
    serde_json::from_slice(&body_bytes(resp).await).unwrap()
  }

  fn location(resp: &Response) -> &str {
    assert_eq!(resp.status(), StatusCode::FOUND);
    resp.headers()[header::LOCATION].to_str().unwrap()
  }

  fn item_texts(doc: &Value) -> Vec<&str> {
    doc["page"]["items"]
      .as_array()
      .unwrap()
      .iter()
      .map(|p| p["text"].as_str().unwrap())
      .collect()
  }

  // ── Login redirects ──────────────────────────────────────────────────────────

  #[tokio::test]
  async fn anonymous_requests_to_protected_pages_redirect_to_login() {
    let state = make_state().await;
    let alice = add_user(&state, "alice").await;
    let post = add_post(&state, &alice, "hello").await;

    let cases = [
      ("GET", "/create/".to_string()),
      ("GET", format!("/posts/{}/edit/", post.id)),
      ("GET", "/follow/".to_string()),
      ("GET", "/profile/alice/follow/".to_string()),
      ("GET", "/profile/alice/unfollow/".to_string()),
      ("POST", format!("/posts/{}/comment/", post.id)),
      ("POST", format!("/posts/{}/delete/", post.id)),
    ];
    for (method, uri) in cases {
      let resp = send(&state, method, &uri, None, None).await;
      let expected = format!("/auth/login/?next={}", uri.replace('/', "%2F"));
      assert_eq!(location(&resp), expected, "{method} {uri}");
    }
  }

  #[tokio::test]
  async fn login_redirect_keeps_the_query_string() {
    let state = make_state().await;
    let resp = fetch(&state, "/follow/?page=2", None).await;
    assert_eq!(location(&resp), "/auth/login/?next=%2Ffollow%2F%3Fpage%3D2");
  }

  #[tokio::test]
  async fn wrong_password_is_treated_as_anonymous() {
    let state = make_state().await;
    add_user(&state, "alice").await;

    let creds = B64.encode("alice:not-the-password");
    let req = Request::builder()
      .uri("/follow/")
      .header(header::AUTHORIZATION, format!("Basic {creds}"))
      .body(Body::empty())
      .unwrap();
    let resp = router(state.clone()).oneshot(req).await.unwrap();
    assert_eq!(location(&resp), "/auth/login/?next=%2Ffollow%2F");
  }

  // ── Feeds ────────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn index_lists_newest_first() {
    let state = make_state().await;
    let alice = add_user(&state, "alice").await;
    add_post(&state, &alice, "first").await;
    add_post(&state, &alice, "second").await;

    let doc = json(fetch(&state, "/", None).await).await;
    assert_eq!(item_texts(&doc), ["second", "first"]);
    assert_eq!(doc["page"]["items"][0]["author"]["username"], "alice");
  }

  #[tokio::test]
  async fn feeds_paginate_thirteen_posts_into_ten_and_three() {
    let state = make_state().await;
    let alice = add_user(&state, "alice").await;
    for i in 0..13 {
      add_post(&state, &alice, &format!("post {i}")).await;
    }

    let first = json(fetch(&state, "/", None).await).await;
    assert_eq!(item_texts(&first).len(), 10);
    assert_eq!(first["page"]["number"], 1);
    assert_eq!(first["page"]["num_pages"], 2);
    assert_eq!(first["page"]["has_next"], true);
    assert_eq!(first["page"]["next_page"], 2);
    assert!(first["page"]["previous_page"].is_null());

    let second = json(fetch(&state, "/?page=2", None).await).await;
    assert_eq!(item_texts(&second).len(), 3);
    assert_eq!(second["page"]["has_previous"], true);
    assert_eq!(second["page"]["previous_page"], 1);

    let profile = json(fetch(&state, "/profile/alice/?page=2", None).await).await;
    assert_eq!(item_texts(&profile).len(), 3);
    assert_eq!(profile["post_count"], 13);

    let clamped = json(fetch(&state, "/profile/alice/?page=99", None).await).await;
    assert_eq!(clamped["page"]["number"], 2);

    let garbage = json(fetch(&state, "/profile/alice/?page=abc", None).await).await;
    assert_eq!(garbage["page"]["number"], 1);
  }

  #[tokio::test]
  async fn group_feed_only_shows_group_posts() {
    let state = make_state().await;
    let alice = add_user(&state, "alice").await;
    let group = state
      .store
      .create_group(NewGroup {
        title:       "Cats".into(),
        slug:        "cats".into(),
        description: "All about cats".into(),
      })
      .await
      .unwrap();
    state
      .store
      .create_post(NewPost { author_id: alice.id, text: "meow".into(), group_id: Some(group.id), image: None })
      .await
      .unwrap();
    add_post(&state, &alice, "elsewhere").await;

    let doc = json(fetch(&state, "/group/cats/", None).await).await;
    assert_eq!(doc["group"]["title"], "Cats");
    assert_eq!(item_texts(&doc), ["meow"]);
  }

  #[tokio::test]
  async fn missing_things_are_404() {
    let state = make_state().await;
    for uri in ["/group/nope/", "/profile/nobody/", "/posts/999/", "/posts/abc/", "/no/such/page"] {
      let resp = fetch(&state, uri, None).await;
      assert_eq!(resp.status(), StatusCode::NOT_FOUND, "{uri}");
      let body: Value = serde_json::from_slice(&body_bytes(resp).await).unwrap();
      assert_eq!(body["error"], "not found");
    }
  }

  // ── Page cache ───────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn home_page_is_stale_until_the_cache_is_cleared() {
    let state = make_state().await;
    let alice = add_user(&state, "alice").await;
    add_user(&state, "admin").await;
    add_post(&state, &alice, "old news").await;

    let first = fetch(&state, "/", None).await;
    assert_eq!(first.headers()[cache::X_CACHE], "miss");
    assert!(first.headers().contains_key(header::ETAG));
    let first = body_bytes(first).await;

    add_post(&state, &alice, "breaking").await;

    let second = fetch(&state, "/", None).await;
    assert_eq!(second.headers()[cache::X_CACHE], "hit");
    assert_eq!(body_bytes(second).await, first);

    let cleared = send(&state, "POST", "/admin/cache/clear/", Some("admin"), None).await;
    assert_eq!(cleared.status(), StatusCode::NO_CONTENT);
    assert!(state.cache.is_empty());

    let third = json(fetch(&state, "/", None).await).await;
    assert_eq!(item_texts(&third), ["breaking", "old news"]);
  }

  #[tokio::test]
  async fn disabled_cache_always_renders_fresh() {
    let mut config = ServerConfig::default();
    config.cache.enabled = false;
    let state = make_state_with(config).await;
    let alice = add_user(&state, "alice").await;

    assert!(item_texts(&json(fetch(&state, "/", None).await).await).is_empty());
    add_post(&state, &alice, "fresh").await;
    assert_eq!(item_texts(&json(fetch(&state, "/", None).await).await), ["fresh"]);
    assert!(state.cache.is_empty());
  }

  #[tokio::test]
  async fn unrelated_query_parameters_share_one_cache_entry() {
    let state = make_state().await;
    for i in 0..50 {
      let resp = fetch(&state, &format!("/?junk={i}"), None).await;
      assert_eq!(resp.status(), StatusCode::OK);
    }
    fetch(&state, "/?page=1", None).await;
    fetch(&state, "/?page=abc", None).await;
    assert_eq!(state.cache.len(), 1);

    let resp = fetch(&state, "/?utm_source=feed", None).await;
    assert_eq!(resp.headers()[cache::X_CACHE], "hit");
  }

  #[tokio::test]
  async fn oversized_home_page_is_served_uncached() {
    let state = make_state().await;
    let alice = add_user(&state, "alice").await;
    let big = "x".repeat(5 * 1024 * 1024);
    add_post(&state, &alice, &big).await;

    let resp = fetch(&state, "/", None).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(resp.headers().get(cache::X_CACHE).is_none());
    let doc = json(resp).await;
    assert_eq!(doc["page"]["items"][0]["text"].as_str().unwrap().len(), big.len());
    assert!(state.cache.is_empty());
  }

  #[tokio::test]
  async fn only_admins_can_clear_the_cache() {
    let state = make_state().await;
    add_user(&state, "alice").await;

    fetch(&state, "/", None).await;
    assert_eq!(state.cache.len(), 1);

    let resp = send(&state, "POST", "/admin/cache/clear/", Some("alice"), None).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let resp = send(&state, "POST", "/admin/cache/clear/", None, None).await;
    assert_eq!(location(&resp), "/auth/login/?next=%2Fadmin%2Fcache%2Fclear%2F");
    assert_eq!(state.cache.len(), 1);
  }

  // ── Detail and comments ──────────────────────────────────────────────────────

  #[tokio::test]
  async fn comments_are_attached_and_listed_on_the_detail_page() {
    let state = make_state().await;
    let alice = add_user(&state, "alice").await;
    add_user(&state, "bob").await;
    let post = add_post(&state, &alice, "discuss").await;
    let detail = format!("/posts/{}/", post.id);
    let comment = format!("/posts/{}/comment/", post.id);

    let resp = send(&state, "POST", &comment, Some("bob"), Some("text=nice+post")).await;
    assert_eq!(location(&resp), detail);

    let doc = json(fetch(&state, &detail, None).await).await;
    assert_eq!(doc["post"]["text"], "discuss");
    assert_eq!(doc["comments"][0]["text"], "nice post");
    assert_eq!(doc["comments"][0]["author"]["username"], "bob");
    assert!(doc["form"]["text"].is_null());

    let invalid = json(send(&state, "POST", &comment, Some("bob"), Some("text=")).await).await;
    assert_eq!(invalid["form_errors"]["text"][0], REQUIRED);
    assert_eq!(invalid["comments"].as_array().unwrap().len(), 1);
  }

  // ── Create / edit / delete ───────────────────────────────────────────────────

  #[tokio::test]
  async fn create_post_redirects_to_the_authors_profile() {
    let state = make_state().await;
    add_user(&state, "alice").await;

    let doc = json(fetch(&state, "/create/", Some("alice")).await).await;
    assert_eq!(doc["is_edit"], false);

    let resp = send(&state, "POST", "/create/", Some("alice"), Some("text=hello+world&group=")).await;
    assert_eq!(location(&resp), "/profile/alice/");

    let posts = scribe_core::feed::list_posts(&*state.store).await.unwrap();
    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0].text, "hello world");
    assert_eq!(posts[0].author.username, "alice");
    assert!(posts[0].group.is_none());
  }

  #[tokio::test]
  async fn invalid_post_form_is_rendered_again_with_errors() {
    let state = make_state().await;
    add_user(&state, "alice").await;

    let doc = json(send(&state, "POST", "/create/", Some("alice"), Some("text=&group=999")).await).await;
    assert_eq!(doc["form_errors"]["text"][0], REQUIRED);
    assert!(doc["form_errors"]["group"][0].as_str().unwrap().starts_with("Select a valid choice."));
    assert_eq!(doc["form"]["group"], "999");
    assert!(scribe_core::feed::list_posts(&*state.store).await.unwrap().is_empty());
  }

  #[tokio::test]
  async fn guest_edit_redirects_to_login_and_changes_nothing() {
    let state = make_state().await;
    let alice = add_user(&state, "alice").await;
    let post = add_post(&state, &alice, "original").await;
    let edit = format!("/posts/{}/edit/", post.id);

    let resp = send(&state, "POST", &edit, None, Some("text=vandalised")).await;
    assert!(location(&resp).starts_with("/auth/login/?next="));

    let stored = state.store.get_post(post.id).await.unwrap().unwrap();
    assert_eq!(stored.text, "original");
  }

  #[tokio::test]
  async fn non_author_edit_redirects_to_detail_and_changes_nothing() {
    let state = make_state().await;
    let alice = add_user(&state, "alice").await;
    add_user(&state, "bob").await;
    let post = add_post(&state, &alice, "original").await;
    let edit = format!("/posts/{}/edit/", post.id);
    let detail = format!("/posts/{}/", post.id);

    let resp = fetch(&state, &edit, Some("bob")).await;
    assert_eq!(location(&resp), detail);
    let resp = send(&state, "POST", &edit, Some("bob"), Some("text=hijacked")).await;
    assert_eq!(location(&resp), detail);

    let stored = state.store.get_post(post.id).await.unwrap().unwrap();
    assert_eq!(stored.text, "original");
  }

  #[tokio::test]
  async fn author_edit_saves_and_keeps_author_and_date() {
    let state = make_state().await;
    let alice = add_user(&state, "alice").await;
    let post = add_post(&state, &alice, "draft").await;
    let edit = format!("/posts/{}/edit/", post.id);

    let form = json(fetch(&state, &edit, Some("alice")).await).await;
    assert_eq!(form["is_edit"], true);
    assert_eq!(form["form"]["text"], "draft");

    let resp = send(&state, "POST", &edit, Some("alice"), Some("text=final")).await;
    assert_eq!(location(&resp), format!("/posts/{}/", post.id));

    let stored = state.store.get_post(post.id).await.unwrap().unwrap();
    assert_eq!(stored.text, "final");
    assert_eq!(stored.author.id, alice.id);
    assert_eq!(stored.pub_date, post.pub_date);

    let invalid = json(send(&state, "POST", &edit, Some("alice"), Some("text=+")).await).await;
    assert_eq!(invalid["form_errors"]["text"][0], REQUIRED);
  }

  #[tokio::test]
  async fn only_the_author_can_delete() {
    let state = make_state().await;
    let alice = add_user(&state, "alice").await;
    add_user(&state, "bob").await;
    let post = add_post(&state, &alice, "short-lived").await;
    let delete = format!("/posts/{}/delete/", post.id);

    let resp = send(&state, "POST", &delete, Some("bob"), None).await;
    assert_eq!(location(&resp), format!("/posts/{}/", post.id));
    assert!(state.store.get_post(post.id).await.unwrap().is_some());

    let resp = send(&state, "POST", &delete, Some("alice"), None).await;
    assert_eq!(location(&resp), "/");
    assert!(state.store.get_post(post.id).await.unwrap().is_none());
  }

  // ── Following ────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn follow_feed_tracks_subscriptions() {
    let state = make_state().await;
    let alice = add_user(&state, "alice").await;
    add_user(&state, "bob").await;
    add_user(&state, "carol").await;
    let post = add_post(&state, &alice, "by alice").await;

    let resp = fetch(&state, "/profile/alice/follow/", Some("bob")).await;
    assert_eq!(location(&resp), "/profile/alice/");

    let bob_feed = json(fetch(&state, "/follow/", Some("bob")).await).await;
    assert_eq!(item_texts(&bob_feed), ["by alice"]);
    let item = &bob_feed["page"]["items"][0];
    assert_eq!(item["id"], post.id);
    assert_eq!(item["author"]["username"], "alice");
    assert_eq!(item["author"]["id"], alice.id);
    assert_eq!(item["pub_date"], serde_json::to_value(post.pub_date).unwrap());
    let carol_feed = json(fetch(&state, "/follow/", Some("carol")).await).await;
    assert!(item_texts(&carol_feed).is_empty());

    let resp = fetch(&state, "/profile/alice/unfollow/", Some("bob")).await;
    assert_eq!(location(&resp), "/profile/alice/");
    let bob_feed = json(fetch(&state, "/follow/", Some("bob")).await).await;
    assert!(item_texts(&bob_feed).is_empty());
  }

  #[tokio::test]
  async fn profile_reports_whether_the_viewer_follows() {
    let state = make_state().await;
    add_user(&state, "alice").await;
    add_user(&state, "bob").await;

    let doc = json(fetch(&state, "/profile/alice/", Some("bob")).await).await;
    assert_eq!(doc["following"], false);
    assert!(doc["author"].get("password_hash").is_none());

    fetch(&state, "/profile/alice/follow/", Some("bob")).await;
    let doc = json(fetch(&state, "/profile/alice/", Some("bob")).await).await;
    assert_eq!(doc["following"], true);

    let doc = json(fetch(&state, "/profile/alice/", None).await).await;
    assert_eq!(doc["following"], false);
  }

  #[tokio::test]
  async fn self_follow_and_repeat_follow_change_nothing() {
    let state = make_state().await;
    let alice = add_user(&state, "alice").await;
    let bob = add_user(&state, "bob").await;

    let resp = fetch(&state, "/profile/alice/follow/", Some("alice")).await;
    assert_eq!(location(&resp), "/profile/alice/");
    assert!(!state.store.is_following(alice.id, alice.id).await.unwrap());

    for _ in 0..2 {
      let resp = fetch(&state, "/profile/alice/follow/", Some("bob")).await;
      assert_eq!(location(&resp), "/profile/alice/");
    }
    assert!(state.store.is_following(bob.id, alice.id).await.unwrap());
  }

  #[tokio::test]
  async fn following_an_unknown_user_is_404() {
    let state = make_state().await;
    add_user(&state, "bob").await;
    let resp = fetch(&state, "/profile/ghost/follow/", Some("bob")).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
  }

  // ── Signup ───────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn signup_creates_a_user_once() {
    let state = make_state().await;

    let resp = send(&state, "POST", "/auth/signup/", None, Some("username=carol&password=s3cret")).await;
    assert_eq!(location(&resp), "/");
    let carol = state.store.get_user_by_username("carol").await.unwrap().unwrap();
    assert!(auth::verify_password("s3cret", &carol.password_hash));

    let again = json(send(&state, "POST", "/auth/signup/", None, Some("username=carol&password=x")).await).await;
    assert_eq!(again["username"], "carol");
    assert!(again["form_errors"]["username"][0].as_str().unwrap().contains("already exists"));
  }
}
