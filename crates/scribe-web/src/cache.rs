//! Whole-page response cache.
//!
//! A process-wide, size-bounded LRU map from feed page (see [`cache_key`]) to
//! the rendered response. An entry is filled by the first successful `GET`
//! and then served verbatim, whatever happens to the underlying data, until
//! [`PageCache::clear`] empties the whole map, the entry outlives the
//! configured TTL, or it is evicted for room. Writes never invalidate
//! anything.

use std::{
  num::NonZeroUsize,
  sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard},
  time::{Duration, Instant},
};

use axum::{
  body::{Body, HttpBody as _},
  extract::{Request, State},
  http::{HeaderName, HeaderValue, Method, StatusCode, Uri, header},
  middleware::Next,
  response::{IntoResponse, Response},
};
use bytes::Bytes;
use lru::LruCache;
use serde::Deserialize;
use sha2::{Digest, Sha256};

/// Largest body the cache will store. Bigger pages are served uncached.
pub const MAX_CACHED_BODY: u64 = 4 * 1024 * 1024;

pub const X_CACHE: HeaderName = HeaderName::from_static("x-cache");

fn default_enabled() -> bool { true }
fn default_ttl_secs() -> u64 { 20 }
fn default_max_entries() -> usize { 256 }

#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
  #[serde(default = "default_enabled")]
  pub enabled:     bool,
  /// Seconds an entry stays servable; `0` keeps entries until cleared.
  #[serde(default = "default_ttl_secs")]
  pub ttl_secs:    u64,
  /// Least recently used pages are evicted beyond this many entries.
  #[serde(default = "default_max_entries")]
  pub max_entries: usize,
}

impl Default for CacheConfig {
  fn default() -> Self {
    Self {
      enabled:     default_enabled(),
      ttl_secs:    default_ttl_secs(),
      max_entries: default_max_entries(),
    }
  }
}

#[derive(Debug, Clone)]
pub struct CachedPage {
  pub status:    StatusCode,
  pub headers:   Vec<(HeaderName, HeaderValue)>,
  pub body:      Bytes,
  pub stored_at: Instant,
}

pub struct PageCache {
  entries: RwLock<LruCache<String, CachedPage>>,
  enabled: bool,
  ttl:     Option<Duration>,
}

impl PageCache {
  /// An empty cache.
  pub fn new(config: &CacheConfig) -> Self {
    let ttl = (config.ttl_secs > 0).then(|| Duration::from_secs(config.ttl_secs));
    let capacity = NonZeroUsize::new(config.max_entries).unwrap_or(NonZeroUsize::MIN);
    Self::with_limits(config.enabled, ttl, capacity)
  }

  pub fn with_limits(enabled: bool, ttl: Option<Duration>, capacity: NonZeroUsize) -> Self {
    Self { entries: RwLock::new(LruCache::new(capacity)), enabled, ttl }
  }

  pub fn is_enabled(&self) -> bool { self.enabled }

  fn read(&self) -> RwLockReadGuard<'_, LruCache<String, CachedPage>> {
    self.entries.read().unwrap_or_else(|poisoned| {
      tracing::warn!("recovered from poisoned page cache lock");
      poisoned.into_inner()
    })
  }

  fn write(&self) -> RwLockWriteGuard<'_, LruCache<String, CachedPage>> {
    self.entries.write().unwrap_or_else(|poisoned| {
      tracing::warn!("recovered from poisoned page cache lock");
      poisoned.into_inner()
    })
  }

  fn is_fresh(&self, page: &CachedPage) -> bool {
    self.ttl.is_none_or(|ttl| page.stored_at.elapsed() < ttl)
  }

  /// A fresh entry for `key`. Expired entries are dropped on the way.
  pub fn get(&self, key: &str) -> Option<CachedPage> {
    let mut entries = self.write();
    let page = entries.get(key)?.clone();
    if self.is_fresh(&page) {
      Some(page)
    } else {
      entries.pop(key);
      None
    }
  }

  pub fn insert(&self, key: String, page: CachedPage) {
    if let Some((evicted, _)) = self.write().push(key.clone(), page)
      && evicted != key
    {
      tracing::debug!(%evicted, "page cache evicted least recently used entry");
    }
  }

  /// Drop every entry, not only the ones affected by a change.
  pub fn clear(&self) {
    let mut entries = self.write();
    let dropped = entries.len();
    entries.clear();
    tracing::info!(dropped, "page cache cleared");
  }

  pub fn len(&self) -> usize { self.read().len() }

  pub fn is_empty(&self) -> bool { self.read().is_empty() }
}

/// Strong ETag over a response body.
pub fn compute_etag(body: &[u8]) -> String {
  format!("\"{}\"", hex::encode(Sha256::digest(body)))
}

/// Cache key for a feed page: the path plus the `page` parameter when it
/// names a page past the first. Every other query parameter is ignored, and
/// `?page=1`, `?page=0` or `?page=junk` all share the bare path's entry.
pub fn cache_key(uri: &Uri) -> String {
  let page = uri
    .query()
    .into_iter()
    .flat_map(|q| url::form_urlencoded::parse(q.as_bytes()))
    .find(|(name, _)| name == "page")
    .and_then(|(_, value)| value.trim().parse::<u64>().ok())
    .filter(|&n| n > 1);

  match page {
    Some(n) => format!("{}?page={n}", uri.path()),
    None => uri.path().to_owned(),
  }
}

fn replay(page: CachedPage) -> Response {
  let mut resp = Response::new(Body::from(page.body));
  *resp.status_mut() = page.status;
  let headers = resp.headers_mut();
  for (name, value) in page.headers {
    headers.append(name, value);
  }
  headers.insert(X_CACHE, HeaderValue::from_static("hit"));
  resp
}

/// Middleware serving and filling [`PageCache`] for the routes it wraps.
///
/// Only `GET` requests are cached, and only `200 OK` responses whose body is
/// known to fit within [`MAX_CACHED_BODY`] are stored.
pub async fn page_cache_layer(
  State(cache): State<Arc<PageCache>>,
  req: Request,
  next: Next,
) -> Response {
  if !cache.is_enabled() || req.method() != Method::GET {
    return next.run(req).await;
  }

  let key = cache_key(req.uri());
  if let Some(page) = cache.get(&key) {
    tracing::debug!(%key, outcome = "hit", "page cache");
    return replay(page);
  }
  tracing::debug!(%key, outcome = "miss", "page cache");

  let resp = next.run(req).await;
  if resp.status() != StatusCode::OK {
    return resp;
  }

  let (mut parts, body) = resp.into_parts();
  match body.size_hint().upper() {
    Some(len) if len <= MAX_CACHED_BODY => {}
    len => {
      tracing::debug!(%key, ?len, "response too large to cache");
      return Response::from_parts(parts, body);
    }
  }

  let body = match axum::body::to_bytes(body, usize::MAX).await {
    Ok(b) => b,
    Err(e) => {
      tracing::warn!(%key, error = %e, "could not buffer response for caching");
      return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }
  };

  if let Ok(etag) = HeaderValue::from_str(&compute_etag(&body)) {
    parts.headers.insert(header::ETAG, etag);
  }

  cache.insert(key, CachedPage {
    status:    parts.status,
    headers:   parts
      .headers
      .iter()
      .map(|(k, v)| (k.clone(), v.clone()))
      .collect(),
    body:      body.clone(),
    stored_at: Instant::now(),
  });

  parts.headers.insert(X_CACHE, HeaderValue::from_static("miss"));
  Response::from_parts(parts, Body::from(body))
}
