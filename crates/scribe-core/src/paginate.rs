//! Fixed-size pagination over ordered result sets.
//!
//! Page numbers are 1-based and come straight from the `?page=` query
//! parameter, so resolving them never fails: junk resolves to the first page
//! and out-of-range numbers clamp to the nearest valid page.

use serde::Serialize;

use crate::store::Window;

/// Page size of every public feed.
pub const FEED_PAGE_SIZE: u64 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Paginator {
  per_page: u64,
}

impl Default for Paginator {
  fn default() -> Self { Self::new(FEED_PAGE_SIZE) }
}

impl Paginator {
  /// A `per_page` of zero is treated as one.
  pub fn new(per_page: u64) -> Self { Self { per_page: per_page.max(1) } }

  pub fn per_page(&self) -> u64 { self.per_page }

  /// Total number of pages for `total` items. An empty sequence still has one
  /// (empty) page.
  pub fn num_pages(&self, total: u64) -> u64 { total.div_ceil(self.per_page).max(1) }

  /// Resolve a raw page parameter against `total` items.
  pub fn page(&self, total: u64, requested: Option<&str>) -> PageInfo {
    let num_pages = self.num_pages(total);
    let number = match requested.map(str::trim).map(str::parse::<i64>) {
      Some(Ok(n)) if n < 1 => 1,
      Some(Ok(n)) => (n as u64).min(num_pages),
      Some(Err(_)) | None => 1,
    };

    PageInfo {
      number,
      num_pages,
      per_page: self.per_page,
      total,
      has_next: number < num_pages,
      has_previous: number > 1,
      next_page: (number < num_pages).then_some(number + 1),
      previous_page: (number > 1).then(|| number - 1),
    }
  }
}

/// Where a page sits within its sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageInfo {
  pub number:        u64,
  pub num_pages:     u64,
  pub per_page:      u64,
  pub total:         u64,
  pub has_next:      bool,
  pub has_previous:  bool,
  /// Page numbers for the navigation links, absent at either end.
  pub next_page:     Option<u64>,
  pub previous_page: Option<u64>,
}

impl PageInfo {
  pub fn window(&self) -> Window {
    Window { offset: (self.number - 1) * self.per_page, limit: self.per_page }
  }
}

/// One page of items together with its position.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
  #[serde(flatten)]
  pub info:  PageInfo,
  pub items: Vec<T>,
}
