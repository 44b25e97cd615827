//! Page-based pagination over a fully materialised result set.
//!
//! Pages are 1-indexed. A request past the last page yields an empty item
//! list with a valid summary (`has_next == false`).

use serde::{Deserialize, Serialize};

/// Which window of a listing to return.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
  page:     usize,
  per_page: usize,
}

impl PageRequest {
  pub const DEFAULT_PER_PAGE: usize = 8;

  /// Build a request; `page` and `per_page` below 1 are clamped to 1.
  pub fn new(page: usize, per_page: usize) -> Self {
    Self { page: page.max(1), per_page: per_page.max(1) }
  }

  pub fn page(&self) -> usize { self.page }

  pub fn per_page(&self) -> usize { self.per_page }

  /// Index of the first item on this page.
  pub fn offset(&self) -> usize { (self.page - 1).saturating_mul(self.per_page) }
}

impl Default for PageRequest {
  fn default() -> Self { Self::new(1, Self::DEFAULT_PER_PAGE) }
}

/// One window of a listing plus its pagination summary. Never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<T> {
  pub items:       Vec<T>,
  pub page:        usize,
  pub per_page:    usize,
  pub total:       usize,
  pub total_pages: usize,
  pub has_prev:    bool,
  pub has_next:    bool,
  pub prev_page:   Option<usize>,
  pub next_page:   Option<usize>,
}

impl<T> Page<T> {
  /// Slice `all` down to the window selected by `request`.
  pub fn from_all(all: Vec<T>, request: PageRequest) -> Self {
    let total = all.len();
    let page = request.page();
    let per_page = request.per_page();
    let total_pages = total.div_ceil(per_page);

    let items: Vec<T> = all
      .into_iter()
      .skip(request.offset())
      .take(per_page)
      .collect();

    let has_prev = page > 1;
    let has_next = page < total_pages;

    Self {
      items,
      page,
      per_page,
      total,
      total_pages,
      has_prev,
      has_next,
      prev_page: has_prev.then(|| page - 1),
      next_page: has_next.then(|| page + 1),
    }
  }

  /// An empty first page.
  pub fn empty(per_page: usize) -> Self {
    Self::from_all(Vec::new(), PageRequest::new(1, per_page))
  }

  pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
    Page {
      items:       self.items.into_iter().map(f).collect(),
      page:        self.page,
      per_page:    self.per_page,
      total:       self.total,
      total_pages: self.total_pages,
      has_prev:    self.has_prev,
      has_next:    self.has_next,
      prev_page:   self.prev_page,
      next_page:   self.next_page,
    }
  }
}
