/// Offset-based window into a newest-first listing
///
/// # Example
/// ```
/// use vyapari_core_db::repository::pagination::PageRequest;
///
/// let recent = PageRequest::first(10); // the ten newest dates
/// assert_eq!(recent.next().offset, 10);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    /// Maximum number of items to return
    pub limit: usize,
    /// Number of items to skip
    pub offset: usize,
}

impl PageRequest {
    pub fn new(limit: usize, offset: usize) -> Self {
        Self { limit, offset }
    }

    /// The first `limit` items.
    pub fn first(limit: usize) -> Self {
        Self { limit, offset: 0 }
    }

    /// The request for the page following this one.
    pub fn next(&self) -> Self {
        Self {
            limit: self.limit,
            offset: self.offset + self.limit,
        }
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self { limit: 10, offset: 0 }
    }
}

/// A slice of a listing plus the size of the full listing
///
/// # Example
/// ```
/// use vyapari_core_db::repository::pagination::{Page, PageRequest};
///
/// let page = Page::slice(vec![5, 4, 3, 2, 1], PageRequest::first(2));
/// assert_eq!(page.items, vec![5, 4]);
/// assert_eq!(page.total, 5);
/// assert!(page.has_more());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Total number of items across all pages
    pub total: usize,
    pub limit: usize,
    pub offset: usize,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total: usize, limit: usize, offset: usize) -> Self {
        Self {
            items,
            total,
            limit,
            offset,
        }
    }

    /// Cut one page out of an already ordered listing.
    pub fn slice(all: Vec<T>, request: PageRequest) -> Self {
        let total = all.len();
        let items = all.into_iter().skip(request.offset).take(request.limit).collect();
        Self::new(items, total, request.limit, request.offset)
    }

    pub fn empty(request: PageRequest) -> Self {
        Self::new(Vec::new(), 0, request.limit, request.offset)
    }

    /// Check if there are more items after this page
    pub fn has_more(&self) -> bool {
        self.offset + self.items.len() < self.total
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
