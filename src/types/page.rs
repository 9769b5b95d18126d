//! Paging types.

/// Zero-based page coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub index: u32,
    pub size: u32,
}

impl PageRequest {
    pub const fn new(index: u32, size: u32) -> Self {
        Self { index, size }
    }

    /// Number of items preceding this page.
    pub fn skip(&self) -> u64 {
        u64::from(self.index) * u64::from(self.size)
    }

    /// Whether items remain after this page given `total` matching items.
    pub fn has_next_page(&self, total: u64) -> bool {
        total > (u64::from(self.index) + 1) * u64::from(self.size)
    }
}

/// One page of results plus whether another page follows.
#[derive(Debug, Clone, PartialEq)]
pub struct PagedResultSet<M> {
    items: Vec<M>,
    has_next_page: bool,
}

impl<M> PagedResultSet<M> {
    pub fn new(items: Vec<M>, has_next_page: bool) -> Self {
        Self {
            items,
            has_next_page,
        }
    }

    /// Build a page from the total number of matching items.
    pub fn from_total(items: Vec<M>, page: PageRequest, total: u64) -> Self {
        Self::new(items, page.has_next_page(total))
    }

    pub fn empty() -> Self {
        Self::new(Vec::new(), false)
    }

    pub fn items(&self) -> &[M] {
        &self.items
    }

    pub fn has_next_page(&self) -> bool {
        self.has_next_page
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn into_items(self) -> Vec<M> {
        self.items
    }

    /// Transform the items, keeping the paging flag.
    pub fn map<U, F>(self, f: F) -> PagedResultSet<U>
    where
        F: FnMut(M) -> U,
    {
        PagedResultSet {
            items: self.items.into_iter().map(f).collect(),
            has_next_page: self.has_next_page,
        }
    }
}

impl<M> IntoIterator for PagedResultSet<M> {
    type Item = M;
    type IntoIter = std::vec::IntoIter<M>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}
