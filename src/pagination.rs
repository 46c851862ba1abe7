//! Page window over the remote result set.
//!
//! Pages are 1-based. `total_pages` comes from the API's reported hit count
//! (see [`normalize::total_pages`](crate::normalize::total_pages)) and is
//! never less than 1, so `1 ≤ current ≤ total` always holds.

/// Current page and page count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    current_page: u32,
    total_pages: u32,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            current_page: 1,
            total_pages: 1,
        }
    }
}

impl Pagination {
    pub fn current_page(&self) -> u32 {
        self.current_page
    }

    pub fn total_pages(&self) -> u32 {
        self.total_pages
    }

    pub fn has_previous(&self) -> bool {
        self.current_page > 1
    }

    pub fn has_next(&self) -> bool {
        self.current_page < self.total_pages
    }

    /// Move to page `n`. Out-of-range requests are dropped.
    ///
    /// Returns `true` only when the current page actually changed.
    pub fn go_to_page(&mut self, n: u32) -> bool {
        if n < 1 || n > self.total_pages || n == self.current_page {
            return false;
        }
        self.current_page = n;
        true
    }

    /// Back to page 1; the page count is kept until the next response.
    pub fn reset(&mut self) {
        self.current_page = 1;
    }

    /// Record a new page count, pulling the current page in if it now lies
    /// past the end.
    pub fn set_total_pages(&mut self, total: u32) {
        self.total_pages = total.max(1);
        self.current_page = self.current_page.min(self.total_pages);
    }
}
