use crate::record::ProductRecord;

/// Records shown per page
pub const PAGE_SIZE: usize = 20;

/// Slice of `items` for a 1-based page, clipped to bounds
pub fn page<T>(items: &[T], page_number: usize) -> &[T] {
    let Some(start) = page_number
        .checked_sub(1)
        .and_then(|p| p.checked_mul(PAGE_SIZE))
    else {
        return &[];
    };
    if start >= items.len() {
        return &[];
    }
    let end = (start + PAGE_SIZE).min(items.len());
    &items[start..end]
}

/// Number of pages needed for `len` items (0 when empty)
pub fn page_count(len: usize) -> usize {
    len.div_ceil(PAGE_SIZE)
}

/// Move by `delta` pages, staying put when the move would leave `[1, page_count]`
pub fn change_page(current: usize, delta: isize, page_count: usize) -> usize {
    match current.checked_add_signed(delta) {
        Some(next) if (1..=page_count).contains(&next) => next,
        _ => current,
    }
}

/// Results of the current query plus the page being viewed
#[derive(Debug, Clone, Default)]
pub struct ResultSet {
    records: Vec<ProductRecord>,
    current_page: usize,
}

impl ResultSet {
    /// A fresh result set always starts on page 1
    pub fn new(records: Vec<ProductRecord>) -> Self {
        Self {
            records,
            current_page: 1,
        }
    }

    pub fn records(&self) -> &[ProductRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    pub fn page_count(&self) -> usize {
        page_count(self.records.len())
    }

    /// Records on the current page
    pub fn current(&self) -> &[ProductRecord] {
        page(&self.records, self.current_page)
    }

    /// Jump to a page; out-of-range requests are ignored. Returns the page now shown.
    pub fn go_to(&mut self, page_number: usize) -> usize {
        if (1..=self.page_count()).contains(&page_number) {
            self.current_page = page_number;
        }
        self.current_page
    }

    /// Step by `delta` pages. Returns the page now shown.
    pub fn change_page(&mut self, delta: isize) -> usize {
        self.current_page = change_page(self.current_page, delta, self.page_count());
        self.current_page
    }

    pub fn has_prev(&self) -> bool {
        self.current_page > 1
    }

    pub fn has_next(&self) -> bool {
        self.current_page < self.page_count()
    }
}
