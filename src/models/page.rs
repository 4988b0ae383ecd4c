use serde::Serialize;

use crate::error::{Error, Result};

/// A validated request for one page of a dataset.
///
/// Pages are 1-based. Both the page number and the page size must be
/// positive, so the slice bounds can never run backwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageRequest {
    current_page: usize,
    rows_per_page: usize,
}

impl PageRequest {
    pub fn new(current_page: usize, rows_per_page: usize) -> Result<Self> {
        if current_page == 0 {
            return Err(Error::InvalidArgument(
                "page number must be 1 or greater".to_string(),
            ));
        }
        if rows_per_page == 0 {
            return Err(Error::InvalidArgument(
                "rows per page must be 1 or greater".to_string(),
            ));
        }
        Ok(Self {
            current_page,
            rows_per_page,
        })
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    pub fn rows_per_page(&self) -> usize {
        self.rows_per_page
    }

    /// Index of the first row on this page, saturating on overflow
    pub fn start(&self) -> usize {
        (self.current_page - 1).saturating_mul(self.rows_per_page)
    }

    /// Exclusive end index of this page, saturating on overflow
    pub fn end(&self) -> usize {
        self.current_page.saturating_mul(self.rows_per_page)
    }

    /// Slice the requested page out of `items`.
    ///
    /// Out-of-range pages produce an empty vector rather than an error.
    pub fn paginate<T: Clone>(&self, items: &[T]) -> Vec<T> {
        let len = items.len();
        let start = self.start().min(len);
        let end = self.end().min(len);
        items[start..end].to_vec()
    }
}

/// A full dataset together with the page the caller asked for
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PagedData<T> {
    pub all: Vec<T>,
    pub page: Vec<T>,
}

impl<T: Clone> PagedData<T> {
    pub fn new(all: Vec<T>, request: PageRequest) -> Self {
        let page = request.paginate(&all);
        Self { all, page }
    }
}

impl<T> PagedData<T> {
    /// Number of pages needed to show the whole dataset
    pub fn total_pages(&self, rows_per_page: usize) -> usize {
        total_pages(self.all.len(), rows_per_page)
    }

    pub fn into_parts(self) -> (Vec<T>, Vec<T>) {
        (self.all, self.page)
    }
}

/// Ceiling of `len / rows_per_page`; zero rows per page yields zero pages.
pub fn total_pages(len: usize, rows_per_page: usize) -> usize {
    if rows_per_page == 0 {
        return 0;
    }
    len.div_ceil(rows_per_page)
}
