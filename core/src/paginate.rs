//! Lazy fixed-size chunking of a record sequence.

/// Most contacts HubSpot accepts in one batch submission.
pub const BATCH_SAVING_SIZE_LIMIT: usize = 1000;

/// Iterator over consecutive pages of at most `page_size` items.
///
/// Pages partition the input in order; only the last one may be short.
/// The iterator is single-pass and pulls from the underlying iterator only
/// as each page is requested.
#[derive(Debug, Clone)]
pub struct Paginate<I> {
    items: I,
    page_size: usize,
}

/// Split `items` into pages of at most `page_size` elements.
///
/// # Panics
/// Panics if `page_size` is zero.
pub fn paginate<I: IntoIterator>(items: I, page_size: usize) -> Paginate<I::IntoIter> {
    assert!(page_size > 0, "page size must be non-zero");
    Paginate {
        items: items.into_iter(),
        page_size,
    }
}

impl<I: Iterator> Iterator for Paginate<I> {
    type Item = Vec<I::Item>;

    fn next(&mut self) -> Option<Self::Item> {
        let page: Vec<_> = self.items.by_ref().take(self.page_size).collect();
        if page.is_empty() {
            None
        } else {
            Some(page)
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let (lower, upper) = self.items.size_hint();
        (
            lower.div_ceil(self.page_size),
            upper.map(|upper| upper.div_ceil(self.page_size)),
        )
    }
}
