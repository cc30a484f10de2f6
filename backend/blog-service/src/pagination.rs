//! Page-number pagination
//!
//! Listings are sliced into fixed-size pages addressed by a 1-based page number.
//! Out-of-range requests are clamped instead of failing: anything below 1 is page
//! 1, anything past the end is the last page. An empty listing has zero pages and
//! is served as an empty page 1.

use serde::Deserialize;

/// Posts per page when nothing else is configured
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// The `?page=` query string parameter
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<String>,
}

impl PageQuery {
    pub fn requested(&self) -> RequestedPage {
        RequestedPage::parse(self.page.as_deref())
    }
}

/// A page number as asked for by the client, before clamping
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RequestedPage(i64);

impl RequestedPage {
    pub fn new(number: i64) -> Self {
        Self(number)
    }

    /// Absent or non-integer input means page 1.
    pub fn parse(raw: Option<&str>) -> Self {
        raw.and_then(|value| value.trim().parse::<i64>().ok())
            .map(Self)
            .unwrap_or_default()
    }

    pub fn get(&self) -> i64 {
        self.0
    }
}

impl Default for RequestedPage {
    fn default() -> Self {
        Self(1)
    }
}

impl From<i64> for RequestedPage {
    fn from(number: i64) -> Self {
        Self(number)
    }
}

/// Resolved slice bounds for one page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub number: usize,
    pub per_page: usize,
    pub offset: usize,
    pub limit: usize,
    pub total_pages: usize,
    pub total_count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Paginator {
    per_page: usize,
}

impl Default for Paginator {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

impl Paginator {
    /// A page size of zero falls back to [`DEFAULT_PAGE_SIZE`].
    pub fn new(per_page: usize) -> Self {
        let per_page = if per_page == 0 {
            DEFAULT_PAGE_SIZE
        } else {
            per_page
        };
        Self { per_page }
    }

    pub fn per_page(&self) -> usize {
        self.per_page
    }

    pub fn total_pages(&self, total_count: usize) -> usize {
        total_count.div_ceil(self.per_page)
    }

    pub fn window(&self, total_count: usize, requested: RequestedPage) -> PageWindow {
        let total_pages = self.total_pages(total_count);
        let last = total_pages.max(1) as i64;
        let number = requested.get().clamp(1, last) as usize;

        PageWindow {
            number,
            per_page: self.per_page,
            offset: (number - 1) * self.per_page,
            limit: self.per_page,
            total_pages,
            total_count,
        }
    }

    /// Slice an already ordered in-memory sequence.
    pub fn paginate<T>(&self, items: Vec<T>, requested: RequestedPage) -> Page<T> {
        let window = self.window(items.len(), requested);
        let items = items
            .into_iter()
            .skip(window.offset)
            .take(window.limit)
            .collect();
        Page::from_window(items, window)
    }
}

/// One page of a listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub number: usize,
    pub per_page: usize,
    pub total_pages: usize,
    pub total_count: usize,
    pub has_next: bool,
    pub has_previous: bool,
}

impl<T> Page<T> {
    pub fn from_window(items: Vec<T>, window: PageWindow) -> Self {
        Self {
            items,
            number: window.number,
            per_page: window.per_page,
            total_pages: window.total_pages,
            total_count: window.total_count,
            has_next: window.number < window.total_pages,
            has_previous: window.number > 1,
        }
    }

    pub fn next_page_number(&self) -> Option<usize> {
        self.has_next.then(|| self.number + 1)
    }

    pub fn previous_page_number(&self) -> Option<usize> {
        self.has_previous.then(|| self.number - 1)
    }

    pub fn map<U, F>(self, f: F) -> Page<U>
    where
        F: FnMut(T) -> U,
    {
        Page {
            items: self.items.into_iter().map(f).collect(),
            number: self.number,
            per_page: self.per_page,
            total_pages: self.total_pages,
            total_count: self.total_count,
            has_next: self.has_next,
            has_previous: self.has_previous,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_requested_page() {
        assert_eq!(RequestedPage::parse(None).get(), 1);
        assert_eq!(RequestedPage::parse(Some("3")).get(), 3);
        assert_eq!(RequestedPage::parse(Some("abc")).get(), 1);
        assert_eq!(RequestedPage::parse(Some("-4")).get(), -4);
        assert_eq!(RequestedPage::parse(Some("")).get(), 1);
    }

    #[test]
    fn test_zero_page_size_uses_default() {
        assert_eq!(Paginator::new(0).per_page(), DEFAULT_PAGE_SIZE);
    }

    #[test]
    fn test_thirteen_items_split_ten_and_three() {
        let paginator = Paginator::new(10);
        let items: Vec<u32> = (0..13).collect();

        let first = paginator.paginate(items.clone(), RequestedPage::new(1));
        assert_eq!(first.items.len(), 10);
        assert_eq!(first.total_pages, 2);
        assert!(first.has_next);
        assert!(!first.has_previous);
        assert_eq!(first.next_page_number(), Some(2));

        let second = paginator.paginate(items, RequestedPage::new(2));
        assert_eq!(second.items, vec![10, 11, 12]);
        assert!(!second.has_next);
        assert_eq!(second.previous_page_number(), Some(1));
    }

    #[test]
    fn test_every_page_but_last_is_full() {
        for per_page in 1..=7usize {
            let paginator = Paginator::new(per_page);
            for total in 0..=30usize {
                let expected_pages = (total + per_page - 1) / per_page;
                assert_eq!(paginator.total_pages(total), expected_pages);

                let items: Vec<usize> = (0..total).collect();
                let mut seen = Vec::new();
                for number in 1..=expected_pages {
                    let page = paginator.paginate(items.clone(), RequestedPage::new(number as i64));
                    if number < expected_pages {
                        assert_eq!(page.items.len(), per_page);
                    } else {
                        assert!(!page.items.is_empty() && page.items.len() <= per_page);
                    }
                    seen.extend(page.items);
                }
                assert_eq!(seen, items);
            }
        }
    }

    #[test]
    fn test_out_of_range_pages_are_clamped() {
        let paginator = Paginator::new(10);
        assert_eq!(paginator.window(25, RequestedPage::new(0)).number, 1);
        assert_eq!(paginator.window(25, RequestedPage::new(-2)).number, 1);

        let last = paginator.window(25, RequestedPage::new(99));
        assert_eq!(last.number, 3);
        assert_eq!(last.offset, 20);
    }

    #[test]
    fn test_empty_collection_is_page_one() {
        let page = Paginator::new(10).paginate(Vec::<u8>::new(), RequestedPage::new(5));
        assert_eq!(page.number, 1);
        assert_eq!(page.total_pages, 0);
        assert!(page.items.is_empty());
        assert!(!page.has_next);
        assert!(!page.has_previous);
    }

    #[test]
    fn test_map_keeps_position() {
        let page = Paginator::new(2).paginate(vec![1, 2, 3], RequestedPage::new(2));
        let mapped = page.map(|n| n * 10);
        assert_eq!(mapped.items, vec![30]);
        assert_eq!(mapped.number, 2);
        assert!(mapped.has_previous);
    }
}
