/// Page-number pagination over a stably ordered listing
///
/// Page numbers are 1-based. An absent or unparsable number means page 1, a
/// number below 1 clamps to 1 and a number past the end clamps to the last
/// page, so a request never fails on its page parameter. An empty listing
/// still has one (empty) page.
use crate::db::Window;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Paginator {
    per_page: u64,
}

/// Resolved position of a page inside a listing of `total` items
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub number: u64,
    pub num_pages: u64,
    pub total: u64,
    pub window: Window,
}

/// One page of a listing plus the navigation metadata templates need
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page<T> {
    pub object_list: Vec<T>,
    pub number: u64,
    pub num_pages: u64,
    pub count: u64,
    pub per_page: u64,
    pub has_next: bool,
    pub has_previous: bool,
    pub next_page_number: Option<u64>,
    pub previous_page_number: Option<u64>,
}

impl Paginator {
    /// Page size is clamped to at least one item
    pub fn new(per_page: u64) -> Self {
        Self {
            per_page: per_page.max(1),
        }
    }

    pub fn num_pages(&self, total: u64) -> u64 {
        total.div_ceil(self.per_page).max(1)
    }

    /// Resolve a raw `?page=` value against a listing size
    pub fn locate(&self, raw: Option<&str>, total: u64) -> PageWindow {
        let num_pages = self.num_pages(total);
        let requested = raw
            .and_then(|value| value.trim().parse::<i64>().ok())
            .unwrap_or(1);
        let number = requested.clamp(1, num_pages as i64) as u64;

        PageWindow {
            number,
            num_pages,
            total,
            window: Window {
                limit: self.per_page,
                offset: (number - 1) * self.per_page,
            },
        }
    }

    /// Wrap already-fetched items for the located page
    pub fn page<T>(&self, located: PageWindow, items: Vec<T>) -> Page<T> {
        let has_next = located.number < located.num_pages;
        let has_previous = located.number > 1;

        Page {
            object_list: items,
            number: located.number,
            num_pages: located.num_pages,
            count: located.total,
            per_page: self.per_page,
            has_next,
            has_previous,
            next_page_number: has_next.then(|| located.number + 1),
            previous_page_number: has_previous.then(|| located.number - 1),
        }
    }

    /// Paginate an in-memory sequence
    pub fn paginate<T: Clone>(&self, items: &[T], raw: Option<&str>) -> Page<T> {
        let located = self.locate(raw, items.len() as u64);
        let start = (located.window.offset as usize).min(items.len());
        let end = (start + located.window.limit as usize).min(items.len());
        self.page(located, items[start..end].to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_count_is_ceiling_with_minimum_one() {
        let paginator = Paginator::new(10);
        for (len, pages) in [(0u64, 1u64), (1, 1), (10, 1), (11, 2), (13, 2), (20, 2), (21, 3)] {
            assert_eq!(paginator.num_pages(len), pages, "len {}", len);
        }
    }

    #[test]
    fn test_consecutive_pages_partition_the_sequence() {
        for per_page in 1..=7u64 {
            let paginator = Paginator::new(per_page);
            for len in 0..=30usize {
                let items: Vec<usize> = (0..len).collect();
                let mut seen = Vec::new();
                for n in 1..=paginator.num_pages(len as u64) {
                    let page = paginator.paginate(&items, Some(&n.to_string()));
                    assert_eq!(page.number, n);
                    seen.extend(page.object_list);
                }
                assert_eq!(seen, items, "per_page {} len {}", per_page, len);
            }
        }
    }

    #[test]
    fn test_invalid_and_out_of_range_numbers_clamp() {
        let paginator = Paginator::new(10);
        let items: Vec<u32> = (0..13).collect();

        assert_eq!(paginator.paginate(&items, None).number, 1);
        assert_eq!(paginator.paginate(&items, Some("abc")).number, 1);
        assert_eq!(paginator.paginate(&items, Some("0")).number, 1);
        assert_eq!(paginator.paginate(&items, Some("-4")).number, 1);

        let last = paginator.paginate(&items, Some("99"));
        assert_eq!(last.number, 2);
        assert_eq!(last.object_list.len(), 3);
        assert!(!last.has_next);
        assert_eq!(last.previous_page_number, Some(1));
    }

    #[test]
    fn test_empty_source_yields_one_empty_page() {
        let page = Paginator::new(10).paginate::<u32>(&[], Some("3"));
        assert_eq!(page.number, 1);
        assert_eq!(page.num_pages, 1);
        assert!(page.object_list.is_empty());
        assert!(!page.has_next && !page.has_previous);
    }

    #[test]
    fn test_locate_offsets() {
        let located = Paginator::new(10).locate(Some("2"), 13);
        assert_eq!(located.window, Window { limit: 10, offset: 10 });
    }
}
