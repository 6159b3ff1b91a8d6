//! Page-number pagination for post feeds.

use serde::Serialize;

/// Default number of posts on one page.
pub const POSTS_PER_PAGE: u64 = 10;

/// Number of pages needed for `count` items. An empty list still has one page.
pub fn num_pages(count: u64, per_page: u64) -> u64 {
    let per_page = per_page.max(1);
    if count == 0 {
        1
    } else {
        count.div_ceil(per_page)
    }
}

/// Resolve the raw `?page=` value against the number of pages.
///
/// A missing or non-numeric value selects the first page; a number outside
/// `1..=num_pages` selects the last page, however many digits it has.
pub fn resolve_page_number(raw: Option<&str>, num_pages: u64) -> u64 {
    let Some(raw) = raw.map(str::trim) else {
        return 1;
    };
    let digits = raw.strip_prefix(['-', '+']).unwrap_or(raw);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return 1;
    }

    match raw.parse::<i64>() {
        Ok(n) if n >= 1 && n as u64 <= num_pages => n as u64,
        _ => num_pages,
    }
}

/// One page of a paginated list, shaped for templates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page<T> {
    pub object_list: Vec<T>,
    pub number: u64,
    pub num_pages: u64,
    pub count: u64,
    pub has_previous: bool,
    pub has_next: bool,
    pub previous_page_number: Option<u64>,
    pub next_page_number: Option<u64>,
}

impl<T> Page<T> {
    pub fn new(object_list: Vec<T>, number: u64, per_page: u64, count: u64) -> Self {
        let num_pages = num_pages(count, per_page);
        let has_previous = number > 1;
        let has_next = number < num_pages;
        Self {
            object_list,
            number,
            num_pages,
            count,
            has_previous,
            has_next,
            previous_page_number: has_previous.then(|| number - 1),
            next_page_number: has_next.then(|| number + 1),
        }
    }

    pub fn first(&self) -> Option<&T> {
        self.object_list.first()
    }

    pub fn len(&self) -> usize {
        self.object_list.len()
    }

    pub fn is_empty(&self) -> bool {
        self.object_list.is_empty()
    }

    /// Convert every item, keeping the page metadata.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            object_list: self.object_list.into_iter().map(f).collect(),
            number: self.number,
            num_pages: self.num_pages,
            count: self.count,
            has_previous: self.has_previous,
            has_next: self.has_next,
            previous_page_number: self.previous_page_number,
            next_page_number: self.next_page_number,
        }
    }
}
