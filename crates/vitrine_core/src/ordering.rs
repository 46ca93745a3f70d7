//! Display ordering, search and paging for list screens.

use crate::ContentRecord;
use serde::{Deserialize, Serialize};

/// Sort records for display.
///
/// Order column ascending with unset values last, ties broken by creation time
/// (newest first), then by input order.
pub fn sort_for_display(records: &mut [ContentRecord]) {
    records.sort_by(|a, b| {
        let order = match (a.order_value(), b.order_value()) {
            (Some(x), Some(y)) => x.cmp(&y),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => std::cmp::Ordering::Equal,
        };
        order.then_with(|| b.created_at().cmp(&a.created_at()))
    });
}

/// First order value available to an appended item.
///
/// Strictly greater than every existing value; `0` for an empty list.
///
/// # Examples
///
/// ```
/// use vitrine_core::{ContentRecord, EntityKind, next_sort_index};
/// use serde_json::json;
///
/// let rows = vec![
///     ContentRecord::from_row(EntityKind::ProjectGalleryImage, json!({"id": 1, "sort": 4})).unwrap(),
///     ContentRecord::from_row(EntityKind::ProjectGalleryImage, json!({"id": 2, "sort": 1})).unwrap(),
/// ];
/// assert_eq!(next_sort_index(&rows), 5);
/// assert_eq!(next_sort_index(&[]), 0);
/// ```
pub fn next_sort_index(records: &[ContentRecord]) -> i64 {
    records
        .iter()
        .filter_map(ContentRecord::order_value)
        .max()
        .map_or(0, |max| max.saturating_add(1))
}

/// Direction of the created-at sort on list screens.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum SortDirection {
    /// Oldest first
    Asc,
    /// Newest first
    #[default]
    Desc,
}

/// Sort by creation time; rows without a timestamp go last.
pub fn sort_by_created(records: &mut [ContentRecord], direction: SortDirection) {
    records.sort_by(|a, b| match (a.created_at(), b.created_at()) {
        (Some(x), Some(y)) => match direction {
            SortDirection::Asc => x.cmp(&y),
            SortDirection::Desc => y.cmp(&x),
        },
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => std::cmp::Ordering::Equal,
    });
}

/// Keep records whose title contains `term`, ignoring case.
///
/// A blank term keeps everything.
pub fn filter_by_title(records: Vec<ContentRecord>, term: &str) -> Vec<ContentRecord> {
    let term = term.trim().to_lowercase();
    if term.is_empty() {
        return records;
    }
    records
        .into_iter()
        .filter(|r| r.title().is_some_and(|t| t.to_lowercase().contains(&term)))
        .collect()
}

/// One page of a list.
#[derive(Debug, Clone, PartialEq, Serialize, derive_getters::Getters)]
pub struct Paged<T> {
    items: Vec<T>,
    page: usize,
    page_size: usize,
    total_items: usize,
    total_pages: usize,
}

impl<T> Paged<T> {
    /// Consume the page, keeping its items.
    pub fn into_items(self) -> Vec<T> {
        self.items
    }
}

/// Slice out a 1-based page; the page number is clamped into range.
///
/// # Examples
///
/// ```
/// use vitrine_core::paginate;
///
/// let page = paginate((1..=23).collect::<Vec<_>>(), 9, 10);
/// assert_eq!(*page.page(), 3);
/// assert_eq!(*page.total_pages(), 3);
/// assert_eq!(page.items(), &vec![21, 22, 23]);
/// ```
pub fn paginate<T>(items: Vec<T>, page: usize, page_size: usize) -> Paged<T> {
    let page_size = page_size.max(1);
    let total_items = items.len();
    let total_pages = total_items.div_ceil(page_size).max(1);
    let page = page.clamp(1, total_pages);
    let items = items
        .into_iter()
        .skip((page - 1) * page_size)
        .take(page_size)
        .collect();
    Paged {
        items,
        page,
        page_size,
        total_items,
        total_pages,
    }
}

/// Entry of a pager.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PageButton {
    /// Link to a page
    Page(usize),
    /// Ellipsis
    Gap,
}

/// Pager buttons: first, last and the current page with its neighbours, with a
/// gap marker where pages are skipped.
///
/// # Examples
///
/// ```
/// use vitrine_core::{PageButton::*, page_window};
///
/// assert_eq!(
///     page_window(5, 9),
///     vec![Page(1), Gap, Page(4), Page(5), Page(6), Gap, Page(9)]
/// );
/// ```
pub fn page_window(current: usize, total_pages: usize) -> Vec<PageButton> {
    let current = current.clamp(1, total_pages.max(1));
    let mut buttons = Vec::new();
    for n in 1..=total_pages {
        let near = n + 1 >= current && n <= current + 1;
        if n == 1 || n == total_pages || near {
            buttons.push(PageButton::Page(n));
        } else if n + 2 == current || n == current + 2 {
            buttons.push(PageButton::Gap);
        }
    }
    buttons
}
