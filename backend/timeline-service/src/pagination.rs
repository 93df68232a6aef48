//! Page-number pagination over ordered sequences.
//!
//! Entity-agnostic: callers fetch an ordered sequence and this module slices
//! it into fixed-size pages. Page numbers are 1-based. Page size comes from
//! deployment configuration, never from the request.

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// One page of an ordered sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page_number: u32,
    pub total_pages: u32,
}

/// Resolve a raw `?page=` query value to a page number.
///
/// Absent, unparseable, or non-positive values fall back to page 1.
pub fn resolve_page(raw: Option<&str>) -> u32 {
    raw.and_then(|s| s.trim().parse::<u32>().ok())
        .filter(|&page| page >= 1)
        .unwrap_or(1)
}

/// Slice `items` into its `page_number`-th page of `page_size` items.
///
/// `total_pages` is `ceil(len / page_size)`. Page 1 is always valid, so an
/// empty sequence yields an empty first page rather than an error. Any page
/// beyond the last is `InvalidPage`.
pub fn paginate<T>(items: Vec<T>, page_size: u32, page_number: u32) -> Result<Page<T>> {
    let page_size = page_size.max(1) as usize;
    let total = items.len();
    let total_pages = ((total + page_size - 1) / page_size) as u32;

    if page_number > total_pages && page_number != 1 {
        return Err(AppError::InvalidPage {
            requested: page_number,
            total_pages,
        });
    }

    let start = (page_number as usize - 1) * page_size;
    let page_items = items
        .into_iter()
        .skip(start)
        .take(page_size)
        .collect::<Vec<_>>();

    Ok(Page {
        items: page_items,
        page_number,
        total_pages,
    })
}
