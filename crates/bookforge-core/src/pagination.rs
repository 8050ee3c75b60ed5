//! Word-count pagination for the reader view.
//!
//! Pages are cut at word boundaries but keep the original whitespace inside
//! each page, so markdown chapter headings and paragraph breaks survive.

use serde::{Deserialize, Serialize};

pub const DEFAULT_WORDS_PER_PAGE: usize = 250;
pub const MIN_WORDS_PER_PAGE: usize = 50;
pub const MAX_WORDS_PER_PAGE: usize = 2000;

/// One page of a book as shown by the reader.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    /// Zero-based index after clamping.
    pub index: usize,
    pub total_pages: usize,
    pub text: String,
    pub has_previous: bool,
    pub has_next: bool,
}

pub fn word_count(content: &str) -> usize {
    content.split_whitespace().count()
}

/// Number of pages for `content`. Never zero: empty content is one empty page.
pub fn page_count(content: &str, words_per_page: usize) -> usize {
    let words = word_count(content);
    let per_page = words_per_page.max(1);
    words.div_ceil(per_page).max(1)
}

/// Byte offsets where each word starts.
fn word_starts(content: &str) -> Vec<usize> {
    let mut starts = Vec::new();
    let mut in_word = false;
    for (i, c) in content.char_indices() {
        if c.is_whitespace() {
            in_word = false;
        } else if !in_word {
            starts.push(i);
            in_word = true;
        }
    }
    starts
}

/// Split `content` into pages of at most `words_per_page` words.
pub fn paginate(content: &str, words_per_page: usize) -> Vec<&str> {
    let per_page = words_per_page.max(1);
    let starts = word_starts(content);
    if starts.is_empty() {
        return vec![""];
    }

    starts
        .chunks(per_page)
        .enumerate()
        .map(|(i, chunk)| {
            let begin = chunk[0];
            let end = starts
                .get((i + 1) * per_page)
                .copied()
                .unwrap_or(content.len());
            content[begin..end].trim_end()
        })
        .collect()
}

/// Clamp a requested page index into `0..total`.
pub fn clamp_page_index(index: i64, total: usize) -> usize {
    if index <= 0 || total == 0 {
        return 0;
    }
    let last = total - 1;
    usize::try_from(index).map_or(last, |i| i.min(last))
}

/// Fetch a single page, clamping out-of-range indexes to the nearest page.
pub fn page_at(content: &str, index: i64, words_per_page: usize) -> Page {
    let pages = paginate(content, words_per_page);
    let total_pages = pages.len();
    let index = clamp_page_index(index, total_pages);
    Page {
        index,
        total_pages,
        text: pages[index].to_string(),
        has_previous: index > 0,
        has_next: index + 1 < total_pages,
    }
}
