//! Splits chapter text into bounded pages along paragraph boundaries.
//!
//! Pages never break mid-paragraph: a single paragraph longer than the
//! budget becomes its own oversized page rather than being truncated,
//! favoring content integrity over strict size bounds.

use tracing::debug;

use super::{Chapter, Page};

/// Reference page budget in characters.
pub const PAGE_CHAR_BUDGET: usize = 2000;

/// Maximum preview length in characters, before the ellipsis marker.
pub const PREVIEW_CHAR_LIMIT: usize = 200;

/// Paragraph boundary: double-newline-delimited blocks.
const PARAGRAPH_SEPARATOR: &str = "\n\n";

/// Paginates every chapter into one flat page sequence.
///
/// Page `order` is the book-wide reading position, strictly increasing
/// across chapter boundaries, so a single progress indicator can span the
/// whole book. Chapters with empty content contribute zero pages.
#[must_use]
pub fn paginate_book(chapters: &[Chapter], budget: usize) -> Vec<Page> {
    let mut pages = Vec::new();

    for chapter in chapters {
        let chapter_pages = paginate_chapter(chapter.order, &chapter.title, &chapter.content, budget);
        for mut page in chapter_pages {
            page.order = pages.len();
            pages.push(page);
        }
    }

    debug!(
        chapters = chapters.len(),
        pages = pages.len(),
        "paginated book"
    );
    pages
}

/// Splits one chapter's text into ordered pages.
///
/// Paragraphs accumulate into a buffer; when adding the next paragraph
/// would exceed `budget` and the buffer is non-empty, the buffer flushes as
/// one page. Joining a chapter's pages back together with the paragraph
/// separator reconstructs the chapter content exactly.
///
/// An entirely empty chapter yields zero pages; any non-empty content
/// yields at least one.
#[must_use]
pub fn paginate_chapter(
    chapter_index: usize,
    title: &str,
    content: &str,
    budget: usize,
) -> Vec<Page> {
    if content.is_empty() {
        return Vec::new();
    }

    let mut pages = Vec::new();
    let mut buffer: Option<String> = None;

    for paragraph in content.split(PARAGRAPH_SEPARATOR) {
        match buffer.as_mut() {
            None => buffer = Some(paragraph.to_string()),
            Some(buf) => {
                let would_exceed = char_len(buf)
                    + PARAGRAPH_SEPARATOR.len()
                    + char_len(paragraph)
                    > budget;
                if would_exceed && !buf.is_empty() {
                    let full = std::mem::replace(buf, paragraph.to_string());
                    pages.push(make_page(chapter_index, pages.len(), title, full));
                } else {
                    buf.push_str(PARAGRAPH_SEPARATOR);
                    buf.push_str(paragraph);
                }
            }
        }
    }

    if let Some(buf) = buffer {
        pages.push(make_page(chapter_index, pages.len(), title, buf));
    }

    pages
}

/// Builds a page with its derived preview; `order` is filled in later.
fn make_page(chapter_index: usize, page_index: usize, title: &str, content: String) -> Page {
    let content_preview = derive_preview(&content);
    let content_length = char_len(&content);

    Page {
        chapter_index,
        page_index,
        title: title.to_string(),
        content,
        content_preview,
        content_length,
        order: 0,
    }
}

/// Collapses newlines to spaces and truncates to the preview limit,
/// appending an ellipsis only when truncation happened.
fn derive_preview(content: &str) -> String {
    let collapsed: String = content
        .chars()
        .map(|c| if c == '\n' { ' ' } else { c })
        .collect();

    if char_len(&collapsed) > PREVIEW_CHAR_LIMIT {
        let truncated: String = collapsed.chars().take(PREVIEW_CHAR_LIMIT).collect();
        format!("{truncated}...")
    } else {
        collapsed
    }
}

/// Character count, not byte count; the budget is specified in characters.
fn char_len(s: &str) -> usize {
    s.chars().count()
}
