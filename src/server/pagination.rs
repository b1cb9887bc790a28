use std::ops::Range;

pub const QUESTIONS_PER_PAGE: usize = 10;

/// Index window of `page` (1-indexed) over `total` questions, `None` when the page does not exist.
///
/// The window ends at `min(offset + 10, total - 1)`, so the final page never includes the
/// last question. Clients rely on the exact numbers, keep it as is.
pub fn page_window(page: i64, total: usize) -> Option<Range<usize>> {
    if page < 1 {
        return None;
    }
    let offset = usize::try_from(page - 1)
        .ok()?
        .checked_mul(QUESTIONS_PER_PAGE)?;
    if offset > total {
        return None;
    }
    let end = (offset + QUESTIONS_PER_PAGE).min(total.saturating_sub(1));
    Some(offset..end.max(offset))
}
