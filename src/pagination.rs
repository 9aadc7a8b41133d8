//! Pager links for a page result.

const EDGE_PAGES: usize = 2;
const BEFORE_CURRENT: usize = 2;
const AFTER_CURRENT: usize = 4;

/// Page links for a pager: two edge pages on each side, a window around the
/// current page, and `None` where pages are skipped. An out-of-range current
/// page is clamped to the nearest existing one.
pub fn page_links(total_pages: usize, current_page: usize) -> Vec<Option<usize>> {
    if total_pages == 0 {
        return Vec::new();
    }
    let current = current_page.clamp(1, total_pages);
    let window = current.saturating_sub(BEFORE_CURRENT)..=current + AFTER_CURRENT;
    let shown = |page: usize| {
        page <= EDGE_PAGES || page + EDGE_PAGES > total_pages || window.contains(&page)
    };

    let mut links: Vec<Option<usize>> = Vec::new();
    for page in (1..=total_pages).filter(|&page| shown(page)) {
        if matches!(links.last(), Some(Some(previous)) if page > previous + 1) {
            links.push(None);
        }
        links.push(Some(page));
    }
    links
}
