//! Display windows over a sorted catalog list.
//!
//! Both policies only ever hand out a contiguous range of the sorted list, so
//! a rendered page is always a deterministic slice with no gaps.

use std::ops::Range;

/// Numbered pages of a fixed size (1-based).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedPager {
    page: usize,
    page_size: usize,
}

impl FixedPager {
    pub fn new(page_size: usize) -> Self {
        Self {
            page: 1,
            page_size: page_size.max(1),
        }
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// `ceil(total / page_size)`; zero for an empty list.
    pub fn total_pages(&self, total: usize) -> usize {
        total.div_ceil(self.page_size)
    }

    fn last_page(&self, total: usize) -> usize {
        self.total_pages(total).max(1)
    }

    pub fn window(&self, total: usize) -> Range<usize> {
        let start = (self.page - 1).saturating_mul(self.page_size).min(total);
        let end = self.page.saturating_mul(self.page_size).min(total);
        start..end
    }

    pub fn go_to(&mut self, page: usize, total: usize) {
        self.page = page.clamp(1, self.last_page(total));
    }

    pub fn next(&mut self, total: usize) -> bool {
        let before = self.page;
        self.go_to(self.page + 1, total);
        self.page != before
    }

    pub fn prev(&mut self, total: usize) -> bool {
        let before = self.page;
        self.go_to(self.page.saturating_sub(1), total);
        self.page != before
    }

    pub fn has_next(&self, total: usize) -> bool {
        self.page < self.total_pages(total)
    }

    pub fn has_prev(&self) -> bool {
        self.page > 1
    }

    /// Re-clamp after the list shrank under us (e.g. a poll removed blobs).
    pub fn clamp(&mut self, total: usize) {
        self.go_to(self.page, total);
    }

    pub fn reset(&mut self) {
        self.page = 1;
    }
}

/// "Load more": a growing prefix of the list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IncrementalReveal {
    visible: usize,
    batch: usize,
}

impl IncrementalReveal {
    pub fn new(batch: usize) -> Self {
        let batch = batch.max(1);
        Self {
            visible: batch,
            batch,
        }
    }

    pub fn batch(&self) -> usize {
        self.batch
    }

    pub fn visible_count(&self, total: usize) -> usize {
        self.visible.min(total)
    }

    pub fn has_more(&self, total: usize) -> bool {
        self.visible < total
    }

    /// Grow by one batch, capped at `total`. Never shrinks.
    pub fn load_more(&mut self, total: usize) -> bool {
        if !self.has_more(total) {
            return false;
        }
        self.visible = self.visible.saturating_add(self.batch).min(total).max(self.visible);
        true
    }

    pub fn window(&self, total: usize) -> Range<usize> {
        0..self.visible_count(total)
    }

    /// Back to the first batch (category switch).
    pub fn reset(&mut self) {
        self.visible = self.batch;
    }
}

/// Paging policy for one list; each tab picks its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PagingPolicy {
    #[default]
    Reveal,
    Pages,
}

impl std::str::FromStr for PagingPolicy {
    type Err = anyhow::Error;
    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s.to_lowercase().as_str() {
            "reveal" | "more" | "load-more" | "infinite" => Ok(PagingPolicy::Reveal),
            "pages" | "page" | "fixed" => Ok(PagingPolicy::Pages),
            _ => Err(anyhow::anyhow!(
                "Invalid paging '{s}'. Valid options: reveal, pages"
            )),
        }
    }
}

impl std::fmt::Display for PagingPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PagingPolicy::Reveal => write!(f, "reveal"),
            PagingPolicy::Pages => write!(f, "pages"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Paginator {
    Pages(FixedPager),
    Reveal(IncrementalReveal),
}

impl Paginator {
    pub fn from_policy(policy: PagingPolicy, page_size: usize, batch: usize) -> Self {
        match policy {
            PagingPolicy::Pages => Paginator::Pages(FixedPager::new(page_size)),
            PagingPolicy::Reveal => Paginator::Reveal(IncrementalReveal::new(batch)),
        }
    }

    pub fn window(&self, total: usize) -> Range<usize> {
        match self {
            Paginator::Pages(p) => p.window(total),
            Paginator::Reveal(r) => r.window(total),
        }
    }

    pub fn slice<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        &items[self.window(items.len())]
    }

    /// Next page, or one more batch.
    pub fn advance(&mut self, total: usize) -> bool {
        match self {
            Paginator::Pages(p) => p.next(total),
            Paginator::Reveal(r) => r.load_more(total),
        }
    }

    /// Previous page; reveal lists never shrink on their own.
    pub fn retreat(&mut self, total: usize) -> bool {
        match self {
            Paginator::Pages(p) => p.prev(total),
            Paginator::Reveal(_) => false,
        }
    }

    pub fn can_advance(&self, total: usize) -> bool {
        match self {
            Paginator::Pages(p) => p.has_next(total),
            Paginator::Reveal(r) => r.has_more(total),
        }
    }

    pub fn clamp(&mut self, total: usize) {
        if let Paginator::Pages(p) = self {
            p.clamp(total);
        }
    }

    pub fn reset(&mut self) {
        match self {
            Paginator::Pages(p) => p.reset(),
            Paginator::Reveal(r) => r.reset(),
        }
    }

    /// Short status for list titles: "Page 2/5" or "12 of 40".
    pub fn status(&self, total: usize) -> String {
        match self {
            Paginator::Pages(p) => {
                format!("Page {}/{}", p.page(), p.total_pages(total).max(1))
            }
            Paginator::Reveal(r) => format!("{} of {}", r.visible_count(total), total),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_pages_cover_the_list_without_repeats() {
        let items: Vec<usize> = (0..23).collect();
        let mut pager = FixedPager::new(5);
        assert_eq!(pager.total_pages(items.len()), 5);

        let mut seen = Vec::new();
        for n in 1..=pager.total_pages(items.len()) {
            pager.go_to(n, items.len());
            let w = pager.window(items.len());
            assert_eq!(w.start, (n - 1) * 5);
            seen.extend_from_slice(&items[w]);
        }
        assert_eq!(seen, items);
        pager.go_to(5, items.len());
        assert_eq!(pager.window(items.len()), 20..23);
    }

    #[test]
    fn fixed_pager_clamps_navigation() {
        let mut pager = FixedPager::new(10);
        assert!(!pager.prev(25));
        assert_eq!(pager.page(), 1);
        assert!(pager.next(25));
        assert!(pager.next(25));
        assert!(!pager.next(25));
        assert_eq!(pager.page(), 3);
        pager.go_to(99, 25);
        assert_eq!(pager.page(), 3);
        pager.clamp(4);
        assert_eq!(pager.page(), 1);
    }

    #[test]
    fn empty_list_has_zero_pages_and_empty_window() {
        let pager = FixedPager::new(10);
        assert_eq!(pager.total_pages(0), 0);
        assert_eq!(pager.window(0), 0..0);
        assert!(!pager.has_next(0));
    }

    #[test]
    fn reveal_grows_monotonically_and_caps_at_total() {
        let mut r = IncrementalReveal::new(12);
        assert_eq!(r.visible_count(30), 12);
        assert!(r.load_more(30));
        assert_eq!(r.visible_count(30), 24);
        assert!(r.load_more(30));
        assert_eq!(r.visible_count(30), 30);
        assert!(!r.load_more(30));
        assert_eq!(r.visible_count(30), 30);
        assert_eq!(r.window(5), 0..5);
        r.reset();
        assert_eq!(r.visible_count(30), 12);
    }

    #[test]
    fn paginator_slices_prefix_or_page() {
        let items: Vec<u32> = (0..30).collect();
        let mut p = Paginator::from_policy(PagingPolicy::Reveal, 10, 12);
        assert_eq!(p.slice(&items).len(), 12);
        p.advance(items.len());
        assert_eq!(p.slice(&items), &items[..24]);
        assert!(!p.retreat(items.len()));

        let mut p = Paginator::from_policy(PagingPolicy::Pages, 10, 12);
        p.advance(items.len());
        assert_eq!(p.slice(&items), &items[10..20]);
        assert_eq!(p.status(items.len()), "Page 2/3");
    }

    #[test]
    fn paging_policy_parses() {
        assert_eq!("pages".parse::<PagingPolicy>().unwrap(), PagingPolicy::Pages);
        assert_eq!("Reveal".parse::<PagingPolicy>().unwrap(), PagingPolicy::Reveal);
        assert!("scroll".parse::<PagingPolicy>().is_err());
    }
}
