//! Offset/limit pagination with per-entity caps and a bounded envelope.

use serde::Serialize;

pub const BLOCK_DEFAULT_PER_PAGE: u64 = 10;
pub const BLOCK_MAX_PER_PAGE: u64 = 25;
pub const TX_DEFAULT_PER_PAGE: u64 = 25;
pub const TX_MAX_PER_PAGE: u64 = 100;

/// Upper bound on the reported page count, bounding worst-case scan depth.
pub const MAX_PAGES: u64 = 500;

/// A validated page/limit pair.
///
/// Missing or zero inputs fall back to the entity default rather than
/// erroring; limits above the hard cap are clamped to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u64,
    pub per_page: u64,
}

impl PageRequest {
    pub fn blocks(page: Option<u64>, limit: Option<u64>) -> Self {
        Self::clamped(page, limit, BLOCK_DEFAULT_PER_PAGE, BLOCK_MAX_PER_PAGE)
    }

    pub fn transactions(page: Option<u64>, limit: Option<u64>) -> Self {
        Self::clamped(page, limit, TX_DEFAULT_PER_PAGE, TX_MAX_PER_PAGE)
    }

    fn clamped(page: Option<u64>, limit: Option<u64>, default: u64, cap: u64) -> Self {
        let page = match page {
            Some(p) if p >= 1 => p,
            _ => 1,
        };
        let per_page = match limit {
            Some(l) if l >= 1 => l.min(cap),
            _ => default,
        };
        Self { page, per_page }
    }

    /// Records skipped before this page.
    pub fn offset(&self) -> u64 {
        (self.page - 1) * self.per_page
    }
}

/// Response envelope shared by every listing endpoint.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Paginated<T> {
    /// Uncapped true total, when known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub real_total: Option<u64>,
    /// Displayed total, capped at the configured record limit.
    pub total: u64,
    pub per_page: u64,
    pub current_page: u64,
    pub pages: u64,
    pub items: Vec<T>,
}

impl<T> Paginated<T> {
    /// Build the envelope from a raw total: the displayed total is capped
    /// at `limited_records` and the page count is derived from the capped
    /// total, itself capped at [`MAX_PAGES`].
    pub fn assemble(
        items: Vec<T>,
        total: u64,
        real_total: Option<u64>,
        request: PageRequest,
        limited_records: u64,
    ) -> Self {
        let capped = total.min(limited_records);
        let pages = capped.div_ceil(request.per_page).min(MAX_PAGES);
        Self {
            real_total,
            total: capped,
            per_page: request.per_page,
            current_page: request.page,
            pages,
            items,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_apply_when_absent() {
        let blocks = PageRequest::blocks(None, None);
        assert_eq!(blocks, PageRequest { page: 1, per_page: 10 });

        let txs = PageRequest::transactions(None, None);
        assert_eq!(txs, PageRequest { page: 1, per_page: 25 });
    }

    #[test]
    fn test_zero_inputs_fall_back_to_defaults() {
        let req = PageRequest::transactions(Some(0), Some(0));
        assert_eq!(req, PageRequest { page: 1, per_page: 25 });
    }

    #[test]
    fn test_limits_are_hard_capped() {
        assert_eq!(PageRequest::blocks(None, Some(1000)).per_page, 25);
        assert_eq!(PageRequest::transactions(None, Some(1000)).per_page, 100);
        // At or under the cap the requested limit wins.
        assert_eq!(PageRequest::blocks(None, Some(25)).per_page, 25);
        assert_eq!(PageRequest::transactions(None, Some(7)).per_page, 7);
    }

    #[test]
    fn test_offset() {
        assert_eq!(PageRequest { page: 1, per_page: 25 }.offset(), 0);
        assert_eq!(PageRequest { page: 3, per_page: 10 }.offset(), 20);
    }

    #[test]
    fn test_envelope_caps_displayed_total() {
        let req = PageRequest { page: 1, per_page: 10 };
        let page = Paginated::<u64>::assemble(vec![], 2_000, Some(2_000), req, 500);
        assert_eq!(page.total, 500);
        assert_eq!(page.real_total, Some(2_000));
        // Pages derive from the capped total.
        assert_eq!(page.pages, 50);
    }

    #[test]
    fn test_envelope_page_count_is_capped() {
        let req = PageRequest { page: 1, per_page: 10 };
        let page = Paginated::<u64>::assemble(vec![], 1_000_000, Some(1_000_000), req, 1_000_000);
        assert_eq!(page.pages, MAX_PAGES);
    }

    #[test]
    fn test_envelope_invariant_holds_for_partial_pages() {
        let req = PageRequest { page: 2, per_page: 25 };
        let page = Paginated::<u64>::assemble(vec![], 60, Some(60), req, 500_000);
        assert_eq!(page.total, 60);
        assert_eq!(page.pages, 3);
        assert_eq!(page.current_page, 2);
    }

    #[test]
    fn test_unknown_total_yields_empty_envelope_counts() {
        let req = PageRequest { page: 1, per_page: 25 };
        let page = Paginated::<u64>::assemble(vec![], 0, Some(0), req, 500_000);
        assert_eq!(page.total, 0);
        assert_eq!(page.pages, 0);
    }

    #[test]
    fn test_real_total_omitted_from_wire_when_unknown() {
        let req = PageRequest { page: 1, per_page: 10 };
        let page = Paginated::<u64>::assemble(vec![1, 2], 2, None, req, 500_000);
        let json = serde_json::to_value(&page).unwrap();
        assert!(json.get("realTotal").is_none());
        assert!(json.get("perPage").is_some());
        assert!(json.get("currentPage").is_some());
    }
}
