pub mod product_catalog;
pub mod stock_ledger;
pub mod stock_report;

/// Normalized page/limit pair shared by the paginated reads.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PageWindow {
    pub page: u64,
    pub limit: u64,
}

impl PageWindow {
    /// Clamps caller input: a page below 1 becomes 1, a missing or
    /// non-positive limit becomes `default_limit`, and the limit never
    /// exceeds `max_limit`.
    pub fn normalize(page: Option<i64>, limit: Option<i64>, default_limit: u64, max_limit: u64) -> Self {
        let page = page.filter(|p| *p >= 1).map_or(1, |p| p as u64);
        let limit = limit
            .filter(|l| *l > 0)
            .map_or(default_limit, |l| l as u64)
            .min(max_limit.max(1));
        Self { page, limit }
    }

    pub fn offset(&self) -> u64 {
        (self.page - 1).saturating_mul(self.limit)
    }

    /// Number of pages needed to show `total` rows.
    pub fn total_pages(&self, total: u64) -> u64 {
        total.div_ceil(self.limit)
    }
}
