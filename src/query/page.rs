use super::params::QueryParams;

pub const DEFAULT_PAGE: i64 = 1;
pub const DEFAULT_LIMIT: i64 = 25;
pub const MAX_LIMIT: i64 = 50;

pub const PAGE_KEY: &str = "page";
pub const COUNT_KEY: &str = "count";

/// Resolved pagination window. `skip` is always `(page - 1) * limit`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageOptions {
    pub page: i64,
    pub limit: i64,
    pub skip: i64,
}

impl Default for PageOptions {
    fn default() -> Self {
        Self::normalize("", "")
    }
}

impl PageOptions {
    /// Normalises raw `page` and `count` strings.
    ///
    /// Blank, unparsable or out-of-range input falls back to the defaults: a page below 1
    /// becomes 1 and a limit outside `1..=MAX_LIMIT` becomes 25. Neither is clamped.
    #[must_use]
    pub fn normalize(page: &str, limit: &str) -> Self {
        let page = match page.trim().parse::<i64>() {
            Ok(n) if n >= 1 => n,
            _ => DEFAULT_PAGE,
        };
        let limit = match limit.trim().parse::<i64>() {
            Ok(n) if (1..=MAX_LIMIT).contains(&n) => n,
            _ => DEFAULT_LIMIT,
        };
        let skip = page.saturating_sub(1).saturating_mul(limit);
        Self { page, limit, skip }
    }

    /// Reads the first `page` and `count` values of a query.
    #[must_use]
    pub fn from_query(query: &QueryParams) -> Self {
        Self::normalize(query.get(PAGE_KEY).unwrap_or(""), query.get(COUNT_KEY).unwrap_or(""))
    }

    /// Rows to request from the store: one past the page so `has_more` can be answered
    /// without a second count.
    #[must_use]
    pub const fn fetch_limit(&self) -> i64 {
        self.limit + 1
    }

    /// Skip as a store offset.
    #[must_use]
    pub fn offset(&self) -> usize {
        usize::try_from(self.skip).unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let p = PageOptions::normalize("", "");
        assert_eq!(p, PageOptions { page: 1, limit: 25, skip: 0 });
        assert_eq!(PageOptions::default(), p);
    }

    #[test]
    fn explicit_values() {
        assert_eq!(PageOptions::normalize("3", "10"), PageOptions { page: 3, limit: 10, skip: 20 });
        assert_eq!(PageOptions::normalize("2", "50").skip, 50);
    }

    #[test]
    fn out_of_range_limit_falls_back() {
        assert_eq!(PageOptions::normalize("1", "51").limit, 25);
        assert_eq!(PageOptions::normalize("1", "0").limit, 25);
        assert_eq!(PageOptions::normalize("1", "-4").limit, 25);
        assert_eq!(PageOptions::normalize("1", "ten").limit, 25);
    }

    #[test]
    fn non_positive_page_falls_back() {
        assert_eq!(PageOptions::normalize("0", "10"), PageOptions { page: 1, limit: 10, skip: 0 });
        assert_eq!(PageOptions::normalize("-3", "10").page, 1);
        assert_eq!(PageOptions::normalize("x", "10").page, 1);
    }

    #[test]
    fn fetch_limit_is_one_past_the_page() {
        assert_eq!(PageOptions::normalize("1", "10").fetch_limit(), 11);
    }
}
