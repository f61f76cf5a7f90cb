use serde::Serialize;

use super::page::{COUNT_KEY, PAGE_KEY};
use super::params::QueryParams;

/// One navigation hint attached to a result page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Link {
    pub rel: String,
    pub href: String,
}

/// Builds `first`, `prev` and `next` links for a page, in that order.
///
/// Every link keeps the caller's other query parameters and overrides `page` and `count`.
/// `first` appears unless already on page 1, `prev` whenever `page - 1 > 0`, and `next`
/// when the store reported more rows past this page.
#[must_use]
pub fn build_links(path: &str, page: i64, limit: i64, has_more: bool, query: &QueryParams) -> Vec<Link> {
    let mut links = Vec::with_capacity(3);
    let mut push = |rel: &str, target: i64| {
        let mut q = query.clone();
        q.set(PAGE_KEY, target.to_string());
        q.set(COUNT_KEY, limit.to_string());
        links.push(Link { rel: rel.to_string(), href: format!("{path}?{}", q.encode()) });
    };
    if page != 1 {
        push("first", 1);
    }
    if let Some(prev) = page.checked_sub(1).filter(|p| *p > 0) {
        push("prev", prev);
    }
    if has_more {
        push("next", page.saturating_add(1));
    }
    links
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_page_without_more_has_no_links() {
        assert!(build_links("/records", 1, 25, false, &QueryParams::new()).is_empty());
    }

    #[test]
    fn first_page_with_more_has_only_next() {
        let links = build_links("/records", 1, 10, true, &QueryParams::new());
        assert_eq!(links, vec![Link { rel: "next".into(), href: "/records?count=10&page=2".into() }]);
    }

    #[test]
    fn middle_page_has_all_three() {
        let q = QueryParams::parse("sortBy=createdTs&page=3&count=5");
        let rels: Vec<_> = build_links("/r", 3, 5, true, &q).into_iter().map(|l| l.rel).collect();
        assert_eq!(rels, ["first", "prev", "next"]);
    }

    #[test]
    fn links_keep_other_parameters() {
        let q = QueryParams::parse("createdOn=2020-01-01");
        let links = build_links("/r", 2, 25, false, &q);
        assert_eq!(links[0].href, "/r?count=25&createdOn=2020-01-01&page=1");
        assert_eq!(links[1].rel, "prev");
    }

    #[test]
    fn page_zero_has_first_but_no_prev() {
        let rels: Vec<_> = build_links("/r", 0, 25, false, &QueryParams::new()).into_iter().map(|l| l.rel).collect();
        assert_eq!(rels, ["first"]);
    }

    #[test]
    fn extreme_pages_do_not_overflow() {
        let low = build_links("/r", i64::MIN, 25, true, &QueryParams::new());
        let rels: Vec<_> = low.into_iter().map(|l| l.rel).collect();
        assert_eq!(rels, ["first", "next"]);
        let links = build_links("/r", i64::MAX, 25, true, &QueryParams::new());
        assert_eq!(links[2].href, format!("/r?count=25&page={}", i64::MAX));
    }
}
