//! Leaderboard ranking and pagination

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use super::activity::UserCounts;
use super::points::total_points;

/// Default page size when none is requested
pub const DEFAULT_PAGE_SIZE: usize = 25;
/// Largest page size a caller may request
pub const MAX_PAGE_SIZE: usize = 100;

/// One ranked user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    pub user_id: String,
    pub display_name: Option<String>,
    pub wallet_address: String,
    pub points: u64,
}

/// Rank users by total points
///
/// Users with zero points are dropped. Ties are ordered by user id so the
/// ranking does not depend on storage order.
pub fn rank(users: Vec<UserCounts>) -> Vec<LeaderboardEntry> {
    let mut entries: Vec<LeaderboardEntry> = users
        .into_iter()
        .filter_map(|u| {
            let points = total_points(&u.counts);
            (points > 0).then(|| LeaderboardEntry {
                user_id: u.user.user_id,
                display_name: u.user.display_name,
                wallet_address: u.user.wallet_address,
                points,
            })
        })
        .collect();

    entries.sort_by(compare_entries);
    entries
}

fn compare_entries(a: &LeaderboardEntry, b: &LeaderboardEntry) -> Ordering {
    b.points
        .cmp(&a.points)
        .then_with(|| a.user_id.cmp(&b.user_id))
}

/// A validated page request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    page: usize,
    page_size: usize,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PaginationQuery {
    page: Option<String>,
    page_size: Option<String>,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl Pagination {
    /// Build a page request, clamping both values into range
    pub fn new(page: usize, page_size: usize) -> Self {
        Self {
            page: page.max(1),
            page_size: page_size.clamp(1, MAX_PAGE_SIZE),
        }
    }

    /// Parse `page` and `pageSize` from a query string
    ///
    /// Missing or unparsable values fall back to the defaults; numeric values
    /// out of range are clamped.
    pub fn from_query(query: Option<&str>) -> Self {
        let parsed: PaginationQuery = query
            .and_then(|q| serde_urlencoded::from_str(q).ok())
            .unwrap_or_default();

        let page = parse_number(parsed.page.as_deref()).unwrap_or(1);
        let page_size = parse_number(parsed.page_size.as_deref()).unwrap_or(DEFAULT_PAGE_SIZE as i64);

        Self::new(
            page.max(1) as usize,
            page_size.clamp(1, MAX_PAGE_SIZE as i64) as usize,
        )
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    fn offset(&self) -> usize {
        (self.page - 1).saturating_mul(self.page_size)
    }
}

fn parse_number(value: Option<&str>) -> Option<i64> {
    value.and_then(|v| v.trim().parse::<i64>().ok())
}

/// A page of leaderboard entries
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardPage {
    pub items: Vec<LeaderboardEntry>,
    pub total: usize,
    pub page: usize,
    pub page_size: usize,
    pub total_pages: usize,
}

/// Slice a ranked leaderboard; out-of-range pages are empty
pub fn paginate(entries: &[LeaderboardEntry], pagination: Pagination) -> LeaderboardPage {
    let total = entries.len();
    let items = entries
        .iter()
        .skip(pagination.offset())
        .take(pagination.page_size)
        .cloned()
        .collect();

    LeaderboardPage {
        items,
        total,
        page: pagination.page,
        page_size: pagination.page_size,
        total_pages: total.div_ceil(pagination.page_size),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::activity::{ActivityCounts, UserRef};
    use chrono::Utc;

    fn user_counts(id: &str, pages: u64) -> UserCounts {
        UserCounts {
            user: UserRef {
                user_id: id.to_string(),
                display_name: Some(format!("User {}", id)),
                wallet_address: format!("account_{}", id),
                created_at: Utc::now(),
            },
            counts: ActivityCounts {
                pages_created: pages,
                ..ActivityCounts::default()
            },
        }
    }

    fn entries(n: usize) -> Vec<LeaderboardEntry> {
        (0..n)
            .map(|i| LeaderboardEntry {
                user_id: format!("u{:03}", i),
                display_name: None,
                wallet_address: format!("account_{}", i),
                points: (n - i) as u64,
            })
            .collect()
    }

    #[test]
    fn test_rank_orders_and_filters() {
        let ranked = rank(vec![
            user_counts("b", 1),
            user_counts("z", 0),
            user_counts("c", 3),
            user_counts("a", 1),
        ]);

        let ids: Vec<&str> = ranked.iter().map(|e| e.user_id.as_str()).collect();
        assert_eq!(ids, vec!["c", "a", "b"]);
        assert_eq!(ranked[0].points, 450);
    }

    #[test]
    fn test_second_page_of_thirty() {
        let page = paginate(&entries(30), Pagination::new(2, 25));
        assert_eq!(page.items.len(), 5);
        assert_eq!(page.total, 30);
        assert_eq!(page.total_pages, 2);
        assert_eq!(page.items[0].user_id, "u025");
    }

    #[test]
    fn test_out_of_range_page_is_empty() {
        let page = paginate(&entries(30), Pagination::new(9, 25));
        assert!(page.items.is_empty());
        assert_eq!(page.total_pages, 2);
    }

    #[test]
    fn test_empty_leaderboard() {
        let page = paginate(&[], Pagination::default());
        assert!(page.items.is_empty());
        assert_eq!(page.total, 0);
        assert_eq!(page.total_pages, 0);
    }

    #[test]
    fn test_pagination_from_query() {
        assert_eq!(Pagination::from_query(None), Pagination::new(1, 25));
        assert_eq!(
            Pagination::from_query(Some("page=3&pageSize=10")),
            Pagination::new(3, 10)
        );
        assert_eq!(
            Pagination::from_query(Some("page=0&pageSize=1000")),
            Pagination::new(1, 100)
        );
        assert_eq!(
            Pagination::from_query(Some("page=-4&pageSize=0")),
            Pagination::new(1, 1)
        );
        assert_eq!(
            Pagination::from_query(Some("page=abc&pageSize=")),
            Pagination::default()
        );
    }
}
