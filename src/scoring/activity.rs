//! Activity aggregation
//!
//! Reduces raw, timestamped per-page events into [`ActivityCounts`].
//!
//! Every event is placed in an hour bucket (floor to the start of its UTC
//! hour). A `(page, hour)` pair is one *slot*: any number of revisions or
//! comments a user makes on the same page inside the same hour count once.
//! Spread-out work on the same page still earns a slot per hour.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::{HashMap, HashSet};

const SECONDS_PER_HOUR: i64 = 3600;

/// The user an activity record belongs to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRef {
    pub user_id: String,
    pub display_name: Option<String>,
    pub wallet_address: String,
    pub created_at: DateTime<Utc>,
}

/// A revision or comment by a known user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageEvent {
    pub page_id: String,
    pub at: DateTime<Utc>,
}

impl PageEvent {
    pub fn new(page_id: impl Into<String>, at: DateTime<Utc>) -> Self {
        Self {
            page_id: page_id.into(),
            at,
        }
    }
}

/// A revision or comment tagged with its author, as read in batch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthoredEvent {
    pub author_id: String,
    pub page_id: String,
    pub at: DateTime<Utc>,
}

/// Raw activity for a single user
#[derive(Debug, Clone)]
pub struct UserActivity {
    pub user: UserRef,
    /// Pages where the user is the original author
    pub pages_created: u64,
    pub revisions: Vec<PageEvent>,
    pub comments: Vec<PageEvent>,
}

/// Raw activity for every user, read in one pass
#[derive(Debug, Clone, Default)]
pub struct ActivityBatch {
    pub users: Vec<UserRef>,
    /// Authored page count keyed by user id
    pub authored_pages: HashMap<String, u64>,
    pub revisions: Vec<AuthoredEvent>,
    pub comments: Vec<AuthoredEvent>,
}

/// Deduplicated activity counts for one user
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityCounts {
    pub pages_created: u64,
    pub edit_slots: u64,
    pub unique_edited_pages: u64,
    pub comment_slots: u64,
    pub account_age_days: u64,
}

/// A user together with their aggregated counts
#[derive(Debug, Clone)]
pub struct UserCounts {
    pub user: UserRef,
    pub counts: ActivityCounts,
}

/// Whole UTC hours since the Unix epoch
pub fn hour_bucket(at: DateTime<Utc>) -> i64 {
    at.timestamp().div_euclid(SECONDS_PER_HOUR)
}

/// Number of distinct `(page, hour)` slots in a set of events
pub fn count_slots(events: &[PageEvent]) -> u64 {
    events
        .iter()
        .map(|e| (e.page_id.as_str(), hour_bucket(e.at)))
        .collect::<HashSet<_>>()
        .len() as u64
}

/// Number of distinct pages in a set of events
pub fn count_pages(events: &[PageEvent]) -> u64 {
    events
        .iter()
        .map(|e| e.page_id.as_str())
        .collect::<HashSet<_>>()
        .len() as u64
}

/// Whole days between account creation and `now`, never negative
pub fn account_age_days(created_at: DateTime<Utc>, now: DateTime<Utc>) -> u64 {
    (now - created_at).num_days().max(0) as u64
}

/// Aggregate a single user's activity
pub fn aggregate(activity: &UserActivity, now: DateTime<Utc>) -> ActivityCounts {
    ActivityCounts {
        pages_created: activity.pages_created,
        edit_slots: count_slots(&activity.revisions),
        unique_edited_pages: count_pages(&activity.revisions),
        comment_slots: count_slots(&activity.comments),
        account_age_days: account_age_days(activity.user.created_at, now),
    }
}

/// Aggregate every user in one pass
///
/// Events are grouped by author first and then bucketed per user exactly as
/// [`aggregate`] does. Events from authors missing from `batch.users` are
/// dropped.
pub fn aggregate_batch(batch: ActivityBatch, now: DateTime<Utc>) -> Vec<UserCounts> {
    let ActivityBatch {
        users,
        authored_pages,
        revisions,
        comments,
    } = batch;

    let mut revisions_by_user = group_by_author(revisions);
    let mut comments_by_user = group_by_author(comments);

    users
        .into_iter()
        .map(|user| {
            let activity = UserActivity {
                pages_created: authored_pages.get(&user.user_id).copied().unwrap_or(0),
                revisions: revisions_by_user.remove(&user.user_id).unwrap_or_default(),
                comments: comments_by_user.remove(&user.user_id).unwrap_or_default(),
                user,
            };
            let counts = aggregate(&activity, now);
            UserCounts {
                user: activity.user,
                counts,
            }
        })
        .collect()
}

fn group_by_author(events: Vec<AuthoredEvent>) -> HashMap<String, Vec<PageEvent>> {
    let mut grouped: HashMap<String, Vec<PageEvent>> = HashMap::new();
    for event in events {
        grouped.entry(event.author_id).or_default().push(PageEvent {
            page_id: event.page_id,
            at: event.at,
        });
    }
    grouped
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 10, h, m, 0).unwrap()
    }

    fn user(id: &str, created_at: DateTime<Utc>) -> UserRef {
        UserRef {
            user_id: id.to_string(),
            display_name: None,
            wallet_address: format!("account_{}", id),
            created_at,
        }
    }

    fn authored(author: &str, page: &str, when: DateTime<Utc>) -> AuthoredEvent {
        AuthoredEvent {
            author_id: author.to_string(),
            page_id: page.to_string(),
            at: when,
        }
    }

    #[test]
    fn test_same_hour_same_page_is_one_slot() {
        let events = vec![PageEvent::new("p1", at(9, 5)), PageEvent::new("p1", at(9, 55))];
        assert_eq!(count_slots(&events), 1);
    }

    #[test]
    fn test_hour_boundary_splits_slots() {
        let events = vec![PageEvent::new("p1", at(9, 59)), PageEvent::new("p1", at(10, 1))];
        assert_eq!(count_slots(&events), 2);
    }

    #[test]
    fn test_same_hour_different_pages() {
        let events = vec![PageEvent::new("p1", at(9, 5)), PageEvent::new("p2", at(9, 6))];
        assert_eq!(count_slots(&events), 2);
    }

    #[test]
    fn test_unique_pages_ignore_buckets() {
        let events: Vec<PageEvent> = (0..10)
            .map(|d| PageEvent::new("p1", at(9, 0) + Duration::days(d)))
            .chain(std::iter::once(PageEvent::new("p2", at(12, 0))))
            .collect();
        assert_eq!(count_pages(&events), 2);
        assert_eq!(count_slots(&events), 11);
    }

    #[test]
    fn test_hour_bucket_before_epoch_floors() {
        let before = Utc.with_ymd_and_hms(1969, 12, 31, 23, 30, 0).unwrap();
        assert_eq!(hour_bucket(before), -1);
        assert_eq!(hour_bucket(Utc.timestamp_opt(0, 0).unwrap()), 0);
    }

    #[test]
    fn test_account_age_days() {
        let created = at(9, 0);
        assert_eq!(account_age_days(created, created + Duration::hours(47)), 1);
        assert_eq!(account_age_days(created, created + Duration::days(65)), 65);
        assert_eq!(account_age_days(created, created - Duration::days(3)), 0);
    }

    #[test]
    fn test_aggregate_single_user() {
        let created = at(0, 0) - Duration::days(65);
        let activity = UserActivity {
            user: user("u1", created),
            pages_created: 2,
            revisions: vec![
                PageEvent::new("p1", at(9, 0)),
                PageEvent::new("p1", at(9, 30)),
                PageEvent::new("p1", at(11, 0)),
                PageEvent::new("p2", at(11, 10)),
            ],
            comments: vec![PageEvent::new("p3", at(14, 0)), PageEvent::new("p3", at(14, 1))],
        };

        let counts = aggregate(&activity, at(12, 0));
        assert_eq!(
            counts,
            ActivityCounts {
                pages_created: 2,
                edit_slots: 3,
                unique_edited_pages: 2,
                comment_slots: 1,
                account_age_days: 65,
            }
        );
    }

    #[test]
    fn test_batch_matches_single_user_aggregation() {
        let created = at(0, 0) - Duration::days(40);
        let batch = ActivityBatch {
            users: vec![user("u1", created), user("u2", created)],
            authored_pages: HashMap::from([("u1".to_string(), 3)]),
            revisions: vec![
                authored("u1", "p1", at(9, 0)),
                authored("u2", "p1", at(9, 1)),
                authored("u1", "p1", at(9, 2)),
                authored("ghost", "p9", at(9, 3)),
            ],
            comments: vec![authored("u2", "p1", at(10, 0))],
        };

        let results = aggregate_batch(batch, at(12, 0));
        assert_eq!(results.len(), 2);

        let u1 = &results[0];
        assert_eq!(u1.user.user_id, "u1");
        assert_eq!(u1.counts.pages_created, 3);
        assert_eq!(u1.counts.edit_slots, 1);
        assert_eq!(u1.counts.comment_slots, 0);

        let u2 = &results[1];
        assert_eq!(u2.counts.pages_created, 0);
        assert_eq!(u2.counts.edit_slots, 1);
        assert_eq!(u2.counts.comment_slots, 1);
        assert_eq!(u2.counts.account_age_days, 40);
    }
}
