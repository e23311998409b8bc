//! Read models for CMS collections
//!
//! Only the fields the scoring engine needs are mapped. Everything else in
//! these documents is ignored on deserialization.

use bson::{oid::ObjectId, DateTime};
use serde::{Deserialize, Serialize};

use crate::scoring::{AuthoredEvent, UserRef};

pub const USER_COLLECTION: &str = "users";
pub const PAGE_COLLECTION: &str = "pages";
pub const REVISION_COLLECTION: &str = "revisions";
pub const COMMENT_COLLECTION: &str = "comments";

/// A registered wiki user
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct UserDoc {
    pub _id: ObjectId,
    pub wallet_address: String,
    #[serde(default)]
    pub display_name: Option<String>,
    pub created_at: DateTime,
}

impl From<UserDoc> for UserRef {
    fn from(doc: UserDoc) -> Self {
        UserRef {
            user_id: doc._id.to_hex(),
            display_name: doc.display_name,
            wallet_address: doc.wallet_address,
            created_at: doc.created_at.to_chrono(),
        }
    }
}

/// A revision or comment
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct EventDoc {
    pub page_id: ObjectId,
    pub author_id: ObjectId,
    pub created_at: DateTime,
}

impl From<EventDoc> for AuthoredEvent {
    fn from(doc: EventDoc) -> Self {
        AuthoredEvent {
            author_id: doc.author_id.to_hex(),
            page_id: doc.page_id.to_hex(),
            at: doc.created_at.to_chrono(),
        }
    }
}

/// One row of the `$group` over `pages.author_id`
///
/// Pages without an author group under a null `_id`.
#[derive(Deserialize, Clone, Debug)]
pub struct AuthorCountDoc {
    #[serde(default)]
    pub _id: Option<ObjectId>,
    pub count: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::doc;

    #[test]
    fn test_user_doc_ignores_extra_fields() {
        let oid = ObjectId::new();
        let raw = doc! {
            "_id": oid,
            "wallet_address": "account_rdx1",
            "created_at": DateTime::from_millis(1_700_000_000_000),
            "bio": "ignored",
        };
        let user: UserRef = bson::from_document::<UserDoc>(raw).unwrap().into();
        assert_eq!(user.user_id, oid.to_hex());
        assert_eq!(user.display_name, None);
        assert_eq!(user.created_at.timestamp(), 1_700_000_000);
    }

    #[test]
    fn test_author_count_accepts_int32() {
        let oid = ObjectId::new();
        let row: AuthorCountDoc = bson::from_document(doc! { "_id": oid, "count": 3_i32 }).unwrap();
        assert_eq!(row._id, Some(oid));
        assert_eq!(row.count, 3);

        let orphans: AuthorCountDoc =
            bson::from_document(doc! { "_id": bson::Bson::Null, "count": 2_i64 }).unwrap();
        assert_eq!(orphans._id, None);
    }

    #[test]
    fn test_author_count_rejects_string_author() {
        let row = doc! { "_id": "65f0c0ffee", "count": 1_i32 };
        assert!(bson::from_document::<AuthorCountDoc>(row).is_err());
    }
}
