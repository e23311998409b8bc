//! MongoDB store
//!
//! Reads activity from the CMS collections and appends airdrop snapshots to
//! a collection owned by this service.

use bson::{doc, oid::ObjectId, Document};
use futures_util::TryStreamExt;
use mongodb::Collection;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use tracing::{debug, info};

use super::{ActivityStore, AirdropStore};
use crate::db::schemas::{
    AirdropDoc, AuthorCountDoc, EventDoc, UserDoc, AIRDROP_COLLECTION, COMMENT_COLLECTION,
    PAGE_COLLECTION, REVISION_COLLECTION, USER_COLLECTION,
};
use crate::db::{MongoClient, MongoCollection};
use crate::scoring::{
    ActivityBatch, AirdropSnapshot, AuthoredEvent, NewAirdrop, PageEvent, UserActivity, UserRef,
};
use crate::types::{Result, RewardsError};

/// Activity and airdrop storage backed by MongoDB
pub struct MongoStore {
    users: Collection<UserDoc>,
    pages: Collection<Document>,
    revisions: Collection<EventDoc>,
    comments: Collection<EventDoc>,
    airdrops: MongoCollection<AirdropDoc>,
}

impl MongoStore {
    pub async fn new(mongo: &MongoClient) -> Result<Self> {
        let airdrops = mongo.collection::<AirdropDoc>(AIRDROP_COLLECTION).await?;
        info!(db = mongo.db_name(), "MongoDB store ready");

        Ok(Self {
            users: mongo.read_collection(USER_COLLECTION),
            pages: mongo.read_collection(PAGE_COLLECTION),
            revisions: mongo.read_collection(REVISION_COLLECTION),
            comments: mongo.read_collection(COMMENT_COLLECTION),
            airdrops,
        })
    }

    async fn authored_page_counts(&self) -> Result<HashMap<String, u64>> {
        let pipeline = vec![doc! {
            "$group": { "_id": "$author_id", "count": { "$sum": 1 } }
        }];

        let rows: Vec<Document> = self.pages.aggregate(pipeline).await?.try_collect().await?;
        author_counts(rows)
    }
}

/// Decode `$group` rows into page counts keyed by author id
///
/// The null-author group is skipped. Any other row that does not decode is
/// an error, so a schema change cannot silently zero everyone's pages.
fn author_counts(rows: Vec<Document>) -> Result<HashMap<String, u64>> {
    let mut counts = HashMap::with_capacity(rows.len());
    for row in rows {
        let row = bson::from_document::<AuthorCountDoc>(row)
            .map_err(|e| RewardsError::Database(format!("Unexpected page author row: {}", e)))?;
        if let Some(author) = row._id {
            counts.insert(author.to_hex(), row.count.max(0) as u64);
        }
    }
    Ok(counts)
}

fn parse_user_id(user_id: &str) -> Result<ObjectId> {
    ObjectId::parse_str(user_id)
        .map_err(|_| RewardsError::BadRequest(format!("Malformed user id: {}", user_id)))
}

async fn find_all<T>(collection: &Collection<T>, filter: Document) -> Result<Vec<T>>
where
    T: DeserializeOwned + Unpin + Send + Sync,
{
    Ok(collection.find(filter).await?.try_collect().await?)
}

fn page_events(docs: Vec<EventDoc>) -> Vec<PageEvent> {
    docs.into_iter()
        .map(|d| PageEvent::new(d.page_id.to_hex(), d.created_at.to_chrono()))
        .collect()
}

#[async_trait::async_trait]
impl ActivityStore for MongoStore {
    async fn user_activity(&self, user_id: &str) -> Result<Option<UserActivity>> {
        let oid = parse_user_id(user_id)?;

        let Some(user) = self.users.find_one(doc! { "_id": oid }).await? else {
            return Ok(None);
        };

        let by_author = doc! { "author_id": oid };
        let (pages_created, revisions, comments) = tokio::try_join!(
            async { Ok::<_, RewardsError>(self.pages.count_documents(by_author.clone()).await?) },
            find_all(&self.revisions, by_author.clone()),
            find_all(&self.comments, by_author.clone()),
        )?;

        Ok(Some(UserActivity {
            user: UserRef::from(user),
            pages_created,
            revisions: page_events(revisions),
            comments: page_events(comments),
        }))
    }

    async fn activity_batch(&self) -> Result<ActivityBatch> {
        let (users, authored_pages, revisions, comments) = tokio::try_join!(
            find_all(&self.users, doc! {}),
            self.authored_page_counts(),
            find_all(&self.revisions, doc! {}),
            find_all(&self.comments, doc! {}),
        )?;

        debug!(
            users = users.len(),
            revisions = revisions.len(),
            comments = comments.len(),
            "Loaded activity batch"
        );

        Ok(ActivityBatch {
            users: users.into_iter().map(UserRef::from).collect(),
            authored_pages,
            revisions: revisions.into_iter().map(AuthoredEvent::from).collect(),
            comments: comments.into_iter().map(AuthoredEvent::from).collect(),
        })
    }
}

#[async_trait::async_trait]
impl AirdropStore for MongoStore {
    async fn list_airdrops(&self) -> Result<Vec<AirdropSnapshot>> {
        let docs = self
            .airdrops
            .find_sorted(doc! {}, doc! { "metadata.created_at": -1, "_id": -1 })
            .await?;
        Ok(docs.into_iter().map(AirdropDoc::into_snapshot).collect())
    }

    async fn insert_airdrop(&self, airdrop: NewAirdrop) -> Result<AirdropSnapshot> {
        let mut doc = AirdropDoc::new(&airdrop);
        let id = self.airdrops.insert_one(doc.clone()).await?;
        doc._id = Some(id);

        info!(id = %id, tx_hash = %doc.tx_hash, editors = doc.editor_count, "Recorded airdrop snapshot");
        Ok(doc.into_snapshot())
    }
}
