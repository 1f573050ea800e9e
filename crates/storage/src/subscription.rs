use async_trait::async_trait;
use bson::{doc, Document};
use chrono::{DateTime, Duration, Utc};
use eyre::{Context as _, Error};
use futures_util::stream::TryStreamExt as _;
use log::info;
use model::{
    subscription::{validity_window, Subscription},
    UserId,
};
use mongodb::{options::ReturnDocument, Collection};

use crate::session::Db;

const TABLE_NAME: &str = "subscriptions";

/// Outcome of [`SubscriptionStore::shift_anchor`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Shift {
    /// The anchor was moved and the note replaced.
    Applied(Subscription),
    /// The shifted subscription would already be expired, nothing was written.
    Lapsed(Subscription),
    NotFound,
}

/// Durable mapping from user id to subscription.
///
/// Every method is a single atomic operation against the backing store.
#[async_trait]
pub trait SubscriptionStore: Send + Sync {
    /// Inserts or fully replaces the row for `subscription.user_id`.
    async fn upsert(&self, subscription: &Subscription) -> Result<(), Error>;

    async fn get(&self, user_id: UserId) -> Result<Option<Subscription>, Error>;

    /// Removes the row if present.
    async fn delete(&self, user_id: UserId) -> Result<(), Error>;

    async fn list(&self) -> Result<Vec<Subscription>, Error>;

    /// Moves the anchor by `delta` and replaces the note in one step.
    ///
    /// With `keep_valid_at` set, the write only happens if the shifted
    /// subscription is still valid at that instant.
    async fn shift_anchor(
        &self,
        user_id: UserId,
        delta: Duration,
        note: Option<String>,
        keep_valid_at: Option<DateTime<Utc>>,
    ) -> Result<Shift, Error>;

    async fn get_anchor_time(&self, user_id: UserId) -> Result<Option<DateTime<Utc>>, Error> {
        Ok(self.get(user_id).await?.map(|sub| sub.anchor))
    }
}

/// Filter and update pipeline for [`SubscriptionStore::shift_anchor`].
///
/// With `keep_valid_at` the filter only matches rows whose shifted anchor
/// plus the validity window is still after that instant.
fn shift_query(
    user_id: UserId,
    delta: Duration,
    note: Option<String>,
    keep_valid_at: Option<DateTime<Utc>>,
) -> (Document, Vec<Document>) {
    let mut filter = doc! { "_id": user_id };
    if let Some(now) = keep_valid_at {
        let floor = now - validity_window() - delta;
        filter.insert(
            "join_time",
            doc! { "$gt": bson::DateTime::from_chrono(floor) },
        );
    }
    let update = vec![doc! {
        "$set": {
            "join_time": { "$add": ["$join_time", delta.num_milliseconds()] },
            "note": { "$literal": note },
        }
    }];
    (filter, update)
}

pub struct MongoSubscriptions {
    collection: Collection<Subscription>,
}

impl MongoSubscriptions {
    pub fn new(db: &Db) -> Self {
        MongoSubscriptions {
            collection: db.collection(TABLE_NAME),
        }
    }
}

#[async_trait]
impl SubscriptionStore for MongoSubscriptions {
    async fn upsert(&self, subscription: &Subscription) -> Result<(), Error> {
        info!("Upserting subscription: {:?}", subscription);
        self.collection
            .replace_one(doc! { "_id": subscription.user_id }, subscription)
            .upsert(true)
            .await
            .context("upsert subscription")?;
        Ok(())
    }

    async fn get(&self, user_id: UserId) -> Result<Option<Subscription>, Error> {
        Ok(self
            .collection
            .find_one(doc! { "_id": user_id })
            .await
            .context("get subscription")?)
    }

    async fn delete(&self, user_id: UserId) -> Result<(), Error> {
        self.collection
            .delete_one(doc! { "_id": user_id })
            .await
            .context("delete subscription")?;
        Ok(())
    }

    async fn list(&self) -> Result<Vec<Subscription>, Error> {
        let cursor = self
            .collection
            .find(doc! {})
            .await
            .context("list subscriptions")?;
        Ok(cursor.try_collect().await?)
    }

    async fn shift_anchor(
        &self,
        user_id: UserId,
        delta: Duration,
        note: Option<String>,
        keep_valid_at: Option<DateTime<Utc>>,
    ) -> Result<Shift, Error> {
        let (filter, update) = shift_query(user_id, delta, note.clone(), keep_valid_at);
        let updated = self
            .collection
            .find_one_and_update(filter, update)
            .return_document(ReturnDocument::After)
            .await
            .context("shift subscription anchor")?;
        if let Some(updated) = updated {
            return Ok(Shift::Applied(updated));
        }
        if keep_valid_at.is_none() {
            return Ok(Shift::NotFound);
        }

        Ok(match self.get(user_id).await? {
            Some(current) => Shift::Lapsed(current.shifted(delta, note)),
            None => Shift::NotFound,
        })
    }
}
