use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use eyre::Error;
use model::{subscription::Subscription, UserId};
use parking_lot::Mutex;

use crate::subscription::{Shift, SubscriptionStore};

/// Process-local store. Nothing survives a restart.
#[derive(Default)]
pub struct MemoryStore {
    rows: Mutex<HashMap<UserId, Subscription>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SubscriptionStore for MemoryStore {
    async fn upsert(&self, subscription: &Subscription) -> Result<(), Error> {
        self.rows
            .lock()
            .insert(subscription.user_id, subscription.clone());
        Ok(())
    }

    async fn get(&self, user_id: UserId) -> Result<Option<Subscription>, Error> {
        Ok(self.rows.lock().get(&user_id).cloned())
    }

    async fn delete(&self, user_id: UserId) -> Result<(), Error> {
        self.rows.lock().remove(&user_id);
        Ok(())
    }

    async fn list(&self) -> Result<Vec<Subscription>, Error> {
        let mut rows: Vec<_> = self.rows.lock().values().cloned().collect();
        rows.sort_by_key(|sub| sub.user_id);
        Ok(rows)
    }

    async fn shift_anchor(
        &self,
        user_id: UserId,
        delta: Duration,
        note: Option<String>,
        keep_valid_at: Option<DateTime<Utc>>,
    ) -> Result<Shift, Error> {
        let mut rows = self.rows.lock();
        let Some(current) = rows.get_mut(&user_id) else {
            return Ok(Shift::NotFound);
        };

        let shifted = current.shifted(delta, note);
        if let Some(now) = keep_valid_at {
            if shifted.is_expired(now) {
                return Ok(Shift::Lapsed(shifted));
            }
        }
        *current = shifted.clone();
        Ok(Shift::Applied(shifted))
    }
}
