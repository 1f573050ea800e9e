use std::sync::Arc;

use chrono::{DateTime, Utc};
use eyre::Context as _;
use log::{info, warn};
use model::{
    adjustment::Adjustment, errors::LedgerError, subscription::Subscription, ChatId, UserId,
};
use storage::subscription::{Shift, SubscriptionStore};

use super::eviction::Eviction;
use crate::members::ChatMembers;

/// Result of a `/reduce` request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reduction {
    Shortened(Subscription),
    /// The reduced subscription was already over and the user was removed.
    Evicted(UserId),
}

/// Proof that a user administers a chat, see [`Subscriptions::authorize`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Admin {
    chat_id: ChatId,
    user_id: UserId,
}

impl Admin {
    pub fn chat_id(&self) -> ChatId {
        self.chat_id
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }
}

#[derive(Clone)]
pub struct Subscriptions {
    store: Arc<dyn SubscriptionStore>,
    members: Arc<dyn ChatMembers>,
    eviction: Eviction,
}

impl Subscriptions {
    pub fn new(
        store: Arc<dyn SubscriptionStore>,
        members: Arc<dyn ChatMembers>,
        eviction: Eviction,
    ) -> Self {
        Subscriptions {
            store,
            members,
            eviction,
        }
    }

    /// Starts a fresh trial. A returning member gets their clock reset.
    pub async fn on_join(
        &self,
        user_id: UserId,
        now: DateTime<Utc>,
    ) -> Result<Subscription, LedgerError> {
        let subscription = Subscription::new(user_id, now);
        self.store.upsert(&subscription).await?;
        info!(
            "User {} joined, subscription valid until {}",
            user_id,
            subscription.expires_at()
        );
        Ok(subscription)
    }

    pub async fn is_admin(&self, chat_id: ChatId, user_id: UserId) -> Result<bool, LedgerError> {
        let admins = self
            .members
            .administrators(chat_id)
            .await
            .context("list chat administrators")?;
        Ok(admins.contains(&user_id))
    }

    pub async fn authorize(
        &self,
        chat_id: ChatId,
        requester: UserId,
    ) -> Result<Admin, LedgerError> {
        if self.is_admin(chat_id, requester).await? {
            Ok(Admin {
                chat_id,
                user_id: requester,
            })
        } else {
            warn!(
                "User {} is not an administrator of chat {}",
                requester, chat_id
            );
            Err(LedgerError::PermissionDenied { user_id: requester })
        }
    }

    pub async fn extend(
        &self,
        admin: &Admin,
        adjustment: &Adjustment,
    ) -> Result<Subscription, LedgerError> {
        info!(
            "{} extends subscription of {} by {}h: {}",
            admin.user_id, adjustment.user_id, adjustment.hours, adjustment.note
        );

        match self
            .store
            .shift_anchor(
                adjustment.user_id,
                adjustment.delta(),
                Some(adjustment.note.clone()),
                None,
            )
            .await?
        {
            Shift::Applied(subscription) => Ok(subscription),
            Shift::Lapsed(_) | Shift::NotFound => Err(LedgerError::NotFound(adjustment.user_id)),
        }
    }

    /// Shortens a subscription, removing the user from the admin's chat if
    /// nothing is left of it.
    pub async fn reduce(
        &self,
        admin: &Admin,
        adjustment: &Adjustment,
        now: DateTime<Utc>,
    ) -> Result<Reduction, LedgerError> {
        info!(
            "{} reduces subscription of {} by {}h: {}",
            admin.user_id, adjustment.user_id, adjustment.hours, adjustment.note
        );

        match self
            .store
            .shift_anchor(
                adjustment.user_id,
                -adjustment.delta(),
                Some(adjustment.note.clone()),
                Some(now),
            )
            .await?
        {
            Shift::Applied(subscription) => Ok(Reduction::Shortened(subscription)),
            Shift::Lapsed(_) => {
                self.eviction
                    .evict(adjustment.user_id, admin.chat_id)
                    .await?;
                Ok(Reduction::Evicted(adjustment.user_id))
            }
            Shift::NotFound => Err(LedgerError::NotFound(adjustment.user_id)),
        }
    }

    /// Subscriptions that are over at `now`.
    pub async fn expired(&self, now: DateTime<Utc>) -> Result<Vec<Subscription>, LedgerError> {
        let mut subscriptions = self.store.list().await?;
        subscriptions.retain(|sub| sub.is_expired(now));
        Ok(subscriptions)
    }
}
