use std::sync::Arc;

use chrono::{DateTime, Utc};
use log::{error, info};
use model::{errors::LedgerError, ChatId, UserId};
use service::{eviction::Eviction, subscriptions::Subscriptions};
use storage::subscription::SubscriptionStore;

pub mod members;
pub mod service;


pub use members::ChatMembers;
pub use service::subscriptions::{Admin, Reduction};

#[derive(Clone)]
pub struct Ledger {
    pub subscriptions: Subscriptions,
    pub eviction: Eviction,
}

impl Ledger {
    pub fn new(store: Arc<dyn SubscriptionStore>, members: Arc<dyn ChatMembers>) -> Self {
        let eviction = Eviction::new(store.clone(), members.clone());
        let subscriptions = Subscriptions::new(store, members, eviction.clone());
        Ledger {
            subscriptions,
            eviction,
        }
    }

    /// Evicts every subscription that is over at `now`.
    ///
    /// Each eviction is attempted on its own; a failing one is logged and
    /// reported but never stops the pass.
    pub async fn sweep(
        &self,
        chat_id: ChatId,
        now: DateTime<Utc>,
    ) -> Result<SweepReport, LedgerError> {
        let expired = self.subscriptions.expired(now).await?;
        let mut report = SweepReport {
            expired: expired.len(),
            ..Default::default()
        };

        for subscription in expired {
            match self.eviction.evict(subscription.user_id, chat_id).await {
                Ok(()) => report.evicted.push(subscription.user_id),
                Err(err) => {
                    error!(
                        "Failed to evict user {}: {:#}",
                        subscription.user_id, err
                    );
                    report.failed.push(subscription.user_id);
                }
            }
        }

        if report.expired > 0 {
            info!(
                "Sweep of chat {}: {} expired, {} evicted, {} failed",
                chat_id,
                report.expired,
                report.evicted.len(),
                report.failed.len()
            );
        }
        Ok(report)
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SweepReport {
    pub expired: usize,
    pub evicted: Vec<UserId>,
    pub failed: Vec<UserId>,
}
