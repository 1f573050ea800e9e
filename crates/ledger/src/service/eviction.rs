use std::sync::Arc;

use log::{error, info};
use model::{errors::LedgerError, ChatId, UserId};
use storage::subscription::SubscriptionStore;

use crate::members::ChatMembers;

#[derive(Clone)]
pub struct Eviction {
    store: Arc<dyn SubscriptionStore>,
    members: Arc<dyn ChatMembers>,
}

impl Eviction {
    pub fn new(store: Arc<dyn SubscriptionStore>, members: Arc<dyn ChatMembers>) -> Self {
        Eviction { store, members }
    }

    /// Removes the user from the chat and forgets the subscription.
    ///
    /// The row is only deleted once the transport confirmed the removal, so a
    /// failed eviction is retried by the next sweep.
    pub async fn evict(&self, user_id: UserId, chat_id: ChatId) -> Result<(), LedgerError> {
        if let Err(err) = self.members.remove(chat_id, user_id).await {
            error!(
                "Failed to remove user {} from chat {}: {:#}",
                user_id, chat_id, err
            );
            return Err(LedgerError::TransportFailure {
                user_id,
                chat_id,
                source: err,
            });
        }
        self.store.delete(user_id).await?;
        info!("User {} removed from chat {}", user_id, chat_id);
        Ok(())
    }
}
