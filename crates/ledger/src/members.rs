use async_trait::async_trait;
use eyre::Error;
use model::{ChatId, UserId};

/// Group membership operations provided by the messaging transport.
#[async_trait]
pub trait ChatMembers: Send + Sync {
    async fn administrators(&self, chat_id: ChatId) -> Result<Vec<UserId>, Error>;

    /// Bans `user_id` from `chat_id`.
    async fn remove(&self, chat_id: ChatId, user_id: UserId) -> Result<(), Error>;
}
