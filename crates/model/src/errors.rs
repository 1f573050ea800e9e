use thiserror::Error;

use crate::{adjustment::ArgumentError, ChatId, UserId};

#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("Common error: {0}")]
    Eyre(#[from] eyre::Error),
    #[error("User {user_id} is not an administrator")]
    PermissionDenied { user_id: UserId },
    #[error("Invalid argument: {0}")]
    InvalidArgument(#[from] ArgumentError),
    #[error("Subscription not found: {0}")]
    NotFound(UserId),
    #[error("Failed to remove user {user_id} from chat {chat_id}: {source:#}")]
    TransportFailure {
        user_id: UserId,
        chat_id: ChatId,
        source: eyre::Error,
    },
}
