pub mod adjustment;
pub mod errors;
pub mod subscription;

/// Telegram user identifier.
pub type UserId = i64;

/// Telegram chat identifier. Groups are negative.
pub type ChatId = i64;
