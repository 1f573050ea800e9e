pub mod eviction;
pub mod subscriptions;
