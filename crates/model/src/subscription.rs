use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::UserId;

const VALIDITY_DAYS: i64 = 1;

/// How long a subscription stays valid after its anchor.
pub fn validity_window() -> Duration {
    Duration::days(VALIDITY_DAYS)
}

/// A tracked member of the group.
///
/// Extending or reducing a subscription moves `anchor`, the expiry is always
/// `anchor + validity_window()`.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Subscription {
    #[serde(rename = "_id")]
    pub user_id: UserId,
    #[serde(rename = "join_time")]
    #[serde(with = "bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub anchor: DateTime<Utc>,
    #[serde(default)]
    pub note: Option<String>,
}

impl Subscription {
    pub fn new(user_id: UserId, now: DateTime<Utc>) -> Subscription {
        Subscription {
            user_id,
            anchor: now,
            note: None,
        }
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.anchor + validity_window()
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at()
    }

    /// Returns a copy with the anchor moved by `delta` and the note replaced.
    pub fn shifted(&self, delta: Duration, note: Option<String>) -> Subscription {
        Subscription {
            user_id: self.user_id,
            anchor: self.anchor + delta,
            note,
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone as _;

    use super::*;

    fn joined_at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).single().unwrap()
    }

    #[test]
    fn test_new_subscription_expires_after_one_day() {
        let sub = Subscription::new(42, joined_at());
        assert_eq!(sub.expires_at(), joined_at() + Duration::days(1));
        assert_eq!(sub.note, None);
    }

    #[test]
    fn test_is_expired_boundary() {
        let sub = Subscription::new(42, joined_at());
        assert!(!sub.is_expired(joined_at() + Duration::days(1) - Duration::minutes(1)));
        assert!(sub.is_expired(joined_at() + Duration::days(1)));
        assert!(sub.is_expired(joined_at() + Duration::days(1) + Duration::minutes(1)));
    }

    #[test]
    fn test_shifted_moves_anchor_and_replaces_note() {
        let sub = Subscription {
            user_id: 7,
            anchor: joined_at(),
            note: Some("old".to_string()),
        };
        let extended = sub.shifted(Duration::hours(5), Some("renewed".to_string()));
        assert_eq!(extended.anchor, joined_at() + Duration::hours(5));
        assert_eq!(extended.note.as_deref(), Some("renewed"));

        let reduced = sub.shifted(Duration::hours(-3), None);
        assert_eq!(reduced.anchor, joined_at() - Duration::hours(3));
        assert_eq!(reduced.note, None);
    }

    #[test]
    fn test_bson_layout() {
        let sub = Subscription {
            user_id: 42,
            anchor: joined_at(),
            note: Some("vip".to_string()),
        };
        let doc = bson::to_document(&sub).unwrap();
        assert_eq!(doc.get_i64("_id").unwrap(), 42);
        assert!(doc.get_datetime("join_time").is_ok());
        assert_eq!(doc.get_str("note").unwrap(), "vip");

        let back: Subscription = bson::from_document(doc).unwrap();
        assert_eq!(back, sub);
    }
}
