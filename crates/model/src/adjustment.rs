use chrono::Duration;
use thiserror::Error;

use crate::UserId;

/// Upper bound for a single adjustment, one hundred years.
pub const MAX_ADJUST_HOURS: i64 = 100 * 365 * 24;

/// Arguments of the `/add` and `/reduce` commands: `userid|hours|note`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Adjustment {
    pub user_id: UserId,
    pub hours: i64,
    pub note: String,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ArgumentError {
    #[error("expected exactly one argument, got {0}")]
    WrongTokenCount(usize),
    #[error("expected three fields separated by '|', got {0}")]
    WrongFieldCount(usize),
    #[error("user id '{0}' is not an integer")]
    InvalidUserId(String),
    #[error("hours '{0}' is not an integer")]
    InvalidHours(String),
    #[error("hours must be between 1 and {max}, got {0}", max = MAX_ADJUST_HOURS)]
    HoursOutOfRange(i64),
}

impl Adjustment {
    pub fn parse(raw: &str) -> Result<Adjustment, ArgumentError> {
        let tokens: Vec<&str> = raw.split_whitespace().collect();
        let token = match tokens.as_slice() {
            [token] => *token,
            other => return Err(ArgumentError::WrongTokenCount(other.len())),
        };

        let fields: Vec<&str> = token.split('|').collect();
        let (user_id, hours, note) = match fields.as_slice() {
            [user_id, hours, note] => (*user_id, *hours, *note),
            other => return Err(ArgumentError::WrongFieldCount(other.len())),
        };

        let user_id = user_id
            .parse::<UserId>()
            .map_err(|_| ArgumentError::InvalidUserId(user_id.to_string()))?;
        let hours = hours
            .parse::<i64>()
            .map_err(|_| ArgumentError::InvalidHours(hours.to_string()))?;
        if !(1..=MAX_ADJUST_HOURS).contains(&hours) {
            return Err(ArgumentError::HoursOutOfRange(hours));
        }

        Ok(Adjustment {
            user_id,
            hours,
            note: note.to_string(),
        })
    }

    pub fn delta(&self) -> Duration {
        Duration::hours(self.hours)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid() {
        let adj = Adjustment::parse("42|5|renewed").unwrap();
        assert_eq!(
            adj,
            Adjustment {
                user_id: 42,
                hours: 5,
                note: "renewed".to_string(),
            }
        );
        assert_eq!(adj.delta(), Duration::hours(5));
    }

    #[test]
    fn test_parse_trims_surrounding_whitespace() {
        let adj = Adjustment::parse("  42|5|renewed \n").unwrap();
        assert_eq!(adj.user_id, 42);
    }

    #[test]
    fn test_parse_empty_note() {
        let adj = Adjustment::parse("42|5|").unwrap();
        assert_eq!(adj.note, "");
    }

    #[test]
    fn test_parse_rejects_extra_fields() {
        assert_eq!(
            Adjustment::parse("42|5|a|b"),
            Err(ArgumentError::WrongFieldCount(4))
        );
    }

    #[test]
    fn test_parse_wrong_token_count() {
        assert_eq!(
            Adjustment::parse(""),
            Err(ArgumentError::WrongTokenCount(0))
        );
        assert_eq!(
            Adjustment::parse("42|5|paid in cash"),
            Err(ArgumentError::WrongTokenCount(3))
        );
    }

    #[test]
    fn test_parse_missing_fields() {
        assert_eq!(Adjustment::parse("42"), Err(ArgumentError::WrongFieldCount(1)));
        assert_eq!(Adjustment::parse("42|5"), Err(ArgumentError::WrongFieldCount(2)));
    }

    #[test]
    fn test_parse_non_integer_fields() {
        assert_eq!(
            Adjustment::parse("bob|5|x"),
            Err(ArgumentError::InvalidUserId("bob".to_string()))
        );
        assert_eq!(
            Adjustment::parse("42|five|x"),
            Err(ArgumentError::InvalidHours("five".to_string()))
        );
        assert_eq!(
            Adjustment::parse("42|1.5|x"),
            Err(ArgumentError::InvalidHours("1.5".to_string()))
        );
    }

    #[test]
    fn test_parse_hours_range() {
        assert_eq!(
            Adjustment::parse("42|0|x"),
            Err(ArgumentError::HoursOutOfRange(0))
        );
        assert_eq!(
            Adjustment::parse("42|-3|x"),
            Err(ArgumentError::HoursOutOfRange(-3))
        );
        let too_many = format!("42|{}|x", MAX_ADJUST_HOURS + 1);
        assert_eq!(
            Adjustment::parse(&too_many),
            Err(ArgumentError::HoursOutOfRange(MAX_ADJUST_HOURS + 1))
        );
    }

    #[test]
    fn test_negative_user_id_is_accepted() {
        assert_eq!(Adjustment::parse("-100|1|x").unwrap().user_id, -100);
    }
}
