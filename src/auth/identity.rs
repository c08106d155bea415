use std::fmt;

pub const MAX_USER_ID_LEN: usize = 64;

/// Authenticated principal that owns expense records.
///
/// Only obtainable through [`UserId::parse`], so every value handed to the
/// store has already been checked.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UserId(String);

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidUserId {
    #[error("principal id is empty")]
    Empty,
    #[error("principal id is longer than {MAX_USER_ID_LEN} characters")]
    TooLong,
}

impl UserId {
    pub fn parse(raw: impl Into<String>) -> Result<Self, InvalidUserId> {
        let raw = raw.into();
        if raw.trim().is_empty() {
            return Err(InvalidUserId::Empty);
        }
        if raw.chars().count() > MAX_USER_ID_LEN {
            return Err(InvalidUserId::TooLong);
        }
        Ok(Self(raw))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_opaque_ids() {
        let id = UserId::parse("00000000-aaaa-bbbb-cccc-000000000001").unwrap();
        assert_eq!(id.as_str(), "00000000-aaaa-bbbb-cccc-000000000001");
        assert_eq!(id.to_string(), id.as_str());
    }

    #[test]
    fn rejects_blank() {
        assert_eq!(UserId::parse(""), Err(InvalidUserId::Empty));
        assert_eq!(UserId::parse("   "), Err(InvalidUserId::Empty));
    }

    #[test]
    fn length_bound_is_inclusive() {
        assert!(UserId::parse("a".repeat(MAX_USER_ID_LEN)).is_ok());
        assert_eq!(
            UserId::parse("a".repeat(MAX_USER_ID_LEN + 1)),
            Err(InvalidUserId::TooLong)
        );
    }
}
