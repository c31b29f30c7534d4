use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use crate::UserId;

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct User {
    pub id: UserId,
    pub email: Option<String>,
}

/// Authenticated identity for the current user.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Session {
    pub access_token: String,
    pub refresh_token: Option<String>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub expires_at: Option<OffsetDateTime>,
    pub user: User,
}

impl Session {
    pub fn is_expired(&self, now: OffsetDateTime) -> bool {
        self.expires_at
            .map(|expires_at| expires_at <= now)
            .unwrap_or(false)
    }

    pub fn email(&self) -> Option<&str> {
        self.user.email.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use time::macros::datetime;
    use super::*;

    fn session(expires_at: Option<OffsetDateTime>) -> Session {
        Session {
            access_token: "token".into(),
            refresh_token: None,
            expires_at,
            user: User {
                id: UserId("u1".into()),
                email: Some("a@example.com".into()),
            },
        }
    }

    #[test]
    fn expiry() {
        let now = datetime!(2024-01-01 12:00 UTC);
        assert!(!session(None).is_expired(now));
        assert!(!session(Some(datetime!(2024-01-01 12:01 UTC))).is_expired(now));
        assert!(session(Some(now)).is_expired(now));
    }
}
