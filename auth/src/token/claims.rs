use chrono::Duration;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

/// Claims carried by a bearer token.
///
/// Deliberately minimal: the subject identifies the user and the expiry
/// bounds the token's lifetime. Validity is determined purely by signature
/// and expiry; no server-side state backs a token.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    /// Subject (username)
    pub sub: String,

    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

impl Claims {
    /// Create claims expiring `ttl` from now.
    ///
    /// # Arguments
    /// * `sub` - Subject (username) the token asserts
    /// * `ttl` - Time until the token expires
    pub fn with_ttl(sub: impl Into<String>, ttl: Duration) -> Self {
        Self {
            sub: sub.into(),
            exp: (Utc::now() + ttl).timestamp(),
        }
    }

    /// Create claims with an explicit expiry timestamp.
    pub fn with_expiration(sub: impl Into<String>, exp: i64) -> Self {
        Self {
            sub: sub.into(),
            exp,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_ttl() {
        let claims = Claims::with_ttl("alice", Duration::minutes(30));

        assert_eq!(claims.sub, "alice");
        let expected = (Utc::now() + Duration::minutes(30)).timestamp();
        // Allow a little slack for the clock read between construction and now
        assert!((claims.exp - expected).abs() <= 1);
    }

    #[test]
    fn test_with_expiration() {
        let claims = Claims::with_expiration("alice", 1234567890);
        assert_eq!(claims.sub, "alice");
        assert_eq!(claims.exp, 1234567890);
    }
}
