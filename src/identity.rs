//! Acting-user resolution from launch-time context.
//!
//! The Mini App learns who the user is in one of two ways: the embedding
//! host supplies an authenticated identity in its init data, or the bot
//! appended a `uid` query parameter to the launch URL (development and
//! testing only). Resolution inspects already-captured context; it never
//! blocks and never performs I/O.

use std::fmt;

/// Telegram numeric user id
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UserId(pub i64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identity-bearing context captured once at app launch.
#[derive(Debug, Clone, Default)]
pub struct LaunchContext {
    /// Identity supplied by the embedding host (authenticated init data).
    host_user_id: Option<i64>,
    /// `uid` override from the launch URL query string. Development and
    /// testing only; never present on production traffic.
    override_user_id: Option<i64>,
}

impl LaunchContext {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_host_user(mut self, user_id: i64) -> Self {
        self.host_user_id = Some(user_id);
        self
    }

    #[must_use]
    pub fn with_override_user(mut self, user_id: i64) -> Self {
        self.override_user_id = Some(user_id);
        self
    }

    /// Parses the `uid` override out of a raw launch-URL query string
    /// (e.g. `"uid=123456789&t=1700000000"`). Unparseable values are
    /// ignored rather than rejected.
    pub fn from_query(query: &str) -> Self {
        let override_user_id = url::form_urlencoded::parse(query.as_bytes())
            .find(|(key, _)| key == "uid")
            .and_then(|(_, value)| value.parse::<i64>().ok());
        Self {
            host_user_id: None,
            override_user_id,
        }
    }

    /// Resolves the acting user: host identity first, then the launch-URL
    /// override, else `None`. A `None` result is a valid outcome; the
    /// checkout flow refuses to proceed on it rather than guessing.
    pub fn resolve(&self) -> Option<UserId> {
        self.host_user_id.or(self.override_user_id).map(UserId)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_prefers_host_identity() {
        let ctx = LaunchContext::new().with_host_user(111).with_override_user(222);
        assert_eq!(ctx.resolve(), Some(UserId(111)));
    }

    #[test]
    fn test_resolve_falls_back_to_override() {
        let ctx = LaunchContext::new().with_override_user(222);
        assert_eq!(ctx.resolve(), Some(UserId(222)));
    }

    #[test]
    fn test_resolve_none_without_identity() {
        assert_eq!(LaunchContext::new().resolve(), None);
    }

    #[test]
    fn test_from_query_parses_uid() {
        let ctx = LaunchContext::from_query("v=neon4&uid=123456789&t=1700000000");
        assert_eq!(ctx.resolve(), Some(UserId(123456789)));
    }

    #[test]
    fn test_from_query_ignores_garbage_uid() {
        assert_eq!(LaunchContext::from_query("uid=not-a-number").resolve(), None);
        assert_eq!(LaunchContext::from_query("").resolve(), None);
        assert_eq!(LaunchContext::from_query("t=1700000000").resolve(), None);
    }

    #[test]
    fn test_user_id_display() {
        assert_eq!(UserId(42).to_string(), "42");
    }
}
