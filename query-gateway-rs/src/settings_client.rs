// query-gateway-rs/src/settings_client.rs
//
// Host settings capability for the access token endpoint.
//
// The gateway never mints tokens itself; it reports whatever token the
// host environment currently holds. Both the token and its expiration
// must be present for the request to succeed.

use std::env;

use chrono::DateTime;
use serde::{Deserialize, Serialize};

/// The token pair returned by the token endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessTokenInfo {
    pub access_token: String,
    /// Expiration as epoch seconds.
    pub expires_at: i64,
}

/// Injected settings capability exposing the host's current access token.
pub trait TokenSettings: Send + Sync {
    fn current_access_token(&self) -> Option<String>;
    fn access_token_expiration_time(&self) -> Option<i64>;
}

/// Environment-backed settings.
///
/// Reads:
/// - GATEWAY_ACCESS_TOKEN: the current access token
/// - GATEWAY_ACCESS_TOKEN_EXPIRES_AT: expiration as epoch seconds or an
///   RFC 3339 timestamp
pub struct EnvTokenSettings {
    token_var: String,
    expiry_var: String,
}

impl EnvTokenSettings {
    pub fn new() -> Self {
        Self::with_vars("GATEWAY_ACCESS_TOKEN", "GATEWAY_ACCESS_TOKEN_EXPIRES_AT")
    }

    /// Custom variable names, mainly so tests don't race on shared env keys.
    pub fn with_vars(token_var: &str, expiry_var: &str) -> Self {
        Self {
            token_var: token_var.to_string(),
            expiry_var: expiry_var.to_string(),
        }
    }
}

impl Default for EnvTokenSettings {
    fn default() -> Self {
        Self::new()
    }
}

impl TokenSettings for EnvTokenSettings {
    fn current_access_token(&self) -> Option<String> {
        env::var(&self.token_var)
            .ok()
            .map(|token| token.trim().to_string())
            .filter(|token| !token.is_empty())
    }

    fn access_token_expiration_time(&self) -> Option<i64> {
        let raw = env::var(&self.expiry_var).ok()?;
        let raw = raw.trim();

        if let Ok(epoch) = raw.parse::<i64>() {
            return Some(epoch);
        }

        DateTime::parse_from_rfc3339(raw)
            .ok()
            .map(|moment| moment.timestamp())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_settings_present() {
        std::env::set_var("SETTINGS_TEST_TOKEN_A", "abc123");
        std::env::set_var("SETTINGS_TEST_EXPIRY_A", "1735689600");

        let settings = EnvTokenSettings::with_vars("SETTINGS_TEST_TOKEN_A", "SETTINGS_TEST_EXPIRY_A");
        assert_eq!(settings.current_access_token(), Some("abc123".to_string()));
        assert_eq!(settings.access_token_expiration_time(), Some(1735689600));
    }

    #[test]
    fn test_env_settings_rfc3339_expiry() {
        std::env::set_var("SETTINGS_TEST_TOKEN_B", "abc123");
        std::env::set_var("SETTINGS_TEST_EXPIRY_B", "2025-01-01T00:00:00Z");

        let settings = EnvTokenSettings::with_vars("SETTINGS_TEST_TOKEN_B", "SETTINGS_TEST_EXPIRY_B");
        assert_eq!(settings.access_token_expiration_time(), Some(1735689600));
    }

    #[test]
    fn test_env_settings_absent() {
        std::env::remove_var("SETTINGS_TEST_TOKEN_C");
        std::env::remove_var("SETTINGS_TEST_EXPIRY_C");

        let settings = EnvTokenSettings::with_vars("SETTINGS_TEST_TOKEN_C", "SETTINGS_TEST_EXPIRY_C");
        assert_eq!(settings.current_access_token(), None);
        assert_eq!(settings.access_token_expiration_time(), None);
    }

    #[test]
    fn test_empty_token_is_absent() {
        std::env::set_var("SETTINGS_TEST_TOKEN_D", "   ");

        let settings = EnvTokenSettings::with_vars("SETTINGS_TEST_TOKEN_D", "SETTINGS_TEST_EXPIRY_D");
        assert_eq!(settings.current_access_token(), None);
    }

    #[test]
    fn test_unparseable_expiry_is_absent() {
        std::env::set_var("SETTINGS_TEST_EXPIRY_E", "next tuesday");

        let settings = EnvTokenSettings::with_vars("SETTINGS_TEST_TOKEN_E", "SETTINGS_TEST_EXPIRY_E");
        assert_eq!(settings.access_token_expiration_time(), None);
    }
}
