//! Session middleware configuration.
//!
//! Sets up `PostgreSQL`-backed sessions using tower-sessions. Cookies are
//! signed with a key derived from `SESSION_SECRET`.

use secrecy::ExposeSecret;
use sha2::{Digest, Sha512};
use tower_sessions::cookie::{Key, SameSite};
use tower_sessions::{Expiry, SessionManagerLayer, SessionStore};

use crate::config::StorefrontConfig;

/// Session expiry time in seconds (7 days).
const SESSION_EXPIRY_SECONDS: i64 = 7 * 24 * 60 * 60;

/// Derive the 64-byte cookie signing key from the configured secret.
fn signing_key(config: &StorefrontConfig) -> Key {
    let digest = Sha512::digest(config.session_secret.expose_secret().as_bytes());
    Key::from(digest.as_slice())
}

/// Create the session layer over any session store.
///
/// Production passes a `PostgresStore` (table `tower_sessions.session`,
/// created by migration); tests pass a `MemoryStore`.
#[must_use]
pub fn create_session_layer<S: SessionStore + Clone>(
    store: S,
    config: &StorefrontConfig,
) -> SessionManagerLayer<S, tower_sessions::service::SignedCookie> {
    SessionManagerLayer::new(store)
        .with_name(config.cookie_name.clone())
        .with_expiry(Expiry::OnInactivity(
            tower_sessions::cookie::time::Duration::seconds(SESSION_EXPIRY_SECONDS),
        ))
        .with_secure(config.is_secure())
        .with_same_site(SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
        .with_signed(signing_key(config))
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use secrecy::SecretString;

    use super::*;

    fn config(secret: &str) -> StorefrontConfig {
        StorefrontConfig {
            database_url: SecretString::from("postgres://localhost/yr_shop"),
            host: std::net::IpAddr::from([127, 0, 0, 1]),
            port: 5000,
            base_url: "http://localhost:5000".to_string(),
            session_secret: SecretString::from(secret),
            cookie_name: "yr.sid".to_string(),
            public_dir: PathBuf::from("public"),
            sentry_dsn: None,
            sentry_environment: None,
        }
    }

    #[test]
    fn test_signing_key_is_deterministic() {
        let a = signing_key(&config("k9$Lm2@pQ7!xZ4#rT8&wV1*bN6^cF3%h"));
        let b = signing_key(&config("k9$Lm2@pQ7!xZ4#rT8&wV1*bN6^cF3%h"));
        let c = signing_key(&config("another-secret-value-0123456789ab"));
        assert_eq!(a.signing(), b.signing());
        assert_ne!(a.signing(), c.signing());
    }
}
