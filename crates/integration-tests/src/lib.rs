//! End-to-end tests for YR Shop.
//!
//! These drive a running storefront over HTTP with a cookie-keeping client,
//! the way a browser would.
//!
//! # Running Tests
//!
//! ```bash
//! cargo run -p yr-shop-cli -- migrate
//! cargo run -p yr-shop-cli -- seed products crates/cli/seeds/products.yaml
//! cargo run -p yr-shop-storefront &
//! cargo test -p yr-shop-integration-tests -- --ignored
//! ```
//!
//! `STOREFRONT_URL` overrides the default `http://localhost:5000`.

use reqwest::{Client, Response, StatusCode};
use serde_json::Value;

/// Base URL of the storefront under test.
#[must_use]
pub fn storefront_url() -> String {
    std::env::var("STOREFRONT_URL").unwrap_or_else(|_| "http://localhost:5000".to_string())
}

/// A browser-like visitor: one cookie jar, one session.
pub struct Visitor {
    client: Client,
    base_url: String,
}

impl Visitor {
    /// Start a fresh visitor with an empty cookie jar.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client cannot be built.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn new() -> Self {
        Self {
            client: Client::builder()
                .cookie_store(true)
                .build()
                .expect("Failed to create HTTP client"),
            base_url: storefront_url(),
        }
    }

    /// `GET {base}{path}`.
    ///
    /// # Errors
    ///
    /// Returns the transport error if the request could not be sent.
    pub async fn get(&self, path: &str) -> reqwest::Result<Response> {
        self.client
            .get(format!("{}{path}", self.base_url))
            .send()
            .await
    }

    /// `POST {base}{path}` with a JSON body.
    ///
    /// # Errors
    ///
    /// Returns the transport error if the request could not be sent.
    pub async fn post(&self, path: &str, body: &Value) -> reqwest::Result<Response> {
        self.client
            .post(format!("{}{path}", self.base_url))
            .json(body)
            .send()
            .await
    }
}

impl Default for Visitor {
    fn default() -> Self {
        Self::new()
    }
}

/// Read a response as `(status, json)`; non-JSON bodies become `Value::Null`.
///
/// # Errors
///
/// Returns the transport error if the body could not be read.
pub async fn json_of(response: Response) -> reqwest::Result<(StatusCode, Value)> {
    let status = response.status();
    let bytes = response.bytes().await?;
    Ok((status, serde_json::from_slice(&bytes).unwrap_or(Value::Null)))
}

/// A unique throwaway email address.
#[must_use]
pub fn unique_email() -> String {
    format!("e2e-{}@example.test", uuid::Uuid::new_v4().simple())
}
