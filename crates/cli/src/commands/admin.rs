//! Admin account management.
//!
//! Accounts are created through `POST /api/register`; this command only
//! flips the `is_admin` flag on an existing one.
//!
//! # Usage
//!
//! ```bash
//! yr-cli admin grant -e owner@example.com
//! yr-cli admin revoke -e owner@example.com
//! ```

use thiserror::Error;

use yr_shop_core::{Email, EmailError};
use yr_shop_storefront::db::{self, RepositoryError, UserRepository};

/// Errors that can occur during admin operations.
#[derive(Debug, Error)]
pub enum AdminError {
    /// Required environment variable is missing.
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    /// Database connection error.
    #[error("Database connection error: {0}")]
    Database(#[from] sqlx::Error),

    /// Invalid email.
    #[error("Invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    /// No account with this email.
    #[error("No account registered with email: {0}")]
    UnknownAccount(String),

    /// Update failed.
    #[error("Repository error: {0}")]
    Repository(RepositoryError),
}

/// Grant (`true`) or revoke (`false`) admin access for an account.
///
/// # Errors
///
/// Returns `AdminError` if the email is invalid, no account has it, or the
/// database is unreachable.
pub async fn set_admin(email: &str, is_admin: bool) -> Result<(), AdminError> {
    let email = Email::parse(email)?;

    let database_url =
        super::database_url().map_err(|_| AdminError::MissingEnvVar("STOREFRONT_DATABASE_URL"))?;

    tracing::info!("Connecting to storefront database...");
    let pool = db::create_pool(&database_url).await?;

    UserRepository::new(&pool)
        .set_admin(&email, is_admin)
        .await
        .map_err(|e| match e {
            RepositoryError::NotFound => AdminError::UnknownAccount(email.to_string()),
            other => AdminError::Repository(other),
        })?;

    if is_admin {
        tracing::info!(email = %email, "Admin access granted");
    } else {
        tracing::info!(email = %email, "Admin access revoked");
    }

    Ok(())
}
