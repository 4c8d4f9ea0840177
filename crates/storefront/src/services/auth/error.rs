//! Account error types.

use thiserror::Error;

use crate::db::RepositoryError;

/// Why a registration or login was refused.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("missing email or password")]
    MissingCredentials,

    #[error("invalid email: {0}")]
    InvalidEmail(#[from] yr_shop_core::EmailError),

    /// Unknown email and wrong password are deliberately indistinguishable.
    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("email already registered")]
    UserAlreadyExists,

    #[error("password rejected: {0}")]
    WeakPassword(String),

    #[error("account storage error: {0}")]
    Repository(#[from] RepositoryError),

    /// Argon2 failed to produce a hash.
    #[error("password hashing failed")]
    PasswordHash,
}
