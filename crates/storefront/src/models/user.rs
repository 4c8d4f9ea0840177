//! User domain types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use yr_shop_core::{Email, UserId};

/// A storefront account.
///
/// Serialized as the profile returned by `/api/me` and the admin user list.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct User {
    pub id: UserId,
    /// Public account reference (`UID-xxxxxxx`).
    pub uid: String,
    pub email: Email,
    pub name: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
    pub last_login_at: Option<DateTime<Utc>>,
}

/// Fields for creating an account.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub uid: String,
    pub email: Email,
    pub password_hash: String,
    pub name: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
}
