//! Session-related types.
//!
//! The session record holds the logged-in identity and the cart. Both are
//! stored as JSON values under the keys in [`keys`].

use serde::{Deserialize, Serialize};

use yr_shop_core::{Email, UserId};

/// Session-stored user identity.
///
/// Minimal data stored in the session to identify the logged-in user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentUser {
    /// User's database ID.
    pub id: UserId,
    /// User's email address.
    pub email: Email,
}

/// Session keys.
pub mod keys {
    /// Key for storing the current logged-in user.
    pub const CURRENT_USER: &str = "current_user";

    /// Key for the session cart (`[{"id", "qty"}]`).
    pub const CART: &str = "cart";
}
