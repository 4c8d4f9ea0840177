//! Business logic services for storefront.
//!
//! # Services
//!
//! - `auth` - Account registration and password login
//! - `cart` - Session cart operations behind the [`cart::CartSession`] seam
//! - `checkout` - Cart to order conversion
//! - `session_lock` - Per-session mutual exclusion for checkout

pub mod auth;
pub mod cart;
pub mod checkout;
pub mod session_lock;

use rand::Rng;

/// Generate `len` random lowercase base36 characters (`0-9a-z`).
pub(crate) fn random_base36(len: usize) -> String {
    let mut rng = rand::rng();
    (0..len)
        .map(|_| char::from_digit(rng.random_range(0..36), 36).unwrap_or('0'))
        .collect()
}
