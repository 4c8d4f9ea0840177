//! Session cart operations.
//!
//! Handlers never touch the session record directly. Everything goes through
//! [`CartSession`], implemented for `tower_sessions::Session` in production
//! and by in-memory fakes in tests.

use std::future::Future;

use thiserror::Error;
use tower_sessions::Session;

use yr_shop_core::{Cart, CartError, product_id_from_client, quantity_from_client};

use crate::models::{CurrentUser, session_keys};

/// Errors reading or writing the session record.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("session store error: {0}")]
    Store(#[from] tower_sessions::session::Error),
}

/// Access to the cart and identity held in a visitor's session.
pub trait CartSession: Send + Sync {
    /// Current cart, empty if the session holds none.
    fn load_cart(&self) -> impl Future<Output = Result<Cart, SessionError>> + Send;

    /// Replace the stored cart.
    fn store_cart(&self, cart: &Cart) -> impl Future<Output = Result<(), SessionError>> + Send;

    /// The logged-in user, if any.
    fn current_user(&self) -> impl Future<Output = Result<Option<CurrentUser>, SessionError>> + Send;

    /// Persist pending changes to the session store now.
    fn flush(&self) -> impl Future<Output = Result<(), SessionError>> + Send;

    /// Stable key identifying the session, `None` until it has been stored.
    fn session_key(&self) -> Option<String>;
}

impl CartSession for Session {
    async fn load_cart(&self) -> Result<Cart, SessionError> {
        match self.get::<Cart>(session_keys::CART).await {
            Ok(cart) => Ok(cart.unwrap_or_default()),
            Err(tower_sessions::session::Error::SerdeJson(e)) => {
                tracing::warn!(error = %e, "Discarding unreadable session cart");
                Ok(Cart::new())
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn store_cart(&self, cart: &Cart) -> Result<(), SessionError> {
        self.insert(session_keys::CART, cart).await?;
        Ok(())
    }

    async fn current_user(&self) -> Result<Option<CurrentUser>, SessionError> {
        Ok(self.get::<CurrentUser>(session_keys::CURRENT_USER).await?)
    }

    async fn flush(&self) -> Result<(), SessionError> {
        self.save().await?;
        Ok(())
    }

    fn session_key(&self) -> Option<String> {
        self.id().map(|id| id.to_string())
    }
}

/// Errors from cart operations.
#[derive(Debug, Error)]
pub enum CartServiceError {
    #[error(transparent)]
    Invalid(#[from] CartError),

    #[error(transparent)]
    Session(#[from] SessionError),
}

/// Cart operations for one session.
///
/// Mutations only change the session record. The session layer writes it
/// back once the response is ready, while the request still holds the
/// session lock taken by [`crate::middleware::session_lock_middleware`].
pub struct CartService<'a, S> {
    session: &'a S,
}

impl<'a, S: CartSession> CartService<'a, S> {
    #[must_use]
    pub const fn new(session: &'a S) -> Self {
        Self { session }
    }

    /// Current cart. No side effects.
    ///
    /// # Errors
    ///
    /// Returns `CartServiceError::Session` if the session store fails.
    pub async fn get(&self) -> Result<Cart, CartServiceError> {
        Ok(self.session.load_cart().await?)
    }

    /// Add units of a product. `qty` defaults to 1.
    ///
    /// Product existence is not checked here; checkout does that.
    ///
    /// # Errors
    ///
    /// Returns `CartServiceError::Invalid` for a bad id or quantity, leaving
    /// the cart unchanged.
    pub async fn add(&self, product_id: i64, qty: Option<i64>) -> Result<Cart, CartServiceError> {
        let product_id = product_id_from_client(product_id)?;
        let qty = quantity_from_client(qty.unwrap_or(1), 1)?;
        self.mutate(|cart| cart.add(product_id, qty)).await
    }

    /// Set a line's quantity. Zero removes the line; unknown products are ignored.
    ///
    /// # Errors
    ///
    /// Returns `CartServiceError::Invalid` for a bad id or quantity.
    pub async fn update(&self, product_id: i64, qty: i64) -> Result<Cart, CartServiceError> {
        let product_id = product_id_from_client(product_id)?;
        let qty = quantity_from_client(qty, 0)?;
        self.mutate(|cart| cart.set_quantity(product_id, qty)).await
    }

    /// Remove a product's line if present.
    ///
    /// # Errors
    ///
    /// Returns `CartServiceError::Invalid` for a bad id.
    pub async fn remove(&self, product_id: i64) -> Result<Cart, CartServiceError> {
        let product_id = product_id_from_client(product_id)?;
        self.mutate(|cart| {
            cart.remove(product_id);
            Ok(())
        })
        .await
    }

    async fn mutate<F>(&self, apply: F) -> Result<Cart, CartServiceError>
    where
        F: FnOnce(&mut Cart) -> Result<(), CartError> + Send,
    {
        let mut cart = self.session.load_cart().await?;
        apply(&mut cart)?;
        self.session.store_cart(&cart).await?;

        Ok(cart)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) mod testing {
    //! In-memory [`CartSession`] for service tests.

    use std::sync::Mutex;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    use super::*;

    #[derive(Default)]
    pub struct MemorySession {
        pub cart: Mutex<Cart>,
        pub user: Mutex<Option<CurrentUser>>,
        pub flushes: AtomicUsize,
        pub fail_flush: AtomicBool,
    }

    impl MemorySession {
        pub fn with_cart(cart: Cart) -> Self {
            Self {
                cart: Mutex::new(cart),
                ..Self::default()
            }
        }

        #[allow(clippy::unwrap_used)]
        pub fn cart(&self) -> Cart {
            self.cart.lock().unwrap().clone()
        }
    }

    #[allow(clippy::unwrap_used)]
    impl CartSession for MemorySession {
        async fn load_cart(&self) -> Result<Cart, SessionError> {
            Ok(self.cart.lock().unwrap().clone())
        }

        async fn store_cart(&self, cart: &Cart) -> Result<(), SessionError> {
            *self.cart.lock().unwrap() = cart.clone();
            Ok(())
        }

        async fn current_user(&self) -> Result<Option<CurrentUser>, SessionError> {
            Ok(self.user.lock().unwrap().clone())
        }

        async fn flush(&self) -> Result<(), SessionError> {
            if self.fail_flush.load(Ordering::SeqCst) {
                return Err(SessionError::Store(
                    tower_sessions::session::Error::Store(
                        tower_sessions::session_store::Error::Backend("store down".to_owned()),
                    ),
                ));
            }
            self.flushes.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        fn session_key(&self) -> Option<String> {
            Some("test-session".to_owned())
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::atomic::Ordering;

    use yr_shop_core::{CartLine, ProductId};

    use super::testing::MemorySession;
    use super::*;

    #[tokio::test]
    async fn test_add_defaults_to_one_and_merges() {
        let session = MemorySession::default();
        let carts = CartService::new(&session);

        carts.add(1, None).await.unwrap();
        carts.add(1, Some(2)).await.unwrap();
        let cart = carts.add(1, Some(3)).await.unwrap();

        assert_eq!(
            cart.lines(),
            &[CartLine {
                product_id: ProductId::new(1),
                qty: 6
            }]
        );
        assert_eq!(session.cart(), cart);
        assert_eq!(session.flushes.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_invalid_input_leaves_cart_unchanged() {
        let session = MemorySession::default();
        let carts = CartService::new(&session);
        carts.add(4, Some(2)).await.unwrap();

        assert!(matches!(
            carts.add(0, Some(1)).await,
            Err(CartServiceError::Invalid(CartError::InvalidProduct(0)))
        ));
        assert!(matches!(
            carts.add(4, Some(-1)).await,
            Err(CartServiceError::Invalid(CartError::InvalidQuantity { .. }))
        ));
        assert!(matches!(
            carts.update(4, 100).await,
            Err(CartServiceError::Invalid(CartError::InvalidQuantity { .. }))
        ));

        assert_eq!(session.cart().item_count(), 2);
    }

    #[tokio::test]
    async fn test_update_and_remove() {
        let session = MemorySession::default();
        let carts = CartService::new(&session);
        carts.add(1, Some(1)).await.unwrap();
        carts.add(2, Some(1)).await.unwrap();

        let cart = carts.update(1, 7).await.unwrap();
        assert_eq!(cart.item_count(), 8);

        let cart = carts.update(2, 0).await.unwrap();
        assert_eq!(cart.product_ids(), vec![ProductId::new(1)]);

        let cart = carts.remove(1).await.unwrap();
        assert!(cart.is_empty());

        let cart = carts.remove(1).await.unwrap();
        assert!(cart.is_empty());
    }

    #[tokio::test]
    async fn test_get_has_no_side_effects() {
        let session = MemorySession::default();
        let carts = CartService::new(&session);

        assert!(carts.get().await.unwrap().is_empty());
        assert_eq!(session.flushes.load(Ordering::SeqCst), 0);
    }
}
