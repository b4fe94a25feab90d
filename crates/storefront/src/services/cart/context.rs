//! Per-request cart context.

use sessioncart_core::CartId;

/// The visitor's cart identity for one request.
///
/// Built from the session before a cart operation and written back afterwards
/// when [`CartContext::is_generated`] reports a new identifier.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CartContext {
    cart_id: Option<CartId>,
    generated: bool,
}

impl CartContext {
    /// A context with no cart yet.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A context for an existing cart.
    #[must_use]
    pub const fn with_cart_id(cart_id: CartId) -> Self {
        Self {
            cart_id: Some(cart_id),
            generated: false,
        }
    }

    /// Build a context from the raw session value.
    ///
    /// Missing, empty and unparseable values all mean "no cart yet".
    #[must_use]
    pub fn from_session_value(value: Option<&str>) -> Self {
        value
            .and_then(|s| CartId::parse(s).ok())
            .map_or_else(Self::new, Self::with_cart_id)
    }

    /// Returns the cart identifier, generating one on first use.
    pub fn derive_cart_id(&mut self) -> &CartId {
        let generated = &mut self.generated;
        self.cart_id.get_or_insert_with(|| {
            *generated = true;
            CartId::generate()
        })
    }

    /// Returns the cart identifier without generating one.
    #[must_use]
    pub const fn cart_id(&self) -> Option<&CartId> {
        self.cart_id.as_ref()
    }

    /// Returns true if the identifier was generated during this request and
    /// still has to be stored in the session.
    #[must_use]
    pub const fn is_generated(&self) -> bool {
        self.generated
    }
}
