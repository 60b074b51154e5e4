//! Menucart prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    addons::{AddonIdSet, ProductAddon, selection::AddonSelection},
    cart::{
        Cart, CartConflict, LineChange,
        guard::{ConflictGuard, GuardError, GuardOutcome, GuardState, PendingAdd},
        line::{CartLine, FrozenPrice, LineIdentity, NewLine},
    },
    fixtures::{FixtureError, MenuFixture},
    ids::{AddonId, OfferId, ProductId, RestaurantId},
    menu::{Menu, MenuError},
    offers::{DiscountPercent, Offer, OfferKind, OfferScope, OfferSnapshot, OfferTarget},
    orders::{OrderItem, OrderRequest},
    pricing::{DisplayPrice, LineSubtotal, PricingError},
    products::{AddonRequirement, Product, ProductError},
    receipt::{Receipt, ReceiptError},
    session::{OrderSession, PricePolicy, SessionConfig, SessionError},
};
