//! Offer Resolver
//!
//! Picks the discount a product or add-on receives from a set of offers.

use jiff::civil::Date;

use crate::offers::{DiscountPercent, Offer, OfferTarget};

/// Return the best discount any active offer grants the target.
///
/// An offer takes part when it is a positive percentage offer, its validity
/// window (when fully published) includes `today`, and its scope covers the
/// target. The largest percentage wins so the customer always gets the best
/// deal; `None` means full price.
///
/// The result is never cached: callers pass the current snapshot every time.
pub fn best_discount_percent(
    offers: &[Offer],
    target: OfferTarget,
    today: Date,
) -> Option<DiscountPercent> {
    offers
        .iter()
        .filter(|offer| offer.is_active_on(today))
        .filter(|offer| offer.covers(target))
        .filter_map(Offer::discount)
        .max()
}

#[cfg(test)]
mod tests {
    use jiff::civil::date;
    use rust_decimal::Decimal;

    use crate::{
        ids::{AddonId, OfferId, ProductId, RestaurantId},
        offers::OfferKind,
    };

    use super::*;

    const TODAY: Date = date(2026, 10, 18);

    fn percent(id: u64, value: i64) -> Offer {
        Offer::percent_off(OfferId::new(id), RestaurantId::new(5), Decimal::from(value))
    }

    fn points(value: i64) -> Option<DiscountPercent> {
        DiscountPercent::new(Decimal::from(value))
    }

    #[test]
    fn no_offers_means_full_price() {
        let target = OfferTarget::Product(ProductId::new(1));

        assert_eq!(best_discount_percent(&[], target, TODAY), None);
    }

    #[test]
    fn largest_applicable_discount_wins() {
        let offers = [
            percent(1, 10),
            percent(2, 20).for_selected([ProductId::new(1)], []),
            percent(3, 15),
        ];

        assert_eq!(
            best_discount_percent(&offers, OfferTarget::Product(ProductId::new(1)), TODAY),
            points(20)
        );
        assert_eq!(
            best_discount_percent(&offers, OfferTarget::Product(ProductId::new(2)), TODAY),
            points(15)
        );
    }

    #[test]
    fn product_scope_does_not_cover_its_addons() {
        let offers = [percent(1, 30).for_selected([ProductId::new(1)], [])];

        assert_eq!(
            best_discount_percent(&offers, OfferTarget::Addon(AddonId::new(1)), TODAY),
            None
        );
    }

    #[test]
    fn addon_scope_covers_listed_addons() {
        let offers = [percent(1, 25).for_selected([], [AddonId::new(4)])];

        assert_eq!(
            best_discount_percent(&offers, OfferTarget::Addon(AddonId::new(4)), TODAY),
            points(25)
        );
    }

    #[test]
    fn expired_and_future_offers_are_ignored() {
        let offers = [
            percent(1, 50).valid_between(date(2026, 1, 1), date(2026, 10, 17)),
            percent(2, 40).valid_between(date(2026, 10, 19), date(2026, 12, 31)),
            percent(3, 5).valid_between(date(2026, 10, 1), date(2026, 10, 31)),
        ];

        assert_eq!(
            best_discount_percent(&offers, OfferTarget::Product(ProductId::new(1)), TODAY),
            points(5)
        );
    }

    #[test]
    fn unsupported_and_zero_offers_are_ignored() {
        let mut bogo = percent(1, 90);
        bogo.kind = OfferKind::Unsupported {
            offer_type: "bogo".to_string(),
        };

        let offers = [bogo, percent(2, 0)];

        assert_eq!(
            best_discount_percent(&offers, OfferTarget::Product(ProductId::new(1)), TODAY),
            None
        );
    }

    #[test]
    fn result_tracks_the_snapshot_it_is_given() {
        let target = OfferTarget::Product(ProductId::new(1));
        let before = [percent(1, 10)];
        let after = [percent(1, 30)];

        assert_eq!(best_discount_percent(&before, target, TODAY), points(10));
        assert_eq!(best_discount_percent(&after, target, TODAY), points(30));
    }
}
