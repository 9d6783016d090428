//! Product pricing using decimal arithmetic.
//!
//! Every product carries a regular price, an optional list ("de") price shown
//! struck through, and a member price for UTI Pro subscribers. Merchandisers
//! can switch member pricing off per product or pin it to a custom value.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Prices and promotional flags for a product, in BRL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Pricing {
    /// Regular selling price.
    pub price: Decimal,
    /// Member (UTI Pro) price, when one is computed by the backend.
    pub member_price: Option<Decimal>,
    /// Original list price, displayed struck through when higher than `price`.
    pub list_price: Option<Decimal>,
    /// Product is flagged as being on sale.
    pub is_on_sale: bool,
    /// Member pricing is enabled for this product.
    pub member_pricing_enabled: bool,
    /// Merchandiser override for the member price.
    pub custom_member_price: Option<Decimal>,
}
