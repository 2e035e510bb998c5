//! Delivery fee rules.

use rust_decimal::Decimal;

use crate::app_config::AppConfig;
use crate::orders::DeliveryMethod;

/// Delivery fee parameters: orders at or above `free_delivery_threshold`
/// ship free; below it a flat `delivery_fee` applies. Pickup is always free.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeeSchedule {
    pub free_delivery_threshold: Decimal,
    pub delivery_fee: Decimal,
}

impl FeeSchedule {
    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            free_delivery_threshold: config.free_delivery_threshold,
            delivery_fee: config.delivery_fee,
        }
    }

    /// Fee for a given delivery method and order subtotal.
    #[must_use]
    pub fn fee_for(&self, method: DeliveryMethod, subtotal: Decimal) -> Decimal {
        match method {
            DeliveryMethod::Pickup => Decimal::ZERO,
            DeliveryMethod::Delivery => {
                if subtotal >= self.free_delivery_threshold {
                    Decimal::ZERO
                } else {
                    self.delivery_fee
                }
            }
        }
    }
}

impl Default for FeeSchedule {
    fn default() -> Self {
        Self {
            free_delivery_threshold: Decimal::from(500),
            delivery_fee: Decimal::from(50),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pickup_is_always_free() {
        let fees = FeeSchedule::default();
        assert_eq!(
            fees.fee_for(DeliveryMethod::Pickup, Decimal::from(10)),
            Decimal::ZERO
        );
        assert_eq!(
            fees.fee_for(DeliveryMethod::Pickup, Decimal::from(10_000)),
            Decimal::ZERO
        );
    }

    #[test]
    fn delivery_below_threshold_charges_flat_fee() {
        let fees = FeeSchedule::default();
        assert_eq!(
            fees.fee_for(DeliveryMethod::Delivery, Decimal::new(499_99, 2)),
            Decimal::from(50)
        );
    }

    #[test]
    fn delivery_at_threshold_is_free() {
        let fees = FeeSchedule::default();
        assert_eq!(
            fees.fee_for(DeliveryMethod::Delivery, Decimal::from(500)),
            Decimal::ZERO
        );
        assert_eq!(
            fees.fee_for(DeliveryMethod::Delivery, Decimal::from(501)),
            Decimal::ZERO
        );
    }
}
