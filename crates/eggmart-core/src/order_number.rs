//! Client-visible order number generation.

use chrono::Utc;
use rand::Rng;

pub const ORDER_NUMBER_PREFIX: &str = "EGG";

/// Generate an order number: `EGG` + the last 6 digits of a millisecond
/// timestamp + a 3-digit zero-padded random suffix.
///
/// Collisions are possible and are not retried here; the unique constraint
/// on `orders.order_number` surfaces them as a conflict.
#[must_use]
pub fn generate_order_number() -> String {
    let millis = Utc::now().timestamp_millis();
    let suffix: u32 = rand::rng().random_range(0..1000);
    format!(
        "{ORDER_NUMBER_PREFIX}{:06}{suffix:03}",
        millis.rem_euclid(1_000_000)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_number_has_expected_shape() {
        let number = generate_order_number();
        assert_eq!(number.len(), ORDER_NUMBER_PREFIX.len() + 9);
        assert!(number.starts_with(ORDER_NUMBER_PREFIX));
        assert!(
            number[ORDER_NUMBER_PREFIX.len()..]
                .chars()
                .all(|c| c.is_ascii_digit()),
            "digits expected after prefix, got {number}"
        );
    }
}
