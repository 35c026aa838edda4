//! Per-student pricing and display-price markup.
//!
//! Every amount here is in the hostel's single local currency. The ledger
//! always works with the actual price; display amounts exist only for what
//! the student is shown.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Rounds to the persisted 2-decimal precision.
pub fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(hostel_shared::constants::MONEY_SCALE, RoundingStrategy::MidpointAwayFromZero)
}

/// Upper bound of every stored amount.
pub fn max_money() -> Decimal {
    Decimal::new(hostel_shared::constants::MAX_MONEY_CENTS, hostel_shared::constants::MONEY_SCALE)
}

/// Fixed share of the room price owed by each occupant. The share depends on
/// capacity only, never on how many places are currently taken.
pub fn price_per_student(room_price: Decimal, capacity: i32) -> Result<Decimal, DomainError> {
    if capacity < 1 {
        return Err(DomainError::ValidationError(format!(
            "Room capacity must be at least 1, got {}",
            capacity
        )));
    }
    if room_price.is_sign_negative() {
        return Err(DomainError::ValidationError("Room price cannot be negative".to_string()));
    }
    if capacity == 1 {
        return Ok(round_money(room_price));
    }
    Ok(round_money(room_price / Decimal::from(capacity)))
}

/// Display share of an owner/custodian sticker price. Must not undercut the
/// actual share.
pub fn display_price_per_student(
    display_price: Decimal,
    capacity: i32,
    actual_per_student: Decimal,
) -> Result<Decimal, DomainError> {
    let display = price_per_student(display_price, capacity)?;
    if display > max_money() {
        return Err(DomainError::ValidationError(format!(
            "Display price per student cannot exceed {}",
            max_money()
        )));
    }
    if display < actual_per_student {
        return Err(DomainError::DisplayPriceBelowCost {
            display,
            actual: actual_per_student,
        });
    }
    Ok(display)
}

/// `display / actual` when markup applies, otherwise `1`.
pub fn markup_ratio(display_price: Option<Decimal>, actual_price: Decimal, markup_enabled: bool) -> Decimal {
    match display_price {
        Some(display) if markup_enabled && !actual_price.is_zero() => display / actual_price,
        _ => Decimal::ONE,
    }
}

/// Price pair snapshotted on an allocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pricing {
    pub actual: Decimal,
    pub display: Option<Decimal>,
}

impl Pricing {
    pub fn actual_only(actual: Decimal) -> Self {
        Self { actual, display: None }
    }

    /// Computes the per-student pair for a room. `display_price` is the room
    /// level sticker price, divided by capacity like the actual price.
    pub fn for_room(room_price: Decimal, capacity: i32, display_price: Option<Decimal>) -> Result<Self, DomainError> {
        let actual = price_per_student(room_price, capacity)?;
        let display = display_price
            .map(|d| display_price_per_student(d, capacity, actual))
            .transpose()?;
        Ok(Self { actual, display })
    }

    pub fn markup_ratio(&self, markup_enabled: bool) -> Decimal {
        markup_ratio(self.display, self.actual, markup_enabled)
    }

    /// Translates an actual-currency amount (paid, balance) into its
    /// display-equivalent.
    pub fn to_display(&self, amount: Decimal, markup_enabled: bool) -> Decimal {
        round_money(amount * self.markup_ratio(markup_enabled))
    }

    /// Price the student is shown.
    pub fn shown_price(&self, markup_enabled: bool) -> Decimal {
        match self.display {
            Some(display) if markup_enabled => display,
            _ => self.actual,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn single_room_keeps_full_price() {
        assert_eq!(price_per_student(dec!(450000), 1).unwrap(), dec!(450000));
    }

    #[test]
    fn shared_room_divides_by_capacity_not_occupancy() {
        assert_eq!(price_per_student(dec!(600000), 2).unwrap(), dec!(300000));
        assert_eq!(price_per_student(dec!(900000), 4).unwrap(), dec!(225000));
    }

    #[test]
    fn division_rounds_to_two_places() {
        assert_eq!(price_per_student(dec!(100000), 3).unwrap(), dec!(33333.33));
        assert_eq!(price_per_student(dec!(200000), 3).unwrap(), dec!(66666.67));
    }

    #[test]
    fn zero_capacity_is_rejected() {
        let err = price_per_student(dec!(1000), 0).unwrap_err();
        assert!(matches!(err, DomainError::ValidationError(_)));
    }

    #[test]
    fn display_price_below_cost_fails_for_every_capacity() {
        for capacity in 1..=6 {
            let actual = price_per_student(dec!(600000), capacity).unwrap();
            let err = display_price_per_student(dec!(599999), capacity, actual).unwrap_err();
            assert!(
                matches!(err, DomainError::DisplayPriceBelowCost { .. }),
                "capacity {} accepted an undercutting display price",
                capacity
            );
        }
    }

    #[test]
    fn display_price_equal_to_cost_is_accepted() {
        let pricing = Pricing::for_room(dec!(600000), 2, Some(dec!(600000))).unwrap();
        assert_eq!(pricing.display, Some(dec!(300000)));
    }

    #[test]
    fn display_share_above_column_precision_is_rejected() {
        // 10^11 over two places is 5 * 10^10 per student
        let err = Pricing::for_room(dec!(600000), 2, Some(dec!(100000000000))).unwrap_err();
        assert!(matches!(err, DomainError::ValidationError(_)));

        let pricing = Pricing::for_room(dec!(600000), 1, Some(dec!(9999999999.99))).unwrap();
        assert_eq!(pricing.display, Some(max_money()));
    }

    #[test]
    fn ratio_is_one_without_markup() {
        assert_eq!(markup_ratio(Some(dec!(400)), dec!(300), false), Decimal::ONE);
        assert_eq!(markup_ratio(None, dec!(300), true), Decimal::ONE);
        assert_eq!(markup_ratio(Some(dec!(400)), Decimal::ZERO, true), Decimal::ONE);
    }

    #[test]
    fn display_conversion_scales_paid_and_balance() {
        let pricing = Pricing::for_room(dec!(600000), 2, Some(dec!(800000))).unwrap();
        assert_eq!(pricing.actual, dec!(300000));
        assert_eq!(pricing.display, Some(dec!(400000)));
        assert_eq!(pricing.to_display(dec!(150000), true), dec!(200000));
        assert_eq!(pricing.to_display(dec!(150000), false), dec!(150000));
        assert_eq!(pricing.shown_price(true), dec!(400000));
        assert_eq!(pricing.shown_price(false), dec!(300000));
    }
}
