//! late fee calculation for overdue returns.

use rust_decimal::Decimal;

use crate::decimal::Money;
use crate::state::RentalLine;

/// late fee calculation result for one line
#[derive(Debug, Clone, PartialEq)]
pub struct LateFeeCalculation {
    pub fee_amount: Money,
    pub days_overdue: u32,
    pub returned_quantity: u32,
    pub daily_fee_per_unit: Money,
}

/// fee for the units returned in this call:
/// days overdue x unit rate x multiplier x returned quantity.
///
/// the fee is charged on the quantity actually handed back now; units
/// still outstanding keep accruing and are charged when they come in.
pub fn calculate_late_fee(
    line: &RentalLine,
    returned_quantity: u32,
    days_overdue: u32,
    multiplier: Decimal,
) -> LateFeeCalculation {
    let daily_fee_per_unit = line.unit_rate * multiplier;

    if days_overdue == 0 || returned_quantity == 0 {
        return LateFeeCalculation {
            fee_amount: Money::ZERO,
            days_overdue,
            returned_quantity,
            daily_fee_per_unit,
        };
    }

    let fee_amount = daily_fee_per_unit * days_overdue * Decimal::from(returned_quantity);

    LateFeeCalculation {
        fee_amount,
        days_overdue,
        returned_quantity,
        daily_fee_per_unit,
    }
}
