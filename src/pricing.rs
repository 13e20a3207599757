//! rate and period calculators.
//!
//! pure functions over a line snapshot and an explicit `as_of` instant;
//! no wall clock is ever read here, so results are reproducible for any
//! historical or simulated time.

use chrono::{DateTime, Utc};

use crate::decimal::Money;
use crate::state::RentalLine;

/// rental charge for the whole line: unit rate x rented quantity x
/// billed periods. owed regardless of the condition units come back in.
pub fn line_subtotal(line: &RentalLine) -> Money {
    line.unit_rate * line.quantity_rented * line.rental_period_count
}

/// whole days the line is overdue at `as_of`.
///
/// calendar-date arithmetic: a return at any time on the due date itself
/// is not overdue; any time on a later date is overdue by at least one
/// day.
pub fn days_overdue(line: &RentalLine, as_of: DateTime<Utc>) -> u32 {
    let days = (as_of.date_naive() - line.rental_end.date_naive()).num_days();
    days.max(0) as u32
}

/// booked duration of the line in billing-period days
pub fn billed_duration_days(line: &RentalLine) -> i64 {
    line.rental_period_unit.approx_days() * line.rental_period_count as i64
}
