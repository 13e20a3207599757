use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::decimal::Money;
use crate::errors::{Result, SettlementError};
use crate::types::{
    CustomerId, LineId, LineStatus, LocationId, PeriodUnit, SkuId, TransactionId,
    TransactionStatus,
};

/// one rented sku within a transaction.
///
/// the engine treats this as a read-only snapshot loaded by the caller; it
/// never mutates a line, only computes the next state for the caller to
/// persist. returned quantities are cumulative and only ever grow across
/// accepted returns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RentalLine {
    pub line_id: LineId,
    pub sku_id: SkuId,
    pub quantity_rented: u32,
    pub quantity_returned_good: u32,
    pub quantity_returned_damaged: u32,
    pub quantity_returned_beyond_repair: u32,
    pub quantity_returned_lost: u32,
    /// price per unit per billing period
    pub unit_rate: Money,
    pub rental_period_count: u32,
    pub rental_period_unit: PeriodUnit,
    pub rental_start: DateTime<Utc>,
    pub rental_end: DateTime<Utc>,
    pub deposit_per_unit: Money,
    pub status: LineStatus,
}

impl RentalLine {
    /// create a freshly booked line with nothing returned yet
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        line_id: LineId,
        sku_id: SkuId,
        quantity_rented: u32,
        unit_rate: Money,
        rental_period_count: u32,
        rental_period_unit: PeriodUnit,
        rental_start: DateTime<Utc>,
        rental_end: DateTime<Utc>,
        deposit_per_unit: Money,
    ) -> Self {
        Self {
            line_id,
            sku_id,
            quantity_rented,
            quantity_returned_good: 0,
            quantity_returned_damaged: 0,
            quantity_returned_beyond_repair: 0,
            quantity_returned_lost: 0,
            unit_rate,
            rental_period_count,
            rental_period_unit,
            rental_start,
            rental_end,
            deposit_per_unit,
            status: LineStatus::Reserved,
        }
    }

    /// total units already returned in any condition
    pub fn returned_total(&self) -> u32 {
        self.quantity_returned_good
            + self.quantity_returned_damaged
            + self.quantity_returned_beyond_repair
            + self.quantity_returned_lost
    }

    /// units not yet returned in any condition
    pub fn quantity_outstanding(&self) -> u32 {
        self.quantity_rented.saturating_sub(self.returned_total())
    }

    pub fn is_fully_returned(&self) -> bool {
        self.quantity_outstanding() == 0
    }

    /// deposit held for this line, independent of what has been returned
    pub fn deposit_held(&self) -> Money {
        self.deposit_per_unit * self.quantity_rented
    }

    /// booked rental duration in calendar days
    pub fn rental_duration_days(&self) -> i64 {
        (self.rental_end.date_naive() - self.rental_start.date_naive()).num_days()
    }

    /// static-data preconditions; violations are caller bugs, not bad requests
    pub fn validate(&self) -> Result<()> {
        if self.quantity_rented == 0 {
            return Err(SettlementError::InvalidConfiguration {
                message: format!("line {} has zero rented quantity", self.line_id),
            });
        }
        if self.rental_period_count == 0 {
            return Err(SettlementError::InvalidConfiguration {
                message: format!("line {} has zero period count", self.line_id),
            });
        }
        if self.unit_rate.is_negative() {
            return Err(SettlementError::InvalidConfiguration {
                message: format!("line {} has negative unit rate", self.line_id),
            });
        }
        if self.deposit_per_unit.is_negative() {
            return Err(SettlementError::InvalidConfiguration {
                message: format!("line {} has negative deposit", self.line_id),
            });
        }
        if self.rental_end < self.rental_start {
            return Err(SettlementError::InvalidConfiguration {
                message: format!("line {} ends before it starts", self.line_id),
            });
        }
        if self.returned_total() > self.quantity_rented {
            return Err(SettlementError::InvalidConfiguration {
                message: format!("line {} has more returned than rented", self.line_id),
            });
        }
        Ok(())
    }
}

/// aggregate owning one-to-many rental lines.
///
/// lines have no lifecycle outside their transaction. the engine only
/// advances status forward through the return pipeline; it never creates
/// or deletes entities.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RentalTransaction {
    pub transaction_id: TransactionId,
    pub customer_id: CustomerId,
    pub location_id: LocationId,
    pub status: TransactionStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub lines: Vec<RentalLine>,
}

impl RentalTransaction {
    pub fn new(
        transaction_id: TransactionId,
        customer_id: CustomerId,
        location_id: LocationId,
        created_at: DateTime<Utc>,
        lines: Vec<RentalLine>,
    ) -> Self {
        Self {
            transaction_id,
            customer_id,
            location_id,
            status: TransactionStatus::Reserved,
            created_at,
            updated_at: created_at,
            lines,
        }
    }

    /// look up a line by id
    pub fn line(&self, line_id: LineId) -> Option<&RentalLine> {
        self.lines.iter().find(|l| l.line_id == line_id)
    }

    /// total deposit held across all lines
    pub fn deposit_held(&self) -> Money {
        self.lines.iter().map(|l| l.deposit_held()).sum()
    }

    /// validate static data on every line
    pub fn validate(&self) -> Result<()> {
        for line in &self.lines {
            line.validate()?;
        }
        Ok(())
    }
}
