use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// unique identifier for a rental transaction
pub type TransactionId = Uuid;

/// unique identifier for a rental line
pub type LineId = Uuid;

/// unique identifier for a customer
pub type CustomerId = Uuid;

/// unique identifier for a location
pub type LocationId = Uuid;

/// unique identifier for a stock-keeping unit
pub type SkuId = Uuid;

/// billing period unit for a rental line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PeriodUnit {
    Day,
    Week,
    Month,
}

impl PeriodUnit {
    /// calendar days per billing period (months billed as 30 days)
    pub fn approx_days(&self) -> i64 {
        match self {
            PeriodUnit::Day => 1,
            PeriodUnit::Week => 7,
            PeriodUnit::Month => 30,
        }
    }
}

/// rental line status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LineStatus {
    /// booked, not yet confirmed
    Reserved,
    /// booking confirmed
    Confirmed,
    /// customer has collected the items
    PickedUp,
    /// rental period running
    Active,
    /// rental period extended past the original end date
    Extended,
    /// some units returned, remainder outstanding and not overdue
    PartialReturn,
    /// no units returned and the line is past due
    Late,
    /// some units returned, remainder outstanding and past due
    LatePartialReturn,
    /// every unit accounted for; terminal
    Returned,
}

impl LineStatus {
    /// terminal states accept no further returns
    pub fn is_terminal(&self) -> bool {
        matches!(self, LineStatus::Returned)
    }

    /// states with units out in the field
    pub fn is_outstanding(&self) -> bool {
        !self.is_terminal()
    }

    /// severity rank used for transaction aggregation; higher wins.
    /// an overdue line must never be reported as merely partial.
    pub fn severity(&self) -> u8 {
        match self {
            LineStatus::LatePartialReturn => 8,
            LineStatus::Late => 7,
            LineStatus::PartialReturn => 6,
            LineStatus::Extended => 5,
            LineStatus::Active => 4,
            LineStatus::PickedUp => 3,
            LineStatus::Confirmed => 2,
            LineStatus::Reserved => 1,
            LineStatus::Returned => 0,
        }
    }
}

/// transaction status, aggregated from line statuses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionStatus {
    Reserved,
    Confirmed,
    PickedUp,
    Active,
    Extended,
    PartialReturn,
    Late,
    LatePartialReturn,
    /// every line returned; terminal
    Completed,
}

impl TransactionStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, TransactionStatus::Completed)
    }
}

/// damage classification for a returned unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DamageType {
    Physical,
    WaterDamage,
    Electrical,
    Cosmetic,
    MissingParts,
    Other,
}

/// damage severity; `BeyondRepair` marks units written off against the deposit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DamageSeverity {
    Minor,
    Moderate,
    Severe,
    BeyondRepair,
}

impl DamageSeverity {
    /// repairable damage carries an estimated repair cost; beyond-repair
    /// units consume the deposit instead
    pub fn is_repairable(&self) -> bool {
        !matches!(self, DamageSeverity::BeyondRepair)
    }
}
