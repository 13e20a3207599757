use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::decimal::Money;
use crate::errors::{Result, SettlementError};

/// settlement configuration.
///
/// the late-fee multiplier and the replacement-value heuristic vary by
/// tenant and jurisdiction, so both are inputs rather than constants.
/// defaults are explicit here instead of being coerced per-field at the
/// point of use.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettlementConfig {
    /// late fee per overdue day = unit_rate x multiplier, per returned unit
    pub late_fee_multiplier: Decimal,
    /// decimal places of the smallest currency unit; only the final net
    /// balance is rounded, half-up, at this scale
    pub currency_scale: u32,
    /// when set, caps the per-unit write-off charge for beyond-repair and
    /// lost units at unit_rate x multiplier (the "replacement value");
    /// the charge is always capped at the deposit held for those units
    pub replacement_rate_multiplier: Option<Decimal>,
    /// cleaning charge applied to a line when the declaration omits one
    pub default_cleaning_charge: Money,
}

impl SettlementConfig {
    /// standard policy: 1.5x daily-rate late fees, cent-scale currency,
    /// deposit-bounded write-offs, no cleaning charge unless declared
    pub fn standard() -> Self {
        Self {
            late_fee_multiplier: dec!(1.5),
            currency_scale: 2,
            replacement_rate_multiplier: None,
            default_cleaning_charge: Money::ZERO,
        }
    }

    /// policy with a replacement-value cap for written-off units
    pub fn with_replacement_cap(multiplier: Decimal) -> Self {
        Self {
            replacement_rate_multiplier: Some(multiplier),
            ..Self::standard()
        }
    }

    /// check for negative rates and multipliers. a violation is a
    /// misconfigured deployment and aborts processing before any
    /// reconciliation is attempted.
    pub fn validate(&self) -> Result<()> {
        if self.late_fee_multiplier.is_sign_negative() {
            return Err(SettlementError::InvalidConfiguration {
                message: format!("negative late fee multiplier: {}", self.late_fee_multiplier),
            });
        }
        if let Some(m) = self.replacement_rate_multiplier {
            if m.is_sign_negative() {
                return Err(SettlementError::InvalidConfiguration {
                    message: format!("negative replacement multiplier: {}", m),
                });
            }
        }
        if self.default_cleaning_charge.is_negative() {
            return Err(SettlementError::InvalidConfiguration {
                message: format!(
                    "negative default cleaning charge: {}",
                    self.default_cleaning_charge
                ),
            });
        }
        Ok(())
    }
}

impl Default for SettlementConfig {
    fn default() -> Self {
        Self::standard()
    }
}
