//! return request handling: declaration types, per-line reconciliation
//! and the orchestrator that drives the whole pipeline.

pub mod processor;
pub mod reconcile;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::decimal::Money;
use crate::types::{DamageSeverity, DamageType, LineId};

pub use processor::{LineOutcome, ReturnProcessor, ReturnResult};
pub use reconcile::reconcile;

/// an inspection finding for damaged units on one line.
///
/// multiple details may apply to one declaration; their quantities must
/// cover the declared damaged and beyond-repair counts exactly, and their
/// costs sum.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DamageDetail {
    pub damage_type: DamageType,
    pub severity: DamageSeverity,
    pub quantity: u32,
    /// estimated cost to repair one unit; ignored for beyond-repair units,
    /// which are written off against the deposit instead
    pub estimated_repair_cost: Money,
    pub description: String,
}

/// per-line return declaration inside a request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReturnDeclaration {
    pub line_id: LineId,
    pub quantity_good: u32,
    pub quantity_damaged: u32,
    pub quantity_beyond_repair: u32,
    pub quantity_lost: u32,
    pub damage_details: Vec<DamageDetail>,
    /// charge for cleaning the returned units; None falls back to the
    /// configured default
    pub cleaning_charge: Option<Money>,
    pub condition_notes: Option<String>,
    pub inspected_at: Option<DateTime<Utc>>,
}

impl ReturnDeclaration {
    /// declaration for units all coming back in good condition
    pub fn good(line_id: LineId, quantity: u32) -> Self {
        Self {
            line_id,
            quantity_good: quantity,
            quantity_damaged: 0,
            quantity_beyond_repair: 0,
            quantity_lost: 0,
            damage_details: Vec::new(),
            cleaning_charge: None,
            condition_notes: None,
            inspected_at: None,
        }
    }

    /// total units declared in this call, in any condition
    pub fn declared_total(&self) -> u32 {
        self.quantity_good
            + self.quantity_damaged
            + self.quantity_beyond_repair
            + self.quantity_lost
    }
}

/// a proposed return: one declaration per line. ephemeral input, built
/// once by the caller and never mutated by the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReturnRequest {
    pub declarations: Vec<ReturnDeclaration>,
}

impl ReturnRequest {
    pub fn new(declarations: Vec<ReturnDeclaration>) -> Self {
        Self { declarations }
    }
}

/// a validated, normalized line return produced by reconciliation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReconciledLine {
    pub line_id: LineId,
    pub quantity_good: u32,
    pub quantity_damaged: u32,
    pub quantity_beyond_repair: u32,
    pub quantity_lost: u32,
    /// units already returned before this call
    pub previously_returned: u32,
    /// units accepted in this call
    pub returned_this_call: u32,
    /// units still out after this call
    pub quantity_outstanding: u32,
    pub damage_details: Vec<DamageDetail>,
    pub cleaning_charge: Money,
}

impl ReconciledLine {
    /// units written off against the deposit in this call
    pub fn write_off_quantity(&self) -> u32 {
        self.quantity_beyond_repair + self.quantity_lost
    }
}
