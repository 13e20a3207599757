use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::decimal::Money;
use crate::types::{LineId, LineStatus, TransactionId, TransactionStatus};

/// domain events emitted by the return pipeline.
///
/// each event carries enough data for an external audit log to reconstruct
/// the decision without re-running the engine. the engine attaches no
/// delivery guarantee; a message bus or audit writer consumes these.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    /// one per declared line in an accepted return
    LineReturned {
        transaction_id: TransactionId,
        line_id: LineId,
        old_status: LineStatus,
        new_status: LineStatus,
        quantity_good: u32,
        quantity_damaged: u32,
        quantity_beyond_repair: u32,
        quantity_lost: u32,
        quantity_outstanding: u32,
        days_overdue: u32,
        timestamp: DateTime<Utc>,
    },

    /// emitted alongside a line return when an overdue fee was charged
    LateFeeAssessed {
        transaction_id: TransactionId,
        line_id: LineId,
        fee_amount: Money,
        days_overdue: u32,
        returned_quantity: u32,
        timestamp: DateTime<Utc>,
    },

    /// one per accepted return request, closing out the settlement
    TransactionSettled {
        transaction_id: TransactionId,
        old_status: TransactionStatus,
        new_status: TransactionStatus,
        rental_subtotal: Money,
        late_fee_total: Money,
        damage_cost_total: Money,
        cleaning_cost_total: Money,
        deposit_held: Money,
        deposit_refund: Money,
        net_balance: Money,
        timestamp: DateTime<Utc>,
    },
}

/// event store for collecting events during a return
#[derive(Debug, Default)]
pub struct EventStore {
    events: Vec<Event>,
}

impl EventStore {
    pub fn new() -> Self {
        Self {
            events: Vec::new(),
        }
    }

    pub fn emit(&mut self, event: Event) {
        self.events.push(event);
    }

    pub fn take_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}
