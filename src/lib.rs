//! rental return and settlement engine.
//!
//! given a rental transaction snapshot and a proposed set of returned
//! line items, the engine determines the new lifecycle status of the
//! transaction and each line, the quantities still outstanding, the
//! monetary settlement (late fees, damage penalties, cleaning costs,
//! deposit allocation) and whether the return request is valid at all.
//!
//! the engine is pure computation: no i/o, no hidden clock, no mutation
//! of inputs. the caller loads a consistent transaction snapshot, passes
//! an explicit `as_of` instant, and persists the returned statuses and
//! quantities with an optimistic-concurrency check.

pub mod config;
pub mod decimal;
pub mod errors;
pub mod events;
pub mod pricing;
pub mod returns;
pub mod settlement;
pub mod state;
pub mod status;
pub mod types;

// re-export key types
pub use config::SettlementConfig;
pub use decimal::Money;
pub use errors::{RejectedReturn, Result, SettlementError};
pub use events::{Event, EventStore};
pub use returns::{
    DamageDetail, LineOutcome, ReconciledLine, ReturnDeclaration, ReturnProcessor,
    ReturnRequest, ReturnResult,
};
pub use settlement::{SettlementResult, compute_settlement};
pub use state::{RentalLine, RentalTransaction};
pub use types::{
    CustomerId, DamageSeverity, DamageType, LineId, LineStatus, LocationId, PeriodUnit,
    SkuId, TransactionId, TransactionStatus,
};

// re-export external dependencies that users will need
pub use chrono;
pub use hourglass_rs::{SafeTimeProvider, TimeSource};
pub use rust_decimal::Decimal;
pub use uuid::Uuid;
