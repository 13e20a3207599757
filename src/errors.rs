use thiserror::Error;

use crate::types::LineId;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SettlementError {
    #[error("line not found on transaction: {line_id}")]
    LineNotFound {
        line_id: LineId,
    },

    #[error("empty return: line {line_id} declares zero units")]
    EmptyReturn {
        line_id: LineId,
    },

    #[error("over-return on line {line_id}: declared {declared}, maximum acceptable {max_acceptable}")]
    OverReturn {
        line_id: LineId,
        declared: u32,
        max_acceptable: u32,
    },

    #[error("damage detail mismatch on line {line_id}: declared {declared} damaged unit(s), details cover {covered}")]
    DamageDetailMismatch {
        line_id: LineId,
        declared: u32,
        covered: u32,
    },

    #[error("invalid damage detail on line {line_id}: {message}")]
    InvalidDamageDetail {
        line_id: LineId,
        message: String,
    },

    #[error("duplicate declaration for line {line_id}")]
    DuplicateDeclaration {
        line_id: LineId,
    },

    #[error("invalid configuration: {message}")]
    InvalidConfiguration {
        message: String,
    },
}

impl SettlementError {
    /// fatal errors indicate misconfigured static data, not a bad request
    pub fn is_fatal(&self) -> bool {
        matches!(self, SettlementError::InvalidConfiguration { .. })
    }
}

/// a rejected return request, carrying every validation error found.
///
/// all per-line errors are collected before rejecting so the caller can
/// present a complete correction list in one round trip. any single error
/// rejects the entire request; no partial state is ever derived.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("return request rejected: {} validation error(s)", .errors.len())]
pub struct RejectedReturn {
    pub errors: Vec<SettlementError>,
}

impl RejectedReturn {
    pub fn new(errors: Vec<SettlementError>) -> Self {
        Self { errors }
    }

    pub fn fatal(error: SettlementError) -> Self {
        Self {
            errors: vec![error],
        }
    }

    /// true when the rejection stems from misconfiguration rather than
    /// request content
    pub fn is_fatal(&self) -> bool {
        self.errors.iter().any(|e| e.is_fatal())
    }
}

pub type Result<T> = std::result::Result<T, SettlementError>;
