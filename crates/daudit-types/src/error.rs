//! Error types for the DAudit escrow engine.
//!
//! All errors use the `DA_ERR_` prefix convention for easy grepping in logs.
//! Error codes are grouped by category:
//! - 1xx: Validation errors (malformed arguments, rejected before any state change)
//! - 2xx: Precondition errors (state does not admit the operation)
//! - 3xx: Payment errors (attached value is wrong)
//! - 4xx: Authorization errors (caller is not entitled)
//! - 9xx: General / internal errors

use rust_decimal::Decimal;
use thiserror::Error;

use crate::{Address, AuditItemStatus, ItemId, TokenId};

/// Coarse classification of a [`DauditError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Validation,
    Precondition,
    Payment,
    Authorization,
    Internal,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation => write!(f, "VALIDATION"),
            Self::Precondition => write!(f, "PRECONDITION"),
            Self::Payment => write!(f, "PAYMENT"),
            Self::Authorization => write!(f, "AUTHORIZATION"),
            Self::Internal => write!(f, "INTERNAL"),
        }
    }
}

/// Central error enum for all DAudit operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DauditError {
    // =================================================================
    // Validation Errors (1xx)
    // =================================================================
    /// Required auditor count is zero or above the configured maximum.
    #[error("DA_ERR_100: Invalid auditor count {count}: must be between 1 and {max}")]
    InvalidAuditorCount { count: u32, max: u32 },

    /// An address appears twice in an auditor list, or is already enrolled.
    #[error("DA_ERR_101: Duplicate auditor {0}")]
    DuplicateAuditor(Address),

    /// An auditor list was empty.
    #[error("DA_ERR_102: Auditor list is empty")]
    EmptyAuditorList,

    /// The zero address (or another unusable address) was supplied.
    #[error("DA_ERR_103: Invalid address: {reason}")]
    InvalidAddress { reason: String },

    /// An amount was negative or fractional.
    #[error("DA_ERR_104: Invalid amount {amount}: {reason}")]
    InvalidAmount { amount: Decimal, reason: String },

    /// Outcome code outside the known set.
    #[error("DA_ERR_105: Invalid outcome code {0}")]
    InvalidOutcomeCode(u8),

    /// The asset contract is not the registry configured for this role.
    #[error("DA_ERR_106: Unknown asset contract {0}")]
    UnknownAssetContract(Address),

    /// Candidate list exceeds the per-record limit.
    #[error("DA_ERR_107: Too many auditors: {count} exceeds limit {max}")]
    TooManyAuditors { count: usize, max: usize },

    // =================================================================
    // Precondition Errors (2xx)
    // =================================================================
    /// No record exists for the item.
    #[error("DA_ERR_200: {entity} not found for {item}")]
    NotFound { entity: &'static str, item: ItemId },

    /// An audit item already exists for this document token.
    #[error("DA_ERR_201: Audit item already listed: {0}")]
    ItemAlreadyListed(ItemId),

    /// An enrollment record already exists for this item.
    #[error("DA_ERR_202: Enrollment already exists for {0}")]
    EnrollmentExists(ItemId),

    /// An assignment already exists (or the enrollment is frozen by one).
    #[error("DA_ERR_203: Auditors already assigned for {0}")]
    AlreadyAssigned(ItemId),

    /// Fewer candidates enrolled than the item requires.
    #[error("DA_ERR_204: Insufficient enrollment for {item}: need {required}, have {enrolled}")]
    InsufficientEnrollment {
        item: ItemId,
        required: u32,
        enrolled: usize,
    },

    /// The caller is not one of the item's assigned auditors.
    #[error("DA_ERR_205: {auditor} is not assigned to {item}")]
    NotAssigned { item: ItemId, auditor: Address },

    /// The address is not an enrolled candidate for the item.
    #[error("DA_ERR_206: {auditor} is not enrolled for {item}")]
    NotEnrolled { item: ItemId, auditor: Address },

    /// The auditor already submitted a result for this item.
    #[error("DA_ERR_207: {auditor} already submitted a result for {item}")]
    DuplicateSubmission { item: ItemId, auditor: Address },

    /// The result token is already linked to another (item, auditor) pair.
    #[error("DA_ERR_208: Result token {0} is already linked to a submission")]
    ResultTokenReused(TokenId),

    /// The item is in the wrong lifecycle state for this operation.
    #[error("DA_ERR_209: Wrong status for {item}: expected {expected}, got {actual}")]
    WrongStatus {
        item: ItemId,
        expected: &'static str,
        actual: AuditItemStatus,
    },

    /// A fee share has already been paid out for this item.
    #[error("DA_ERR_210: Payment already issued for {0}")]
    PaymentAlreadyIssued(ItemId),

    /// The asset registry has no such token.
    #[error("DA_ERR_211: Token {token} not found in registry {contract}")]
    TokenNotFound { contract: Address, token: TokenId },

    // =================================================================
    // Payment Errors (3xx)
    // =================================================================
    /// Attached value is below the required amount.
    #[error("DA_ERR_300: Insufficient payment: need {needed}, got {paid}")]
    InsufficientPayment { needed: Decimal, paid: Decimal },

    /// Attached value is above the required amount.
    #[error("DA_ERR_301: Payment mismatch: need exactly {needed}, got {paid}")]
    PaymentMismatch { needed: Decimal, paid: Decimal },

    /// A fee-free operation was called with attached value.
    #[error("DA_ERR_302: Unexpected payment of {0} on a fee-free operation")]
    UnexpectedPayment(Decimal),

    /// The caller's ledger balance cannot cover the attached value.
    #[error("DA_ERR_303: Insufficient funds for {account}: need {needed}, have {available}")]
    InsufficientFunds {
        account: Address,
        needed: Decimal,
        available: Decimal,
    },

    // =================================================================
    // Authorization Errors (4xx)
    // =================================================================
    /// Caller lacks the administrator role.
    #[error("DA_ERR_400: Unauthorized caller {caller}: {reason}")]
    Unauthorized { caller: Address, reason: String },

    /// Caller does not own the referenced token.
    #[error("DA_ERR_401: {caller} does not own token {token}")]
    NotTokenOwner { caller: Address, token: TokenId },

    // =================================================================
    // General / Internal (9xx)
    // =================================================================
    /// Treasury conservation invariant violated. Critical safety alert.
    #[error("DA_ERR_900: Treasury imbalance: {reason}")]
    TreasuryImbalance { reason: String },

    /// Configuration error (invalid values, missing fields, etc.).
    #[error("DA_ERR_901: Configuration error: {0}")]
    Configuration(String),

    /// Serialization / deserialization error.
    #[error("DA_ERR_902: Serialization error: {0}")]
    Serialization(String),

    /// Unrecoverable internal error.
    #[error("DA_ERR_903: Internal error: {0}")]
    Internal(String),
}

impl DauditError {
    /// Category of this error.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidAuditorCount { .. }
            | Self::DuplicateAuditor(_)
            | Self::EmptyAuditorList
            | Self::InvalidAddress { .. }
            | Self::InvalidAmount { .. }
            | Self::InvalidOutcomeCode(_)
            | Self::UnknownAssetContract(_)
            | Self::TooManyAuditors { .. } => ErrorKind::Validation,

            Self::NotFound { .. }
            | Self::ItemAlreadyListed(_)
            | Self::EnrollmentExists(_)
            | Self::AlreadyAssigned(_)
            | Self::InsufficientEnrollment { .. }
            | Self::NotAssigned { .. }
            | Self::NotEnrolled { .. }
            | Self::DuplicateSubmission { .. }
            | Self::ResultTokenReused(_)
            | Self::WrongStatus { .. }
            | Self::PaymentAlreadyIssued(_)
            | Self::TokenNotFound { .. } => ErrorKind::Precondition,

            Self::InsufficientPayment { .. }
            | Self::PaymentMismatch { .. }
            | Self::UnexpectedPayment(_)
            | Self::InsufficientFunds { .. } => ErrorKind::Payment,

            Self::Unauthorized { .. } | Self::NotTokenOwner { .. } => ErrorKind::Authorization,

            Self::TreasuryImbalance { .. }
            | Self::Configuration(_)
            | Self::Serialization(_)
            | Self::Internal(_) => ErrorKind::Internal,
        }
    }
}

/// Crate-wide `Result` alias.
pub type Result<T> = std::result::Result<T, DauditError>;

impl From<serde_json::Error> for DauditError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_contains_prefix() {
        let err = DauditError::NotFound {
            entity: "audit item",
            item: ItemId(7),
        };
        let msg = format!("{err}");
        assert!(msg.starts_with("DA_ERR_200"), "Got: {msg}");
        assert!(msg.contains("item:7"));
    }

    #[test]
    fn insufficient_payment_display() {
        let err = DauditError::InsufficientPayment {
            needed: Decimal::new(125, 0),
            paid: Decimal::new(124, 0),
        };
        let msg = format!("{err}");
        assert!(msg.contains("DA_ERR_300"));
        assert!(msg.contains("125"));
        assert!(msg.contains("124"));
    }

    #[test]
    fn wrong_status_display() {
        let err = DauditError::WrongStatus {
            item: ItemId(3),
            expected: "PENDING",
            actual: AuditItemStatus::InProgress,
        };
        let msg = format!("{err}");
        assert!(msg.contains("DA_ERR_209"));
        assert!(msg.contains("PENDING"));
        assert!(msg.contains("IN_PROGRESS"));
    }

    #[test]
    fn kinds_follow_code_groups() {
        let cases = [
            (DauditError::EmptyAuditorList, ErrorKind::Validation),
            (DauditError::AlreadyAssigned(ItemId(1)), ErrorKind::Precondition),
            (
                DauditError::UnexpectedPayment(Decimal::ONE),
                ErrorKind::Payment,
            ),
            (
                DauditError::Unauthorized {
                    caller: Address::ZERO,
                    reason: "test".into(),
                },
                ErrorKind::Authorization,
            ),
            (DauditError::Internal("x".into()), ErrorKind::Internal),
        ];
        for (err, kind) in cases {
            assert_eq!(err.kind(), kind, "{err}");
        }
    }

    #[test]
    fn all_errors_have_da_err_prefix() {
        let errors: Vec<Box<dyn std::error::Error>> = vec![
            Box::new(DauditError::EmptyAuditorList),
            Box::new(DauditError::ResultTokenReused(TokenId(9))),
            Box::new(DauditError::PaymentAlreadyIssued(ItemId(1))),
            Box::new(DauditError::Configuration("bad".into())),
            Box::new(DauditError::TreasuryImbalance {
                reason: "a != b".into(),
            }),
        ];
        for err in errors {
            let msg = format!("{err}");
            assert!(
                msg.starts_with("DA_ERR_"),
                "Error missing DA_ERR_ prefix: {msg}"
            );
        }
    }

    #[test]
    fn serde_json_errors_convert() {
        let err: DauditError = serde_json::from_str::<u64>("not json").unwrap_err().into();
        assert!(matches!(err, DauditError::Serialization(_)));
    }
}
