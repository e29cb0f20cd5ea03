//! Configuration for a DAudit coordinator instance.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{Address, Amount, DauditError, Result, amount, constants};

/// How individual auditor verdicts fold into the item's final status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomePolicy {
    /// Passed iff at least one result was submitted and none reported Failed.
    #[default]
    NoFailures,
    /// Passed iff passing votes strictly outnumber failing votes.
    Majority,
    /// Passed iff every assigned auditor submitted Passed.
    Unanimous,
}

impl std::fmt::Display for OutcomePolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoFailures => write!(f, "NO_FAILURES"),
            Self::Majority => write!(f, "MAJORITY"),
            Self::Unanimous => write!(f, "UNANIMOUS"),
        }
    }
}

/// Configuration for a single coordinator deployment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoordinatorConfig {
    /// Treasury controller. The only caller allowed to settle or cancel.
    pub administrator: Address,
    /// The coordinator's own account on the ledger (escrow custody).
    pub treasury_account: Address,
    /// Platform charge retained on every listing.
    pub listing_fee: Amount,
    /// Asset registry holding source documents.
    pub documents_contract: Address,
    /// Asset registry holding audit findings.
    pub findings_contract: Address,
    #[serde(default)]
    pub outcome_policy: OutcomePolicy,
    #[serde(default = "default_max_auditors")]
    pub max_auditors_per_item: u32,
}

fn default_max_auditors() -> u32 {
    constants::MAX_AUDITORS_PER_ITEM
}

impl CoordinatorConfig {
    /// Config with default fees and limits for the given participants.
    #[must_use]
    pub fn new(
        administrator: Address,
        treasury_account: Address,
        documents_contract: Address,
        findings_contract: Address,
    ) -> Self {
        Self {
            administrator,
            treasury_account,
            listing_fee: Decimal::new(constants::DEFAULT_LISTING_FEE, 0),
            documents_contract,
            findings_contract,
            outcome_policy: OutcomePolicy::default(),
            max_auditors_per_item: constants::MAX_AUDITORS_PER_ITEM,
        }
    }

    #[must_use]
    pub fn with_listing_fee(mut self, listing_fee: Amount) -> Self {
        self.listing_fee = listing_fee;
        self
    }

    #[must_use]
    pub fn with_outcome_policy(mut self, policy: OutcomePolicy) -> Self {
        self.outcome_policy = policy;
        self
    }

    /// Check internal consistency.
    ///
    /// # Errors
    /// Returns `Configuration` describing the first problem found.
    pub fn validate(&self) -> Result<()> {
        let named = [
            ("administrator", self.administrator),
            ("treasury_account", self.treasury_account),
            ("documents_contract", self.documents_contract),
            ("findings_contract", self.findings_contract),
        ];
        for (name, addr) in named {
            if addr.is_zero() {
                return Err(DauditError::Configuration(format!(
                    "{name} must not be the zero address"
                )));
            }
        }
        if self.documents_contract == self.findings_contract {
            return Err(DauditError::Configuration(
                "documents and findings registries must be distinct".to_string(),
            ));
        }
        if self.treasury_account == self.administrator {
            return Err(DauditError::Configuration(
                "treasury account must differ from the administrator".to_string(),
            ));
        }
        amount::ensure_whole_units(self.listing_fee)
            .map_err(|e| DauditError::Configuration(format!("listing_fee: {e}")))?;
        if self.max_auditors_per_item == 0 {
            return Err(DauditError::Configuration(
                "max_auditors_per_item must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Parse and validate a JSON config.
    ///
    /// # Errors
    /// `Serialization` for malformed JSON, `Configuration` for invalid values.
    pub fn from_json(raw: &str) -> Result<Self> {
        let cfg: Self = serde_json::from_str(raw)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Render as pretty JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg() -> CoordinatorConfig {
        CoordinatorConfig::new(
            Address::repeat_byte(0xad),
            Address::repeat_byte(0xee),
            Address::repeat_byte(0xd0),
            Address::repeat_byte(0xf1),
        )
    }

    #[test]
    fn defaults() {
        let cfg = cfg();
        assert_eq!(cfg.listing_fee, Decimal::new(25_000_000_000_000_000, 0));
        assert_eq!(cfg.outcome_policy, OutcomePolicy::NoFailures);
        assert_eq!(cfg.max_auditors_per_item, 64);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn rejects_zero_administrator() {
        let mut cfg = cfg();
        cfg.administrator = Address::ZERO;
        let err = cfg.validate().unwrap_err();
        assert!(matches!(err, DauditError::Configuration(ref m) if m.contains("administrator")));
    }

    #[test]
    fn rejects_shared_registry() {
        let mut cfg = cfg();
        cfg.findings_contract = cfg.documents_contract;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn rejects_fractional_listing_fee() {
        let cfg = cfg().with_listing_fee(Decimal::new(5, 1));
        assert!(matches!(
            cfg.validate(),
            Err(DauditError::Configuration(_))
        ));
    }

    #[test]
    fn json_roundtrip() {
        let cfg = cfg().with_outcome_policy(OutcomePolicy::Majority);
        let json = cfg.to_json().unwrap();
        assert!(json.contains("\"majority\""));
        let back = CoordinatorConfig::from_json(&json).unwrap();
        assert_eq!(cfg, back);
    }

    #[test]
    fn json_optional_fields_default() {
        let raw = format!(
            r#"{{
                "administrator": {admin},
                "treasury_account": {treasury},
                "listing_fee": "10",
                "documents_contract": {docs},
                "findings_contract": {findings}
            }}"#,
            admin = serde_json::to_string(&Address::repeat_byte(1)).unwrap(),
            treasury = serde_json::to_string(&Address::repeat_byte(2)).unwrap(),
            docs = serde_json::to_string(&Address::repeat_byte(3)).unwrap(),
            findings = serde_json::to_string(&Address::repeat_byte(4)).unwrap(),
        );
        let cfg = CoordinatorConfig::from_json(&raw).unwrap();
        assert_eq!(cfg.listing_fee, Decimal::new(10, 0));
        assert_eq!(cfg.outcome_policy, OutcomePolicy::NoFailures);
        assert_eq!(cfg.max_auditors_per_item, constants::MAX_AUDITORS_PER_ITEM);
    }

    #[test]
    fn malformed_json_is_serialization_error() {
        let err = CoordinatorConfig::from_json("{").unwrap_err();
        assert!(matches!(err, DauditError::Serialization(_)));
    }
}
