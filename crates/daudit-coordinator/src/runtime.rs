//! Reference ledger runtime with a per-call transaction boundary.
//!
//! Each [`LedgerRuntime::submit`] runs in four steps:
//! 1. Move the attached value from the caller into the treasury account
//! 2. Run the operation against a staging copy of the coordinator
//! 3. Pay out every receipt the operation issued
//! 4. Verify treasury and ledger conservation, then swap the staging copies in
//!
//! Any error in any step drops both staging copies. The caller is never
//! debited for a rejected call and no registry changes on failure.

use daudit_types::{
    Address, Amount, AssetRef, AssignmentRecord, CoordinatorConfig, ItemId, PayoutReceipt,
    Result, SettlementReport, TokenId, amount,
};
use serde::{Deserialize, Serialize};

use crate::asset::{AssetRegistry, InMemoryAssetRegistry};
use crate::coordinator::AuditCoordinator;
use crate::ledger::{CallContext, NativeLedger};

/// Every state-changing operation the runtime accepts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Call {
    CreateAuditItem {
        asset: AssetRef,
        audit_fee: Amount,
        required_auditors: u32,
    },
    InsertAuditEnrollment {
        item_id: ItemId,
        auditors: Vec<Address>,
    },
    UpdateEnrollmentAuditors {
        item_id: ItemId,
        auditors: Vec<Address>,
    },
    AddEnrollmentAuditor {
        item_id: ItemId,
        auditor: Address,
    },
    AssignAuditors {
        item_id: ItemId,
    },
    CreateAuditResult {
        asset_contract: Address,
        item_id: ItemId,
        result_token: TokenId,
        outcome_code: u8,
    },
    PayAuditors {
        item_id: ItemId,
    },
    CancelAuditItem {
        item_id: ItemId,
    },
    UpdateAssignmentAuditors {
        item_id: ItemId,
        auditors: Vec<Address>,
    },
    AddAssignmentAuditor {
        item_id: ItemId,
        auditor: Address,
    },
}

impl Call {
    /// Operation name for log fields.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::CreateAuditItem { .. } => "create_audit_item",
            Self::InsertAuditEnrollment { .. } => "insert_audit_enrollment",
            Self::UpdateEnrollmentAuditors { .. } => "update_enrollment_auditors",
            Self::AddEnrollmentAuditor { .. } => "add_enrollment_auditor",
            Self::AssignAuditors { .. } => "assign_auditors",
            Self::CreateAuditResult { .. } => "create_audit_result",
            Self::PayAuditors { .. } => "pay_auditors",
            Self::CancelAuditItem { .. } => "cancel_audit_item",
            Self::UpdateAssignmentAuditors { .. } => "update_assignment_auditors",
            Self::AddAssignmentAuditor { .. } => "add_assignment_auditor",
        }
    }
}

/// What a committed call produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CallOutcome {
    ItemCreated(ItemId),
    Enrolled { index: usize },
    Updated,
    Assigned(AssignmentRecord),
    ResultRecorded,
    Settled(SettlementReport),
    Cancelled(PayoutReceipt),
}

impl CallOutcome {
    /// Transfers out of the treasury this outcome requires.
    #[must_use]
    pub fn payouts(&self) -> &[PayoutReceipt] {
        match self {
            Self::Settled(report) => &report.payouts,
            Self::Cancelled(receipt) => std::slice::from_ref(receipt),
            _ => &[],
        }
    }
}

/// Serially ordered executor owning the ledger, both asset registries and
/// the coordinator.
#[derive(Debug, Clone)]
pub struct LedgerRuntime {
    ledger: NativeLedger,
    documents: InMemoryAssetRegistry,
    findings: InMemoryAssetRegistry,
    coordinator: AuditCoordinator,
    committed: u64,
}

impl LedgerRuntime {
    /// # Errors
    /// Returns `Configuration` if the config does not validate.
    pub fn new(config: CoordinatorConfig) -> Result<Self> {
        let documents = InMemoryAssetRegistry::new(config.documents_contract);
        let findings = InMemoryAssetRegistry::new(config.findings_contract);
        Ok(Self {
            ledger: NativeLedger::new(),
            documents,
            findings,
            coordinator: AuditCoordinator::new(config)?,
            committed: 0,
        })
    }

    /// Create native value for `account`.
    pub fn fund(&mut self, account: Address, amount: Amount) -> Result<()> {
        self.ledger.deposit(account, amount)
    }

    /// Mint a document token owned by `owner`.
    pub fn mint_document(&mut self, owner: Address, locator: &str) -> Result<AssetRef> {
        let token_id = self.documents.mint(owner, locator)?;
        Ok(AssetRef {
            contract: self.documents.contract(),
            token_id,
        })
    }

    /// Mint a finding token owned by `owner`.
    pub fn mint_finding(&mut self, owner: Address, locator: &str) -> Result<TokenId> {
        self.findings.mint(owner, locator)
    }

    pub fn transfer_document(&mut self, from: Address, to: Address, token: TokenId) -> Result<()> {
        self.documents.transfer(from, to, token)
    }

    /// Execute one call atomically on behalf of `caller`.
    ///
    /// # Errors
    /// Whatever the operation rejects with, plus `InsufficientFunds` if the
    /// caller cannot cover `value` and `TreasuryImbalance` if the committed
    /// state would not balance. State is unchanged on every error.
    pub fn submit(&mut self, caller: Address, value: Amount, call: Call) -> Result<CallOutcome> {
        let ctx = CallContext::new(caller, value);
        let op = call.name();
        match self.execute(&ctx, call) {
            Ok((coordinator, ledger, outcome)) => {
                self.coordinator = coordinator;
                self.ledger = ledger;
                self.committed += 1;
                tracing::debug!(op, %caller, %value, seq = self.committed, "Call committed");
                Ok(outcome)
            }
            Err(e) => {
                tracing::debug!(op, %caller, %value, error = %e, "Call reverted");
                Err(e)
            }
        }
    }

    /// [`Self::submit`] with the caller derived from an ed25519 key.
    pub fn submit_signed(
        &mut self,
        key: &ed25519_dalek::VerifyingKey,
        value: Amount,
        call: Call,
    ) -> Result<CallOutcome> {
        self.submit(Address::from_verifying_key(key), value, call)
    }

    fn execute(
        &self,
        ctx: &CallContext,
        call: Call,
    ) -> Result<(AuditCoordinator, NativeLedger, CallOutcome)> {
        amount::ensure_whole_units(ctx.value)?;
        let treasury = self.coordinator.config().treasury_account;

        let mut ledger = self.ledger.clone();
        ledger.transfer(ctx.caller, treasury, ctx.value)?;

        let mut staged = self.coordinator.clone();
        let outcome = self.dispatch(&mut staged, ctx, call)?;

        for payout in outcome.payouts() {
            ledger.transfer(treasury, payout.recipient, payout.amount)?;
        }
        staged.verify_treasury(ledger.balance(treasury))?;
        ledger.verify_supply()?;
        Ok((staged, ledger, outcome))
    }

    fn dispatch(
        &self,
        coordinator: &mut AuditCoordinator,
        ctx: &CallContext,
        call: Call,
    ) -> Result<CallOutcome> {
        let outcome = match call {
            Call::CreateAuditItem {
                asset,
                audit_fee,
                required_auditors,
            } => CallOutcome::ItemCreated(coordinator.create_audit_item(
                ctx,
                &self.documents,
                asset,
                audit_fee,
                required_auditors,
            )?),
            Call::InsertAuditEnrollment { item_id, auditors } => CallOutcome::Enrolled {
                index: coordinator.insert_audit_enrollment(ctx, item_id, auditors)?,
            },
            Call::UpdateEnrollmentAuditors { item_id, auditors } => {
                coordinator.update_enrollment_auditors(ctx, item_id, auditors)?;
                CallOutcome::Updated
            }
            Call::AddEnrollmentAuditor { item_id, auditor } => CallOutcome::Enrolled {
                index: coordinator.add_enrollment_auditor(ctx, item_id, auditor)?,
            },
            Call::AssignAuditors { item_id } => {
                CallOutcome::Assigned(coordinator.assign_auditors(ctx, item_id)?)
            }
            Call::CreateAuditResult {
                asset_contract,
                item_id,
                result_token,
                outcome_code,
            } => {
                coordinator.create_audit_result(
                    ctx,
                    &self.findings,
                    asset_contract,
                    item_id,
                    result_token,
                    outcome_code,
                )?;
                CallOutcome::ResultRecorded
            }
            Call::PayAuditors { item_id } => {
                CallOutcome::Settled(coordinator.pay_auditors(ctx, item_id)?)
            }
            Call::CancelAuditItem { item_id } => {
                CallOutcome::Cancelled(coordinator.cancel_audit_item(ctx, item_id)?)
            }
            Call::UpdateAssignmentAuditors { item_id, auditors } => {
                coordinator.update_assignment_auditors(ctx, item_id, auditors)?;
                CallOutcome::Updated
            }
            Call::AddAssignmentAuditor { item_id, auditor } => {
                coordinator.add_assignment_auditor(ctx, item_id, auditor)?;
                CallOutcome::Updated
            }
        };
        Ok(outcome)
    }

    #[must_use]
    pub fn coordinator(&self) -> &AuditCoordinator {
        &self.coordinator
    }

    #[must_use]
    pub fn ledger(&self) -> &NativeLedger {
        &self.ledger
    }

    #[must_use]
    pub fn documents(&self) -> &InMemoryAssetRegistry {
        &self.documents
    }

    #[must_use]
    pub fn findings(&self) -> &InMemoryAssetRegistry {
        &self.findings
    }

    #[must_use]
    pub fn balance(&self, account: Address) -> Amount {
        self.ledger.balance(account)
    }

    /// Number of calls committed so far.
    #[must_use]
    pub fn committed_calls(&self) -> u64 {
        self.committed
    }
}
