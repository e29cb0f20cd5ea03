//! The audit coordinator state machine.
//!
//! Owns the audit items, both registries, the fee treasury and the payout
//! log. Every operation validates all of its preconditions before it
//! touches state, so a rejected call leaves the coordinator unchanged.
//! The value attached to a call is checked here but moved by the caller's
//! runtime (see [`crate::runtime`]), which also provides the commit
//! boundary.

use std::collections::HashMap;

use daudit_registry::{AssignmentRegistry, EnrollmentRegistry, validate_roster};
use daudit_selection::{aggregate_outcome, plan_assignment};
use daudit_types::{
    Address, Amount, AssetRef, AssignmentRecord, AuditItem, AuditItemStatus, AuditOutcome,
    AuditResult, CoordinatorConfig, DauditError, EnrollmentRecord, ItemId, PayoutKind,
    PayoutReceipt, Result, SettlementReport, TokenId, amount,
};
use rust_decimal::Decimal;

use crate::asset::{AssetRegistry, ensure_token_owner};
use crate::ledger::CallContext;
use crate::treasury::{FeeTreasury, TreasurySnapshot};

/// Escrow and lifecycle engine for audit items.
#[derive(Debug, Clone)]
pub struct AuditCoordinator {
    config: CoordinatorConfig,
    /// Items in creation order. Never removed.
    items: Vec<AuditItem>,
    by_item: HashMap<ItemId, usize>,
    enrollments: EnrollmentRegistry,
    assignments: AssignmentRegistry,
    treasury: FeeTreasury,
    /// Append-only log of every payout ever issued.
    receipts: Vec<PayoutReceipt>,
}

impl AuditCoordinator {
    /// Coordinator with empty registries.
    ///
    /// # Errors
    /// Returns `Configuration` if the config does not validate.
    pub fn new(config: CoordinatorConfig) -> Result<Self> {
        Self::with_registries(config, EnrollmentRegistry::new(), AssignmentRegistry::new())
    }

    /// Coordinator over existing registries.
    ///
    /// # Errors
    /// Returns `Configuration` if the config does not validate.
    pub fn with_registries(
        config: CoordinatorConfig,
        enrollments: EnrollmentRegistry,
        assignments: AssignmentRegistry,
    ) -> Result<Self> {
        config.validate()?;
        tracing::info!(
            administrator = %config.administrator,
            listing_fee = %config.listing_fee,
            policy = %config.outcome_policy,
            "Audit coordinator initialized"
        );
        Ok(Self {
            config,
            items: Vec::new(),
            by_item: HashMap::new(),
            enrollments,
            assignments,
            treasury: FeeTreasury::new(),
            receipts: Vec::new(),
        })
    }

    // =================================================================
    // Listing
    // =================================================================

    /// List a document for audit.
    ///
    /// The attached value must be exactly `listing_fee + audit_fee`. The
    /// listing fee is retained and the audit fee escrowed against the item.
    ///
    /// # Errors
    /// - `InvalidAmount` for a negative or fractional audit fee
    /// - `InvalidAuditorCount` outside `1..=max_auditors_per_item`
    /// - `UnknownAssetContract` if `asset.contract` is not the documents registry
    /// - `TokenNotFound` / `NotTokenOwner` if the caller does not hold the token
    /// - `ItemAlreadyListed` if the token was listed before
    /// - `InsufficientPayment` / `PaymentMismatch` if the value is wrong
    pub fn create_audit_item(
        &mut self,
        ctx: &CallContext,
        documents: &dyn AssetRegistry,
        asset: AssetRef,
        audit_fee: Amount,
        required_auditors: u32,
    ) -> Result<ItemId> {
        amount::ensure_whole_units(audit_fee)?;
        let max = self.config.max_auditors_per_item;
        if required_auditors == 0 || required_auditors > max {
            return Err(DauditError::InvalidAuditorCount {
                count: required_auditors,
                max,
            });
        }
        if asset.contract != self.config.documents_contract
            || documents.contract() != self.config.documents_contract
        {
            return Err(DauditError::UnknownAssetContract(asset.contract));
        }
        ensure_token_owner(documents, ctx.caller, asset.token_id)?;

        let item_id = ItemId::from(asset.token_id);
        if self.by_item.contains_key(&item_id) {
            return Err(DauditError::ItemAlreadyListed(item_id));
        }
        let listing_fee = self.config.listing_fee;
        ensure_exact_payment(amount::checked_total(listing_fee, audit_fee)?, ctx.value)?;
        self.treasury.record_listing(item_id, listing_fee, audit_fee)?;

        let index = self.items.len();
        self.items.push(AuditItem {
            id: item_id,
            producer: ctx.caller,
            owner: ctx.caller,
            asset,
            audit_fee,
            required_auditors,
            status: AuditItemStatus::Pending,
            sequence: index as u64,
            created_at: chrono::Utc::now(),
            closed_at: None,
        });
        self.by_item.insert(item_id, index);

        tracing::info!(
            item = %item_id,
            producer = %ctx.caller,
            %audit_fee,
            %listing_fee,
            required = required_auditors,
            "Audit item listed"
        );
        Ok(item_id)
    }

    // =================================================================
    // Enrollment (permissionless)
    // =================================================================

    /// # Errors
    /// `UnexpectedPayment`, `NotFound` for an unknown item, and the
    /// registry's own validation errors.
    pub fn insert_audit_enrollment(
        &mut self,
        ctx: &CallContext,
        item_id: ItemId,
        auditors: Vec<Address>,
    ) -> Result<usize> {
        ensure_no_payment(ctx)?;
        self.item(item_id)?;
        self.enrollments.insert_audit_enrollment(item_id, auditors)
    }

    /// # Errors
    /// `UnexpectedPayment`, `NotFound`, `AlreadyAssigned` once locked, and
    /// roster validation errors.
    pub fn update_enrollment_auditors(
        &mut self,
        ctx: &CallContext,
        item_id: ItemId,
        auditors: Vec<Address>,
    ) -> Result<()> {
        ensure_no_payment(ctx)?;
        self.item(item_id)?;
        self.enrollments.update_auditors(item_id, auditors)
    }

    /// # Errors
    /// `UnexpectedPayment`, `NotFound`, `AlreadyAssigned` once locked,
    /// `DuplicateAuditor`.
    pub fn add_enrollment_auditor(
        &mut self,
        ctx: &CallContext,
        item_id: ItemId,
        auditor: Address,
    ) -> Result<usize> {
        ensure_no_payment(ctx)?;
        self.item(item_id)?;
        self.enrollments.add_auditor(item_id, auditor)
    }

    // =================================================================
    // Assignment
    // =================================================================

    /// Select the first `required_auditors` enrolled candidates, record
    /// their shares and move the item to `IN_PROGRESS`. Anyone may call.
    ///
    /// # Errors
    /// - `UnexpectedPayment` if value is attached
    /// - `NotFound` for an unknown item
    /// - `AlreadyAssigned` if an assignment exists
    /// - `WrongStatus` if the item is not `PENDING`
    /// - `InsufficientEnrollment` if too few candidates (or none) enrolled
    pub fn assign_auditors(
        &mut self,
        ctx: &CallContext,
        item_id: ItemId,
    ) -> Result<AssignmentRecord> {
        ensure_no_payment(ctx)?;
        let idx = self.item_position(item_id)?;
        if self.assignments.is_audit_assigned(item_id) {
            tracing::warn!(item = %item_id, caller = %ctx.caller, "Repeated assignment rejected");
            return Err(DauditError::AlreadyAssigned(item_id));
        }
        let item = &self.items[idx];
        item.ensure_status(AuditItemStatus::Pending, "PENDING")?;

        let enrollment = self
            .enrollments
            .get(item_id)
            .ok_or(DauditError::InsufficientEnrollment {
                item: item_id,
                required: item.required_auditors,
                enrolled: 0,
            })?;
        let plan = plan_assignment(item, enrollment)?;

        self.assignments.insert_audit_assignment(
            item_id,
            plan.auditors.clone(),
            plan.fee_share,
            plan.selection_root,
        )?;
        self.enrollments.lock(item_id);
        self.items[idx].transition(AuditItemStatus::InProgress)?;

        let record = self.assignments.get_audit_assignment(item_id)?;
        tracing::info!(
            item = %item_id,
            auditors = plan.auditors.len(),
            share = %plan.fee_share,
            remainder = %plan.remainder,
            root = %record.selection_root_hex(),
            "Auditors assigned"
        );
        Ok(record.clone())
    }

    /// Replace the assigned auditors. Administrator only.
    ///
    /// Every new address must be an enrolled candidate. The audit fee is
    /// re-split over the new slot count.
    ///
    /// # Errors
    /// `Unauthorized`, `UnexpectedPayment`, `NotFound`, `WrongStatus` unless
    /// `IN_PROGRESS`, `InvalidAuditorCount`, `NotEnrolled`, and registry
    /// errors.
    pub fn update_assignment_auditors(
        &mut self,
        ctx: &CallContext,
        item_id: ItemId,
        auditors: Vec<Address>,
    ) -> Result<()> {
        self.ensure_administrator(ctx, "update assignment")?;
        ensure_no_payment(ctx)?;
        validate_roster(&auditors)?;
        let share = self.correction_share(item_id, &auditors)?;
        let count = auditors.len();
        self.assignments.update_auditors(item_id, auditors, share)?;
        tracing::info!(item = %item_id, auditors = count, %share, "Assignment replaced");
        Ok(())
    }

    /// Append one auditor to an assignment. Administrator only.
    ///
    /// # Errors
    /// As [`Self::update_assignment_auditors`], plus `DuplicateAuditor`.
    pub fn add_assignment_auditor(
        &mut self,
        ctx: &CallContext,
        item_id: ItemId,
        auditor: Address,
    ) -> Result<()> {
        self.ensure_administrator(ctx, "add assigned auditor")?;
        ensure_no_payment(ctx)?;
        let mut auditors = self.assignments.get_audit_assignment(item_id)?.auditors();
        if auditors.contains(&auditor) {
            return Err(DauditError::DuplicateAuditor(auditor));
        }
        auditors.push(auditor);
        let share = self.correction_share(item_id, &auditors)?;
        self.assignments.add_auditor(item_id, auditor, share)?;
        tracing::info!(item = %item_id, %auditor, %share, "Auditor added to assignment");
        Ok(())
    }

    // =================================================================
    // Results
    // =================================================================

    /// Record an assigned auditor's finding.
    ///
    /// # Errors
    /// - `UnexpectedPayment` if value is attached
    /// - `InvalidOutcomeCode` unless 0 (passed) or 1 (failed)
    /// - `UnknownAssetContract` if not the findings registry
    /// - `TokenNotFound` / `NotTokenOwner` for the result token
    /// - `NotFound`, `WrongStatus` unless `IN_PROGRESS`
    /// - `NotAssigned`, `DuplicateSubmission`, `ResultTokenReused`
    pub fn create_audit_result(
        &mut self,
        ctx: &CallContext,
        findings: &dyn AssetRegistry,
        asset_contract: Address,
        item_id: ItemId,
        result_token: TokenId,
        outcome_code: u8,
    ) -> Result<()> {
        ensure_no_payment(ctx)?;
        let outcome = AuditOutcome::from_code(outcome_code)?;
        if asset_contract != self.config.findings_contract
            || findings.contract() != self.config.findings_contract
        {
            return Err(DauditError::UnknownAssetContract(asset_contract));
        }
        ensure_token_owner(findings, ctx.caller, result_token)?;
        self.item(item_id)?
            .ensure_status(AuditItemStatus::InProgress, "IN_PROGRESS")?;

        let result = AuditResult {
            token_id: result_token,
            outcome,
        };
        self.assignments
            .record_result(item_id, ctx.caller, result)
            .inspect_err(|e| {
                tracing::warn!(
                    item = %item_id,
                    auditor = %ctx.caller,
                    token = %result_token,
                    error = %e,
                    "Audit result rejected"
                );
            })?;

        tracing::info!(
            item = %item_id,
            auditor = %ctx.caller,
            token = %result_token,
            %outcome,
            "Audit result recorded"
        );
        Ok(())
    }

    // =================================================================
    // Settlement
    // =================================================================

    /// Distribute the escrowed fee and finalize the item. Administrator only.
    ///
    /// On an `IN_PROGRESS` item, every unpaid slot is paid its share
    /// (including auditors who never submitted), the rounding remainder is
    /// moved to dust and the final status comes from the outcome policy.
    /// On an item already `PASSED`/`FAILED` this is a no-op returning an
    /// empty report.
    ///
    /// # Errors
    /// `Unauthorized`, `UnexpectedPayment`, `NotFound`, and `WrongStatus`
    /// for `PENDING` or `CANCELLED` items.
    pub fn pay_auditors(&mut self, ctx: &CallContext, item_id: ItemId) -> Result<SettlementReport> {
        self.ensure_administrator(ctx, "pay auditors")?;
        ensure_no_payment(ctx)?;
        let idx = self.item_position(item_id)?;
        let status = self.items[idx].status;

        if status.is_settled() {
            let record = self.assignments.get_audit_assignment(item_id)?;
            if !record.all_paid() {
                return Err(DauditError::Internal(format!(
                    "{item_id} is {status} with unpaid slots"
                )));
            }
            tracing::info!(item = %item_id, %status, "Item already settled, nothing to pay");
            return Ok(SettlementReport {
                item_id,
                status,
                payouts: Vec::new(),
                dust: Decimal::ZERO,
            });
        }
        self.items[idx].ensure_status(AuditItemStatus::InProgress, "IN_PROGRESS")?;

        let outcomes = self.assignments.get_audit_assignment(item_id)?.outcomes();
        let verdict = aggregate_outcome(self.config.outcome_policy, &outcomes);

        let mut payouts = Vec::new();
        for (auditor, share) in self.assignments.settle_unpaid(item_id)? {
            self.treasury.release(item_id, share)?;
            tracing::debug!(item = %item_id, %auditor, %share, "Auditor share released");
            payouts.push(PayoutReceipt::new(
                item_id,
                auditor,
                share,
                PayoutKind::AuditorFee,
            ));
        }
        let dust = self.treasury.sweep_dust(item_id)?;
        self.items[idx].transition(verdict)?;
        self.receipts.extend(payouts.iter().cloned());

        let report = SettlementReport {
            item_id,
            status: verdict,
            payouts,
            dust,
        };
        tracing::info!(
            item = %item_id,
            status = %verdict,
            paid = %report.total_paid(),
            auditors = report.payouts.len(),
            %dust,
            "Item settled"
        );
        Ok(report)
    }

    /// Withdraw an unsettled item and refund its audit fee to the producer.
    /// The listing fee is kept. Administrator only.
    ///
    /// # Errors
    /// `Unauthorized`, `UnexpectedPayment`, `NotFound`, `WrongStatus` for
    /// settled or cancelled items, `PaymentAlreadyIssued` if any share was
    /// paid.
    pub fn cancel_audit_item(
        &mut self,
        ctx: &CallContext,
        item_id: ItemId,
    ) -> Result<PayoutReceipt> {
        self.ensure_administrator(ctx, "cancel item")?;
        ensure_no_payment(ctx)?;
        let idx = self.item_position(item_id)?;
        let item = &self.items[idx];
        if !item.status.can_transition_to(AuditItemStatus::Cancelled) {
            return Err(DauditError::WrongStatus {
                item: item_id,
                expected: "PENDING or IN_PROGRESS",
                actual: item.status,
            });
        }
        if self.assignments.get(item_id).is_some_and(AssignmentRecord::any_paid) {
            return Err(DauditError::PaymentAlreadyIssued(item_id));
        }
        let producer = item.producer;

        let refund = self.treasury.refund(item_id)?;
        self.items[idx].transition(AuditItemStatus::Cancelled)?;
        self.enrollments.lock(item_id);
        let receipt = PayoutReceipt::new(item_id, producer, refund, PayoutKind::ProducerRefund);
        self.receipts.push(receipt.clone());

        tracing::info!(item = %item_id, %producer, %refund, "Audit item cancelled");
        Ok(receipt)
    }

    // =================================================================
    // Read surface
    // =================================================================

    #[must_use]
    pub fn get_listing_fee(&self) -> Amount {
        self.config.listing_fee
    }

    /// Pending items in creation order. Call again to restart.
    pub fn fetch_pending_audits(&self) -> impl Iterator<Item = &AuditItem> {
        self.items
            .iter()
            .filter(|item| item.status == AuditItemStatus::Pending)
    }

    /// All items in creation order.
    pub fn fetch_audits(&self) -> impl Iterator<Item = &AuditItem> {
        self.items.iter()
    }

    /// # Errors
    /// Returns `NotFound` if no item was listed from that token.
    pub fn fetch_audit_by_token_id(&self, item_id: ItemId) -> Result<&AuditItem> {
        self.item(item_id)
    }

    /// # Errors
    /// Returns `NotFound` if the item has no enrollment.
    pub fn get_audit_enrollment(&self, item_id: ItemId) -> Result<&EnrollmentRecord> {
        self.enrollments.get_audit_enrollment(item_id)
    }

    pub fn fetch_audit_enrollments(&self) -> impl Iterator<Item = &EnrollmentRecord> {
        self.enrollments.fetch_audit_enrollments()
    }

    #[must_use]
    pub fn is_audit_enrolled(&self, item_id: ItemId) -> bool {
        self.enrollments.is_audit_enrolled(item_id)
    }

    /// # Errors
    /// Returns `NotFound` if the item has no assignment.
    pub fn get_audit_assignment(&self, item_id: ItemId) -> Result<&AssignmentRecord> {
        self.assignments.get_audit_assignment(item_id)
    }

    pub fn fetch_audit_assignments(&self) -> impl Iterator<Item = &AssignmentRecord> {
        self.assignments.fetch_audit_assignments()
    }

    #[must_use]
    pub fn is_audit_assigned(&self, item_id: ItemId) -> bool {
        self.assignments.is_audit_assigned(item_id)
    }

    #[must_use]
    pub fn config(&self) -> &CoordinatorConfig {
        &self.config
    }

    #[must_use]
    pub fn treasury(&self) -> TreasurySnapshot {
        self.treasury.snapshot()
    }

    /// Remaining escrow for one item.
    #[must_use]
    pub fn escrow_of(&self, item_id: ItemId) -> Amount {
        self.treasury.escrow_of(item_id)
    }

    /// Every payout issued, oldest first.
    #[must_use]
    pub fn receipts(&self) -> &[PayoutReceipt] {
        &self.receipts
    }

    /// Check treasury conservation against the coordinator's ledger balance.
    ///
    /// # Errors
    /// Returns `TreasuryImbalance` on any mismatch.
    pub fn verify_treasury(&self, ledger_balance: Amount) -> Result<()> {
        self.treasury.verify(ledger_balance).inspect_err(|e| {
            tracing::error!(error = %e, "Treasury conservation violated");
        })
    }

    // =================================================================
    // Internals
    // =================================================================

    fn item_position(&self, item_id: ItemId) -> Result<usize> {
        self.by_item
            .get(&item_id)
            .copied()
            .ok_or(DauditError::NotFound {
                entity: "audit item",
                item: item_id,
            })
    }

    fn item(&self, item_id: ItemId) -> Result<&AuditItem> {
        self.item_position(item_id).map(|idx| &self.items[idx])
    }

    fn ensure_administrator(&self, ctx: &CallContext, action: &str) -> Result<()> {
        if ctx.caller != self.config.administrator {
            tracing::warn!(caller = %ctx.caller, action, "Unauthorized call rejected");
            return Err(DauditError::Unauthorized {
                caller: ctx.caller,
                reason: format!("only the administrator may {action}"),
            });
        }
        Ok(())
    }

    /// Share for a corrected slot list: the item must be in progress, the
    /// list within limits and every address an enrolled candidate.
    fn correction_share(&self, item_id: ItemId, auditors: &[Address]) -> Result<Amount> {
        let item = self.item(item_id)?;
        item.ensure_status(AuditItemStatus::InProgress, "IN_PROGRESS")?;
        let max = self.config.max_auditors_per_item;
        let count = u32::try_from(auditors.len()).unwrap_or(u32::MAX);
        if count > max {
            return Err(DauditError::InvalidAuditorCount { count, max });
        }
        let enrollment = self.enrollments.get_audit_enrollment(item_id)?;
        if let Some(outsider) = auditors.iter().find(|a| !enrollment.contains(a)) {
            return Err(DauditError::NotEnrolled {
                item: item_id,
                auditor: *outsider,
            });
        }
        Ok(amount::split_even(item.audit_fee, count).0)
    }
}

fn ensure_no_payment(ctx: &CallContext) -> Result<()> {
    if ctx.value.is_zero() {
        Ok(())
    } else {
        Err(DauditError::UnexpectedPayment(ctx.value))
    }
}

fn ensure_exact_payment(needed: Amount, paid: Amount) -> Result<()> {
    if paid < needed {
        return Err(DauditError::InsufficientPayment { needed, paid });
    }
    if paid > needed {
        return Err(DauditError::PaymentMismatch { needed, paid });
    }
    Ok(())
}
