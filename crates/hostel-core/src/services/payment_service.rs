// ============================================================================
// Hostel Core - Payment Service
// File: crates/hostel-core/src/services/payment_service.rs
// ============================================================================
//! Append-only payment ledger

use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::json;
use tracing::{info, warn};
use uuid::Uuid;

use hostel_shared::EntityId;

use super::notification::{NotificationDispatcher, PaymentNotice};
use super::support::markup_enabled;
use crate::domain::{
    Actor, Allocation, AuditAction, AuditEntry, BalanceSnapshot, Capability, DispatchReport, DuplicateProbe,
    NewPayment, Payment,
};
use crate::error::DomainError;
use crate::repositories::{AuditRecorder, Repositories};

#[derive(Debug, Clone)]
pub struct RecordPaymentCommand {
    pub allocation_id: EntityId,
    pub amount: Decimal,
    pub idempotency_key: Option<Uuid>,
}

/// Display-equivalent amounts, present only when a markup applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayAmounts {
    pub price: Decimal,
    pub amount: Option<Decimal>,
    pub total_paid: Decimal,
    pub balance: Decimal,
}

#[derive(Debug, Clone)]
pub struct PaymentOutcome {
    pub payment: Payment,
    pub balance: BalanceSnapshot,
    pub display: Option<DisplayAmounts>,
    pub notification: DispatchReport,
}

#[derive(Debug, Clone)]
pub struct PaymentSummary {
    pub allocation: Allocation,
    pub balance: BalanceSnapshot,
    pub payments: Vec<Payment>,
    pub display: Option<DisplayAmounts>,
}

pub struct PaymentService {
    repos: Repositories,
    audit: Arc<dyn AuditRecorder>,
    notifier: Arc<NotificationDispatcher>,
    duplicate_window: chrono::Duration,
}

impl PaymentService {
    pub fn new(
        repos: Repositories,
        audit: Arc<dyn AuditRecorder>,
        notifier: Arc<NotificationDispatcher>,
        duplicate_window: chrono::Duration,
    ) -> Self {
        Self {
            repos,
            audit,
            notifier,
            duplicate_window,
        }
    }

    /// Record a payment against an allocation.
    ///
    /// The running total never exceeds the allocation's price snapshot.
    pub async fn record_payment(&self, actor: &Actor, cmd: RecordPaymentCommand) -> Result<PaymentOutcome, DomainError> {
        info!(
            "Recording payment of {} on allocation {} (user {})",
            cmd.amount, cmd.allocation_id, actor.user_id
        );

        // 1. Allocation and scope
        actor.require(Capability::RecordPayments)?;
        let allocation = self.load_allocation(actor, cmd.allocation_id).await?;

        // 2-4. Balance ceiling and duplicate guards
        let new_payment = NewPayment {
            allocation_id: allocation.id,
            amount: cmd.amount,
            recorded_by: actor.user_id,
            idempotency_key: cmd.idempotency_key,
        };
        let probe = DuplicateProbe::for_payment(&new_payment, Utc::now(), self.duplicate_window);
        self.repos
            .payments
            .ledger_state(&allocation, &probe)
            .await?
            .admit(cmd.amount)
            .inspect_err(|e| warn!("Payment rejected on allocation {}: {}", allocation.id, e))?;

        // 5. Insert. The adapter repeats the checks under a row lock.
        let payment = self.repos.payments.append(&allocation, &new_payment, &probe).await?;

        // 6. Post-insert balance
        let total_paid = self.repos.payments.total_paid(allocation.id).await?;
        let balance = BalanceSnapshot::new(allocation.room_price_at_allocation, total_paid);

        info!(
            "Payment {} recorded: allocation {} paid {} of {}",
            payment.id, allocation.id, balance.total_paid, balance.price
        );

        // 7. Audit
        self.audit.record(
            AuditEntry::new(AuditAction::PaymentRecorded, actor.user_id, "payment", payment.id)
                .hostel(allocation.hostel_id)
                .details(json!({
                    "allocationId": allocation.id,
                    "studentId": allocation.student_id,
                    "amount": payment.amount,
                    "totalPaid": balance.total_paid,
                    "balance": balance.balance,
                })),
        );

        // 8. Display-equivalent amounts
        let markup = markup_enabled(self.repos.hostels.as_ref(), allocation.hostel_id).await;
        let display = display_amounts(&allocation, &balance, Some(payment.amount), markup);

        // 9. Best-effort receipt
        let notification = self.notify(&allocation, &payment, &balance, markup).await;

        Ok(PaymentOutcome {
            payment,
            balance,
            display,
            notification,
        })
    }

    /// Price, paid, and outstanding amounts plus the payment history of one
    /// allocation.
    pub async fn payment_summary(&self, actor: &Actor, allocation_id: EntityId) -> Result<PaymentSummary, DomainError> {
        actor.require(Capability::ViewFinance)?;
        let allocation = self.load_allocation(actor, allocation_id).await?;

        let payments = self.repos.payments.list_for_allocation(allocation.id).await?;
        let total_paid: Decimal = payments.iter().map(|p| p.amount).sum();
        let balance = BalanceSnapshot::new(allocation.room_price_at_allocation, total_paid);

        let markup = markup_enabled(self.repos.hostels.as_ref(), allocation.hostel_id).await;
        let display = display_amounts(&allocation, &balance, None, markup);

        Ok(PaymentSummary {
            allocation,
            balance,
            payments,
            display,
        })
    }

    async fn load_allocation(&self, actor: &Actor, allocation_id: EntityId) -> Result<Allocation, DomainError> {
        let scope = actor.resolve_hostel(None)?;
        let allocation = self
            .repos
            .allocations
            .find_by_id(allocation_id)
            .await?
            .ok_or_else(|| {
                warn!("Allocation {} not found", allocation_id);
                DomainError::AllocationNotFound(allocation_id)
            })?;
        Actor::ensure_in_scope(scope, allocation.hostel_id, "Allocation")?;
        Ok(allocation)
    }

    async fn notify(
        &self,
        allocation: &Allocation,
        payment: &Payment,
        balance: &BalanceSnapshot,
        markup: bool,
    ) -> DispatchReport {
        let student = match self.repos.students.find_by_id(allocation.student_id).await {
            Ok(Some(student)) => student,
            Ok(None) => {
                warn!("Receipt skipped: student {} no longer exists", allocation.student_id);
                return DispatchReport::default();
            }
            Err(e) => {
                warn!("Receipt skipped: student lookup failed: {}", e);
                return DispatchReport::default();
            }
        };

        let pricing = allocation.pricing();
        self.notifier
            .payment_received(&PaymentNotice {
                student_id: student.id,
                student_name: student.full_name,
                email: student.email,
                phone: student.phone,
                payment_id: payment.id,
                amount: pricing.to_display(payment.amount, markup),
                total_paid: pricing.to_display(balance.total_paid, markup),
                balance: pricing.to_display(balance.balance, markup),
            })
            .await
    }
}

fn display_amounts(
    allocation: &Allocation,
    balance: &BalanceSnapshot,
    amount: Option<Decimal>,
    markup: bool,
) -> Option<DisplayAmounts> {
    let pricing = allocation.pricing();
    if !markup || pricing.display.is_none() {
        return None;
    }
    Some(DisplayAmounts {
        price: pricing.shown_price(markup),
        amount: amount.map(|a| pricing.to_display(a, markup)),
        total_paid: pricing.to_display(balance.total_paid, markup),
        balance: pricing.to_display(balance.balance, markup),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ErrorKind, HostelFeature, PaymentStatus, Role};
    use crate::testing::TestContext;
    use rust_decimal_macros::dec;

    fn pay(allocation_id: EntityId, amount: Decimal) -> RecordPaymentCommand {
        RecordPaymentCommand {
            allocation_id,
            amount,
            idempotency_key: None,
        }
    }

    #[tokio::test]
    async fn shared_room_end_to_end() {
        let ctx = TestContext::new();
        let (hostel, semester) = ctx.hostel_with_active_semester("Mlimani");
        let room = ctx.store.seed_room(hostel.id, "B12", dec!(600000), 2);
        let a = ctx.store.seed_student(hostel.id, Some(semester.id), "Amina", "REG-A");
        let b = ctx.store.seed_student(hostel.id, Some(semester.id), "Baraka", "REG-B");
        let actor = ctx.custodian(hostel.id);

        let alloc_a = ctx.allocate(&actor, a.id, room.id).await.unwrap().allocation;
        let alloc_b = ctx.allocate(&actor, b.id, room.id).await.unwrap().allocation;
        assert_eq!(alloc_a.room_price_at_allocation, dec!(300000));
        assert_eq!(alloc_b.room_price_at_allocation, dec!(300000));

        let paid_a = ctx
            .services
            .payments
            .record_payment(&actor, pay(alloc_a.id, dec!(300000)))
            .await
            .unwrap();
        assert_eq!(paid_a.balance.balance, dec!(0));
        assert_eq!(paid_a.balance.status, PaymentStatus::Paid);

        let paid_b = ctx
            .services
            .payments
            .record_payment(&actor, pay(alloc_b.id, dec!(150000)))
            .await
            .unwrap();
        assert_eq!(paid_b.balance.balance, dec!(150000));
        assert_eq!(paid_b.balance.status, PaymentStatus::Partial);

        let summary_a = ctx.services.payments.payment_summary(&actor, alloc_a.id).await.unwrap();
        assert_eq!(summary_a.balance.status, PaymentStatus::Paid);
        assert_eq!(summary_a.payments.len(), 1);
        assert!(paid_a.notification.email_sent);
    }

    #[tokio::test]
    async fn exact_balance_succeeds_and_one_cent_more_fails() {
        let ctx = TestContext::new();
        let (actor, allocation) = ctx.allocated(dec!(300000), 1).await;

        let err = ctx
            .services
            .payments
            .record_payment(&actor, pay(allocation.id, dec!(300000.01)))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::ExceedsBalance { max_allowed } if max_allowed == dec!(300000)));
        assert_eq!(err.kind(), ErrorKind::Validation);

        let outcome = ctx
            .services
            .payments
            .record_payment(&actor, pay(allocation.id, dec!(300000)))
            .await
            .unwrap();
        assert_eq!(outcome.balance.balance, dec!(0));

        let err = ctx
            .services
            .payments
            .record_payment(&actor, pay(allocation.id, dec!(0.01)))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::AlreadyFullyPaid));
        assert_eq!(ctx.store.payments().len(), 1);
    }

    #[tokio::test]
    async fn identical_payment_inside_window_is_a_conflict() {
        let ctx = TestContext::new();
        let (actor, allocation) = ctx.allocated(dec!(300000), 1).await;

        let first = ctx
            .services
            .payments
            .record_payment(&actor, pay(allocation.id, dec!(50000)))
            .await
            .unwrap();
        let err = ctx
            .services
            .payments
            .record_payment(&actor, pay(allocation.id, dec!(50000)))
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Conflict);
        assert_eq!(err.existing_id(), Some(first.payment.id));
        assert_eq!(ctx.store.payments().len(), 1);

        // A different amount or a different recorder is not a duplicate.
        ctx.services
            .payments
            .record_payment(&actor, pay(allocation.id, dec!(50000.50)))
            .await
            .unwrap();
        let colleague = Actor::new(actor.user_id + 1, Role::Custodian, actor.hostel_id);
        ctx.services
            .payments
            .record_payment(&colleague, pay(allocation.id, dec!(50000)))
            .await
            .unwrap();
        assert_eq!(ctx.store.payments().len(), 3);
    }

    #[tokio::test]
    async fn repeated_large_payment_reports_the_first_one() {
        let ctx = TestContext::new();
        let (actor, allocation) = ctx.allocated(dec!(300000), 1).await;

        for amount in [dec!(200000), dec!(100000)] {
            let first = ctx
                .services
                .payments
                .record_payment(&actor, pay(allocation.id, amount))
                .await
                .unwrap();
            // Over half the balance, then the full remaining balance.
            let err = ctx
                .services
                .payments
                .record_payment(&actor, pay(allocation.id, amount))
                .await
                .unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Conflict);
            assert_eq!(err.existing_id(), Some(first.payment.id));
        }
        assert_eq!(ctx.store.payments().len(), 2);
    }

    #[tokio::test]
    async fn append_rechecks_the_ceiling() {
        let ctx = TestContext::new();
        let (actor, allocation) = ctx.allocated(dec!(300000), 1).await;
        let repos = ctx.store.repositories();

        let first = NewPayment {
            allocation_id: allocation.id,
            amount: dec!(200000),
            recorded_by: actor.user_id,
            idempotency_key: None,
        };
        let second = NewPayment {
            amount: dec!(150000),
            recorded_by: actor.user_id + 1,
            ..first.clone()
        };
        let window = chrono::Duration::seconds(5);
        let first_probe = DuplicateProbe::for_payment(&first, Utc::now(), window);
        let second_probe = DuplicateProbe::for_payment(&second, Utc::now(), window);

        // Both pass against the ledger as it stands before either write.
        repos.payments.ledger_state(&allocation, &first_probe).await.unwrap().admit(first.amount).unwrap();
        repos.payments.ledger_state(&allocation, &second_probe).await.unwrap().admit(second.amount).unwrap();

        repos.payments.append(&allocation, &first, &first_probe).await.unwrap();
        let err = repos.payments.append(&allocation, &second, &second_probe).await.unwrap_err();

        assert!(matches!(err, DomainError::ExceedsBalance { max_allowed } if max_allowed == dec!(100000)));
        assert_eq!(repos.payments.total_paid(allocation.id).await.unwrap(), dec!(200000));
    }

    #[tokio::test]
    async fn stored_payment_carries_the_submission_instant() {
        let ctx = TestContext::new();
        let (actor, allocation) = ctx.allocated(dec!(300000), 1).await;
        let repos = ctx.store.repositories();
        let payment = NewPayment {
            allocation_id: allocation.id,
            amount: dec!(25000),
            recorded_by: actor.user_id,
            idempotency_key: None,
        };
        let window = chrono::Duration::seconds(5);
        let submitted = Utc::now() - chrono::Duration::seconds(3);

        let stored = repos
            .payments
            .append(&allocation, &payment, &DuplicateProbe::for_payment(&payment, submitted, window))
            .await
            .unwrap();
        assert_eq!(stored.recorded_at, submitted);

        let inside = DuplicateProbe::for_payment(&payment, submitted + chrono::Duration::seconds(4), window);
        let ledger = repos.payments.ledger_state(&allocation, &inside).await.unwrap();
        assert_eq!(ledger.recent_duplicate, Some(stored.id));

        let outside = DuplicateProbe::for_payment(&payment, submitted + chrono::Duration::seconds(6), window);
        let ledger = repos.payments.ledger_state(&allocation, &outside).await.unwrap();
        assert_eq!(ledger.recent_duplicate, None);
    }

    #[tokio::test]
    async fn concurrent_payments_never_exceed_the_price() {
        let ctx = TestContext::new();
        let (actor, allocation) = ctx.allocated(dec!(300000), 1).await;
        let colleague = Actor::new(actor.user_id + 1, Role::Custodian, actor.hostel_id);

        let (a, b) = tokio::join!(
            ctx.services.payments.record_payment(&actor, pay(allocation.id, dec!(200000))),
            ctx.services.payments.record_payment(&colleague, pay(allocation.id, dec!(200000))),
        );

        assert_eq!(usize::from(a.is_ok()) + usize::from(b.is_ok()), 1);
        let rejected = a.err().or(b.err()).unwrap();
        assert!(matches!(rejected, DomainError::ExceedsBalance { .. }));
        let total: Decimal = ctx.store.payments().iter().map(|p| p.amount).sum();
        assert!(total <= allocation.room_price_at_allocation);
    }

    #[tokio::test]
    async fn identical_payment_outside_window_is_accepted() {
        let ctx = TestContext::new();
        let (actor, allocation) = ctx.allocated(dec!(300000), 1).await;
        ctx.store.seed_payment(
            &allocation,
            dec!(50000),
            actor.user_id,
            Utc::now() - chrono::Duration::seconds(6),
        );

        let outcome = ctx
            .services
            .payments
            .record_payment(&actor, pay(allocation.id, dec!(50000)))
            .await
            .unwrap();
        assert_eq!(outcome.balance.total_paid, dec!(100000));
    }

    #[tokio::test]
    async fn idempotency_key_returns_original_payment() {
        let ctx = TestContext::new();
        let (actor, allocation) = ctx.allocated(dec!(300000), 1).await;
        let key = Uuid::new_v4();
        let cmd = RecordPaymentCommand {
            allocation_id: allocation.id,
            amount: dec!(300000),
            idempotency_key: Some(key),
        };

        let first = ctx.services.payments.record_payment(&actor, cmd.clone()).await.unwrap();
        // Fully paid now, but the retry still reports the duplicate.
        let err = ctx.services.payments.record_payment(&actor, cmd).await.unwrap_err();

        assert!(matches!(err, DomainError::DuplicatePayment { payment_id } if payment_id == first.payment.id));
        assert_eq!(ctx.store.payments().len(), 1);
    }

    #[tokio::test]
    async fn invalid_amounts_and_scope() {
        let ctx = TestContext::new();
        let (actor, allocation) = ctx.allocated(dec!(300000), 1).await;
        let (other, _) = ctx.hostel_with_active_semester("Other");

        for amount in [dec!(0), dec!(-10), dec!(0.001)] {
            let err = ctx
                .services
                .payments
                .record_payment(&actor, pay(allocation.id, amount))
                .await
                .unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Validation);
        }

        let err = ctx
            .services
            .payments
            .record_payment(&ctx.custodian(other.id), pay(allocation.id, dec!(10)))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Forbidden);

        let err = ctx
            .services
            .payments
            .record_payment(&actor, pay(9999, dec!(10)))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);

        let admin = Actor::new(1, Role::SuperAdmin, None);
        assert!(ctx
            .services
            .payments
            .record_payment(&admin, pay(allocation.id, dec!(10)))
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn display_amounts_follow_markup_ratio() {
        let ctx = TestContext::new();
        let (hostel, semester) = ctx.hostel_with_active_semester("Mlimani");
        ctx.store.enable_feature(hostel.id, HostelFeature::CustodianPriceMarkup);
        let room = ctx.store.seed_room(hostel.id, "A1", dec!(600000), 2);
        let student = ctx.store.seed_student(hostel.id, Some(semester.id), "Amina", "REG-1");
        let actor = ctx.custodian(hostel.id);
        let allocation = ctx
            .services
            .allocations
            .allocate(
                &actor,
                crate::services::AllocateCommand {
                    student_id: student.id,
                    room_id: room.id,
                    hostel_id: None,
                    display_price: Some(dec!(800000)),
                },
            )
            .await
            .unwrap()
            .allocation;

        let outcome = ctx
            .services
            .payments
            .record_payment(&actor, pay(allocation.id, dec!(150000)))
            .await
            .unwrap();

        // The ledger stays in actual terms.
        assert_eq!(outcome.balance.balance, dec!(150000));
        let display = outcome.display.unwrap();
        assert_eq!(display.price, dec!(400000));
        assert_eq!(display.amount, Some(dec!(200000)));
        assert_eq!(display.balance, dec!(200000));
        let receipt = ctx.email.sent().last().unwrap().2.clone();
        assert!(receipt.contains("payment of 200000.00 TZS"));
    }

    #[tokio::test]
    async fn payments_survive_checkout() {
        let ctx = TestContext::new();
        let (actor, allocation) = ctx.allocated(dec!(300000), 1).await;
        ctx.services
            .payments
            .record_payment(&actor, pay(allocation.id, dec!(100000)))
            .await
            .unwrap();

        ctx.services.allocations.checkout(&actor, allocation.id, None).await.unwrap();

        let err = ctx
            .services
            .payments
            .payment_summary(&actor, allocation.id)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);

        let listed = ctx.services.reporting.list_payments(&actor, None, None).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].allocation_id, allocation.id);
        assert_eq!(listed[0].room_name, None);

        let stats = ctx.services.reporting.finance_statistics(&actor, None, None).await.unwrap();
        assert_eq!(stats.collected, dec!(100000));
        assert_eq!(stats.allocations, 0);
    }

    #[tokio::test]
    async fn receipt_failure_does_not_fail_payment() {
        let ctx = TestContext::with_failing_channels();
        let (actor, allocation) = ctx.allocated(dec!(300000), 1).await;

        let outcome = ctx
            .services
            .payments
            .record_payment(&actor, pay(allocation.id, dec!(1000)))
            .await
            .unwrap();

        assert!(!outcome.notification.email_sent);
        assert!(!outcome.notification.sms_sent);
        assert_eq!(ctx.store.payments().len(), 1);
        assert!(ctx.audit.actions().contains(&AuditAction::PaymentRecorded));
    }
}
