// ============================================================================
// Hostel Core - Allocation Service
// File: crates/hostel-core/src/services/allocation_service.rs
// ============================================================================
//! Binds students to rooms for their semester, and checks them out again

use std::sync::Arc;

use rust_decimal::Decimal;
use serde_json::json;
use tracing::{info, warn};

use hostel_shared::EntityId;

use super::notification::{AllocationNotice, NotificationDispatcher};
use super::support::markup_enabled;
use crate::domain::{
    admit_allocation, Actor, Allocation, AuditAction, AuditEntry, Capability, DispatchReport, HostelFeature,
    NewAllocation, Pricing, Room, RoomOccupancy, Student,
};
use crate::error::DomainError;
use crate::repositories::{AuditRecorder, Repositories};

#[derive(Debug, Clone)]
pub struct AllocateCommand {
    pub student_id: EntityId,
    pub room_id: EntityId,
    /// Target hostel for cross-tenant callers. Ignored otherwise, unless it
    /// contradicts the caller's own hostel.
    pub hostel_id: Option<EntityId>,
    /// Room-level sticker price, split by capacity like the real price.
    pub display_price: Option<Decimal>,
}

#[derive(Debug, Clone)]
pub struct AllocationOutcome {
    pub allocation: Allocation,
    pub capacity: i32,
    pub pricing: Pricing,
    pub notification: DispatchReport,
}

pub struct AllocationService {
    repos: Repositories,
    audit: Arc<dyn AuditRecorder>,
    notifier: Arc<NotificationDispatcher>,
}

impl AllocationService {
    pub fn new(repos: Repositories, audit: Arc<dyn AuditRecorder>, notifier: Arc<NotificationDispatcher>) -> Self {
        Self { repos, audit, notifier }
    }

    /// Allocate a room to a student for the semester they registered in.
    ///
    /// A repeat call is rejected with a conflict, never deduplicated.
    pub async fn allocate(&self, actor: &Actor, cmd: AllocateCommand) -> Result<AllocationOutcome, DomainError> {
        info!(
            "Allocating room {} to student {} (user {})",
            cmd.room_id, cmd.student_id, actor.user_id
        );

        // 1. Capability and hostel scope
        actor.require(Capability::ManageAllocations)?;
        let scope = actor.resolve_hostel(cmd.hostel_id)?;

        // 2. Room
        let room = self
            .repos
            .rooms
            .find_by_id(cmd.room_id)
            .await?
            .filter(|room| room.is_active)
            .ok_or_else(|| {
                warn!("Allocation failed: room {} missing or inactive", cmd.room_id);
                DomainError::RoomNotFound(cmd.room_id)
            })?;
        Actor::ensure_in_scope(scope, room.hostel_id, "Room")?;

        // 3. Student and their semester
        let student = self
            .repos
            .students
            .find_by_id(cmd.student_id)
            .await?
            .ok_or(DomainError::StudentNotFound(cmd.student_id))?;
        Actor::ensure_in_scope(scope, student.hostel_id, "Student")?;
        if student.hostel_id != room.hostel_id {
            warn!(
                "Allocation failed: student {} (hostel {}) and room {} (hostel {}) differ",
                student.id, student.hostel_id, room.id, room.hostel_id
            );
            return Err(DomainError::ScopeMismatch { entity: "Student" });
        }
        let semester_id = student.semester_id.ok_or_else(|| {
            DomainError::ValidationError(format!("Student {} is not registered for a semester", student.id))
        })?;

        // 4-5. Existing allocation, then capacity
        let existing = self
            .repos
            .allocations
            .find_for_student(student.id, semester_id)
            .await?;
        let occupied = self.repos.allocations.count_occupied(room.id, semester_id).await?;
        admit_allocation(
            existing.as_ref(),
            room.id,
            RoomOccupancy {
                capacity: room.capacity,
                occupied,
            },
        )
        .inspect_err(|e| warn!("Allocation rejected for student {}: {}", student.id, e))?;

        // 6. Price snapshot
        let pricing = self.price_for(actor, &room, cmd.display_price).await?;

        // 7. Persist. The adapter re-runs the admission rule atomically.
        let allocation = self
            .repos
            .allocations
            .insert(
                &NewAllocation {
                    hostel_id: room.hostel_id,
                    semester_id,
                    student_id: student.id,
                    room_id: room.id,
                    pricing,
                    allocated_by: actor.user_id,
                },
                room.capacity,
            )
            .await?;

        info!(
            "Allocation {} created: student {} -> room {} at {}",
            allocation.id, student.id, room.id, pricing.actual
        );

        // 8. Audit
        self.audit.record(
            AuditEntry::new(AuditAction::RoomAllocated, actor.user_id, "allocation", allocation.id)
                .hostel(allocation.hostel_id)
                .details(json!({
                    "studentId": student.id,
                    "roomId": room.id,
                    "semesterId": semester_id,
                    "pricePerStudent": pricing.actual,
                    "displayPricePerStudent": pricing.display,
                })),
        );

        // 9. Best-effort notification
        let notification = self.notify(&allocation, &room, &student, pricing).await;

        Ok(AllocationOutcome {
            allocation,
            capacity: room.capacity,
            pricing,
            notification,
        })
    }

    /// Administrative checkout: hard-deletes the allocation. Payments already
    /// recorded against it are kept.
    pub async fn checkout(
        &self,
        actor: &Actor,
        allocation_id: EntityId,
        hostel_id: Option<EntityId>,
    ) -> Result<Allocation, DomainError> {
        info!("Checking out allocation {} (user {})", allocation_id, actor.user_id);

        actor.require(Capability::ManageAllocations)?;
        let scope = actor.resolve_hostel(hostel_id)?;

        let allocation = self
            .repos
            .allocations
            .find_by_id(allocation_id)
            .await?
            .ok_or(DomainError::AllocationNotFound(allocation_id))?;
        Actor::ensure_in_scope(scope, allocation.hostel_id, "Allocation")?;

        if !self.repos.allocations.delete(allocation.id).await? {
            return Err(DomainError::AllocationNotFound(allocation_id));
        }

        self.audit.record(
            AuditEntry::new(AuditAction::StudentCheckedOut, actor.user_id, "allocation", allocation.id)
                .hostel(allocation.hostel_id)
                .details(json!({
                    "studentId": allocation.student_id,
                    "roomId": allocation.room_id,
                    "semesterId": allocation.semester_id,
                })),
        );

        info!("Allocation {} checked out", allocation.id);
        Ok(allocation)
    }

    async fn price_for(&self, actor: &Actor, room: &Room, display_price: Option<Decimal>) -> Result<Pricing, DomainError> {
        let Some(display_price) = display_price else {
            return Pricing::for_room(room.price, room.capacity, None);
        };

        if !self
            .repos
            .hostels
            .feature_enabled(room.hostel_id, HostelFeature::CustodianPriceMarkup)
            .await?
        {
            warn!("Display price refused: markup disabled for hostel {}", room.hostel_id);
            return Err(DomainError::MarkupDisabled);
        }
        actor.require(Capability::SetDisplayPrice)?;

        Pricing::for_room(room.price, room.capacity, Some(display_price))
    }

    async fn notify(&self, allocation: &Allocation, room: &Room, student: &Student, pricing: Pricing) -> DispatchReport {
        let markup = markup_enabled(self.repos.hostels.as_ref(), allocation.hostel_id).await;
        let hostel_name = match self.repos.hostels.find_by_id(allocation.hostel_id).await {
            Ok(hostel) => hostel.map(|h| h.name),
            Err(e) => {
                warn!("Hostel lookup for notification failed: {}", e);
                None
            }
        };

        self.notifier
            .allocation_confirmed(&AllocationNotice {
                student_id: student.id,
                student_name: student.full_name.clone(),
                email: student.email.clone(),
                phone: student.phone.clone(),
                hostel_name,
                room_name: room.name.clone(),
                price: pricing.shown_price(markup),
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ErrorKind, Role};
    use crate::testing::TestContext;
    use rust_decimal_macros::dec;

    #[tokio::test]
    async fn allocates_with_fixed_share_and_notifies() {
        let ctx = TestContext::new();
        let (hostel, semester) = ctx.hostel_with_active_semester("Mlimani");
        let room = ctx.store.seed_room(hostel.id, "B12", dec!(600000), 2);
        let student = ctx.store.seed_student(hostel.id, Some(semester.id), "Amina", "REG-1");

        let outcome = ctx
            .services
            .allocations
            .allocate(
                &ctx.custodian(hostel.id),
                AllocateCommand {
                    student_id: student.id,
                    room_id: room.id,
                    hostel_id: None,
                    display_price: None,
                },
            )
            .await
            .unwrap();

        assert_eq!(outcome.capacity, 2);
        assert_eq!(outcome.pricing.actual, dec!(300000));
        assert_eq!(outcome.allocation.room_price_at_allocation, dec!(300000));
        assert_eq!(outcome.allocation.semester_id, semester.id);
        assert!(outcome.notification.email_sent);
        assert_eq!(ctx.audit.actions(), vec![AuditAction::RoomAllocated]);
        assert_eq!(ctx.email.sent().len(), 1);
    }

    #[tokio::test]
    async fn repeat_allocation_is_a_conflict() {
        let ctx = TestContext::new();
        let (hostel, semester) = ctx.hostel_with_active_semester("Mlimani");
        let room = ctx.store.seed_room(hostel.id, "B12", dec!(600000), 2);
        let student = ctx.store.seed_student(hostel.id, Some(semester.id), "Amina", "REG-1");
        let actor = ctx.custodian(hostel.id);
        let cmd = AllocateCommand {
            student_id: student.id,
            room_id: room.id,
            hostel_id: Some(hostel.id),
            display_price: None,
        };

        let first = ctx.services.allocations.allocate(&actor, cmd.clone()).await.unwrap();
        let err = ctx.services.allocations.allocate(&actor, cmd).await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Conflict);
        assert_eq!(err.existing_id(), Some(first.allocation.id));
        assert!(err.to_string().contains("idempotent"));
        assert_eq!(ctx.store.allocations().len(), 1);
    }

    #[tokio::test]
    async fn different_room_requires_checkout_first() {
        let ctx = TestContext::new();
        let (hostel, semester) = ctx.hostel_with_active_semester("Mlimani");
        let a = ctx.store.seed_room(hostel.id, "A1", dec!(100000), 2);
        let b = ctx.store.seed_room(hostel.id, "B1", dec!(100000), 2);
        let student = ctx.store.seed_student(hostel.id, Some(semester.id), "Amina", "REG-1");
        let actor = ctx.custodian(hostel.id);

        ctx.allocate(&actor, student.id, a.id).await.unwrap();
        let err = ctx.allocate(&actor, student.id, b.id).await.unwrap_err();

        assert!(matches!(err, DomainError::AllocatedToAnotherRoom { room_id, .. } if room_id == a.id));
        assert_eq!(ctx.store.allocations().len(), 1);

        let existing = ctx.store.allocations()[0].id;
        ctx.services.allocations.checkout(&actor, existing, None).await.unwrap();
        assert!(ctx.allocate(&actor, student.id, b.id).await.is_ok());
    }

    #[tokio::test]
    async fn capacity_is_enforced_and_checked_out_students_free_a_place() {
        let ctx = TestContext::new();
        let (hostel, semester) = ctx.hostel_with_active_semester("Mlimani");
        let room = ctx.store.seed_room(hostel.id, "Double", dec!(200000), 2);
        let actor = ctx.custodian(hostel.id);
        let s1 = ctx.store.seed_student(hostel.id, Some(semester.id), "One", "R1");
        let s2 = ctx.store.seed_student(hostel.id, Some(semester.id), "Two", "R2");
        let s3 = ctx.store.seed_student(hostel.id, Some(semester.id), "Three", "R3");

        ctx.allocate(&actor, s1.id, room.id).await.unwrap();
        ctx.allocate(&actor, s2.id, room.id).await.unwrap();
        let err = ctx.allocate(&actor, s3.id, room.id).await.unwrap_err();
        assert!(matches!(err, DomainError::RoomFull { capacity: 2, occupied: 2 }));
        assert_eq!(err.kind(), ErrorKind::Validation);

        let check_in = ctx.services.check_ins.check_in(&actor, s1.id, None).await.unwrap();
        ctx.services.check_ins.check_out(&actor, check_in.id).await.unwrap();

        assert!(ctx.allocate(&actor, s3.id, room.id).await.is_ok());
    }

    #[tokio::test]
    async fn insert_rechecks_the_last_place() {
        let ctx = TestContext::new();
        let (hostel, semester) = ctx.hostel_with_active_semester("Mlimani");
        let room = ctx.store.seed_room(hostel.id, "Single", dec!(150000), 1);
        let s1 = ctx.store.seed_student(hostel.id, Some(semester.id), "One", "R1");
        let s2 = ctx.store.seed_student(hostel.id, Some(semester.id), "Two", "R2");
        let repos = ctx.store.repositories();

        // Both requests saw an empty room before either wrote.
        assert_eq!(repos.allocations.count_occupied(room.id, semester.id).await.unwrap(), 0);
        let new_allocation = |student_id| NewAllocation {
            hostel_id: hostel.id,
            semester_id: semester.id,
            student_id,
            room_id: room.id,
            pricing: Pricing::actual_only(dec!(150000)),
            allocated_by: 10,
        };

        let winner = repos.allocations.insert(&new_allocation(s1.id), room.capacity).await.unwrap();
        let err = repos
            .allocations
            .insert(&new_allocation(s2.id), room.capacity)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::RoomFull { capacity: 1, occupied: 1 }));

        // The same student racing themselves gets the idempotent conflict.
        let err = repos
            .allocations
            .insert(&new_allocation(s1.id), room.capacity)
            .await
            .unwrap_err();
        assert_eq!(err.existing_id(), Some(winner.id));
        assert_eq!(ctx.store.allocations().len(), 1);
    }

    #[tokio::test]
    async fn concurrent_requests_for_the_last_place_admit_one() {
        let ctx = TestContext::new();
        let (hostel, semester) = ctx.hostel_with_active_semester("Mlimani");
        let room = ctx.store.seed_room(hostel.id, "Single", dec!(150000), 1);
        let s1 = ctx.store.seed_student(hostel.id, Some(semester.id), "One", "R1");
        let s2 = ctx.store.seed_student(hostel.id, Some(semester.id), "Two", "R2");
        let actor = ctx.custodian(hostel.id);

        let (a, b) = tokio::join!(
            ctx.allocate(&actor, s1.id, room.id),
            ctx.allocate(&actor, s2.id, room.id),
        );

        assert_eq!(usize::from(a.is_ok()) + usize::from(b.is_ok()), 1);
        assert!(matches!(a.err().or(b.err()), Some(DomainError::RoomFull { .. })));
        assert_eq!(ctx.store.allocations().len(), 1);
    }

    #[tokio::test]
    async fn scope_rules() {
        let ctx = TestContext::new();
        let (home, semester) = ctx.hostel_with_active_semester("Home");
        let (away, _) = ctx.hostel_with_active_semester("Away");
        let room = ctx.store.seed_room(home.id, "A1", dec!(100000), 1);
        let student = ctx.store.seed_student(home.id, Some(semester.id), "Amina", "REG-1");

        let outsider = ctx.custodian(away.id);
        let err = ctx.allocate(&outsider, student.id, room.id).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Forbidden);

        let err = ctx
            .services
            .allocations
            .allocate(
                &ctx.custodian(home.id),
                AllocateCommand {
                    student_id: student.id,
                    room_id: room.id,
                    hostel_id: Some(away.id),
                    display_price: None,
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Forbidden);

        let student_actor = Actor::new(99, Role::Student, Some(home.id));
        let err = ctx.allocate(&student_actor, student.id, room.id).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Forbidden);

        let admin = Actor::new(1, Role::SuperAdmin, None);
        assert!(ctx.allocate(&admin, student.id, room.id).await.is_ok());
    }

    #[tokio::test]
    async fn missing_room_student_or_semester() {
        let ctx = TestContext::new();
        let (hostel, semester) = ctx.hostel_with_active_semester("Mlimani");
        let actor = ctx.custodian(hostel.id);
        let room = ctx.store.seed_room(hostel.id, "A1", dec!(100000), 1);
        let inactive = ctx.store.seed_room(hostel.id, "Closed", dec!(100000), 1);
        ctx.store.deactivate_room(inactive.id);
        let student = ctx.store.seed_student(hostel.id, Some(semester.id), "Amina", "REG-1");
        let unregistered = ctx.store.seed_student(hostel.id, None, "Baraka", "REG-2");

        assert!(matches!(ctx.allocate(&actor, student.id, 404).await, Err(DomainError::RoomNotFound(404))));
        assert!(matches!(
            ctx.allocate(&actor, student.id, inactive.id).await,
            Err(DomainError::RoomNotFound(_))
        ));
        assert!(matches!(ctx.allocate(&actor, 404, room.id).await, Err(DomainError::StudentNotFound(404))));
        let err = ctx.allocate(&actor, unregistered.id, room.id).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }

    #[tokio::test]
    async fn display_price_rules() {
        let ctx = TestContext::new();
        let (hostel, semester) = ctx.hostel_with_active_semester("Mlimani");
        let room = ctx.store.seed_room(hostel.id, "A1", dec!(600000), 2);
        let student = ctx.store.seed_student(hostel.id, Some(semester.id), "Amina", "REG-1");
        let with_display = |display| AllocateCommand {
            student_id: student.id,
            room_id: room.id,
            hostel_id: None,
            display_price: Some(display),
        };

        let err = ctx
            .services
            .allocations
            .allocate(&ctx.custodian(hostel.id), with_display(dec!(800000)))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::MarkupDisabled));

        ctx.store.enable_feature(hostel.id, HostelFeature::CustodianPriceMarkup);

        let owner = Actor::new(7, Role::HostelOwner, Some(hostel.id));
        let err = ctx
            .services
            .allocations
            .allocate(&owner, with_display(dec!(800000)))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Forbidden);

        let err = ctx
            .services
            .allocations
            .allocate(&ctx.custodian(hostel.id), with_display(dec!(599999.98)))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::DisplayPriceBelowCost { .. }));
        assert_eq!(err.kind(), ErrorKind::Validation);

        let outcome = ctx
            .services
            .allocations
            .allocate(&ctx.custodian(hostel.id), with_display(dec!(800000)))
            .await
            .unwrap();
        assert_eq!(outcome.pricing.display, Some(dec!(400000)));
        assert_eq!(outcome.allocation.display_price_at_allocation, Some(dec!(400000)));
        assert!(ctx.email.sent()[0].2.contains("400000.00 TZS"));
    }

    #[tokio::test]
    async fn notification_failure_does_not_fail_allocation() {
        let ctx = TestContext::with_failing_channels();
        let (hostel, semester) = ctx.hostel_with_active_semester("Mlimani");
        let room = ctx.store.seed_room(hostel.id, "A1", dec!(100000), 1);
        let student = ctx.store.seed_student(hostel.id, Some(semester.id), "Amina", "REG-1");

        let outcome = ctx.allocate(&ctx.custodian(hostel.id), student.id, room.id).await.unwrap();

        assert!(!outcome.notification.email_sent);
        assert!(!outcome.notification.sms_sent);
        assert_eq!(outcome.notification.history_ids.len(), 2);
        assert_eq!(ctx.store.allocations().len(), 1);
    }

    #[tokio::test]
    async fn checkout_scope_and_missing() {
        let ctx = TestContext::new();
        let (hostel, semester) = ctx.hostel_with_active_semester("Mlimani");
        let (other, _) = ctx.hostel_with_active_semester("Other");
        let room = ctx.store.seed_room(hostel.id, "A1", dec!(100000), 1);
        let student = ctx.store.seed_student(hostel.id, Some(semester.id), "Amina", "REG-1");
        let allocation = ctx.allocate(&ctx.custodian(hostel.id), student.id, room.id).await.unwrap();

        let err = ctx
            .services
            .allocations
            .checkout(&ctx.custodian(other.id), allocation.allocation.id, None)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Forbidden);

        ctx.services
            .allocations
            .checkout(&ctx.custodian(hostel.id), allocation.allocation.id, None)
            .await
            .unwrap();
        assert!(ctx.store.allocations().is_empty());
        assert!(ctx.audit.actions().contains(&AuditAction::StudentCheckedOut));

        let err = ctx
            .services
            .allocations
            .checkout(&ctx.custodian(hostel.id), allocation.allocation.id, None)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }
}
