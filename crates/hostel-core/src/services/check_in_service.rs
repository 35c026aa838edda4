//! Physical check-in and check-out
//!
//! Tracked separately from allocations. A closed check-in frees the
//! student's place for capacity counting without deleting the allocation.

use std::sync::Arc;

use chrono::Utc;
use serde_json::json;
use tracing::{info, warn};

use hostel_shared::EntityId;

use crate::domain::{Actor, AuditAction, AuditEntry, Capability, CheckIn, NewCheckIn};
use crate::error::DomainError;
use crate::repositories::{AuditRecorder, Repositories};

pub struct CheckInService {
    repos: Repositories,
    audit: Arc<dyn AuditRecorder>,
}

impl CheckInService {
    pub fn new(repos: Repositories, audit: Arc<dyn AuditRecorder>) -> Self {
        Self { repos, audit }
    }

    pub async fn check_in(
        &self,
        actor: &Actor,
        student_id: EntityId,
        hostel_id: Option<EntityId>,
    ) -> Result<CheckIn, DomainError> {
        actor.require(Capability::ManageCheckIns)?;
        let scope = actor.resolve_hostel(hostel_id)?;

        // 1. Student and semester
        let student = self
            .repos
            .students
            .find_by_id(student_id)
            .await?
            .ok_or(DomainError::StudentNotFound(student_id))?;
        Actor::ensure_in_scope(scope, student.hostel_id, "Student")?;
        let semester_id = student.semester_id.ok_or_else(|| {
            DomainError::ValidationError(format!("Student {} is not registered for a semester", student.id))
        })?;

        // 2. Must hold a room
        if self
            .repos
            .allocations
            .find_for_student(student.id, semester_id)
            .await?
            .is_none()
        {
            warn!("Check-in refused: student {} has no allocation", student.id);
            return Err(DomainError::ValidationError(
                "Student has no room allocation for the semester".to_string(),
            ));
        }

        // 3. One open check-in at a time
        if let Some(open) = self.repos.check_ins.find_open(student.id, semester_id).await? {
            return Err(DomainError::AlreadyCheckedIn { check_in_id: open.id });
        }

        let check_in = self
            .repos
            .check_ins
            .create(&NewCheckIn {
                student_id: student.id,
                hostel_id: student.hostel_id,
                semester_id,
                checked_in_by: actor.user_id,
            })
            .await?;
        info!("Student {} checked in ({})", student.id, check_in.id);

        self.audit.record(
            AuditEntry::new(AuditAction::StudentCheckedIn, actor.user_id, "check_in", check_in.id)
                .hostel(check_in.hostel_id)
                .details(json!({ "studentId": student.id, "semesterId": semester_id })),
        );
        Ok(check_in)
    }

    pub async fn check_out(&self, actor: &Actor, check_in_id: EntityId) -> Result<CheckIn, DomainError> {
        actor.require(Capability::ManageCheckIns)?;
        let scope = actor.resolve_hostel(None)?;

        let check_in = self
            .repos
            .check_ins
            .find_by_id(check_in_id)
            .await?
            .ok_or(DomainError::CheckInNotFound(check_in_id))?;
        Actor::ensure_in_scope(scope, check_in.hostel_id, "Check-in")?;
        if !check_in.is_open() {
            return Err(DomainError::AlreadyCheckedOut(check_in.id));
        }

        let closed = self.repos.check_ins.close(check_in.id, actor.user_id, Utc::now()).await?;
        info!("Student {} checked out ({})", closed.student_id, closed.id);

        self.audit.record(
            AuditEntry::new(AuditAction::CheckInClosed, actor.user_id, "check_in", closed.id)
                .hostel(closed.hostel_id)
                .details(json!({ "studentId": closed.student_id })),
        );
        Ok(closed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;
    use crate::testing::TestContext;
    use rust_decimal_macros::dec;

    #[tokio::test]
    async fn one_open_check_in_per_semester() {
        let ctx = TestContext::new();
        let (actor, allocation) = ctx.allocated(dec!(100000), 1).await;

        let first = ctx.services.check_ins.check_in(&actor, allocation.student_id, None).await.unwrap();
        assert!(first.is_open());

        let err = ctx
            .services
            .check_ins
            .check_in(&actor, allocation.student_id, None)
            .await
            .unwrap_err();
        assert_eq!(err.existing_id(), Some(first.id));

        let closed = ctx.services.check_ins.check_out(&actor, first.id).await.unwrap();
        assert_eq!(closed.checked_out_by, Some(actor.user_id));
        assert!(closed.checked_out_at.is_some());

        let err = ctx.services.check_ins.check_out(&actor, first.id).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conflict);

        assert!(ctx.services.check_ins.check_in(&actor, allocation.student_id, None).await.is_ok());
    }

    #[tokio::test]
    async fn requires_an_allocation() {
        let ctx = TestContext::new();
        let (hostel, semester) = ctx.hostel_with_active_semester("Mlimani");
        let student = ctx.store.seed_student(hostel.id, Some(semester.id), "Amina", "REG-1");

        let err = ctx
            .services
            .check_ins
            .check_in(&ctx.custodian(hostel.id), student.id, None)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);

        let err = ctx.services.check_ins.check_out(&ctx.custodian(hostel.id), 77).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }
}
