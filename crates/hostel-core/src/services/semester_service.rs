//! Semester lifecycle: create inactive, activate one per hostel

use std::sync::Arc;

use chrono::NaiveDate;
use serde_json::json;
use tracing::{info, warn};

use hostel_shared::EntityId;

use crate::domain::{Actor, AuditAction, AuditEntry, Capability, NewSemester, Semester};
use crate::error::DomainError;
use crate::repositories::{AuditRecorder, Repositories};

#[derive(Debug, Clone)]
pub struct CreateSemesterCommand {
    pub hostel_id: Option<EntityId>,
    pub name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

pub struct SemesterService {
    repos: Repositories,
    audit: Arc<dyn AuditRecorder>,
}

impl SemesterService {
    pub fn new(repos: Repositories, audit: Arc<dyn AuditRecorder>) -> Self {
        Self { repos, audit }
    }

    /// New semesters start inactive.
    pub async fn create(&self, actor: &Actor, cmd: CreateSemesterCommand) -> Result<Semester, DomainError> {
        actor.require(Capability::ManageSemesters)?;
        let hostel_id = actor.require_hostel(cmd.hostel_id)?;

        let new_semester = NewSemester {
            hostel_id,
            name: cmd.name.trim().to_string(),
            start_date: cmd.start_date,
            end_date: cmd.end_date,
        };
        new_semester.validate()?;

        if self.repos.hostels.find_by_id(hostel_id).await?.is_none() {
            return Err(DomainError::HostelNotFound(hostel_id));
        }

        let semester = self.repos.semesters.create(&new_semester).await?;
        info!("Semester {} '{}' created for hostel {}", semester.id, semester.name, hostel_id);

        self.audit.record(
            AuditEntry::new(AuditAction::SemesterCreated, actor.user_id, "semester", semester.id)
                .hostel(hostel_id)
                .details(json!({
                    "name": semester.name,
                    "startDate": semester.start_date,
                    "endDate": semester.end_date,
                })),
        );
        Ok(semester)
    }

    /// Makes `semester_id` the hostel's only active semester.
    pub async fn activate(&self, actor: &Actor, semester_id: EntityId) -> Result<Semester, DomainError> {
        actor.require(Capability::ManageSemesters)?;
        let scope = actor.resolve_hostel(None)?;

        let semester = self
            .repos
            .semesters
            .find_by_id(semester_id)
            .await?
            .ok_or(DomainError::SemesterNotFound(semester_id))?;
        Actor::ensure_in_scope(scope, semester.hostel_id, "Semester")?;

        if semester.is_active {
            warn!("Semester {} is already active", semester_id);
            return Err(DomainError::SemesterAlreadyActive);
        }

        let activated = self.repos.semesters.activate(semester.id).await?;
        info!("Semester {} activated for hostel {}", activated.id, activated.hostel_id);

        self.audit.record(
            AuditEntry::new(AuditAction::SemesterActivated, actor.user_id, "semester", activated.id)
                .hostel(activated.hostel_id),
        );
        Ok(activated)
    }

    pub async fn active(&self, actor: &Actor, hostel_id: Option<EntityId>) -> Result<Option<Semester>, DomainError> {
        actor.require(Capability::ManageSemesters)?;
        let hostel_id = actor.require_hostel(hostel_id)?;
        self.repos.semesters.find_active(hostel_id).await
    }

    /// All semesters of the scoped hostel; every hostel for a cross-tenant
    /// caller who names none.
    pub async fn list(&self, actor: &Actor, hostel_id: Option<EntityId>) -> Result<Vec<Semester>, DomainError> {
        actor.require(Capability::ManageSemesters)?;
        let scope = actor.resolve_hostel(hostel_id)?;
        self.repos.semesters.list(scope).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ErrorKind, Role};
    use crate::testing::TestContext;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn command(name: &str) -> CreateSemesterCommand {
        CreateSemesterCommand {
            hostel_id: None,
            name: name.to_string(),
            start_date: date(2026, 10, 1),
            end_date: date(2027, 2, 28),
        }
    }

    #[tokio::test]
    async fn created_inactive_then_activation_is_exclusive() {
        let ctx = TestContext::new();
        let hostel = ctx.store.seed_hostel("Mlimani");
        let owner = Actor::new(5, Role::HostelOwner, Some(hostel.id));
        let service = &ctx.services.semesters;

        let first = service.create(&owner, command("Semester I")).await.unwrap();
        let second = service.create(&owner, command("Semester II")).await.unwrap();
        assert!(!first.is_active);
        assert!(service.active(&owner, None).await.unwrap().is_none());

        service.activate(&owner, first.id).await.unwrap();
        service.activate(&owner, second.id).await.unwrap();

        let active = service.active(&owner, None).await.unwrap().unwrap();
        assert_eq!(active.id, second.id);
        let listed = service.list(&owner, None).await.unwrap();
        assert_eq!(listed.iter().filter(|s| s.is_active).count(), 1);

        let err = service.activate(&owner, second.id).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conflict);
        assert_eq!(
            ctx.audit.actions(),
            vec![
                AuditAction::SemesterCreated,
                AuditAction::SemesterCreated,
                AuditAction::SemesterActivated,
                AuditAction::SemesterActivated,
            ]
        );
    }

    #[tokio::test]
    async fn rejects_bad_dates_and_missing_hostel() {
        let ctx = TestContext::new();
        let hostel = ctx.store.seed_hostel("Mlimani");
        let owner = Actor::new(5, Role::HostelOwner, Some(hostel.id));

        let mut backwards = command("Backwards");
        backwards.end_date = date(2026, 9, 1);
        let err = ctx.services.semesters.create(&owner, backwards).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);

        let admin = Actor::new(1, Role::SuperAdmin, None);
        let err = ctx.services.semesters.create(&admin, command("Nowhere")).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);

        let mut unknown = command("Unknown");
        unknown.hostel_id = Some(4242);
        let err = ctx.services.semesters.create(&admin, unknown).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn cannot_activate_another_hostels_semester() {
        let ctx = TestContext::new();
        let (_, theirs) = ctx.hostel_with_active_semester("Theirs");
        let mine = ctx.store.seed_hostel("Mine");
        let other = ctx.store.seed_semester(theirs.hostel_id, "Later", false);

        let err = ctx
            .services
            .semesters
            .activate(&ctx.custodian(mine.id), other.id)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Forbidden);
    }
}
