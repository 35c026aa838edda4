//! Student registration

use std::sync::Arc;

use serde_json::json;
use tracing::{info, warn};

use hostel_shared::utils::mask_email;
use hostel_shared::EntityId;

use super::support::resolve_write_semester;
use crate::domain::{Actor, AuditAction, AuditEntry, Capability, NewStudent, Student};
use crate::error::DomainError;
use crate::repositories::{AuditRecorder, Repositories};

#[derive(Debug, Clone, Default)]
pub struct RegisterStudentCommand {
    pub hostel_id: Option<EntityId>,
    /// Defaults to the hostel's active semester.
    pub semester_id: Option<EntityId>,
    pub full_name: String,
    pub registration_number: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub gender: Option<String>,
}

pub struct StudentService {
    repos: Repositories,
    audit: Arc<dyn AuditRecorder>,
}

impl StudentService {
    pub fn new(repos: Repositories, audit: Arc<dyn AuditRecorder>) -> Self {
        Self { repos, audit }
    }

    /// A registration number is unique within a semester; the same number
    /// may register again in a later semester.
    pub async fn register(&self, actor: &Actor, cmd: RegisterStudentCommand) -> Result<Student, DomainError> {
        actor.require(Capability::ManageStudents)?;
        let hostel_id = actor.require_hostel(cmd.hostel_id)?;
        let semester = resolve_write_semester(self.repos.semesters.as_ref(), hostel_id, cmd.semester_id).await?;

        let new_student = NewStudent {
            hostel_id,
            semester_id: semester.id,
            full_name: cmd.full_name.trim().to_string(),
            registration_number: cmd.registration_number.trim().to_string(),
            phone: cmd.phone.filter(|p| !p.trim().is_empty()),
            email: cmd.email.filter(|e| !e.trim().is_empty()),
            gender: cmd.gender,
        };
        new_student.validate()?;

        if self
            .repos
            .students
            .find_by_registration(&new_student.registration_number, semester.id)
            .await?
            .is_some()
        {
            warn!(
                "Registration failed: {} already registered for semester {}",
                new_student.registration_number, semester.id
            );
            return Err(DomainError::StudentAlreadyRegistered {
                registration_number: new_student.registration_number,
            });
        }

        let student = self.repos.students.create(&new_student).await?;
        info!(
            "Student {} registered for semester {} (email: {})",
            student.id,
            semester.id,
            student.email.as_deref().map(mask_email).unwrap_or_default()
        );

        self.audit.record(
            AuditEntry::new(AuditAction::StudentRegistered, actor.user_id, "student", student.id)
                .hostel(hostel_id)
                .details(json!({
                    "registrationNumber": student.registration_number,
                    "semesterId": semester.id,
                })),
        );
        Ok(student)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;
    use crate::testing::TestContext;

    fn command(reg: &str) -> RegisterStudentCommand {
        RegisterStudentCommand {
            full_name: "Amina Juma".to_string(),
            registration_number: reg.to_string(),
            email: Some("amina@example.com".to_string()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn registers_into_active_semester() {
        let ctx = TestContext::new();
        let (hostel, semester) = ctx.hostel_with_active_semester("Mlimani");

        let student = ctx
            .services
            .students
            .register(&ctx.custodian(hostel.id), command("REG-1"))
            .await
            .unwrap();

        assert_eq!(student.semester_id, Some(semester.id));
        assert_eq!(student.hostel_id, hostel.id);
        assert_eq!(ctx.audit.actions(), vec![AuditAction::StudentRegistered]);
    }

    #[tokio::test]
    async fn duplicate_number_conflicts_only_within_semester() {
        let ctx = TestContext::new();
        let (hostel, _) = ctx.hostel_with_active_semester("Mlimani");
        let next = ctx.store.seed_semester(hostel.id, "Next", false);
        let actor = ctx.custodian(hostel.id);

        ctx.services.students.register(&actor, command("REG-1")).await.unwrap();
        let err = ctx.services.students.register(&actor, command("REG-1")).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conflict);

        let mut later = command("REG-1");
        later.semester_id = Some(next.id);
        assert!(ctx.services.students.register(&actor, later).await.is_ok());
    }

    #[tokio::test]
    async fn needs_a_semester() {
        let ctx = TestContext::new();
        let hostel = ctx.store.seed_hostel("Empty");

        let err = ctx
            .services
            .students
            .register(&ctx.custodian(hostel.id), command("REG-1"))
            .await
            .unwrap_err();

        assert!(matches!(err, DomainError::NoActiveSemester(id) if id == hostel.id));
        assert_eq!(err.kind(), ErrorKind::Validation);
    }
}
