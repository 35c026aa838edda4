//! Lookups shared by several services

use tracing::{debug, warn};

use hostel_shared::EntityId;

use crate::domain::{Actor, HostelFeature, ReportScope, Semester};
use crate::error::DomainError;
use crate::repositories::{HostelRepository, SemesterRepository};

/// Semester context for read-only reports.
///
/// An explicit semester wins and must sit inside the caller's hostel scope.
/// Otherwise the scoped hostel's active semester is used. `None` means there
/// is nothing to report, which callers turn into an empty result.
pub(crate) async fn resolve_report_scope(
    semesters: &dyn SemesterRepository,
    actor: &Actor,
    hostel_id: Option<EntityId>,
    semester_id: Option<EntityId>,
) -> Result<Option<ReportScope>, DomainError> {
    let hostel = actor.resolve_hostel(hostel_id)?;

    if let Some(id) = semester_id {
        let semester = semesters
            .find_by_id(id)
            .await?
            .ok_or(DomainError::SemesterNotFound(id))?;
        Actor::ensure_in_scope(hostel, semester.hostel_id, "Semester")?;
        return Ok(Some(ReportScope {
            hostel_id: hostel,
            semester_id: semester.id,
        }));
    }

    let Some(hostel) = hostel else {
        debug!("No hostel or semester given, report is empty");
        return Ok(None);
    };

    Ok(semesters.find_active(hostel).await?.map(|semester| ReportScope {
        hostel_id: Some(hostel),
        semester_id: semester.id,
    }))
}

/// Semester a new record is written against: the explicit one, or the
/// hostel's active semester.
pub(crate) async fn resolve_write_semester(
    semesters: &dyn SemesterRepository,
    hostel_id: EntityId,
    semester_id: Option<EntityId>,
) -> Result<Semester, DomainError> {
    match semester_id {
        Some(id) => {
            let semester = semesters
                .find_by_id(id)
                .await?
                .ok_or(DomainError::SemesterNotFound(id))?;
            Actor::ensure_in_scope(Some(hostel_id), semester.hostel_id, "Semester")?;
            Ok(semester)
        }
        None => semesters
            .find_active(hostel_id)
            .await?
            .ok_or(DomainError::NoActiveSemester(hostel_id)),
    }
}

/// Markup only changes what students are shown, so a failed lookup counts as
/// disabled.
pub(crate) async fn markup_enabled(hostels: &dyn HostelRepository, hostel_id: EntityId) -> bool {
    match hostels.feature_enabled(hostel_id, HostelFeature::CustodianPriceMarkup).await {
        Ok(enabled) => enabled,
        Err(e) => {
            warn!("Could not read markup flag for hostel {}: {}", hostel_id, e);
            false
        }
    }
}
