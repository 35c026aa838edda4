//! Caller identity, roles, and capabilities

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use hostel_shared::EntityId;

use crate::error::DomainError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    SuperAdmin,
    HostelOwner,
    Custodian,
    Student,
}

/// Things an actor may do. Granted per role by [`Role::capabilities`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    ManageAllocations,
    RecordPayments,
    ViewFinance,
    ManageExpenses,
    ManageSemesters,
    ManageStudents,
    ManageCheckIns,
    SetDisplayPrice,
    CrossTenant,
}

impl Capability {
    pub fn describe(&self) -> &'static str {
        match self {
            Self::ManageAllocations => "manage room allocations",
            Self::RecordPayments => "record payments",
            Self::ViewFinance => "view finance reports",
            Self::ManageExpenses => "manage expenses",
            Self::ManageSemesters => "manage semesters",
            Self::ManageStudents => "register students",
            Self::ManageCheckIns => "manage check-ins",
            Self::SetDisplayPrice => "set a display price",
            Self::CrossTenant => "act across hostels",
        }
    }
}

const STAFF: &[Capability] = &[
    Capability::ManageAllocations,
    Capability::RecordPayments,
    Capability::ViewFinance,
    Capability::ManageExpenses,
    Capability::ManageSemesters,
    Capability::ManageStudents,
    Capability::ManageCheckIns,
];

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SuperAdmin => "SUPER_ADMIN",
            Self::HostelOwner => "HOSTEL_OWNER",
            Self::Custodian => "CUSTODIAN",
            Self::Student => "STUDENT",
        }
    }

    pub fn capabilities(&self) -> &'static [Capability] {
        match self {
            Self::SuperAdmin => &[
                Capability::ManageAllocations,
                Capability::RecordPayments,
                Capability::ViewFinance,
                Capability::ManageExpenses,
                Capability::ManageSemesters,
                Capability::ManageStudents,
                Capability::ManageCheckIns,
                Capability::CrossTenant,
            ],
            Self::HostelOwner => STAFF,
            Self::Custodian => &[
                Capability::ManageAllocations,
                Capability::RecordPayments,
                Capability::ViewFinance,
                Capability::ManageExpenses,
                Capability::ManageSemesters,
                Capability::ManageStudents,
                Capability::ManageCheckIns,
                Capability::SetDisplayPrice,
            ],
            Self::Student => &[],
        }
    }

    pub fn has(&self, capability: Capability) -> bool {
        self.capabilities().contains(&capability)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = DomainError;

    /// Accepts `SUPER_ADMIN`, `super-admin`, `Super Admin` and similar spellings.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .map(|c| c.to_ascii_lowercase())
            .collect();
        match normalized.as_str() {
            "superadmin" => Ok(Self::SuperAdmin),
            "hostelowner" | "owner" => Ok(Self::HostelOwner),
            "custodian" => Ok(Self::Custodian),
            "student" => Ok(Self::Student),
            _ => Err(DomainError::ValidationError(format!("Unknown role: {}", s))),
        }
    }
}

/// Authenticated caller of a core operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub user_id: EntityId,
    pub role: Role,
    /// `None` only for Super-Admin accounts.
    pub hostel_id: Option<EntityId>,
}

impl Actor {
    pub fn new(user_id: EntityId, role: Role, hostel_id: Option<EntityId>) -> Self {
        Self { user_id, role, hostel_id }
    }

    pub fn can(&self, capability: Capability) -> bool {
        self.role.has(capability)
    }

    pub fn require(&self, capability: Capability) -> Result<(), DomainError> {
        if self.can(capability) {
            Ok(())
        } else {
            Err(DomainError::MissingCapability {
                role: self.role.as_str(),
                action: capability.describe(),
            })
        }
    }

    /// Effective hostel scope. Cross-tenant actors get whatever they asked
    /// for (`None` meaning every hostel); everyone else is pinned to their own
    /// hostel.
    pub fn resolve_hostel(&self, requested: Option<EntityId>) -> Result<Option<EntityId>, DomainError> {
        if self.can(Capability::CrossTenant) {
            return Ok(requested);
        }
        let own = self.hostel_id.ok_or(DomainError::MissingCapability {
            role: self.role.as_str(),
            action: "act without a hostel assignment",
        })?;
        match requested {
            Some(h) if h != own => Err(DomainError::ScopeMismatch { entity: "Requested hostel" }),
            _ => Ok(Some(own)),
        }
    }

    /// Like [`Actor::resolve_hostel`] but a concrete hostel is mandatory.
    pub fn require_hostel(&self, requested: Option<EntityId>) -> Result<EntityId, DomainError> {
        self.resolve_hostel(requested)?
            .ok_or_else(|| DomainError::ValidationError("hostelId is required".to_string()))
    }

    /// Fails when `entity_hostel` lies outside `scope`. A `None` scope covers
    /// every hostel.
    pub fn ensure_in_scope(
        scope: Option<EntityId>,
        entity_hostel: EntityId,
        entity: &'static str,
    ) -> Result<(), DomainError> {
        match scope {
            Some(h) if h != entity_hostel => Err(DomainError::ScopeMismatch { entity }),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_role_spellings() {
        assert_eq!("SUPER_ADMIN".parse::<Role>().unwrap(), Role::SuperAdmin);
        assert_eq!("hostel-owner".parse::<Role>().unwrap(), Role::HostelOwner);
        assert_eq!("Custodian".parse::<Role>().unwrap(), Role::Custodian);
        assert!("janitor".parse::<Role>().is_err());
    }

    #[test]
    fn only_custodian_sets_display_price() {
        assert!(Role::Custodian.has(Capability::SetDisplayPrice));
        assert!(!Role::HostelOwner.has(Capability::SetDisplayPrice));
        assert!(!Role::SuperAdmin.has(Capability::SetDisplayPrice));
    }

    #[test]
    fn students_cannot_touch_finance() {
        let actor = Actor::new(9, Role::Student, Some(1));
        let err = actor.require(Capability::RecordPayments).unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::Forbidden);
    }

    #[test]
    fn super_admin_targets_any_hostel() {
        let actor = Actor::new(1, Role::SuperAdmin, None);
        assert_eq!(actor.resolve_hostel(Some(42)).unwrap(), Some(42));
        assert_eq!(actor.resolve_hostel(None).unwrap(), None);
    }

    #[test]
    fn staff_are_pinned_to_their_hostel() {
        let actor = Actor::new(2, Role::Custodian, Some(5));
        assert_eq!(actor.resolve_hostel(None).unwrap(), Some(5));
        assert_eq!(actor.resolve_hostel(Some(5)).unwrap(), Some(5));
        let err = actor.resolve_hostel(Some(6)).unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::Forbidden);
    }

    #[test]
    fn staff_without_hostel_are_rejected() {
        let actor = Actor::new(3, Role::HostelOwner, None);
        assert_eq!(actor.resolve_hostel(None).unwrap_err().kind(), crate::ErrorKind::Forbidden);
    }

    #[test]
    fn scope_check_allows_unscoped_callers() {
        assert!(Actor::ensure_in_scope(None, 3, "Room").is_ok());
        assert!(Actor::ensure_in_scope(Some(3), 3, "Room").is_ok());
        assert!(Actor::ensure_in_scope(Some(4), 3, "Room").is_err());
    }
}
