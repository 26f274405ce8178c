//! The tagged union over the three separately stored principal kinds.
//!
//! Admins, staff (HR or faculty), and students live in disjoint stores but
//! share one login surface. Everything downstream of the resolver matches on
//! [`Principal`] rather than probing the stores again.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier for any authenticate-able identity, unique within its kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PrincipalId(pub u64);

impl fmt::Display for PrincipalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Which of the three identity stores a principal lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Kind {
    Admin,
    Student,
    Staff,
}

impl Kind {
    pub fn label(self) -> &'static str {
        match self {
            Kind::Admin => "admin",
            Kind::Student => "student",
            Kind::Staff => "staff",
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Access-control label consulted by the authorization policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Admin,
    Hr,
    Faculty,
    Student,
}

impl Role {
    pub fn label(self) -> &'static str {
        match self {
            Role::Admin => "ADMIN",
            Role::Hr => "HR",
            Role::Faculty => "FACULTY",
            Role::Student => "STUDENT",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Staff accounts carry one of two roles; admins and students are implied by
/// their store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StaffRole {
    Hr,
    Faculty,
}

impl StaffRole {
    pub fn as_role(self) -> Role {
        match self {
            StaffRole::Hr => Role::Hr,
            StaffRole::Faculty => Role::Faculty,
        }
    }
}

/// Administrator account record.
#[derive(Debug, Clone, PartialEq)]
pub struct AdminRecord {
    pub id: PrincipalId,
    pub first_name: String,
    pub last_name: Option<String>,
    pub email: String,
    pub password_hash: String,
    pub mobile_no: Option<String>,
    pub active: bool,
}

/// HR or faculty account record.
#[derive(Debug, Clone, PartialEq)]
pub struct StaffRecord {
    pub id: PrincipalId,
    pub first_name: String,
    pub last_name: Option<String>,
    pub email: String,
    pub password_hash: String,
    pub mobile_no: Option<String>,
    pub role: StaffRole,
    pub active: bool,
}

/// Student account record. Profile fields are opaque to the core.
#[derive(Debug, Clone, PartialEq)]
pub struct StudentRecord {
    pub id: PrincipalId,
    pub first_name: String,
    pub last_name: Option<String>,
    pub email: String,
    pub password_hash: String,
    pub mobile_no: Option<String>,
    pub location: Option<String>,
    pub degree: Option<String>,
    pub active: bool,
}

/// A resolved identity, tagged with the store it came from.
#[derive(Debug, Clone, PartialEq)]
pub enum Principal {
    Admin(AdminRecord),
    Staff(StaffRecord),
    Student(StudentRecord),
}

impl Principal {
    pub fn id(&self) -> PrincipalId {
        match self {
            Principal::Admin(record) => record.id,
            Principal::Staff(record) => record.id,
            Principal::Student(record) => record.id,
        }
    }

    pub fn kind(&self) -> Kind {
        match self {
            Principal::Admin(_) => Kind::Admin,
            Principal::Staff(_) => Kind::Staff,
            Principal::Student(_) => Kind::Student,
        }
    }

    pub fn role(&self) -> Role {
        match self {
            Principal::Admin(_) => Role::Admin,
            Principal::Staff(record) => record.role.as_role(),
            Principal::Student(_) => Role::Student,
        }
    }

    pub fn email(&self) -> &str {
        match self {
            Principal::Admin(record) => &record.email,
            Principal::Staff(record) => &record.email,
            Principal::Student(record) => &record.email,
        }
    }

    pub fn password_hash(&self) -> &str {
        match self {
            Principal::Admin(record) => &record.password_hash,
            Principal::Staff(record) => &record.password_hash,
            Principal::Student(record) => &record.password_hash,
        }
    }

    pub fn active(&self) -> bool {
        match self {
            Principal::Admin(record) => record.active,
            Principal::Staff(record) => record.active,
            Principal::Student(record) => record.active,
        }
    }

    pub fn first_name(&self) -> &str {
        match self {
            Principal::Admin(record) => &record.first_name,
            Principal::Staff(record) => &record.first_name,
            Principal::Student(record) => &record.first_name,
        }
    }

    pub fn last_name(&self) -> Option<&str> {
        match self {
            Principal::Admin(record) => record.last_name.as_deref(),
            Principal::Staff(record) => record.last_name.as_deref(),
            Principal::Student(record) => record.last_name.as_deref(),
        }
    }
}

/// Sanitized principal representation for API responses; never carries the
/// password hash.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PrincipalView {
    pub id: PrincipalId,
    pub first_name: String,
    pub last_name: Option<String>,
    pub email: String,
    pub kind: Kind,
    pub role: Role,
}

impl From<&Principal> for PrincipalView {
    fn from(principal: &Principal) -> Self {
        Self {
            id: principal.id(),
            first_name: principal.first_name().to_string(),
            last_name: principal.last_name().map(str::to_string),
            email: principal.email().to_string(),
            kind: principal.kind(),
            role: principal.role(),
        }
    }
}
