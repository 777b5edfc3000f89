//! Caller identity, tenancy, and role authorisation.
//!
//! Every boundary operation resolves its bearer credential to an
//! [`AuthContext`] before touching the store. Services receive the context as
//! a value and enforce tenancy and role rules themselves; the boundary layer
//! only translates rejections into transport status codes.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

/// Unique identifier for a platform user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(Uuid);

impl UserId {
    /// Creates a new random user identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a user identifier from an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the wrapped UUID.
    #[must_use]
    pub const fn into_inner(self) -> Uuid {
        self.0
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a tenant organisation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TenantId(Uuid);

impl TenantId {
    /// Creates a new random tenant identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a tenant identifier from an existing UUID.
    #[must_use]
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Returns the wrapped UUID.
    #[must_use]
    pub const fn into_inner(self) -> Uuid {
        self.0
    }
}

impl Default for TenantId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TenantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Role attached to an authenticated caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Field user executing tasks at points of sale.
    Field,
    /// Supervisor reviewing completed tasks.
    Supervisor,
    /// Director with administrative authority over a tenant.
    Director,
    /// Non-interactive system credential (schedulers, maintenance jobs).
    System,
}

impl Role {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Field => "field",
            Self::Supervisor => "supervisor",
            Self::Director => "director",
            Self::System => "system",
        }
    }

    /// Returns `true` when the role may cancel task instances.
    #[must_use]
    pub const fn may_cancel_tasks(self) -> bool {
        matches!(self, Self::Director | Self::System)
    }

    /// Returns `true` when the role may review completed tasks.
    #[must_use]
    pub const fn may_review_tasks(self) -> bool {
        matches!(self, Self::Supervisor | Self::Director | Self::System)
    }

    /// Returns `true` when the role may sweep missed tasks across every
    /// tenant rather than only its own.
    #[must_use]
    pub const fn sweeps_all_tenants(self) -> bool {
        matches!(self, Self::System)
    }

    /// Returns `true` when the role bypasses tenant-match checks.
    #[must_use]
    pub const fn is_system(self) -> bool {
        matches!(self, Self::System)
    }
}

impl TryFrom<&str> for Role {
    type Error = ParseRoleError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "field" => Ok(Self::Field),
            "supervisor" => Ok(Self::Supervisor),
            "director" => Ok(Self::Director),
            "system" => Ok(Self::System),
            _ => Err(ParseRoleError(value.to_owned())),
        }
    }
}

/// Error returned while parsing roles from persistence or credentials.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown role: {0}")]
pub struct ParseRoleError(pub String);

/// Resolved identity of an authenticated caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthContext {
    user: UserId,
    tenant: TenantId,
    role: Role,
}

impl AuthContext {
    /// Creates an authenticated caller context.
    #[must_use]
    pub const fn new(user: UserId, tenant: TenantId, role: Role) -> Self {
        Self { user, tenant, role }
    }

    /// Returns the caller's user identifier.
    #[must_use]
    pub const fn user(&self) -> UserId {
        self.user
    }

    /// Returns the caller's tenant.
    #[must_use]
    pub const fn tenant(&self) -> TenantId {
        self.tenant
    }

    /// Returns the caller's role.
    #[must_use]
    pub const fn role(&self) -> Role {
        self.role
    }

    /// Returns `true` when the caller may operate on records owned by
    /// `tenant`. System credentials are tenant-unscoped.
    #[must_use]
    pub fn may_access_tenant(&self, tenant: TenantId) -> bool {
        self.role.is_system() || self.tenant == tenant
    }
}
