//! RBAC data models: roles, actions, subject tags and the acting user.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ConfigurationError;

// ═══════════════════════════════════════════════════════════════════════════════
// Identifiers
// ═══════════════════════════════════════════════════════════════════════════════

/// Strongly-typed user identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(pub String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for UserId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for UserId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Role
// ═══════════════════════════════════════════════════════════════════════════════

/// The role a user holds through an organization membership.
///
/// Roles carry no privilege ordering; what a role may do is entirely the
/// policy registered for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Admin,
    Member,
    Billing,
}

impl Role {
    pub const COUNT: usize = 3;

    /// Every declared role, in declaration order.
    pub const ALL: [Role; Self::COUNT] = [Role::Admin, Role::Member, Role::Billing];

    /// Wire name of the role.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "ADMIN",
            Self::Member => "MEMBER",
            Self::Billing => "BILLING",
        }
    }

    /// Human-readable description of the built-in policy.
    pub fn description(&self) -> &'static str {
        match self {
            Self::Admin => "Manages everything; only the owner may update or transfer the organization",
            Self::Member => "Reads users, creates projects, edits and deletes own projects",
            Self::Billing => "Manages billing only",
        }
    }

    pub(crate) fn index(&self) -> usize {
        match self {
            Self::Admin => 0,
            Self::Member => 1,
            Self::Billing => 2,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|role| role.as_str() == s)
            .ok_or_else(|| ConfigurationError::UnknownRole(s.to_string()))
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Action
// ═══════════════════════════════════════════════════════════════════════════════

/// A verb a user attempts on a subject.
///
/// `Manage` in a rule is a wildcard matching every action. Queried directly,
/// it only matches rules that themselves say `manage`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Manage,
    Create,
    Get,
    Update,
    Delete,
    TransferOwnership,
    Export,
}

impl Action {
    /// Every declared action, in declaration order.
    pub const ALL: [Action; 7] = [
        Action::Manage,
        Action::Create,
        Action::Get,
        Action::Update,
        Action::Delete,
        Action::TransferOwnership,
        Action::Export,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Manage => "manage",
            Self::Create => "create",
            Self::Get => "get",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::TransferOwnership => "transfer_ownership",
            Self::Export => "export",
        }
    }

    /// Whether a rule naming `self` applies to a request for `requested`.
    pub fn covers(&self, requested: Action) -> bool {
        *self == Self::Manage || *self == requested
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Action {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|action| action.as_str() == s)
            .ok_or_else(|| ConfigurationError::UnknownAction(s.to_string()))
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Subject Kind
// ═══════════════════════════════════════════════════════════════════════════════

/// The closed set of subject type tags.
///
/// `All` in a rule is a wildcard matching every subject tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SubjectKind {
    #[serde(rename = "all")]
    All,
    User,
    Project,
    Organization,
    Invites,
    Billing,
}

impl SubjectKind {
    /// Every declared subject tag, in declaration order.
    pub const ALL: [SubjectKind; 6] = [
        SubjectKind::All,
        SubjectKind::User,
        SubjectKind::Project,
        SubjectKind::Organization,
        SubjectKind::Invites,
        SubjectKind::Billing,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::All => "all",
            Self::User => "User",
            Self::Project => "Project",
            Self::Organization => "Organization",
            Self::Invites => "Invites",
            Self::Billing => "Billing",
        }
    }

    /// Actions that are meaningful for this subject.
    pub fn supported_actions(&self) -> &'static [Action] {
        use Action::*;
        match self {
            Self::All => &Action::ALL,
            Self::User => &[Manage, Get, Update, Delete],
            Self::Project => &[Manage, Create, Get, Update, Delete],
            Self::Organization => &[Manage, Create, Update, Delete, TransferOwnership],
            Self::Invites => &[Manage, Get, Create, Delete],
            Self::Billing => &[Manage, Get, Export],
        }
    }

    pub fn supports(&self, action: Action) -> bool {
        self.supported_actions().contains(&action)
    }

    /// Whether a rule naming `self` applies to a request on `requested`.
    pub fn covers(&self, requested: SubjectKind) -> bool {
        *self == Self::All || *self == requested
    }
}

impl fmt::Display for SubjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SubjectKind {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| ConfigurationError::UnknownSubject(s.to_string()))
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// User Context
// ═══════════════════════════════════════════════════════════════════════════════

/// The authenticated user an ability is bound to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserContext {
    pub user_id: UserId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl UserContext {
    pub fn new(user_id: impl Into<UserId>) -> Self {
        Self {
            user_id: user_id.into(),
            email: None,
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// The part of the email after the last `@`, if any.
    pub fn email_domain(&self) -> Option<&str> {
        self.email
            .as_deref()
            .and_then(|email| email.rsplit_once('@'))
            .map(|(_, domain)| domain)
            .filter(|domain| !domain.is_empty())
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════════════════════════
