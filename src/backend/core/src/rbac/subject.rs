//! Subjects: a bare type tag, or a typed instance carrying the attributes
//! conditions inspect.
//!
//! Instances serialize with a `type` discriminant, e.g.
//! `{"type": "Project", "id": "p1", "ownerId": "u1"}`.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use super::models::{SubjectKind, UserId};
use crate::error::ConfigurationError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSubject {
    pub id: UserId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectSubject {
    pub id: String,
    pub owner_id: UserId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrganizationSubject {
    pub id: String,
    pub owner_id: UserId,
    #[serde(default)]
    pub domain: Option<String>,
    #[serde(default)]
    pub should_attach_users_by_domain: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InviteSubject {
    pub id: String,
    #[serde(default)]
    pub author_id: Option<UserId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BillingSubject {
    pub organization_id: String,
}

/// A concrete resource instance, tagged with its subject type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Resource {
    User(UserSubject),
    Project(ProjectSubject),
    Organization(OrganizationSubject),
    #[serde(rename = "Invites")]
    Invite(InviteSubject),
    Billing(BillingSubject),
}

impl Resource {
    /// The declared subject tag of this instance.
    pub fn kind(&self) -> SubjectKind {
        match self {
            Self::User(_) => SubjectKind::User,
            Self::Project(_) => SubjectKind::Project,
            Self::Organization(_) => SubjectKind::Organization,
            Self::Invite(_) => SubjectKind::Invites,
            Self::Billing(_) => SubjectKind::Billing,
        }
    }
}

/// What a check is asked about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Subject {
    /// Type-level query; conditioned rules never apply.
    Type(SubjectKind),
    /// Instance-level query; conditions are evaluated against the resource.
    Instance(Resource),
}

impl Subject {
    pub fn kind(&self) -> SubjectKind {
        match self {
            Self::Type(kind) => *kind,
            Self::Instance(resource) => resource.kind(),
        }
    }

    pub fn instance(&self) -> Option<&Resource> {
        match self {
            Self::Type(_) => None,
            Self::Instance(resource) => Some(resource),
        }
    }

    /// Parse a bare subject tag such as `"Project"` or `"all"`.
    pub fn parse_tag(tag: &str) -> Result<Self, ConfigurationError> {
        tag.parse().map(Self::Type)
    }

    /// Parse a subject from JSON.
    ///
    /// A string is a bare tag; an object must declare its `type` tag and
    /// carry the attributes of that subject.
    pub fn from_json(value: &Value) -> Result<Self, ConfigurationError> {
        let object = match value {
            Value::String(tag) => return Self::parse_tag(tag),
            Value::Object(object) => object,
            other => {
                return Err(ConfigurationError::InvalidInstance {
                    subject: "unknown".to_string(),
                    reason: format!("expected a tag or an object, got {other}"),
                })
            }
        };

        let tag = match object.get("type") {
            Some(Value::String(tag)) => tag,
            Some(other) => {
                return Err(ConfigurationError::InvalidInstance {
                    subject: "unknown".to_string(),
                    reason: format!("`type` must be a subject tag string, got {other}"),
                })
            }
            None => return Err(ConfigurationError::MissingSubjectTag),
        };
        let kind: SubjectKind = tag.parse()?;
        if kind == SubjectKind::All {
            return Err(ConfigurationError::InvalidInstance {
                subject: kind.to_string(),
                reason: "the `all` tag has no instances".to_string(),
            });
        }

        serde_json::from_value(value.clone())
            .map(Self::Instance)
            .map_err(|e| ConfigurationError::InvalidInstance {
                subject: kind.to_string(),
                reason: e.to_string(),
            })
    }
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Type(kind) => write!(f, "{kind}"),
            Self::Instance(resource) => match resource {
                Resource::User(u) => write!(f, "User({})", u.id),
                Resource::Project(p) => write!(f, "Project({})", p.id),
                Resource::Organization(o) => write!(f, "Organization({})", o.id),
                Resource::Invite(i) => write!(f, "Invites({})", i.id),
                Resource::Billing(b) => write!(f, "Billing({})", b.organization_id),
            },
        }
    }
}

impl From<SubjectKind> for Subject {
    fn from(kind: SubjectKind) -> Self {
        Self::Type(kind)
    }
}

impl From<Resource> for Subject {
    fn from(resource: Resource) -> Self {
        Self::Instance(resource)
    }
}

impl From<ProjectSubject> for Subject {
    fn from(project: ProjectSubject) -> Self {
        Self::Instance(Resource::Project(project))
    }
}

impl From<OrganizationSubject> for Subject {
    fn from(organization: OrganizationSubject) -> Self {
        Self::Instance(Resource::Organization(organization))
    }
}

impl From<UserSubject> for Subject {
    fn from(user: UserSubject) -> Self {
        Self::Instance(Resource::User(user))
    }
}

impl From<InviteSubject> for Subject {
    fn from(invite: InviteSubject) -> Self {
        Self::Instance(Resource::Invite(invite))
    }
}

impl From<BillingSubject> for Subject {
    fn from(billing: BillingSubject) -> Self {
        Self::Instance(Resource::Billing(billing))
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════════════════════════
