//! Instance-level conditions that narrow a type-level rule.
//!
//! A condition is a pure predicate over `(resource, user)`. It must be
//! deterministic and total over every resource, returning `false` for
//! subjects it does not understand.

use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

use super::models::UserContext;
use super::subject::Resource;
use crate::error::ConfigurationError;

type Predicate = dyn Fn(&Resource, &UserContext) -> bool + Send + Sync;

/// A named predicate attached to a rule.
#[derive(Clone)]
pub struct Condition {
    name: Cow<'static, str>,
    predicate: Arc<Predicate>,
}

impl Condition {
    pub const OWNED_BY_ACTOR: &'static str = "owned_by_actor";
    pub const DOMAIN_MEMBER: &'static str = "domain_member";

    /// Wrap an arbitrary predicate.
    pub fn new<F>(name: impl Into<Cow<'static, str>>, predicate: F) -> Self
    where
        F: Fn(&Resource, &UserContext) -> bool + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            predicate: Arc::new(predicate),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn evaluate(&self, resource: &Resource, user: &UserContext) -> bool {
        (self.predicate)(resource, user)
    }

    /// The acting user owns (or authored) the resource.
    pub fn owned_by_actor() -> Self {
        Self::new(Self::OWNED_BY_ACTOR, |resource, user| match resource {
            Resource::Project(project) => project.owner_id == user.user_id,
            Resource::Organization(org) => org.owner_id == user.user_id,
            Resource::Invite(invite) => invite.author_id.as_ref() == Some(&user.user_id),
            Resource::User(_) | Resource::Billing(_) => false,
        })
    }

    /// The organization auto-attaches users from the acting user's email domain.
    pub fn domain_member() -> Self {
        Self::new(Self::DOMAIN_MEMBER, |resource, user| match resource {
            Resource::Organization(org) => {
                org.should_attach_users_by_domain
                    && matches!(
                        (org.domain.as_deref(), user.email_domain()),
                        (Some(org_domain), Some(email_domain))
                            if org_domain.eq_ignore_ascii_case(email_domain)
                    )
            }
            _ => false,
        })
    }

    /// Look up one of the standard conditions by name.
    pub fn by_name(name: &str) -> Result<Self, ConfigurationError> {
        match name {
            Self::OWNED_BY_ACTOR => Ok(Self::owned_by_actor()),
            Self::DOMAIN_MEMBER => Ok(Self::domain_member()),
            other => Err(ConfigurationError::UnknownCondition(other.to_string())),
        }
    }
}

impl fmt::Debug for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Condition").field(&self.name).finish()
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════════════════════════
