//! Policies and the registry that maps every role to one.
//!
//! A [`Policy`] is an ordered sequence of rules. Order is the override
//! mechanism: when several rules apply to a request, the one declared last
//! decides. The [`PolicyRegistry`] is total over [`Role`]: it holds exactly one
//! policy per declared role, fixed at construction.

use std::path::Path;
use tracing::{debug, info};

use super::ability::Ability;
use super::condition::Condition;
use super::document::PolicyDocument;
use super::models::{Action, Role, SubjectKind, UserContext};
use super::rule::{Effect, IntoActions, Rule};
use super::subject::Resource;
use crate::error::{AuthError, ConfigurationError};

// ═══════════════════════════════════════════════════════════════════════════════
// Decision
// ═══════════════════════════════════════════════════════════════════════════════

/// Result of a policy evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decision {
    /// The effect that applies.
    pub effect: Effect,
    /// Declaration index of the deciding rule; `None` for the default deny.
    pub rule: Option<usize>,
}

impl Decision {
    pub(crate) fn decided_by(index: usize, rule: &Rule) -> Self {
        Self {
            effect: rule.effect(),
            rule: Some(index),
        }
    }

    /// No rule applied.
    pub fn default_deny() -> Self {
        Self {
            effect: Effect::Deny,
            rule: None,
        }
    }

    pub fn is_allowed(&self) -> bool {
        self.effect == Effect::Grant
    }

    pub fn is_denied(&self) -> bool {
        !self.is_allowed()
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Policy
// ═══════════════════════════════════════════════════════════════════════════════

/// A role's ordered rule list. Immutable once built.
#[derive(Debug, Clone, Default)]
pub struct Policy {
    rules: Vec<Rule>,
}

impl Policy {
    pub fn builder() -> PolicyBuilder {
        PolicyBuilder::default()
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Evaluate the policy for one request.
    ///
    /// Walks the rules from last to first and stops at the first rule that
    /// matches and whose condition holds, which is the last applicable rule in
    /// declaration order. Conditions are pure, so the direction of the walk is
    /// not observable.
    pub fn decide(
        &self,
        action: Action,
        subject: SubjectKind,
        instance: Option<&Resource>,
        user: &UserContext,
    ) -> Decision {
        self.rules
            .iter()
            .enumerate()
            .rev()
            .find(|(_, rule)| rule.matches(action, subject) && rule.is_satisfied(instance, user))
            .map(|(index, rule)| Decision::decided_by(index, rule))
            .unwrap_or_else(Decision::default_deny)
    }

    /// Check every rule for unsupported or empty action lists.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        self.rules.iter().try_for_each(Rule::validate)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Builder
// ═══════════════════════════════════════════════════════════════════════════════

/// Appends rules in call order.
///
/// ```rust
/// use saas_auth::rbac::{Action, Condition, Policy, SubjectKind};
///
/// let mut builder = Policy::builder();
/// builder.can(Action::Get, SubjectKind::User);
/// builder
///     .can([Action::Update, Action::Delete], SubjectKind::Project)
///     .when(Condition::owned_by_actor());
/// let policy = builder.build();
/// assert_eq!(policy.len(), 2);
/// ```
#[derive(Debug, Default)]
pub struct PolicyBuilder {
    rules: Vec<Rule>,
}

impl PolicyBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a grant rule and return it so a condition can be attached.
    pub fn can(&mut self, actions: impl IntoActions, subject: SubjectKind) -> &mut Rule {
        self.push(Rule::grant(actions, subject))
    }

    /// Append a deny rule and return it so a condition can be attached.
    pub fn cannot(&mut self, actions: impl IntoActions, subject: SubjectKind) -> &mut Rule {
        self.push(Rule::deny(actions, subject))
    }

    pub fn push(&mut self, rule: Rule) -> &mut Rule {
        self.rules.push(rule);
        let last = self.rules.len() - 1;
        &mut self.rules[last]
    }

    pub fn build(self) -> Policy {
        Policy { rules: self.rules }
    }
}

/// The built-in policy for `role`.
pub fn define_policy_for_role(role: Role) -> Policy {
    let mut builder = PolicyBuilder::new();

    match role {
        Role::Admin => {
            builder.can(Action::Manage, SubjectKind::All);
            builder.cannot(
                [Action::TransferOwnership, Action::Update],
                SubjectKind::Organization,
            );
            builder
                .can(
                    [Action::TransferOwnership, Action::Update],
                    SubjectKind::Organization,
                )
                .when(Condition::owned_by_actor());
        }
        Role::Member => {
            builder.can(Action::Get, SubjectKind::User);
            builder.can([Action::Create, Action::Get], SubjectKind::Project);
            builder
                .can([Action::Update, Action::Delete], SubjectKind::Project)
                .when(Condition::owned_by_actor());
        }
        Role::Billing => {
            builder.can(Action::Manage, SubjectKind::Billing);
        }
    }

    builder.build()
}

// ═══════════════════════════════════════════════════════════════════════════════
// Registry
// ═══════════════════════════════════════════════════════════════════════════════

/// Process-wide policy table: one policy per role.
///
/// Built once at startup and shared by reference; abilities borrow from it.
#[derive(Debug, Clone)]
pub struct PolicyRegistry {
    policies: [Policy; Role::COUNT],
}

impl PolicyRegistry {
    /// The built-in policy table.
    pub fn standard() -> Self {
        Self::from_definitions(define_policy_for_role)
    }

    /// Build the table by calling `define` once per declared role.
    pub fn from_definitions(define: impl FnMut(Role) -> Policy) -> Self {
        let registry = Self {
            policies: Role::ALL.map(define),
        };
        for role in Role::ALL {
            debug!(role = %role, rules = registry.policy(role).len(), "Registered role policy");
        }
        registry
    }

    /// Build the table from a declarative policy document.
    pub fn from_document(document: &PolicyDocument) -> Result<Self, ConfigurationError> {
        let mut policies = document.compile()?;
        Ok(Self::from_definitions(|role| {
            policies.remove(&role).unwrap_or_default()
        }))
    }

    /// Parse a TOML policy document.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigurationError> {
        let document = PolicyDocument::from_toml_str(source)?;
        Self::from_document(&document)
    }

    /// Load a TOML policy document from disk.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, AuthError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| AuthError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let registry = Self::from_toml_str(&source)?;
        info!(path = %path.display(), "Loaded policy document");
        Ok(registry)
    }

    /// The policy registered for `role`.
    pub fn policy(&self, role: Role) -> &Policy {
        &self.policies[role.index()]
    }

    /// Iterate `(role, policy)` pairs in role declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (Role, &Policy)> {
        Role::ALL.into_iter().map(move |role| (role, self.policy(role)))
    }

    /// Bind a role's policy to an authenticated user.
    pub fn ability_for(&self, role: Role, user: UserContext) -> Ability<'_> {
        Ability::new(role, self.policy(role), user)
    }

    /// Like [`ability_for`](Self::ability_for), for a role name received from
    /// outside the type system. Unknown names are a configuration error.
    pub fn ability_for_role_name(
        &self,
        role: &str,
        user: UserContext,
    ) -> Result<Ability<'_>, ConfigurationError> {
        let role: Role = role.parse()?;
        Ok(self.ability_for(role, user))
    }
}

impl Default for PolicyRegistry {
    fn default() -> Self {
        Self::standard()
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════════════════════════
