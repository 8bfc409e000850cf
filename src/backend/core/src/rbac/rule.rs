//! Grant/deny rules over `(actions, subject tag, optional condition)`.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::condition::Condition;
use super::models::{Action, SubjectKind, UserContext};
use super::subject::Resource;
use crate::error::ConfigurationError;

/// Whether a rule permits or forbids what it matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Effect {
    #[serde(alias = "can")]
    Grant,
    #[serde(alias = "cannot")]
    Deny,
}

impl Effect {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Grant => "grant",
            Self::Deny => "deny",
        }
    }

    /// Builder verb, `can` or `cannot`.
    pub fn verb(&self) -> &'static str {
        match self {
            Self::Grant => "can",
            Self::Deny => "cannot",
        }
    }
}

impl fmt::Display for Effect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Anything a rule can be declared over: one action or several.
pub trait IntoActions {
    fn into_actions(self) -> Vec<Action>;
}

impl IntoActions for Action {
    fn into_actions(self) -> Vec<Action> {
        vec![self]
    }
}

impl<const N: usize> IntoActions for [Action; N] {
    fn into_actions(self) -> Vec<Action> {
        self.to_vec()
    }
}

impl IntoActions for &[Action] {
    fn into_actions(self) -> Vec<Action> {
        self.to_vec()
    }
}

impl IntoActions for Vec<Action> {
    fn into_actions(self) -> Vec<Action> {
        self
    }
}

/// A single entry of a role's policy.
#[derive(Debug, Clone)]
pub struct Rule {
    effect: Effect,
    actions: Vec<Action>,
    subject: SubjectKind,
    condition: Option<Condition>,
}

impl Rule {
    pub fn new(effect: Effect, actions: impl IntoActions, subject: SubjectKind) -> Self {
        Self {
            effect,
            actions: actions.into_actions(),
            subject,
            condition: None,
        }
    }

    pub fn grant(actions: impl IntoActions, subject: SubjectKind) -> Self {
        Self::new(Effect::Grant, actions, subject)
    }

    pub fn deny(actions: impl IntoActions, subject: SubjectKind) -> Self {
        Self::new(Effect::Deny, actions, subject)
    }

    /// Restrict the rule to instances satisfying `condition`.
    pub fn when(&mut self, condition: Condition) -> &mut Self {
        self.condition = Some(condition);
        self
    }

    /// Owned variant of [`Rule::when`].
    pub fn with_condition(mut self, condition: Condition) -> Self {
        self.condition = Some(condition);
        self
    }

    pub fn effect(&self) -> Effect {
        self.effect
    }

    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    pub fn subject(&self) -> SubjectKind {
        self.subject
    }

    pub fn condition(&self) -> Option<&Condition> {
        self.condition.as_ref()
    }

    /// Type-level match: action (with `manage` wildcard) and subject (with
    /// `all` wildcard).
    pub fn matches(&self, action: Action, subject: SubjectKind) -> bool {
        self.subject.covers(subject) && self.actions.iter().any(|a| a.covers(action))
    }

    /// Whether the rule's condition holds. Unconditioned rules always hold;
    /// conditioned rules never hold without an instance.
    pub fn is_satisfied(&self, instance: Option<&Resource>, user: &UserContext) -> bool {
        match (&self.condition, instance) {
            (None, _) => true,
            (Some(_), None) => false,
            (Some(condition), Some(resource)) => condition.evaluate(resource, user),
        }
    }

    /// Reject rules that can never be meaningful.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.actions.is_empty() {
            return Err(ConfigurationError::InvalidPolicyDocument(format!(
                "rule on `{}` lists no actions",
                self.subject
            )));
        }
        match self.actions.iter().find(|a| !self.subject.supports(**a)) {
            Some(action) => Err(ConfigurationError::UnsupportedAction {
                action: action.to_string(),
                subject: self.subject.to_string(),
            }),
            None => Ok(()),
        }
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ", self.effect.verb())?;
        match self.actions.as_slice() {
            [single] => write!(f, "{single}")?,
            many => {
                let names: Vec<&str> = many.iter().map(Action::as_str).collect();
                write!(f, "[{}]", names.join(", "))?;
            }
        }
        write!(f, " {}", self.subject)?;
        if let Some(condition) = &self.condition {
            write!(f, " when {condition}")?;
        }
        Ok(())
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rbac::models::UserId;
    use crate::rbac::subject::ProjectSubject;

    #[test]
    fn test_matches_with_wildcards() {
        let rule = Rule::grant(Action::Manage, SubjectKind::All);
        assert!(rule.matches(Action::Delete, SubjectKind::Project));
        assert!(rule.matches(Action::Manage, SubjectKind::All));

        let rule = Rule::grant([Action::Create, Action::Get], SubjectKind::Project);
        assert!(rule.matches(Action::Get, SubjectKind::Project));
        assert!(!rule.matches(Action::Update, SubjectKind::Project));
        assert!(!rule.matches(Action::Get, SubjectKind::User));
        assert!(!rule.matches(Action::Manage, SubjectKind::Project));
    }

    #[test]
    fn test_conditioned_rule_needs_instance() {
        let rule = Rule::grant(Action::Update, SubjectKind::Project)
            .with_condition(Condition::owned_by_actor());
        let user = UserContext::new("u1");
        let own = Resource::Project(ProjectSubject {
            id: "p1".into(),
            owner_id: UserId::new("u1"),
        });

        assert!(!rule.is_satisfied(None, &user));
        assert!(rule.is_satisfied(Some(&own), &user));
    }

    #[test]
    fn test_validate() {
        assert!(Rule::grant(Action::Export, SubjectKind::Billing).validate().is_ok());
        assert!(Rule::grant(Action::Export, SubjectKind::All).validate().is_ok());
        assert_eq!(
            Rule::deny(Action::TransferOwnership, SubjectKind::Project)
                .validate()
                .unwrap_err(),
            ConfigurationError::UnsupportedAction {
                action: "transfer_ownership".into(),
                subject: "Project".into(),
            }
        );
        assert!(Rule::grant(Vec::<Action>::new(), SubjectKind::User).validate().is_err());
    }

    #[test]
    fn test_display() {
        let rule = Rule::deny([Action::TransferOwnership, Action::Update], SubjectKind::Organization);
        assert_eq!(
            rule.to_string(),
            "cannot [transfer_ownership, update] Organization"
        );
        let rule = Rule::grant(Action::Delete, SubjectKind::Project)
            .with_condition(Condition::owned_by_actor());
        assert_eq!(rule.to_string(), "can delete Project when owned_by_actor");
    }

    #[test]
    fn test_effect_aliases() {
        let effect: Effect = serde_json::from_str("\"cannot\"").unwrap();
        assert_eq!(effect, Effect::Deny);
        let effect: Effect = serde_json::from_str("\"grant\"").unwrap();
        assert_eq!(effect, Effect::Grant);
    }
}
