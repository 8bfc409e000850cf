//! Abilities: a role's policy bound to one authenticated user.
//!
//! An [`Ability`] is built per request, queried, and dropped. It borrows its
//! policy from the [`PolicyRegistry`](super::PolicyRegistry) and never mutates
//! it, so any number of abilities can be evaluated concurrently.

use metrics::counter;
use tracing::debug;

use super::models::{Action, Role, UserContext};
use super::policy::{Decision, Policy};
use super::rule::Rule;
use super::subject::Subject;
use crate::error::{AuthError, Result};

/// The compiled, queryable decision function for one `(role, user)` pair.
#[derive(Debug, Clone)]
pub struct Ability<'p> {
    role: Role,
    policy: &'p Policy,
    user: UserContext,
}

impl<'p> Ability<'p> {
    pub fn new(role: Role, policy: &'p Policy, user: UserContext) -> Self {
        Self { role, policy, user }
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn user(&self) -> &UserContext {
        &self.user
    }

    /// Whether `action` is permitted on `subject`.
    pub fn can(&self, action: Action, subject: impl Into<Subject>) -> bool {
        self.explain(action, &subject.into()).is_allowed()
    }

    /// Exactly `!can(action, subject)`.
    pub fn cannot(&self, action: Action, subject: impl Into<Subject>) -> bool {
        !self.can(action, subject)
    }

    /// Evaluate and report which rule decided.
    pub fn explain(&self, action: Action, subject: &Subject) -> Decision {
        let kind = subject.kind();
        let decision = self.policy.decide(action, kind, subject.instance(), &self.user);

        debug!(
            role = %self.role,
            user_id = %self.user.user_id,
            action = %action,
            subject = %subject,
            effect = %decision.effect,
            rule = ?decision.rule,
            "Evaluated ability"
        );
        counter!("saas_auth_decisions_total", "effect" => decision.effect.as_str()).increment(1);

        decision
    }

    /// The rule a decision refers to, if any.
    pub fn rule(&self, decision: &Decision) -> Option<&'p Rule> {
        decision.rule.and_then(|index| self.policy.rules().get(index))
    }

    /// `Ok(())` when permitted, [`AuthError::Forbidden`] otherwise.
    pub fn enforce(&self, action: Action, subject: impl Into<Subject>) -> Result<()> {
        let subject = subject.into();
        let decision = self.explain(action, &subject);
        if decision.is_allowed() {
            return Ok(());
        }

        let reason = match decision.rule.zip(self.rule(&decision)) {
            Some((index, rule)) => format!(
                "role {} may not {} {} (rule #{}: {})",
                self.role,
                action,
                subject,
                index,
                rule
            ),
            None => format!(
                "role {} may not {} {} (no matching rule)",
                self.role, action, subject
            ),
        };
        Err(AuthError::forbidden(reason))
    }

    /// Every action the subject supports that this ability permits.
    pub fn permitted_actions(&self, subject: impl Into<Subject>) -> Vec<Action> {
        let subject = subject.into();
        subject
            .kind()
            .supported_actions()
            .iter()
            .copied()
            .filter(|action| self.explain(*action, &subject).is_allowed())
            .collect()
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rbac::models::{SubjectKind, UserId};
    use crate::rbac::policy::PolicyRegistry;
    use crate::rbac::rule::Effect;
    use crate::rbac::subject::{OrganizationSubject, ProjectSubject};
    use metrics_util::debugging::{DebugValue, DebuggingRecorder};
    use std::collections::HashMap;

    fn project(owner: &str) -> ProjectSubject {
        ProjectSubject {
            id: "p1".into(),
            owner_id: UserId::new(owner),
        }
    }

    fn organization(owner: &str) -> OrganizationSubject {
        OrganizationSubject {
            id: "o1".into(),
            owner_id: UserId::new(owner),
            domain: None,
            should_attach_users_by_domain: false,
        }
    }

    #[test]
    fn test_member_scenario() {
        let registry = PolicyRegistry::standard();
        let ability = registry.ability_for(Role::Member, UserContext::new("u1"));

        assert!(ability.can(Action::Get, SubjectKind::User));
        assert!(ability.can(Action::Create, SubjectKind::Project));
        assert!(!ability.can(Action::Update, project("u2")));
        assert!(ability.can(Action::Update, project("u1")));
        assert!(ability.can(Action::Delete, project("u1")));
        assert!(!ability.can(Action::Manage, SubjectKind::Billing));
    }

    #[test]
    fn test_admin_organization_override() {
        let registry = PolicyRegistry::standard();
        let ability = registry.ability_for(Role::Admin, UserContext::new("u1"));

        assert!(ability.can(Action::Delete, SubjectKind::Organization));
        assert!(ability.cannot(Action::Update, SubjectKind::Organization));
        assert!(ability.can(Action::Update, organization("u1")));
        assert!(ability.cannot(Action::TransferOwnership, organization("u2")));
        assert!(ability.can(Action::Delete, organization("u2")));
    }

    #[test]
    fn test_explain_reports_deciding_rule() {
        let registry = PolicyRegistry::standard();
        let ability = registry.ability_for(Role::Admin, UserContext::new("u1"));

        let decision = ability.explain(Action::Update, &organization("u2").into());
        assert_eq!(decision.effect, Effect::Deny);
        assert_eq!(decision.rule, Some(1));
        assert_eq!(
            ability.rule(&decision).map(ToString::to_string).as_deref(),
            Some("cannot [transfer_ownership, update] Organization")
        );

        let decision = ability.explain(Action::Update, &organization("u1").into());
        assert_eq!(decision.rule, Some(2));
        assert!(decision.is_allowed());
    }

    #[test]
    fn test_enforce() {
        let registry = PolicyRegistry::standard();
        let ability = registry.ability_for(Role::Billing, UserContext::new("u1"));

        assert!(ability.enforce(Action::Export, SubjectKind::Billing).is_ok());

        let err = ability
            .enforce(Action::Create, SubjectKind::Project)
            .unwrap_err();
        assert!(err.is_forbidden());
        assert_eq!(
            err.to_string(),
            "access denied: role BILLING may not create Project (no matching rule)"
        );
    }

    #[test]
    fn test_enforce_names_denying_rule() {
        let registry = PolicyRegistry::standard();
        let ability = registry.ability_for(Role::Admin, UserContext::new("u1"));
        let err = ability
            .enforce(Action::TransferOwnership, organization("u9"))
            .unwrap_err();
        assert!(err.to_string().contains("rule #1"));
    }

    #[test]
    fn test_permitted_actions() {
        let registry = PolicyRegistry::standard();
        let member = registry.ability_for(Role::Member, UserContext::new("u1"));

        assert_eq!(
            member.permitted_actions(SubjectKind::Project),
            vec![Action::Create, Action::Get]
        );
        assert_eq!(
            member.permitted_actions(project("u1")),
            vec![Action::Create, Action::Get, Action::Update, Action::Delete]
        );
        assert!(member.permitted_actions(SubjectKind::Billing).is_empty());

        let billing = registry.ability_for(Role::Billing, UserContext::new("u1"));
        assert_eq!(
            billing.permitted_actions(SubjectKind::Billing),
            vec![Action::Manage, Action::Get, Action::Export]
        );
    }

    #[test]
    fn test_decisions_are_counted_by_effect() {
        let recorder = DebuggingRecorder::new();
        let snapshotter = recorder.snapshotter();
        let registry = PolicyRegistry::standard();
        let ability = registry.ability_for(Role::Member, UserContext::new("u1"));

        metrics::with_local_recorder(&recorder, || {
            assert!(ability.can(Action::Get, SubjectKind::User));
            assert!(ability.cannot(Action::Update, SubjectKind::Project));
            assert!(ability.cannot(Action::Manage, SubjectKind::Billing));
        });

        let counts: HashMap<String, u64> = snapshotter
            .snapshot()
            .into_vec()
            .into_iter()
            .filter(|(key, ..)| key.key().name() == "saas_auth_decisions_total")
            .filter_map(|(key, _, _, value)| {
                let effect = key
                    .key()
                    .labels()
                    .find(|label| label.key() == "effect")?
                    .value()
                    .to_string();
                match value {
                    DebugValue::Counter(n) => Some((effect, n)),
                    _ => None,
                }
            })
            .collect();

        assert_eq!(counts.get("grant"), Some(&1));
        assert_eq!(counts.get("deny"), Some(&2));
    }
}
