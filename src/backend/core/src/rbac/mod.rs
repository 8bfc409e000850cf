//! Role-Based Access Control (RBAC) ability engine.
//!
//! This module provides:
//! - **Models**: Role, Action, SubjectKind and the acting user's context
//! - **Subjects**: bare type tags or typed resource instances
//! - **Rules & Conditions**: ordered grant/deny rules, optionally narrowed by
//!   instance-level predicates such as ownership
//! - **Policy Registry**: one ordered rule list per role, built once
//! - **Abilities**: a policy bound to one user, exposing `can` / `cannot`
//! - **Policy Documents**: the same rules loaded from TOML
//!
//! # Usage
//!
//! ```rust
//! use saas_auth::rbac::{
//!     Action, PolicyRegistry, ProjectSubject, Role, SubjectKind, UserContext, UserId,
//! };
//!
//! let registry = PolicyRegistry::standard();
//! let ability = registry.ability_for(Role::Member, UserContext::new("u1"));
//!
//! assert!(ability.can(Action::Create, SubjectKind::Project));
//!
//! let theirs = ProjectSubject { id: "p1".into(), owner_id: UserId::new("u2") };
//! assert!(ability.cannot(Action::Update, theirs));
//! ```

pub mod ability;
pub mod condition;
pub mod document;
pub mod models;
pub mod policy;
pub mod rule;
pub mod subject;

pub use ability::Ability;
pub use condition::Condition;
pub use document::{PolicyDocument, RuleSpec};
pub use models::{Action, Role, SubjectKind, UserContext, UserId};
pub use policy::{define_policy_for_role, Decision, Policy, PolicyBuilder, PolicyRegistry};
pub use rule::{Effect, IntoActions, Rule};
pub use subject::{
    BillingSubject, InviteSubject, OrganizationSubject, ProjectSubject, Resource, Subject,
    UserSubject,
};
