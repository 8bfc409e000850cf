//! # SaaS Auth
//!
//! Role-based ability engine for a multi-tenant SaaS.
//!
//! Callers hold a membership role and an authenticated user; they bind the
//! two into an [`Ability`](rbac::Ability) and ask whether an action on a
//! subject (a type tag or a concrete resource) is permitted. Transport,
//! sessions and persistence live elsewhere: this crate only answers
//! `can` / `cannot` and signals configuration defects.
//!
//! ## Architecture
//!
//! - **RBAC**: roles, actions, subjects, ordered grant/deny rules, conditions,
//!   the policy registry and abilities
//! - **Error**: configuration errors and the crate-wide error type
//! - **Config**: settings loaded from files and the environment
//! - **Telemetry**: structured logging

pub mod config;
pub mod error;
pub mod rbac;
pub mod telemetry;

pub use error::{AuthError, ConfigurationError, ErrorCode, ErrorSeverity, Result};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::Settings;
    pub use crate::error::{AuthError, ConfigurationError, ErrorCode, Result};
    pub use crate::rbac::{
        Ability, Action, Condition, Decision, Effect, Policy, PolicyBuilder, PolicyDocument,
        PolicyRegistry, Resource, Role, Rule, Subject, SubjectKind, UserContext, UserId,
    };
}
