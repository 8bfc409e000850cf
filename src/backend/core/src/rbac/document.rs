//! Declarative policy documents.
//!
//! ```toml
//! [[roles.MEMBER]]
//! effect = "grant"
//! actions = ["update", "delete"]
//! subject = "Project"
//! condition = "owned_by_actor"
//! ```
//!
//! Every name is validated against the closed role, action, subject and
//! condition sets. Roles missing from the document get an empty policy.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::condition::Condition;
use super::models::{Action, Role, SubjectKind};
use super::policy::{Policy, PolicyRegistry};
use super::rule::{Effect, Rule};
use crate::error::ConfigurationError;

/// One rule as written in a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RuleSpec {
    pub effect: Effect,
    pub actions: Vec<String>,
    pub subject: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
}

impl RuleSpec {
    fn compile(&self) -> Result<Rule, ConfigurationError> {
        let actions = self
            .actions
            .iter()
            .map(|name| name.parse::<Action>())
            .collect::<Result<Vec<_>, _>>()?;
        let subject: SubjectKind = self.subject.parse()?;

        let mut rule = Rule::new(self.effect, actions, subject);
        if let Some(name) = &self.condition {
            rule.when(Condition::by_name(name)?);
        }
        rule.validate()?;
        Ok(rule)
    }
}

/// Only rules whose condition is one of the named built-ins can be written
/// out; a custom predicate has no document form.
impl TryFrom<&Rule> for RuleSpec {
    type Error = ConfigurationError;

    fn try_from(rule: &Rule) -> Result<Self, Self::Error> {
        let condition = rule
            .condition()
            .map(|c| Condition::by_name(c.name()).map(|known| known.name().to_string()))
            .transpose()?;
        Ok(Self {
            effect: rule.effect(),
            actions: rule.actions().iter().map(|a| a.as_str().to_string()).collect(),
            subject: rule.subject().as_str().to_string(),
            condition,
        })
    }
}

/// A whole policy table as written in a document, keyed by role name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PolicyDocument {
    #[serde(default)]
    pub roles: BTreeMap<String, Vec<RuleSpec>>,
}

impl PolicyDocument {
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigurationError> {
        toml::from_str(source).map_err(|e| ConfigurationError::InvalidPolicyDocument(e.to_string()))
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigurationError> {
        toml::to_string_pretty(self)
            .map_err(|e| ConfigurationError::InvalidPolicyDocument(e.to_string()))
    }

    /// Validate every entry and build one policy per named role.
    pub fn compile(&self) -> Result<BTreeMap<Role, Policy>, ConfigurationError> {
        self.roles
            .iter()
            .map(|(name, specs)| -> Result<(Role, Policy), ConfigurationError> {
                let role: Role = name.parse()?;
                let mut builder = Policy::builder();
                for spec in specs {
                    builder.push(spec.compile()?);
                }
                Ok((role, builder.build()))
            })
            .collect()
    }
}

/// Export a registry. Fails with `UnknownCondition` when a rule carries a
/// custom condition, since the document could not be loaded back.
impl TryFrom<&PolicyRegistry> for PolicyDocument {
    type Error = ConfigurationError;

    fn try_from(registry: &PolicyRegistry) -> Result<Self, Self::Error> {
        let roles = registry
            .iter()
            .map(|(role, policy)| -> Result<(String, Vec<RuleSpec>), ConfigurationError> {
                let specs = policy
                    .rules()
                    .iter()
                    .map(RuleSpec::try_from)
                    .collect::<Result<Vec<_>, _>>()?;
                Ok((role.as_str().to_string(), specs))
            })
            .collect::<Result<BTreeMap<_, _>, _>>()?;
        Ok(Self { roles })
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════════════════════════
