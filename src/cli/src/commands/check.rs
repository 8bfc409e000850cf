//! Single-permission queries: `check` and `explain`.

use anyhow::Result;
use clap::Args;
use serde::Serialize;

use saas_auth::rbac::{Ability, Action, PolicyRegistry, Subject, UserContext};
use super::reject;
use crate::output::{self, OutputFormat};

#[derive(Args)]
pub struct CheckArgs {
    /// Membership role (ADMIN, MEMBER, BILLING)
    #[arg(short, long, env = "SAAS_AUTH_ROLE")]
    pub role: String,

    /// Acting user id
    #[arg(short, long)]
    pub user: String,

    /// Acting user email, used by domain conditions
    #[arg(long)]
    pub email: Option<String>,

    /// Action (manage, create, get, update, delete, transfer_ownership, export)
    pub action: String,

    /// Subject tag (all, User, Project, Organization, Invites, Billing)
    #[arg(required_unless_present = "instance")]
    pub subject: Option<String>,

    /// Concrete subject as JSON, e.g. '{"type":"Project","id":"p1","ownerId":"u1"}'
    #[arg(long, conflicts_with = "subject")]
    pub instance: Option<String>,
}

/// Parsed query, ready to evaluate against an ability.
struct Query {
    action: Action,
    subject: Subject,
}

impl CheckArgs {
    fn user_context(&self) -> UserContext {
        let user = UserContext::new(self.user.as_str());
        match &self.email {
            Some(email) => user.with_email(email.as_str()),
            None => user,
        }
    }

    fn query(&self) -> Result<Query> {
        let action = self.action.parse::<Action>().map_err(reject)?;
        let subject = match (&self.instance, &self.subject) {
            (Some(json), _) => {
                let value: serde_json::Value = serde_json::from_str(json)?;
                Subject::from_json(&value).map_err(reject)?
            }
            (None, Some(tag)) => Subject::parse_tag(tag).map_err(reject)?,
            (None, None) => anyhow::bail!("a subject tag or --instance is required"),
        };
        Ok(Query { action, subject })
    }

    fn ability<'p>(&self, registry: &'p PolicyRegistry) -> Result<Ability<'p>> {
        registry
            .ability_for_role_name(&self.role, self.user_context())
            .map_err(reject)
    }
}

#[derive(Debug, Serialize)]
struct DecisionReport {
    role: String,
    user_id: String,
    action: String,
    subject: String,
    allowed: bool,
    effect: String,
    rule_index: Option<usize>,
    rule: Option<String>,
}

fn report(ability: &Ability<'_>, query: &Query) -> DecisionReport {
    let decision = ability.explain(query.action, &query.subject);
    DecisionReport {
        role: ability.role().to_string(),
        user_id: ability.user().user_id.to_string(),
        action: query.action.to_string(),
        subject: query.subject.to_string(),
        allowed: decision.is_allowed(),
        effect: decision.effect.to_string(),
        rule_index: decision.rule,
        rule: ability.rule(&decision).map(ToString::to_string),
    }
}

/// Returns whether the action is allowed.
pub fn execute(args: CheckArgs, registry: &PolicyRegistry, format: OutputFormat) -> Result<bool> {
    let ability = args.ability(registry)?;
    let query = args.query()?;
    let report = report(&ability, &query);

    match format {
        OutputFormat::Table => println!(
            "{} {} {} {}",
            output::verdict(report.allowed),
            report.role,
            report.action,
            report.subject
        ),
        _ => output::print_item(&report, format)?,
    }

    Ok(report.allowed)
}

pub fn explain(args: CheckArgs, registry: &PolicyRegistry, format: OutputFormat) -> Result<()> {
    let ability = args.ability(registry)?;
    let query = args.query()?;
    let report = report(&ability, &query);

    match format {
        OutputFormat::Table => {
            output::print_header("Decision");
            output::print_detail("Role", &report.role);
            output::print_detail("User", &report.user_id);
            output::print_detail("Action", &report.action);
            output::print_detail("Subject", &report.subject);
            output::print_detail("Result", &output::verdict(report.allowed).to_string());
            match (report.rule_index, &report.rule) {
                (Some(index), Some(rule)) => {
                    output::print_detail("Rule", &format!("#{index} {rule}"))
                }
                _ => output::print_detail("Rule", "none matched (default deny)"),
            }
            println!();
        }
        _ => output::print_item(&report, format)?,
    }

    Ok(())
}
