//! Policy table inspection.

use anyhow::Result;
use clap::Args;
use serde::Serialize;
use tabled::Tabled;

use saas_auth::rbac::{PolicyDocument, PolicyRegistry, Role, Rule};

use super::reject;
use crate::output::{self, OutputFormat};

#[derive(Args)]
pub struct PolicyArgs {
    /// Only show this role
    #[arg(short, long)]
    pub role: Option<String>,

    /// Print the whole table as a TOML policy document
    #[arg(long, conflicts_with = "role")]
    pub export: bool,
}

#[derive(Debug, Serialize, Tabled)]
struct RuleRow {
    #[tabled(rename = "Role")]
    role: String,
    #[tabled(rename = "#")]
    index: usize,
    #[tabled(rename = "Effect")]
    effect: String,
    #[tabled(rename = "Actions")]
    actions: String,
    #[tabled(rename = "Subject")]
    subject: String,
    #[tabled(rename = "Condition")]
    condition: String,
}

impl RuleRow {
    fn new(role: Role, index: usize, rule: &Rule) -> Self {
        Self {
            role: role.to_string(),
            index,
            effect: rule.effect().verb().to_string(),
            actions: rule
                .actions()
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", "),
            subject: rule.subject().to_string(),
            condition: rule
                .condition()
                .map(|c| c.name().to_string())
                .unwrap_or_else(|| "-".to_string()),
        }
    }
}

pub fn execute(args: PolicyArgs, registry: &PolicyRegistry, format: OutputFormat) -> Result<()> {
    if args.export {
        let document = PolicyDocument::try_from(registry).map_err(reject)?;
        print!("{}", document.to_toml_string().map_err(reject)?);
        return Ok(());
    }

    let only = args
        .role
        .as_deref()
        .map(str::parse::<Role>)
        .transpose()
        .map_err(reject)?;
    let rows: Vec<RuleRow> = registry
        .iter()
        .filter(|(role, _)| only.map_or(true, |wanted| wanted == *role))
        .flat_map(|(role, policy)| {
            policy
                .rules()
                .iter()
                .enumerate()
                .map(move |(index, rule)| RuleRow::new(role, index, rule))
        })
        .collect();

    output::print_list(&rows, format)
}
