//! Role by subject permission matrix.

use anyhow::Result;
use clap::Args;
use serde::Serialize;
use tabled::Tabled;

use saas_auth::rbac::{Action, PolicyRegistry, Role, SubjectKind, UserContext};

use crate::output::{self, OutputFormat};

#[derive(Args)]
pub struct MatrixArgs {
    /// Acting user id
    #[arg(short, long, default_value = "anonymous")]
    pub user: String,
}

#[derive(Debug, Serialize, Tabled)]
struct MatrixRow {
    #[tabled(rename = "Subject")]
    subject: String,
    #[tabled(rename = "ADMIN")]
    admin: String,
    #[tabled(rename = "MEMBER")]
    member: String,
    #[tabled(rename = "BILLING")]
    billing: String,
}

fn join(actions: &[Action]) -> String {
    if actions.is_empty() {
        return "-".to_string();
    }
    actions
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn execute(args: MatrixArgs, registry: &PolicyRegistry, format: OutputFormat) -> Result<()> {
    let permitted = |role: Role, kind: SubjectKind| {
        let ability = registry.ability_for(role, UserContext::new(args.user.as_str()));
        join(&ability.permitted_actions(kind))
    };

    let rows: Vec<MatrixRow> = SubjectKind::ALL
        .into_iter()
        .map(|kind| MatrixRow {
            subject: kind.to_string(),
            admin: permitted(Role::Admin, kind),
            member: permitted(Role::Member, kind),
            billing: permitted(Role::Billing, kind),
        })
        .collect();

    output::print_list(&rows, format)
}
