//! Integration tests for loading policy tables from TOML documents.

use saas_auth::config::{PolicySettings, Settings};
use saas_auth::error::ErrorCode;
use saas_auth::rbac::{Action, PolicyRegistry, ProjectSubject, Role, SubjectKind, UserContext, UserId};
use std::io::Write;

const RESTRICTED_POLICY: &str = r#"
[[roles.ADMIN]]
effect = "grant"
actions = ["manage"]
subject = "all"

[[roles.ADMIN]]
effect = "deny"
actions = ["delete"]
subject = "Organization"

[[roles.MEMBER]]
effect = "grant"
actions = ["get", "create"]
subject = "Project"

[[roles.MEMBER]]
effect = "grant"
actions = ["delete"]
subject = "Project"
condition = "owned_by_actor"
"#;

fn write_policy(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(".toml")
        .tempfile()
        .expect("create temp file");
    file.write_all(contents.as_bytes()).expect("write policy");
    file
}

#[test]
fn test_load_policy_file() {
    let file = write_policy(RESTRICTED_POLICY);
    let registry = PolicyRegistry::load(file.path()).unwrap();

    let admin = registry.ability_for(Role::Admin, UserContext::new("u1"));
    assert!(admin.can(Action::Update, SubjectKind::Organization));
    assert!(!admin.can(Action::Delete, SubjectKind::Organization));

    let member = registry.ability_for(Role::Member, UserContext::new("u1"));
    let own = ProjectSubject {
        id: "p1".into(),
        owner_id: UserId::new("u1"),
    };
    assert!(member.can(Action::Delete, own));
    assert!(!member.can(Action::Delete, SubjectKind::Project));
    assert!(!member.can(Action::Update, SubjectKind::Project));
}

#[test]
fn test_roles_missing_from_document_deny_everything() {
    let file = write_policy(RESTRICTED_POLICY);
    let registry = PolicyRegistry::load(file.path()).unwrap();

    assert!(registry.policy(Role::Billing).is_empty());
    let billing = registry.ability_for(Role::Billing, UserContext::new("u1"));
    for kind in SubjectKind::ALL {
        assert!(billing.permitted_actions(kind).is_empty(), "{kind}");
    }
}

#[test]
fn test_invalid_document_is_configuration_error() {
    let file = write_policy(
        r#"
        [[roles.MEMBER]]
        effect = "grant"
        actions = ["export"]
        subject = "Project"
        "#,
    );
    let err = PolicyRegistry::load(file.path()).unwrap_err();
    assert!(err.is_configuration());
    assert_eq!(err.code(), ErrorCode::UnsupportedAction);
}

#[test]
fn test_settings_select_policy_file() {
    let file = write_policy(RESTRICTED_POLICY);
    let settings = Settings {
        policy: PolicySettings {
            file: Some(file.path().to_path_buf()),
        },
        ..Default::default()
    };

    let registry = settings.registry().unwrap();
    assert_eq!(registry.policy(Role::Admin).len(), 2);
    assert_eq!(registry.policy(Role::Member).len(), 2);
}
