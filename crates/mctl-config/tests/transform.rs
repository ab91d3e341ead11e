use mctl_config::{
    DatabaseKind, RuleSite, StructuredConfig, new_project_with_id, parse_rule, rule_sites,
    to_editable, to_structured,
};
use mctl_test_support::fixtures::{editable_project, sample_project, sample_project_json};
use serde_json::json;

#[test]
fn structured_config_round_trips_through_editable_form() {
    let project = sample_project();
    let result = to_structured(&to_editable(&project));
    assert!(result.acknowledged);
    assert!(result.errors.is_empty());
    assert_eq!(result.config, project);
    assert_eq!(
        serde_json::to_value(&result.config).expect("serialize"),
        sample_project_json()
    );
}

#[test]
fn every_printed_rule_parses_back_to_its_source() {
    let project = sample_project();
    let editable = to_editable(&project);
    let sites = rule_sites(&project);
    assert_eq!(sites.len(), 9);
    for site in sites {
        let original = project.rule(&site).expect("structured rule");
        let text = editable.rule(&site).expect("editable rule");
        assert_eq!(&parse_rule(text).expect("printed rule parses"), original);
    }
}

#[test]
fn to_editable_leaves_input_untouched() {
    let project = sample_project();
    let before = project.clone();
    let _ = to_editable(&project);
    assert_eq!(project, before);
}

#[test]
fn single_bad_collection_is_isolated() {
    let config = editable_project(
        &[("Users", "{ \"rules\": "), ("Posts", "{\"rules\":{}}")],
        &[("svcA", "{}")],
        &["{}"],
        &["{\"prefix\":\"/\"}"],
    );
    let result = to_structured(&config);
    assert!(!result.acknowledged);
    assert_eq!(result.errors.crud.len(), 1);
    assert_eq!(result.errors.crud["mongo"], vec!["Users".to_string()]);
    assert!(result.errors.functions.is_empty());
    assert!(result.errors.file_store.is_empty());
    assert!(result.errors.static_routes.is_empty());

    let posts = RuleSite::Collection {
        db: "mongo".into(),
        name: "Posts".into(),
    };
    assert_eq!(result.config.rule(&posts), Some(&json!({ "rules": {} })));
    assert_eq!(
        result.config.rule(&RuleSite::Service {
            name: "svcA".into()
        }),
        Some(&json!({}))
    );
    assert_eq!(
        result.config.rule(&RuleSite::StaticRoute { index: 0 }),
        Some(&json!({ "prefix": "/" }))
    );
}

#[test]
fn all_failures_are_reported_in_one_pass() {
    let config = editable_project(
        &[("Users", "nope")],
        &[("svcA", "{ broken")],
        &["{}", "[1, 2"],
        &["{}"],
    );
    let result = to_structured(&config);
    assert!(!result.acknowledged);
    assert_eq!(result.errors.crud["mongo"], vec!["Users".to_string()]);
    assert_eq!(result.errors.functions, vec!["svcA".to_string()]);
    assert_eq!(result.errors.file_store, vec!["Rule 2".to_string()]);
    assert!(result.errors.static_routes.is_empty());
    assert_eq!(result.errors.len(), 3);
}

#[test]
fn sequence_indices_survive_partial_failure() {
    let config = editable_project(&[], &[], &["{}", "not json", "{\"a\":1}"], &[]);
    let result = to_structured(&config);
    assert_eq!(result.errors.file_store, vec!["Rule 2".to_string()]);
    let rules = result
        .config
        .modules
        .and_then(|m| m.file_store)
        .and_then(|f| f.rules)
        .expect("file rules");
    assert_eq!(rules.len(), 3);
    assert_eq!(rules[0], json!({}));
    assert_eq!(rules[2], json!({ "a": 1 }));
}

#[test]
fn bad_static_routes_are_labelled_by_position() {
    let config = editable_project(&[], &[], &[], &["{}", "{}", "{"]);
    let result = to_structured(&config);
    assert_eq!(result.errors.static_routes, vec!["Rule 3".to_string()]);
    assert!(result.errors.functions.is_empty());
}

#[test]
fn absent_static_module_is_never_added() {
    let mut document = sample_project_json();
    document["modules"]
        .as_object_mut()
        .expect("modules object")
        .remove("static");
    let project: StructuredConfig = serde_json::from_value(document.clone()).expect("parse");

    let editable = to_editable(&project);
    let modules = editable.modules.as_ref().expect("modules");
    assert!(modules.static_routes.is_none());

    let result = to_structured(&editable);
    assert!(result.acknowledged);
    assert!(result.errors.static_routes.is_empty());
    let value = serde_json::to_value(&result.config).expect("serialize");
    assert!(value["modules"].get("static").is_none());
    assert_eq!(value, document);
}

#[test]
fn empty_collections_stay_empty() {
    let document = json!({
        "id": "p",
        "name": "P",
        "secret": "s",
        "modules": { "crud": { "mongo": { "enabled": true, "conn": "c", "collections": {} } } }
    });
    let project: StructuredConfig = serde_json::from_value(document.clone()).expect("parse");
    let editable = to_editable(&project);
    let value = serde_json::to_value(&editable).expect("serialize editable");
    assert_eq!(value["modules"]["crud"]["mongo"]["collections"], json!({}));

    let result = to_structured(&editable);
    assert!(result.acknowledged);
    assert!(result.errors.crud.is_empty());
    assert_eq!(serde_json::to_value(&result.config).expect("serialize"), document);
}

#[test]
fn sparse_documents_round_trip_without_added_keys() {
    let document = json!({
        "id": "p",
        "modules": {
            "crud": { "mongo": { "collections": { "users": { "rule": "allow" } } } },
            "functions": { "services": { "svc": { "rule": "allow" } } },
            "fileStore": { "rules": [] },
            "static": { "routes": [{ "prefix": "/" }] }
        }
    });
    let project: StructuredConfig = serde_json::from_value(document.clone()).expect("parse");
    let editable = to_editable(&project);
    let editable_value = serde_json::to_value(&editable).expect("serialize editable");
    assert!(editable_value.get("name").is_none());
    assert!(editable_value.get("secret").is_none());
    assert!(editable_value["modules"]["fileStore"].get("storeType").is_none());

    let result = to_structured(&editable);
    assert!(result.acknowledged);
    assert_eq!(serde_json::to_value(&result.config).expect("serialize"), document);
}

#[test]
fn modules_without_crud_round_trip() {
    let document = json!({
        "id": "p",
        "name": "P",
        "modules": {
            "functions": { "enabled": true, "services": { "svc": { "rule": "allow" } } },
            "auth": {}
        }
    });
    let project: StructuredConfig = serde_json::from_value(document.clone()).expect("parse");
    assert_eq!(rule_sites(&project), vec![RuleSite::Service { name: "svc".into() }]);

    let editable = to_editable(&project);
    assert!(editable.modules.as_ref().expect("modules").crud.is_none());

    let result = to_structured(&editable);
    assert!(result.acknowledged);
    assert!(result.errors.crud.is_empty());
    let value = serde_json::to_value(&result.config).expect("serialize");
    assert!(value["modules"].get("crud").is_none());
    assert_eq!(value, document);
}

#[test]
fn legacy_function_rules_are_normalised_to_services() {
    let document = json!({
        "id": "p",
        "name": "P",
        "secret": "s",
        "modules": { "functions": { "enabled": true, "broker": "nats", "conn": "n", "rules": { "svc": { "rule": "allow" } } } }
    });
    let project: StructuredConfig = serde_json::from_value(document).expect("parse");
    let result = to_structured(&to_editable(&project));
    assert!(result.acknowledged);
    let value = serde_json::to_value(&result.config).expect("serialize");
    assert_eq!(
        value["modules"]["functions"]["services"]["svc"],
        json!({ "rule": "allow" })
    );
    assert!(value["modules"]["functions"].get("rules").is_none());
}

#[test]
fn default_projects_round_trip() {
    for kind in [DatabaseKind::Mongo, DatabaseKind::Postgres, DatabaseKind::MySql] {
        let project = new_project_with_id("Todo App", "todo-app", kind);
        let result = to_structured(&to_editable(&project));
        assert!(result.acknowledged);
        assert_eq!(result.config, project);
    }
}
