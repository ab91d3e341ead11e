use mctl_config::{
    DatabaseKind, NoticeCategory, ProjectEditor, ProjectStore, RuleSite, SaveOutcome,
    create_project, save_project,
};
use mctl_test_support::fixtures::{editable_project, sample_project};
use mctl_test_support::mocks::MemoryProjectStore;
use serde_json::json;

#[tokio::test]
async fn rejected_save_never_reaches_the_store() -> anyhow::Result<()> {
    let store = MemoryProjectStore::new();
    let config = editable_project(
        &[("Users", "{")],
        &[("svcA", "]")],
        &["{}", "nope"],
        &["{"],
    );

    let outcome = save_project(&store, &config).await?;
    let SaveOutcome::Rejected { errors, notices } = outcome else {
        panic!("invalid rules must reject the save");
    };
    assert_eq!(store.writes(), 0);
    assert_eq!(errors.len(), 4);

    let categories: Vec<NoticeCategory> = notices.iter().map(|n| n.category).collect();
    assert_eq!(
        categories,
        vec![
            NoticeCategory::Crud,
            NoticeCategory::Functions,
            NoticeCategory::FileStore,
            NoticeCategory::Static,
        ]
    );
    assert_eq!(notices[0].description, "mongo - (Users)");
    assert_eq!(notices[2].description, "Rules - Rule 2");
    Ok(())
}

#[tokio::test]
async fn editor_save_persists_structured_rules() -> anyhow::Result<()> {
    let store = MemoryProjectStore::with_projects([sample_project()]);
    let mut editor = ProjectEditor::open(&store, "todo-app").await?;

    let users = RuleSite::Collection {
        db: "mongo".into(),
        name: "Users".into(),
    };
    assert!(editor.set_rule(&users, "{ \"rules\": { \"read\": { \"rule\": \"deny\" } } }"));

    let outcome = editor.save(&store).await?;
    assert_eq!(outcome, SaveOutcome::Saved);
    assert_eq!(store.writes(), 1);
    assert!(!editor.has_unsaved_changes());

    let stored = store.load_project("todo-app").await?;
    assert_eq!(
        stored.rule(&users),
        Some(&json!({ "rules": { "read": { "rule": "deny" } } }))
    );
    Ok(())
}

#[tokio::test]
async fn editor_keeps_changes_after_rejection() -> anyhow::Result<()> {
    let store = MemoryProjectStore::with_projects([sample_project()]);
    let mut editor = ProjectEditor::open(&store, "todo-app").await?;
    assert!(editor.set_rule(&RuleSite::FileRule { index: 1 }, "{ oops"));

    let outcome = editor.save(&store).await?;
    assert!(!outcome.is_saved());
    assert!(editor.has_unsaved_changes());
    assert_eq!(store.writes(), 0);
    assert_eq!(store.project("todo-app"), Some(sample_project()));
    Ok(())
}

#[tokio::test]
async fn created_projects_are_persisted_with_defaults() -> anyhow::Result<()> {
    let store = MemoryProjectStore::new();
    let project = create_project(&store, "  Chat App ", DatabaseKind::Postgres).await?;
    assert!(project.id().starts_with("chat-app-"));
    assert_eq!(project.name(), "Chat App");
    assert_eq!(store.writes(), 1);
    assert_eq!(store.load_project(project.id()).await?, project);

    assert!(create_project(&store, "   ", DatabaseKind::Mongo).await.is_err());
    assert_eq!(store.writes(), 1);
    Ok(())
}

#[tokio::test]
async fn punctuated_and_accented_names_create_projects() -> anyhow::Result<()> {
    let store = MemoryProjectStore::new();
    for (name, prefix) in [
        ("Todo App!", "todo-app-"),
        ("Café", "caf-"),
        ("My App v2.0", "my-app-v2-0-"),
    ] {
        let project = create_project(&store, name, DatabaseKind::Mongo).await?;
        assert!(project.id().starts_with(prefix), "{name} -> {}", project.id());
        assert_eq!(project.name(), name);
    }
    assert_eq!(store.writes(), 3);
    assert_eq!(store.list_projects().await?.len(), 3);
    Ok(())
}
