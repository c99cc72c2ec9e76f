//! Workflow CRUD against the stub backend.

use super::common::backend::StubBackend;
use society_console::workflow::{WorkflowClient, WorkflowDraft, WorkflowError, NAME_REQUIRED};

async fn client_with_seed() -> (StubBackend, WorkflowClient) {
    let backend = StubBackend::start().await;
    backend.add_workflow("wf-1", "Morning routine", "Commute and work", "2025-03-01T08:00:00Z");
    backend.add_workflow("wf-2", "Flood drill", "", "2025-03-02T09:00:00Z");
    let client = WorkflowClient::new(backend.api());
    (backend, client)
}

#[tokio::test]
async fn test_list_unwraps_data_envelope() {
    let (_backend, client) = client_with_seed().await;

    let workflows = client.list().await.expect("list should succeed");
    assert_eq!(workflows.len(), 2);
    assert_eq!(workflows[0].name, "Morning routine");
    assert_eq!(workflows[0].config.len(), 1);
    assert_eq!(workflows[0].config[0].kind(), Some("step"));
    assert_eq!(workflows[1].updated_label(), "2025-03-02 09:00:00");
}

#[tokio::test]
async fn test_create_posts_numbered_draft() {
    let (backend, client) = client_with_seed().await;

    let existing = client.list().await.unwrap().len();
    let draft = WorkflowDraft::for_new(existing);
    let saved = client.save(&draft).await.expect("create should succeed");

    assert_eq!(saved.name, "Workflow 3");
    assert_eq!(saved.description.as_deref(), Some(""));
    assert!(saved.id.starts_with("wf-new-"));
    assert_eq!(
        backend.requests().last().map(String::as_str),
        Some("POST /api/workflow-configs")
    );
}

#[tokio::test]
async fn test_edit_puts_to_existing_id() {
    let (backend, client) = client_with_seed().await;

    let mut draft = WorkflowDraft::from_existing(&client.find("wf-2").await.unwrap());
    draft.name = "Flood drill v2".into();
    draft.description = "Second pass".into();
    let saved = client.save(&draft).await.expect("update should succeed");

    assert_eq!(saved.id, "wf-2");
    assert_eq!(saved.name, "Flood drill v2");
    assert!(backend
        .requests()
        .contains(&"PUT /api/workflow-configs/wf-2".to_string()));
    assert_eq!(backend.workflow_names(), vec!["Morning routine", "Flood drill v2"]);
}

#[tokio::test]
async fn test_duplicate_creates_new_entry() {
    let (backend, client) = client_with_seed().await;

    let source = client.find("wf-1").await.unwrap();
    let copy = client
        .save(&WorkflowDraft::duplicate_of(&source))
        .await
        .expect("duplicate should succeed");

    assert_ne!(copy.id, source.id);
    assert_eq!(copy.name, "Morning routine (Copy)");
    assert_eq!(copy.config, source.config);
    assert_eq!(backend.workflow_names().len(), 3);
}

#[tokio::test]
async fn test_blank_name_never_reaches_backend() {
    let (backend, client) = client_with_seed().await;
    let before = backend.requests().len();

    let mut draft = WorkflowDraft::for_new(2);
    draft.name = "  ".into();
    let err = client.save(&draft).await.unwrap_err();

    assert!(matches!(err, WorkflowError::Validation(ref msg) if msg == NAME_REQUIRED));
    assert_eq!(backend.requests().len(), before);
}

#[tokio::test]
async fn test_delete_and_missing_entries() {
    let (backend, client) = client_with_seed().await;

    client.delete("wf-1").await.expect("delete should succeed");
    assert_eq!(backend.workflow_names(), vec!["Flood drill"]);

    // The backend's error text is surfaced to the operator.
    let err = client.delete("wf-1").await.unwrap_err();
    assert!(err.to_string().contains("workflow not found"), "{err}");

    assert!(matches!(
        client.find("wf-1").await,
        Err(WorkflowError::NotFound(id)) if id == "wf-1"
    ));
}
