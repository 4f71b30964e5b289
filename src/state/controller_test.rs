use std::sync::Arc;

use super::*;
use crate::config::ClientConfig;
use crate::error::ErrorCode;
use crate::net::types::Teacher;
use crate::session::MemoryStore;
use crate::shell::confirm::AutoConfirm;

/// A client whose every request fails to connect.
fn offline_api() -> ApiClient {
    let config = ClientConfig::from_lookup(|_| None).with_base_url("http://127.0.0.1:1");
    ApiClient::new(&config, Arc::new(MemoryStore::new())).unwrap()
}

fn seeded(items: Vec<ClassItem>) -> ListController<ClassItem> {
    let controller = ListController::new(offline_api());
    {
        let mut state = controller.lock();
        let ticket = state.begin(Phase::Loading).unwrap();
        state.complete_list(ticket, items);
    }
    controller
}

fn class(id: &str, name: &str) -> ClassItem {
    ClassItem { id: Some(id.into()), name: name.into(), ..ClassItem::default() }
}

// =============================================================================
// delete confirmation
// =============================================================================

#[tokio::test]
async fn declined_delete_leaves_collection_unchanged() {
    let controller = seeded(vec![class("c1", "A"), class("c2", "B")]);
    let outcome = controller.delete("c1", &mut AutoConfirm(Decision::Cancel)).await.unwrap();
    assert_eq!(outcome, DeleteOutcome::Cancelled);
    assert_eq!(controller.snapshot().len(), 2);
    assert_eq!(controller.phase(), Phase::Ready);
}

// =============================================================================
// failures
// =============================================================================

#[tokio::test]
async fn failed_refresh_keeps_prior_items() {
    let controller = seeded(vec![class("c1", "A")]);
    let err = controller.refresh().await.unwrap_err();
    assert_eq!(err.error_code(), "E_TRANSPORT");
    assert_eq!(controller.snapshot(), vec![class("c1", "A")]);
    assert_eq!(controller.phase(), Phase::Ready);
}

#[tokio::test]
async fn failed_create_leaves_state_unchanged() {
    let controller = seeded(vec![class("c1", "A")]);
    assert!(controller.create(ClassItem { name: "New".into(), ..ClassItem::default() }).await.is_err());
    assert_eq!(controller.snapshot(), vec![class("c1", "A")]);
}

#[tokio::test]
async fn failed_delete_keeps_record() {
    let controller = seeded(vec![class("c1", "A")]);
    assert!(controller.delete("c1", &mut AutoConfirm(Decision::Confirm)).await.is_err());
    assert!(controller.find("c1").is_some());
}

// =============================================================================
// guards
// =============================================================================

#[tokio::test]
async fn transition_while_busy_is_rejected() {
    let controller = seeded(vec![]);
    let _ticket = controller.lock().begin(Phase::Saving).unwrap();
    let err = controller.refresh().await.unwrap_err();
    assert!(matches!(err, ControllerError::Busy { phase: Phase::Saving }));
}

#[tokio::test]
async fn unmounted_controller_refuses_work() {
    let controller: ListController<Teacher> = ListController::new(offline_api());
    controller.unmount();
    assert!(!controller.is_mounted());
    assert!(matches!(controller.refresh().await, Err(ControllerError::Unmounted)));
}

#[tokio::test]
async fn failure_after_unmount_is_silent() {
    let controller = seeded(vec![class("c1", "A")]);
    let clone = controller.clone();
    let ticket = controller.lock().begin(Phase::Saving).unwrap();
    clone.unmount();
    let outcome = controller.finish::<ClassItem>(
        ticket,
        Err(ClientError::Server { status: 500, message: "boom".into() }),
        Collection::complete_create,
    );
    assert_eq!(outcome.unwrap(), Reconciled::Discarded);
    assert_eq!(controller.snapshot(), vec![class("c1", "A")]);
}

#[tokio::test]
async fn csv_import_is_rejected_while_busy() {
    let controller: ListController<Student> = ListController::new(offline_api());
    let _pending = controller.lock().begin(Phase::Deleting).unwrap();
    let err = controller.import_csv(Path::new("/nonexistent/students.csv")).await.unwrap_err();
    assert!(matches!(err, ControllerError::Busy { phase: Phase::Deleting }));
}

#[tokio::test]
async fn failed_csv_upload_returns_to_ready() {
    let controller: ListController<Student> = ListController::new(offline_api());
    let err = controller.import_csv(Path::new("/nonexistent/students.csv")).await.unwrap_err();
    assert_eq!(err.error_code(), "E_READ_FILE");
    assert_eq!(controller.phase(), Phase::Ready);
}

// =============================================================================
// reads
// =============================================================================

#[test]
fn filtered_projects_without_mutating() {
    let controller = seeded(vec![class("c1", "Grade 1"), class("c2", "Grade 2")]);
    let view = controller.filtered("2", &[]);
    assert_eq!(view, vec![class("c2", "Grade 2")]);
    assert_eq!(controller.snapshot().len(), 2);
}
