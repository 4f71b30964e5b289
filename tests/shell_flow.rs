//! Dashboard shell flows against the in-process stub.

mod support;

use std::sync::Arc;

use schooldesk::editor::{LoginForm, RegisterForm};
use schooldesk::error::ShellError;
use schooldesk::net::types::{ClassItem, Role, Student, Teacher};
use schooldesk::session::{FileStore, SessionStore};
use schooldesk::shell::{AuthMode, AutoConfirm, Decision, Screen, Section, Shell};
use schooldesk::state::DeleteOutcome;
use serde_json::json;
use support::{PASSWORD, Stub, client};

fn registration(email: &str) -> RegisterForm {
    RegisterForm {
        name: "Ada".into(),
        email: email.into(),
        password: PASSWORD.into(),
        retype_password: PASSWORD.into(),
        agree_terms: true,
    }
}

async fn signed_in(stub: &Stub) -> (Shell, Arc<schooldesk::session::MemoryStore>) {
    let base = stub.serve().await;
    let (session, api, storage) = client(&base);
    let mut shell = Shell::new(session, api);
    shell.sign_in(&LoginForm::new("ada@school.test", PASSWORD)).await.unwrap();
    (shell, storage)
}

// =============================================================================
// auth
// =============================================================================

#[tokio::test]
async fn sign_up_signs_in_with_same_credentials() {
    let stub = Stub::default();
    let base = stub.serve().await;
    let (session, api, storage) = client(&base);
    let mut shell = Shell::new(session, api);

    let principal = shell.sign_up(&registration(" ada@school.test ")).await.unwrap();
    assert_eq!(principal.email, "ada@school.test");
    assert_eq!(stub.with(|s| s.registered.clone()), ["ada@school.test"]);
    assert_eq!(shell.screen(), Screen::Dashboard(Section::Home));
    assert!(!storage.is_empty());
}

#[tokio::test]
async fn duplicate_registration_surfaces_server_message() {
    let stub = Stub::default();
    stub.with(|s| s.registered.push("ada@school.test".into()));
    let base = stub.serve().await;
    let (session, api, _) = client(&base);
    let mut shell = Shell::new(session, api);

    let err = shell.sign_up(&registration("ada@school.test")).await.unwrap_err();
    assert_eq!(err.user_message("Registration failed"), "Email already registered");
    assert!(!shell.session().is_authenticated());
}

#[tokio::test]
async fn wrong_password_keeps_auth_screen() {
    let stub = Stub::default();
    let base = stub.serve().await;
    let (session, api, storage) = client(&base);
    let mut shell = Shell::new(session, api);

    let err = shell.sign_in(&LoginForm::new("ada@school.test", "not-it")).await.unwrap_err();
    assert_eq!(err.user_message("Login failed"), "Invalid credentials");
    assert_eq!(shell.screen(), Screen::Auth(AuthMode::Login));
    assert!(storage.is_empty());
}

#[tokio::test]
async fn session_survives_restart_through_file_store() {
    let stub = Stub::default();
    let base = stub.serve().await;
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session.json");
    let config = schooldesk::config::ClientConfig::from_lookup(|_| None).with_base_url(&base);

    {
        let session = SessionStore::restore(Arc::new(FileStore::new(&path)));
        let api = schooldesk::net::ApiClient::new(&config, session.token_source()).unwrap();
        let mut shell = Shell::new(session, api);
        shell.sign_in(&LoginForm::new("ada@school.test", PASSWORD)).await.unwrap();
    }

    let session = SessionStore::restore(Arc::new(FileStore::new(&path)));
    let api = schooldesk::net::ApiClient::new(&config, session.token_source()).unwrap();
    let mut shell = Shell::new(session, api);
    assert_eq!(shell.whoami().unwrap().role, Role::Admin);

    shell.select(Section::Classes).await.unwrap();
    let headers = stub.with(|s| s.auth_headers.clone());
    assert_eq!(headers.last().cloned().flatten().as_deref(), Some("Bearer tok-ada@school.test"));

    assert!(shell.logout(&mut AutoConfirm(Decision::Confirm)).unwrap());
    assert!(!path.exists());
}

// =============================================================================
// sections
// =============================================================================

#[tokio::test]
async fn students_section_lists_grouped_by_class() {
    let stub = Stub::default();
    stub.with(|s| {
        s.classes.push(json!({ "_id": "c1", "name": "Grade 1" }));
        s.students.push(json!({ "_id": "s1", "name": "Ada", "class": "c1", "rollNumber": 4 }));
        s.students.push(json!({ "_id": "s2", "name": "Ben" }));
    });
    let (mut shell, _) = signed_in(&stub).await;

    shell.select(Section::Students).await.unwrap();
    assert_eq!(shell.class_cache().len(), 1);
    let listing = shell.render_list::<Student>("").unwrap();
    let grade = listing.find("== Grade 1 ==").unwrap();
    let unassigned = listing.find("== Unassigned ==").unwrap();
    assert!(grade < unassigned);
    assert!(listing.contains("Ada"));

    let filtered = shell.render_list::<Student>("grade 1").unwrap();
    assert!(filtered.contains("Ada"));
    assert!(!filtered.contains("Ben"));
}

#[tokio::test]
async fn editor_round_trip_updates_cached_teacher() {
    let stub = Stub::default();
    stub.with(|s| {
        s.classes.push(json!({ "_id": "c1", "name": "Grade 1" }));
        s.teachers.push(json!({
            "_id": "t1", "name": "Lee", "email": "lee@school.test", "dob": "1980-02-03T00:00:00.000Z",
            "subjects": [{ "classId": { "_id": "c1", "name": "Grade 1" }, "subjectName": "Math" }]
        }));
    });
    let (mut shell, _) = signed_in(&stub).await;
    shell.select(Section::Teachers).await.unwrap();

    let mut editor = shell.editor::<Teacher>(Some("t1")).unwrap();
    assert_eq!(editor.title(), "Edit Teacher");
    assert_eq!(editor.draft().dob.as_deref(), Some("1980-02-03"));
    editor.set_field("qualifications", "MSc").unwrap();
    shell.save(&mut editor).await.unwrap();
    assert!(!editor.is_open());

    let teacher = shell.controller::<Teacher>().unwrap().find("t1").unwrap();
    assert_eq!(teacher.qualifications.as_deref(), Some("MSc"));
    assert!(shell.render_list::<Teacher>("").unwrap().contains("Math (Grade 1)"));
}

#[tokio::test]
async fn invalid_draft_stays_open_and_sends_nothing() {
    let stub = Stub::default();
    let (mut shell, _) = signed_in(&stub).await;
    shell.select(Section::Classes).await.unwrap();
    let before = stub.with(|s| s.requests.len());

    let mut editor = shell.editor::<ClassItem>(None).unwrap();
    let err = shell.save(&mut editor).await.unwrap_err();
    assert!(matches!(err, ShellError::Invalid(_)));
    assert!(editor.is_open());
    assert_eq!(stub.with(|s| s.requests.len()), before);
}

#[tokio::test]
async fn delete_of_uncached_id_is_not_found() {
    let stub = Stub::default();
    let (mut shell, _) = signed_in(&stub).await;
    shell.select(Section::Classes).await.unwrap();

    let err = shell.delete::<ClassItem>("c9", &mut AutoConfirm(Decision::Confirm)).await.unwrap_err();
    assert!(matches!(err, ShellError::NotFound { noun: "class", .. }));
}

#[tokio::test]
async fn delete_then_import_through_shell() {
    use std::io::Write;

    let stub = Stub::default();
    stub.with(|s| s.students.push(json!({ "_id": "s0", "name": "Old" })));
    let (mut shell, _) = signed_in(&stub).await;
    shell.select(Section::Students).await.unwrap();

    let outcome = shell.delete::<Student>("s0", &mut AutoConfirm(Decision::Confirm)).await.unwrap();
    assert!(matches!(outcome, DeleteOutcome::Deleted(_)));

    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "name\nAda").unwrap();
    let summary = shell.import_students(file.path()).await.unwrap();
    assert_eq!(summary.count, 1);
    let names: Vec<String> = shell.controller::<Student>().unwrap().snapshot().into_iter().map(|s| s.name).collect();
    assert_eq!(names, ["Ada"]);
}
