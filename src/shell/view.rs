//! View shell: auth gate plus one mounted dashboard section at a time.
//!
//! LIFECYCLE
//! =========
//! signed out (Login <-> Register) -> sign in -> Home -> select section ...
//! -> logout (confirmed) -> signed out.
//!
//! Selecting a section tears down the controllers of the previous one and
//! mounts fresh ones; nothing but the session survives a switch. Students
//! and Teachers mount a second Classes controller that is only read for
//! class-name lookup.

#[cfg(test)]
#[path = "view_test.rs"]
mod view_test;

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use super::confirm::{ConfirmDialog, Confirmer};
use super::render;
use crate::editor::{Draft, Editor, LoginForm, RegisterForm};
use crate::error::{ControllerError, ShellError};
use crate::net::ApiClient;
use crate::net::types::{ClassItem, ImportSummary, Principal, Student, Teacher};
use crate::session::SessionStore;
use crate::state::filter::Searchable;
use crate::state::{DeleteOutcome, ListController, Reconciled};

// =============================================================================
// ROUTING VALUES
// =============================================================================

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Section {
    #[default]
    Home,
    Classes,
    Students,
    Teachers,
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Home => "home",
            Self::Classes => "classes",
            Self::Students => "students",
            Self::Teachers => "teachers",
        })
    }
}

impl FromStr for Section {
    type Err = ShellError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "home" => Ok(Self::Home),
            "classes" => Ok(Self::Classes),
            "students" => Ok(Self::Students),
            "teachers" => Ok(Self::Teachers),
            other => Err(ShellError::Invalid(vec![format!("Unknown section `{other}`.")])),
        }
    }
}

/// Which auth screen is shown while signed out.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AuthMode {
    #[default]
    Login,
    Register,
}

impl AuthMode {
    #[must_use]
    pub fn toggled(self) -> Self {
        match self {
            Self::Login => Self::Register,
            Self::Register => Self::Login,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Screen {
    Auth(AuthMode),
    Dashboard(Section),
}

// =============================================================================
// MOUNTED VIEW
// =============================================================================

/// Controllers owned by the currently selected section.
pub enum View {
    Home,
    Classes { classes: ListController<ClassItem> },
    Students { students: ListController<Student>, classes: ListController<ClassItem> },
    Teachers { teachers: ListController<Teacher>, classes: ListController<ClassItem> },
}

impl View {
    fn mount(section: Section, api: &ApiClient) -> Self {
        match section {
            Section::Home => Self::Home,
            Section::Classes => Self::Classes { classes: ListController::new(api.clone()) },
            Section::Students => {
                Self::Students { students: ListController::new(api.clone()), classes: ListController::new(api.clone()) }
            }
            Section::Teachers => {
                Self::Teachers { teachers: ListController::new(api.clone()), classes: ListController::new(api.clone()) }
            }
        }
    }

    /// Initial fetch for every controller of the section.
    async fn load(&self) -> Result<(), ControllerError> {
        match self {
            Self::Home => Ok(()),
            Self::Classes { classes } => classes.refresh().await.map(drop),
            Self::Students { students, classes } => {
                let (a, b) = tokio::join!(students.refresh(), classes.refresh());
                a.and(b).map(drop)
            }
            Self::Teachers { teachers, classes } => {
                let (a, b) = tokio::join!(teachers.refresh(), classes.refresh());
                a.and(b).map(drop)
            }
        }
    }

    fn unmount(&self) {
        match self {
            Self::Home => {}
            Self::Classes { classes } => classes.unmount(),
            Self::Students { students, classes } => {
                students.unmount();
                classes.unmount();
            }
            Self::Teachers { teachers, classes } => {
                teachers.unmount();
                classes.unmount();
            }
        }
    }

    /// Controller whose items are used to resolve class references.
    fn class_lookup(&self) -> Option<&ListController<ClassItem>> {
        match self {
            Self::Home => None,
            Self::Classes { classes } | Self::Students { classes, .. } | Self::Teachers { classes, .. } => {
                Some(classes)
            }
        }
    }
}

/// A record type that is the primary collection of one section.
pub trait SectionRecord: Draft + Searchable {
    const SECTION: Section;

    fn controller(view: &View) -> Option<&ListController<Self>>;

    fn render(items: &[&Self], classes: &[ClassItem]) -> String;
}

impl SectionRecord for ClassItem {
    const SECTION: Section = Section::Classes;

    fn controller(view: &View) -> Option<&ListController<Self>> {
        match view {
            View::Classes { classes } => Some(classes),
            _ => None,
        }
    }

    fn render(items: &[&Self], _classes: &[ClassItem]) -> String {
        render::classes(items)
    }
}

impl SectionRecord for Student {
    const SECTION: Section = Section::Students;

    fn controller(view: &View) -> Option<&ListController<Self>> {
        match view {
            View::Students { students, .. } => Some(students),
            _ => None,
        }
    }

    fn render(items: &[&Self], classes: &[ClassItem]) -> String {
        render::students(items, classes)
    }
}

impl SectionRecord for Teacher {
    const SECTION: Section = Section::Teachers;

    fn controller(view: &View) -> Option<&ListController<Self>> {
        match view {
            View::Teachers { teachers, .. } => Some(teachers),
            _ => None,
        }
    }

    fn render(items: &[&Self], classes: &[ClassItem]) -> String {
        render::teachers(items, classes)
    }
}

// =============================================================================
// SHELL
// =============================================================================

pub struct Shell {
    session: SessionStore,
    api: ApiClient,
    auth_mode: AuthMode,
    section: Section,
    view: View,
}

impl Shell {
    #[must_use]
    pub fn new(session: SessionStore, api: ApiClient) -> Self {
        Self { session, api, auth_mode: AuthMode::Login, section: Section::Home, view: View::Home }
    }

    #[must_use]
    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    #[must_use]
    pub fn screen(&self) -> Screen {
        if self.session.is_authenticated() { Screen::Dashboard(self.section) } else { Screen::Auth(self.auth_mode) }
    }

    #[must_use]
    pub fn section(&self) -> Section {
        self.section
    }

    #[must_use]
    pub fn view(&self) -> &View {
        &self.view
    }

    pub fn toggle_auth_mode(&mut self) -> AuthMode {
        self.auth_mode = self.auth_mode.toggled();
        self.auth_mode
    }

    fn require_session(&self) -> Result<&Principal, ShellError> {
        self.session.current_principal().ok_or(ShellError::SignedOut)
    }

    /// Identity of the signed-in user.
    ///
    /// # Errors
    ///
    /// Returns [`ShellError::SignedOut`] when nobody is signed in.
    pub fn whoami(&self) -> Result<&Principal, ShellError> {
        self.require_session()
    }

    /// Unmount the current section, then mount and load `section`.
    ///
    /// # Errors
    ///
    /// Returns [`ShellError::SignedOut`] without a session, or the first
    /// listing failure. The section stays mounted either way.
    pub async fn select(&mut self, section: Section) -> Result<(), ShellError> {
        self.require_session()?;
        self.view.unmount();
        self.section = section;
        self.view = View::mount(section, &self.api);
        tracing::debug!(%section, "section mounted");
        self.view.load().await?;
        Ok(())
    }

    fn reset_view(&mut self) {
        self.view.unmount();
        self.view = View::Home;
        self.section = Section::Home;
    }

    // =========================================================================
    // AUTH
    // =========================================================================

    /// Validate the form, exchange credentials for a token and start a session.
    ///
    /// # Errors
    ///
    /// Returns [`ShellError::Invalid`] for form problems, otherwise the
    /// request or storage failure.
    pub async fn sign_in(&mut self, form: &LoginForm) -> Result<&Principal, ShellError> {
        form.validate().map_err(ShellError::Invalid)?;
        let response = self.api.login(form.email(), &form.password).await?;
        self.reset_view();
        self.session.login(&response.token, response.user)?;
        self.require_session()
    }

    /// Register a student account, then sign in with the same credentials.
    ///
    /// # Errors
    ///
    /// Same as [`Self::sign_in`].
    pub async fn sign_up(&mut self, form: &RegisterForm) -> Result<&Principal, ShellError> {
        form.validate().map_err(ShellError::Invalid)?;
        let registered = self.api.register(&form.request()).await?;
        if let Some(message) = registered.message.as_deref() {
            tracing::info!(message, "registered");
        }
        self.sign_in(&form.login_form()).await
    }

    /// Ask for confirmation and end the session. Returns whether the user
    /// was signed out.
    ///
    /// # Errors
    ///
    /// Returns the storage failure if the credential pair cannot be erased;
    /// the in-memory identity is cleared regardless.
    pub fn logout(&mut self, confirmer: &mut dyn Confirmer) -> Result<bool, ShellError> {
        ConfirmDialog::logout().present(
            confirmer,
            || -> Result<bool, ShellError> {
                self.reset_view();
                self.auth_mode = AuthMode::Login;
                self.session.logout()?;
                Ok(true)
            },
            || Ok(false),
        )
    }

    // =========================================================================
    // SECTION ACTIONS
    // =========================================================================

    /// Controller of the mounted section for `R`.
    ///
    /// # Errors
    ///
    /// Returns [`ShellError::SignedOut`] without a session and
    /// [`ControllerError::Unmounted`] when `R`'s section is not selected.
    pub fn controller<R: SectionRecord>(&self) -> Result<&ListController<R>, ShellError> {
        self.require_session()?;
        R::controller(&self.view).ok_or(ShellError::Controller(ControllerError::Unmounted))
    }

    /// Cached classes of the mounted section, for reference lookup.
    #[must_use]
    pub fn class_cache(&self) -> Vec<ClassItem> {
        self.view.class_lookup().map(ListController::snapshot).unwrap_or_default()
    }

    /// Filtered listing of `R`, rendered for the terminal.
    ///
    /// # Errors
    ///
    /// Same as [`Self::controller`].
    pub fn render_list<R: SectionRecord>(&self, needle: &str) -> Result<String, ShellError> {
        let classes = self.class_cache();
        let items = self.controller::<R>()?.filtered(needle, &classes);
        let refs: Vec<&R> = items.iter().collect();
        Ok(R::render(&refs, &classes))
    }

    /// Editor in create mode (`id` is `None`) or seeded with cached record `id`.
    ///
    /// # Errors
    ///
    /// Returns [`ShellError::NotFound`] for an unknown id.
    pub fn editor<R: SectionRecord>(&self, id: Option<&str>) -> Result<Editor<R>, ShellError> {
        let mut editor = Editor::new();
        match id {
            None => editor.open_create(),
            Some(id) => {
                let record = self.find::<R>(id)?;
                editor.open_edit(record);
            }
        }
        Ok(editor)
    }

    fn find<R: SectionRecord>(&self, id: &str) -> Result<R, ShellError> {
        self.controller::<R>()?
            .find(id)
            .ok_or_else(|| ShellError::NotFound { noun: R::NOUN, id: id.to_owned() })
    }

    /// Submit the editor's draft to the owning controller.
    ///
    /// # Errors
    ///
    /// Returns [`ShellError::Invalid`] when the draft does not validate (the
    /// editor stays open), otherwise the controller failure.
    pub async fn save<R: SectionRecord>(&self, editor: &mut Editor<R>) -> Result<Reconciled, ShellError> {
        let controller = self.controller::<R>()?;
        let record = editor.submit().map_err(ShellError::Invalid)?;
        Ok(controller.save(record).await?)
    }

    /// Delete cached record `id` after confirmation.
    ///
    /// # Errors
    ///
    /// Returns [`ShellError::NotFound`] for an unknown id, otherwise the
    /// controller failure.
    pub async fn delete<R: SectionRecord>(
        &self,
        id: &str,
        confirmer: &mut dyn Confirmer,
    ) -> Result<DeleteOutcome, ShellError> {
        self.find::<R>(id)?;
        Ok(self.controller::<R>()?.delete(id, confirmer).await?)
    }

    /// Upload a student CSV and reload the student list.
    ///
    /// # Errors
    ///
    /// Returns the upload failure; see [`ListController::import_csv`].
    pub async fn import_students(&self, path: &Path) -> Result<ImportSummary, ShellError> {
        Ok(self.controller::<Student>()?.import_csv(path).await?)
    }
}
