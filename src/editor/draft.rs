//! Modal editor holding a private draft of one record.
//!
//! LIFECYCLE
//! =========
//! closed -> `open_create`/`open_edit` -> edits -> `submit` | `cancel` -> closed
//!
//! The editor never talks to the network. `submit` hands the finished draft
//! back to the caller, which passes it to the owning list controller.

#[cfg(test)]
#[path = "draft_test.rs"]
mod draft_test;

use super::forms::Draft;
use crate::error::FieldError;
use crate::shell::confirm::capitalize;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    Create,
    Edit,
}

#[derive(Debug)]
pub struct Editor<T: Draft> {
    /// What the caller last seeded, already prepared for editing.
    initial: Option<T>,
    draft: T,
    open: bool,
}

impl<T: Draft> Default for Editor<T> {
    fn default() -> Self {
        Self { initial: None, draft: T::default(), open: false }
    }
}

impl<T: Draft> Editor<T> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open_create(&mut self) {
        self.initial = None;
        self.draft = T::default();
        self.open = true;
    }

    pub fn open_edit(&mut self, record: T) {
        let record = record.prepare_for_edit();
        self.draft = record.clone();
        self.initial = Some(record);
        self.open = true;
    }

    /// Accept initial data from the caller while the editor stays open.
    ///
    /// The draft is re-seeded only when `initial` differs from what was
    /// seeded last, so handing over the same record again keeps in-progress
    /// edits while switching to another record drops them. Returns whether
    /// the draft was replaced.
    pub fn seed(&mut self, initial: Option<T>) -> bool {
        let initial = initial.map(T::prepare_for_edit);
        if initial == self.initial {
            return false;
        }
        self.draft = initial.clone().unwrap_or_default();
        self.initial = initial;
        true
    }

    #[must_use]
    pub fn is_open(&self) -> bool {
        self.open
    }

    #[must_use]
    pub fn mode(&self) -> Mode {
        if self.initial.is_some() { Mode::Edit } else { Mode::Create }
    }

    /// `Add Student` / `Edit Student`.
    #[must_use]
    pub fn title(&self) -> String {
        let verb = match self.mode() {
            Mode::Create => "Add",
            Mode::Edit => "Edit",
        };
        format!("{verb} {}", capitalize(T::NOUN))
    }

    #[must_use]
    pub fn draft(&self) -> &T {
        &self.draft
    }

    /// Set one field of the draft by wire name.
    ///
    /// # Errors
    ///
    /// Returns the field error; the draft is unchanged.
    pub fn set_field(&mut self, field: &str, value: &str) -> Result<(), FieldError> {
        self.draft.set_field(field, value)
    }

    /// Apply an arbitrary change to the draft.
    pub fn edit(&mut self, change: impl FnOnce(&mut T)) {
        change(&mut self.draft);
    }

    /// Validate and hand back the draft, closing the editor.
    ///
    /// # Errors
    ///
    /// Returns the validation messages; the editor stays open with the draft
    /// intact.
    pub fn submit(&mut self) -> Result<T, Vec<String>> {
        self.draft.validate()?;
        self.open = false;
        self.initial = None;
        Ok(std::mem::take(&mut self.draft))
    }

    /// Close and throw the draft away.
    pub fn cancel(&mut self) {
        self.open = false;
        self.initial = None;
        self.draft = T::default();
    }
}
