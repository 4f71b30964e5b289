//! List controller: drives one [`Collection`] against the REST API.
//!
//! DESIGN
//! ======
//! The collection lives behind a mutex that is only held between awaits:
//! lock, `begin`, unlock, await the request, lock, `complete_*`. A second
//! transition started while the first is awaiting therefore sees the busy
//! phase and is rejected, and a response that lands after [`ListController::unmount`]
//! finds a stale ticket and is dropped.
//!
//! ERROR HANDLING
//! ==============
//! A failed request leaves local state exactly as it was before the
//! transition. The error is logged here and returned so the shell can notify.
//! Failures that arrive after unmount are swallowed like late successes.

#[cfg(test)]
#[path = "controller_test.rs"]
mod controller_test;

use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use super::collection::{Collection, Phase, Reconciled, Ticket};
use super::filter::{Searchable, filter_view};
use crate::error::{ClientError, ControllerError};
use crate::net::types::{ClassItem, ImportSummary, Student};
use crate::net::{ApiClient, Resource};
use crate::shell::confirm::{ConfirmDialog, Confirmer, Decision};

/// Result of a delete request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// The user declined the confirmation; nothing was sent.
    Cancelled,
    Deleted(Reconciled),
}

pub struct ListController<R: Resource> {
    api: ApiClient,
    state: Arc<Mutex<Collection<R>>>,
}

impl<R: Resource> Clone for ListController<R> {
    fn clone(&self) -> Self {
        Self { api: self.api.clone(), state: Arc::clone(&self.state) }
    }
}

impl<R: Resource> ListController<R> {
    #[must_use]
    pub fn new(api: ApiClient) -> Self {
        Self { api, state: Arc::new(Mutex::new(Collection::new())) }
    }

    fn lock(&self) -> MutexGuard<'_, Collection<R>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn begin(&self, phase: Phase) -> Result<Ticket, ControllerError> {
        let ticket = self.lock().begin(phase);
        if let Err(e) = &ticket {
            tracing::debug!(resource = R::PATH, error = %e, "transition rejected");
        }
        ticket
    }

    /// Settle a finished request: apply `apply` on success, restore `Ready`
    /// on failure.
    fn finish<T>(
        &self,
        ticket: Ticket,
        result: Result<T, ClientError>,
        apply: impl FnOnce(&mut Collection<R>, Ticket, T) -> Reconciled,
    ) -> Result<Reconciled, ControllerError> {
        let mut state = self.lock();
        match result {
            Ok(value) => {
                let outcome = apply(&mut state, ticket, value);
                if outcome == Reconciled::Discarded {
                    tracing::debug!(resource = R::PATH, phase = %ticket.phase(), "late response discarded");
                }
                Ok(outcome)
            }
            Err(e) => match state.abort(ticket) {
                Reconciled::Applied => {
                    tracing::warn!(resource = R::PATH, phase = %ticket.phase(), error = %e, "request failed");
                    Err(e.into())
                }
                Reconciled::Discarded => {
                    tracing::debug!(resource = R::PATH, error = %e, "late failure discarded");
                    Ok(Reconciled::Discarded)
                }
            },
        }
    }

    // =========================================================================
    // TRANSITIONS
    // =========================================================================

    /// Fetch the whole collection and replace local state with it.
    ///
    /// # Errors
    ///
    /// Returns [`ControllerError::Busy`]/[`ControllerError::Unmounted`] when
    /// the transition cannot start, or the request failure. Prior items are
    /// kept on failure.
    pub async fn refresh(&self) -> Result<Reconciled, ControllerError> {
        let ticket = self.begin(Phase::Loading)?;
        let result = self.api.list::<R>().await;
        let outcome = self.finish(ticket, result, |state, ticket, items| state.complete_list(ticket, items))?;
        if outcome == Reconciled::Applied {
            tracing::debug!(resource = R::PATH, count = self.lock().items().len(), "collection loaded");
        }
        Ok(outcome)
    }

    /// Submit a new record and prepend the server's copy.
    ///
    /// # Errors
    ///
    /// Same as [`Self::refresh`].
    pub async fn create(&self, record: R) -> Result<Reconciled, ControllerError> {
        let ticket = self.begin(Phase::Saving)?;
        let result = self.api.create(&record).await;
        self.finish(ticket, result, Collection::complete_create)
    }

    /// Submit the full record under `id` and replace it in place.
    ///
    /// # Errors
    ///
    /// Same as [`Self::refresh`].
    pub async fn update(&self, id: &str, record: R) -> Result<Reconciled, ControllerError> {
        let ticket = self.begin(Phase::Saving)?;
        let result = self.api.update(id, &record).await;
        self.finish(ticket, result, |state, ticket, saved| state.complete_update(ticket, id, saved))
    }

    /// Create or update depending on whether `record` already has an identity.
    ///
    /// # Errors
    ///
    /// Same as [`Self::refresh`].
    pub async fn save(&self, record: R) -> Result<Reconciled, ControllerError> {
        match record.id().map(str::to_owned) {
            Some(id) => self.update(&id, record).await,
            None => self.create(record).await,
        }
    }

    /// Ask for confirmation, then delete record `id`.
    ///
    /// # Errors
    ///
    /// Same as [`Self::refresh`]. Declining the dialog is not an error.
    pub async fn delete(&self, id: &str, confirmer: &mut dyn Confirmer) -> Result<DeleteOutcome, ControllerError> {
        if confirmer.decide(&ConfirmDialog::delete(R::NOUN)) == Decision::Cancel {
            tracing::debug!(resource = R::PATH, id, "delete cancelled");
            return Ok(DeleteOutcome::Cancelled);
        }
        let ticket = self.begin(Phase::Deleting)?;
        let result = self.api.delete::<R>(id).await;
        let outcome = self.finish(ticket, result, |state, ticket, ()| state.complete_delete(ticket, id))?;
        Ok(DeleteOutcome::Deleted(outcome))
    }

    /// Tear the view down; responses still in flight will be discarded.
    pub fn unmount(&self) {
        self.lock().unmount();
    }

    // =========================================================================
    // READS
    // =========================================================================

    #[must_use]
    pub fn phase(&self) -> Phase {
        self.lock().phase()
    }

    #[must_use]
    pub fn is_mounted(&self) -> bool {
        self.lock().is_mounted()
    }

    /// Copy of the current items, in collection order.
    #[must_use]
    pub fn snapshot(&self) -> Vec<R> {
        self.lock().items().to_vec()
    }

    #[must_use]
    pub fn find(&self, id: &str) -> Option<R> {
        self.lock().find(id).cloned()
    }
}

impl<R: Resource + Searchable> ListController<R> {
    /// Items matching `needle`; see [`filter_view`].
    #[must_use]
    pub fn filtered(&self, needle: &str, classes: &[ClassItem]) -> Vec<R> {
        filter_view(self.lock().items(), needle, classes).into_iter().cloned().collect()
    }
}

impl ListController<Student> {
    /// Upload a CSV of students under the `Saving` phase, then reload the
    /// collection.
    ///
    /// # Errors
    ///
    /// Returns [`ControllerError::Busy`]/[`ControllerError::Unmounted`] when
    /// the upload cannot start, or the upload failure. Once the server has
    /// accepted the file a failed reload is only logged; the stale list stays.
    pub async fn import_csv(&self, path: &Path) -> Result<ImportSummary, ControllerError> {
        let ticket = self.begin(Phase::Saving)?;
        let uploaded = self.api.import_students_csv(path).await;
        let mut summary = None;
        let outcome = self.finish(ticket, uploaded, |state, ticket, accepted| {
            summary = Some(accepted);
            state.complete_unchanged(ticket)
        })?;
        let Some(summary) = summary else {
            return Err(ControllerError::Unmounted);
        };
        tracing::info!(count = summary.count, "students imported");

        if outcome == Reconciled::Applied {
            if let Err(e) = self.refresh().await {
                tracing::warn!(resource = Student::PATH, error = %e, "reload after csv import failed");
            }
        }
        Ok(summary)
    }
}
