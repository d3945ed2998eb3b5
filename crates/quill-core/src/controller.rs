//! Note collection controller.
//!
//! Owns the in-memory working list for the current view (all notes or
//! search results) and applies optimistic local mutations after each remote
//! call succeeds. A failed operation leaves the working list untouched; the
//! failure toast is the only observable effect.

use chrono::Utc;

use crate::api::{NoteStore, DEFAULT_PAGE, DEFAULT_PAGE_SIZE};
use crate::error::{Error, Result};
use crate::executor::{ActionExecutor, ActionOptions};
use crate::models::{Note, NoteDraft, NoteId};
use crate::validate::validate_draft;

/// What the working list currently shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewState {
    /// Nothing requested yet.
    Idle,
    /// Full list request in flight.
    Loading,
    /// Working list holds a page of the full note list.
    Loaded,
    /// Search request in flight.
    Searching,
    /// Working list holds the results for `query`.
    SearchResults { query: String },
}

/// State machine over a single collection view.
pub struct NoteController<S: NoteStore> {
    store: S,
    executor: ActionExecutor,
    notes: Vec<Note>,
    view: ViewState,
    /// Token of the most recently issued list/search request. Responses are
    /// applied only while their token is still the latest, so a slow stale
    /// response cannot overwrite newer state.
    latest_request: u64,
}

impl<S: NoteStore> NoteController<S> {
    pub fn new(store: S, executor: ActionExecutor) -> Self {
        Self {
            store,
            executor,
            notes: Vec::new(),
            view: ViewState::Idle,
            latest_request: 0,
        }
    }

    /// The working list: the notes currently displayed.
    #[must_use]
    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    #[must_use]
    pub const fn view(&self) -> &ViewState {
        &self.view
    }

    /// Load the first page of the full note list.
    pub async fn load_all(&mut self) -> Result<()> {
        self.load_page(DEFAULT_PAGE, DEFAULT_PAGE_SIZE).await
    }

    /// Load one page of the full note list, replacing the working list.
    pub async fn load_page(&mut self, page: usize, page_size: usize) -> Result<()> {
        let token = self.issue_request_token();
        let previous = std::mem::replace(&mut self.view, ViewState::Loading);

        let operation = self.store.list(page, page_size);
        let result = self
            .executor
            .execute(
                async { operation.await.map_err(Error::from) },
                ActionOptions::new().error_message("Failed to load notes"),
            )
            .await;

        match result {
            Ok(notes) => {
                self.apply_working_list(token, notes, ViewState::Loaded);
                Ok(())
            }
            Err(error) => {
                self.restore_view(token, previous);
                Err(error)
            }
        }
    }

    /// Search notes. A blank query behaves as [`Self::load_all`].
    pub async fn search(&mut self, query: &str) -> Result<()> {
        let trimmed = query.trim();
        if trimmed.is_empty() {
            return self.load_all().await;
        }

        let token = self.issue_request_token();
        let previous = std::mem::replace(&mut self.view, ViewState::Searching);

        let operation = self.store.search(trimmed);
        let result = self
            .executor
            .execute(
                async { operation.await.map_err(Error::from) },
                ActionOptions::new().error_message("Search failed"),
            )
            .await;

        match result {
            Ok(results) => {
                let view = ViewState::SearchResults {
                    query: trimmed.to_string(),
                };
                self.apply_working_list(token, results, view);
                Ok(())
            }
            Err(error) => {
                self.restore_view(token, previous);
                Err(error)
            }
        }
    }

    /// Create a note and prepend it to the working list, newest first,
    /// independent of server-provided order.
    pub async fn create(&mut self, draft: NoteDraft) -> Result<Note> {
        validate_draft(&draft)?;

        let operation = self.store.create(&draft);
        let created = self
            .executor
            .execute(
                async { operation.await.map_err(Error::from) },
                ActionOptions::new()
                    .success_message("Note created successfully")
                    .error_message("Failed to create note"),
            )
            .await?;

        self.notes.insert(0, created.clone());
        Ok(created)
    }

    /// Update a note and merge the submitted fields into the local entry.
    ///
    /// The local entry gets a locally stamped `updated_at`; the server's own
    /// timestamp is not re-fetched until the next full reload, so the value
    /// can drift. Updating an id absent from the working list is a local
    /// no-op (the remote call still runs).
    pub async fn update(&mut self, id: &NoteId, draft: NoteDraft) -> Result<Note> {
        validate_draft(&draft)?;

        let operation = self.store.update(id, &draft);
        let updated = self
            .executor
            .execute(
                async { operation.await.map_err(Error::from) },
                ActionOptions::new()
                    .success_message("Note updated successfully")
                    .error_message("Failed to update note"),
            )
            .await?;

        if let Some(existing) = self.notes.iter_mut().find(|note| note.id == *id) {
            existing.content = draft.content;
            existing.tags = draft.tags;
            existing.updated_at = Utc::now();
        }
        Ok(updated)
    }

    /// Delete a note and drop it from the working list after confirmation.
    /// Deleting an id absent from the working list is a local no-op.
    pub async fn delete(&mut self, id: &NoteId) -> Result<()> {
        let operation = self.store.delete(id);
        self.executor
            .execute(
                async { operation.await.map_err(Error::from) },
                ActionOptions::new()
                    .success_message("Note deleted successfully")
                    .error_message("Failed to delete note"),
            )
            .await?;

        self.notes.retain(|note| note.id != *id);
        Ok(())
    }

    /// Fetch a single note without touching the working list.
    pub async fn fetch(&self, id: &NoteId) -> Result<Note> {
        let operation = self.store.get(id);
        self.executor
            .execute(
                async { operation.await.map_err(Error::from) },
                ActionOptions::new().error_message("Failed to load note"),
            )
            .await
    }

    fn issue_request_token(&mut self) -> u64 {
        self.latest_request += 1;
        self.latest_request
    }

    /// Replace the working list, unless a newer request has been issued in
    /// the meantime. Returns whether the response was applied.
    fn apply_working_list(&mut self, token: u64, notes: Vec<Note>, view: ViewState) -> bool {
        if token != self.latest_request {
            return false;
        }
        self.notes = notes;
        self.view = view;
        true
    }

    fn restore_view(&mut self, token: u64, previous: ViewState) {
        if token == self.latest_request {
            self.view = previous;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::{Cell, RefCell};

    use chrono::{DateTime, Utc};
    use pretty_assertions::assert_eq;

    use super::*;
    // Shadow the one-arg `crate::error::Result` alias brought in via `super::*`
    // so the NoteStore mock impls below resolve to std's two-arg `Result`.
    use std::result::Result;
    use crate::api::RequestError;
    use crate::notify::{Notifier, ToastKind};

    const ID_ONE: &str = "00000000-0000-4000-8000-000000000001";
    const ID_TWO: &str = "00000000-0000-4000-8000-000000000002";

    fn timestamp(raw: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(raw).unwrap().with_timezone(&Utc)
    }

    fn note(id: &str, content: &str) -> Note {
        Note {
            id: id.parse().unwrap(),
            title: content.to_string(),
            content: content.to_string(),
            tags: Vec::new(),
            created_at: timestamp("2024-05-01T10:00:00Z"),
            updated_at: timestamp("2024-05-01T10:00:00Z"),
        }
    }

    /// In-memory store standing in for the remote API. The server keeps its
    /// own ordering (append) so optimistic ordering is observable.
    #[derive(Default)]
    struct StubStore {
        notes: RefCell<Vec<Note>>,
        search_results: RefCell<Vec<Note>>,
        next_id: RefCell<Option<NoteId>>,
        fail_next: Cell<bool>,
        list_calls: Cell<usize>,
        search_calls: Cell<usize>,
        create_calls: Cell<usize>,
        update_calls: Cell<usize>,
        delete_calls: Cell<usize>,
    }

    impl StubStore {
        fn failure(&self) -> Option<RequestError> {
            if self.fail_next.take() {
                Some(RequestError {
                    status: Some(500),
                    message: "HTTP 500".to_string(),
                })
            } else {
                None
            }
        }
    }

    impl NoteStore for StubStore {
        async fn list(&self, _page: usize, _page_size: usize) -> Result<Vec<Note>, RequestError> {
            self.list_calls.set(self.list_calls.get() + 1);
            if let Some(error) = self.failure() {
                return Err(error);
            }
            Ok(self.notes.borrow().clone())
        }

        async fn get(&self, id: &NoteId) -> Result<Note, RequestError> {
            self.notes
                .borrow()
                .iter()
                .find(|note| note.id == *id)
                .cloned()
                .ok_or_else(|| RequestError {
                    status: Some(404),
                    message: "Note not found (404)".to_string(),
                })
        }

        async fn create(&self, draft: &NoteDraft) -> Result<Note, RequestError> {
            self.create_calls.set(self.create_calls.get() + 1);
            if let Some(error) = self.failure() {
                return Err(error);
            }
            let created = Note {
                id: self.next_id.borrow_mut().take().unwrap_or_default(),
                title: draft.content.clone(),
                content: draft.content.clone(),
                tags: draft.tags.clone(),
                created_at: timestamp("2024-05-03T12:00:00Z"),
                updated_at: timestamp("2024-05-03T12:00:00Z"),
            };
            self.notes.borrow_mut().push(created.clone());
            Ok(created)
        }

        async fn update(&self, id: &NoteId, draft: &NoteDraft) -> Result<Note, RequestError> {
            self.update_calls.set(self.update_calls.get() + 1);
            if let Some(error) = self.failure() {
                return Err(error);
            }
            let mut notes = self.notes.borrow_mut();
            let existing = notes
                .iter_mut()
                .find(|note| note.id == *id)
                .ok_or_else(|| RequestError {
                    status: Some(404),
                    message: "Note not found (404)".to_string(),
                })?;
            existing.content = draft.content.clone();
            existing.tags = draft.tags.clone();
            existing.updated_at = timestamp("2024-05-04T08:00:00Z");
            Ok(existing.clone())
        }

        async fn delete(&self, id: &NoteId) -> Result<(), RequestError> {
            self.delete_calls.set(self.delete_calls.get() + 1);
            if let Some(error) = self.failure() {
                return Err(error);
            }
            self.notes.borrow_mut().retain(|note| note.id != *id);
            Ok(())
        }

        async fn search(&self, _query: &str) -> Result<Vec<Note>, RequestError> {
            self.search_calls.set(self.search_calls.get() + 1);
            if let Some(error) = self.failure() {
                return Err(error);
            }
            Ok(self.search_results.borrow().clone())
        }
    }

    fn controller(store: StubStore) -> (NoteController<StubStore>, Notifier) {
        let notifier = Notifier::new();
        let executor = ActionExecutor::new(notifier.clone());
        (NoteController::new(store, executor), notifier)
    }

    #[tokio::test]
    async fn load_all_replaces_working_list() {
        let store = StubStore::default();
        store.notes.borrow_mut().push(note(ID_ONE, "a"));

        let (mut controller, _notifier) = controller(store);
        assert_eq!(*controller.view(), ViewState::Idle);

        controller.load_all().await.unwrap();

        assert_eq!(controller.notes().len(), 1);
        assert_eq!(*controller.view(), ViewState::Loaded);
    }

    #[tokio::test]
    async fn create_prepends_to_front_regardless_of_server_order() {
        let store = StubStore::default();
        store.notes.borrow_mut().push(note(ID_ONE, "a"));
        *store.next_id.borrow_mut() = Some(ID_TWO.parse().unwrap());

        let (mut controller, notifier) = controller(store);
        controller.load_all().await.unwrap();

        let created = controller
            .create(NoteDraft::new("b", Vec::new()))
            .await
            .unwrap();

        assert_eq!(created.id.as_str(), ID_TWO);
        // The server appended; the working list leads with the new note.
        assert_eq!(controller.notes()[0].id.as_str(), ID_TWO);
        assert_eq!(controller.notes()[1].id.as_str(), ID_ONE);

        let toasts = notifier.drain();
        assert!(toasts
            .iter()
            .any(|toast| toast.message == "Note created successfully"
                && toast.kind == ToastKind::Success));
    }

    #[tokio::test]
    async fn create_round_trips_through_reload() {
        let store = StubStore::default();
        *store.next_id.borrow_mut() = Some(ID_TWO.parse().unwrap());

        let (mut controller, _notifier) = controller(store);
        let created = controller
            .create(NoteDraft::new("round trip", Vec::new()))
            .await
            .unwrap();

        controller.load_all().await.unwrap();
        assert!(controller.notes().iter().any(|note| note.id == created.id));
    }

    #[tokio::test]
    async fn invalid_draft_short_circuits_before_the_store() {
        let store = StubStore::default();
        let (mut controller, _notifier) = controller(store);

        let error = controller
            .create(NoteDraft::new("   ", Vec::new()))
            .await
            .unwrap_err();

        assert!(matches!(error, Error::Validation(_)));
        assert_eq!(controller.store.create_calls.get(), 0);
        assert!(controller.notes().is_empty());
    }

    #[tokio::test]
    async fn update_merges_submitted_fields_and_stamps_local_time() {
        let store = StubStore::default();
        store.notes.borrow_mut().push(note(ID_ONE, "original"));

        let (mut controller, _notifier) = controller(store);
        controller.load_all().await.unwrap();
        let before = controller.notes()[0].updated_at;

        let id: NoteId = ID_ONE.parse().unwrap();
        controller
            .update(&id, NoteDraft::new("edited", vec!["tag".to_string()]))
            .await
            .unwrap();

        let merged = &controller.notes()[0];
        assert_eq!(merged.content, "edited");
        assert_eq!(merged.tags, vec!["tag"]);
        // Locally stamped, not the server's value.
        assert!(merged.updated_at > before);
        // Fields the draft does not carry are left alone.
        assert_eq!(merged.title, "original");
    }

    #[tokio::test]
    async fn failed_update_leaves_note_unchanged() {
        let store = StubStore::default();
        store.notes.borrow_mut().push(note(ID_ONE, "original"));

        let (mut controller, notifier) = controller(store);
        controller.load_all().await.unwrap();
        let displayed = controller.notes()[0].clone();

        controller.store.fail_next.set(true);
        let id: NoteId = ID_ONE.parse().unwrap();
        let result = controller
            .update(&id, NoteDraft::new("edited", Vec::new()))
            .await;

        assert!(result.is_err());
        assert_eq!(controller.notes()[0], displayed);
        let toasts = notifier.drain();
        assert!(toasts
            .iter()
            .any(|toast| toast.kind == ToastKind::Error && toast.message == "HTTP 500"));
    }

    #[tokio::test]
    async fn delete_is_idempotent_on_local_state() {
        let store = StubStore::default();
        store.notes.borrow_mut().push(note(ID_ONE, "a"));

        let (mut controller, _notifier) = controller(store);
        controller.load_all().await.unwrap();

        let id: NoteId = ID_ONE.parse().unwrap();
        controller.delete(&id).await.unwrap();
        assert!(controller.notes().is_empty());

        // Second delete: local state unchanged, remote call still attempted.
        controller.delete(&id).await.unwrap();
        assert!(controller.notes().is_empty());
        assert_eq!(controller.store.delete_calls.get(), 2);
    }

    #[tokio::test]
    async fn blank_search_behaves_as_load_all() {
        let store = StubStore::default();
        store.notes.borrow_mut().push(note(ID_ONE, "a"));

        let (mut controller, _notifier) = controller(store);
        controller.search("   ").await.unwrap();

        assert_eq!(controller.store.list_calls.get(), 1);
        assert_eq!(controller.store.search_calls.get(), 0);
        assert_eq!(*controller.view(), ViewState::Loaded);
        assert_eq!(controller.notes().len(), 1);
    }

    #[tokio::test]
    async fn search_replaces_list_and_records_query() {
        let store = StubStore::default();
        store.notes.borrow_mut().push(note(ID_ONE, "a"));
        store.search_results.borrow_mut().push(note(ID_TWO, "b"));

        let (mut controller, _notifier) = controller(store);
        controller.load_all().await.unwrap();

        controller.search("  needle  ").await.unwrap();

        assert_eq!(controller.notes().len(), 1);
        assert_eq!(controller.notes()[0].id.as_str(), ID_TWO);
        assert_eq!(
            *controller.view(),
            ViewState::SearchResults {
                query: "needle".to_string()
            }
        );
    }

    #[tokio::test]
    async fn failed_load_restores_previous_view_and_list() {
        let store = StubStore::default();
        store.notes.borrow_mut().push(note(ID_ONE, "a"));

        let (mut controller, _notifier) = controller(store);
        controller.load_all().await.unwrap();

        controller.store.fail_next.set(true);
        let result = controller.search("needle").await;

        assert!(result.is_err());
        assert_eq!(*controller.view(), ViewState::Loaded);
        assert_eq!(controller.notes().len(), 1);
    }

    #[tokio::test]
    async fn stale_response_is_discarded() {
        let store = StubStore::default();
        let (mut controller, _notifier) = controller(store);

        let stale = controller.issue_request_token();
        let fresh = controller.issue_request_token();

        // The newer request's response lands first.
        assert!(controller.apply_working_list(fresh, vec![note(ID_TWO, "fresh")], ViewState::Loaded));
        // The slower, stale response must not overwrite it.
        assert!(!controller.apply_working_list(
            stale,
            vec![note(ID_ONE, "stale")],
            ViewState::SearchResults {
                query: "old".to_string()
            }
        ));

        assert_eq!(controller.notes()[0].id.as_str(), ID_TWO);
        assert_eq!(*controller.view(), ViewState::Loaded);
    }

    #[tokio::test]
    async fn fetch_does_not_touch_the_working_list() {
        let store = StubStore::default();
        store.notes.borrow_mut().push(note(ID_ONE, "a"));

        let (controller, _notifier) = controller(store);
        let id: NoteId = ID_ONE.parse().unwrap();
        let fetched = controller.fetch(&id).await.unwrap();

        assert_eq!(fetched.content, "a");
        assert!(controller.notes().is_empty());
        assert_eq!(*controller.view(), ViewState::Idle);
    }
}
