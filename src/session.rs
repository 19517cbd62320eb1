//! Per-session state
//!
//! A [`Session`] holds everything one user interaction needs across
//! upload, sheet change and follow-up: the active dataset, the workbook's
//! sheet names, the selected sheet, the question asked at upload time and
//! the question/answer history.
//!
//! Transition rules:
//!
//! - upload: new session, history reset to one entry
//! - sheet change: active dataset replaced, history reset to one entry
//!   answering the *original* question
//! - follow-up: history appended, dataset untouched
//!
//! [`SessionStore`] keys sessions by an opaque identifier. It locks only
//! for the duration of a read or write, never across a completion request.
//! Callers must run at most one operation per session at a time; two
//! concurrent operations on the same session resolve as last writer wins.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use serde::Serialize;

use crate::dataset::Dataset;

/// One question and the answer given to it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QaEntry {
    /// Question as asked
    pub question: String,
    /// Answer text returned to the user
    pub answer: String,
}

impl QaEntry {
    /// Create an entry
    pub fn new(question: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            answer: answer.into(),
        }
    }
}

/// State of one user interaction
#[derive(Debug, Clone)]
pub struct Session {
    file_path: PathBuf,
    sheet_names: Vec<String>,
    selected_sheet: String,
    active: Arc<Dataset>,
    original_question: String,
    history: Vec<QaEntry>,
}

impl Session {
    /// Start a session from a freshly uploaded workbook
    ///
    /// The selected sheet is the dataset's sheet and the history holds
    /// exactly the upload question and its answer.
    pub fn from_upload(
        file_path: impl Into<PathBuf>,
        sheet_names: Vec<String>,
        active: Arc<Dataset>,
        question: impl Into<String>,
        answer: impl Into<String>,
    ) -> Self {
        let question = question.into();
        Self {
            file_path: file_path.into(),
            sheet_names,
            selected_sheet: active.name().to_string(),
            active,
            history: vec![QaEntry::new(question.clone(), answer)],
            original_question: question,
        }
    }

    /// Replace the active sheet and reset history to the original question
    pub fn switch_sheet(&mut self, dataset: Arc<Dataset>, answer: impl Into<String>) {
        self.selected_sheet = dataset.name().to_string();
        self.active = dataset;
        self.history = vec![QaEntry::new(self.original_question.clone(), answer)];
    }

    /// Append a follow-up question and its answer
    pub fn record_follow_up(&mut self, question: impl Into<String>, answer: impl Into<String>) {
        self.history.push(QaEntry::new(question, answer));
    }

    /// Path of the uploaded workbook
    pub fn file_path(&self) -> &Path {
        &self.file_path
    }

    /// Sheet names in workbook order
    pub fn sheet_names(&self) -> &[String] {
        &self.sheet_names
    }

    /// Currently selected sheet
    pub fn selected_sheet(&self) -> &str {
        &self.selected_sheet
    }

    /// Currently active dataset
    pub fn active_dataset(&self) -> &Arc<Dataset> {
        &self.active
    }

    /// Question asked at upload time
    pub fn original_question(&self) -> &str {
        &self.original_question
    }

    /// Question/answer history in insertion order
    pub fn history(&self) -> &[QaEntry] {
        &self.history
    }

    /// Whether the workbook has a sheet with this exact name
    pub fn has_sheet(&self, name: &str) -> bool {
        self.sheet_names.iter().any(|s| s == name)
    }
}

/// In-memory sessions keyed by session identifier
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: RwLock<HashMap<String, Session>>,
}

impl SessionStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Generate a fresh session identifier
    ///
    /// # Examples
    ///
    /// ```
    /// use sheetqa::session::SessionStore;
    ///
    /// assert_ne!(SessionStore::new_session_id(), SessionStore::new_session_id());
    /// ```
    pub fn new_session_id() -> String {
        uuid::Uuid::new_v4().to_string()
    }

    /// Snapshot of a session
    ///
    /// The dataset is shared, so this is cheap.
    pub fn get(&self, id: &str) -> Option<Session> {
        self.sessions
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(id)
            .cloned()
    }

    /// Insert or replace a session
    pub fn put(&self, id: impl Into<String>, session: Session) {
        self.sessions
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(id.into(), session);
    }

    /// Apply a change to an existing session
    ///
    /// Returns false if no session has this identifier.
    pub fn update(&self, id: &str, change: impl FnOnce(&mut Session)) -> bool {
        let mut sessions = self
            .sessions
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        match sessions.get_mut(id) {
            Some(session) => {
                change(session);
                true
            }
            None => false,
        }
    }

    /// Drop a session, returning it if it existed
    pub fn remove(&self, id: &str) -> Option<Session> {
        self.sessions
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .remove(id)
    }

    /// Number of live sessions
    pub fn len(&self) -> usize {
        self.sessions
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    /// True when no sessions are stored
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
