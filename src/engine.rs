//! Answer orchestration
//!
//! The [`Engine`] sequences the heuristics, context builder, prompt
//! composer, completion provider and chart renderer, and drives the
//! upload / change-sheet / follow-up protocol against a [`SessionStore`].
//!
//! Every public operation returns answer text. Input problems, provider
//! failures and internal errors all come back as fixed, user-facing
//! messages; nothing is returned as an error.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, error, info, warn};

use crate::chart::{render_trend, ChartRenderer, PngChartRenderer};
use crate::config::EngineConfig;
use crate::context::build_context;
use crate::dataset::{self, Dataset};
use crate::error::{Result, SheetQaError};
use crate::heuristics::{formula_explanation_request, net_income_ratio};
use crate::prompts::build_question_prompt;
use crate::providers::{CompletionFailure, Provider};
use crate::session::{Session, SessionStore};

/// Fixed user-facing messages for input and internal errors
pub mod messages {
    /// Upload without a file
    pub const NO_FILE: &str = "Error: No file uploaded. Please choose a spreadsheet to upload.";
    /// Upload or follow-up without a question
    pub const NO_QUESTION: &str =
        "Error: No question provided. Please enter a question about your data.";
    /// Parsed sheet has no data
    pub const EMPTY_SHEET: &str = "Error: The selected sheet is empty.";
    /// Follow-up or sheet change before any upload
    pub const NO_FILE_CONTEXT: &str = "Error: No file context found. Please upload a file first.";
    /// Anything unexpected while building the answer
    pub const INTERNAL: &str = "Error: There was an error processing your request.";
}

/// Spreadsheet question-answering engine
pub struct Engine {
    provider: Arc<dyn Provider>,
    renderer: Arc<dyn ChartRenderer>,
    sessions: Arc<SessionStore>,
    config: EngineConfig,
    timeout: Duration,
}

impl Engine {
    /// Create an engine
    ///
    /// The chart renderer is a PNG renderer sized from `config.chart`.
    pub fn new(
        provider: Arc<dyn Provider>,
        sessions: Arc<SessionStore>,
        config: EngineConfig,
    ) -> Self {
        let renderer = Arc::new(PngChartRenderer::new(
            config.chart.width,
            config.chart.height,
        ));
        let timeout = Duration::from_secs(config.timeout_seconds);
        Self {
            provider,
            renderer,
            sessions,
            config,
            timeout,
        }
    }

    /// Replace the chart renderer
    pub fn with_renderer(mut self, renderer: Arc<dyn ChartRenderer>) -> Self {
        self.renderer = renderer;
        self
    }

    /// Replace the completion timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Session store this engine reads and writes
    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    /// Upload a workbook and answer the first question about it
    ///
    /// The first sheet becomes active. On success the session identified
    /// by `session_id` is replaced with a fresh one whose history holds
    /// this single question and answer. On any input error the session is
    /// left untouched.
    pub async fn upload(
        &self,
        session_id: &str,
        file: Option<&Path>,
        question: Option<&str>,
    ) -> String {
        let Some(file) = file else {
            return messages::NO_FILE.to_string();
        };
        let Some(question) = non_blank(question) else {
            return messages::NO_QUESTION.to_string();
        };
        if !dataset::is_allowed_extension(file, &self.config.allowed_extensions) {
            return self.unsupported_file_message();
        }

        let (sheet_names, active) = match load_first_sheet(file) {
            Ok(loaded) => loaded,
            Err(e) => {
                warn!("Upload of {} failed: {:#}", file.display(), e);
                return self.load_failure_message(&e);
            }
        };

        info!(
            "Session {}: uploaded {} ({} sheets, active '{}')",
            session_id,
            file.display(),
            sheet_names.len(),
            active.name()
        );

        let answer = self.answer(&active, question).await;
        self.sessions.put(
            session_id,
            Session::from_upload(file, sheet_names, active, question, answer.clone()),
        );
        answer
    }

    /// Switch the session to another sheet and re-answer the original question
    ///
    /// Only the requested sheet is read. History is reset to a single
    /// entry. An unknown or unreadable sheet leaves the session unchanged.
    pub async fn change_sheet(&self, session_id: &str, sheet: &str) -> String {
        let Some(session) = self.sessions.get(session_id) else {
            return messages::NO_FILE_CONTEXT.to_string();
        };

        let dataset = if session.has_sheet(sheet) {
            dataset::read_sheet(session.file_path(), sheet)
        } else {
            Err(SheetQaError::SheetNotFound(sheet.to_string()).into())
        };
        let dataset = match dataset {
            Ok(dataset) => Arc::new(dataset),
            Err(e) => {
                warn!("Session {}: sheet change failed: {:#}", session_id, e);
                return self.load_failure_message(&e);
            }
        };

        info!("Session {}: switched to sheet '{}'", session_id, sheet);

        let answer = self.answer(&dataset, session.original_question()).await;
        let committed = self.sessions.update(session_id, |s| {
            s.switch_sheet(dataset, answer.clone());
        });
        if !committed {
            warn!("Session {} disappeared during sheet change", session_id);
        }
        answer
    }

    /// Ask a new question about the session's active sheet
    ///
    /// The answer is appended to the session history.
    pub async fn follow_up(&self, session_id: &str, question: Option<&str>) -> String {
        let Some(session) = self.sessions.get(session_id) else {
            return messages::NO_FILE_CONTEXT.to_string();
        };
        let Some(question) = non_blank(question) else {
            return messages::NO_QUESTION.to_string();
        };

        let answer = self.answer(session.active_dataset(), question).await;
        let committed = self.sessions.update(session_id, |s| {
            s.record_follow_up(question, answer.clone());
        });
        if !committed {
            warn!("Session {} disappeared during follow-up", session_id);
        }
        answer
    }

    /// Answer one question about a dataset
    ///
    /// Order: formula-explanation request (dataset not consulted), then
    /// the net income / revenue ratio, then a data-grounded completion
    /// with an optional trend chart appended.
    pub async fn answer(&self, dataset: &Dataset, question: &str) -> String {
        if let Some(prompt) = formula_explanation_request(question) {
            debug!("Formula-explanation request detected");
            return match self.complete(&prompt).await {
                Ok(text) => text,
                Err(failure) => failure.user_message().to_string(),
            };
        }

        if let Some(ratio) = net_income_ratio(dataset, question) {
            debug!("Answered with ratio heuristic: {}", ratio.ratio);
            return ratio.sentence();
        }

        or_internal_error(self.answer_from_data(dataset, question).await)
    }

    async fn answer_from_data(&self, dataset: &Dataset, question: &str) -> Result<String> {
        let context = build_context(dataset, self.config.preview_rows)?;
        let prompt = build_question_prompt(&context, question);
        debug!("Prompt for sheet '{}': {} chars", dataset.name(), prompt.len());

        let text = match self.complete(&prompt).await {
            Ok(text) => text,
            Err(failure) => return Ok(failure.user_message().to_string()),
        };

        let Some(trend) = context.trend.as_ref().filter(|_| self.config.chart.enabled) else {
            return Ok(text);
        };
        match render_trend(self.renderer.as_ref(), trend) {
            Ok(chart) => Ok(format!("{}\n\n{}", text, chart.to_img_tag())),
            Err(e) => {
                warn!("Chart rendering failed, returning text only: {:#}", e);
                Ok(text)
            }
        }
    }

    /// Send one prompt to the provider, bounded by the engine timeout
    ///
    /// No call is made when the provider lacks credentials. Failures are
    /// never retried.
    pub async fn complete(&self, prompt: &str) -> std::result::Result<String, CompletionFailure> {
        if !self.provider.has_credentials() {
            error!("Provider {} has no credentials", self.provider.name());
            return Err(CompletionFailure::MissingCredentials);
        }

        let failure = match tokio::time::timeout(self.timeout, self.provider.generate(prompt)).await
        {
            Ok(Ok(text)) => return Ok(text),
            Ok(Err(e)) => {
                error!("Provider {} failed: {:#}", self.provider.name(), e);
                CompletionFailure::classify(&e)
            }
            Err(_) => {
                error!(
                    "Provider {} timed out after {:?}",
                    self.provider.name(),
                    self.timeout
                );
                CompletionFailure::Timeout
            }
        };
        Err(failure)
    }

    fn unsupported_file_message(&self) -> String {
        let allowed: Vec<String> = self
            .config
            .allowed_extensions
            .iter()
            .map(|ext| format!(".{}", ext.trim_start_matches('.')))
            .collect();
        format!(
            "Error: Unsupported file type. Please upload one of: {}.",
            allowed.join(", ")
        )
    }

    fn load_failure_message(&self, error: &anyhow::Error) -> String {
        match error.downcast_ref::<SheetQaError>() {
            Some(SheetQaError::EmptySheet(_)) => messages::EMPTY_SHEET.to_string(),
            Some(SheetQaError::UnsupportedFile(_)) => self.unsupported_file_message(),
            Some(SheetQaError::SheetNotFound(sheet)) => {
                format!("Error reading sheet: {}", sheet)
            }
            _ => format!("Error reading file: {}", error),
        }
    }
}

/// Answer text, or the generic message when building it failed
fn or_internal_error(result: Result<String>) -> String {
    result.unwrap_or_else(|e| {
        error!("Failed to answer question: {:#}", e);
        messages::INTERNAL.to_string()
    })
}

fn non_blank(text: Option<&str>) -> Option<&str> {
    text.map(str::trim).filter(|t| !t.is_empty())
}

fn load_first_sheet(file: &Path) -> Result<(Vec<String>, Arc<Dataset>)> {
    let sheet_names = dataset::sheet_names(file)?;
    let first = sheet_names
        .first()
        .ok_or_else(|| SheetQaError::EmptySheet(file.display().to_string()))?;
    let active = dataset::read_sheet(file, first)?;
    Ok((sheet_names, Arc::new(active)))
}
