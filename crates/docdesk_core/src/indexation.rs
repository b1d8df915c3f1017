//! Indexation page: one blocking indexing job at a time, with cosmetic steps.
//!
//! The backend reports nothing until the job is done, so the four steps only
//! track the clock while the request is outstanding. They never claim the
//! job is finished before the response arrives.

use crate::format::format_elapsed;
use crate::view_model::{IndexationView, LogLineView, ResultCard, StatRow, StepView};
use crate::wire::{IndexRequest, IndexResponse, IndexStats};
use crate::{
    AppState, ConfirmedAction, Effect, IndexationMsg, Notice, Page, RequestError, RequestState,
    Tone,
};

pub const STEP_LABELS: [&str; 4] = [
    "Text extraction",
    "Chunking",
    "Embedding generation",
    "Index saving",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StepStatus {
    #[default]
    Pending,
    Active,
    Completed,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IndexStatus {
    #[default]
    Unknown,
    NotIndexed,
    Indexed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub at: String,
    pub text: String,
    pub tone: Tone,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IndexResults {
    pub documents_processed: u64,
    pub total_chunks: u64,
    pub total_vectors: u64,
    pub elapsed_time: f64,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct IndexationState {
    form: IndexRequest,
    request: RequestState,
    steps: [StepStatus; 4],
    progress: u8,
    progress_visible: bool,
    log: Vec<LogEntry>,
    results: Option<IndexResults>,
    index_status: IndexStatus,
    stats: Option<IndexStats>,
    warning: Option<String>,
    notice: Option<Notice>,
}

impl IndexationState {
    pub fn with_form(form: IndexRequest) -> Self {
        Self {
            form,
            ..Self::default()
        }
    }

    pub fn form(&self) -> &IndexRequest {
        &self.form
    }

    pub fn request(&self) -> RequestState {
        self.request
    }

    pub fn steps(&self) -> [StepStatus; 4] {
        self.steps
    }

    pub fn progress(&self) -> u8 {
        self.progress
    }

    pub fn results(&self) -> Option<&IndexResults> {
        self.results.as_ref()
    }

    pub fn index_status(&self) -> IndexStatus {
        self.index_status
    }

    pub fn warning(&self) -> Option<&str> {
        self.warning.as_deref()
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn log(&self) -> &[LogEntry] {
        &self.log
    }

    fn push_log(&mut self, at: String, text: impl Into<String>, tone: Tone) {
        self.log.push(LogEntry {
            at,
            text: text.into(),
            tone,
        });
    }

    fn active_step(&self) -> Option<usize> {
        self.steps.iter().position(|s| *s == StepStatus::Active)
    }

    pub fn view(&self) -> IndexationView {
        let steps = STEP_LABELS
            .iter()
            .zip(self.steps.iter())
            .enumerate()
            .map(|(idx, (label, status))| StepView {
                number: idx + 1,
                label: (*label).to_string(),
                status: *status,
                status_text: match status {
                    StepStatus::Pending => "Waiting...",
                    StepStatus::Active => "In progress...",
                    StepStatus::Completed => "Done",
                    StepStatus::Error => "Error",
                }
                .to_string(),
            })
            .collect();

        let results = self.results.as_ref().map(|r| {
            vec![
                ResultCard::new("Documents processed", r.documents_processed.to_string()),
                ResultCard::new("Total chunks", r.total_chunks.to_string()),
                ResultCard::new("Vectors indexed", r.total_vectors.to_string()),
                ResultCard::new("Elapsed time", format_elapsed(r.elapsed_time)),
            ]
        });

        let mut stats = Vec::new();
        if let Some(s) = self.stats.as_ref().filter(|s| s.indexed) {
            if let Some(chunks) = s.total_chunks.filter(|c| *c > 0) {
                stats.push(StatRow::new("Total chunks indexed", chunks.to_string()));
            }
            if let Some(model) = s.model.as_ref().filter(|m| !m.is_empty()) {
                stats.push(StatRow::new("Model used", model.clone()));
            }
        }

        IndexationView {
            running: self.request.is_in_flight(),
            start_enabled: !self.request.is_in_flight(),
            form: self.form.clone(),
            progress_visible: self.progress_visible,
            steps,
            progress_percent: self.progress,
            progress_text: format!("{}%", self.progress),
            log: self
                .log
                .iter()
                .map(|entry| LogLineView {
                    text: format!("[{}] {}", entry.at, entry.text),
                    tone: entry.tone,
                })
                .collect(),
            results,
            index_status_label: match self.index_status {
                IndexStatus::Unknown => "Unknown",
                IndexStatus::NotIndexed => "No",
                IndexStatus::Indexed => "Yes",
            }
            .to_string(),
            stats,
            warning: self.warning.clone(),
            notice: self.notice.clone(),
        }
    }
}

pub(crate) fn update(state: &mut AppState, msg: IndexationMsg) -> Vec<Effect> {
    match msg {
        IndexationMsg::Opened => vec![Effect::FetchIndexStats {
            target: Page::Indexation,
        }],
        IndexationMsg::StartRequested { config, at } => {
            let idx = &mut state.indexation;
            if idx.request.is_in_flight() {
                idx.warning = Some("An indexing job is already running".to_string());
                state.mark_dirty();
                return Vec::new();
            }
            idx.form = config.clone();
            idx.request = RequestState::InFlight;
            idx.results = None;
            idx.steps = [StepStatus::Pending; 4];
            idx.steps[0] = StepStatus::Active;
            idx.progress = 0;
            idx.progress_visible = true;
            idx.log.clear();
            idx.warning = None;
            idx.notice = None;
            idx.push_log(at, "Starting indexation...", Tone::Info);
            state.mark_dirty();
            vec![Effect::StartIndexing { request: config }]
        }
        IndexationMsg::StepTick => {
            let idx = &mut state.indexation;
            if !idx.request.is_in_flight() {
                return Vec::new();
            }
            if let Some(active) = idx.active_step() {
                if active + 1 < idx.steps.len() {
                    idx.steps[active] = StepStatus::Completed;
                    idx.steps[active + 1] = StepStatus::Active;
                    idx.progress = ((active + 1) * 100 / idx.steps.len()) as u8;
                    state.mark_dirty();
                }
            }
            Vec::new()
        }
        IndexationMsg::Completed { response, at } => {
            let idx = &mut state.indexation;
            idx.request = RequestState::Idle;
            idx.steps = [StepStatus::Completed; 4];
            idx.progress = 100;
            idx.progress_visible = false;
            idx.index_status = IndexStatus::Indexed;
            idx.warning = None;
            idx.push_log(
                at,
                format!(
                    "Indexation finished in {}",
                    format_elapsed(response.elapsed_time)
                ),
                Tone::Success,
            );
            idx.results = Some(results_from(&response));
            state.mark_dirty();
            vec![Effect::FetchIndexStats {
                target: Page::Indexation,
            }]
        }
        IndexationMsg::Failed { error, at } => {
            let idx = &mut state.indexation;
            idx.request = RequestState::Idle;
            if let Some(active) = idx.active_step() {
                idx.steps[active] = StepStatus::Error;
            }
            let message = match &error {
                RequestError::Network { .. } => "Network error during indexation".to_string(),
                RequestError::Server { .. } => error
                    .server_message()
                    .unwrap_or("Indexing failed")
                    .to_string(),
            };
            idx.push_log(at, format!("Error: {message}"), Tone::Error);
            idx.notice = Some(Notice::new(
                Tone::Error,
                format!("Indexation failed: {message}"),
            ));
            state.mark_dirty();
            Vec::new()
        }
        IndexationMsg::StatsLoaded(stats) => {
            let idx = &mut state.indexation;
            idx.index_status = if stats.indexed {
                IndexStatus::Indexed
            } else {
                IndexStatus::NotIndexed
            };
            idx.stats = Some(stats);
            state.mark_dirty();
            Vec::new()
        }
        IndexationMsg::StatsFailed(_) => Vec::new(),
        IndexationMsg::DeleteIndexRequested => vec![Effect::Confirm {
            prompt: "Are you sure you want to delete the index? This cannot be undone and \
                     your documents will need to be indexed again."
                .to_string(),
            action: ConfirmedAction::DeleteIndex,
        }],
        IndexationMsg::IndexDeleted(response) => {
            let form = state.indexation.form.clone();
            state.indexation = IndexationState::with_form(form);
            state.indexation.notice = Some(Notice::new(
                Tone::Success,
                response
                    .message
                    .unwrap_or_else(|| "Index deleted".to_string()),
            ));
            state.mark_dirty();
            vec![Effect::FetchIndexStats {
                target: Page::Indexation,
            }]
        }
        IndexationMsg::DeleteIndexFailed(error) => {
            let text = match &error {
                RequestError::Network { .. } => "Error while deleting the index".to_string(),
                RequestError::Server { .. } => format!(
                    "Error: {}",
                    error
                        .server_message()
                        .unwrap_or("Could not delete the index")
                ),
            };
            state.indexation.notice = Some(Notice::new(Tone::Error, text));
            state.mark_dirty();
            Vec::new()
        }
    }
}

fn results_from(response: &IndexResponse) -> IndexResults {
    IndexResults {
        documents_processed: response.documents_processed,
        total_chunks: response.total_chunks,
        total_vectors: response.total_vectors,
        elapsed_time: response.elapsed_time,
    }
}
