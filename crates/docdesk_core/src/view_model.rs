use crate::indexation::StepStatus;
use crate::upload::{UploadProgress, UploadStatus};
use crate::wire::IndexRequest;
use crate::{Notice, Tone};

#[derive(Debug, Clone, PartialEq, Default)]
pub struct AppViewModel {
    pub upload: UploadView,
    pub indexation: IndexationView,
    pub search: SearchView,
    pub dirty: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UploadView {
    pub documents: Vec<DocumentCard>,
    pub file_count: usize,
    pub empty: bool,
    pub next_step_message: String,
    pub next_step_enabled: bool,
    pub delete_all_enabled: bool,
    pub progress: Option<UploadProgressView>,
    pub notice: Option<Notice>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Pdf,
    Text,
    Markdown,
    Word,
    Other,
}

impl DocumentKind {
    pub fn from_filename(name: &str) -> Self {
        let ext = name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "pdf" => DocumentKind::Pdf,
            "txt" => DocumentKind::Text,
            "md" => DocumentKind::Markdown,
            "doc" | "docx" => DocumentKind::Word,
            _ => DocumentKind::Other,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentCard {
    pub name: String,
    pub kind: DocumentKind,
    pub size_label: String,
    pub date: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadProgressView {
    pub filename: String,
    pub percent: u8,
    pub percent_label: String,
    pub status_text: String,
    pub tone: Tone,
}

impl UploadProgressView {
    pub(crate) fn from_progress(progress: &UploadProgress) -> Self {
        let (percent_label, status_text, tone) = match &progress.status {
            UploadStatus::Uploading => (
                format!("{}%", progress.percent),
                "Uploading...".to_string(),
                Tone::Info,
            ),
            UploadStatus::Succeeded => (
                "100%".to_string(),
                "Upload succeeded!".to_string(),
                Tone::Success,
            ),
            UploadStatus::Failed(message) => {
                ("Error".to_string(), format!("✗ {message}"), Tone::Error)
            }
        };
        Self {
            filename: progress.filename.clone(),
            percent: progress.percent,
            percent_label,
            status_text,
            tone,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct IndexationView {
    pub running: bool,
    pub start_enabled: bool,
    pub form: IndexRequest,
    pub progress_visible: bool,
    pub steps: Vec<StepView>,
    pub progress_percent: u8,
    pub progress_text: String,
    pub log: Vec<LogLineView>,
    /// Four cards once a job succeeded, in display order.
    pub results: Option<Vec<ResultCard>>,
    pub index_status_label: String,
    pub stats: Vec<StatRow>,
    pub warning: Option<String>,
    pub notice: Option<Notice>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepView {
    pub number: usize,
    pub label: String,
    pub status: StepStatus,
    pub status_text: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogLineView {
    pub text: String,
    pub tone: Tone,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultCard {
    pub label: String,
    pub value: String,
}

impl ResultCard {
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatRow {
    pub label: String,
    pub value: String,
}

impl StatRow {
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SearchView {
    pub messages: Vec<MessageView>,
    pub loading: bool,
    pub send_enabled: bool,
    pub history_label: String,
    pub document_count: usize,
    pub chunk_count: u64,
    pub model_name: String,
    pub show_sources: bool,
    pub index_missing: bool,
    pub warning: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    System,
    User,
    Assistant,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageView {
    pub kind: MessageKind,
    pub text: String,
    pub sources_header: Option<String>,
    pub sources: Vec<SourceView>,
    /// Model and token usage line under an answer.
    pub meta: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceView {
    pub heading: String,
    pub score_label: String,
    pub excerpt: String,
}
