//! Upload page: document list, per-file validation and upload progress.

use crate::format::{format_size_kb, percent};
use crate::validate::validate_candidate;
use crate::view_model::{DocumentCard, DocumentKind, UploadProgressView, UploadView};
use crate::wire::{FileListing, UploadedFile};
use crate::{AppState, ConfirmedAction, Effect, Notice, RequestError, Tone, UploadMsg};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentEntry {
    pub filename: String,
    pub size: u64,
    pub date: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadStatus {
    Uploading,
    Succeeded,
    Failed(String),
}

/// Transient progress of the file currently handled by the batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadProgress {
    pub filename: String,
    pub percent: u8,
    pub status: UploadStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UploadState {
    documents: Vec<DocumentEntry>,
    progress: Option<UploadProgress>,
    batch_errored: bool,
    /// Whether any file of the current batch reached the server.
    batch_sent: bool,
    notice: Option<Notice>,
}

impl UploadState {
    pub fn documents(&self) -> &[DocumentEntry] {
        &self.documents
    }

    pub fn progress(&self) -> Option<&UploadProgress> {
        self.progress.as_ref()
    }

    pub fn batch_errored(&self) -> bool {
        self.batch_errored
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    fn listed_names(&self) -> impl Iterator<Item = &str> {
        self.documents.iter().map(|doc| doc.filename.as_str())
    }

    fn replace_documents(&mut self, listing: FileListing) {
        self.documents = listing
            .files
            .into_iter()
            .map(|file| DocumentEntry {
                filename: file.name,
                size: file.size,
                date: file.date,
            })
            .collect();
    }

    fn show_error(&mut self, filename: &str, message: String) {
        self.batch_errored = true;
        self.progress = Some(UploadProgress {
            filename: filename.to_string(),
            percent: 100,
            status: UploadStatus::Failed(message),
        });
    }

    pub fn view(&self) -> UploadView {
        let file_count = self.documents.len();
        let next_step_message = if file_count > 0 {
            format!("You have {file_count} document(s). Move on to indexing!")
        } else {
            "Upload at least one document to continue.".to_string()
        };
        UploadView {
            documents: self
                .documents
                .iter()
                .map(|doc| DocumentCard {
                    name: doc.filename.clone(),
                    kind: DocumentKind::from_filename(&doc.filename),
                    size_label: format_size_kb(doc.size),
                    date: doc.date.clone(),
                })
                .collect(),
            file_count,
            empty: file_count == 0,
            next_step_enabled: file_count > 0,
            delete_all_enabled: file_count > 0,
            next_step_message,
            progress: self.progress.as_ref().map(UploadProgressView::from_progress),
            notice: self.notice.clone(),
        }
    }
}

pub(crate) fn update(state: &mut AppState, msg: UploadMsg) -> Vec<Effect> {
    match msg {
        UploadMsg::Opened => vec![Effect::RefreshDocuments],
        UploadMsg::DocumentsListed(listing) => {
            state.upload.replace_documents(listing);
            state.mark_dirty();
            Vec::new()
        }
        UploadMsg::FilesChosen(files) => {
            if files.is_empty() {
                return Vec::new();
            }
            state.upload.batch_errored = false;
            state.upload.batch_sent = false;
            state.upload.notice = None;
            state.mark_dirty();
            vec![Effect::UploadBatch { files }]
        }
        UploadMsg::FileQueued(file) => {
            state.mark_dirty();
            if let Err(rejection) = validate_candidate(&file, state.upload.listed_names()) {
                state.upload.show_error(&file.name, rejection.to_string());
                return Vec::new();
            }
            state.upload.batch_sent = true;
            state.upload.progress = Some(UploadProgress {
                filename: file.name.clone(),
                percent: 0,
                status: UploadStatus::Uploading,
            });
            vec![Effect::SendUpload { file }]
        }
        UploadMsg::Progress { loaded, total } => {
            let pct = percent(loaded, total);
            if let Some(progress) = state.upload.progress.as_mut() {
                if progress.status == UploadStatus::Uploading && progress.percent != pct {
                    progress.percent = pct;
                    state.mark_dirty();
                }
            }
            Vec::new()
        }
        UploadMsg::FileUploaded(file) => {
            let UploadedFile {
                filename,
                size,
                date,
            } = file;
            state.upload.progress = Some(UploadProgress {
                filename: filename.clone(),
                percent: 100,
                status: UploadStatus::Succeeded,
            });
            state.upload.documents.insert(
                0,
                DocumentEntry {
                    filename,
                    size,
                    date,
                },
            );
            state.mark_dirty();
            Vec::new()
        }
        UploadMsg::UploadFailed { filename, error } => {
            let message = match &error {
                RequestError::Network { .. } => "Network error during upload".to_string(),
                RequestError::Server { .. } => error
                    .server_message()
                    .unwrap_or("Upload failed")
                    .to_string(),
            };
            state.upload.show_error(&filename, message);
            state.mark_dirty();
            Vec::new()
        }
        UploadMsg::BatchFinished => match (state.upload.batch_errored, state.upload.batch_sent) {
            // Every file was rejected locally; the server list cannot have changed.
            (true, false) => Vec::new(),
            (true, true) => vec![Effect::RefreshDocuments],
            (false, _) => vec![Effect::HideUploadProgressLater],
        },
        UploadMsg::ProgressHidden => {
            state.upload.progress = None;
            state.mark_dirty();
            vec![Effect::RefreshDocuments]
        }
        UploadMsg::DeleteRequested(filename) => vec![Effect::Confirm {
            prompt: format!("Are you sure you want to delete \"{filename}\"?"),
            action: ConfirmedAction::DeleteDocument { filename },
        }],
        UploadMsg::DeleteAllRequested => {
            let count = state.upload.documents.len();
            if count == 0 {
                return Vec::new();
            }
            vec![Effect::Confirm {
                prompt: format!("Are you sure you want to delete all {count} document(s)?"),
                action: ConfirmedAction::DeleteAllDocuments,
            }]
        }
        UploadMsg::DocumentDeleted { filename, response } => {
            state.upload.documents.retain(|doc| doc.filename != filename);
            let text = response
                .message
                .unwrap_or_else(|| format!("Deleted {filename}"));
            state.upload.notice = Some(Notice::new(Tone::Success, text));
            state.mark_dirty();
            Vec::new()
        }
        UploadMsg::AllDocumentsDeleted(response) => {
            state.upload.documents.clear();
            state.upload.notice = Some(Notice::new(
                Tone::Success,
                format!("{} file(s) deleted successfully", response.count),
            ));
            state.mark_dirty();
            Vec::new()
        }
        UploadMsg::DeleteFailed(error) => {
            let text = match &error {
                RequestError::Network { .. } => "Network error during deletion".to_string(),
                RequestError::Server { .. } => format!(
                    "Deletion failed: {}",
                    error.server_message().unwrap_or("unknown error")
                ),
            };
            state.upload.notice = Some(Notice::new(Tone::Error, text));
            state.mark_dirty();
            Vec::new()
        }
    }
}
