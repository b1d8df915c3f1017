use crate::wire::{IndexRequest, SearchRequest};
use crate::{FileCandidate, Page};

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// `GET /api/files`, answered with `UploadMsg::DocumentsListed`.
    RefreshDocuments,
    /// Run the files one at a time, in order, feeding each to `UploadMsg::FileQueued`.
    UploadBatch { files: Vec<FileCandidate> },
    /// `POST /api/upload` for a file that passed validation.
    SendUpload { file: FileCandidate },
    /// Hide the upload progress panel after the configured delay.
    HideUploadProgressLater,
    /// Ask the user before an irreversible action.
    Confirm {
        prompt: String,
        action: ConfirmedAction,
    },
    DeleteDocument { filename: String },
    DeleteAllDocuments,
    StartIndexing { request: IndexRequest },
    FetchIndexStats { target: Page },
    DeleteIndex,
    AskQuestion { request: SearchRequest },
}

/// Destructive actions gated behind a confirmation prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmedAction {
    DeleteDocument { filename: String },
    DeleteAllDocuments,
    DeleteIndex,
}
