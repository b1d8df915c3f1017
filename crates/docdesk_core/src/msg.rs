use crate::wire::{
    DeleteAllResponse, DeleteResponse, FileListing, IndexRequest, IndexResponse, IndexStats,
    SearchResponse, UploadedFile,
};
use crate::{ConfirmedAction, FileCandidate, RequestError};

#[derive(Debug, Clone, PartialEq)]
pub enum Msg {
    Upload(UploadMsg),
    Indexation(IndexationMsg),
    Search(SearchMsg),
    /// The user accepted a confirmation prompt.
    Confirmed(ConfirmedAction),
    /// The user declined a confirmation prompt.
    Declined(ConfirmedAction),
}

#[derive(Debug, Clone, PartialEq)]
pub enum UploadMsg {
    /// The upload page was opened.
    Opened,
    /// Server listing arrived; replaces the document list wholesale.
    DocumentsListed(FileListing),
    /// User picked or dropped files.
    FilesChosen(Vec<FileCandidate>),
    /// The batch runner reached this file.
    FileQueued(FileCandidate),
    /// Bytes handed to the transport for the file currently uploading.
    Progress { loaded: u64, total: u64 },
    FileUploaded(UploadedFile),
    UploadFailed {
        filename: String,
        error: RequestError,
    },
    /// Every file of the batch has been handled.
    BatchFinished,
    /// The post-batch delay elapsed.
    ProgressHidden,
    DeleteRequested(String),
    DeleteAllRequested,
    DocumentDeleted {
        filename: String,
        response: DeleteResponse,
    },
    AllDocumentsDeleted(DeleteAllResponse),
    DeleteFailed(RequestError),
}

#[derive(Debug, Clone, PartialEq)]
pub enum IndexationMsg {
    Opened,
    /// User pressed "start"; `at` is the wall-clock label for the log.
    StartRequested { config: IndexRequest, at: String },
    /// Cosmetic step advance while the indexing request is outstanding.
    StepTick,
    Completed { response: IndexResponse, at: String },
    Failed { error: RequestError, at: String },
    StatsLoaded(IndexStats),
    StatsFailed(RequestError),
    DeleteIndexRequested,
    IndexDeleted(DeleteResponse),
    DeleteIndexFailed(RequestError),
}

#[derive(Debug, Clone, PartialEq)]
pub enum SearchMsg {
    Opened,
    StatsLoaded(IndexStats),
    StatsFailed(RequestError),
    QuestionSubmitted(String),
    AnswerReceived(SearchResponse),
    AnswerFailed(RequestError),
    ClearHistory,
    SetShowSources(bool),
    SetParameters(SearchParameters),
}

/// Retrieval and sampling knobs sent with every question.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchParameters {
    pub top_k: u32,
    pub temperature: f32,
    pub max_tokens: u32,
    pub system_prompt: Option<String>,
}

impl Default for SearchParameters {
    fn default() -> Self {
        Self {
            top_k: 5,
            temperature: 0.7,
            max_tokens: 500,
            system_prompt: None,
        }
    }
}
