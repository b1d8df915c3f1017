//! Docdesk core: pure controller state machines and view-model helpers.
//!
//! Nothing here touches the network or the clock. The engine feeds results
//! back in as [`Msg`] values and executes the returned [`Effect`]s.
mod effect;
mod format;
mod indexation;
mod msg;
mod search;
mod state;
mod update;
mod upload;
mod validate;
mod view_model;
pub mod wire;

pub use effect::{ConfirmedAction, Effect};
pub use format::{excerpt, format_elapsed, format_score, format_size_kb, percent, EXCERPT_CHARS};
pub use indexation::{IndexResults, IndexStatus, IndexationState, LogEntry, StepStatus, STEP_LABELS};
pub use msg::{IndexationMsg, Msg, SearchMsg, SearchParameters, UploadMsg};
pub use search::{ChatMessage, IndexAvailability, SearchState, NO_INDEX_MESSAGE, WELCOME_MESSAGE};
pub use state::{AppState, Notice, Page, RequestError, RequestState, Tone};
pub use update::update;
pub use upload::{DocumentEntry, UploadProgress, UploadState, UploadStatus};
pub use validate::{
    has_allowed_extension, validate_candidate, FileCandidate, Rejection, ALLOWED_EXTENSIONS,
    MAX_UPLOAD_BYTES,
};
pub use view_model::{
    AppViewModel, DocumentCard, DocumentKind, IndexationView, LogLineView, MessageKind,
    MessageView, ResultCard, SearchView, SourceView, StatRow, StepView, UploadProgressView,
    UploadView,
};
