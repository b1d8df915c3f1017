use std::fmt;

use crate::indexation::IndexationState;
use crate::search::SearchState;
use crate::upload::UploadState;
use crate::view_model::AppViewModel;
use crate::wire::IndexRequest;
use crate::SearchParameters;

/// The page a controller belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Page {
    Upload,
    Indexation,
    Search,
}

/// Single-flight guard owned by a controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RequestState {
    #[default]
    Idle,
    InFlight,
}

impl RequestState {
    pub fn is_in_flight(self) -> bool {
        self == RequestState::InFlight
    }
}

/// Failure of one backend call, as far as the controllers care.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestError {
    /// The request never produced a usable reply (connection, timeout, body).
    Network { detail: String },
    /// The backend answered with a non-2xx status or `success: false`.
    Server {
        status: Option<u16>,
        message: Option<String>,
    },
}

impl RequestError {
    pub fn network(detail: impl Into<String>) -> Self {
        RequestError::Network {
            detail: detail.into(),
        }
    }

    pub fn server(status: Option<u16>, message: Option<String>) -> Self {
        RequestError::Server { status, message }
    }

    /// The backend's own message, if it sent one.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            RequestError::Server {
                message: Some(message),
                ..
            } => Some(message.as_str()),
            _ => None,
        }
    }
}

impl fmt::Display for RequestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestError::Network { detail } => write!(f, "network error: {detail}"),
            RequestError::Server {
                status,
                message: Some(message),
            } => match status {
                Some(code) => write!(f, "server error {code}: {message}"),
                None => write!(f, "server error: {message}"),
            },
            RequestError::Server {
                status: Some(code),
                message: None,
            } => write!(f, "server error {code}"),
            RequestError::Server {
                status: None,
                message: None,
            } => write!(f, "server error"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Info,
    Success,
    Warning,
    Error,
}

/// A one-off message for the user (the browser's `alert`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub tone: Tone,
    pub text: String,
}

impl Notice {
    pub fn new(tone: Tone, text: impl Into<String>) -> Self {
        Self {
            tone,
            text: text.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct AppState {
    pub(crate) upload: UploadState,
    pub(crate) indexation: IndexationState,
    pub(crate) search: SearchState,
    dirty: bool,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts with the user's preferred indexation form and search knobs.
    pub fn with_defaults(
        index_form: IndexRequest,
        search_params: SearchParameters,
        show_sources: bool,
    ) -> Self {
        Self {
            indexation: IndexationState::with_form(index_form),
            search: SearchState::with_parameters(search_params, show_sources),
            ..Self::default()
        }
    }

    pub fn upload(&self) -> &UploadState {
        &self.upload
    }

    pub fn indexation(&self) -> &IndexationState {
        &self.indexation
    }

    pub fn search(&self) -> &SearchState {
        &self.search
    }

    pub fn view(&self) -> AppViewModel {
        AppViewModel {
            upload: self.upload.view(),
            indexation: self.indexation.view(),
            search: self.search.view(),
            dirty: self.dirty,
        }
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Returns whether anything changed since the last call and clears the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }
}
