use std::fmt;

use docdesk_core::RequestError;

/// Progress of one streaming upload body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadProgressEvent {
    pub loaded: u64,
    pub total: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct ApiError {
    pub kind: FailureKind,
    pub message: String,
    /// The backend's `error` field, when the reply carried one.
    pub server_message: Option<String>,
}

impl ApiError {
    pub(crate) fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            server_message: None,
        }
    }

    pub(crate) fn from_server(kind: FailureKind, server_message: Option<String>) -> Self {
        let message = server_message
            .clone()
            .unwrap_or_else(|| "no error message in reply".to_string());
        Self {
            kind,
            message,
            server_message,
        }
    }

    /// True when the request never got a usable reply from the backend.
    pub fn is_transport(&self) -> bool {
        !matches!(self.kind, FailureKind::HttpStatus(_) | FailureKind::Rejected)
    }
}

impl From<ApiError> for RequestError {
    fn from(err: ApiError) -> Self {
        match err.kind {
            FailureKind::HttpStatus(code) => RequestError::server(Some(code), err.server_message),
            FailureKind::Rejected => RequestError::server(None, err.server_message),
            _ => RequestError::network(err.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    InvalidUrl,
    Network,
    Timeout,
    HttpStatus(u16),
    /// 2xx reply with `success: false`.
    Rejected,
    Decode,
    Io,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidUrl => write!(f, "invalid url"),
            FailureKind::Network => write!(f, "network error"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Rejected => write!(f, "rejected by server"),
            FailureKind::Decode => write!(f, "malformed reply"),
            FailureKind::Io => write!(f, "io error"),
        }
    }
}
