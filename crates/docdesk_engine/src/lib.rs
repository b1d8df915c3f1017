//! Docdesk engine: backend client and effect execution.
mod client;
mod engine;
mod types;
mod upload;

pub use client::{Backend, ClientSettings, ReqwestBackend};
pub use engine::{Clock, Confirm, Engine, Pacing, ViewSink};
pub use types::{ApiError, FailureKind, UploadProgressEvent};
pub use upload::{candidate_from_path, ChannelProgressSink, ProgressSink};
