use std::sync::Arc;

use futures_util::StreamExt;
use reqwest::multipart::{Form, Part};
use tokio::sync::mpsc;
use tokio_util::io::ReaderStream;

use docdesk_core::FileCandidate;

use crate::{ApiError, FailureKind, UploadProgressEvent};

const CHUNK_BYTES: usize = 64 * 1024;

pub trait ProgressSink: Send + Sync {
    fn emit(&self, event: UploadProgressEvent);
}

/// Forwards progress to the engine loop; a closed receiver drops events.
pub struct ChannelProgressSink {
    tx: mpsc::UnboundedSender<UploadProgressEvent>,
}

impl ChannelProgressSink {
    pub fn new(tx: mpsc::UnboundedSender<UploadProgressEvent>) -> Self {
        Self { tx }
    }
}

impl ProgressSink for ChannelProgressSink {
    fn emit(&self, event: UploadProgressEvent) {
        let _ = self.tx.send(event);
    }
}

/// Builds the `file` multipart form, streaming the file from disk and
/// reporting bytes as the transport pulls them.
pub(crate) async fn streaming_form(
    file: &FileCandidate,
    sink: Arc<dyn ProgressSink>,
) -> Result<Form, ApiError> {
    let handle = tokio::fs::File::open(&file.path)
        .await
        .map_err(|err| io_error(file, err))?;
    let total = handle
        .metadata()
        .await
        .map_err(|err| io_error(file, err))?
        .len();

    sink.emit(UploadProgressEvent { loaded: 0, total });
    let mut loaded = 0u64;
    let stream = ReaderStream::with_capacity(handle, CHUNK_BYTES).map(move |chunk| {
        if let Ok(bytes) = &chunk {
            loaded += bytes.len() as u64;
            sink.emit(UploadProgressEvent { loaded, total });
        }
        chunk
    });

    let part = Part::stream_with_length(reqwest::Body::wrap_stream(stream), total)
        .file_name(file.name.clone());
    Ok(Form::new().part("file", part))
}

fn io_error(file: &FileCandidate, err: std::io::Error) -> ApiError {
    ApiError::new(
        FailureKind::Io,
        format!("{}: {err}", file.path.display()),
    )
}

/// Stats a local path into an upload candidate.
pub async fn candidate_from_path(path: impl AsRef<std::path::Path>) -> Result<FileCandidate, ApiError> {
    let path = path.as_ref();
    let metadata = tokio::fs::metadata(path)
        .await
        .map_err(|err| ApiError::new(FailureKind::Io, format!("{}: {err}", path.display())))?;
    if !metadata.is_file() {
        return Err(ApiError::new(
            FailureKind::Io,
            format!("{} is not a regular file", path.display()),
        ));
    }
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    Ok(FileCandidate::new(name, metadata.len(), path))
}
