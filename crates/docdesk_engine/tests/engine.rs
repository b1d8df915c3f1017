use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, Once};
use std::time::Duration;

use docdesk_core::wire::{
    DeleteAllResponse, DeleteResponse, FileListing, IndexRequest, IndexResponse, IndexStats,
    SearchRequest, SearchResponse, UploadedFile,
};
use docdesk_core::{
    AppState, AppViewModel, FileCandidate, Page, StepStatus, UploadStatus, NO_INDEX_MESSAGE,
};
use docdesk_engine::{
    ApiError, Backend, ClientSettings, Confirm, Engine, Pacing, ProgressSink, ReqwestBackend,
    UploadProgressEvent, ViewSink,
};
use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(docdesk_logging::initialize_for_tests);
}

#[derive(Clone, Default)]
struct RecordingView {
    views: Arc<Mutex<Vec<AppViewModel>>>,
}

impl RecordingView {
    fn all(&self) -> Vec<AppViewModel> {
        self.views.lock().unwrap().clone()
    }
}

impl ViewSink for RecordingView {
    fn render(&mut self, view: &AppViewModel) {
        self.views.lock().unwrap().push(view.clone());
    }
}

struct Answer(bool);

impl Confirm for Answer {
    fn confirm(&mut self, _prompt: &str) -> bool {
        self.0
    }
}

fn engine_with(backend: Arc<dyn Backend>, view: RecordingView, confirm: bool) -> Engine {
    Engine::new(AppState::new(), backend, Box::new(view), Box::new(Answer(confirm)))
        .with_pacing(Pacing::immediate())
        .with_clock(Arc::new(|| "12:00:00".to_string()))
}

fn http_backend(server: &MockServer) -> Arc<dyn Backend> {
    Arc::new(
        ReqwestBackend::new(ClientSettings {
            base_url: server.uri(),
            ..ClientSettings::default()
        })
        .unwrap(),
    )
}

#[tokio::test]
async fn uploading_a_pdf_posts_once_and_lists_the_card() {
    init_logging();
    let dir = tempfile::tempdir().unwrap();
    let file_path = dir.path().join("report.pdf");
    std::fs::write(&file_path, vec![0u8; 10_000]).unwrap();

    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/upload"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "filename": "report.pdf",
            "size": 10000,
            "date": "2024-05-01 10:00:00"
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/files"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "files": [{"name": "report.pdf", "size": 10000, "date": "2024-05-01 10:00:00"}]
        })))
        .mount(&server)
        .await;

    let view = RecordingView::default();
    let mut engine = engine_with(http_backend(&server), view.clone(), true);
    engine
        .upload(vec![FileCandidate::new("report.pdf", 10_000, &file_path)])
        .await;

    let upload = engine.state().upload().view();
    assert_eq!(upload.documents.len(), 1);
    assert_eq!(upload.documents[0].name, "report.pdf");
    assert_eq!(upload.documents[0].size_label, "9.77 KB");
    assert!(upload.progress.is_none());

    let succeeded = view.all().into_iter().any(|v| {
        v.upload
            .progress
            .is_some_and(|p| p.filename == "report.pdf" && p.percent_label == "100%")
    });
    assert!(succeeded);
}

#[tokio::test]
async fn disallowed_extension_never_reaches_the_server() {
    init_logging();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/upload"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let mut engine = engine_with(http_backend(&server), RecordingView::default(), true);
    engine
        .upload(vec![FileCandidate::new("malware.exe", 10, "/tmp/malware.exe")])
        .await;

    let received = server.received_requests().await.unwrap_or_default();
    assert!(received.is_empty());

    let progress = engine.state().upload().progress().cloned().unwrap();
    assert_eq!(progress.filename, "malware.exe");
    assert_eq!(
        progress.status,
        UploadStatus::Failed("File type not allowed: malware.exe".to_string())
    );
}

#[tokio::test]
async fn indexing_shows_the_four_results() {
    init_logging();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/index"))
        .and(body_json(json!({
            "chunk_size": 500,
            "chunk_overlap": 50,
            "embedding_model": "x"
        })))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_millis(120))
                .set_body_json(json!({
                    "success": true,
                    "documents_processed": 3,
                    "total_chunks": 42,
                    "total_vectors": 42,
                    "elapsed_time": 1.2
                })),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/index-stats"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "indexed": true,
            "total_chunks": 42,
            "model": "x"
        })))
        .mount(&server)
        .await;

    let view = RecordingView::default();
    let mut engine = engine_with(http_backend(&server), view.clone(), true).with_pacing(Pacing {
        step_interval: Duration::from_millis(10),
        ..Pacing::immediate()
    });
    engine
        .start_indexing(IndexRequest {
            chunk_size: 500,
            chunk_overlap: 50,
            embedding_model: "x".to_string(),
        })
        .await;

    let indexation = engine.state().indexation().view();
    let values: Vec<_> = indexation
        .results
        .unwrap()
        .into_iter()
        .map(|card| card.value)
        .collect();
    assert_eq!(values, vec!["3", "42", "42", "1.2s"]);
    assert_eq!(indexation.index_status_label, "Yes");
    assert!(!indexation.running);

    let advanced = view
        .all()
        .into_iter()
        .any(|v| v.indexation.steps[1].status == StepStatus::Active);
    assert!(advanced);
}

#[tokio::test]
async fn missing_index_blocks_the_search_request() {
    init_logging();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/index-stats"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"indexed": false})))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/search"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let mut engine = engine_with(http_backend(&server), RecordingView::default(), true);
    engine.open(Page::Search).await;
    engine.ask("What is in the report?").await;

    let last = engine.state().search().messages().last().cloned().unwrap();
    assert_eq!(last.text, NO_INDEX_MESSAGE);
}

#[tokio::test]
async fn follow_up_question_sends_prior_exchange_and_itself() {
    init_logging();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/index-stats"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"indexed": true})))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/search"))
        .and(body_json(json!({
            "question": "q1",
            "conversation_history": [{"role": "user", "content": "q1"}],
            "top_k": 5,
            "temperature": 0.7,
            "max_tokens": 500
        })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"success": true, "answer": "a1"})),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/search"))
        .and(body_json(json!({
            "question": "q2",
            "conversation_history": [
                {"role": "user", "content": "q1"},
                {"role": "assistant", "content": "a1"},
                {"role": "user", "content": "q2"}
            ],
            "top_k": 5,
            "temperature": 0.7,
            "max_tokens": 500
        })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"success": true, "answer": "a2"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let mut engine = engine_with(http_backend(&server), RecordingView::default(), true);
    engine.open(Page::Search).await;
    engine.ask("q1").await;
    engine.ask("q2").await;

    assert_eq!(engine.state().search().transcript().len(), 4);
    let last = engine.state().search().messages().last().cloned().unwrap();
    assert_eq!(last.text, "a2");
}

#[tokio::test]
async fn declined_confirmation_sends_nothing() {
    init_logging();
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/api/delete-index"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let mut engine = engine_with(http_backend(&server), RecordingView::default(), false);
    engine
        .dispatch(docdesk_core::Msg::Indexation(
            docdesk_core::IndexationMsg::DeleteIndexRequested,
        ))
        .await;
}

#[tokio::test]
async fn confirmed_delete_removes_the_document() {
    init_logging();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/files"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "files": [
                {"name": "my report.pdf", "size": 2048, "date": "2024-05-01 10:00:00"},
                {"name": "notes.md", "size": 100, "date": "2024-05-01 10:00:00"}
            ]
        })))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/delete/my%20report.pdf"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "message": "File deleted"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let mut engine = engine_with(http_backend(&server), RecordingView::default(), true);
    engine.open(Page::Upload).await;
    engine
        .dispatch(docdesk_core::Msg::Upload(
            docdesk_core::UploadMsg::DeleteRequested("my report.pdf".to_string()),
        ))
        .await;

    let names: Vec<_> = engine
        .state()
        .upload()
        .documents()
        .iter()
        .map(|d| d.filename.clone())
        .collect();
    assert_eq!(names, vec!["notes.md"]);
}

/// Records upload order and the peak number of concurrent uploads.
#[derive(Default)]
struct SerialCheckBackend {
    active: AtomicUsize,
    peak: AtomicUsize,
    order: Mutex<Vec<String>>,
}

#[async_trait::async_trait]
impl Backend for SerialCheckBackend {
    async fn list_files(&self) -> Result<FileListing, ApiError> {
        Ok(FileListing::default())
    }

    async fn upload(
        &self,
        file: &FileCandidate,
        sink: Arc<dyn ProgressSink>,
    ) -> Result<UploadedFile, ApiError> {
        let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        self.order.lock().unwrap().push(file.name.clone());
        sink.emit(UploadProgressEvent {
            loaded: file.size / 2,
            total: file.size,
        });
        tokio::time::sleep(Duration::from_millis(15)).await;
        sink.emit(UploadProgressEvent {
            loaded: file.size,
            total: file.size,
        });
        self.active.fetch_sub(1, Ordering::SeqCst);
        Ok(UploadedFile {
            filename: file.name.clone(),
            size: file.size,
            date: "2024-05-01 10:00:00".to_string(),
        })
    }

    async fn delete_file(&self, _filename: &str) -> Result<DeleteResponse, ApiError> {
        Ok(DeleteResponse::default())
    }

    async fn delete_all(&self) -> Result<DeleteAllResponse, ApiError> {
        Ok(DeleteAllResponse::default())
    }

    async fn start_index(&self, _request: &IndexRequest) -> Result<IndexResponse, ApiError> {
        Ok(IndexResponse::default())
    }

    async fn index_stats(&self) -> Result<IndexStats, ApiError> {
        Ok(IndexStats::default())
    }

    async fn delete_index(&self) -> Result<DeleteResponse, ApiError> {
        Ok(DeleteResponse::default())
    }

    async fn search(&self, _request: &SearchRequest) -> Result<SearchResponse, ApiError> {
        Ok(SearchResponse::default())
    }
}

#[tokio::test]
async fn batch_uploads_run_one_at_a_time_in_order() {
    init_logging();
    let backend = Arc::new(SerialCheckBackend::default());
    let view = RecordingView::default();
    let mut engine = engine_with(backend.clone(), view.clone(), true);

    engine
        .upload(vec![
            FileCandidate::new("a.pdf", 100, "/tmp/a.pdf"),
            FileCandidate::new("b.txt", 200, "/tmp/b.txt"),
            FileCandidate::new("c.md", 300, "/tmp/c.md"),
        ])
        .await;

    assert_eq!(backend.peak.load(Ordering::SeqCst), 1);
    assert_eq!(
        *backend.order.lock().unwrap(),
        vec!["a.pdf".to_string(), "b.txt".to_string(), "c.md".to_string()]
    );
    let half_way = view
        .all()
        .into_iter()
        .any(|v| v.upload.progress.is_some_and(|p| p.percent == 50));
    assert!(half_way);
}
