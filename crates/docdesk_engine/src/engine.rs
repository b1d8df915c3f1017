use std::collections::VecDeque;
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use tokio::sync::mpsc;

use docdesk_core::wire::IndexRequest;
use docdesk_core::{
    update, AppState, AppViewModel, Effect, FileCandidate, IndexationMsg, Msg, Page, RequestError,
    SearchMsg, UploadMsg,
};
use docdesk_logging::{desk_debug, desk_info, desk_warn};

use crate::upload::{ChannelProgressSink, ProgressSink};
use crate::Backend;

/// Receives a fresh view model whenever the state changed.
pub trait ViewSink: Send {
    fn render(&mut self, view: &AppViewModel);
}

/// Answers confirmation prompts for destructive actions.
pub trait Confirm: Send {
    fn confirm(&mut self, prompt: &str) -> bool;
}

/// Wall-clock label used in the indexation log.
pub type Clock = Arc<dyn Fn() -> String + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pacing {
    pub between_files: Duration,
    pub hide_progress_after: Duration,
    /// Zero disables the cosmetic step ticks.
    pub step_interval: Duration,
}

impl Default for Pacing {
    fn default() -> Self {
        Self {
            between_files: Duration::from_millis(2000),
            hide_progress_after: Duration::from_millis(2500),
            step_interval: Duration::from_millis(1500),
        }
    }
}

impl Pacing {
    /// No delays and no step ticks.
    pub fn immediate() -> Self {
        Self {
            between_files: Duration::ZERO,
            hide_progress_after: Duration::ZERO,
            step_interval: Duration::ZERO,
        }
    }
}

enum Work {
    Msg(Msg),
    Effect(Effect),
}

/// Drives the pure core: applies messages, renders when dirty and executes
/// effects against the backend, one at a time.
pub struct Engine {
    state: AppState,
    backend: Arc<dyn Backend>,
    view: Box<dyn ViewSink>,
    confirm: Box<dyn Confirm>,
    pacing: Pacing,
    clock: Clock,
}

impl Engine {
    pub fn new(
        state: AppState,
        backend: Arc<dyn Backend>,
        view: Box<dyn ViewSink>,
        confirm: Box<dyn Confirm>,
    ) -> Self {
        Self {
            state,
            backend,
            view,
            confirm,
            pacing: Pacing::default(),
            clock: Arc::new(epoch_seconds),
        }
    }

    pub fn with_pacing(mut self, pacing: Pacing) -> Self {
        self.pacing = pacing;
        self
    }

    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Opens a page, which loads whatever that page shows from the backend.
    pub async fn open(&mut self, page: Page) {
        let msg = match page {
            Page::Upload => Msg::Upload(UploadMsg::Opened),
            Page::Indexation => Msg::Indexation(IndexationMsg::Opened),
            Page::Search => Msg::Search(SearchMsg::Opened),
        };
        self.dispatch(msg).await;
    }

    pub async fn start_indexing(&mut self, config: IndexRequest) {
        if self.state.indexation().request().is_in_flight() {
            desk_warn!("Indexation requested while another job is running");
        }
        let at = (self.clock)();
        self.dispatch(Msg::Indexation(IndexationMsg::StartRequested { config, at }))
            .await;
    }

    pub async fn upload(&mut self, files: Vec<FileCandidate>) {
        self.dispatch(Msg::Upload(UploadMsg::FilesChosen(files))).await;
    }

    pub async fn ask(&mut self, question: impl Into<String>) {
        if self.state.search().request().is_in_flight() {
            desk_warn!("Question submitted while an answer is pending");
        }
        self.dispatch(Msg::Search(SearchMsg::QuestionSubmitted(question.into())))
            .await;
    }

    /// Runs `msg` and every follow-up it causes to completion.
    pub async fn dispatch(&mut self, msg: Msg) {
        let mut queue = VecDeque::from([Work::Msg(msg)]);
        while let Some(work) = queue.pop_front() {
            match work {
                Work::Msg(msg) => {
                    let effects = self.apply(msg);
                    queue.extend(effects.into_iter().map(Work::Effect));
                }
                Work::Effect(effect) => {
                    let follow_ups = self.execute(effect).await;
                    queue.extend(follow_ups);
                }
            }
        }
    }

    fn apply(&mut self, msg: Msg) -> Vec<Effect> {
        desk_debug!("apply {}", msg_label(&msg));
        let state = std::mem::take(&mut self.state);
        let (mut state, effects) = update(state, msg);
        let dirty = state.consume_dirty();
        self.state = state;
        if dirty {
            let view = self.state.view();
            self.view.render(&view);
        }
        effects
    }

    /// Applies a message that never yields effects.
    fn apply_quiet(&mut self, msg: Msg) {
        let effects = self.apply(msg);
        debug_assert!(effects.is_empty(), "unexpected effects: {effects:?}");
    }

    async fn execute(&mut self, effect: Effect) -> Vec<Work> {
        let backend = self.backend.clone();
        let msg = match effect {
            Effect::RefreshDocuments => match backend.list_files().await {
                Ok(listing) => Msg::Upload(UploadMsg::DocumentsListed(listing)),
                Err(err) => {
                    desk_warn!("Could not refresh the document list: {err}");
                    return Vec::new();
                }
            },
            Effect::UploadBatch { files } => return self.run_upload_batch(files).await,
            Effect::SendUpload { file } => self.send_upload(file).await,
            Effect::HideUploadProgressLater => {
                tokio::time::sleep(self.pacing.hide_progress_after).await;
                Msg::Upload(UploadMsg::ProgressHidden)
            }
            Effect::Confirm { prompt, action } => {
                if self.confirm.confirm(&prompt) {
                    Msg::Confirmed(action)
                } else {
                    desk_info!("Declined: {prompt}");
                    Msg::Declined(action)
                }
            }
            Effect::DeleteDocument { filename } => {
                let result = backend.delete_file(&filename).await;
                match result {
                    Ok(response) => Msg::Upload(UploadMsg::DocumentDeleted { filename, response }),
                    Err(err) => Msg::Upload(UploadMsg::DeleteFailed(err.into())),
                }
            }
            Effect::DeleteAllDocuments => match backend.delete_all().await {
                Ok(response) => Msg::Upload(UploadMsg::AllDocumentsDeleted(response)),
                Err(err) => Msg::Upload(UploadMsg::DeleteFailed(err.into())),
            },
            Effect::StartIndexing { request } => self.run_indexing(request).await,
            Effect::FetchIndexStats { target } => {
                let result = backend.index_stats().await.map_err(RequestError::from);
                match (target, result) {
                    (Page::Indexation, Ok(stats)) => {
                        Msg::Indexation(IndexationMsg::StatsLoaded(stats))
                    }
                    (Page::Indexation, Err(err)) => {
                        Msg::Indexation(IndexationMsg::StatsFailed(err))
                    }
                    (Page::Search, Ok(stats)) => Msg::Search(SearchMsg::StatsLoaded(stats)),
                    (Page::Search, Err(err)) => Msg::Search(SearchMsg::StatsFailed(err)),
                    (Page::Upload, _) => return Vec::new(),
                }
            }
            Effect::DeleteIndex => match backend.delete_index().await {
                Ok(response) => Msg::Indexation(IndexationMsg::IndexDeleted(response)),
                Err(err) => Msg::Indexation(IndexationMsg::DeleteIndexFailed(err.into())),
            },
            Effect::AskQuestion { request } => match backend.search(&request).await {
                Ok(response) => Msg::Search(SearchMsg::AnswerReceived(response)),
                Err(err) => Msg::Search(SearchMsg::AnswerFailed(err.into())),
            },
        };
        vec![Work::Msg(msg)]
    }

    /// Uploads the batch strictly in order; the next file starts only after
    /// the previous one has settled.
    async fn run_upload_batch(&mut self, files: Vec<FileCandidate>) -> Vec<Work> {
        let count = files.len();
        let mut follow_ups = Vec::new();
        for (index, file) in files.into_iter().enumerate() {
            if index > 0 {
                tokio::time::sleep(self.pacing.between_files).await;
            }
            desk_info!("Upload {}/{count}: {}", index + 1, file.name);
            for effect in self.apply(Msg::Upload(UploadMsg::FileQueued(file))) {
                match effect {
                    Effect::SendUpload { file } => {
                        let outcome = self.send_upload(file).await;
                        let effects = self.apply(outcome);
                        follow_ups.extend(effects.into_iter().map(Work::Effect));
                    }
                    other => follow_ups.push(Work::Effect(other)),
                }
            }
        }
        follow_ups.push(Work::Msg(Msg::Upload(UploadMsg::BatchFinished)));
        follow_ups
    }

    async fn send_upload(&mut self, file: FileCandidate) -> Msg {
        let filename = file.name.clone();
        let (tx, mut rx) = mpsc::unbounded_channel();
        let sink: Arc<dyn ProgressSink> = Arc::new(ChannelProgressSink::new(tx));
        let backend = self.backend.clone();
        let upload = backend.upload(&file, sink);
        tokio::pin!(upload);

        let result = loop {
            tokio::select! {
                result = &mut upload => break result,
                Some(event) = rx.recv() => {
                    self.apply_quiet(Msg::Upload(UploadMsg::Progress {
                        loaded: event.loaded,
                        total: event.total,
                    }));
                }
            }
        };
        while let Ok(event) = rx.try_recv() {
            self.apply_quiet(Msg::Upload(UploadMsg::Progress {
                loaded: event.loaded,
                total: event.total,
            }));
        }

        match result {
            Ok(uploaded) => Msg::Upload(UploadMsg::FileUploaded(uploaded)),
            Err(err) => {
                desk_warn!("Upload of {filename} failed: {err}");
                Msg::Upload(UploadMsg::UploadFailed {
                    filename,
                    error: err.into(),
                })
            }
        }
    }

    /// Waits for the indexing reply while advancing the step display.
    async fn run_indexing(&mut self, request: IndexRequest) -> Msg {
        desk_info!(
            "Indexing with chunk_size={} chunk_overlap={} model={}",
            request.chunk_size,
            request.chunk_overlap,
            request.embedding_model
        );
        let backend = self.backend.clone();
        let job = backend.start_index(&request);
        tokio::pin!(job);

        let result = if self.pacing.step_interval.is_zero() {
            job.await
        } else {
            let mut ticker = tokio::time::interval(self.pacing.step_interval);
            // The first tick completes immediately.
            ticker.tick().await;
            loop {
                tokio::select! {
                    result = &mut job => break result,
                    _ = ticker.tick() => {
                        self.apply_quiet(Msg::Indexation(IndexationMsg::StepTick));
                    }
                }
            }
        };

        let at = (self.clock)();
        match result {
            Ok(response) => Msg::Indexation(IndexationMsg::Completed { response, at }),
            Err(err) => {
                desk_warn!("Indexation failed: {err}");
                Msg::Indexation(IndexationMsg::Failed {
                    error: err.into(),
                    at,
                })
            }
        }
    }
}

fn epoch_seconds() -> String {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs().to_string())
        .unwrap_or_default()
}

fn msg_label(msg: &Msg) -> &'static str {
    match msg {
        Msg::Upload(UploadMsg::Opened) => "upload/opened",
        Msg::Upload(UploadMsg::DocumentsListed(_)) => "upload/documents-listed",
        Msg::Upload(UploadMsg::FilesChosen(_)) => "upload/files-chosen",
        Msg::Upload(UploadMsg::FileQueued(_)) => "upload/file-queued",
        Msg::Upload(UploadMsg::Progress { .. }) => "upload/progress",
        Msg::Upload(UploadMsg::FileUploaded(_)) => "upload/file-uploaded",
        Msg::Upload(UploadMsg::UploadFailed { .. }) => "upload/upload-failed",
        Msg::Upload(UploadMsg::BatchFinished) => "upload/batch-finished",
        Msg::Upload(UploadMsg::ProgressHidden) => "upload/progress-hidden",
        Msg::Upload(UploadMsg::DeleteRequested(_)) => "upload/delete-requested",
        Msg::Upload(UploadMsg::DeleteAllRequested) => "upload/delete-all-requested",
        Msg::Upload(UploadMsg::DocumentDeleted { .. }) => "upload/document-deleted",
        Msg::Upload(UploadMsg::AllDocumentsDeleted(_)) => "upload/all-documents-deleted",
        Msg::Upload(UploadMsg::DeleteFailed(_)) => "upload/delete-failed",
        Msg::Indexation(IndexationMsg::Opened) => "indexation/opened",
        Msg::Indexation(IndexationMsg::StartRequested { .. }) => "indexation/start-requested",
        Msg::Indexation(IndexationMsg::StepTick) => "indexation/step-tick",
        Msg::Indexation(IndexationMsg::Completed { .. }) => "indexation/completed",
        Msg::Indexation(IndexationMsg::Failed { .. }) => "indexation/failed",
        Msg::Indexation(IndexationMsg::StatsLoaded(_)) => "indexation/stats-loaded",
        Msg::Indexation(IndexationMsg::StatsFailed(_)) => "indexation/stats-failed",
        Msg::Indexation(IndexationMsg::DeleteIndexRequested) => "indexation/delete-requested",
        Msg::Indexation(IndexationMsg::IndexDeleted(_)) => "indexation/index-deleted",
        Msg::Indexation(IndexationMsg::DeleteIndexFailed(_)) => "indexation/delete-failed",
        Msg::Search(SearchMsg::Opened) => "search/opened",
        Msg::Search(SearchMsg::StatsLoaded(_)) => "search/stats-loaded",
        Msg::Search(SearchMsg::StatsFailed(_)) => "search/stats-failed",
        Msg::Search(SearchMsg::QuestionSubmitted(_)) => "search/question-submitted",
        Msg::Search(SearchMsg::AnswerReceived(_)) => "search/answer-received",
        Msg::Search(SearchMsg::AnswerFailed(_)) => "search/answer-failed",
        Msg::Search(SearchMsg::ClearHistory) => "search/clear-history",
        Msg::Search(SearchMsg::SetShowSources(_)) => "search/set-show-sources",
        Msg::Search(SearchMsg::SetParameters(_)) => "search/set-parameters",
        Msg::Confirmed(_) => "confirmed",
        Msg::Declined(_) => "declined",
    }
}
