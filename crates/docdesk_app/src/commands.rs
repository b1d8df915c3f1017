use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use chrono::Local;
use tokio::io::{AsyncBufReadExt, BufReader};

use docdesk_core::wire::IndexRequest;
use docdesk_core::{
    AppState, IndexationMsg, MessageKind, Msg, Page, SearchMsg, SearchParameters, Tone, UploadMsg,
};
use docdesk_engine::{candidate_from_path, Backend, Confirm, Engine, ReqwestBackend};
use docdesk_logging::{desk_info, desk_warn};

use crate::cli::{Cli, Command, SearchArgs};
use crate::config::Config;
use crate::terminal::render::{
    document_lines, message_lines, notice_line, results_lines, stats_detail_lines, stats_lines,
};
use crate::terminal::{AssumeYes, StdinConfirm, TerminalView};

struct Session {
    server: String,
    config: Config,
    backend: Arc<dyn Backend>,
}

impl Session {
    fn new(server: Option<String>, config: Config) -> anyhow::Result<Self> {
        let server = server.unwrap_or_else(|| config.server_url.clone());
        let backend = ReqwestBackend::new(config.client_settings(&server))
            .with_context(|| format!("invalid server url {server}"))?;
        desk_info!("Using server {}", backend.base_url());
        Ok(Self {
            server,
            config,
            backend: Arc::new(backend),
        })
    }

    fn engine(&self, focus: Page, state: AppState, assume_yes: bool) -> Engine {
        let view = TerminalView::stdout(focus, &state.view());
        let confirm: Box<dyn Confirm> = if assume_yes {
            Box::new(AssumeYes)
        } else {
            Box::new(StdinConfirm)
        };
        Engine::new(state, self.backend.clone(), Box::new(view), confirm)
            .with_pacing(self.config.pacing())
            .with_clock(Arc::new(|| Local::now().format("%H:%M:%S").to_string()))
    }

    fn initial_state(&self, search: Option<&SearchArgs>) -> AppState {
        let mut params = self.config.search_parameters();
        let mut show_sources = self.config.search.show_sources;
        if let Some(args) = search {
            apply_search_args(&mut params, &mut show_sources, args);
        }
        AppState::with_defaults(self.config.index_form(), params, show_sources)
    }

    fn unreachable(&self) -> String {
        format!("could not reach the server at {}", self.server)
    }
}

fn apply_search_args(params: &mut SearchParameters, show_sources: &mut bool, args: &SearchArgs) {
    if let Some(top_k) = args.top_k {
        params.top_k = top_k;
    }
    if let Some(temperature) = args.temperature {
        params.temperature = temperature;
    }
    if let Some(max_tokens) = args.max_tokens {
        params.max_tokens = max_tokens;
    }
    if let Some(prompt) = &args.system_prompt {
        params.system_prompt = Some(prompt.clone());
    }
    if args.no_sources {
        *show_sources = false;
    }
}

fn print_lines(lines: Vec<String>) {
    for line in lines {
        println!("{line}");
    }
}

fn outcome(failed: bool) -> ExitCode {
    if failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

pub async fn run(cli: Cli, config: Config) -> anyhow::Result<ExitCode> {
    let session = Session::new(cli.server, config)?;
    match cli.command {
        Command::List => list(&session).await,
        Command::Upload { files } => upload(&session, files).await,
        Command::Delete { name, yes } => {
            delete(&session, Msg::Upload(UploadMsg::DeleteRequested(name)), yes).await
        }
        Command::DeleteAll { yes } => delete_all(&session, yes).await,
        Command::Index {
            chunk_size,
            chunk_overlap,
            embedding_model,
        } => {
            let defaults = session.config.index_form();
            let form = IndexRequest {
                chunk_size: chunk_size.unwrap_or(defaults.chunk_size),
                chunk_overlap: chunk_overlap.unwrap_or(defaults.chunk_overlap),
                embedding_model: embedding_model.unwrap_or(defaults.embedding_model),
            };
            index(&session, form).await
        }
        Command::Stats => stats(&session).await,
        Command::DeleteIndex { yes } => delete_index(&session, yes).await,
        Command::Ask { question, params } => ask(&session, question, &params).await,
        Command::Chat { params } => chat(&session, &params).await,
    }
}

async fn list(session: &Session) -> anyhow::Result<ExitCode> {
    let listing = session
        .backend
        .list_files()
        .await
        .with_context(|| session.unreachable())?;
    let mut engine = session.engine(Page::Upload, session.initial_state(None), true);
    engine
        .dispatch(Msg::Upload(UploadMsg::DocumentsListed(listing)))
        .await;
    print_lines(document_lines(&engine.state().upload().view()));
    Ok(ExitCode::SUCCESS)
}

async fn upload(session: &Session, paths: Vec<PathBuf>) -> anyhow::Result<ExitCode> {
    let mut candidates = Vec::with_capacity(paths.len());
    for path in &paths {
        let candidate = candidate_from_path(path)
            .await
            .with_context(|| format!("cannot upload {}", path.display()))?;
        candidates.push(candidate);
    }

    let mut engine = session.engine(Page::Upload, session.initial_state(None), true);
    engine.open(Page::Upload).await;
    engine.upload(candidates).await;

    let upload = engine.state().upload();
    let failed = upload.batch_errored();
    if failed {
        desk_warn!("Upload batch finished with errors");
    }
    print_lines(document_lines(&upload.view()));
    Ok(outcome(failed))
}

/// Runs a confirmed deletion and reports the resulting notice.
async fn delete(session: &Session, request: Msg, yes: bool) -> anyhow::Result<ExitCode> {
    let mut engine = session.engine(Page::Upload, session.initial_state(None), yes);
    engine.open(Page::Upload).await;
    engine.dispatch(request).await;
    Ok(report_notice(engine.state().upload().notice()))
}

async fn delete_all(session: &Session, yes: bool) -> anyhow::Result<ExitCode> {
    let listing = session
        .backend
        .list_files()
        .await
        .with_context(|| session.unreachable())?;
    if listing.files.is_empty() {
        println!("No documents to delete.");
        return Ok(ExitCode::SUCCESS);
    }
    let mut engine = session.engine(Page::Upload, session.initial_state(None), yes);
    engine
        .dispatch(Msg::Upload(UploadMsg::DocumentsListed(listing)))
        .await;
    engine
        .dispatch(Msg::Upload(UploadMsg::DeleteAllRequested))
        .await;
    Ok(report_notice(engine.state().upload().notice()))
}

fn report_notice(notice: Option<&docdesk_core::Notice>) -> ExitCode {
    match notice {
        Some(notice) => {
            println!("{}", notice_line(notice));
            outcome(notice.tone == Tone::Error)
        }
        None => {
            println!("Nothing deleted.");
            ExitCode::SUCCESS
        }
    }
}

async fn index(session: &Session, form: IndexRequest) -> anyhow::Result<ExitCode> {
    let mut engine = session.engine(Page::Indexation, session.initial_state(None), true);
    engine.start_indexing(form).await;

    let view = engine.state().indexation().view();
    print_lines(results_lines(&view));
    print_lines(stats_lines(&view));
    Ok(outcome(view.results.is_none()))
}

async fn stats(session: &Session) -> anyhow::Result<ExitCode> {
    let stats = session
        .backend
        .index_stats()
        .await
        .with_context(|| session.unreachable())?;
    let details = stats_detail_lines(&stats);
    let mut engine = session.engine(Page::Indexation, session.initial_state(None), true);
    engine
        .dispatch(Msg::Indexation(IndexationMsg::StatsLoaded(stats)))
        .await;
    print_lines(stats_lines(&engine.state().indexation().view()));
    print_lines(details);
    Ok(ExitCode::SUCCESS)
}

async fn delete_index(session: &Session, yes: bool) -> anyhow::Result<ExitCode> {
    let mut engine = session.engine(Page::Indexation, session.initial_state(None), yes);
    engine
        .dispatch(Msg::Indexation(IndexationMsg::DeleteIndexRequested))
        .await;
    Ok(report_notice(engine.state().indexation().notice()))
}

fn last_failed(engine: &Engine) -> bool {
    engine
        .state()
        .search()
        .messages()
        .last()
        .is_some_and(|message| message.kind == MessageKind::Error)
}

async fn ask(session: &Session, question: String, args: &SearchArgs) -> anyhow::Result<ExitCode> {
    let mut engine = session.engine(Page::Search, session.initial_state(Some(args)), true);
    engine.open(Page::Search).await;
    engine.ask(question).await;
    Ok(outcome(last_failed(&engine)))
}

async fn chat(session: &Session, args: &SearchArgs) -> anyhow::Result<ExitCode> {
    let state = session.initial_state(Some(args));
    if let Some(welcome) = state.search().view().messages.first() {
        print_lines(message_lines(1, welcome));
    }
    let mut engine = session.engine(Page::Search, state, true);
    engine.open(Page::Search).await;

    let mut input = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = input.next_line().await.context("reading stdin")? {
        match ChatInput::parse(&line) {
            ChatInput::Quit => break,
            ChatInput::Clear => {
                engine.dispatch(Msg::Search(SearchMsg::ClearHistory)).await;
                println!("History cleared.");
            }
            ChatInput::Sources(show) => {
                engine
                    .dispatch(Msg::Search(SearchMsg::SetShowSources(show)))
                    .await;
            }
            ChatInput::Unknown(command) => println!("Unknown command {command}"),
            ChatInput::Question(question) => engine.ask(question).await,
        }
        println!("{}", engine.state().search().view().history_label);
    }
    Ok(ExitCode::SUCCESS)
}

#[derive(Debug, PartialEq)]
enum ChatInput {
    Quit,
    Clear,
    Sources(bool),
    Unknown(String),
    Question(String),
}

impl ChatInput {
    fn parse(line: &str) -> Self {
        let trimmed = line.trim();
        match trimmed {
            "/quit" | "/exit" => ChatInput::Quit,
            "/clear" => ChatInput::Clear,
            "/sources on" => ChatInput::Sources(true),
            "/sources off" => ChatInput::Sources(false),
            _ if trimmed.starts_with('/') => ChatInput::Unknown(trimmed.to_string()),
            _ => ChatInput::Question(line.to_string()),
        }
    }
}
