//! Search page: the chat transcript and the question/answer round trip.

use crate::format::{excerpt, format_score};
use crate::view_model::{MessageKind, MessageView, SearchView, SourceView};
use crate::wire::{IndexStats, SearchRequest, SearchResponse, SourceCitation, TokenUsage, Turn};
use crate::{AppState, Effect, Page, RequestError, RequestState, SearchMsg, SearchParameters};

pub const WELCOME_MESSAGE: &str =
    "Hello! Ask me anything about your indexed documents. Answers cite the passages they rely on.";
pub const NO_INDEX_MESSAGE: &str = "No index available. Please index documents first.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IndexAvailability {
    /// Stats not loaded yet, or loading failed.
    #[default]
    Unknown,
    Available,
    Missing,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChatMessage {
    pub kind: MessageKind,
    pub text: String,
    pub sources: Vec<SourceCitation>,
    pub llm_model: Option<String>,
    pub tokens: Option<TokenUsage>,
}

impl ChatMessage {
    fn plain(kind: MessageKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
            sources: Vec::new(),
            llm_model: None,
            tokens: None,
        }
    }

    fn welcome() -> Self {
        Self::plain(MessageKind::System, WELCOME_MESSAGE)
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
struct SearchStats {
    documents: usize,
    chunks: u64,
    model: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SearchState {
    messages: Vec<ChatMessage>,
    transcript: Vec<Turn>,
    pending: Option<String>,
    request: RequestState,
    params: SearchParameters,
    show_sources: bool,
    availability: IndexAvailability,
    stats: SearchStats,
    warning: Option<String>,
}

impl Default for SearchState {
    fn default() -> Self {
        Self {
            messages: vec![ChatMessage::welcome()],
            transcript: Vec::new(),
            pending: None,
            request: RequestState::Idle,
            params: SearchParameters::default(),
            show_sources: true,
            availability: IndexAvailability::Unknown,
            stats: SearchStats::default(),
            warning: None,
        }
    }
}

impl SearchState {
    pub fn with_parameters(params: SearchParameters, show_sources: bool) -> Self {
        Self {
            params,
            show_sources,
            ..Self::default()
        }
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// Completed user/assistant turns, oldest first.
    pub fn transcript(&self) -> &[Turn] {
        &self.transcript
    }

    pub fn request(&self) -> RequestState {
        self.request
    }

    pub fn availability(&self) -> IndexAvailability {
        self.availability
    }

    pub fn params(&self) -> &SearchParameters {
        &self.params
    }

    pub fn show_sources(&self) -> bool {
        self.show_sources
    }

    pub fn warning(&self) -> Option<&str> {
        self.warning.as_deref()
    }

    fn push_error(&mut self, text: impl Into<String>) {
        self.messages
            .push(ChatMessage::plain(MessageKind::Error, text));
    }

    fn build_request(&self, question: &str) -> SearchRequest {
        SearchRequest {
            question: question.to_string(),
            conversation_history: self.transcript.clone(),
            top_k: self.params.top_k,
            temperature: self.params.temperature,
            max_tokens: self.params.max_tokens,
            system_prompt: self.params.system_prompt.clone(),
        }
    }

    pub fn view(&self) -> SearchView {
        let messages = self
            .messages
            .iter()
            .map(|message| {
                let sources = if self.show_sources {
                    message
                        .sources
                        .iter()
                        .enumerate()
                        .map(|(idx, source)| SourceView {
                            heading: format!("{}. {}", idx + 1, source.source),
                            score_label: format_score(source.score),
                            excerpt: excerpt(&source.text),
                        })
                        .collect()
                } else {
                    Vec::new()
                };
                let meta = match (&message.llm_model, message.tokens) {
                    (Some(model), Some(tokens)) => {
                        Some(format!("{model} · {} tokens", tokens.total_tokens))
                    }
                    (Some(model), None) => Some(model.clone()),
                    (None, Some(tokens)) => Some(format!("{} tokens", tokens.total_tokens)),
                    (None, None) => None,
                };
                MessageView {
                    kind: message.kind,
                    text: message.text.clone(),
                    sources_header: (!sources.is_empty())
                        .then(|| format!("Sources used ({})", sources.len())),
                    sources,
                    meta,
                }
            })
            .collect();

        SearchView {
            messages,
            loading: self.request.is_in_flight(),
            send_enabled: !self.request.is_in_flight(),
            history_label: format!("History: {} messages", self.transcript.len()),
            document_count: self.stats.documents,
            chunk_count: self.stats.chunks,
            model_name: self
                .stats
                .model
                .clone()
                .unwrap_or_else(|| "N/A".to_string()),
            show_sources: self.show_sources,
            index_missing: self.availability == IndexAvailability::Missing,
            warning: self.warning.clone(),
        }
    }
}

pub(crate) fn update(state: &mut AppState, msg: SearchMsg) -> Vec<Effect> {
    match msg {
        SearchMsg::Opened => vec![Effect::FetchIndexStats {
            target: Page::Search,
        }],
        SearchMsg::StatsLoaded(stats) => {
            apply_stats(&mut state.search, stats);
            state.mark_dirty();
            Vec::new()
        }
        SearchMsg::StatsFailed(_) => {
            state
                .search
                .push_error("Could not load index statistics");
            state.mark_dirty();
            Vec::new()
        }
        SearchMsg::QuestionSubmitted(raw) => {
            let search = &mut state.search;
            if search.request.is_in_flight() {
                search.warning =
                    Some("A question is already being answered; wait for the reply".to_string());
                state.mark_dirty();
                return Vec::new();
            }
            search.warning = None;
            let question = raw.trim();
            if question.is_empty() {
                search.push_error("Please enter a question");
                state.mark_dirty();
                return Vec::new();
            }
            if search.availability == IndexAvailability::Missing {
                search.push_error(NO_INDEX_MESSAGE);
                state.mark_dirty();
                return Vec::new();
            }
            // The backend reads the current question as the last history turn.
            search.transcript.push(Turn::user(question));
            let request = search.build_request(question);
            search
                .messages
                .push(ChatMessage::plain(MessageKind::User, question));
            search.pending = Some(question.to_string());
            search.request = RequestState::InFlight;
            state.mark_dirty();
            vec![Effect::AskQuestion { request }]
        }
        SearchMsg::AnswerReceived(response) => {
            let search = &mut state.search;
            search.request = RequestState::Idle;
            search.warning = None;
            // A clear while waiting drops the answer.
            if search.pending.take().is_some() {
                let SearchResponse {
                    answer,
                    sources,
                    llm_model,
                    tokens,
                    ..
                } = response;
                let answer = answer.unwrap_or_default();
                search.transcript.push(Turn::assistant(answer.clone()));
                search.messages.push(ChatMessage {
                    kind: MessageKind::Assistant,
                    text: answer,
                    sources,
                    llm_model,
                    tokens,
                });
            }
            state.mark_dirty();
            Vec::new()
        }
        SearchMsg::AnswerFailed(error) => {
            let search = &mut state.search;
            search.request = RequestState::Idle;
            search.pending = None;
            let text = match &error {
                RequestError::Network { .. } => "Could not connect to the server".to_string(),
                RequestError::Server { .. } => error
                    .server_message()
                    .unwrap_or("Search failed")
                    .to_string(),
            };
            search.push_error(text);
            state.mark_dirty();
            Vec::new()
        }
        SearchMsg::ClearHistory => {
            let search = &mut state.search;
            search.transcript.clear();
            search.pending = None;
            search.warning = None;
            search.messages = vec![ChatMessage::welcome()];
            state.mark_dirty();
            Vec::new()
        }
        SearchMsg::SetShowSources(show) => {
            if state.search.show_sources != show {
                state.search.show_sources = show;
                state.mark_dirty();
            }
            Vec::new()
        }
        SearchMsg::SetParameters(params) => {
            state.search.params = params;
            Vec::new()
        }
    }
}

fn apply_stats(search: &mut SearchState, stats: IndexStats) {
    if stats.indexed {
        search.availability = IndexAvailability::Available;
        search.stats = SearchStats {
            documents: stats.sources.len(),
            chunks: stats.total_chunks.unwrap_or(0),
            model: stats.model,
        };
    } else {
        search.availability = IndexAvailability::Missing;
        search.stats = SearchStats::default();
        search.push_error(NO_INDEX_MESSAGE);
    }
}
