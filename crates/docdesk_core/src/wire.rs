//! Request and response bodies exchanged with the document backend.
//!
//! Optional response fields default rather than fail: the backend omits
//! counters on error paths and adds fields between versions.

use serde::{Deserialize, Serialize};

/// Reply to `POST /api/upload`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadedFile {
    pub filename: String,
    pub size: u64,
    pub date: String,
}

/// Reply to `GET /api/files`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FileListing {
    #[serde(default)]
    pub files: Vec<ListedFile>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListedFile {
    pub name: String,
    pub size: u64,
    pub date: String,
}

/// Reply to `DELETE /api/delete/{filename}` and `DELETE /api/delete-index`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DeleteResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub indexes_deleted: Vec<String>,
}

/// Reply to `DELETE /api/delete-all`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DeleteAllResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub count: u64,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Body of `POST /api/index`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexRequest {
    pub chunk_size: u32,
    pub chunk_overlap: u32,
    pub embedding_model: String,
}

impl Default for IndexRequest {
    fn default() -> Self {
        Self {
            chunk_size: 500,
            chunk_overlap: 50,
            embedding_model: "text-embedding-3-small".to_string(),
        }
    }
}

/// Reply to `POST /api/index`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct IndexResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub documents_processed: u64,
    #[serde(default)]
    pub total_chunks: u64,
    #[serde(default)]
    pub total_vectors: u64,
    #[serde(default)]
    pub elapsed_time: f64,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub mode: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Reply to `GET /api/index-stats`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct IndexStats {
    #[serde(default)]
    pub indexed: bool,
    #[serde(default)]
    pub total_chunks: Option<u64>,
    #[serde(default)]
    pub total_vectors: Option<u64>,
    #[serde(default)]
    pub dimension: Option<u32>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub sources: Vec<String>,
    #[serde(default)]
    pub embedding_mode: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One entry of the conversation transcript.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub content: String,
}

impl Turn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Body of `POST /api/search`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchRequest {
    pub question: String,
    pub conversation_history: Vec<Turn>,
    pub top_k: u32,
    pub temperature: f32,
    pub max_tokens: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_prompt: Option<String>,
}

/// Reply to `POST /api/search`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub answer: Option<String>,
    #[serde(default)]
    pub sources: Vec<SourceCitation>,
    #[serde(default)]
    pub llm_model: Option<String>,
    #[serde(default)]
    pub tokens: Option<TokenUsage>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceCitation {
    pub source: String,
    #[serde(default)]
    pub score: f64,
    #[serde(default)]
    pub text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TokenUsage {
    #[serde(default)]
    pub prompt_tokens: u64,
    #[serde(default)]
    pub completion_tokens: u64,
    #[serde(default)]
    pub total_tokens: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn search_request_omits_missing_system_prompt() {
        let request = SearchRequest {
            question: "q".to_string(),
            conversation_history: vec![Turn::user("a"), Turn::assistant("b")],
            top_k: 5,
            temperature: 0.5,
            max_tokens: 500,
            system_prompt: None,
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(
            value,
            json!({
                "question": "q",
                "conversation_history": [
                    {"role": "user", "content": "a"},
                    {"role": "assistant", "content": "b"}
                ],
                "top_k": 5,
                "temperature": 0.5,
                "max_tokens": 500
            })
        );
    }

    #[test]
    fn index_stats_tolerates_bare_not_indexed_reply() {
        let stats: IndexStats = serde_json::from_value(json!({"indexed": false})).unwrap();
        assert!(!stats.indexed);
        assert!(stats.sources.is_empty());
        assert_eq!(stats.total_chunks, None);
    }

    #[test]
    fn search_response_reads_sources_and_usage() {
        let response: SearchResponse = serde_json::from_value(json!({
            "success": true,
            "answer": "42",
            "sources": [{"source": "a.pdf", "score": 0.91, "text": "chunk", "chunk_id": 3}],
            "llm_model": "gpt-4o-mini",
            "tokens": {"prompt_tokens": 10, "completion_tokens": 5, "total_tokens": 15}
        }))
        .unwrap();
        assert_eq!(response.sources[0].source, "a.pdf");
        assert_eq!(response.tokens.unwrap().total_tokens, 15);
    }
}
