//! Tool surface with a uniform response envelope.
//!
//! Every tool returns a [`ToolResponse`]: `{ "success": true, "data": ... }`
//! or `{ "success": false, "error": { "code", "message", "retryable" } }`.
//! No error crosses this boundary as an `Err`, and internal failures are
//! reported with a generic message; the cause is only logged.
//!
//! | Tool | Arguments | Data |
//! |------|-----------|------|
//! | `save_checkpoint` | [`SaveCheckpointArgs`] | [`CheckpointResult`] |
//! | `load_context` | [`LoadContextArgs`] | [`RetrievalResult`] |
//! | `get_anchors` | [`GetAnchorsArgs`] | list of [`AnchorRecord`] |
//! | `parse_markers` | [`ParseMarkersArgs`] | [`ParsedDocument`] |

mod args;

pub use args::{GetAnchorsArgs, LoadContextArgs, ParseMarkersArgs, SaveCheckpointArgs};

use crate::anchors::AnchorDetector;
use crate::models::{
    AnchorType, CheckpointRequest, CheckpointResult, DEFAULT_MAX_TOKENS, ParsedDocument,
    RetrievalRequest, RetrievalResult, SearchCriteria,
};
use crate::retrieval::RetrievalEngine;
use crate::services::{AnchorFilter, AnchorQuery, AnchorRecord, CheckpointService};
use crate::storage::ConversationStore;
use crate::{Error, Result, parser};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

/// Tool names, in registration order.
pub const TOOL_NAMES: [&str; 4] = ["save_checkpoint", "load_context", "get_anchors", "parse_markers"];

/// Generic message for internal failures.
const INTERNAL_MESSAGE: &str = "An internal error occurred while processing the request";

/// Machine-readable error code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// The arguments were rejected.
    InvalidInput,
    /// The requested entry does not exist.
    NotFound,
    /// Something failed inside the crate.
    InternalError,
}

impl ErrorCode {
    /// Returns the code as a string slice.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidInput => "INVALID_INPUT",
            Self::NotFound => "NOT_FOUND",
            Self::InternalError => "INTERNAL_ERROR",
        }
    }
}

/// Error half of the envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolError {
    /// Error code.
    pub code: ErrorCode,
    /// Human-readable message.
    pub message: String,
    /// Whether retrying the same call may succeed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retryable: Option<bool>,
}

impl From<&Error> for ToolError {
    fn from(err: &Error) -> Self {
        match err {
            Error::InvalidInput(message) => Self {
                code: ErrorCode::InvalidInput,
                message: message.clone(),
                retryable: Some(false),
            },
            Error::NotFound(what) => Self {
                code: ErrorCode::NotFound,
                message: format!("not found: {what}"),
                retryable: Some(false),
            },
            Error::OperationFailed { operation, cause } => {
                tracing::error!(operation = %operation, cause = %cause, "Tool call failed");
                Self {
                    code: ErrorCode::InternalError,
                    message: INTERNAL_MESSAGE.to_string(),
                    retryable: Some(true),
                }
            },
        }
    }
}

/// Uniform tool response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolResponse<T> {
    /// Whether the call succeeded.
    pub success: bool,
    /// Payload on success.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    /// Error on failure.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ToolError>,
}

impl<T> ToolResponse<T> {
    /// Creates a successful response.
    pub const fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    /// Creates a failed response.
    pub const fn fail(error: ToolError) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error),
        }
    }

    /// Wraps a crate result.
    pub fn from_result(result: Result<T>) -> Self {
        match result {
            Ok(data) => Self::ok(data),
            Err(err) => Self::fail(ToolError::from(&err)),
        }
    }
}

impl<T: Serialize> ToolResponse<T> {
    /// Converts the payload to JSON.
    #[must_use]
    pub fn into_value(self) -> ToolResponse<Value> {
        match self.data.map(serde_json::to_value) {
            Some(Ok(value)) => ToolResponse {
                success: self.success,
                data: Some(value),
                error: self.error,
            },
            Some(Err(e)) => ToolResponse::fail(ToolError::from(&Error::OperationFailed {
                operation: "serialize_tool_response".to_string(),
                cause: e.to_string(),
            })),
            None => ToolResponse {
                success: self.success,
                data: None,
                error: self.error,
            },
        }
    }
}

fn parse_args<A: DeserializeOwned>(arguments: Value) -> Result<A> {
    serde_json::from_value(arguments).map_err(|e| Error::InvalidInput(e.to_string()))
}

/// Dispatches tool calls to the services.
#[derive(Clone)]
pub struct ToolRegistry {
    checkpoints: CheckpointService,
    engine: RetrievalEngine,
    anchors: AnchorQuery,
    default_max_tokens: usize,
}

impl std::fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolRegistry")
            .field("default_max_tokens", &self.default_max_tokens)
            .finish_non_exhaustive()
    }
}

impl ToolRegistry {
    /// Creates a registry over `store`.
    #[must_use]
    pub fn new(store: Arc<dyn ConversationStore>) -> Self {
        Self {
            checkpoints: CheckpointService::new(Arc::clone(&store)),
            engine: RetrievalEngine::new(Arc::clone(&store)),
            anchors: AnchorQuery::new(store),
            default_max_tokens: DEFAULT_MAX_TOKENS,
        }
    }

    /// Replaces the anchor detector used by `save_checkpoint`.
    #[must_use]
    pub fn with_detector(mut self, detector: AnchorDetector) -> Self {
        self.checkpoints = self.checkpoints.with_detector(detector);
        self
    }

    /// Sets the budget used when `load_context` gives none.
    #[must_use]
    pub const fn with_default_max_tokens(mut self, max_tokens: usize) -> Self {
        self.default_max_tokens = max_tokens;
        self
    }

    /// Runs a tool by name with JSON arguments.
    #[must_use]
    pub fn execute(&self, name: &str, arguments: Value) -> ToolResponse<Value> {
        tracing::debug!(tool = name, "Executing tool");
        metrics::counter!("waymark_tool_calls_total", "tool" => name.to_string()).increment(1);
        match name {
            "save_checkpoint" => match parse_args(arguments) {
                Ok(args) => self.save_checkpoint(args).into_value(),
                Err(e) => ToolResponse::fail(ToolError::from(&e)),
            },
            "load_context" => match parse_args(arguments) {
                Ok(args) => self.load_context(args).into_value(),
                Err(e) => ToolResponse::fail(ToolError::from(&e)),
            },
            "get_anchors" => match parse_args(arguments) {
                Ok(args) => self.get_anchors(args).into_value(),
                Err(e) => ToolResponse::fail(ToolError::from(&e)),
            },
            "parse_markers" => match parse_args(arguments) {
                Ok(args) => self.parse_markers(args).into_value(),
                Err(e) => ToolResponse::fail(ToolError::from(&e)),
            },
            _ => ToolResponse::fail(ToolError::from(&Error::InvalidInput(format!(
                "Unknown tool: {name}"
            )))),
        }
    }

    /// Saves a checkpoint.
    #[must_use]
    pub fn save_checkpoint(&self, args: SaveCheckpointArgs) -> ToolResponse<CheckpointResult> {
        let request = CheckpointRequest {
            content: args.content,
            tags: args.tags.unwrap_or_default(),
            extract_anchors: args.extract_anchors.unwrap_or(true),
            generate_summary: args.generate_summary.unwrap_or(true),
        };
        ToolResponse::from_result(self.checkpoints.save(request))
    }

    /// Retrieves context.
    #[must_use]
    pub fn load_context(&self, args: LoadContextArgs) -> ToolResponse<RetrievalResult> {
        ToolResponse::from_result(
            self.retrieval_request(args)
                .and_then(|request| self.engine.search(&request)),
        )
    }

    /// Lists anchors.
    #[must_use]
    pub fn get_anchors(&self, args: GetAnchorsArgs) -> ToolResponse<Vec<AnchorRecord>> {
        ToolResponse::from_result(anchor_filter(args).and_then(|filter| self.anchors.list(&filter)))
    }

    /// Parses marker text without storing it.
    #[must_use]
    pub fn parse_markers(&self, args: ParseMarkersArgs) -> ToolResponse<ParsedDocument> {
        ToolResponse::ok(parser::parse(&args.text))
    }

    fn retrieval_request(&self, args: LoadContextArgs) -> Result<RetrievalRequest> {
        let mut filters = SearchCriteria::new();
        if let Some(range) = args.time_range {
            if range.start > range.end {
                return Err(Error::InvalidInput(
                    "time_range start must not be after end".to_string(),
                ));
            }
            filters = filters.with_time_range(range);
        }
        filters.contexts = args.contexts.unwrap_or_default();
        filters.states = args.states.unwrap_or_default();
        filters.anchor_types = args
            .anchor_types
            .unwrap_or_default()
            .iter()
            .map(|name| parse_anchor_type(name))
            .collect::<Result<_>>()?;
        filters.facets = args.facets.unwrap_or_default();

        let max_tokens = args.max_tokens.unwrap_or(self.default_max_tokens);
        if max_tokens == 0 {
            return Err(Error::InvalidInput("max_tokens must be positive".to_string()));
        }

        let mut request = RetrievalRequest::default()
            .with_filters(filters)
            .with_max_tokens(max_tokens)
            .anchors_only(args.anchors_only.unwrap_or(false));
        request.query = args.query;
        Ok(request)
    }
}

fn parse_anchor_type(name: &str) -> Result<AnchorType> {
    AnchorType::parse(name).ok_or_else(|| {
        Error::InvalidInput(format!(
            "Unknown anchor type: {name} (expected decision, blocker, breakthrough or question)"
        ))
    })
}

fn anchor_filter(args: GetAnchorsArgs) -> Result<AnchorFilter> {
    let mut filter = AnchorFilter::default();
    if let Some(name) = args.anchor_type.as_deref() {
        filter = filter.with_type(parse_anchor_type(name)?);
    }
    if let Some(unresolved) = args.unresolved {
        filter = filter.with_unresolved(unresolved);
    }
    if let Some(limit) = args.limit {
        if limit == 0 {
            return Err(Error::InvalidInput("limit must be positive".to_string()));
        }
        filter = filter.with_limit(limit);
    }
    Ok(filter)
}
