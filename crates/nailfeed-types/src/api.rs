use serde::{Deserialize, Serialize};

use crate::models::{Pagination, ReactionCounts, ReactionKind, ReportReason};

// -- Envelopes --

/// Strapi wraps every payload as `{ data, meta }`.
#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
    pub data: T,
    #[serde(default)]
    pub meta: Meta,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Meta {
    #[serde(default)]
    pub pagination: Option<Pagination>,
    #[serde(default)]
    pub counts_by_type: Option<ReactionCounts>,
}

/// Request bodies sent to collection endpoints are wrapped in `data`.
#[derive(Debug, Serialize)]
pub struct DataBody<T> {
    pub data: T,
}

#[derive(Debug, Default, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub error: Option<ErrorDetail>,
}

#[derive(Debug, Deserialize)]
pub struct ErrorDetail {
    #[serde(default)]
    pub message: Option<String>,
}

// -- Posts --

#[derive(Debug, Serialize)]
pub struct UpdatePostRequest {
    pub description: String,
}

// -- Comments --

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCommentRequest {
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thread_of: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attachment: Option<u64>,
}

#[derive(Debug, Serialize)]
pub struct UpdateCommentRequest {
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attachment: Option<u64>,
}

#[derive(Debug, Serialize)]
pub struct ReportCommentRequest {
    pub reason: ReportReason,
    pub content: String,
}

/// Count endpoint response.
#[derive(Debug, Deserialize)]
pub struct CommentCount {
    pub count: u64,
}

// -- Reactions --

/// `reaction_type: None` removes the viewer's reaction.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SetReactionRequest {
    pub reaction_type: Option<ReactionKind>,
}

#[derive(Debug, Deserialize)]
pub struct EmojiResponse {
    pub emoji: String,
}
