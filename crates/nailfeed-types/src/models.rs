use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Prefix marking a comment that only exists locally while its create
/// request is in flight.
pub const TEMP_ID_PREFIX: &str = "temp-";

// -- Users & media --

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Author {
    pub id: u64,
    #[serde(default)]
    pub document_id: Option<String>,
    pub username: String,
    #[serde(default)]
    pub avatar: Option<Media>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Media {
    pub id: u64,
    pub url: String,
    #[serde(default)]
    pub mime: Option<String>,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
    #[serde(default)]
    pub alternative_text: Option<String>,
}

/// Upload endpoint result: the media reference handed to comments and posts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadedMedia {
    pub id: u64,
    pub url: String,
}

// -- Reactions --

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReactionKind {
    Like,
    Love,
    Haha,
    Wow,
    Sad,
    Angry,
}

impl ReactionKind {
    pub const ALL: [ReactionKind; 6] = [
        ReactionKind::Like,
        ReactionKind::Love,
        ReactionKind::Haha,
        ReactionKind::Wow,
        ReactionKind::Sad,
        ReactionKind::Angry,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Like => "like",
            Self::Love => "love",
            Self::Haha => "haha",
            Self::Wow => "wow",
            Self::Sad => "sad",
            Self::Angry => "angry",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s.trim()))
    }

    /// Default glyph used when the backend has no emoji configured.
    pub fn default_emoji(self) -> &'static str {
        match self {
            Self::Like => "👍",
            Self::Love => "❤️",
            Self::Haha => "😆",
            Self::Wow => "😮",
            Self::Sad => "😢",
            Self::Angry => "😡",
        }
    }
}

impl fmt::Display for ReactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-type reaction counts. Types with no reactions are not stored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReactionCounts(BTreeMap<ReactionKind, u64>);

impl ReactionCounts {
    pub fn get(&self, kind: ReactionKind) -> u64 {
        self.0.get(&kind).copied().unwrap_or(0)
    }

    pub fn set(&mut self, kind: ReactionKind, count: u64) {
        if count == 0 {
            self.0.remove(&kind);
        } else {
            self.0.insert(kind, count);
        }
    }

    pub fn increment(&mut self, kind: ReactionKind) {
        *self.0.entry(kind).or_default() += 1;
    }

    /// Saturates at zero; a server summary may lag behind the viewer's own reaction.
    pub fn decrement(&mut self, kind: ReactionKind) {
        let next = self.get(kind).saturating_sub(1);
        self.set(kind, next);
    }

    pub fn sum(&self) -> u64 {
        self.0.values().sum()
    }

    /// Kinds with a non-zero count, in declaration order.
    pub fn present(&self) -> Vec<ReactionKind> {
        self.0
            .iter()
            .filter(|(_, count)| **count > 0)
            .map(|(kind, _)| *kind)
            .collect()
    }
}

impl FromIterator<(ReactionKind, u64)> for ReactionCounts {
    fn from_iter<I: IntoIterator<Item = (ReactionKind, u64)>>(iter: I) -> Self {
        let mut counts = ReactionCounts::default();
        for (kind, count) in iter {
            counts.set(kind, count);
        }
        counts
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReactionSummary {
    #[serde(default)]
    pub counts_by_type: ReactionCounts,
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub user_reaction: Option<ReactionKind>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReactionUser {
    pub user: Author,
    pub reaction_type: ReactionKind,
}

/// One page of the "who reacted" listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReactionPage {
    pub users: Vec<ReactionUser>,
    pub pagination: Option<Pagination>,
    /// Only complete on unfiltered requests.
    pub counts_by_type: Option<ReactionCounts>,
}

// -- Posts --

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: u64,
    pub document_id: String,
    #[serde(default)]
    pub author: Option<Author>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub media: Vec<Media>,
    #[serde(default)]
    pub likes_count: u64,
    #[serde(default)]
    pub comments_count: u64,
    #[serde(default)]
    pub reaction_summary: ReactionSummary,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

// -- Comments --

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    /// Server id. `None` until the create request has been acknowledged.
    #[serde(default)]
    pub id: Option<u64>,
    pub document_id: String,
    #[serde(default)]
    pub author: Option<Author>,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub attachment: Option<Media>,
    #[serde(default, deserialize_with = "thread_ref")]
    pub thread_of: Option<u64>,
    #[serde(default)]
    pub children: Vec<Comment>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub blocked: bool,
    #[serde(default)]
    pub removed: bool,
}

impl Comment {
    pub fn is_pending(&self) -> bool {
        self.document_id.starts_with(TEMP_ID_PREFIX)
    }

    pub fn author_id(&self) -> Option<u64> {
        self.author.as_ref().map(|a| a.id)
    }
}

/// The comments plugin sends `threadOf` either as a bare id or as the
/// populated parent object.
fn thread_ref<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum ThreadRef {
        Id(u64),
        Object { id: u64 },
    }

    Ok(Option::<ThreadRef>::deserialize(deserializer)?.map(|r| match r {
        ThreadRef::Id(id) | ThreadRef::Object { id } => id,
    }))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReportReason {
    BadLanguage,
    Discrimination,
    Other,
}

impl ReportReason {
    /// Unknown reasons are reported as `Other`.
    pub fn from_str_lossy(s: &str) -> Self {
        match s.trim().to_ascii_uppercase().as_str() {
            "BAD_LANGUAGE" => Self::BadLanguage,
            "DISCRIMINATION" => Self::Discrimination,
            _ => Self::Other,
        }
    }
}

// -- Pagination --

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: u32,
    pub page_size: u32,
    pub page_count: u32,
    pub total: u64,
}

impl Pagination {
    pub fn has_more(&self) -> bool {
        self.page < self.page_count
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub data: Vec<T>,
    pub pagination: Option<Pagination>,
}
