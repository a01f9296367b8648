use thiserror::Error;

pub type Result<T, E = FeedError> = std::result::Result<T, E>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FeedError {
    #[error("sign in required")]
    AuthenticationRequired,

    #[error("invalid input: {0}")]
    Validation(String),

    #[error("upload failed: {0}")]
    Upload(String),

    #[error("network error: {0}")]
    Network(String),

    #[error("server returned {status}: {body}")]
    Server { status: u16, body: String },

    /// The local comment tree was stale; it has been reloaded and the caller may retry.
    #[error("comment refreshed, retry")]
    CommentRefreshed,

    #[error("not found: {0}")]
    NotFound(String),
}

impl FeedError {
    /// Short text suitable for a toast.
    pub fn user_message(&self) -> String {
        match self {
            Self::AuthenticationRequired => "Please sign in to continue".to_string(),
            Self::Validation(msg) => msg.clone(),
            Self::Upload(_) => "Could not upload the attachment".to_string(),
            Self::Network(_) => "Network error, please try again".to_string(),
            Self::Server { status, .. } if *status >= 500 => {
                "The server had a problem, please try again".to_string()
            }
            Self::Server { .. } => "The request was rejected".to_string(),
            Self::CommentRefreshed => "Comments were refreshed, please retry".to_string(),
            Self::NotFound(what) => format!("{} no longer exists", what),
        }
    }
}
