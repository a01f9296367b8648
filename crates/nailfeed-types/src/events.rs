use serde::{Deserialize, Serialize};

/// User-visible notifications raised by the client engine.
///
/// Front ends render these as transient toasts; nothing here is modal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum Notice {
    /// An action needs a signed-in viewer
    LoginRequired { action: String },

    /// A mutation or fetch failed
    Error { message: String },

    /// A mutation completed
    Success { message: String },

    /// Informational, e.g. local state was refreshed
    Info { message: String },
}

impl Notice {
    pub fn login_required(action: impl Into<String>) -> Self {
        Self::LoginRequired { action: action.into() }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::Error { message: message.into() }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::Success { message: message.into() }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::Info { message: message.into() }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error { .. })
    }
}
