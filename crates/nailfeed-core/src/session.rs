use parking_lot::RwLock;
use tracing::info;

use crate::error::{FeedError, Result};

/// The signed-in user as far as this client is concerned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Viewer {
    pub id: u64,
    pub document_id: Option<String>,
    pub username: String,
    pub jwt: String,
}

/// Session-scoped viewer identity. Sign-in itself happens elsewhere; this
/// only holds the result.
#[derive(Debug, Default)]
pub struct Session {
    viewer: RwLock<Option<Viewer>>,
}

impl Session {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn signed_in(viewer: Viewer) -> Self {
        Self {
            viewer: RwLock::new(Some(viewer)),
        }
    }

    pub fn viewer(&self) -> Option<Viewer> {
        self.viewer.read().clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.viewer.read().is_some()
    }

    pub fn require_viewer(&self) -> Result<Viewer> {
        self.viewer().ok_or(FeedError::AuthenticationRequired)
    }

    pub fn token(&self) -> Option<String> {
        self.viewer.read().as_ref().map(|v| v.jwt.clone())
    }

    pub fn sign_in(&self, viewer: Viewer) {
        info!("Signed in as {}", viewer.username);
        *self.viewer.write() = Some(viewer);
    }

    pub fn sign_out(&self) {
        if let Some(viewer) = self.viewer.write().take() {
            info!("Signed out {}", viewer.username);
        }
    }
}
