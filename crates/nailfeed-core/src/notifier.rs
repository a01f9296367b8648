use std::sync::Arc;

use tokio::sync::broadcast;
use tracing::{debug, warn};

use nailfeed_types::Notice;

/// Fans notices out to every subscribed front end.
#[derive(Clone)]
pub struct Notifier {
    inner: Arc<NotifierInner>,
}

struct NotifierInner {
    tx: broadcast::Sender<Notice>,
}

impl Notifier {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(256);
        Self {
            inner: Arc::new(NotifierInner { tx }),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Notice> {
        self.inner.tx.subscribe()
    }

    /// Deliver a notice. Having no subscribers is not an error.
    pub fn notify(&self, notice: Notice) {
        match &notice {
            Notice::Error { message } => warn!("notice: {}", message),
            other => debug!("notice: {:?}", other),
        }
        let _ = self.inner.tx.send(notice);
    }
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new()
    }
}
