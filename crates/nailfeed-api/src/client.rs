use std::sync::Arc;

use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use nailfeed_core::{FeedError, Notifier, Result, Services, Session};
use nailfeed_types::api::{Envelope, ErrorBody, Meta};

/// REST client for the Strapi backend. The bearer token is read from the
/// shared session on every request, so signing in or out takes effect
/// immediately.
#[derive(Clone)]
pub struct StrapiClient {
    http: Client,
    base_url: String,
    session: Arc<Session>,
}

impl StrapiClient {
    pub fn new(base_url: impl Into<String>, session: Arc<Session>) -> Self {
        Self::with_http(Client::new(), base_url, session)
    }

    pub fn with_http(http: Client, base_url: impl Into<String>, session: Arc<Session>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            http,
            base_url,
            session,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    /// Wire this client in as every backend collaborator.
    pub fn into_services(self, notifier: Notifier) -> Services {
        let session = Arc::clone(&self.session);
        let client = Arc::new(self);
        Services {
            posts: client.clone(),
            comments: client.clone(),
            reactions: client.clone(),
            uploads: client,
            session,
            notifier,
        }
    }

    pub(crate) fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self.http.request(method, format!("{}{}", self.base_url, path));
        match self.session.token() {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Send and fail on any non-2xx status.
    pub(crate) async fn send(&self, builder: RequestBuilder) -> Result<Response> {
        let resp = builder.send().await.map_err(transport)?;
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        let path = resp.url().path().to_string();
        let body = resp.text().await.unwrap_or_default();
        debug!("Request to {} failed ({}): {}", path, status, body);
        Err(status_error(status, &body))
    }

    pub(crate) async fn json<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T> {
        let resp = self.send(builder).await?;
        let status = resp.status().as_u16();
        let text = resp.text().await.map_err(transport)?;
        decode(status, &text)
    }
}

/// Accepts either a bare payload or Strapi's `{ data, meta }` envelope.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum Payload<T> {
    Enveloped(Envelope<T>),
    Bare(T),
}

impl<T> Payload<T> {
    pub(crate) fn into_parts(self) -> (T, Meta) {
        match self {
            Self::Enveloped(env) => (env.data, env.meta),
            Self::Bare(data) => (data, Meta::default()),
        }
    }

    pub(crate) fn into_data(self) -> T {
        self.into_parts().0
    }
}

pub(crate) fn decode<T: DeserializeOwned>(status: u16, text: &str) -> Result<T> {
    serde_json::from_str(text).map_err(|e| {
        warn!("Undecodable response body: {}", e);
        FeedError::Server {
            status,
            body: format!("unexpected response body: {}", e),
        }
    })
}

/// 401/403 mean the viewer has to sign in; anything else keeps its status
/// and the server's message when one can be extracted.
pub fn status_error(status: StatusCode, body: &str) -> FeedError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => FeedError::AuthenticationRequired,
        _ => {
            let message = serde_json::from_str::<ErrorBody>(body)
                .ok()
                .and_then(|b| b.error)
                .and_then(|e| e.message)
                .unwrap_or_else(|| body.to_string());
            FeedError::Server {
                status: status.as_u16(),
                body: message,
            }
        }
    }
}

fn transport(e: reqwest::Error) -> FeedError {
    FeedError::Network(e.to_string())
}
