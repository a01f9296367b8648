use async_trait::async_trait;
use reqwest::Method;
use tracing::debug;

use nailfeed_core::{ReactionQuery, ReactionService, Result};
use nailfeed_types::api::{EmojiResponse, SetReactionRequest};
use nailfeed_types::{ReactionKind, ReactionPage, ReactionUser};

use crate::client::{Payload, StrapiClient};
use crate::query::StrapiQuery;

fn reactions_path(post_id: &str) -> String {
    format!("/api/posts/{}/reactions", post_id)
}

fn likes_path(post_id: &str) -> String {
    format!("/api/posts/{}/likes", post_id)
}

pub(crate) fn likes_query(query: ReactionQuery) -> StrapiQuery {
    let q = StrapiQuery::new()
        .param("page", query.page)
        .param("pageSize", query.page_size);
    match query.type_filter {
        Some(kind) => q.param("reactionType", kind),
        None => q,
    }
}

#[async_trait]
impl ReactionService for StrapiClient {
    async fn add_reaction(&self, post_id: &str, kind: Option<ReactionKind>) -> Result<()> {
        let body = SetReactionRequest { reaction_type: kind };
        self.send(self.request(Method::POST, &reactions_path(post_id)).json(&body))
            .await?;
        debug!("Reaction on {} stored as {:?}", post_id, kind);
        Ok(())
    }

    async fn fetch_post_likes(&self, post_id: &str, query: ReactionQuery) -> Result<ReactionPage> {
        let params = likes_query(query);
        let payload: Payload<Vec<ReactionUser>> = self
            .json(self.request(Method::GET, &likes_path(post_id)).query(params.pairs()))
            .await?;
        let (users, meta) = payload.into_parts();
        Ok(ReactionPage {
            users,
            pagination: meta.pagination,
            counts_by_type: meta.counts_by_type,
        })
    }

    async fn get_emoji(&self, kind: ReactionKind) -> Result<String> {
        let path = format!("/api/reactions/{}/emoji", kind);
        let payload: Payload<EmojiResponse> = self.json(self.request(Method::GET, &path)).await?;
        Ok(payload.into_data().emoji)
    }
}
