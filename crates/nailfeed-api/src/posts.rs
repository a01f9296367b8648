use async_trait::async_trait;
use reqwest::Method;
use tracing::{debug, info};

use nailfeed_core::{PostsService, Result};
use nailfeed_types::api::{DataBody, UpdatePostRequest};
use nailfeed_types::{Page, Post};

use crate::client::{Payload, StrapiClient};
use crate::query::StrapiQuery;

const POSTS: &str = "/api/posts";

fn post_path(document_id: &str) -> String {
    format!("{}/{}", POSTS, document_id)
}

/// Relations every post view needs.
fn with_relations(query: StrapiQuery) -> StrapiQuery {
    query
        .populate("author", Some("avatar"))
        .populate("media", None)
        .populate("reactionSummary", None)
}

#[async_trait]
impl PostsService for StrapiClient {
    async fn list_posts(&self, page: u32, page_size: u32) -> Result<Page<Post>> {
        let query = with_relations(StrapiQuery::new().page(page, page_size).sort("createdAt:desc"));
        debug!("GET {} page {} ({} per page)", POSTS, page, page_size);
        let payload: Payload<Vec<Post>> = self
            .json(self.request(Method::GET, POSTS).query(query.pairs()))
            .await?;
        let (data, meta) = payload.into_parts();
        Ok(Page {
            data,
            pagination: meta.pagination,
        })
    }

    async fn get_post(&self, document_id: &str) -> Result<Post> {
        let query = with_relations(StrapiQuery::new());
        let payload: Payload<Post> = self
            .json(self.request(Method::GET, &post_path(document_id)).query(query.pairs()))
            .await?;
        Ok(payload.into_data())
    }

    async fn update_post(&self, document_id: &str, description: &str) -> Result<Post> {
        let body = DataBody {
            data: UpdatePostRequest {
                description: description.to_string(),
            },
        };
        let query = with_relations(StrapiQuery::new());
        let payload: Payload<Post> = self
            .json(
                self.request(Method::PUT, &post_path(document_id))
                    .query(query.pairs())
                    .json(&body),
            )
            .await?;
        info!("Post {} updated", document_id);
        Ok(payload.into_data())
    }

    async fn delete_post(&self, document_id: &str) -> Result<()> {
        self.send(self.request(Method::DELETE, &post_path(document_id)))
            .await?;
        info!("Post {} deleted", document_id);
        Ok(())
    }
}
