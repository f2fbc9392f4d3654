use async_trait::async_trait;
use serde::Serialize;
use tracing::info;

use super::{AiClient, Gateway};
use crate::error::{Error, Result};
use crate::forms::{validate_content, CommentDraft};
use crate::models::{Comment, Id, ModerationStatus};
use crate::roles::Action;
use crate::store::{Loader, Mutation};

#[derive(Serialize)]
struct ContentUpdate<'a> {
    content: &'a str,
}

#[derive(Serialize)]
struct ModerationUpdate<'a> {
    moderation_status: ModerationStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    moderation_reason: Option<&'a str>,
}

/// Client for `/api/comments/`
///
/// New and edited comments go through the moderation pre-check first.
#[derive(Clone)]
pub struct CommentsClient {
    gateway: Gateway,
    ai: AiClient,
}

impl CommentsClient {
    pub(crate) fn new(gateway: Gateway) -> Self {
        let ai = AiClient::new(gateway.clone());
        Self { gateway, ai }
    }

    pub async fn list(&self) -> Result<Vec<Comment>> {
        self.gateway.list("comments").await
    }

    pub async fn list_for_artwork(&self, artwork_id: Id) -> Result<Vec<Comment>> {
        self.gateway
            .list(&format!("artworks/{}/comments", artwork_id))
            .await
    }

    pub async fn create(&self, draft: &CommentDraft) -> Result<Comment> {
        self.gateway.require_role(Action::Comment).await?;
        let payload = draft.to_payload()?;
        if let Some(reason) = self.ai.screen(&payload.content).await? {
            info!(artwork = payload.artwork, %reason, "Comment blocked by moderation");
            return Err(Error::ModerationRejected(reason));
        }
        let fetch = self.gateway.post("comments").json(&payload)?;
        let comment: Comment = self.gateway.execute(fetch).await?;
        info!(id = comment.id, artwork = payload.artwork, "Comment posted");
        self.gateway.publish(Mutation::CommentSaved);
        Ok(comment)
    }

    pub async fn update(&self, id: Id, content: &str) -> Result<Comment> {
        self.gateway.require_role(Action::Comment).await?;
        validate_content(content)?;
        let content = content.trim();
        if let Some(reason) = self.ai.screen(content).await? {
            info!(id, %reason, "Comment edit blocked by moderation");
            return Err(Error::ModerationRejected(reason));
        }
        let fetch = self
            .gateway
            .put(&format!("comments/{}", id))
            .json(&ContentUpdate { content })?;
        let comment: Comment = self.gateway.execute(fetch).await?;
        info!(id, "Comment edited");
        self.gateway.publish(Mutation::CommentSaved);
        Ok(comment)
    }

    /// Authors remove their own comments; the backend checks ownership
    pub async fn delete(&self, id: Id) -> Result<()> {
        self.gateway.require_login()?;
        self.gateway
            .execute_empty(self.gateway.delete(&format!("comments/{}", id)))
            .await?;
        info!(id, "Comment deleted");
        self.gateway.publish(Mutation::CommentDeleted);
        Ok(())
    }

    /// Artist override of a comment's moderation status
    pub async fn update_moderation(
        &self,
        id: Id,
        status: ModerationStatus,
        reason: Option<&str>,
    ) -> Result<Comment> {
        self.gateway.require_role(Action::ModerateComments).await?;
        let fetch = self
            .gateway
            .post(&format!("comments/{}/update-moderation", id))
            .json(&ModerationUpdate {
                moderation_status: status,
                moderation_reason: reason,
            })?;
        let comment: Comment = self.gateway.execute(fetch).await?;
        info!(id, %status, "Comment moderation updated");
        self.gateway.publish(Mutation::CommentModerated);
        Ok(comment)
    }
}

#[async_trait]
impl Loader<Comment> for CommentsClient {
    async fn load(&self) -> Result<Vec<Comment>> {
        self.list().await
    }
}

/// Loader for the comment thread of a single artwork
#[derive(Clone)]
pub struct ArtworkComments {
    client: CommentsClient,
    artwork_id: Id,
}

impl ArtworkComments {
    pub fn new(client: CommentsClient, artwork_id: Id) -> Self {
        Self { client, artwork_id }
    }
}

#[async_trait]
impl Loader<Comment> for ArtworkComments {
    async fn load(&self) -> Result<Vec<Comment>> {
        self.client.list_for_artwork(self.artwork_id).await
    }
}
