use async_trait::async_trait;
use tracing::info;

use super::Gateway;
use crate::error::Result;
use crate::forms::ArtworkDraft;
use crate::models::{Artwork, ColorAnalysis, Id};
use crate::roles::Action;
use crate::store::{Loader, Mutation};
use crate::validation::Validate;

/// Client for `/api/artworks/`
#[derive(Clone)]
pub struct ArtworksClient {
    gateway: Gateway,
}

impl ArtworksClient {
    pub(crate) fn new(gateway: Gateway) -> Self {
        Self { gateway }
    }

    pub async fn list(&self) -> Result<Vec<Artwork>> {
        self.gateway.list("artworks").await
    }

    pub async fn get(&self, id: Id) -> Result<Artwork> {
        self.gateway
            .execute(self.gateway.get(&format!("artworks/{}", id)))
            .await
    }

    pub async fn create(&self, draft: &ArtworkDraft) -> Result<Artwork> {
        self.gateway.require_role(Action::ManageArtworks).await?;
        draft.validate()?;
        let fetch = self.gateway.post("artworks").multipart(draft.to_form()?);
        let artwork: Artwork = self.gateway.execute(fetch).await?;
        info!(id = artwork.id, title = %artwork.title, "Artwork created");
        self.gateway.publish(Mutation::ArtworkSaved);
        Ok(artwork)
    }

    pub async fn update(&self, id: Id, draft: &ArtworkDraft) -> Result<Artwork> {
        self.gateway.require_role(Action::ManageArtworks).await?;
        draft.validate()?;
        let fetch = self
            .gateway
            .put(&format!("artworks/{}", id))
            .multipart(draft.to_form()?);
        let artwork: Artwork = self.gateway.execute(fetch).await?;
        info!(id, "Artwork updated");
        self.gateway.publish(Mutation::ArtworkSaved);
        Ok(artwork)
    }

    pub async fn delete(&self, id: Id) -> Result<()> {
        self.gateway.require_role(Action::ManageArtworks).await?;
        self.gateway
            .execute_empty(self.gateway.delete(&format!("artworks/{}", id)))
            .await?;
        info!(id, "Artwork deleted");
        self.gateway.publish(Mutation::ArtworkDeleted);
        Ok(())
    }

    /// Ask the backend to extract the dominant colors of the artwork image
    pub async fn analyze_colors(&self, id: Id) -> Result<Vec<String>> {
        self.gateway.require_role(Action::AnalyzeColors).await?;
        let analysis: ColorAnalysis = self
            .gateway
            .execute(self.gateway.post(&format!("artworks/{}/analyze", id)))
            .await?;
        info!(id, colors = analysis.color_palette.len(), "Artwork colors analyzed");
        self.gateway.publish(Mutation::ArtworkAnalyzed);
        Ok(analysis.color_palette)
    }
}

#[async_trait]
impl Loader<Artwork> for ArtworksClient {
    async fn load(&self) -> Result<Vec<Artwork>> {
        self.list().await
    }
}
