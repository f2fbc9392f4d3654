use async_trait::async_trait;
use tracing::info;

use super::Gateway;
use crate::error::Result;
use crate::forms::WorkshopDraft;
use crate::models::{Id, Workshop};
use crate::roles::Action;
use crate::store::{Loader, Mutation};
use crate::validation::Validate;

/// Client for `/api/workshops/`
#[derive(Clone)]
pub struct WorkshopsClient {
    gateway: Gateway,
}

impl WorkshopsClient {
    pub(crate) fn new(gateway: Gateway) -> Self {
        Self { gateway }
    }

    pub async fn list(&self) -> Result<Vec<Workshop>> {
        self.gateway.list("workshops").await
    }

    pub async fn get(&self, id: Id) -> Result<Workshop> {
        self.gateway
            .execute(self.gateway.get(&format!("workshops/{}", id)))
            .await
    }

    pub async fn create(&self, draft: &WorkshopDraft) -> Result<Workshop> {
        self.gateway.require_role(Action::ManageWorkshops).await?;
        draft.validate()?;
        let fetch = self.gateway.post("workshops").multipart(draft.to_form()?);
        let workshop: Workshop = self.gateway.execute(fetch).await?;
        info!(id = workshop.id, title = %workshop.title, "Workshop created");
        self.gateway.publish(Mutation::WorkshopSaved);
        Ok(workshop)
    }

    pub async fn update(&self, id: Id, draft: &WorkshopDraft) -> Result<Workshop> {
        self.gateway.require_role(Action::ManageWorkshops).await?;
        draft.validate()?;
        let fetch = self
            .gateway
            .put(&format!("workshops/{}", id))
            .multipart(draft.to_form()?);
        let workshop: Workshop = self.gateway.execute(fetch).await?;
        info!(id, "Workshop updated");
        self.gateway.publish(Mutation::WorkshopSaved);
        Ok(workshop)
    }

    pub async fn delete(&self, id: Id) -> Result<()> {
        self.gateway.require_role(Action::ManageWorkshops).await?;
        self.gateway
            .execute_empty(self.gateway.delete(&format!("workshops/{}", id)))
            .await?;
        info!(id, "Workshop deleted");
        self.gateway.publish(Mutation::WorkshopDeleted);
        Ok(())
    }
}

#[async_trait]
impl Loader<Workshop> for WorkshopsClient {
    async fn load(&self) -> Result<Vec<Workshop>> {
        self.list().await
    }
}
