use async_trait::async_trait;
use tracing::info;

use super::Gateway;
use crate::error::Result;
use crate::forms::{EventDraft, RatingDraft};
use crate::models::{Event, Id, Rating};
use crate::roles::Action;
use crate::store::{Loader, Mutation};
use crate::validation::Validate;

/// Client for `/api/events/`
#[derive(Clone)]
pub struct EventsClient {
    gateway: Gateway,
}

impl EventsClient {
    pub(crate) fn new(gateway: Gateway) -> Self {
        Self { gateway }
    }

    pub async fn list(&self) -> Result<Vec<Event>> {
        self.gateway.list("events").await
    }

    pub async fn get(&self, id: Id) -> Result<Event> {
        self.gateway
            .execute(self.gateway.get(&format!("events/{}", id)))
            .await
    }

    pub async fn create(&self, draft: &EventDraft) -> Result<Event> {
        self.gateway.require_role(Action::ManageEvents).await?;
        draft.validate()?;
        let fetch = self.gateway.post("events").multipart(draft.to_form()?);
        let event: Event = self.gateway.execute(fetch).await?;
        info!(id = event.id, title = %event.title, "Event created");
        self.gateway.publish(Mutation::EventSaved);
        Ok(event)
    }

    pub async fn update(&self, id: Id, draft: &EventDraft) -> Result<Event> {
        self.gateway.require_role(Action::ManageEvents).await?;
        draft.validate()?;
        let fetch = self
            .gateway
            .put(&format!("events/{}", id))
            .multipart(draft.to_form()?);
        let event: Event = self.gateway.execute(fetch).await?;
        info!(id, "Event updated");
        self.gateway.publish(Mutation::EventSaved);
        Ok(event)
    }

    pub async fn delete(&self, id: Id) -> Result<()> {
        self.gateway.require_role(Action::ManageEvents).await?;
        self.gateway
            .execute_empty(self.gateway.delete(&format!("events/{}", id)))
            .await?;
        info!(id, "Event deleted");
        self.gateway.publish(Mutation::EventDeleted);
        Ok(())
    }

    pub async fn ratings(&self, event_id: Id) -> Result<Vec<Rating>> {
        self.gateway
            .list(&format!("events/{}/ratings", event_id))
            .await
    }

    /// Leave a rating; open to anonymous visitors
    pub async fn rate(&self, event_id: Id, draft: &RatingDraft) -> Result<Rating> {
        self.gateway.require_role(Action::Rate).await?;
        draft.validate()?;
        let fetch = self
            .gateway
            .post(&format!("events/{}/ratings", event_id))
            .json(draft)?;
        let rating: Rating = self.gateway.execute(fetch).await?;
        info!(event_id, value = rating.value, "Event rated");
        self.gateway.publish(Mutation::EventRated);
        Ok(rating)
    }
}

#[async_trait]
impl Loader<Event> for EventsClient {
    async fn load(&self) -> Result<Vec<Event>> {
        self.list().await
    }
}
