use async_trait::async_trait;
use serde::Serialize;
use tracing::info;

use super::Gateway;
use crate::error::Result;
use crate::forms::ReservationDraft;
use crate::models::{Artwork, Id, Reservation, ReservationStatus};
use crate::roles::Action;
use crate::store::{Loader, Mutation};

#[derive(Serialize)]
struct StatusChange {
    status: ReservationStatus,
}

/// Client for `/api/reservations/`
#[derive(Clone)]
pub struct ReservationsClient {
    gateway: Gateway,
}

impl ReservationsClient {
    pub(crate) fn new(gateway: Gateway) -> Self {
        Self { gateway }
    }

    /// Reservations visible to the signed-in user
    pub async fn list(&self) -> Result<Vec<Reservation>> {
        self.gateway.require_login()?;
        self.gateway.list("reservations").await
    }

    /// Reserve `draft.quantity` copies of `artwork`
    ///
    /// The quantity is checked against the artwork's current availability
    /// before anything is sent.
    pub async fn create(&self, artwork: &Artwork, draft: &ReservationDraft) -> Result<Reservation> {
        self.gateway.require_role(Action::Reserve).await?;
        let payload = draft.to_payload(artwork)?;
        let fetch = self.gateway.post("reservations").json(&payload)?;
        let reservation: Reservation = self.gateway.execute(fetch).await?;
        info!(
            id = reservation.id,
            artwork = artwork.id,
            quantity = reservation.quantity,
            "Reservation created"
        );
        self.gateway.publish(Mutation::ReservationCreated);
        Ok(reservation)
    }

    pub async fn set_status(&self, id: Id, status: ReservationStatus) -> Result<Reservation> {
        self.gateway.require_role(Action::ManageReservations).await?;
        let fetch = self
            .gateway
            .patch(&format!("reservations/{}", id))
            .json(&StatusChange { status })?;
        let reservation: Reservation = self.gateway.execute(fetch).await?;
        info!(id, %status, "Reservation status changed");
        self.gateway.publish(Mutation::ReservationStatusChanged);
        Ok(reservation)
    }

    pub async fn delete(&self, id: Id) -> Result<()> {
        self.gateway.require_role(Action::ManageReservations).await?;
        self.gateway
            .execute_empty(self.gateway.delete(&format!("reservations/{}", id)))
            .await?;
        info!(id, "Reservation deleted");
        self.gateway.publish(Mutation::ReservationDeleted);
        Ok(())
    }
}

#[async_trait]
impl Loader<Reservation> for ReservationsClient {
    async fn load(&self) -> Result<Vec<Reservation>> {
        self.list().await
    }
}
