//! Publish/subscribe of stale collections
//!
//! Mutation handlers do not hold references to the lists they affect. They
//! publish the collections their mutation made stale and every mounted
//! [`ListStore`](super::ListStore) listening for that collection refetches.

use std::fmt;

use tokio::sync::broadcast;
use tracing::debug;

/// Entity collections a list can show
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Events,
    Workshops,
    Artworks,
    Reservations,
    Comments,
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Events => "events",
            Self::Workshops => "workshops",
            Self::Artworks => "artworks",
            Self::Reservations => "reservations",
            Self::Comments => "comments",
        };
        f.write_str(name)
    }
}

/// Successful mutations and the collections they leave stale
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mutation {
    EventSaved,
    EventDeleted,
    EventRated,
    WorkshopSaved,
    WorkshopDeleted,
    ArtworkSaved,
    ArtworkDeleted,
    ArtworkAnalyzed,
    ReservationCreated,
    ReservationStatusChanged,
    ReservationDeleted,
    CommentSaved,
    CommentDeleted,
    CommentModerated,
}

impl Mutation {
    pub fn stale_collections(&self) -> &'static [Collection] {
        use Collection::*;
        match self {
            Self::EventSaved | Self::EventDeleted | Self::EventRated => &[Events],
            Self::WorkshopSaved | Self::WorkshopDeleted => &[Workshops],
            Self::ArtworkAnalyzed => &[Artworks],
            // reservations embed the artwork, comments reference it
            Self::ArtworkSaved => &[Artworks, Reservations],
            Self::ArtworkDeleted => &[Artworks, Reservations, Comments],
            // availability moves with every reservation change
            Self::ReservationCreated
            | Self::ReservationStatusChanged
            | Self::ReservationDeleted => &[Artworks, Reservations],
            Self::CommentSaved | Self::CommentDeleted | Self::CommentModerated => &[Comments],
        }
    }
}

#[derive(Clone)]
pub struct InvalidationBus {
    sender: broadcast::Sender<Collection>,
}

impl Default for InvalidationBus {
    fn default() -> Self {
        Self::new()
    }
}

impl InvalidationBus {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(64);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Collection> {
        self.sender.subscribe()
    }

    pub fn invalidate(&self, collection: Collection) {
        debug!(%collection, "Collection marked stale");
        // nobody listening is not an error
        let _ = self.sender.send(collection);
    }

    pub fn publish(&self, mutation: Mutation) {
        for collection in mutation.stale_collections() {
            self.invalidate(*collection);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reservation_changes_touch_artworks_too() {
        assert_eq!(
            Mutation::ReservationCreated.stale_collections(),
            &[Collection::Artworks, Collection::Reservations]
        );
        assert_eq!(
            Mutation::EventRated.stale_collections(),
            &[Collection::Events]
        );
    }

    #[tokio::test]
    async fn subscribers_receive_published_collections() {
        let bus = InvalidationBus::new();
        let mut rx = bus.subscribe();
        bus.publish(Mutation::ReservationDeleted);
        assert_eq!(rx.recv().await.unwrap(), Collection::Artworks);
        assert_eq!(rx.recv().await.unwrap(), Collection::Reservations);
    }
}
