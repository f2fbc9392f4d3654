use super::{Control, Viewer};
use crate::models::{Artwork, Comment, Event, Id, Reservation, Workshop};

/// An event with its rounded rating and the viewer's controls
#[derive(Debug, Clone, PartialEq)]
pub struct EventCard {
    pub event: Event,
    pub stars: u8,
    pub controls: Vec<Control>,
}

impl EventCard {
    pub fn new(event: Event, viewer: &Viewer) -> Self {
        let stars = event.stars();
        let controls = viewer.allowed(&[Control::EditEvent, Control::DeleteEvent, Control::RateEvent]);
        Self {
            event,
            stars,
            controls,
        }
    }

    /// `★★★☆☆` style rating
    pub fn star_line(&self) -> String {
        let filled = usize::from(self.stars);
        format!("{}{}", "★".repeat(filled), "☆".repeat(5 - filled))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct WorkshopCard {
    pub workshop: Workshop,
    pub controls: Vec<Control>,
}

impl WorkshopCard {
    pub fn new(workshop: Workshop, viewer: &Viewer) -> Self {
        let controls = viewer.allowed(&[Control::EditWorkshop, Control::DeleteWorkshop]);
        Self { workshop, controls }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ArtworkCard {
    pub artwork: Artwork,
    pub controls: Vec<Control>,
}

impl ArtworkCard {
    /// Sold-out artworks lose the reserve control
    pub fn new(artwork: Artwork, viewer: &Viewer) -> Self {
        let mut controls = viewer.allowed(&[
            Control::EditArtwork,
            Control::DeleteArtwork,
            Control::AnalyzeColors,
            Control::Reserve,
        ]);
        if !artwork.is_available() {
            controls.retain(|control| *control != Control::Reserve);
        }
        Self { artwork, controls }
    }

    pub fn palette(&self) -> &[String] {
        self.artwork.color_palette.as_deref().unwrap_or(&[])
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReservationRow {
    pub reservation: Reservation,
    pub controls: Vec<Control>,
}

impl ReservationRow {
    pub fn new(reservation: Reservation, viewer: &Viewer) -> Self {
        let controls = viewer.allowed(&[Control::ChangeReservationStatus, Control::DeleteReservation]);
        Self {
            reservation,
            controls,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CommentView {
    pub comment: Comment,
    pub controls: Vec<Control>,
}

/// Comments under one artwork plus whether the composer is shown
#[derive(Debug, Clone, PartialEq)]
pub struct CommentThread {
    pub artwork_id: Id,
    pub comments: Vec<CommentView>,
    pub can_submit: bool,
}

impl CommentThread {
    /// Keeps only the comments that belong to `artwork_id`
    pub fn new(artwork_id: Id, comments: Vec<Comment>, viewer: &Viewer) -> Self {
        let comments = comments
            .into_iter()
            .filter(|comment| comment.artwork.id() == artwork_id)
            .map(|comment| {
                let own = viewer.user_id == Some(comment.user.id);
                let mut controls = Vec::new();
                if own {
                    controls.extend(viewer.allowed(&[Control::EditComment, Control::DeleteComment]));
                }
                controls.extend(viewer.allowed(&[Control::ModerateComment]));
                CommentView { comment, controls }
            })
            .collect();
        Self {
            artwork_id,
            comments,
            can_submit: viewer.can(Control::SubmitComment.action()),
        }
    }

    /// Controls at the thread level
    pub fn controls(&self) -> Vec<Control> {
        if self.can_submit {
            vec![Control::SubmitComment]
        } else {
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ArtworkRef, CommentAuthor, ModerationStatus};
    use crate::roles::Role;
    use chrono::{TimeZone, Utc};

    fn event() -> Event {
        Event {
            id: 1,
            title: "Vernissage".to_string(),
            description: String::new(),
            start_date: Utc.with_ymd_and_hms(2025, 6, 1, 18, 0, 0).unwrap(),
            end_date: Utc.with_ymd_and_hms(2025, 6, 1, 22, 0, 0).unwrap(),
            location: "Main hall".to_string(),
            image: None,
            capacity: 50,
            price: "0.00".to_string(),
            average_rating: 3.6,
            ratings: Vec::new(),
        }
    }

    fn artwork(available: u32) -> Artwork {
        Artwork {
            id: 7,
            title: "Blue Study".to_string(),
            description: String::new(),
            quantity_available: available,
            price: "120.00".to_string(),
            image: None,
            color_palette: Some(vec!["#1a2b3c".to_string()]),
            created_at: None,
        }
    }

    fn comment(id: Id, artwork: Id, author: Id) -> Comment {
        Comment {
            id,
            artwork: ArtworkRef::Id(artwork),
            user: CommentAuthor {
                id: author,
                first_name: "Léa".to_string(),
                last_name: "Blanc".to_string(),
                category: Role::Visiteur,
            },
            content: "Lovely".to_string(),
            moderation_status: ModerationStatus::Approved,
            moderation_reason: None,
            created_at: None,
        }
    }

    #[test]
    fn visitor_never_gets_delete_event() {
        let card = EventCard::new(event(), &Viewer::new(Role::Visiteur, 2));
        assert!(!card.controls.contains(&Control::DeleteEvent));
        assert_eq!(card.controls, vec![Control::RateEvent]);
        assert_eq!(card.star_line(), "★★★★☆");
    }

    #[test]
    fn artist_never_gets_submit_comment() {
        let artist = Viewer::new(Role::Artist, 1);
        let thread = CommentThread::new(7, vec![comment(1, 7, 2)], &artist);
        assert!(!thread.can_submit);
        assert!(!thread.controls().contains(&Control::SubmitComment));
        assert_eq!(thread.comments[0].controls, vec![Control::ModerateComment]);

        let card = EventCard::new(event(), &artist);
        assert_eq!(card.controls, vec![Control::EditEvent, Control::DeleteEvent]);
    }

    #[test]
    fn thread_filters_by_artwork_and_ownership() {
        let visitor = Viewer::new(Role::Visiteur, 2);
        let thread = CommentThread::new(
            7,
            vec![comment(1, 7, 2), comment(2, 8, 2), comment(3, 7, 5)],
            &visitor,
        );
        assert_eq!(thread.comments.len(), 2);
        assert_eq!(
            thread.comments[0].controls,
            vec![Control::EditComment, Control::DeleteComment]
        );
        assert!(thread.comments[1].controls.is_empty());
        assert!(thread.can_submit);
    }

    #[test]
    fn sold_out_artwork_cannot_be_reserved() {
        let visitor = Viewer::new(Role::Visiteur, 2);
        assert_eq!(ArtworkCard::new(artwork(2), &visitor).controls, vec![Control::Reserve]);
        assert!(ArtworkCard::new(artwork(0), &visitor).controls.is_empty());
        assert!(ArtworkCard::new(artwork(1), &Viewer::anonymous()).controls.is_empty());
    }
}
