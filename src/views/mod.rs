//! View models for listings
//!
//! Each card or row carries the controls its viewer may use, already
//! filtered through the role rules, so renderers never show an action the
//! viewer cannot take.

mod cards;
mod table;

use std::fmt;

use crate::models::Id;
use crate::roles::{permits, Action, Role};
use crate::session::SessionHolder;
use crate::store::Collection;

pub use cards::*;
pub use table::*;

/// Who is looking at the page
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Viewer {
    pub role: Option<Role>,
    pub user_id: Option<Id>,
}

impl Viewer {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn new(role: Role, user_id: Id) -> Self {
        Self {
            role: Some(role),
            user_id: Some(user_id),
        }
    }

    pub fn from_session(session: &SessionHolder) -> Self {
        match session.user() {
            Some(user) => Self::new(user.category, user.id),
            None => Self::anonymous(),
        }
    }

    pub fn can(&self, action: Action) -> bool {
        permits(self.role, action)
    }

    fn allowed(&self, candidates: &[Control]) -> Vec<Control> {
        candidates
            .iter()
            .copied()
            .filter(|control| self.can(control.action()))
            .collect()
    }
}

/// An action button shown next to a record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Control {
    CreateEvent,
    EditEvent,
    DeleteEvent,
    RateEvent,
    CreateWorkshop,
    EditWorkshop,
    DeleteWorkshop,
    CreateArtwork,
    EditArtwork,
    DeleteArtwork,
    AnalyzeColors,
    Reserve,
    ChangeReservationStatus,
    DeleteReservation,
    SubmitComment,
    EditComment,
    DeleteComment,
    ModerateComment,
}

impl Control {
    /// The gated action behind the control
    pub fn action(&self) -> Action {
        match self {
            Self::CreateEvent | Self::EditEvent | Self::DeleteEvent => Action::ManageEvents,
            Self::RateEvent => Action::Rate,
            Self::CreateWorkshop | Self::EditWorkshop | Self::DeleteWorkshop => {
                Action::ManageWorkshops
            }
            Self::CreateArtwork | Self::EditArtwork | Self::DeleteArtwork => Action::ManageArtworks,
            Self::AnalyzeColors => Action::AnalyzeColors,
            Self::Reserve => Action::Reserve,
            Self::ChangeReservationStatus | Self::DeleteReservation => Action::ManageReservations,
            Self::SubmitComment | Self::EditComment | Self::DeleteComment => Action::Comment,
            Self::ModerateComment => Action::ModerateComments,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::CreateEvent => "new event",
            Self::EditEvent | Self::EditWorkshop | Self::EditArtwork => "edit",
            Self::DeleteEvent
            | Self::DeleteWorkshop
            | Self::DeleteArtwork
            | Self::DeleteReservation => "delete",
            Self::RateEvent => "rate",
            Self::CreateWorkshop => "new workshop",
            Self::CreateArtwork => "new artwork",
            Self::AnalyzeColors => "analyze",
            Self::Reserve => "reserve",
            Self::ChangeReservationStatus => "status",
            Self::SubmitComment => "comment",
            Self::EditComment => "edit",
            Self::DeleteComment => "delete",
            Self::ModerateComment => "moderate",
        }
    }
}

impl fmt::Display for Control {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Page-level controls above a listing
pub fn toolbar(viewer: &Viewer, collection: Collection) -> Vec<Control> {
    let candidates: &[Control] = match collection {
        Collection::Events => &[Control::CreateEvent],
        Collection::Workshops => &[Control::CreateWorkshop],
        Collection::Artworks => &[Control::CreateArtwork],
        Collection::Reservations | Collection::Comments => &[],
    };
    viewer.allowed(candidates)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toolbar_follows_role() {
        let artist = Viewer::new(Role::Artist, 1);
        let visitor = Viewer::new(Role::Visiteur, 2);
        assert_eq!(toolbar(&artist, Collection::Events), vec![Control::CreateEvent]);
        assert!(toolbar(&visitor, Collection::Events).is_empty());
        assert!(toolbar(&Viewer::anonymous(), Collection::Artworks).is_empty());
    }
}
