//! Role gating for mutating actions
//!
//! This is a UX guard: the backend still enforces authorization. The API
//! clients refuse gated calls before sending them, and the view models never
//! expose a control the viewer is not allowed to use.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// User category as stored by the backend
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    Artist,
    #[default]
    Visiteur,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Artist => "Artist",
            Self::Visiteur => "Visiteur",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "artist" => Ok(Self::Artist),
            "visiteur" | "visitor" => Ok(Self::Visiteur),
            other => Err(format!("unknown role: {}", other)),
        }
    }
}

/// Actions that depend on who is asking
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    ManageEvents,
    ManageWorkshops,
    ManageArtworks,
    AnalyzeColors,
    ManageReservations,
    ModerateComments,
    Reserve,
    Comment,
    Rate,
}

impl Action {
    fn describe(&self) -> &'static str {
        match self {
            Self::ManageEvents => "manage events",
            Self::ManageWorkshops => "manage workshops",
            Self::ManageArtworks => "manage artworks",
            Self::AnalyzeColors => "analyze artwork colors",
            Self::ManageReservations => "manage reservations",
            Self::ModerateComments => "moderate comments",
            Self::Reserve => "reserve artworks",
            Self::Comment => "post comments",
            Self::Rate => "rate events",
        }
    }
}

/// Whether `role` (`None` for anonymous visitors) may perform `action`
pub fn permits(role: Option<Role>, action: Action) -> bool {
    match action {
        Action::ManageEvents
        | Action::ManageWorkshops
        | Action::ManageArtworks
        | Action::AnalyzeColors
        | Action::ManageReservations
        | Action::ModerateComments => role == Some(Role::Artist),
        Action::Reserve | Action::Comment => role == Some(Role::Visiteur),
        Action::Rate => role != Some(Role::Artist),
    }
}

/// `Error::Forbidden` unless the role may perform the action
pub fn ensure(role: Option<Role>, action: Action) -> Result<()> {
    if permits(role, action) {
        return Ok(());
    }
    let who = role.map_or("anonymous visitors", |r| match r {
        Role::Artist => "artists",
        Role::Visiteur => "visitors",
    });
    Err(Error::forbidden(format!("{} cannot {}", who, action.describe())))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn artists_manage_listings_but_do_not_comment() {
        let artist = Some(Role::Artist);
        assert!(permits(artist, Action::ManageEvents));
        assert!(permits(artist, Action::ManageReservations));
        assert!(!permits(artist, Action::Comment));
        assert!(!permits(artist, Action::Reserve));
        assert!(!permits(artist, Action::Rate));
    }

    #[test]
    fn visitors_comment_and_reserve_only() {
        let visitor = Some(Role::Visiteur);
        assert!(permits(visitor, Action::Comment));
        assert!(permits(visitor, Action::Reserve));
        assert!(permits(visitor, Action::Rate));
        assert!(!permits(visitor, Action::ManageEvents));
        assert!(!permits(visitor, Action::AnalyzeColors));
    }

    #[test]
    fn anonymous_can_only_rate() {
        assert!(permits(None, Action::Rate));
        assert!(!permits(None, Action::Comment));
        let err = ensure(None, Action::Reserve).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Forbidden: anonymous visitors cannot reserve artworks"
        );
    }

    #[test]
    fn role_serializes_as_backend_category() {
        assert_eq!(serde_json::to_string(&Role::Visiteur).unwrap(), "\"Visiteur\"");
        assert_eq!("artist".parse::<Role>().unwrap(), Role::Artist);
    }
}
