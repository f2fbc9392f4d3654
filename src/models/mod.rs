//! Records mirrored from backend responses

mod artwork;
mod comment;
mod event;
mod reservation;
mod user;
mod workshop;

pub use artwork::*;
pub use comment::*;
pub use event::*;
pub use reservation::*;
pub use user::*;
pub use workshop::*;

/// Backend primary keys
pub type Id = i64;
