//! List refresh coordination
//!
//! [`ListStore`] owns one collection and knows how to refetch it;
//! [`InvalidationBus`] tells stores when their collection went stale.

mod invalidation;
mod list;

pub use invalidation::{Collection, InvalidationBus, Mutation};
pub use list::{ListStore, LoadPhase, Loader, RefreshOutcome};
