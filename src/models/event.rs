use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Id;

/// A single star rating left on an event
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Rating {
    #[serde(default)]
    pub id: Option<Id>,
    pub value: u8,
    #[serde(default)]
    pub comment: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Event {
    pub id: Id,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub capacity: u32,
    #[serde(default = "zero_price")]
    pub price: String,
    #[serde(default)]
    pub average_rating: f64,
    #[serde(default)]
    pub ratings: Vec<Rating>,
}

impl Event {
    /// Average rounded to whole stars, clamped to 0..=5
    pub fn stars(&self) -> u8 {
        self.average_rating.round().clamp(0.0, 5.0) as u8
    }
}

pub(crate) fn zero_price() -> String {
    "0.00".to_string()
}
