use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::event::zero_price;
use super::Id;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Artwork {
    pub id: Id,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub quantity_available: u32,
    #[serde(default = "zero_price")]
    pub price: String,
    #[serde(default)]
    pub image: Option<String>,
    /// Filled in by the color analysis endpoint
    #[serde(default)]
    pub color_palette: Option<Vec<String>>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Artwork {
    pub fn is_available(&self) -> bool {
        self.quantity_available > 0
    }

    pub fn has_palette(&self) -> bool {
        self.color_palette
            .as_ref()
            .map_or(false, |palette| !palette.is_empty())
    }
}

/// Result of `POST /api/artworks/{id}/analyze/`
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ColorAnalysis {
    #[serde(alias = "colors")]
    pub color_palette: Vec<String>,
}
