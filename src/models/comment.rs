use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Id;
use crate::roles::Role;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModerationStatus {
    Approved,
    #[default]
    Pending,
    Rejected,
    Flagged,
}

impl ModerationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Approved => "approved",
            Self::Pending => "pending",
            Self::Rejected => "rejected",
            Self::Flagged => "flagged",
        }
    }
}

impl fmt::Display for ModerationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ModerationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "approved" => Ok(Self::Approved),
            "pending" => Ok(Self::Pending),
            "rejected" => Ok(Self::Rejected),
            "flagged" => Ok(Self::Flagged),
            other => Err(format!("unknown moderation status: {}", other)),
        }
    }
}

/// The backend embeds either the artwork id or a short summary
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum ArtworkRef {
    Summary { id: Id, title: String },
    Id(Id),
}

impl ArtworkRef {
    pub fn id(&self) -> Id {
        match self {
            Self::Summary { id, .. } | Self::Id(id) => *id,
        }
    }

    pub fn title(&self) -> Option<&str> {
        match self {
            Self::Summary { title, .. } => Some(title),
            Self::Id(_) => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CommentAuthor {
    pub id: Id,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub category: Role,
}

impl CommentAuthor {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Comment {
    pub id: Id,
    pub artwork: ArtworkRef,
    pub user: CommentAuthor,
    pub content: String,
    #[serde(default)]
    pub moderation_status: ModerationStatus,
    #[serde(default)]
    pub moderation_reason: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Answer of the moderation pre-check
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ModerationVerdict {
    pub allowed: bool,
    #[serde(default)]
    pub reason: Option<String>,
}
