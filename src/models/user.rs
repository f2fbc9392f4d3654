use serde::{Deserialize, Serialize};

use super::Id;
use crate::roles::Role;

/// Profile returned by `/api/login/` and `/api/myprofile/`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    pub id: Id,
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub category: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_picture: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artistic_nickname: Option<String>,
}

impl User {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }

    /// Two-letter avatar fallback
    pub fn initials(&self) -> String {
        self.first_name
            .chars()
            .take(1)
            .chain(self.last_name.chars().take(1))
            .collect::<String>()
            .to_uppercase()
    }

    pub fn display_name(&self) -> String {
        match &self.artistic_nickname {
            Some(nickname) if !nickname.trim().is_empty() => nickname.clone(),
            _ => self.full_name(),
        }
    }
}

/// Token pair issued at login
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TokenPair {
    pub access: String,
    #[serde(default)]
    pub refresh: Option<String>,
}

/// Body of a successful `/api/login/` call
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: TokenPair,
    pub user: User,
}
