use serde::Serialize;

use crate::error::Result;
use crate::models::Id;
use crate::validation::{self, FieldErrors, Validate};

/// Minimum trimmed length of a comment
pub const MIN_COMMENT_CHARS: usize = 3;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommentDraft {
    pub artwork: Option<Id>,
    pub content: String,
}

/// Body of `POST /api/comments/`
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct CommentPayload {
    pub artwork: Id,
    pub content: String,
}

impl CommentDraft {
    pub fn new(artwork: Id, content: &str) -> Self {
        Self {
            artwork: Some(artwork),
            content: content.to_string(),
        }
    }

    pub fn to_payload(&self) -> Result<CommentPayload> {
        self.validate()?;
        Ok(CommentPayload {
            artwork: self.artwork.unwrap_or_default(),
            content: self.content.trim().to_string(),
        })
    }
}

impl Validate for CommentDraft {
    fn validate(&self) -> Result<()> {
        let mut errors = FieldErrors::new();
        if self.artwork.map_or(true, |id| id <= 0) {
            errors.add("artwork", "Select an artwork.");
        }
        validation::min_length(&mut errors, "content", &self.content, MIN_COMMENT_CHARS);
        errors.into_result()
    }
}

/// Validates the content of a comment edit
pub(crate) fn validate_content(content: &str) -> Result<()> {
    let mut errors = FieldErrors::new();
    validation::min_length(&mut errors, "content", content, MIN_COMMENT_CHARS);
    errors.into_result()
}
