use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::Gateway;
use crate::error::{Error, ErrorKind, Result};
use crate::models::{ModerationVerdict, Workshop};
use crate::validation::{self, FieldErrors};

#[derive(Serialize)]
struct DescriptionRequest<'a> {
    title: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    keywords: Option<&'a str>,
}

#[derive(Deserialize)]
struct DescriptionResponse {
    #[serde(alias = "result")]
    description: String,
}

#[derive(Serialize)]
struct SummaryRequest<'a> {
    title: &'a str,
    description: &'a str,
    level: &'a str,
    duration: &'a str,
}

#[derive(Deserialize)]
struct SummaryResponse {
    #[serde(alias = "result")]
    summary: String,
}

#[derive(Serialize)]
struct NamesRequest<'a> {
    first_name: &'a str,
    last_name: &'a str,
}

#[derive(Deserialize)]
struct NamesResponse {
    #[serde(default)]
    suggestions: Vec<String>,
}

#[derive(Serialize)]
struct ContentRequest<'a> {
    content: &'a str,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    message: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    response: String,
}

/// Backend AI helpers: descriptions, summaries, nicknames, moderation, chat
#[derive(Clone)]
pub struct AiClient {
    gateway: Gateway,
}

impl AiClient {
    pub(crate) fn new(gateway: Gateway) -> Self {
        Self { gateway }
    }

    /// Draft a description for an artwork or event title
    pub async fn generate_description(&self, title: &str, keywords: &str) -> Result<String> {
        let mut errors = FieldErrors::new();
        validation::require(&mut errors, "title", title);
        errors.into_result()?;
        let fetch = self.gateway.post("ai/generate-description").json(&DescriptionRequest {
            title: title.trim(),
            keywords: Some(keywords.trim()).filter(|k| !k.is_empty()),
        })?;
        let response: DescriptionResponse = self.gateway.execute(fetch).await?;
        Ok(response.description)
    }

    /// Short pitch for a workshop listing
    pub async fn workshop_summary(&self, workshop: &Workshop) -> Result<String> {
        let fetch = self.gateway.post("ai/workshop-summary").json(&SummaryRequest {
            title: &workshop.title,
            description: &workshop.description,
            level: workshop.level.as_str(),
            duration: &workshop.duration,
        })?;
        let response: SummaryResponse = self.gateway.execute(fetch).await?;
        Ok(response.summary)
    }

    /// Artistic nickname ideas offered during signup
    pub async fn username_suggestions(&self, first_name: &str, last_name: &str) -> Result<Vec<String>> {
        let mut errors = FieldErrors::new();
        validation::require(&mut errors, "first_name", first_name);
        validation::require(&mut errors, "last_name", last_name);
        errors.into_result()?;
        let fetch = self
            .gateway
            .post("ai/generate-username-suggestions")
            .json(&NamesRequest {
                first_name: first_name.trim(),
                last_name: last_name.trim(),
            })?;
        let response: NamesResponse = self.gateway.execute(fetch).await?;
        Ok(response.suggestions)
    }

    /// Raw moderation verdict for a piece of text
    pub async fn moderate_comment(&self, content: &str) -> Result<ModerationVerdict> {
        let fetch = self
            .gateway
            .post("ai/moderate-comment")
            .json(&ContentRequest { content })?;
        self.gateway.execute(fetch).await
    }

    /// Moderation gate run before a comment is created or edited
    ///
    /// `Ok(Some(reason))` blocks the comment. A moderation service that is
    /// unreachable or failing on its side lets the comment through to the
    /// backend; any other failure, a rejected session included, is returned.
    pub(crate) async fn screen(&self, content: &str) -> Result<Option<String>> {
        match self.moderate_comment(content).await {
            Ok(verdict) if !verdict.allowed => Ok(Some(verdict.reason.unwrap_or_else(|| {
                "The comment contains inappropriate content.".to_string()
            }))),
            Ok(_) => {
                debug!("Comment passed moderation");
                Ok(None)
            }
            Err(e) if moderation_unavailable(&e) => {
                warn!(error = %e, "Moderation check unavailable, submitting anyway");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// One turn with the gallery assistant
    pub async fn chat(&self, message: &str) -> Result<String> {
        let mut errors = FieldErrors::new();
        validation::require(&mut errors, "message", message);
        errors.into_result()?;
        let fetch = self.gateway.post("chatbot").json(&ChatRequest {
            message: message.trim(),
        })?;
        let response: ChatResponse = self.gateway.execute(fetch).await?;
        Ok(response.response)
    }
}

fn moderation_unavailable(error: &Error) -> bool {
    match error {
        Error::Api { status, .. } => status.is_server_error(),
        e => e.kind() == ErrorKind::Network,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ApiErrors;
    use reqwest::StatusCode;

    #[test]
    fn only_outages_count_as_unavailable() {
        let outage = Error::Api {
            status: StatusCode::BAD_GATEWAY,
            errors: ApiErrors::default(),
        };
        let bad_request = Error::Api {
            status: StatusCode::BAD_REQUEST,
            errors: ApiErrors::default(),
        };
        assert!(moderation_unavailable(&outage));
        assert!(!moderation_unavailable(&bad_request));
        assert!(!moderation_unavailable(&Error::unauthorized("expired")));
        assert!(!moderation_unavailable(&Error::forbidden("no")));
    }
}
