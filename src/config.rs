//! Configuration options for the ArtFusion client

use std::path::PathBuf;
use std::time::Duration;

use crate::error::{Error, Result};

/// Backend address used when nothing else is configured
pub const DEFAULT_API_URL: &str = "http://127.0.0.1:8000";

/// Configuration options for the ArtFusion client
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// Backend base address (scheme, host, port)
    pub api_url: String,

    /// Whether the session survives the process (file-backed storage)
    pub persist_session: bool,

    /// Where the session is persisted; defaults to the user config directory
    pub session_file: Option<PathBuf>,

    /// The request timeout
    pub request_timeout: Option<Duration>,

    /// Value of the `X-Client-Info` header
    pub client_info: String,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            persist_session: true,
            session_file: None,
            request_timeout: Some(Duration::from_secs(30)),
            client_info: format!("artfusion-rust/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl ClientOptions {
    /// Reads `ARTFUSION_API_URL`, `ARTFUSION_SESSION_FILE` and
    /// `ARTFUSION_TIMEOUT_SECS`, after loading a `.env` file if one exists.
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();
        let mut options = Self::default();

        if let Ok(url) = std::env::var("ARTFUSION_API_URL") {
            options = options.with_api_url(&url);
        }
        if let Ok(path) = std::env::var("ARTFUSION_SESSION_FILE") {
            options = options.with_session_file(PathBuf::from(path));
        }
        if let Ok(secs) = std::env::var("ARTFUSION_TIMEOUT_SECS") {
            let secs: u64 = secs.trim().parse().map_err(|_| {
                Error::config(format!("ARTFUSION_TIMEOUT_SECS is not a number: {}", secs))
            })?;
            options = options.with_request_timeout((secs > 0).then(|| Duration::from_secs(secs)));
        }

        Ok(options)
    }

    /// Set the backend base address
    pub fn with_api_url(mut self, value: &str) -> Self {
        self.api_url = value.trim_end_matches('/').to_string();
        self
    }

    /// Set whether to persist the session
    pub fn with_persist_session(mut self, value: bool) -> Self {
        self.persist_session = value;
        self
    }

    /// Set the session file location
    pub fn with_session_file(mut self, value: PathBuf) -> Self {
        self.session_file = Some(value);
        self
    }

    /// Set the request timeout
    pub fn with_request_timeout(mut self, value: Option<Duration>) -> Self {
        self.request_timeout = value;
        self
    }

    /// Session file to use when persisting, falling back to the config directory
    pub fn resolved_session_file(&self) -> Result<PathBuf> {
        if let Some(path) = &self.session_file {
            return Ok(path.clone());
        }
        dirs::config_dir()
            .map(|dir| dir.join("artfusion").join("session.json"))
            .ok_or_else(|| Error::config("no config directory available for the session file"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_trims_trailing_slash() {
        let options = ClientOptions::default().with_api_url("http://localhost:8000/");
        assert_eq!(options.api_url, "http://localhost:8000");
    }

    #[test]
    fn explicit_session_file_wins() {
        let options = ClientOptions::default().with_session_file(PathBuf::from("/tmp/s.json"));
        assert_eq!(
            options.resolved_session_file().unwrap(),
            PathBuf::from("/tmp/s.json")
        );
    }

    #[test]
    fn defaults() {
        let options = ClientOptions::default();
        assert_eq!(options.api_url, DEFAULT_API_URL);
        assert!(options.persist_session);
        assert_eq!(options.request_timeout, Some(Duration::from_secs(30)));
        assert!(options.client_info.starts_with("artfusion-rust/"));
    }
}
