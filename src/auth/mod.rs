//! Account operations: login, signup, profile, password reset

use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info};

use crate::api::Gateway;
use crate::error::{Error, Result};
use crate::forms::{
    LoginCredentials, PasswordResetConfirm, PasswordResetRequest, ProfileUpdate, SignupDraft,
};
use crate::models::{LoginResponse, User};
use crate::session::{Session, SignOutReason};
use crate::validation::Validate;

/// Acknowledgement returned by the password reset endpoints
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct ResetAck {
    #[serde(default, alias = "detail")]
    pub message: Option<String>,
}

/// Client for account management
#[derive(Clone)]
pub struct Auth {
    gateway: Gateway,
}

impl Auth {
    pub(crate) fn new(gateway: Gateway) -> Self {
        Self { gateway }
    }

    /// Sign in with email and password; the session becomes authenticated
    pub async fn login(&self, credentials: &LoginCredentials) -> Result<User> {
        credentials.validate()?;
        let fetch = self.gateway.post("login").json(credentials)?;
        let response: LoginResponse = self.gateway.execute(fetch).await?;
        self.establish(response).await
    }

    /// Create an account
    ///
    /// When the backend answers with a token pair the new user is signed in
    /// right away; otherwise the caller should log in.
    pub async fn register(&self, draft: &SignupDraft) -> Result<Option<User>> {
        draft.validate()?;
        let fetch = self.gateway.post("register").json(draft)?;
        let body: Value = self.gateway.execute(fetch).await?;

        if let Ok(response) = serde_json::from_value::<LoginResponse>(body.clone()) {
            return self.establish(response).await.map(Some);
        }
        let user = body
            .get("user")
            .cloned()
            .or(Some(body))
            .and_then(|value| serde_json::from_value::<User>(value).ok());
        info!(email = %draft.email, "Account created");
        Ok(user)
    }

    /// Clear the session; nothing is sent to the backend
    pub async fn logout(&self) -> Result<()> {
        self.gateway.session().revert(SignOutReason::Logout).await
    }

    /// Current profile from `/api/myprofile/`
    ///
    /// Never attempted while anonymous. A 401 reverts the session.
    pub async fn fetch_profile(&self) -> Result<User> {
        self.gateway.require_login()?;
        let user: User = self.gateway.execute(self.gateway.get("myprofile")).await?;
        self.gateway.session().update_user(user.clone()).await?;
        Ok(user)
    }

    /// Partial profile update, multipart so a picture can ride along
    pub async fn update_profile(&self, update: &ProfileUpdate) -> Result<User> {
        self.gateway.require_login()?;
        update.validate()?;
        let fetch = self.gateway.patch("myprofile").multipart(update.to_form()?);
        let user: User = self.gateway.execute(fetch).await?;
        info!(id = user.id, "Profile updated");
        self.gateway.session().update_user(user.clone()).await?;
        Ok(user)
    }

    /// Ask for a reset code by email
    pub async fn forgot_password_request(&self, request: &PasswordResetRequest) -> Result<ResetAck> {
        request.validate()?;
        let fetch = self.gateway.post("forgot-password-request").json(request)?;
        let ack = self.gateway.execute(fetch).await?;
        debug!("Password reset requested");
        Ok(ack)
    }

    /// Set a new password with the emailed code
    pub async fn forgot_password_confirm(&self, confirm: &PasswordResetConfirm) -> Result<ResetAck> {
        confirm.validate()?;
        let fetch = self.gateway.post("forgot-password-confirm").json(confirm)?;
        let ack = self.gateway.execute(fetch).await?;
        info!("Password reset confirmed");
        Ok(ack)
    }

    pub fn current_user(&self) -> Option<User> {
        self.gateway.session().user()
    }

    async fn establish(&self, response: LoginResponse) -> Result<User> {
        if response.token.access.is_empty() {
            return Err(Error::unauthorized("login response carried no access token"));
        }
        let user = response.user;
        self.gateway
            .session()
            .establish(Session {
                access_token: response.token.access,
                refresh_token: response.token.refresh,
                user: Some(user.clone()),
            })
            .await?;
        info!(id = user.id, role = %user.category, "Logged in");
        Ok(user)
    }
}
