use reqwest::multipart::Form;
use serde::{Serialize, Serializer};

use super::ImageUpload;
use crate::error::Result;
use crate::roles::Role;
use crate::validation::{self, FieldErrors, Validate};

/// Length of the numeric password-reset code sent by email
pub const RESET_TOKEN_LEN: usize = 8;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LoginCredentials {
    pub email: String,
    pub password: String,
}

impl LoginCredentials {
    pub fn new(email: &str, password: &str) -> Self {
        Self {
            email: email.trim().to_string(),
            password: password.to_string(),
        }
    }
}

impl Validate for LoginCredentials {
    fn validate(&self) -> Result<()> {
        let mut errors = FieldErrors::new();
        validation::email(&mut errors, "email", &self.email);
        validation::require(&mut errors, "password", &self.password);
        errors.into_result()
    }
}

/// Account creation form
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SignupDraft {
    pub email: String,
    pub password: String,
    #[serde(skip)]
    pub confirm_password: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub category: Role,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub artistic_nickname: Option<String>,
}

impl Validate for SignupDraft {
    fn validate(&self) -> Result<()> {
        let mut errors = FieldErrors::new();
        validation::email(&mut errors, "email", &self.email);
        validation::require(&mut errors, "first_name", &self.first_name);
        validation::require(&mut errors, "last_name", &self.last_name);
        validation::min_length(&mut errors, "password", &self.password, 6);
        if self.password != self.confirm_password {
            errors.add("confirm_password", "Passwords do not match.");
        }
        errors.into_result()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PasswordResetRequest {
    #[serde(serialize_with = "trimmed")]
    pub email: String,
}

impl Validate for PasswordResetRequest {
    fn validate(&self) -> Result<()> {
        let mut errors = FieldErrors::new();
        validation::email(&mut errors, "email", &self.email);
        errors.into_result()
    }
}

/// Second step of the reset: the emailed code and the new password
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PasswordResetConfirm {
    #[serde(serialize_with = "trimmed")]
    pub token: String,
    pub new_password: String,
    #[serde(skip)]
    pub confirm_password: String,
}

impl Validate for PasswordResetConfirm {
    fn validate(&self) -> Result<()> {
        let mut errors = FieldErrors::new();
        let token = self.token.trim();
        if token.len() != RESET_TOKEN_LEN || !token.chars().all(|c| c.is_ascii_digit()) {
            errors.add("token", "The code must contain 8 digits.");
        }
        if self.new_password.chars().count() < 8 {
            errors.add("new_password", "Password must be at least 8 characters.");
        }
        if self.new_password != self.confirm_password {
            errors.add("confirm_password", "Passwords do not match.");
        }
        errors.into_result()
    }
}

/// Codes and addresses are often pasted with stray whitespace
fn trimmed<S: Serializer>(value: &str, serializer: S) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_str(value.trim())
}

/// Partial profile update sent to `PATCH /api/myprofile/`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileUpdate {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub artistic_nickname: Option<String>,
    pub profile_picture: Option<ImageUpload>,
}

impl ProfileUpdate {
    pub fn is_empty(&self) -> bool {
        self.first_name.is_none()
            && self.last_name.is_none()
            && self.phone.is_none()
            && self.artistic_nickname.is_none()
            && self.profile_picture.is_none()
    }

    pub(crate) fn to_form(&self) -> Result<Form> {
        let mut form = Form::new();
        let texts = [
            ("first_name", &self.first_name),
            ("last_name", &self.last_name),
            ("phone", &self.phone),
            ("artistic_nickname", &self.artistic_nickname),
        ];
        for (name, value) in texts {
            if let Some(value) = value {
                form = form.text(name, value.trim().to_string());
            }
        }
        if let Some(picture) = &self.profile_picture {
            form = form.part("profile_picture", picture.to_part()?);
        }
        Ok(form)
    }
}

impl Validate for ProfileUpdate {
    fn validate(&self) -> Result<()> {
        let mut errors = FieldErrors::new();
        if self.is_empty() {
            errors.add("non_field_errors", "Nothing to update.");
        }
        if let Some(first_name) = &self.first_name {
            validation::require(&mut errors, "first_name", first_name);
        }
        if let Some(last_name) = &self.last_name {
            validation::require(&mut errors, "last_name", last_name);
        }
        if let Some(picture) = &self.profile_picture {
            picture.check(&mut errors, "profile_picture");
        }
        errors.into_result()
    }
}
