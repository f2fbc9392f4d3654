//! Inspection of the JWT access tokens issued at login
//!
//! The signature is not checked here; the backend does that. The client
//! only reads `exp` to drop a stored token that can no longer work.

use chrono::{DateTime, TimeZone, Utc};
use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::Deserialize;

use crate::error::Result;

#[derive(Debug, Deserialize)]
struct Claims {
    #[serde(default)]
    exp: Option<i64>,
}

/// Expiry encoded in the token, if it is a JWT carrying `exp`
pub fn expires_at(token: &str) -> Result<Option<DateTime<Utc>>> {
    let mut validation = Validation::default();
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.validate_aud = false;
    validation.required_spec_claims.clear();

    let data = decode::<Claims>(token, &DecodingKey::from_secret(&[]), &validation)?;
    Ok(data
        .claims
        .exp
        .and_then(|exp| Utc.timestamp_opt(exp, 0).single()))
}

/// Opaque (non-JWT) tokens never count as expired
pub fn is_expired(token: &str, now: DateTime<Utc>) -> bool {
    match expires_at(token) {
        Ok(Some(exp)) => exp <= now,
        _ => false,
    }
}

#[cfg(test)]
pub(crate) fn mint(exp: i64) -> String {
    use jsonwebtoken::{encode, EncodingKey, Header};
    use serde_json::json;

    encode(
        &Header::default(),
        &json!({ "exp": exp, "user_id": 7, "token_type": "access" }),
        &EncodingKey::from_secret(b"test-secret"),
    )
    .unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn reads_expiry() {
        let exp = Utc::now().timestamp() + 3600;
        let token = mint(exp);
        assert_eq!(expires_at(&token).unwrap().unwrap().timestamp(), exp);
        assert!(!is_expired(&token, Utc::now()));
        assert!(is_expired(&token, Utc::now() + Duration::hours(2)));
    }

    #[test]
    fn opaque_tokens_are_not_expired() {
        assert!(expires_at("not-a-jwt").is_err());
        assert!(!is_expired("not-a-jwt", Utc::now()));
    }
}
