use chrono::Utc;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// JWT claims issued by the external identity provider.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: stable user ID as a UUID string.
    pub sub: String,
    /// Display name resolved by the identity provider.
    pub name: String,
    /// Token type: always `"access"` for tokens this service accepts.
    pub token_type: String,
    /// Expiration time (Unix timestamp).
    pub exp: i64,
    /// Issued-at time (Unix timestamp).
    pub iat: i64,
    /// Unique JWT identifier.
    pub jti: String,
}

/// Issue an access token for the given user.
///
/// Token issuance belongs to the identity provider in production; this helper
/// exists for integration tests and local tooling that need a valid caller
/// identity.
///
/// # Errors
///
/// Returns an error if JWT encoding fails.
pub fn issue_access_token(
    user_id: Uuid,
    display_name: &str,
    secret: &str,
    expires_in_secs: i64,
) -> anyhow::Result<String> {
    let now = Utc::now();

    let claims = Claims {
        sub: user_id.to_string(),
        name: display_name.to_string(),
        token_type: "access".to_string(),
        exp: now.timestamp() + expires_in_secs,
        iat: now.timestamp(),
        jti: Uuid::new_v4().to_string(),
    };

    let key = EncodingKey::from_secret(secret.as_bytes());
    encode(&Header::default(), &claims, &key)
        .map_err(|e| anyhow::anyhow!("Failed to encode access token: {e}"))
}

/// Validate an access token and return its claims.
///
/// # Errors
///
/// Returns an error if the token is invalid, expired, or not an access token.
pub fn validate_access_token(token: &str, secret: &str) -> anyhow::Result<Claims> {
    let key = DecodingKey::from_secret(secret.as_bytes());
    let validation = Validation::default();

    let token_data = decode::<Claims>(token, &key, &validation)
        .map_err(|e| anyhow::anyhow!("Invalid access token: {e}"))?;

    if token_data.claims.token_type != "access" {
        return Err(anyhow::anyhow!("Token is not an access token"));
    }

    Ok(token_data.claims)
}
