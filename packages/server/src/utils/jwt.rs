use anyhow::{Context, Result};
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::config::AuthConfig;

/// JWT Claims structure.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // Email
    pub uid: i32,    // User ID
    pub admin: bool,
    pub exp: usize, // Expiration timestamp
}

/// Sign a new JWT token for a user.
pub fn sign(config: &AuthConfig, user_id: i32, email: &str, is_admin: bool) -> Result<String> {
    let expiration = Utc::now()
        .checked_add_signed(Duration::days(config.token_ttl_days))
        .context("token expiry out of range")?
        .timestamp();

    let claims = Claims {
        sub: email.to_owned(),
        uid: user_id,
        admin: is_admin,
        exp: expiration as usize,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.jwt_secret.as_bytes()),
    )?;

    Ok(token)
}

/// Verify and decode a JWT token.
pub fn verify(config: &AuthConfig, token: &str) -> Result<Claims> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.jwt_secret.as_bytes()),
        &Validation::default(),
    )?;
    Ok(token_data.claims)
}
