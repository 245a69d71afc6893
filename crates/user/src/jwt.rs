use anyhow::{Context, Result};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: String, // user_id
    pub email: String,
    pub exp: usize, // Expiration time (as UTC timestamp)
    pub iat: usize, // Issued at (as UTC timestamp)
}

/// Generate a JWT token for a user
/// Uses HS256 algorithm with secret from config
pub fn generate_jwt(
    user_id: String,
    email: String,
    secret: &str,
    expiration_days: i64,
) -> Result<String> {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .context("Failed to get current time")?
        .as_secs() as usize;

    let expiration = now + (expiration_days as usize) * 24 * 60 * 60;

    let claims = Claims {
        sub: user_id,
        email,
        exp: expiration,
        iat: now,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .context("Failed to encode JWT")?;

    Ok(token)
}

/// Validate and decode a JWT token
pub fn validate_jwt(token: &str, secret: &str) -> Result<Claims> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .context("Failed to decode JWT")?;

    Ok(token_data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_and_validate_jwt() {
        let user_id = "01JGQZ9V5X8F2M4N6P8R0T2V4X".to_string();
        let email = "test@example.com".to_string();
        let secret = "test_secret_key_minimum_32_characters_long";

        let token = generate_jwt(user_id.clone(), email.clone(), secret, 7).unwrap();

        let claims = validate_jwt(&token, secret).unwrap();

        assert_eq!(claims.sub, user_id);
        assert_eq!(claims.email, email);
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn test_invalid_secret_fails_validation() {
        let token = generate_jwt(
            "01JGQZ9V5X8F2M4N6P8R0T2V4X".to_string(),
            "test@example.com".to_string(),
            "test_secret_key_minimum_32_characters_long",
            7,
        )
        .unwrap();

        let result = validate_jwt(&token, "wrong_secret");
        assert!(result.is_err());
    }

    #[test]
    fn test_garbage_token_fails_validation() {
        let result = validate_jwt("not-a-jwt", "test_secret_key_minimum_32_characters_long");
        assert!(result.is_err());
    }
}
