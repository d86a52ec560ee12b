use anyhow::{Context, Result};
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use atelier_common::models::auth::Claims;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation};
use uuid::Uuid;

/// User session tokens live for 7 days
const USER_TOKEN_TTL_SECS: i64 = 7 * 24 * 60 * 60;
/// Admin tokens are shorter-lived: 24 hours
const ADMIN_TOKEN_TTL_SECS: i64 = 24 * 60 * 60;

/// Hash a password using argon2id
pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("Failed to hash password: {}", e))?;
    Ok(hash.to_string())
}

/// Verify a password against a hash
pub fn verify_password(password: &str, hash: &str) -> Result<bool> {
    let parsed_hash =
        PasswordHash::new(hash).map_err(|e| anyhow::anyhow!("Invalid password hash: {}", e))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

/// Create a session token (JWT) for a registered user
pub fn create_user_token(user_id: Uuid, email: &str, jwt_secret: &str) -> Result<String> {
    let now = chrono::Utc::now().timestamp();
    let claims = Claims {
        sub: user_id.to_string(),
        email: Some(email.to_string()),
        role: None,
        iat: now,
        exp: now + USER_TOKEN_TTL_SECS,
    };
    encode_claims(&claims, jwt_secret)
}

/// Create an elevated token carrying the admin role claim. `sub` is the
/// configured admin username; there is no user record behind it.
pub fn create_admin_token(username: &str, jwt_secret: &str) -> Result<String> {
    let now = chrono::Utc::now().timestamp();
    let claims = Claims {
        sub: username.to_string(),
        email: None,
        role: Some("admin".to_string()),
        iat: now,
        exp: now + ADMIN_TOKEN_TTL_SECS,
    };
    encode_claims(&claims, jwt_secret)
}

fn encode_claims(claims: &Claims, jwt_secret: &str) -> Result<String> {
    jsonwebtoken::encode(
        &Header::default(),
        claims,
        &EncodingKey::from_secret(jwt_secret.as_bytes()),
    )
    .context("Failed to create token")
}

/// Validate a token's signature and expiry and return its claims.
/// Expiry is the only invalidation mechanism; there is no revocation list.
pub fn validate_token(token: &str, jwt_secret: &str) -> Result<Claims> {
    let token_data = jsonwebtoken::decode::<Claims>(
        token,
        &DecodingKey::from_secret(jwt_secret.as_bytes()),
        &Validation::default(),
    )
    .context("Invalid token")?;
    Ok(token_data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_hash_and_verify_correct() {
        let password = "my-secure-password";
        let hash = hash_password(password).unwrap();
        assert!(verify_password(password, &hash).unwrap());
    }

    #[test]
    fn test_password_verify_wrong() {
        let hash = hash_password("correct-password").unwrap();
        assert!(!verify_password("wrong-password", &hash).unwrap());
    }

    #[test]
    fn test_password_different_salts() {
        let password = "same-password";
        let hash1 = hash_password(password).unwrap();
        let hash2 = hash_password(password).unwrap();
        assert_ne!(hash1, hash2);
        // Both still verify
        assert!(verify_password(password, &hash1).unwrap());
        assert!(verify_password(password, &hash2).unwrap());
    }

    #[test]
    fn test_hash_never_contains_plaintext() {
        let hash = hash_password("hunter2hunter2").unwrap();
        assert!(!hash.contains("hunter2"));
    }

    #[test]
    fn test_user_token_roundtrip() {
        let secret = "test-jwt-secret";
        let user_id = Uuid::new_v4();
        let token = create_user_token(user_id, "test@example.com", secret).unwrap();
        let claims = validate_token(&token, secret).unwrap();
        assert_eq!(claims.sub, user_id.to_string());
        assert_eq!(claims.email.as_deref(), Some("test@example.com"));
        assert!(claims.role.is_none());
        assert!(!claims.is_admin());
        assert_eq!(claims.exp - claims.iat, USER_TOKEN_TTL_SECS);
    }

    #[test]
    fn test_admin_token_roundtrip() {
        let secret = "test-jwt-secret";
        let token = create_admin_token("root", secret).unwrap();
        let claims = validate_token(&token, secret).unwrap();
        assert_eq!(claims.sub, "root");
        assert!(claims.email.is_none());
        assert!(claims.is_admin());
        assert_eq!(claims.exp - claims.iat, ADMIN_TOKEN_TTL_SECS);
    }

    #[test]
    fn test_wrong_secret_fails() {
        let token = create_user_token(Uuid::new_v4(), "a@b.com", "secret-1").unwrap();
        assert!(validate_token(&token, "secret-2").is_err());
    }

    #[test]
    fn test_garbage_token_fails() {
        assert!(validate_token("not-a-jwt", "secret").is_err());
    }
}
