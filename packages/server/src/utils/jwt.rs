use anyhow::Result;
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

/// JWT Claims structure.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Usuario of the authenticated trabajador.
    pub sub: String,
    /// Trabajador ID.
    pub uid: i32,
    /// Expiration timestamp.
    pub exp: usize,
}

/// Token lifetime in days.
const TOKEN_DAYS: i64 = 7;

/// Sign a new JWT token for a trabajador.
pub fn sign(trabajador_id: i32, usuario: &str, secret: &str) -> Result<String> {
    let expiration = (Utc::now() + Duration::days(TOKEN_DAYS)).timestamp();

    let claims = Claims {
        sub: usuario.to_owned(),
        uid: trabajador_id,
        exp: expiration as usize,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;

    Ok(token)
}

/// Verify and decode a JWT token.
pub fn verify(token: &str, secret: &str) -> Result<Claims> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )?;
    Ok(token_data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sign_and_verify_round_trip() {
        let token = sign(7, "sysadmin_2024", "test_secret").unwrap();
        let claims = verify(&token, "test_secret").unwrap();
        assert_eq!(claims.uid, 7);
        assert_eq!(claims.sub, "sysadmin_2024");
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let token = sign(7, "sysadmin_2024", "test_secret").unwrap();
        assert!(verify(&token, "other_secret").is_err());
    }

    #[test]
    fn tampered_token_is_rejected() {
        let token = sign(7, "sysadmin_2024", "test_secret").unwrap();
        let tampered = format!("{token}x");
        assert!(verify(&tampered, "test_secret").is_err());
    }
}
