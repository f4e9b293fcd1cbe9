use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Session token payload: who signed in and until when.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserClaims {
    pub sub: Uuid,
    pub iat: i64,
    pub exp: i64,
}

impl UserClaims {
    pub fn for_user(user_id: Uuid, ttl_hours: i64) -> Self {
        let now = Utc::now();
        Self {
            sub: user_id,
            iat: now.timestamp(),
            exp: (now + Duration::hours(ttl_hours)).timestamp(),
        }
    }
}

pub fn generate_token<K: AsRef<[u8]>>(
    claims: &UserClaims,
    key: K,
) -> jsonwebtoken::errors::Result<String> {
    jsonwebtoken::encode(
        &Header::new(Algorithm::HS256),
        claims,
        &EncodingKey::from_secret(key.as_ref()),
    )
}

/// Verifies signature and expiry, returning the claims.
pub fn process_token<K: AsRef<[u8]>>(token: &str, key: K) -> jsonwebtoken::errors::Result<UserClaims> {
    let validation = Validation::new(Algorithm::HS256);
    let data = jsonwebtoken::decode::<UserClaims>(
        token,
        &DecodingKey::from_secret(key.as_ref()),
        &validation,
    )?;
    Ok(data.claims)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn token_keeps_subject() {
        let id = Uuid::new_v4();
        let token = generate_token(&UserClaims::for_user(id, 1), "secret").unwrap();
        let claims = process_token(&token, "secret").unwrap();
        assert_eq!(claims.sub, id);
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn wrong_key_is_rejected() {
        let token = generate_token(&UserClaims::for_user(Uuid::new_v4(), 1), "a").unwrap();
        assert!(process_token(&token, "b").is_err());
    }

    #[test]
    fn expired_token_is_rejected() {
        let token = generate_token(&UserClaims::for_user(Uuid::new_v4(), -2), "k").unwrap();
        assert!(process_token(&token, "k").is_err());
    }
}
