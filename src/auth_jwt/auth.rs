use crate::db_models::UserRole;
use crate::session_state::{ActivitySession, Clock};
use chrono::Duration;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::env;

const TOKEN_LIFETIME_HOURS: i64 = 1;

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Claims {
    pub sub: String,
    pub role: UserRole,
    pub exp: usize,
}

pub fn create_jwt(user_id: &str, role: UserRole, clock: &impl Clock) -> Result<String, String> {
    let session = ActivitySession::started(clock, Duration::hours(TOKEN_LIFETIME_HOURS));
    let claims = Claims {
        sub: user_id.to_string(),
        role,
        exp: session.expires_at().timestamp() as usize,
    };

    let secret = env::var("JWT_SECRET").map_err(|_| "Jwt secret not found".to_string())?;
    let encoding_key = EncodingKey::from_secret(secret.as_ref());
    encode(&Header::default(), &claims, &encoding_key).map_err(|err| err.to_string())
}

pub fn verify_jwt(token: &str, clock: &impl Clock) -> Result<Claims, String> {
    let secret = env::var("JWT_SECRET").map_err(|_| "Jwt secret not found".to_string())?;
    let decoding_key = DecodingKey::from_secret(secret.as_ref());
    let validation = Validation::default();
    let token_data =
        decode::<Claims>(token, &decoding_key, &validation).map_err(|err| err.to_string())?;

    let exp = token_data.claims.exp;
    if clock.now().timestamp() as usize > exp {
        return Err("Token expired".to_string());
    }
    Ok(token_data.claims)
}
