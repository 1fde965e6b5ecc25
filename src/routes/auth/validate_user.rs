use super::auth::LoginBody;
use crate::db::PgPool;
use crate::db_models::UserRole;
use crate::errors::custom::CustomError;
use crate::schema::users::dsl as user_dsl;
use actix_web::web;
use argon2::{self, Argon2, PasswordHash, PasswordVerifier};
use diesel::prelude::*;
use tracing::instrument;
use uuid::Uuid;

#[instrument(name = "Verify password", skip(expected_hash, candidate))]
fn verify_password(expected_hash: &str, candidate: &str) -> bool {
    let argon2 = Argon2::default();
    let password_hashed = match PasswordHash::new(expected_hash) {
        Ok(parsed) => parsed,
        Err(_) => return false,
    };

    argon2
        .verify_password(candidate.as_bytes(), &password_hashed)
        .is_ok()
}

#[instrument(name = "Validate credentials", skip(req_login, pool), fields(email = %req_login.email))]
pub async fn validate_credentials(
    pool: &PgPool,
    req_login: LoginBody,
) -> Result<(Uuid, UserRole), CustomError> {
    let pool = pool.clone();

    // Lookup and argon2 verification both stay off the async runtime.
    web::block(move || {
        let mut conn = pool.get().expect("Failed to get db connection from pool");

        let row: Option<(Uuid, String, UserRole)> = user_dsl::users
            .filter(user_dsl::email.eq(&req_login.email))
            .select((user_dsl::id, user_dsl::password_hash, user_dsl::role))
            .first(&mut conn)
            .optional()
            .map_err(CustomError::from)?;

        let (user_id, stored_password_hash, role) = row.ok_or_else(|| {
            CustomError::AuthenticationError("Invalid email or password".to_string())
        })?;

        if verify_password(&stored_password_hash, &req_login.password) {
            Ok((user_id, role))
        } else {
            Err(CustomError::AuthenticationError(
                "Invalid email or password".to_string(),
            ))
        }
    })
    .await
    .map_err(|err| CustomError::BlockingError(err.to_string()))?
}
