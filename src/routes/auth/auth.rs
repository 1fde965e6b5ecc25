use super::validate_user::validate_credentials;
use crate::auth_jwt::auth::create_jwt;
use crate::db::PgPool;
use crate::db_models::UserRole;
use crate::errors::custom::CustomError;
use crate::schema::users::dsl as user_dsl;
use crate::session_state::SystemClock;
use crate::validations::name_email::UserEmail;
use actix_web::{web, HttpResponse};
use argon2::{self, password_hash::SaltString, Argon2, PasswordHasher};
use diesel::prelude::*;
use rand::Rng;
use serde::Deserialize;
use serde_json::json;
use tracing::instrument;
use uuid::Uuid;

#[derive(Deserialize)]
pub struct RegisterBody {
    pub email: String,
    pub password: String,
    pub role: Option<UserRole>,
}

#[derive(Deserialize)]
pub struct LoginBody {
    pub email: String,
    pub password: String,
}

fn generate_random_salt() -> SaltString {
    let mut rng = rand::thread_rng();
    SaltString::generate(&mut rng)
}

/******************************************/
// Registering a user
/******************************************/
/**
 * @route   POST /api/auth/register
 * @access  Public
 */
#[instrument(name = "Register a new user", skip(req_user, pool), fields(email = %req_user.email))]
pub async fn register_user(
    pool: web::Data<PgPool>,
    req_user: web::Json<RegisterBody>,
) -> Result<HttpResponse, CustomError> {
    let pool = pool.clone();
    let user_data = req_user.into_inner();
    let user_password = user_data.password;
    let role = user_data.role.unwrap_or(UserRole::Vendor);
    let validated_email =
        UserEmail::parse(user_data.email).map_err(CustomError::ValidationError)?;
    let uuid = Uuid::new_v4();
    let registered_at = chrono::Local::now().naive_utc();

    // Hashing runs on the blocking pool alongside the insert.
    web::block(move || {
        let mut conn = pool.get().expect("Failed to get db connection from Pool");
        let argon2 = Argon2::default();

        let salt = generate_random_salt();
        let password_hashed = argon2
            .hash_password(user_password.as_bytes(), &salt)
            .map_err(|err| CustomError::HashingError(err.to_string()))?;

        diesel::insert_into(user_dsl::users)
            .values((
                user_dsl::id.eq(uuid),
                user_dsl::email.eq(validated_email.as_ref()),
                user_dsl::password_hash.eq(password_hashed.to_string()),
                user_dsl::role.eq(role),
                user_dsl::registered_at.eq(registered_at),
            ))
            .execute(&mut conn)
            .map_err(CustomError::from)?;

        Ok::<_, CustomError>(())
    })
    .await
    .map_err(|err| CustomError::BlockingError(err.to_string()))??;

    Ok(HttpResponse::Created().json(json!({
        "message": "User registered",
        "user": { "id": uuid, "role": role }
    })))
}

/******************************************/
// Login route
/******************************************/
/**
 * @route   POST /api/auth/login
 * @access  Public
 */
#[instrument(name = "Login a user", skip(req_login, pool), fields(email = %req_login.email))]
pub async fn login_user(
    pool: web::Data<PgPool>,
    req_login: web::Json<LoginBody>,
) -> Result<HttpResponse, CustomError> {
    let req_login = req_login.into_inner();
    let user_email = req_login.email.clone();
    let (user_id, role) = validate_credentials(&pool, req_login).await?;

    let token = create_jwt(&user_id.to_string(), role, &SystemClock)
        .map_err(CustomError::AuthenticationError)?;

    Ok(HttpResponse::Ok().json(json!({
        "token": token,
        "user": { "id": user_id, "email": user_email, "role": role }
    })))
}
