use crate::auth_jwt::auth::verify_jwt;
use crate::db::PgPool;
use crate::db_models::UserRole;
use crate::errors::custom::CustomError;
use crate::schema::users::dsl as user_dsl;
use crate::session_state::SystemClock;
use actix_web::body::MessageBody;
use actix_web::dev::{ServiceRequest, ServiceResponse};
use actix_web::{web, HttpMessage};
use actix_web_lab::middleware::Next;
use diesel::prelude::*;
use uuid::Uuid;

/// The verified identity a handler receives once the bearer token has been
/// checked, extractable with `web::ReqData<AuthenticatedUser>`.
#[derive(Debug, Clone, Copy)]
pub struct AuthenticatedUser {
    pub user_id: Uuid,
    pub role: UserRole,
}

/******************************************/
// Bearer token middleware
/******************************************/
pub async fn jwt_auth_middleware(
    req: ServiceRequest,
    next: Next<impl MessageBody>,
) -> Result<ServiceResponse<impl MessageBody>, actix_web::Error> {
    let token = req
        .headers()
        .get("Authorization")
        .and_then(|header| header.to_str().ok())
        .and_then(|header| header.strip_prefix("Bearer "))
        .ok_or_else(|| CustomError::AuthenticationError("No token provided".to_string()))?
        .to_string();

    let claims =
        verify_jwt(&token, &SystemClock).map_err(CustomError::AuthenticationError)?;

    let user_id = Uuid::parse_str(&claims.sub)
        .map_err(|_| CustomError::AuthenticationError("Invalid token structure".to_string()))?;

    // The token may outlive its user row, so existence gets re-checked here.
    let pool = req
        .app_data::<web::Data<PgPool>>()
        .expect("PgPool missing from app data")
        .clone();
    let known_user = web::block(move || {
        let mut conn = pool.get().expect("Failed to get db connection from Pool");
        user_dsl::users
            .find(user_id)
            .select(user_dsl::id)
            .first::<Uuid>(&mut conn)
            .optional()
            .map_err(CustomError::from)
    })
    .await
    .map_err(|err| CustomError::BlockingError(err.to_string()))??;

    if known_user.is_none() {
        return Err(CustomError::AuthenticationError("User not found".to_string()).into());
    }

    req.extensions_mut().insert(AuthenticatedUser {
        user_id,
        role: claims.role,
    });
    next.call(req).await
}
