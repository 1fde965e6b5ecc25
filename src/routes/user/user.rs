use crate::authz::require_admin;
use crate::db::PgPool;
use crate::db_models::{User, UserRole};
use crate::errors::custom::CustomError;
use crate::middleware::AuthenticatedUser;
use crate::schema::users::dsl as user_dsl;
use crate::validations::name_email::{UserEmail, UserName};
use actix_web::{web, HttpResponse};
use argon2::{self, password_hash::SaltString, Argon2, PasswordHasher};
use diesel::prelude::*;
use rand::Rng;
use serde::Deserialize;
use serde_json::json;
use tracing::instrument;
use uuid::Uuid;

#[derive(Deserialize)]
pub struct UpdateProfileBody {
    pub company_name: Option<String>,
    pub contact_name: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub industry: Option<String>,
    pub website_url: Option<String>,
    pub company_description: Option<String>,
}

#[derive(Deserialize)]
pub struct CreateVendorBody {
    pub email: String,
    pub password: String,
    pub company_name: Option<String>,
    pub contact_name: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub industry: Option<String>,
}

#[derive(Deserialize)]
pub struct ResetPasswordBody {
    pub new_password: String,
}

fn generate_random_salt() -> SaltString {
    let mut rng = rand::thread_rng();
    SaltString::generate(&mut rng)
}

/******************************************/
// Viewing own profile
/******************************************/
/**
 * @route   GET /api/users/me
 * @access  JWT Protected
 */
#[instrument(name = "Get profile", skip(pool, user))]
pub async fn get_profile(
    pool: web::Data<PgPool>,
    user: web::ReqData<AuthenticatedUser>,
) -> Result<HttpResponse, CustomError> {
    let pool = pool.clone();
    let user_id = user.user_id;

    let profile = web::block(move || {
        let mut conn = pool.get().expect("Failed to get db connection from Pool");
        user_dsl::users
            .find(user_id)
            .select(User::as_select())
            .first::<User>(&mut conn)
            .optional()
            .map_err(CustomError::from)?
            .ok_or_else(|| CustomError::NotFound("user not found".to_string()))
    })
    .await
    .map_err(|err| CustomError::BlockingError(err.to_string()))??;

    Ok(HttpResponse::Ok().json(profile))
}

/******************************************/
// Updating own profile
/******************************************/
/**
 * @route   PUT /api/users/me
 * @access  JWT Protected
 */
#[instrument(name = "Update profile", skip(req_user, pool, user))]
pub async fn update_profile(
    pool: web::Data<PgPool>,
    req_user: web::Json<UpdateProfileBody>,
    user: web::ReqData<AuthenticatedUser>,
) -> Result<HttpResponse, CustomError> {
    let pool = pool.clone();
    let user_id = user.user_id;
    let body = req_user.into_inner();
    if let Some(ref contact_name) = body.contact_name {
        UserName::parse(contact_name.clone()).map_err(CustomError::ValidationError)?;
    }

    let profile = web::block(move || {
        let mut conn = pool.get().expect("Failed to get db connection from Pool");
        diesel::update(user_dsl::users.find(user_id))
            .set((
                user_dsl::company_name.eq(body.company_name),
                user_dsl::contact_name.eq(body.contact_name),
                user_dsl::phone.eq(body.phone),
                user_dsl::address.eq(body.address),
                user_dsl::industry.eq(body.industry),
                user_dsl::website_url.eq(body.website_url),
                user_dsl::company_description.eq(body.company_description),
            ))
            .returning(User::as_returning())
            .get_result::<User>(&mut conn)
            .map_err(CustomError::from)
    })
    .await
    .map_err(|err| CustomError::BlockingError(err.to_string()))??;

    Ok(HttpResponse::Ok().json(profile))
}

/******************************************/
// Admin listing of all vendors
/******************************************/
/**
 * @route   GET /api/users/vendors
 * @access  JWT Protected (admin)
 */
#[instrument(name = "List vendors", skip(pool, user))]
pub async fn list_vendors(
    pool: web::Data<PgPool>,
    user: web::ReqData<AuthenticatedUser>,
) -> Result<HttpResponse, CustomError> {
    require_admin(&user)?;
    let pool = pool.clone();

    let vendors = web::block(move || {
        let mut conn = pool.get().expect("Failed to get db connection from Pool");
        user_dsl::users
            .filter(user_dsl::role.eq(UserRole::Vendor))
            .order(user_dsl::registered_at.desc())
            .select(User::as_select())
            .load::<User>(&mut conn)
            .map_err(CustomError::from)
    })
    .await
    .map_err(|err| CustomError::BlockingError(err.to_string()))??;

    Ok(HttpResponse::Ok().json(vendors))
}

/******************************************/
// Admin vendor creation
/******************************************/
/**
 * @route   POST /api/users/vendors
 * @access  JWT Protected (admin)
 */
#[instrument(name = "Create vendor", skip(req_vendor, pool, user), fields(email = %req_vendor.email))]
pub async fn create_vendor(
    pool: web::Data<PgPool>,
    req_vendor: web::Json<CreateVendorBody>,
    user: web::ReqData<AuthenticatedUser>,
) -> Result<HttpResponse, CustomError> {
    require_admin(&user)?;
    let pool = pool.clone();
    let body = req_vendor.into_inner();
    let validated_email = UserEmail::parse(body.email).map_err(CustomError::ValidationError)?;
    let vendor_password = body.password;
    let uuid = Uuid::new_v4();
    let registered_at = chrono::Local::now().naive_utc();

    let vendor = web::block(move || {
        let mut conn = pool.get().expect("Failed to get db connection from Pool");
        let argon2 = Argon2::default();

        let salt = generate_random_salt();
        let password_hashed = argon2
            .hash_password(vendor_password.as_bytes(), &salt)
            .map_err(|err| CustomError::HashingError(err.to_string()))?;

        diesel::insert_into(user_dsl::users)
            .values((
                user_dsl::id.eq(uuid),
                user_dsl::email.eq(validated_email.as_ref()),
                user_dsl::password_hash.eq(password_hashed.to_string()),
                user_dsl::role.eq(UserRole::Vendor),
                user_dsl::company_name.eq(body.company_name),
                user_dsl::contact_name.eq(body.contact_name),
                user_dsl::phone.eq(body.phone),
                user_dsl::address.eq(body.address),
                user_dsl::industry.eq(body.industry),
                user_dsl::registered_at.eq(registered_at),
            ))
            .returning(User::as_returning())
            .get_result::<User>(&mut conn)
            .map_err(CustomError::from)
    })
    .await
    .map_err(|err| CustomError::BlockingError(err.to_string()))??;

    Ok(HttpResponse::Created().json(vendor))
}

/******************************************/
// Admin vendor deletion, scoped to the vendor role
/******************************************/
/**
 * @route   DELETE /api/users/vendors/{id}
 * @access  JWT Protected (admin)
 */
#[instrument(name = "Delete vendor", skip(pool, user))]
pub async fn delete_vendor(
    pool: web::Data<PgPool>,
    vendor_id: web::Path<Uuid>,
    user: web::ReqData<AuthenticatedUser>,
) -> Result<HttpResponse, CustomError> {
    require_admin(&user)?;
    let pool = pool.clone();
    let vendor_id = vendor_id.into_inner();

    let affected = web::block(move || {
        let mut conn = pool.get().expect("Failed to get db connection from Pool");
        diesel::delete(
            user_dsl::users
                .filter(user_dsl::id.eq(vendor_id))
                .filter(user_dsl::role.eq(UserRole::Vendor)),
        )
        .execute(&mut conn)
        .map_err(CustomError::from)
    })
    .await
    .map_err(|err| CustomError::BlockingError(err.to_string()))??;

    if affected == 0 {
        return Err(CustomError::NotFound(format!(
            "vendor {} not found",
            vendor_id
        )));
    }
    Ok(HttpResponse::Ok().json(json!({"message": "Vendor deleted successfully"})))
}

/******************************************/
// Admin password reset for a vendor
/******************************************/
/**
 * @route   PUT /api/users/vendors/{id}/password
 * @access  JWT Protected (admin)
 */
#[instrument(name = "Reset vendor password", skip(req_password, pool, user))]
pub async fn reset_vendor_password(
    pool: web::Data<PgPool>,
    vendor_id: web::Path<Uuid>,
    req_password: web::Json<ResetPasswordBody>,
    user: web::ReqData<AuthenticatedUser>,
) -> Result<HttpResponse, CustomError> {
    require_admin(&user)?;
    let pool = pool.clone();
    let vendor_id = vendor_id.into_inner();
    let new_password = req_password.into_inner().new_password;

    let affected = web::block(move || {
        let mut conn = pool.get().expect("Failed to get db connection from Pool");
        let argon2 = Argon2::default();

        let salt = generate_random_salt();
        let password_hashed = argon2
            .hash_password(new_password.as_bytes(), &salt)
            .map_err(|err| CustomError::HashingError(err.to_string()))?;

        diesel::update(
            user_dsl::users
                .filter(user_dsl::id.eq(vendor_id))
                .filter(user_dsl::role.eq(UserRole::Vendor)),
        )
        .set(user_dsl::password_hash.eq(password_hashed.to_string()))
        .execute(&mut conn)
        .map_err(CustomError::from)
    })
    .await
    .map_err(|err| CustomError::BlockingError(err.to_string()))??;

    if affected == 0 {
        return Err(CustomError::NotFound(format!(
            "vendor {} not found",
            vendor_id
        )));
    }
    Ok(HttpResponse::Ok().json(json!({"message": "Password updated successfully"})))
}
