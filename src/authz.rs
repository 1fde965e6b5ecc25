use crate::db_models::UserRole;
use crate::errors::custom::CustomError;
use crate::middleware::AuthenticatedUser;
use uuid::Uuid;

/// Capability check for admin-only operations (lifecycle transitions,
/// vendor management, global listings).
pub fn require_admin(user: &AuthenticatedUser) -> Result<(), CustomError> {
    if user.role == UserRole::Admin {
        Ok(())
    } else {
        Err(CustomError::Forbidden(
            "admin capability required".to_string(),
        ))
    }
}

/// Capability check for operations permitted to the admin role or the
/// resource owner.
pub fn require_owner_or_admin(
    user: &AuthenticatedUser,
    owner_id: Uuid,
) -> Result<(), CustomError> {
    if user.role == UserRole::Admin || user.user_id == owner_id {
        Ok(())
    } else {
        Err(CustomError::Forbidden(
            "caller does not own this resource".to_string(),
        ))
    }
}
