//! User model and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use crate::error::AppError;

/// Permissions a user can be granted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Permission {
    /// Staff permission: renew loans, see all loans, edit the catalog
    CanMarkReturned,
}

impl Permission {
    pub fn as_str(&self) -> &'static str {
        match self {
            Permission::CanMarkReturned => "can_mark_returned",
        }
    }
}

impl std::fmt::Display for Permission {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Full user model from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct User {
    pub id: i32,
    pub username: String,
    /// Hashed password (argon2)
    #[serde(skip_serializing)]
    pub password: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub is_active: bool,
    pub can_mark_returned: bool,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn permissions(&self) -> Vec<Permission> {
        let mut permissions = Vec::new();
        if self.can_mark_returned {
            permissions.push(Permission::CanMarkReturned);
        }
        permissions
    }
}

/// Create user request (staff-only `POST /users` and the bootstrap account)
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateUser {
    #[validate(length(min = 1, max = 150, message = "Username must be 1-150 characters"))]
    pub username: String,
    #[validate(length(min = 4, message = "Password must be at least 4 characters"))]
    pub password: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,
    #[serde(default)]
    pub can_mark_returned: bool,
}

/// JWT Claims for authenticated users
///
/// `permissions` is a snapshot of the user's flags taken at login. Requests are
/// authorized from the token alone, so revoking `can_mark_returned` or
/// deactivating the account only takes effect once the user logs in again or
/// the token reaches `exp` (`auth.jwt_expiration_hours`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserClaims {
    pub sub: String,
    pub user_id: i32,
    #[serde(default)]
    pub permissions: Vec<Permission>,
    pub exp: i64,
    pub iat: i64,
}

impl UserClaims {
    /// Create a new JWT token
    pub fn create_token(&self, secret: &str) -> Result<String, jsonwebtoken::errors::Error> {
        use jsonwebtoken::{encode, EncodingKey, Header};
        encode(
            &Header::default(),
            self,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
    }

    /// Parse JWT token
    pub fn from_token(token: &str, secret: &str) -> Result<Self, jsonwebtoken::errors::Error> {
        use jsonwebtoken::{decode, DecodingKey, Validation};
        let token_data = decode::<Self>(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &Validation::default(),
        )?;
        Ok(token_data.claims)
    }

    pub fn has_permission(&self, permission: Permission) -> bool {
        self.permissions.contains(&permission)
    }

    // Authorization checks
    pub fn require_permission(&self, permission: Permission) -> Result<(), AppError> {
        if self.has_permission(permission) {
            Ok(())
        } else {
            Err(AppError::Authorization(format!(
                "Missing permission: {}",
                permission
            )))
        }
    }

    /// Staff gate for loan management and catalog edits
    pub fn require_can_mark_returned(&self) -> Result<(), AppError> {
        self.require_permission(Permission::CanMarkReturned)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret";

    fn claims(permissions: Vec<Permission>) -> UserClaims {
        let now = Utc::now().timestamp();
        UserClaims {
            sub: "librarian".to_string(),
            user_id: 2,
            permissions,
            exp: now + 3600,
            iat: now,
        }
    }

    #[test]
    fn test_token_round_trip() {
        let token = claims(vec![Permission::CanMarkReturned])
            .create_token(SECRET)
            .unwrap();
        let decoded = UserClaims::from_token(&token, SECRET).unwrap();
        assert_eq!(decoded.sub, "librarian");
        assert_eq!(decoded.user_id, 2);
        assert!(decoded.has_permission(Permission::CanMarkReturned));
    }

    #[test]
    fn test_token_rejected_with_wrong_secret() {
        let token = claims(Vec::new()).create_token(SECRET).unwrap();
        assert!(UserClaims::from_token(&token, "other-secret").is_err());
    }

    #[test]
    fn test_expired_token_rejected() {
        let mut expired = claims(Vec::new());
        expired.iat -= 7200;
        expired.exp = expired.iat;
        let token = expired.create_token(SECRET).unwrap();
        assert!(UserClaims::from_token(&token, SECRET).is_err());
    }

    #[test]
    fn test_permission_gate() {
        assert!(claims(vec![Permission::CanMarkReturned])
            .require_can_mark_returned()
            .is_ok());

        let err = claims(Vec::new()).require_can_mark_returned().unwrap_err();
        assert!(matches!(err, AppError::Authorization(_)));
    }

    #[test]
    fn test_revoked_flag_applies_to_next_token_only() {
        let mut user = User {
            id: 3,
            username: "librarian".to_string(),
            password: None,
            first_name: None,
            last_name: None,
            email: None,
            is_active: true,
            can_mark_returned: true,
            created_at: Utc::now(),
        };
        let issued = claims(user.permissions()).create_token(SECRET).unwrap();

        user.can_mark_returned = false;
        user.is_active = false;

        let held = UserClaims::from_token(&issued, SECRET).unwrap();
        assert!(held.require_can_mark_returned().is_ok());

        let reissued = claims(user.permissions()).create_token(SECRET).unwrap();
        let fresh = UserClaims::from_token(&reissued, SECRET).unwrap();
        assert!(fresh.require_can_mark_returned().is_err());
    }

    #[test]
    fn test_permissions_from_flags() {
        let mut user = User {
            id: 1,
            username: "patron".to_string(),
            password: None,
            first_name: None,
            last_name: None,
            email: None,
            is_active: true,
            can_mark_returned: false,
            created_at: Utc::now(),
        };
        assert!(user.permissions().is_empty());

        user.can_mark_returned = true;
        assert_eq!(user.permissions(), vec![Permission::CanMarkReturned]);
    }
}
