use serde::{Deserialize, Serialize};
use serde_json::Value;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::users::repo_types::{DeletedUser, User};

/// Request body for `POST /users`.
///
/// `roles` stays loosely typed: anything but a non-empty array selects the
/// default role.
#[derive(Debug, Default, Deserialize)]
pub struct CreateUserRequest {
    pub username: Option<String>,
    pub password: Option<String>,
    pub roles: Option<Value>,
}

/// Request body for `PATCH /users`.
///
/// `roles` and `active` are checked by the manager so that every malformed
/// field produces the same error.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateUserRequest {
    pub id: Option<String>,
    pub username: Option<String>,
    pub roles: Option<Value>,
    pub active: Option<Value>,
    pub password: Option<String>,
}

/// Request body for `DELETE /users`.
#[derive(Debug, Default, Deserialize)]
pub struct DeleteUserRequest {
    pub id: Option<String>,
}

/// Public view of a user; the password hash is not part of it.
#[derive(Debug, Clone, Serialize)]
pub struct UserSummary {
    pub id: Uuid,
    pub username: String,
    pub roles: Vec<String>,
    pub active: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl From<User> for UserSummary {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            username: u.username,
            roles: u.roles,
            active: u.active,
            created_at: u.created_at,
            updated_at: u.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct DeletedUserResponse {
    pub message: String,
    pub id: Uuid,
    pub username: String,
}

impl From<DeletedUser> for DeletedUserResponse {
    fn from(d: DeletedUser) -> Self {
        Self {
            message: format!("Username {} with ID {} deleted", d.username, d.id),
            id: d.id,
            username: d.username,
        }
    }
}
