use std::sync::Arc;

use serde_json::Value;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use crate::config::HashConfig;
use crate::storage::{NoteStore, StoreError, UserStore};
use crate::users::{
    dto::{CreateUserRequest, DeleteUserRequest, UpdateUserRequest, UserSummary},
    errors::AccountError,
    password::hash_password_blocking,
    repo_types::{DeletedUser, NewUser, User},
};

const ALL_FIELDS_REQUIRED: &str = "All fields are required";
const DUPLICATE_USERNAME: &str = "Duplicate username";
const USER_NOT_FOUND: &str = "User not found";
const HAS_NOTES: &str = "User has assigned notes";
const INVALID_USER_DATA: &str = "Invalid user data received";

/// Roles as they arrive in a request body.
#[derive(Debug, PartialEq)]
enum RolesInput {
    /// Absent, `null`, an empty array or not an array at all.
    Missing,
    List(Vec<String>),
    /// A non-empty array holding something other than strings.
    Malformed,
}

fn parse_roles(value: Option<&Value>) -> RolesInput {
    match value {
        Some(Value::Array(items)) if !items.is_empty() => items
            .iter()
            .map(|v| v.as_str().map(str::to_owned))
            .collect::<Option<Vec<_>>>()
            .map_or(RolesInput::Malformed, RolesInput::List),
        _ => RolesInput::Missing,
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

/// Create, list, update and delete user accounts.
///
/// Holds no state of its own beyond the store handles; every call runs its
/// steps in order against the stores.
///
/// Username uniqueness is checked with a lookup before each write. The lookup
/// and the write are separate round-trips, so the stores also enforce
/// uniqueness themselves and a violation reported at write time becomes a
/// `Conflict` as well.
#[derive(Clone)]
pub struct AccountManager {
    users: Arc<dyn UserStore>,
    notes: Arc<dyn NoteStore>,
    default_role: String,
    hash: HashConfig,
}

impl AccountManager {
    pub fn new(
        users: Arc<dyn UserStore>,
        notes: Arc<dyn NoteStore>,
        default_role: impl Into<String>,
        hash: HashConfig,
    ) -> Self {
        Self {
            users,
            notes,
            default_role: default_role.into(),
            hash,
        }
    }

    /// All accounts without credentials. An empty store is `NotFound`.
    #[instrument(skip(self))]
    pub async fn list_accounts(&self) -> Result<Vec<UserSummary>, AccountError> {
        let users = self.users.find_all().await?;
        if users.is_empty() {
            warn!("no users found");
            return Err(AccountError::not_found("No users found"));
        }
        Ok(users.into_iter().map(UserSummary::from).collect())
    }

    #[instrument(skip(self, req), fields(username = ?req.username))]
    pub async fn create_account(&self, req: CreateUserRequest) -> Result<String, AccountError> {
        let (Some(username), Some(password)) = (non_empty(req.username), non_empty(req.password))
        else {
            warn!("create user: missing username or password");
            return Err(AccountError::invalid(ALL_FIELDS_REQUIRED));
        };

        if self.users.find_by_username(&username).await?.is_some() {
            warn!(%username, "duplicate username");
            return Err(AccountError::conflict(DUPLICATE_USERNAME));
        }

        let roles = match parse_roles(req.roles.as_ref()) {
            RolesInput::List(roles) => roles,
            RolesInput::Missing => vec![self.default_role.clone()],
            RolesInput::Malformed => {
                warn!(%username, "create user: roles must be strings");
                return Err(AccountError::invalid(INVALID_USER_DATA));
            }
        };

        let password_hash = hash_password_blocking(password, self.hash.clone()).await?;

        let new_user = NewUser {
            username,
            password_hash,
            roles,
            active: true,
        };
        match self.users.create(new_user).await {
            Ok(user) => {
                info!(user_id = %user.id, username = %user.username, "user created");
                Ok(format!("New user {} created", user.username))
            }
            Err(StoreError::UniqueViolation) => {
                warn!("duplicate username rejected by store");
                Err(AccountError::conflict(DUPLICATE_USERNAME))
            }
            Err(e) => {
                error!(error = %e, "create user failed");
                Err(AccountError::invalid(INVALID_USER_DATA))
            }
        }
    }

    /// Replace username, roles and active flag; rehash only when a new
    /// password is supplied. Returns the confirmation message.
    #[instrument(skip(self, req), fields(id = ?req.id))]
    pub async fn update_account(&self, req: UpdateUserRequest) -> Result<String, AccountError> {
        let UpdateUserRequest {
            id,
            username,
            roles,
            active,
            password,
        } = req;

        let (Some(id), Some(username), RolesInput::List(roles), Some(active)) = (
            non_empty(id),
            non_empty(username),
            parse_roles(roles.as_ref()),
            active.as_ref().and_then(Value::as_bool),
        ) else {
            warn!("update user: invalid payload");
            return Err(AccountError::invalid(ALL_FIELDS_REQUIRED));
        };

        let mut user = self.find_user(&id).await?.ok_or_else(|| {
            warn!(%id, "update user: not found");
            AccountError::not_found(USER_NOT_FOUND)
        })?;

        if let Some(existing) = self.users.find_by_username(&username).await? {
            if existing.id != user.id {
                warn!(%username, owner = %existing.id, "duplicate username");
                return Err(AccountError::conflict(DUPLICATE_USERNAME));
            }
        }

        user.username = username;
        user.roles = roles;
        user.active = active;

        if let Some(password) = non_empty(password) {
            user.password_hash = hash_password_blocking(password, self.hash.clone()).await?;
        }

        // Single commit point; the assignments above only touch our copy.
        let updated = self.users.save(&user).await.map_err(|e| match e {
            StoreError::UniqueViolation => AccountError::conflict(DUPLICATE_USERNAME),
            StoreError::NotFound => AccountError::not_found(USER_NOT_FOUND),
            other => AccountError::Store(other),
        })?;

        info!(user_id = %updated.id, username = %updated.username, "user updated");
        Ok(format!("{} updated", updated.username))
    }

    /// Remove an account that owns no notes.
    ///
    /// Note ownership is checked before the account is looked up, so an id
    /// still referenced by a note is refused even when no account carries it.
    #[instrument(skip(self, req), fields(id = ?req.id))]
    pub async fn delete_account(&self, req: DeleteUserRequest) -> Result<DeletedUser, AccountError> {
        let Some(id) = non_empty(req.id) else {
            warn!("delete user: missing id");
            return Err(AccountError::invalid("User ID required"));
        };

        // A string that is not a UUID can neither own notes nor name a user.
        let uuid = Uuid::parse_str(&id).ok();

        if let Some(uuid) = uuid {
            if let Some(note) = self.notes.find_one_by_owner(uuid).await? {
                warn!(user_id = %uuid, note_id = %note.id, "user has assigned notes");
                return Err(AccountError::conflict(HAS_NOTES));
            }
        }

        let user = self.find_user(&id).await?.ok_or_else(|| {
            warn!(%id, "delete user: not found");
            AccountError::not_found(USER_NOT_FOUND)
        })?;

        let deleted = self.users.delete(&user).await.map_err(|e| match e {
            StoreError::ForeignKeyViolation => AccountError::conflict(HAS_NOTES),
            StoreError::NotFound => AccountError::not_found(USER_NOT_FOUND),
            other => AccountError::Store(other),
        })?;

        info!(user_id = %deleted.id, username = %deleted.username, "user deleted");
        Ok(deleted)
    }

    async fn find_user(&self, id: &str) -> Result<Option<User>, AccountError> {
        match Uuid::parse_str(id) {
            Ok(uuid) => Ok(self.users.find_by_id(uuid).await?),
            Err(_) => Ok(None),
        }
    }
}
