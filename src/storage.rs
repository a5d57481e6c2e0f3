use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::notes::repo_types::Note;
use crate::users::repo_types::{DeletedUser, NewUser, User};

/// Failures reported by a store backend.
///
/// Constraint violations are kept apart from other backend failures so the
/// account manager can translate them into domain conflicts.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("unique constraint violated")]
    UniqueViolation,
    #[error("record is still referenced")]
    ForeignKeyViolation,
    #[error("record not found")]
    NotFound,
    #[error(transparent)]
    Backend(#[from] anyhow::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db) = &err {
            if db.is_unique_violation() {
                return Self::UniqueViolation;
            }
            if db.is_foreign_key_violation() {
                return Self::ForeignKeyViolation;
            }
        }
        if matches!(err, sqlx::Error::RowNotFound) {
            return Self::NotFound;
        }
        Self::Backend(err.into())
    }
}

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_all(&self) -> Result<Vec<User>, StoreError>;
    /// Case-insensitive lookup.
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError>;
    async fn create(&self, user: NewUser) -> Result<User, StoreError>;
    async fn save(&self, user: &User) -> Result<User, StoreError>;
    async fn delete(&self, user: &User) -> Result<DeletedUser, StoreError>;
}

#[async_trait]
pub trait NoteStore: Send + Sync {
    async fn find_one_by_owner(&self, user_id: Uuid) -> Result<Option<Note>, StoreError>;
}
