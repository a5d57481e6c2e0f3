use async_trait::async_trait;
use time::OffsetDateTime;
use tokio::sync::RwLock;
use unicode_normalization::UnicodeNormalization;
use uuid::Uuid;

use crate::notes::repo_types::Note;
use crate::storage::{NoteStore, StoreError, UserStore};
use crate::users::repo_types::{DeletedUser, NewUser, User};

/// Case-folds a username for identity comparison.
///
/// Input is brought to NFC first, so a precomposed `é` and `e` followed by a
/// combining acute compare equal. Upper-casing then expands characters such
/// as `ß` to `SS`, so "Straße", "STRASSE" and "strasse" fold alike, as do
/// final and medial sigma. The result is recomposed since case mapping can
/// emit decomposed sequences.
pub fn fold_username(username: &str) -> String {
    let composed: String = username.nfc().collect();
    composed.to_uppercase().to_lowercase().nfc().collect()
}

/// Process-local store used when no database is configured, and in tests.
///
/// Uniqueness is checked under the write lock, so concurrent creates of the
/// same username cannot both succeed.
#[derive(Default)]
pub struct InMemoryStore {
    users: RwLock<Vec<User>>,
    notes: RwLock<Vec<Note>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub async fn add_note(&self, user_id: Uuid) -> Note {
        let note = Note {
            id: Uuid::new_v4(),
            user_id,
        };
        self.notes.write().await.push(note.clone());
        note
    }

    #[cfg(test)]
    pub async fn user_count(&self) -> usize {
        self.users.read().await.len()
    }
}

fn taken_by_other(users: &[User], username: &str, own_id: Option<Uuid>) -> bool {
    let key = fold_username(username);
    users
        .iter()
        .any(|u| Some(u.id) != own_id && fold_username(&u.username) == key)
}

#[async_trait]
impl UserStore for InMemoryStore {
    async fn find_all(&self) -> Result<Vec<User>, StoreError> {
        Ok(self.users.read().await.clone())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        let key = fold_username(username);
        let users = self.users.read().await;
        Ok(users
            .iter()
            .find(|u| fold_username(&u.username) == key)
            .cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        let users = self.users.read().await;
        Ok(users.iter().find(|u| u.id == id).cloned())
    }

    async fn create(&self, user: NewUser) -> Result<User, StoreError> {
        let mut users = self.users.write().await;
        if taken_by_other(&users, &user.username, None) {
            return Err(StoreError::UniqueViolation);
        }
        let now = OffsetDateTime::now_utc();
        let created = User {
            id: Uuid::new_v4(),
            username: user.username,
            password_hash: user.password_hash,
            roles: user.roles,
            active: user.active,
            created_at: now,
            updated_at: now,
        };
        users.push(created.clone());
        Ok(created)
    }

    async fn save(&self, user: &User) -> Result<User, StoreError> {
        let mut users = self.users.write().await;
        if taken_by_other(&users, &user.username, Some(user.id)) {
            return Err(StoreError::UniqueViolation);
        }
        let slot = users
            .iter_mut()
            .find(|u| u.id == user.id)
            .ok_or(StoreError::NotFound)?;
        *slot = User {
            updated_at: OffsetDateTime::now_utc(),
            ..user.clone()
        };
        Ok(slot.clone())
    }

    async fn delete(&self, user: &User) -> Result<DeletedUser, StoreError> {
        // Same ordering as the database: notes first, then users.
        let notes = self.notes.read().await;
        let mut users = self.users.write().await;
        if notes.iter().any(|n| n.user_id == user.id) {
            return Err(StoreError::ForeignKeyViolation);
        }
        let pos = users
            .iter()
            .position(|u| u.id == user.id)
            .ok_or(StoreError::NotFound)?;
        let removed = users.remove(pos);
        Ok(DeletedUser {
            id: removed.id,
            username: removed.username,
        })
    }
}

#[async_trait]
impl NoteStore for InMemoryStore {
    async fn find_one_by_owner(&self, user_id: Uuid) -> Result<Option<Note>, StoreError> {
        let notes = self.notes.read().await;
        Ok(notes.iter().find(|n| n.user_id == user_id).cloned())
    }
}
