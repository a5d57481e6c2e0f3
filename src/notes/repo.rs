use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::notes::repo_types::Note;
use crate::storage::{NoteStore, StoreError};

#[derive(Clone)]
pub struct PgNoteStore {
    db: PgPool,
}

impl PgNoteStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl NoteStore for PgNoteStore {
    /// Return any one note owned by the user, if one exists.
    async fn find_one_by_owner(&self, user_id: Uuid) -> Result<Option<Note>, StoreError> {
        let note = sqlx::query_as::<_, Note>(
            r#"
            SELECT id, user_id
              FROM notes
             WHERE user_id = $1
             LIMIT 1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.db)
        .await?;
        Ok(note)
    }
}
