use sqlx::FromRow;
use uuid::Uuid;

/// Ownership view of a note; account management reads nothing else.
#[derive(Debug, Clone, FromRow)]
pub struct Note {
    pub id: Uuid,
    pub user_id: Uuid, // owning user
}
