use std::sync::Arc;

use axum::extract::FromRef;
use tracing::warn;

use crate::config::AppConfig;
use crate::db;
use crate::memory::InMemoryStore;
use crate::notes::repo::PgNoteStore;
use crate::storage::{NoteStore, UserStore};
use crate::users::{repo::PgUserStore, services::AccountManager};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub users: Arc<dyn UserStore>,
    pub notes: Arc<dyn NoteStore>,
}

impl AppState {
    pub async fn init(config: AppConfig) -> anyhow::Result<Self> {
        let config = Arc::new(config);

        match config.database_url.as_deref() {
            Some(url) => {
                let pool = db::connect(url, config.max_connections).await?;
                db::migrate(&pool).await?;
                let users = Arc::new(PgUserStore::new(pool.clone())) as Arc<dyn UserStore>;
                let notes = Arc::new(PgNoteStore::new(pool)) as Arc<dyn NoteStore>;
                Ok(Self::from_parts(config, users, notes))
            }
            None => {
                warn!("DATABASE_URL not set; accounts are kept in memory only");
                let store = Arc::new(InMemoryStore::new());
                Ok(Self::from_parts(config, store.clone(), store))
            }
        }
    }

    pub fn from_parts(
        config: Arc<AppConfig>,
        users: Arc<dyn UserStore>,
        notes: Arc<dyn NoteStore>,
    ) -> Self {
        Self {
            config,
            users,
            notes,
        }
    }

    #[cfg(test)]
    pub fn fake() -> (Self, Arc<InMemoryStore>) {
        let config = Arc::new(AppConfig {
            hash: crate::users::password::test_hash_config(),
            ..AppConfig::default()
        });
        let store = Arc::new(InMemoryStore::new());
        (Self::from_parts(config, store.clone(), store.clone()), store)
    }
}

impl FromRef<AppState> for AccountManager {
    fn from_ref(state: &AppState) -> Self {
        AccountManager::new(
            state.users.clone(),
            state.notes.clone(),
            state.config.default_role.clone(),
            state.config.hash.clone(),
        )
    }
}
