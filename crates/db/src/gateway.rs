//! [`PersistenceGateway`] backed by PostgreSQL.

use async_trait::async_trait;
use herald_core::error::PersistenceError;
use herald_core::gateway::{NewNotice, PersistenceGateway};
use herald_core::types::DbId;

use crate::repositories::NoticeRepo;
use crate::DbPool;

/// Writes notices through [`NoticeRepo::create`].
#[derive(Clone)]
pub struct PgNoticeGateway {
    pool: DbPool,
}

impl PgNoticeGateway {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PersistenceGateway for PgNoticeGateway {
    async fn create_notice(&self, notice: NewNotice) -> Result<DbId, PersistenceError> {
        NoticeRepo::create(&self.pool, &notice)
            .await
            .map_err(PersistenceError::new)
    }
}
