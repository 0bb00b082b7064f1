use std::sync::Arc;

use async_trait::async_trait;
use sqlx::{PgPool, postgres::PgPoolOptions};
use tokio::sync::OnceCell;
use uuid::Uuid;

use crate::{
    conf::{StoreKind, settings},
    pkg::internal::adaptors::jobs::{
        memory::MemoryJobStore,
        mutators::JobMutator,
        selectors::JobSelector,
        spec::{JobEntry, JobPatch, NewJob},
    },
    prelude::{Error, Result},
};

/// Every read and write of job records goes through a `JobStore`.
#[async_trait]
pub trait JobStore: Send + Sync {
    async fn ping(&self) -> Result<()>;

    /// All records, newest `created_at` first.
    async fn list_all(&self) -> Result<Vec<JobEntry>>;

    async fn create(&self, job: NewJob) -> Result<JobEntry>;

    /// Replaces only the fields present in `patch`. `None` when no record has `id`.
    async fn update_by_id(&self, id: Uuid, patch: JobPatch) -> Result<Option<JobEntry>>;

    /// Returns whether a record was removed; a missing id is not an error.
    async fn delete_by_id(&self, id: Uuid) -> Result<bool>;
}

pub fn parse_id(id: &str) -> Result<Uuid> {
    Uuid::parse_str(id).map_err(|_| Error::MalformedId(id.to_string()))
}

pub struct PgJobStore {
    pool: PgPool,
}

impl PgJobStore {
    pub async fn open(database_url: &str, max_connections: u32) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await
            .map_err(|e| Error::Connection(e.to_string()))?;
        tracing::debug!("connected to db");
        Ok(PgJobStore { pool })
    }
}

#[async_trait]
impl JobStore for PgJobStore {
    async fn ping(&self) -> Result<()> {
        let mut conn = self.pool.acquire().await?;
        JobSelector::new(&mut conn).ping().await
    }

    async fn list_all(&self) -> Result<Vec<JobEntry>> {
        let mut conn = self.pool.acquire().await?;
        JobSelector::new(&mut conn).get_all().await
    }

    async fn create(&self, job: NewJob) -> Result<JobEntry> {
        let mut conn = self.pool.acquire().await?;
        JobMutator::new(&mut conn).create(job).await
    }

    async fn update_by_id(&self, id: Uuid, patch: JobPatch) -> Result<Option<JobEntry>> {
        let mut conn = self.pool.acquire().await?;
        JobMutator::new(&mut conn).update(id, patch).await
    }

    async fn delete_by_id(&self, id: Uuid) -> Result<bool> {
        let mut conn = self.pool.acquire().await?;
        JobMutator::new(&mut conn).delete(id).await
    }
}

/// Lazily opens the configured store once and hands the same instance to
/// every caller afterwards.
pub struct Gateway {
    kind: StoreKind,
    database_url: Option<String>,
    max_connections: u32,
    store: OnceCell<Arc<dyn JobStore>>,
}

impl Gateway {
    pub fn new(kind: StoreKind, database_url: Option<String>, max_connections: u32) -> Self {
        Gateway {
            kind,
            database_url,
            max_connections,
            store: OnceCell::new(),
        }
    }

    pub fn from_settings() -> Self {
        Gateway::new(
            settings.store,
            settings.database_url.clone(),
            settings.database_pool_max_connections,
        )
    }

    /// A gateway whose store is already open.
    pub fn with_store(store: Arc<dyn JobStore>) -> Self {
        Gateway {
            kind: StoreKind::Memory,
            database_url: None,
            max_connections: 0,
            store: OnceCell::new_with(Some(store)),
        }
    }

    pub async fn connect(&self) -> Result<Arc<dyn JobStore>> {
        let store = self
            .store
            .get_or_try_init(|| async {
                match self.kind {
                    StoreKind::Memory => {
                        tracing::info!("using in-memory job store");
                        Ok::<_, Error>(Arc::new(MemoryJobStore::new()) as Arc<dyn JobStore>)
                    }
                    StoreKind::Postgres => {
                        let url = self.database_url.as_deref().ok_or_else(|| {
                            Error::Connection("DATABASE_URL is not set".into())
                        })?;
                        let store = PgJobStore::open(url, self.max_connections).await?;
                        Ok(Arc::new(store) as Arc<dyn JobStore>)
                    }
                }
            })
            .await?;
        Ok(Arc::clone(store))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn concurrent_connects_share_one_store() {
        let gateway = Arc::new(Gateway::new(StoreKind::Memory, None, 1));
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let gateway = Arc::clone(&gateway);
                tokio::spawn(async move { gateway.connect().await.unwrap() })
            })
            .collect();
        let first = gateway.connect().await.unwrap();
        for handle in handles {
            assert!(Arc::ptr_eq(&first, &handle.await.unwrap()));
        }
    }

    #[tokio::test]
    async fn postgres_without_url_is_a_connection_error() {
        let gateway = Gateway::new(StoreKind::Postgres, None, 1);
        let err = gateway.connect().await.err().unwrap();
        assert!(matches!(err, Error::Connection(_)));
    }

    #[test]
    fn parse_id_rejects_garbage() {
        assert!(matches!(parse_id("not-an-id"), Err(Error::MalformedId(_))));
        let id = Uuid::new_v4();
        assert_eq!(parse_id(&id.to_string()).unwrap(), id);
    }
}
