use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{
    pkg::internal::{
        adaptors::jobs::spec::{JobEntry, JobPatch, NewJob},
        gateway::JobStore,
    },
    prelude::Result,
};

/// Process-local store, newest record first.
#[derive(Debug, Default)]
pub struct MemoryJobStore {
    jobs: RwLock<Vec<JobEntry>>,
}

impl MemoryJobStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl JobStore for MemoryJobStore {
    async fn ping(&self) -> Result<()> {
        Ok(())
    }

    async fn list_all(&self) -> Result<Vec<JobEntry>> {
        Ok(self.jobs.read().await.clone())
    }

    async fn create(&self, job: NewJob) -> Result<JobEntry> {
        let now = Utc::now();
        let entry = JobEntry {
            id: Uuid::new_v4(),
            title: job.title,
            company: job.company,
            location: job.location,
            status: job.status,
            created_at: now,
            updated_at: now,
        };
        self.jobs.write().await.insert(0, entry.clone());
        Ok(entry)
    }

    async fn update_by_id(&self, id: Uuid, patch: JobPatch) -> Result<Option<JobEntry>> {
        let mut jobs = self.jobs.write().await;
        let Some(job) = jobs.iter_mut().find(|job| job.id == id) else {
            return Ok(None);
        };
        patch.apply(job);
        job.updated_at = Utc::now();
        Ok(Some(job.clone()))
    }

    async fn delete_by_id(&self, id: Uuid) -> Result<bool> {
        let mut jobs = self.jobs.write().await;
        let before = jobs.len();
        jobs.retain(|job| job.id != id);
        Ok(jobs.len() != before)
    }
}
