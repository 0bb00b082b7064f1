use async_trait::async_trait;
use reqwest::{Client, Response};
use uuid::Uuid;

use crate::{
    pkg::internal::adaptors::jobs::spec::{JobEntry, JobPatch, NewJob},
    prelude::{Error, Result},
};

/// The REST surface of the jobs service as seen from the board.
#[async_trait]
pub trait JobApi: Send + Sync {
    async fn fetch_jobs(&self) -> Result<Vec<JobEntry>>;

    async fn create_job(&self, job: &NewJob) -> Result<JobEntry>;

    /// `None` when the server no longer knows the id.
    async fn update_job(&self, id: Uuid, patch: &JobPatch) -> Result<Option<JobEntry>>;

    async fn delete_job(&self, id: Uuid) -> Result<()>;
}

pub struct HttpJobApi {
    client: Client,
    base_url: String,
}

impl HttpJobApi {
    pub fn new(base_url: &str) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("jobtracker/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(HttpJobApi {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

async fn ensure_ok(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(Error::Api {
        status: status.as_u16(),
        body,
    })
}

#[async_trait]
impl JobApi for HttpJobApi {
    async fn fetch_jobs(&self) -> Result<Vec<JobEntry>> {
        let response = self.client.get(self.url("/jobs")).send().await?;
        Ok(ensure_ok(response).await?.json().await?)
    }

    async fn create_job(&self, job: &NewJob) -> Result<JobEntry> {
        let response = self.client.post(self.url("/jobs")).json(job).send().await?;
        Ok(ensure_ok(response).await?.json().await?)
    }

    async fn update_job(&self, id: Uuid, patch: &JobPatch) -> Result<Option<JobEntry>> {
        let response = self
            .client
            .put(self.url(&format!("/jobs/{}", id)))
            .json(patch)
            .send()
            .await?;
        Ok(ensure_ok(response).await?.json().await?)
    }

    async fn delete_job(&self, id: Uuid) -> Result<()> {
        let response = self
            .client
            .delete(self.url(&format!("/jobs/{}", id)))
            .send()
            .await?;
        ensure_ok(response).await?;
        Ok(())
    }
}
