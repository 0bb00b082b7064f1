use sqlx::{PgConnection, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::pkg::internal::adaptors::jobs::spec::{JobEntry, JobPatch, NewJob};
use crate::prelude::Result;

const RETURNING: &str = " RETURNING id, title, company, location, status, created_at, updated_at";

pub struct JobMutator<'a> {
    pool: &'a mut PgConnection,
}

impl<'a> JobMutator<'a> {
    pub fn new(pool: &'a mut PgConnection) -> Self {
        JobMutator { pool }
    }

    pub async fn create(&mut self, job: NewJob) -> Result<JobEntry> {
        let row = sqlx::query_as::<_, JobEntry>(
            r#"
            INSERT INTO jobs (id, title, company, location, status)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, title, company, location, status, created_at, updated_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&job.title)
        .bind(&job.company)
        .bind(&job.location)
        .bind(job.status)
        .fetch_one(&mut *self.pool)
        .await?;
        Ok(row)
    }

    pub async fn update(&mut self, id: Uuid, job: JobPatch) -> Result<Option<JobEntry>> {
        let mut query = QueryBuilder::<Postgres>::new("UPDATE jobs SET updated_at = now()");

        if let Some(title) = job.title {
            query.push(", title = ").push_bind(title);
        }
        if let Some(company) = job.company {
            query.push(", company = ").push_bind(company);
        }
        if let Some(location) = job.location {
            query.push(", location = ").push_bind(location);
        }
        if let Some(status) = job.status {
            query.push(", status = ").push_bind(status);
        }

        query.push(" WHERE id = ").push_bind(id).push(RETURNING);

        let row = query
            .build_query_as::<JobEntry>()
            .fetch_optional(&mut *self.pool)
            .await?;
        Ok(row)
    }

    pub async fn delete(&mut self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM jobs WHERE id = $1")
            .bind(id)
            .execute(&mut *self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
