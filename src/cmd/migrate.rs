use crate::{
    conf::settings,
    prelude::{Error, Result},
};
use sqlx::{migrate::Migrator, postgres::PgPoolOptions};

static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

pub async fn apply() -> Result<()> {
    let url = settings
        .database_url
        .as_deref()
        .ok_or_else(|| Error::Connection("DATABASE_URL is not set".into()))?;
    let pool = PgPoolOptions::new()
        .max_connections(1)
        .connect(url)
        .await
        .map_err(|e| Error::Connection(e.to_string()))?;

    tracing::debug!("connected to db");
    let mut tx = pool.begin().await?;
    MIGRATOR.run(&mut *tx).await?;
    tx.commit().await?;

    tracing::info!("migrations applied successfully");
    Ok(())
}
