//! Copy the configured story origins and prompts into the selected storage backend.
//!
//! Entries already present are skipped, so the tool can run on every deploy.

use std::{env, sync::Arc};

use anyhow::{Context, bail};
use lorecraftr_back::{
    config::AppConfig, dao::story_store::StoryStore, services::content_service,
};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let config = AppConfig::load();
    let store = connect().await?;
    let report = content_service::seed_catalog(store, config.catalog())
        .await
        .context("seeding content")?;

    info!(
        origins_added = report.origins_added,
        prompts_added = report.prompts_added,
        "seeding finished"
    );
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

async fn connect() -> anyhow::Result<Arc<dyn StoryStore>> {
    let backend = env::var("STORAGE_BACKEND").unwrap_or_else(|_| "mongo".into());
    match backend.trim().to_ascii_lowercase().as_str() {
        #[cfg(feature = "mongo-store")]
        "mongo" | "mongodb" => {
            use lorecraftr_back::dao::story_store::mongodb::{MongoConfig, MongoStoryStore};

            let config = MongoConfig::from_env().await.context("reading MongoDB settings")?;
            let store = MongoStoryStore::connect(config)
                .await
                .context("connecting to MongoDB")?;
            Ok(Arc::new(store))
        }
        #[cfg(feature = "couch-store")]
        "couch" | "couchdb" => {
            use lorecraftr_back::dao::story_store::couchdb::{CouchConfig, CouchStoryStore};

            let config = CouchConfig::from_env().context("reading CouchDB settings")?;
            let store = CouchStoryStore::connect(config)
                .await
                .context("connecting to CouchDB")?;
            Ok(Arc::new(store))
        }
        other => bail!("cannot seed storage backend `{other}`"),
    }
}
