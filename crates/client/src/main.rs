use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;

use easyway_auth::{FileStorage, SignInCredentials};
use easyway_catalog::PageQuery;
use easyway_client::{AppState, ClientConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    easyway_observability::init();

    let config = ClientConfig::from_env()?;
    let storage_path = match std::env::var("EASYWAY_STORAGE_PATH") {
        Ok(path) => PathBuf::from(path),
        Err(_) => FileStorage::default_location()?,
    };
    let storage = FileStorage::open(&storage_path)
        .with_context(|| format!("failed to open session storage at {}", storage_path.display()))?;

    let app = AppState::new(&config, Arc::new(storage)).context("failed to build API client")?;
    tracing::info!(base_url = %config.base_url, "client ready");

    if !app.auth.is_authenticated() {
        let email = std::env::var("EASYWAY_EMAIL").context("EASYWAY_EMAIL not set and no stored session")?;
        let password = std::env::var("EASYWAY_PASSWORD").context("EASYWAY_PASSWORD not set")?;
        let session = app
            .sessions
            .sign_in(&SignInCredentials::new(email, password))
            .await?;
        tracing::info!(user = %session.display_name(), role = %session.role, "signed in");
    }

    let page = app.categories.get_by_filter(&PageQuery::default()).await?;
    tracing::info!(total = page.total_count, shown = page.items.len(), "categories");
    for category in &page.items {
        println!("{}\t{}", category.name, if category.is_active { "active" } else { "inactive" });
    }

    Ok(())
}
