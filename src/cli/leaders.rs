use anyhow::{Context, Result};
use serde_json::json;

use crate::backend::ChatBackend;
use crate::core::AppConfig;

use super::api_client;

pub async fn run(config: &AppConfig) -> Result<()> {
    let client = api_client(config);
    let leaders = client
        .list_leaders()
        .await
        .context("Failed to list leaders")?;
    for leader in leaders {
        println!(
            "{}",
            json!({
                "id": leader.id,
                "name": leader.name,
                "description": leader.description,
            })
        );
    }
    Ok(())
}
