use anyhow::Result;

use crate::chat::ChatSession;
use crate::core::AppConfig;

use super::chat::render_message;
use super::{api_client, session_store};

pub async fn run(config: &AppConfig, leader_id: &str) -> Result<()> {
    let session = ChatSession::builder(api_client(config), session_store(config).await, leader_id)
        .clear_prompt_threshold(config.clear_prompt_threshold)
        .build();

    session.open().await?;
    for msg in session.messages() {
        println!("{}\n", render_message(&msg, session.leader_name().as_deref()));
    }
    Ok(())
}
