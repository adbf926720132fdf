use anyhow::Result;
use leaderchat::cli;

#[tokio::main]
async fn main() -> Result<()> {
    cli::run().await
}
