use anyhow::Result;
use takvim::cli;

#[tokio::main]
async fn main() -> Result<()> {
    cli::run().await
}
