// `evsync push`: create-or-update broker entities from the CSV feed

use evsync_core::{push, SyncConfig};

pub async fn run() -> anyhow::Result<()> {
    let config = SyncConfig::from_env()?;
    push::run(&config).await?;
    Ok(())
}
