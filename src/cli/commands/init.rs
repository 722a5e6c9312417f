//! Config bootstrap and migration command handlers

use crate::config::Config;
use crate::db::Store;

pub fn cmd_init() -> anyhow::Result<()> {
    if Config::create_default_if_missing()? {
        println!("✓ Created config.toml with default settings");
    } else {
        println!("config.toml already exists, leaving it untouched");
    }
    Ok(())
}

pub async fn cmd_migrate(config: &Config) -> anyhow::Result<()> {
    // Store::from_config applies pending migrations on connect
    let store = Store::from_config(config).await?;
    store.ping().await?;

    println!("✓ Database is up to date: {}", config.general.database_path);
    Ok(())
}
