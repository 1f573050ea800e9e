use std::sync::Arc;

use bot::BotApp;
use env::{Env, StorageKind};
use eyre::{eyre, Context};
use ledger::Ledger;
use log::{info, warn};
use storage::{memory::MemoryStore, subscription::SubscriptionStore, Storage};

#[tokio::main]
async fn main() -> eyre::Result<()> {
    pretty_env_logger::init();
    color_eyre::install()?;

    let env = Env::load().context("Failed to load configuration")?;

    let store: Arc<dyn SubscriptionStore> = match env.storage() {
        StorageKind::Mongo => {
            info!("connecting to mongo");
            let mongo_url = env
                .mongo_url()
                .ok_or_else(|| eyre!("MONGO_URL is not set"))?;
            Storage::new(mongo_url)
                .await
                .context("Failed to create storage")?
                .subscriptions()
        }
        StorageKind::Memory => {
            warn!("Using in-memory storage, subscriptions are lost on restart");
            Arc::new(MemoryStore::new())
        }
    };

    let bot = BotApp::new(env.clone());
    info!("creating ledger");
    let ledger = Ledger::new(store, bot.members());

    let _scheduler = bg_process::start(ledger.clone(), &env)
        .await
        .context("Failed to start background jobs")?;

    info!("Starting bot...");
    bot.start(ledger).await?;
    Ok(())
}
