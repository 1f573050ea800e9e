pub mod memory;
pub mod session;
pub mod subscription;

use std::sync::Arc;

use eyre::Result;
use session::Db;
use subscription::{MongoSubscriptions, SubscriptionStore};

const DB_NAME: &str = "subscriptions_db";

#[derive(Clone)]
pub struct Storage {
    subscriptions: Arc<MongoSubscriptions>,
}

impl Storage {
    pub async fn new(uri: &str) -> Result<Self> {
        let db = Db::connect(uri, DB_NAME).await?;
        let subscriptions = Arc::new(MongoSubscriptions::new(&db));
        Ok(Storage { subscriptions })
    }

    pub fn subscriptions(&self) -> Arc<dyn SubscriptionStore> {
        self.subscriptions.clone()
    }
}
