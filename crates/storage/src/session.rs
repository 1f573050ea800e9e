use bson::doc;
use eyre::{Context as _, Error};
use log::info;
use mongodb::{Client, Collection, Database};

/// Verified connection to the subscriptions database.
#[derive(Clone)]
pub struct Db {
    _client: Client,
    database: Database,
}

impl Db {
    pub(crate) async fn connect(uri: &str, name: &str) -> Result<Self, Error> {
        let client = Client::with_uri_str(uri)
            .await
            .context("Failed to connect to MongoDB")?;
        let database = client.database(name);
        database
            .run_command(doc! { "ping": 1 })
            .await
            .with_context(|| format!("MongoDB database {} is not reachable", name))?;
        info!("Connected to MongoDB database {}", name);
        Ok(Db {
            _client: client,
            database,
        })
    }

    pub(crate) fn collection<T: Send + Sync>(&self, name: &str) -> Collection<T> {
        self.database.collection(name)
    }
}
