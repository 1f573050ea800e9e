use std::{env::var, sync::Arc, time::Duration};

use dotenv::dotenv;
use eyre::{bail, eyre, Context, Error};

const DEFAULT_SWEEP_INTERVAL_SECS: u64 = 60;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StorageKind {
    Mongo,
    Memory,
}

#[derive(Clone)]
pub struct Env(Arc<EnvInner>);

#[derive(Clone)]
pub struct EnvInner {
    tg_token: String,
    chat_id: i64,
    storage: StorageKind,
    mongo_url: Option<String>,
    sweep_interval: Duration,
}

impl Env {
    pub fn tg_token(&self) -> &str {
        &self.0.tg_token
    }

    /// Group whose members are swept.
    pub fn chat_id(&self) -> i64 {
        self.0.chat_id
    }

    pub fn storage(&self) -> StorageKind {
        self.0.storage
    }

    pub fn mongo_url(&self) -> Option<&str> {
        self.0.mongo_url.as_deref()
    }

    pub fn sweep_interval(&self) -> Duration {
        self.0.sweep_interval
    }

    pub fn load() -> Result<Env, Error> {
        if let Err(err) = dotenv() {
            log::info!("Failed to load .env file: {}", err);
        }
        Self::from_lookup(|key| var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Env, Error> {
        let required = |key: &str| lookup(key).ok_or_else(|| eyre!("{} is not set", key));

        let chat_id = required("CHAT_ID")?
            .trim()
            .parse::<i64>()
            .context("CHAT_ID must be an integer")?;

        let storage = match lookup("STORAGE").as_deref().map(str::trim) {
            None | Some("") | Some("mongo") => StorageKind::Mongo,
            Some("memory") => StorageKind::Memory,
            Some(other) => bail!("STORAGE must be 'mongo' or 'memory', got '{}'", other),
        };
        let mongo_url = match storage {
            StorageKind::Mongo => Some(required("MONGO_URL")?),
            StorageKind::Memory => lookup("MONGO_URL"),
        };

        let sweep_interval = match lookup("SWEEP_INTERVAL_SECS") {
            Some(secs) => secs
                .trim()
                .parse::<u64>()
                .context("SWEEP_INTERVAL_SECS must be a positive integer")?,
            None => DEFAULT_SWEEP_INTERVAL_SECS,
        };
        if sweep_interval == 0 {
            bail!("SWEEP_INTERVAL_SECS must be a positive integer");
        }

        Ok(Env(Arc::new(EnvInner {
            tg_token: required("TG_TOKEN")?,
            chat_id,
            storage,
            mongo_url,
            sweep_interval: Duration::from_secs(sweep_interval),
        })))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> Result<Env, Error> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Env::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let env = load(&[
            ("TG_TOKEN", "token"),
            ("CHAT_ID", "-12345"),
            ("MONGO_URL", "mongodb://localhost"),
        ])
        .unwrap();
        assert_eq!(env.tg_token(), "token");
        assert_eq!(env.chat_id(), -12345);
        assert_eq!(env.storage(), StorageKind::Mongo);
        assert_eq!(env.mongo_url(), Some("mongodb://localhost"));
        assert_eq!(env.sweep_interval(), Duration::from_secs(60));
    }

    #[test]
    fn test_memory_storage_does_not_need_mongo() {
        let env = load(&[
            ("TG_TOKEN", "token"),
            ("CHAT_ID", "-1"),
            ("STORAGE", "memory"),
            ("SWEEP_INTERVAL_SECS", "5"),
        ])
        .unwrap();
        assert_eq!(env.storage(), StorageKind::Memory);
        assert_eq!(env.mongo_url(), None);
        assert_eq!(env.sweep_interval(), Duration::from_secs(5));
    }

    #[test]
    fn test_invalid_values() {
        assert!(load(&[("TG_TOKEN", "t"), ("MONGO_URL", "m")]).is_err());
        assert!(load(&[("TG_TOKEN", "t"), ("CHAT_ID", "group"), ("MONGO_URL", "m")]).is_err());
        assert!(load(&[("TG_TOKEN", "t"), ("CHAT_ID", "-1")]).is_err());
        assert!(load(&[
            ("TG_TOKEN", "t"),
            ("CHAT_ID", "-1"),
            ("STORAGE", "memory"),
            ("SWEEP_INTERVAL_SECS", "0"),
        ])
        .is_err());
        assert!(load(&[("TG_TOKEN", "t"), ("CHAT_ID", "-1"), ("STORAGE", "redis")]).is_err());
    }
}
