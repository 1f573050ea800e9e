use async_trait::async_trait;
use chrono::Utc;
use eyre::{Error, Result};
use ledger::Ledger;
use log::info;
use model::ChatId;

use crate::Task;

/// Removes members whose subscription is over.
#[derive(Clone)]
pub struct SweepBg {
    ledger: Ledger,
    chat_id: ChatId,
}

#[async_trait]
impl Task for SweepBg {
    const NAME: &'static str = "subscription";

    async fn process(&mut self) -> Result<(), Error> {
        let report = self.ledger.sweep(self.chat_id, Utc::now()).await?;
        if !report.failed.is_empty() {
            info!(
                "Eviction of {:?} will be retried on the next sweep",
                report.failed
            );
        }
        Ok(())
    }
}

impl SweepBg {
    pub fn new(ledger: Ledger, chat_id: ChatId) -> SweepBg {
        SweepBg { ledger, chat_id }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use chrono::Duration;
    use eyre::Error;
    use ledger::ChatMembers;
    use model::{subscription::Subscription, UserId};
    use parking_lot::Mutex;
    use storage::{memory::MemoryStore, subscription::SubscriptionStore};

    use super::*;
    use crate::{Runner, Tick};

    #[derive(Default)]
    struct Recorder {
        removed: Mutex<Vec<(ChatId, UserId)>>,
    }

    #[async_trait]
    impl ChatMembers for Recorder {
        async fn administrators(&self, _chat_id: ChatId) -> Result<Vec<UserId>, Error> {
            Ok(vec![])
        }

        async fn remove(&self, chat_id: ChatId, user_id: UserId) -> Result<(), Error> {
            self.removed.lock().push((chat_id, user_id));
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_sweep_uses_configured_chat() {
        let store = Arc::new(MemoryStore::new());
        let members = Arc::new(Recorder::default());
        let now = Utc::now();
        store
            .upsert(&Subscription::new(1, now - Duration::days(2)))
            .await
            .unwrap();
        store.upsert(&Subscription::new(2, now)).await.unwrap();

        let ledger = Ledger::new(store.clone(), members.clone());
        let runner = Runner::new(SweepBg::new(ledger, -100500));
        assert_eq!(runner.tick().await, Tick::Done);

        assert_eq!(*members.removed.lock(), vec![(-100500, 1)]);
        assert_eq!(store.get_anchor_time(1).await.unwrap(), None);
        assert_eq!(store.get_anchor_time(2).await.unwrap(), Some(now));
    }
}
