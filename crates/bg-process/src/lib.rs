use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use env::Env;
use eyre::{Error, Result};
use ledger::Ledger;
use log::{error, info, warn};
use process::subscription::SweepBg;
use tokio::sync::Mutex;
use tokio_cron_scheduler::{Job, JobScheduler};

pub mod process;

#[async_trait]
pub trait Task {
    const NAME: &'static str;

    async fn process(&mut self) -> Result<(), Error>;
}

/// Starts the background jobs. The returned scheduler must be kept alive.
pub async fn start(ledger: Ledger, env: &Env) -> Result<JobScheduler> {
    let sched = JobScheduler::new().await?;

    let sweep = Runner::new(SweepBg::new(ledger, env.chat_id()));
    let first_pass = sweep.clone();
    tokio::spawn(async move {
        first_pass.tick().await;
    });
    sched.add(sweep.job(env.sweep_interval())?).await?;

    sched.start().await?;
    info!(
        "Background jobs started, sweep every {}s",
        env.sweep_interval().as_secs()
    );
    Ok(sched)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    Done,
    Failed,
    /// The previous run had not finished yet.
    Skipped,
}

/// Runs a task at most once at a time.
pub struct Runner<T> {
    task: Arc<Mutex<T>>,
}

impl<T> Clone for Runner<T> {
    fn clone(&self) -> Self {
        Runner {
            task: self.task.clone(),
        }
    }
}

impl<T: Task + Send + 'static> Runner<T> {
    pub fn new(task: T) -> Self {
        Runner {
            task: Arc::new(Mutex::new(task)),
        }
    }

    pub async fn tick(&self) -> Tick {
        let mut task = match self.task.try_lock() {
            Ok(task) => task,
            Err(_) => {
                warn!("Task {} is still running, skipping tick", T::NAME);
                return Tick::Skipped;
            }
        };

        match task.process().await {
            Ok(()) => Tick::Done,
            Err(err) => {
                error!("Failed to process task {}: {:#}", T::NAME, err);
                Tick::Failed
            }
        }
    }

    pub fn job(&self, every: Duration) -> Result<Job> {
        let runner = self.clone();
        let job = Job::new_repeated_async(every, move |_uuid, _lock| {
            let runner = runner.clone();
            Box::pin(async move {
                runner.tick().await;
            })
        })?;
        Ok(job)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use tokio::sync::Notify;

    use super::*;

    struct Blocking {
        started: Arc<Notify>,
        release: Arc<Notify>,
    }

    #[async_trait]
    impl Task for Blocking {
        const NAME: &'static str = "blocking";

        async fn process(&mut self) -> Result<(), Error> {
            self.started.notify_one();
            self.release.notified().await;
            Ok(())
        }
    }

    struct Failing;

    #[async_trait]
    impl Task for Failing {
        const NAME: &'static str = "failing";

        async fn process(&mut self) -> Result<(), Error> {
            eyre::bail!("boom")
        }
    }

    #[tokio::test]
    async fn test_overlapping_tick_is_skipped() {
        let started = Arc::new(Notify::new());
        let release = Arc::new(Notify::new());
        let runner = Runner::new(Blocking {
            started: started.clone(),
            release: release.clone(),
        });

        let first = runner.clone();
        let handle = tokio::spawn(async move { first.tick().await });
        started.notified().await;

        assert_eq!(runner.tick().await, Tick::Skipped);

        release.notify_one();
        assert_eq!(handle.await.unwrap(), Tick::Done);
    }

    #[tokio::test]
    async fn test_failed_run_releases_runner() {
        let runner = Runner::new(Failing);
        assert_eq!(runner.tick().await, Tick::Failed);
        assert_eq!(runner.tick().await, Tick::Failed);
    }
}
