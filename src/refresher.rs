use crate::error::LoadError;
use crate::loader;
use crate::models::Snapshot;
use crate::publisher::SnapshotPublisher;
use crate::source::RecordSource;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

/// Default time between refreshes
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(60);

/// Load both sources and assemble a snapshot. Nothing is published here.
///
/// `loaded_at` is the modification time of the current source, stat'ed
/// before it is read.
pub async fn load_snapshot(
    current: &dyn RecordSource,
    history: Option<&dyn RecordSource>,
) -> Result<Snapshot, LoadError> {
    let loaded_at = current.last_modified().await?;
    let current_records = loader::load(current).await?;
    let history_records = match history {
        Some(source) => loader::load(source).await?.into_observations(),
        None => Vec::new(),
    };

    Ok(Snapshot::new(
        loaded_at,
        current_records.into_observations(),
        history_records,
    ))
}

/// Background task that reloads the sources and publishes a new snapshot on
/// a fixed interval
pub struct Refresher {
    publisher: Arc<SnapshotPublisher>,
    current: Arc<dyn RecordSource>,
    history: Option<Arc<dyn RecordSource>>,
    refresh_interval: Duration,
}

impl Refresher {
    /// Run the startup load and create the publisher holding its result.
    ///
    /// Fails if the first load fails; callers must not serve requests then.
    pub async fn initialize(
        current: Arc<dyn RecordSource>,
        history: Option<Arc<dyn RecordSource>>,
    ) -> Result<Self, LoadError> {
        info!("Loading initial snapshot from {}", current.describe());
        let snapshot = load_snapshot(current.as_ref(), history.as_deref()).await?;
        let publisher = Arc::new(SnapshotPublisher::new(snapshot));

        Ok(Self {
            publisher,
            current,
            history,
            refresh_interval: DEFAULT_REFRESH_INTERVAL,
        })
    }

    /// Set refresh interval
    pub fn with_refresh_interval(mut self, interval: Duration) -> Self {
        self.refresh_interval = interval;
        self
    }

    /// Publisher fed by this refresher
    pub fn publisher(&self) -> Arc<SnapshotPublisher> {
        Arc::clone(&self.publisher)
    }

    /// Load and publish once. On error the visible snapshot is untouched.
    pub async fn refresh_once(&self) -> Result<Arc<Snapshot>, LoadError> {
        let snapshot = load_snapshot(self.current.as_ref(), self.history.as_deref()).await?;
        Ok(self.publisher.publish(snapshot).await)
    }

    /// Refresh every interval until `cancel` fires. The first refresh happens
    /// one full interval after the call.
    pub async fn run(self, cancel: CancellationToken) {
        let mut interval = time::interval_at(
            Instant::now() + self.refresh_interval,
            self.refresh_interval,
        );
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        info!("Refresher started, will reload every {:?}", self.refresh_interval);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    info!("Refresher stopped");
                    break;
                }
                _ = interval.tick() => {
                    if let Err(e) = self.refresh_once().await {
                        let generation = self.publisher.generation().await;
                        error!("Refresh failed, keeping generation {}: {}", generation, e);
                    }
                }
            }
        }
    }

    /// Start the refresh loop in the background
    pub fn spawn(self) -> RefreshHandle {
        let cancel = CancellationToken::new();
        let task = tokio::spawn(self.run(cancel.clone()));
        RefreshHandle {
            cancel,
            task: Some(task),
        }
    }
}

/// Handle on a running refresh loop
pub struct RefreshHandle {
    cancel: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl RefreshHandle {
    /// Cancel the loop and wait for it to exit
    pub async fn stop(mut self) {
        self.cancel.cancel();
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                error!("Refresher task failed: {}", e);
            }
        }
    }

    pub fn is_finished(&self) -> bool {
        self.task.as_ref().map_or(true, |task| task.is_finished())
    }

    /// Wait for the loop to exit without cancelling it
    pub async fn join(&mut self) {
        if let Some(task) = self.task.as_mut() {
            let result = task.await;
            self.task = None;
            if let Err(e) = result {
                error!("Refresher task failed: {}", e);
            }
        }
    }
}
