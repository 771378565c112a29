use planview_core::builder;
use planview_core::snapshot::Snapshot;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::{broadcast, Mutex};

/// Wire envelope for dashboard frames.
#[derive(Serialize)]
pub struct Envelope<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    payload: &'a Snapshot,
}

impl<'a> Envelope<'a> {
    pub fn initial(payload: &'a Snapshot) -> Self {
        Envelope {
            kind: "initial",
            payload,
        }
    }

    pub fn update(payload: &'a Snapshot) -> Self {
        Envelope {
            kind: "update",
            payload,
        }
    }
}

/// Snapshot cache plus the broadcast channel subscribers listen on.
///
/// The cache and the channel are written under one lock, so a subscriber
/// that reads the cache and then drains the channel never misses a
/// snapshot, only ever sees a duplicate.
#[derive(Clone)]
pub struct Hub {
    planning_dir: PathBuf,
    latest: Arc<Mutex<Option<Arc<Snapshot>>>>,
    tx: broadcast::Sender<Arc<Snapshot>>,
}

impl Hub {
    pub fn new(planning_dir: PathBuf) -> Self {
        let (tx, _) = broadcast::channel(64);
        Hub {
            planning_dir,
            latest: Arc::new(Mutex::new(None)),
            tx,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Arc<Snapshot>> {
        self.tx.subscribe()
    }

    /// The cached snapshot, building one on first use.
    pub async fn current(&self) -> anyhow::Result<Arc<Snapshot>> {
        {
            let latest = self.latest.lock().await;
            if let Some(snapshot) = latest.as_ref() {
                return Ok(snapshot.clone());
            }
        }
        let planning_dir = self.planning_dir.clone();
        let snapshot =
            tokio::task::spawn_blocking(move || builder::build_snapshot(&planning_dir)).await??;
        let snapshot = Arc::new(snapshot);
        let mut latest = self.latest.lock().await;
        if let Some(existing) = latest.as_ref() {
            // A publish won the race; its snapshot is newer than ours.
            return Ok(existing.clone());
        }
        *latest = Some(snapshot.clone());
        Ok(snapshot)
    }

    /// Cache `snapshot` and fan it out to every subscriber.
    pub async fn publish(&self, snapshot: Snapshot) -> Arc<Snapshot> {
        let snapshot = Arc::new(snapshot);
        let mut latest = self.latest.lock().await;
        *latest = Some(snapshot.clone());
        let _ = self.tx.send(snapshot.clone());
        snapshot
    }

    /// Rebuild from disk, then publish.
    pub async fn refresh(&self) -> anyhow::Result<Arc<Snapshot>> {
        let planning_dir = self.planning_dir.clone();
        let snapshot =
            tokio::task::spawn_blocking(move || builder::build_snapshot(&planning_dir)).await??;
        Ok(self.publish(snapshot).await)
    }
}
