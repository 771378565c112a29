use crate::hub::Hub;
use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use planview_core::{builder, parser};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::Instant;

/// Rolling quiet window: every relevant event pushes the rebuild back.
const DEBOUNCE: Duration = Duration::from_millis(100);

/// Watches a planning tree and republishes the snapshot after changes
/// settle.
pub struct PlanWatcher {
    watcher: RecommendedWatcher,
    stop_tx: mpsc::UnboundedSender<()>,
    task: JoinHandle<()>,
}

impl PlanWatcher {
    /// Start watching `planning_dir` recursively.
    ///
    /// An initial snapshot is published right away. After that, a burst of
    /// relevant file events collapses into a single rebuild once the tree
    /// has been quiet for the debounce window.
    pub fn spawn(planning_dir: PathBuf, hub: Hub) -> notify::Result<Self> {
        let (event_tx, mut event_rx) = mpsc::unbounded_channel::<()>();
        let (stop_tx, mut stop_rx) = mpsc::unbounded_channel::<()>();

        let mut watcher =
            notify::recommended_watcher(move |res: notify::Result<notify::Event>| match res {
                Ok(event) => {
                    if event.paths.iter().any(|p| parser::is_relevant(p)) {
                        let _ = event_tx.send(());
                    }
                }
                Err(e) => tracing::warn!("file watch error: {e}"),
            })?;
        watcher.watch(&planning_dir, RecursiveMode::Recursive)?;

        let task = tokio::spawn(async move {
            rebuild(&planning_dir, &hub).await;

            let timer = tokio::time::sleep(Duration::ZERO);
            tokio::pin!(timer);
            let mut armed = false;
            loop {
                tokio::select! {
                    _ = stop_rx.recv() => break,
                    received = event_rx.recv() => match received {
                        Some(()) => {
                            timer.as_mut().reset(Instant::now() + DEBOUNCE);
                            armed = true;
                        }
                        None => break,
                    },
                    _ = &mut timer, if armed => {
                        armed = false;
                        rebuild(&planning_dir, &hub).await;
                    }
                }
            }
        });

        Ok(PlanWatcher {
            watcher,
            stop_tx,
            task,
        })
    }

    /// Shut down: stop event intake first, then the debounce loop.
    pub async fn stop(self) {
        let PlanWatcher {
            watcher,
            stop_tx,
            task,
        } = self;
        drop(watcher);
        let _ = stop_tx.send(());
        let _ = task.await;
    }
}

async fn rebuild(planning_dir: &Path, hub: &Hub) {
    let dir = planning_dir.to_path_buf();
    match tokio::task::spawn_blocking(move || builder::build_snapshot(&dir)).await {
        Ok(Ok(snapshot)) => {
            hub.publish(snapshot).await;
        }
        Ok(Err(e)) => tracing::warn!("snapshot rebuild failed: {e}"),
        Err(e) => tracing::warn!("snapshot rebuild task failed: {e}"),
    }
}
