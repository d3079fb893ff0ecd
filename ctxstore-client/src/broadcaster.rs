//! Fan-out of raw backend changes to every other context.

use ctxstore_backend::ChangeFeed;
use ctxstore_rpc::{RpcChannel, StorageChanged};
use ctxstore_types::StorageChange;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Forwards each raw change as one `storageChanged` notification per
/// reachable context.
///
/// Runs for as long as it is held. Sends are never retried and never awaited
/// by the loop itself; their outcomes are only logged.
pub struct ChangeBroadcaster {
    task: JoinHandle<()>,
    stopped: AtomicBool,
}

impl ChangeBroadcaster {
    /// Spawns the broadcast loop over `feed`. Must be called within a tokio
    /// runtime.
    pub fn spawn(channel: RpcChannel, mut feed: ChangeFeed) -> Self {
        let task = tokio::spawn(async move {
            loop {
                match feed.recv().await {
                    Ok(change) => broadcast(&channel, &change).await,
                    Err(RecvError::Lagged(skipped)) => {
                        warn!("Change broadcaster lagged, {} change(s) not forwarded", skipped);
                    }
                    Err(RecvError::Closed) => break,
                }
            }
            debug!("Change feed closed, broadcaster stopped");
        });
        Self {
            task,
            stopped: AtomicBool::new(false),
        }
    }

    pub fn is_running(&self) -> bool {
        !self.stopped.load(Ordering::SeqCst) && !self.task.is_finished()
    }

    /// Stops forwarding. Notifications already queued are unaffected.
    pub fn stop(&self) {
        self.stopped.store(true, Ordering::SeqCst);
        self.task.abort();
    }
}

impl Drop for ChangeBroadcaster {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn broadcast(channel: &RpcChannel, change: &StorageChange) {
    let targets = channel.reachable_contexts().await;
    debug!("Broadcasting change to '{}' to {} context(s)", change.key, targets.len());

    for target in targets {
        match channel.notify::<StorageChanged>(target, change).await {
            Ok(pending) => {
                let key = change.key.clone();
                tokio::spawn(async move {
                    match pending.outcome().await {
                        Ok(()) => {}
                        Err(e) if e.is_unreachable() => {
                            debug!("Context {} closed before '{}' change arrived", target, key);
                        }
                        Err(e) => warn!("Context {} failed to apply '{}' change: {}", target, key, e),
                    }
                });
            }
            Err(e) if e.is_unreachable() => {
                debug!("Context {} unreachable for '{}' change", target, change.key);
            }
            Err(e) => warn!("Failed to notify {} of '{}' change: {}", target, change.key, e),
        }
    }
}
