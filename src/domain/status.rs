//! Match statuses and writer listeners.
//!
//! Listeners are called from the domain's listener thread, never from the
//! thread that caused the match, and never while the domain lock is held.
//! They must be `Send + Sync` and should not block.

use std::sync::Arc;
use std::sync::mpsc;
use std::thread;

use tracing::debug;

use crate::domain::InstanceHandle;

/// Status information for publication matching events.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PublicationMatchedStatus {
    /// Total cumulative count of matched subscriptions.
    pub total_count: u32,
    /// Change in total_count since last callback.
    pub total_count_change: i32,
    /// Current number of matched subscriptions.
    pub current_count: u32,
    /// Change in current_count since last callback.
    pub current_count_change: i32,
    /// Handle of the last matched/unmatched subscription.
    pub last_subscription_handle: Option<InstanceHandle>,
}

/// Callbacks for data writer events.
pub trait DataWriterListener: Send + Sync {
    /// Called when the writer matches or unmatches with a reader.
    fn on_publication_matched(&self, status: PublicationMatchedStatus) {
        let _ = status;
    }
}

pub(crate) struct ListenerEvent {
    pub listener: Arc<dyn DataWriterListener>,
    pub status: PublicationMatchedStatus,
}

/// Spawns the thread that delivers listener events in the order they were
/// queued. It exits once every sender is gone.
pub(crate) fn spawn_dispatcher(domain_id: u32) -> std::io::Result<mpsc::Sender<ListenerEvent>> {
    let (tx, rx) = mpsc::channel::<ListenerEvent>();

    thread::Builder::new()
        .name(format!("domain-{domain_id}-listener"))
        .spawn(move || {
            for event in rx {
                event.listener.on_publication_matched(event.status);
            }
            debug!("listener dispatcher for domain {domain_id} stopped");
        })?;

    Ok(tx)
}
