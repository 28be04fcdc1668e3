use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};

use af_core::ItemId;
use tokio::sync::Mutex;
use tokio::task::AbortHandle;
use tracing::debug;

#[derive(Default)]
struct ItemTasks {
    listener: Option<(u64, AbortHandle)>,
    close_timer: Option<(u64, AbortHandle)>,
}

impl ItemTasks {
    fn is_empty(&self) -> bool {
        self.listener.is_none() && self.close_timer.is_none()
    }
}

#[derive(Clone, Copy, Debug)]
pub(super) enum TaskKind {
    Listener,
    CloseTimer,
}

/// Background tasks owned by open KYC dialogs, keyed by item.
///
/// Each task gets a ticket; a task that finishes on its own calls
/// [`KycTasks::release`] with its ticket so it never clears a newer task's
/// handle.
#[derive(Default)]
pub(super) struct KycTasks {
    items: Mutex<HashMap<ItemId, ItemTasks>>,
    next_ticket: AtomicU64,
}

impl KycTasks {
    /// Spawns `task(ticket)` and records its handle, aborting whatever task
    /// of the same kind the item already had.
    ///
    /// The registry stays locked until the handle is stored, so a task that
    /// finishes immediately still releases its own slot.
    pub(super) async fn spawn<F, Fut>(&self, item_id: &ItemId, kind: TaskKind, task: F)
    where
        F: FnOnce(u64) -> Fut,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let mut items = self.items.lock().await;
        let ticket = self.next_ticket.fetch_add(1, Ordering::Relaxed) + 1;
        let handle = tokio::spawn(task(ticket)).abort_handle();
        let entry = items.entry(item_id.clone()).or_default();
        let slot = match kind {
            TaskKind::Listener => &mut entry.listener,
            TaskKind::CloseTimer => &mut entry.close_timer,
        };
        if let Some((_, previous)) = slot.replace((ticket, handle)) {
            previous.abort();
            debug!(item_id = %item_id, ?kind, "Replaced running KYC task");
        }
    }

    pub(super) async fn release(&self, item_id: &ItemId, kind: TaskKind, ticket: u64) {
        let mut items = self.items.lock().await;
        let Some(entry) = items.get_mut(item_id) else {
            return;
        };
        let slot = match kind {
            TaskKind::Listener => &mut entry.listener,
            TaskKind::CloseTimer => &mut entry.close_timer,
        };
        if slot.as_ref().is_some_and(|(t, _)| *t == ticket) {
            *slot = None;
        }
        if entry.is_empty() {
            items.remove(item_id);
        }
    }

    pub(super) async fn abort(&self, item_id: &ItemId, kind: TaskKind) {
        let mut items = self.items.lock().await;
        if let Some(entry) = items.get_mut(item_id) {
            let slot = match kind {
                TaskKind::Listener => &mut entry.listener,
                TaskKind::CloseTimer => &mut entry.close_timer,
            };
            if let Some((_, handle)) = slot.take() {
                handle.abort();
                debug!(item_id = %item_id, ?kind, "KYC task aborted");
            }
            if entry.is_empty() {
                items.remove(item_id);
            }
        }
    }

    pub(super) async fn abort_item(&self, item_id: &ItemId) {
        if let Some(entry) = self.items.lock().await.remove(item_id) {
            abort_entry(entry);
            debug!(item_id = %item_id, "KYC tasks aborted");
        }
    }

    pub(super) async fn abort_all(&self) {
        let drained: Vec<_> = self.items.lock().await.drain().collect();
        for (_, entry) in drained {
            abort_entry(entry);
        }
    }

    pub(super) async fn is_running(&self, item_id: &ItemId, kind: TaskKind) -> bool {
        self.items.lock().await.get(item_id).is_some_and(|e| match kind {
            TaskKind::Listener => e.listener.is_some(),
            TaskKind::CloseTimer => e.close_timer.is_some(),
        })
    }
}

fn abort_entry(entry: ItemTasks) {
    for (_, handle) in entry.listener.into_iter().chain(entry.close_timer) {
        handle.abort();
    }
}
