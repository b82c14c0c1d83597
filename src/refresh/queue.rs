//! Work queue feeding refresh requests to a single worker.
//!
//! The resolver must never wait on the network, so it submits a
//! [`RefreshCommand::Scheduled`] job and returns. Interactive callers send
//! [`RefreshCommand::Force`] and await the boolean reply. Both are handled by
//! one [`RefreshWorker`], whose lifetime bounds every background refresh.

use tokio::sync::{mpsc, oneshot};

use crate::fetcher::AddressFetcher;
use crate::store::CacheStore;
use crate::time::Clock;

use super::RefreshController;

/// A unit of refresh work.
#[derive(Debug)]
pub enum RefreshCommand {
    /// Refresh if the cache is expired; nobody waits for the result.
    Scheduled,

    /// Refresh unconditionally and report success on `reply`.
    Force {
        /// Receives whether the refresh succeeded.
        reply: oneshot::Sender<bool>,
    },
}

/// Cloneable handle for submitting refresh work.
#[derive(Debug, Clone)]
pub struct RefreshQueue {
    tx: mpsc::UnboundedSender<RefreshCommand>,
}

impl RefreshQueue {
    /// Submits a background refresh without waiting.
    ///
    /// Returns `false` if the worker is gone and the job was discarded.
    pub fn submit_scheduled(&self) -> bool {
        self.tx.send(RefreshCommand::Scheduled).is_ok()
    }

    /// Requests a forced refresh and waits for its outcome.
    ///
    /// A worker that has shut down counts as a failed refresh.
    pub async fn force_refresh(&self) -> bool {
        let (reply, outcome) = oneshot::channel();

        if self.tx.send(RefreshCommand::Force { reply }).is_err() {
            tracing::warn!("Refresh worker is not running");
            return false;
        }

        outcome.await.unwrap_or(false)
    }

    /// Returns true if the worker has shut down.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Executes queued refresh commands one at a time.
#[derive(Debug)]
pub struct RefreshWorker<F, S, C> {
    controller: RefreshController<F, S, C>,
    rx: mpsc::UnboundedReceiver<RefreshCommand>,
}

/// Creates a queue handle and the worker that serves it.
#[must_use]
pub fn refresh_queue<F, S, C>(
    controller: RefreshController<F, S, C>,
) -> (RefreshQueue, RefreshWorker<F, S, C>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (RefreshQueue { tx }, RefreshWorker { controller, rx })
}

impl<F, S, C> RefreshWorker<F, S, C> {
    /// The controller executing the commands.
    #[must_use]
    pub const fn controller(&self) -> &RefreshController<F, S, C> {
        &self.controller
    }
}

impl<F: AddressFetcher, S: CacheStore, C: Clock> RefreshWorker<F, S, C> {
    /// Processes commands until every [`RefreshQueue`] handle is dropped.
    pub async fn run(mut self) {
        while let Some(command) = self.rx.recv().await {
            self.handle(command).await;
        }
        tracing::debug!("Refresh queue closed, worker stopping");
    }

    /// Processes every command already queued, then returns how many ran.
    pub async fn drain(&mut self) -> usize {
        let mut handled = 0;
        while let Ok(command) = self.rx.try_recv() {
            self.handle(command).await;
            handled += 1;
        }
        handled
    }

    async fn handle(&self, command: RefreshCommand) {
        match command {
            RefreshCommand::Scheduled => self.controller.scheduled_refresh().await,
            RefreshCommand::Force { reply } => {
                let refreshed = self.controller.force_refresh().await;
                // The requester may have stopped waiting.
                let _ = reply.send(refreshed);
            }
        }
    }
}
