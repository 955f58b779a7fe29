use crate::models::DashboardSnapshot;
use crate::service::{DashboardError, DashboardService};
use common::{ChangeFeed, RecordChange, Subscription};
use database::Database;
use rollup::MonthKey;
use std::sync::{Arc, Weak};
use tokio::sync::{Mutex, RwLock, mpsc};
use tokio::task::JoinHandle;
use tracing::instrument;

/// Owns the live dashboard: the selected month, the latest snapshot for it,
/// the change-feed subscription and the worker that recomputes on change.
///
/// Every ledger notification triggers a full recompute of the selected month.
/// Call [`DashboardController::teardown`] before dropping the last handle.
pub struct DashboardController {
    db: Database,
    month: RwLock<MonthKey>,
    snapshot: RwLock<Option<DashboardSnapshot>>,
    subscription: Mutex<Option<Subscription>>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl DashboardController {
    /// Computes the first snapshot, then subscribes to `feed`.
    #[instrument(skip(db, feed))]
    pub async fn attach(
        db: Database,
        feed: &ChangeFeed,
        month: MonthKey,
    ) -> Result<Arc<Self>, DashboardError> {
        let controller = Arc::new(Self {
            db,
            month: RwLock::new(month),
            snapshot: RwLock::new(None),
            subscription: Mutex::new(None),
            worker: Mutex::new(None),
        });
        controller.refresh().await?;

        let (tx, rx) = mpsc::unbounded_channel();
        let subscription = feed.subscribe(move |change: &RecordChange| {
            // The receiver only goes away during teardown.
            let _ = tx.send(change.clone());
        });
        let worker = tokio::spawn(run_worker(Arc::downgrade(&controller), rx));

        *controller.subscription.lock().await = Some(subscription);
        *controller.worker.lock().await = Some(worker);

        tracing::info!(%month, "dashboard controller attached");
        Ok(controller)
    }

    pub async fn month(&self) -> MonthKey {
        *self.month.read().await
    }

    pub async fn snapshot(&self) -> Option<DashboardSnapshot> {
        self.snapshot.read().await.clone()
    }

    /// Switches the live view to `month` and recomputes it.
    #[instrument(skip(self))]
    pub async fn select_month(&self, month: MonthKey) -> Result<DashboardSnapshot, DashboardError> {
        *self.month.write().await = month;
        self.refresh().await
    }

    /// Recomputes the selected month from storage. A result computed for a
    /// month that was deselected meanwhile is discarded.
    pub async fn refresh(&self) -> Result<DashboardSnapshot, DashboardError> {
        let month = self.month().await;
        let snapshot = DashboardService::snapshot(&self.db, month).await?;

        let selected = self.month.read().await;
        if *selected == month {
            *self.snapshot.write().await = Some(snapshot.clone());
        }
        Ok(snapshot)
    }

    /// Unsubscribes from the feed and stops the worker. Safe to call twice.
    pub async fn teardown(&self) {
        if let Some(subscription) = self.subscription.lock().await.take() {
            subscription.unsubscribe();
        }
        if let Some(worker) = self.worker.lock().await.take() {
            worker.abort();
            let _ = worker.await;
        }
        tracing::info!("dashboard controller torn down");
    }
}

async fn run_worker(controller: Weak<DashboardController>, mut rx: mpsc::UnboundedReceiver<RecordChange>) {
    while let Some(change) = rx.recv().await {
        // Coalesce a burst into one recompute.
        let mut pending = 1usize;
        while rx.try_recv().is_ok() {
            pending += 1;
        }

        let Some(controller) = controller.upgrade() else {
            break;
        };
        tracing::debug!(?change, pending, "ledger changed, recomputing dashboard");
        if let Err(e) = controller.refresh().await {
            tracing::error!("dashboard recompute failed: {}", e);
        }
    }
}
