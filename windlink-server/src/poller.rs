//! Feed Poller
//!
//! Fires both refreshes once at startup and then on every tick of a fixed
//! interval. Each refresh runs as its own task and is never cancelled by a
//! later tick, so requests to a slow backend can overlap. Every request
//! carries a per-feed sequence number; the dashboard drops responses that
//! arrive after a newer one was applied.

use std::fmt::Debug;
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinSet;
use tokio::time::MissedTickBehavior;
use tokio_graceful_shutdown::SubsystemHandle;
use windlink_core::{PositionUpdate, RequestSequence};

use crate::dashboard::SharedDashboard;
use crate::error::RefreshError;
use crate::feed::FeedSource;

pub struct Poller<F> {
    feed: Arc<F>,
    dashboard: SharedDashboard,
    interval: Duration,
    positions_sequence: Arc<RequestSequence>,
    path_sequence: Arc<RequestSequence>,
}

impl<F> Clone for Poller<F> {
    fn clone(&self) -> Self {
        Poller {
            feed: self.feed.clone(),
            dashboard: self.dashboard.clone(),
            interval: self.interval,
            positions_sequence: self.positions_sequence.clone(),
            path_sequence: self.path_sequence.clone(),
        }
    }
}

impl<F: FeedSource> Poller<F> {
    pub fn new(feed: F, dashboard: SharedDashboard, interval: Duration) -> Self {
        Poller {
            feed: Arc::new(feed),
            dashboard,
            interval,
            positions_sequence: Arc::new(RequestSequence::new()),
            path_sequence: Arc::new(RequestSequence::new()),
        }
    }

    /// Fetch device positions and update markers and coverage circle
    pub async fn refresh_positions(&self) -> Result<PositionUpdate, RefreshError> {
        let sequence = self.positions_sequence.next();
        let fetched = self.feed.positions().await;

        let mut dashboard = self.dashboard.write().unwrap();
        dashboard.apply_positions(sequence, fetched)
    }

    /// Fetch the shortest path and redraw the path overlay
    pub async fn refresh_path(&self) -> Result<usize, RefreshError> {
        let sequence = self.path_sequence.next();
        let fetched = self.feed.shortest_path().await;

        let mut dashboard = self.dashboard.write().unwrap();
        dashboard.apply_path(sequence, fetched)
    }

    fn spawn_refreshes(&self, in_flight: &mut JoinSet<()>) {
        let poller = self.clone();
        in_flight.spawn(async move {
            log_refresh("positions", poller.refresh_positions().await);
        });
        let poller = self.clone();
        in_flight.spawn(async move {
            log_refresh("path", poller.refresh_path().await);
        });
    }

    pub async fn run(self, subsys: SubsystemHandle) -> anyhow::Result<()> {
        log::info!("Polling feeds every {:?}", self.interval);

        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut in_flight = JoinSet::new();

        loop {
            tokio::select! {
                _ = subsys.on_shutdown_requested() => {
                    log::debug!("poller: shutdown");
                    break;
                },

                // The first tick completes immediately
                _ = ticker.tick() => {
                    self.spawn_refreshes(&mut in_flight);
                },

                Some(joined) = in_flight.join_next(), if !in_flight.is_empty() => {
                    if let Err(e) = joined {
                        log::error!("refresh task failed: {}", e);
                    }
                },
            }
        }

        in_flight.abort_all();
        while in_flight.join_next().await.is_some() {}

        self.dashboard.write().unwrap().teardown();
        log::info!("Poller stopped, dashboard cleared");
        Ok(())
    }
}

fn log_refresh<T: Debug>(feed: &str, outcome: Result<T, RefreshError>) {
    match outcome {
        Ok(summary) => log::trace!("{}: {:?}", feed, summary),
        Err(e) if e.is_stale() => log::debug!("{}: {}", feed, e),
        Err(e) => log::warn!("{}: {}", feed, e),
    }
}
