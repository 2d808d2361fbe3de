//! Dashboard State
//!
//! One [`Dashboard`] exists per server session. It owns the map scene and
//! the two components drawing into it, and records how each feed is doing.
//! The poller writes to it; the web handlers read snapshots from it.

use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use windlink_core::layer::{MapView, TileLayer};
use windlink_core::{
    Device, MarkerEntry, PathRenderer, PositionSynchronizer, PositionUpdate, Scene, SceneLayer,
    Waypoint,
};

use crate::error::RefreshError;
use crate::feed::FeedError;

pub type SharedDashboard = Arc<RwLock<Dashboard>>;

/// Health of one feed, as seen by the dashboard
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedStatus {
    /// Sequence number of the last applied response
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_sequence: Option<u64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_update: Option<DateTime<Utc>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,

    pub failures: u64,
}

impl FeedStatus {
    fn record<T>(&mut self, sequence: u64, result: &Result<T, RefreshError>) {
        match result {
            Ok(_) => {
                self.last_sequence = Some(sequence);
                self.last_update = Some(Utc::now());
                self.last_error = None;
            }
            // Overtaken by a newer response, nothing went wrong
            Err(e) if e.is_stale() => {}
            Err(e) => {
                self.failures += 1;
                self.last_error = Some(e.to_string());
            }
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedsStatus {
    pub positions: FeedStatus,
    pub path: FeedStatus,
}

/// Everything a browser needs to draw the current map
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneSnapshot {
    /// Start time of the server session; handles are only unique within one
    pub session: DateTime<Utc>,
    pub revision: u64,
    pub generated_at: DateTime<Utc>,
    pub poll_interval_ms: u64,
    pub view: MapView,
    pub tiles: TileLayer,
    pub layers: Vec<SceneLayer>,
    pub feeds: FeedsStatus,
}

#[derive(Debug)]
pub struct Dashboard {
    scene: Scene,
    positions: PositionSynchronizer,
    path: PathRenderer,
    view: MapView,
    tiles: TileLayer,
    poll_interval_ms: u64,
    session: DateTime<Utc>,
    positions_status: FeedStatus,
    path_status: FeedStatus,
}

impl Dashboard {
    pub fn new(poll_interval: Duration) -> Self {
        Dashboard {
            scene: Scene::new(),
            positions: PositionSynchronizer::new(),
            path: PathRenderer::new(),
            view: MapView::default(),
            tiles: TileLayer::default(),
            poll_interval_ms: u64::try_from(poll_interval.as_millis()).unwrap_or(u64::MAX),
            session: Utc::now(),
            positions_status: FeedStatus::default(),
            path_status: FeedStatus::default(),
        }
    }

    pub fn shared(poll_interval: Duration) -> SharedDashboard {
        Arc::new(RwLock::new(Dashboard::new(poll_interval)))
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn positions(&self) -> &PositionSynchronizer {
        &self.positions
    }

    pub fn path(&self) -> &PathRenderer {
        &self.path
    }

    pub fn positions_status(&self) -> &FeedStatus {
        &self.positions_status
    }

    pub fn path_status(&self) -> &FeedStatus {
        &self.path_status
    }

    /// Apply the outcome of position request `sequence`
    pub fn apply_positions(
        &mut self,
        sequence: u64,
        fetched: Result<Vec<Device>, FeedError>,
    ) -> Result<PositionUpdate, RefreshError> {
        let result = match fetched {
            Ok(devices) => self
                .positions
                .apply(sequence, &devices, &mut self.scene)
                .map_err(RefreshError::from),
            Err(e) => match self.positions.check_sequence(sequence) {
                // A newer snapshot is already showing, so this failure is moot
                Err(stale) => Err(stale.into()),
                Ok(()) => Err(e.into()),
            },
        };
        self.positions_status.record(sequence, &result);
        result
    }

    /// Apply the outcome of path request `sequence`
    ///
    /// A failed fetch blanks the overlay, unless a newer path is already
    /// showing.
    pub fn apply_path(
        &mut self,
        sequence: u64,
        fetched: Result<Vec<Waypoint>, FeedError>,
    ) -> Result<usize, RefreshError> {
        let result = match fetched {
            Ok(waypoints) => self
                .path
                .apply(sequence, &waypoints, &mut self.scene)
                .map_err(RefreshError::from),
            Err(e) => match self.path.fail(sequence, &mut self.scene) {
                Err(stale) => Err(stale.into()),
                Ok(()) => Err(e.into()),
            },
        };
        self.path_status.record(sequence, &result);
        result
    }

    pub fn snapshot(&self) -> SceneSnapshot {
        SceneSnapshot {
            session: self.session,
            revision: self.scene.revision(),
            generated_at: Utc::now(),
            poll_interval_ms: self.poll_interval_ms,
            view: self.view.clone(),
            tiles: self.tiles.clone(),
            layers: self.scene.layers(),
            feeds: FeedsStatus {
                positions: self.positions_status.clone(),
                path: self.path_status.clone(),
            },
        }
    }

    pub fn markers(&self) -> BTreeMap<i64, MarkerEntry> {
        self.positions.markers().clone()
    }

    /// Remove everything drawn during this session
    pub fn teardown(&mut self) {
        self.positions.teardown(&mut self.scene);
        self.path.teardown(&mut self.scene);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::{StatusCode, Url};
    use windlink_core::{LatLng, MapError};

    fn devices() -> Vec<Device> {
        vec![
            Device::named(-1, "Ground Station", 50.0, -20.0),
            Device::named(0, "Windfarm", 56.0, -14.0),
            Device::named(5, "Buoy", 53.0, -17.0),
        ]
    }

    fn unavailable() -> FeedError {
        FeedError::Status {
            url: Url::parse("http://backend/get_shortest_path").unwrap(),
            status: StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    #[test]
    fn test_apply_positions_records_status() {
        let mut dashboard = Dashboard::new(Duration::from_millis(500));

        let update = dashboard.apply_positions(1, Ok(devices())).unwrap();

        assert_eq!(update.created, 3);
        assert_eq!(update.coverage_center, LatLng::new(53.0, -17.0));
        assert_eq!(dashboard.positions_status().last_sequence, Some(1));
        assert!(dashboard.positions_status().last_update.is_some());
        assert_eq!(dashboard.positions_status().failures, 0);
        // 3 indicators, 3 labels, 1 coverage circle
        assert_eq!(dashboard.scene().len(), 7);
    }

    #[test]
    fn test_missing_anchor_is_a_failure() {
        let mut dashboard = Dashboard::new(Duration::from_millis(500));

        let result = dashboard.apply_positions(1, Ok(vec![Device::new(5, 1.0, 1.0)]));

        assert!(matches!(
            result,
            Err(RefreshError::Map(MapError::MissingAnchor { id: -1 }))
        ));
        assert_eq!(dashboard.positions_status().failures, 1);
        assert!(dashboard.scene().is_empty());
    }

    #[test]
    fn test_stale_is_not_a_failure() {
        let mut dashboard = Dashboard::new(Duration::from_millis(500));
        dashboard.apply_positions(2, Ok(devices())).unwrap();

        let result = dashboard.apply_positions(1, Ok(devices()));

        assert!(result.unwrap_err().is_stale());
        assert_eq!(dashboard.positions_status().failures, 0);
        assert_eq!(dashboard.positions_status().last_sequence, Some(2));
    }

    #[test]
    fn test_path_failure_blanks_overlay() {
        let mut dashboard = Dashboard::new(Duration::from_millis(500));
        let path = vec![Waypoint::new(56.0, -14.0), Waypoint::new(50.0, -20.0)];
        assert_eq!(dashboard.apply_path(1, Ok(path)).unwrap(), 1);

        let result = dashboard.apply_path(2, Err(unavailable()));

        assert!(matches!(result, Err(RefreshError::Feed(_))));
        assert!(dashboard.path().segments().is_empty());
        assert!(dashboard.scene().is_empty());
        assert_eq!(dashboard.path_status().failures, 1);
        assert!(dashboard
            .path_status()
            .last_error
            .as_deref()
            .unwrap()
            .contains("503"));
    }

    #[test]
    fn test_late_path_failure_keeps_newer_path() {
        let mut dashboard = Dashboard::new(Duration::from_millis(500));
        let path = vec![Waypoint::new(56.0, -14.0), Waypoint::new(50.0, -20.0)];
        dashboard.apply_path(3, Ok(path)).unwrap();

        assert!(dashboard.apply_path(2, Err(unavailable())).is_err());

        assert_eq!(dashboard.path().segments().len(), 1);
    }

    #[test]
    fn test_late_path_failure_is_stale() {
        let mut dashboard = Dashboard::new(Duration::from_millis(500));
        let path = vec![Waypoint::new(56.0, -14.0), Waypoint::new(50.0, -20.0)];
        dashboard.apply_path(3, Ok(path)).unwrap();

        let result = dashboard.apply_path(2, Err(unavailable()));

        assert!(result.unwrap_err().is_stale());
        assert_eq!(dashboard.path_status().failures, 0);
        assert!(dashboard.path_status().last_error.is_none());
        assert_eq!(dashboard.path_status().last_sequence, Some(3));
    }

    #[test]
    fn test_late_positions_failure_is_stale() {
        let mut dashboard = Dashboard::new(Duration::from_millis(500));
        dashboard.apply_positions(3, Ok(devices())).unwrap();

        let result = dashboard.apply_positions(2, Err(unavailable()));

        assert!(result.unwrap_err().is_stale());
        assert_eq!(dashboard.positions_status().failures, 0);
        assert!(dashboard.positions_status().last_error.is_none());

        // A failure newer than anything applied still counts
        let result = dashboard.apply_positions(4, Err(unavailable()));
        assert!(matches!(result, Err(RefreshError::Feed(_))));
        assert_eq!(dashboard.positions_status().failures, 1);
    }

    #[test]
    fn test_poll_interval_saturates() {
        let dashboard = Dashboard::new(Duration::MAX);
        assert_eq!(dashboard.snapshot().poll_interval_ms, u64::MAX);
    }

    #[test]
    fn test_session_is_stable_per_dashboard() {
        let mut dashboard = Dashboard::new(Duration::from_millis(500));
        let before = dashboard.snapshot().session;
        dashboard.apply_positions(1, Ok(devices())).unwrap();
        dashboard.teardown();

        assert_eq!(dashboard.snapshot().session, before);
    }

    #[test]
    fn test_snapshot_json() {
        let mut dashboard = Dashboard::new(Duration::from_millis(500));
        dashboard.apply_positions(1, Ok(devices())).unwrap();
        dashboard
            .apply_path(1, Ok(vec![Waypoint::new(1.0, 2.0), Waypoint::new(3.0, 4.0)]))
            .unwrap();

        let json = serde_json::to_value(dashboard.snapshot()).unwrap();

        assert_eq!(json["pollIntervalMs"], 500);
        assert!(json["session"].is_string());
        assert_eq!(json["view"]["zoom"], 6);
        assert_eq!(json["view"]["center"]["lat"], 53.0);
        assert_eq!(json["layers"].as_array().unwrap().len(), 8);
        assert_eq!(json["feeds"]["positions"]["lastSequence"], 1);
        assert_eq!(json["feeds"]["path"]["failures"], 0);
        assert!(json["feeds"]["path"].get("lastError").is_none());
    }

    #[test]
    fn test_teardown() {
        let mut dashboard = Dashboard::new(Duration::from_millis(500));
        dashboard.apply_positions(1, Ok(devices())).unwrap();
        dashboard
            .apply_path(1, Ok(vec![Waypoint::new(1.0, 2.0), Waypoint::new(3.0, 4.0)]))
            .unwrap();

        dashboard.teardown();

        assert!(dashboard.scene().is_empty());
        assert!(dashboard.markers().is_empty());
        assert!(dashboard.path().segments().is_empty());
    }
}
