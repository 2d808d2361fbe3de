//! Position Synchronizer
//!
//! Keeps one marker entry (indicator plus label) per device id ever seen,
//! and one coverage circle centred between the ground station and the
//! windfarm.
//!
//! Entries are created on first sighting and moved in place afterwards.
//! Nothing is ever removed while the session lives: a device that drops
//! out of the feed keeps its last known position on the map.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::device::{find_device, Device, LatLng, GROUND_STATION_ID, WINDFARM_ID};
use crate::error::MapError;
use crate::layer::{CircleStyle, LabelIcon, LayerHandle, MapLayer, MarkerStyle};
use crate::sequence::SequenceGuard;

/// The two primitives owned by a device
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkerEntry {
    pub indicator: LayerHandle,
    pub label: LayerHandle,
    pub position: LatLng,
}

/// Summary of one applied position snapshot
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PositionUpdate {
    pub created: usize,
    pub moved: usize,
    pub coverage_center: LatLng,
}

#[derive(Debug, Default)]
pub struct PositionSynchronizer {
    markers: BTreeMap<i64, MarkerEntry>,
    coverage: Option<LayerHandle>,
    guard: SequenceGuard,
}

impl PositionSynchronizer {
    pub fn new() -> Self {
        PositionSynchronizer::default()
    }

    pub fn markers(&self) -> &BTreeMap<i64, MarkerEntry> {
        &self.markers
    }

    pub fn marker(&self, id: i64) -> Option<&MarkerEntry> {
        self.markers.get(&id)
    }

    pub fn coverage(&self) -> Option<LayerHandle> {
        self.coverage
    }

    pub fn last_applied(&self) -> Option<u64> {
        self.guard.applied()
    }

    /// Fail if request `sequence` has been overtaken by an applied snapshot
    pub fn check_sequence(&self, sequence: u64) -> Result<(), MapError> {
        self.guard.check(sequence)
    }

    /// Apply the device snapshot fetched by request `sequence`
    ///
    /// Fails without touching the map if the response is stale or if
    /// either anchor device is missing.
    pub fn apply<L: MapLayer>(
        &mut self,
        sequence: u64,
        devices: &[Device],
        layer: &mut L,
    ) -> Result<PositionUpdate, MapError> {
        self.guard.check(sequence)?;

        let ground_station = find_device(devices, GROUND_STATION_ID).ok_or(
            MapError::MissingAnchor {
                id: GROUND_STATION_ID,
            },
        )?;
        let windfarm =
            find_device(devices, WINDFARM_ID).ok_or(MapError::MissingAnchor { id: WINDFARM_ID })?;
        let center = LatLng::midpoint(ground_station.position(), windfarm.position());

        self.guard.commit(sequence);
        self.place_coverage(center, layer)?;

        let mut created = 0;
        let mut moved = 0;
        for device in devices {
            let at = device.position();
            match self.markers.get_mut(&device.id) {
                Some(entry) => {
                    layer.set_lat_lng(entry.indicator, at)?;
                    layer.set_lat_lng(entry.label, at)?;
                    entry.position = at;
                    moved += 1;
                }
                None => {
                    let indicator = layer.add_circle_marker(at, &MarkerStyle::device());
                    let label = layer.add_label(at, &LabelIcon::device(&device.label_text()));
                    self.markers.insert(
                        device.id,
                        MarkerEntry {
                            indicator,
                            label,
                            position: at,
                        },
                    );
                    created += 1;
                }
            }
        }

        Ok(PositionUpdate {
            created,
            moved,
            coverage_center: center,
        })
    }

    fn place_coverage<L: MapLayer>(&mut self, center: LatLng, layer: &mut L) -> Result<(), MapError> {
        match self.coverage {
            Some(handle) => layer.set_lat_lng(handle, center),
            None => {
                self.coverage = Some(layer.add_circle(center, &CircleStyle::coverage()));
                Ok(())
            }
        }
    }

    /// Remove every primitive this synchronizer created and forget them
    pub fn teardown<L: MapLayer>(&mut self, layer: &mut L) {
        for entry in self.markers.values() {
            layer.remove(entry.indicator);
            layer.remove(entry.label);
        }
        self.markers.clear();
        if let Some(handle) = self.coverage.take() {
            layer.remove(handle);
        }
        self.guard = SequenceGuard::new();
    }
}
