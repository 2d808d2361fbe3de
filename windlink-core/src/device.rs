//! Feed Records
//!
//! Types decoded from the two backend feeds: the device list returned by
//! `/get_positions` and the waypoint list returned by `/get_shortest_path`.
//! Both feeds use `lat`/`long` as coordinate field names.

use serde::{Deserialize, Serialize};

/// Reserved device id of the ground station
pub const GROUND_STATION_ID: i64 = -1;

/// Reserved device id of the windfarm anchor
pub const WINDFARM_ID: i64 = 0;

/// A geographic coordinate in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub const fn new(lat: f64, lng: f64) -> Self {
        LatLng { lat, lng }
    }

    /// Flat midpoint: the mean of each coordinate taken independently.
    ///
    /// This is not a great-circle midpoint. Over the distances the dashboard
    /// shows the difference is invisible at the default zoom.
    pub fn midpoint(a: LatLng, b: LatLng) -> LatLng {
        LatLng {
            lat: (a.lat + b.lat) / 2.0,
            lng: (a.lng + b.lng) / 2.0,
        }
    }
}

/// A positioned entity reported by the backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Device {
    pub id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub lat: f64,
    pub long: f64,
}

impl Device {
    pub fn new(id: i64, lat: f64, long: f64) -> Self {
        Device {
            id,
            name: None,
            lat,
            long,
        }
    }

    pub fn named(id: i64, name: &str, lat: f64, long: f64) -> Self {
        Device {
            id,
            name: Some(name.to_string()),
            lat,
            long,
        }
    }

    pub fn position(&self) -> LatLng {
        LatLng::new(self.lat, self.long)
    }

    /// Text shown under the marker
    ///
    /// Falls back to "Device {id}" when the feed has no name, or an empty one.
    pub fn label_text(&self) -> String {
        match self.name.as_deref() {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => format!("Device {}", self.id),
        }
    }

    pub fn is_ground_station(&self) -> bool {
        self.id == GROUND_STATION_ID
    }

    pub fn is_windfarm(&self) -> bool {
        self.id == WINDFARM_ID
    }
}

/// One point of the shortest path, ordered start to end
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Waypoint {
    pub lat: f64,
    pub long: f64,
}

impl Waypoint {
    pub fn new(lat: f64, long: f64) -> Self {
        Waypoint { lat, long }
    }

    pub fn position(&self) -> LatLng {
        LatLng::new(self.lat, self.long)
    }
}

/// Find a device by id with a linear scan
///
/// Returns the first match; ids are assumed unique within a snapshot.
pub fn find_device(devices: &[Device], id: i64) -> Option<&Device> {
    devices.iter().find(|d| d.id == id)
}
