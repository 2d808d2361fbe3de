//! Map Layer Abstraction
//!
//! [`MapLayer`] is the sink that map primitives are drawn into. The
//! synchronizer and renderer only talk to this trait, so the same logic
//! drives the in-memory [`Scene`](crate::Scene) used by the server and
//! tests, or any other map backend.
//!
//! Primitive styles are fixed. They are exposed as constants so that the
//! browser page and the tests agree on them.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::device::LatLng;
use crate::error::MapError;

/// Opaque handle to a primitive owned by a [`MapLayer`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LayerHandle(pub u32);

impl fmt::Display for LayerHandle {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Style of the per-device position indicator (a pixel-radius circle)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkerStyle {
    pub radius: u32,
    pub color: String,
    pub fill_color: String,
    pub fill_opacity: f64,
}

impl MarkerStyle {
    pub fn device() -> Self {
        MarkerStyle {
            radius: 10,
            color: "blue".to_string(),
            fill_color: "#f03".to_string(),
            fill_opacity: 0.5,
        }
    }
}

/// Style of a geographic circle (radius in meters)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CircleStyle {
    pub radius: f64,
    pub color: String,
    pub fill_color: String,
    pub fill_opacity: f64,
}

/// Coverage circle radius: 750 km
pub const COVERAGE_RADIUS_M: f64 = 750_000.0;

impl CircleStyle {
    pub fn coverage() -> Self {
        CircleStyle {
            radius: COVERAGE_RADIUS_M,
            color: "grey".to_string(),
            fill_color: "none".to_string(),
            fill_opacity: 0.0,
        }
    }
}

/// Style of a path segment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolylineStyle {
    pub color: String,
    pub weight: u32,
    pub dash_array: String,
}

impl PolylineStyle {
    pub fn shortest_path() -> Self {
        PolylineStyle {
            color: "red".to_string(),
            weight: 3,
            dash_array: "5, 10".to_string(),
        }
    }
}

/// A text label drawn as a div icon
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LabelIcon {
    pub text: String,
    pub class_name: String,
    pub html: String,
    pub icon_size: [u32; 2],
}

impl LabelIcon {
    pub fn device(text: &str) -> Self {
        LabelIcon {
            text: text.to_string(),
            class_name: "device-label".to_string(),
            html: format!(
                "<div style=\"text-align: center; font-size: 12px;\">{}</div>",
                escape_html(text)
            ),
            icon_size: [50, 100],
        }
    }
}

fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Initial view of the map
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapView {
    pub center: LatLng,
    pub zoom: u8,
}

impl Default for MapView {
    fn default() -> Self {
        MapView {
            center: LatLng::new(53.0, -17.0),
            zoom: 6,
        }
    }
}

/// Base tile layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TileLayer {
    pub url_template: String,
    pub attribution: String,
}

impl Default for TileLayer {
    fn default() -> Self {
        TileLayer {
            url_template: "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png".to_string(),
            attribution: "© OpenStreetMap contributors".to_string(),
        }
    }
}

/// A drawing surface for map primitives
///
/// Creation never fails; every created primitive gets a fresh handle that
/// stays valid until [`remove`](MapLayer::remove) is called with it.
pub trait MapLayer {
    /// Add a fixed-pixel-radius circle marker
    fn add_circle_marker(&mut self, at: LatLng, style: &MarkerStyle) -> LayerHandle;

    /// Add a text label anchored at a coordinate
    fn add_label(&mut self, at: LatLng, icon: &LabelIcon) -> LayerHandle;

    /// Add a circle with a radius in meters
    fn add_circle(&mut self, center: LatLng, style: &CircleStyle) -> LayerHandle;

    /// Add a polyline through the given points
    fn add_polyline(&mut self, points: &[LatLng], style: &PolylineStyle) -> LayerHandle;

    /// Move a point-anchored primitive (marker, label or circle)
    fn set_lat_lng(&mut self, handle: LayerHandle, at: LatLng) -> Result<(), MapError>;

    /// Remove a primitive. Removing an unknown handle is a no-op.
    fn remove(&mut self, handle: LayerHandle);
}
