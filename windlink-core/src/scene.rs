//! In-memory Scene
//!
//! [`Scene`] is a [`MapLayer`] that keeps every primitive in a map keyed
//! by handle. The server serializes it for the browser page, and the tests
//! use it to inspect exactly what was drawn.
//!
//! Every mutation bumps [`Scene::revision`], so a client can tell whether
//! anything changed since it last looked.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::device::LatLng;
use crate::error::MapError;
use crate::layer::{CircleStyle, LabelIcon, LayerHandle, MapLayer, MarkerStyle, PolylineStyle};

/// A primitive drawn on the map
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Primitive {
    CircleMarker { center: LatLng, style: MarkerStyle },
    Label { at: LatLng, icon: LabelIcon },
    Circle { center: LatLng, style: CircleStyle },
    Polyline { points: Vec<LatLng>, style: PolylineStyle },
}

impl Primitive {
    pub fn kind(&self) -> &'static str {
        match self {
            Primitive::CircleMarker { .. } => "circleMarker",
            Primitive::Label { .. } => "label",
            Primitive::Circle { .. } => "circle",
            Primitive::Polyline { .. } => "polyline",
        }
    }

    /// Anchor point of point-like primitives, None for polylines
    pub fn anchor(&self) -> Option<LatLng> {
        match self {
            Primitive::CircleMarker { center, .. } => Some(*center),
            Primitive::Label { at, .. } => Some(*at),
            Primitive::Circle { center, .. } => Some(*center),
            Primitive::Polyline { .. } => None,
        }
    }
}

/// A primitive together with its handle, as published to clients
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneLayer {
    pub handle: LayerHandle,
    #[serde(flatten)]
    pub primitive: Primitive,
}

#[derive(Debug, Clone, Default)]
pub struct Scene {
    layers: BTreeMap<LayerHandle, Primitive>,
    next_handle: u32,
    revision: u64,
}

impl Scene {
    pub fn new() -> Self {
        Scene::default()
    }

    pub fn get(&self, handle: LayerHandle) -> Option<&Primitive> {
        self.layers.get(&handle)
    }

    pub fn contains(&self, handle: LayerHandle) -> bool {
        self.layers.contains_key(&handle)
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Number of live primitives of the given kind (see [`Primitive::kind`])
    pub fn count(&self, kind: &str) -> usize {
        self.layers.values().filter(|p| p.kind() == kind).count()
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn iter(&self) -> impl Iterator<Item = (LayerHandle, &Primitive)> {
        self.layers.iter().map(|(h, p)| (*h, p))
    }

    /// All primitives in handle (creation) order
    pub fn layers(&self) -> Vec<SceneLayer> {
        self.layers
            .iter()
            .map(|(handle, primitive)| SceneLayer {
                handle: *handle,
                primitive: primitive.clone(),
            })
            .collect()
    }

    fn insert(&mut self, primitive: Primitive) -> LayerHandle {
        let handle = LayerHandle(self.next_handle);
        self.next_handle += 1;
        self.layers.insert(handle, primitive);
        self.revision += 1;
        handle
    }
}

impl MapLayer for Scene {
    fn add_circle_marker(&mut self, at: LatLng, style: &MarkerStyle) -> LayerHandle {
        self.insert(Primitive::CircleMarker {
            center: at,
            style: style.clone(),
        })
    }

    fn add_label(&mut self, at: LatLng, icon: &LabelIcon) -> LayerHandle {
        self.insert(Primitive::Label {
            at,
            icon: icon.clone(),
        })
    }

    fn add_circle(&mut self, center: LatLng, style: &CircleStyle) -> LayerHandle {
        self.insert(Primitive::Circle {
            center,
            style: style.clone(),
        })
    }

    fn add_polyline(&mut self, points: &[LatLng], style: &PolylineStyle) -> LayerHandle {
        self.insert(Primitive::Polyline {
            points: points.to_vec(),
            style: style.clone(),
        })
    }

    fn set_lat_lng(&mut self, handle: LayerHandle, to: LatLng) -> Result<(), MapError> {
        let primitive = self
            .layers
            .get_mut(&handle)
            .ok_or(MapError::UnknownLayer(handle))?;

        match primitive {
            Primitive::CircleMarker { center, .. } | Primitive::Circle { center, .. } => {
                *center = to
            }
            Primitive::Label { at, .. } => *at = to,
            // Polylines have no single anchor
            Primitive::Polyline { .. } => return Err(MapError::UnknownLayer(handle)),
        }
        self.revision += 1;
        Ok(())
    }

    fn remove(&mut self, handle: LayerHandle) {
        if self.layers.remove(&handle).is_some() {
            self.revision += 1;
        }
    }
}
