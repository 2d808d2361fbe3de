//! windlink-core: platform-independent map state for the windlink dashboard
//!
//! This crate holds everything that decides *what* is on the map, without
//! knowing *how* the map is drawn or *where* the data comes from:
//!
//! - **device**: feed records (devices, waypoints) and coordinates
//! - **layer**: the [`MapLayer`] trait and the fixed primitive styles
//! - **scene**: [`Scene`], an in-memory [`MapLayer`] that can be serialized
//! - **positions**: [`PositionSynchronizer`] (markers and coverage circle)
//! - **path**: [`PathRenderer`] (shortest-path overlay)
//! - **sequence**: stale-response protection for overlapping requests
//!
//! There is no I/O here. The server crate fetches the feeds and hands the
//! decoded records to the synchronizer and renderer.
//!
//! # Example
//!
//! ```rust
//! use windlink_core::{Device, PositionSynchronizer, Scene};
//!
//! let mut scene = Scene::new();
//! let mut positions = PositionSynchronizer::new();
//!
//! let devices = vec![
//!     Device::new(-1, 50.0, -20.0),
//!     Device::new(0, 56.0, -14.0),
//!     Device::named(5, "Buoy", 53.0, -17.0),
//! ];
//! let update = positions.apply(1, &devices, &mut scene).unwrap();
//! assert_eq!(update.created, 3);
//! ```

pub mod device;
pub mod error;
pub mod layer;
pub mod path;
pub mod positions;
pub mod scene;
pub mod sequence;

pub use device::{Device, LatLng, Waypoint, GROUND_STATION_ID, WINDFARM_ID};
pub use error::MapError;
pub use layer::{LayerHandle, MapLayer};
pub use path::PathRenderer;
pub use positions::{MarkerEntry, PositionSynchronizer, PositionUpdate};
pub use scene::{Primitive, Scene, SceneLayer};
pub use sequence::{RequestSequence, SequenceGuard};
