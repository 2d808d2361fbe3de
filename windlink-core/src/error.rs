use thiserror::Error;

use crate::layer::LayerHandle;

/// Errors raised while applying a feed snapshot to the map
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MapError {
    /// Ground station or windfarm absent from the position feed
    #[error("Anchor device {id} missing from position feed")]
    MissingAnchor { id: i64 },

    /// Response overtaken by a newer one already on the map
    #[error("Stale response #{sequence}, #{applied} already applied")]
    StaleResponse { sequence: u64, applied: u64 },

    #[error("No layer with handle {0}")]
    UnknownLayer(LayerHandle),
}
