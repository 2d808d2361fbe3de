use thiserror::Error;
use windlink_core::MapError;

use crate::feed::FeedError;

/// Outcome of a failed refresh; logged by the poller and otherwise ignored
#[derive(Debug, Error)]
pub enum RefreshError {
    #[error(transparent)]
    Feed(#[from] FeedError),

    #[error(transparent)]
    Map(#[from] MapError),
}

impl RefreshError {
    /// True if a newer response had already been applied
    pub fn is_stale(&self) -> bool {
        matches!(self, RefreshError::Map(MapError::StaleResponse { .. }))
    }
}
