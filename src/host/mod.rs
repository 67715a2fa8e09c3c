//! Collaborator contracts implemented by the host UI.
//!
//! The registry never draws anything itself. It asks a [`SurfaceHost`] to
//! create, fill and present grid surfaces, and asks a [`ViewRefresher`] to push
//! changes to whoever is currently looking at one.

use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::item::ItemSignature;

#[cfg(test)]
pub(crate) mod testing;

/// Identity of a user looking at (or clicking in) a surface.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ViewerId(String);

impl ViewerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ViewerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ViewerId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for ViewerId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Opaque handle to a host surface.
///
/// Handles are unique per created surface, so hosts that report the handle on
/// click events let the router resolve the owning screen without relying on
/// titles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct SurfaceHandle(u64);

impl SurfaceHandle {
    pub fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    pub fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for SurfaceHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "surface#{}", self.0)
    }
}

pub type HostResult<T> = std::result::Result<T, HostError>;

#[derive(Debug, Error)]
pub enum HostError {
    #[error("unknown surface {0}")]
    UnknownSurface(SurfaceHandle),
    #[error("slot {index} does not exist on {handle}")]
    InvalidSlot { handle: SurfaceHandle, index: usize },
    #[error("host rejected request: {0}")]
    Rejected(String),
}

/// Pushes surface changes to current viewers.
pub trait ViewRefresher: Send + Sync {
    fn list_viewers(&self, handle: SurfaceHandle) -> HostResult<Vec<ViewerId>>;
    fn refresh_view(&self, viewer: &ViewerId) -> HostResult<()>;
}

/// Grid surface primitive provided by the host UI.
pub trait SurfaceHost: ViewRefresher {
    fn create_surface(&self, slot_count: usize, title: &str) -> HostResult<SurfaceHandle>;
    fn set_slot(&self, handle: SurfaceHandle, index: usize, item: &ItemSignature)
    -> HostResult<()>;
    fn present(&self, handle: SurfaceHandle, viewer: &ViewerId) -> HostResult<()>;
}
