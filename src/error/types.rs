use thiserror::Error;

use crate::host::HostError;

/// Unified result type for the screen registry crate.
pub type Result<T> = std::result::Result<T, ScreenError>;

/// Errors surfaced by screen definitions and the registry.
#[derive(Debug, Error)]
pub enum ScreenError {
    #[error("validation failed: {0}")]
    Validation(String),
    #[error("slot {index} is outside 0..{slot_count}")]
    Range { index: usize, slot_count: usize },
    #[error("cannot place {requested} items, only {available} free slots")]
    Capacity { requested: usize, available: usize },
    #[error("failed to construct screen `{screen}`: {source}")]
    Construction {
        screen: &'static str,
        #[source]
        source: Box<ScreenError>,
    },
    #[error("screen `{0}` is already registered")]
    AlreadyRegistered(&'static str),
    #[error("host surface error: {0}")]
    Host(#[from] HostError),
    #[error("screen state poisoned")]
    Poisoned,
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl ScreenError {
    pub(crate) fn construction(screen: &'static str, source: ScreenError) -> Self {
        Self::Construction {
            screen,
            source: Box::new(source),
        }
    }
}

/// Failure reported by a screen hook. The router isolates these per hook.
#[derive(Debug, Error)]
pub enum HookError {
    #[error("{0}")]
    Message(String),
    #[error(transparent)]
    Screen(#[from] ScreenError),
}

impl HookError {
    pub fn msg(message: impl Into<String>) -> Self {
        Self::Message(message.into())
    }
}
