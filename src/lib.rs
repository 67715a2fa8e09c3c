//! Virtual grid screens with a type-keyed registry and event routing.
//!
//! Hosts define screens as [`ScreenDefinition`]s backed by a
//! [`ScreenBehavior`], keep them in a [`ScreenRegistry`], and feed their
//! interaction and click events through an [`EventRouter`]. Drawing is left to
//! a host-provided [`SurfaceHost`]; [`AnsiSurfaceHost`] is a terminal one.

pub mod error;
pub mod host;
pub mod item;
pub mod logging;
pub mod metrics;
pub mod registry;
pub mod render;
pub mod router;
pub mod screen;
pub mod slots;
pub mod width;

pub use error::{HookError, Result, ScreenError};
pub use host::{HostError, HostResult, SurfaceHandle, SurfaceHost, ViewRefresher, ViewerId};
pub use item::{ItemSignature, matches_opener};
pub use logging::{
    FileSink, LogEvent, LogFields, LogLevel, LogSink, Logger, LoggingError, LoggingResult,
    MemorySink,
};
pub use metrics::{MetricSnapshot, RouterMetrics};
pub use registry::{ScreenRegistry, ScreenSnapshot};
pub use render::{AnsiSurfaceHost, RendererSettings};
pub use router::{
    ClickEvent, ClickKind, ClickModifiers, DispatchReport, EventCategory, EventPriority,
    EventRouter, HookFailure, HostEvent, InteractEvent, ItemClick, RouterConfig, SkipReason,
    Subscription,
};
pub use screen::{HookResult, ScreenBehavior, ScreenDefinition};
pub use slots::{SlotAssignment, is_valid_slot_count};
pub use width::display_width;
