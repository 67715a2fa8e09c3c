mod types;

pub use types::{HookError, Result, ScreenError};
