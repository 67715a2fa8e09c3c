mod core;

pub(crate) use self::core::RegistryShared;
pub use self::core::{ScreenRegistry, ScreenSnapshot};
