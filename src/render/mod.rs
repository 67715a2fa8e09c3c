mod core;

pub use self::core::{AnsiSurfaceHost, RendererSettings};
