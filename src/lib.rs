//! `uifont` library crate root.
//!
//! Font registration and an interned font-metrics cache for desktop UI
//! toolkits:
//! - register bundled / custom font files and verify the engine really
//!   resolves the family they promise;
//! - hand out one shared font object per `(pixel size, style flags, family)`.
//!
//! Entry point is [`FontContext`]: build one with an engine and a
//! [`FontConfig`], call `start()` once, then request fonts.
//!
//! Note: the library never initializes logging; it only emits `log` records.

pub mod config;
pub mod font;
pub mod resources;

pub use config::{ConfigError, FontConfig, Platform};
pub use font::{
    Font, FontContext, FontEngine, FontError, FontMetrics, FontdbEngine, StartupReport, StyleFlags,
};
