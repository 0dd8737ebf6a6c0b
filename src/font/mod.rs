//! Font module root.
//!
//! Fonts are requested by `(pixel size, style flags, family)` and interned:
//! - Family names are mapped to dense ids (`family`).
//! - `(family, size, flags)` is packed into one integer key (`key`).
//! - The cache owns one `FontData` per key and hands out copyable `Font`
//!   handles (`cache`).
//! - Faces are realized and measured by a pluggable `FontEngine` (`engine`);
//!   `db` provides the `fontdb` + `ttf-parser` implementation.
//! - `resolve` validates that the engine really picked the family asked for,
//!   and registers custom font files.
//! - `context` ties it together with the startup / shutdown lifecycle.

pub mod cache;
pub mod context;
pub mod db;
pub mod engine;
pub mod family;
pub mod flags;
pub mod key;
pub mod resolve;

use std::io;

pub use cache::{Font, FontCache, FontData, FontMetrics};
pub use context::{FontContext, StartupFailure, StartupReport};
pub use db::{FontdbEngine, FontdbFace};
pub use engine::{FontEngine, FontRequest, FontSourceId, LineMetrics, RenderQuality};
pub use family::{FamilyId, FamilyInterner};
pub use flags::StyleFlags;
pub use key::FontKey;

/// Errors produced by the font subsystem.
#[derive(thiserror::Error, Debug)]
pub enum FontError {
    #[error("could not add '{path}': not a usable font file")]
    Unparseable { path: String },

    #[error("failed to read font file '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("could not locate '{family}' font in '{path}'")]
    MissingFamily { family: String, path: String },

    #[error("could not resolve '{requested}' font, got '{resolved}'")]
    ResolutionMismatch { requested: String, resolved: String },

    #[error("got a zero height in '{family}'")]
    ZeroHeight { family: String },

    #[error("no font face available for '{family}'")]
    Unrealizable { family: String },

    #[error("pixel size {size} is larger than the supported maximum of {max}")]
    SizeOutOfRange { size: u16, max: u16 },

    #[error("unknown font family id {0:?}")]
    UnknownFamily(FamilyId),

    #[error("family table is full ({0} families)")]
    TooManyFamilies(usize),

    #[error("font cache is full ({0} fonts)")]
    CacheFull(usize),

    #[error("font handle does not belong to the live cache")]
    StaleFont,

    #[error("resource '{0}' not found in any initialized bundle")]
    MissingResource(String),

    #[error("resource bundle '{name}' not found at {path}")]
    MissingBundle { name: String, path: String },
}
