//! The seam between the cache and whatever actually knows about fonts.
//!
//! A [`FontEngine`] owns the font database: it accepts font files, matches a
//! [`FontRequest`] to a concrete face and measures it. The cache and the
//! startup sequence only talk to this trait, so they run the same way over
//! [`FontdbEngine`](crate::font::db::FontdbEngine) and over test doubles.

use std::fmt;
use std::path::Path;

use crate::font::FontError;
use crate::font::flags::StyleFlags;

/// Handle for one font file (or in-memory blob) added to an engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FontSourceId(pub u32);

/// Rendering hint passed along with every request. Engines without a
/// notion of rendering quality ignore it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum RenderQuality {
    /// Antialiased, hinted output. Every font the cache creates asks for this.
    #[default]
    PreferQuality,
    PreferSpeed,
}

/// Everything an engine needs to realize a face.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FontRequest {
    /// Requested family. Empty means "the engine's default font".
    pub family: String,
    pub pixel_size: u16,
    pub flags: StyleFlags,
    pub quality: RenderQuality,
}

impl FontRequest {
    pub fn new(family: impl Into<String>, pixel_size: u16, flags: StyleFlags) -> Self {
        Self {
            family: family.into(),
            pixel_size,
            flags,
            quality: RenderQuality::PreferQuality,
        }
    }
}

/// Vertical metrics of a realized face, in whole pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LineMetrics {
    pub height: i32,
    pub ascent: i32,
    pub descent: i32,
}

/// Font database and measurement backend.
pub trait FontEngine {
    /// A realized face: enough to answer metric queries later.
    type Face: Clone + fmt::Debug;

    /// Adds a font file to the database.
    fn add_font_file(&mut self, path: &Path) -> Result<FontSourceId, FontError>;

    /// Adds in-memory font data to the database.
    fn add_font_data(&mut self, data: Vec<u8>) -> Result<FontSourceId, FontError>;

    /// Family names discovered in a previously added source.
    fn source_families(&self, source: FontSourceId) -> Vec<String>;

    /// Picks a concrete face for `request`, falling back the way the engine
    /// sees fit. `None` only when the engine has nothing to offer at all.
    fn realize(&self, request: &FontRequest) -> Option<Self::Face>;

    /// Family the engine actually picked for `face`.
    fn resolved_family(&self, face: &Self::Face) -> String;

    fn line_metrics(&self, face: &Self::Face) -> LineMetrics;

    /// Horizontal advance of `text`, in whole pixels.
    fn text_width(&self, face: &Self::Face, text: &str) -> i32;

    /// Registers `fallbacks` (in order) to try when `family` is unavailable.
    fn insert_substitutions(&mut self, family: &str, fallbacks: &[String]);

    /// Family used for requests that do not name one.
    fn set_default_font(&mut self, family: &str);
}
