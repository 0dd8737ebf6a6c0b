//! `fontdb`-backed font engine.
//!
//! - Owns a `fontdb::Database` (system fonts are opt-in).
//! - Accepts font files / blobs and remembers which faces each one added.
//! - Resolves a [`FontRequest`] through: monospace system family (when asked),
//!   the requested family, its substitution chain, `sans-serif`, and finally
//!   the first face in the database.
//! - Also answers to the legacy family names (name ID 1) of added fonts.
//!   fontdb only reports the typographic family (name ID 16) when a font has
//!   one, so `OpenSans-Semibold.ttf` would otherwise never be found as
//!   "Open Sans Semibold".
//! - Measures faces with `ttf-parser`, scaling font units by
//!   `pixel_size / units_per_em`.

use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use fontdb::{Database, FaceInfo, Family, ID, Query, Source, Stretch, Style, Weight};

use crate::font::FontError;
use crate::font::engine::{FontEngine, FontRequest, FontSourceId, LineMetrics};
use crate::font::flags::StyleFlags;

/// A face picked by [`FontdbEngine::realize`].
#[derive(Debug, Clone)]
pub struct FontdbFace {
    pub id: ID,
    pub pixel_size: u16,
    pub flags: StyleFlags,
    family: String,
}

impl FontdbFace {
    /// First family name the face reports.
    pub fn family(&self) -> &str {
        &self.family
    }
}

pub struct FontdbEngine {
    db: Database,
    /// Faces added per source, indexed by `FontSourceId`.
    sources: Vec<Vec<ID>>,
    /// Legacy family names of added faces that fontdb does not report.
    legacy: Vec<(ID, Vec<String>)>,
    /// Lowercased family name -> fallbacks in priority order.
    substitutions: HashMap<String, Vec<String>>,
    default_family: Option<String>,
}

impl Default for FontdbEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl FontdbEngine {
    /// Creates an engine with an empty database.
    pub fn new() -> Self {
        Self {
            db: Database::new(),
            sources: Vec::new(),
            legacy: Vec::new(),
            substitutions: HashMap::new(),
            default_family: None,
        }
    }

    /// Creates an engine and loads the platform's installed fonts.
    pub fn with_system_fonts() -> Self {
        let mut engine = Self::new();
        engine.load_system_fonts();
        engine
    }

    pub fn load_system_fonts(&mut self) {
        self.db.load_system_fonts();
        log::info!("Font: {} system faces available", self.db.len());
    }

    pub fn face_count(&self) -> usize {
        self.db.len()
    }

    pub fn default_family(&self) -> Option<&str> {
        self.default_family.as_deref()
    }

    /// Fallbacks registered for `family`.
    pub fn substitutions(&self, family: &str) -> &[String] {
        self.substitutions
            .get(&family.trim().to_lowercase())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn inner(&self) -> &Database {
        &self.db
    }

    fn family_chain<'a>(&'a self, request: &'a FontRequest) -> Vec<Family<'a>> {
        let mut families = Vec::new();

        if request.flags.contains(StyleFlags::MONOSPACE) {
            families.push(Family::Monospace);
        }

        let requested = match request.family.trim() {
            "" => self.default_family.as_deref().unwrap_or("sans-serif"),
            name => name,
        };
        families.push(to_fontdb_family(requested));
        families.extend(self.substitutions(requested).iter().map(|s| to_fontdb_family(s)));

        families.push(Family::SansSerif);
        families
    }

    /// Best face for a single family, legacy names first.
    fn query_family(&self, family: Family<'_>, weight: Weight, style: Style) -> Option<(ID, String)> {
        if let Family::Name(name) = family {
            if let Some(found) = self.query_legacy(name, weight, style) {
                return Some(found);
            }
        }

        let id = self.db.query(&Query {
            families: &[family],
            weight,
            style,
            stretch: Stretch::Normal,
        })?;
        Some((id, primary_family(self.db.face(id)?)))
    }

    /// Closest style match among faces whose legacy family is `name`.
    fn query_legacy(&self, name: &str, weight: Weight, style: Style) -> Option<(ID, String)> {
        self.legacy
            .iter()
            .filter_map(|(id, names)| {
                let alias = names
                    .iter()
                    .find(|alias| alias.eq_ignore_ascii_case(name.trim()))?;
                let face = self.db.face(*id)?;
                let penalty = u32::from(face.style != style) * 1000
                    + u32::from(face.weight.0.abs_diff(weight.0));
                Some((penalty, *id, alias))
            })
            .min_by_key(|(penalty, _, _)| *penalty)
            .map(|(_, id, alias)| (id, alias.clone()))
    }

    /// Name ID 1 families of `id` that fontdb did not already report.
    fn legacy_families(&self, id: ID) -> Vec<String> {
        let Some(info) = self.db.face(id) else {
            return Vec::new();
        };
        self.with_face(id, |parsed| {
            let mut names: Vec<String> = Vec::new();
            for name in parsed.names() {
                if name.name_id != ttf_parser::name_id::FAMILY {
                    continue;
                }
                let Some(text) = name.to_string() else {
                    continue;
                };
                let text = text.trim();
                let reported = info
                    .families
                    .iter()
                    .any(|(family, _)| family.eq_ignore_ascii_case(text));
                if !text.is_empty()
                    && !reported
                    && !names.iter().any(|n| n.eq_ignore_ascii_case(text))
                {
                    names.push(text.to_string());
                }
            }
            names
        })
        .unwrap_or_default()
    }

    fn with_face<T>(&self, id: ID, f: impl FnOnce(&ttf_parser::Face<'_>) -> T) -> Option<T> {
        self.db
            .with_face_data(id, |data, index| {
                ttf_parser::Face::parse(data, index).ok().map(|face| f(&face))
            })
            .flatten()
    }
}

impl FontEngine for FontdbEngine {
    type Face = FontdbFace;

    fn add_font_file(&mut self, path: &Path) -> Result<FontSourceId, FontError> {
        let data = fs::read(path).map_err(|source| FontError::Read {
            path: path.display().to_string(),
            source,
        })?;
        self.add_font_data(data).map_err(|err| match err {
            FontError::Unparseable { .. } => FontError::Unparseable {
                path: path.display().to_string(),
            },
            other => other,
        })
    }

    fn add_font_data(&mut self, data: Vec<u8>) -> Result<FontSourceId, FontError> {
        // Reject garbage up front; fontdb silently skips it.
        ttf_parser::Face::parse(&data, 0).map_err(|_| FontError::Unparseable {
            path: "(memory)".to_string(),
        })?;

        let ids = self.db.load_font_source(Source::Binary(Arc::new(data)));
        if ids.is_empty() {
            return Err(FontError::Unparseable {
                path: "(memory)".to_string(),
            });
        }

        for &id in ids.iter() {
            let legacy = self.legacy_families(id);
            if !legacy.is_empty() {
                log::debug!("Font: legacy families {legacy:?} for face {id:?}");
                self.legacy.push((id, legacy));
            }
        }

        self.sources.push(ids.iter().copied().collect());
        Ok(FontSourceId(self.sources.len() as u32 - 1))
    }

    fn source_families(&self, source: FontSourceId) -> Vec<String> {
        let Some(ids) = self.sources.get(source.0 as usize) else {
            return Vec::new();
        };

        let mut families: Vec<String> = Vec::new();
        for face in ids.iter().filter_map(|&id| self.db.face(id)) {
            for (name, _) in &face.families {
                if !families.contains(name) {
                    families.push(name.clone());
                }
            }
        }
        let legacy = self
            .legacy
            .iter()
            .filter(|(id, _)| ids.contains(id))
            .flat_map(|(_, names)| names);
        for name in legacy {
            if !families.contains(name) {
                families.push(name.clone());
            }
        }
        families
    }

    fn realize(&self, request: &FontRequest) -> Option<FontdbFace> {
        // fontdb has no rendering-quality notion; `request.quality` is unused.
        let weight = Weight(request.flags.weight());
        let style = if request.flags.contains(StyleFlags::ITALIC) {
            Style::Italic
        } else {
            Style::Normal
        };

        let (id, family) = self
            .family_chain(request)
            .into_iter()
            .find_map(|family| self.query_family(family, weight, style))
            .or_else(|| {
                let face = self.db.faces().next()?;
                Some((face.id, primary_family(face)))
            })?;

        Some(FontdbFace {
            id,
            pixel_size: request.pixel_size,
            flags: request.flags,
            family,
        })
    }

    fn resolved_family(&self, face: &FontdbFace) -> String {
        face.family.clone()
    }

    fn line_metrics(&self, face: &FontdbFace) -> LineMetrics {
        let px = f32::from(face.pixel_size);
        self.with_face(face.id, |parsed| {
            let scale = px / f32::from(parsed.units_per_em().max(1));
            let ascent = (f32::from(parsed.ascender()) * scale).ceil() as i32;
            let descent = (-f32::from(parsed.descender()) * scale).ceil() as i32;
            LineMetrics {
                height: ascent + descent,
                ascent,
                descent,
            }
        })
        .unwrap_or_default()
    }

    fn text_width(&self, face: &FontdbFace, text: &str) -> i32 {
        let px = f32::from(face.pixel_size);
        self.with_face(face.id, |parsed| {
            let scale = px / f32::from(parsed.units_per_em().max(1));
            let units: u64 = text
                .chars()
                .map(|ch| {
                    let gid = parsed.glyph_index(ch).unwrap_or(ttf_parser::GlyphId(0));
                    u64::from(parsed.glyph_hor_advance(gid).unwrap_or(0))
                })
                .sum();
            scale_to_px(units, scale)
        })
        .unwrap_or(0)
    }

    fn insert_substitutions(&mut self, family: &str, fallbacks: &[String]) {
        let entry = self
            .substitutions
            .entry(family.trim().to_lowercase())
            .or_default();
        for fallback in fallbacks {
            if !entry.contains(fallback) {
                entry.push(fallback.clone());
            }
        }
    }

    fn set_default_font(&mut self, family: &str) {
        self.default_family = Some(family.to_string());
    }
}

fn primary_family(face: &FaceInfo) -> String {
    face.families
        .first()
        .map(|(name, _)| name.clone())
        .unwrap_or_default()
}

/// `units * scale`, rounded and clamped to `i32`.
fn scale_to_px(units: u64, scale: f32) -> i32 {
    let px = (units as f64 * f64::from(scale)).round();
    px.clamp(0.0, f64::from(i32::MAX)) as i32
}

/// Maps CSS generic names to fontdb generics; everything else is a name.
fn to_fontdb_family(name: &str) -> Family<'_> {
    let name = name.trim();
    if name.eq_ignore_ascii_case("serif") {
        Family::Serif
    } else if name.eq_ignore_ascii_case("sans-serif") || name.eq_ignore_ascii_case("sans") {
        Family::SansSerif
    } else if name.eq_ignore_ascii_case("monospace") || name.eq_ignore_ascii_case("mono") {
        Family::Monospace
    } else {
        Family::Name(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_engine_realizes_nothing() {
        let engine = FontdbEngine::new();
        assert_eq!(engine.face_count(), 0);
        assert!(
            engine
                .realize(&FontRequest::new("Open Sans", 13, StyleFlags::empty()))
                .is_none()
        );
    }

    #[test]
    fn garbage_data_is_unparseable() {
        let mut engine = FontdbEngine::new();
        let err = engine.add_font_data(b"definitely not a font".to_vec()).unwrap_err();
        assert!(matches!(err, FontError::Unparseable { .. }));
        assert_eq!(engine.face_count(), 0);
    }

    #[test]
    fn missing_file_reports_read_error() {
        let mut engine = FontdbEngine::new();
        let err = engine
            .add_font_file(Path::new("/nonexistent/uifont/NoSuchFont.ttf"))
            .unwrap_err();
        assert!(matches!(err, FontError::Read { .. }));
    }

    #[test]
    fn unknown_source_has_no_families() {
        let engine = FontdbEngine::new();
        assert!(engine.source_families(FontSourceId(3)).is_empty());
    }

    #[test]
    fn substitutions_are_case_insensitive_and_deduplicated() {
        let mut engine = FontdbEngine::new();
        engine.insert_substitutions("Open Sans", &["Helvetica Neue".to_string()]);
        engine.insert_substitutions(
            "open sans",
            &["Helvetica Neue".to_string(), "Lucida Grande".to_string()],
        );
        assert_eq!(
            engine.substitutions(" OPEN SANS "),
            ["Helvetica Neue".to_string(), "Lucida Grande".to_string()]
        );
    }

    #[test]
    fn family_chain_orders_fallbacks() {
        let mut engine = FontdbEngine::new();
        engine.insert_substitutions("Open Sans", &["MS Shell Dlg 2".to_string()]);
        let request = FontRequest::new("Open Sans", 13, StyleFlags::MONOSPACE);

        let chain = engine.family_chain(&request);
        assert_eq!(
            chain,
            [
                Family::Monospace,
                Family::Name("Open Sans"),
                Family::Name("MS Shell Dlg 2"),
                Family::SansSerif,
            ]
        );
    }

    #[test]
    fn empty_family_uses_default_font() {
        let mut engine = FontdbEngine::new();
        engine.set_default_font("Open Sans");
        let request = FontRequest::new("", 13, StyleFlags::empty());
        assert_eq!(
            engine.family_chain(&request),
            [Family::Name("Open Sans"), Family::SansSerif]
        );
    }

    #[test]
    fn scaled_widths_clamp_to_i32() {
        assert_eq!(scale_to_px(0, 0.5), 0);
        assert_eq!(scale_to_px(2048 * 3, 13.0 / 2048.0), 39);
        assert_eq!(scale_to_px(u64::from(u32::MAX) * 4, 1.0), i32::MAX);
        assert_eq!(scale_to_px(u64::MAX, 2.0), i32::MAX);
    }

    #[test]
    fn system_fonts_measure_consistently() {
        let engine = FontdbEngine::with_system_fonts();
        // Minimal CI images may ship no fonts at all.
        if engine.face_count() == 0 {
            return;
        }

        let Some(face) = engine.realize(&FontRequest::new("sans-serif", 13, StyleFlags::empty()))
        else {
            return;
        };
        let metrics = engine.line_metrics(&face);
        assert_eq!(metrics.height, metrics.ascent + metrics.descent);

        let single = engine.text_width(&face, ".");
        let triple = engine.text_width(&face, "...");
        assert!((triple - 3 * single).abs() <= 2);
        assert_eq!(engine.text_width(&face, ""), 0);

        // Millions of glyphs sum past `u32` font units.
        let long = engine.text_width(&face, &"W".repeat(3_000_000));
        assert!(long >= 0);
        if single > 0 {
            assert!(long >= single);
        }
    }
}
