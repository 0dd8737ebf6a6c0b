//! Test double for `FontEngine`.
//!
//! "Font files" are identified by file name only; the engine is told up
//! front which families each one provides. Realization resolves a family if
//! some added file provided it (directly or through a substitution), and
//! falls back to `Fallback Sans` otherwise. Calls are counted so tests can
//! check what reached the engine.

#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use uifont::font::{FontEngine, FontRequest, FontSourceId, LineMetrics};
use uifont::{FontConfig, FontError, StyleFlags};

pub const FALLBACK_FAMILY: &str = "Fallback Sans";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FakeFace {
    pub family: String,
    pub pixel_size: u16,
    pub flags: StyleFlags,
}

#[derive(Default)]
pub struct RecordingEngine {
    files: HashMap<String, Vec<String>>,
    zero_height: HashSet<String>,
    sources: Vec<Vec<String>>,
    known: Vec<String>,
    substitutions: Vec<(String, Vec<String>)>,
    default_font: Option<String>,
    pub added_files: Vec<PathBuf>,
    realize_calls: Cell<usize>,
    last_request: RefCell<Option<FontRequest>>,
}

impl RecordingEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Engine that knows the six bundled Open Sans files.
    pub fn with_open_sans() -> Self {
        FontConfig::default()
            .bundled_fonts
            .iter()
            .fold(Self::new(), |engine, font| {
                engine.with_file(&font.file, &["Open Sans"])
            })
    }

    pub fn with_file(mut self, file_name: &str, families: &[&str]) -> Self {
        self.files.insert(
            file_name.to_string(),
            families.iter().map(|f| f.to_string()).collect(),
        );
        self
    }

    pub fn with_zero_height(mut self, family: &str) -> Self {
        self.zero_height.insert(family.to_lowercase());
        self
    }

    pub fn realize_calls(&self) -> usize {
        self.realize_calls.get()
    }

    pub fn last_request(&self) -> Option<FontRequest> {
        self.last_request.borrow().clone()
    }

    pub fn substitutions(&self) -> &[(String, Vec<String>)] {
        &self.substitutions
    }

    pub fn default_font(&self) -> Option<&str> {
        self.default_font.as_deref()
    }

    fn known(&self, family: &str) -> Option<&str> {
        self.known
            .iter()
            .find(|k| k.trim().eq_ignore_ascii_case(family.trim()))
            .map(String::as_str)
    }

    fn register_source(&mut self, families: Vec<String>) -> FontSourceId {
        for family in &families {
            if !self.known.contains(family) {
                self.known.push(family.clone());
            }
        }
        self.sources.push(families);
        FontSourceId(self.sources.len() as u32 - 1)
    }
}

impl FontEngine for RecordingEngine {
    type Face = FakeFace;

    fn add_font_file(&mut self, path: &Path) -> Result<FontSourceId, FontError> {
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default();
        let Some(families) = self.files.get(name).cloned() else {
            return Err(FontError::Unparseable {
                path: path.display().to_string(),
            });
        };
        self.added_files.push(path.to_path_buf());
        Ok(self.register_source(families))
    }

    fn add_font_data(&mut self, data: Vec<u8>) -> Result<FontSourceId, FontError> {
        let text = String::from_utf8(data).map_err(|_| FontError::Unparseable {
            path: "(memory)".to_string(),
        })?;
        let families = text.lines().map(str::to_string).collect();
        Ok(self.register_source(families))
    }

    fn source_families(&self, source: FontSourceId) -> Vec<String> {
        self.sources
            .get(source.0 as usize)
            .cloned()
            .unwrap_or_default()
    }

    fn realize(&self, request: &FontRequest) -> Option<FakeFace> {
        self.realize_calls.set(self.realize_calls.get() + 1);
        *self.last_request.borrow_mut() = Some(request.clone());

        let requested = if request.family.trim().is_empty() {
            self.default_font.clone().unwrap_or_default()
        } else {
            request.family.clone()
        };

        let chain = std::iter::once(requested.clone()).chain(
            self.substitutions
                .iter()
                .filter(|(family, _)| family.eq_ignore_ascii_case(&requested))
                .flat_map(|(_, fallbacks)| fallbacks.iter().cloned()),
        );
        let family = chain
            .filter_map(|candidate| self.known(&candidate).map(str::to_string))
            .next()
            .unwrap_or_else(|| FALLBACK_FAMILY.to_string());

        Some(FakeFace {
            family,
            pixel_size: request.pixel_size,
            flags: request.flags,
        })
    }

    fn resolved_family(&self, face: &FakeFace) -> String {
        face.family.clone()
    }

    fn line_metrics(&self, face: &FakeFace) -> LineMetrics {
        if self.zero_height.contains(&face.family.to_lowercase()) {
            return LineMetrics::default();
        }
        let ascent = i32::from(face.pixel_size);
        let descent = i32::from(face.pixel_size) / 4;
        LineMetrics {
            height: ascent + descent,
            ascent,
            descent,
        }
    }

    fn text_width(&self, face: &FakeFace, text: &str) -> i32 {
        let advance = i32::from(face.pixel_size) / 2
            + i32::from(face.flags.contains(StyleFlags::BOLD));
        advance * text.chars().count() as i32
    }

    fn insert_substitutions(&mut self, family: &str, fallbacks: &[String]) {
        self.substitutions
            .push((family.to_string(), fallbacks.to_vec()));
    }

    fn set_default_font(&mut self, family: &str) {
        self.default_font = Some(family.to_string());
    }
}

/// Resource root with the font bundle (holding every bundled file) and
/// the named extra bundles as empty directories.
pub fn resource_root(extra_bundles: &[&str]) -> tempfile::TempDir {
    let dir = tempfile::tempdir().expect("create resource root");
    let fonts = dir.path().join("fonts/gui/fonts");
    fs::create_dir_all(&fonts).expect("create font bundle");
    for font in &FontConfig::default().bundled_fonts {
        fs::write(fonts.join(&font.file), b"").expect("write bundled font");
    }
    for bundle in extra_bundles {
        fs::create_dir_all(dir.path().join(bundle)).expect("create bundle");
    }
    dir
}

pub fn config_at(root: &Path) -> FontConfig {
    FontConfig {
        resource_root: root.to_path_buf(),
        ..FontConfig::default()
    }
}
