//! The font context: one owner for the engine, the family interner and the
//! font cache, with an explicit lifecycle.
//!
//! - `start()` runs the startup sequence once (bundles, bundled fonts,
//!   substitutions, default font).
//! - `font*()` / `with_flag()` hand out interned [`Font`] handles.
//! - `shutdown()` releases every cached font; family ids survive.
//!
//! Every mutating call takes `&mut self`, so all font work happens through
//! a single owner. Wrap the context in a `Mutex` to share it.

use std::path::{Path, PathBuf};

use crate::config::{FontConfig, Platform};
use crate::font::FontError;
use crate::font::cache::{Font, FontCache, FontData, FontMetrics};
use crate::font::db::FontdbEngine;
use crate::font::engine::FontEngine;
use crate::font::family::{FamilyId, FamilyInterner};
use crate::font::flags::StyleFlags;
use crate::font::resolve;
use crate::resources::ResourceRegistry;

/// One startup step that did not go through.
#[derive(Debug)]
pub struct StartupFailure {
    /// Bundle name, logical font path or substituted family.
    pub subject: String,
    pub error: FontError,
}

/// What the first `start()` call did.
#[derive(Debug, Default)]
pub struct StartupReport {
    pub platform: Option<Platform>,
    pub bundles: Vec<String>,
    /// `(logical path, family)` of bundled fonts that validated.
    pub registered: Vec<(String, String)>,
    /// Families that got a substitution chain.
    pub substituted: Vec<String>,
    pub default_family: String,
    pub failures: Vec<StartupFailure>,
}

impl StartupReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    fn fail(&mut self, subject: impl Into<String>, error: FontError) {
        self.failures.push(StartupFailure {
            subject: subject.into(),
            error,
        });
    }
}

pub struct FontContext<E: FontEngine = FontdbEngine> {
    engine: E,
    families: FamilyInterner,
    cache: FontCache<E::Face>,
    resources: ResourceRegistry,
    config: FontConfig,
    platform: Platform,
    started: bool,
}

impl FontContext<FontdbEngine> {
    /// Context over an empty `fontdb` database for the current platform.
    pub fn with_defaults(config: FontConfig) -> Self {
        Self::new(FontdbEngine::new(), config, Platform::current())
    }
}

impl<E: FontEngine> FontContext<E> {
    pub fn new(engine: E, config: FontConfig, platform: Platform) -> Self {
        Self {
            engine,
            families: FamilyInterner::new(),
            cache: FontCache::new(),
            resources: ResourceRegistry::new(config.resource_root.clone()),
            config,
            platform,
            started: false,
        }
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }

    pub fn families(&self) -> &FamilyInterner {
        &self.families
    }

    pub fn cache(&self) -> &FontCache<E::Face> {
        &self.cache
    }

    pub fn resources(&self) -> &ResourceRegistry {
        &self.resources
    }

    pub fn config(&self) -> &FontConfig {
        &self.config
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    /// Runs the startup sequence. Returns `None` if it already ran.
    ///
    /// Individual failures are logged and collected; the sequence always
    /// runs to the end.
    pub fn start(&mut self) -> Option<StartupReport> {
        if self.started {
            return None;
        }
        self.started = true;

        let platform_fonts = self.config.platform(self.platform).clone();
        let mut report = StartupReport {
            platform: Some(self.platform),
            ..Default::default()
        };

        let mut bundles = Vec::new();
        if !self.config.use_packaged_fonts {
            bundles.push(self.config.font_bundle.clone());
        }
        bundles.extend(platform_fonts.resource_bundles.iter().cloned());
        for bundle in bundles {
            match self.resources.init_bundle(&bundle) {
                Ok(()) => report.bundles.push(bundle),
                Err(err) => {
                    log::warn!("Font Error: {err}");
                    report.fail(bundle, err);
                }
            }
        }

        if !self.config.use_packaged_fonts {
            for font in &self.config.bundled_fonts {
                let logical = format!("{}{}", self.config.font_prefix, font.file);
                let family = self.config.bundled_family(self.platform, font);

                let result = self.resources.resolve(&logical).and_then(|path| {
                    resolve::load_custom_font(&mut self.engine, &path, family, font.flags)
                });
                match result {
                    Ok(()) => report.registered.push((logical, family.to_string())),
                    Err(err @ FontError::MissingResource(_)) => {
                        log::warn!("Font Error: {err}");
                        report.fail(logical, err);
                    }
                    // Already logged by `load_custom_font`.
                    Err(err) => report.fail(logical, err),
                }
            }
        }

        for (family, fallbacks) in &platform_fonts.substitutions {
            self.engine.insert_substitutions(family, fallbacks);
            report.substituted.push(family.clone());
        }

        self.engine.set_default_font(&self.config.default_family);
        report.default_family = self.config.default_family.clone();

        log::info!(
            "Font: started for {} ({} bundles, {} fonts registered, {} failures)",
            self.platform,
            report.bundles.len(),
            report.registered.len(),
            report.failures.len()
        );
        Some(report)
    }

    /// Releases every cached font. Handles issued so far become stale;
    /// family ids stay valid.
    pub fn shutdown(&mut self) {
        self.cache.clear();
    }

    /// Interns a family name.
    pub fn register_family(&mut self, family: &str) -> Result<FamilyId, FontError> {
        self.families.intern(family)
    }

    pub fn family_name(&self, id: FamilyId) -> Option<&str> {
        self.families.name(id)
    }

    /// Interned font for `(size, flags, family)`.
    pub fn font(&mut self, size: u16, flags: StyleFlags, family: &str) -> Result<Font, FontError> {
        let family = self.families.intern(family)?;
        self.font_by_id(size, flags, family)
    }

    pub fn font_by_id(
        &mut self,
        size: u16,
        flags: StyleFlags,
        family: FamilyId,
    ) -> Result<Font, FontError> {
        self.cache
            .get_or_create(&self.engine, &self.families, size, flags, family)
    }

    /// `font` with `flag` set or cleared.
    pub fn with_flag(&mut self, font: Font, flag: StyleFlags, set: bool) -> Result<Font, FontError> {
        self.cache
            .with_flag(&self.engine, &self.families, font, flag, set)
    }

    pub fn bold(&mut self, font: Font, set: bool) -> Result<Font, FontError> {
        self.with_flag(font, StyleFlags::BOLD, set)
    }

    pub fn italic(&mut self, font: Font, set: bool) -> Result<Font, FontError> {
        self.with_flag(font, StyleFlags::ITALIC, set)
    }

    pub fn underline(&mut self, font: Font, set: bool) -> Result<Font, FontError> {
        self.with_flag(font, StyleFlags::UNDERLINE, set)
    }

    pub fn strikeout(&mut self, font: Font, set: bool) -> Result<Font, FontError> {
        self.with_flag(font, StyleFlags::STRIKE_OUT, set)
    }

    pub fn semibold(&mut self, font: Font, set: bool) -> Result<Font, FontError> {
        self.with_flag(font, StyleFlags::SEMIBOLD, set)
    }

    pub fn monospace(&mut self, font: Font, set: bool) -> Result<Font, FontError> {
        self.with_flag(font, StyleFlags::MONOSPACE, set)
    }

    pub fn data(&self, font: Font) -> Option<&FontData<E::Face>> {
        self.cache.get(font)
    }

    pub fn metrics(&self, font: Font) -> Option<FontMetrics> {
        self.cache.get(font).map(FontData::metrics)
    }

    /// Horizontal advance of `text` in `font`.
    pub fn width(&self, font: Font, text: &str) -> Result<i32, FontError> {
        let data = self.cache.get(font).ok_or(FontError::StaleFont)?;
        Ok(self.engine.text_width(data.face(), text))
    }

    /// Registers a font file outside the startup sequence. `path` may be a
    /// logical `:/...` path into an initialized bundle.
    pub fn load_custom_font(
        &mut self,
        path: impl AsRef<Path>,
        family: &str,
        flags: StyleFlags,
    ) -> Result<(), FontError> {
        let path = self.resolve_path(path.as_ref())?;
        resolve::load_custom_font(&mut self.engine, &path, family, flags)
    }

    pub fn validate_font(&self, family: &str, flags: StyleFlags) -> Result<(), FontError> {
        resolve::validate_font(&self.engine, family, flags)
    }

    fn resolve_path(&self, path: &Path) -> Result<PathBuf, FontError> {
        match path.to_str() {
            Some(logical) => self.resources.resolve(logical),
            None => Ok(path.to_path_buf()),
        }
    }
}
