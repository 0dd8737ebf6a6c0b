//! Interned font objects.
//!
//! The cache owns every [`FontData`] it creates and hands out [`Font`]
//! handles. Equal keys always yield the same handle; equal handles always
//! refer to the same object. Entries live until [`FontCache::clear`], which
//! drops all of them at once and invalidates every outstanding handle.

use std::collections::HashMap;

use crate::font::FontError;
use crate::font::engine::{FontEngine, FontRequest};
use crate::font::family::{FamilyId, FamilyInterner};
use crate::font::flags::StyleFlags;
use crate::font::key::{FontKey, MAX_PIXEL_SIZE, VARIANT_SLOTS};

/// Copyable handle to a cached font.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Font {
    slot: u32,
    generation: u32,
}

/// Metrics measured once when a font is created.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FontMetrics {
    pub height: i32,
    pub ascent: i32,
    pub descent: i32,
    /// Width of a single space.
    pub space_width: i32,
    /// Width of the `"..."` elision marker.
    pub elide_width: i32,
}

type VariantTable = [Option<Font>; VARIANT_SLOTS];

/// One cached font. Immutable apart from its variant table.
#[derive(Debug)]
pub struct FontData<F> {
    key: FontKey,
    face: F,
    metrics: FontMetrics,
    /// Siblings reachable by toggling flags, indexed by flag bits.
    variants: VariantTable,
}

impl<F> FontData<F> {
    fn realize<E>(engine: &E, key: FontKey, family_name: &str) -> Result<Self, FontError>
    where
        E: FontEngine<Face = F>,
    {
        let request = FontRequest::new(family_name, key.size(), key.flags());
        let face = engine
            .realize(&request)
            .ok_or_else(|| FontError::Unrealizable {
                family: family_name.to_string(),
            })?;

        let line = engine.line_metrics(&face);
        let metrics = FontMetrics {
            height: line.height,
            ascent: line.ascent,
            descent: line.descent,
            space_width: engine.text_width(&face, " "),
            elide_width: engine.text_width(&face, "..."),
        };

        Ok(Self {
            key,
            face,
            metrics,
            variants: [None; VARIANT_SLOTS],
        })
    }

    #[inline]
    pub fn key(&self) -> FontKey {
        self.key
    }

    #[inline]
    pub fn size(&self) -> u16 {
        self.key.size()
    }

    #[inline]
    pub fn flags(&self) -> StyleFlags {
        self.key.flags()
    }

    #[inline]
    pub fn family(&self) -> FamilyId {
        self.key.family()
    }

    #[inline]
    pub fn metrics(&self) -> FontMetrics {
        self.metrics
    }

    /// The engine face backing this font.
    #[inline]
    pub fn face(&self) -> &F {
        &self.face
    }

    /// Variant already linked for `flags`, if any.
    #[inline]
    pub fn variant(&self, flags: StyleFlags) -> Option<Font> {
        self.variants[flags.slot()]
    }
}

/// Owning table of interned fonts.
#[derive(Debug)]
pub struct FontCache<F> {
    entries: Vec<FontData<F>>,
    by_key: HashMap<FontKey, Font>,
    generation: u32,
}

impl<F> Default for FontCache<F> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            by_key: HashMap::new(),
            generation: 0,
        }
    }
}

impl<F> FontCache<F> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Resolves a handle; `None` for handles issued before the last `clear`.
    pub fn get(&self, font: Font) -> Option<&FontData<F>> {
        if font.generation != self.generation {
            return None;
        }
        self.entries.get(font.slot as usize)
    }

    pub fn lookup(&self, key: FontKey) -> Option<Font> {
        self.by_key.get(&key).copied()
    }

    /// Returns the font for `(size, flags, family)`, creating it on first use.
    pub fn get_or_create<E>(
        &mut self,
        engine: &E,
        families: &FamilyInterner,
        size: u16,
        flags: StyleFlags,
        family: FamilyId,
    ) -> Result<Font, FontError>
    where
        E: FontEngine<Face = F>,
    {
        let key = make_key(size, flags, family)?;
        self.find_or_insert(engine, families, key, None)
    }

    /// Returns `font` with `flag` set or cleared.
    ///
    /// The source's variant table is consulted first; on a miss the global
    /// table is, and the result is linked back into the source.
    pub fn with_flag<E>(
        &mut self,
        engine: &E,
        families: &FamilyInterner,
        font: Font,
        flag: StyleFlags,
        set: bool,
    ) -> Result<Font, FontError>
    where
        E: FontEngine<Face = F>,
    {
        let source = self.get(font).ok_or(FontError::StaleFont)?;
        let flags = source.flags().toggled(flag, set);
        if let Some(variant) = source.variant(flags) {
            return Ok(variant);
        }

        let key = make_key(source.size(), flags, source.family())?;
        let inherited = source.variants;
        let variant = self.find_or_insert(engine, families, key, Some(&inherited))?;

        self.entries[font.slot as usize].variants[flags.slot()] = Some(variant);
        Ok(variant)
    }

    /// Drops every cached font. Outstanding handles become stale.
    pub fn clear(&mut self) {
        if !self.entries.is_empty() {
            log::debug!("Font: releasing {} cached fonts", self.entries.len());
        }
        self.entries.clear();
        self.by_key.clear();
        self.generation = self.generation.wrapping_add(1);
    }

    fn find_or_insert<E>(
        &mut self,
        engine: &E,
        families: &FamilyInterner,
        key: FontKey,
        inherited: Option<&VariantTable>,
    ) -> Result<Font, FontError>
    where
        E: FontEngine<Face = F>,
    {
        if let Some(font) = self.lookup(key) {
            return Ok(font);
        }

        let family_name = families
            .name(key.family())
            .ok_or(FontError::UnknownFamily(key.family()))?;
        let mut data = FontData::realize(engine, key, family_name)?;

        let font = Font {
            slot: next_slot(self.entries.len())?,
            generation: self.generation,
        };
        if let Some(inherited) = inherited {
            data.variants = *inherited;
        }
        data.variants[key.flags().slot()] = Some(font);

        log::debug!(
            "Font: cached '{}' {}px {:?} (height {})",
            family_name,
            key.size(),
            key.flags(),
            data.metrics.height
        );

        self.entries.push(data);
        self.by_key.insert(key, font);
        Ok(font)
    }
}

fn next_slot(len: usize) -> Result<u32, FontError> {
    u32::try_from(len).map_err(|_| FontError::CacheFull(len))
}

fn make_key(size: u16, flags: StyleFlags, family: FamilyId) -> Result<FontKey, FontError> {
    FontKey::new(size, flags, family).ok_or(FontError::SizeOutOfRange {
        size,
        max: MAX_PIXEL_SIZE,
    })
}
