//! Font validation and custom font registration.
//!
//! Engines always fall back to *some* face, so "the font loaded" is not the
//! same as "the font we asked for is in use". After registering a file we
//! realize the family again and check:
//! - the engine resolved the same family name (trimmed, case-insensitive);
//! - the resulting face has a non-zero line height.
//!
//! Every failure is logged here as a `Font Error:` line and returned to the
//! caller. Nothing in this module touches the font cache.

use std::path::Path;

use crate::font::FontError;
use crate::font::engine::{FontEngine, FontRequest};
use crate::font::flags::StyleFlags;

/// Pixel size used when checking a freshly registered family.
pub const VALIDATION_PIXEL_SIZE: u16 = 13;

/// Compares family names the way font databases report them.
pub fn family_matches(resolved: &str, requested: &str) -> bool {
    resolved.trim().to_lowercase() == requested.trim().to_lowercase()
}

/// Checks that `family` with `flags` resolves to itself and is measurable.
pub fn validate_font<E: FontEngine>(
    engine: &E,
    family: &str,
    flags: StyleFlags,
) -> Result<(), FontError> {
    let request = FontRequest::new(family, VALIDATION_PIXEL_SIZE, flags);
    let Some(face) = engine.realize(&request) else {
        log::warn!("Font Error: could not resolve '{family}' font, got nothing.");
        return Err(FontError::Unrealizable {
            family: family.to_string(),
        });
    };

    let resolved = engine.resolved_family(&face);
    if !family_matches(&resolved, family) {
        log::warn!("Font Error: could not resolve '{family}' font, got '{resolved}'.");
        return Err(FontError::ResolutionMismatch {
            requested: family.to_string(),
            resolved,
        });
    }

    if engine.line_metrics(&face).height == 0 {
        log::warn!("Font Error: got a zero height in '{family}'.");
        return Err(FontError::ZeroHeight {
            family: family.to_string(),
        });
    }

    Ok(())
}

/// Adds `path` to the engine and checks it provides `family`.
pub fn load_custom_font<E: FontEngine>(
    engine: &mut E,
    path: &Path,
    family: &str,
    flags: StyleFlags,
) -> Result<(), FontError> {
    let source = engine.add_font_file(path).inspect_err(|err| {
        log::warn!("Font Error: could not add '{}': {err}", path.display());
    })?;

    let mut found = false;
    for loaded in engine.source_families(source) {
        log::info!("Font: from '{}' loaded '{}'", path.display(), loaded);
        found |= family_matches(&loaded, family);
    }
    if !found {
        log::warn!(
            "Font Error: could not locate '{family}' font in '{}'.",
            path.display()
        );
        return Err(FontError::MissingFamily {
            family: family.to_string(),
            path: path.display().to_string(),
        });
    }

    validate_font(engine, family, flags)
}
