//! Startup configuration.
//!
//! Which resource bundles to initialize, which bundled font files to
//! register and which family substitutions to install depends on the
//! platform. Instead of compile-time branching this is a table selected at
//! runtime by a [`Platform`] tag, so every platform's behavior can be
//! exercised on any host.
//!
//! `FontConfig::default()` is the built-in table. A TOML file can override
//! any part of it; keys it leaves out keep their defaults.

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::font::StyleFlags;

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid font config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("unknown platform '{0}' (expected windows, macos, linux or other)")]
    UnknownPlatform(String),
}

/// Runtime platform tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Windows,
    MacOs,
    Linux,
    Other,
}

impl Platform {
    /// Platform the crate was built for.
    pub fn current() -> Self {
        if cfg!(target_os = "windows") {
            Self::Windows
        } else if cfg!(target_os = "macos") {
            Self::MacOs
        } else if cfg!(target_os = "linux") {
            Self::Linux
        } else {
            Self::Other
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Windows => "windows",
            Self::MacOs => "macos",
            Self::Linux => "linux",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Platform {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "windows" | "win" => Ok(Self::Windows),
            "macos" | "mac" => Ok(Self::MacOs),
            "linux" => Ok(Self::Linux),
            "other" => Ok(Self::Other),
            _ => Err(ConfigError::UnknownPlatform(s.to_string())),
        }
    }
}

/// A font file shipped inside the font bundle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BundledFont {
    /// File name below [`FontConfig::font_prefix`].
    pub file: String,
    /// Family the file is expected to provide.
    pub family: String,
    #[serde(default)]
    pub flags: StyleFlags,
}

impl BundledFont {
    pub fn new(file: &str, family: &str, flags: StyleFlags) -> Self {
        Self {
            file: file.to_string(),
            family: family.to_string(),
            flags,
        }
    }
}

/// Per-platform part of the table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlatformFonts {
    /// Extra resource bundles initialized after the font bundle.
    pub resource_bundles: Vec<String>,
    /// Family -> fallbacks, installed into the engine at startup.
    pub substitutions: BTreeMap<String, Vec<String>>,
    /// Bundled file name -> family it registers under on this platform.
    pub family_overrides: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlatformTable {
    pub windows: PlatformFonts,
    pub macos: PlatformFonts,
    pub linux: PlatformFonts,
    pub other: PlatformFonts,
}

impl PlatformTable {
    pub fn get(&self, platform: Platform) -> &PlatformFonts {
        match platform {
            Platform::Windows => &self.windows,
            Platform::MacOs => &self.macos,
            Platform::Linux => &self.linux,
            Platform::Other => &self.other,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FontConfig {
    /// Family installed as the engine's default font.
    pub default_family: String,
    /// Fonts come from the system; skip the font bundle entirely.
    pub use_packaged_fonts: bool,
    /// Directory holding one subdirectory per resource bundle.
    pub resource_root: PathBuf,
    /// Bundle carrying the bundled font files.
    pub font_bundle: String,
    /// Logical path prefix of bundled font files.
    pub font_prefix: String,
    pub bundled_fonts: Vec<BundledFont>,
    pub platforms: PlatformTable,
}

impl Default for FontConfig {
    fn default() -> Self {
        let open_sans = "Open Sans";
        let bundled_fonts = vec![
            BundledFont::new("OpenSans-Regular.ttf", open_sans, StyleFlags::empty()),
            BundledFont::new("OpenSans-Italic.ttf", open_sans, StyleFlags::ITALIC),
            BundledFont::new("OpenSans-Bold.ttf", open_sans, StyleFlags::BOLD),
            BundledFont::new(
                "OpenSans-BoldItalic.ttf",
                open_sans,
                StyleFlags::BOLD | StyleFlags::ITALIC,
            ),
            BundledFont::new("OpenSans-Semibold.ttf", open_sans, StyleFlags::SEMIBOLD),
            BundledFont::new(
                "OpenSans-SemiboldItalic.ttf",
                open_sans,
                StyleFlags::SEMIBOLD | StyleFlags::ITALIC,
            ),
        ];

        let windows = PlatformFonts {
            resource_bundles: vec!["win".to_string()],
            substitutions: BTreeMap::from([(
                open_sans.to_string(),
                vec!["MS Shell Dlg 2".to_string()],
            )]),
            // GDI exposes the semibold cut as its own family.
            family_overrides: ["OpenSans-Semibold.ttf", "OpenSans-SemiboldItalic.ttf"]
                .into_iter()
                .map(|file| (file.to_string(), "Open Sans Semibold".to_string()))
                .collect(),
        };
        let macos = PlatformFonts {
            resource_bundles: vec!["mac".to_string()],
            substitutions: BTreeMap::from([(
                open_sans.to_string(),
                ["STIXGeneral", ".SF NS Text", "Helvetica Neue", "Lucida Grande"]
                    .map(String::from)
                    .to_vec(),
            )]),
            family_overrides: BTreeMap::new(),
        };
        let linux = PlatformFonts {
            resource_bundles: vec!["linux".to_string()],
            ..Default::default()
        };

        Self {
            default_family: open_sans.to_string(),
            use_packaged_fonts: false,
            resource_root: PathBuf::from("resources"),
            font_bundle: "fonts".to_string(),
            font_prefix: ":/gui/fonts/".to_string(),
            bundled_fonts,
            platforms: PlatformTable {
                windows,
                macos,
                linux,
                other: PlatformFonts::default(),
            },
        }
    }
}

impl FontConfig {
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    pub fn platform(&self, platform: Platform) -> &PlatformFonts {
        self.platforms.get(platform)
    }

    /// Family `font` registers under on `platform`.
    pub fn bundled_family<'a>(&'a self, platform: Platform, font: &'a BundledFont) -> &'a str {
        self.platform(platform)
            .family_overrides
            .get(&font.file)
            .map(String::as_str)
            .unwrap_or(&font.family)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_table_registers_six_open_sans_cuts() {
        let config = FontConfig::default();
        assert_eq!(config.bundled_fonts.len(), 6);
        assert!(config.bundled_fonts.iter().all(|f| f.family == "Open Sans"));
        assert_eq!(config.default_family, "Open Sans");
    }

    #[test]
    fn windows_renames_semibold_family() {
        let config = FontConfig::default();
        let semibold = &config.bundled_fonts[4];
        assert_eq!(
            config.bundled_family(Platform::Windows, semibold),
            "Open Sans Semibold"
        );
        assert_eq!(config.bundled_family(Platform::Linux, semibold), "Open Sans");
        assert_eq!(
            config.bundled_family(Platform::Windows, &config.bundled_fonts[0]),
            "Open Sans"
        );
    }

    #[test]
    fn mac_substitution_chain_keeps_order() {
        let config = FontConfig::default();
        let chain = &config.platform(Platform::MacOs).substitutions["Open Sans"];
        assert_eq!(
            chain,
            &["STIXGeneral", ".SF NS Text", "Helvetica Neue", "Lucida Grande"]
        );
        assert!(config.platform(Platform::Linux).substitutions.is_empty());
    }

    #[test]
    fn toml_overrides_merge_with_defaults() {
        let config = FontConfig::from_toml_str(
            r#"
            default_family = "Inter"
            use_packaged_fonts = true

            [[bundled_fonts]]
            file = "Inter-Bold.ttf"
            family = "Inter"
            flags = "BOLD | ITALIC"

            [platforms.linux]
            substitutions = { "Inter" = ["DejaVu Sans"] }
            "#,
        )
        .unwrap();

        assert_eq!(config.default_family, "Inter");
        assert!(config.use_packaged_fonts);
        assert_eq!(config.font_bundle, "fonts");
        assert_eq!(
            config.bundled_fonts,
            [BundledFont::new(
                "Inter-Bold.ttf",
                "Inter",
                StyleFlags::BOLD | StyleFlags::ITALIC
            )]
        );
        assert_eq!(
            config.platform(Platform::Linux).substitutions["Inter"],
            ["DejaVu Sans"]
        );
        // Keys left out of a given platform table are empty, not built-in.
        assert!(config.platform(Platform::Linux).resource_bundles.is_empty());
    }

    #[test]
    fn bundled_font_flags_default_to_empty() {
        let config = FontConfig::from_toml_str(
            r#"
            [[bundled_fonts]]
            file = "Plain.ttf"
            family = "Plain"
            "#,
        )
        .unwrap();
        assert!(config.bundled_fonts[0].flags.is_empty());
    }

    #[test]
    fn rejects_malformed_toml() {
        let err = FontConfig::from_toml_str("default_family = [").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn platform_names_round_trip() {
        for platform in [
            Platform::Windows,
            Platform::MacOs,
            Platform::Linux,
            Platform::Other,
        ] {
            assert_eq!(platform.as_str().parse::<Platform>().unwrap(), platform);
        }
        assert!("beos".parse::<Platform>().is_err());
    }
}
