//! Thin binary wrapper for inspecting a font setup.
//!
//! Runs the startup sequence for a platform, prints what got registered and
//! then the cached metrics of each `--font SIZE:FLAGS:FAMILY` request.
//!
//! Run:
//! - `cargo run -- --system-fonts --font "13::Open Sans" --font "16:BOLD:serif"`

use std::path::PathBuf;

use anyhow::{Context as _, bail};
use clap::Parser;

use uifont::{FontConfig, FontContext, FontdbEngine, Platform, StyleFlags};

#[derive(Parser)]
#[command(version, about = "Register fonts and inspect the interned font cache")]
struct Cli {
    /// TOML font configuration (defaults to the built-in table)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Platform table to use: windows, macos, linux or other
    #[arg(long)]
    platform: Option<Platform>,

    /// Directory holding the resource bundles
    #[arg(long, value_name = "DIR")]
    resources: Option<PathBuf>,

    /// Also load the fonts installed on this machine
    #[arg(long)]
    system_fonts: bool,

    /// Font to request, as SIZE:FLAGS:FAMILY (e.g. "13:BOLD | ITALIC:Open Sans")
    #[arg(long = "font", value_name = "SPEC")]
    fonts: Vec<String>,

    /// Text to measure with every requested font
    #[arg(long)]
    text: Option<String>,
}

fn parse_font_spec(spec: &str) -> anyhow::Result<(u16, StyleFlags, String)> {
    let mut parts = spec.splitn(3, ':');
    let (Some(size), Some(flags), Some(family)) = (parts.next(), parts.next(), parts.next()) else {
        bail!("font spec '{spec}' is not SIZE:FLAGS:FAMILY");
    };

    let size = size
        .trim()
        .parse::<u16>()
        .with_context(|| format!("invalid pixel size in '{spec}'"))?;
    let flags = bitflags::parser::from_str::<StyleFlags>(flags.trim())
        .map_err(|err| anyhow::anyhow!("invalid flags in '{spec}': {err}"))?;
    Ok((size, flags, family.trim().to_string()))
}

fn main() -> anyhow::Result<()> {
    // Keep logging setup in the binary so the library remains unopinionated.
    env_logger::init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => FontConfig::load(path)?,
        None => FontConfig::default(),
    };
    if let Some(root) = cli.resources {
        config.resource_root = root;
    }

    let mut engine = FontdbEngine::new();
    if cli.system_fonts {
        engine.load_system_fonts();
    }

    let platform = cli.platform.unwrap_or_else(Platform::current);
    let mut ctx = FontContext::new(engine, config, platform);

    let report = ctx.start().context("font context was already started")?;
    println!("platform: {platform}");
    println!("bundles: {}", report.bundles.join(", "));
    for (path, family) in &report.registered {
        println!("registered: {path} as '{family}'");
    }
    for failure in &report.failures {
        println!("failed: {}: {}", failure.subject, failure.error);
    }

    for spec in &cli.fonts {
        let (size, flags, family) = parse_font_spec(spec)?;
        let font = ctx
            .font(size, flags, &family)
            .with_context(|| format!("no font for '{spec}'"))?;
        let bold = ctx.bold(font, true)?;

        let data = ctx.data(font).context("font vanished from the cache")?;
        let m = data.metrics();
        println!(
            "{family} {size}px {flags:?} -> '{}': height {} ascent {} descent {} space {} elide {}",
            data.face().family(),
            m.height,
            m.ascent,
            m.descent,
            m.space_width,
            m.elide_width
        );
        if let Some(bold) = ctx.metrics(bold) {
            println!("  bold variant height {}", bold.height);
        }
        if let Some(text) = &cli.text {
            println!("  width of {text:?}: {}", ctx.width(font, text)?);
        }
    }

    ctx.shutdown();
    Ok(())
}
