mod catalog;

use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use hexthumb_core::{normalize, LayoutConfig, LayoutPreset, MediaRecord};
use hexthumb_render::font::FontRole;
use hexthumb_render::{FontBook, HttpFetcher, ImageFetcher, OfflineFetcher, ThumbnailRenderer};

#[derive(Parser)]
#[command(
    name = "hexthumb",
    version,
    about = "hexthumb: anime promo thumbnails from catalog metadata",
    long_about = "Render 1280x720 promotional thumbnails for anime titles.\nMetadata comes from a local JSON record or an AniList lookup; the poster is\nclipped into a honeycomb of hexagons over a generated background."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a thumbnail to PNG
    Render {
        /// Path to an AniList-shaped Media JSON record
        #[arg(long, conflicts_with = "query", required_unless_present = "query")]
        record: Option<PathBuf>,

        /// Title to look up in the AniList catalog
        #[arg(long)]
        query: Option<String>,

        /// Built-in layout preset: classic, cards, pills
        #[arg(long, conflicts_with = "config")]
        preset: Option<String>,

        /// Layout config file (TOML)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Directory scanned for .ttf/.otf fonts
        #[arg(long, env = "HEXTHUMB_FONTS_DIR", default_value = "fonts")]
        fonts: PathBuf,

        /// Output file path, or `-` for stdout
        #[arg(short, long, default_value = "thumbnail.png")]
        output: PathBuf,

        /// Never fetch the poster; always use the placeholder
        #[arg(long)]
        offline: bool,
    },

    /// Look up a title and print its normalized metadata as JSON
    Search {
        /// Title to look up
        #[arg()]
        title: String,

        /// Layout preset whose text budgets apply
        #[arg(long)]
        preset: Option<String>,
    },

    /// List the built-in layout presets
    Presets,

    /// Print a preset's full layout config as TOML
    DumpConfig {
        /// Preset to dump (default: classic)
        #[arg(long)]
        preset: Option<String>,
    },

    /// Show which font file serves each text role
    Fonts {
        /// Directory scanned for .ttf/.otf fonts
        #[arg(long, env = "HEXTHUMB_FONTS_DIR", default_value = "fonts")]
        fonts: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // stdout may carry PNG bytes, so logs always go to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Render {
            record,
            query,
            preset,
            config,
            fonts,
            output,
            offline,
        } => cmd_render(
            record.as_deref(),
            query.as_deref(),
            preset.as_deref(),
            config.as_deref(),
            &fonts,
            &output,
            offline,
        ),
        Commands::Search { title, preset } => cmd_search(&title, preset.as_deref()),
        Commands::Presets => cmd_presets(),
        Commands::DumpConfig { preset } => cmd_dump_config(preset.as_deref()),
        Commands::Fonts { fonts } => cmd_fonts(&fonts),
    }
}

fn resolve_preset(name: Option<&str>) -> Result<LayoutPreset> {
    match name {
        Some(name) => Ok(name.parse::<LayoutPreset>()?),
        None => Ok(LayoutPreset::default()),
    }
}

fn resolve_config(preset: Option<&str>, config: Option<&Path>) -> Result<LayoutConfig> {
    match config {
        Some(path) => LayoutConfig::load_from_file(path)
            .with_context(|| format!("failed to load layout config: {}", path.display())),
        None => Ok(LayoutConfig::preset(resolve_preset(preset)?)),
    }
}

fn load_record(record: Option<&Path>, query: Option<&str>) -> Result<MediaRecord> {
    match (record, query) {
        (Some(path), _) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read record: {}", path.display()))?;
            MediaRecord::from_json(&json)
                .with_context(|| format!("record is not valid JSON: {}", path.display()))
        }
        (None, Some(title)) => catalog::Catalog::new()?.search(title),
        (None, None) => anyhow::bail!("either --record or --query is required"),
    }
}

fn cmd_render(
    record: Option<&Path>,
    query: Option<&str>,
    preset: Option<&str>,
    config: Option<&Path>,
    fonts_dir: &Path,
    output: &Path,
    offline: bool,
) -> Result<()> {
    let start = Instant::now();

    let config = resolve_config(preset, config)?;
    // Poster paths in a local record file are the caller's own; catalog
    // records may only point at HTTP URLs.
    let local_posters = record.is_some();
    let record = load_record(record, query)?;
    let fonts = FontBook::load(fonts_dir);

    let http;
    let fetcher: &dyn ImageFetcher = if offline {
        &OfflineFetcher
    } else {
        http = HttpFetcher::new(Duration::from_secs(config.fetch_timeout_secs))?
            .with_local_files(local_posters);
        &http
    };

    let thumbnail = ThumbnailRenderer::new(&config, &fonts, fetcher)
        .render(&record)
        .context("render failed")?;

    if output == Path::new("-") {
        let mut stdout = std::io::stdout().lock();
        stdout
            .write_all(&thumbnail.png)
            .and_then(|_| stdout.flush())
            .context("failed to write PNG to stdout")?;
    } else {
        if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        std::fs::write(output, &thumbnail.png)
            .with_context(|| format!("failed to write {}", output.display()))?;
        eprintln!(
            "Rendered {} ({}x{}, {} bytes) in {:.2?}",
            output.display(),
            thumbnail.width,
            thumbnail.height,
            thumbnail.png.len(),
            start.elapsed()
        );
    }

    Ok(())
}

fn cmd_search(title: &str, preset: Option<&str>) -> Result<()> {
    let config = LayoutConfig::preset(resolve_preset(preset)?);
    let record = catalog::Catalog::new()?.search(title)?;
    let metadata = normalize(&record, &config);
    println!("{}", serde_json::to_string_pretty(&metadata)?);
    Ok(())
}

fn cmd_presets() -> Result<()> {
    for preset in LayoutPreset::ALL {
        println!("{}", preset);
    }
    Ok(())
}

fn cmd_dump_config(preset: Option<&str>) -> Result<()> {
    let config = LayoutConfig::preset(resolve_preset(preset)?);
    print!("{}", config.to_toml_string()?);
    Ok(())
}

fn cmd_fonts(fonts_dir: &Path) -> Result<()> {
    let fonts = FontBook::load(fonts_dir);
    println!("Fonts directory: {}", fonts_dir.display());
    for role in FontRole::ALL {
        match fonts.source(role) {
            Some(path) => println!("  {:<8} {}", role.to_string(), path.display()),
            None => println!("  {:<8} (built-in bitmap font)", role.to_string()),
        }
    }
    Ok(())
}
