use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use image_swatches::{build_report, config, validate_mime_type, BlendSpace, SwatchConfig, SwatchMode};
use std::fs;
use std::path::{Path, PathBuf};

/// Sample color swatches from images (native wrapper around the WASM library).
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// One or more input image paths (JPEG or PNG)
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// JSON config file; command-line flags override its values
    #[arg(long)]
    config: Option<PathBuf>,

    /// Grid side N (N×N swatches)
    #[arg(short = 'n', long)]
    resolution: Option<u32>,

    /// Sample window side in pixels, clamped per image
    #[arg(short, long)]
    sample_size: Option<u32>,

    /// Width images are normalized to before sampling (0 keeps native size)
    #[arg(short = 'w', long)]
    canonical_width: Option<u32>,

    /// Output layout
    #[arg(short, long, value_enum)]
    mode: Option<Mode>,

    /// Radius percentage where radial swatches fade out
    #[arg(long, default_value_t = config::DEFAULT_VANISHING_POINT)]
    vanishing_point: f64,

    /// Average in linear light instead of sRGB bytes
    #[arg(long)]
    linear: bool,

    /// Also extract this many dominant colors with k-means
    #[arg(short = 'k', long)]
    palette: Option<usize>,

    /// Write one JSON report per input into this directory instead of stdout
    #[arg(short = 'd', long)]
    out_dir: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Mode {
    Tiles,
    Radial,
    Bands,
}

fn build_config(args: &Args) -> Result<SwatchConfig> {
    let mut config = match &args.config {
        Some(path) => SwatchConfig::from_json_file(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => SwatchConfig::default(),
    };
    if let Some(n) = args.resolution {
        config.resolution = n;
    }
    if let Some(s) = args.sample_size {
        config.sample_size = s;
    }
    if let Some(w) = args.canonical_width {
        config.canonical_width = (w > 0).then_some(w);
    }
    if let Some(mode) = args.mode {
        config.mode = match mode {
            Mode::Tiles => SwatchMode::Tiles,
            Mode::Radial => SwatchMode::RadialGradient { vanishing_point: args.vanishing_point },
            Mode::Bands => SwatchMode::LinearBands,
        };
    }
    if args.linear {
        config.blend = BlendSpace::Linear;
    }
    config.validate()?;
    Ok(config)
}

/// MIME type the browser would report for this file, from its extension.
fn mime_for(path: &Path) -> &'static str {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .as_deref()
    {
        Some("jpg" | "jpeg" | "jfif") => "image/jpeg",
        Some("pjpeg") => "image/pjpeg",
        Some("png") => "image/png",
        _ => "application/octet-stream",
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    let config = build_config(&args)?;
    let mut sampler = config.sampler();

    for input in &args.inputs {
        if let Err(err) = validate_mime_type(mime_for(input)) {
            eprintln!("Skipping {}: {err}", input.display());
            continue;
        }
        let bytes = fs::read(input).with_context(|| format!("failed to read {}", input.display()))?;
        sampler
            .load_raster(&bytes)
            .with_context(|| format!("failed to decode {}", input.display()))?;
        let report = build_report(&sampler, &config).context("swatch sampling failed")?;

        let mut json = serde_json::to_value(&report)?;
        if let Some(k) = args.palette {
            let hex: Vec<String> = sampler.dominant_palette(k)?.iter().map(|c| c.to_hex()).collect();
            json["palette"] = serde_json::to_value(hex)?;
        }
        let rendered = serde_json::to_string_pretty(&json)?;

        match &args.out_dir {
            Some(dir) => {
                fs::create_dir_all(dir)?;
                let stem = input.file_stem().unwrap_or_default().to_string_lossy();
                let out_path = dir.join(format!("{stem}.json"));
                fs::write(&out_path, rendered)?;
                println!("Saved → {}", out_path.display());
            }
            None => println!("{rendered}"),
        }
    }

    Ok(())
}
