use anyhow::Context;
use clap::Parser;
use presentera_pptx::{convert_pptx, ConvertOptions};
use std::fs;
use std::path::PathBuf;

/// Converts a PowerPoint (.pptx) file into a Presentera JSON document.
#[derive(Parser, Debug)]
#[command(name = "pptx2json", version, about)]
struct Cli {
    /// Input .pptx file
    input: PathBuf,

    /// Output file; defaults to the input path with a .json extension
    #[arg(short, long)]
    output: Option<PathBuf>,

    #[arg(long, default_value_t = presentera_pptx::options::DEFAULT_CANVAS_WIDTH)]
    canvas_width: f64,

    #[arg(long, default_value_t = presentera_pptx::options::DEFAULT_CANVAS_HEIGHT)]
    canvas_height: f64,

    /// Re-render picture backgrounds as cover-fit PNGs
    #[arg(long)]
    rasterize_image_backgrounds: bool,

    /// Keep unfilled table cells white instead of the banded palette
    #[arg(long)]
    no_table_palette: bool,

    /// Write compact instead of pretty-printed JSON
    #[arg(long)]
    compact: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    let cli = Cli::parse();
    let options = ConvertOptions::builder()
        .canvas_size(cli.canvas_width, cli.canvas_height)
        .rasterize_image_backgrounds(cli.rasterize_image_backgrounds)
        .table_fallback_palette(!cli.no_table_palette)
        .build()
        .context("Invalid conversion options")?;

    log::info!("Converting {}", cli.input.display());
    let document = convert_pptx(&cli.input, &options)
        .with_context(|| format!("Failed to convert {}", cli.input.display()))?;
    let json = document.to_json_string(!cli.compact)?;

    let output = cli
        .output
        .unwrap_or_else(|| cli.input.with_extension("json"));
    fs::write(&output, json).with_context(|| format!("Unable to write {}", output.display()))?;
    log::info!(
        "Wrote {} slide(s) to {}",
        document.slides.len(),
        output.display()
    );
    Ok(())
}
