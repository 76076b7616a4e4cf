//! Paper Editor CLI
//!
//! Runs the pagination and export pipeline headlessly on an HTML file. The
//! main interface is through the WASM bindings.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use paper_editor::export::{export_pdf, SkiaRasterizer, EXPORT_SCALE};
use paper_editor::layout::{compute_page_breaks, EstimatingOracle, PageFormat};
use paper_editor::{render_preview, Document};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "paper-editor")]
#[command(about = "Paged rich-text editor core", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show where live pagination would break the document
    Paginate {
        /// Input HTML file
        input: PathBuf,

        /// Page format (a4, letter)
        #[arg(short, long, default_value = "a4")]
        format: PageFormat,
    },

    /// Split the document into preview pages
    Preview {
        /// Input HTML file
        input: PathBuf,

        /// Page format (a4, letter)
        #[arg(short, long, default_value = "a4")]
        format: PageFormat,

        /// Print the pages as JSON
        #[arg(long)]
        json: bool,
    },

    /// Export the document as a PDF
    Export {
        /// Input HTML file
        input: PathBuf,

        /// Output PDF file
        #[arg(short, long)]
        output: PathBuf,

        /// Page format (a4, letter)
        #[arg(short, long, default_value = "a4")]
        format: PageFormat,

        /// Device pixel ratio of the page images
        #[arg(short, long, default_value_t = EXPORT_SCALE)]
        scale: f32,
    },
}

fn main() {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Paginate { input, format } => run_paginate(&input, format),
        Commands::Preview {
            input,
            format,
            json,
        } => run_preview(&input, format, json),
        Commands::Export {
            input,
            output,
            format,
            scale,
        } => run_export(&input, &output, format, scale),
    };

    if let Err(e) = result {
        error!("{:#}", e);
        std::process::exit(1);
    }
}

fn read_input(input: &Path) -> Result<String> {
    fs::read_to_string(input).with_context(|| format!("reading {}", input.display()))
}

fn run_paginate(input: &Path, format: PageFormat) -> Result<()> {
    let html = read_input(input)?;
    let doc = Document::from_html(&html).context("parsing document")?;
    let dims = format.dimensions();
    let oracle = EstimatingOracle::new(dims.usable_width());

    let state = compute_page_breaks(&doc, &oracle, &dims);
    println!("{} page(s), {} block(s)", state.page_count, doc.block_count());
    for marker in &state.markers {
        println!(
            "  page {} ends at position {} (before block {})",
            marker.page_number,
            marker.pos,
            marker
                .block_id
                .map_or_else(|| "?".to_string(), |id| id.0.to_string())
        );
    }
    Ok(())
}

fn run_preview(input: &Path, format: PageFormat, json: bool) -> Result<()> {
    let html = read_input(input)?;
    let pages = render_preview(&html, format);

    if json {
        println!("{}", serde_json::to_string_pretty(&pages)?);
        return Ok(());
    }

    for page in &pages {
        println!("--- page {} / {} ---", page.number, page.total);
        println!("{}", page.content);
    }
    Ok(())
}

fn run_export(input: &Path, output: &Path, format: PageFormat, scale: f32) -> Result<()> {
    let html = read_input(input)?;
    let dims = format.dimensions();

    let bytes = export_pdf(&html, &dims, &mut SkiaRasterizer::new(), scale)
        .context("exporting PDF")?;
    fs::write(output, &bytes).with_context(|| format!("writing {}", output.display()))?;

    info!(
        output = %output.display(),
        bytes = bytes.len(),
        "PDF written"
    );
    Ok(())
}
