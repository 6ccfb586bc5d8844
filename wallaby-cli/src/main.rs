//! Wallaby renderer CLI
//!
//! A headless driver for the rendering pipeline, for testing and
//! debugging: parses a document, runs style, layout, and paint, and dumps
//! each stage. `--json` emits the visible display list as JSON for
//! machine consumers.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Parser;
use owo_colors::OwoColorize;
use wallaby_css::{ApproximateFontMetrics, FontCache, FontMetrics, PaintCommand};
use wallaby_html::print_tree;
use wallaby_renderer::{Document, FontdueFontMetrics, visible};

#[derive(Parser)]
#[command(name = "wallaby", about = "Headless markup renderer for testing and debugging")]
struct Args {
    /// Markup file to render.
    file: Option<PathBuf>,

    /// Render a literal markup string instead of a file.
    #[arg(long)]
    html: Option<String>,

    /// Render the input as literal text (view-source).
    #[arg(long)]
    view_source: bool,

    /// Extra style sheet file, applied after the document's own sheets.
    #[arg(long)]
    stylesheet: Option<PathBuf>,

    /// Layout width in pixels.
    #[arg(long, default_value_t = 800.0)]
    width: f32,

    /// Viewport height in pixels, for culling.
    #[arg(long, default_value_t = 600.0)]
    height: f32,

    /// Scroll offset in pixels.
    #[arg(long, default_value_t = 0.0)]
    scroll: f32,

    /// Font file (ttf/otf) for real text measurement; approximate metrics
    /// are used without one.
    #[arg(long)]
    font: Option<PathBuf>,

    /// Emit the visible display list as JSON.
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let markup = match (&args.file, &args.html) {
        (_, Some(html)) => html.clone(),
        (Some(path), None) => {
            fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?
        }
        (None, None) => bail!("provide a markup file or --html '<markup>'"),
    };

    let extra_sheet = args
        .stylesheet
        .as_ref()
        .map(|path| {
            fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
        })
        .transpose()?;
    let sheets: Vec<&str> = extra_sheet.as_deref().into_iter().collect();

    let mut document = if args.view_source {
        Document::load_view_source(&markup, args.width)
    } else {
        Document::load(&markup, &sheets, args.width)
    };

    let font_data = args
        .font
        .as_ref()
        .map(|path| fs::read(path).with_context(|| format!("reading {}", path.display())))
        .transpose()?;
    let approximate = ApproximateFontMetrics;
    let loaded;
    let metrics: &dyn FontMetrics = match &font_data {
        Some(data) => {
            loaded = FontdueFontMetrics::from_bytes(data)?;
            &loaded
        }
        None => &approximate,
    };
    let mut fonts = FontCache::new(metrics);
    document.render(&mut fonts);

    let commands = visible(document.display_list(), args.scroll, args.height);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&commands)?);
        return Ok(());
    }

    println!("{}", "=== Node Tree ===".bold());
    print_tree(document.dom(), document.dom().root(), 0);

    println!("\n{}", "=== Style Rules ===".bold());
    println!("{} rules", document.rules().len());

    println!("\n{}", "=== Layout ===".bold());
    println!("document height: {:.1}px", document.height());

    println!("\n{}", "=== Display List ===".bold());
    println!(
        "{} of {} commands in view",
        commands.len(),
        document.display_list().len()
    );
    for command in &commands {
        match command {
            PaintCommand::DrawText {
                rect, text, color, ..
            } => {
                println!(
                    "  text ({:.1}, {:.1}) {:>12} {:?}",
                    rect.x,
                    rect.y,
                    color.green(),
                    text
                );
            }
            PaintCommand::DrawRect { rect, color } => {
                println!(
                    "  rect ({:.1}, {:.1}) {:.1}x{:.1} {}",
                    rect.x,
                    rect.y,
                    rect.width,
                    rect.height,
                    color.cyan()
                );
            }
        }
    }

    Ok(())
}
