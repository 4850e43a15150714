//! pageflow CLI - paginate rich-text HTML and export it

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use chrono::Utc;
use clap::{Args, Parser, Subcommand, ValueEnum};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use log::debug;

use pageflow::flow::FlowReport;
use pageflow::parser::parse_html;
use pageflow::writer::{JsonWriter, TextWriter};
use pageflow::{
    EditorSession, ExportDocument, ExportOptions, JsonFormat, MetricsOracle, PageGeometry,
    ParseOptions, StyleSheet, WriterRegistry,
};

#[derive(Parser)]
#[command(name = "pageflow")]
#[command(author = "iyulab")]
#[command(version)]
#[command(about = "Paginate rich-text HTML and export it line by line", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show where page breaks fall
    Paginate {
        /// Input HTML file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Print the pagination report as JSON
        #[arg(long)]
        json: bool,

        #[command(flatten)]
        layout: LayoutArgs,
    },

    /// Export to a document file
    Export {
        /// Input HTML file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Output format; defaults to the output file's extension
        #[arg(short, long, value_enum)]
        format: Option<OutputFormat>,

        /// Output compact JSON
        #[arg(long)]
        compact: bool,

        /// Document title
        #[arg(long)]
        title: Option<String>,

        /// Maximum list nesting depth
        #[arg(long, default_value = "9")]
        max_depth: u8,

        #[command(flatten)]
        layout: LayoutArgs,
    },

    /// Print the exported lines with page break markers
    Preview {
        /// Input HTML file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Include YAML frontmatter
        #[arg(short, long)]
        frontmatter: bool,

        #[command(flatten)]
        layout: LayoutArgs,
    },

    /// Write pagination report, JSON and text exports into a directory
    All {
        /// Input HTML file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output directory
        #[arg(short, long, value_name = "DIR")]
        output: Option<PathBuf>,

        #[command(flatten)]
        layout: LayoutArgs,
    },

    /// Show document information
    Info {
        /// Input HTML file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        #[command(flatten)]
        layout: LayoutArgs,
    },

    /// Show version information
    Version,
}

/// Parsing and page layout flags shared by every command.
#[derive(Args, Clone)]
struct LayoutArgs {
    /// Recover from malformed markup
    #[arg(long)]
    lenient: bool,

    /// Page height in pixels
    #[arg(long, default_value = "1122")]
    page_height: f64,

    /// Page margin in pixels
    #[arg(long, default_value = "96")]
    margin: f64,

    /// Gap between pages in pixels
    #[arg(long, default_value = "76")]
    gap: f64,

    /// Content width in pixels
    #[arg(long, default_value = "643")]
    width: f64,

    /// Body font size in pixels
    #[arg(long, default_value = "16")]
    font_size: f64,

    /// Font file to measure text with (default: a system serif font)
    #[arg(long, value_name = "FILE", env = "PAGEFLOW_FONT")]
    font: Option<PathBuf>,
}

impl LayoutArgs {
    fn geometry(&self) -> PageGeometry {
        PageGeometry::new()
            .with_page_height(self.page_height)
            .with_margin(self.margin)
            .with_gap(self.gap)
    }

    fn parse_options(&self) -> ParseOptions {
        let stylesheet = StyleSheet::default()
            .with_content_width(self.width)
            .with_font(self.font_size, "serif");
        let options = ParseOptions::new().with_stylesheet(stylesheet);
        if self.lenient {
            options.lenient()
        } else {
            options
        }
    }

    fn oracle(&self) -> pageflow::Result<MetricsOracle> {
        match &self.font {
            Some(path) => MetricsOracle::from_font_file(path),
            None => Ok(MetricsOracle::detect()),
        }
    }
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// Export model as JSON
    Json,
    /// Plain text lines
    Text,
}

impl OutputFormat {
    fn extension(self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Text => "txt",
        }
    }
}

type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Paginate {
            input,
            json,
            layout,
        } => cmd_paginate(&input, json, &layout),
        Commands::Export {
            input,
            output,
            format,
            compact,
            title,
            max_depth,
            layout,
        } => cmd_export(
            &input,
            output.as_deref(),
            format,
            compact,
            title,
            max_depth,
            &layout,
        ),
        Commands::Preview {
            input,
            frontmatter,
            layout,
        } => cmd_preview(&input, frontmatter, &layout),
        Commands::All {
            input,
            output,
            layout,
        } => cmd_all(&input, output.as_deref(), &layout),
        Commands::Info { input, layout } => cmd_info(&input, &layout),
        Commands::Version => {
            cmd_version();
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

/// Parse `input` and paginate it until stable.
fn open_session(
    input: &Path,
    layout: &LayoutArgs,
    export: ExportOptions,
) -> CliResult<(EditorSession<MetricsOracle>, FlowReport)> {
    let html = fs::read_to_string(input)?;
    let doc = parse_html(&html, &layout.parse_options())?;

    let mut session = EditorSession::new(doc, layout.geometry()).with_export_options(export);
    session.bind_oracle(layout.oracle()?);
    let report = session.settle(Instant::now())?;
    debug!(
        "{}: {} blocks, {} page breaks",
        input.display(),
        session.document().blocks.len(),
        report.decorations.len()
    );
    Ok((session, report))
}

fn default_export_options(input: &Path) -> ExportOptions {
    let mut options = ExportOptions::new().with_created(Utc::now());
    if let Some(stem) = input.file_stem() {
        options = options.with_title(stem.to_string_lossy());
    }
    options
}

fn emit(output: Option<&Path>, content: &str) -> CliResult<()> {
    if let Some(path) = output {
        pageflow::writer::save_as(content.as_bytes(), path)?;
        println!("{} {}", "Saved to".green(), path.display());
    } else {
        println!("{}", content);
    }
    Ok(())
}

fn cmd_paginate(input: &Path, json: bool, layout: &LayoutArgs) -> CliResult<()> {
    let (session, report) = open_session(input, layout, ExportOptions::default())?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("{}", "Page Breaks".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    if report.crossings.is_empty() {
        println!("{}", "No block crosses a page boundary".dimmed());
    }
    for crossing in &report.crossings {
        println!(
            "{} {} {} {}",
            format!("p{}→p{}", crossing.start_page + 1, crossing.end_page + 1).yellow(),
            crossing.node_id.to_string().bold(),
            format!("+{}px", crossing.margin_to_fix).green(),
            format!("\"{}\"", crossing.preview).dimmed(),
        );
    }

    println!();
    println!("{}: {}", "Pages".bold(), session.page_count()?);
    println!("{}: {}", "Blocks".bold(), report.visited);
    if report.stale > 0 {
        println!("{}: {}", "Stale".yellow().bold(), report.stale);
    }

    Ok(())
}

fn cmd_export(
    input: &Path,
    output: Option<&Path>,
    format: Option<OutputFormat>,
    compact: bool,
    title: Option<String>,
    max_depth: u8,
    layout: &LayoutArgs,
) -> CliResult<()> {
    let mut options = default_export_options(input).with_max_nesting_depth(max_depth);
    if let Some(title) = title {
        options = options.with_title(title);
    }

    let (mut session, _) = open_session(input, layout, options)?;
    let doc = session.export()?;

    let format = format.or_else(|| {
        output
            .and_then(|p| p.extension())
            .and_then(|e| e.to_str())
            .and_then(|e| match e.to_lowercase().as_str() {
                "json" => Some(OutputFormat::Json),
                "txt" | "text" => Some(OutputFormat::Text),
                _ => None,
            })
    });

    match (format, output) {
        (Some(OutputFormat::Json), _) if compact => {
            emit(output, &JsonWriter::new(JsonFormat::Compact).to_string(&doc)?)
        }
        (Some(format), _) => {
            let bytes = WriterRegistry::with_defaults().write(&doc, format.extension())?;
            emit(output, &String::from_utf8_lossy(&bytes))
        }
        (None, Some(path)) => {
            // Let the registry reject or serve the extension.
            let written = WriterRegistry::with_defaults().write_to_path(&doc, path)?;
            println!("{} {} ({} bytes)", "Saved to".green(), path.display(), written);
            Ok(())
        }
        (None, None) => emit(None, &JsonWriter::new(JsonFormat::Pretty).to_string(&doc)?),
    }
}

fn cmd_preview(input: &Path, frontmatter: bool, layout: &LayoutArgs) -> CliResult<()> {
    let (mut session, _) = open_session(input, layout, default_export_options(input))?;
    let doc = session.export()?;
    println!("{}", TextWriter::new().with_frontmatter(frontmatter).render(&doc));
    Ok(())
}

fn cmd_all(input: &Path, output: Option<&Path>, layout: &LayoutArgs) -> CliResult<()> {
    let output_dir = output.map(|p| p.to_path_buf()).unwrap_or_else(|| {
        let stem = input.file_stem().unwrap_or_default().to_string_lossy();
        PathBuf::from(format!("{}_output", stem))
    });

    fs::create_dir_all(&output_dir)?;

    let pb = ProgressBar::new(4);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {msg}")?
            .progress_chars("#>-"),
    );

    pb.set_message("Paginating...");
    let (mut session, report) = open_session(input, layout, default_export_options(input))?;
    fs::write(
        output_dir.join("pagination.json"),
        serde_json::to_string_pretty(&report)?,
    )?;
    pb.inc(1);

    pb.set_message("Assembling export...");
    let doc: ExportDocument = session.export()?;
    pb.inc(1);

    pb.set_message("Writing JSON...");
    let registry = WriterRegistry::with_defaults();
    registry.write_to_path(&doc, &output_dir.join("export.json"))?;
    pb.inc(1);

    pb.set_message("Writing text...");
    let text = TextWriter::new().with_frontmatter(true).render(&doc);
    fs::write(output_dir.join("export.txt"), text)?;
    pb.inc(1);

    pb.finish_with_message("Done!");

    println!("\n{}", "Output files:".green().bold());
    println!("  {} pagination.json", "├─".dimmed());
    println!("  {} export.json", "├─".dimmed());
    println!("  {} export.txt", "└─".dimmed());

    Ok(())
}

fn cmd_info(input: &Path, layout: &LayoutArgs) -> CliResult<()> {
    let (mut session, report) = open_session(input, layout, default_export_options(input))?;
    let geometry = *session.geometry();

    println!("{}", "Document Information".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    println!("{}: {}", "File".bold(), input.display());
    println!("{}: {}", "Blocks".bold(), session.document().blocks.len());
    println!("{}: {}", "Pages".bold(), session.page_count()?);
    println!("{}: {}", "Page breaks".bold(), report.decorations.len());
    println!(
        "{}: {}px (margin {}px, gap {}px)",
        "Page height".bold(),
        geometry.page_height_px,
        geometry.page_margin_px,
        geometry.page_gap_px
    );

    let doc = session.export()?;
    let text = doc.plain_text();

    println!();
    println!("{}", "Export Statistics".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    println!("{}: {}", "Exported blocks".bold(), doc.block_count());
    println!("{}: {}", "Paragraphs".bold(), doc.paragraphs().count());
    println!("{}: {}", "Words".bold(), text.split_whitespace().count());
    println!("{}: {}", "Characters".bold(), text.chars().count());

    Ok(())
}

fn cmd_version() {
    println!("{} {}", "pageflow".cyan().bold(), env!("CARGO_PKG_VERSION"));
    println!("library {}", pageflow::VERSION);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout() -> LayoutArgs {
        LayoutArgs {
            lenient: false,
            page_height: 1122.0,
            margin: 96.0,
            gap: 76.0,
            width: 643.0,
            font_size: 16.0,
            font: None,
        }
    }

    #[test]
    fn test_layout_args_defaults_match_library() {
        assert_eq!(layout().geometry(), PageGeometry::default());
        assert!(!layout().parse_options().is_lenient());
    }

    #[test]
    fn test_missing_font_file_fails() {
        let mut args = layout();
        args.font = Some(PathBuf::from("/no/such/font.ttf"));
        assert!(args.oracle().is_err());
    }

    #[test]
    fn test_open_session_and_emit() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("note.html");
        fs::write(&input, "<p>Hello</p><ul><li>item</li></ul>").unwrap();

        let (mut session, report) =
            open_session(&input, &layout(), default_export_options(&input)).unwrap();
        assert!(report.decorations.is_empty());

        let doc = session.export().unwrap();
        assert_eq!(doc.metadata.title.as_deref(), Some("note"));

        let output = dir.path().join("out").join("note.txt");
        emit(Some(&output), &TextWriter::new().render(&doc)).unwrap();
        assert_eq!(fs::read_to_string(&output).unwrap(), "Hello\n\u{25CF} item\n");
    }
}
