//! pagegrid CLI - page content to grid reconstruction tool

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use pagegrid::{
    load_file, render, ContentNode, Document, GridOptions, JsonFormat, PageSelection, Workbook,
};

#[derive(Parser)]
#[command(name = "pagegrid")]
#[command(version)]
#[command(about = "Rebuild spreadsheet grids from page content", long_about = None)]
struct Cli {
    /// Input content file (JSON)
    #[arg(value_name = "FILE")]
    input: Option<PathBuf>,

    /// Output directory
    #[arg(value_name = "OUTPUT")]
    output: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Build grids and write all formats (JSON, text)
    Convert {
        /// Input content file (JSON)
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output directory
        #[arg(short, long, value_name = "DIR")]
        output: Option<PathBuf>,

        #[command(flatten)]
        grid: GridArgs,
    },

    /// Build grids and write JSON
    Json {
        /// Input content file (JSON)
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Output compact JSON
        #[arg(long)]
        compact: bool,

        #[command(flatten)]
        grid: GridArgs,
    },

    /// Build grids and write tab-separated text
    Text {
        /// Input content file (JSON)
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        #[command(flatten)]
        grid: GridArgs,
    },

    /// Show document information
    Info {
        /// Input content file (JSON)
        #[arg(value_name = "FILE")]
        input: PathBuf,
    },

    /// Show version information
    Version,
}

/// Grid construction flags shared by the building commands.
#[derive(Args, Default)]
struct GridArgs {
    /// Page range (e.g., "1-10", "1,3,5")
    #[arg(long)]
    pages: Option<String>,

    /// Combine all pages into one sheet
    #[arg(long)]
    single_sheet: bool,

    /// Vertical distance within which fragments share a row
    #[arg(long, value_name = "UNITS")]
    row_tolerance: Option<f64>,

    /// Horizontal distance within which fragments share a column
    #[arg(long, value_name = "UNITS")]
    column_tolerance: Option<f64>,

    /// Minimum columns for a positional row to stay tabular
    #[arg(long, value_name = "N")]
    tabular_threshold: Option<usize>,

    /// Build pages one at a time
    #[arg(long)]
    sequential: bool,
}

impl GridArgs {
    fn to_options(&self) -> Result<GridOptions, Box<dyn std::error::Error>> {
        let mut options = GridOptions::new();
        if let Some(p) = &self.pages {
            options = options.with_pages(PageSelection::parse(p)?);
        }
        if let Some(tolerance) = self.row_tolerance {
            options = options.with_row_tolerance(tolerance);
        }
        if let Some(tolerance) = self.column_tolerance {
            options = options.with_column_tolerance(tolerance);
        }
        if let Some(threshold) = self.tabular_threshold {
            options = options.with_tabular_threshold(threshold);
        }
        if self.single_sheet {
            options = options.single_sheet();
        }
        if self.sequential {
            options = options.sequential();
        }
        options.validate()?;
        Ok(options)
    }
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let result = match cli.command {
        Some(Commands::Convert {
            input,
            output,
            grid,
        }) => cmd_convert(&input, output.as_deref(), &grid),
        Some(Commands::Json {
            input,
            output,
            compact,
            grid,
        }) => cmd_json(&input, output.as_deref(), compact, &grid),
        Some(Commands::Text {
            input,
            output,
            grid,
        }) => cmd_text(&input, output.as_deref(), &grid),
        Some(Commands::Info { input }) => cmd_info(&input),
        Some(Commands::Version) => {
            cmd_version();
            Ok(())
        }
        None => {
            // Default behavior: convert if input is provided
            if let Some(input) = cli.input {
                cmd_convert(&input, cli.output.as_deref(), &GridArgs::default())
            } else {
                println!("{}", "Usage: pagegrid <FILE> [OUTPUT]".yellow());
                println!("       pagegrid --help for more information");
                Ok(())
            }
        }
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn build(input: &Path, grid: &GridArgs) -> Result<Workbook, Box<dyn std::error::Error>> {
    let options = grid.to_options()?;
    let doc = load_file(input)?;
    log::debug!("Loaded {} pages from {}", doc.page_count(), input.display());
    let workbook = pagegrid::convert(&doc, &options)?;
    report_diagnostics(&workbook);
    Ok(workbook)
}

fn report_diagnostics(workbook: &Workbook) {
    for sheet in &workbook.sheets {
        for diagnostic in &sheet.diagnostics {
            eprintln!("{} {}: {}", "warning:".yellow().bold(), sheet.name, diagnostic);
        }
    }
}

fn write_or_print(output: Option<&Path>, content: &str) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(path) = output {
        fs::write(path, content)?;
        println!("{} {}", "Saved to".green(), path.display());
    } else {
        println!("{}", content);
    }
    Ok(())
}

fn cmd_convert(
    input: &Path,
    output: Option<&Path>,
    grid: &GridArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let output_dir = output.map(|p| p.to_path_buf()).unwrap_or_else(|| {
        let stem = input.file_stem().unwrap_or_default().to_string_lossy();
        PathBuf::from(format!("{}_grid", stem))
    });

    fs::create_dir_all(&output_dir)?;

    let pb = ProgressBar::new(3);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {msg}")?
            .progress_chars("#>-"),
    );

    pb.set_message("Building grids...");
    let workbook = build(input, grid)?;
    pb.inc(1);

    pb.set_message("Generating JSON...");
    let json = render::to_json(&workbook, JsonFormat::Pretty)?;
    fs::write(output_dir.join("grid.json"), &json)?;
    pb.inc(1);

    pb.set_message("Generating text...");
    let text = render::to_text(&workbook);
    fs::write(output_dir.join("grid.txt"), &text)?;
    pb.inc(1);

    pb.finish_with_message("Done!");

    println!("\n{}", "Output files:".green().bold());
    println!("  {} grid.json", "├─".dimmed());
    println!("  {} grid.txt", "└─".dimmed());
    println!(
        "{} sheets, {} warnings",
        workbook.sheet_count(),
        workbook.diagnostic_count()
    );

    Ok(())
}

fn cmd_json(
    input: &Path,
    output: Option<&Path>,
    compact: bool,
    grid: &GridArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let workbook = build(input, grid)?;

    let format = if compact {
        JsonFormat::Compact
    } else {
        JsonFormat::Pretty
    };

    let json = render::to_json(&workbook, format)?;
    write_or_print(output, &json)
}

fn cmd_text(
    input: &Path,
    output: Option<&Path>,
    grid: &GridArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let workbook = build(input, grid)?;
    let text = render::to_text(&workbook);
    write_or_print(output, &text)
}

fn cmd_info(input: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let doc = load_file(input)?;

    println!("{}", "Document Information".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    println!("{}: {}", "File".bold(), input.display());
    println!("{}: {}", "Pages".bold(), doc.page_count());
    if let Some(ref title) = doc.title {
        println!("{}: {}", "Title".bold(), title);
    }

    println!();
    println!("{}", "Content Statistics".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    let stats = ContentStats::of(&doc);
    println!("{}: {}", "Blocks".bold(), stats.blocks);
    println!("{}: {}", "Tables".bold(), stats.tables);
    println!("{}: {}", "Lists".bold(), stats.lists);
    println!("{}: {}", "Headings".bold(), stats.headings);
    println!("{}: {}", "Fragments".bold(), stats.fragments);

    Ok(())
}

#[derive(Default)]
struct ContentStats {
    blocks: usize,
    tables: usize,
    lists: usize,
    headings: usize,
    fragments: usize,
}

impl ContentStats {
    fn of(doc: &Document) -> Self {
        let mut stats = Self::default();
        for page in &doc.pages {
            stats.blocks += page.blocks.len();
            stats.fragments += page.fragment_count();
            for block in &page.blocks {
                match block {
                    ContentNode::Table(_) => stats.tables += 1,
                    ContentNode::List(_) => stats.lists += 1,
                    ContentNode::Heading { .. } => stats.headings += 1,
                    _ => {}
                }
            }
        }
        stats
    }
}

fn cmd_version() {
    println!("{} {}", "pagegrid".cyan().bold(), env!("CARGO_PKG_VERSION"));
    println!("Page content to grid reconstruction tool");
    println!();
    println!("License: MIT");
}
