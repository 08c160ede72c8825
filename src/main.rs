// ABOUTME: Main entry point for the pptreport program.
// ABOUTME: Provides CLI interface and executes commands from the library.

use clap::{ArgAction, Args, Parser, Subcommand};
use log::info;
use pptreport::{
    lay_out, Diagnostics, PageExtractor, PopplerExtractor, PptxConfig, PptxRenderer, ReportConfig,
};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Increase logging verbosity (-v for info, -vv for debug)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a PPTX report from a JSON configuration
    Build(BuildArgs),

    /// Print the computed slide layout as JSON without writing a report
    Plan(PlanArgs),
}

#[derive(Args)]
struct BuildArgs {
    /// Path to the JSON configuration file
    #[arg(short, long)]
    config: PathBuf,

    /// Path to the output PPTX file
    #[arg(short, long)]
    output: PathBuf,

    /// Document title stored in the file properties
    #[arg(long)]
    title: Option<String>,

    /// Draw an outline around every content box
    #[arg(long)]
    show_borders: bool,

    /// Directory for images of converted PDF pages
    #[arg(long)]
    pdf_dir: Option<PathBuf>,
}

#[derive(Args)]
struct PlanArgs {
    /// Path to the JSON configuration file
    #[arg(short, long)]
    config: PathBuf,

    /// Convert PDF pages into this directory so they are laid out page by page
    #[arg(long)]
    pdf_dir: Option<PathBuf>,
}

fn main() {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let result = match &cli.command {
        Commands::Build(args) => build(args),
        Commands::Plan(args) => plan(args),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn build(args: &BuildArgs) -> anyhow::Result<()> {
    let report = ReportConfig::from_file(&args.config)?.to_report()?;

    let pdf_dir = args
        .pdf_dir
        .clone()
        .unwrap_or_else(|| default_pdf_dir(&args.output));
    let extractor = PopplerExtractor::new(pdf_dir);

    let mut diagnostics = Diagnostics::new();
    let plan = lay_out(&report, Some(&extractor as &dyn PageExtractor), &mut diagnostics)?;

    let title = args.title.clone().unwrap_or_else(|| {
        args.output
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "Report".to_string())
    });
    let mut renderer = PptxRenderer::new(PptxConfig {
        title,
        size: report.size,
        show_borders: args.show_borders,
    });
    pptreport::report::render(&plan, &mut renderer)?;
    renderer.finish(&args.output)?;

    info!("{} warnings", diagnostics.len());
    println!(
        "Created {} with {} slides",
        args.output.display(),
        plan.slides.len()
    );
    Ok(())
}

fn plan(args: &PlanArgs) -> anyhow::Result<()> {
    let report = ReportConfig::from_file(&args.config)?.to_report()?;

    let extractor = args.pdf_dir.clone().map(PopplerExtractor::new);
    let pages = extractor.as_ref().map(|e| e as &dyn PageExtractor);

    let mut diagnostics = Diagnostics::new();
    let plan = lay_out(&report, pages, &mut diagnostics)?;
    println!("{}", serde_json::to_string_pretty(&plan)?);
    Ok(())
}

/// Page images go next to the report unless a directory is given.
fn default_pdf_dir(output: &Path) -> PathBuf {
    let stem = output
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "report".to_string());
    output.with_file_name(format!("{}_pdf_pages", stem))
}
