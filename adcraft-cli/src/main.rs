use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use adcraft::{
    BrandProfile, BrandStyle, CreativeSpec, Format, FsFetcher, InMemoryBrandStore, Layout,
    Pipeline, PipelineConfig, ReferenceMetadata, Rgb8, SubjectRef,
};

/// Workspace id the CLI registers its command-line brand under.
const CLI_WORKSPACE: &str = "cli";

#[derive(Parser, Debug)]
#[command(name = "adcraft", version)]
struct Cli {
    /// Pipeline config JSON. Defaults apply when omitted.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log filter (`info`, `debug`, `adcraft=trace`, ...). `RUST_LOG` wins when set.
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Analyze reference images and print one JSON style profile per input.
    Analyze(AnalyzeArgs),
    /// Render a branded creative and print the result JSON.
    Render(RenderArgs),
    /// Inspect or empty the render cache.
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },
}

#[derive(Parser, Debug)]
struct AnalyzeArgs {
    /// Image paths, relative to the configured content root.
    #[arg(required = true)]
    images: Vec<String>,

    #[arg(long, default_value = "")]
    title: String,

    #[arg(long, default_value = "")]
    description: String,

    /// Repeatable.
    #[arg(long = "tag")]
    tags: Vec<String>,

    #[arg(long)]
    platform: Option<String>,
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Subject image path, relative to the configured content root.
    #[arg(long)]
    subject: String,

    #[arg(long, default_value = "square")]
    format: Format,

    #[arg(long, default_value = "center-focus")]
    layout: Layout,

    #[arg(long, default_value = "")]
    caption: String,

    #[arg(long, value_parser = parse_color)]
    primary: Option<Rgb8>,

    #[arg(long, value_parser = parse_color)]
    secondary: Option<Rgb8>,

    #[arg(long, value_parser = parse_color)]
    accent: Option<Rgb8>,

    #[arg(long)]
    heading_font: Option<String>,

    #[arg(long)]
    body_font: Option<String>,

    #[arg(long, default_value_t = false)]
    watermark: bool,

    /// JPEG quality, 1..=100.
    #[arg(long, default_value_t = 90)]
    quality: u8,
}

#[derive(Subcommand, Debug)]
enum CacheAction {
    /// Print cache counters as JSON.
    Stats,
    /// Remove every entry from both tiers.
    Clear,
}

fn parse_color(s: &str) -> Result<Rgb8, String> {
    Rgb8::from_hex(s).map_err(|e| e.to_string())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_level)?;

    let config = match &cli.config {
        Some(path) => PipelineConfig::from_path(path)?,
        None => PipelineConfig::default(),
    };

    match cli.cmd {
        Command::Analyze(args) => cmd_analyze(config, args),
        Command::Render(args) => cmd_render(config, args),
        Command::Cache { action } => cmd_cache(config, action),
    }
}

fn init_logging(level: &str) -> anyhow::Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(f) => f,
        Err(_) => EnvFilter::try_new(level).with_context(|| format!("invalid log level '{level}'"))?,
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}

fn cmd_analyze(config: PipelineConfig, args: AnalyzeArgs) -> anyhow::Result<()> {
    let pipeline = Pipeline::from_config(config)?;
    let meta = ReferenceMetadata {
        title: args.title,
        description: args.description,
        tags: args.tags,
        platform: args.platform,
    };
    let refs: Vec<(String, ReferenceMetadata)> = args
        .images
        .into_iter()
        .map(|uri| (uri, meta.clone()))
        .collect();

    let analyses = pipeline.analyze_references(&refs);
    for ((uri, _), analysis) in refs.iter().zip(&analyses) {
        let line = serde_json::json!({ "image": uri, "analysis": analysis });
        println!("{}", serde_json::to_string(&line)?);
    }
    Ok(())
}

fn cmd_render(config: PipelineConfig, args: RenderArgs) -> anyhow::Result<()> {
    let defaults = BrandStyle::default();
    let style = BrandStyle {
        primary_color: args.primary.unwrap_or(defaults.primary_color),
        secondary_color: args.secondary.unwrap_or(defaults.secondary_color),
        accent_color: args.accent.unwrap_or(defaults.accent_color),
        heading_font: args.heading_font.unwrap_or(defaults.heading_font),
        body_font: args.body_font.unwrap_or(defaults.body_font),
    };
    let brands = Arc::new(InMemoryBrandStore::new());
    brands.insert(
        CLI_WORKSPACE,
        BrandProfile {
            style,
            segmentation_model: None,
        },
    );

    let fetcher = Arc::new(FsFetcher::new(config.content_root.clone()));
    let pipeline = Pipeline::new(config, fetcher, brands)?;
    let spec = CreativeSpec {
        format: args.format,
        layout: args.layout,
        caption: args.caption,
        watermark: args.watermark,
        quality: args.quality,
    };
    let result = pipeline.render_for_workspace(CLI_WORKSPACE, &SubjectRef::new(args.subject), &spec)?;

    println!("{}", serde_json::to_string_pretty(&result)?);
    eprintln!("wrote {}", result.image_ref);
    Ok(())
}

fn cmd_cache(config: PipelineConfig, action: CacheAction) -> anyhow::Result<()> {
    if config.cache.dir.is_none() {
        tracing::warn!("no cache dir configured; only this process's memory tier is visible");
    }
    let pipeline = Pipeline::from_config(config)?;
    match action {
        CacheAction::Stats => {
            let cache = pipeline.cache();
            let report = serde_json::json!({
                "memory": cache.stats(),
                "durableEntries": cache.durable_entry_count(),
            });
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        CacheAction::Clear => {
            pipeline.cache().clear();
            eprintln!("cache cleared");
        }
    }
    Ok(())
}
