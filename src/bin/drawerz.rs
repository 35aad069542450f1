use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand};

use drawerz::{
    Canvas, CpuRenderer, DirDownloader, Document, EngineConfig, ExportFormat, History,
    LogNotifier, Rng64, Session, StrokeColor,
};

#[derive(Parser, Debug)]
#[command(name = "drawerz", version)]
struct Cli {
    /// Engine config JSON. `DRAWERZ_*` environment variables override it.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a sketch at one instant as a PNG.
    Frame(FrameArgs),
    /// Export a sketch as an animation (MP4 requires `ffmpeg`).
    Export(ExportArgs),
    /// Convert SVG shapes into sketch strokes.
    ImportSvg(ImportSvgArgs),
    /// Print a layer and stroke summary.
    Info(InfoArgs),
}

#[derive(Parser, Debug)]
struct FrameArgs {
    /// Input `.drz` sketch.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Live clock value, in ticks.
    #[arg(long, default_value_t = 0.0)]
    time: f64,

    /// Output size as WIDTHxHEIGHT. Defaults to the world size.
    #[arg(long)]
    size: Option<String>,

    /// Shake seed.
    #[arg(long, default_value_t = 1)]
    seed: u64,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Parser, Debug)]
struct ExportArgs {
    /// Input `.drz` sketch.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// `mp4` or `gif`.
    #[arg(long, default_value = "mp4")]
    format: String,

    /// Directory receiving the timestamped output file.
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,

    /// Export size as WIDTHxHEIGHT.
    #[arg(long)]
    size: Option<String>,

    /// Shake seed.
    #[arg(long, default_value_t = 1)]
    seed: u64,
}

#[derive(Parser, Debug)]
struct ImportSvgArgs {
    /// SVG file to import.
    #[arg(long)]
    svg: PathBuf,

    /// Existing sketch to append to. A blank sketch is used when omitted.
    #[arg(long)]
    into: Option<PathBuf>,

    /// Stroke color for shapes without one.
    #[arg(long)]
    color: Option<String>,

    /// Stroke width for shapes without one.
    #[arg(long)]
    width: Option<f64>,

    /// Output `.drz` path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Parser, Debug)]
struct InfoArgs {
    /// Input `.drz` sketch.
    #[arg(long = "in")]
    in_path: PathBuf,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let cfg = load_config(cli.config.as_deref())?;
    match cli.cmd {
        Command::Frame(args) => cmd_frame(&cfg, args),
        Command::Export(args) => cmd_export(cfg, args),
        Command::ImportSvg(args) => cmd_import_svg(&cfg, args),
        Command::Info(args) => cmd_info(&cfg, args),
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn load_config(path: Option<&Path>) -> anyhow::Result<EngineConfig> {
    let cfg = match path {
        Some(p) => EngineConfig::from_path(p)?,
        None => EngineConfig::default(),
    };
    Ok(cfg.with_env_overrides()?)
}

fn load_sketch(cfg: &EngineConfig, path: &Path) -> anyhow::Result<Document> {
    drawerz::io::sketch::from_path(path, cfg.animation_defaults)
        .with_context(|| format!("load sketch '{}'", path.display()))
}

fn parse_size(size: Option<&str>, fallback: Canvas) -> anyhow::Result<Canvas> {
    Ok(match size {
        Some(s) => s.parse()?,
        None => fallback,
    })
}

fn cmd_frame(cfg: &EngineConfig, args: FrameArgs) -> anyhow::Result<()> {
    let doc = load_sketch(cfg, &args.in_path)?;
    let canvas = parse_size(args.size.as_deref(), cfg.world)?;

    let mut renderer = CpuRenderer::new();
    let mut shake = Rng64::new(args.seed);
    let frame =
        drawerz::render::render_document(&mut renderer, &doc, args.time, canvas, &mut shake)?;

    if let Some(parent) = args.out.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }

    image::save_buffer_with_format(
        &args.out,
        &frame.to_opaque_rgba8(),
        frame.width,
        frame.height,
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("write png '{}'", args.out.display()))?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_export(mut cfg: EngineConfig, args: ExportArgs) -> anyhow::Result<()> {
    let format: ExportFormat = args.format.parse()?;
    cfg.export = parse_size(args.size.as_deref(), cfg.export)?;
    let json = std::fs::read_to_string(&args.in_path)
        .with_context(|| format!("read sketch '{}'", args.in_path.display()))?;

    let mut session = Session::new(
        cfg,
        LogNotifier { assume_yes: true },
        DirDownloader::new(&args.out_dir),
    )?
    .with_shake(Rng64::new(args.seed));
    session.stop_live();
    session.load_sketch(&json)?;

    let out = session.export(format, time::OffsetDateTime::now_utc())?;
    let shown = out
        .path
        .unwrap_or_else(|| args.out_dir.join(&out.file_name));
    eprintln!("wrote {} ({} frames)", shown.display(), out.frames);
    Ok(())
}

fn cmd_import_svg(cfg: &EngineConfig, args: ImportSvgArgs) -> anyhow::Result<()> {
    let markup = std::fs::read_to_string(&args.svg)
        .with_context(|| format!("read svg '{}'", args.svg.display()))?;
    let mut doc = match &args.into {
        Some(p) => load_sketch(cfg, p)?,
        None => Document::new(cfg.animation_defaults),
    };
    let color = match &args.color {
        Some(c) => c.parse::<StrokeColor>().map_err(anyhow::Error::msg)?,
        None => cfg.tool.color,
    };
    let width = args.width.unwrap_or(cfg.tool.size);

    let mut history = History::new(cfg.history_depth);
    let n = drawerz::import::svg::import_svg(&mut doc, &mut history, &markup, color, width, 0.0)?;
    drawerz::io::sketch::to_path(&doc, &args.out)
        .with_context(|| format!("write sketch '{}'", args.out.display()))?;

    eprintln!("imported {n} shapes into {}", args.out.display());
    Ok(())
}

fn cmd_info(cfg: &EngineConfig, args: InfoArgs) -> anyhow::Result<()> {
    let doc = load_sketch(cfg, &args.in_path)?;
    println!("layers: {}", doc.layers.len());
    println!("strokes: {}", doc.stroke_count());
    for (i, layer) in doc.layers.iter().enumerate().rev() {
        let s = &layer.animation_settings;
        println!(
            "{} [{i}] {:?} visible={} opacity={:.2} strokes={} points={} wiggle={} breathing={} shake={} speed={}",
            if doc.is_active(&layer.id) { "*" } else { " " },
            layer.name,
            layer.is_visible,
            layer.opacity,
            layer.strokes.len(),
            layer.point_count(),
            s.wiggle_intensity,
            s.breathing_stroke,
            s.shake_intensity,
            s.animation_speed,
        );
    }
    Ok(())
}
