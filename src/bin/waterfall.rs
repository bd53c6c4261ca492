use std::{
    io::Write as _,
    path::{Path, PathBuf},
};

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};
use waterfall::{
    DataBundle, Measure, Millis, Scene, SeriesSummary, WaterfallConfig, WaterfallEngine,
    load_bundle, rasterize, scene_to_svg,
};

#[derive(Parser, Debug)]
#[command(name = "waterfall", version)]
struct Cli {
    #[command(flatten)]
    input: InputArgs,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Args, Debug)]
struct InputArgs {
    /// Job statistics CSV.
    #[arg(long, global = true, default_value = "data/jobs.csv")]
    jobs: PathBuf,

    /// Income quintile reference CSV.
    #[arg(long, global = true, default_value = "data/quintiles.csv")]
    quintiles: PathBuf,

    /// Optional JSON config overriding geometry, timing and palette.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Measure to aggregate by (`job-growth` or `avg-wage-growth`).
    #[arg(long, global = true, default_value = "job-growth")]
    measure: Measure,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the five quintile series as JSON.
    Series,
    /// Run the cascade and print every box and phase transition as JSON lines.
    Timeline(TimelineArgs),
    /// Write the chart at a point in time as SVG or PNG.
    Snapshot(SnapshotArgs),
}

#[derive(Args, Debug)]
struct TimelineArgs {
    /// After the cascade settles, switch to this measure and keep recording.
    #[arg(long)]
    then: Option<Measure>,

    /// After everything settles, replay the cascade once more.
    #[arg(long, default_value_t = false)]
    reset: bool,
}

#[derive(Args, Debug)]
struct SnapshotArgs {
    /// Clock time of the snapshot in milliseconds; defaults to after the cascade settles.
    #[arg(long)]
    at: Option<u64>,

    /// Output path; `.png` rasterizes, anything else is written as SVG.
    #[arg(long)]
    out: PathBuf,

    /// Raster scale for PNG output.
    #[arg(long, default_value_t = 1.0)]
    scale: f32,

    /// Leave the color legend out.
    #[arg(long, default_value_t = false)]
    no_legend: bool,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let config = match &cli.input.config {
        Some(path) => WaterfallConfig::from_json_path(path)
            .with_context(|| format!("load config '{}'", path.display()))?,
        None => WaterfallConfig::default(),
    };
    let data = load_bundle(&cli.input.jobs, &cli.input.quintiles).context("load datasets")?;

    match cli.cmd {
        Command::Series => cmd_series(data, cli.input.measure),
        Command::Timeline(args) => cmd_timeline(config, data, cli.input.measure, args),
        Command::Snapshot(args) => cmd_snapshot(config, data, cli.input.measure, args),
    }
}

fn engine(
    config: WaterfallConfig,
    data: DataBundle,
    measure: Measure,
) -> anyhow::Result<WaterfallEngine<Scene>> {
    let scene = Scene::new(config.canvas, config.ease);
    let mut engine = WaterfallEngine::new(config, scene).context("build engine")?;
    engine
        .initialize(data, measure)
        .context("initialize waterfall")?;
    Ok(engine)
}

fn cmd_series(data: DataBundle, measure: Measure) -> anyhow::Result<()> {
    let series = waterfall::aggregate(&data.stats, measure).context("aggregate records")?;
    let summaries: Vec<SeriesSummary> = series
        .iter()
        .map(|s| {
            SeriesSummary::new(
                s,
                &data.stats,
                measure,
                data.quintile_reference(s.id),
            )
        })
        .collect();
    for s in &summaries {
        info!(quintile = s.quintile, net = s.active_net(), "quintile net");
    }
    let out = serde_json::json!({
        "measure": measure,
        "series": series,
        "summaries": summaries,
    });
    println!("{}", serde_json::to_string_pretty(&out)?);
    Ok(())
}

fn cmd_timeline(
    config: WaterfallConfig,
    data: DataBundle,
    measure: Measure,
    args: TimelineArgs,
) -> anyhow::Result<()> {
    let mut engine = engine(config, data, measure)?;
    engine.run_to_completion()?;
    if let Some(next) = args.then {
        engine.change_measure(next).context("change measure")?;
        engine.run_to_completion()?;
    }
    if args.reset {
        engine.reset_cascade().context("reset cascade")?;
        engine.run_to_completion()?;
    }

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    for change in engine.phase_changes() {
        writeln!(out, "{}", serde_json::to_string(change)?)?;
    }
    for event in engine.progress() {
        writeln!(out, "{}", serde_json::to_string(event)?)?;
    }
    info!(end = engine.now().0, "timeline complete");
    Ok(())
}

fn cmd_snapshot(
    config: WaterfallConfig,
    data: DataBundle,
    measure: Measure,
    args: SnapshotArgs,
) -> anyhow::Result<()> {
    let mut engine = engine(config, data, measure)?;
    match args.at {
        Some(at) => engine.run_until(Millis(at))?,
        None => {
            engine.run_to_completion()?;
        }
    }

    let svg = scene_to_svg(engine.renderer(), !args.no_legend);

    ensure_parent(&args.out)?;
    let is_png = args
        .out
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("png"));
    if is_png {
        let frame = rasterize(&svg, args.scale).context("rasterize snapshot")?;
        image::save_buffer_with_format(
            &args.out,
            &frame.data,
            frame.width,
            frame.height,
            image::ColorType::Rgba8,
            image::ImageFormat::Png,
        )
        .with_context(|| format!("write png '{}'", args.out.display()))?;
    } else {
        std::fs::write(&args.out, svg)
            .with_context(|| format!("write svg '{}'", args.out.display()))?;
    }

    eprintln!("wrote {} at t={}", args.out.display(), engine.now());
    Ok(())
}

fn ensure_parent(path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    Ok(())
}
