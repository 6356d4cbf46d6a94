use std::{
    net::SocketAddr,
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::Context as _;
use clap::{Parser, Subcommand, ValueEnum};
use route_overlay::{Bitmap, Canvas, OverlayConfig, Preset};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "route-overlay", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve the HTTP API.
    Serve(ServeArgs),
    /// Composite a screenshot onto a background and write a PNG.
    Compose(ComposeArgs),
    /// Write the extracted route and stats layers as `route.png` and `stats.png`.
    Layers(LayersArgs),
    /// Print the effective config as JSON.
    PrintConfig(ConfigArgs),
}

#[derive(Parser, Debug)]
struct ConfigArgs {
    /// Starting preset; keys missing from `--config` fall back to it.
    #[arg(long, value_enum, default_value_t = PresetChoice::Warm)]
    preset: PresetChoice,

    /// JSON config file (camelCase keys).
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct ServeArgs {
    /// Listen address.
    #[arg(long, default_value = "127.0.0.1:3000")]
    addr: SocketAddr,

    #[command(flatten)]
    config: ConfigArgs,
}

#[derive(Parser, Debug)]
struct ComposeArgs {
    /// Activity-app screenshot (JPEG, PNG, WebP or HEIC).
    #[arg(long)]
    screenshot: PathBuf,

    /// Background photo.
    #[arg(long)]
    background: PathBuf,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    #[command(flatten)]
    config: ConfigArgs,
}

#[derive(Parser, Debug)]
struct LayersArgs {
    #[arg(long)]
    screenshot: PathBuf,

    /// Directory for `route.png` and `stats.png`.
    #[arg(long)]
    out_dir: PathBuf,

    #[command(flatten)]
    config: ConfigArgs,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum PresetChoice {
    Warm,
    Blue,
}

impl From<PresetChoice> for Preset {
    fn from(choice: PresetChoice) -> Self {
        match choice {
            PresetChoice::Warm => Preset::Warm,
            PresetChoice::Blue => Preset::Blue,
        }
    }
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();
    match cli.cmd {
        Command::Serve(args) => cmd_serve(args),
        Command::Compose(args) => cmd_compose(args),
        Command::Layers(args) => cmd_layers(args),
        Command::PrintConfig(args) => cmd_print_config(args),
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn resolve_config(args: &ConfigArgs) -> anyhow::Result<OverlayConfig> {
    let base = Preset::from(args.preset).config();
    match &args.config {
        Some(path) => OverlayConfig::load(path, &base),
        None => {
            base.validate()?;
            Ok(base)
        }
    }
}

fn read_image(path: &Path, max_pixels: u64) -> anyhow::Result<Bitmap> {
    let bytes = std::fs::read(path).with_context(|| format!("read image '{}'", path.display()))?;
    let bitmap = route_overlay::decode_image(&bytes, max_pixels)
        .with_context(|| format!("decode image '{}'", path.display()))?;
    Ok(bitmap)
}

fn cmd_serve(args: ServeArgs) -> anyhow::Result<()> {
    let config = Arc::new(resolve_config(&args.config)?);
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("build tokio runtime")?;
    runtime
        .block_on(route_overlay::run_server(args.addr, config))
        .with_context(|| format!("serve on {}", args.addr))?;
    Ok(())
}

fn cmd_compose(args: ComposeArgs) -> anyhow::Result<()> {
    let config = resolve_config(&args.config)?;
    let screenshot = read_image(&args.screenshot, config.max_decoded_pixels)?;
    let background = read_image(&args.background, config.max_decoded_pixels)?;

    let out = route_overlay::compose_bitmaps(&screenshot, &background, &config)?;
    route_overlay::write_png(&args.out, &out)?;
    tracing::info!(
        out = %args.out.display(),
        width = out.width(),
        height = out.height(),
        "wrote composite"
    );
    Ok(())
}

fn cmd_layers(args: LayersArgs) -> anyhow::Result<()> {
    let config = resolve_config(&args.config)?;
    let screenshot = read_image(&args.screenshot, config.max_decoded_pixels)?;
    let canvas = Canvas::new(config.canvas_width, config.canvas_height)?;

    let layers = route_overlay::extract_layers(&screenshot, &config, canvas)?;
    for (name, bitmap) in [("route.png", &layers.route), ("stats.png", &layers.stats)] {
        let path = args.out_dir.join(name);
        route_overlay::write_png(&path, bitmap)?;
        tracing::info!(path = %path.display(), "wrote layer");
    }
    Ok(())
}

fn cmd_print_config(args: ConfigArgs) -> anyhow::Result<()> {
    let config = resolve_config(&args)?;
    let json = serde_json::to_string_pretty(&config).context("serialize config")?;
    println!("{json}");
    Ok(())
}
