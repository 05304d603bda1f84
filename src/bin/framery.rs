use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Parser, Subcommand, ValueEnum};

use framery::{
    CpuRenderer, EditorSettings, ExportFormat, ImageSlot, LayoutPolicy, PreparedImageStore,
    RenderSettings, Size, Stage, compose_scene, compute_layout, decode_image, encode_frame,
    fit_container,
};

#[derive(Parser, Debug)]
#[command(name = "framery", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compute the derived layout for a composition and print it as JSON.
    Layout(LayoutArgs),
    /// Render a composition to a PNG or JPEG.
    Render(RenderArgs),
}

#[derive(Parser, Debug)]
struct LayoutArgs {
    /// Settings JSON; defaults apply when omitted.
    #[arg(long = "in")]
    in_path: Option<PathBuf>,

    /// Screenshot file used for its intrinsic size.
    #[arg(long, conflicts_with = "image_size")]
    image: Option<PathBuf>,

    /// Intrinsic size as WxH (e.g. 1600x900) instead of reading a file.
    #[arg(long)]
    image_size: Option<String>,

    /// Viewport size as WxH.
    #[arg(long, default_value = "1920x1080")]
    viewport: String,

    /// Container size as WxH; defaults to fitting the design target into
    /// the viewport.
    #[arg(long)]
    container: Option<String>,

    /// Sizing rule preset.
    #[arg(long, value_enum, default_value_t = PolicyChoice::Responsive)]
    policy: PolicyChoice,
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Settings JSON; defaults apply when omitted.
    #[arg(long = "in")]
    in_path: Option<PathBuf>,

    /// The screenshot to composite.
    #[arg(long)]
    screenshot: PathBuf,

    /// Background image, for background type "image".
    #[arg(long)]
    background: Option<PathBuf>,

    /// Overlay images as id=path; repeatable.
    #[arg(long = "overlay")]
    overlays: Vec<String>,

    /// Output path; the extension selects PNG or JPEG.
    #[arg(long)]
    out: PathBuf,

    /// Viewport size as WxH.
    #[arg(long, default_value = "1920x1080")]
    viewport: String,

    /// Output scale factor relative to the on-screen canvas.
    #[arg(long, default_value_t = 1.0)]
    scale: f64,

    /// Sizing rule preset.
    #[arg(long, value_enum, default_value_t = PolicyChoice::Responsive)]
    policy: PolicyChoice,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum PolicyChoice {
    Legacy,
    Responsive,
}

impl From<PolicyChoice> for LayoutPolicy {
    fn from(value: PolicyChoice) -> Self {
        match value {
            PolicyChoice::Legacy => Self::Legacy,
            PolicyChoice::Responsive => Self::Responsive,
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    match cli.cmd {
        Command::Layout(args) => run_layout(args),
        Command::Render(args) => run_render(args),
    }
}

fn run_layout(args: LayoutArgs) -> anyhow::Result<()> {
    let settings = load_settings(args.in_path.as_deref())?;
    let viewport = parse_size(&args.viewport)?;

    let image = match (&args.image, &args.image_size) {
        (Some(path), _) => {
            let bytes = std::fs::read(path)
                .with_context(|| format!("read image {}", path.display()))?;
            decode_image(&bytes)?.intrinsic_size()
        }
        (None, Some(spec)) => parse_size(spec)?,
        (None, None) => anyhow::bail!("pass either --image or --image-size"),
    };

    let container = match &args.container {
        Some(spec) => parse_size(spec)?,
        None => fit_container(
            Size::new(
                settings.canvas.container_width,
                settings.canvas.container_height,
            ),
            viewport,
        ),
    };

    let layout = compute_layout(
        image,
        container,
        viewport,
        &settings.canvas,
        &settings.screenshot,
        &settings.frame,
        args.policy.into(),
    );
    println!("{}", serde_json::to_string_pretty(&layout)?);
    Ok(())
}

fn run_render(args: RenderArgs) -> anyhow::Result<()> {
    let settings = load_settings(args.in_path.as_deref())?;
    let viewport = parse_size(&args.viewport)?;

    let mut assets = PreparedImageStore::new();
    let bytes = std::fs::read(&args.screenshot)
        .with_context(|| format!("read screenshot {}", args.screenshot.display()))?;
    assets.insert(ImageSlot::Screenshot, decode_image(&bytes)?);

    if let Some(path) = &args.background {
        let bytes =
            std::fs::read(path).with_context(|| format!("read background {}", path.display()))?;
        assets.insert(ImageSlot::Background, decode_image(&bytes)?);
    }
    for spec in &args.overlays {
        let (id, path) = spec
            .split_once('=')
            .context("overlay must be id=path")?;
        let bytes = std::fs::read(path).with_context(|| format!("read overlay {path}"))?;
        assets.insert(ImageSlot::Overlay(id.to_string()), decode_image(&bytes)?);
    }

    let image = assets
        .screenshot_size()
        .context("screenshot failed to decode")?;
    let container = fit_container(
        Size::new(
            settings.canvas.container_width,
            settings.canvas.container_height,
        ),
        viewport,
    );

    let layout = compute_layout(
        image,
        container,
        viewport,
        &settings.canvas,
        &settings.screenshot,
        &settings.frame,
        args.policy.into(),
    );
    let stage = Stage::new(compose_scene(&settings, &layout, &assets)?);

    let mut renderer = CpuRenderer::new(RenderSettings::default());
    let frame = renderer.render(&stage, &assets, args.scale)?;

    let format = args
        .out
        .extension()
        .and_then(|e| e.to_str())
        .map(ExportFormat::from_extension)
        .unwrap_or(ExportFormat::Png);
    let encoded = encode_frame(&frame, format)?;
    std::fs::write(&args.out, encoded)
        .with_context(|| format!("write {}", args.out.display()))?;

    eprintln!(
        "rendered {}x{} -> {}",
        frame.width,
        frame.height,
        args.out.display()
    );
    Ok(())
}

fn load_settings(path: Option<&std::path::Path>) -> anyhow::Result<EditorSettings> {
    let settings = match path {
        Some(p) => {
            let text =
                std::fs::read_to_string(p).with_context(|| format!("read {}", p.display()))?;
            serde_json::from_str(&text).with_context(|| format!("parse {}", p.display()))?
        }
        None => EditorSettings::default(),
    };
    settings.validate()?;
    Ok(settings)
}

fn parse_size(spec: &str) -> anyhow::Result<Size> {
    let (w, h) = spec
        .split_once(['x', 'X'])
        .with_context(|| format!("expected WxH, got '{spec}'"))?;
    let width: f64 = w.trim().parse().with_context(|| format!("bad width in '{spec}'"))?;
    let height: f64 = h.trim().parse().with_context(|| format!("bad height in '{spec}'"))?;
    anyhow::ensure!(width > 0.0 && height > 0.0, "size must be positive: '{spec}'");
    Ok(Size::new(width, height))
}
