use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "renderpath", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the segmented and resolved fixture of a session.
    Fixture(FixtureArgs),
    /// Assemble the render engine and print it with its fingerprint.
    Plan(PlanArgs),
    /// Sample bound parameters per frame as JSON lines.
    Preroll(PrerollArgs),
}

#[derive(Parser, Debug)]
struct FixtureArgs {
    /// Input session JSON.
    #[arg(long = "in")]
    in_path: PathBuf,
}

#[derive(Parser, Debug)]
struct PlanArgs {
    /// Input session JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Build options JSON.
    #[arg(long)]
    opts: Option<PathBuf>,

    /// Replace unsupported segments by gaps.
    #[arg(long, default_value_t = false)]
    partial: bool,
}

#[derive(Parser, Debug)]
struct PrerollArgs {
    /// Input session JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Build options JSON.
    #[arg(long)]
    opts: Option<PathBuf>,

    /// Replace unsupported segments by gaps.
    #[arg(long, default_value_t = false)]
    partial: bool,

    /// First frame (inclusive).
    #[arg(long, default_value_t = 0)]
    start: u64,

    /// Last frame (exclusive); defaults to the engine extent.
    #[arg(long)]
    end: Option<u64>,

    /// Enable frame-level parallelism.
    #[arg(long, default_value_t = false)]
    parallel: bool,

    /// Override rayon worker threads (parallel mode only).
    #[arg(long)]
    threads: Option<usize>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(tracing::Level::WARN)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Fixture(args) => cmd_fixture(args),
        Command::Plan(args) => cmd_plan(args),
        Command::Preroll(args) => cmd_preroll(args),
    }
}

fn cmd_fixture(args: FixtureArgs) -> anyhow::Result<()> {
    let snapshot = load_session(&args.in_path)?;
    let builder = renderpath::Builder::new(renderpath::BuildOpts::default());
    let fixture = builder
        .rebuild(&snapshot)
        .context("build fixture")?;
    print!("{}", fixture.dump());
    println!(
        "fingerprint: {}",
        renderpath::fingerprint_fixture(&fixture)
    );
    Ok(())
}

fn cmd_plan(args: PlanArgs) -> anyhow::Result<()> {
    let snapshot = load_session(&args.in_path)?;
    let mut opts = load_opts(args.opts.as_deref())?;
    opts.partial |= args.partial;

    let builder = renderpath::Builder::new(opts);
    let published = builder
        .build_and_publish(&snapshot)
        .context("assemble render engine")?;
    print!("{}", published.engine.dump());
    println!("port: {} {}", published.port.label, published.port.stream_type);
    println!("fingerprint: {}", published.engine_fingerprint);
    Ok(())
}

fn cmd_preroll(args: PrerollArgs) -> anyhow::Result<()> {
    let snapshot = load_session(&args.in_path)?;
    let mut opts = load_opts(args.opts.as_deref())?;
    opts.partial |= args.partial;
    opts.preroll.parallel |= args.parallel;
    if args.threads.is_some() {
        opts.preroll.threads = args.threads;
    }

    let builder = renderpath::Builder::new(opts);
    let published = builder
        .build_and_publish(&snapshot)
        .context("assemble render engine")?;
    let end = args.end.unwrap_or(published.engine.extent().0);
    let range = renderpath::FrameRange::new(
        renderpath::FrameIndex(args.start),
        renderpath::FrameIndex(end),
    )?;

    let frames = builder.preroll(range).context("preroll parameters")?;
    for frame in &frames {
        println!(
            "{}",
            serde_json::to_string(frame).context("serialize frame parameters")?
        );
    }
    Ok(())
}

fn load_session(path: &Path) -> anyhow::Result<renderpath::SessionSnapshot> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("read session '{}'", path.display()))?;
    renderpath::SessionSnapshot::from_json(&json)
        .with_context(|| format!("load session '{}'", path.display()))
}

fn load_opts(path: Option<&Path>) -> anyhow::Result<renderpath::BuildOpts> {
    let Some(path) = path else {
        return Ok(renderpath::BuildOpts::default());
    };
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("read options '{}'", path.display()))?;
    Ok(renderpath::BuildOpts::from_json(&json)?)
}
