use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(name = "slicestitch", version)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Stack image fragments vertically into one PNG.
    Stitch(StitchArgs),
    /// Print the dimensions of each fragment as JSON lines.
    Inspect(InspectArgs),
    /// Serve `POST /stitch` over HTTP.
    Serve(ServeArgs),
}

#[derive(Args, Debug)]
struct ThreadingArgs {
    /// Probe and place fragments in parallel.
    #[arg(long, default_value_t = false)]
    parallel: bool,

    /// Override rayon worker threads (parallel mode only).
    #[arg(long)]
    threads: Option<usize>,

    /// PNG compression effort.
    #[arg(long, value_enum, default_value_t = CompressionChoice::Default)]
    compression: CompressionChoice,
}

#[derive(Parser, Debug)]
struct StitchArgs {
    /// Fragment images, top to bottom.
    #[arg(required_unless_present = "request", conflicts_with = "request")]
    fragments: Vec<PathBuf>,

    /// JSON request file (`{"slices": [<base64>, ...]}`) instead of fragment paths.
    #[arg(long)]
    request: Option<PathBuf>,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    #[command(flatten)]
    threading: ThreadingArgs,
}

#[derive(Parser, Debug)]
struct InspectArgs {
    /// Fragment images.
    #[arg(required = true)]
    fragments: Vec<PathBuf>,
}

#[derive(Parser, Debug)]
struct ServeArgs {
    /// Address to bind.
    #[arg(long, default_value = "127.0.0.1:4000")]
    addr: String,

    /// Largest accepted request body in bytes.
    #[arg(long, default_value_t = 50 * 1024 * 1024)]
    max_body_bytes: usize,

    /// HTTP worker threads.
    #[arg(long, default_value_t = 4)]
    workers: usize,

    #[command(flatten)]
    threading: ThreadingArgs,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum CompressionChoice {
    Fast,
    Default,
    Best,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match cli.cmd {
        Command::Stitch(args) => cmd_stitch(args),
        Command::Inspect(args) => cmd_inspect(args),
        Command::Serve(args) => cmd_serve(args),
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
        .with_writer(std::io::stderr)
        .with_max_level(level)
        .init();
}

fn make_compositor(args: &ThreadingArgs) -> anyhow::Result<slicestitch::Compositor> {
    let opts = slicestitch::CompositorOpts {
        threading: slicestitch::Threading {
            parallel: args.parallel,
            threads: args.threads,
        },
        compression: match args.compression {
            CompressionChoice::Fast => slicestitch::PngCompression::Fast,
            CompressionChoice::Default => slicestitch::PngCompression::Default,
            CompressionChoice::Best => slicestitch::PngCompression::Best,
        },
    };
    Ok(slicestitch::Compositor::new(opts)?)
}

fn read_fragments(paths: &[PathBuf]) -> anyhow::Result<Vec<Vec<u8>>> {
    paths
        .iter()
        .map(|p| std::fs::read(p).with_context(|| format!("read fragment '{}'", p.display())))
        .collect()
}

fn read_request(path: &Path) -> anyhow::Result<Vec<Vec<u8>>> {
    let body =
        std::fs::read(path).with_context(|| format!("read request '{}'", path.display()))?;
    Ok(slicestitch::decode_request(&body)?)
}

fn cmd_stitch(args: StitchArgs) -> anyhow::Result<()> {
    let buffers = match &args.request {
        Some(path) => read_request(path)?,
        None => read_fragments(&args.fragments)?,
    };
    let compositor = make_compositor(&args.threading)?;
    let out = compositor.stitch(buffers)?;

    if let Some(parent) = args.out.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    std::fs::write(&args.out, out.bytes())
        .with_context(|| format!("write png '{}'", args.out.display()))?;

    eprintln!(
        "wrote {} ({}, {} bytes)",
        args.out.display(),
        out.size(),
        out.len()
    );
    Ok(())
}

fn cmd_inspect(args: InspectArgs) -> anyhow::Result<()> {
    let codec = slicestitch::PngCodec::default();
    for path in &args.fragments {
        let bytes =
            std::fs::read(path).with_context(|| format!("read fragment '{}'", path.display()))?;
        let size = slicestitch::inspect(&codec, &bytes)
            .with_context(|| format!("inspect '{}'", path.display()))?;
        let line = serde_json::json!({
            "path": path.display().to_string(),
            "width": size.width,
            "height": size.height,
        });
        println!("{line}");
    }
    Ok(())
}

fn cmd_serve(args: ServeArgs) -> anyhow::Result<()> {
    let compositor = make_compositor(&args.threading)?;
    let opts = slicestitch::ServeOpts {
        addr: args.addr,
        max_body_bytes: args.max_body_bytes,
        workers: args.workers,
    };
    let server = slicestitch::StitchServer::bind(opts, compositor)?;
    if let Some(addr) = server.local_addr() {
        eprintln!("listening on http://{addr}{}", slicestitch::STITCH_ROUTE);
    }
    server.run()?;
    Ok(())
}
