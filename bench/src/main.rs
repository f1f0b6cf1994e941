use std::{
    path::{Path, PathBuf},
    time::{Duration, Instant},
};

use anyhow::Context as _;
use serde_json::json;
use sha2::Digest as _;
use slicestitch::ImageCodec as _;

#[derive(Clone, Debug)]
struct BenchArgs {
    width: u32,
    fragment_height: u32,
    fragments: u32,
    warmup: u32,
    repeats: u32,
    out_dir: PathBuf,
    keep_all_outputs: bool,
    parallel: bool,
    threads: Option<usize>,
    compression: slicestitch::PngCompression,
}

#[derive(Clone, Debug, Default)]
struct RunMetrics {
    inspect_total: Duration,
    composite_total: Duration,
    write_total: Duration,
    wall_total: Duration,
}

fn main() {
    if let Err(err) = try_main() {
        eprintln!("{err:#}");
        std::process::exit(1);
    }
}

fn try_main() -> anyhow::Result<()> {
    let args = parse_args()?;

    if args.width == 0 || args.fragment_height == 0 {
        anyhow::bail!("--width/--fragment-height must be > 0");
    }
    if args.fragments == 0 {
        anyhow::bail!("--fragments must be > 0");
    }
    if let Some(n) = args.threads
        && n == 0
    {
        anyhow::bail!("--threads must be >= 1 when set");
    }

    let bench_root = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    let repo_root = bench_root
        .parent()
        .ok_or_else(|| anyhow::anyhow!("bench manifest dir has no parent (unexpected)"))?
        .to_path_buf();

    let out_dir = if args.out_dir.is_absolute() {
        args.out_dir.clone()
    } else {
        repo_root.join(&args.out_dir)
    };
    std::fs::create_dir_all(&out_dir)
        .with_context(|| format!("create out dir '{}'", out_dir.display()))?;

    let t = Instant::now();
    let buffers = build_fragments(&args)?;
    let input_bytes: usize = buffers.iter().map(Vec::len).sum();
    eprintln!(
        "fragments: {n} x {w}x{h} ({input_bytes} encoded bytes, generated in {ms:.1}ms)",
        n = args.fragments,
        w = args.width,
        h = args.fragment_height,
        ms = t.elapsed().as_secs_f64() * 1000.0,
    );

    let compositor = slicestitch::Compositor::new(slicestitch::CompositorOpts {
        threading: slicestitch::Threading {
            parallel: args.parallel,
            threads: args.threads,
        },
        compression: args.compression,
    })?;

    if args.warmup > 0 {
        eprintln!("warmup: {} run(s)", args.warmup);
        for i in 0..args.warmup {
            let _ = run_once(
                &args, &compositor, &buffers, &out_dir, i, /*is_warmup=*/ true,
            )?;
        }
    }

    eprintln!(
        "bench: {repeats} run(s) ({profile} build), mode={mode}, threads={threads}, compression={compression:?}",
        repeats = args.repeats,
        profile = if cfg!(debug_assertions) {
            "debug"
        } else {
            "release"
        },
        mode = if args.parallel {
            "parallel"
        } else {
            "sequential"
        },
        threads = args
            .threads
            .map(|n| n.to_string())
            .unwrap_or_else(|| "auto".to_string()),
        compression = args.compression,
    );

    let mut runs = Vec::<RunMetrics>::with_capacity(args.repeats as usize);
    for i in 0..args.repeats {
        runs.push(run_once(
            &args, &compositor, &buffers, &out_dir, i, /*is_warmup=*/ false,
        )?);
    }

    report_percentiles(&runs);
    report_output(&out_dir, &args)?;
    Ok(())
}

/// Horizontal bands, each fragment a different hue so seams are visible in the output.
fn build_fragments(args: &BenchArgs) -> anyhow::Result<Vec<Vec<u8>>> {
    let codec = slicestitch::PngCodec::new(slicestitch::PngCompression::Fast);
    let size = slicestitch::Dimensions::new(args.width, args.fragment_height);
    let len = size.rgba8_len()?;

    (0..args.fragments)
        .map(|i| {
            let hue = (i * 47 % 256) as u8;
            let mut rgba8 = vec![0u8; len];
            for (p, px) in rgba8.chunks_exact_mut(4).enumerate() {
                let x = (p % args.width as usize) as u32;
                let y = (p / args.width as usize) as u32;
                px.copy_from_slice(&[hue, (x % 256) as u8, (y % 256) as u8, 255]);
            }
            codec
                .encode_rgba8(size, &rgba8)
                .with_context(|| format!("encode fragment {i}"))
        })
        .collect()
}

fn output_path(out_dir: &Path, args: &BenchArgs, run_idx: u32) -> PathBuf {
    if args.keep_all_outputs {
        out_dir.join(format!("out_{run_idx:03}.png"))
    } else {
        out_dir.join("out.png")
    }
}

fn run_once(
    args: &BenchArgs,
    compositor: &slicestitch::Compositor,
    buffers: &[Vec<u8>],
    out_dir: &Path,
    run_idx: u32,
    is_warmup: bool,
) -> anyhow::Result<RunMetrics> {
    let wall = Instant::now();
    let mut m = RunMetrics::default();

    let t0 = Instant::now();
    let set = compositor.inspect(buffers.to_vec())?;
    m.inspect_total = t0.elapsed();

    let t1 = Instant::now();
    let out = compositor.composite(&set)?;
    m.composite_total = t1.elapsed();

    let t2 = Instant::now();
    let path = output_path(out_dir, args, run_idx);
    std::fs::write(&path, out.bytes())
        .with_context(|| format!("write png '{}'", path.display()))?;
    m.write_total = t2.elapsed();

    m.wall_total = wall.elapsed();

    if !is_warmup {
        eprintln!(
            "run {run_idx:03}: wall={wall:.3}s inspect={ins:.3}s composite={co:.3}s write={wr:.3}s bytes={bytes}",
            wall = m.wall_total.as_secs_f64(),
            ins = m.inspect_total.as_secs_f64(),
            co = m.composite_total.as_secs_f64(),
            wr = m.write_total.as_secs_f64(),
            bytes = out.len(),
        );
    }

    Ok(m)
}

fn report_output(out_dir: &Path, args: &BenchArgs) -> anyhow::Result<()> {
    let Some(last) = last_measured_run(args.repeats) else {
        return Ok(());
    };
    let path = output_path(out_dir, args, last);
    let Ok(bytes) = std::fs::read(&path) else {
        return Ok(());
    };
    let summary = json!({
        "output": path.display().to_string(),
        "width": args.width,
        "height": u64::from(args.fragment_height) * u64::from(args.fragments),
        "bytes": bytes.len(),
        "sha256": sha256_hex(&bytes),
    });
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

/// Index of the last measured run; `None` when only warmup runs wrote output.
fn last_measured_run(repeats: u32) -> Option<u32> {
    repeats.checked_sub(1)
}

fn sha256_hex(bytes: &[u8]) -> String {
    let digest = sha2::Sha256::digest(bytes);
    let mut out = String::with_capacity(digest.len() * 2);
    for b in digest {
        out.push_str(&format!("{:02x}", b));
    }
    out
}

fn parse_args() -> anyhow::Result<BenchArgs> {
    let mut args = std::env::args().skip(1);

    let mut out = BenchArgs {
        width: 1280,
        fragment_height: 720,
        fragments: 8,
        warmup: 1,
        repeats: 20,
        out_dir: PathBuf::from("target/bench"),
        keep_all_outputs: false,
        parallel: false,
        threads: None,
        compression: slicestitch::PngCompression::Default,
    };

    while let Some(a) = args.next() {
        match a.as_str() {
            "--width" => out.width = parse_u32(args.next(), "--width")?,
            "--fragment-height" => {
                out.fragment_height = parse_u32(args.next(), "--fragment-height")?
            }
            "--fragments" => out.fragments = parse_u32(args.next(), "--fragments")?,
            "--warmup" => out.warmup = parse_u32(args.next(), "--warmup")?,
            "--repeats" => out.repeats = parse_u32(args.next(), "--repeats")?,
            "--out-dir" => {
                out.out_dir = PathBuf::from(args.next().ok_or_else(|| {
                    anyhow::anyhow!("missing value for --out-dir (expected a path)")
                })?)
            }
            "--compression" => {
                let v = args.next().ok_or_else(|| {
                    anyhow::anyhow!("missing value for --compression (fast|default|best)")
                })?;
                out.compression = match v.as_str() {
                    "fast" => slicestitch::PngCompression::Fast,
                    "default" => slicestitch::PngCompression::Default,
                    "best" => slicestitch::PngCompression::Best,
                    _ => anyhow::bail!("unknown --compression '{v}' (expected fast|default|best)"),
                };
            }
            "--keep-all" => out.keep_all_outputs = true,
            "--parallel" => out.parallel = true,
            "--threads" => out.threads = Some(parse_usize(args.next(), "--threads")?),
            "--help" | "-h" => {
                print_help();
                std::process::exit(0);
            }
            _ => anyhow::bail!("unknown arg '{a}' (try --help)"),
        }
    }

    Ok(out)
}

fn print_help() {
    eprintln!(
        r#"slicestitch-bench

Stitches a synthetic fragment set repeatedly and reports p50/p90/p99 for each stage.

Usage:
  cargo run -q --release
  cargo run -q --release -- --fragments 32 --width 1920
  cargo run -q --release -- --parallel --threads 4

Args:
  --width N            (default 1280)
  --fragment-height N  (default 720)
  --fragments N        (default 8)
  --warmup N           (default 1)
  --repeats N          (default 20)
  --compression MODE   fast|default|best (default default)
  --out-dir PATH       (default target/bench)
  --keep-all           keep per-run outputs (otherwise overwrite the same file)
  --parallel           probe and place fragments on rayon workers
  --threads N          worker threads for parallel mode (default auto)
"#
    );
}

fn parse_u32(v: Option<String>, flag: &str) -> anyhow::Result<u32> {
    let v = v.ok_or_else(|| anyhow::anyhow!("missing value for {flag}"))?;
    v.parse::<u32>()
        .with_context(|| format!("parse {flag} value '{v}'"))
}

fn parse_usize(v: Option<String>, flag: &str) -> anyhow::Result<usize> {
    let v = v.ok_or_else(|| anyhow::anyhow!("missing value for {flag}"))?;
    v.parse::<usize>()
        .with_context(|| format!("parse {flag} value '{v}'"))
}

fn report_percentiles(runs: &[RunMetrics]) {
    type Getter = fn(&RunMetrics) -> Duration;
    type Field = (&'static str, Getter);

    fn collect(runs: &[RunMetrics], f: fn(&RunMetrics) -> Duration) -> Vec<Duration> {
        let mut v = runs.iter().map(f).collect::<Vec<_>>();
        v.sort_by_key(|d| d.as_nanos());
        v
    }

    fn p(v: &[Duration], p: f64) -> Duration {
        if v.is_empty() {
            return Duration::ZERO;
        }
        let n = v.len();
        let rank = (p * (n as f64)).ceil().clamp(1.0, n as f64) as usize;
        v[rank - 1]
    }

    fn fmt_ms(d: Duration) -> String {
        format!("{:.3}ms", d.as_secs_f64() * 1000.0)
    }

    let fields: &[Field] = &[
        ("inspect_total", |m| m.inspect_total),
        ("composite_total", |m| m.composite_total),
        ("write_total", |m| m.write_total),
        ("wall_total", |m| m.wall_total),
    ];

    eprintln!("\npercentiles across runs (p50/p90/p99):");
    for (name, getter) in fields {
        let v = collect(runs, *getter);
        let p50 = p(&v, 0.50);
        let p90 = p(&v, 0.90);
        let p99 = p(&v, 0.99);
        eprintln!(
            "  {name:16} p50={p50:>10}  p90={p90:>10}  p99={p99:>10}",
            name = *name,
            p50 = fmt_ms(p50),
            p90 = fmt_ms(p90),
            p99 = fmt_ms(p99)
        );
    }
}
