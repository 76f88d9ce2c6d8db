//! tractstore CLI - Load and query tractography files.

use std::env;
use std::path::Path;
use std::time::Duration;

use tracing::{debug, info};
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::EnvFilter;

use tractstore::prelude::*;

/// Verbosity selected on the command line
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Verbosity {
    Quiet,
    Info,
    Debug,
    Trace,
}

impl Verbosity {
    fn filter(self) -> &'static str {
        match self {
            Verbosity::Quiet => "error",
            Verbosity::Info => "info",
            Verbosity::Debug => "debug",
            Verbosity::Trace => "trace",
        }
    }
}

/// Log to stderr. `RUST_LOG` overrides the level picked by flags.
fn init_tracing(verbosity: Verbosity) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(verbosity.filter()));
    let span_events = if verbosity >= Verbosity::Debug { FmtSpan::CLOSE } else { FmtSpan::NONE };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_span_events(span_events)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn main() {
    let args: Vec<String> = env::args().collect();

    // Parse global flags
    let mut verbosity = Verbosity::Info;
    let mut opts = LoadOptions::default();
    let mut json = false;
    let mut filtered_args: Vec<&str> = Vec::new();
    for arg in &args[1..] {
        match arg.as_str() {
            "-v" | "--verbose" => verbosity = Verbosity::Debug,
            "-vv" | "--trace" => verbosity = Verbosity::Trace,
            "-q" | "--quiet" => verbosity = Verbosity::Quiet,
            "--no-mmap" => opts = opts.with_mmap(false),
            "--no-bounds" => opts = opts.with_bounds(false),
            "--json" => json = true,
            _ => filtered_args.push(arg),
        }
    }
    init_tracing(verbosity);

    let prog = args.first().map(String::as_str).unwrap_or("tractstore");
    if filtered_args.is_empty() {
        print_usage(prog);
        return;
    }

    let rest = &filtered_args[1..];
    let result = match filtered_args[0] {
        "count" | "c" => match rest {
            [path] => cmd_count(path, &opts, json),
            _ => usage_error(prog, "count <file>"),
        },
        "load" | "l" => {
            if rest.is_empty() {
                usage_error(prog, "load <file>...")
            } else {
                cmd_load(rest, &opts, json)
            }
        }
        "header" | "hd" => match rest {
            [path] => cmd_header(path, &opts),
            _ => usage_error(prog, "header <file>"),
        },
        "search" | "s" => match rest {
            [path, coords @ ..] if coords.len() == 6 => match parse_box(coords) {
                Some((min, max)) => cmd_search(path, min, max, &opts, json),
                None => usage_error(prog, "search <file> <minx> <miny> <minz> <maxx> <maxy> <maxz>"),
            },
            _ => usage_error(prog, "search <file> <minx> <miny> <minz> <maxx> <maxy> <maxz>"),
        },
        "version" | "-V" | "--version" => {
            print_version();
            Ok(())
        }
        "help" | "h" | "-h" | "--help" => {
            print_usage(prog);
            Ok(())
        }
        other => {
            // Assume it's a file path
            if Path::new(other).exists() {
                cmd_load(&filtered_args, &opts, json)
            } else {
                eprintln!("Unknown command: {}", other);
                print_usage(prog);
                std::process::exit(1);
            }
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn usage_error(prog: &str, usage: &str) -> Result<()> {
    eprintln!("Usage: {} {}", prog, usage);
    std::process::exit(1);
}

fn print_usage(prog: &str) {
    println!("tractstore - Load and query TrackVis/MRtrix tractography");
    println!();
    println!("Usage: {} [options] <command> <file>", prog);
    println!();
    println!("Commands:");
    println!("  c, count <file>           Count tracks and points (one pass)");
    println!("  l, load <file>...         Load files into stores and report totals");
    println!("  hd, header <file>         Print the parsed header");
    println!("  s, search <file> <box>    Tracks overlapping minx miny minz maxx maxy maxz");
    println!("  version                   Show version and build date");
    println!("  h, help                   Show this help");
    println!();
    println!("Options:");
    println!("  -v, --verbose  Debug output");
    println!("  -vv, --trace   Trace output (very verbose)");
    println!("  -q, --quiet    Errors only");
    println!("  --no-mmap      Read through a buffered file instead of mapping it");
    println!("  --no-bounds    Skip per-track bounds after loading");
    println!("  --json         Machine-readable output");
    println!();
    println!("RUST_LOG overrides the log level.");
}

fn print_version() {
    println!(
        "tractstore {} (built {} {})",
        env!("CARGO_PKG_VERSION"),
        env!("TRACTSTORE_BUILD_DATE"),
        env!("TRACTSTORE_BUILD_TIME")
    );
}

fn parse_box(coords: &[&str]) -> Option<(Vec3, Vec3)> {
    let v: Vec<f32> = coords.iter().map(|s| s.parse().ok()).collect::<Option<_>>()?;
    Some((Vec3::new(v[0], v[1], v[2]), Vec3::new(v[3], v[4], v[5])))
}

fn ms(d: Duration) -> f64 {
    d.as_secs_f64() * 1000.0
}

fn print_json(value: &serde_json::Value) -> Result<()> {
    let text = serde_json::to_string_pretty(value).map_err(|e| Error::other(format!("JSON output: {}", e)))?;
    println!("{}", text);
    Ok(())
}

fn open(path: &str, opts: &LoadOptions) -> Result<(TractSource, TractFormat)> {
    let format = TractFormat::from_path(path)?;
    let source = TractSource::open_opts(path, opts.use_mmap)?;
    debug!(path, %format, mapped = source.is_mapped(), bytes = source.len(), "opened");
    Ok((source, format))
}

fn cmd_count(path: &str, opts: &LoadOptions, json: bool) -> Result<()> {
    let (source, format) = open(path, opts)?;
    let (header, stats) = count(&source, format)?;

    if json {
        print_json(&serde_json::json!({
            "file": path,
            "format": format.name(),
            "tracks": stats.element_count,
            "points": stats.point_count(),
            "scalars": stats.scalar_count,
            "declared_tracks": header.declared_count(),
            "capacity_bytes": stats.capacity_bytes(),
        }))?;
    } else {
        println!("File:     {}", path);
        println!("Format:   {}", format);
        println!("Tracks:   {}", stats.element_count);
        println!("Points:   {}", stats.point_count());
        if let Some(declared) = header.declared_count() {
            println!("Declared: {}", declared);
        }
        println!("Capacity: {} bytes", stats.capacity_bytes());
    }
    Ok(())
}

fn loaded_json(t: &LoadedTracts) -> serde_json::Value {
    serde_json::json!({
        "file": t.path.as_ref().map(|p| p.display().to_string()),
        "format": t.format.name(),
        "tracks": t.stats.element_count,
        "points": t.stats.point_count(),
        "average_track_len": t.stats.average_chain_len(),
        "store_bytes": t.store.capacity(),
        "timings_ms": {
            "count": ms(t.timings.count),
            "fill": ms(t.timings.fill),
            "bounds": ms(t.timings.bounds),
            "total": ms(t.timings.total()),
        },
    })
}

fn print_loaded(t: &LoadedTracts) {
    if let Some(p) = &t.path {
        println!("File:       {}", p.display());
    }
    println!("Format:     {}", t.format);
    println!("Tracks:     {}", t.stats.element_count);
    println!("Points:     {}", t.stats.point_count());
    println!("Avg length: {:.2} points", t.stats.average_chain_len());
    println!("Store:      {} bytes", t.store.capacity());
    println!(
        "Timings:    count {:.2} ms, fill {:.2} ms, bounds {:.2} ms, total {:.2} ms",
        ms(t.timings.count),
        ms(t.timings.fill),
        ms(t.timings.bounds),
        ms(t.timings.total())
    );
}

fn cmd_load(paths: &[&str], opts: &LoadOptions, json: bool) -> Result<()> {
    info!(files = paths.len(), "loading");
    let results = load_many(paths, opts);

    let mut failed = 0usize;
    let mut out = Vec::new();
    for (path, result) in paths.iter().zip(results) {
        match result {
            Ok(t) => {
                if json {
                    out.push(loaded_json(&t));
                } else {
                    print_loaded(&t);
                    println!();
                }
            }
            Err(e) => {
                failed += 1;
                eprintln!("Failed to load {}: {}", path, e);
                if json {
                    out.push(serde_json::json!({ "file": path, "error": e.to_string() }));
                }
            }
        }
    }

    if json {
        print_json(&serde_json::Value::Array(out))?;
    }
    if failed > 0 {
        return Err(Error::other(format!("{} of {} files failed", failed, paths.len())));
    }
    Ok(())
}

fn cmd_header(path: &str, opts: &LoadOptions) -> Result<()> {
    let (source, format) = open(path, opts)?;
    let (header, stats) = count(&source, format)?;
    println!("File:   {}", path);
    println!("Format: {}", format);
    println!();
    println!("{}", header);
    println!();
    println!("Tracks in data: {}", stats.element_count);
    Ok(())
}

fn cmd_search(path: &str, min: Vec3, max: Vec3, opts: &LoadOptions, json: bool) -> Result<()> {
    let tracts = load(path, opts)?;
    let hits = tracts.search(min, max)?;

    if json {
        print_json(&serde_json::json!({
            "file": path,
            "box": { "min": min.to_array(), "max": max.to_array() },
            "tracks": tracts.len(),
            "matches": hits.len(),
            "indices": hits,
        }))?;
    } else {
        println!("Box:     [{}, {}, {}] - [{}, {}, {}]", min.x, min.y, min.z, max.x, max.y, max.z);
        println!("Matches: {} of {}", hits.len(), tracts.len());
        for index in &hits {
            println!("  {}", index);
        }
    }
    Ok(())
}
