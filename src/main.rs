use clap::{Parser, Subcommand};
use simple_mark::apply::{ApplyRequest, apply};
use simple_mark::config::{self, MarkConfig};
use simple_mark::imaging::{
    Corner, Dimensions, ImageSource, RustBackend, load_pair, plan_composite, resolve_placement,
};
use simple_mark::{export, output};
use std::error::Error;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

fn version_string() -> &'static str {
    let on_tag = env!("ON_RELEASE_TAG");
    if on_tag == "true" {
        env!("CARGO_PKG_VERSION")
    } else {
        let hash = env!("GIT_HASH");
        if hash.is_empty() {
            "dev@unknown"
        } else {
            // Leaked once; only called at startup
            Box::leak(format!("dev@{hash}").into_boxed_str())
        }
    }
}

#[derive(Parser)]
#[command(name = "simple-mark")]
#[command(about = "Stamp a watermark onto a photo")]
#[command(long_about = "\
Stamp a watermark onto a photo

The watermark is scaled to 30% of the photo width (keeping its aspect
ratio), placed at the chosen corner, blended at 80% opacity, and saved as
watermarked_image.png.

Positions:

  top-left ──────────── top-right
     │                      │
     │        center        │
     │                      │
  bottom-left ──────── bottom-right

Settings are read from ./simple-mark.toml when present; flags override it.
Run 'simple-mark gen-config' to print a documented config file.

Set RUST_LOG=debug for diagnostic output.")]
#[command(version = version_string())]
struct Cli {
    /// Config file (default: ./simple-mark.toml if it exists)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

/// Flags shared by commands that composite real files.
#[derive(clap::Args, Clone)]
struct MarkArgs {
    /// Photo to watermark
    source: PathBuf,

    /// Watermark image (PNG with transparency recommended)
    watermark: PathBuf,

    /// Where to place the watermark
    #[arg(long, value_enum)]
    corner: Option<Corner>,

    /// Watermark width relative to the photo width
    #[arg(long)]
    scale: Option<f64>,

    /// Watermark opacity, 0.0-1.0
    #[arg(long)]
    opacity: Option<f64>,

    /// Directory to write watermarked_image.png into
    #[arg(long)]
    output_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Command {
    /// Composite the watermark and save watermarked_image.png
    Apply {
        #[command(flatten)]
        args: MarkArgs,

        /// Print a JSON report instead of text
        #[arg(long)]
        json: bool,
    },
    /// Load both images and show where the watermark would go, without writing
    Check {
        #[command(flatten)]
        args: MarkArgs,
    },
    /// Compute a placement from dimensions alone
    Place {
        /// Photo size as WIDTHxHEIGHT
        #[arg(long, value_parser = parse_dimensions)]
        base: Dimensions,

        /// Watermark natural size as WIDTHxHEIGHT
        #[arg(long, value_parser = parse_dimensions)]
        watermark: Dimensions,

        /// Corner name; unrecognized names fall back to top-left
        #[arg(long, default_value = "top-left")]
        corner: String,

        /// Watermark width relative to the photo width
        #[arg(long)]
        scale: Option<f64>,
    },
    /// Print a stock simple-mark.toml with all options documented
    GenConfig,
}

fn main() -> ExitCode {
    init_logger();
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            for line in error_lines(e.as_ref()) {
                eprintln!("{line}");
            }
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    match cli.command {
        Command::Apply { args, json } => {
            let config = load_config(cli.config.as_deref())?;
            let request = build_request(config, &args)?;
            let outcome = apply(&request)?;
            if json {
                let report = output::ApplyReport::from_outcome(&outcome);
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                output::print_apply_output(&outcome);
            }
        }
        Command::Check { args } => {
            let config = load_config(cli.config.as_deref())?;
            let request = build_request(config, &args)?;
            let (source, watermark) =
                load_pair(&RustBackend::new(), &request.source, &request.watermark)?;
            let plan = plan_composite(
                source.dimensions(),
                watermark.dimensions(),
                request.corner,
                &request.settings,
            );
            output::print_check_output(
                (&source.name, source.dimensions()),
                (&watermark.name, watermark.dimensions()),
                &plan,
                &export::output_path(&request.output_dir),
            );
        }
        Command::Place {
            base,
            watermark,
            corner,
            scale,
        } => {
            let config =
                load_config(cli.config.as_deref())?.with_overrides(None, scale, None)?;
            let scale = config.settings().scale;
            let corner = Corner::from_name_or_default(&corner);
            let placement = resolve_placement(corner, base, watermark, scale);
            output::print_place_output(corner, &placement);
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Route `log` output to stderr, `warn` and above unless `RUST_LOG` says otherwise.
fn init_logger() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .format_timestamp(None)
        .init();
}

/// Load the explicit config file, or `./simple-mark.toml` if present.
fn load_config(path: Option<&Path>) -> Result<MarkConfig, config::ConfigError> {
    match path {
        Some(p) if !p.exists() => Err(config::ConfigError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("config file not found: {}", p.display()),
        ))),
        Some(p) => config::load_config_file(p),
        None => config::load_config(Path::new(".")),
    }
}

/// Combine config values with command-line overrides.
fn build_request(
    config: MarkConfig,
    args: &MarkArgs,
) -> Result<ApplyRequest, config::ConfigError> {
    let config = config.with_overrides(args.corner, args.scale, args.opacity)?;
    Ok(ApplyRequest {
        source: ImageSource::path(&args.source),
        watermark: ImageSource::path(&args.watermark),
        corner: config.watermark.corner,
        settings: config.settings(),
        output_dir: args
            .output_dir
            .clone()
            .unwrap_or_else(|| config.output_dir()),
    })
}

/// The error message, then each underlying cause not already spelled out in it.
fn error_lines(err: &dyn Error) -> Vec<String> {
    let mut lines = vec![format!("Error: {err}")];
    let mut shown = err.to_string();
    let mut cause = err.source();
    while let Some(e) = cause {
        let text = e.to_string();
        if !shown.contains(&text) {
            lines.push(format!("  caused by: {text}"));
        }
        shown = text;
        cause = e.source();
    }
    lines
}

/// Parse `WIDTHxHEIGHT` into dimensions.
fn parse_dimensions(s: &str) -> Result<Dimensions, String> {
    let (w, h) = s
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got '{s}'"))?;
    let width = w
        .trim()
        .parse()
        .map_err(|_| format!("invalid width in '{s}'"))?;
    let height = h
        .trim()
        .parse()
        .map_err(|_| format!("invalid height in '{s}'"))?;
    Ok(Dimensions::new(width, height))
}
