//! vidlink entry point.
//!
//! ```text
//! vidlink decode frame.png              Decode one stored frame
//! vidlink encode -i data.bin -o f.png   Render a payload into a frame
//! vidlink load file:///tmp/f.png        Run the full load/decode cycle
//! vidlink --config <path>               Load a custom config TOML
//! vidlink --gen-config                  Write default config to stdout
//! ```

use std::io::Write;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use vidlink_core::{GridGeometry, Url, bits};
use vidlink_cli::CliError;
use vidlink_cli::config::CliConfig;
use vidlink_cli::output::{self, OutputFormat};
use vidlink_cli::{frame, session};

// ── CLI ──────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "vidlink", about = "Recover byte payloads from black/white video frames")]
struct Cli {
    /// Path to configuration TOML file.
    #[arg(short, long, default_value = "vidlink.toml")]
    config: PathBuf,

    /// Print the default configuration to stdout and exit.
    #[arg(long)]
    gen_config: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Decode a single frame image.
    Decode {
        /// Frame image (PNG or BMP); sides must be multiples of 8.
        image: PathBuf,
        #[arg(short, long, value_enum, default_value_t)]
        format: OutputFormat,
        /// Drop trailing zero padding.
        #[arg(long)]
        trim: bool,
    },
    /// Render a payload file into a frame image.
    Encode {
        #[arg(short, long)]
        input: PathBuf,
        #[arg(short, long)]
        output: PathBuf,
        /// Frame width (defaults to the configured surface).
        #[arg(long)]
        width: Option<u32>,
        /// Frame height (defaults to the configured surface).
        #[arg(long)]
        height: Option<u32>,
    },
    /// Load a frame through the decoder service and file player.
    Load {
        /// `file://` URL or path of a frame image.
        source: String,
        #[arg(short, long, value_enum, default_value_t)]
        format: OutputFormat,
        #[arg(long)]
        trim: bool,
        /// Do not retry rate-limited loads.
        #[arg(long)]
        no_retry: bool,
    },
}

// ── Main ─────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // --gen-config: dump defaults and exit.
    if cli.gen_config {
        let text = toml::to_string_pretty(&CliConfig::default())?;
        println!("{text}");
        return Ok(());
    }

    let config = CliConfig::load(&cli.config);

    // Init tracing. Logs go to stderr so payloads on stdout stay clean.
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    info!("vidlink v{}", env!("CARGO_PKG_VERSION"));

    let Some(command) = cli.command else {
        eprintln!("no command given; see `vidlink --help`");
        std::process::exit(2);
    };

    match command {
        Command::Decode { image, format, trim } => {
            let grid = frame::load_frame(&image, None)?;
            let bytes = bits::decode_checked(&grid)?;
            print_payload(&image.display().to_string(), &bytes, format, trim)?;
        }
        Command::Encode {
            input,
            output,
            width,
            height,
        } => {
            let geometry = GridGeometry::new(
                width.unwrap_or(config.surface.width),
                height.unwrap_or(config.surface.height),
            )?;
            let payload = std::fs::read(&input)?;
            let grid = bits::encode(&payload, geometry)?;
            frame::save_frame(&grid, &output)?;
            info!(
                bytes = payload.len(),
                capacity = geometry.payload_len(),
                "wrote {}",
                output.display()
            );
        }
        Command::Load {
            source,
            format,
            trim,
            no_retry,
        } => {
            let url = resolve_source(&source)?;
            let bytes = session::run_load(&config, url.clone(), no_retry).await?;
            print_payload(url.as_str(), &bytes, format, trim)?;
        }
    }

    Ok(())
}

/// Accept either a URL or a path to an existing file.
fn resolve_source(source: &str) -> Result<Url, CliError> {
    if let Ok(url) = Url::parse(source) {
        return Ok(url);
    }
    let path = Path::new(source)
        .canonicalize()
        .map_err(|_| CliError::InvalidSource(source.to_string()))?;
    Url::from_file_path(&path).map_err(|_| CliError::InvalidSource(source.to_string()))
}

fn print_payload(
    source: &str,
    bytes: &[u8],
    format: OutputFormat,
    trim: bool,
) -> std::io::Result<()> {
    let bytes = if trim { output::trim_padding(bytes) } else { bytes };
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    output::write_payload(&mut out, source, bytes, format)?;
    out.flush()
}
