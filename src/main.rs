//! ytdl-formats
//!
//! Reads a saved `youtube-dl -F` report and prints the format spec to download.
//!
//! # Usage
//!
//! ```bash
//! youtube-dl -F "https://www.youtube.com/watch?v=abc123" | ytdl-formats -d 1080
//! ytdl-formats --input formats.txt --definition 720 --mode auto --json
//! ytdl-formats --input formats.txt --list
//! ```

use anyhow::{bail, Context, Result};
use clap::Parser;
use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use tracing::info;

use ytdl_formats::{
    parse_formats, DownloadFormat, DownloadOptions, FormatRecord, FormatSelector, Selection,
    SelectionMode, SelectorConfig,
};

#[derive(Parser, Debug)]
#[command(name = "ytdl-formats", version, about = "Pick download formats from a youtube-dl -F report")]
struct Cli {
    /// Report file (reads stdin when omitted)
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Target definition (e.g. 1080, 720p)
    #[arg(short, long, default_value = "1080p")]
    definition: String,

    /// Selection mode: paired, combined or auto
    #[arg(long)]
    mode: Option<SelectionMode>,

    /// Print the parsed catalog instead of selecting
    #[arg(long)]
    list: bool,

    /// Output in JSON format
    #[arg(long)]
    json: bool,

    /// Selector config file (JSON)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print full downloader arguments for this video id
    #[arg(long, conflicts_with_all = ["json", "list"])]
    video_id: Option<String>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    let report = read_report(cli.input.as_ref())?;
    let formats = parse_formats(&report);
    if formats.is_empty() {
        bail!("No formats found in report");
    }
    info!("Parsed {} format(s)", formats.len());

    if cli.list {
        return print_catalog(&formats, cli.json);
    }

    let config = load_config(cli.config.as_ref())?;
    let mode = cli.mode.unwrap_or(config.mode);
    let selector = FormatSelector::new(config);

    let selection = selector.select_with_mode(&formats, &cli.definition, mode);
    if let Selection::NotFound { reason } = &selection {
        bail!(
            "{} ({}); available: {}",
            reason,
            cli.definition,
            FormatSelector::available_definitions(&formats).join(", ")
        );
    }
    let format = DownloadFormat::from_selection(&selection)
        .context("Selection has no download format")?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&selection)?);
    } else if let Some(video_id) = &cli.video_id {
        let args = DownloadOptions::default()
            .with_format(format)
            .to_args(video_id);
        println!("{}", args.join(" "));
    } else {
        println!("{}", format);
    }

    Ok(())
}

fn read_report(input: Option<&PathBuf>) -> Result<String> {
    match input {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("Failed to read report {}", path.display())),
        None => {
            let mut report = String::new();
            io::stdin()
                .read_to_string(&mut report)
                .context("Failed to read report from stdin")?;
            Ok(report)
        }
    }
}

fn load_config(path: Option<&PathBuf>) -> Result<SelectorConfig> {
    let Some(path) = path else {
        return Ok(SelectorConfig::default());
    };
    let json = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    SelectorConfig::from_json_str(&json)
        .with_context(|| format!("Invalid config {}", path.display()))
}

fn print_catalog(formats: &[FormatRecord], json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(formats)?);
        return Ok(());
    }

    for f in formats {
        let detail = match (&f.video, &f.audio) {
            (Some(v), Some(a)) => format!(
                "{}x{} {} {} + {}",
                v.width, v.height, v.definition, v.codec, a.codec
            ),
            (Some(v), None) => {
                format!("{}x{} {} {}", v.width, v.height, v.definition, v.codec)
            }
            (None, Some(a)) => format!("{} {}k", a.codec, a.bitrate_kbps),
            (None, None) => String::new(),
        };
        println!(
            "{:<6} {:<5} {:<11} {:>12} {}",
            f.code,
            f.extension,
            f.media_kind().to_string(),
            f.file_size,
            detail
        );
    }
    Ok(())
}
