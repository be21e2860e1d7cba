//! `vidgrab` CLI - download the video behind a web page

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use tracing::warn;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use vidgrab::orchestrator::truncate;
use vidgrab::{
    manual_instructions, Config, DownloadProgress, DownloadResult, Orchestrator, Outcome,
    ProgressCallback, RunReport,
};

#[derive(Parser)]
#[command(name = "vidgrab")]
#[command(about = "Find the video embedded in a web page and download it")]
#[command(version)]
struct Cli {
    /// Page or video URL (defaults to the configured `default_url`)
    url: Option<String>,

    /// Output directory
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// yt-dlp binary to use
    #[arg(long)]
    downloader: Option<String>,

    /// Do not hand the page URL itself to yt-dlp before scraping it
    #[arg(long)]
    skip_page_attempt: bool,

    /// Debug logging
    #[arg(short, long)]
    verbose: bool,

    /// Config file (default: ~/.config/vidgrab/config.toml)
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();

    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(output) = cli.output {
        config.output_dir = output;
    }
    if let Some(binary) = cli.downloader {
        config.downloader.binary = binary;
    }
    if cli.skip_page_attempt {
        config.try_page_url_first = false;
    }

    let url = cli.url.unwrap_or_else(|| config.default_url.clone());
    print_banner(&url, &config);

    let progress: ProgressCallback = Box::new(print_progress);
    let orchestrator = Orchestrator::from_config(&config, Some(progress))?;
    let report = orchestrator.run(&url).await;

    print_summary(&report, &config.output_dir);
    Ok(ExitCode::from(report.exit_code()))
}

fn print_banner(url: &str, config: &Config) {
    let rule = "=".repeat(60);
    println!("{rule}");
    println!("Video Downloader");
    println!("{rule}");
    println!("URL: {}", truncate(url, 70));
    println!("Output directory: {}", config.output_dir.display());
    println!();
}

fn print_success_banner(result: &DownloadResult, output_dir: &Path) {
    let rule = "=".repeat(60);
    println!();
    println!("{rule}");
    println!("VIDEO DOWNLOADED SUCCESSFULLY!");
    println!("{rule}");
    println!("Via: {}", result.strategy);
    match &result.path {
        Some(path) => println!("File: {}", path.display()),
        None => println!("Check the {} directory", output_dir.display()),
    }
}

#[allow(clippy::cast_precision_loss)]
fn print_progress(progress: DownloadProgress) {
    let mb = progress.bytes_downloaded as f64 / (1024.0 * 1024.0);
    match progress.fraction() {
        Some(fraction) => eprint!("\r  Progress: {:.1}% ({mb:.1} MB)", fraction * 100.0),
        None => eprint!("\r  Progress: {mb:.1} MB"),
    }
    let _ = std::io::stderr().flush();
}

fn print_summary(report: &RunReport, output_dir: &Path) {
    match &report.outcome {
        Outcome::Success(result) => {
            if result.strategy == "direct" {
                eprintln!();
            }
            print_success_banner(result, output_dir);
        }
        Outcome::Failure(reason) => {
            warn!("Download failed: {reason}");
            if report.likely_client_rendered {
                warn!("The page builds its player with JavaScript; try the steps below");
            }
            if report.needs_manual_instructions() {
                println!("{}", manual_instructions(&report.url, output_dir));
            }
        }
    }
}
