// css-cache-buster: append content digests to url(...) references in CSS.
//
// Thin build-step wrapper around the library: loads a URL table from JSON,
// rewrites each stylesheet, and writes the result to stdout, an output
// directory, or back in place.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;

use css_cache_buster::{BusterConfig, CacheBuster, ResourceHasher, TransformError, UrlTable};

/// Append content-derived cache-busting tokens to resource URLs in CSS
#[derive(Parser, Debug)]
#[command(name = "css-cache-buster")]
#[command(version)]
#[command(about = "Append content-derived cache-busting tokens to resource URLs in CSS")]
struct Cli {
    /// Stylesheets to rewrite
    #[arg(required = true)]
    css: Vec<PathBuf>,

    /// JSON object mapping URLs as written in the CSS to local paths or http(s) URLs
    #[arg(short, long)]
    table: PathBuf,

    /// Write results into this directory instead of stdout / in place
    #[arg(short, long)]
    out_dir: Option<PathBuf>,

    /// Timeout in seconds for each remote request and each local read
    #[arg(long, default_value_t = css_cache_buster::utils::DEFAULT_REQUEST_TIMEOUT_SECS)]
    timeout: u64,

    /// Timeout in seconds for establishing remote connections
    #[arg(long, default_value_t = css_cache_buster::utils::DEFAULT_CONNECT_TIMEOUT_SECS)]
    connect_timeout: u64,

    /// Maximum number of resources hashed at once (default: all)
    #[arg(short, long)]
    jobs: Option<usize>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

/// Where a rewritten stylesheet goes
enum Destination {
    Stdout,
    File(PathBuf),
}

fn destination(cli: &Cli, input: &Path) -> Result<Destination> {
    match &cli.out_dir {
        Some(dir) => {
            let name = input
                .file_name()
                .with_context(|| format!("Input has no file name: {}", input.display()))?;
            Ok(Destination::File(dir.join(name)))
        }
        None if cli.css.len() == 1 => Ok(Destination::Stdout),
        None => Ok(Destination::File(input.to_path_buf())),
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::from(2)
        }
    }
}

async fn run(cli: Cli) -> Result<ExitCode> {
    let config = BusterConfig::builder()
        .request_timeout_secs(cli.timeout)
        .read_timeout_secs(cli.timeout)
        .connect_timeout_secs(cli.connect_timeout)
        .max_concurrent_hashes(cli.jobs)
        .build()
        .context("Invalid configuration")?;

    let table = UrlTable::from_path(&cli.table).await?;
    if table.is_empty() {
        log::warn!(
            "URL table {} is empty; stylesheets pass through unchanged",
            cli.table.display()
        );
    }

    let hasher = ResourceHasher::new(config).context("Failed to build HTTP client")?;
    let buster = CacheBuster::new(table, hasher);

    if let Some(dir) = &cli.out_dir {
        tokio::fs::create_dir_all(dir)
            .await
            .with_context(|| format!("Failed to create output directory {}", dir.display()))?;
    }

    for input in &cli.css {
        let bytes = tokio::fs::read(input)
            .await
            .with_context(|| format!("Failed to read {}", input.display()))?;

        let shutdown = async {
            // If the handler cannot be installed, never signal shutdown
            if tokio::signal::ctrl_c().await.is_err() {
                std::future::pending::<()>().await;
            }
        };

        let rewritten = match buster.transform_until(bytes, shutdown).await {
            Ok(css) => css,
            Err(TransformError::Cancelled) => {
                eprintln!("\nCache busting cancelled");
                return Ok(ExitCode::from(130));
            }
            Err(e) => {
                return Err(e).with_context(|| format!("Failed to process {}", input.display()));
            }
        };

        match destination(&cli, input)? {
            Destination::Stdout => print!("{rewritten}"),
            Destination::File(path) => {
                tokio::fs::write(&path, rewritten)
                    .await
                    .with_context(|| format!("Failed to write {}", path.display()))?;
                log::info!("Rewrote {} -> {}", input.display(), path.display());
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}
