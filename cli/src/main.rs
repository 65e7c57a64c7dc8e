use anyhow::Context;
use anyhow::Result;
use anyhow::bail;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use storefront_cli::DEFAULT_PAGE;
use storefront_cli::RunOptions;
use storefront_cli::RunReport;
use storefront_cli::parse_script;
use storefront_cli::run_script;
use storefront_home_search::HomeSearchConfig;
use storefront_recently_viewed::InMemoryStore;
use storefront_recently_viewed::JsonFileStore;
use storefront_recently_viewed::RecentlyViewedStore;
use storefront_section_renderer::HttpSectionRenderer;
use tokio::io::AsyncReadExt;
use tracing_subscriber::EnvFilter;
use url::Url;

const LOG_ENV: &str = "STOREFRONT_LOG";

/// Drive the storefront home search component against a live storefront.
///
/// The script is read from `--script` (or stdin) one command per line; see
/// the `script` module for the command set.
#[derive(Debug, Parser)]
#[command(name = "storefront-search", version)]
struct Cli {
    /// URL of the storefront page hosting the component. Section requests
    /// are resolved against it.
    #[arg(long, value_name = "URL")]
    location: Url,

    /// Page markup containing `<home-search-component>`. Defaults to a
    /// minimal page.
    #[arg(long, value_name = "FILE")]
    page: Option<PathBuf>,

    /// Component configuration (TOML).
    #[arg(long, short = 'c', value_name = "FILE")]
    config: Option<PathBuf>,

    /// JSON file holding the visitor's recently viewed product ids.
    #[arg(long, value_name = "FILE")]
    recently_viewed: Option<PathBuf>,

    /// Interaction script, `-` for stdin.
    #[arg(long, value_name = "FILE", default_value = "-")]
    script: String,

    /// Print the final state as JSON instead of text.
    #[arg(long)]
    json: bool,

    /// Debug-level logging on stderr.
    #[arg(long, short = 'v')]
    verbose: bool,

    /// Only log errors.
    #[arg(long, short = 'q', conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli);

    let config = match &cli.config {
        Some(path) => HomeSearchConfig::load(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => HomeSearchConfig::default(),
    };
    let page = match &cli.page {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read page from {}", path.display()))?,
        None => DEFAULT_PAGE.to_string(),
    };
    let recently_viewed: Arc<dyn RecentlyViewedStore> = match &cli.recently_viewed {
        Some(path) => Arc::new(JsonFileStore::new(path)),
        None => Arc::new(InMemoryStore::default()),
    };
    let renderer = HttpSectionRenderer::new()?;
    let commands = parse_script(&read_script(&cli.script).await?)?;

    let report = run_script(
        RunOptions {
            page,
            location: cli.location.clone(),
            config,
            renderer: Arc::new(renderer),
            recently_viewed,
            echo_navigations: !cli.json,
        },
        &commands,
    )
    .await?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }
    if !report.errors.is_empty() {
        bail!("{} unhandled error(s) during the run", report.errors.len());
    }
    Ok(())
}

async fn read_script(source: &str) -> Result<String> {
    if source == "-" {
        let mut script = String::new();
        tokio::io::stdin()
            .read_to_string(&mut script)
            .await
            .context("failed to read script from stdin")?;
        return Ok(script);
    }
    tokio::fs::read_to_string(source)
        .await
        .with_context(|| format!("failed to read script from {source}"))
}

fn print_report(report: &RunReport) {
    println!("open: {}", report.open);
    println!("term: {}", report.term);
    match report.selected {
        Some(index) => println!("selected: {index}"),
        None => println!("selected: input"),
    }
    for error in &report.errors {
        println!("error: {error}");
    }
    println!("{}", report.results);
}

/// `STOREFRONT_LOG` wins over `RUST_LOG`, which wins over the CLI flags.
fn init_tracing(cli: &Cli) {
    let default_directive = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "warn"
    };
    let filter = std::env::var(LOG_ENV)
        .ok()
        .or_else(|| std::env::var("RUST_LOG").ok())
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new(default_directive));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .try_init();
}
