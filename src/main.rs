use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::{Context, Result};
use clap::Parser;
use pagecapture::browser::{HarReplay, PageLoader};
use pagecapture::config::{load_config, ScopeBuilder, ScopeOverrides};
use pagecapture::fetcher::ResourceFetcher;
use pagecapture::logging::init_logging;
use pagecapture::observer::run_capture;
use pagecapture::session::{print_intro, print_summary, MirrorSession};

#[derive(Parser, Debug)]
#[command(
    name = "pagecapture",
    version,
    about = "Mirror every resource a page requests into a local folder"
)]
struct Cli {
    /// Page to open
    #[arg(value_name = "TARGET_URL")]
    target: String,

    /// Folder the mirror is written to
    #[arg(value_name = "OUTPUT_FOLDER")]
    output: PathBuf,

    /// Comma separated hosts captured in addition to the target's
    #[arg(value_name = "ALLOWED_HOSTS")]
    allowed_hosts: Option<String>,

    /// Only capture the target host and the allowed hosts
    #[arg(long = "localOnly")]
    local_only: bool,

    /// Base used to resolve root-relative request URLs
    #[arg(long = "baseURL", value_name = "URL")]
    base_url: Option<String>,

    /// Origin stripped from captured text (repeatable)
    #[arg(long = "rewrite-origin", value_name = "ORIGIN")]
    rewrite_origins: Vec<String>,

    /// URL fragment answered with an inert script (repeatable)
    #[arg(long = "stub-marker", value_name = "TEXT")]
    stub_markers: Vec<String>,

    /// Replay the requests recorded in a HAR file instead of loading the page
    #[arg(long, value_name = "FILE")]
    har: Option<PathBuf>,

    /// Stop navigating after this many seconds
    #[arg(long, value_name = "SECS")]
    timeout: Option<u64>,

    /// Per-resource fetch timeout in seconds
    #[arg(long = "fetch-timeout", value_name = "SECS")]
    fetch_timeout: Option<u64>,

    /// Select a profile from pagecapture.json
    #[arg(short = 'P', long)]
    profile: Option<String>,

    /// Directory or file containing pagecapture.json
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// More diagnostics on stderr (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    fn overrides(&self) -> ScopeOverrides {
        ScopeOverrides {
            local_only: self.local_only,
            base_url: self.base_url.clone(),
            allowed_hosts: self
                .allowed_hosts
                .as_deref()
                .map(split_hosts)
                .unwrap_or_default(),
            rewrite_origins: self.rewrite_origins.clone(),
            stub_markers: self.stub_markers.clone(),
            fetch_timeout_secs: self.fetch_timeout,
            navigation_timeout_secs: self.timeout,
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let base_dir = std::env::current_dir()?;
    let config_target = cli
        .config
        .as_ref()
        .map(|p| resolve_relative(&base_dir, p))
        .unwrap_or_else(|| base_dir.clone());
    let config = load_config(&config_target).context("loading configuration")?;

    let settings = ScopeBuilder::new(cli.target.clone(), config, cli.profile.clone(), cli.overrides())
        .build()
        .context("invalid capture configuration")?;
    if let Some(profile) = &settings.profile_name {
        tracing::debug!(profile = %profile, "using capture profile");
    }

    let output_root = resolve_relative(&base_dir, &cli.output);
    tokio::fs::create_dir_all(&output_root)
        .await
        .with_context(|| format!("creating output folder {}", output_root.display()))?;

    let fetcher = ResourceFetcher::new(&settings.fetch).context("building HTTP client")?;
    let client = fetcher.client().clone();
    let session = Arc::new(MirrorSession::new(
        output_root.clone(),
        settings.scope,
        fetcher,
    ));

    print_intro(&session.scope().target, &output_root);

    let summary = match &cli.har {
        Some(har) => {
            let mut replay = HarReplay::new(resolve_relative(&base_dir, har));
            run_capture(&mut replay, session, settings.navigation_timeout).await
        }
        None => {
            let mut loader = PageLoader::new(client);
            run_capture(&mut loader, session, settings.navigation_timeout).await
        }
    };

    print_summary(&summary);
    Ok(())
}

fn split_hosts(csv: &str) -> Vec<String> {
    csv.split(',')
        .map(str::trim)
        .filter(|host| !host.is_empty())
        .map(str::to_string)
        .collect()
}

fn resolve_relative(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}
