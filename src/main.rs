use anyhow::{anyhow, Context as _, Result};
use clap::{Parser, Subcommand};
use postlist::build::{enhance_page, enhance_site, Context, SiteOptions};
use postlist::config::Config;
use postlist::fetch::HttpSource;
use postlist::telemetry::{self, LogFormat};
use std::path::{Path, PathBuf};
use url::Url;

/// Fills a static blog's post lists from its JSON post index.
#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Path to a `postlist.yaml`. By default it is searched for in the site
    /// directory and its ancestors.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log output format.
    #[arg(long, value_enum, global = true, default_value_t = LogFormat::Compact)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Enhance a single page and print (or write) the result.
    Page {
        /// The page's HTML file.
        file: PathBuf,

        /// The URL the page is served from. Defaults to the file's `file://`
        /// URL, so the index is read from next to the file.
        #[arg(long)]
        url: Option<Url>,

        /// Write the result here instead of stdout.
        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// Enhance every page of a built site.
    Site {
        /// The built site directory.
        #[arg(default_value = ".")]
        directory: PathBuf,

        /// The URL the site is served from; indexes are fetched from there
        /// instead of from disk.
        #[arg(long)]
        site_url: Option<Url>,

        /// Copy the site here and enhance the copy instead of rewriting pages
        /// in place. The directory is removed first if it exists.
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    telemetry::init(cli.log_format).map_err(|e| anyhow!("installing log subscriber: {}", e))?;

    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("starting runtime")?
        .block_on(run(cli))
}

async fn run(cli: Cli) -> Result<()> {
    let source = HttpSource::new()?;
    match cli.command {
        Command::Page { file, url, output } => {
            let file = file
                .canonicalize()
                .with_context(|| format!("resolving page `{}`", file.display()))?;
            let config = load_config(cli.config.as_deref(), parent(&file))?;
            let url = match url {
                Some(url) => url,
                None => Url::from_file_path(&file)
                    .map_err(|()| anyhow!("cannot address `{}` as a URL", file.display()))?,
            };
            let html = std::fs::read_to_string(&file)
                .with_context(|| format!("reading page `{}`", file.display()))?;

            let cx = Context {
                config: &config,
                source: &source,
                site_root: None,
            };
            let enhanced = enhance_page(&html, &url, &cx).await?;
            tracing::info!(page = %file.display(), outcome = ?enhanced.outcome, "enhanced page");
            match output {
                Some(output) => std::fs::write(&output, &enhanced.html)
                    .with_context(|| format!("writing `{}`", output.display()))?,
                None => print!("{}", enhanced.html),
            }
        }
        Command::Site {
            directory,
            site_url,
            output,
        } => {
            let directory = directory
                .canonicalize()
                .with_context(|| format!("resolving site `{}`", directory.display()))?;
            let config = load_config(cli.config.as_deref(), &directory)?;
            let report = enhance_site(
                &config,
                &source,
                &SiteOptions {
                    site_directory: &directory,
                    output_directory: output.as_deref(),
                    site_url: site_url.as_ref(),
                },
            )
            .await?;
            if report.failed > 0 {
                tracing::warn!(failed = report.failed, "some pages could not load their post index");
            }
        }
    }
    Ok(())
}

fn load_config(explicit: Option<&Path>, search_from: &Path) -> Result<Config> {
    let config = match explicit {
        Some(path) => Config::from_file(path)?,
        None => Config::from_directory(search_from)?,
    };
    Ok(config)
}

fn parent(file: &Path) -> &Path {
    file.parent().unwrap_or_else(|| Path::new("."))
}
