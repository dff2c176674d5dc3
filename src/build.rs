//! Exports [`enhance_page`], which fills one page's post list from the post
//! index, and [`enhance_site`], which does so for every page of a built site.
//!
//! A failure to load the index is never an error here: the page gets the
//! configured fallback message and the cause is logged. Errors returned from
//! this module are about the pages themselves (I/O, URLs, rewriting).

use crate::config::Config;
use crate::fetch::IndexSource;
use crate::htmlrenderer::{failure_html, to_html};
use crate::listing::{select, Listing};
use crate::page::{self, Edit};
use crate::post::PostIndex;
use crate::url::{as_directory, index_url};
use std::fs;
use std::path::{Path, PathBuf};
use url::Url;
use walkdir::WalkDir;

/// How a page's post list ended up.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// The page has no post list and was left alone.
    Skipped,

    /// The index loaded; `posts` items were rendered (zero means an empty or
    /// no-match message was shown instead).
    Rendered { posts: usize },

    /// The index couldn't be loaded and the fallback message was shown.
    Failed,
}

/// The result of enhancing a single page.
#[derive(Clone, Debug)]
pub struct Enhanced {
    pub html: String,
    pub outcome: Outcome,
}

/// Everything [`enhance_page`] needs besides the page itself.
pub struct Context<'a> {
    pub config: &'a Config,
    pub source: &'a dyn IndexSource,

    /// The site's root URL, used to resolve a fixed index location.
    pub site_root: Option<&'a Url>,
}

/// Fills the post list of the page at `page_url` whose markup is `html`.
///
/// If the page has no post list it is returned unchanged and nothing is
/// fetched. Otherwise the index next to the page (or at the configured
/// location) is loaded, filtered by the page's category, and rendered into the
/// list, and the matching category link is marked active.
pub async fn enhance_page(html: &str, page_url: &Url, cx: &Context<'_>) -> Result<Enhanced> {
    let selectors = &cx.config.selectors;
    let info = page::scan(html, selectors)?;
    if !info.has_post_list {
        return Ok(Enhanced {
            html: html.to_owned(),
            outcome: Outcome::Skipped,
        });
    }

    let url = index_url(
        page_url,
        cx.site_root,
        &cx.config.index.file_name,
        cx.config.index.location.as_deref(),
    )?;

    let (list_html, mark_navigation, outcome) = match cx.source.load(&url).await {
        Ok(value) => {
            let index = PostIndex::from_value(&value);
            let listing = select(&index, info.category.as_deref());
            let posts = match &listing {
                Listing::Posts(posts) => posts.len(),
                _ => 0,
            };
            tracing::debug!(
                page = %page_url,
                category = info.category.as_deref().unwrap_or_default(),
                posts,
                "rendering post list"
            );
            (
                to_html(&cx.config.messages, &listing)?,
                listing.marks_navigation(),
                Outcome::Rendered { posts },
            )
        }
        Err(err) => {
            tracing::error!(page = %page_url, "failed to load posts: {}", err);
            (failure_html(&cx.config.messages)?, false, Outcome::Failed)
        }
    };

    let html = page::rewrite(
        html,
        selectors,
        &Edit {
            list_html: &list_html,
            mark_navigation,
            active_link: info.active_link(&selectors.root_links),
        },
    )?;
    Ok(Enhanced { html, outcome })
}

/// Options for [`enhance_site`].
pub struct SiteOptions<'a> {
    /// The built site to enhance.
    pub site_directory: &'a Path,

    /// Where to write the enhanced site. `None` rewrites pages in place.
    pub output_directory: Option<&'a Path>,

    /// The URL the site is served from. Pages are addressed as
    /// `{site_url}/{relative path}` and indexes are fetched from there. When
    /// `None`, pages are addressed by their `file://` URLs.
    pub site_url: Option<&'a Url>,
}

/// Tallies from an [`enhance_site`] run.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Report {
    /// HTML files visited.
    pub pages: usize,

    /// Pages whose post list was filled.
    pub enhanced: usize,

    /// Pages that got the fallback message.
    pub failed: usize,
}

/// Enhances every `*.html` page under the site directory, one page at a time.
/// With an output directory, the old output directory is removed and the
/// site is copied there first. The output directory must not overlap the site
/// directory.
pub async fn enhance_site(
    config: &Config,
    source: &dyn IndexSource,
    options: &SiteOptions<'_>,
) -> Result<Report> {
    let root = match options.output_directory {
        Some(output) => {
            let site = resolve(options.site_directory)?;
            let resolved = resolve(output)?;
            if resolved.starts_with(&site) || site.starts_with(&resolved) {
                return Err(Error::OverlappingOutput {
                    site,
                    output: resolved,
                });
            }
            rmdir(output)?;
            copy_dir(options.site_directory, output)?;
            output.to_owned()
        }
        None => options.site_directory.to_owned(),
    };
    let root = root.canonicalize().map_err(|err| Error::Io {
        path: root.clone(),
        err,
    })?;

    let site_root = match options.site_url {
        Some(url) => as_directory(url.clone()),
        None => Url::from_directory_path(&root).map_err(|()| Error::FileUrl(root.clone()))?,
    };
    let cx = Context {
        config,
        source,
        site_root: Some(&site_root),
    };

    let mut report = Report::default();
    for entry in WalkDir::new(&root).sort_by_file_name() {
        let entry = entry?;
        if !entry.file_type().is_file() || !is_html(entry.path()) {
            continue;
        }
        report.pages += 1;

        let path = entry.path();
        let url = page_url(&root, path, &site_root)?;
        let html = match fs::read_to_string(path) {
            Ok(html) => html,
            Err(err) if err.kind() == std::io::ErrorKind::InvalidData => {
                tracing::warn!(page = %path.display(), "skipping page that isn't UTF-8");
                continue;
            }
            Err(err) => {
                return Err(Error::Io {
                    path: path.to_owned(),
                    err,
                })
            }
        };

        let enhanced = enhance_page(&html, &url, &cx).await?;
        match enhanced.outcome {
            Outcome::Skipped => continue,
            Outcome::Rendered { .. } => report.enhanced += 1,
            Outcome::Failed => report.failed += 1,
        }
        fs::write(path, &enhanced.html).map_err(|err| Error::Io {
            path: path.to_owned(),
            err,
        })?;
        tracing::info!(page = %path.display(), outcome = ?enhanced.outcome, "wrote page");
    }

    tracing::info!(
        pages = report.pages,
        enhanced = report.enhanced,
        failed = report.failed,
        "enhanced site"
    );
    Ok(report)
}

fn is_html(path: &Path) -> bool {
    path.extension().map_or(false, |ext| ext == "html")
}

/// Addresses the page at `path` (somewhere under `root`) relative to
/// `site_root`.
fn page_url(root: &Path, path: &Path, site_root: &Url) -> Result<Url> {
    // strip_prefix shouldn't fail since every walked path is under `root`
    let relative = path.strip_prefix(root).map_err(|_| Error::FileUrl(path.to_owned()))?;
    let relative: Vec<String> = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    let mut url = site_root.clone();
    url.path_segments_mut()
        .map_err(|()| Error::FileUrl(path.to_owned()))?
        .pop_if_empty()
        .extend(&relative);
    Ok(url)
}

/// Makes `path` absolute with symlinks resolved. Trailing components that
/// don't exist yet are kept as given.
fn resolve(path: &Path) -> Result<PathBuf> {
    let absolute = if path.is_absolute() {
        path.to_owned()
    } else {
        std::env::current_dir()
            .map_err(|err| Error::Io {
                path: path.to_owned(),
                err,
            })?
            .join(path)
    };

    let mut missing = Vec::new();
    let mut existing = absolute.as_path();
    loop {
        match existing.canonicalize() {
            Ok(resolved) => {
                return Ok(missing
                    .iter()
                    .rev()
                    .fold(resolved, |acc: PathBuf, name| acc.join(name)))
            }
            Err(err) => match (existing.parent(), existing.file_name()) {
                (Some(parent), Some(name)) => {
                    missing.push(name);
                    existing = parent;
                }
                _ => {
                    return Err(Error::Io {
                        path: path.to_owned(),
                        err,
                    })
                }
            },
        }
    }
}

fn copy_dir(src: &Path, dst: &Path) -> Result<()> {
    let io_err = |path: &Path| {
        let path = path.to_owned();
        move |err: std::io::Error| Error::Io { path, err }
    };
    fs::create_dir_all(dst).map_err(io_err(dst))?;
    for entry in fs::read_dir(src).map_err(io_err(src))? {
        let entry = entry.map_err(io_err(src))?;
        let from = entry.path();
        let to = dst.join(entry.file_name());
        if entry.file_type().map_err(io_err(&from))?.is_dir() {
            copy_dir(&from, &to)?;
        } else {
            fs::copy(&from, &to).map_err(io_err(&from))?;
        }
    }
    Ok(())
}

fn rmdir(dir: &Path) -> Result<()> {
    match fs::remove_dir_all(dir) {
        Ok(x) => Ok(x),
        Err(e) => match e.kind() {
            std::io::ErrorKind::NotFound => Ok(()),
            _ => Err(Error::Clean {
                path: dir.to_owned(),
                err: e,
            }),
        },
    }
}

type Result<T> = std::result::Result<T, Error>;

/// The error type for enhancing pages. Index load failures are not errors;
/// see [`Outcome::Failed`].
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Returned for errors reading or rewriting page HTML.
    #[error(transparent)]
    Page(#[from] page::Error),

    /// Returned when an index URL can't be resolved.
    #[error("resolving index URL: {0}")]
    Url(#[from] url::ParseError),

    /// Returned when a path can't be turned into a URL.
    #[error("cannot address `{}` as a URL", .0.display())]
    FileUrl(PathBuf),

    /// Returned for I/O problems while cleaning the output directory.
    #[error("cleaning directory `{}`: {err}", path.display())]
    Clean {
        path: PathBuf,
        #[source]
        err: std::io::Error,
    },

    /// Returned when the output directory is the site directory or nested
    /// with it.
    #[error(
        "output directory `{}` overlaps site directory `{}`",
        output.display(),
        site.display()
    )]
    OverlappingOutput { site: PathBuf, output: PathBuf },

    /// Returned for I/O problems reading, writing, or copying pages.
    #[error("`{}`: {err}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        err: std::io::Error,
    },

    /// Returned for errors walking the site directory.
    #[error(transparent)]
    WalkDir(#[from] walkdir::Error),

    /// Returned when rendering the list into memory fails.
    #[error("rendering post list: {0}")]
    Render(#[from] std::io::Error),
}
