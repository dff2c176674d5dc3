//! Resolves where a page finds its post index.

use url::{ParseError, Url};

/// Resolves the index URL for the page at `page_url`.
///
/// By default the index is the page's sibling: the final path segment of the
/// page URL is replaced with `file_name`, so `https://example.org/blog/index.html`
/// and `https://example.org/blog/` both resolve to
/// `https://example.org/blog/posts.json`. When `location` is set it is
/// resolved against `site_root` (or against the page when there is no site
/// root) instead, which pins every page to one canonical index. A leading `/`
/// in `location` means the site root, not the root of the host or filesystem.
pub fn index_url(
    page_url: &Url,
    site_root: Option<&Url>,
    file_name: &str,
    location: Option<&str>,
) -> Result<Url> {
    let mut url = match (location, site_root) {
        (Some(location), Some(root)) => root.join(location.trim_start_matches('/'))?,
        (Some(location), None) => page_url.join(location)?,
        (None, _) => page_url.join(file_name)?,
    };
    url.set_query(None);
    url.set_fragment(None);
    Ok(url)
}

/// Makes sure `url` ends in a slash, so joining onto it treats it as a
/// directory rather than a file.
pub fn as_directory(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

type Result<T> = std::result::Result<T, ParseError>;
