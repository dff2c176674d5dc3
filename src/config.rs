//! Loads `postlist.yaml`. Every field has a default, so a site without a
//! config file gets the conventional selectors and messages.

use crate::util::open;
use lol_html::Selector;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// The name of the project file searched for in the site directory and its
/// ancestors.
pub const CONFIG_FILE_NAME: &str = "postlist.yaml";

/// Where a page looks for the post index.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct IndexSettings {
    /// The file name joined onto each page's URL, i.e. the index sits next to
    /// the page.
    pub file_name: String,

    /// A fixed index location (a path or URL) resolved against the site root.
    /// When set, every page reads this one file instead of its sibling.
    pub location: Option<String>,
}

impl Default for IndexSettings {
    fn default() -> Self {
        IndexSettings {
            file_name: String::from("posts.json"),
            location: None,
        }
    }
}

/// The page elements the enhancer reads and writes.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct Selectors {
    /// The list whose content is replaced.
    pub post_list: String,

    /// Candidate containers for the category attribute, in priority order.
    /// The first selector that matches any element wins.
    pub containers: Vec<String>,

    /// The attribute on the container holding the page's category.
    pub category_attribute: String,

    /// Navigation links whose active state tracks the category.
    pub category_links: String,

    /// The class toggled on the active navigation link.
    pub active_class: String,

    /// `href` values of the link to the unfiltered listing, in priority
    /// order.
    pub root_links: Vec<String>,
}

impl Default for Selectors {
    fn default() -> Self {
        Selectors {
            post_list: String::from("#post-list"),
            containers: vec![String::from(".container"), String::from("main")],
            category_attribute: String::from("data-category"),
            category_links: String::from(".category-link"),
            active_class: String::from("active"),
            root_links: vec![String::from("index.html"), String::from("./")],
        }
    }
}

/// User-visible text.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct Messages {
    /// Shown when the index has no posts.
    pub empty: String,

    /// Shown when the index couldn't be loaded.
    pub failed: String,

    /// Prefix of the message shown when nothing survives filtering; rendered
    /// as `{no_matches}.` or `{no_matches} for '{category}'.`.
    pub no_matches: String,

    /// Placed between a post's date and its title.
    pub separator: String,
}

impl Default for Messages {
    fn default() -> Self {
        Messages {
            empty: String::from("No posts yet."),
            failed: String::from("Unable to load posts."),
            no_matches: String::from("No posts"),
            separator: String::from(" – "),
        }
    }
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub index: IndexSettings,
    pub selectors: Selectors,
    pub messages: Messages,
}

impl Config {
    /// Searches `dir` and then each of its ancestors for
    /// [`CONFIG_FILE_NAME`]. Returns the default configuration if no file is
    /// found.
    pub fn from_directory(dir: &Path) -> Result<Config> {
        let path = dir.join(CONFIG_FILE_NAME);
        if path.is_file() {
            Config::from_file(&path)
        } else {
            match dir.parent() {
                Some(parent) => Config::from_directory(parent),
                None => {
                    tracing::debug!("no `{}` found; using defaults", CONFIG_FILE_NAME);
                    Ok(Config::default())
                }
            }
        }
    }

    /// Loads and validates a configuration file.
    pub fn from_file(path: &Path) -> Result<Config> {
        let file = open(path, "config")?;
        let config: Config = serde_yaml::from_reader(file).map_err(|err| Error::Parse {
            path: path.to_owned(),
            err,
        })?;
        config.validate()?;
        tracing::debug!(path = %path.display(), "loaded configuration");
        Ok(config)
    }

    /// Parses a configuration from YAML text.
    pub fn from_yaml(input: &str) -> Result<Config> {
        let config: Config = serde_yaml::from_str(input).map_err(|err| Error::Parse {
            path: PathBuf::from("<inline>"),
            err,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Checks that every selector parses, so rewriting never has to, and that
    /// the active class is a single class name.
    pub fn validate(&self) -> Result<()> {
        let selectors = &self.selectors;
        for selector in std::iter::once(&selectors.post_list)
            .chain(selectors.containers.iter())
            .chain(std::iter::once(&selectors.category_links))
        {
            selector
                .parse::<Selector>()
                .map_err(|err| Error::Selector {
                    selector: selector.clone(),
                    reason: err.to_string(),
                })?;
        }
        let class = &selectors.active_class;
        if class.is_empty() || class.contains(char::is_whitespace) {
            return Err(Error::ActiveClass(class.clone()));
        }
        if selectors.root_links.iter().any(|href| href.is_empty()) {
            return Err(Error::EmptyRootLink);
        }
        if self.index.file_name.is_empty() {
            return Err(Error::EmptyIndexFileName);
        }
        Ok(())
    }
}

/// The result of loading a [`Config`].
pub type Result<T> = std::result::Result<T, Error>;

/// Represents a problem loading a [`Config`].
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Returned when the config file can't be opened.
    #[error(transparent)]
    Open(#[from] crate::util::OpenError),

    /// Returned when the config file isn't valid YAML for a [`Config`].
    #[error("parsing config file `{}`: {err}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        err: serde_yaml::Error,
    },

    /// Returned when a configured selector isn't a valid CSS selector.
    #[error("invalid selector `{selector}`: {reason}")]
    Selector { selector: String, reason: String },

    /// Returned when `selectors.active_class` isn't a single class name.
    #[error("`selectors.active_class` must be one class name, got `{0}`")]
    ActiveClass(String),

    /// Returned when `selectors.root_links` has an empty entry.
    #[error("`selectors.root_links` must not contain empty links")]
    EmptyRootLink,

    /// Returned when `index.file_name` is empty.
    #[error("`index.file_name` must not be empty")]
    EmptyIndexFileName,
}
