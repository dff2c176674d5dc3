//! Defines the [`Post`] record and the logic for reading post records out of a
//! JSON index document. The index is external input written by whatever
//! generates the site, so fields are read leniently: a field that is missing
//! or isn't a string is treated as absent.

use serde_json::Value;

/// The `status` value which excludes a post from every listing.
pub const INACTIVE_STATUS: &str = "inactive";

/// A single entry from the post index.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Post {
    /// The publication date. Compared as a plain string, so it should sort
    /// lexicographically (e.g., `2024-03-01`).
    pub date: Option<String>,

    /// The display title.
    pub title: Option<String>,

    /// The category used for filtering. `None` and the empty string both mean
    /// uncategorized.
    pub category: Option<String>,

    /// The post status. Only [`INACTIVE_STATUS`] has any meaning.
    pub status: Option<String>,

    /// An explicit link target. When absent, [`Post::href`] derives one from
    /// the date.
    pub path: Option<String>,
}

impl Post {
    /// Reads a post from a JSON value. Returns `None` if the value isn't a
    /// JSON object.
    pub fn from_value(value: &Value) -> Option<Post> {
        let object = value.as_object()?;
        let field = |name: &str| {
            object
                .get(name)
                .and_then(Value::as_str)
                .map(ToOwned::to_owned)
        };
        Some(Post {
            date: field("date"),
            title: field("title"),
            category: field("category"),
            status: field("status"),
            path: field("path"),
        })
    }

    /// The date used for ordering. A missing date sorts as the empty string.
    pub fn date(&self) -> &str {
        self.date.as_deref().unwrap_or_default()
    }

    pub fn title(&self) -> &str {
        self.title.as_deref().unwrap_or_default()
    }

    pub fn is_inactive(&self) -> bool {
        self.status.as_deref() == Some(INACTIVE_STATUS)
    }

    /// Whether the post belongs to `category` (exact, case-sensitive match).
    pub fn in_category(&self, category: &str) -> bool {
        self.category.as_deref().unwrap_or_default() == category
    }

    /// The link target for the post: `path` if it is set and non-empty,
    /// otherwise `posts/{date}/`.
    pub fn href(&self) -> String {
        match self.path.as_deref() {
            Some(path) if !path.is_empty() => path.to_owned(),
            _ => format!("posts/{}/", self.date()),
        }
    }
}

/// The contents of an index document after it has been interpreted as a list
/// of posts.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PostIndex {
    pub posts: Vec<Post>,
}

impl PostIndex {
    /// Interprets a parsed index document. Anything other than a JSON array
    /// yields an empty index; array elements that aren't objects are skipped.
    pub fn from_value(value: &Value) -> PostIndex {
        let items = match value.as_array() {
            Some(items) => items,
            None => {
                tracing::debug!("post index is not an array; treating it as empty");
                return PostIndex::default();
            }
        };

        let posts = items
            .iter()
            .enumerate()
            .filter_map(|(i, item)| match Post::from_value(item) {
                Some(post) => Some(post),
                None => {
                    tracing::warn!(position = i, "skipping post index entry that is not an object");
                    None
                }
            })
            .collect();
        PostIndex { posts }
    }

    pub fn is_empty(&self) -> bool {
        self.posts.is_empty()
    }
}
