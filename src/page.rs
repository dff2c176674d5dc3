//! Reads and rewrites a page's HTML. A page is processed in two streaming
//! passes: [`scan`] collects what the enhancer needs to know about the page
//! (whether it has a post list, its category, its navigation links), then
//! [`rewrite`] replaces the post list's content and updates the navigation
//! links' active class.

use crate::config::Selectors;
use lol_html::html_content::ContentType;
use lol_html::{element, rewrite_str, RewriteStrSettings};
use std::cell::RefCell;
use std::rc::Rc;

/// What [`scan`] learned about a page.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PageInfo {
    /// Whether the page contains a post list.
    pub has_post_list: bool,

    /// The page's category, if any. Empty attribute values are `None`.
    pub category: Option<String>,

    /// The `href` of each category link, in document order. Links without an
    /// `href` are recorded as the empty string so positions stay aligned.
    pub category_links: Vec<String>,
}

impl PageInfo {
    /// Picks the category link to mark as active: the first link whose `href`
    /// ends with `{category}/`, or with no category, the first link whose
    /// `href` equals one of `root_links` (earlier entries take priority).
    pub fn active_link(&self, root_links: &[String]) -> Option<usize> {
        match self.category.as_deref() {
            Some(category) => {
                let suffix = format!("{}/", category);
                self.category_links
                    .iter()
                    .position(|href| href.ends_with(&suffix))
            }
            None => root_links.iter().find_map(|root| {
                self.category_links
                    .iter()
                    .position(|href| href == root)
            }),
        }
    }
}

#[derive(Default)]
struct ScanState {
    has_post_list: bool,

    /// The category attribute of the first element matching each container
    /// selector, in selector order. The outer `Option` records whether the
    /// selector matched at all.
    containers: Vec<Option<Option<String>>>,

    category_links: Vec<String>,
}

/// Collects a [`PageInfo`] from `html`.
pub fn scan(html: &str, selectors: &Selectors) -> Result<PageInfo> {
    let state = Rc::new(RefCell::new(ScanState {
        containers: vec![None; selectors.containers.len()],
        ..ScanState::default()
    }));

    let mut handlers = vec![
        element!(selectors.post_list, {
            let state = Rc::clone(&state);
            move |_el| {
                state.borrow_mut().has_post_list = true;
                Ok(())
            }
        }),
        element!(selectors.category_links, {
            let state = Rc::clone(&state);
            move |el| {
                let href = el.get_attribute("href").unwrap_or_default();
                state.borrow_mut().category_links.push(href);
                Ok(())
            }
        }),
    ];
    for (i, container) in selectors.containers.iter().enumerate() {
        let state = Rc::clone(&state);
        let attribute = selectors.category_attribute.clone();
        handlers.push(element!(container, move |el| {
            let mut state = state.borrow_mut();
            if state.containers[i].is_none() {
                state.containers[i] = Some(el.get_attribute(&attribute));
            }
            Ok(())
        }));
    }

    rewrite_str(
        html,
        RewriteStrSettings {
            element_content_handlers: handlers,
            ..RewriteStrSettings::default()
        },
    )
    .map_err(|err| Error::Rewrite(err.to_string()))?;

    let state = state.borrow();
    // The first selector that matched anything decides, even if its element
    // has no category.
    let category = state
        .containers
        .iter()
        .find_map(|matched| matched.as_ref())
        .and_then(|attribute| attribute.clone())
        .filter(|category| !category.is_empty());

    Ok(PageInfo {
        has_post_list: state.has_post_list,
        category,
        category_links: state.category_links.clone(),
    })
}

/// Describes how [`rewrite`] should change a page.
pub struct Edit<'a> {
    /// The HTML that replaces the post list's content.
    pub list_html: &'a str,

    /// Whether to update the category links at all.
    pub mark_navigation: bool,

    /// The position (among category links) of the link to mark active.
    pub active_link: Option<usize>,
}

/// Applies `edit` to `html`, returning the new document.
pub fn rewrite(html: &str, selectors: &Selectors, edit: &Edit) -> Result<String> {
    let list_html = edit.list_html.to_owned();
    let active_class = selectors.active_class.clone();
    let active_link = edit.active_link;
    let mut seen_links = 0usize;

    let mut handlers = vec![element!(selectors.post_list, move |el| {
        el.set_inner_content(&list_html, ContentType::Html);
        Ok(())
    })];
    if edit.mark_navigation {
        handlers.push(element!(selectors.category_links, move |el| {
            let position = seen_links;
            seen_links += 1;
            let class = el.get_attribute("class").unwrap_or_default();
            if let Some(updated) = toggle_class(&class, &active_class, Some(position) == active_link)
            {
                el.set_attribute("class", &updated)?;
            }
            Ok(())
        }));
    }

    rewrite_str(
        html,
        RewriteStrSettings {
            element_content_handlers: handlers,
            ..RewriteStrSettings::default()
        },
    )
    .map_err(|err| Error::Rewrite(err.to_string()))
}

/// Returns the new value of a `class` attribute with `class` removed and, if
/// `active`, appended. Returns `None` when the attribute doesn't need to
/// change.
fn toggle_class(attribute: &str, class: &str, active: bool) -> Option<String> {
    let has_class = attribute.split_whitespace().any(|c| c == class);
    if !has_class && !active {
        return None;
    }

    let mut classes: Vec<&str> = attribute
        .split_whitespace()
        .filter(|c| *c != class)
        .collect();
    if active {
        classes.push(class);
    }
    let updated = classes.join(" ");
    if updated == attribute {
        None
    } else {
        Some(updated)
    }
}

/// The result of reading or rewriting a page.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents a failure to process a page's HTML.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Returned when the HTML rewriter fails.
    #[error("rewriting page: {0}")]
    Rewrite(String),
}

#[cfg(test)]
mod test {
    use super::*;

    const NAV: &str = r#"<nav>
<a class="category-link" href="index.html">All</a>
<a class="category-link active" href="notes/">Notes</a>
<a class="category-link" href="travel/">Travel</a>
</nav>"#;

    fn page(container: &str) -> String {
        format!(
            "<html><body>{}{}<ul id=\"post-list\"><li>Loading…</li></ul></div></body></html>",
            NAV, container
        )
    }

    #[test]
    fn test_scan_reads_primary_container() -> Result<()> {
        let info = scan(
            &page(r#"<div class="container" data-category="travel">"#),
            &Selectors::default(),
        )?;
        assert!(info.has_post_list);
        assert_eq!(Some("travel"), info.category.as_deref());
        assert_eq!(
            vec!["index.html", "notes/", "travel/"],
            info.category_links
        );
        Ok(())
    }

    #[test]
    fn test_scan_falls_back_to_main() -> Result<()> {
        let html = format!(
            r#"<main data-category="notes">{}<ul id="post-list"></ul></main>"#,
            NAV
        );
        let info = scan(&html, &Selectors::default())?;
        assert_eq!(Some("notes"), info.category.as_deref());
        Ok(())
    }

    #[test]
    fn test_scan_primary_container_wins_even_without_category() -> Result<()> {
        let html = r#"<main data-category="notes"><div class="container"><ul id="post-list"></ul></div></main>"#;
        let info = scan(html, &Selectors::default())?;
        assert_eq!(None, info.category);
        Ok(())
    }

    #[test]
    fn test_scan_empty_category_is_none() -> Result<()> {
        let info = scan(
            &page(r#"<div class="container" data-category="">"#),
            &Selectors::default(),
        )?;
        assert_eq!(None, info.category);
        Ok(())
    }

    #[test]
    fn test_scan_without_post_list() -> Result<()> {
        let info = scan("<html><body><p>About</p></body></html>", &Selectors::default())?;
        assert!(!info.has_post_list);
        Ok(())
    }

    #[test]
    fn test_active_link_for_category() {
        let info = PageInfo {
            has_post_list: true,
            category: Some("notes".to_owned()),
            category_links: vec!["index.html".into(), "../notes/".into(), "travel/".into()],
        };
        assert_eq!(Some(1), info.active_link(&Selectors::default().root_links));
    }

    #[test]
    fn test_active_link_prefers_index_html_over_dot_slash() {
        let info = PageInfo {
            has_post_list: true,
            category: None,
            category_links: vec!["./".into(), "notes/".into(), "index.html".into()],
        };
        assert_eq!(Some(2), info.active_link(&Selectors::default().root_links));
    }

    #[test]
    fn test_active_link_falls_back_to_dot_slash() {
        let info = PageInfo {
            has_post_list: true,
            category: None,
            category_links: vec!["notes/".into(), "./".into()],
        };
        assert_eq!(Some(1), info.active_link(&Selectors::default().root_links));
    }

    #[test]
    fn test_active_link_missing_is_none() {
        let info = PageInfo {
            has_post_list: true,
            category: Some("recipes".to_owned()),
            category_links: vec!["index.html".into(), "notes/".into()],
        };
        assert_eq!(None, info.active_link(&Selectors::default().root_links));
    }

    #[test]
    fn test_active_link_first_suffix_match_wins() {
        // `notes/` and `archive/notes/` share the suffix; the first in
        // document order is marked.
        let info = PageInfo {
            has_post_list: true,
            category: Some("notes".to_owned()),
            category_links: vec!["archive/notes/".into(), "notes/".into()],
        };
        assert_eq!(Some(0), info.active_link(&Selectors::default().root_links));
    }

    #[test]
    fn test_rewrite_replaces_list_and_moves_active_class() -> Result<()> {
        let html = page(r#"<div class="container" data-category="travel">"#);
        let out = rewrite(
            &html,
            &Selectors::default(),
            &Edit {
                list_html: "<li>new</li>",
                mark_navigation: true,
                active_link: Some(2),
            },
        )?;
        assert!(out.contains(r#"<ul id="post-list"><li>new</li></ul>"#));
        assert!(!out.contains("Loading"));
        assert!(out.contains(r#"<a class="category-link" href="notes/">"#));
        assert!(out.contains(r#"<a class="category-link active" href="travel/">"#));
        assert_eq!(1, out.matches("active").count());
        Ok(())
    }

    #[test]
    fn test_rewrite_without_navigation_leaves_links() -> Result<()> {
        let html = page(r#"<div class="container">"#);
        let out = rewrite(
            &html,
            &Selectors::default(),
            &Edit {
                list_html: "<li>failed</li>",
                mark_navigation: false,
                active_link: None,
            },
        )?;
        assert!(out.contains(NAV));
        Ok(())
    }

    #[test]
    fn test_rewrite_with_no_match_clears_active() -> Result<()> {
        let out = rewrite(
            &page(r#"<div class="container">"#),
            &Selectors::default(),
            &Edit {
                list_html: "",
                mark_navigation: true,
                active_link: None,
            },
        )?;
        assert!(!out.contains("active"));
        Ok(())
    }

    #[test]
    fn test_toggle_class() {
        assert_eq!(None, toggle_class("category-link", "active", false));
        assert_eq!(
            Some("category-link active".to_owned()),
            toggle_class("category-link", "active", true)
        );
        assert_eq!(
            Some("category-link".to_owned()),
            toggle_class("active category-link", "active", false)
        );
        assert_eq!(None, toggle_class("category-link active", "active", true));
        assert_eq!(
            Some("category-link active".to_owned()),
            toggle_class("active category-link", "active", true)
        );
    }
}
