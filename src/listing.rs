//! Selects which posts a page lists. This is a pure function of the post index
//! and the page's category; rendering the selection is left to
//! [`crate::htmlrenderer`].

use crate::post::{Post, PostIndex};

/// The outcome of selecting posts for a page.
#[derive(Debug, PartialEq, Eq)]
pub enum Listing<'a> {
    /// The index had no posts at all.
    Empty,

    /// The index had posts, but none survived the category and status
    /// filters. Carries the category, if any, for the message.
    NoMatches { category: Option<&'a str> },

    /// The posts to list, most recent first.
    Posts(Vec<&'a Post>),
}

impl Listing<'_> {
    /// Whether the page's navigation should be updated after rendering this
    /// listing. An empty index leaves the navigation alone.
    pub fn marks_navigation(&self) -> bool {
        !matches!(self, Listing::Empty)
    }
}

/// Filters `index` down to the active posts in `category` (all categories
/// when `None` or empty) and sorts them by date, most recent first. Dates are
/// compared as plain strings and the sort is stable, so posts sharing a date
/// keep their index order.
pub fn select<'a>(index: &'a PostIndex, category: Option<&'a str>) -> Listing<'a> {
    if index.is_empty() {
        return Listing::Empty;
    }

    let category = category.filter(|c| !c.is_empty());
    let mut posts: Vec<&Post> = index
        .posts
        .iter()
        .filter(|p| category.map_or(true, |c| p.in_category(c)))
        .filter(|p| !p.is_inactive())
        .collect();

    if posts.is_empty() {
        return Listing::NoMatches { category };
    }

    posts.sort_by(|a, b| b.date().cmp(a.date()));
    Listing::Posts(posts)
}

#[cfg(test)]
mod test {
    use super::*;

    fn post(date: &str, title: &str, category: &str) -> Post {
        Post {
            date: Some(date.to_owned()),
            title: Some(title.to_owned()),
            category: Some(category.to_owned()),
            ..Post::default()
        }
    }

    fn titles<'a>(listing: &Listing<'a>) -> Vec<&'a str> {
        match listing {
            Listing::Posts(posts) => posts.iter().map(|&p| p.title()).collect(),
            _ => Vec::new(),
        }
    }

    #[test]
    fn test_select_empty_index() {
        let index = PostIndex::default();
        assert_eq!(Listing::Empty, select(&index, None));
        assert_eq!(Listing::Empty, select(&index, Some("x")));
        assert!(!select(&index, None).marks_navigation());
    }

    #[test]
    fn test_select_filters_by_category() {
        let index = PostIndex {
            posts: vec![post("2024-01-01", "A", "x"), post("2024-03-01", "B", "y")],
        };
        assert_eq!(vec!["A"], titles(&select(&index, Some("x"))));
    }

    #[test]
    fn test_select_category_is_case_sensitive() {
        let index = PostIndex {
            posts: vec![post("2024-01-01", "A", "Rust")],
        };
        assert_eq!(
            Listing::NoMatches {
                category: Some("rust")
            },
            select(&index, Some("rust"))
        );
    }

    #[test]
    fn test_select_empty_category_means_all() {
        let index = PostIndex {
            posts: vec![post("2024-01-01", "A", "x"), post("2024-03-01", "B", "y")],
        };
        assert_eq!(vec!["B", "A"], titles(&select(&index, Some(""))));
    }

    #[test]
    fn test_select_drops_inactive_posts() {
        let mut hidden = post("2024-05-01", "Hidden", "x");
        hidden.status = Some("inactive".to_owned());
        let mut draft = post("2024-04-01", "Draft", "x");
        draft.status = Some("draft".to_owned());
        let index = PostIndex {
            posts: vec![hidden, draft, post("2024-01-01", "A", "x")],
        };
        assert_eq!(vec!["Draft", "A"], titles(&select(&index, None)));
    }

    #[test]
    fn test_select_all_inactive_is_no_matches() {
        let mut a = post("2024-01-01", "A", "x");
        a.status = Some("inactive".to_owned());
        let index = PostIndex { posts: vec![a] };

        let listing = select(&index, None);
        assert_eq!(Listing::NoMatches { category: None }, listing);
        assert!(listing.marks_navigation());
        assert_eq!(
            Listing::NoMatches {
                category: Some("x")
            },
            select(&index, Some("x"))
        );
    }

    #[test]
    fn test_select_sorts_by_date_descending() {
        let undated = Post {
            title: Some("Undated".to_owned()),
            ..Post::default()
        };
        let index = PostIndex {
            posts: vec![
                post("2023-12-31", "C", ""),
                undated,
                post("2024-03-01", "A", ""),
                post("2024-01-15", "B", ""),
            ],
        };

        let listing = select(&index, None);
        assert_eq!(vec!["A", "B", "C", "Undated"], titles(&listing));
        if let Listing::Posts(posts) = &listing {
            for pair in posts.windows(2) {
                assert!(pair[0].date() >= pair[1].date());
            }
        }
    }

    #[test]
    fn test_select_keeps_index_order_for_equal_dates() {
        let index = PostIndex {
            posts: vec![
                post("2024-01-01", "First", ""),
                post("2024-01-01", "Second", ""),
            ],
        };
        assert_eq!(vec!["First", "Second"], titles(&select(&index, None)));
    }

    #[test]
    fn test_select_does_not_mutate_index() {
        let index = PostIndex {
            posts: vec![post("2024-01-01", "A", ""), post("2024-03-01", "B", "")],
        };
        let before = index.clone();
        let _ = select(&index, None);
        assert_eq!(before, index);
    }
}
