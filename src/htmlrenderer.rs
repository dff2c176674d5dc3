//! Renders a [`Listing`] into the list items that replace the content of a
//! page's post list. Every piece of text that comes from the post index or the
//! page is escaped, so index content is never interpreted as markup.

use crate::config::Messages;
use crate::listing::Listing;
use crate::post::Post;
use pulldown_cmark::escape::{escape_html, StrWrite};
use std::io;

/// The class carried by every rendered list item.
pub const ITEM_CLASS: &str = "post-item";

/// Renders list items for a [`Listing`], using the configured messages for
/// the empty and fallback cases.
pub struct HtmlRenderer<'a> {
    messages: &'a Messages,
}

impl<'a> HtmlRenderer<'a> {
    pub fn new(messages: &'a Messages) -> Self {
        HtmlRenderer { messages }
    }

    /// Renders `listing` into `w`.
    pub fn render<W: StrWrite>(&self, w: &mut W, listing: &Listing) -> io::Result<()> {
        match listing {
            Listing::Empty => self.on_message(w, &self.messages.empty),
            Listing::NoMatches { category: None } => {
                self.on_message(w, &format!("{}.", self.messages.no_matches))
            }
            Listing::NoMatches {
                category: Some(category),
            } => self.on_message(
                w,
                &format!("{} for '{}'.", self.messages.no_matches, category),
            ),
            Listing::Posts(posts) => {
                for post in posts {
                    self.on_post(w, post)?;
                }
                Ok(())
            }
        }
    }

    /// Renders the single item shown when the index couldn't be loaded.
    pub fn render_failure<W: StrWrite>(&self, w: &mut W) -> io::Result<()> {
        self.on_message(w, &self.messages.failed)
    }

    fn on_message<W: StrWrite>(&self, w: &mut W, message: &str) -> io::Result<()> {
        write!(w, r#"<li class="{}">"#, ITEM_CLASS)?;
        escape_html(&mut *w, message)?;
        w.write_str("</li>")
    }

    fn on_post<W: StrWrite>(&self, w: &mut W, post: &Post) -> io::Result<()> {
        write!(w, r#"<li class="{}"><a href=""#, ITEM_CLASS)?;
        escape_html(&mut *w, &post.href())?;
        w.write_str(r#""><span class="post-date">"#)?;
        escape_html(&mut *w, post.date())?;
        w.write_str(r#"</span><span class="post-sep">"#)?;
        escape_html(&mut *w, &self.messages.separator)?;
        w.write_str(r#"</span><span class="post-title">"#)?;
        escape_html(&mut *w, post.title())?;
        w.write_str("</span></a></li>")
    }
}

/// Renders `listing` into a new string.
pub fn to_html(messages: &Messages, listing: &Listing) -> io::Result<String> {
    let mut out = String::new();
    HtmlRenderer::new(messages).render(&mut out, listing)?;
    Ok(out)
}

/// Renders the load-failure item into a new string.
pub fn failure_html(messages: &Messages) -> io::Result<String> {
    let mut out = String::new();
    HtmlRenderer::new(messages).render_failure(&mut out)?;
    Ok(out)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::listing::select;
    use crate::post::PostIndex;

    fn post(date: &str, title: &str) -> Post {
        Post {
            date: Some(date.to_owned()),
            title: Some(title.to_owned()),
            ..Post::default()
        }
    }

    fn fixture(wanted: &str, listing: &Listing) -> io::Result<()> {
        assert_eq!(wanted, to_html(&Messages::default(), listing)?);
        Ok(())
    }

    #[test]
    fn test_render_empty() -> io::Result<()> {
        fixture(r#"<li class="post-item">No posts yet.</li>"#, &Listing::Empty)
    }

    #[test]
    fn test_render_no_matches() -> io::Result<()> {
        fixture(
            r#"<li class="post-item">No posts.</li>"#,
            &Listing::NoMatches { category: None },
        )
    }

    #[test]
    fn test_render_no_matches_for_category() -> io::Result<()> {
        fixture(
            r#"<li class="post-item">No posts for 'notes'.</li>"#,
            &Listing::NoMatches {
                category: Some("notes"),
            },
        )
    }

    #[test]
    fn test_render_post() -> io::Result<()> {
        let a = post("2024-01-01", "Hello");
        fixture(
            concat!(
                r#"<li class="post-item"><a href="posts/2024-01-01/">"#,
                r#"<span class="post-date">2024-01-01</span>"#,
                r#"<span class="post-sep"> – </span>"#,
                r#"<span class="post-title">Hello</span></a></li>"#,
            ),
            &Listing::Posts(vec![&a]),
        )
    }

    #[test]
    fn test_render_escapes_untrusted_text() -> io::Result<()> {
        let mut a = post("2024-01-01", "<script>alert(1)</script>");
        a.path = Some(r#"x" onclick="evil()"#.to_owned());
        let html = to_html(&Messages::default(), &Listing::Posts(vec![&a]))?;
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;alert(1)&lt;/script&gt;"));
        assert!(html.contains(r#"href="x&quot; onclick=&quot;evil()""#));
        Ok(())
    }

    #[test]
    fn test_render_item_count_matches_selection() -> io::Result<()> {
        let mut inactive = post("2024-02-01", "Gone");
        inactive.status = Some("inactive".to_owned());
        let index = PostIndex {
            posts: vec![
                post("2024-01-01", "A"),
                inactive,
                post("2024-03-01", "B"),
            ],
        };
        let html = to_html(&Messages::default(), &select(&index, None))?;
        assert_eq!(2, html.matches("<li ").count());
        assert!(html.find(">B<").unwrap() < html.find(">A<").unwrap());
        Ok(())
    }

    #[test]
    fn test_render_appends_to_writer() -> io::Result<()> {
        let a = post("2024-01-01", "<A>");
        let messages = Messages::default();
        let renderer = HtmlRenderer::new(&messages);
        let mut out = String::from("<ul>");
        renderer.render(&mut out, &Listing::Posts(vec![&a]))?;
        renderer.render_failure(&mut out)?;
        out.push_str("</ul>");
        assert!(out.starts_with(r#"<ul><li class="post-item"><a href="posts/2024-01-01/">"#));
        assert!(out.contains(r#"<span class="post-title">&lt;A&gt;</span></a></li>"#));
        assert!(out.ends_with(r#"<li class="post-item">Unable to load posts.</li></ul>"#));
        Ok(())
    }

    #[test]
    fn test_render_failure() -> io::Result<()> {
        assert_eq!(
            r#"<li class="post-item">Unable to load posts.</li>"#,
            failure_html(&Messages::default())?
        );
        Ok(())
    }
}
