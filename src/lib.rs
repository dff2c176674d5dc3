//! The library code for `postlist`, which fills a static blog's post lists
//! from its JSON post index. For each page, the work breaks down into:
//!
//! 1. Reading the page: does it have a post list, what category is it, which
//!    navigation links does it have ([`crate::page`])
//! 2. Loading the post index next to the page ([`crate::url`],
//!    [`crate::fetch`], [`crate::post`])
//! 3. Selecting and ordering the posts to list ([`crate::listing`]) and
//!    rendering them ([`crate::htmlrenderer`])
//! 4. Rewriting the page with the new list and the active category link
//!    ([`crate::page`])
//!
//! [`crate::build`] stitches these together for a single page and for a whole
//! site directory.

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]

pub mod build;
pub mod config;
pub mod fetch;
pub mod htmlrenderer;
pub mod listing;
pub mod page;
pub mod post;
pub mod telemetry;
pub mod url;
pub mod util;
