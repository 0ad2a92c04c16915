//! Table of contents.
//!
//! Every compiled page yields an [`Article`]. Once the walk is done, the
//! articles are rendered into `toc.html` at the output root:
//!
//! ```text
//! unsorted articles          <- articles directly under src/articles
//!   intro
//! tools                      <- <h2>, one path component
//!   editor
//! tools/vim → "vim"          <- <h3>, two path components
//!   plugins
//! ```
//!
//! Articles are grouped by their source directory. A new heading and list
//! start every time the directory changes from one article to the next, so
//! the grouping follows the order the articles are handed over. With
//! [`TocOrder::Sorted`] that order is by directory components and then by
//! href; with [`TocOrder::Traversal`] it is the order the walk produced.

use crate::links::{self, Depth};
use crate::template::Templates;
use maud::{Markup, html};
use serde::{Deserialize, Serialize};

/// Deepest heading level HTML offers.
const MAX_HEADING_LEVEL: usize = 6;

/// One compiled page as listed in the table of contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Article {
    /// Output filename without its extension.
    pub title: String,
    /// Path from the output root, `/`-separated.
    pub href: String,
    /// Source directory relative to the articles root, `/`-separated.
    /// Empty for top-level articles.
    pub path: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TocOrder {
    #[default]
    Sorted,
    Traversal,
}

/// Render the complete table of contents page, relativized for the root.
pub fn render_toc(templates: &Templates, title: &str, articles: &[Article], order: TocOrder) -> String {
    let ordered = order_articles(articles, order);
    let body = render_body(&ordered).into_string();
    links::relativize(&templates.titled_page(title, &body), Depth::ROOT)
}

fn order_articles(articles: &[Article], order: TocOrder) -> Vec<&Article> {
    let mut ordered: Vec<&Article> = articles.iter().collect();
    if order == TocOrder::Sorted {
        ordered.sort_by(|a, b| {
            a.path
                .split('/')
                .cmp(b.path.split('/'))
                .then_with(|| a.href.cmp(&b.href))
        });
    }
    ordered
}

fn render_body(articles: &[&Article]) -> Markup {
    let (unsorted, nested): (Vec<&Article>, Vec<&Article>) =
        articles.iter().copied().partition(|a| a.path.is_empty());
    let groups = group_consecutive(&nested);

    html! {
        @if !unsorted.is_empty() {
            h2 { "unsorted articles" }
            (article_list(&unsorted))
        }
        @for (path, members) in &groups {
            (heading(heading_level(path), last_component(path)))
            (article_list(members))
        }
    }
}

/// Split into runs of articles sharing a path, keeping first-seen order.
fn group_consecutive<'a>(articles: &[&'a Article]) -> Vec<(&'a str, Vec<&'a Article>)> {
    let mut groups: Vec<(&'a str, Vec<&'a Article>)> = Vec::new();
    for &article in articles {
        match groups.last_mut() {
            Some((path, members)) if *path == article.path => members.push(article),
            _ => groups.push((article.path.as_str(), vec![article])),
        }
    }
    groups
}

fn heading_level(path: &str) -> usize {
    (path.split('/').count() + 1).min(MAX_HEADING_LEVEL)
}

fn last_component(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

fn heading(level: usize, text: &str) -> Markup {
    html! {
        @match level {
            0 | 1 => { h1 { (text) } },
            2 => { h2 { (text) } },
            3 => { h3 { (text) } },
            4 => { h4 { (text) } },
            5 => { h5 { (text) } },
            _ => { h6 { (text) } }
        }
    }
}

fn article_list(articles: &[&Article]) -> Markup {
    html! {
        ul {
            @for article in articles {
                li { a href=(article.href) { (article.title) } }
            }
        }
    }
}
