//! Page templating.
//!
//! Every page is the header template, the page's fragment, and the footer
//! template joined by newlines. The header carries the page `<title>`; when a
//! fragment opens with a level-1 or level-2 heading on its first line, that
//! heading text replaces the header's title for that page only.
//!
//! Templates are loaded once per run and never mutated. [`with_title`]
//! returns a new header string, so the loaded header is reused untouched for
//! the next page.
//!
//! ## Footer stamp
//!
//! The footer is prefixed with a "last compiled" paragraph carrying the UTC
//! time the run started:
//!
//! ```text
//! <p><em>last compiled: 2024-03-01 12:00:00.000000</em></p>
//! ```

use crate::layout::WikiLayout;
use crate::source::{self, SourceError, SourceKind};
use chrono::{DateTime, Utc};
use maud::html;
use regex::{NoExpand, Regex};
use std::sync::LazyLock;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";

static TITLE_ELEMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<title>.*?</title>").expect("title pattern must compile"));

/// Header and footer shared by every page of one compilation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Templates {
    header: String,
    footer: String,
}

impl Templates {
    pub fn new(header: impl Into<String>, footer: impl Into<String>) -> Self {
        Self {
            header: header.into(),
            footer: footer.into(),
        }
    }

    /// Load `src/header.md` and `src/footer.md` through the Markdown compiler
    /// and stamp the footer with `compiled_at`.
    pub fn load(layout: &WikiLayout, compiled_at: DateTime<Utc>) -> Result<Self, SourceError> {
        let header = source::compile_as(&layout.header(), SourceKind::Markdown)?;
        let footer = source::compile_as(&layout.footer(), SourceKind::Markdown)?;
        Ok(Self::new(
            header,
            format!("{}{}", last_compiled_stamp(compiled_at), footer),
        ))
    }

    pub fn header(&self) -> &str {
        &self.header
    }

    pub fn footer(&self) -> &str {
        &self.footer
    }

    /// Compose a page, taking its title from the fragment when it has one.
    pub fn page(&self, fragment: &str) -> String {
        compose_page(&self.header, fragment, &self.footer)
    }

    /// Compose a page with a fixed title.
    pub fn titled_page(&self, title: &str, body: &str) -> String {
        join_page(&with_title(&self.header, title), body, &self.footer)
    }
}

/// Render the "last compiled" paragraph for the footer.
pub fn last_compiled_stamp(at: DateTime<Utc>) -> String {
    let stamp = at.format(TIMESTAMP_FORMAT).to_string();
    html! {
        p { em { "last compiled: " (stamp) } }
    }
    .into_string()
}

/// Return the text of a heading that makes up the fragment's entire first
/// line, if it is an `<h1>` or `<h2>` whose closing tag matches.
pub fn extract_title(fragment: &str) -> Option<&str> {
    let first_line = fragment.split('\n').next()?.trim_end_matches('\r');
    ["h1", "h2"].into_iter().find_map(|tag| {
        let open = format!("<{tag}>");
        let close = format!("</{tag}>");
        let inner = first_line.strip_prefix(&open)?.strip_suffix(&close)?;
        (!inner.contains(&close)).then_some(inner)
    })
}

/// Replace the content of the header's `<title>` element.
///
/// A header without a title element comes back unchanged. The title is
/// inserted literally; `$` carries no special meaning.
pub fn with_title(header: &str, title: &str) -> String {
    let replacement = format!("<title>{title}</title>");
    TITLE_ELEMENT
        .replace_all(header, NoExpand(&replacement))
        .into_owned()
}

/// Sandwich a fragment between header and footer.
pub fn compose_page(header: &str, fragment: &str, footer: &str) -> String {
    match extract_title(fragment) {
        Some(title) => join_page(&with_title(header, title), fragment, footer),
        None => join_page(header, fragment, footer),
    }
}

fn join_page(header: &str, body: &str, footer: &str) -> String {
    format!("{header}\n{body}\n{footer}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::*;
    use chrono::TimeZone;

    const HEADER: &str = "<html><head>\n<title>tilde wiki</title>\n</head><body>";

    // =========================================================================
    // Title extraction
    // =========================================================================

    #[test]
    fn extracts_h1() {
        assert_eq!(extract_title("<h1>Foo</h1>\n<p>body</p>"), Some("Foo"));
    }

    #[test]
    fn extracts_h2() {
        assert_eq!(extract_title("<h2>Bar baz</h2>"), Some("Bar baz"));
    }

    #[test]
    fn mismatched_levels_are_not_a_title() {
        assert_eq!(extract_title("<h1>Foo</h2>"), None);
        assert_eq!(extract_title("<h2>Foo</h1>"), None);
    }

    #[test]
    fn h3_is_not_a_title() {
        assert_eq!(extract_title("<h3>Foo</h3>"), None);
    }

    #[test]
    fn only_first_line_is_inspected() {
        assert_eq!(extract_title("<p>intro</p>\n<h1>Late</h1>"), None);
    }

    #[test]
    fn multi_line_heading_is_not_a_title() {
        assert_eq!(extract_title("<h1>Split\nheading</h1>"), None);
    }

    #[test]
    fn trailing_content_on_first_line_is_not_a_title() {
        assert_eq!(extract_title("<h1>Foo</h1><p>more</p>"), None);
    }

    #[test]
    fn two_headings_on_one_line_are_not_a_title() {
        assert_eq!(extract_title("<h1>a</h1><h1>b</h1>"), None);
    }

    #[test]
    fn carriage_return_is_ignored() {
        assert_eq!(extract_title("<h1>Foo</h1>\r\nbody"), Some("Foo"));
    }

    #[test]
    fn empty_fragment_has_no_title() {
        assert_eq!(extract_title(""), None);
    }

    // =========================================================================
    // Title substitution
    // =========================================================================

    #[test]
    fn with_title_replaces_title_content() {
        let updated = with_title(HEADER, "Welcome");
        assert!(updated.contains("<title>Welcome</title>"));
        assert!(!updated.contains("tilde wiki"));
    }

    #[test]
    fn with_title_leaves_header_without_title_unchanged() {
        let header = "<html><head></head><body>";
        assert_eq!(with_title(header, "Welcome"), header);
    }

    #[test]
    fn with_title_does_not_expand_dollar_signs() {
        let updated = with_title(HEADER, "costs $1 and ${name}");
        assert!(updated.contains("<title>costs $1 and ${name}</title>"));
    }

    #[test]
    fn with_title_does_not_touch_original() {
        let header = HEADER.to_string();
        let _ = with_title(&header, "Other");
        assert_eq!(header, HEADER);
    }

    // =========================================================================
    // Page composition
    // =========================================================================

    #[test]
    fn compose_uses_fragment_title() {
        let page = compose_page(HEADER, "<h1>Foo</h1>\n<p>x</p>\n", "<footer/>");
        assert!(page.contains("<title>Foo</title>"));
    }

    #[test]
    fn compose_keeps_default_title_without_heading() {
        let page = compose_page(HEADER, "<p>no heading</p>", "<footer/>");
        assert!(page.contains("<title>tilde wiki</title>"));
    }

    #[test]
    fn compose_joins_with_newlines() {
        let page = compose_page("H", "F", "T");
        assert_eq!(page, "H\nF\nT");
    }

    #[test]
    fn titled_page_overrides_title() {
        let templates = Templates::new(HEADER, "<footer/>");
        let page = templates.titled_page("table of contents", "<ul></ul>");
        assert!(page.contains("<title>table of contents</title>"));
        assert!(page.ends_with("<ul></ul>\n<footer/>"));
    }

    // =========================================================================
    // Loading
    // =========================================================================

    #[test]
    fn stamp_format() {
        let at = Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 5).unwrap();
        assert_eq!(
            last_compiled_stamp(at),
            "<p><em>last compiled: 2024-03-01 12:30:05.000000</em></p>"
        );
    }

    #[test]
    fn load_stamps_footer() {
        let tmp = wiki_fixture();
        let layout = WikiLayout::new(tmp.path()).unwrap();
        let templates = Templates::load(&layout, fixed_clock()).unwrap();

        assert!(templates.header().contains("<title>tilde wiki</title>"));
        assert!(
            templates
                .footer()
                .starts_with("<p><em>last compiled: 2024-03-01 12:00:00.000000</em></p>")
        );
        assert!(templates.footer().contains("</body>"));
    }

    #[test]
    fn load_fails_without_header() {
        let tmp = wiki_fixture();
        let layout = WikiLayout::new(tmp.path()).unwrap();
        std::fs::remove_file(layout.header()).unwrap();

        let result = Templates::load(&layout, fixed_clock());
        assert!(matches!(result, Err(SourceError::Io(_))));
    }
}
