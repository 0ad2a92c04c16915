//! Shared test utilities for the tilde-wiki test suite.
//!
//! Builds a complete wiki repository in a temp directory and offers small
//! helpers for adding articles and reading compiled output.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let src = wiki_fixture();
//! write_article(src.path(), "tools/editor.txt", "Use vim.");
//! let dest = TempDir::new().unwrap();
//!
//! compile_with(src.path(), dest.path(), &fixed_options(), &mut NoopObserver).unwrap();
//! assert!(read_output(dest.path(), "tools/editor.html").contains("Use vim."));
//! ```

use crate::compile::CompileOptions;
use chrono::{DateTime, TimeZone, Utc};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

// =========================================================================
// Fixture contents
// =========================================================================

pub const FIXTURE_HEADER: &str = r#"<!DOCTYPE html>
<html>
<head>
<title>tilde wiki</title>
<link rel="stylesheet" href="/wiki/main.css">
</head>
<body>
<a href="/wiki/toc.html"><img src="/wiki/logo.png"></a>
"#;

pub const FIXTURE_FOOTER: &str = "[table of contents](/wiki/toc.html)\n\n</body>\n</html>\n";

pub const FIXTURE_CSS: &str = "body { font-family: monospace; }\n";

/// PNG signature; enough for a byte-for-byte copy check.
pub const FIXTURE_LOGO: &[u8] = &[0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a];

// =========================================================================
// Fixture setup
// =========================================================================

/// Create a wiki repository with templates, assets, and an empty articles
/// directory.
///
/// Tests get an isolated copy they can mutate without affecting other tests.
pub fn wiki_fixture() -> TempDir {
    let tmp = TempDir::new().unwrap();
    let src = tmp.path().join("src");
    fs::create_dir_all(src.join("articles")).unwrap();
    fs::write(src.join("header.md"), FIXTURE_HEADER).unwrap();
    fs::write(src.join("footer.md"), FIXTURE_FOOTER).unwrap();
    fs::write(src.join("main.css"), FIXTURE_CSS).unwrap();
    fs::write(src.join("logo.png"), FIXTURE_LOGO).unwrap();
    tmp
}

pub fn articles_dir(root: &Path) -> PathBuf {
    root.join("src/articles")
}

/// Write an article under `src/articles`, creating parent directories.
pub fn write_article(root: &Path, rel: &str, content: &str) -> PathBuf {
    let path = articles_dir(root).join(rel);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&path, content).unwrap();
    path
}

/// Read a compiled file. Panics with the path on failure.
pub fn read_output(dest: &Path, rel: &str) -> String {
    let path = dest.join(rel);
    fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("cannot read output '{}': {e}", path.display()))
}

// =========================================================================
// Deterministic options
// =========================================================================

/// 2024-03-01 12:00:00 UTC.
pub fn fixed_clock() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
}

/// Default options with the clock pinned to [`fixed_clock`].
pub fn fixed_options() -> CompileOptions {
    CompileOptions {
        compiled_at: fixed_clock(),
        ..CompileOptions::default()
    }
}

// =========================================================================
// HTML extractors
// =========================================================================

/// Every `<a href="...">` target, in document order.
pub fn anchor_hrefs(html: &str) -> Vec<String> {
    html.split("<a href=\"")
        .skip(1)
        .filter_map(|rest| rest.split('"').next())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixture_has_complete_layout() {
        let tmp = wiki_fixture();
        let src = tmp.path().join("src");
        for file in ["header.md", "footer.md", "main.css", "logo.png"] {
            assert!(src.join(file).is_file(), "missing {file}");
        }
        assert_eq!(fs::read_dir(articles_dir(tmp.path())).unwrap().count(), 0);
    }

    #[test]
    fn anchor_hrefs_in_order() {
        let html = r#"<a href="a.html">a</a><p/><a href="b/c.html">c</a>"#;
        assert_eq!(anchor_hrefs(html), vec!["a.html", "b/c.html"]);
    }
}
