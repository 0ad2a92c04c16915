//! Wiki repository layout.
//!
//! A wiki repository is any directory with this shape:
//!
//! ```text
//! wiki/
//! └── src/
//!     ├── header.md      # Page header, must contain a <title> element
//!     ├── footer.md      # Page footer
//!     ├── logo.png       # Copied verbatim to the output root
//!     ├── main.css       # Copied verbatim to the output root
//!     └── articles/      # Article sources, arbitrarily nested
//!         ├── intro.md
//!         └── tools/
//!             └── editor.txt
//! ```
//!
//! [`WikiLayout`] resolves every one of those paths from the repository root
//! and reports which of them are missing.

use std::io;
use std::path::{Path, PathBuf};

/// Name of the generated table of contents page at the output root.
pub const TOC_FILE: &str = "toc.html";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WikiLayout {
    root: PathBuf,
}

impl WikiLayout {
    /// Resolve a layout rooted at `root`, made absolute against the current
    /// working directory.
    pub fn new(root: impl AsRef<Path>) -> io::Result<Self> {
        Ok(Self {
            root: std::path::absolute(root)?,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn src(&self) -> PathBuf {
        self.root.join("src")
    }

    pub fn header(&self) -> PathBuf {
        self.src().join("header.md")
    }

    pub fn footer(&self) -> PathBuf {
        self.src().join("footer.md")
    }

    pub fn logo(&self) -> PathBuf {
        self.src().join("logo.png")
    }

    pub fn stylesheet(&self) -> PathBuf {
        self.src().join("main.css")
    }

    pub fn articles(&self) -> PathBuf {
        self.src().join("articles")
    }

    /// Files copied unchanged to the output root.
    pub fn static_assets(&self) -> [PathBuf; 2] {
        [self.logo(), self.stylesheet()]
    }

    /// Required inputs that do not exist, in layout order.
    ///
    /// The articles root must be a directory; everything else a file.
    pub fn missing_inputs(&self) -> Vec<PathBuf> {
        let files = [self.header(), self.footer(), self.logo(), self.stylesheet()];
        let mut missing: Vec<PathBuf> = files.into_iter().filter(|p| !p.is_file()).collect();
        let articles = self.articles();
        if !articles.is_dir() {
            missing.push(articles);
        }
        missing
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::*;
    use std::fs;

    #[test]
    fn relative_root_is_made_absolute() {
        let layout = WikiLayout::new("some/wiki").unwrap();
        assert!(layout.root().is_absolute());
        assert!(layout.header().ends_with("some/wiki/src/header.md"));
    }

    #[test]
    fn complete_fixture_has_no_missing_inputs() {
        let tmp = wiki_fixture();
        let layout = WikiLayout::new(tmp.path()).unwrap();
        assert!(layout.missing_inputs().is_empty());
    }

    #[test]
    fn empty_directory_misses_everything() {
        let tmp = tempfile::TempDir::new().unwrap();
        let layout = WikiLayout::new(tmp.path()).unwrap();
        let missing = layout.missing_inputs();
        assert_eq!(
            missing,
            vec![
                layout.header(),
                layout.footer(),
                layout.logo(),
                layout.stylesheet(),
                layout.articles(),
            ]
        );
    }

    #[test]
    fn articles_must_be_a_directory() {
        let tmp = wiki_fixture();
        let layout = WikiLayout::new(tmp.path()).unwrap();
        fs::remove_dir_all(layout.articles()).unwrap();
        fs::write(layout.articles(), "not a dir").unwrap();

        assert_eq!(layout.missing_inputs(), vec![layout.articles()]);
    }

    #[test]
    fn static_assets_are_logo_and_stylesheet() {
        let layout = WikiLayout::new("/wiki").unwrap();
        let [logo, css] = layout.static_assets();
        assert_eq!(logo, PathBuf::from("/wiki/src/logo.png"));
        assert_eq!(css, PathBuf::from("/wiki/src/main.css"));
    }
}
