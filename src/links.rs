//! Relative link rewriting.
//!
//! Wiki sources link to each other and to shared assets with root-absolute
//! paths such as `href="/wiki/tools/editor.html"`. The compiled tree may be
//! served from `/wiki` on the public site or from a user's
//! `~/public_html/wiki` preview, so those links are rewritten into relative
//! form based on how deep the page sits below the output root:
//!
//! ```text
//! toc.html, intro.html        depth 1   href="../wiki/..."
//! tools/editor.html           depth 2   href="../../wiki/..."
//! tools/vim/plugins.html      depth 3   href="../../../wiki/..."
//! ```
//!
//! Only `href="/wiki` and `src="/wiki` are touched. Rewritten links no longer
//! start with `/wiki`, so running the rewrite twice changes nothing.

use std::num::NonZeroUsize;
use std::path::Path;

const WIKI_ATTRIBUTES: &[&str] = &["href", "src"];

/// Number of `../` segments a page needs to climb out of the `wiki` segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Depth(NonZeroUsize);

impl Depth {
    /// Depth of pages at the output root.
    pub const ROOT: Depth = Depth(NonZeroUsize::MIN);

    pub fn new(levels: usize) -> Option<Self> {
        NonZeroUsize::new(levels).map(Depth)
    }

    /// Depth of a directory given its path relative to the articles root.
    pub fn below_root(relative: &Path) -> Self {
        Depth(NonZeroUsize::MIN.saturating_add(relative.components().count()))
    }

    pub fn get(self) -> usize {
        self.0.get()
    }
}

/// Depth of `dir` relative to `root`: 1 for the root itself, 2 for its
/// immediate subdirectories, one more per level after that.
///
/// Returns `None` when `dir` is not inside `root`.
pub fn depth_from(root: &Path, dir: &Path) -> Option<Depth> {
    dir.strip_prefix(root).ok().map(Depth::below_root)
}

/// Rewrite root-absolute `/wiki` links into relative links for `depth`.
pub fn relativize(html: &str, depth: Depth) -> String {
    let up = "../".repeat(depth.get());
    WIKI_ATTRIBUTES.iter().fold(html.to_string(), |page, attr| {
        page.replace(
            &format!("{attr}=\"/wiki"),
            &format!("{attr}=\"{up}wiki"),
        )
    })
}
