//! # Tilde Wiki
//!
//! A compiler for a wiki shared by the users of a tilde server. The wiki is a
//! git repository of Markdown, plain text, and HTML articles; this crate
//! turns it into a tree of static HTML pages that can be served from the
//! public site or from a user's `~/public_html` preview.
//!
//! # Architecture: Single-Pass Compilation
//!
//! ```text
//! src/header.md, src/footer.md  →  Templates        (loaded once, immutable)
//! src/articles/**/*             →  ArticleWalk      (one page per file, written as walked)
//!                                    │
//!                                    └─ Vec<Article> →  toc.html
//! ```
//!
//! Each article goes through the same steps:
//!
//! ```text
//! source file → fragment → header + fragment + footer → relativized page → <stem>.html
//! ```
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`compile`] | Walks the article tree, mirrors directories, writes pages and the table of contents |
//! | [`source`] | Per-file conversion: Markdown, plain text, or pass-through HTML |
//! | [`template`] | Header/footer loading, title extraction and substitution |
//! | [`links`] | Rewrites `/wiki` links relative to a page's depth |
//! | [`toc`] | Renders the table of contents from the collected articles |
//! | [`layout`] | Names and validates the paths of a wiki repository |
//! | [`clear`] | Guarded emptying of an output directory |
//! | [`permissions`] | Observer that makes created paths group/world writable |
//! | [`config`] | `tilde-wiki.toml` loading, merging, and validation |
//! | [`vcs`] | Clone, commit, push, pull and reset through the `git` binary |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Pages Are Written As They Are Walked
//!
//! [`compile::ArticleWalk`] is a lazy iterator. A page is compiled and written
//! when the walk reaches its source file, and only the small
//! [`toc::Article`] record is kept for the table of contents. A failure stops
//! the walk where it is and leaves what was already written.
//!
//! ## Observers Instead of Side Effects
//!
//! The compiler does not know about file modes. Every path it creates is
//! reported to a [`compile::CreateObserver`]; the CLI passes
//! [`permissions::PermissionFixup`] when publishing to the shared location and
//! a no-op otherwise.
//!
//! ## Relative Links
//!
//! Authors write links as `/wiki/...`. The compiled tree is served under
//! different prefixes depending on who builds it, so every page has those
//! links rewritten to climb back out of its own depth. See [`links`].
//!
//! ## Maud For Generated Markup
//!
//! The only HTML this crate writes itself (the table of contents body and the
//! "last compiled" stamp) is built with [Maud](https://maud.lambda.xyz/), so
//! article titles are escaped without any extra effort.

pub mod clear;
pub mod compile;
pub mod config;
pub mod layout;
pub mod links;
pub mod output;
pub mod permissions;
pub mod source;
pub mod template;
pub mod toc;
pub mod vcs;

#[cfg(test)]
pub(crate) mod test_helpers;
