//! Source file compilation.
//!
//! Turns a single article source file into an HTML fragment. The behavior is
//! picked once from the file extension and captured as a [`SourceKind`]:
//!
//! | Extension | Kind | Output |
//! |-----------|------|--------|
//! | `.md` | [`SourceKind::Markdown`] | CommonMark rendered by `pulldown-cmark` |
//! | `.txt` | [`SourceKind::PlainText`] | blank-line separated blocks wrapped in `<p>` |
//! | anything else | [`SourceKind::Passthrough`] | raw content, treated as an HTML fragment |
//!
//! The pass-through fallback can be narrowed with [`ExtensionPolicy::Reject`],
//! in which case only `.html`/`.htm` files pass through and every other
//! unrecognized extension fails with [`SourceError::UnrecognizedFileType`].
//!
//! Source paths must be absolute. Files are read while the process may be
//! sitting in an unrelated working directory, so a relative path is rejected
//! with [`SourceError::InvalidPath`] before anything is read.

use pulldown_cmark::{Parser, html as md_html};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SourceError {
    #[error("{0} is not an absolute path")]
    InvalidPath(PathBuf),
    #[error("{0} is not a recognized file type")]
    UnrecognizedFileType(PathBuf),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// How a source file is turned into HTML.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Markdown,
    PlainText,
    Passthrough,
}

/// What to do with files whose extension is neither `.md` nor `.txt`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtensionPolicy {
    /// Treat the file as a ready-made HTML fragment.
    #[default]
    Passthrough,
    /// Only `.html` and `.htm` pass through; anything else is an error.
    Reject,
}

const HTML_EXTENSIONS: &[&str] = &["html", "htm"];

impl SourceKind {
    /// Resolve the kind from a path's extension. Never fails: unknown
    /// extensions map to [`SourceKind::Passthrough`].
    pub fn from_path(path: &Path) -> Self {
        let ext = path
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "md" => SourceKind::Markdown,
            "txt" => SourceKind::PlainText,
            _ => SourceKind::Passthrough,
        }
    }

    /// Resolve the kind under an extension policy.
    pub fn resolve(path: &Path, policy: ExtensionPolicy) -> Result<Self, SourceError> {
        let kind = Self::from_path(path);
        if kind == SourceKind::Passthrough && policy == ExtensionPolicy::Reject && !is_html(path) {
            return Err(SourceError::UnrecognizedFileType(path.to_path_buf()));
        }
        Ok(kind)
    }

    /// Render raw source text as an HTML fragment.
    pub fn render(self, raw: &str) -> String {
        match self {
            SourceKind::Markdown => markdown_to_html(raw),
            SourceKind::PlainText => plaintext_to_html(raw),
            SourceKind::Passthrough => raw.to_string(),
        }
    }
}

fn is_html(path: &Path) -> bool {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    HTML_EXTENSIONS.contains(&ext.as_str())
}

/// Compile one source file into an HTML fragment.
pub fn compile_source(path: &Path, policy: ExtensionPolicy) -> Result<String, SourceError> {
    ensure_absolute(path)?;
    let kind = SourceKind::resolve(path, policy)?;
    compile_as(path, kind)
}

/// Compile a file with an explicit kind, ignoring its extension.
///
/// Used for the header and footer templates, which are always Markdown.
pub fn compile_as(path: &Path, kind: SourceKind) -> Result<String, SourceError> {
    ensure_absolute(path)?;
    let raw = fs::read_to_string(path)?;
    Ok(kind.render(&raw))
}

fn ensure_absolute(path: &Path) -> Result<(), SourceError> {
    if path.is_absolute() {
        Ok(())
    } else {
        Err(SourceError::InvalidPath(path.to_path_buf()))
    }
}

pub fn markdown_to_html(text: &str) -> String {
    let parser = Parser::new(text);
    let mut out = String::new();
    md_html::push_html(&mut out, parser);
    out
}

/// Wrap blank-line separated blocks in paragraphs.
///
/// Every literal `\n\n` becomes `</p><p>` and the whole text is bracketed in
/// one outer paragraph, so `"a\n\nb"` becomes `<p>\na</p><p>b\n</p>\n`.
pub fn plaintext_to_html(text: &str) -> String {
    format!("<p>\n{}\n</p>\n", text.replace("\n\n", "</p><p>"))
}
