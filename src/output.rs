//! CLI output formatting.
//!
//! # Information-First Display
//!
//! Every compiled page is shown by its identity (positional index and title)
//! with the output path it was written to as secondary context. Articles are
//! indented by how deep they sit in the article tree, so the listing reads
//! like the table of contents it produced.
//!
//! # Output Format
//!
//! ## Build
//!
//! ```text
//! Cleared /home/user/public_html/wiki (3 entries)
//! Assets
//!     logo.png
//!     main.css
//! Articles
//! 001 intro → intro.html
//!     002 editor → tools/editor.html
//!         003 plugins → tools/vim/plugins.html
//! Table of contents → toc.html
//!
//! Compiled 3 articles (8 paths created) → /home/user/public_html/wiki
//! ```
//!
//! ## Check
//!
//! ```text
//! Layout /home/user/wiki
//!     ok       src/header.md
//!     missing  src/footer.md
//! ```
//!
//! # Architecture
//!
//! Each report has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure: no I/O, no side effects.

use crate::compile::CompileReport;
use crate::layout::WikiLayout;
use crate::permissions::PermissionFailure;
use crate::toc::Article;
use crate::vcs::Author;
use std::path::Path;

// ============================================================================
// Shared display helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// Number of directories between the articles root and the article.
fn article_depth(article: &Article) -> usize {
    if article.path.is_empty() {
        0
    } else {
        article.path.split('/').count()
    }
}

/// Show `path` relative to `base` when it is inside it.
fn display_relative(path: &Path, base: &Path) -> String {
    path.strip_prefix(base)
        .unwrap_or(path)
        .to_string_lossy()
        .into_owned()
}

fn plural(n: usize, one: &str, many: &str) -> String {
    if n == 1 {
        format!("{n} {one}")
    } else {
        format!("{n} {many}")
    }
}

// ============================================================================
// Build
// ============================================================================

pub fn format_compile_output(report: &CompileReport, dest: &Path) -> Vec<String> {
    let mut lines = Vec::new();

    if !report.assets.is_empty() {
        lines.push("Assets".to_string());
        for asset in &report.assets {
            lines.push(format!("{}{}", indent(1), display_relative(asset, dest)));
        }
    }

    if !report.articles.is_empty() {
        lines.push("Articles".to_string());
        for (idx, article) in report.articles.iter().enumerate() {
            lines.push(format!(
                "{}{} {} \u{2192} {}",
                indent(article_depth(article)),
                format_index(idx + 1),
                article.title,
                article.href
            ));
        }
    }

    lines.push(format!(
        "Table of contents \u{2192} {}",
        display_relative(&report.toc, dest)
    ));
    lines.push(String::new());
    lines.push(format!(
        "Compiled {} ({} created) \u{2192} {}",
        plural(report.articles.len(), "article", "articles"),
        plural(report.created.len(), "path", "paths"),
        dest.display()
    ));
    lines
}

pub fn print_compile_output(report: &CompileReport, dest: &Path) {
    for line in format_compile_output(report, dest) {
        println!("{}", line);
    }
}

pub fn format_clear_output(path: &Path, removed: usize) -> Vec<String> {
    vec![format!(
        "Cleared {} ({})",
        path.display(),
        plural(removed, "entry", "entries")
    )]
}

pub fn print_clear_output(path: &Path, removed: usize) {
    for line in format_clear_output(path, removed) {
        println!("{}", line);
    }
}

// ============================================================================
// Permission fixup
// ============================================================================

pub fn format_permission_failures(failures: &[PermissionFailure], dest: &Path) -> Vec<String> {
    if failures.is_empty() {
        return Vec::new();
    }
    let mut lines = vec![format!(
        "Could not fix permissions on {}:",
        plural(failures.len(), "path", "paths")
    )];
    for failure in failures {
        lines.push(format!(
            "{}{}: {}",
            indent(1),
            display_relative(&failure.path, dest),
            failure.error
        ));
    }
    lines
}

pub fn print_permission_failures(failures: &[PermissionFailure], dest: &Path) {
    for line in format_permission_failures(failures, dest) {
        eprintln!("{}", line);
    }
}

// ============================================================================
// Publish
// ============================================================================

pub fn format_publish_output(committed: bool, author: &Author) -> Vec<String> {
    if committed {
        vec![format!("Committed as {} <{}>", author.name, author.email)]
    } else {
        vec!["Nothing to commit, pushing existing history".to_string()]
    }
}

pub fn print_publish_output(committed: bool, author: &Author) {
    for line in format_publish_output(committed, author) {
        println!("{}", line);
    }
}

// ============================================================================
// Check
// ============================================================================

pub fn format_check_output(layout: &WikiLayout) -> Vec<String> {
    let root = layout.root();
    let missing = layout.missing_inputs();
    let inputs = [
        layout.header(),
        layout.footer(),
        layout.logo(),
        layout.stylesheet(),
        layout.articles(),
    ];

    let mut lines = vec![format!("Layout {}", root.display())];
    for input in &inputs {
        let status = if missing.contains(input) { "missing" } else { "ok" };
        lines.push(format!(
            "{}{:<8} {}",
            indent(1),
            status,
            display_relative(input, root)
        ));
    }
    lines
}

pub fn print_check_output(layout: &WikiLayout) {
    for line in format_check_output(layout) {
        println!("{}", line);
    }
}

// ============================================================================
// Tests
// ============================================================================
