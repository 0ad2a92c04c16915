//! Wiki tree compilation.
//!
//! Drives the whole build: validates the repository layout, loads the
//! templates, copies the static assets, walks `src/articles`, and finishes
//! with the table of contents.
//!
//! ## Output Structure
//!
//! ```text
//! dest/
//! ├── logo.png                 # copied from src/logo.png
//! ├── main.css                 # copied from src/main.css
//! ├── toc.html                 # table of contents
//! ├── intro.html               # src/articles/intro.md
//! └── tools/
//!     └── editor.html          # src/articles/tools/editor.txt
//! ```
//!
//! ## Walk
//!
//! [`ArticleWalk`] is a lazy iterator over the article tree in pre-order,
//! sorted by file name. Each directory's mirror is created when the walk
//! reaches it, which is always before anything inside it. Each file is
//! compiled and written when it is reached, and its [`Article`] is yielded.
//! The walk can only be consumed once.
//!
//! ## Observers
//!
//! Every file and directory the compiler creates is reported to a
//! [`CreateObserver`]. The compiler itself knows nothing about what the
//! observer does with it; the CLI uses
//! [`PermissionFixup`](crate::permissions::PermissionFixup).
//!
//! ## Failure
//!
//! Missing layout inputs are detected before anything is written. Any later
//! failure abandons the run and leaves whatever was already written in
//! place. The compiler never deletes anything, and never overwrites a page
//! it wrote earlier in the same run: two sources in one directory that share
//! a stem (`a.md`, `a.txt`) fail with [`CompileError::DuplicateOutput`].
//!
//! A missing destination is created top-down, and each directory made on
//! the way is reported like any other.

use crate::config::CompileConfig;
use crate::layout::{TOC_FILE, WikiLayout};
use crate::links::{self, Depth};
use crate::source::{self, ExtensionPolicy, SourceError};
use crate::template::Templates;
use crate::toc::{self, Article, TocOrder};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;
use walkdir::{DirEntry, WalkDir};

#[derive(Error, Debug)]
pub enum CompileError {
    #[error(transparent)]
    Source(#[from] SourceError),
    #[error("Missing wiki input: {0}")]
    MissingTemplate(PathBuf),
    #[error("{second} and {first} both compile to {target}")]
    DuplicateOutput {
        first: PathBuf,
        second: PathBuf,
        target: PathBuf,
    },
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("Walk error: {0}")]
    Walk(#[from] walkdir::Error),
}

/// Receives every path the compiler creates, in creation order.
pub trait CreateObserver {
    fn created(&mut self, path: &Path);
}

/// Observer that ignores everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl CreateObserver for NoopObserver {
    fn created(&mut self, _path: &Path) {}
}

impl<F: FnMut(&Path)> CreateObserver for F {
    fn created(&mut self, path: &Path) {
        self(path)
    }
}

/// Per-run settings.
#[derive(Debug, Clone)]
pub struct CompileOptions {
    pub extensions: ExtensionPolicy,
    pub toc_order: TocOrder,
    pub toc_title: String,
    /// Time shown in the footer's "last compiled" stamp.
    pub compiled_at: DateTime<Utc>,
}

impl CompileOptions {
    pub fn from_config(config: &CompileConfig) -> Self {
        Self {
            extensions: config.unknown_extensions,
            toc_order: config.toc_order,
            toc_title: config.toc_title.clone(),
            compiled_at: Utc::now(),
        }
    }
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self::from_config(&CompileConfig::default())
    }
}

/// What a finished run produced.
#[derive(Debug)]
pub struct CompileReport {
    /// Articles in walk order.
    pub articles: Vec<Article>,
    /// Static assets copied to the output root.
    pub assets: Vec<PathBuf>,
    /// Every created path, in creation order.
    pub created: Vec<PathBuf>,
    pub toc: PathBuf,
}

/// Compile the wiki at `source` into `dest` with default options.
pub fn compile(
    source: &Path,
    dest: &Path,
    observer: &mut dyn CreateObserver,
) -> Result<CompileReport, CompileError> {
    compile_with(source, dest, &CompileOptions::default(), observer)
}

pub fn compile_with(
    source: &Path,
    dest: &Path,
    options: &CompileOptions,
    observer: &mut dyn CreateObserver,
) -> Result<CompileReport, CompileError> {
    let layout = WikiLayout::new(source)?;
    if let Some(missing) = layout.missing_inputs().into_iter().next() {
        return Err(CompileError::MissingTemplate(missing));
    }

    let templates = Templates::load(&layout, options.compiled_at)?;

    let mut recorder = Recorder {
        inner: observer,
        paths: Vec::new(),
    };
    create_destination(dest, &mut recorder)?;

    let mut assets = Vec::new();
    for asset in layout.static_assets() {
        if let Some(name) = asset.file_name() {
            let target = dest.join(name);
            fs::copy(&asset, &target)?;
            recorder.created(&target);
            assets.push(target);
        }
    }

    let articles = ArticleWalk::new(&layout, dest, &templates, options.extensions, &mut recorder)
        .collect::<Result<Vec<_>, _>>()?;

    let toc_page = toc::render_toc(&templates, &options.toc_title, &articles, options.toc_order);
    let toc_path = dest.join(TOC_FILE);
    fs::write(&toc_path, toc_page)?;
    recorder.created(&toc_path);

    Ok(CompileReport {
        articles,
        assets,
        created: recorder.paths,
        toc: toc_path,
    })
}

/// Create `dest` and its missing ancestors top-down, reporting each one.
fn create_destination(dest: &Path, observer: &mut dyn CreateObserver) -> io::Result<()> {
    let missing: Vec<&Path> = dest
        .ancestors()
        .take_while(|dir| !dir.as_os_str().is_empty() && !dir.exists())
        .collect();
    for dir in missing.into_iter().rev() {
        match fs::create_dir(dir) {
            Ok(()) => observer.created(dir),
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists && dir.is_dir() => {}
            Err(e) => return Err(e),
        }
    }
    if dest.is_dir() {
        Ok(())
    } else {
        Err(io::Error::new(
            io::ErrorKind::NotADirectory,
            format!("{} is not a directory", dest.display()),
        ))
    }
}

/// Forwards to the caller's observer and keeps its own list.
struct Recorder<'o> {
    inner: &'o mut dyn CreateObserver,
    paths: Vec<PathBuf>,
}

impl CreateObserver for Recorder<'_> {
    fn created(&mut self, path: &Path) {
        self.inner.created(path);
        self.paths.push(path.to_path_buf());
    }
}

/// Lazy, single-pass walk over the article tree.
///
/// Yields one [`Article`] per compiled page. Directories and hidden files
/// produce no item; the first error ends the useful part of the walk.
pub struct ArticleWalk<'a> {
    entries: walkdir::IntoIter,
    articles_root: PathBuf,
    dest: &'a Path,
    templates: &'a Templates,
    extensions: ExtensionPolicy,
    observer: &'a mut dyn CreateObserver,
    /// Output page -> the source that produced it.
    written: HashMap<PathBuf, PathBuf>,
}

impl<'a> ArticleWalk<'a> {
    pub fn new(
        layout: &WikiLayout,
        dest: &'a Path,
        templates: &'a Templates,
        extensions: ExtensionPolicy,
        observer: &'a mut dyn CreateObserver,
    ) -> Self {
        let articles_root = layout.articles();
        let entries = WalkDir::new(&articles_root)
            .min_depth(1)
            .sort_by_file_name()
            .into_iter();
        Self {
            entries,
            articles_root,
            dest,
            templates,
            extensions,
            observer,
            written: HashMap::new(),
        }
    }

    fn relative<'p>(&self, path: &'p Path) -> &'p Path {
        path.strip_prefix(&self.articles_root).unwrap_or(path)
    }

    fn mirror_dir(&mut self, entry: &DirEntry) -> Result<(), CompileError> {
        let target = self.dest.join(self.relative(entry.path()));
        match fs::create_dir(&target) {
            Ok(()) => {
                self.observer.created(&target);
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists && target.is_dir() => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn compile_file(&mut self, entry: &DirEntry) -> Result<Article, CompileError> {
        let source_path = entry.path();
        let dir = source_path.parent().unwrap_or(source_path);
        let rel_dir = self.relative(dir);
        let depth = links::depth_from(&self.articles_root, dir).unwrap_or(Depth::ROOT);

        let stem = source_path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let file_name = format!("{stem}.html");
        let target = self.dest.join(rel_dir).join(&file_name);
        if let Some(first) = self.written.get(&target) {
            return Err(CompileError::DuplicateOutput {
                first: first.clone(),
                second: source_path.to_path_buf(),
                target,
            });
        }

        let fragment = source::compile_source(source_path, self.extensions)?;
        let page = links::relativize(&self.templates.page(&fragment), depth);
        fs::write(&target, page)?;
        self.observer.created(&target);
        self.written.insert(target, source_path.to_path_buf());

        let path = slash_path(rel_dir);
        let href = if path.is_empty() {
            file_name
        } else {
            format!("{path}/{file_name}")
        };
        Ok(Article {
            title: stem,
            href,
            path,
        })
    }
}

impl Iterator for ArticleWalk<'_> {
    type Item = Result<Article, CompileError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let entry = match self.entries.next()? {
                Ok(entry) => entry,
                Err(e) => return Some(Err(e.into())),
            };

            if entry.file_type().is_dir() {
                if let Err(e) = self.mirror_dir(&entry) {
                    return Some(Err(e));
                }
                continue;
            }

            if is_hidden(&entry) || !entry.path().is_file() {
                continue;
            }

            return Some(self.compile_file(&entry));
        }
    }
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry.file_name().to_string_lossy().starts_with('.')
}

/// Join a relative path's components with `/` regardless of platform.
fn slash_path(rel: &Path) -> String {
    rel.components()
        .filter_map(|c| match c {
            Component::Normal(name) => Some(name.to_string_lossy()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}
