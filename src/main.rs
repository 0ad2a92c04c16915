use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tilde_wiki::compile::{self, CompileError, CompileOptions, NoopObserver};
use tilde_wiki::config::{self, WikiConfig};
use tilde_wiki::layout::WikiLayout;
use tilde_wiki::permissions::PermissionFixup;
use tilde_wiki::vcs::{self, Author, GitRepo};
use tilde_wiki::{clear, output};

/// Shared flags for commands that write a compiled wiki.
#[derive(clap::Args, Clone)]
struct WriteArgs {
    /// Empty the output directory before compiling
    #[arg(long)]
    clear: bool,

    /// Make every created file and directory group/world writable
    #[arg(long)]
    fix_permissions: bool,
}

#[derive(Parser)]
#[command(name = "tilde-wiki")]
#[command(about = "Compiler for a shared tilde server wiki")]
#[command(long_about = "\
Compiler for a shared tilde server wiki

Articles are plain files in a git repository. Markdown and plain text are
rendered to HTML, everything else is taken as an HTML fragment. Each page is
wrapped in the shared header and footer, and a table of contents is built
from the directory tree.

Repository structure:

  wiki/
  └── src/
      ├── header.md        # Page header; its <title> is replaced per page
      ├── footer.md        # Page footer
      ├── logo.png         # Copied to the output root
      ├── main.css         # Copied to the output root
      └── articles/
          ├── intro.md     # → intro.html
          └── tools/
              └── editor.txt   # → tools/editor.html

Links and images written as href=\"/wiki/...\" or src=\"/wiki/...\" are
rewritten relative to each page, so the same tree works on the public site
and in a ~/public_html preview.

Start with 'tilde-wiki init' to clone the shared repository, edit your
clone, check it with 'tilde-wiki preview', then 'tilde-wiki publish'.

Run 'tilde-wiki gen-config' to generate a documented tilde-wiki.toml.")]
#[command(version)]
struct Cli {
    /// Config file
    #[arg(long, default_value = config::DEFAULT_CONFIG_FILE, global = true)]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Compile a wiki repository into an output directory
    Build {
        /// Wiki repository
        #[arg(long)]
        source: PathBuf,

        /// Output directory
        #[arg(long)]
        output: PathBuf,

        #[command(flatten)]
        write: WriteArgs,
    },
    /// Clone the shared repository and build a first preview
    Init,
    /// Pull the latest shared changes into your local clone
    Get,
    /// Discard local changes and match the shared repository
    Reset,
    /// Compile your local clone into your preview directory
    Preview {
        /// Wiki repository (defaults to paths.local_repository)
        #[arg(long)]
        source: Option<PathBuf>,
    },
    /// Commit and push your local clone, then compile the public wiki
    Publish,
    /// Validate a wiki repository layout without compiling
    Check {
        /// Wiki repository (defaults to paths.local_repository)
        #[arg(long)]
        source: Option<PathBuf>,
    },
    /// Print a stock tilde-wiki.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Command::Build {
            source,
            output,
            write,
        } => {
            let config = config::load_config(&cli.config)?;
            run_compile(&config, &source, &output, &write)?;
        }
        Command::Init => {
            let config = config::load_config(&cli.config)?;
            let local = config.paths.local_repository_dir();
            let preview = config.paths.preview_dir();
            for path in [&local, &preview] {
                if path.exists() {
                    return Err(format!(
                        "{} already exists. Have you already run tilde-wiki init?",
                        path.display()
                    )
                    .into());
                }
            }
            let author = Author::from_env(&config.site.name)?;
            println!(
                "==> Cloning {} → {}",
                config.paths.repository_dir().display(),
                local.display()
            );
            GitRepo::clone_from(&config.paths.repository_dir(), &local, &author)?;
            let write = WriteArgs {
                clear: false,
                fix_permissions: false,
            };
            run_compile(&config, &local, &preview, &write)?;
            println!("==> Ready to contribute to {}'s wiki", config.site.name);
        }
        Command::Get => {
            let config = config::load_config(&cli.config)?;
            let local = GitRepo::open(config.paths.local_repository_dir());
            println!("==> Pulling into {}", local.path().display());
            local.pull()?;
        }
        Command::Reset => {
            let config = config::load_config(&cli.config)?;
            let local = GitRepo::open(config.paths.local_repository_dir());
            println!("==> Resetting {} to origin", local.path().display());
            local.reset_from_origin()?;
        }
        Command::Preview { source } => {
            let config = config::load_config(&cli.config)?;
            let source = source.unwrap_or_else(|| config.paths.local_repository_dir());
            let dest = config.paths.preview_dir();
            let write = WriteArgs {
                clear: true,
                fix_permissions: false,
            };
            run_compile(&config, &source, &dest, &write)?;
        }
        Command::Publish => {
            let config = config::load_config(&cli.config)?;
            let author = Author::from_env(&config.site.name)?;
            let local = GitRepo::open(config.paths.local_repository_dir());
            let shared = GitRepo::open(config.paths.repository_dir());
            println!("==> Pushing {} → {}", local.path().display(), shared.path().display());
            let committed = vcs::publish_changes(&local, &shared, &author)?;
            output::print_publish_output(committed, &author);

            let source = config.paths.repository_dir();
            let dest = config.paths.publish_dir();
            println!("==> Publishing {} to {}", config.site.name, dest.display());
            let write = WriteArgs {
                clear: true,
                fix_permissions: true,
            };
            run_compile(&config, &source, &dest, &write)?;
        }
        Command::Check { source } => {
            let config = config::load_config(&cli.config)?;
            let source = source.unwrap_or_else(|| config.paths.local_repository_dir());
            let layout = WikiLayout::new(&source)?;
            println!("==> Checking {}", source.display());
            output::print_check_output(&layout);
            if let Some(missing) = layout.missing_inputs().into_iter().next() {
                return Err(CompileError::MissingTemplate(missing).into());
            }
            println!("==> Layout is valid");
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Clear (when asked), compile, and report.
fn run_compile(
    config: &WikiConfig,
    source: &Path,
    dest: &Path,
    write: &WriteArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    if write.clear && dest.exists() {
        let removed = clear::clear_directory(dest)?;
        output::print_clear_output(dest, removed);
    }

    println!("==> Compiling {} → {}", source.display(), dest.display());
    let options = CompileOptions::from_config(&config.compile);

    if write.fix_permissions {
        let mut fixup = PermissionFixup::new();
        let report = compile::compile_with(source, dest, &options, &mut fixup)?;
        output::print_compile_output(&report, dest);
        output::print_permission_failures(fixup.failures(), dest);
    } else {
        let report = compile::compile_with(source, dest, &options, &mut NoopObserver)?;
        output::print_compile_output(&report, dest);
    }
    Ok(())
}
