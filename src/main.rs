use clap::{Parser, Subcommand};
use genysite::{catalog, config, output, site};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "genysite")]
#[command(about = "Static site generator: pre-rendered pages or a client-rendered app")]
#[command(long_about = "\
Static site generator: pre-rendered pages or a client-rendered app

Every file under src/pages is a page template. The directory layout becomes
the navigation tree every template receives as `tree`.

Project structure:

  genysite.toml                  # Project config (optional)
  src/
  ├── pages/                     # Page templates (.html, .md; .js/.jsx/.ts/.tsx with react = true)
  │   ├── index.md               # Served at the site root
  │   └── guide/
  │       └── intro.md           # → /guide/intro.html
  ├── assets/                    # Copied to dist/assets, .scss/.sass compiled
  ├── libs/                      # Copied next to the client app (react = true)
  └── template/                  # Installed template: layouts, assets/, config.toml

Output strategies:
  react = false   one HTML file per page
  react = true    pages become routes of a bundled client app

Run 'genysite gen-config' to generate a documented genysite.toml.")]
#[command(version)]
struct Cli {
    /// Project directory
    #[arg(long, default_value = ".", global = true)]
    project: PathBuf,

    /// Staging directory for client app builds, relative to the project
    #[arg(long, default_value = site::DEFAULT_TEMP_DIR, global = true)]
    temp_dir: PathBuf,

    /// Log each build stage
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Log everything, including per-file details
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Build the site (default)
    Build,
    /// Resolve and print the page tree without writing anything
    Check,
    /// List built-in templates
    Templates,
    /// Install a template into src/template, replacing the current one
    Install {
        /// Built-in template name or git repository URL
        source: String,
    },
    /// Print a stock genysite.toml with all options documented
    GenConfig,
}

fn init_tracing(verbose: bool, debug: bool) {
    let filter = if debug {
        EnvFilter::new("debug")
    } else if verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.debug);

    let options = site::BuildOptions {
        project_root: cli.project.clone(),
        temp_dir: cli.temp_dir.clone(),
    };

    match cli.command.unwrap_or(Command::Build) {
        Command::Build => {
            println!("==> Building {}", cli.project.display());
            let report = site::build(&options)?;
            output::print_tree_output(&report.resolved, report.render.strategy);
            output::print_build_summary(&report);
            println!("==> Build complete: {}", report.dist.display());
        }
        Command::Check => {
            let report = site::check(&options)?;
            output::print_tree_output(&report.resolved, report.config.strategy());
            println!("==> {} is valid", cli.project.display());
        }
        Command::Templates => {
            output::print_templates(catalog::list());
        }
        Command::Install { source } => {
            let installed = catalog::install(&cli.project, &source, &catalog::GitCloner)?;
            println!("{}", output::format_installed(&installed));
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}
