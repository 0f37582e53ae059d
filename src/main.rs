use clap::{Parser, Subcommand};
use colored::Colorize;
use lintkit::config::{Config, DEFAULT_CONFIG_PATH};
use lintkit::sarif::Encoder;
use lintkit::wikifmt::{self, WikiOptions};
use lintkit::Level;
use std::fs;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

/// lintkit - static-analysis checks that emit SARIF
#[derive(Parser)]
#[command(name = "lintkit")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file path [default: .lintkit.toml]
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Quiet mode - only log errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    /// Verbose mode - log debug detail to stderr
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Check wiki-style markdown files
    Wikifmt {
        /// Root directories to scan
        #[arg(required = true)]
        roots: Vec<PathBuf>,

        /// Patterns to exclude (can be repeated)
        #[arg(short, long)]
        exclude: Vec<String>,

        /// Write SARIF here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() {
    let cli = Cli::parse();
    setup_logging(cli.quiet, cli.verbose);

    let result = match &cli.command {
        Commands::Wikifmt { roots, exclude, output } => {
            cmd_wikifmt(&cli, roots, exclude, output.as_deref())
        }
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "error".red().bold(), e);
        std::process::exit(1);
    }
}

fn setup_logging(quiet: bool, verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let default = if quiet {
        "error"
    } else if verbose {
        "debug"
    } else {
        "warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn load_config(cli: &Cli) -> lintkit::Result<Config> {
    match &cli.config {
        Some(path) => Config::load(path, true),
        None => Config::load(Path::new(DEFAULT_CONFIG_PATH), false),
    }
}

fn cmd_wikifmt(
    cli: &Cli,
    roots: &[PathBuf],
    exclude: &[String],
    output: Option<&Path>,
) -> lintkit::Result<()> {
    let start = Instant::now();
    let config = load_config(cli)?;
    let opts = WikiOptions::from_config(&config.wikifmt, exclude)?;

    let report = wikifmt::run_with(roots, &opts)?;
    let log = report.to_sarif();

    match output {
        Some(path) => {
            let file = fs::File::create(path).map_err(|source| lintkit::Error::Write {
                path: path.to_path_buf(),
                source,
            })?;
            Encoder::new(BufWriter::new(file)).encode(&log)?;

            if !cli.quiet {
                eprintln!(
                    "{} {} findings ({} errors, {} warnings) in {:.2?}",
                    "Wrote".green().bold(),
                    report.len().to_string().cyan(),
                    report.count_level(Level::Error),
                    report.count_level(Level::Warning),
                    start.elapsed()
                );
                eprintln!("  {}", path.display().to_string().cyan());
            }
        }
        None => {
            let stdout = io::stdout();
            let mut enc = Encoder::new(stdout.lock());
            enc.encode(&log)?;
            enc.into_inner().flush()?;
        }
    }

    Ok(())
}
