use clap::{Parser, Subcommand};
use photo_data::{config, output, process};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Shared flags for commands that process images.
#[derive(clap::Args, Clone, Default)]
struct CacheArgs {
    /// Disable the processing cache — force re-rendering of all photos
    #[arg(long)]
    no_cache: bool,
}

#[derive(Parser)]
#[command(name = "photo-data")]
#[command(about = "Incremental image resizer and manifest generator for photo galleries")]
#[command(long_about = "\
Incremental image resizer and manifest generator for photo galleries

Walks a category/event source tree, renders each photo at every configured
width no wider than the original, and writes the JSON manifest the gallery
reads. Unchanged photos are skipped using a persisted cache; derived files
of deleted photos are removed.

Source structure:

  src/assets/images/
  ├── Weddings/                    # Category
  │   └── Smith & Jones/           # Event
  │       ├── IMG001.jpg           # → weddings_smith_jones_img001-<width>w.jpg
  │       └── IMG002.png
  └── Portraits/
      └── Studio/
          └── headshot.jpg

Run 'photo-data gen-config' to generate a documented photo-data.toml.
Set PHOTO_DATA_LOG (or RUST_LOG) to control diagnostics, e.g. PHOTO_DATA_LOG=debug.")]
#[command(version)]
struct Cli {
    /// Config file (missing file = stock defaults)
    #[arg(long, default_value = config::DEFAULT_CONFIG_FILE, global = true)]
    config: PathBuf,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Render new and changed photos, prune stale files, write the manifest (default)
    Build(CacheArgs),
    /// List the photos a build would process without writing anything
    Check,
    /// Print a stock photo-data.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing();

    match cli.command.unwrap_or(Command::Build(CacheArgs::default())) {
        Command::Build(cache_args) => {
            let config = config::load_config(&cli.config)?;
            init_thread_pool(&config.processing);
            println!("==> Processing {}", config.paths.source_dir.display());
            let (tx, rx) = std::sync::mpsc::channel();
            let printer = std::thread::spawn(move || {
                for event in rx {
                    for line in output::format_process_event(&event) {
                        println!("{}", line);
                    }
                }
            });
            let result = process::run(&config, !cache_args.no_cache, Some(tx));
            printer.join().ok();
            let summary = result?;
            println!("==> {}", summary);
            println!("==> Manifest: {}", config.paths.manifest_file.display());
        }
        Command::Check => {
            let config = config::load_config(&cli.config)?;
            println!("==> Checking {}", config.paths.source_dir.display());
            let sources = photo_data::scan::scan(&config.paths.source_dir, |ext| {
                config.accepts_extension(ext)
            })?;
            output::print_scan_output(&process::assign_ids(&sources));
            println!("==> Source tree is valid");
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Install the stderr diagnostics subscriber.
///
/// `PHOTO_DATA_LOG` wins over `RUST_LOG`; with neither set only warnings and
/// errors are shown.
fn init_tracing() {
    let filter = EnvFilter::try_from_env("PHOTO_DATA_LOG")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Initialize the rayon thread pool based on processing config.
///
/// Caps at the number of available CPU cores — user can constrain down, not up.
fn init_thread_pool(processing: &config::ProcessingConfig) {
    let threads = config::effective_threads(processing);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}
