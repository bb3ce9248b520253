use clap::{Parser, Subcommand};
use spicy::{config, output, process};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "spicy")]
#[command(about = "Crop and resize wallpapers for a list of device screens")]
#[command(long_about = "\
Crop and resize wallpapers for a list of device screens

For each target, every source image keeps its full extent along the axis
of the target's longer side and is center-cropped along the other to the
target's short/long ratio. The crop is then resampled (Lanczos3) to the
target's exact resolution, stretching it where the aspect ratios differ.

Layout:

  ./Spicy_Dark.png                 # <input>/<image>.<extension>
  ./Spicy_Dark_solo.png
  resized/                         # <output>, wiped and rebuilt every run
  ├── HD Landscape/
  │   ├── Spicy_Dark.png           # exactly 1280x720
  │   └── Spicy_Dark_solo.png
  ├── iPhone 8, 7, 6, 6s/          # target names are used verbatim
  │   └── ...
  └── ...

A missing or unreadable source, or a pair that fails to render, is logged
and skipped; the rest of the batch still runs.

Run 'spicy gen-config' to generate a documented spicy.toml.")]
#[command(version)]
struct Cli {
    /// Run configuration file (stock defaults if missing)
    #[arg(long, default_value = config::DEFAULT_CONFIG_FILE, global = true)]
    config: PathBuf,

    /// Directory holding the source images (overrides input_dir)
    #[arg(long, global = true)]
    input: Option<PathBuf>,

    /// Output root, wiped before every build (overrides output_dir)
    #[arg(long, global = true)]
    output: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Generate every wallpaper: wipe output, crop, resize, write
    Build,
    /// Print the crop planned for every (target, image) pair without writing
    Plan,
    /// Print a stock spicy.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "spicy=warn".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .without_time()
                .with_writer(std::io::stderr),
        )
        .init();

    match &cli.command {
        Command::Build => {
            let run = resolve_run_config(&cli)?;
            output::print_run_header(&run);
            init_thread_pool(&run.processing);

            let (tx, rx) = std::sync::mpsc::channel();
            let printer = std::thread::spawn(move || {
                for event in rx {
                    for line in output::format_process_event(&event) {
                        println!("{}", line);
                    }
                }
            });
            let pipeline = process::Pipeline::with_rust_backend(run)?.with_events(tx);
            let result = pipeline.run();
            // Closes the channel so the printer drains and exits.
            drop(pipeline);
            printer
                .join()
                .map_err(|_| "progress printer thread panicked")?;

            let report = result?;
            println!();
            output::print_summary(&report);
        }
        Command::Plan => {
            let run = resolve_run_config(&cli)?;
            output::print_run_header(&run);
            println!();

            let pipeline = process::Pipeline::with_rust_backend(run)?;
            let (plans, skipped) = pipeline.plan();
            let run = pipeline.config();
            output::print_plan(&run.targets, &plans, &skipped, &run.images);
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Load the config file with `--input` / `--output` applied.
fn resolve_run_config(cli: &Cli) -> Result<config::RunConfig, config::ConfigError> {
    config::load_config_with_overrides(&cli.config, cli.input.clone(), cli.output.clone())
}

/// Initialize the rayon thread pool based on processing config.
///
/// Caps at the number of available CPU cores; the user can constrain down, not up.
fn init_thread_pool(processing: &config::ProcessingConfig) {
    let threads = config::effective_threads(processing);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}
