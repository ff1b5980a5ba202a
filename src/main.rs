// Only compile UI module when TUI feature is enabled
#[cfg(feature = "tui")]
mod ui;

use anyhow::{Context, Result};
use std::env;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use vivienda_inventory::{write_template, Config, VERSION};

const LOG_FILE: &str = "vivienda-inventory.log";

fn main() -> Result<()> {
    let args: Vec<String> = env::args().skip(1).collect();
    let (config_path, positional) = split_args(&args);

    let config = match config_path {
        Some(path) => Config::load_from_file(Path::new(path))?.with_env_overrides(),
        None => Config::from_env()?,
    };

    let log_path = init_logging(&config)?;
    tracing::info!(version = VERSION, log = %log_path.display(), "Starting vivienda-inventory");

    match positional.first().map(String::as_str) {
        Some("template") => run_template(&config, positional.get(1))?,
        Some(other) => {
            eprintln!("❌ Unknown command: {}", other);
            eprintln!("   Usage: vivienda-inventory [--config <file>] [template [DIR]]");
            std::process::exit(2);
        }
        None => run_ui_mode(config)?,
    }

    Ok(())
}

/// Pull `--config <file>` out; everything else is positional
fn split_args(args: &[String]) -> (Option<&str>, Vec<String>) {
    let mut config_path = None;
    let mut positional = Vec::new();

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        if arg == "--config" {
            config_path = iter.next().map(String::as_str);
        } else {
            positional.push(arg.clone());
        }
    }

    (config_path, positional)
}

/// Session log, truncated on every start. Stdout belongs to the UI.
fn init_logging(config: &Config) -> Result<PathBuf> {
    fs::create_dir_all(&config.log_dir)
        .with_context(|| format!("Failed to create log dir {}", config.log_dir.display()))?;

    let path = config.log_dir.join(LOG_FILE);
    let file = File::create(&path)
        .with_context(|| format!("Failed to open log file {}", path.display()))?;

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "vivienda_inventory=info".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(Mutex::new(file))
                .with_ansi(false),
        )
        .init();

    Ok(path)
}

fn run_template(config: &Config, dir: Option<&String>) -> Result<()> {
    let out_dir = dir.map(PathBuf::from).unwrap_or_else(|| config.output_dir.clone());

    println!("📄 Writing import template...");
    let path = write_template(&out_dir, &config.project_name)
        .with_context(|| format!("Failed to write template into {}", out_dir.display()))?;
    println!("✓ Template saved to {}", path.display());

    Ok(())
}

#[cfg(feature = "tui")]
fn run_ui_mode(config: Config) -> Result<()> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .context("Failed to start async runtime")?;

    let mut app = ui::App::new(config);
    ui::run_ui(&mut app, &runtime)?;

    tracing::info!(
        units = app.inventory.len(),
        changes = app.inventory.history_len(),
        "Session closed, in-memory data discarded"
    );
    println!("\n✅ Session closed (data was kept in memory only)");

    Ok(())
}

#[cfg(not(feature = "tui"))]
fn run_ui_mode(_config: Config) -> Result<()> {
    eprintln!("❌ TUI mode not available!");
    eprintln!("   Rebuild with: cargo build --features tui");
    eprintln!("   Or write the import template: vivienda-inventory template [DIR]");
    std::process::exit(1);
}
