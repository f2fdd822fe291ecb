use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use songplays_etl::services::loader::{run_etl_with_config, FailurePolicy};
use songplays_etl::utils::config::Config;

/// Load song metadata and activity logs into an existing schema
#[derive(Parser, Debug)]
#[command(version, about)]
struct CliArgs {
    /// Directory tree holding song files (defaults to SONG_DATA_DIR)
    #[arg(long)]
    song_data: Option<PathBuf>,

    /// Directory tree holding activity log files (defaults to LOG_DATA_DIR)
    #[arg(long)]
    log_data: Option<PathBuf>,

    /// Roll back and skip files that fail to load instead of stopping
    #[arg(long)]
    skip_bad_files: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = CliArgs::parse();
    let config = Config::from_env().context("Failed to load configuration")?;

    let song_data = args.song_data.unwrap_or_else(|| config.song_data_dir.clone());
    let log_data = args.log_data.unwrap_or_else(|| config.log_data_dir.clone());
    let policy = if args.skip_bad_files {
        FailurePolicy::SkipFile
    } else {
        FailurePolicy::Abort
    };

    println!("=================================================");
    println!("Loading {}", config.target.display_target());
    println!("   - Song data: {}", song_data.display());
    println!("   - Log data: {}", log_data.display());
    println!(
        "   - Bad files: {}",
        if args.skip_bad_files { "SKIPPED" } else { "ABORT" }
    );
    println!("=================================================");

    let summary = run_etl_with_config(&config, &song_data, &log_data, policy)
        .await
        .context("Load failed")?;

    let skipped = summary.songs.files_skipped + summary.logs.files_skipped;
    if skipped > 0 {
        log::warn!("{} files were skipped, see errors above", skipped);
    }

    Ok(())
}
