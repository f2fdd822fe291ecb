use std::path::Path;

use sea_orm::*;

use crate::error::EtlError;
use crate::handlers::{FileHandler, LogFileHandler, RowCounts, SongFileHandler};
use crate::services::file_walker::collect_files;
use crate::utils::config::Config;
use crate::utils::db::establish_connection;

/// Extension of every data file the loader picks up
pub const DATA_FILE_EXTENSION: &str = "json";

/// What to do when a single file fails to load
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Stop the run and surface the error. Files committed so far stay committed.
    #[default]
    Abort,
    /// Roll back the failing file, log the error and continue with the next file
    SkipFile,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LoadSummary {
    pub files_found: usize,
    pub files_loaded: usize,
    pub files_skipped: usize,
    pub rows: RowCounts,
}

/// Load every data file under `root` with `handler`, one transaction per file.
///
/// A file's rows are committed together or not at all; a failure never undoes
/// files that were already committed.
pub async fn run_load(
    db: &DatabaseConnection,
    root: &Path,
    handler: &dyn FileHandler,
    policy: FailurePolicy,
) -> Result<LoadSummary, EtlError> {
    let files = collect_files(root, DATA_FILE_EXTENSION)?;
    let total = files.len();
    log::info!("{} files found in {}", total, root.display());

    let mut summary = LoadSummary {
        files_found: total,
        ..Default::default()
    };

    for (i, path) in files.iter().enumerate() {
        // Transaction failures mean the connection is gone: fatal under any policy
        match load_one(db, handler, path).await? {
            Ok(rows) => {
                summary.files_loaded += 1;
                summary.rows += rows;
            }
            Err(e) if policy == FailurePolicy::SkipFile => {
                log::error!("Skipping {} file {}: {}", handler.kind(), path.display(), e);
                summary.files_skipped += 1;
            }
            Err(e) => return Err(e),
        }
        log::info!("{}/{} files processed.", i + 1, total);
    }

    Ok(summary)
}

/// Run one file in its own transaction.
///
/// The outer error is a begin/commit failure, the inner one a failure of the
/// handler after which the file was rolled back.
async fn load_one(
    db: &DatabaseConnection,
    handler: &dyn FileHandler,
    path: &Path,
) -> Result<Result<RowCounts, EtlError>, EtlError> {
    let txn = db.begin().await?;

    match handler.load_file(&txn, path).await {
        Ok(rows) => {
            txn.commit().await?;
            Ok(Ok(rows))
        }
        Err(e) => {
            if let Err(rollback_err) = txn.rollback().await {
                log::error!("Failed to roll back {}: {}", path.display(), rollback_err);
            }
            Ok(Err(e))
        }
    }
}

/// Totals of a full run: the song phase followed by the log phase
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EtlSummary {
    pub songs: LoadSummary,
    pub logs: LoadSummary,
}

/// Load the song catalog, then the activity logs, from the given directories.
///
/// Songs go first so that log events can be matched against the catalog.
pub async fn run_etl(
    db: &DatabaseConnection,
    song_data_dir: &Path,
    log_data_dir: &Path,
    policy: FailurePolicy,
) -> Result<EtlSummary, EtlError> {
    let songs = run_load(db, song_data_dir, &SongFileHandler, policy).await?;
    log::info!(
        "Song data loaded: {} songs, {} artists from {} files",
        songs.rows.songs,
        songs.rows.artists,
        songs.files_loaded
    );

    let logs = run_load(db, log_data_dir, &LogFileHandler, policy).await?;
    log::info!(
        "Log data loaded: {} song plays ({} matched in catalog), {} time rows, {} user upserts",
        logs.rows.songplays,
        logs.rows.matched_songplays,
        logs.rows.time_rows,
        logs.rows.users
    );

    Ok(EtlSummary { songs, logs })
}

/// Connect with the target profile and run the whole load
pub async fn run_etl_with_config(
    config: &Config,
    song_data_dir: &Path,
    log_data_dir: &Path,
    policy: FailurePolicy,
) -> Result<EtlSummary, EtlError> {
    log::info!("Connecting to {}", config.target.display_target());
    let db = establish_connection(&config.target.connection_url())
        .await
        .map_err(EtlError::Connect)?;

    let summary = run_etl(&db, song_data_dir, log_data_dir, policy).await?;
    db.close().await?;

    Ok(summary)
}
