pub mod log_file;
pub mod song_file;

use std::ops::AddAssign;
use std::path::Path;

use async_trait::async_trait;
use sea_orm::DatabaseTransaction;

use crate::error::EtlError;

pub use log_file::{load_log_file, LogFileHandler};
pub use song_file::{load_song_file, SongFileHandler};

/// Rows written while loading one or more files
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RowCounts {
    pub songs: u64,
    pub artists: u64,
    pub time_rows: u64,
    pub users: u64,
    pub songplays: u64,
    /// Songplays whose song/artist were found in the catalog
    pub matched_songplays: u64,
}

impl AddAssign for RowCounts {
    fn add_assign(&mut self, other: Self) {
        self.songs += other.songs;
        self.artists += other.artists;
        self.time_rows += other.time_rows;
        self.users += other.users;
        self.songplays += other.songplays;
        self.matched_songplays += other.matched_songplays;
    }
}

/// Loads a single data file inside the caller's transaction
#[async_trait]
pub trait FileHandler: Send + Sync {
    /// Label used in progress logs
    fn kind(&self) -> &'static str;

    /// Parse `path` and write its rows through `txn`. The caller commits.
    async fn load_file(&self, txn: &DatabaseTransaction, path: &Path) -> Result<RowCounts, EtlError>;
}
