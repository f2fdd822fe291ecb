use std::fs;
use std::path::Path;

use async_trait::async_trait;
use sea_orm::sea_query::OnConflict;
use sea_orm::*;
use serde::Deserialize;

use super::{FileHandler, RowCounts};
use crate::error::EtlError;
use crate::models::{artist, song};

// ============ Source records ============

/// One song file: a single JSON object describing a song and its artist
#[derive(Debug, Clone, Deserialize)]
pub struct SongRecord {
    pub song_id: String,
    pub title: String,
    pub artist_id: String,
    pub year: i32,
    pub duration: f64,
    pub artist_name: String,
    pub artist_location: Option<String>,
    pub artist_latitude: Option<f64>,
    pub artist_longitude: Option<f64>,
}

impl SongRecord {
    fn artist_model(&self) -> artist::ActiveModel {
        artist::ActiveModel {
            artist_id: Set(self.artist_id.clone()),
            name: Set(self.artist_name.clone()),
            location: Set(self.artist_location.clone()),
            latitude: Set(self.artist_latitude),
            longitude: Set(self.artist_longitude),
        }
    }

    fn song_model(&self) -> song::ActiveModel {
        song::ActiveModel {
            song_id: Set(self.song_id.clone()),
            title: Set(self.title.clone()),
            artist_id: Set(self.artist_id.clone()),
            year: Set(self.year),
            duration: Set(self.duration),
        }
    }
}

/// Read and parse a song file. Anything other than exactly one complete
/// record is a parse error.
pub fn read_song_record(path: &Path) -> Result<SongRecord, EtlError> {
    let content = fs::read_to_string(path).map_err(|e| EtlError::io(path, e))?;

    serde_json::from_str(&content).map_err(|source| EtlError::Parse {
        path: path.to_path_buf(),
        line: source.line(),
        source,
    })
}

// ============ Loading ============

/// Insert the artist and the song described by the file at `path`.
///
/// The artist goes first since the song references it. Rows whose key already
/// exists are left untouched.
pub async fn load_song_file<C: ConnectionTrait>(db: &C, path: &Path) -> Result<RowCounts, EtlError> {
    let record = read_song_record(path)?;

    let artists = artist::Entity::insert(record.artist_model())
        .on_conflict(
            OnConflict::column(artist::Column::ArtistId)
                .do_nothing()
                .to_owned(),
        )
        .exec_without_returning(db)
        .await?;

    let songs = song::Entity::insert(record.song_model())
        .on_conflict(OnConflict::column(song::Column::SongId).do_nothing().to_owned())
        .exec_without_returning(db)
        .await?;

    log::debug!(
        "Loaded song {} ({}) by artist {}",
        record.song_id,
        record.title,
        record.artist_id
    );

    Ok(RowCounts {
        songs,
        artists,
        ..Default::default()
    })
}

pub struct SongFileHandler;

#[async_trait]
impl FileHandler for SongFileHandler {
    fn kind(&self) -> &'static str {
        "song"
    }

    async fn load_file(&self, txn: &DatabaseTransaction, path: &Path) -> Result<RowCounts, EtlError> {
        load_song_file(txn, path).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_song_file(content: &str) -> tempfile::NamedTempFile {
        let file = tempfile::NamedTempFile::new().unwrap();
        fs::write(file.path(), content).unwrap();
        file
    }

    #[test]
    fn test_read_song_record() {
        let file = write_song_file(
            r#"{"num_songs": 1, "artist_id": "ARD7TVE1187B99BFB1", "artist_latitude": null,
                "artist_longitude": null, "artist_location": "California - LA",
                "artist_name": "Casual", "song_id": "SOMZWCG12A8C13C480",
                "title": "I Didn't Mean To", "duration": 218.93179, "year": 0}"#,
        );

        let record = read_song_record(file.path()).unwrap();

        assert_eq!(record.song_id, "SOMZWCG12A8C13C480");
        assert_eq!(record.artist_id, "ARD7TVE1187B99BFB1");
        assert_eq!(record.artist_name, "Casual");
        assert_eq!(record.artist_location.as_deref(), Some("California - LA"));
        assert_eq!(record.artist_latitude, None);
        assert_eq!(record.duration, 218.93179);
        assert_eq!(record.year, 0);
    }

    #[test]
    fn test_missing_field_is_parse_error() {
        let file = write_song_file(r#"{"song_id": "S1", "title": "T"}"#);

        let err = read_song_record(file.path()).unwrap_err();
        assert!(matches!(err, EtlError::Parse { .. }));
    }

    #[test]
    fn test_more_than_one_record_is_parse_error() {
        let line = r#"{"song_id":"S1","title":"T","artist_id":"A1","year":2000,"duration":180.5,"artist_name":"N","artist_location":"L","artist_latitude":1.0,"artist_longitude":2.0}"#;
        let file = write_song_file(&format!("{}\n{}\n", line, line));

        let err = read_song_record(file.path()).unwrap_err();
        assert!(matches!(err, EtlError::Parse { line: 2, .. }));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_song_record(&dir.path().join("nope.json")).unwrap_err();
        assert!(matches!(err, EtlError::Io { .. }));
    }
}
