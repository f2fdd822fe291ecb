use std::fs;
use std::path::Path;

use async_trait::async_trait;
use sea_orm::sea_query::OnConflict;
use sea_orm::*;
use serde::{Deserialize, Deserializer};

use super::{FileHandler, RowCounts};
use crate::error::EtlError;
use crate::models::{artist, song, songplay, time, user};
use crate::utils::timestamp::TimeParts;

/// The only page type that represents an actual playback
pub const NEXT_SONG_PAGE: &str = "NextSong";

// ============ Source records ============

/// `userId` shows up as a number in some exports and as a string in others
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RawUserId {
    Number(i64),
    Text(String),
}

impl RawUserId {
    fn to_user_id(&self) -> Option<i32> {
        match self {
            RawUserId::Number(n) => i32::try_from(*n).ok(),
            RawUserId::Text(s) => s.trim().parse().ok(),
        }
    }
}

/// `ts` is epoch milliseconds, written either as an integer or as a float
/// with no fractional part (`1541106106796.0`)
#[derive(Deserialize)]
#[serde(untagged)]
enum RawTimestamp {
    Int(i64),
    Float(f64),
}

fn deserialize_epoch_millis<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    match RawTimestamp::deserialize(deserializer)? {
        RawTimestamp::Int(ms) => Ok(ms),
        RawTimestamp::Float(ms)
            if ms.fract() == 0.0 && ms >= i64::MIN as f64 && ms < i64::MAX as f64 =>
        {
            Ok(ms as i64)
        }
        RawTimestamp::Float(ms) => Err(serde::de::Error::custom(format!(
            "timestamp {} is not a whole number of milliseconds",
            ms
        ))),
    }
}

/// One line of an activity log. Only `page` and `ts` are present on every
/// event; the rest depends on the page type.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEvent {
    pub page: String,
    #[serde(deserialize_with = "deserialize_epoch_millis")]
    pub ts: i64,
    pub user_id: Option<RawUserId>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub gender: Option<String>,
    pub level: Option<String>,
    pub song: Option<String>,
    pub artist: Option<String>,
    pub length: Option<f64>,
    pub session_id: Option<i64>,
    pub location: Option<String>,
    pub user_agent: Option<String>,
}

/// A `NextSong` event with every field the star schema needs
#[derive(Debug, Clone, PartialEq)]
pub struct SongPlayEvent {
    pub time: TimeParts,
    pub user_id: i32,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub gender: Option<String>,
    pub level: String,
    pub song: String,
    pub artist: String,
    pub length: f64,
    pub session_id: i32,
    pub location: Option<String>,
    pub user_agent: Option<String>,
}

impl SongPlayEvent {
    fn from_event(event: LogEvent, path: &Path, line: usize) -> Result<Self, EtlError> {
        let missing = |field| EtlError::MissingField {
            path: path.to_path_buf(),
            line,
            field,
        };

        let time = TimeParts::from_epoch_millis(event.ts).ok_or_else(|| EtlError::InvalidTimestamp {
            path: path.to_path_buf(),
            line,
            ts: event.ts,
        })?;

        Ok(SongPlayEvent {
            time,
            user_id: event
                .user_id
                .as_ref()
                .and_then(RawUserId::to_user_id)
                .ok_or_else(|| missing("userId"))?,
            first_name: event.first_name,
            last_name: event.last_name,
            gender: event.gender,
            level: event.level.ok_or_else(|| missing("level"))?,
            song: event.song.ok_or_else(|| missing("song"))?,
            artist: event.artist.ok_or_else(|| missing("artist"))?,
            length: event.length.ok_or_else(|| missing("length"))?,
            session_id: event
                .session_id
                .and_then(|id| i32::try_from(id).ok())
                .ok_or_else(|| missing("sessionId"))?,
            location: event.location,
            user_agent: event.user_agent,
        })
    }

    fn time_model(&self) -> time::ActiveModel {
        time::ActiveModel::from(&self.time)
    }

    fn user_model(&self) -> user::ActiveModel {
        user::ActiveModel {
            user_id: Set(self.user_id),
            first_name: Set(self.first_name.clone()),
            last_name: Set(self.last_name.clone()),
            gender: Set(self.gender.clone()),
            level: Set(self.level.clone()),
        }
    }

    fn songplay_model(&self, catalog_match: Option<(String, String)>) -> songplay::ActiveModel {
        let (song_id, artist_id) = match catalog_match {
            Some((song_id, artist_id)) => (Some(song_id), Some(artist_id)),
            None => (None, None),
        };

        songplay::ActiveModel {
            songplay_id: NotSet,
            start_time: Set(self.time.start_time),
            user_id: Set(self.user_id),
            level: Set(self.level.clone()),
            song_id: Set(song_id),
            artist_id: Set(artist_id),
            session_id: Set(self.session_id),
            location: Set(self.location.clone()),
            user_agent: Set(self.user_agent.clone()),
        }
    }
}

/// Parse every line of a log file, keeping `(line number, event)` pairs.
///
/// The whole file is parsed before anything is written, so one malformed line
/// rejects the file. Blank lines are skipped.
pub fn read_log_events(path: &Path) -> Result<Vec<(usize, LogEvent)>, EtlError> {
    let content = fs::read_to_string(path).map_err(|e| EtlError::io(path, e))?;

    content
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(idx, line)| {
            serde_json::from_str::<LogEvent>(line)
                .map(|event| (idx + 1, event))
                .map_err(|source| EtlError::Parse {
                    path: path.to_path_buf(),
                    line: idx + 1,
                    source,
                })
        })
        .collect()
}

/// Parse a log file and keep its playback events, in file order
pub fn read_song_plays(path: &Path) -> Result<Vec<SongPlayEvent>, EtlError> {
    read_log_events(path)?
        .into_iter()
        .filter(|(_, event)| event.page == NEXT_SONG_PAGE)
        .map(|(line, event)| SongPlayEvent::from_event(event, path, line))
        .collect()
}

// ============ Loading ============

/// Find the `(song_id, artist_id)` pair for a played track.
///
/// Title, artist name and duration must all match exactly, duration included.
pub async fn lookup_song<C: ConnectionTrait>(
    db: &C,
    title: &str,
    artist_name: &str,
    duration: f64,
) -> Result<Option<(String, String)>, DbErr> {
    song::Entity::find()
        .select_only()
        .column(song::Column::SongId)
        .column(song::Column::ArtistId)
        .inner_join(artist::Entity)
        .filter(song::Column::Title.eq(title))
        .filter(artist::Column::Name.eq(artist_name))
        .filter(song::Column::Duration.eq(duration))
        .into_tuple()
        .one(db)
        .await
}

/// Load the playback events of one log file.
///
/// Time rows are deduplicated by their key, users are upserted so the last
/// event for a user in file order decides the stored level, and every event
/// produces a songplay whether or not its track is in the catalog.
pub async fn load_log_file<C: ConnectionTrait>(db: &C, path: &Path) -> Result<RowCounts, EtlError> {
    let plays = read_song_plays(path)?;
    let mut counts = RowCounts::default();

    for play in &plays {
        counts.time_rows += time::Entity::insert(play.time_model())
            .on_conflict(
                OnConflict::column(time::Column::StartTime)
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(db)
            .await?;
    }

    for play in &plays {
        counts.users += user::Entity::insert(play.user_model())
            .on_conflict(
                OnConflict::column(user::Column::UserId)
                    .update_columns([
                        user::Column::FirstName,
                        user::Column::LastName,
                        user::Column::Gender,
                        user::Column::Level,
                    ])
                    .to_owned(),
            )
            .exec_without_returning(db)
            .await?;
    }

    for play in &plays {
        let catalog_match = lookup_song(db, &play.song, &play.artist, play.length).await?;
        if catalog_match.is_some() {
            counts.matched_songplays += 1;
        }

        songplay::Entity::insert(play.songplay_model(catalog_match))
            .exec_without_returning(db)
            .await?;
        counts.songplays += 1;
    }

    log::debug!(
        "{}: {} song plays, {} matched in catalog",
        path.display(),
        counts.songplays,
        counts.matched_songplays
    );

    Ok(counts)
}

pub struct LogFileHandler;

#[async_trait]
impl FileHandler for LogFileHandler {
    fn kind(&self) -> &'static str {
        "log"
    }

    async fn load_file(&self, txn: &DatabaseTransaction, path: &Path) -> Result<RowCounts, EtlError> {
        load_log_file(txn, path).await
    }
}
