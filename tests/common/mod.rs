#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use sea_orm::DatabaseConnection;
use serde_json::{json, Value};
use songplays_etl::services::schema::reset_tables;
use songplays_etl::utils::db::establish_connection;
use tempfile::TempDir;

/// A file-backed SQLite database with the schema already created
pub struct TestDb {
    pub db: DatabaseConnection,
    pub dir: TempDir,
}

impl TestDb {
    pub async fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let url = format!("sqlite://{}?mode=rwc", dir.path().join("etl.db").display());
        let db = establish_connection(&url).await.unwrap();
        reset_tables(&db).await.unwrap();
        TestDb { db, dir }
    }

    /// Create an empty data directory under the test's temp dir
    pub fn data_dir(&self, name: &str) -> PathBuf {
        let path = self.dir.path().join(name);
        fs::create_dir_all(&path).unwrap();
        path
    }
}

pub fn song_json(song_id: &str, title: &str, artist_id: &str, artist_name: &str, duration: f64) -> Value {
    json!({
        "num_songs": 1,
        "song_id": song_id,
        "title": title,
        "artist_id": artist_id,
        "year": 2000,
        "duration": duration,
        "artist_name": artist_name,
        "artist_location": "L",
        "artist_latitude": 1.0,
        "artist_longitude": 2.0
    })
}

pub fn event_json(page: &str, user_id: &str, level: &str, ts: i64, song: &str, artist: &str, length: f64) -> Value {
    json!({
        "artist": artist,
        "auth": "Logged In",
        "firstName": "Kaylee",
        "gender": "F",
        "itemInSession": 0,
        "lastName": "Summers",
        "length": length,
        "level": level,
        "location": "Phoenix-Mesa-Scottsdale, AZ",
        "method": "PUT",
        "page": page,
        "registration": 1540344794796.0,
        "sessionId": 139,
        "song": song,
        "status": 200,
        "ts": ts,
        "userAgent": "Mozilla/5.0",
        "userId": user_id
    })
}

pub fn login_json(ts: i64) -> Value {
    json!({
        "artist": null,
        "auth": "Logged Out",
        "firstName": null,
        "gender": null,
        "itemInSession": 0,
        "lastName": null,
        "length": null,
        "level": "free",
        "location": null,
        "method": "PUT",
        "page": "Login",
        "registration": null,
        "sessionId": 52,
        "song": null,
        "status": 307,
        "ts": ts,
        "userAgent": null,
        "userId": ""
    })
}

pub fn write_json(path: &Path, value: &Value) {
    fs::write(path, value.to_string()).unwrap();
}

/// Write one JSON object per line
pub fn write_lines(path: &Path, values: &[Value]) {
    let content: Vec<String> = values.iter().map(Value::to_string).collect();
    fs::write(path, content.join("\n")).unwrap();
}
