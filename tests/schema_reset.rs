mod common;

use sea_orm::*;
use songplays_etl::models::{artist, song, songplay, time, user};
use songplays_etl::services::schema::{recreate_database, reset_tables};
use songplays_etl::EtlError;

use common::*;

async fn table_names(db: &DatabaseConnection) -> Vec<String> {
    let rows = db
        .query_all(Statement::from_string(
            DbBackend::Sqlite,
            "SELECT name FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%' ORDER BY name",
        ))
        .await
        .unwrap();

    rows.iter()
        .map(|row| row.try_get::<String>("", "name").unwrap())
        .collect()
}

async fn assert_empty_schema(db: &DatabaseConnection) {
    assert_eq!(
        table_names(db).await,
        vec!["artists", "songplays", "songs", "time", "users"]
    );
    assert_eq!(song::Entity::find().count(db).await.unwrap(), 0);
    assert_eq!(artist::Entity::find().count(db).await.unwrap(), 0);
    assert_eq!(time::Entity::find().count(db).await.unwrap(), 0);
    assert_eq!(user::Entity::find().count(db).await.unwrap(), 0);
    assert_eq!(songplay::Entity::find().count(db).await.unwrap(), 0);
}

#[tokio::test]
async fn test_reset_twice_leaves_five_empty_tables() {
    let t = TestDb::new().await;
    assert_empty_schema(&t.db).await;

    reset_tables(&t.db).await.unwrap();
    assert_empty_schema(&t.db).await;

    reset_tables(&t.db).await.unwrap();
    assert_empty_schema(&t.db).await;
}

#[tokio::test]
async fn test_reset_discards_loaded_rows() {
    let t = TestDb::new().await;
    let songs_dir = t.data_dir("song_data");
    write_json(&songs_dir.join("s.json"), &song_json("S1", "T", "A1", "N", 180.5));
    songplays_etl::services::loader::run_load(
        &t.db,
        &songs_dir,
        &songplays_etl::handlers::SongFileHandler,
        Default::default(),
    )
    .await
    .unwrap();
    assert_eq!(song::Entity::find().count(&t.db).await.unwrap(), 1);

    reset_tables(&t.db).await.unwrap();
    assert_empty_schema(&t.db).await;
}

#[tokio::test]
async fn test_database_recreate_needs_postgres() {
    let t = TestDb::new().await;

    let err = recreate_database(&t.db, "sparkifydb").await.unwrap_err();
    assert!(matches!(err, EtlError::Config(_)));

    let err = recreate_database(&t.db, "bad name").await.unwrap_err();
    assert!(matches!(err, EtlError::Config(_)));
}
