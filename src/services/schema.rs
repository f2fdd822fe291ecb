use sea_orm::sea_query::{Table, TableCreateStatement, TableDropStatement};
use sea_orm::*;

use crate::error::EtlError;
use crate::models::{artist, song, songplay, time, user};
use crate::utils::config::Config;
use crate::utils::db::establish_connection;
use crate::utils::validators::{quote_identifier, validate_database_name};

/// Table creation in foreign-key dependency order: dimensions before the fact table
pub fn create_table_statements(backend: DbBackend) -> Vec<TableCreateStatement> {
    let schema = Schema::new(backend);

    vec![
        schema.create_table_from_entity(user::Entity).if_not_exists().to_owned(),
        schema.create_table_from_entity(artist::Entity).if_not_exists().to_owned(),
        schema.create_table_from_entity(song::Entity).if_not_exists().to_owned(),
        schema.create_table_from_entity(time::Entity).if_not_exists().to_owned(),
        schema.create_table_from_entity(songplay::Entity).if_not_exists().to_owned(),
    ]
}

/// Table removal, the reverse of [`create_table_statements`]
pub fn drop_table_statements() -> Vec<TableDropStatement> {
    vec![
        Table::drop().table(songplay::Entity).if_exists().to_owned(),
        Table::drop().table(time::Entity).if_exists().to_owned(),
        Table::drop().table(song::Entity).if_exists().to_owned(),
        Table::drop().table(artist::Entity).if_exists().to_owned(),
        Table::drop().table(user::Entity).if_exists().to_owned(),
    ]
}

/// Drop and recreate the target database, then build every table in it.
///
/// Destroys all previously loaded data. Any failure aborts the reset and leaves
/// the schema in whatever state the failing statement produced.
pub async fn reset_schema(config: &Config) -> Result<(), EtlError> {
    log::info!(
        "Connecting to administrative database {}",
        config.admin.display_target()
    );
    let admin = establish_connection(&config.admin.connection_url())
        .await
        .map_err(EtlError::Connect)?;

    recreate_database(&admin, &config.target.database_name).await?;
    admin.close().await?;

    log::info!("Connecting to {}", config.target.display_target());
    let db = establish_connection(&config.target.connection_url())
        .await
        .map_err(EtlError::Connect)?;

    reset_tables(&db).await?;
    db.close().await?;

    Ok(())
}

/// Terminate other sessions on `name`, drop it and create it again as UTF-8.
pub async fn recreate_database(admin: &DatabaseConnection, name: &str) -> Result<(), EtlError> {
    validate_database_name(name)?;

    let backend = admin.get_database_backend();
    if backend != DbBackend::Postgres {
        return Err(EtlError::Config(format!(
            "Database reset needs a Postgres administrative connection, got {:?}",
            backend
        )));
    }

    let quoted = quote_identifier(name);

    log::info!("Terminating open sessions on database {}", name);
    run_ddl(
        admin,
        Statement::from_sql_and_values(
            backend,
            "SELECT pg_terminate_backend(pid) FROM pg_stat_activity \
             WHERE datname = $1 AND pid <> pg_backend_pid()",
            [Value::from(name)],
        ),
    )
    .await?;

    log::info!("Recreating database {}", name);
    run_ddl(
        admin,
        Statement::from_string(backend, format!("DROP DATABASE IF EXISTS {}", quoted)),
    )
    .await?;
    run_ddl(
        admin,
        Statement::from_string(
            backend,
            format!("CREATE DATABASE {} WITH ENCODING 'utf8' TEMPLATE template0", quoted),
        ),
    )
    .await?;

    Ok(())
}

/// Drop every table, then create every table
pub async fn reset_tables<C: ConnectionTrait>(db: &C) -> Result<(), EtlError> {
    drop_tables(db).await?;
    create_tables(db).await
}

pub async fn drop_tables<C: ConnectionTrait>(db: &C) -> Result<(), EtlError> {
    let backend = db.get_database_backend();
    for stmt in drop_table_statements() {
        run_ddl(db, backend.build(&stmt)).await?;
    }
    log::info!("Dropped all tables");
    Ok(())
}

pub async fn create_tables<C: ConnectionTrait>(db: &C) -> Result<(), EtlError> {
    let backend = db.get_database_backend();
    for stmt in create_table_statements(backend) {
        run_ddl(db, backend.build(&stmt)).await?;
    }
    log::info!("Created all tables");
    Ok(())
}

async fn run_ddl<C: ConnectionTrait>(db: &C, statement: Statement) -> Result<(), EtlError> {
    log::debug!("Executing: {}", statement.sql);
    let sql = statement.sql.clone();

    db.execute(statement).await.map_err(|source| EtlError::Ddl {
        statement: sql,
        source,
    })?;

    Ok(())
}
