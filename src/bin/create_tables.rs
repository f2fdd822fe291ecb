use anyhow::Context;
use songplays_etl::services::schema::reset_schema;
use songplays_etl::utils::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::from_env().context("Failed to load configuration")?;

    println!("=================================================");
    println!("Resetting schema");
    println!("   - Admin database: {}", config.admin.display_target());
    println!("   - Target database: {}", config.target.display_target());
    println!("=================================================");

    reset_schema(&config)
        .await
        .with_context(|| format!("Failed to reset database {}", config.target.database_name))?;

    log::info!("Database {} recreated with all tables", config.target.database_name);

    Ok(())
}
