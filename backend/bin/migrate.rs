use tribelink::db::DatabaseConfig;
use tribelink::{get_db_pool, utils};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    utils::init_logging();

    let db_config = DatabaseConfig::from_env()?;
    let pool = get_db_pool(&db_config).await?;

    println!("Running database migrations...");
    tribelink::db::migrations::run_migrations(&pool).await?;
    println!("Migrations completed successfully!");

    Ok(())
}
