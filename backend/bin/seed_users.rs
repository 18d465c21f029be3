use anyhow::Result;
use clap::{Arg, Command};
use tribelink::db::{DatabaseConfig, get_db_pool, users};
use tribelink::utils::init_logging;

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();

    let matches = Command::new("seed-users")
        .about("Create a user row for local development and testing")
        .arg(
            Arg::new("username")
                .long("username")
                .required(true)
                .help("Username for the new user"),
        )
        .arg(
            Arg::new("phone")
                .long("phone")
                .required(true)
                .help("Phone number for the new user"),
        )
        .get_matches();

    let username = matches.get_one::<String>("username").expect("required");
    let phone = matches.get_one::<String>("phone").expect("required");

    let db_config = DatabaseConfig::from_env()?;
    let pool = get_db_pool(&db_config).await?;

    if let Some(existing) = users::get_user_by_username(&pool, username).await? {
        println!("User '{}' already exists with id {}", username, existing.id);
        return Ok(());
    }

    let user = users::create_user(&pool, username, phone).await?;
    println!("Created user '{}' with id {}", user.username, user.id);

    Ok(())
}
