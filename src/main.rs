use jaldikhana::{server, AppConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Credentials usually live in .env.local; RUST_LOG may too, so load first.
    dotenv::from_filename(".env.local").ok();
    dotenv::dotenv().ok();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = AppConfig::load()?;
    server::serve(&config).await?;

    Ok(())
}
