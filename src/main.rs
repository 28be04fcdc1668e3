use tracing::{error, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env is fine; the process environment is used as is.
    let dotenv_loaded = dotenvy::dotenv().is_ok();

    let config = af_server::load_from_env()?;
    af_server::init_tracing_subscriber(&config.logging)?;
    info!(dotenv_loaded, "Starting auctionfront");

    if let Err(err) = af_server::run(config).await {
        error!(error = %format!("{err:#}"), "auctionfront exited with an error");
        return Err(err);
    }
    Ok(())
}
