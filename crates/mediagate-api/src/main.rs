use mediagate_api::setup;
use mediagate_core::Config;

// mimalloc as the global allocator; lower fragmentation on musl-based images.
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    let config = Config::from_env()?;

    let (_state, router, pool) = setup::initialize_app(config.clone()).await?;

    setup::server::start_server(&config, router).await?;

    pool.close().await;
    tracing::info!("Database pool closed");

    Ok(())
}
