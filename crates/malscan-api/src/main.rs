use malscan_core::Config;
use tokio_util::sync::CancellationToken;

// Use mimalloc as the global allocator for better performance and lower fragmentation,
// especially when running on musl-based systems inside containers.
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    let config = Config::from_env()?;
    let shutdown = CancellationToken::new();

    let (_state, router) = malscan_api::setup::initialize_app(config.clone(), shutdown.clone()).await?;

    malscan_api::setup::server::start_server(&config, router, shutdown).await?;

    Ok(())
}
