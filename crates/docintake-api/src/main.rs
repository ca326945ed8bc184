use anyhow::Result;
use docintake_api::setup;
use docintake_core::Config;
use docintake_infra::{init_telemetry, LogFormat};

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    init_telemetry(
        "docintake-api",
        LogFormat::for_environment(config.is_production()),
    )?;

    let (_state, router) = setup::initialize_app(&config).await?;
    setup::server::start_server(&config, router).await?;

    Ok(())
}
