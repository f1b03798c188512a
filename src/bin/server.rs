//! The light service binary.
use anyhow::Result;
use lightwatch::{config, server};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    color_backtrace::install();

    let env = config::ServerEnvironment::load()?;
    server::run(&env.http_listener_address).await?;

    Ok(())
}
