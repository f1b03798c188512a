//! Terminal panel for watching and toggling a smart light.
use std::time::Duration;

use anyhow::Result;
use lightwatch::panel::Command;
use lightwatch::{api, config, panel, spawn, ui};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::debug;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    color_backtrace::install();

    let env = config::Environment::load()?;
    let api_config = api::Config {
        base_url: env.light_url,
    };

    let (rx_state, tx_cmd) = panel::run(api_config, Duration::from_secs(env.poll_interval));

    spawn("input", async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            let cmd = match line.trim() {
                "t" | "toggle" => Command::Toggle,
                "r" | "refresh" => Command::Refresh,
                "q" | "quit" => Command::Shutdown,
                "" => continue,
                other => {
                    println!("unknown command: {other} (t=toggle, r=refresh, q=quit)");
                    continue;
                }
            };
            let quit = matches!(cmd, Command::Shutdown);
            if tx_cmd.send(cmd).await.is_err() || quit {
                break;
            }
        }
    });

    let mut subscription = rx_state.subscribe().await;
    while let Ok(state) = subscription.recv().await {
        println!("{}\n", ui::render(&state));
    }

    debug!("panel stopped");
    Ok(())
}
