//! CLI entry point: build the effective-ownership snapshot and write it to disk.

use std::io::Write;
use std::sync::Arc;

use fpl_eo::{Config, FetchStage, FplClient, Result, SnapshotBuilder, write_snapshot};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "fpl_eo=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Optional single argument: path to a JSON config file
    let config = match std::env::args().nth(1) {
        Some(path) => Config::load(&path)?,
        None => Config::default(),
    };
    let config = Arc::new(config);

    let client = Arc::new(FplClient::new(&config.api_base_url)?);
    let builder = SnapshotBuilder::new(client, config.clone());

    // In-place console progress, throttled so large picks batches don't
    // flood the terminal: standings every 20 completions, picks every 200,
    // always the final one.
    let mut progress = |stage: FetchStage, done: usize, total: usize| {
        let step = match stage {
            FetchStage::Standings => 20,
            FetchStage::Picks => 200,
        };
        if done % step == 0 || done == total {
            print!("\r  {}: {}/{}", stage.label(), done, total);
            std::io::stdout().flush().ok();
        }
        if done == total {
            println!();
        }
    };

    let Some(snapshot) = builder.build(Some(&mut progress)).await? else {
        // No active gameweek is a clean no-op, not a failure
        return Ok(());
    };

    write_snapshot(&snapshot, &config.output_path).await?;
    Ok(())
}
