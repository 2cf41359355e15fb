//! Demo driver: run a grid of simulated clients against a queue server.
//!
//! Each widget in the grid gets its own socket client that joins the queue
//! on open and logs whatever the server sends back. Ctrl-c closes every
//! socket cleanly.

use std::time::Duration;

use anyhow::{Context, Result};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use queuelink_client::{ClientGrid, SocketClient};
use queuelink_shared::{QueueRequest, QueueResponse};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("queuelink_client=debug")),
        )
        .init();

    let mut args = std::env::args().skip(1);
    let url = args
        .next()
        .context("usage: queuelink-client <ws-url> [client-count]")?;
    let count: usize = args
        .next()
        .map(|raw| raw.parse())
        .transpose()
        .context("client-count must be an integer")?
        .unwrap_or(1);

    let mut grid = ClientGrid::new();
    for _ in 0..count {
        grid.add_client();
    }

    let mut clients: Vec<SocketClient<QueueRequest, QueueResponse>> =
        Vec::with_capacity(grid.count());
    for widget in grid.widgets() {
        let client = SocketClient::new();
        let label = widget.label().to_owned();
        client.connect(
            &url,
            || Some(QueueRequest::JoinQueue),
            move |response| match response {
                QueueResponse::QueueJoined => info!(%label, "joined the queue"),
                QueueResponse::MatchFound { server } => info!(%label, %server, "match found"),
                QueueResponse::QueueError { message } => warn!(%label, %message, "queue error"),
            },
        );
        clients.push(client);
    }

    info!(count = grid.count(), %url, "clients connecting; ctrl-c to quit");
    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for ctrl-c")?;

    for client in &clients {
        client.close();
    }
    // Give the close frames a moment to flush.
    tokio::time::sleep(Duration::from_millis(200)).await;
    Ok(())
}
