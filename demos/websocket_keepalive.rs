use keepalive_link::{KeepaliveManager, KeepaliveOptions, WebSocketConnector};

/// First local mediator port
const DEFAULT_ENDPOINT: &str = "ws://127.0.0.1:4625";

/// Hold a keepalive link to a WebSocket endpoint until Ctrl-C
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let endpoint =
        std::env::var("KEEPALIVE_ENDPOINT").unwrap_or_else(|_| DEFAULT_ENDPOINT.to_string());
    let options = KeepaliveOptions::from_env()?;

    println!("🦀 Keepalive link to {} (channel '{}')", endpoint, options.channel_name);
    println!("   Stop the server to watch reconnects, Ctrl-C to exit\n");

    let connector = WebSocketConnector::new(&endpoint)?;
    let handle = KeepaliveManager::start(connector, options)?;

    let mut status = handle.subscribe();
    loop {
        tokio::select! {
            changed = status.changed() => {
                if changed.is_err() {
                    break;
                }
                let current = *status.borrow_and_update();
                println!(
                    "🔄 {} (attempts={}, heartbeats={})",
                    current.state, current.stats.open_attempts, current.stats.heartbeats_sent
                );
            }
            _ = tokio::signal::ctrl_c() => {
                println!("\n👋 Shutting down");
                break;
            }
        }
    }

    handle.shutdown().await;
    Ok(())
}
