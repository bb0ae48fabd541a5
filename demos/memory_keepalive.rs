use keepalive_link::{KeepaliveManager, KeepaliveOptions, LinkState, MemoryConnector};

/// Drive the keepalive loop against an in-process background context
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    println!("🦀 Keepalive over an in-memory link\n");

    let (connector, mut peers) = MemoryConnector::new();
    connector.fail_next(1);

    let handle = KeepaliveManager::start(
        connector.clone(),
        KeepaliveOptions {
            heartbeat_interval: Some(2_000),
            ..Default::default()
        },
    )?;

    println!("⏳ First open is rigged to fail, expect a retry after 2 seconds...");
    let mut peer = peers.recv().await.ok_or("connector dropped")?;
    handle.wait_for(LinkState::Open).await?;
    println!("✅ Link {} open\n", peer.link_id());

    for _ in 0..3 {
        let message = peer.recv().await.ok_or("link closed")?;
        println!("💓 {} at {}", message.kind, message.timestamp);
    }

    println!("\n⚠️  Severing the link...");
    peer.sever();
    handle.wait_for(LinkState::Disconnected).await?;

    let peer = peers.recv().await.ok_or("connector dropped")?;
    handle.wait_for(LinkState::Open).await?;
    println!("✅ Reconnected as link {}\n", peer.link_id());

    let stats = handle.status().stats;
    println!(
        "📋 attempts={} failures={} disconnects={} heartbeats={}",
        stats.open_attempts, stats.open_failures, stats.disconnects, stats.heartbeats_sent
    );

    handle.shutdown().await;
    Ok(())
}
