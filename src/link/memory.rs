//! In-process connector.
//!
//! Stands in for the host platform when the background context lives in the
//! same process, and gives tests full control over open failures and link
//! loss.

use super::{Connector, DisconnectObserver, LinkHandle, LinkId};
use crate::types::{LinkError, LinkMessage, Result};
use futures::future::BoxFuture;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::mpsc;
use tokio::time::Instant;

#[derive(Debug, Default)]
struct MemoryPlatform {
    unreachable: bool,
    failures_remaining: u32,
    attempts: Vec<Instant>,
    live_at_open: Vec<usize>,
    links: Vec<mpsc::WeakUnboundedSender<LinkMessage>>,
}

impl MemoryPlatform {
    fn live_links(&self) -> usize {
        self.links
            .iter()
            .filter(|link| link.upgrade().is_some_and(|tx| !tx.is_closed()))
            .count()
    }
}

/// Connector whose "background context" is a [`MemoryPeer`] handed to the
/// caller for every successful open.
#[derive(Debug, Clone)]
pub struct MemoryConnector {
    platform: Arc<Mutex<MemoryPlatform>>,
    peers: mpsc::UnboundedSender<MemoryPeer>,
}

impl MemoryConnector {
    /// Create a connector and the stream of peers it opens
    pub fn new() -> (Self, mpsc::UnboundedReceiver<MemoryPeer>) {
        let (peers, rx) = mpsc::unbounded_channel();
        let connector = Self {
            platform: Arc::new(Mutex::new(MemoryPlatform::default())),
            peers,
        };
        (connector, rx)
    }

    fn platform(&self) -> MutexGuard<'_, MemoryPlatform> {
        self.platform.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Make the next `count` open attempts fail
    pub fn fail_next(&self, count: u32) {
        self.platform().failures_remaining = count;
    }

    /// Make every open attempt fail until set back to `true`
    pub fn set_reachable(&self, reachable: bool) {
        self.platform().unreachable = !reachable;
    }

    /// Times at which open was attempted, successful or not
    pub fn attempts(&self) -> Vec<Instant> {
        self.platform().attempts.clone()
    }

    pub fn attempt_count(&self) -> usize {
        self.platform().attempts.len()
    }

    /// For each attempt, how many earlier links were still held open by the
    /// caller when it started
    pub fn live_links_at_open(&self) -> Vec<usize> {
        self.platform().live_at_open.clone()
    }

    /// Links whose sending side is still held by the caller
    pub fn live_links(&self) -> usize {
        self.platform().live_links()
    }

    fn open_link(
        &self,
        link_id: LinkId,
        name: &str,
        observer: DisconnectObserver,
    ) -> Result<LinkHandle> {
        let mut platform = self.platform();
        let live = platform.live_links();
        platform.attempts.push(Instant::now());
        platform.live_at_open.push(live);

        if platform.unreachable {
            return Err(LinkError::Open(format!(
                "background context for '{}' is unreachable",
                name
            )));
        }
        if platform.failures_remaining > 0 {
            platform.failures_remaining -= 1;
            return Err(LinkError::Open(format!("no receiving end for '{}'", name)));
        }

        let (handle, inbound) = LinkHandle::channel(link_id, name);
        platform.links.push(handle.downgrade());
        drop(platform);

        let peer = MemoryPeer {
            link_id,
            name: name.to_string(),
            inbound: Some(inbound),
            observer,
        };
        if self.peers.send(peer).is_err() {
            tracing::debug!("Peer receiver dropped, link {} has no reader", link_id);
        }
        Ok(handle)
    }
}

impl Connector for MemoryConnector {
    fn open<'a>(
        &'a self,
        link_id: LinkId,
        name: &'a str,
        observer: DisconnectObserver,
    ) -> BoxFuture<'a, Result<LinkHandle>> {
        Box::pin(async move { self.open_link(link_id, name, observer) })
    }
}

/// The background-context end of one in-memory link.
#[derive(Debug)]
pub struct MemoryPeer {
    link_id: LinkId,
    name: String,
    inbound: Option<mpsc::UnboundedReceiver<LinkMessage>>,
    observer: DisconnectObserver,
}

impl MemoryPeer {
    pub fn link_id(&self) -> LinkId {
        self.link_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Wait for the next message. `None` once the link is cut or the
    /// manager dropped its handle.
    pub async fn recv(&mut self) -> Option<LinkMessage> {
        match self.inbound.as_mut() {
            Some(inbound) => inbound.recv().await,
            None => None,
        }
    }

    /// Messages already delivered, without waiting
    pub fn drain(&mut self) -> Vec<LinkMessage> {
        let mut messages = Vec::new();
        if let Some(inbound) = self.inbound.as_mut() {
            while let Ok(message) = inbound.try_recv() {
                messages.push(message);
            }
        }
        messages
    }

    /// Drop the receiving end without signalling. Sends start failing but the
    /// manager is not told the link is gone.
    pub fn cut(&mut self) {
        self.inbound = None;
    }

    /// Fire the disconnect signal for this link
    pub fn notify_disconnect(&self) {
        self.observer.notify();
    }

    /// Cut the link and signal the disconnect
    pub fn sever(&mut self) {
        self.cut();
        self.notify_disconnect();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manager::ManagerEvent;

    fn observer(id: u64) -> (DisconnectObserver, mpsc::UnboundedReceiver<ManagerEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (DisconnectObserver::new(LinkId::new(id), tx), rx)
    }

    #[tokio::test]
    async fn test_open_hands_peer_to_caller() {
        let (connector, mut peers) = MemoryConnector::new();
        let (obs, _events) = observer(1);

        let handle = connector.open(LinkId::new(1), "keepalive", obs).await.unwrap();
        let mut peer = peers.recv().await.unwrap();
        assert_eq!(peer.link_id(), LinkId::new(1));
        assert_eq!(peer.name(), "keepalive");

        handle.send(LinkMessage::new("ping", 5)).unwrap();
        assert_eq!(peer.recv().await.unwrap().timestamp, 5);
        assert_eq!(connector.live_links(), 1);

        drop(handle);
        assert_eq!(connector.live_links(), 0);
        assert!(peer.recv().await.is_none());
    }

    #[tokio::test]
    async fn test_fail_next_counts_down() {
        let (connector, _peers) = MemoryConnector::new();
        connector.fail_next(2);

        for _ in 0..2 {
            let (obs, _events) = observer(1);
            let result = connector.open(LinkId::new(1), "keepalive", obs).await;
            assert!(matches!(result, Err(LinkError::Open(_))));
        }

        let (obs, _events) = observer(2);
        assert!(connector.open(LinkId::new(2), "keepalive", obs).await.is_ok());
        assert_eq!(connector.attempt_count(), 3);
    }

    #[tokio::test]
    async fn test_unreachable_until_restored() {
        let (connector, _peers) = MemoryConnector::new();
        connector.set_reachable(false);

        let (obs, _events) = observer(1);
        assert!(connector.open(LinkId::new(1), "keepalive", obs).await.is_err());

        connector.set_reachable(true);
        let (obs, _events) = observer(2);
        assert!(connector.open(LinkId::new(2), "keepalive", obs).await.is_ok());
    }

    #[tokio::test]
    async fn test_sever_cuts_and_notifies() {
        let (connector, mut peers) = MemoryConnector::new();
        let (obs, mut events) = observer(4);

        let handle = connector.open(LinkId::new(4), "keepalive", obs).await.unwrap();
        let mut peer = peers.recv().await.unwrap();

        peer.sever();
        assert!(handle.send(LinkMessage::ping()).is_err());
        assert!(matches!(
            events.recv().await,
            Some(ManagerEvent::Disconnected(id)) if id == LinkId::new(4)
        ));
    }
}
