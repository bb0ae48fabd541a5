use crate::manager::ManagerEvent;
use crate::types::{LinkError, LinkMessage, Result};
use std::fmt;
use tokio::sync::mpsc;

/// Identity of one open attempt, unique within a manager
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LinkId(u64);

impl LinkId {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for LinkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Sending side of an open link.
///
/// Messages are enqueued on an unbounded queue drained by the transport.
/// Once the transport drops its end, every send fails with
/// [`LinkError::Send`].
#[derive(Debug)]
pub struct LinkHandle {
    id: LinkId,
    name: String,
    outbound: mpsc::UnboundedSender<LinkMessage>,
}

impl LinkHandle {
    pub fn new(
        id: LinkId,
        name: impl Into<String>,
        outbound: mpsc::UnboundedSender<LinkMessage>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            outbound,
        }
    }

    /// Create a handle together with the receiver the transport drains
    pub fn channel(
        id: LinkId,
        name: impl Into<String>,
    ) -> (Self, mpsc::UnboundedReceiver<LinkMessage>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self::new(id, name, tx), rx)
    }

    pub fn id(&self) -> LinkId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Enqueue a message for delivery
    pub fn send(&self, message: LinkMessage) -> Result<()> {
        self.outbound
            .send(message)
            .map_err(|_| LinkError::Send(format!("link {} is closed", self.id)))
    }

    /// Weak sender that does not keep the link open
    pub(crate) fn downgrade(&self) -> mpsc::WeakUnboundedSender<LinkMessage> {
        self.outbound.downgrade()
    }

    /// Whether the transport side has gone away
    pub fn is_closed(&self) -> bool {
        self.outbound.is_closed()
    }
}

/// Disconnect callback handed to a connector for one link.
///
/// Transports call [`notify`](Self::notify) when the link is severed. Calling
/// it more than once, or after the manager moved on to another link, is
/// harmless: the manager only acts on the first signal for its active link.
#[derive(Debug, Clone)]
pub struct DisconnectObserver {
    link_id: LinkId,
    events: mpsc::UnboundedSender<ManagerEvent>,
}

impl DisconnectObserver {
    pub(crate) fn new(link_id: LinkId, events: mpsc::UnboundedSender<ManagerEvent>) -> Self {
        Self { link_id, events }
    }

    pub fn link_id(&self) -> LinkId {
        self.link_id
    }

    /// Report that the link was severed
    pub fn notify(&self) {
        if self
            .events
            .send(ManagerEvent::Disconnected(self.link_id))
            .is_err()
        {
            tracing::debug!(
                "Manager gone, dropping disconnect signal for link {}",
                self.link_id
            );
        }
    }
}
