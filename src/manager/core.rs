use super::{
    KeepaliveManagerBuilder, KeepaliveOptions, KeepaliveStatus, LinkState, ManagerEvent,
    ManagerState,
};
use crate::infrastructure::HeartbeatTicker;
use crate::link::{Connector, DisconnectObserver, LinkId};
use crate::types::{LinkError, LinkMessage, Result};
use std::collections::VecDeque;
use std::ops::ControlFlow;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

/// Keeps one link to the background context open for as long as it runs.
///
/// All state lives in a single event loop. Heartbeat ticks, retry timers and
/// disconnect signals are posted to the loop as [`ManagerEvent`]s and applied
/// one at a time, so at most one link, one heartbeat timer and one pending
/// retry exist at any instant.
///
/// # Example
///
/// ```no_run
/// use keepalive_link::{KeepaliveManager, KeepaliveOptions, WebSocketConnector};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let connector = WebSocketConnector::new("ws://127.0.0.1:4625")?;
/// let handle = KeepaliveManager::start(connector, KeepaliveOptions::default())?;
///
/// // The loop reconnects on its own; the handle only observes it.
/// println!("link is {}", handle.state());
/// # Ok(())
/// # }
/// ```
pub struct KeepaliveManager {
    connector: Arc<dyn Connector>,
    options: KeepaliveOptions,
    events_tx: mpsc::UnboundedSender<ManagerEvent>,
    events_rx: mpsc::UnboundedReceiver<ManagerEvent>,
    deferred: VecDeque<ManagerEvent>,
    state: ManagerState,
    status_tx: watch::Sender<KeepaliveStatus>,
}

impl KeepaliveManager {
    /// Creates a manager without starting it.
    ///
    /// # Errors
    ///
    /// Returns [`LinkError::Config`] if the options are invalid.
    pub fn new(connector: impl Connector, options: KeepaliveOptions) -> Result<Self> {
        KeepaliveManagerBuilder::new(connector, options).map(|builder| builder.build())
    }

    /// Creates a manager and immediately spawns its loop on the current
    /// tokio runtime. The first open attempt starts right away.
    ///
    /// # Errors
    ///
    /// Returns [`LinkError::Config`] if the options are invalid.
    pub fn start(connector: impl Connector, options: KeepaliveOptions) -> Result<KeepaliveHandle> {
        Self::new(connector, options).map(Self::spawn)
    }

    pub(crate) fn from_parts(connector: Arc<dyn Connector>, options: KeepaliveOptions) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let (status_tx, _) = watch::channel(KeepaliveStatus {
            state: LinkState::Connecting,
            ..KeepaliveStatus::default()
        });
        let state = ManagerState::new(options.retry_policy());

        Self {
            connector,
            options,
            events_tx,
            events_rx,
            deferred: VecDeque::new(),
            state,
            status_tx,
        }
    }

    /// Spawn the event loop and return a handle to observe or stop it
    pub fn spawn(self) -> KeepaliveHandle {
        let events = self.events_tx.clone();
        let status = self.status_tx.subscribe();
        let task = tokio::spawn(self.run());

        KeepaliveHandle {
            events,
            status,
            task,
        }
    }

    /// Run the loop until shutdown
    pub async fn run(mut self) {
        tracing::info!(
            "Keepalive manager started for channel '{}'",
            self.options.channel_name
        );

        if self.establish().await.is_break() {
            self.stop();
            return;
        }
        self.publish();

        while let Some(event) = self.next_event().await {
            match event {
                ManagerEvent::Establish => {
                    // The retry that posted this has fired
                    self.state.retry.clear();
                    if self.establish().await.is_break() {
                        break;
                    }
                }
                ManagerEvent::HeartbeatTick(link_id) => self.on_heartbeat_tick(link_id),
                ManagerEvent::Disconnected(link_id) => self.on_disconnect(link_id),
                ManagerEvent::Shutdown => break,
            }
            self.publish();
        }

        self.stop();
    }

    /// Events held back while an open was in flight come first
    async fn next_event(&mut self) -> Option<ManagerEvent> {
        match self.deferred.pop_front() {
            Some(event) => Some(event),
            None => self.events_rx.recv().await,
        }
    }

    /// Open a channel to the background context.
    ///
    /// Never fails outward: an open error is logged and turned into a
    /// scheduled retry. Breaks only when shutdown arrives mid-open.
    async fn establish(&mut self) -> ControlFlow<()> {
        if let Some(link) = &self.state.link {
            tracing::debug!("Link {} already open, skipping establish", link.id());
            return ControlFlow::Continue(());
        }

        let link_id = self.state.make_link_id();
        self.state.state = LinkState::Connecting;
        self.state.stats.open_attempts += 1;
        self.publish();

        let observer = DisconnectObserver::new(link_id, self.events_tx.clone());
        let open = self
            .connector
            .open(link_id, &self.options.channel_name, observer);

        let result = {
            let open = tokio::time::timeout(self.options.open_timeout(), open);
            tokio::pin!(open);

            loop {
                tokio::select! {
                    biased;
                    event = self.events_rx.recv() => match event {
                        Some(ManagerEvent::Shutdown) | None => {
                            tracing::info!("Shutdown requested while opening link {}", link_id);
                            return ControlFlow::Break(());
                        }
                        // A disconnect from the link being opened must survive
                        Some(event) => self.deferred.push_back(event),
                    },
                    opened = &mut open => break match opened {
                        Ok(result) => result,
                        Err(_) => Err(LinkError::Open(format!(
                            "timed out after {}ms",
                            self.options.open_timeout().as_millis()
                        ))),
                    },
                }
            }
        };

        match result {
            Ok(link) => {
                let ticker = HeartbeatTicker::new(link_id, self.events_tx.clone())
                    .with_interval(self.options.heartbeat_interval());
                self.state.heartbeat.arm(ticker.run());
                self.state.link = Some(link);
                self.state.retry_policy.reset();
                self.state.state = LinkState::Open;

                tracing::info!(
                    "Link {} open on channel '{}'",
                    link_id,
                    self.options.channel_name
                );
            }
            Err(e) => {
                self.state.stats.open_failures += 1;
                let delay = self.state.retry_policy.next_open_failure_delay();
                tracing::error!(
                    "Failed to open link {}: {} (retrying in {}ms)",
                    link_id,
                    e,
                    delay.as_millis()
                );
                self.schedule_retry(delay);
            }
        }

        ControlFlow::Continue(())
    }

    fn on_heartbeat_tick(&mut self, link_id: LinkId) {
        let Some(link) = self.state.link.as_ref().filter(|link| link.id() == link_id) else {
            tracing::debug!("Dropping heartbeat tick for inactive link {}", link_id);
            return;
        };

        match link.send(LinkMessage::ping()) {
            Ok(()) => {
                self.state.stats.heartbeats_sent += 1;
                tracing::debug!("Sent heartbeat on link {}", link_id);
            }
            Err(e) => {
                // The disconnect signal decides when the link is gone
                self.state.stats.heartbeats_failed += 1;
                tracing::debug!("Heartbeat on link {} not sent: {}", link_id, e);
            }
        }
    }

    fn on_disconnect(&mut self, link_id: LinkId) {
        if !self.state.is_active(link_id) {
            tracing::debug!("Ignoring disconnect for inactive link {}", link_id);
            return;
        }

        self.state.heartbeat.clear();
        self.state.link = None;
        self.state.stats.disconnects += 1;

        let delay = self.state.retry_policy.next_disconnect_delay();
        tracing::warn!(
            "Link {} disconnected, reconnecting in {}ms",
            link_id,
            delay.as_millis()
        );
        self.schedule_retry(delay);
    }

    fn schedule_retry(&mut self, delay: Duration) {
        let events = self.events_tx.clone();
        self.state.retry.arm(async move {
            tokio::time::sleep(delay).await;
            let _ = events.send(ManagerEvent::Establish);
        });
        self.state.state = LinkState::Disconnected;
    }

    fn stop(&mut self) {
        self.state.heartbeat.clear();
        self.state.retry.clear();
        self.state.link = None;
        self.state.state = LinkState::Stopped;
        self.publish();
        tracing::info!("Keepalive manager stopped");
    }

    fn publish(&self) {
        self.status_tx.send_replace(self.state.status());
    }
}

/// Handle to a running [`KeepaliveManager`].
///
/// Dropping the handle leaves the loop running for the life of the runtime.
pub struct KeepaliveHandle {
    events: mpsc::UnboundedSender<ManagerEvent>,
    status: watch::Receiver<KeepaliveStatus>,
    task: JoinHandle<()>,
}

impl KeepaliveHandle {
    pub fn state(&self) -> LinkState {
        self.status.borrow().state
    }

    /// Latest published snapshot
    pub fn status(&self) -> KeepaliveStatus {
        *self.status.borrow()
    }

    /// Receiver notified after every transition
    pub fn subscribe(&self) -> watch::Receiver<KeepaliveStatus> {
        self.status.clone()
    }

    /// Wait until the manager reaches `state`.
    ///
    /// # Errors
    ///
    /// Returns [`LinkError::Closed`] if the manager stops first.
    pub async fn wait_for(&self, state: LinkState) -> Result<KeepaliveStatus> {
        let mut status = self.status.clone();
        let reached = status
            .wait_for(|current| current.state == state || current.state == LinkState::Stopped)
            .await
            .map(|current| *current)
            .map_err(|_| LinkError::Closed)?;

        if reached.state == state {
            Ok(reached)
        } else {
            Err(LinkError::Closed)
        }
    }

    /// Stop the loop, abort its timers and drop the active link
    pub async fn shutdown(self) {
        if self.events.send(ManagerEvent::Shutdown).is_err() {
            tracing::debug!("Keepalive manager already stopped");
        }
        if let Err(e) = self.task.await {
            tracing::error!("Keepalive manager task failed: {}", e);
        }
    }
}
