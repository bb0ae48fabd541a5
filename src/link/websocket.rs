use super::{Connector, DisconnectObserver, LinkHandle, LinkId};
use crate::types::{CHANNEL_NAME_PARAM, LinkError, LinkMessage, Result};
use futures::future::BoxFuture;
use futures::{SinkExt, StreamExt};
use tokio::sync::oneshot;
use tokio_tungstenite::tungstenite::Message;
use url::Url;

/// Connector that reaches the background context over a WebSocket.
///
/// Each open performs a fresh handshake against the endpoint with the channel
/// name appended as a query parameter. Two tasks serve an open link: a writer
/// draining the [`LinkHandle`] queue as JSON text frames, and a reader that
/// fires the disconnect observer when the socket closes, errors, or the
/// writer stops.
#[derive(Debug, Clone)]
pub struct WebSocketConnector {
    endpoint: Url,
}

impl WebSocketConnector {
    /// # Errors
    ///
    /// Returns [`LinkError::UrlParse`] if the endpoint cannot be parsed and
    /// [`LinkError::Config`] if it is not a `ws://` or `wss://` URL.
    pub fn new(endpoint: &str) -> Result<Self> {
        let endpoint = Url::parse(endpoint)?;
        match endpoint.scheme() {
            "ws" | "wss" => Ok(Self { endpoint }),
            other => Err(LinkError::Config(format!(
                "unsupported endpoint scheme '{}', expected ws or wss",
                other
            ))),
        }
    }

    pub fn endpoint(&self) -> &str {
        self.endpoint.as_str()
    }

    /// Build the WebSocket URL for a channel
    pub fn endpoint_url(&self, name: &str) -> String {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut().append_pair(CHANNEL_NAME_PARAM, name);
        url.to_string()
    }

    async fn connect(
        &self,
        link_id: LinkId,
        name: &str,
        observer: DisconnectObserver,
    ) -> Result<LinkHandle> {
        let url = self.endpoint_url(name);
        tracing::debug!("Opening link {} to {}", link_id, url);

        let (ws_stream, _response) = tokio_tungstenite::connect_async(url.as_str()).await?;
        let (mut write_half, mut read_half) = ws_stream.split();
        let (handle, mut outbound) = LinkHandle::channel(link_id, name);
        let (writer_done_tx, mut writer_done) = oneshot::channel::<()>();

        tokio::spawn(async move {
            while let Some(message) = outbound.recv().await {
                let frame = match encode(&message) {
                    Ok(frame) => frame,
                    Err(e) => {
                        tracing::error!("Failed to serialize {} message: {}", message.kind, e);
                        continue;
                    }
                };
                if let Err(e) = write_half.send(frame).await {
                    tracing::debug!("Link {} write failed: {}", link_id, e);
                    break;
                }
            }
            // Handle dropped or socket broken; close our side either way
            let _ = write_half.close().await;
            let _ = writer_done_tx.send(());
        });

        tokio::spawn(async move {
            loop {
                tokio::select! {
                    frame = read_half.next() => match frame {
                        Some(Ok(Message::Close(frame))) => {
                            if let Some(close_frame) = frame {
                                tracing::debug!(
                                    "Link {} closed by peer: code={:?}, reason='{}'",
                                    link_id,
                                    close_frame.code,
                                    close_frame.reason
                                );
                            } else {
                                tracing::debug!(
                                    "Link {} closed by peer without close frame",
                                    link_id
                                );
                            }
                            break;
                        }
                        Some(Ok(Message::Text(text))) => {
                            tracing::debug!("Link {} received text message: {}", link_id, text);
                        }
                        Some(Ok(other)) => {
                            tracing::debug!("Link {} received {} byte frame", link_id, other.len());
                        }
                        Some(Err(e)) => {
                            tracing::debug!("Link {} read error: {}", link_id, e);
                            break;
                        }
                        None => break,
                    },
                    _ = &mut writer_done => break,
                }
            }
            observer.notify();
        });

        Ok(handle)
    }
}

impl Connector for WebSocketConnector {
    fn open<'a>(
        &'a self,
        link_id: LinkId,
        name: &'a str,
        observer: DisconnectObserver,
    ) -> BoxFuture<'a, Result<LinkHandle>> {
        Box::pin(self.connect(link_id, name, observer))
    }
}

/// Serialize a message the way the writer puts it on the wire
pub fn encode(message: &LinkMessage) -> Result<Message> {
    Ok(Message::Text(serde_json::to_string(message)?.into()))
}
