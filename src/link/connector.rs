use super::{DisconnectObserver, LinkHandle, LinkId};
use crate::types::Result;
use futures::future::BoxFuture;

/// Host platform primitive for opening a channel to the background context.
///
/// An implementation either returns a [`LinkHandle`] for the new channel or
/// fails. After a successful open it must call
/// [`DisconnectObserver::notify`] when the channel is severed, from whichever
/// side.
pub trait Connector: Send + Sync + 'static {
    fn open<'a>(
        &'a self,
        link_id: LinkId,
        name: &'a str,
        observer: DisconnectObserver,
    ) -> BoxFuture<'a, Result<LinkHandle>>;
}
