//! Defines the interface that [`ChannelManager`](crate::ChannelManager) requires in order
//! to open a connection to an [`Endpoint`] and exchange one encoded message over it.

use bytes::Bytes;
use std::time::Duration;

use crate::{CallFailure, ChannelSettings, Endpoint, InvalidEndpoint, MethodId};

/// Opens a [`Transport`] to an [`Endpoint`].
///
/// Implementations must not check reachability: a target that cannot be
/// reached is reported by [`Transport::unary`], never by `connect`.
pub trait Connector {
    type Transport: Transport;

    fn connect(
        &self,
        endpoint: &Endpoint,
        settings: &ChannelSettings,
    ) -> Result<Self::Transport, InvalidEndpoint>;
}

/// A live connection to one [`Endpoint`], owned by exactly one
/// [`Channel`](crate::Channel).
#[async_trait::async_trait]
pub trait Transport: Send {
    /// Send an encoded request to `method` and wait for the encoded response.
    ///
    /// `deadline` is a hint the transport may forward; the caller enforces it
    /// regardless.
    async fn unary(
        &mut self,
        method: &MethodId,
        payload: Bytes,
        deadline: Duration,
    ) -> Result<Bytes, CallFailure>;

    /// Close the underlying connection. Called exactly once, by the owning
    /// [`Channel`](crate::Channel).
    fn release(&mut self);
}
