//! Provides the builder and implementation of [`ChannelManager`], which hands out
//! [`Channel`]s that are released on every exit path of the scope owning them.

use crate::{
    call, CallFailure, Connector, Endpoint, Error, InvalidEndpoint, MethodId, TonicConnector,
    Transport,
};
use futures::future::BoxFuture;
use tokio::time::Duration;
use tracing_futures::Instrument as _;

// Used when no deadline is configured on the builder.
const DEFAULT_DEADLINE: Duration = Duration::from_secs(10);

/// Settings applied to every [`Channel`] a [`ChannelManager`] acquires.
#[derive(Debug, Clone)]
pub struct ChannelSettings {
    deadline: Duration,
    connect_timeout: Option<Duration>,
    user_agent: Option<String>,
}

impl Default for ChannelSettings {
    fn default() -> Self {
        Self {
            deadline: DEFAULT_DEADLINE,
            connect_timeout: None,
            user_agent: None,
        }
    }
}

impl ChannelSettings {
    /// The time budget of a call that does not set its own.
    pub fn deadline(&self) -> Duration {
        self.deadline
    }

    /// The budget for establishing a connection. Defaults to the deadline.
    pub fn connect_timeout(&self) -> Duration {
        self.connect_timeout.unwrap_or(self.deadline)
    }

    pub fn user_agent(&self) -> Option<&str> {
        self.user_agent.as_deref()
    }
}

/// Hands out [`Channel`]s bound to an [`Endpoint`].
///
/// ```rust
/// #[tokio::main]
/// async fn main() {
///     use relaycall::ChannelManager;
///
///     let manager = ChannelManager::builder()
///         .deadline(std::time::Duration::from_secs(5))
///         .build();
///
///     // Connection is lazy: nothing is dialed until the first call.
///     let channel = manager
///         .acquire("nginx:8080")
///         .expect("failed to parse endpoint");
///
///     channel.release();
/// }
/// ```
#[derive(Debug, Clone)]
pub struct ChannelManager<C = TonicConnector> {
    connector: C,
    settings: ChannelSettings,
}

impl ChannelManager<TonicConnector> {
    /// Start configuring a `ChannelManager` backed by tonic.
    pub fn builder() -> ChannelManagerBuilder<TonicConnector> {
        ChannelManagerBuilder::new()
    }
}

impl Default for ChannelManager<TonicConnector> {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl<C: Connector> ChannelManager<C> {
    pub fn settings(&self) -> &ChannelSettings {
        &self.settings
    }

    /// Acquire a [`Channel`] to `endpoint`.
    ///
    /// Fails with [`InvalidEndpoint`] if the address cannot be parsed, before
    /// the connector is involved. An unreachable target is only reported once
    /// a call is made. Nothing is spawned here, so no runtime is required.
    pub fn acquire<E>(&self, endpoint: E) -> Result<Channel<C::Transport>, InvalidEndpoint>
    where
        E: TryInto<Endpoint>,
        E::Error: Into<InvalidEndpoint>,
    {
        let endpoint = endpoint.try_into().map_err(Into::into)?;
        let transport = self.connector.connect(&endpoint, &self.settings)?;

        tracing::debug!("acquired channel to {}", endpoint);

        Ok(Channel {
            endpoint,
            transport,
            deadline: self.settings.deadline,
            released: false,
        })
    }

    /// Acquire a [`Channel`], run `body` with it and release it, whatever
    /// `body` returns.
    ///
    /// If the returned future is dropped before completing, the channel is
    /// released as part of the drop.
    pub async fn scoped<E, F, R>(&self, endpoint: E, body: F) -> Result<R, Error>
    where
        E: TryInto<Endpoint>,
        E::Error: Into<InvalidEndpoint>,
        F: for<'c> FnOnce(&'c mut Channel<C::Transport>) -> BoxFuture<'c, Result<R, CallFailure>>,
    {
        let mut channel = self.acquire(endpoint)?;
        let span = tracing::debug_span!("channel", endpoint = %channel.endpoint());

        let outcome = body(&mut channel).instrument(span).await;
        channel.release();

        Ok(outcome?)
    }

    /// Acquire a [`Channel`], perform one unary call to `method` and release
    /// the channel.
    pub async fn invoke<E, Req, Resp>(
        &self,
        endpoint: E,
        method: &MethodId,
        request: Req,
    ) -> Result<Resp, Error>
    where
        E: TryInto<Endpoint>,
        E::Error: Into<InvalidEndpoint>,
        Req: prost::Message + Send + 'static,
        Resp: prost::Message + Default + Send + 'static,
    {
        let method = method.clone();
        self.scoped(endpoint, move |channel| {
            Box::pin(async move { call(channel, &method, request).await })
        })
        .await
    }
}

/// Builder to configure and create a [`ChannelManager`].
#[derive(Debug)]
pub struct ChannelManagerBuilder<C> {
    connector: C,
    settings: ChannelSettings,
}

impl ChannelManagerBuilder<TonicConnector> {
    pub fn new() -> Self {
        Self {
            connector: TonicConnector,
            settings: ChannelSettings::default(),
        }
    }
}

impl Default for ChannelManagerBuilder<TonicConnector> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Connector> ChannelManagerBuilder<C> {
    /// Set a custom [`Connector`].
    pub fn connector<T: Connector>(self, connector: T) -> ChannelManagerBuilder<T> {
        ChannelManagerBuilder {
            connector,
            settings: self.settings,
        }
    }

    /// Set the deadline applied to calls that do not set their own.
    /// Default is 10 seconds.
    pub fn deadline(mut self, deadline: Duration) -> Self {
        self.settings.deadline = deadline;
        self
    }

    /// Set a connection timeout that will be applied to every new connection.
    ///
    /// Defaults to the `deadline` if not set.
    pub fn connect_timeout(mut self, connect_timeout: Duration) -> Self {
        self.settings.connect_timeout = Some(connect_timeout);
        self
    }

    /// Set the `user-agent` header sent with every request.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.settings.user_agent = Some(user_agent.into());
        self
    }

    pub fn build(self) -> ChannelManager<C> {
        ChannelManager {
            connector: self.connector,
            settings: self.settings,
        }
    }
}

/// A transport bound to one [`Endpoint`], owned by the scope that acquired it.
///
/// The transport is released exactly once: by [`Channel::release`] or, failing
/// that, when the channel is dropped.
#[derive(Debug)]
pub struct Channel<T: Transport> {
    endpoint: Endpoint,
    transport: T,
    deadline: Duration,
    released: bool,
}

impl<T: Transport> Channel<T> {
    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    /// The deadline of calls made on this channel that do not set their own.
    pub fn deadline(&self) -> Duration {
        self.deadline
    }

    /// Close the underlying connection.
    pub fn release(mut self) {
        self.release_transport();
    }

    pub(crate) fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    fn release_transport(&mut self) {
        if !self.released {
            self.released = true;
            self.transport.release();
            tracing::debug!("released channel to {}", self.endpoint);
        }
    }
}

impl<T: Transport> Drop for Channel<T> {
    fn drop(&mut self) {
        self.release_transport();
    }
}

const _: () = {
    const fn assert_is_send<T: Send>() {}
    assert_is_send::<ChannelManager>();
    assert_is_send::<Channel<crate::TonicTransport>>();
};
