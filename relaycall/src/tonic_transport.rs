//! Implements [`Connector`] and [`Transport`] on top of a tonic [`Channel`](tonic::transport::Channel).

use crate::{CallFailure, ChannelSettings, Connector, Endpoint, InvalidEndpoint, MethodId, Transport};
use bytes::{Buf, BufMut, Bytes};
use std::time::Duration;
use tonic::{
    codec::{Codec, DecodeBuf, Decoder, EncodeBuf, Encoder},
    transport::Channel,
    Status,
};

/// Opens plaintext HTTP/2 tonic channels.
///
/// Connections are established lazily, on the first call, so connecting
/// never fails because the target is down and does not need a Tokio runtime.
#[derive(Debug, Clone, Copy, Default)]
pub struct TonicConnector;

impl Connector for TonicConnector {
    type Transport = TonicTransport;

    #[tracing::instrument(level = "debug", skip(self, settings))]
    fn connect(
        &self,
        endpoint: &Endpoint,
        settings: &ChannelSettings,
    ) -> Result<TonicTransport, InvalidEndpoint> {
        let invalid = |err: tonic::transport::Error| {
            InvalidEndpoint::new(endpoint.to_string(), err.to_string())
        };

        let mut tonic_endpoint = Channel::from_shared(endpoint.uri())
            .map_err(|err| InvalidEndpoint::new(endpoint.to_string(), err.to_string()))?
            .connect_timeout(settings.connect_timeout());

        if let Some(user_agent) = settings.user_agent() {
            tonic_endpoint = tonic_endpoint
                .user_agent(user_agent.to_string())
                .map_err(invalid)?;
        }

        tracing::debug!("will connect to {} on the first call", endpoint);

        Ok(TonicTransport {
            state: State::Idle(tonic_endpoint),
        })
    }
}

/// A tonic [`Channel`](tonic::transport::Channel) dedicated to one [`crate::Channel`].
#[derive(Debug)]
pub struct TonicTransport {
    state: State,
}

#[derive(Debug)]
enum State {
    Idle(tonic::transport::Endpoint),
    Open(Channel),
    Released,
}

impl TonicTransport {
    // `connect_lazy` spawns the connection task, so this must run on the runtime.
    fn channel(&mut self) -> Result<Channel, CallFailure> {
        if let State::Idle(endpoint) = &self.state {
            let channel = endpoint.connect_lazy();
            self.state = State::Open(channel);
        }

        match &self.state {
            State::Open(channel) => Ok(channel.clone()),
            _ => Err(CallFailure::Unavailable(
                "channel already released".to_string(),
            )),
        }
    }
}

#[async_trait::async_trait]
impl Transport for TonicTransport {
    async fn unary(
        &mut self,
        method: &MethodId,
        payload: Bytes,
        _deadline: Duration,
    ) -> Result<Bytes, CallFailure> {
        // The deadline is enforced by the caller; sending it as `grpc-timeout`
        // would let the server race the client with a `Cancelled` status.
        let channel = self.channel()?;

        let mut grpc = tonic::client::Grpc::new(channel);
        grpc.ready()
            .await
            .map_err(|err| CallFailure::Unavailable(err.to_string()))?;

        let response = grpc
            .unary(
                tonic::Request::new(payload),
                method.path_and_query().clone(),
                RawCodec,
            )
            .await?;

        Ok(response.into_inner())
    }

    fn release(&mut self) {
        // Dropping the last handle shuts the connection down.
        if let State::Open(_) = std::mem::replace(&mut self.state, State::Released) {
            tracing::trace!("tonic channel dropped");
        }
    }
}

/// Passes already encoded protobuf messages through unchanged, so that
/// encoding and decoding failures surface as
/// [`CallFailure::SerializationError`] rather than as a gRPC status.
#[derive(Debug, Clone, Copy, Default)]
struct RawCodec;

impl Codec for RawCodec {
    type Encode = Bytes;
    type Decode = Bytes;
    type Encoder = RawCodec;
    type Decoder = RawCodec;

    fn encoder(&mut self) -> Self::Encoder {
        *self
    }

    fn decoder(&mut self) -> Self::Decoder {
        *self
    }
}

impl Encoder for RawCodec {
    type Item = Bytes;
    type Error = Status;

    fn encode(&mut self, item: Bytes, dst: &mut EncodeBuf<'_>) -> Result<(), Status> {
        dst.put_slice(&item);
        Ok(())
    }
}

impl Decoder for RawCodec {
    type Item = Bytes;
    type Error = Status;

    fn decode(&mut self, src: &mut DecodeBuf<'_>) -> Result<Option<Bytes>, Status> {
        Ok(Some(src.copy_to_bytes(src.remaining())))
    }
}
