//! Drives one request/response exchange over a [`Channel`].

use crate::{CallFailure, Channel, MethodId, Transport};
use bytes::{Bytes, BytesMut};
use std::time::Duration;

/// A single unary call, not yet sent.
///
/// [`UnaryCall::send`] consumes the call: each instance goes through
/// `created -> sent -> completed | failed` once.
///
/// ```rust
/// #[tokio::main]
/// async fn main() {
///     use relaycall::{ChannelManager, MethodId, UnaryCall};
///     use shared_proto::pb::{HelloReply, HelloRequest};
///     use std::time::Duration;
///
///     let manager = ChannelManager::default();
///     let mut channel = manager.acquire(("localhost", 1_u16)).unwrap();
///
///     let outcome = UnaryCall::new(
///         MethodId::from_static("/helloworld.Greeter/SayHello"),
///         HelloRequest { name: "Docker Compose".to_string() },
///     )
///     .deadline(Duration::from_millis(200))
///     .send::<HelloReply, _>(&mut channel)
///     .await;
///
///     // Nothing listens on port 1.
///     assert!(outcome.is_err());
/// }
/// ```
#[derive(Debug)]
pub struct UnaryCall<Req> {
    method: MethodId,
    request: Req,
    deadline: Option<Duration>,
}

impl<Req: prost::Message> UnaryCall<Req> {
    pub fn new(method: MethodId, request: Req) -> Self {
        Self {
            method,
            request,
            deadline: None,
        }
    }

    /// Override the deadline of the [`Channel`] for this call only.
    pub fn deadline(self, deadline: Duration) -> Self {
        Self {
            deadline: Some(deadline),
            ..self
        }
    }

    /// Send the request and wait for the response, the failure status, or the
    /// deadline, whichever comes first.
    #[tracing::instrument(level = "debug", skip_all, fields(method = %self.method))]
    pub async fn send<Resp, T>(self, channel: &mut Channel<T>) -> Result<Resp, CallFailure>
    where
        Resp: prost::Message + Default,
        T: Transport,
    {
        let deadline = self.deadline.unwrap_or_else(|| channel.deadline());
        let payload = encode(&self.request)?;

        tracing::trace!(bytes = payload.len(), "sending request");
        let exchange = channel
            .transport_mut()
            .unary(&self.method, payload, deadline);

        let outcome = match tokio::time::timeout(deadline, exchange).await {
            Ok(Ok(bytes)) => {
                Resp::decode(bytes).map_err(|err| CallFailure::SerializationError(err.to_string()))
            }
            // Remote deadline statuses do not carry the budget, report ours.
            Ok(Err(CallFailure::DeadlineExceeded(_))) | Err(_) => {
                Err(CallFailure::DeadlineExceeded(Some(deadline)))
            }
            Ok(Err(failure)) => Err(failure),
        };

        match &outcome {
            Ok(_) => tracing::debug!("call completed"),
            Err(failure) => tracing::debug!("call failed: {}", failure),
        }

        outcome
    }
}

/// Perform one unary call to `method` on `channel`, with the channel's deadline.
pub async fn call<Req, Resp, T>(
    channel: &mut Channel<T>,
    method: &MethodId,
    request: Req,
) -> Result<Resp, CallFailure>
where
    Req: prost::Message,
    Resp: prost::Message + Default,
    T: Transport,
{
    UnaryCall::new(method.clone(), request).send(channel).await
}

fn encode<M: prost::Message>(message: &M) -> Result<Bytes, CallFailure> {
    let mut buf = BytesMut::with_capacity(message.encoded_len());
    message
        .encode(&mut buf)
        .map_err(|err| CallFailure::SerializationError(err.to_string()))?;
    Ok(buf.freeze())
}
