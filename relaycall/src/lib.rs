//! `relaycall` performs unary `gRPC` calls over tonic channels that are scoped to
//! the code using them, typically against a service reached through a reverse proxy.
//!
//! # Simple example
//!
//! ```rust,no_run
//! #[tokio::main]
//! async fn main() -> Result<(), relaycall::Error> {
//!     use relaycall::{ChannelManager, MethodId};
//!     use shared_proto::pb::{HelloReply, HelloRequest};
//!
//!     let say_hello = MethodId::new("helloworld.Greeter", "SayHello")?;
//!
//!     // Acquire a channel, make one call, release the channel.
//!     let reply: HelloReply = ChannelManager::default()
//!         .invoke(
//!             "nginx:8080",
//!             &say_hello,
//!             HelloRequest { name: "Docker Compose".to_string() },
//!         )
//!         .await?;
//!
//!     println!("gRPC Response: {}", reply.message);
//!     Ok(())
//! }
//! ```
//!
//! A [`Channel`] can also be held by the caller and used for several calls in
//! sequence. It is released when [`Channel::release`] is called or when it is
//! dropped, including when the future using it is cancelled.
//!
//! ```rust,no_run
//! #[tokio::main]
//! async fn main() -> Result<(), relaycall::Error> {
//!     use relaycall::{call, ChannelManager, MethodId};
//!     use shared_proto::pb::{HelloReply, HelloRequest};
//!     use std::time::Duration;
//!
//!     let manager = ChannelManager::builder()
//!         .deadline(Duration::from_secs(3))
//!         .connect_timeout(Duration::from_secs(1))
//!         .build();
//!     let say_hello = MethodId::from_static("/helloworld.Greeter/SayHello");
//!
//!     let mut channel = manager.acquire("nginx:8080")?;
//!     for name in ["Alice", "Bob"] {
//!         let reply: HelloReply =
//!             call(&mut channel, &say_hello, HelloRequest { name: name.to_string() }).await?;
//!         println!("{}", reply.message);
//!     }
//!     channel.release();
//!
//!     Ok(())
//! }
//! ```
//!
//! Failures are reported as [`CallFailure`] values, one variant per kind:
//! the target could not be reached, the deadline elapsed, the service answered
//! with an error status, or a message did not match its schema.
//!
//! # Internals
//! [`ChannelManager`] builds a [`Transport`] through a pluggable [`Connector`]. The default,
//! [`TonicConnector`], opens a lazily connected tonic [`Channel`](tonic::transport::Channel)
//! and exchanges already encoded protobuf bytes, so encoding and decoding stay on the caller's side.

mod channel_manager;
mod endpoint;
mod error;
mod method;
mod tonic_transport;
mod transport;
mod unary_call;

pub use channel_manager::*;
pub use endpoint::*;
pub use error::*;
pub use method::*;
pub use tonic_transport::{TonicConnector, TonicTransport};
pub use transport::*;
pub use unary_call::*;
