use futures::future::FutureExt;
use shared_proto::pb::greeter_server::{Greeter, GreeterServer};
use std::time::{Duration, Instant};
use tokio::net::{TcpListener, TcpStream};
use tokio_stream::wrappers::TcpListenerStream;
use tonic::transport::Server;

/// Manages construction and destruction of a tonic gRPC server for testing.
pub struct TestServer {
    shutdown_handle: Option<tokio::sync::oneshot::Sender<()>>,
    server_addr: String,
    server_future:
        Option<tokio::task::JoinHandle<std::result::Result<(), tonic::transport::Error>>>,
}

impl Drop for TestServer {
    fn drop(&mut self) {
        // Gracefully shutdown the gRPC Server.
        if let Some(sender) = self.shutdown_handle.take() {
            let _res = sender.send(());
        }
    }
}

impl TestServer {
    /// Bootstrap a tonic `TestServer` serving `greeter` on an ephemeral port.
    ///
    /// This function will run the server asynchronously, and
    /// tear it down when `Self` is dropped.
    pub async fn start<G: Greeter>(greeter: G) -> Self {
        let (shutdown_handle, shutdown) = tokio::sync::oneshot::channel::<()>();

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind tcplistener");
        let listener_addr = listener
            .local_addr()
            .expect("failed to retrieve sockeaddr from tokio listener");

        let server_addr = format!("127.0.0.1:{}", listener_addr.port());
        tracing::info!("server address: {}", server_addr);

        let server_future = tokio::spawn(
            Server::builder()
                .add_service(GreeterServer::new(greeter))
                .serve_with_incoming_shutdown(
                    TcpListenerStream::new(listener),
                    shutdown.map(|_| ()),
                ),
        );

        // await connectivity
        let wait_start = Instant::now();
        while let Err(e) = TcpStream::connect(listener_addr).await {
            if wait_start.elapsed() > Duration::from_secs(10) {
                panic!("Cannot connect to {listener_addr}: {e}");
            }
            tokio::task::yield_now().await;
        }

        TestServer {
            shutdown_handle: Some(shutdown_handle),
            server_addr,
            server_future: Some(server_future),
        }
    }

    /// Get the address `TestServer` is listening on, as `host:port`.
    pub fn address(&self) -> &str {
        &self.server_addr
    }

    /// Shut the server down.
    pub async fn shutdown_sync(mut self) {
        // Gracefully shutdown the gRPC Server.
        if let Some(sender) = self.shutdown_handle.take() {
            let _res = sender.send(());
        }

        if let Some(server_future) = self.server_future.take() {
            server_future
                .await
                .expect("server did not exit gracefully")
                .expect("server failed while shutting down");
        }
    }
}

/// An address nothing is listening on.
///
/// The port is taken from a listener that is closed before returning.
pub async fn refused_address() -> String {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("failed to bind tcplistener");
    let port = listener
        .local_addr()
        .expect("failed to retrieve sockeaddr from tokio listener")
        .port();
    drop(listener);

    format!("127.0.0.1:{}", port)
}
