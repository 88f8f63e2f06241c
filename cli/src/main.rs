//! Sends one `helloworld.Greeter/SayHello` request through a reverse proxy and
//! prints the greeting.

use anyhow::Context as _;
use clap::Parser;
use relaycall::{ChannelManager, Error, FailureKind, MethodId};
use shared_proto::pb::{HelloReply, HelloRequest};
use std::process::ExitCode;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(version, about)]
struct Opt {
    /// Address of the proxy in front of the greeter, as `host:port`
    #[arg(long, env = "GREET_ENDPOINT", default_value = "nginx:8080")]
    endpoint: String,
    /// Name to greet
    #[arg(long, env = "GREET_NAME", default_value = "Docker Compose")]
    name: String,
    /// Time budget of the call, in milliseconds
    #[arg(long, env = "GREET_DEADLINE_MS", default_value_t = 10_000)]
    deadline_ms: u64,
}

fn exit_code(kind: FailureKind) -> u8 {
    match kind {
        FailureKind::InvalidEndpoint => 2,
        FailureKind::Unavailable => 3,
        FailureKind::DeadlineExceeded => 4,
        FailureKind::ServiceError => 5,
        FailureKind::SerializationError => 6,
        FailureKind::InvalidMethodId => 7,
    }
}

async fn say_hello(opt: Opt) -> Result<HelloReply, Error> {
    let manager = ChannelManager::builder()
        .deadline(Duration::from_millis(opt.deadline_ms))
        .build();
    let method = MethodId::new("helloworld.Greeter", "SayHello")?;

    manager
        .invoke(opt.endpoint.as_str(), &method, HelloRequest { name: opt.name })
        .await
}

fn init_tracing() -> anyhow::Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new("warn").context("invalid default log filter")?,
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|err| anyhow::anyhow!("failed to install the tracing subscriber: {}", err))
}

#[tokio::main]
async fn main() -> ExitCode {
    if let Err(err) = init_tracing() {
        eprintln!("{:#}", err);
        return ExitCode::FAILURE;
    }

    let opt = Opt::parse();
    tracing::debug!(?opt, "starting");

    match say_hello(opt).await {
        Ok(reply) => {
            println!("gRPC Response: {}", reply.message);
            ExitCode::SUCCESS
        }
        Err(err) => {
            tracing::error!(kind = ?err.kind(), "call failed: {}", err);
            eprintln!("error: {}", err);
            ExitCode::from(exit_code(err.kind()))
        }
    }
}
