use crate::init_tracing;
use relaycall::{call, CallFailure, ChannelManager, Error, FailureKind, MethodId};
use shared_proto::pb::{HelloReply, HelloRequest, SAY_HELLO_PATH};
use std::sync::atomic::Ordering;
use std::time::Duration;
use tests::greeter::{Behaviour, TestGreeter};
use tests::test_server::{refused_address, TestServer};

/// Shares the field number of `HelloReply::message` with another wire type.
#[derive(Clone, PartialEq, ::prost::Message)]
struct MismatchedReply {
    #[prost(int64, tag = "1")]
    count: i64,
}

fn say_hello() -> MethodId {
    MethodId::from_static(SAY_HELLO_PATH)
}

fn hello(name: &str) -> HelloRequest {
    HelloRequest {
        name: name.to_string(),
    }
}

fn manager() -> ChannelManager {
    ChannelManager::builder()
        .deadline(Duration::from_secs(5))
        .connect_timeout(Duration::from_secs(1))
        .user_agent("relaycall-tests")
        .build()
}

#[tokio::test]
async fn greets_through_a_real_server() {
    init_tracing();
    let greeter = TestGreeter::new(Behaviour::Echo);
    let served = greeter.served();
    let server = TestServer::start(greeter).await;

    let reply: HelloReply = manager()
        .invoke(server.address(), &say_hello(), hello("Docker Compose"))
        .await
        .expect("failed to call server");

    assert_eq!(reply.message, "Hello, Docker Compose");
    assert_eq!(served.load(Ordering::SeqCst), 1);

    server.shutdown_sync().await;
}

#[tokio::test]
async fn one_channel_serves_sequential_calls() {
    init_tracing();
    let greeter = TestGreeter::new(Behaviour::Echo);
    let served = greeter.served();
    let server = TestServer::start(greeter).await;

    let manager = manager();
    let mut channel = manager.acquire(server.address()).unwrap();
    for name in ["Alice", "Bob", "Carol"] {
        let reply: HelloReply = call(&mut channel, &say_hello(), hello(name))
            .await
            .expect("failed to call server");
        assert_eq!(reply.message, format!("Hello, {}", name));
    }
    channel.release();

    assert_eq!(served.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn refused_connection_is_unavailable() {
    init_tracing();
    let address = refused_address().await;

    let err = manager()
        .invoke::<_, _, HelloReply>(address.as_str(), &say_hello(), hello("nobody"))
        .await
        .expect_err("nothing listens on the address");

    assert!(
        matches!(err, Error::Call(CallFailure::Unavailable(_))),
        "unexpected error: {:?}",
        err
    );
}

#[tokio::test]
async fn error_status_is_a_service_error() {
    init_tracing();
    let server = TestServer::start(TestGreeter::new(Behaviour::Fail(
        tonic::Code::NotFound,
        "no greeter here".to_string(),
    )))
    .await;

    let err = manager()
        .invoke::<_, _, HelloReply>(server.address(), &say_hello(), hello("anyone"))
        .await
        .unwrap_err();

    match err {
        Error::Call(CallFailure::ServiceError { code, message }) => {
            assert_eq!(code, tonic::Code::NotFound);
            assert_eq!(message, "no greeter here");
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn unknown_method_is_unimplemented() {
    init_tracing();
    let server = TestServer::start(TestGreeter::new(Behaviour::Echo)).await;
    let say_goodbye = MethodId::new("helloworld.Greeter", "SayGoodbye").unwrap();

    let err = manager()
        .invoke::<_, _, HelloReply>(server.address(), &say_goodbye, hello("anyone"))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        Error::Call(CallFailure::ServiceError {
            code: tonic::Code::Unimplemented,
            ..
        })
    ));
}

#[tokio::test]
async fn slow_server_hits_the_deadline() {
    init_tracing();
    let server = TestServer::start(TestGreeter::new(Behaviour::Delay(Duration::from_secs(3)))).await;
    let deadline = Duration::from_millis(200);
    let manager = ChannelManager::builder().deadline(deadline).build();

    let err = manager
        .invoke::<_, _, HelloReply>(server.address(), &say_hello(), hello("anyone"))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), FailureKind::DeadlineExceeded);
}

#[tokio::test]
async fn mismatched_reply_schema_is_a_serialization_error() {
    init_tracing();
    let server = TestServer::start(TestGreeter::new(Behaviour::Echo)).await;

    let err = manager()
        .invoke::<_, _, MismatchedReply>(server.address(), &say_hello(), hello("anyone"))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), FailureKind::SerializationError);
}
