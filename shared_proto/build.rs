//! Generate the `helloworld.Greeter` client and server used by the
//! `greet` binary and by the tests.
//!
//! The messages are declared by hand in `src/lib.rs`, so no `protoc` is needed.

fn main() {
    let greeter = tonic_build::manual::Service::builder()
        .name("Greeter")
        .package("helloworld")
        .method(
            tonic_build::manual::Method::builder()
                .name("say_hello")
                .route_name("SayHello")
                .input_type("crate::pb::HelloRequest")
                .output_type("crate::pb::HelloReply")
                .codec_path("tonic::codec::ProstCodec")
                .build(),
        )
        .build();

    tonic_build::manual::Builder::new().compile(&[greeter]);
}
